//! Variant records and the adapter from raw reader output.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::naming::{css_family_name, variant_label};
use crate::reader::{FontMetadataReader, RawFontMetadata, ReadError};

pub const DEFAULT_WEIGHT: u16 = 400;
pub const DEFAULT_WIDTH: u16 = 5;

/// Container format, derived from the file extension alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontFormat {
    Truetype,
    Opentype,
    Woff,
    Woff2,
}

impl FontFormat {
    /// Unknown extensions map to TrueType.
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_ascii_lowercase().as_str() {
            "otf" => FontFormat::Opentype,
            "woff" => FontFormat::Woff,
            "woff2" => FontFormat::Woff2,
            _ => FontFormat::Truetype,
        }
    }

    /// Token used in `format("…")` hints.
    pub fn css_token(self) -> &'static str {
        match self {
            FontFormat::Truetype => "truetype",
            FontFormat::Opentype => "opentype",
            FontFormat::Woff => "woff",
            FontFormat::Woff2 => "woff2",
        }
    }
}

impl fmt::Display for FontFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.css_token())
    }
}

/// `Oblique` is accepted when reading a catalog but detection never
/// produces it: style comes from the italic-angle sign only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontStyle {
    Normal,
    Italic,
    Oblique,
}

impl FontStyle {
    pub fn from_italic_angle(angle: f64) -> Self {
        if angle != 0.0 {
            FontStyle::Italic
        } else {
            FontStyle::Normal
        }
    }

    pub fn css_token(self) -> &'static str {
        match self {
            FontStyle::Normal => "normal",
            FontStyle::Italic => "italic",
            FontStyle::Oblique => "oblique",
        }
    }
}

impl fmt::Display for FontStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.css_token())
    }
}

/// One physical font file inside a family directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Variant {
    /// Short label such as "Bold Italic".
    pub name: String,
    pub family_name: String,
    pub full_name: String,
    pub postscript_name: String,
    pub file_name: String,
    /// `/<directory>/<file name>`.
    pub file_path: String,
    pub weight: u16,
    pub width: u16,
    pub style: FontStyle,
    pub format: FontFormat,
    pub file_extension: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub css_family_name: Option<String>,
}

impl Variant {
    /// Copy of this variant carrying its generated CSS family name.
    pub fn with_css_family_name(&self) -> Variant {
        Variant {
            css_family_name: Some(css_family_name(self)),
            ..self.clone()
        }
    }
}

/// Build a variant from reader output, applying the documented defaults.
pub fn variant_from_raw(raw: RawFontMetadata, file_name: &str, dir_name: &str) -> Variant {
    let stem = file_stem(file_name);
    let file_extension = Path::new(file_name)
        .extension()
        .map(|e| e.to_string_lossy().to_string())
        .unwrap_or_default();

    let family_name = raw.family_name.unwrap_or_else(|| "Unknown".to_string());
    let full_name = raw.full_name.unwrap_or_else(|| file_name.to_string());
    let postscript_name = raw.postscript_name.unwrap_or_else(|| stem.to_string());

    let weight = raw
        .weight_class
        .filter(|w| *w != 0)
        .unwrap_or(DEFAULT_WEIGHT);
    let width = raw
        .width_class
        .filter(|w| *w != 0)
        .unwrap_or(DEFAULT_WIDTH);

    Variant {
        name: variant_label(&full_name, &family_name),
        family_name,
        full_name,
        postscript_name,
        file_name: file_name.to_string(),
        file_path: format!("/{dir_name}/{file_name}"),
        weight,
        width,
        style: FontStyle::from_italic_angle(raw.italic_angle),
        format: FontFormat::from_extension(&file_extension),
        file_extension,
        css_family_name: None,
    }
}

/// Read one font file through `reader` and adapt the result.
pub fn load_variant<R>(reader: &R, path: &Path, dir_name: &str) -> Result<Variant, ReadError>
where
    R: FontMetadataReader + ?Sized,
{
    let raw = reader.read(path)?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string());
    Ok(variant_from_raw(raw, &file_name, dir_name))
}

/// File name without its final extension.
pub(crate) fn file_stem(file_name: &str) -> &str {
    match file_name.rfind('.') {
        Some(idx) if idx > 0 => &file_name[..idx],
        _ => file_name,
    }
}
