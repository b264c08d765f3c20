//! `@font-face` stylesheet generation.

use std::fmt::Write as _;

use crate::catalog::{Catalog, FontFamily};
use crate::naming::css_family_name;
use crate::variant::{file_stem, FontStyle, Variant};

pub const DEFAULT_CDN_BASE: &str = "https://cdn.jsdelivr.net/gh";
pub const DEFAULT_CDN_BRANCH: &str = "main";
pub const DEFAULT_CDN_DIRECTORY: &str = "public";

const HEADER: [&str; 2] = [
    "/* Auto-generated font-face declarations */",
    "/* Do not edit manually - run fontshelf generate */",
];

/// Where `url(…)` in each rule points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetSource {
    /// `<asset_root>/<dir>/<file>`; an empty root yields a bare relative path.
    Local { asset_root: String },
    /// `<base>/<repository>@<branch>/<directory>/<dir>/<file>`.
    Cdn {
        base: String,
        repository: String,
        branch: String,
        directory: String,
    },
}

impl Default for AssetSource {
    fn default() -> Self {
        AssetSource::Local {
            asset_root: String::new(),
        }
    }
}

impl AssetSource {
    pub fn local(asset_root: impl Into<String>) -> Self {
        AssetSource::Local {
            asset_root: asset_root.into(),
        }
    }

    /// CDN source with the default base, branch and directory.
    pub fn cdn(repository: impl Into<String>) -> Self {
        AssetSource::Cdn {
            base: DEFAULT_CDN_BASE.to_string(),
            repository: repository.into(),
            branch: DEFAULT_CDN_BRANCH.to_string(),
            directory: DEFAULT_CDN_DIRECTORY.to_string(),
        }
    }

    /// Resolve a variant's `/dir/file` path to a URL.
    pub fn url_for(&self, file_path: &str) -> String {
        let relative = file_path.trim_start_matches('/');
        match self {
            AssetSource::Local { asset_root } => {
                let root = asset_root.trim_end_matches('/');
                if root.is_empty() {
                    relative.to_string()
                } else {
                    format!("{root}/{relative}")
                }
            }
            AssetSource::Cdn {
                base,
                repository,
                branch,
                directory,
            } => {
                let pinned = format!("{}@{}", repository.trim_matches('/'), branch);
                [
                    base.trim_end_matches('/'),
                    pinned.as_str(),
                    directory.trim_matches('/'),
                    relative,
                ]
                .iter()
                .filter(|part| !part.is_empty())
                .copied()
                .collect::<Vec<_>>()
                .join("/")
            }
        }
    }
}

/// A family that also gets a small set of named faces under one CSS name,
/// for use as the interface font.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseFontOptions {
    /// Slug of the family directory to draw files from.
    pub slug: String,
    /// `font-family` name the faces are bound to; defaults to the family's
    /// display name.
    pub css_family: Option<String>,
}

/// One named face of the base font.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BaseFace {
    pub label: &'static str,
    /// Lower-case, separator-free suffix expected at the end of the file stem.
    pub fragment: &'static str,
    pub weight: u16,
    pub style: FontStyle,
}

pub const BASE_FACES: [BaseFace; 8] = [
    BaseFace { label: "Book", fragment: "book", weight: 400, style: FontStyle::Normal },
    BaseFace { label: "Book Italic", fragment: "bookitalic", weight: 400, style: FontStyle::Italic },
    BaseFace { label: "Medium", fragment: "medium", weight: 500, style: FontStyle::Normal },
    BaseFace { label: "Medium Italic", fragment: "mediumitalic", weight: 500, style: FontStyle::Italic },
    BaseFace { label: "Bold", fragment: "bold", weight: 700, style: FontStyle::Normal },
    BaseFace { label: "Bold Italic", fragment: "bolditalic", weight: 700, style: FontStyle::Italic },
    BaseFace { label: "Heavy", fragment: "heavy", weight: 800, style: FontStyle::Normal },
    BaseFace { label: "Heavy Italic", fragment: "heavyitalic", weight: 800, style: FontStyle::Italic },
];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StylesheetOptions {
    pub assets: AssetSource,
    pub base_font: Option<BaseFontOptions>,
}

/// Render the stylesheet for a catalog.
///
/// Variants without a CSS family name get one generated on the fly, so an
/// unenriched catalog renders the same as an enriched one.
pub fn emit_stylesheet(catalog: &Catalog, opts: &StylesheetOptions) -> String {
    let mut out = String::new();
    for line in HEADER {
        out.push_str(line);
        out.push('\n');
    }
    out.push('\n');

    if let Some(base) = &opts.base_font {
        emit_base_font(&mut out, catalog, base, &opts.assets);
    }

    for family in catalog.families() {
        let _ = writeln!(
            out,
            "/* {} - {} variants */",
            family.display_name(),
            family.variants().len()
        );
        for variant in family.variants() {
            let css_name = variant
                .css_family_name
                .clone()
                .unwrap_or_else(|| css_family_name(variant));
            push_font_face(
                &mut out,
                &css_name,
                &opts.assets.url_for(&variant.file_path),
                variant.format.css_token(),
                variant.weight,
                variant.style,
            );
        }
    }

    out
}

fn emit_base_font(out: &mut String, catalog: &Catalog, base: &BaseFontOptions, assets: &AssetSource) {
    let Some(family) = catalog.family(&base.slug) else {
        return;
    };

    let matches: Vec<(&BaseFace, &Variant)> = BASE_FACES
        .iter()
        .filter_map(|face| find_face(family, face).map(|v| (face, v)))
        .collect();
    if matches.is_empty() {
        return;
    }

    let css_family = base
        .css_family
        .clone()
        .unwrap_or_else(|| family.display_name().to_string());

    let _ = writeln!(out, "/* Base font: {} ({}) */", css_family, base.slug);
    for (face, variant) in matches {
        push_font_face(
            out,
            &css_family,
            &assets.url_for(&variant.file_path),
            variant.format.css_token(),
            face.weight,
            face.style,
        );
    }
}

/// Prefixes that turn a face fragment into another weight ("semibold").
const WEIGHT_PREFIXES: [&str; 4] = ["semi", "demi", "extra", "ultra"];

fn find_face<'a>(family: &'a FontFamily, face: &BaseFace) -> Option<&'a Variant> {
    family
        .variants()
        .iter()
        .find(|v| stem_matches_face(&normalized_stem(&v.file_name), face.fragment))
}

fn stem_matches_face(stem: &str, fragment: &str) -> bool {
    match stem.strip_suffix(fragment) {
        Some(head) => !WEIGHT_PREFIXES.iter().any(|prefix| head.ends_with(prefix)),
        None => false,
    }
}

fn normalized_stem(file_name: &str) -> String {
    file_stem(file_name)
        .chars()
        .filter(|c| !matches!(c, '-' | '_' | ' '))
        .flat_map(char::to_lowercase)
        .collect()
}

fn push_font_face(
    out: &mut String,
    family: &str,
    url: &str,
    format: &str,
    weight: u16,
    style: FontStyle,
) {
    let _ = write!(
        out,
        "@font-face {{\n  font-family: \"{}\";\n  src: url(\"{}\") format(\"{}\");\n  font-weight: {};\n  font-style: {};\n  font-display: swap;\n}}\n\n",
        css_string(family),
        css_string(url),
        format,
        weight,
        style.css_token(),
    );
}

fn css_string(raw: &str) -> String {
    raw.replace('\\', "\\\\").replace('"', "\\\"")
}
