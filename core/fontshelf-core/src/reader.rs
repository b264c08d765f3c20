//! Font-table reader boundary.
//!
//! The pipeline only ever sees [`RawFontMetadata`]. Anything that can produce
//! it from a path implements [`FontMetadataReader`], so the binary parser can
//! be swapped out or replaced by an in-memory table in tests.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Typographic metadata as reported by a font binary, before any defaulting.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawFontMetadata {
    pub family_name: Option<String>,
    pub full_name: Option<String>,
    pub postscript_name: Option<String>,
    pub italic_angle: f64,
    pub weight_class: Option<u16>,
    pub width_class: Option<u16>,
}

/// Per-file failure. Never fatal for a catalog run.
#[derive(Debug, Error)]
pub enum ReadError {
    #[error("reading {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("parsing {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },
    #[error("{}: {container} is not supported by this reader", path.display())]
    UnsupportedContainer {
        path: PathBuf,
        container: &'static str,
    },
}

/// Anything that can turn a font file path into raw metadata.
pub trait FontMetadataReader: Send + Sync {
    fn read(&self, path: &Path) -> Result<RawFontMetadata, ReadError>;
}

/// Reader backed by a table of metadata keyed by file name.
///
/// Useful when metadata was extracted elsewhere, and for tests. File
/// contents are never touched; unknown names are parse failures.
#[derive(Debug, Clone, Default)]
pub struct MemoryReader {
    entries: HashMap<String, RawFontMetadata>,
}

impl MemoryReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(mut self, file_name: impl Into<String>, meta: RawFontMetadata) -> Self {
        self.entries.insert(file_name.into(), meta);
        self
    }

    pub fn insert(&mut self, file_name: impl Into<String>, meta: RawFontMetadata) {
        self.entries.insert(file_name.into(), meta);
    }
}

impl FontMetadataReader for MemoryReader {
    fn read(&self, path: &Path) -> Result<RawFontMetadata, ReadError> {
        let key = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        self.entries
            .get(&key)
            .cloned()
            .ok_or_else(|| ReadError::Parse {
                path: path.to_path_buf(),
                message: "no metadata registered for this file".to_string(),
            })
    }
}

#[cfg(feature = "fontations")]
pub use fontations::FontationsReader;

#[cfg(feature = "fontations")]
mod fontations {
    use std::fs;
    use std::path::Path;

    use read_fonts::{FontRef, TableProvider};
    use skrifa::string::StringId;
    use skrifa::{FontRef as SkrifaFontRef, MetadataProvider};

    use super::{FontMetadataReader, RawFontMetadata, ReadError};
    use crate::container::{unwrap_web_font, ContainerError};

    /// sfnt reader built on read-fonts (tables) and skrifa (name strings).
    ///
    /// WOFF and WOFF2 files are unwrapped first. Only the first face of a
    /// collection is read.
    #[derive(Debug, Default, Clone, Copy)]
    pub struct FontationsReader;

    impl FontationsReader {
        pub fn new() -> Self {
            Self
        }
    }

    impl FontMetadataReader for FontationsReader {
        fn read(&self, path: &Path) -> Result<RawFontMetadata, ReadError> {
            let data = fs::read(path).map_err(|source| ReadError::Io {
                path: path.to_path_buf(),
                source,
            })?;

            let data = unwrap_web_font(&data).map_err(|err| match err {
                ContainerError::Collection => ReadError::UnsupportedContainer {
                    path: path.to_path_buf(),
                    container: "WOFF2 collection",
                },
                other => ReadError::Parse {
                    path: path.to_path_buf(),
                    message: other.to_string(),
                },
            })?;

            let font = FontRef::from_index(&data, 0).map_err(|err| ReadError::Parse {
                path: path.to_path_buf(),
                message: err.to_string(),
            })?;
            let sfont = SkrifaFontRef::from_index(&data, 0).map_err(|err| ReadError::Parse {
                path: path.to_path_buf(),
                message: err.to_string(),
            })?;

            let (weight_class, width_class) = match font.os2() {
                Ok(table) => (Some(table.us_weight_class()), Some(table.us_width_class())),
                Err(_) => (None, None),
            };

            let italic_angle = font
                .post()
                .map(|post| post.italic_angle().to_f64())
                .unwrap_or(0.0);

            Ok(RawFontMetadata {
                family_name: name_string(&sfont, StringId::FAMILY_NAME),
                full_name: name_string(&sfont, StringId::FULL_NAME),
                postscript_name: name_string(&sfont, StringId::POSTSCRIPT_NAME),
                italic_angle,
                weight_class,
                width_class,
            })
        }
    }

    fn name_string(font: &SkrifaFontRef, id: StringId) -> Option<String> {
        font.localized_strings(id)
            .english_or_first()
            .map(|s| s.to_string().trim().to_string())
            .filter(|s| !s.is_empty())
    }
}
