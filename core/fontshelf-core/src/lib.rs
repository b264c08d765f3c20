//! fontshelf-core: font folders in, catalog and stylesheet out.
//!
//! Point it at a directory laid out as `root/<family>/*.{ttf,otf,woff,woff2}`
//! and it will:
//!
//! - read each file's typographic metadata through a [`reader::FontMetadataReader`]
//! - label every variant ("Bold Italic") and settle on one family name per
//!   directory, even when vendors embed weights or trial markers in it
//! - pick a main variant and a coarse category per family
//! - assemble a [`catalog::Catalog`] sorted by family name
//! - render `@font-face` rules with collision-free family names
//!
//! ```rust,no_run
//! use fontshelf_core::pipeline::{generate, GenerateConfig};
//! use fontshelf_core::reader::FontationsReader;
//!
//! let config = GenerateConfig::new("public", "public");
//! let report = generate(&config, &FontationsReader::new())?;
//! println!(
//!     "{} families, {} files",
//!     report.catalog.total_families(),
//!     report.catalog.total_fonts()
//! );
//! # Ok::<(), anyhow::Error>(())
//! ```
//!
//! Directories are processed in parallel with rayon; ordering is settled
//! afterwards so output is deterministic.

pub mod catalog;
pub mod category;
#[cfg(feature = "fontations")]
pub mod container;
pub mod discovery;
pub mod naming;
pub mod output;
pub mod pipeline;
pub mod reader;
pub mod rules;
pub mod select;
pub mod stylesheet;
pub mod variant;
