//! End-to-end run: scan, enrich, render, write.

use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::info;

use crate::catalog::{build_catalog, BuildOptions, Catalog};
use crate::output::{write_atomic, write_catalog_json};
use crate::reader::FontMetadataReader;
use crate::stylesheet::{emit_stylesheet, StylesheetOptions};

pub const CATALOG_FILE_NAME: &str = "fonts-data.json";
pub const STYLESHEET_FILE_NAME: &str = "fonts.css";

/// Everything one run needs. Nothing is read from the environment here.
#[derive(Debug, Clone)]
pub struct GenerateConfig {
    /// Directory holding one subdirectory per family.
    pub root: PathBuf,
    /// Where both artifacts are written.
    pub out_dir: PathBuf,
    pub catalog_file_name: String,
    pub stylesheet_file_name: String,
    pub build: BuildOptions,
    pub stylesheet: StylesheetOptions,
}

impl GenerateConfig {
    /// Defaults for everything except the two directories.
    pub fn new(root: impl Into<PathBuf>, out_dir: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            out_dir: out_dir.into(),
            catalog_file_name: CATALOG_FILE_NAME.to_string(),
            stylesheet_file_name: STYLESHEET_FILE_NAME.to_string(),
            build: BuildOptions::default(),
            stylesheet: StylesheetOptions::default(),
        }
    }

    pub fn catalog_path(&self) -> PathBuf {
        self.out_dir.join(&self.catalog_file_name)
    }

    pub fn stylesheet_path(&self) -> PathBuf {
        self.out_dir.join(&self.stylesheet_file_name)
    }
}

/// What a successful run produced.
#[derive(Debug, Clone)]
pub struct GenerateReport {
    /// The enriched catalog as written.
    pub catalog: Catalog,
    pub catalog_path: PathBuf,
    pub stylesheet_path: PathBuf,
}

/// Build the catalog, then write catalog and stylesheet.
///
/// Nothing is written unless the whole scan succeeds.
pub fn generate<R>(config: &GenerateConfig, reader: &R) -> Result<GenerateReport>
where
    R: FontMetadataReader + ?Sized,
{
    info!(root = %config.root.display(), "scanning font directories");
    let catalog = build_catalog(&config.root, &config.build, reader)?.with_css_family_names();
    info!(
        families = catalog.total_families(),
        fonts = catalog.total_fonts(),
        "catalog built"
    );

    let mut json = Vec::new();
    write_catalog_json(&catalog, &mut json)?;
    let css = emit_stylesheet(&catalog, &config.stylesheet);

    let catalog_path = config.catalog_path();
    write_atomic(&catalog_path, &json)
        .with_context(|| format!("writing catalog {}", catalog_path.display()))?;
    info!(path = %catalog_path.display(), "catalog written");

    let stylesheet_path = config.stylesheet_path();
    write_atomic(&stylesheet_path, css.as_bytes())
        .with_context(|| format!("writing stylesheet {}", stylesheet_path.display()))?;
    info!(path = %stylesheet_path.display(), "stylesheet written");

    Ok(GenerateReport {
        catalog,
        catalog_path,
        stylesheet_path,
    })
}
