//! fontshelf CLI

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use clap::{ArgAction, Args, Parser, Subcommand, ValueHint};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use fontshelf_core::catalog::{BuildOptions, Catalog, DEFAULT_PREVIEW_TEXT};
use fontshelf_core::output::{load_catalog, write_json_pretty};
use fontshelf_core::pipeline::{
    generate, GenerateConfig, GenerateReport, CATALOG_FILE_NAME, STYLESHEET_FILE_NAME,
};
use fontshelf_core::reader::{FontMetadataReader, FontationsReader};
use fontshelf_core::stylesheet::{
    AssetSource, BaseFontOptions, StylesheetOptions, DEFAULT_CDN_BASE, DEFAULT_CDN_BRANCH,
    DEFAULT_CDN_DIRECTORY,
};

/// CLI entrypoint for fontshelf.
#[derive(Debug, Parser)]
#[command(
    name = "fontshelf",
    version,
    about = "Scan font folders into a JSON catalog and an @font-face stylesheet"
)]
pub struct Cli {
    /// More log output on stderr (-v info, -vv debug); RUST_LOG wins when set
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Scan ROOT and write the catalog and stylesheet
    Generate(GenerateArgs),
    /// Print every family slug in a catalog
    List(ListArgs),
    /// Print one family from a catalog as JSON
    Show(ShowArgs),
}

#[derive(Debug, Args)]
struct GenerateArgs {
    /// Directory with one subdirectory per family
    #[arg(default_value = "public", value_hint = ValueHint::DirPath)]
    root: PathBuf,

    /// Where to write the outputs (defaults to ROOT)
    #[arg(long = "out-dir", env = "FONTSHELF_OUT_DIR", value_hint = ValueHint::DirPath)]
    out_dir: Option<PathBuf>,

    /// File name of the JSON catalog
    #[arg(long = "catalog-name", default_value = CATALOG_FILE_NAME)]
    catalog_name: String,

    /// File name of the stylesheet
    #[arg(long = "stylesheet-name", default_value = STYLESHEET_FILE_NAME)]
    stylesheet_name: String,

    /// Prefix for local font URLs
    #[arg(long = "asset-root", env = "FONTSHELF_ASSET_ROOT", default_value = "")]
    asset_root: String,

    /// Serve fonts from a jsDelivr-style CDN for this owner/name repository
    #[arg(long = "cdn-repo", env = "FONTSHELF_CDN_REPOSITORY")]
    cdn_repo: Option<String>,

    /// Branch used in CDN URLs
    #[arg(long = "cdn-branch", env = "FONTSHELF_CDN_BRANCH", default_value = DEFAULT_CDN_BRANCH)]
    cdn_branch: String,

    /// Base URL of the CDN
    #[arg(long = "cdn-base", env = "FONTSHELF_CDN_BASE", default_value = DEFAULT_CDN_BASE)]
    cdn_base: String,

    /// Directory inside the repository that holds the family folders
    #[arg(long = "cdn-dir", env = "FONTSHELF_CDN_DIR", default_value = DEFAULT_CDN_DIRECTORY)]
    cdn_dir: String,

    /// Slug of the family that also gets the base-font faces
    #[arg(long = "base-font", env = "FONTSHELF_BASE_FONT")]
    base_font: Option<String>,

    /// font-family name for the base-font faces (defaults to the family name)
    #[arg(long = "base-font-family", requires = "base_font")]
    base_font_family: Option<String>,

    /// Sample sentence stored with every family
    #[arg(long = "preview-text", default_value = DEFAULT_PREVIEW_TEXT)]
    preview_text: String,

    /// Worker threads for reading fonts
    #[arg(short = 'j', long = "jobs")]
    jobs: Option<usize>,

    /// Follow symlinks while walking ROOT
    #[arg(long = "follow-symlinks", action = ArgAction::SetTrue)]
    follow_symlinks: bool,
}

#[derive(Debug, Args)]
struct ListArgs {
    /// Catalog written by `fontshelf generate`
    #[arg(value_hint = ValueHint::FilePath)]
    catalog: PathBuf,
}

#[derive(Debug, Args)]
struct ShowArgs {
    /// Catalog written by `fontshelf generate`
    #[arg(value_hint = ValueHint::FilePath)]
    catalog: PathBuf,

    /// Family slug (its directory name)
    slug: String,
}

/// Parse CLI args and execute the selected command.
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let stdout = io::stdout();
    let mut handle = stdout.lock();

    match cli.command {
        Command::Generate(args) => run_generate(&args, &FontationsReader::new(), &mut handle),
        Command::List(args) => run_list(&args.catalog, &mut handle),
        Command::Show(args) => run_show(&args.catalog, &args.slug, &mut handle),
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    // A subscriber may already be installed when run() is called twice in-process.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

fn run_generate<R>(args: &GenerateArgs, reader: &R, w: impl Write) -> Result<()>
where
    R: FontMetadataReader + ?Sized,
{
    let config = build_config(args)?;
    debug!(
        root = %config.root.display(),
        out_dir = %config.out_dir.display(),
        assets = ?config.stylesheet.assets,
        "resolved generate configuration"
    );
    let report = generate(&config, reader)?;
    write_report(&report, w)
}

fn build_config(args: &GenerateArgs) -> Result<GenerateConfig> {
    if args.jobs == Some(0) {
        return Err(anyhow!("--jobs must be at least 1"));
    }
    for (flag, name) in [
        ("--catalog-name", &args.catalog_name),
        ("--stylesheet-name", &args.stylesheet_name),
    ] {
        validate_file_name(flag, name)?;
    }

    let out_dir = args.out_dir.clone().unwrap_or_else(|| args.root.clone());
    let mut config = GenerateConfig::new(&args.root, out_dir);
    config.catalog_file_name = args.catalog_name.clone();
    config.stylesheet_file_name = args.stylesheet_name.clone();
    config.build = BuildOptions {
        follow_symlinks: args.follow_symlinks,
        jobs: args.jobs,
        preview_text: args.preview_text.clone(),
    };
    config.stylesheet = StylesheetOptions {
        assets: asset_source(args)?,
        base_font: args.base_font.as_ref().map(|slug| BaseFontOptions {
            slug: slug.clone(),
            css_family: args.base_font_family.clone(),
        }),
    };

    Ok(config)
}

fn asset_source(args: &GenerateArgs) -> Result<AssetSource> {
    let Some(repo) = args.cdn_repo.as_deref().map(str::trim).filter(|r| !r.is_empty()) else {
        return Ok(AssetSource::local(&args.asset_root));
    };

    match repo.split_once('/') {
        Some((owner, name)) if !owner.is_empty() && !name.is_empty() && !name.contains('/') => {
            Ok(AssetSource::Cdn {
                base: args.cdn_base.clone(),
                repository: repo.to_string(),
                branch: args.cdn_branch.clone(),
                directory: args.cdn_dir.clone(),
            })
        }
        _ => Err(anyhow!("invalid CDN repository {repo:?}: expected owner/name")),
    }
}

fn validate_file_name(flag: &str, name: &str) -> Result<()> {
    let path = Path::new(name);
    if name.is_empty() || path.file_name().map(|f| f != path.as_os_str()).unwrap_or(true) {
        return Err(anyhow!("{flag} must be a plain file name, got {name:?}"));
    }
    Ok(())
}

fn write_report(report: &GenerateReport, mut w: impl Write) -> Result<()> {
    write_summary(&report.catalog, &mut w)?;
    writeln!(w)?;
    writeln!(w, "Catalog: {}", report.catalog_path.display())?;
    writeln!(w, "Stylesheet: {}", report.stylesheet_path.display())?;
    Ok(())
}

fn write_summary(catalog: &Catalog, mut w: impl Write) -> Result<()> {
    writeln!(w, "Found {} font families", catalog.total_families())?;
    writeln!(w, "Total font files: {}", catalog.total_fonts())?;
    for family in catalog.families() {
        writeln!(
            w,
            "   - {} ({} variants)",
            family.display_name(),
            family.variants().len()
        )?;
    }
    Ok(())
}

fn run_list(catalog_path: &Path, mut w: impl Write) -> Result<()> {
    let catalog = load_catalog(catalog_path)?;
    for slug in catalog.slugs() {
        writeln!(w, "{slug}")?;
    }
    Ok(())
}

fn run_show(catalog_path: &Path, slug: &str, mut w: impl Write) -> Result<()> {
    let catalog = load_catalog(catalog_path)?;
    let family = catalog.family(slug).ok_or_else(|| {
        anyhow!(
            "no family with slug {slug:?} in {}",
            catalog_path.display()
        )
    })?;
    write_json_pretty(family, &mut w)?;
    writeln!(w)?;
    Ok(())
}

#[cfg(test)]
mod tests;
