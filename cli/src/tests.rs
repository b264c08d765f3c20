use super::*;
use clap::CommandFactory;
use fontshelf_core::reader::{MemoryReader, RawFontMetadata};
use std::fs;
use tempfile::tempdir;

fn generate_args(extra: &[&str]) -> GenerateArgs {
    let mut argv = vec!["fontshelf", "generate"];
    argv.extend_from_slice(extra);
    let cli = Cli::try_parse_from(argv).expect("parse cli");
    match cli.command {
        Command::Generate(args) => args,
        other => panic!("expected generate, got {other:?}"),
    }
}

fn face(family: &str, full: &str, postscript: &str, weight: u16) -> RawFontMetadata {
    RawFontMetadata {
        family_name: Some(family.into()),
        full_name: Some(full.into()),
        postscript_name: Some(postscript.into()),
        weight_class: Some(weight),
        ..RawFontMetadata::default()
    }
}

#[test]
fn command_definition_is_consistent() {
    Cli::command().debug_assert();
}

#[test]
fn generate_defaults_to_public_and_local_urls() {
    let args = generate_args(&["--cdn-repo", ""]);
    let config = build_config(&args).expect("config");

    assert_eq!(config.root, PathBuf::from("public"));
    assert_eq!(config.out_dir, PathBuf::from("public"));
    assert_eq!(config.catalog_path(), PathBuf::from("public/fonts-data.json"));
    assert_eq!(config.stylesheet_path(), PathBuf::from("public/fonts.css"));
    assert_eq!(config.stylesheet.assets, AssetSource::local(""));
    assert_eq!(config.build.preview_text, DEFAULT_PREVIEW_TEXT);
    assert_eq!(config.build.jobs, None);
}

#[test]
fn cdn_repo_switches_to_cdn_urls() {
    let args = generate_args(&[
        "fonts",
        "--cdn-repo",
        "acme/type",
        "--cdn-branch",
        "release",
        "--cdn-dir",
        "assets",
    ]);
    let config = build_config(&args).expect("config");

    assert_eq!(
        config.stylesheet.assets,
        AssetSource::Cdn {
            base: DEFAULT_CDN_BASE.to_string(),
            repository: "acme/type".to_string(),
            branch: "release".to_string(),
            directory: "assets".to_string(),
        }
    );
}

#[test]
fn malformed_cdn_repo_is_rejected() {
    for repo in ["acme", "acme/", "/type", "a/b/c"] {
        let args = generate_args(&["--cdn-repo", repo]);
        let err = build_config(&args).unwrap_err();
        assert!(err.to_string().contains("owner/name"), "{repo}: {err}");
    }
}

#[test]
fn zero_jobs_and_path_like_names_are_rejected() {
    let args = generate_args(&["--cdn-repo", "", "--jobs", "0"]);
    assert!(build_config(&args).is_err());

    let args = generate_args(&["--cdn-repo", "", "--catalog-name", "../fonts.json"]);
    let err = build_config(&args).unwrap_err();
    assert!(err.to_string().contains("--catalog-name"));
}

#[test]
fn base_font_family_requires_base_font() {
    let parse = Cli::try_parse_from(["fontshelf", "generate", "--base-font-family", "UI"]);
    assert!(parse.is_err());
}

#[test]
fn verbose_is_global_and_counted() {
    let cli = Cli::try_parse_from(["fontshelf", "list", "-vv", "fonts-data.json"]).expect("parse");
    assert_eq!(cli.verbose, 2);
}

#[test]
fn base_font_family_defaults_to_none() {
    let args = generate_args(&["--cdn-repo", "", "--base-font", "copernicus"]);
    let config = build_config(&args).expect("config");
    assert_eq!(
        config.stylesheet.base_font,
        Some(BaseFontOptions {
            slug: "copernicus".into(),
            css_family: None,
        })
    );
}

#[test]
fn generate_prints_summary_then_paths() {
    let tmp = tempdir().expect("tempdir");
    let root = tmp.path().join("fonts");
    fs::create_dir_all(root.join("alpha")).unwrap();
    fs::create_dir_all(root.join("beta")).unwrap();
    fs::write(root.join("alpha/Alpha-Regular.ttf"), b"").unwrap();
    fs::write(root.join("alpha/Alpha-Bold.ttf"), b"").unwrap();
    fs::write(root.join("beta/Beta-Regular.otf"), b"").unwrap();
    let reader = MemoryReader::new()
        .with_entry("Alpha-Regular.ttf", face("Alpha", "Alpha Regular", "Alpha-Regular", 400))
        .with_entry("Alpha-Bold.ttf", face("Alpha", "Alpha Bold", "Alpha-Bold", 700))
        .with_entry("Beta-Regular.otf", face("Beta", "Beta Regular", "Beta-Regular", 400));

    let root_arg = root.to_string_lossy().into_owned();
    let args = generate_args(&[root_arg.as_str(), "--cdn-repo", ""]);
    let mut out = Vec::new();
    run_generate(&args, &reader, &mut out).expect("generate");

    let text = String::from_utf8(out).expect("utf8");
    let expected = format!(
        "Found 2 font families\nTotal font files: 3\n   - Alpha (2 variants)\n   - Beta (1 variants)\n\nCatalog: {}\nStylesheet: {}\n",
        root.join("fonts-data.json").display(),
        root.join("fonts.css").display()
    );
    assert_eq!(text, expected);
}

#[test]
fn list_and_show_read_a_written_catalog() {
    let tmp = tempdir().expect("tempdir");
    let root = tmp.path().join("fonts");
    fs::create_dir_all(root.join("alpha")).unwrap();
    fs::write(root.join("alpha/Alpha-Regular.ttf"), b"").unwrap();
    let reader = MemoryReader::new()
        .with_entry("Alpha-Regular.ttf", face("Alpha", "Alpha Regular", "Alpha-Regular", 400));
    let report = generate(&GenerateConfig::new(&root, &root), &reader).expect("generate");

    let mut listed = Vec::new();
    run_list(&report.catalog_path, &mut listed).expect("list");
    assert_eq!(String::from_utf8(listed).unwrap(), "alpha\n");

    let mut shown = Vec::new();
    run_show(&report.catalog_path, "alpha", &mut shown).expect("show");
    let value: serde_json::Value = serde_json::from_slice(&shown).expect("json");
    assert_eq!(value["slug"], "alpha");
    assert_eq!(value["mainVariant"]["fileName"], "Alpha-Regular.ttf");

    let err = run_show(&report.catalog_path, "missing", Vec::new()).unwrap_err();
    assert!(err.to_string().contains("\"missing\""));
}
