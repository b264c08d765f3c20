//! Family records, the catalog, and the directory-to-catalog builder.

use std::path::Path;

use anyhow::{anyhow, Result};
use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use rayon::prelude::*;
use rayon::ThreadPoolBuilder;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use crate::category::{classify, Category};
use crate::discovery::{FamilyDirectory, FamilyDiscovery, PathDiscovery};
use crate::naming::resolve_family_name;
use crate::reader::FontMetadataReader;
use crate::select::select_main_variant;
use crate::variant::{load_variant, Variant};

pub const DEFAULT_PREVIEW_TEXT: &str = "The quick brown fox jumps over the lazy dog";

/// One directory's worth of variants under a single canonical name.
///
/// Only constructed through [`FontFamily::from_variants`], so a family always
/// has at least one variant and its main variant is one of them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FontFamily {
    id: String,
    slug: String,
    name: String,
    display_name: String,
    category: Category,
    variants: Vec<Variant>,
    main_variant: Variant,
    preview_text: String,
}

impl FontFamily {
    /// Resolve name, main variant and category for a directory.
    /// `None` when `variants` is empty.
    pub fn from_variants(dir_name: &str, variants: Vec<Variant>, preview_text: &str) -> Option<Self> {
        let main_variant = select_main_variant(&variants)?.clone();

        let family_names: Vec<&str> = variants.iter().map(|v| v.family_name.as_str()).collect();
        let name = resolve_family_name(&family_names);
        let category = classify(&name);

        Some(Self {
            id: dir_name.to_string(),
            slug: dir_name.to_string(),
            display_name: name.clone(),
            name,
            category,
            variants,
            main_variant,
            preview_text: preview_text.to_string(),
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn slug(&self) -> &str {
        &self.slug
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn category(&self) -> Category {
        self.category
    }

    /// Variants in discovery order.
    pub fn variants(&self) -> &[Variant] {
        &self.variants
    }

    pub fn main_variant(&self) -> &Variant {
        &self.main_variant
    }

    pub fn preview_text(&self) -> &str {
        &self.preview_text
    }

    /// Copy of this family with every variant, main variant included,
    /// carrying its CSS family name.
    pub fn with_css_family_names(&self) -> FontFamily {
        FontFamily {
            variants: self.variants.iter().map(Variant::with_css_family_name).collect(),
            main_variant: self.main_variant.with_css_family_name(),
            ..self.clone()
        }
    }

    fn main_variant_is_member(&self) -> bool {
        self.variants
            .iter()
            .any(|v| v.file_name == self.main_variant.file_name)
    }
}

/// Every family found in one run, ordered by display name.
///
/// Totals are derived from the family list on demand and cannot be set.
#[derive(Debug, Clone, PartialEq)]
pub struct Catalog {
    families: Vec<FontFamily>,
    last_updated: DateTime<Utc>,
}

impl Catalog {
    /// Sort `families` and stamp the current time.
    pub fn new(families: Vec<FontFamily>) -> Self {
        Self::with_timestamp(families, Utc::now())
    }

    pub fn with_timestamp(mut families: Vec<FontFamily>, last_updated: DateTime<Utc>) -> Self {
        sort_families(&mut families);
        Self {
            families,
            last_updated: last_updated.trunc_subsecs(3),
        }
    }

    pub fn families(&self) -> &[FontFamily] {
        &self.families
    }

    pub fn last_updated(&self) -> DateTime<Utc> {
        self.last_updated
    }

    pub fn total_fonts(&self) -> usize {
        self.families.iter().map(|f| f.variants.len()).sum()
    }

    pub fn total_families(&self) -> usize {
        self.families.len()
    }

    pub fn is_empty(&self) -> bool {
        self.families.is_empty()
    }

    /// Look up a family by its slug.
    pub fn family(&self, slug: &str) -> Option<&FontFamily> {
        self.families.iter().find(|f| f.slug == slug)
    }

    /// All slugs in catalog order.
    pub fn slugs(&self) -> Vec<&str> {
        self.families.iter().map(|f| f.slug.as_str()).collect()
    }

    /// New catalog whose variants carry generated CSS family names.
    pub fn with_css_family_names(&self) -> Catalog {
        Catalog {
            families: self
                .families
                .iter()
                .map(FontFamily::with_css_family_names)
                .collect(),
            last_updated: self.last_updated,
        }
    }
}

/// Case- and accent-insensitive by display name; the lowercased name,
/// exact name and slug keep the order total.
fn sort_families(families: &mut [FontFamily]) {
    families.sort_by_cached_key(|f| {
        (
            folded_sort_key(&f.display_name),
            f.display_name.to_lowercase(),
            f.display_name.clone(),
            f.slug.clone(),
        )
    });
}

/// Primary collation key: canonical decomposition with combining marks
/// dropped, then lowercased, so "Éclat" files next to "eclat".
pub fn folded_sort_key(name: &str) -> String {
    name.nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect()
}

/// On-disk shape of a catalog.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CatalogDocument {
    families: Vec<FontFamily>,
    total_fonts: usize,
    total_families: usize,
    #[serde(serialize_with = "serialize_timestamp")]
    last_updated: DateTime<Utc>,
}

fn serialize_timestamp<S>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_str(&ts.to_rfc3339_opts(SecondsFormat::Millis, true))
}

impl Serialize for Catalog {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        CatalogDocument {
            families: self.families.clone(),
            total_fonts: self.total_fonts(),
            total_families: self.total_families(),
            last_updated: self.last_updated,
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Catalog {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let doc = CatalogDocument::deserialize(deserializer)?;
        Catalog::try_from(doc).map_err(serde::de::Error::custom)
    }
}

impl TryFrom<CatalogDocument> for Catalog {
    type Error = anyhow::Error;

    fn try_from(doc: CatalogDocument) -> Result<Self> {
        let catalog = Catalog {
            families: doc.families,
            last_updated: doc.last_updated,
        };

        if doc.total_families != catalog.total_families() {
            return Err(anyhow!(
                "totalFamilies is {} but the catalog lists {} families",
                doc.total_families,
                catalog.total_families()
            ));
        }
        if doc.total_fonts != catalog.total_fonts() {
            return Err(anyhow!(
                "totalFonts is {} but the catalog lists {} variants",
                doc.total_fonts,
                catalog.total_fonts()
            ));
        }
        if let Some(family) = catalog
            .families
            .iter()
            .find(|f| f.variants.is_empty() || !f.main_variant_is_member())
        {
            return Err(anyhow!(
                "family {} has a mainVariant that is not one of its variants",
                family.slug
            ));
        }

        Ok(catalog)
    }
}

/// Knobs for a catalog build.
#[derive(Debug, Clone)]
pub struct BuildOptions {
    pub follow_symlinks: bool,
    /// Worker threads; `None` uses the global rayon pool.
    pub jobs: Option<usize>,
    pub preview_text: String,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            follow_symlinks: false,
            jobs: None,
            preview_text: DEFAULT_PREVIEW_TEXT.to_string(),
        }
    }
}

/// Turn one family directory into a family, or `None` if nothing usable
/// is in it. Unreadable files are logged and skipped.
pub fn build_family<R>(dir: &FamilyDirectory, reader: &R, preview_text: &str) -> Option<FontFamily>
where
    R: FontMetadataReader + ?Sized,
{
    if dir.fonts.is_empty() {
        warn!(directory = %dir.path.display(), "no font files found in directory");
        return None;
    }

    let mut variants = Vec::with_capacity(dir.fonts.len());
    for path in &dir.fonts {
        match load_variant(reader, path, &dir.name) {
            Ok(variant) => {
                debug!(file = %path.display(), label = %variant.name, "parsed font");
                variants.push(variant);
            }
            Err(err) => warn!(error = %err, "skipping font file"),
        }
    }

    if variants.is_empty() {
        warn!(directory = %dir.path.display(), "no valid font variants found in directory");
        return None;
    }

    let family = FontFamily::from_variants(&dir.name, variants, preview_text)?;
    info!(
        slug = %family.slug,
        family = %family.display_name,
        variants = family.variants.len(),
        "assembled family"
    );
    Some(family)
}

/// Scan `root/<family>/*` and assemble a sorted catalog.
///
/// Fails when the root is missing or when no family survives.
pub fn build_catalog<R>(root: &Path, opts: &BuildOptions, reader: &R) -> Result<Catalog>
where
    R: FontMetadataReader + ?Sized,
{
    let directories = PathDiscovery::new(root)
        .follow_symlinks(opts.follow_symlinks)
        .discover()?;
    debug!(root = %root.display(), directories = directories.len(), "discovered family directories");

    let run = || -> Vec<FontFamily> {
        directories
            .par_iter()
            .filter_map(|dir| build_family(dir, reader, &opts.preview_text))
            .collect()
    };

    let families = if let Some(jobs) = opts.jobs {
        let pool = ThreadPoolBuilder::new().num_threads(jobs).build()?;
        pool.install(run)
    } else {
        run()
    };

    if families.is_empty() {
        return Err(anyhow!("no font families found under {}", root.display()));
    }

    Ok(Catalog::new(families))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::{MemoryReader, RawFontMetadata};
    use crate::variant::variant_from_raw;
    use chrono::TimeZone;
    use proptest::prelude::*;
    use std::fs;
    use tempfile::tempdir;

    fn meta(family: &str, full: &str, weight: u16, italic: bool) -> RawFontMetadata {
        RawFontMetadata {
            family_name: Some(family.to_string()),
            full_name: Some(full.to_string()),
            postscript_name: Some(full.replace(' ', "-")),
            italic_angle: if italic { -10.0 } else { 0.0 },
            weight_class: Some(weight),
            width_class: Some(5),
        }
    }

    fn family(dir: &str, family_name: &str, files: &[(&str, u16)]) -> FontFamily {
        let variants = files
            .iter()
            .map(|(file, weight)| {
                variant_from_raw(
                    meta(family_name, &format!("{family_name} {file}"), *weight, false),
                    &format!("{file}.ttf"),
                    dir,
                )
            })
            .collect();
        FontFamily::from_variants(dir, variants, DEFAULT_PREVIEW_TEXT).expect("family")
    }

    #[test]
    fn family_resolves_name_category_and_main_variant() {
        let fam = family("foo", "Foo Sans", &[("Light", 300), ("Regular", 400), ("Bold", 700)]);

        assert_eq!(fam.id(), "foo");
        assert_eq!(fam.slug(), "foo");
        assert_eq!(fam.display_name(), "Foo Sans");
        assert_eq!(fam.category(), Category::SansSerif);
        assert_eq!(fam.main_variant().file_name, "Regular.ttf");
        assert_eq!(fam.preview_text(), DEFAULT_PREVIEW_TEXT);
    }

    #[test]
    fn empty_variant_list_is_not_a_family() {
        assert!(FontFamily::from_variants("empty", Vec::new(), DEFAULT_PREVIEW_TEXT).is_none());
    }

    #[test]
    fn catalog_sorts_case_insensitively() {
        let catalog = Catalog::new(vec![
            family("c", "charlie", &[("Regular", 400)]),
            family("a", "Bravo", &[("Regular", 400)]),
            family("b", "alpha", &[("Regular", 400)]),
        ]);

        let names: Vec<&str> = catalog.families().iter().map(|f| f.display_name()).collect();
        assert_eq!(names, vec!["alpha", "Bravo", "charlie"]);
    }

    #[test]
    fn accented_names_sort_with_their_base_letters() {
        let catalog = Catalog::new(vec![
            family("zed", "Zed", &[("Regular", 400)]),
            family("eclat", "Éclat", &[("Regular", 400)]),
            family("apple", "apple", &[("Regular", 400)]),
            family("edge", "edge", &[("Regular", 400)]),
        ]);

        let names: Vec<&str> = catalog.families().iter().map(|f| f.display_name()).collect();
        assert_eq!(names, vec!["apple", "Éclat", "edge", "Zed"]);
    }

    #[test]
    fn sort_key_folds_case_and_accents() {
        assert_eq!(folded_sort_key("Éclat"), "eclat");
        assert_eq!(folded_sort_key("Ångström Sans"), "angstrom sans");
        assert_eq!(folded_sort_key("plain"), "plain");
    }

    #[test]
    fn totals_follow_the_family_list() {
        let catalog = Catalog::new(vec![
            family("a", "Alpha", &[("Regular", 400), ("Bold", 700)]),
            family("b", "Beta", &[("Regular", 400)]),
        ]);

        assert_eq!(catalog.total_families(), 2);
        assert_eq!(catalog.total_fonts(), 3);
        assert_eq!(catalog.slugs(), vec!["a", "b"]);
        assert_eq!(catalog.family("b").map(|f| f.display_name()), Some("Beta"));
        assert!(catalog.family("zzz").is_none());
    }

    #[test]
    fn enrichment_covers_main_variant_and_leaves_source_untouched() {
        let catalog = Catalog::new(vec![family("a", "Alpha", &[("Regular", 400)])]);
        let enriched = catalog.with_css_family_names();

        let fam = &enriched.families()[0];
        assert_eq!(fam.variants()[0].css_family_name.as_deref(), Some("Alpha-Regular"));
        assert_eq!(fam.main_variant().css_family_name.as_deref(), Some("Alpha-Regular"));
        assert!(catalog.families()[0].variants()[0].css_family_name.is_none());
        assert_eq!(enriched.last_updated(), catalog.last_updated());
    }

    #[test]
    fn json_round_trip_is_exact() {
        let ts = Utc.with_ymd_and_hms(2026, 10, 19, 8, 30, 0).unwrap();
        let catalog = Catalog::with_timestamp(
            vec![family("a", "Alpha", &[("Regular", 400), ("Bold", 700)])],
            ts,
        )
        .with_css_family_names();

        let json = serde_json::to_string(&catalog).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["totalFonts"], 2);
        assert_eq!(value["totalFamilies"], 1);
        assert_eq!(value["lastUpdated"], "2026-10-19T08:30:00.000Z");
        assert_eq!(value["families"][0]["mainVariant"]["fileName"], "Regular.ttf");

        let back: Catalog = serde_json::from_str(&json).unwrap();
        assert_eq!(back, catalog);
    }

    #[test]
    fn drifted_totals_are_rejected() {
        let catalog = Catalog::new(vec![family("a", "Alpha", &[("Regular", 400)])]);
        let mut value = serde_json::to_value(&catalog).unwrap();
        value["totalFonts"] = serde_json::json!(7);

        let err = serde_json::from_value::<Catalog>(value).unwrap_err();
        assert!(err.to_string().contains("totalFonts"));
    }

    #[test]
    fn foreign_main_variant_is_rejected() {
        let catalog = Catalog::new(vec![family("a", "Alpha", &[("Regular", 400)])]);
        let mut value = serde_json::to_value(&catalog).unwrap();
        value["families"][0]["mainVariant"]["fileName"] = serde_json::json!("Other.ttf");

        assert!(serde_json::from_value::<Catalog>(value).is_err());
    }

    #[test]
    fn build_family_skips_unreadable_files() {
        let tmp = tempdir().expect("tempdir");
        let dir = FamilyDirectory {
            name: "foo".into(),
            path: tmp.path().to_path_buf(),
            fonts: vec![tmp.path().join("Foo-Regular.ttf"), tmp.path().join("Broken.ttf")],
        };
        let reader = MemoryReader::new().with_entry("Foo-Regular.ttf", meta("Foo", "Foo Regular", 400, false));

        let fam = build_family(&dir, &reader, DEFAULT_PREVIEW_TEXT).expect("family");
        assert_eq!(fam.variants().len(), 1);
        assert_eq!(fam.variants()[0].file_path, "/foo/Foo-Regular.ttf");
    }

    #[test]
    fn build_family_without_readable_fonts_is_skipped() {
        let dir = FamilyDirectory {
            name: "broken".into(),
            path: "/nowhere/broken".into(),
            fonts: vec!["/nowhere/broken/a.ttf".into()],
        };
        assert!(build_family(&dir, &MemoryReader::new(), DEFAULT_PREVIEW_TEXT).is_none());

        let empty = FamilyDirectory {
            name: "empty".into(),
            path: "/nowhere/empty".into(),
            fonts: Vec::new(),
        };
        assert!(build_family(&empty, &MemoryReader::new(), DEFAULT_PREVIEW_TEXT).is_none());
    }

    #[test]
    fn build_catalog_respects_jobs_and_fails_when_empty() {
        let tmp = tempdir().expect("tempdir");
        let root = tmp.path();
        fs::create_dir_all(root.join("docs")).unwrap();
        fs::write(root.join("docs/readme.txt"), b"").unwrap();

        let reader = MemoryReader::new();
        let err = build_catalog(root, &BuildOptions::default(), &reader).unwrap_err();
        assert!(err.to_string().contains("no font families"));

        fs::create_dir_all(root.join("foo")).unwrap();
        fs::write(root.join("foo/Foo-Bold.otf"), b"").unwrap();
        let reader = reader.with_entry("Foo-Bold.otf", meta("Foo", "Foo Bold", 700, false));
        let opts = BuildOptions {
            jobs: Some(2),
            ..BuildOptions::default()
        };

        let catalog = build_catalog(root, &opts, &reader).expect("catalog");
        assert_eq!(catalog.slugs(), vec!["foo"]);
        assert_eq!(catalog.families()[0].main_variant().name, "Bold");
    }

    proptest! {
        #[test]
        fn ordering_and_totals_hold_for_any_input(
            specs in prop::collection::vec(("[A-Za-zÀ-ÿ]{1,8}", 1usize..4), 1..8)
        ) {
            let families: Vec<FontFamily> = specs
                .iter()
                .enumerate()
                .map(|(i, (name, count))| {
                    let files: Vec<(String, u16)> =
                        (0..*count).map(|n| (format!("W{n}"), 100 * (n as u16 + 1))).collect();
                    let refs: Vec<(&str, u16)> = files.iter().map(|(f, w)| (f.as_str(), *w)).collect();
                    family(&format!("dir{i}"), name, &refs)
                })
                .collect();
            let expected_fonts: usize = specs.iter().map(|(_, c)| *c).sum();

            let catalog = Catalog::new(families);

            prop_assert_eq!(catalog.total_families(), specs.len());
            prop_assert_eq!(catalog.total_fonts(), expected_fonts);
            for pair in catalog.families().windows(2) {
                prop_assert!(
                    folded_sort_key(pair[0].display_name()) <= folded_sort_key(pair[1].display_name())
                );
            }
        }
    }
}
