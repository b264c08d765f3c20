//! Name heuristics: variant labels, canonical family names, CSS identifiers.
//!
//! These are best-effort rewrites over free-text vendor metadata. They are
//! tuned for the common "Family + weight/style suffix" convention and are
//! not expected to be right for every foundry.

use std::collections::HashMap;

use crate::rules::{
    apply_all, collapse_whitespace, FAMILY_NOISE, LABEL_CLEANUP, LABEL_SPELLING, TRIAL_MARKER,
    WEIGHT_KEYWORD,
};
use crate::variant::{file_stem, Variant};

/// Label used when nothing is left after stripping the family name.
pub const DEFAULT_LABEL: &str = "Regular";

/// Fallback family name for an empty name list.
pub const UNKNOWN_FAMILY: &str = "Unknown";

/// Derive a short label ("Bold Italic") from a full name and its family name.
///
/// ```
/// use fontshelf_core::naming::variant_label;
///
/// assert_eq!(variant_label("CopernicusTrial Bold Italic", "Copernicus"), "Bold Italic");
/// assert_eq!(variant_label("FooTrial Regular", "Foo"), "Regular");
/// ```
pub fn variant_label(full_name: &str, family_name: &str) -> String {
    let full = TRIAL_MARKER.apply(full_name).trim().to_string();
    let family = TRIAL_MARKER.apply(family_name).trim().to_string();

    let base = WEIGHT_KEYWORD.apply_once(&family).trim().to_string();
    let mut label = full.replacen(&base, "", 1).trim().to_string();

    for rule in LABEL_CLEANUP.iter() {
        label = rule.apply(&label).trim().to_string();
    }
    for rule in LABEL_SPELLING.iter() {
        label = rule.apply_once(&label).into_owned();
    }

    if label.is_empty() {
        DEFAULT_LABEL.to_string()
    } else {
        label
    }
}

/// Strip release, weight, style, width and digit noise from one family name.
pub fn clean_family_name(name: &str) -> String {
    collapse_whitespace(&apply_all(&FAMILY_NOISE, name))
}

/// Pick one canonical base family name for a directory's worth of files.
///
/// The most frequent cleaned name wins; ties go to the one seen first. When
/// every cleaned name is empty the first raw name is returned unchanged.
pub fn resolve_family_name<S: AsRef<str>>(family_names: &[S]) -> String {
    let Some(first) = family_names.first() else {
        return UNKNOWN_FAMILY.to_string();
    };

    let mut order: Vec<String> = Vec::new();
    let mut counts: HashMap<String, usize> = HashMap::new();
    for name in family_names {
        let cleaned = clean_family_name(name.as_ref());
        if cleaned.is_empty() {
            continue;
        }
        let count = counts.entry(cleaned.clone()).or_insert(0);
        if *count == 0 {
            order.push(cleaned);
        }
        *count += 1;
    }

    let mut best: Option<(&String, usize)> = None;
    for name in &order {
        let count = counts[name];
        if best.map_or(true, |(_, c)| count > c) {
            best = Some((name, count));
        }
    }

    match best {
        Some((name, _)) => name.clone(),
        None => first.as_ref().to_string(),
    }
}

/// Stylesheet identifier for one variant: PostScript name, else file stem,
/// with all whitespace removed.
pub fn css_family_name(variant: &Variant) -> String {
    let base = if variant.postscript_name.trim().is_empty() {
        file_stem(&variant.file_name)
    } else {
        variant.postscript_name.as_str()
    };
    base.chars().filter(|c| !c.is_whitespace()).collect()
}
