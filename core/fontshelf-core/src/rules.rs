//! Ordered rewrite tables for vendor font names.
//!
//! Each table is applied top to bottom; order matters because earlier rules
//! consume text later ones would otherwise match (`Extra Light` before
//! `Light`, `Condensed` before `Cond`).

use std::borrow::Cow;

use lazy_static::lazy_static;
use regex::Regex;

/// A named `(pattern, replacement)` pair.
#[derive(Debug)]
pub struct RewriteRule {
    pub name: &'static str,
    pattern: Regex,
    replacement: &'static str,
}

impl RewriteRule {
    fn new(name: &'static str, pattern: &str, replacement: &'static str) -> Self {
        Self {
            name,
            pattern: Regex::new(pattern).unwrap(),
            replacement,
        }
    }

    /// Replace every match.
    pub fn apply<'t>(&self, text: &'t str) -> Cow<'t, str> {
        self.pattern.replace_all(text, self.replacement)
    }

    /// Replace the leftmost match only.
    pub fn apply_once<'t>(&self, text: &'t str) -> Cow<'t, str> {
        self.pattern.replace(text, self.replacement)
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.pattern.is_match(text)
    }
}

/// Run every rule of `table` over `text`, replacing all matches.
pub fn apply_all(table: &[RewriteRule], text: &str) -> String {
    table
        .iter()
        .fold(text.to_string(), |acc, rule| rule.apply(&acc).into_owned())
}

/// Collapse whitespace runs to single spaces and trim.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

lazy_static! {
    /// `Trial` marker as stripped from full and family names before labelling.
    pub static ref TRIAL_MARKER: RewriteRule =
        RewriteRule::new("trial", r"(?i)\s*Trial\s*", " ");

    /// First weight keyword in a family name, removed to approximate the
    /// family's base token.
    pub static ref WEIGHT_KEYWORD: RewriteRule = RewriteRule::new(
        "weight-keyword",
        r"(?i)(Thin|Hairline|Extra ?Light|Ultra ?Light|Light|Book|Regular|Normal|Medium|Semi ?bold|Demi ?bold|Bold|Extra ?bold|Ultra ?bold|Black|Heavy|Ultra)",
        "",
    );

    /// Cleanup applied to the remainder of a full name, in order.
    pub static ref LABEL_CLEANUP: Vec<RewriteRule> = vec![
        RewriteRule::new("leading-separators", r"^[-_\s]+", ""),
        RewriteRule::new("beta-suffix", r"(?i)\s*Beta\s*\d+", ""),
        RewriteRule::new("digit-runs", r"\s*\d+\s*", ""),
    ];

    /// Spelling normalisation for compound weights; first occurrence only.
    pub static ref LABEL_SPELLING: Vec<RewriteRule> = vec![
        RewriteRule::new("extrabold", r"(?i)Extra ?bold", "Extrabold"),
        RewriteRule::new("semibold", r"(?i)Semi ?bold", "Semibold"),
    ];

    /// Everything that is not part of a family's base name, in stripping order.
    pub static ref FAMILY_NOISE: Vec<RewriteRule> = {
        let mut rules = Vec::new();
        let words: &[(&'static str, &str)] = &[
            // release markers
            ("trial", r"Trial"),
            ("beta", r"Beta\s*\d*"),
            ("test", r"Test"),
            ("demo", r"Demo"),
            // weights
            ("thin", r"Thin"),
            ("hairline", r"Hairline"),
            ("ultra-light", r"Ultra\s*Light"),
            ("extra-light", r"Extra\s*Light"),
            ("light", r"Light"),
            ("book", r"Book"),
            ("regular", r"Regular"),
            ("normal", r"Normal"),
            ("roman", r"Roman"),
            ("medium", r"Medium"),
            ("semibold", r"Semi\s*bold"),
            ("demibold", r"Demi\s*bold"),
            ("bold", r"Bold"),
            ("extrabold", r"Extra\s*bold"),
            ("ultrabold", r"Ultra\s*bold"),
            ("black", r"Black"),
            ("heavy", r"Heavy"),
            ("ultra", r"Ultra"),
            ("fat", r"Fat"),
            // styles
            ("italic", r"Italic"),
            ("oblique", r"Oblique"),
            ("slanted", r"Slanted"),
            // widths
            ("condensed", r"Condensed"),
            ("cond", r"Cond"),
            ("compressed", r"Compressed"),
            ("narrow", r"Narrow"),
            ("extended", r"Extended"),
            ("expanded", r"Expanded"),
            ("wide", r"Wide"),
        ];
        for &(name, word) in words {
            rules.push(RewriteRule::new(name, &format!(r"(?i)\s*{word}\s*"), " "));
        }
        // weight numbers such as "170" or "070"
        rules.push(RewriteRule::new("digits", r"\s*\d+\s*", " "));
        rules
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule<'a>(table: &'a [RewriteRule], name: &str) -> &'a RewriteRule {
        table.iter().find(|r| r.name == name).expect("rule present")
    }

    #[test]
    fn trial_marker_is_case_insensitive() {
        assert_eq!(TRIAL_MARKER.apply("FooTRIAL Bold").trim(), "Foo Bold");
        assert_eq!(TRIAL_MARKER.apply("Foo trial").trim(), "Foo");
    }

    #[test]
    fn weight_keyword_strips_only_the_first_match() {
        assert_eq!(WEIGHT_KEYWORD.apply_once("Foo Bold Black"), "Foo  Black");
        assert_eq!(WEIGHT_KEYWORD.apply_once("Foo ExtraLight"), "Foo ");
        assert_eq!(WEIGHT_KEYWORD.apply_once("Copernicus"), "Copernicus");
    }

    #[test]
    fn label_cleanup_rules_are_independent() {
        assert_eq!(rule(&LABEL_CLEANUP, "leading-separators").apply("-_ Bold"), "Bold");
        assert_eq!(rule(&LABEL_CLEANUP, "beta-suffix").apply("Bold Beta 2"), "Bold");
        assert_eq!(rule(&LABEL_CLEANUP, "digit-runs").apply("Bold 170"), "Bold");
    }

    #[test]
    fn compound_widths_are_stripped_before_their_prefixes() {
        let condensed = rule(&FAMILY_NOISE, "condensed");
        let cond = rule(&FAMILY_NOISE, "cond");
        let c_pos = FAMILY_NOISE.iter().position(|r| r.name == "condensed");
        let p_pos = FAMILY_NOISE.iter().position(|r| r.name == "cond");
        assert!(c_pos < p_pos);
        assert!(condensed.is_match("Foo Condensed"));
        assert!(cond.is_match("Foo Cond"));
    }

    #[test]
    fn family_noise_ends_with_digit_rule() {
        assert_eq!(FAMILY_NOISE.last().map(|r| r.name), Some("digits"));
        assert_eq!(collapse_whitespace(&apply_all(&FAMILY_NOISE, "Foo170 Bold")), "Foo");
    }

    #[test]
    fn collapse_whitespace_trims_and_joins() {
        assert_eq!(collapse_whitespace("  Foo   Bar \t"), "Foo Bar");
        assert_eq!(collapse_whitespace("   "), "");
    }
}
