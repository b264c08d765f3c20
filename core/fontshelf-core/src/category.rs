//! Coarse style buckets derived from a family name.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    Serif,
    SansSerif,
    Monospace,
    Display,
}

impl Category {
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Serif => "serif",
            Category::SansSerif => "sans-serif",
            Category::Monospace => "monospace",
            Category::Display => "display",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Substring rules in precedence order; first hit wins.
const RULES: &[(&[&str], Category)] = &[
    (&["mono", "code", "courier"], Category::Monospace),
    (&["sans"], Category::SansSerif),
    (&["display", "decorative"], Category::Display),
];

/// Classify a canonical family name. Anything unmatched is a serif.
pub fn classify(family_name: &str) -> Category {
    let lower = family_name.to_lowercase();
    RULES
        .iter()
        .find(|(needles, _)| needles.iter().any(|n| lower.contains(n)))
        .map(|(_, category)| *category)
        .unwrap_or(Category::Serif)
}
