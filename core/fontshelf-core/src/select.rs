//! Main variant selection.

use std::cmp::Ordering;

use crate::variant::{FontStyle, Variant};

fn style_rank(style: FontStyle) -> u8 {
    match style {
        FontStyle::Normal => 0,
        _ => 1,
    }
}

/// Order by weight ascending, upright before slanted. Stable otherwise.
fn display_order(a: &Variant, b: &Variant) -> Ordering {
    a.weight
        .cmp(&b.weight)
        .then_with(|| style_rank(a.style).cmp(&style_rank(b.style)))
}

/// Pick the variant that represents the family.
///
/// Preference: 400 upright, then 500 upright, then the lightest variant
/// (upright first). Returns `None` only for an empty slice.
pub fn select_main_variant(variants: &[Variant]) -> Option<&Variant> {
    let mut sorted: Vec<&Variant> = variants.iter().collect();
    sorted.sort_by(|a, b| display_order(a, b));

    let upright_at = |weight: u16| {
        sorted
            .iter()
            .copied()
            .find(|v| v.weight == weight && v.style == FontStyle::Normal)
    };

    upright_at(400)
        .or_else(|| upright_at(500))
        .or_else(|| sorted.first().copied())
}
