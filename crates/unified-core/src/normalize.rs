/// Category name normalisation and lookup against the mapping list.
use std::sync::LazyLock;

use regex::Regex;

use crate::model::CategoryMapping;

// "8. ", "8.1 ", "8.1.2. " and repeats of them.
static ORDINAL_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:\d+\.(?:\d+\.?)*\s*)+").expect("valid regex"));

/// Strip leading ordinal prefixes ("8. Asset Management" → "Asset Management").
///
/// No case folding. Idempotent, and names without a leading "N." are returned unchanged.
pub fn normalize_category(name: &str) -> String {
    ORDINAL_PREFIX.replace(name, "").into_owned()
}

/// The key two category names are compared on: normalised, trimmed, inner whitespace
/// collapsed and ASCII case folded.
pub fn category_match_key(name: &str) -> String {
    normalize_category(name.trim())
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_ascii_lowercase()
}

/// Find the mapping whose category matches `requested`. `None` is an ordinary outcome.
pub fn find_mapping<'a>(
    mappings: &'a [CategoryMapping],
    requested: &str,
) -> Option<&'a CategoryMapping> {
    let wanted = category_match_key(requested);
    mappings
        .iter()
        .find(|mapping| category_match_key(&mapping.category) == wanted)
}
