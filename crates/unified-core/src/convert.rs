/// Sub-guidance conversion: turn an ordered list of raw sub-requirement entries into
/// labelled, cleaned [`SubGuidanceItem`]s.
///
/// Pure and infallible. Entries of unrecognised shape fall back to their JSON text, and
/// text that cleans down to almost nothing is replaced with a deterministic placeholder.
use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};

use crate::model::{GuidanceStatus, SubGuidanceItem, SubRequirementEntry};

/// Provenance tag for items imported from already-validated mapping content.
pub const IMPORTED_SOURCE: &str = "Existing Compliance Requirements";

/// Cleaned content shorter than this many characters is replaced by a placeholder.
pub const MIN_CONTENT_CHARS: usize = 10;

/// Object fields probed for an entry's text, highest priority first.
pub const TEXT_FIELDS: [&str; 6] = [
    "content",
    "text",
    "requirement",
    "description",
    "guidance",
    "details",
];

static BLANK_LINE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n\s*\n").expect("valid regex"));

/// Convert `entries` for `category_name`, labelling them by position.
pub fn convert_sub_requirements(
    entries: &[SubRequirementEntry],
    category_name: &str,
) -> Vec<SubGuidanceItem> {
    let slug = category_slug(category_name);

    entries
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            let label = sub_requirement_label(index);
            let cleaned = clean_content(&entry_text(entry));

            let needs_enrichment = cleaned.chars().count() < MIN_CONTENT_CHARS;
            let content = if needs_enrichment {
                placeholder_content(category_name, &label)
            } else {
                cleaned
            };

            SubGuidanceItem {
                id: format!("{slug}-sub-{index}"),
                label,
                content,
                sources: vec![IMPORTED_SOURCE.to_string()],
                confidence: 1.0,
                status: GuidanceStatus::Approved,
                needs_enrichment,
            }
        })
        .collect()
}

/// Label for the entry at `index`: "a)" … "z)", then "aa)", "ab)", … "zz)", "aaa)".
pub fn sub_requirement_label(index: usize) -> String {
    let mut letters = Vec::new();
    let mut n = index + 1;
    while n > 0 {
        n -= 1;
        letters.push(char::from(b'a' + (n % 26) as u8));
        n /= 26;
    }
    letters.iter().rev().chain(std::iter::once(&')')).collect()
}

/// Raw text of an entry, before cleaning.
fn entry_text(entry: &SubRequirementEntry) -> String {
    match entry {
        SubRequirementEntry::Text(text) => text.clone(),
        SubRequirementEntry::Fields(fields) => {
            probe_text_fields(fields).unwrap_or_else(|| serialize_entry(entry))
        }
        SubRequirementEntry::Raw(_) => serialize_entry(entry),
    }
}

/// First non-blank string value among [`TEXT_FIELDS`].
fn probe_text_fields(fields: &Map<String, Value>) -> Option<String> {
    TEXT_FIELDS.iter().find_map(|name| {
        fields
            .get(*name)
            .and_then(Value::as_str)
            .filter(|text| !text.trim().is_empty())
            .map(str::to_string)
    })
}

fn serialize_entry(entry: &SubRequirementEntry) -> String {
    serde_json::to_string(entry).unwrap_or_default()
}

/// Remove `*`/`**` emphasis markers, collapse runs of blank lines into a single
/// newline, and trim.
pub fn clean_content(raw: &str) -> String {
    let unmarked = raw.replace('*', "");
    BLANK_LINE_RUN
        .replace_all(&unmarked, "\n")
        .trim()
        .to_string()
}

fn placeholder_content(category_name: &str, label: &str) -> String {
    format!(
        "Placeholder content for {category_name} requirement {label}.\n\
         This sub-requirement has no usable source text yet and needs to be enriched \
         with implementation detail before review."
    )
}

fn category_slug(category_name: &str) -> String {
    let mut out = String::with_capacity(category_name.len());
    let mut last_dash = false;
    for ch in category_name.chars() {
        let lc = ch.to_ascii_lowercase();
        if lc.is_ascii_alphanumeric() {
            out.push(lc);
            last_dash = false;
        } else if !last_dash {
            out.push('-');
            last_dash = true;
        }
    }
    let slug = out.trim_matches('-');
    if slug.is_empty() {
        "category".to_string()
    } else {
        slug.to_string()
    }
}
