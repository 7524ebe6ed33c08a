//! Tag set helpers.
//!
//! Tags (skills, categories, locations) keep the spelling they were entered
//! with but compare case-insensitively.

use std::collections::BTreeSet;

/// Trim, drop empties and de-duplicate (case-insensitively, first spelling wins).
pub fn normalize<I, S>(tags: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out = BTreeSet::new();
    for tag in tags {
        let tag = tag.as_ref().trim();
        if tag.is_empty() || out.iter().any(|t: &String| t.eq_ignore_ascii_case(tag)) {
            continue;
        }
        out.insert(tag.to_string());
    }
    out
}

/// Any-of: at least one needle is present in the haystack.
pub fn intersects(haystack: &BTreeSet<String>, needles: &BTreeSet<String>) -> bool {
    needles
        .iter()
        .any(|n| haystack.iter().any(|h| h.eq_ignore_ascii_case(n)))
}

/// All-of: every needle is present in the haystack.
pub fn contains_all(haystack: &BTreeSet<String>, needles: &BTreeSet<String>) -> bool {
    needles
        .iter()
        .all(|n| haystack.iter().any(|h| h.eq_ignore_ascii_case(n)))
}

/// Case-insensitive substring match.
pub fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}
