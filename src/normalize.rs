// 🔤 Normalization helpers
// One equivalence for credentials, shared by the comparator, the tally and the catalog

/// Normalized key of a credential literal: periods removed, upper-cased.
///
/// `"Ed.D."`, `"EdD"` and `"edd"` all map to `"EDD"`.
pub fn normalized_key(literal: &str) -> String {
    literal.replace('.', "").to_uppercase()
}

/// Strip periods and spaces from a comma fragment (`"M. B. A."` -> `"MBA"`)
pub fn compact_fragment(fragment: &str) -> String {
    fragment.chars().filter(|c| *c != '.' && *c != ' ').collect()
}

/// Whitespace-separated words of a field
pub fn words(text: &str) -> Vec<&str> {
    text.split_whitespace().collect()
}

/// Last whitespace-separated word, if any
pub fn last_word(text: &str) -> Option<&str> {
    text.split_whitespace().last()
}

/// Everything after the first comma, split on further commas and trimmed.
/// Returns nothing when the text has no comma.
pub fn comma_suffix_fragments(text: &str) -> Vec<&str> {
    match text.split_once(',') {
        Some((_, rest)) => rest.split(',').map(str::trim).collect(),
        None => Vec::new(),
    }
}
