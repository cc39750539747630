//! Name canonicalization.

/// Reduce a raw name to its comparison key.
///
/// Lower-cases, folds `ё` into `е` and drops every character outside
/// `a-z` and Cyrillic `а-я` (digits, punctuation and whitespace included).
pub fn normalize(raw: &str) -> String {
    raw.chars()
        .flat_map(char::to_lowercase)
        .map(|c| if c == 'ё' { 'е' } else { c })
        .filter(|c| c.is_ascii_lowercase() || ('а'..='я').contains(c))
        .collect()
}

/// Split a raw name into its non-empty parts (surname first).
///
/// Parts are separated by whitespace and dots so that compact initials
/// such as `И.П.` become two parts.
pub fn name_parts(raw: &str) -> Vec<&str> {
    raw.split(|c: char| c.is_whitespace() || c == '.')
        .filter(|part| !normalize(part).is_empty())
        .collect()
}

/// Normalized surname (first part) of a raw name, or empty.
pub fn surname_key(raw: &str) -> String {
    name_parts(raw).first().map(|s| normalize(s)).unwrap_or_default()
}
