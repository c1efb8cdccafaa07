//! Text normalization for duplicate detection.

/// Normalize a text fragment for use in a composite dedup key.
///
/// Lower-cases, truncates at the first comma, strips everything outside
/// word characters, spaces, and hyphens, collapses whitespace runs, and
/// trims. Total: any input (including empty) produces a valid fragment.
///
/// Truncating at the comma makes "Los Angeles, CA" and "Los Angeles"
/// normalize identically; searches are already radius-filtered, so two
/// distinct cities with the same name are not a concern.
pub fn normalize(text: &str) -> String {
    let truncated = text.split(',').next().unwrap_or("");
    let stripped: String = truncated
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_' || *c == '-' || c.is_whitespace())
        .collect();
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}
