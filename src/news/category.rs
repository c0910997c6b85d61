use tracing::warn;

/// Topic identifiers accepted by the upstream API.
pub const VALID_CATEGORIES: &[&str] = &[
    "world",
    "nation",
    "politics",
    "business",
    "technology",
    "entertainment",
    "sports",
    "science",
    "health",
];

/// Fallback topic for unrecognized category strings.
pub const DEFAULT_CATEGORY: &str = "general";

/// Normalize a UI-supplied category to an upstream topic identifier.
///
/// Matching is case-insensitive and ignores surrounding whitespace.
/// Unrecognized input falls back to [`DEFAULT_CATEGORY`] so arbitrary
/// strings never reach the external API.
pub fn normalize(category: &str) -> &'static str {
    let trimmed = category.trim();

    for valid in VALID_CATEGORIES {
        if trimmed.eq_ignore_ascii_case(valid) {
            return valid;
        }
    }

    warn!(
        "Unrecognized category '{}', falling back to '{}'",
        category, DEFAULT_CATEGORY
    );
    DEFAULT_CATEGORY
}
