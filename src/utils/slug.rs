//! Package slug derivation
//!
//! The slug names the add-on's chrome package (`chrome://<slug>/...`) and
//! prefixes its preferences, so it must stay within `[a-z0-9_]`.

use serde::{Deserialize, Serialize};

/// Slug used when nothing usable survives slugification
pub const FALLBACK_SLUG: &str = "addon";

/// Historical cap applied to slugs
pub const DEFAULT_SLUG_MAX_LEN: usize = 50;

/// Prepended to slugs that cannot start an identifier
pub const IDENTIFIER_PREFIX: &str = "addon_";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlugOptions {
    /// Maximum slug length in characters; `None` leaves it uncapped
    pub max_len: Option<usize>,
}

impl Default for SlugOptions {
    fn default() -> Self {
        Self {
            max_len: Some(DEFAULT_SLUG_MAX_LEN),
        }
    }
}

impl SlugOptions {
    pub fn uncapped() -> Self {
        Self { max_len: None }
    }
}

/// Derive a package slug from an add-on name or an explicit package name.
///
/// A non-blank `explicit` value takes precedence over `name`. The source is
/// lower-cased and trimmed, spaces and hyphens become underscores and every
/// other character outside `[a-z0-9_]` is dropped. A result with no
/// alphanumeric character left falls back to [`FALLBACK_SLUG`].
pub fn slugify(name: &str, explicit: Option<&str>, options: &SlugOptions) -> String {
    let source = explicit
        .filter(|value| !value.trim().is_empty())
        .unwrap_or(name);

    let mut slug: String = source
        .to_lowercase()
        .trim()
        .chars()
        .map(|c| if c == ' ' || c == '-' { '_' } else { c })
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect();

    if let Some(max_len) = options.max_len {
        // Only ASCII survives the filter, so byte and char lengths agree.
        slug.truncate(max_len);
    }

    if !slug.chars().any(|c| c.is_ascii_alphanumeric()) {
        return FALLBACK_SLUG.to_string();
    }

    slug
}

/// True when `slug` only holds characters a chrome package name may use
pub fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}

/// The slug in a form usable as a JavaScript identifier and an XML name.
///
/// Slugs may start with a digit, which neither allows; those get
/// [`IDENTIFIER_PREFIX`]. Anything else is returned unchanged.
pub fn identifier(slug: &str) -> String {
    match slug.chars().next() {
        Some(c) if c.is_ascii_digit() => format!("{}{}", IDENTIFIER_PREFIX, slug),
        _ => slug.to_string(),
    }
}
