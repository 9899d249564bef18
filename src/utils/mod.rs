//! Helper utilities

pub mod slug;

pub use slug::{
    identifier, is_valid_slug, slugify, SlugOptions, DEFAULT_SLUG_MAX_LEN, FALLBACK_SLUG,
    IDENTIFIER_PREFIX,
};
