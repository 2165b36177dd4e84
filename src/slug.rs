//! URL-safe identifiers for artists, albums and tracks.
//!
//! Slugs are ASCII-only: names are transliterated, lower-cased, and runs of
//! punctuation or whitespace collapse to a single hyphen. Uniqueness against
//! the store is handled by [`crate::db`], which calls [`with_suffix`] when a
//! base slug is taken or numeric-only.

use rand::Rng;

/// Length of the random token used for empty slugs and collision suffixes.
pub const TOKEN_LEN: usize = 6;

const TOKEN_CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Build the base slug for `text`.
///
/// Text that transliterates to nothing (empty, punctuation-only) yields a
/// random [`TOKEN_LEN`]-character token instead, so the result is never empty.
pub fn slugify(text: &str) -> String {
    let slug = ::slug::slugify(text);
    if slug.is_empty() {
        random_token(TOKEN_LEN)
    } else {
        slug
    }
}

/// Whether a slug would be mistaken for a numeric id in URLs.
pub fn is_numeric_only(slug: &str) -> bool {
    !slug.is_empty() && slug.bytes().all(|b| b.is_ascii_digit())
}

/// Append a random suffix to a slug that is taken or numeric-only.
pub fn with_suffix(slug: &str) -> String {
    format!("{}-{}", slug, random_token(TOKEN_LEN))
}

/// Random lower-case alphanumeric token.
pub fn random_token(len: usize) -> String {
    let mut rng = rand::rng();
    (0..len)
        .map(|_| TOKEN_CHARSET[rng.random_range(0..TOKEN_CHARSET.len())] as char)
        .collect()
}
