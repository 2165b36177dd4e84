//! Internal domain models for enrichment.
//!
//! These types don't change when the remote API changes. Responses get
//! converted into them by the provider's adapter.

use chrono::{Datelike, NaiveDateTime};

/// Date format of remote release dates, e.g. `"15 Jun 2009, 00:00"`.
pub const RELEASE_DATE_FORMAT: &str = "%d %b %Y, %H:%M";

/// Album details obtained from a remote service
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AlbumInfo {
    /// Raw release date as published by the service
    pub release_date: Option<String>,
    /// Cover image URL
    pub cover_url: Option<String>,
}

impl AlbumInfo {
    /// Year of [`AlbumInfo::release_date`], if present and well-formed.
    pub fn release_year(&self) -> Option<i32> {
        self.release_date.as_deref().and_then(parse_release_year)
    }
}

/// Parse a remote release date in [`RELEASE_DATE_FORMAT`] and return its year.
pub fn parse_release_year(date: &str) -> Option<i32> {
    NaiveDateTime::parse_from_str(date.trim(), RELEASE_DATE_FORMAT)
        .ok()
        .map(|d| d.year())
}

/// Errors that can occur during enrichment
#[derive(Debug, Clone, thiserror::Error)]
pub enum EnrichmentError {
    #[error("API request failed: {0}")]
    ApiError(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Failed to parse response: {0}")]
    Parse(String),

    #[error("Not found")]
    NotFound,

    #[error("Rate limited - try again later")]
    RateLimited,
}
