//! Last.fm API Data Transfer Objects
//!
//! These types match what `artist.getInfo` and `album.getInfo` return with
//! `format=json`. Only the fields we read are declared; serde ignores the
//! rest. Do not use these types outside the lastfm module.

use serde::Deserialize;

/// Either a method payload or a Last.fm error object.
///
/// Last.fm reports errors in the body, sometimes with HTTP 200.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Envelope<T> {
    Error(ApiError),
    Ok(T),
}

/// `{"error": 6, "message": "..."}`
#[derive(Debug, Clone, Deserialize)]
pub struct ApiError {
    pub error: u32,
    pub message: String,
}

/// Last.fm error code for "invalid parameters", returned for unknown
/// artists and albums.
pub const ERROR_NOT_FOUND: u32 = 6;

/// `artist.getInfo` response
#[derive(Debug, Clone, Deserialize)]
pub struct ArtistResponse {
    pub artist: ArtistInfo,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ArtistInfo {
    pub name: String,
    #[serde(default)]
    pub image: Vec<Image>,
}

/// `album.getInfo` response
#[derive(Debug, Clone, Deserialize)]
pub struct AlbumResponse {
    pub album: AlbumDetails,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AlbumDetails {
    pub name: String,
    #[serde(default)]
    pub image: Vec<Image>,
    /// Present on older responses, e.g. `"    6 Apr 1999, 00:00"`
    pub releasedate: Option<String>,
    pub wiki: Option<Wiki>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Wiki {
    pub published: Option<String>,
}

/// Sized image reference; `size` is one of small, medium, large,
/// extralarge, mega, or empty.
#[derive(Debug, Clone, Deserialize)]
pub struct Image {
    #[serde(rename = "#text")]
    pub url: String,
    #[serde(default)]
    pub size: String,
}
