//! Converts Last.fm DTOs into enrichment domain types.

use super::dto;
use crate::enrichment::domain::AlbumInfo;

/// Preferred image size for artist pictures and album covers.
const PREFERRED_SIZE: &str = "extralarge";

/// Pick the `extralarge` image, falling back to the largest non-empty one.
///
/// Last.fm lists images smallest first.
pub fn best_image(images: &[dto::Image]) -> Option<String> {
    let usable = || images.iter().filter(|i| !i.url.trim().is_empty());
    usable()
        .find(|i| i.size == PREFERRED_SIZE)
        .or_else(|| usable().last())
        .map(|i| i.url.trim().to_string())
}

pub fn to_album_info(album: dto::AlbumDetails) -> AlbumInfo {
    let release_date = album
        .releasedate
        .filter(|d| !d.trim().is_empty())
        .or_else(|| album.wiki.and_then(|w| w.published))
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty());

    AlbumInfo {
        release_date,
        cover_url: best_image(&album.image),
    }
}
