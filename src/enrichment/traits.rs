//! Trait definition for enrichment providers.
//!
//! Enables dependency injection so the resolver and indexer can be tested
//! offline. Production code uses [`LastFmClient`]; tests substitute
//! `test_utils::StubEnricher`.

use async_trait::async_trait;

use super::domain::{AlbumInfo, EnrichmentError};
use super::lastfm::{LastFmClient, adapter};

/// A remote source of artist images, album covers and release dates.
#[async_trait]
pub trait MetadataEnricher: Send + Sync {
    /// Cover image URL for an artist, if the service has one.
    async fn fetch_artist_cover(&self, name: &str) -> Result<Option<String>, EnrichmentError>;

    /// Release date and cover for an artist's album.
    async fn fetch_album_info(&self, artist: &str, album: &str) -> Result<AlbumInfo, EnrichmentError>;
}

#[async_trait]
impl MetadataEnricher for LastFmClient {
    async fn fetch_artist_cover(&self, name: &str) -> Result<Option<String>, EnrichmentError> {
        let artist = self.artist_info(name).await?;
        Ok(adapter::best_image(&artist.image))
    }

    async fn fetch_album_info(&self, artist: &str, album: &str) -> Result<AlbumInfo, EnrichmentError> {
        let details = self.album_info(artist, album).await?;
        Ok(adapter::to_album_info(details))
    }
}
