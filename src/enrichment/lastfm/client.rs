//! Last.fm HTTP client
//!
//! Handles communication with the Last.fm web service.
//! See: https://www.last.fm/api/rest
//!
//! Every request carries a timeout so an unresponsive service cannot stall
//! an indexing run.

use std::time::Duration;

use serde::de::DeserializeOwned;

use super::dto;
use crate::enrichment::domain::EnrichmentError;

/// Last.fm API client
pub struct LastFmClient {
    http_client: reqwest::Client,
    base_url: String,
    api_key: String,
}

const DEFAULT_BASE_URL: &str = "https://ws.audioscrobbler.com/2.0/";

/// User agent string - Last.fm asks clients to identify themselves
const USER_AGENT: &str = concat!("MusicIndexer/", env!("CARGO_PKG_VERSION"));

impl LastFmClient {
    /// Create a new client
    pub fn new(api_key: impl Into<String>, timeout: Duration) -> Result<Self, EnrichmentError> {
        Self::with_base_url(DEFAULT_BASE_URL, api_key, timeout)
    }

    /// Create a client against a custom endpoint (mirrors, tests)
    pub fn with_base_url(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, EnrichmentError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| EnrichmentError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: base_url.into(),
            api_key: api_key.into(),
        })
    }

    /// `artist.getInfo`
    pub async fn artist_info(&self, name: &str) -> Result<dto::ArtistInfo, EnrichmentError> {
        let response: dto::ArtistResponse = self
            .call(&[("method", "artist.getinfo"), ("artist", name)])
            .await?;
        Ok(response.artist)
    }

    /// `album.getInfo`
    pub async fn album_info(
        &self,
        artist: &str,
        album: &str,
    ) -> Result<dto::AlbumDetails, EnrichmentError> {
        let response: dto::AlbumResponse = self
            .call(&[
                ("method", "album.getinfo"),
                ("artist", artist),
                ("album", album),
            ])
            .await?;
        Ok(response.album)
    }

    /// Send a GET request and decode the JSON envelope
    async fn call<T: DeserializeOwned>(&self, params: &[(&str, &str)]) -> Result<T, EnrichmentError> {
        let response = self
            .http_client
            .get(&self.base_url)
            .query(params)
            .query(&[("api_key", self.api_key.as_str()), ("format", "json")])
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(EnrichmentError::RateLimited);
        }

        let body = response.text().await.map_err(map_transport_error)?;

        match serde_json::from_str::<dto::Envelope<T>>(&body) {
            Ok(dto::Envelope::Error(err)) if err.error == dto::ERROR_NOT_FOUND => {
                Err(EnrichmentError::NotFound)
            }
            Ok(dto::Envelope::Error(err)) => Err(EnrichmentError::ApiError(err.message)),
            _ if status == reqwest::StatusCode::NOT_FOUND => Err(EnrichmentError::NotFound),
            _ if !status.is_success() => Err(EnrichmentError::Network(format!(
                "HTTP {}: {}",
                status,
                status.canonical_reason().unwrap_or("Unknown")
            ))),
            Ok(dto::Envelope::Ok(payload)) => Ok(payload),
            Err(e) => Err(EnrichmentError::Parse(e.to_string())),
        }
    }
}

fn map_transport_error(e: reqwest::Error) -> EnrichmentError {
    if e.is_timeout() {
        EnrichmentError::Timeout
    } else {
        EnrichmentError::Network(e.to_string())
    }
}
