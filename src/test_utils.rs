//! Test utilities and fixtures for music-indexer tests.
//!
//! Provides a temporary database, a synthetic MP3 writer, and a stub
//! enrichment provider so indexing can be tested fully offline.
//!
//! # Example
//!
//! ```ignore
//! use music_indexer::test_utils::{temp_db, write_mp3, FixtureTags};
//!
//! #[tokio::test]
//! async fn test_something() {
//!     let (pool, dir) = temp_db().await;
//!     write_mp3(&dir.path().join("a.mp3"), &FixtureTags::new("X", "Y", "T1"));
//! }
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use lofty::config::WriteOptions;
use lofty::tag::{Accessor, ItemKey, Tag, TagExt, TagType};
use sqlx::sqlite::SqlitePool;
use tempfile::TempDir;

use crate::enrichment::{AlbumInfo, EnrichmentError, MetadataEnricher};

/// MPEG-1 Layer III, 128 kbps, 44.1 kHz, no CRC, no padding.
const FRAME_HEADER: [u8; 4] = [0xFF, 0xFB, 0x90, 0x00];
/// 144 * 128000 / 44100, rounded down.
const FRAME_LEN: usize = 417;
const FRAME_COUNT: usize = 40;

/// Creates a temporary database for testing.
///
/// Keep the returned `TempDir` alive for the duration of the test; it also
/// works as a scratch directory for media fixtures.
pub async fn temp_db() -> (SqlitePool, TempDir) {
    let dir = tempfile::tempdir().expect("Failed to create temp directory");
    let db_path = dir.path().join("test.db");
    let db_url = format!("sqlite:{}", db_path.display());

    let pool = crate::db::init_db(&db_url)
        .await
        .expect("Failed to initialize test database");

    (pool, dir)
}

/// Tags to embed in a synthetic MP3.
#[derive(Debug, Clone, Default)]
pub struct FixtureTags {
    pub artist: Option<String>,
    pub album: Option<String>,
    pub title: Option<String>,
    pub track: Option<u32>,
    pub year: Option<u32>,
    /// Raw text items written as-is, for malformed values
    pub raw: Vec<(ItemKey, String)>,
}

impl FixtureTags {
    pub fn new(artist: &str, album: &str, title: &str) -> Self {
        Self {
            artist: Some(artist.to_string()),
            album: Some(album.to_string()),
            title: Some(title.to_string()),
            ..Default::default()
        }
    }

    pub fn track(mut self, number: u32) -> Self {
        self.track = Some(number);
        self
    }

    pub fn year(mut self, year: u32) -> Self {
        self.year = Some(year);
        self
    }

    pub fn raw(mut self, key: ItemKey, value: &str) -> Self {
        self.raw.push((key, value.to_string()));
        self
    }

    fn is_empty(&self) -> bool {
        self.artist.is_none()
            && self.album.is_none()
            && self.title.is_none()
            && self.track.is_none()
            && self.year.is_none()
            && self.raw.is_empty()
    }
}

/// Write a short silent CBR MP3 to `path`, tagged with ID3v2 via lofty.
///
/// Parent directories are created as needed. Returns the path written.
pub fn write_mp3(path: &Path, tags: &FixtureTags) -> PathBuf {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("Failed to create fixture directory");
    }

    let mut data = Vec::with_capacity(FRAME_LEN * FRAME_COUNT);
    for _ in 0..FRAME_COUNT {
        let mut frame = vec![0u8; FRAME_LEN];
        frame[..4].copy_from_slice(&FRAME_HEADER);
        data.extend_from_slice(&frame);
    }
    std::fs::write(path, &data).expect("Failed to write MP3 fixture");

    if !tags.is_empty() {
        let mut tag = Tag::new(TagType::Id3v2);
        if let Some(artist) = &tags.artist {
            tag.set_artist(artist.clone());
        }
        if let Some(album) = &tags.album {
            tag.set_album(album.clone());
        }
        if let Some(title) = &tags.title {
            tag.set_title(title.clone());
        }
        if let Some(track) = tags.track {
            tag.set_track(track);
        }
        if let Some(year) = tags.year {
            tag.set_year(year);
        }
        for (key, value) in &tags.raw {
            tag.insert_text(key.clone(), value.clone());
        }
        tag.save_to_path(path, WriteOptions::default())
            .expect("Failed to tag MP3 fixture");
    }

    path.to_path_buf()
}

/// Write arbitrary non-audio bytes under an audio extension.
pub fn write_garbage(path: &Path) -> PathBuf {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("Failed to create fixture directory");
    }
    std::fs::write(path, b"definitely not an audio stream").expect("Failed to write fixture");
    path.to_path_buf()
}

/// Offline enrichment provider with canned answers and a call log.
#[derive(Default)]
pub struct StubEnricher {
    pub artist_covers: HashMap<String, String>,
    pub albums: HashMap<String, AlbumInfo>,
    /// Returned for every call when set (takes precedence)
    pub error: Option<EnrichmentError>,
    calls: Mutex<Vec<String>>,
}

impl StubEnricher {
    pub fn failing(error: EnrichmentError) -> Self {
        Self {
            error: Some(error),
            ..Default::default()
        }
    }

    pub fn with_artist_cover(mut self, artist: &str, url: &str) -> Self {
        self.artist_covers.insert(artist.to_string(), url.to_string());
        self
    }

    pub fn with_album(mut self, album: &str, release_date: Option<&str>, cover: Option<&str>) -> Self {
        self.albums.insert(
            album.to_string(),
            AlbumInfo {
                release_date: release_date.map(str::to_string),
                cover_url: cover.map(str::to_string),
            },
        );
        self
    }

    /// Calls made so far, as `artist:<name>` / `album:<artist>/<album>`.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    fn record(&self, call: String) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
    }
}

#[async_trait]
impl MetadataEnricher for StubEnricher {
    async fn fetch_artist_cover(&self, name: &str) -> Result<Option<String>, EnrichmentError> {
        self.record(format!("artist:{}", name));
        if let Some(ref err) = self.error {
            return Err(err.clone());
        }
        Ok(self.artist_covers.get(name).cloned())
    }

    async fn fetch_album_info(&self, artist: &str, album: &str) -> Result<AlbumInfo, EnrichmentError> {
        self.record(format!("album:{}/{}", artist, album));
        if let Some(ref err) = self.error {
            return Err(err.clone());
        }
        self.albums.get(album).cloned().ok_or(EnrichmentError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_temp_db_creates_valid_pool() {
        let (pool, _dir) = temp_db().await;
        let tracks = crate::db::get_all_tracks(&pool).await.unwrap();
        assert!(tracks.is_empty());
    }

    #[test]
    fn test_write_mp3_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_mp3(&dir.path().join("a/b/c.mp3"), &FixtureTags::default());
        assert!(path.exists());
        assert_eq!(
            std::fs::metadata(&path).unwrap().len(),
            (FRAME_LEN * FRAME_COUNT) as u64
        );
    }

    #[tokio::test]
    async fn test_stub_enricher_records_calls() {
        let stub = StubEnricher::default().with_artist_cover("X", "http://img/x.png");
        assert_eq!(
            stub.fetch_artist_cover("X").await.unwrap().as_deref(),
            Some("http://img/x.png")
        );
        assert!(matches!(
            stub.fetch_album_info("X", "Y").await,
            Err(EnrichmentError::NotFound)
        ));
        assert_eq!(stub.calls(), vec!["artist:X", "album:X/Y"]);
    }
}
