//! Core data models for the music library.
//!
//! Defines the persisted entities [`Track`], [`Artist`], and [`Album`]
//! (mapped with SQLx), and the pending [`Batch`] an indexing run fills
//! before its single commit.
//!
//! # Database Schema
//!
//! The models map to the following tables:
//! - `artists` - Artist records, unique by slug
//! - `albums` - Albums, unique by slug
//! - `album_artists` - Many-to-many album/artist membership
//! - `tracks` - Individual audio files, unique by path

mod pending;

pub use pending::{AlbumKey, ArtistKey, Batch, NewAlbum, NewArtist, NewTrack, path_key};

use sqlx::FromRow;

/// An artist in the music library.
#[derive(Debug, Clone, FromRow)]
pub struct Artist {
    /// Database ID (auto-generated)
    pub id: i64,
    /// Artist name as tagged
    pub name: String,
    /// Unique URL-safe identifier
    pub slug: String,
    /// Artist picture URL (from enrichment)
    pub image: Option<String>,
}

/// An album in the music library.
#[derive(Debug, Clone, FromRow)]
pub struct Album {
    /// Database ID (auto-generated)
    pub id: i64,
    /// Album name as tagged
    pub name: String,
    /// Unique URL-safe identifier
    pub slug: String,
    /// Release year (remote when enriched, otherwise from tags)
    pub year: Option<i64>,
    /// Cover image URL (from enrichment)
    pub cover: Option<String>,
}

/// A track (audio file) in the music library.
#[derive(Debug, Clone, FromRow)]
pub struct Track {
    /// Database ID (auto-generated)
    pub id: i64,
    /// Absolute file path (unique identifier)
    pub path: String,
    /// Track title; `None` for files indexed without metadata
    pub title: Option<String>,
    pub slug: Option<String>,
    /// Bitrate in kbps
    pub bitrate: Option<i64>,
    /// File size in bytes
    pub file_size: Option<i64>,
    /// Duration in seconds
    pub length: Option<f64>,
    /// Track number on album
    pub number: Option<i64>,
    /// Foreign key to albums table
    pub album_id: Option<i64>,
    /// Foreign key to artists table
    pub artist_id: Option<i64>,
}
