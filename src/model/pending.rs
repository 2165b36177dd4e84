//! Entities staged during an indexing run.
//!
//! Nothing here has a database id yet. Entities refer to each other through
//! [`ArtistKey`] / [`AlbumKey`], which are indexes into the owning [`Batch`];
//! [`crate::db::commit_batch`] turns them into rows in one transaction.

use std::path::Path;

use crate::metadata::TrackTag;

/// Handle to an artist staged in a [`Batch`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ArtistKey(usize);

/// Handle to an album staged in a [`Batch`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AlbumKey(usize);

impl ArtistKey {
    pub fn index(self) -> usize {
        self.0
    }
}

impl AlbumKey {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewArtist {
    pub name: String,
    pub image: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewAlbum {
    pub name: String,
    pub year: Option<i32>,
    pub cover: Option<String>,
    /// Contributing artists, in order of first appearance
    pub artists: Vec<ArtistKey>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewTrack {
    pub path: String,
    pub title: Option<String>,
    pub bitrate: Option<u32>,
    pub length: Option<f64>,
    pub number: Option<u32>,
    pub file_size: Option<u64>,
    pub artist: Option<ArtistKey>,
    pub album: Option<AlbumKey>,
}

impl NewTrack {
    /// A path-only track, for inventory without tag reads.
    pub fn bare(path: &Path) -> Self {
        Self {
            path: path_key(path),
            title: None,
            bitrate: None,
            length: None,
            number: None,
            file_size: None,
            artist: None,
            album: None,
        }
    }

    /// A track carrying every field read from its tags, not yet linked.
    pub fn from_tag(tag: &TrackTag) -> Self {
        Self {
            path: path_key(&tag.path),
            title: Some(tag.title.clone()),
            bitrate: tag.bitrate,
            length: tag.length_seconds,
            number: tag.track_number,
            file_size: Some(tag.size_bytes),
            artist: None,
            album: None,
        }
    }
}

/// The string form of a path as stored in `tracks.path`.
pub fn path_key(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

/// Pending write set of one indexing run.
#[derive(Debug, Default)]
pub struct Batch {
    artists: Vec<NewArtist>,
    albums: Vec<NewAlbum>,
    tracks: Vec<NewTrack>,
}

impl Batch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_artist(&mut self, artist: NewArtist) -> ArtistKey {
        self.artists.push(artist);
        ArtistKey(self.artists.len() - 1)
    }

    pub fn add_album(&mut self, album: NewAlbum) -> AlbumKey {
        self.albums.push(album);
        AlbumKey(self.albums.len() - 1)
    }

    pub fn add_track(&mut self, track: NewTrack) {
        self.tracks.push(track);
    }

    pub fn artist(&self, key: ArtistKey) -> &NewArtist {
        &self.artists[key.0]
    }

    pub fn album(&self, key: AlbumKey) -> &NewAlbum {
        &self.albums[key.0]
    }

    /// Add `artist` to the album's artist set. Returns `false` if it was
    /// already a member.
    pub fn link_album_artist(&mut self, album: AlbumKey, artist: ArtistKey) -> bool {
        let artists = &mut self.albums[album.0].artists;
        if artists.contains(&artist) {
            false
        } else {
            artists.push(artist);
            true
        }
    }

    pub fn artists(&self) -> &[NewArtist] {
        &self.artists
    }

    pub fn albums(&self) -> &[NewAlbum] {
        &self.albums
    }

    pub fn tracks(&self) -> &[NewTrack] {
        &self.tracks
    }

    pub fn is_empty(&self) -> bool {
        self.artists.is_empty() && self.albums.is_empty() && self.tracks.is_empty()
    }
}
