//! Run-scoped artist and album resolution.
//!
//! An [`EntityResolver`] belongs to exactly one indexing run. Within that run
//! every artist name maps to one staged artist, and every album name maps to
//! one staged album, no matter how many tracks mention them. Names match
//! exactly (case- and whitespace-sensitive).
//!
//! Albums are keyed by name alone: two different artists' albums that share a
//! name ("Greatest Hits") resolve to the same album, credited to both.
//!
//! When an enricher is present, each new artist costs one cover lookup and
//! each new album one album lookup. Lookup failures are logged and ignored.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::enrichment::MetadataEnricher;
use crate::model::{AlbumKey, ArtistKey, Batch, NewAlbum, NewArtist};

pub struct EntityResolver {
    enricher: Option<Arc<dyn MetadataEnricher>>,
    artists: HashMap<String, ArtistKey>,
    albums: HashMap<String, AlbumKey>,
}

impl EntityResolver {
    pub fn new(enricher: Option<Arc<dyn MetadataEnricher>>) -> Self {
        Self {
            enricher,
            artists: HashMap::new(),
            albums: HashMap::new(),
        }
    }

    pub fn is_enriching(&self) -> bool {
        self.enricher.is_some()
    }

    /// Return the run's artist for `name`, staging a new one on first sight.
    pub async fn resolve_artist(&mut self, batch: &mut Batch, name: &str) -> ArtistKey {
        if let Some(&key) = self.artists.get(name) {
            return key;
        }

        let image = match &self.enricher {
            Some(enricher) => match enricher.fetch_artist_cover(name).await {
                Ok(cover) => cover,
                Err(e) => {
                    warn!(artist = name, error = %e, "Artist enrichment failed");
                    None
                }
            },
            None => None,
        };

        debug!(artist = name, "New artist");
        let key = batch.add_artist(NewArtist {
            name: name.to_string(),
            image,
        });
        self.artists.insert(name.to_string(), key);
        key
    }

    /// Return the run's album for `name` and credit `artist` on it.
    ///
    /// On first sight the album's year and cover are decided: a parseable
    /// remote release date wins, otherwise `local_year` (from the track's
    /// tags) is used. Later calls only add `artist` to the album's artists.
    pub async fn resolve_album(
        &mut self,
        batch: &mut Batch,
        name: &str,
        artist: ArtistKey,
        local_year: Option<i32>,
    ) -> AlbumKey {
        let key = match self.albums.get(name) {
            Some(&key) => key,
            None => {
                let (year, cover) = self.album_details(batch, name, artist, local_year).await;
                debug!(album = name, year = ?year, "New album");
                let key = batch.add_album(NewAlbum {
                    name: name.to_string(),
                    year,
                    cover,
                    artists: Vec::new(),
                });
                self.albums.insert(name.to_string(), key);
                key
            }
        };

        batch.link_album_artist(key, artist);
        key
    }

    async fn album_details(
        &self,
        batch: &Batch,
        name: &str,
        artist: ArtistKey,
        local_year: Option<i32>,
    ) -> (Option<i32>, Option<String>) {
        let Some(enricher) = &self.enricher else {
            return (local_year, None);
        };

        let artist_name = &batch.artist(artist).name;
        match enricher.fetch_album_info(artist_name, name).await {
            Ok(info) => (info.release_year().or(local_year), info.cover_url),
            Err(e) => {
                warn!(artist = %artist_name, album = name, error = %e, "Album enrichment failed");
                (local_year, None)
            }
        }
    }
}
