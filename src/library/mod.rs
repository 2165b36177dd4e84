//! The indexing run: scan, read tags, resolve, stage, commit.
//!
//! Files are processed strictly one after another. Everything a run finds is
//! staged in a [`Batch`] and written with a single [`db::commit_batch`] at
//! the end, so a run either lands completely or not at all.

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use sqlx::SqlitePool;
use tracing::{debug, info, warn};

use crate::config::MediaDir;
use crate::db;
use crate::enrichment::MetadataEnricher;
use crate::error::{Error, Result, ResultExt};
use crate::metadata::TagReader;
use crate::model::{Batch, NewTrack, path_key};
use crate::resolver::EntityResolver;
use crate::scanner::{self, KNOWN_EXTENSIONS};

/// Per-run switches.
#[derive(Debug, Clone)]
pub struct IndexOptions {
    /// Read tags. When off, tracks are stored by path only and nothing is
    /// enriched.
    pub extract_metadata: bool,
    pub accepted_formats: Vec<String>,
}

impl Default for IndexOptions {
    fn default() -> Self {
        Self {
            extract_metadata: true,
            accepted_formats: KNOWN_EXTENSIONS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// What one run added, plus what it skipped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IndexReport {
    pub tracks_added: usize,
    pub albums_added: usize,
    pub artists_added: usize,
    /// Paths already stored by an earlier run
    pub already_indexed: usize,
    /// Paths skipped because they could not be read or looked up
    pub failed: usize,
}

/// How a single file was handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FileOutcome {
    /// Tagged track linked to its artist and album
    Indexed,
    /// Tags readable but artist or album missing; stored unlinked
    MissingTags,
    /// Stored by path only
    Inventoried,
    AlreadyIndexed,
}

/// State owned by one run; dropped when the run ends.
struct IndexRun {
    resolver: EntityResolver,
    batch: Batch,
    seen: HashSet<String>,
    already_indexed: usize,
    failed: usize,
}

impl IndexRun {
    fn report(&self) -> IndexReport {
        IndexReport {
            tracks_added: self.batch.tracks().len(),
            albums_added: self.batch.albums().len(),
            artists_added: self.batch.artists().len(),
            already_indexed: self.already_indexed,
            failed: self.failed,
        }
    }
}

pub struct Indexer {
    pool: SqlitePool,
    options: IndexOptions,
    enricher: Option<Arc<dyn MetadataEnricher>>,
}

impl Indexer {
    pub fn new(
        pool: SqlitePool,
        options: IndexOptions,
        enricher: Option<Arc<dyn MetadataEnricher>>,
    ) -> Self {
        // Enrichment works on tag values, so it is meaningless without them
        let enricher = enricher.filter(|_| options.extract_metadata);
        Self {
            pool,
            options,
            enricher,
        }
    }

    /// Index every directory of every media dir and commit the result.
    ///
    /// Per-file problems are logged and counted; only a failed commit is
    /// returned as an error.
    pub async fn run(&self, media_dirs: &[MediaDir]) -> Result<IndexReport> {
        let mut run = IndexRun {
            resolver: EntityResolver::new(self.enricher.clone()),
            batch: Batch::new(),
            seen: HashSet::new(),
            already_indexed: 0,
            failed: 0,
        };

        info!(
            extract_metadata = self.options.extract_metadata,
            enrich = run.resolver.is_enriching(),
            "Starting indexing run"
        );

        for dir in media_dirs.iter().flat_map(MediaDir::get_dirs) {
            info!(root = %dir.display(), "Indexing directory");
            for path in scanner::scan(&dir, &self.options.accepted_formats) {
                debug!(path = %path.display(), "Processing file");
                match self.index_file(&mut run, &path).await {
                    Ok(FileOutcome::AlreadyIndexed) => run.already_indexed += 1,
                    Ok(_) => {}
                    Err(e) => {
                        warn!(path = %path.display(), error = %e, "Skipping file");
                        run.failed += 1;
                    }
                }
            }
        }

        let report = run.report();
        if run.batch.is_empty() {
            info!("Nothing new to commit");
        } else {
            db::commit_batch(&self.pool, &run.batch)
                .await
                .map_err(Error::Commit)?;
        }

        info!(
            tracks = report.tracks_added,
            albums = report.albums_added,
            artists = report.artists_added,
            already_indexed = report.already_indexed,
            failed = report.failed,
            "Indexing run complete"
        );
        Ok(report)
    }

    async fn index_file(&self, run: &mut IndexRun, path: &Path) -> Result<FileOutcome> {
        if !self.options.extract_metadata {
            run.batch.add_track(NewTrack::bare(path));
            return Ok(FileOutcome::Inventoried);
        }

        let key = path_key(path);
        if run.seen.contains(&key) {
            return Ok(FileOutcome::AlreadyIndexed);
        }
        if db::track_exists(&self.pool, &key)
            .await
            .with_context(format!("Looking up {}", key))?
        {
            return Ok(FileOutcome::AlreadyIndexed);
        }

        let reader = TagReader::open(path)?;
        if !reader.is_valid() {
            return Err(Error::unreadable(path, "fails tag reader"));
        }

        let tag = reader.to_track_tag();
        let mut track = NewTrack::from_tag(&tag);
        run.seen.insert(key);

        let (Some(artist_name), Some(album_name)) = (&tag.artist, &tag.album) else {
            warn!(
                path = %path.display(),
                artist = ?tag.artist,
                album = ?tag.album,
                "Missing essential tags, storing track without artist or album"
            );
            run.batch.add_track(track);
            return Ok(FileOutcome::MissingTags);
        };

        let artist = run.resolver.resolve_artist(&mut run.batch, artist_name).await;
        let album = run
            .resolver
            .resolve_album(&mut run.batch, album_name, artist, tag.release_year)
            .await;
        track.artist = Some(artist);
        track.album = Some(album);
        run.batch.add_track(track);
        Ok(FileOutcome::Indexed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enrichment::EnrichmentError;
    use crate::test_utils::{FixtureTags, StubEnricher, temp_db, write_garbage, write_mp3};
    use std::path::PathBuf;

    fn media(root: &Path) -> Vec<MediaDir> {
        vec![MediaDir::Path(root.to_path_buf())]
    }

    fn indexer(pool: &SqlitePool, enricher: Option<Arc<dyn MetadataEnricher>>) -> Indexer {
        Indexer::new(pool.clone(), IndexOptions::default(), enricher)
    }

    #[tokio::test]
    async fn test_two_tracks_same_album() {
        let (pool, dir) = temp_db().await;
        let root = dir.path().join("music");
        write_mp3(&root.join("a.mp3"), &FixtureTags::new("X", "Y", "T1").track(1));
        write_mp3(&root.join("b.mp3"), &FixtureTags::new("X", "Y", "T2").track(2));

        let report = indexer(&pool, None).run(&media(&root)).await.unwrap();
        assert_eq!(report.tracks_added, 2);
        assert_eq!(report.albums_added, 1);
        assert_eq!(report.artists_added, 1);
        assert_eq!(report.failed, 0);

        let artists = db::get_all_artists(&pool).await.unwrap();
        let albums = db::get_all_albums(&pool).await.unwrap();
        let tracks = db::get_all_tracks(&pool).await.unwrap();
        assert_eq!(artists.len(), 1);
        assert_eq!(albums.len(), 1);
        assert_eq!(tracks.len(), 2);
        assert_eq!(
            db::get_album_artist_ids(&pool, albums[0].id).await.unwrap(),
            vec![artists[0].id]
        );
        assert!(tracks.iter().all(|t| t.artist_id == Some(artists[0].id)));
        assert!(tracks.iter().all(|t| t.album_id == Some(albums[0].id)));
    }

    #[tokio::test]
    async fn test_second_run_adds_nothing() {
        let (pool, dir) = temp_db().await;
        let root = dir.path().join("music");
        write_mp3(&root.join("a.mp3"), &FixtureTags::new("X", "Y", "T1"));
        write_mp3(&root.join("sub/b.mp3"), &FixtureTags::new("X", "Y", "T2"));

        let first = indexer(&pool, None).run(&media(&root)).await.unwrap();
        assert_eq!(first.tracks_added, 2);

        let second = indexer(&pool, None).run(&media(&root)).await.unwrap();
        assert_eq!(second.tracks_added, 0);
        assert_eq!(second.artists_added, 0);
        assert_eq!(second.already_indexed, 2);
        assert_eq!(db::get_all_tracks(&pool).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_compilation_album_has_both_artists() {
        let (pool, dir) = temp_db().await;
        let root = dir.path().join("music");
        write_mp3(&root.join("1.mp3"), &FixtureTags::new("X", "Hits", "T1"));
        write_mp3(&root.join("2.mp3"), &FixtureTags::new("Z", "Hits", "T2"));

        let report = indexer(&pool, None).run(&media(&root)).await.unwrap();
        assert_eq!(report.albums_added, 1);
        assert_eq!(report.artists_added, 2);

        let albums = db::get_all_albums(&pool).await.unwrap();
        assert_eq!(db::get_album_artist_ids(&pool, albums[0].id).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_missing_artist_stores_unlinked_track() {
        let (pool, dir) = temp_db().await;
        let root = dir.path().join("music");
        write_mp3(
            &root.join("orphan.mp3"),
            &FixtureTags {
                album: Some("Y".to_string()),
                title: Some("Lonely".to_string()),
                ..Default::default()
            },
        );

        let report = indexer(&pool, None).run(&media(&root)).await.unwrap();
        assert_eq!(report.tracks_added, 1);
        assert_eq!(report.artists_added, 0);
        assert_eq!(report.albums_added, 0);

        let track = &db::get_all_tracks(&pool).await.unwrap()[0];
        assert_eq!(track.title.as_deref(), Some("Lonely"));
        assert_eq!(track.artist_id, None);
        assert_eq!(track.album_id, None);
    }

    #[tokio::test]
    async fn test_no_metadata_inventories_paths() {
        let (pool, dir) = temp_db().await;
        let root = dir.path().join("music");
        write_mp3(&root.join("a.mp3"), &FixtureTags::new("X", "Y", "T1"));
        write_mp3(&root.join("b.mp3"), &FixtureTags::new("X", "Y", "T2"));
        write_garbage(&root.join("c.ogg"));

        let options = IndexOptions {
            extract_metadata: false,
            ..Default::default()
        };
        let stub = Arc::new(StubEnricher::default());
        let indexer = Indexer::new(pool.clone(), options, Some(stub.clone()));

        let report = indexer.run(&media(&root)).await.unwrap();
        assert_eq!(report.tracks_added, 3);
        assert_eq!(report.artists_added, 0);
        assert_eq!(report.albums_added, 0);
        assert!(stub.calls().is_empty());

        let tracks = db::get_all_tracks(&pool).await.unwrap();
        assert_eq!(tracks.len(), 3);
        assert!(tracks.iter().all(|t| t.title.is_none() && t.artist_id.is_none()));
    }

    #[tokio::test]
    async fn test_no_metadata_rerun_fails_at_commit() {
        let (pool, dir) = temp_db().await;
        let root = dir.path().join("music");
        write_garbage(&root.join("a.mp3"));

        let options = IndexOptions {
            extract_metadata: false,
            ..Default::default()
        };
        let indexer = Indexer::new(pool.clone(), options, None);
        indexer.run(&media(&root)).await.unwrap();

        let result = indexer.run(&media(&root)).await;
        assert!(matches!(result, Err(Error::Commit(_))));
        assert_eq!(db::get_all_tracks(&pool).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_enriched_year_and_covers() {
        let (pool, dir) = temp_db().await;
        let root = dir.path().join("music");
        write_mp3(&root.join("a.mp3"), &FixtureTags::new("X", "Y", "T1"));

        let stub = StubEnricher::default()
            .with_artist_cover("X", "https://img/x.png")
            .with_album("Y", Some("15 Jun 2009, 00:00"), Some("https://img/y.png"));
        indexer(&pool, Some(Arc::new(stub)))
            .run(&media(&root))
            .await
            .unwrap();

        let artist = &db::get_all_artists(&pool).await.unwrap()[0];
        let album = &db::get_all_albums(&pool).await.unwrap()[0];
        assert_eq!(artist.image.as_deref(), Some("https://img/x.png"));
        assert_eq!(album.year, Some(2009));
        assert_eq!(album.cover.as_deref(), Some("https://img/y.png"));
    }

    #[tokio::test]
    async fn test_remote_year_overrides_tag_year() {
        let (pool, dir) = temp_db().await;
        let root = dir.path().join("music");
        write_mp3(&root.join("a.mp3"), &FixtureTags::new("X", "Y", "T1").year(1997));

        let stub = StubEnricher::default().with_album("Y", Some("15 Jun 2009, 00:00"), None);
        indexer(&pool, Some(Arc::new(stub)))
            .run(&media(&root))
            .await
            .unwrap();

        let album = &db::get_all_albums(&pool).await.unwrap()[0];
        assert_eq!(album.year, Some(2009));
    }

    #[tokio::test]
    async fn test_tag_year_kept_without_enrichment() {
        let (pool, dir) = temp_db().await;
        let root = dir.path().join("music");
        write_mp3(&root.join("a.mp3"), &FixtureTags::new("X", "Y", "T1").year(1997));

        indexer(&pool, None).run(&media(&root)).await.unwrap();

        let album = &db::get_all_albums(&pool).await.unwrap()[0];
        assert_eq!(album.year, Some(1997));
    }

    #[tokio::test]
    async fn test_malformed_date_still_indexed() {
        use lofty::tag::ItemKey;

        let (pool, dir) = temp_db().await;
        let root = dir.path().join("music");
        write_mp3(
            &root.join("a.mp3"),
            &FixtureTags::new("X", "Y", "T1").raw(ItemKey::RecordingDate, "unknown"),
        );

        let report = indexer(&pool, None).run(&media(&root)).await.unwrap();
        assert_eq!(report.failed, 0);
        assert_eq!(report.tracks_added, 1);
        assert_eq!(report.artists_added, 1);
        assert_eq!(report.albums_added, 1);

        let album = &db::get_all_albums(&pool).await.unwrap()[0];
        let track = &db::get_all_tracks(&pool).await.unwrap()[0];
        assert_eq!(album.year, None);
        assert_eq!(track.album_id, Some(album.id));
        assert!(track.artist_id.is_some());
    }

    #[tokio::test]
    async fn test_enrichment_failure_does_not_abort() {
        let (pool, dir) = temp_db().await;
        let root = dir.path().join("music");
        write_mp3(&root.join("a.mp3"), &FixtureTags::new("X", "Y", "T1"));
        write_mp3(&root.join("b.mp3"), &FixtureTags::new("X", "Y", "T2"));

        let stub = StubEnricher::failing(EnrichmentError::Network("connection refused".into()));
        let report = indexer(&pool, Some(Arc::new(stub)))
            .run(&media(&root))
            .await
            .unwrap();

        assert_eq!(report.tracks_added, 2);
        assert_eq!(report.failed, 0);
        let album = &db::get_all_albums(&pool).await.unwrap()[0];
        assert_eq!(album.cover, None);
    }

    #[tokio::test]
    async fn test_invalid_file_is_counted_and_skipped() {
        let (pool, dir) = temp_db().await;
        let root = dir.path().join("music");
        write_garbage(&root.join("broken.mp3"));
        write_mp3(&root.join("good.mp3"), &FixtureTags::new("X", "Y", "T1"));

        let report = indexer(&pool, None).run(&media(&root)).await.unwrap();
        assert_eq!(report.failed, 1);
        assert_eq!(report.tracks_added, 1);

        let tracks = db::get_all_tracks(&pool).await.unwrap();
        assert_eq!(tracks.len(), 1);
        assert!(tracks[0].path.ends_with("good.mp3"));
    }

    #[tokio::test]
    async fn test_grouped_and_missing_roots() {
        let (pool, dir) = temp_db().await;
        let root = dir.path().join("nas");
        write_mp3(&root.join("rock/a.mp3"), &FixtureTags::new("X", "Y", "T1"));
        write_mp3(&root.join("jazz/b.mp3"), &FixtureTags::new("Z", "W", "T2"));
        write_mp3(&root.join("ignored/c.mp3"), &FixtureTags::new("Q", "R", "T3"));

        let media_dirs = vec![
            MediaDir::Group {
                root: root.clone(),
                dirs: vec![PathBuf::from("rock"), PathBuf::from("jazz")],
            },
            MediaDir::Path(dir.path().join("does-not-exist")),
        ];

        let report = indexer(&pool, None).run(&media_dirs).await.unwrap();
        assert_eq!(report.tracks_added, 2);
        assert_eq!(report.artists_added, 2);
    }

    #[tokio::test]
    async fn test_overlapping_roots_index_once() {
        let (pool, dir) = temp_db().await;
        let root = dir.path().join("music");
        write_mp3(&root.join("a.mp3"), &FixtureTags::new("X", "Y", "T1"));

        let media_dirs = vec![MediaDir::Path(root.clone()), MediaDir::Path(root)];
        let report = indexer(&pool, None).run(&media_dirs).await.unwrap();
        assert_eq!(report.tracks_added, 1);
        assert_eq!(report.already_indexed, 1);
    }

    #[tokio::test]
    async fn test_empty_run_commits_nothing() {
        let (pool, dir) = temp_db().await;
        let report = indexer(&pool, None).run(&media(dir.path())).await.unwrap();
        assert_eq!(report, IndexReport::default());
    }
}
