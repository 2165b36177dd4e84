//! Database module for artist, album and track persistence.
//!
//! Uses SQLx with SQLite for lightweight, embedded database storage.
//! An indexing run only needs three operations from here:
//! - [`track_exists`] to skip paths indexed by an earlier run
//! - [`commit_batch`] to write a whole run in one transaction
//! - unique slug generation, done inside the commit
//!
//! The read helpers at the bottom serve callers that inspect the library.
//!
//! # Example
//!
//! ```ignore
//! use music_indexer::db::{init_db, get_all_tracks};
//!
//! let pool = init_db("sqlite:music.db").await?;
//! let tracks = get_all_tracks(&pool).await?;
//! ```

use sqlx::migrate::MigrateDatabase;
use sqlx::sqlite::{SqliteConnection, SqlitePool, SqlitePoolOptions};

use crate::error::Result;
use crate::model::{Album, Artist, Batch, Track};
use crate::slug;

/// Default database filename.
pub const DEFAULT_DB_NAME: &str = "music_indexer.db";

/// Build a SQLite database URL from an optional path.
///
/// If no path is provided, uses [`DEFAULT_DB_NAME`] in the current directory.
pub fn db_url(path: Option<&std::path::Path>) -> String {
    match path {
        Some(p) => format!("sqlite:{}", p.display()),
        None => format!("sqlite:{}", DEFAULT_DB_NAME),
    }
}

/// Initialize the database connection pool and run migrations.
///
/// Creates the database file if it doesn't exist, establishes a connection
/// pool with up to 5 connections, and runs all pending migrations.
pub async fn init_db(db_url: &str) -> Result<SqlitePool> {
    if !sqlx::Sqlite::database_exists(db_url).await.unwrap_or(false) {
        sqlx::Sqlite::create_database(db_url).await?;
    }

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(db_url)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    Ok(pool)
}

/// Whether a track with this exact path is already stored.
pub async fn track_exists(pool: &SqlitePool, path: &str) -> sqlx::Result<bool> {
    let row: Option<(i64,)> = sqlx::query_as("SELECT id FROM tracks WHERE path = ?")
        .bind(path)
        .fetch_optional(pool)
        .await?;
    Ok(row.is_some())
}

/// Tables with a unique `slug` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlugTable {
    Artists,
    Albums,
    Tracks,
}

impl SlugTable {
    fn name(self) -> &'static str {
        match self {
            SlugTable::Artists => "artists",
            SlugTable::Albums => "albums",
            SlugTable::Tracks => "tracks",
        }
    }
}

async fn slug_taken(conn: &mut SqliteConnection, table: SlugTable, slug: &str) -> sqlx::Result<bool> {
    let sql = format!("SELECT COUNT(*) FROM {} WHERE slug = ?", table.name());
    let count: i64 = sqlx::query_scalar(&sql).bind(slug).fetch_one(conn).await?;
    Ok(count > 0)
}

/// Generate a slug for `text` that is not yet used in `table`.
///
/// Numeric-only or taken slugs get a random suffix until they are free.
/// Checks run on `conn`, so slugs written earlier in the same transaction
/// count as taken.
pub async fn unique_slug(conn: &mut SqliteConnection, table: SlugTable, text: &str) -> sqlx::Result<String> {
    let base = slug::slugify(text);
    let mut candidate = base.clone();

    if slug::is_numeric_only(&candidate) {
        candidate = slug::with_suffix(&base);
    }
    while slug_taken(&mut *conn, table, &candidate).await? {
        candidate = slug::with_suffix(&base);
    }

    Ok(candidate)
}

/// Database ids assigned by [`commit_batch`], indexed like the batch.
#[derive(Debug, Clone, Default)]
pub struct CommitSummary {
    pub artist_ids: Vec<i64>,
    pub album_ids: Vec<i64>,
    pub track_ids: Vec<i64>,
}

/// Write every staged entity of a run in a single transaction.
///
/// On any error the transaction is rolled back and nothing from the batch
/// is persisted.
pub async fn commit_batch(pool: &SqlitePool, batch: &Batch) -> sqlx::Result<CommitSummary> {
    let mut tx = pool.begin().await?;
    let mut summary = CommitSummary::default();

    for artist in batch.artists() {
        let slug = unique_slug(&mut tx, SlugTable::Artists, &artist.name).await?;
        let (id,): (i64,) =
            sqlx::query_as("INSERT INTO artists (name, slug, image) VALUES (?, ?, ?) RETURNING id")
                .bind(&artist.name)
                .bind(&slug)
                .bind(&artist.image)
                .fetch_one(&mut *tx)
                .await?;
        summary.artist_ids.push(id);
    }

    for album in batch.albums() {
        let slug = unique_slug(&mut tx, SlugTable::Albums, &album.name).await?;
        let (id,): (i64,) = sqlx::query_as(
            "INSERT INTO albums (name, slug, year, cover) VALUES (?, ?, ?, ?) RETURNING id",
        )
        .bind(&album.name)
        .bind(&slug)
        .bind(album.year)
        .bind(&album.cover)
        .fetch_one(&mut *tx)
        .await?;

        for artist in &album.artists {
            sqlx::query("INSERT INTO album_artists (album_id, artist_id) VALUES (?, ?)")
                .bind(id)
                .bind(summary.artist_ids[artist.index()])
                .execute(&mut *tx)
                .await?;
        }
        summary.album_ids.push(id);
    }

    for track in batch.tracks() {
        let slug = match &track.title {
            Some(title) => Some(unique_slug(&mut tx, SlugTable::Tracks, title).await?),
            None => None,
        };
        let (id,): (i64,) = sqlx::query_as(
            r#"
            INSERT INTO tracks (path, title, slug, bitrate, file_size, length, number, album_id, artist_id)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(&track.path)
        .bind(&track.title)
        .bind(&slug)
        .bind(track.bitrate.map(i64::from))
        .bind(track.file_size.and_then(|s| i64::try_from(s).ok()))
        .bind(track.length)
        .bind(track.number.map(i64::from))
        .bind(track.album.map(|k| summary.album_ids[k.index()]))
        .bind(track.artist.map(|k| summary.artist_ids[k.index()]))
        .fetch_one(&mut *tx)
        .await?;
        summary.track_ids.push(id);
    }

    tx.commit().await?;
    Ok(summary)
}

/// Get all artists, ordered by id.
pub async fn get_all_artists(pool: &SqlitePool) -> sqlx::Result<Vec<Artist>> {
    sqlx::query_as::<_, Artist>("SELECT id, name, slug, image FROM artists ORDER BY id")
        .fetch_all(pool)
        .await
}

/// Get all albums, ordered by id.
pub async fn get_all_albums(pool: &SqlitePool) -> sqlx::Result<Vec<Album>> {
    sqlx::query_as::<_, Album>("SELECT id, name, slug, year, cover FROM albums ORDER BY id")
        .fetch_all(pool)
        .await
}

/// Get all tracks, ordered by id.
pub async fn get_all_tracks(pool: &SqlitePool) -> sqlx::Result<Vec<Track>> {
    sqlx::query_as::<_, Track>(
        r#"
        SELECT id, path, title, slug, bitrate, file_size, length, number, album_id, artist_id
        FROM tracks ORDER BY id
        "#,
    )
    .fetch_all(pool)
    .await
}

/// Get a track by its file path.
pub async fn get_track_by_path(pool: &SqlitePool, path: &str) -> sqlx::Result<Option<Track>> {
    sqlx::query_as::<_, Track>(
        r#"
        SELECT id, path, title, slug, bitrate, file_size, length, number, album_id, artist_id
        FROM tracks WHERE path = ?
        "#,
    )
    .bind(path)
    .fetch_optional(pool)
    .await
}

/// Ids of the artists credited on an album.
pub async fn get_album_artist_ids(pool: &SqlitePool, album_id: i64) -> sqlx::Result<Vec<i64>> {
    sqlx::query_scalar("SELECT artist_id FROM album_artists WHERE album_id = ? ORDER BY artist_id")
        .bind(album_id)
        .fetch_all(pool)
        .await
}
