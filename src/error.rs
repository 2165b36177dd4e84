//! Application-wide error types.
//!
//! Library modules use specific error types via `thiserror`, while the
//! CLI uses `anyhow` for convenient error propagation.
//!
//! # Propagation
//!
//! Per-file failures ([`Error::UnreadableFile`], [`Error::Io`], lookup
//! [`Error::Database`] errors) are contained by the indexing loop: they are
//! logged against the offending path and the run moves on. Only
//! [`Error::Config`] and [`Error::Commit`] reach the caller of a run.
//! [`Error::Enrichment`] never leaves the resolver; it degrades to local tags.

use std::path::PathBuf;

/// Application-wide result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level application error.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// File I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Database error outside the final commit (lookups, setup)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Database migration error
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// The file could not be opened or stat'ed
    #[error("Unreadable file {path}: {message}")]
    UnreadableFile { path: PathBuf, message: String },

    /// Tag metadata could not be written back to the file
    #[error("Metadata error for {path}: {message}")]
    Metadata { path: PathBuf, message: String },

    /// Remote enrichment lookup failed
    #[error("Enrichment error: {0}")]
    Enrichment(#[from] crate::enrichment::EnrichmentError),

    /// Invalid or incomplete configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// The end-of-run batch write failed; nothing from the run was persisted
    #[error("Failed to commit indexed batch: {0}")]
    Commit(#[source] sqlx::Error),

    /// Generic error with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Create an unreadable-file error.
    pub fn unreadable(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::UnreadableFile {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a metadata error.
    pub fn metadata(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Metadata {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a config error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Add context to an error.
    pub fn context(self, ctx: impl Into<String>) -> Self {
        Self::WithContext {
            context: ctx.into(),
            source: Box::new(self),
        }
    }
}

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn with_context(self, ctx: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn with_context(self, ctx: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.context(ctx))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, std::io::Error> {
    fn with_context(self, ctx: impl Into<String>) -> Result<T> {
        self.map_err(|e| Error::Io(e).context(ctx))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, sqlx::Error> {
    fn with_context(self, ctx: impl Into<String>) -> Result<T> {
        self.map_err(|e| Error::Database(e).context(ctx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unreadable_error_mentions_path() {
        let err = Error::unreadable("/music/song.mp3", "no frames found");
        let msg = err.to_string();
        assert!(msg.contains("song.mp3"));
        assert!(msg.contains("no frames found"));
    }

    #[test]
    fn test_error_with_context() {
        let err = Error::config("missing key").context("while starting indexer");
        let msg = err.to_string();
        assert!(msg.contains("while starting indexer"));
        assert!(msg.contains("missing key"));
    }

    #[test]
    fn test_commit_error_display() {
        let err = Error::Commit(sqlx::Error::PoolClosed);
        assert!(err.to_string().starts_with("Failed to commit indexed batch"));
    }

    #[test]
    fn test_result_ext() {
        let result: Result<()> = Err(Error::config("test"));
        let with_ctx = result.with_context("additional context");
        assert!(with_ctx.unwrap_err().to_string().contains("additional context"));
    }
}
