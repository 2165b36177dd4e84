//! Media directory traversal.
//!
//! [`scan`] walks a root depth-first and lazily yields every regular file
//! whose extension (case-insensitive) is accepted. Symlinked files and
//! directories are followed; a link loop is reported by walkdir as an error
//! entry and skipped. Each call starts a fresh walk.

use std::path::{Path, PathBuf};

use tracing::warn;
use walkdir::WalkDir;

/// Extensions indexed when the configuration does not override them.
pub const KNOWN_EXTENSIONS: &[&str] = &["mp3", "ogg", "flac"];

/// Check if a path has one of the accepted extensions.
///
/// `formats` entries are compared case-insensitively and may carry a
/// leading dot.
pub fn is_accepted(path: &Path, formats: &[String]) -> bool {
    let Some(ext) = path.extension().and_then(|s| s.to_str()) else {
        return false;
    };
    formats
        .iter()
        .any(|f| f.trim_start_matches('.').eq_ignore_ascii_case(ext))
}

/// Scans `root` recursively for audio files.
///
/// A missing root logs a warning and yields nothing. Entries that cannot be
/// read mid-walk are logged and skipped. The root is made absolute so every
/// yielded path is too.
pub fn scan(root: &Path, formats: &[String]) -> impl Iterator<Item = PathBuf> {
    let formats = formats.to_vec();
    let root = if root.exists() {
        Some(std::path::absolute(root).unwrap_or_else(|_| root.to_path_buf()))
    } else {
        warn!(root = %root.display(), "Media directory does not exist");
        None
    };

    root.into_iter()
        .flat_map(|root| WalkDir::new(root).follow_links(true).into_iter())
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!(error = %e, "Skipping unreadable directory entry");
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(move |path| is_accepted(path, &formats))
}
