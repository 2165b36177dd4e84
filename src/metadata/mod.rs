//! Audio file tag reading and writing.
//!
//! Uses the lofty crate for format-independent metadata access, so ID3v2,
//! Vorbis comments and FLAC metadata all come through the same [`TagReader`].
//!
//! # Behavior
//! - A file that exists but cannot be parsed still opens; the reader reports
//!   [`TagReader::is_valid`] as `false` and every tag getter returns `None`.
//! - Text values are trimmed; a value that is blank after trimming is absent.
//! - Multi-valued frames collapse to their first value.
//! - [`TagReader::title`] falls back to the file stem and is never empty.
//! - Setters write straight through to the file.

use lofty::config::{ParseOptions, ParsingMode, WriteOptions};
use lofty::file::{AudioFile, TaggedFile, TaggedFileExt};
use lofty::probe::Probe;
use lofty::tag::{Accessor, Tag, TagExt};
use std::borrow::Cow;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Snapshot of the tag fields the indexer persists.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackTag {
    pub path: PathBuf,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub title: String,
    pub release_year: Option<i32>,
    /// Audio bitrate in kbps
    pub bitrate: Option<u32>,
    pub length_seconds: Option<f64>,
    pub track_number: Option<u32>,
    pub size_bytes: u64,
}

impl TrackTag {
    /// Artist, album and title are all present and non-empty.
    pub fn has_essential_tags(&self) -> bool {
        self.artist.is_some() && self.album.is_some() && !self.title.is_empty()
    }
}

/// Normalized read/write view over one audio file's tags.
pub struct TagReader {
    path: PathBuf,
    size_bytes: u64,
    file: Option<TaggedFile>,
}

impl std::fmt::Debug for TagReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TagReader")
            .field("path", &self.path)
            .field("valid", &self.is_valid())
            .finish()
    }
}

impl TagReader {
    /// Open a file and parse its tags.
    ///
    /// Fails only when the file cannot be stat'ed or is not a regular file.
    /// Parse failures are recorded as an invalid reader. A single malformed
    /// field (a non-numeric date, say) only loses that field.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let meta = std::fs::metadata(&path).map_err(|e| Error::unreadable(&path, e.to_string()))?;
        if !meta.is_file() {
            return Err(Error::unreadable(&path, "not a regular file"));
        }

        // Relaxed parsing drops a malformed frame instead of the whole file
        let options = ParseOptions::new().parsing_mode(ParsingMode::Relaxed);
        let file = match Probe::open(&path).and_then(|probe| probe.options(options).read()) {
            Ok(file) => Some(file),
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "Tag parsing failed");
                None
            }
        };

        Ok(Self {
            path,
            size_bytes: meta.len(),
            file,
        })
    }

    /// Whether the file's headers and tags could be parsed.
    pub fn is_valid(&self) -> bool {
        self.file.is_some()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn tag(&self) -> Option<&Tag> {
        let file = self.file.as_ref()?;
        file.primary_tag().or_else(|| file.first_tag())
    }

    pub fn artist(&self) -> Option<String> {
        self.tag().and_then(|t| clean(t.artist()))
    }

    pub fn album(&self) -> Option<String> {
        self.tag().and_then(|t| clean(t.album()))
    }

    /// Tag title, or the file name without extension when the tag is absent.
    pub fn title(&self) -> String {
        self.tag()
            .and_then(|t| clean(t.title()))
            .unwrap_or_else(|| {
                self.path
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_default()
            })
    }

    /// Release year; `None` when the date tag is missing or not numeric.
    pub fn release_year(&self) -> Option<i32> {
        self.tag()
            .and_then(|t| t.year())
            .and_then(|y| i32::try_from(y).ok())
    }

    pub fn track_number(&self) -> Option<u32> {
        self.tag().and_then(|t| t.track())
    }

    /// Audio bitrate in kbps, when the container reports one.
    pub fn bitrate(&self) -> Option<u32> {
        self.file
            .as_ref()
            .and_then(|f| f.properties().audio_bitrate())
    }

    pub fn length_seconds(&self) -> Option<f64> {
        let duration = self.file.as_ref()?.properties().duration();
        (!duration.is_zero()).then(|| duration.as_secs_f64())
    }

    pub fn size_bytes(&self) -> u64 {
        self.size_bytes
    }

    pub fn has_essential_tags(&self) -> bool {
        self.artist().is_some() && self.album().is_some() && !self.title().is_empty()
    }

    /// Read every field once into an owned [`TrackTag`].
    pub fn to_track_tag(&self) -> TrackTag {
        TrackTag {
            path: self.path.clone(),
            artist: self.artist(),
            album: self.album(),
            title: self.title(),
            release_year: self.release_year(),
            bitrate: self.bitrate(),
            length_seconds: self.length_seconds(),
            track_number: self.track_number(),
            size_bytes: self.size_bytes,
        }
    }

    pub fn set_artist(&mut self, name: &str) -> Result<()> {
        let name = name.trim().to_string();
        self.write(|tag| tag.set_artist(name))
    }

    pub fn set_album(&mut self, name: &str) -> Result<()> {
        let name = name.trim().to_string();
        self.write(|tag| tag.set_album(name))
    }

    pub fn set_release_year(&mut self, year: u32) -> Result<()> {
        self.write(|tag| tag.set_year(year))
    }

    /// Apply `edit` to the primary tag (creating it if needed) and save.
    fn write(&mut self, edit: impl FnOnce(&mut Tag)) -> Result<()> {
        let path = self.path.clone();
        let Some(file) = self.file.as_mut() else {
            return Err(Error::metadata(&path, "file has no readable tags to update"));
        };

        let tag_type = file.primary_tag_type();
        if file.tag(tag_type).is_none() {
            file.insert_tag(Tag::new(tag_type));
        }
        let Some(tag) = file.tag_mut(tag_type) else {
            return Err(Error::metadata(&path, "could not create tag"));
        };

        edit(tag);
        tag.save_to_path(&path, WriteOptions::default())
            .map_err(|e| Error::metadata(&path, e.to_string()))
    }
}

fn clean(value: Option<Cow<'_, str>>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
