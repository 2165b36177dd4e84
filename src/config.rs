//! Configuration system using TOML files.
//!
//! Config is stored in the OS-standard config directory:
//! - Windows: %APPDATA%\music-indexer\config.toml
//! - macOS: ~/Library/Application Support/music-indexer/config.toml
//! - Linux: ~/.config/music-indexer/config.toml
//!
//! A different file can be given on the command line. Every section is
//! optional; missing values fall back to defaults.
//!
//! ```toml
//! [library]
//! media_dirs = ["/srv/music", { root = "/mnt/nas", dirs = ["rock", "jazz"] }]
//! accepted_formats = ["mp3", "ogg", "flac"]
//!
//! [credentials]
//! lastfm_api_key = "..."
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::scanner::KNOWN_EXTENSIONS;

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// API credentials
    pub credentials: Credentials,

    /// What to index
    pub library: LibraryConfig,

    /// Where the index lives
    pub database: DatabaseConfig,

    /// Remote lookup settings
    pub enrichment: EnrichmentSettings,
}

/// API credentials
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Credentials {
    /// Last.fm API key, required for `--lastfm`
    pub lastfm_api_key: Option<String>,
}

/// Library settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LibraryConfig {
    /// Media roots to index
    pub media_dirs: Vec<MediaDir>,

    /// File extensions considered audio, without the dot
    pub accepted_formats: Vec<String>,
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            media_dirs: Vec::new(),
            accepted_formats: KNOWN_EXTENSIONS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Database settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// SQLite file (default: `music_indexer.db` in the working directory)
    pub path: Option<PathBuf>,
}

/// Enrichment settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EnrichmentSettings {
    /// Per-request timeout for remote lookups
    pub timeout_secs: u64,
}

impl Default for EnrichmentSettings {
    fn default() -> Self {
        Self { timeout_secs: 10 }
    }
}

/// One configured media location.
///
/// Either a plain directory, or a root with a list of subdirectories that
/// are indexed individually (several physical roots behind one entry).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MediaDir {
    Path(PathBuf),
    Group {
        root: PathBuf,
        #[serde(default)]
        dirs: Vec<PathBuf>,
    },
}

impl MediaDir {
    /// The directories to walk for this entry.
    ///
    /// A group without subdirectories stands for its root.
    pub fn get_dirs(&self) -> Vec<PathBuf> {
        match self {
            MediaDir::Path(path) => vec![path.clone()],
            MediaDir::Group { root, dirs } if dirs.is_empty() => vec![root.clone()],
            MediaDir::Group { root, dirs } => dirs.iter().map(|d| root.join(d)).collect(),
        }
    }
}

impl Config {
    /// The Last.fm key, if one is set and non-blank.
    pub fn lastfm_api_key(&self) -> Option<&str> {
        self.credentials
            .lastfm_api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }

    /// Non-fatal problems worth telling the user before a run.
    pub fn startup_warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        if self.library.media_dirs.is_empty() {
            warnings.push(
                "No media_dirs configured; set [library] media_dirs so there is something to index"
                    .to_string(),
            );
        }
        if self.library.accepted_formats.is_empty() {
            warnings.push(
                "No accepted_formats configured; set [library] accepted_formats so files can be recognized"
                    .to_string(),
            );
        }
        warnings
    }
}

// ============================================================================
// Config File Operations
// ============================================================================

/// Get the config directory path
pub fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("music-indexer"))
}

/// Get the full path to the config file
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|d| d.join("config.toml"))
}

/// Load configuration from the default location
///
/// Returns default config if file doesn't exist or can't be parsed.
/// Logs warnings but doesn't fail - we always return a usable config.
pub fn load() -> Config {
    let Some(path) = config_path() else {
        tracing::warn!("Could not determine config directory, using defaults");
        return Config::default();
    };

    if !path.exists() {
        tracing::info!("No config file found at {:?}, using defaults", path);
        return Config::default();
    }

    match load_from(&path) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("{}", e);
            tracing::warn!("Using default configuration");
            Config::default()
        }
    }
}

/// Load configuration from an explicit file. Errors are returned, not
/// papered over, since the user asked for this file.
pub fn load_from(path: &Path) -> Result<Config, ConfigError> {
    let contents =
        std::fs::read_to_string(path).map_err(|e| ConfigError::Read(path.to_path_buf(), e))?;
    let config = toml::from_str(&contents).map_err(|e| ConfigError::Parse(path.to_path_buf(), e))?;
    tracing::info!("Loaded config from {:?}", path);
    Ok(config)
}

/// Write configuration to `path`, creating parent directories.
///
/// The file is written to a temp sibling and renamed into place.
pub fn save_to(config: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).map_err(|e| ConfigError::CreateDir(dir.to_path_buf(), e))?;
    }

    let contents = toml::to_string_pretty(config).map_err(ConfigError::Serialize)?;

    let temp_path = path.with_extension("toml.tmp");
    std::fs::write(&temp_path, &contents).map_err(|e| ConfigError::Write(temp_path.clone(), e))?;
    std::fs::rename(&temp_path, path)
        .map_err(|e| ConfigError::Rename(temp_path, path.to_path_buf(), e))?;

    tracing::info!("Saved config to {:?}", path);
    Ok(())
}

// ============================================================================
// Error Types
// ============================================================================

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Failed to create config directory {0}: {1}")]
    CreateDir(PathBuf, std::io::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(toml::ser::Error),

    #[error("Failed to write config to {0}: {1}")]
    Write(PathBuf, std::io::Error),

    #[error("Failed to rename temp file {0} to {1}: {2}")]
    Rename(PathBuf, PathBuf, std::io::Error),

    #[error("Failed to read config file {0}: {1}")]
    Read(PathBuf, std::io::Error),

    #[error("Failed to parse config file {0}: {1}")]
    Parse(PathBuf, toml::de::Error),
}

// ============================================================================
// Tests
// ============================================================================
