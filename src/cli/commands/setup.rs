//! Starter config file.

use std::path::PathBuf;

use crate::config::{self, Config, ConfigError};

/// Write a default config to `path` (or the OS config directory)
pub fn cmd_init_config(path: Option<&PathBuf>, force: bool) -> anyhow::Result<()> {
    let path = match path {
        Some(p) => p.clone(),
        None => config::config_path().ok_or(ConfigError::NoConfigDir)?,
    };

    if path.exists() && !force {
        anyhow::bail!("{} already exists (use --force to replace it)", path.display());
    }

    config::save_to(&Config::default(), &path)?;
    println!("Wrote {}", path.display());
    println!("Add your music folders under [library] media_dirs.");
    Ok(())
}
