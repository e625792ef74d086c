//! TOML configuration file loading
//!
//! Supports `~/.config/rtvi-console/config.toml` as a persistent config source.
//! All fields are optional; the file is a partial overlay on top of defaults.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::Result;

/// Top-level TOML configuration file schema
#[derive(Debug, Default, Deserialize)]
pub struct ConsoleConfigFile {
    /// Session client configuration
    #[serde(default)]
    pub session: SessionFileConfig,
}

/// Session client configuration
#[derive(Debug, Default, Deserialize)]
pub struct SessionFileConfig {
    /// Endpoint prefix for the session client (e.g. `https://bot.example.com/api`)
    pub base_url: Option<String>,
}

/// Load the TOML config file from the standard path
///
/// Returns `ConsoleConfigFile::default()` if the file doesn't exist or can't be parsed.
pub fn load_config_file() -> ConsoleConfigFile {
    config_file_path().map_or_else(ConsoleConfigFile::default, |path| load_config_from(&path))
}

/// Load a TOML config file from an explicit path
///
/// Returns `ConsoleConfigFile::default()` if the file doesn't exist or can't be parsed.
pub fn load_config_from(path: &Path) -> ConsoleConfigFile {
    if !path.exists() {
        return ConsoleConfigFile::default();
    }

    match read_config_file(path) {
        Ok(config) => {
            tracing::info!(path = %path.display(), "loaded config file");
            config
        }
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "failed to load config file, using defaults"
            );
            ConsoleConfigFile::default()
        }
    }
}

/// Read and parse a TOML config file
///
/// # Errors
///
/// Returns error if the file cannot be read or is not valid TOML
pub fn read_config_file(path: &Path) -> Result<ConsoleConfigFile> {
    let content = std::fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// Return the config file path: `~/.config/rtvi-console/config.toml`
pub fn config_file_path() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|d| d.config_dir().join("rtvi-console").join("config.toml"))
}
