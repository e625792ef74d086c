//! Configuration management for the session console

pub mod file;

use self::file::ConsoleConfigFile;
use crate::{Error, Result};

/// Environment variable naming the session endpoint prefix
pub const BASE_URL_ENV: &str = "RTVI_BASE_URL";

/// Endpoint prefix used when nothing is configured
///
/// Relative, so it only resolves behind a same-origin proxy; a standalone
/// console needs an absolute `http(s)://` prefix to connect.
pub const DEFAULT_BASE_URL: &str = "/api";

/// Resolved console settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Endpoint prefix handed to the session client
    pub base_url: String,
}

impl Settings {
    /// Load settings (env > toml > default)
    #[must_use]
    pub fn load() -> Self {
        Self::resolve(std::env::var(BASE_URL_ENV).ok(), file::load_config_file())
    }

    /// Layer an environment value over a parsed config file
    #[must_use]
    pub fn resolve(env_base_url: Option<String>, fc: ConsoleConfigFile) -> Self {
        let base_url = env_base_url
            .filter(|s| !s.trim().is_empty())
            .or(fc.session.base_url)
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        Self { base_url }
    }
}

/// Check that a base URL is absolute enough for the HTTP client to connect
///
/// # Errors
///
/// Returns error if `base_url` has no `http` or `https` scheme
pub fn validate_base_url(base_url: &str) -> Result<()> {
    let absolute = base_url
        .split_once("://")
        .is_some_and(|(scheme, rest)| matches!(scheme, "http" | "https") && !rest.is_empty());
    if absolute {
        Ok(())
    } else {
        Err(Error::Config(format!(
            "base url {base_url:?} is not an absolute http(s) url"
        )))
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::resolve(None, ConsoleConfigFile::default())
    }
}
