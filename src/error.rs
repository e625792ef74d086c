//! Error types for the realtime session console

use thiserror::Error;

/// Result type alias for session console operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while configuring or driving a session
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Catalog definition violates an invariant
    #[error("catalog error: {0}")]
    Catalog(String),

    /// Selection outside the catalog's bounds
    #[error("selection error: {0}")]
    Selection(String),

    /// Setter input rejected
    #[error("validation error: {0}")]
    Validation(String),

    /// Session client error
    #[error("session error: {0}")]
    Session(String),

    /// Session did not become ready within the configured bound
    #[error("session timed out after {0} ms")]
    Timeout(u128),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP error
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// TOML parsing error
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),
}
