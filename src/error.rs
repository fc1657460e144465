//! Error types for dashsync

use thiserror::Error;

/// Result type alias for dashsync operations
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type for the application
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Connectivity-class failures abort the current cycle; everything else
    /// is handled per item.
    pub fn is_fatal(&self) -> bool {
        match self {
            Error::Registry(e) => matches!(
                e,
                RegistryError::Unavailable(_) | RegistryError::Unauthorized
            ),
            Error::Backend(e) => matches!(
                e,
                BackendError::Unavailable(_) | BackendError::Unauthorized
            ),
            Error::Config(_) | Error::Io(_) | Error::Json(_) => true,
        }
    }
}

/// Source registry errors
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("registry unreachable: {0}")]
    Unavailable(String),

    #[error("registry rejected the API token")]
    Unauthorized,

    #[error("malformed registry response: {0}")]
    InvalidResponse(String),
}

impl From<reqwest::Error> for RegistryError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            RegistryError::Unavailable("request timed out".to_string())
        } else if err.is_connect() {
            RegistryError::Unavailable("failed to connect".to_string())
        } else {
            RegistryError::Unavailable(err.to_string())
        }
    }
}

/// Visualization backend errors
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("backend unreachable: {0}")]
    Unavailable(String),

    #[error("backend rejected the credentials")]
    Unauthorized,

    #[error("not found: {0}")]
    NotFound(String),

    #[error("team name {name:?} matches {count} teams")]
    AmbiguousTeam { name: String, count: usize },

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("backend server error: {0}")]
    ServerError(String),

    #[error("malformed backend response: {0}")]
    InvalidResponse(String),
}

impl From<reqwest::Error> for BackendError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            BackendError::Unavailable("request timed out".to_string())
        } else if err.is_connect() {
            BackendError::Unavailable("failed to connect".to_string())
        } else {
            BackendError::Unavailable(err.to_string())
        }
    }
}

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing configuration: {0}")]
    Missing(String),

    #[error("invalid configuration: {0}")]
    Invalid(String),

    #[error("dashboard template error: {0}")]
    Template(String),
}
