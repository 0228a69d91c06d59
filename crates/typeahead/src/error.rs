//! Error types for the widget crate.

use std::path::PathBuf;

use typeahead_core::DocumentError;
use typeahead_net::NetworkError;

/// Errors raised while loading or applying [`TypeaheadSettings`](crate::TypeaheadSettings).
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// The settings file could not be read.
    #[error("Failed to read settings '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The settings text is not valid TOML for this schema.
    #[error("Invalid settings: {0}")]
    Parse(#[from] toml::de::Error),

    /// `base_url` is not an absolute URL.
    #[error("Invalid base URL '{url}': {source}")]
    InvalidBaseUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// `attribute_prefix` does not form a valid attribute selector.
    #[error("Invalid attribute prefix: {0}")]
    InvalidAttributePrefix(#[source] DocumentError),

    /// The HTTP client could not be built from the settings.
    #[error("Failed to build HTTP client: {0}")]
    Client(#[from] NetworkError),
}

impl SettingsError {
    /// Create an I/O error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Errors a [`SuggestionSource`](crate::SuggestionSource) can report.
///
/// None of these reach the user; the lifecycle logs them and renders nothing.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// Transport-level failure, including unresolvable endpoints.
    #[error(transparent)]
    Network(#[from] NetworkError),

    /// The response body was not valid JSON.
    #[error("Malformed suggestion payload: {0}")]
    Payload(#[from] serde_json::Error),

    /// The request was abandoned because a newer one superseded it.
    #[error("Request was cancelled")]
    Cancelled,

    /// A custom source failed.
    #[error("{0}")]
    Other(String),
}

impl FetchError {
    /// Check whether this error represents a superseded request.
    pub fn is_cancelled(&self) -> bool {
        match self {
            Self::Cancelled => true,
            Self::Network(err) => err.is_cancelled(),
            _ => false,
        }
    }
}
