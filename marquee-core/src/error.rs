use std::path::PathBuf;

use marquee_model::{ModelError, PageIndex};
use reqwest::StatusCode;
use thiserror::Error;

/// Boxed error from an injected page source.
pub type SourceError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Failures of a window cache or spotlight.
#[derive(Error, Debug)]
pub enum WindowError {
    /// Sizes that cannot form a window
    #[error("Invalid window configuration: {0}")]
    InvalidConfig(String),

    /// Another bootstrap of the same cache is still running
    #[error("Bootstrap already in flight")]
    BootstrapInFlight,

    /// A bootstrap page failed; nothing was kept
    #[error("Bootstrap failed on page {page}: {source}")]
    Bootstrap {
        /// Page that failed
        page: PageIndex,
        /// Error from the page source
        #[source]
        source: SourceError,
    },

    /// An advance could not load the next page
    #[error("Failed to load page {page}: {source}")]
    PageFetch {
        /// Page that failed
        page: PageIndex,
        /// Error from the page source
        #[source]
        source: SourceError,
    },
}

/// Failures of an [`ApiClient`](crate::ApiClient) call.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Connection, timeout or body failure
    #[error("HTTP error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-success response
    #[error("API error: {}{}", status.as_u16(), message.as_deref().map(|m| format!(" ({m})")).unwrap_or_default())]
    Status {
        /// Response status
        status: StatusCode,
        /// `message` or `error` field of the body
        message: Option<String>,
    },

    /// The session token was rejected and has been cleared
    #[error("Unauthorized - please login again")]
    Unauthorized,

    /// A session endpoint was called without a token
    #[error("Not signed in")]
    NotAuthenticated,

    /// The base URL does not parse
    #[error("Invalid backend URL '{url}': {source}")]
    InvalidUrl {
        /// Normalized URL
        url: String,
        /// Parse failure
        #[source]
        source: url::ParseError,
    },

    /// Body did not match the expected shape
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A value failed model validation
    #[error(transparent)]
    Model(#[from] ModelError),
}

/// Failures while loading a [`ClientConfig`](crate::ClientConfig).
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The config file could not be read
    #[error("Failed to read config file {}: {source}", path.display())]
    Read {
        /// Config file
        path: PathBuf,
        /// I/O failure
        #[source]
        source: std::io::Error,
    },

    /// The config file is not valid TOML for the known keys
    #[error("Failed to parse config file {}: {source}", path.display())]
    Parse {
        /// Config file
        path: PathBuf,
        /// TOML failure
        #[source]
        source: toml::de::Error,
    },

    /// A value could not be parsed
    #[error("Invalid value for {key}: {message}")]
    InvalidValue {
        /// Variable or file key
        key: &'static str,
        /// What was wrong
        message: String,
    },

    /// The sizes do not form a valid window
    #[error(transparent)]
    Window(#[from] WindowError),
}

/// Result of an API call
pub type Result<T> = std::result::Result<T, ApiError>;
