//! Error types for jsonview

/// All errors produced while loading, configuring or laying out a document.
///
/// Nothing here is fatal to the host: every failure leaves the previously
/// rendered document in place.
#[derive(thiserror::Error, Debug)]
pub enum ViewError {
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("JSON nesting exceeds the limit of {limit} levels")]
    TooDeep { limit: usize },

    #[error("Invalid style option: {0}")]
    Config(String),

    #[error("Config file error: {0}")]
    ConfigFile(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Font error: {0}")]
    Font(String),

    #[error("Network error: {0}")]
    Fetch(#[from] reqwest::Error),

    #[error("HTTP error {status} while loading {url}")]
    Http { status: u16, url: String },

    #[error("Rejected source: {0}")]
    Source(String),
}

pub type Result<T> = std::result::Result<T, ViewError>;
