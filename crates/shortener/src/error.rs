use thiserror::Error;

/// Result type for shortener construction and configuration
pub type Result<T> = std::result::Result<T, ShortenerError>;

/// Errors raised while building a shortener.
///
/// Shortening itself never fails; these only surface from configuration.
#[derive(Error, Debug)]
pub enum ShortenerError {
    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Size override for a kind that does not exist
    #[error("Unknown size limit: {0}")]
    UnknownSizeKey(String),

    /// Key pattern that cannot be compiled
    #[error("Invalid key pattern {pattern:?}: {reason}")]
    InvalidPattern { pattern: String, reason: String },

    /// Text that is not a number literal
    #[error("Invalid number literal: {0:?}")]
    InvalidNumber(String),

    /// Config payload is neither JSON nor TOML
    #[error("Config parse error: {0}")]
    ConfigParse(String),

    /// IO error occurred
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl ShortenerError {
    /// Create an invalid config error
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Create an invalid pattern error
    pub fn invalid_pattern(pattern: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidPattern {
            pattern: pattern.into(),
            reason: reason.into(),
        }
    }
}
