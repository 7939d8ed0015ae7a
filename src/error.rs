//! Error types for share-link encoding, decoding and resolution

use chrono::{DateTime, Utc};

/// Main error type for share-link operations
///
/// Structural and integrity errors (`Format`, `Alphabet`,
/// `ChecksumMismatch`, `CountMismatch`) are fail-closed: decoding rejects
/// the whole payload rather than returning a truncated answer set.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ShareLinkError {
    #[error("Malformed link: {0}")]
    Format(String),

    #[error("Character outside the radix alphabet: {0:?}")]
    Alphabet(char),

    #[error("Checksum mismatch: transmitted {transmitted}, computed {computed}")]
    ChecksumMismatch { transmitted: u64, computed: u16 },

    #[error("Element count mismatch: declared {declared}, decoded {decoded}")]
    CountMismatch { declared: usize, decoded: usize },

    #[error("Shared result not found: {0}")]
    NotFound(String),

    #[error("Shared result expired at {0}")]
    Expired(DateTime<Utc>),

    #[error("Fallback blob decode failed: {0}")]
    Decode(String),

    #[error("Result store unreachable: {0}")]
    Network(String),
}

impl From<serde_json::Error> for ShareLinkError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(format!("JSON error: {}", err))
    }
}

impl From<base64::DecodeError> for ShareLinkError {
    fn from(err: base64::DecodeError) -> Self {
        Self::Decode(format!("base64 error: {}", err))
    }
}

impl From<reqwest::Error> for ShareLinkError {
    fn from(err: reqwest::Error) -> Self {
        Self::Network(err.to_string())
    }
}

/// Result type alias for share-link operations
pub type Result<T> = std::result::Result<T, ShareLinkError>;
