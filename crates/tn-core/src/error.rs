//! Core error type.
//!
//! Sub-crates define their own error enums and wrap `CoreError` where a core
//! failure crosses into their domain.

use thiserror::Error;

/// Errors produced by `tn-core`.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("malformed coordinate (lat {lat:?}, lng {lng:?})")]
    MalformedCoordinate { lat: String, lng: String },

    #[error("time slot {0} is outside 0..24")]
    InvalidTimeSlot(u8),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("configuration parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Shorthand result type for `tn-core`.
pub type CoreResult<T> = Result<T, CoreError>;
