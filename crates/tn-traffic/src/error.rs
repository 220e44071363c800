use std::time::Duration;

use thiserror::Error;

/// Why a prediction attempt failed.  Always absorbed by the fallback chain.
#[derive(Debug, Error)]
pub enum TrafficError {
    #[error("prediction service request failed: {0}")]
    Network(String),

    #[error("prediction service timed out after {0:?}")]
    Timeout(Duration),

    #[error("prediction service returned status {0}")]
    Status(u16),

    #[error("malformed prediction payload: {0}")]
    Malformed(String),

    #[error("prediction service disabled")]
    Disabled,
}

pub type TrafficResult<T> = Result<T, TrafficError>;
