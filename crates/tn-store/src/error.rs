use thiserror::Error;

use tn_core::NodeId;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store parse error: {0}")]
    Parse(String),

    #[error("duplicate node id {0}")]
    DuplicateNode(NodeId),

    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;
