use thiserror::Error;

use tn_core::{CoreError, NodeId};
use tn_store::StoreError;

/// Every way a plan request can fail.  No failure is ever reported as an
/// empty or zero-cost route.
#[derive(Debug, Error)]
pub enum PlanError {
    #[error("malformed coordinate (lat {lat:?}, lng {lng:?})")]
    MalformedCoordinate { lat: String, lng: String },

    #[error("data integrity violation at {node}: {reason}")]
    DataIntegrity { node: NodeId, reason: String },

    #[error("{0} is not a usable node of the graph")]
    UnknownNode(NodeId),

    #[error("graph has no usable node to attach the request to")]
    NoNearbyNode,

    #[error("no path from {from} to {to}")]
    PathNotFound { from: NodeId, to: NodeId },

    #[error("plan request cancelled")]
    Cancelled,

    #[error("configuration error: {0}")]
    Config(String),

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl From<CoreError> for PlanError {
    fn from(e: CoreError) -> Self {
        match e {
            CoreError::MalformedCoordinate { lat, lng } => PlanError::MalformedCoordinate { lat, lng },
            other => PlanError::Config(other.to_string()),
        }
    }
}

/// Shorthand result type for `tn-routing`.
pub type PlanResult<T> = Result<T, PlanError>;
