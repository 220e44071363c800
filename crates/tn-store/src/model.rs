//! Stored graph and traffic records, as the data store hands them out.

use serde::{Deserialize, Serialize};

use tn_core::{CoreResult, EdgeId, GeoPoint, NodeId};

/// A road node.  Coordinates stay in their textual storage form until a
/// consumer asks for [`Node::position`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id:        NodeId,
    pub latitude:  String,
    pub longitude: String,
}

impl Node {
    pub fn new(id: NodeId, latitude: impl Into<String>, longitude: impl Into<String>) -> Self {
        Self { id, latitude: latitude.into(), longitude: longitude.into() }
    }

    /// Convenience for numeric sources.
    pub fn at(id: NodeId, lat: f64, lng: f64) -> Self {
        Self::new(id, lat.to_string(), lng.to_string())
    }

    /// Parse the stored coordinates.
    ///
    /// Fails with `CoreError::MalformedCoordinate` for unparseable or
    /// out-of-range text.
    pub fn position(&self) -> CoreResult<GeoPoint> {
        GeoPoint::parse(&self.latitude, &self.longitude)
    }
}

/// An undirected road segment between `node_a` and `node_b`.
///
/// `distance_km` is `None` when the source row carried no value.  A present
/// but negative or non-finite value is kept as-is so the routing layer can
/// reject it as a data-integrity defect instead of guessing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub id:          EdgeId,
    pub node_a:      NodeId,
    pub node_b:      NodeId,
    pub distance_km: Option<f64>,
}

impl Edge {
    pub fn new(id: EdgeId, node_a: NodeId, node_b: NodeId, distance_km: Option<f64>) -> Self {
        Self { id, node_a, node_b, distance_km }
    }
}

/// Observed traffic volume at a node during one hourly slot of a day.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowSample {
    pub day:       u32,
    pub time_slot: u8,
    pub node_id:   NodeId,
    pub flow:      u32,
}
