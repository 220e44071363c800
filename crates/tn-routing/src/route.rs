//! Planner output.

use serde::Serialize;

use tn_core::{CongestionLevel, EdgeId, GeoPoint, NodeId, RouteType};

use crate::adjacency::{RejectedEdge, RejectedNode};

/// What the planner had to work around while answering a request.
#[derive(Clone, Default, Debug, Serialize)]
pub struct PlanDiagnostics {
    /// Edges weighed with the default distance because none was stored.
    pub substituted_edges: Vec<EdgeId>,
    pub rejected_edges:    Vec<RejectedEdge>,
    pub rejected_nodes:    Vec<RejectedNode>,
    /// Edges skipped during the search for a negative or non-finite weight.
    pub invalid_weights:   Vec<EdgeId>,
    /// Nodes excluded as congested.
    pub avoided_nodes:     Vec<NodeId>,
    // Flow estimates consulted, per fallback tier.
    pub predicted:         usize,
    pub historical:        usize,
    pub defaulted:         usize,
    /// Result of the availability probe; `false` when traffic was not used.
    pub service_available: bool,
}

/// A planned route.
///
/// `points` runs raw start → path node positions → raw end, so it always
/// holds at least two points.  `total_distance_km` is the great-circle length
/// of that polyline, not the solver cost.
#[derive(Clone, Debug, Serialize)]
pub struct Route {
    pub points:            Vec<GeoPoint>,
    pub node_path:         Vec<NodeId>,
    pub total_distance_km: f64,
    pub total_time_min:    f64,
    pub route_type:        RouteType,
    /// Sum of edge distances along `node_path`.
    pub graph_distance_km: f64,
    /// Worst congestion among path nodes; `None` when flow was not consulted.
    pub peak_congestion:   Option<CongestionLevel>,
    pub diagnostics:       PlanDiagnostics,
}

impl Route {
    /// Policy name as accepted on input (`shortest`, `fastest`,
    /// `avoidingtraffic`).
    pub fn route_type_name(&self) -> &'static str {
        self.route_type.as_str()
    }
}
