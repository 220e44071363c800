//! Read-side contracts of the external data store.
//!
//! # Thread safety
//!
//! Implementations must be `Send + Sync`: one store instance serves every
//! concurrent plan request.

use tn_core::NodeId;

use crate::model::{Edge, FlowSample, Node};
use crate::StoreResult;

/// Road graph read API.
pub trait GraphStore: Send + Sync {
    /// Every stored node, in store order.
    fn list_nodes(&self) -> StoreResult<Vec<Node>>;

    /// Every stored edge, in store order.
    fn list_edges(&self) -> StoreResult<Vec<Edge>>;

    fn find_node(&self, id: NodeId) -> StoreResult<Option<Node>>;

    /// Nodes whose parsed position lies inside the inclusive bounding box,
    /// sorted by id.  Nodes with malformed coordinates are never returned.
    ///
    /// The default implementation scans [`list_nodes`](Self::list_nodes);
    /// indexed stores should override it.
    fn nodes_in_bounds(
        &self,
        min_lat: f64,
        max_lat: f64,
        min_lng: f64,
        max_lng: f64,
    ) -> StoreResult<Vec<Node>> {
        let mut found: Vec<Node> = self
            .list_nodes()?
            .into_iter()
            .filter(|n| {
                n.position()
                    .map(|p| p.within_bounds(min_lat, max_lat, min_lng, max_lng))
                    .unwrap_or(false)
            })
            .collect();
        found.sort_by_key(|n| n.id);
        Ok(found)
    }
}

/// Historical flow read API.
pub trait FlowStore: Send + Sync {
    fn find_flow(&self, node: NodeId, day: u32, time_slot: u8) -> StoreResult<Option<FlowSample>>;

    /// Every sample recorded on `day`, any slot, any node.
    fn list_flows_for_day(&self, day: u32) -> StoreResult<Vec<FlowSample>>;
}
