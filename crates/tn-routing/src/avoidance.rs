//! Congested-node set for the `avoidingtraffic` policy.

use rustc_hash::FxHashSet;

use tn_core::NodeId;
use tn_store::FlowSample;

/// Nodes the search must not pass through.
#[derive(Clone, Default, Debug)]
pub struct AvoidanceSet {
    nodes: FxHashSet<NodeId>,
}

impl AvoidanceSet {
    /// Congested nodes of `day`.
    ///
    /// A node is congested if any of its samples on `day`, in any slot,
    /// exceeds `threshold`.  Samples of other days are ignored.
    pub fn from_flows(samples: &[FlowSample], day: u32, threshold: u32) -> Self {
        let nodes = samples
            .iter()
            .filter(|s| s.day == day && s.flow > threshold)
            .map(|s| s.node_id)
            .collect();
        Self { nodes }
    }

    pub fn from_nodes(nodes: impl IntoIterator<Item = NodeId>) -> Self {
        Self { nodes: nodes.into_iter().collect() }
    }

    #[inline]
    pub fn contains(&self, node: NodeId) -> bool {
        self.nodes.contains(&node)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Members sorted by id.
    pub fn to_sorted_vec(&self) -> Vec<NodeId> {
        let mut v: Vec<NodeId> = self.nodes.iter().copied().collect();
        v.sort_unstable();
        v
    }
}
