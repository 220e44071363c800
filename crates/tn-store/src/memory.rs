//! In-memory store for loaded snapshots and tests.
//!
//! # Spatial index
//!
//! An R-tree (via `rstar`) over `[lat, lng]` answers bounding-box queries.
//! Only nodes whose coordinates parse are indexed; malformed nodes are still
//! listed by [`GraphStore::list_nodes`] so the planner sees exactly what the
//! data contains.

use rstar::{RTree, RTreeObject, AABB};
use rustc_hash::FxHashMap;

use tn_core::{EdgeId, NodeId};

use crate::model::{Edge, FlowSample, Node};
use crate::store::{FlowStore, GraphStore};
use crate::{StoreError, StoreResult};

// ── R-tree node entry ─────────────────────────────────────────────────────────

/// Entry stored in the spatial index: a 2-D `[lat, lng]` point with the
/// position of the node in `MemoryStore::nodes`.
#[derive(Clone)]
struct NodeEntry {
    point: [f64; 2],
    slot:  usize,
}

impl RTreeObject for NodeEntry {
    type Envelope = AABB<[f64; 2]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

// ── MemoryStore ───────────────────────────────────────────────────────────────

/// Immutable in-memory implementation of [`GraphStore`] and [`FlowStore`].
///
/// Do not construct directly; use [`MemoryStoreBuilder`] or
/// [`MemoryStore::new`].
pub struct MemoryStore {
    nodes:       Vec<Node>,
    node_by_id:  FxHashMap<NodeId, usize>,
    edges:       Vec<Edge>,
    flows:       FxHashMap<(NodeId, u32, u8), FlowSample>,
    flows_by_day: FxHashMap<u32, Vec<FlowSample>>,
    spatial_idx: RTree<NodeEntry>,
}

impl MemoryStore {
    /// Build from record lists.
    ///
    /// Fails with [`StoreError::DuplicateNode`] if two nodes share an id.
    /// A repeated `(node, day, slot)` flow sample replaces the earlier one.
    pub fn new(nodes: Vec<Node>, edges: Vec<Edge>, flows: Vec<FlowSample>) -> StoreResult<Self> {
        let mut node_by_id = FxHashMap::default();
        node_by_id.reserve(nodes.len());
        for (slot, node) in nodes.iter().enumerate() {
            if node_by_id.insert(node.id, slot).is_some() {
                return Err(StoreError::DuplicateNode(node.id));
            }
        }

        let mut by_key: FxHashMap<(NodeId, u32, u8), FlowSample> = FxHashMap::default();
        for sample in flows {
            by_key.insert((sample.node_id, sample.day, sample.time_slot), sample);
        }
        let mut flows_by_day: FxHashMap<u32, Vec<FlowSample>> = FxHashMap::default();
        for sample in by_key.values() {
            flows_by_day.entry(sample.day).or_default().push(*sample);
        }
        for day in flows_by_day.values_mut() {
            day.sort_by_key(|s| (s.node_id, s.time_slot));
        }

        // Bulk-load the R-tree; malformed nodes are left out of the index.
        let entries: Vec<NodeEntry> = nodes
            .iter()
            .enumerate()
            .filter_map(|(slot, n)| {
                n.position().ok().map(|p| NodeEntry { point: [p.lat, p.lng], slot })
            })
            .collect();
        let spatial_idx = RTree::bulk_load(entries);

        Ok(Self { nodes, node_by_id, edges, flows: by_key, flows_by_day, spatial_idx })
    }

    /// A store with no nodes, edges or flow samples.
    pub fn empty() -> Self {
        Self {
            nodes:        Vec::new(),
            node_by_id:   FxHashMap::default(),
            edges:        Vec::new(),
            flows:        FxHashMap::default(),
            flows_by_day: FxHashMap::default(),
            spatial_idx:  RTree::new(),
        }
    }

    pub fn builder() -> MemoryStoreBuilder {
        MemoryStoreBuilder::new()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn flow_count(&self) -> usize {
        self.flows.len()
    }
}

impl GraphStore for MemoryStore {
    fn list_nodes(&self) -> StoreResult<Vec<Node>> {
        Ok(self.nodes.clone())
    }

    fn list_edges(&self) -> StoreResult<Vec<Edge>> {
        Ok(self.edges.clone())
    }

    fn find_node(&self, id: NodeId) -> StoreResult<Option<Node>> {
        Ok(self.node_by_id.get(&id).map(|&slot| self.nodes[slot].clone()))
    }

    fn nodes_in_bounds(
        &self,
        min_lat: f64,
        max_lat: f64,
        min_lng: f64,
        max_lng: f64,
    ) -> StoreResult<Vec<Node>> {
        if min_lat > max_lat || min_lng > max_lng {
            return Ok(Vec::new());
        }
        let envelope = AABB::from_corners([min_lat, min_lng], [max_lat, max_lng]);
        let mut found: Vec<Node> = self
            .spatial_idx
            .locate_in_envelope(&envelope)
            .map(|e| self.nodes[e.slot].clone())
            .collect();
        found.sort_by_key(|n| n.id);
        Ok(found)
    }
}

impl FlowStore for MemoryStore {
    fn find_flow(&self, node: NodeId, day: u32, time_slot: u8) -> StoreResult<Option<FlowSample>> {
        Ok(self.flows.get(&(node, day, time_slot)).copied())
    }

    fn list_flows_for_day(&self, day: u32) -> StoreResult<Vec<FlowSample>> {
        Ok(self.flows_by_day.get(&day).cloned().unwrap_or_default())
    }
}

// ── MemoryStoreBuilder ────────────────────────────────────────────────────────

/// Collect records incrementally, then call [`build`](Self::build).
///
/// Edge ids are assigned sequentially from 1 in insertion order.
///
/// # Example
///
/// ```
/// use tn_core::NodeId;
/// use tn_store::MemoryStore;
///
/// let mut b = MemoryStore::builder();
/// b.add_node(NodeId(1), 39.90, 116.40);
/// b.add_node(NodeId(2), 39.91, 116.40);
/// b.add_edge(NodeId(1), NodeId(2), Some(1.1));
/// b.add_flow(1, 8, NodeId(2), 120);
/// let store = b.build().unwrap();
/// assert_eq!(store.node_count(), 2);
/// assert_eq!(store.edge_count(), 1); // stored once, reversed by the planner
/// ```
#[derive(Default)]
pub struct MemoryStoreBuilder {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    flows: Vec<FlowSample>,
}

impl MemoryStoreBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node with numeric coordinates.
    pub fn add_node(&mut self, id: NodeId, lat: f64, lng: f64) -> &mut Self {
        self.nodes.push(Node::at(id, lat, lng));
        self
    }

    /// Add a node with coordinates in their raw text form (may be malformed).
    pub fn add_node_text(&mut self, id: NodeId, lat: &str, lng: &str) -> &mut Self {
        self.nodes.push(Node::new(id, lat, lng));
        self
    }

    /// Add an undirected edge and return its id.
    pub fn add_edge(&mut self, a: NodeId, b: NodeId, distance_km: Option<f64>) -> EdgeId {
        let id = EdgeId(self.edges.len() as u32 + 1);
        self.edges.push(Edge::new(id, a, b, distance_km));
        id
    }

    pub fn add_flow(&mut self, day: u32, time_slot: u8, node: NodeId, flow: u32) -> &mut Self {
        self.flows.push(FlowSample { day, time_slot, node_id: node, flow });
        self
    }

    pub fn build(self) -> StoreResult<MemoryStore> {
        MemoryStore::new(self.nodes, self.edges, self.flows)
    }
}
