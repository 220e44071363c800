//! Request-scoped adjacency index.
//!
//! # Data layout
//!
//! Usable nodes are packed into dense *slots* sorted by `NodeId`, so slot
//! order and id order agree.  Outgoing directed edges use **Compressed Sparse
//! Row (CSR)** format: the out-edges of slot `s` occupy
//!
//! ```text
//! edge_*[ out_start[s] .. out_start[s + 1] ]
//! ```
//!
//! Every stored edge `(A, B, d)` contributes both `A → B` and `B → A`; the
//! two directions share the stored `EdgeId` and distance basis.
//!
//! # Exclusions
//!
//! Nodes whose coordinates do not parse, and edges with an unknown endpoint
//! or an invalid distance, are left out and listed in the [`BuildReport`].
//! A *missing* distance is kept as [`EdgeDistance::Missing`] and resolved by
//! the weigher.

use std::ops::Range;

use log::warn;
use rustc_hash::FxHashMap;
use serde::Serialize;

use tn_core::{EdgeId, GeoPoint, NodeId};
use tn_store::{Edge, Node};

// ── Edge views ────────────────────────────────────────────────────────────────

/// Distance basis of a directed edge before policy weighting.
#[derive(Copy, Clone, PartialEq, Debug)]
pub enum EdgeDistance {
    /// Finite, non-negative stored distance in km.
    Stored(f64),
    /// The store had no distance for this edge.
    Missing,
}

/// Read-only view of one directed edge.
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct EdgeRef {
    pub id:       EdgeId,
    pub from:     NodeId,
    pub to:       NodeId,
    pub distance: EdgeDistance,
}

// ── Build report ──────────────────────────────────────────────────────────────

#[derive(Clone, PartialEq, Debug, Serialize)]
pub struct RejectedNode {
    pub id:     NodeId,
    pub reason: String,
}

#[derive(Clone, PartialEq, Debug, Serialize)]
pub struct RejectedEdge {
    pub id:     EdgeId,
    pub reason: String,
}

/// What [`AdjacencyIndex::build`] had to leave out.
#[derive(Clone, Default, Debug)]
pub struct BuildReport {
    pub rejected_nodes: Vec<RejectedNode>,
    pub rejected_edges: Vec<RejectedEdge>,
}

// ── AdjacencyIndex ────────────────────────────────────────────────────────────

/// Immutable CSR adjacency over one snapshot of the store.
///
/// Built per request and dropped with it.
pub struct AdjacencyIndex {
    // ── Node data (indexed by slot) ───────────────────────────────────────
    node_ids: Vec<NodeId>,
    node_pos: Vec<GeoPoint>,
    slot_of:  FxHashMap<NodeId, u32>,

    // ── CSR ───────────────────────────────────────────────────────────────
    /// Length = `node_count + 1`.
    out_start: Vec<u32>,

    // ── Directed edge data (indexed by CSR position) ──────────────────────
    edge_id:   Vec<EdgeId>,
    edge_from: Vec<u32>,
    edge_to:   Vec<u32>,
    edge_dist: Vec<EdgeDistance>,
}

struct RawEdge {
    from: u32,
    to:   u32,
    id:   EdgeId,
    dist: EdgeDistance,
}

impl AdjacencyIndex {
    /// Build the index from a store snapshot.
    pub fn build(nodes: &[Node], edges: &[Edge]) -> (Self, BuildReport) {
        let mut report = BuildReport::default();

        let mut usable: Vec<(NodeId, GeoPoint)> = Vec::with_capacity(nodes.len());
        for node in nodes {
            match node.position() {
                Ok(p) => usable.push((node.id, p)),
                Err(e) => {
                    warn!("excluding {}: {e}", node.id);
                    report.rejected_nodes.push(RejectedNode { id: node.id, reason: e.to_string() });
                }
            }
        }
        usable.sort_by_key(|&(id, _)| id);
        usable.dedup_by(|later, earlier| {
            let dup = later.0 == earlier.0;
            if dup {
                warn!("excluding duplicate {}", later.0);
                report.rejected_nodes.push(RejectedNode {
                    id:     later.0,
                    reason: "duplicate node id".to_owned(),
                });
            }
            dup
        });

        let node_ids: Vec<NodeId> = usable.iter().map(|&(id, _)| id).collect();
        let node_pos: Vec<GeoPoint> = usable.iter().map(|&(_, p)| p).collect();
        let slot_of: FxHashMap<NodeId, u32> =
            node_ids.iter().enumerate().map(|(s, &id)| (id, s as u32)).collect();

        let mut raw: Vec<RawEdge> = Vec::with_capacity(edges.len() * 2);
        for edge in edges {
            let (Some(&a), Some(&b)) = (slot_of.get(&edge.node_a), slot_of.get(&edge.node_b)) else {
                let reason = format!(
                    "endpoint {} or {} is missing or malformed",
                    edge.node_a, edge.node_b
                );
                warn!("excluding {}: {reason}", edge.id);
                report.rejected_edges.push(RejectedEdge { id: edge.id, reason });
                continue;
            };
            let dist = match edge.distance_km {
                None => EdgeDistance::Missing,
                Some(d) if d.is_finite() && d >= 0.0 => EdgeDistance::Stored(d),
                Some(d) => {
                    let reason = format!("invalid distance {d}");
                    warn!("excluding {}: {reason}", edge.id);
                    report.rejected_edges.push(RejectedEdge { id: edge.id, reason });
                    continue;
                }
            };
            raw.push(RawEdge { from: a, to: b, id: edge.id, dist });
            raw.push(RawEdge { from: b, to: a, id: edge.id, dist });
        }

        // Sort by source slot for CSR; target and id keep neighbour order stable.
        raw.sort_by_key(|e| (e.from, e.to, e.id));

        let n = node_ids.len();
        let mut out_start = vec![0u32; n + 1];
        for e in &raw {
            out_start[e.from as usize + 1] += 1;
        }
        for i in 0..n {
            out_start[i + 1] += out_start[i];
        }

        let index = AdjacencyIndex {
            node_ids,
            node_pos,
            slot_of,
            out_start,
            edge_id:   raw.iter().map(|e| e.id).collect(),
            edge_from: raw.iter().map(|e| e.from).collect(),
            edge_to:   raw.iter().map(|e| e.to).collect(),
            edge_dist: raw.iter().map(|e| e.dist).collect(),
        };
        (index, report)
    }

    // ── Dimensions ────────────────────────────────────────────────────────

    pub fn node_count(&self) -> usize {
        self.node_ids.len()
    }

    /// Number of directed edges (twice the number of accepted stored edges).
    pub fn edge_count(&self) -> usize {
        self.edge_to.len()
    }

    pub fn is_empty(&self) -> bool {
        self.node_ids.is_empty()
    }

    // ── Node lookup ───────────────────────────────────────────────────────

    /// Dense slot of `id`, or `None` if the node was absent or excluded.
    #[inline]
    pub fn slot(&self, id: NodeId) -> Option<usize> {
        self.slot_of.get(&id).map(|&s| s as usize)
    }

    #[inline]
    pub fn node_id(&self, slot: usize) -> NodeId {
        self.node_ids[slot]
    }

    pub fn position(&self, id: NodeId) -> Option<GeoPoint> {
        self.slot(id).map(|s| self.node_pos[s])
    }

    /// `(id, position)` of every usable node, in id order.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, GeoPoint)> + '_ {
        self.node_ids.iter().copied().zip(self.node_pos.iter().copied())
    }

    // ── Traversal ─────────────────────────────────────────────────────────

    /// CSR positions of the out-edges of `slot`.
    #[inline]
    pub fn out_edges(&self, slot: usize) -> Range<usize> {
        let start = self.out_start[slot] as usize;
        let end   = self.out_start[slot + 1] as usize;
        start..end
    }

    #[inline]
    pub fn edge_from_slot(&self, e: usize) -> usize {
        self.edge_from[e] as usize
    }

    #[inline]
    pub fn edge_to_slot(&self, e: usize) -> usize {
        self.edge_to[e] as usize
    }

    pub fn edge(&self, e: usize) -> EdgeRef {
        EdgeRef {
            id:       self.edge_id[e],
            from:     self.node_ids[self.edge_from[e] as usize],
            to:       self.node_ids[self.edge_to[e] as usize],
            distance: self.edge_dist[e],
        }
    }

    /// Directed out-edges of `id` as views.  Empty for unknown ids.
    pub fn neighbours(&self, id: NodeId) -> Vec<EdgeRef> {
        match self.slot(id) {
            Some(s) => self.out_edges(s).map(|e| self.edge(e)).collect(),
            None => Vec::new(),
        }
    }

    /// `true` if a directed edge `from → to` exists.
    pub fn has_edge(&self, from: NodeId, to: NodeId) -> bool {
        let (Some(a), Some(b)) = (self.slot(from), self.slot(to)) else {
            return false;
        };
        self.out_edges(a).any(|e| self.edge_to[e] as usize == b)
    }
}
