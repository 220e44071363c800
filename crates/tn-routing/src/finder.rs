//! Dijkstra search over an [`AdjacencyIndex`].
//!
//! One solver serves every policy: edge costs come from an [`EdgeWeigher`],
//! congested nodes from an optional [`AvoidanceSet`].
//!
//! # Ordering
//!
//! The frontier is a min-heap keyed on `(cost, slot)`.  Slots follow id
//! order, so equal-cost ties resolve to the lower `NodeId` and results are
//! stable for a given input.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use log::{debug, warn};
use tokio_util::sync::CancellationToken;

use tn_core::{EdgeId, NodeId};

use crate::adjacency::{AdjacencyIndex, EdgeDistance, EdgeRef};
use crate::avoidance::AvoidanceSet;
use crate::weight::EdgeWeigher;
use crate::{PlanError, PlanResult};

/// Predecessor sentinel for unreached slots.
const NO_EDGE: u32 = u32::MAX;

// ── Cost key ──────────────────────────────────────────────────────────────────

/// Finite, non-negative path cost with a total order.
#[derive(Copy, Clone, PartialEq, Debug)]
struct Cost(f64);

impl Eq for Cost {}

impl PartialOrd for Cost {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Cost {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

// ── FoundPath ─────────────────────────────────────────────────────────────────

/// A path from the start node to the end node.
#[derive(Clone, Debug)]
pub struct FoundPath {
    /// Node ids from start to end inclusive.  `[start]` when start == end.
    pub nodes: Vec<NodeId>,
    /// Traversed directed edges, one fewer than `nodes`.
    pub edges: Vec<EdgeRef>,
    /// Sum of solver weights.
    pub cost: f64,
    /// Number of nodes extracted from the frontier.
    pub settled: usize,
    /// Edges skipped because their weight was negative or not finite.
    pub invalid_weights: Vec<EdgeId>,
}

impl FoundPath {
    /// Sum of the edge distance bases; `missing_km` stands in for edges
    /// without a stored distance.
    pub fn graph_distance_km(&self, missing_km: f64) -> f64 {
        self.edges
            .iter()
            .map(|e| match e.distance {
                EdgeDistance::Stored(d) => d,
                EdgeDistance::Missing => missing_km,
            })
            .sum()
    }
}

// ── PathFinder ────────────────────────────────────────────────────────────────

/// Single-pair Dijkstra with optional node avoidance and cancellation.
pub struct PathFinder<'a> {
    index:  &'a AdjacencyIndex,
    avoid:  Option<&'a AvoidanceSet>,
    cancel: Option<&'a CancellationToken>,
}

impl<'a> PathFinder<'a> {
    pub fn new(index: &'a AdjacencyIndex) -> Self {
        Self { index, avoid: None, cancel: None }
    }

    /// Never extract or relax into members of `avoid`.  The start node is
    /// exempt; the end node is not.
    pub fn with_avoidance(mut self, avoid: &'a AvoidanceSet) -> Self {
        self.avoid = Some(avoid);
        self
    }

    pub fn with_cancellation(mut self, token: &'a CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Cheapest path `from → to` under `weigher`.
    ///
    /// # Errors
    ///
    /// - [`PlanError::UnknownNode`] if either endpoint is not in the index.
    /// - [`PlanError::PathNotFound`] if the frontier empties first.
    /// - [`PlanError::Cancelled`] if the token fires.
    /// - Any error returned by the weigher.
    pub async fn find<W: EdgeWeigher>(
        &self,
        from: NodeId,
        to: NodeId,
        weigher: &mut W,
    ) -> PlanResult<FoundPath> {
        let src = self.index.slot(from).ok_or(PlanError::UnknownNode(from))?;
        let dst = self.index.slot(to).ok_or(PlanError::UnknownNode(to))?;
        self.check_cancelled()?;

        if src == dst {
            return Ok(FoundPath {
                nodes:           vec![from],
                edges:           Vec::new(),
                cost:            0.0,
                settled:         0,
                invalid_weights: Vec::new(),
            });
        }

        let n = self.index.node_count();
        // dist[s] = best known cost to reach slot s.
        let mut dist = vec![f64::INFINITY; n];
        // prev_edge[s] = CSR position of the edge that reached s.
        let mut prev_edge = vec![NO_EDGE; n];
        let mut settled = vec![false; n];
        let mut settled_count = 0usize;
        let mut invalid_weights = Vec::new();

        dist[src] = 0.0;
        let mut heap: BinaryHeap<Reverse<(Cost, u32)>> = BinaryHeap::new();
        heap.push(Reverse((Cost(0.0), src as u32)));

        while let Some(Reverse((Cost(cost), slot))) = heap.pop() {
            self.check_cancelled()?;
            let u = slot as usize;

            // Skip stale heap entries.
            if settled[u] || cost > dist[u] {
                continue;
            }
            settled[u] = true;
            settled_count += 1;

            if u == dst {
                debug!("reached {to} after settling {settled_count} nodes");
                let (nodes, edges) = self.reconstruct(&prev_edge, src, dst, from, to)?;
                return Ok(FoundPath { nodes, edges, cost, settled: settled_count, invalid_weights });
            }

            for e in self.index.out_edges(u) {
                let v = self.index.edge_to_slot(e);
                if settled[v] || self.is_avoided(v) {
                    continue;
                }
                let edge = self.index.edge(e);
                let w = weigher.weigh(edge).await?;
                if !(w.is_finite() && w >= 0.0) {
                    warn!("skipping {} ({} -> {}): invalid weight {w}", edge.id, edge.from, edge.to);
                    invalid_weights.push(edge.id);
                    continue;
                }
                let new_cost = cost + w;
                if new_cost < dist[v] {
                    dist[v] = new_cost;
                    prev_edge[v] = e as u32;
                    heap.push(Reverse((Cost(new_cost), v as u32)));
                }
            }
        }

        Err(PlanError::PathNotFound { from, to })
    }

    fn is_avoided(&self, slot: usize) -> bool {
        self.avoid.is_some_and(|a| a.contains(self.index.node_id(slot)))
    }

    fn check_cancelled(&self) -> PlanResult<()> {
        match self.cancel {
            Some(t) if t.is_cancelled() => Err(PlanError::Cancelled),
            _ => Ok(()),
        }
    }

    /// Walk predecessors back from `dst`.  A walk that breaks off or runs
    /// longer than the node count never reached `src`.
    fn reconstruct(
        &self,
        prev_edge: &[u32],
        src: usize,
        dst: usize,
        from: NodeId,
        to: NodeId,
    ) -> PlanResult<(Vec<NodeId>, Vec<EdgeRef>)> {
        let mut nodes = vec![self.index.node_id(dst)];
        let mut edges = Vec::new();
        let mut cur = dst;
        for _ in 0..prev_edge.len() {
            if cur == src {
                break;
            }
            let e = prev_edge[cur];
            if e == NO_EDGE {
                break;
            }
            edges.push(self.index.edge(e as usize));
            cur = self.index.edge_from_slot(e as usize);
            nodes.push(self.index.node_id(cur));
        }
        if cur != src {
            warn!("predecessor walk from {to} did not reach {from}");
            return Err(PlanError::PathNotFound { from, to });
        }
        nodes.reverse();
        edges.reverse();
        Ok((nodes, edges))
    }
}
