//! Edge weighting.
//!
//! [`WeightPolicy`] is the pure cost model.  [`EdgeWeigher`] is the seam the
//! path finder calls per relaxed edge; [`PolicyWeigher`] implements it on top
//! of a policy and the traffic fallback chain.

use std::future::Future;

use log::debug;
use rustc_hash::{FxHashMap, FxHashSet};
use tokio_util::sync::CancellationToken;

use tn_core::{EdgeId, NodeId, PlannerConfig, RouteType, TimePoint};
use tn_store::FlowStore;
use tn_traffic::{FlowEstimate, FlowSource, TrafficPredictor, VolumeService};

use crate::adjacency::{EdgeDistance, EdgeRef};
use crate::{PlanError, PlanResult};

// ── WeightPolicy ──────────────────────────────────────────────────────────────

/// Cost model selected by [`RouteType`].
#[derive(Copy, Clone, PartialEq, Debug)]
pub enum WeightPolicy {
    /// `weight = distance`.
    PlainDistance,
    /// `weight = distance × (1 + alpha × flow)`.
    CongestionWeighted { alpha: f64 },
    /// Congestion-weighted, and nodes with a flow above `threshold` on the
    /// request day are excluded from the search.
    Avoiding { alpha: f64, threshold: u32 },
}

impl WeightPolicy {
    pub fn for_route_type(route_type: RouteType, config: &PlannerConfig) -> Self {
        match route_type {
            RouteType::Shortest => WeightPolicy::PlainDistance,
            RouteType::Fastest => WeightPolicy::CongestionWeighted { alpha: config.congestion_alpha },
            RouteType::AvoidingTraffic => WeightPolicy::Avoiding {
                alpha:     config.congestion_alpha,
                threshold: config.high_flow_threshold,
            },
        }
    }

    /// `true` if the weight depends on flow estimates.
    pub fn uses_traffic(self) -> bool {
        !matches!(self, WeightPolicy::PlainDistance)
    }

    /// Avoidance threshold, if this policy excludes congested nodes.
    pub fn avoidance_threshold(self) -> Option<u32> {
        match self {
            WeightPolicy::Avoiding { threshold, .. } => Some(threshold),
            _ => None,
        }
    }

    /// Weight of an edge with distance basis `basis_km` carrying `flow`.
    ///
    /// Monotonic non-decreasing in `flow` for `flow >= 0`.  `flow` is ignored
    /// by [`PlainDistance`](Self::PlainDistance).
    #[inline]
    pub fn weight(self, basis_km: f64, flow: f64) -> f64 {
        match self {
            WeightPolicy::PlainDistance => basis_km,
            WeightPolicy::CongestionWeighted { alpha } | WeightPolicy::Avoiding { alpha, .. } => {
                basis_km * (1.0 + alpha * flow)
            }
        }
    }
}

// ── EdgeWeigher ───────────────────────────────────────────────────────────────

/// Produces the solver weight of a directed edge.
///
/// Takes `&mut self` so implementations can keep request-scoped memo state
/// without locks.  A returned weight that is negative or not finite is
/// skipped by the path finder.
pub trait EdgeWeigher: Send {
    fn weigh(&mut self, edge: EdgeRef) -> impl Future<Output = PlanResult<f64>> + Send;
}

/// Adapts a plain closure; handy for fixed-weight searches.
pub struct FnWeigher<F>(pub F);

impl<F> EdgeWeigher for FnWeigher<F>
where
    F: FnMut(EdgeRef) -> f64 + Send,
{
    async fn weigh(&mut self, edge: EdgeRef) -> PlanResult<f64> {
        Ok((self.0)(edge))
    }
}

// ── PolicyWeigher ─────────────────────────────────────────────────────────────

/// Per-request weigher: a [`WeightPolicy`] fed by the traffic fallback chain.
///
/// Owns the per-node flow memo and the list of edges whose distance had to be
/// substituted.  Not shared between requests.
pub struct PolicyWeigher<'a, V, H: ?Sized> {
    policy:      WeightPolicy,
    predictor:   &'a TrafficPredictor<V>,
    history:     &'a H,
    at:          TimePoint,
    service_up:  bool,
    default_km:  f64,
    cancel:      CancellationToken,
    memo:        FxHashMap<NodeId, FlowEstimate>,
    substituted: FxHashSet<EdgeId>,
}

impl<'a, V, H> PolicyWeigher<'a, V, H>
where
    V: VolumeService,
    H: FlowStore + ?Sized,
{
    pub fn new(
        policy: WeightPolicy,
        predictor: &'a TrafficPredictor<V>,
        history: &'a H,
        at: TimePoint,
    ) -> Self {
        Self {
            policy,
            predictor,
            history,
            at,
            service_up:  false,
            default_km:  1.0,
            cancel:      CancellationToken::new(),
            memo:        FxHashMap::default(),
            substituted: FxHashSet::default(),
        }
    }

    /// Result of the availability probe; when `false` the service is skipped.
    pub fn service_up(mut self, up: bool) -> Self {
        self.service_up = up;
        self
    }

    /// Distance substituted for edges without one.
    pub fn default_distance(mut self, km: f64) -> Self {
        self.default_km = km;
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn policy(&self) -> WeightPolicy {
        self.policy
    }

    /// Memoized estimate for `node`, if it was consulted.
    pub fn estimate(&self, node: NodeId) -> Option<FlowEstimate> {
        self.memo.get(&node).copied()
    }

    /// Record an estimate obtained elsewhere (the availability probe) so the
    /// node is not estimated again.
    pub fn seed(&mut self, node: NodeId, estimate: FlowEstimate) {
        self.memo.insert(node, estimate);
    }

    /// Estimate every node of `nodes` not yet memoized, concurrently.
    pub async fn prefetch(&mut self, nodes: &[NodeId]) -> PlanResult<()> {
        let missing: Vec<NodeId> = nodes.iter().copied().filter(|n| !self.memo.contains_key(n)).collect();
        if missing.is_empty() {
            return Ok(());
        }
        let batch = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => return Err(PlanError::Cancelled),
            batch = self.predictor.estimate_many(self.history, &missing, self.at, self.service_up) => batch,
        };
        self.memo.extend(batch);
        Ok(())
    }

    /// Edges that were weighed with the substituted distance, sorted by id.
    pub fn substituted_edges(&self) -> Vec<EdgeId> {
        let mut out: Vec<EdgeId> = self.substituted.iter().copied().collect();
        out.sort_unstable();
        out
    }

    /// Count of memoized estimates per fallback tier:
    /// `(predicted, historical, default)`.
    pub fn tier_counts(&self) -> (usize, usize, usize) {
        self.memo.values().fold((0, 0, 0), |(p, h, d), e| match e.source {
            FlowSource::Predicted => (p + 1, h, d),
            FlowSource::Historical => (p, h + 1, d),
            FlowSource::Default => (p, h, d + 1),
        })
    }

    fn basis(&mut self, edge: EdgeRef) -> f64 {
        match edge.distance {
            EdgeDistance::Stored(d) => d,
            EdgeDistance::Missing => {
                if self.substituted.insert(edge.id) {
                    debug!("{} has no distance, using {} km", edge.id, self.default_km);
                }
                self.default_km
            }
        }
    }

    /// Blended flow of `a`–`b`.  Unmemoized endpoints are estimated
    /// concurrently; the join is abandoned if the request is cancelled.
    async fn edge_flow(&mut self, a: NodeId, b: NodeId) -> PlanResult<f64> {
        let cached = (self.memo.get(&a).copied(), self.memo.get(&b).copied());
        let (ea, eb) = match cached {
            (Some(ea), Some(eb)) => (ea, eb),
            (ma, mb) => {
                let predictor = self.predictor;
                let history = self.history;
                let (at, up) = (self.at, self.service_up);
                let fa = async move {
                    match ma {
                        Some(e) => e,
                        None => predictor.estimate_flow(history, a, at, up).await,
                    }
                };
                let fb = async move {
                    match mb {
                        Some(e) => e,
                        None => predictor.estimate_flow(history, b, at, up).await,
                    }
                };
                tokio::select! {
                    biased;
                    _ = self.cancel.cancelled() => return Err(PlanError::Cancelled),
                    pair = async { futures::join!(fa, fb) } => pair,
                }
            }
        };
        self.memo.insert(a, ea);
        self.memo.insert(b, eb);
        Ok(FlowEstimate::blend(ea, eb))
    }
}

impl<V, H> EdgeWeigher for PolicyWeigher<'_, V, H>
where
    V: VolumeService,
    H: FlowStore + ?Sized,
{
    async fn weigh(&mut self, edge: EdgeRef) -> PlanResult<f64> {
        let basis = self.basis(edge);
        if !self.policy.uses_traffic() {
            return Ok(self.policy.weight(basis, 0.0));
        }
        let flow = self.edge_flow(edge.from, edge.to).await?;
        Ok(self.policy.weight(basis, flow))
    }
}
