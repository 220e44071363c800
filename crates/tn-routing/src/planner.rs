//! Request entry points.
//!
//! Each request snapshots the store, builds its own [`AdjacencyIndex`],
//! avoidance set and weigher, and drops them on return.  A [`Planner`] holds
//! no per-request state and can be shared behind an `Arc`.

use log::{debug, info};
use tokio_util::sync::CancellationToken;

use tn_core::{CongestionLevel, GeoPoint, NodeId, PlannerConfig, RouteType, TimePoint};
use tn_store::{FlowStore, GraphStore};
use tn_traffic::{TrafficPredictor, VolumeService};

use crate::adjacency::{AdjacencyIndex, BuildReport};
use crate::assembler::RouteAssembler;
use crate::avoidance::AvoidanceSet;
use crate::finder::PathFinder;
use crate::route::{PlanDiagnostics, Route};
use crate::weight::{PolicyWeigher, WeightPolicy};
use crate::{PlanError, PlanResult};

/// One route query between two raw coordinates.
#[derive(Copy, Clone, Debug)]
pub struct PlanRequest {
    pub start:      GeoPoint,
    pub end:        GeoPoint,
    pub route_type: RouteType,
    /// Overrides [`PlannerConfig::time_point`] for flow lookups.
    pub time_point: Option<TimePoint>,
}

impl PlanRequest {
    pub fn new(start: GeoPoint, end: GeoPoint, route_type: RouteType) -> Self {
        Self { start, end, route_type, time_point: None }
    }

    pub fn at(mut self, time_point: TimePoint) -> Self {
        self.time_point = Some(time_point);
        self
    }
}

/// Resolved endpoints of a request.
struct Endpoints {
    start: GeoPoint,
    end:   GeoPoint,
    from:  NodeId,
    to:    NodeId,
}

/// Traffic-aware route planner over a graph/flow store and a prediction
/// service.
pub struct Planner<S, V> {
    store:     S,
    predictor: TrafficPredictor<V>,
    assembler: RouteAssembler,
    config:    PlannerConfig,
}

impl<S, V> Planner<S, V>
where
    S: GraphStore + FlowStore,
    V: VolumeService,
{
    /// Fails with [`PlanError::Config`] if `config` does not validate.
    pub fn new(store: S, service: V, config: PlannerConfig) -> PlanResult<Self> {
        config.validate()?;
        Ok(Self {
            store,
            predictor: TrafficPredictor::new(service, &config),
            assembler: RouteAssembler::new(config.average_speed_kmh),
            config,
        })
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn predictor(&self) -> &TrafficPredictor<V> {
        &self.predictor
    }

    /// Plan between raw textual coordinates.
    ///
    /// `route_type` is matched case-insensitively; anything unrecognised
    /// plans as `fastest`.
    pub async fn plan_route(
        &self,
        start_lat: &str,
        start_lng: &str,
        end_lat: &str,
        end_lng: &str,
        route_type: &str,
    ) -> PlanResult<Route> {
        let start = GeoPoint::parse(start_lat, start_lng)?;
        let end = GeoPoint::parse(end_lat, end_lng)?;
        let request = PlanRequest::new(start, end, RouteType::parse_lenient(route_type));
        self.plan(&request, &CancellationToken::new()).await
    }

    /// Plan `request`, abandoning work when `cancel` fires.
    pub async fn plan(&self, request: &PlanRequest, cancel: &CancellationToken) -> PlanResult<Route> {
        let at = self.resolve_time(request.time_point)?;
        let (index, report) = self.snapshot()?;

        let from = self.assembler.nearest_node(&index, request.start)?;
        let to = self.assembler.nearest_node(&index, request.end)?;
        debug!("request attached to {from} -> {to}");

        let ends = Endpoints { start: request.start, end: request.end, from, to };
        self.run(&index, report, ends, request.route_type, at, cancel).await
    }

    /// Plan between two stored nodes; the route starts and ends at their
    /// positions.  `time_point` overrides [`PlannerConfig::time_point`].
    ///
    /// # Errors
    ///
    /// [`PlanError::DataIntegrity`] if either node's coordinates are
    /// malformed, [`PlanError::UnknownNode`] if either is not stored.
    pub async fn plan_between_nodes(
        &self,
        start: NodeId,
        end: NodeId,
        route_type: RouteType,
        time_point: Option<TimePoint>,
        cancel: &CancellationToken,
    ) -> PlanResult<Route> {
        let at = self.resolve_time(time_point)?;
        let start_pos = self.stored_position(start)?;
        let end_pos = self.stored_position(end)?;
        let (index, report) = self.snapshot()?;

        let ends = Endpoints { start: start_pos, end: end_pos, from: start, to: end };
        self.run(&index, report, ends, route_type, at, cancel).await
    }

    // ── Internals ─────────────────────────────────────────────────────────

    fn resolve_time(&self, requested: Option<TimePoint>) -> PlanResult<TimePoint> {
        let at = requested.unwrap_or(self.config.time_point);
        if !at.is_valid() {
            return Err(PlanError::Config(format!("time slot {} is outside 0..24", at.slot)));
        }
        Ok(at)
    }

    fn snapshot(&self) -> PlanResult<(AdjacencyIndex, BuildReport)> {
        let nodes = self.store.list_nodes()?;
        let edges = self.store.list_edges()?;
        let (index, report) = AdjacencyIndex::build(&nodes, &edges);
        debug!(
            "adjacency: {} nodes, {} directed edges ({} nodes, {} edges excluded)",
            index.node_count(),
            index.edge_count(),
            report.rejected_nodes.len(),
            report.rejected_edges.len(),
        );
        Ok((index, report))
    }

    fn stored_position(&self, id: NodeId) -> PlanResult<GeoPoint> {
        let node = self.store.find_node(id)?.ok_or(PlanError::UnknownNode(id))?;
        node.position()
            .map_err(|e| PlanError::DataIntegrity { node: id, reason: e.to_string() })
    }

    async fn run(
        &self,
        index: &AdjacencyIndex,
        report: BuildReport,
        ends: Endpoints,
        route_type: RouteType,
        at: TimePoint,
        cancel: &CancellationToken,
    ) -> PlanResult<Route> {
        let policy = WeightPolicy::for_route_type(route_type, &self.config);

        let start_estimate = if policy.uses_traffic() {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(PlanError::Cancelled),
                estimate = self.predictor.probe(ends.from, at) => estimate,
            }
        } else {
            None
        };
        let service_up = start_estimate.is_some();

        let avoid = match policy.avoidance_threshold() {
            Some(threshold) => {
                let samples = self.store.list_flows_for_day(at.day)?;
                let set = AvoidanceSet::from_flows(&samples, at.day, threshold);
                debug!("avoiding {} congested nodes on day {}", set.len(), at.day);
                set
            }
            None => AvoidanceSet::default(),
        };

        let mut weigher = PolicyWeigher::new(policy, &self.predictor, &self.store, at)
            .service_up(service_up)
            .default_distance(self.config.default_edge_distance_km)
            .with_cancellation(cancel.clone());
        if let Some(estimate) = start_estimate {
            weigher.seed(ends.from, estimate);
        }

        let found = PathFinder::new(index)
            .with_avoidance(&avoid)
            .with_cancellation(cancel)
            .find(ends.from, ends.to, &mut weigher)
            .await?;

        let assembled = self.assembler.assemble(
            index,
            ends.start,
            ends.end,
            &found.nodes,
            (ends.from, ends.to),
        )?;

        let peak_congestion = if policy.uses_traffic() {
            weigher.prefetch(&found.nodes).await?;
            found
                .nodes
                .iter()
                .filter_map(|&n| weigher.estimate(n))
                .map(|e| CongestionLevel::classify(e.value))
                .max()
        } else {
            None
        };

        let (predicted, historical, defaulted) = weigher.tier_counts();
        let diagnostics = PlanDiagnostics {
            substituted_edges: weigher.substituted_edges(),
            rejected_edges: report.rejected_edges,
            rejected_nodes: report.rejected_nodes,
            invalid_weights: found.invalid_weights.clone(),
            avoided_nodes: avoid.to_sorted_vec(),
            predicted,
            historical,
            defaulted,
            service_available: service_up,
        };

        let route = Route {
            points:            assembled.points,
            graph_distance_km: found.graph_distance_km(self.config.default_edge_distance_km),
            node_path:         found.nodes,
            total_distance_km: assembled.total_distance_km,
            total_time_min:    assembled.total_time_min,
            route_type,
            peak_congestion,
            diagnostics,
        };

        info!(
            "planned {route_type} route {} -> {}: {} nodes, {:.3} km, {:.1} min (settled {})",
            ends.from,
            ends.to,
            route.node_path.len(),
            route.total_distance_km,
            route.total_time_min,
            found.settled,
        );
        Ok(route)
    }
}
