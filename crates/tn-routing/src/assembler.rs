//! Attaching raw request coordinates to the graph and measuring the result.

use tn_core::{GeoPoint, NodeId};

use crate::adjacency::AdjacencyIndex;
use crate::{PlanError, PlanResult};

/// Geometry of an assembled route.
#[derive(Clone, Debug, PartialEq)]
pub struct Assembled {
    pub points:            Vec<GeoPoint>,
    pub total_distance_km: f64,
    pub total_time_min:    f64,
}

/// Nearest-node resolution and route stitching.
#[derive(Copy, Clone, Debug)]
pub struct RouteAssembler {
    speed_kmh: f64,
}

impl RouteAssembler {
    /// `speed_kmh` must be positive; [`PlannerConfig::validate`] enforces it.
    ///
    /// [`PlannerConfig::validate`]: tn_core::PlannerConfig::validate
    pub fn new(speed_kmh: f64) -> Self {
        Self { speed_kmh }
    }

    /// Closest usable node to `at` by great-circle distance.
    ///
    /// Linear scan in id order; the first node at the minimum distance wins.
    pub fn nearest_node(&self, index: &AdjacencyIndex, at: GeoPoint) -> PlanResult<NodeId> {
        let mut best: Option<(NodeId, f64)> = None;
        for (id, pos) in index.nodes() {
            let d = at.distance_km(pos);
            if best.is_none_or(|(_, bd)| d < bd) {
                best = Some((id, d));
            }
        }
        best.map(|(id, _)| id).ok_or(PlanError::NoNearbyNode)
    }

    /// Stitch `start` and `end` onto `path` and measure it.
    ///
    /// `from`/`to` are the resolved endpoints, reported if `path` is empty.
    pub fn assemble(
        &self,
        index: &AdjacencyIndex,
        start: GeoPoint,
        end: GeoPoint,
        path: &[NodeId],
        (from, to): (NodeId, NodeId),
    ) -> PlanResult<Assembled> {
        if path.is_empty() {
            return Err(PlanError::PathNotFound { from, to });
        }

        let mut points = Vec::with_capacity(path.len() + 2);
        points.push(start);
        for &id in path {
            let pos = index.position(id).ok_or(PlanError::UnknownNode(id))?;
            points.push(pos);
        }
        points.push(end);

        let total_distance_km: f64 = points.windows(2).map(|w| w[0].distance_km(w[1])).sum();
        Ok(Assembled {
            points,
            total_distance_km,
            total_time_min: self.travel_time_min(total_distance_km),
        })
    }

    /// Coarse travel time at the nominal speed.
    #[inline]
    pub fn travel_time_min(&self, distance_km: f64) -> f64 {
        distance_km / self.speed_kmh * 60.0
    }
}
