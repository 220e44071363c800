//! Flow estimation with an explicit, observable fallback chain.

use std::time::Duration;

use futures::future::join_all;
use log::{debug, warn};
use rustc_hash::FxHashMap;
use serde::Serialize;

use tn_core::{NodeId, PlannerConfig, TimePoint};
use tn_store::FlowStore;

use crate::service::VolumeService;
use crate::{TrafficError, TrafficResult};

// ── FlowEstimate ──────────────────────────────────────────────────────────────

/// Which tier of the fallback chain produced an estimate.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FlowSource {
    /// The prediction service answered in time.
    Predicted,
    /// The service was unavailable; a historical sample matched.
    Historical,
    /// Neither source had a value; the neutral constant was used.
    Default,
}

/// A flow value tagged with the tier that produced it.
#[derive(Copy, Clone, PartialEq, Debug, Serialize)]
pub struct FlowEstimate {
    pub value:  f64,
    pub source: FlowSource,
}

impl FlowEstimate {
    #[inline]
    pub fn new(value: f64, source: FlowSource) -> Self {
        Self { value, source }
    }

    /// Edge flow: the arithmetic mean of its two endpoint estimates.
    #[inline]
    pub fn blend(a: FlowEstimate, b: FlowEstimate) -> f64 {
        (a.value + b.value) / 2.0
    }
}

// ── TrafficPredictor ──────────────────────────────────────────────────────────

/// Wraps a [`VolumeService`] with a timeout, clamping, and the historical
/// fallback.
///
/// Holds no mutable state; memoization is the caller's (request-scoped)
/// business.
pub struct TrafficPredictor<V> {
    service:      V,
    timeout:      Duration,
    enabled:      bool,
    min_flow:     f64,
    max_flow:     f64,
    neutral_flow: f64,
}

impl<V: VolumeService> TrafficPredictor<V> {
    pub fn new(service: V, config: &PlannerConfig) -> Self {
        Self {
            service,
            timeout:      config.predictor.timeout(),
            enabled:      config.predictor.enabled,
            min_flow:     config.min_flow,
            max_flow:     config.max_flow,
            neutral_flow: config.neutral_flow,
        }
    }

    pub fn service(&self) -> &V {
        &self.service
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Tier 1: one bounded-time service call, clamped to
    /// `[min_flow, max_flow]`.
    pub async fn predict(&self, node: NodeId, slot: u8) -> TrafficResult<f64> {
        if !self.enabled {
            return Err(TrafficError::Disabled);
        }
        let volume = tokio::time::timeout(self.timeout, self.service.predict_volume(node, slot))
            .await
            .map_err(|_| TrafficError::Timeout(self.timeout))??;
        if !volume.is_finite() {
            return Err(TrafficError::Malformed(format!("non-finite volume {volume}")));
        }
        if volume > self.max_flow {
            debug!("clamping predicted volume {volume} for {node} to {}", self.max_flow);
        }
        Ok(volume.clamp(self.min_flow, self.max_flow))
    }

    /// Availability probe against the same endpoint shape as a prediction.
    ///
    /// `Some` carries the prediction for `node`, so the caller need not ask
    /// for it again; `None` means the service is disabled or unavailable.
    pub async fn probe(&self, node: NodeId, at: TimePoint) -> Option<FlowEstimate> {
        match self.predict(node, at.slot).await {
            Ok(v) => {
                debug!("prediction service available");
                Some(FlowEstimate::new(v, FlowSource::Predicted))
            }
            Err(TrafficError::Disabled) => None,
            Err(e) => {
                warn!("prediction service unavailable, using historical flow: {e}");
                None
            }
        }
    }

    /// Tiers 2 and 3: the historical sample for `(node, day, slot)`, else the
    /// neutral constant.  A failing history store degrades to the constant.
    pub fn historical_flow<H: FlowStore + ?Sized>(
        &self,
        history: &H,
        node: NodeId,
        at: TimePoint,
    ) -> FlowEstimate {
        match history.find_flow(node, at.day, at.slot) {
            Ok(Some(sample)) => FlowEstimate::new(f64::from(sample.flow), FlowSource::Historical),
            Ok(None) => FlowEstimate::new(self.neutral_flow, FlowSource::Default),
            Err(e) => {
                warn!("historical flow lookup for {node} failed: {e}");
                FlowEstimate::new(self.neutral_flow, FlowSource::Default)
            }
        }
    }

    /// Estimate the flow at `node`.  Never fails.
    ///
    /// `service_up` carries the result of a prior [`probe`](Self::probe);
    /// when `false` the service is not called at all.
    pub async fn estimate_flow<H: FlowStore + ?Sized>(
        &self,
        history: &H,
        node: NodeId,
        at: TimePoint,
        service_up: bool,
    ) -> FlowEstimate {
        if service_up {
            match self.predict(node, at.slot).await {
                Ok(v) => return FlowEstimate::new(v, FlowSource::Predicted),
                Err(e) => debug!("prediction for {node} failed, falling back: {e}"),
            }
        }
        self.historical_flow(history, node, at)
    }

    /// Estimate many nodes concurrently.  Duplicate ids are estimated once.
    pub async fn estimate_many<H: FlowStore + ?Sized>(
        &self,
        history: &H,
        nodes: &[NodeId],
        at: TimePoint,
        service_up: bool,
    ) -> FxHashMap<NodeId, FlowEstimate> {
        let mut unique: Vec<NodeId> = nodes.to_vec();
        unique.sort_unstable();
        unique.dedup();

        let estimates = join_all(
            unique.iter().map(|&n| self.estimate_flow(history, n, at, service_up)),
        )
        .await;

        unique.into_iter().zip(estimates).collect()
    }
}
