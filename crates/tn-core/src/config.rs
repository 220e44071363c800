//! Planner configuration.
//!
//! The planner consumes these values but does not own where they come from;
//! applications typically keep them in a JSON file and load it with
//! [`PlannerConfig::from_json_path`].  Every field has a default, so a partial
//! file (or `{}`) is valid.
//!
//! ```json
//! {
//!   "congestion_alpha": 0.05,
//!   "average_speed_kmh": 50.0,
//!   "high_flow_threshold": 100,
//!   "time_point": { "day": 1, "slot": 8 },
//!   "predictor": { "base_url": "http://localhost:5000", "timeout_ms": 5000 }
//! }
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{CoreError, CoreResult, TimePoint};

/// Connection settings for the external flow prediction service.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PredictorConfig {
    /// Base address; requests go to `{base_url}/predict`.
    pub base_url: String,
    /// Upper bound on a single prediction call, milliseconds.
    pub timeout_ms: u64,
    /// When `false` the planner never calls the service and goes straight to
    /// historical data.
    pub enabled: bool,
}

impl Default for PredictorConfig {
    fn default() -> Self {
        Self {
            base_url:   "http://localhost:5000".to_owned(),
            timeout_ms: 5_000,
            enabled:    true,
        }
    }
}

impl PredictorConfig {
    #[inline]
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Tunables of the cost model, fallback chain and route assembly.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// α in `distance × (1 + α × flow)`.  Must be `>= 0`.
    pub congestion_alpha: f64,

    /// Nominal speed for the coarse travel-time estimate, km/h.
    pub average_speed_kmh: f64,

    /// A node with any historical flow on the request day above this is
    /// avoided by the `avoidingtraffic` policy.
    pub high_flow_threshold: u32,

    /// Flow assumed when neither the predictor nor history has a value.
    pub neutral_flow: f64,

    /// Floor applied to predicted flow so no edge degenerates to zero cost.
    pub min_flow: f64,

    /// Ceiling applied to predicted flow.
    pub max_flow: f64,

    /// Distance substituted for edges stored without one, km.
    pub default_edge_distance_km: f64,

    /// Day and slot used for flow lookups unless a request overrides it.
    pub time_point: TimePoint,

    pub predictor: PredictorConfig,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            congestion_alpha:         0.05,
            average_speed_kmh:        50.0,
            high_flow_threshold:      100,
            neutral_flow:             50.0,
            min_flow:                 1.0,
            max_flow:                 10_000.0,
            default_edge_distance_km: 1.0,
            time_point:               TimePoint::default(),
            predictor:                PredictorConfig::default(),
        }
    }
}

impl PlannerConfig {
    /// Parse and validate a JSON document.
    pub fn from_json_str(json: &str) -> CoreResult<Self> {
        let config: PlannerConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON file.
    pub fn from_json_path(path: &Path) -> CoreResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Reject values that would break the cost model's invariants.
    pub fn validate(&self) -> CoreResult<()> {
        if !(self.congestion_alpha.is_finite() && self.congestion_alpha >= 0.0) {
            return Err(CoreError::Config(format!(
                "congestion_alpha must be a finite non-negative number, got {}",
                self.congestion_alpha
            )));
        }
        if !(self.average_speed_kmh.is_finite() && self.average_speed_kmh > 0.0) {
            return Err(CoreError::Config(format!(
                "average_speed_kmh must be positive, got {}",
                self.average_speed_kmh
            )));
        }
        if !(self.min_flow.is_finite() && self.min_flow >= 0.0) {
            return Err(CoreError::Config(format!("min_flow must be >= 0, got {}", self.min_flow)));
        }
        if !(self.max_flow.is_finite() && self.max_flow >= self.min_flow) {
            return Err(CoreError::Config(format!(
                "max_flow ({}) must be finite and >= min_flow ({})",
                self.max_flow, self.min_flow
            )));
        }
        if !(self.neutral_flow.is_finite() && self.neutral_flow >= 0.0) {
            return Err(CoreError::Config(format!(
                "neutral_flow must be >= 0, got {}",
                self.neutral_flow
            )));
        }
        if !(self.default_edge_distance_km.is_finite() && self.default_edge_distance_km >= 0.0) {
            return Err(CoreError::Config(format!(
                "default_edge_distance_km must be >= 0, got {}",
                self.default_edge_distance_km
            )));
        }
        if !self.time_point.is_valid() {
            return Err(CoreError::InvalidTimeSlot(self.time_point.slot));
        }
        if self.predictor.enabled && self.predictor.timeout_ms == 0 {
            return Err(CoreError::Config("predictor.timeout_ms must be > 0".to_owned()));
        }
        Ok(())
    }
}
