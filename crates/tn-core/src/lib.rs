//! `tn-core` — foundational types for the `tn-*` route planner.
//!
//! This crate is a dependency of every other `tn-*` crate.  It has no `tn-*`
//! dependencies and only `serde`, `serde_json` and `thiserror` externally.
//!
//! # What lives here
//!
//! | Module           | Contents                                              |
//! |------------------|-------------------------------------------------------|
//! | [`ids`]          | `NodeId`, `EdgeId`                                    |
//! | [`geo`]          | `GeoPoint`, haversine distance (GeoMath)              |
//! | [`time`]         | `TimePoint` (day + hourly slot)                       |
//! | [`route_type`]   | `RouteType` policy selector                           |
//! | [`congestion`]   | `CongestionLevel` flow classification                 |
//! | [`config`]       | `PlannerConfig`, `PredictorConfig`                    |
//! | [`error`]        | `CoreError`, `CoreResult`                             |

pub mod config;
pub mod congestion;
pub mod error;
pub mod geo;
pub mod ids;
pub mod route_type;
pub mod time;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use config::{PlannerConfig, PredictorConfig};
pub use congestion::CongestionLevel;
pub use error::{CoreError, CoreResult};
pub use geo::GeoPoint;
pub use ids::{EdgeId, NodeId};
pub use route_type::RouteType;
pub use time::TimePoint;
