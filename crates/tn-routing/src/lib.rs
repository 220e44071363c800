//! `tn-routing` — traffic-aware route planning.
//!
//! # Crate layout
//!
//! | Module         | Contents                                                      |
//! |----------------|---------------------------------------------------------------|
//! | [`adjacency`]  | `AdjacencyIndex` (per-request CSR), `BuildReport`             |
//! | [`weight`]     | `WeightPolicy`, `EdgeWeigher` seam, `PolicyWeigher`, `FnWeigher` |
//! | [`avoidance`]  | `AvoidanceSet` of congested nodes                             |
//! | [`finder`]     | `PathFinder` (Dijkstra), `FoundPath`                          |
//! | [`assembler`]  | `RouteAssembler`: nearest node, stitching, distance and time  |
//! | [`route`]      | `Route`, `PlanDiagnostics`                                    |
//! | [`planner`]    | `Planner`, `PlanRequest`                                      |
//! | [`error`]      | `PlanError`, `PlanResult<T>`                                  |
//!
//! # Request flow
//!
//! ```text
//! store snapshot ─► AdjacencyIndex ─► nearest nodes ─► probe predictor
//!        │                                                   │
//!        └──► flows of the day ─► AvoidanceSet               ▼
//!                                       └────────► PathFinder + PolicyWeigher
//!                                                            │
//!                                                            ▼
//!                                                  RouteAssembler ─► Route
//! ```

pub mod adjacency;
pub mod assembler;
pub mod avoidance;
pub mod error;
pub mod finder;
pub mod planner;
pub mod route;
pub mod weight;


pub use adjacency::{AdjacencyIndex, BuildReport, EdgeDistance, EdgeRef, RejectedEdge, RejectedNode};
pub use assembler::{Assembled, RouteAssembler};
pub use avoidance::AvoidanceSet;
pub use error::{PlanError, PlanResult};
pub use finder::{FoundPath, PathFinder};
pub use planner::{PlanRequest, Planner};
pub use route::{PlanDiagnostics, Route};
pub use weight::{EdgeWeigher, FnWeigher, PolicyWeigher, WeightPolicy};
