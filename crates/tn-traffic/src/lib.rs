//! `tn-traffic` — flow estimates for edge weighting.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                    |
//! |---------------|-------------------------------------------------------------|
//! | [`service`]   | `VolumeService` seam, `HttpVolumeService` (reqwest)         |
//! | [`predictor`] | `TrafficPredictor` fallback chain, `FlowEstimate`, `FlowSource` |
//! | [`error`]     | `TrafficError`, `TrafficResult<T>`                          |
//!
//! # Fallback chain
//!
//! [`TrafficPredictor::estimate_flow`] never fails.  It tries, in order:
//!
//! 1. the prediction service, bounded by a timeout ([`FlowSource::Predicted`]);
//! 2. the historical sample for the node at the same day and slot
//!    ([`FlowSource::Historical`]);
//! 3. a neutral constant ([`FlowSource::Default`]).
//!
//! `TrafficError` is internal to this chain and never reaches the planner.

pub mod error;
pub mod predictor;
pub mod service;

#[cfg(test)]
mod tests;

pub use error::{TrafficError, TrafficResult};
pub use predictor::{FlowEstimate, FlowSource, TrafficPredictor};
pub use service::{HttpVolumeService, VolumeService};
