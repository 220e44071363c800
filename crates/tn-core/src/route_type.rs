//! Routing policy selector shared by the planner and its callers.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Which edge-weighting policy a plan request uses.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RouteType {
    /// Plain stored distance.
    Shortest,
    /// Distance scaled by predicted congestion.
    #[default]
    Fastest,
    /// Congestion-weighted, and never passes through congested nodes.
    #[serde(rename = "avoidingtraffic")]
    AvoidingTraffic,
}

impl RouteType {
    /// Parse a request parameter.  Matching is case-insensitive and anything
    /// unrecognized (including the empty string) selects [`RouteType::Fastest`].
    pub fn parse_lenient(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "shortest" => RouteType::Shortest,
            "avoidingtraffic" => RouteType::AvoidingTraffic,
            _ => RouteType::Fastest,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RouteType::Shortest        => "shortest",
            RouteType::Fastest         => "fastest",
            RouteType::AvoidingTraffic => "avoidingtraffic",
        }
    }
}

impl From<&str> for RouteType {
    fn from(s: &str) -> Self {
        RouteType::parse_lenient(s)
    }
}

impl fmt::Display for RouteType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
