//! Coarse congestion classification of a flow value.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Congestion band of a node's traffic flow.
///
/// | Level       | Flow        |
/// |-------------|-------------|
/// | `Smooth`    | `< 40`      |
/// | `Slow`      | `40 ..< 70` |
/// | `Congested` | `70 ..< 100`|
/// | `Severe`    | `>= 100`    |
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CongestionLevel {
    Smooth,
    Slow,
    Congested,
    Severe,
}

impl CongestionLevel {
    pub fn classify(flow: f64) -> Self {
        if flow >= 100.0 {
            CongestionLevel::Severe
        } else if flow >= 70.0 {
            CongestionLevel::Congested
        } else if flow >= 40.0 {
            CongestionLevel::Slow
        } else {
            CongestionLevel::Smooth
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CongestionLevel::Smooth    => "smooth",
            CongestionLevel::Slow      => "slow",
            CongestionLevel::Congested => "congested",
            CongestionLevel::Severe    => "severe",
        }
    }
}

impl fmt::Display for CongestionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
