//! The external prediction service boundary.
//!
//! # Wire format
//!
//! ```text
//! GET {base_url}/predict?node=<node id>&time=<slot 0..24>
//! 200 OK
//! { "node": 3, "time": 8, "volume": 87.4, ... }
//! ```
//!
//! Only `volume` is read.  Any other status is a failure.

use std::future::Future;
use std::time::Duration;

use log::debug;
use reqwest::{Client, StatusCode};
use serde::Deserialize;

use tn_core::{NodeId, PredictorConfig};

use crate::{TrafficError, TrafficResult};

/// Pluggable flow prediction backend.
///
/// # Thread safety
///
/// Implementations must be `Send + Sync`: one instance is shared by every
/// concurrent plan request, and the returned future must be `Send` so the
/// search can run on a multi-threaded runtime.
pub trait VolumeService: Send + Sync {
    /// Predicted raw volume for `node` at hourly `slot`.  No clamping or
    /// timeout is applied here; [`TrafficPredictor`](crate::TrafficPredictor)
    /// does both.
    fn predict_volume(
        &self,
        node: NodeId,
        slot: u8,
    ) -> impl Future<Output = TrafficResult<f64>> + Send;
}

#[derive(Deserialize)]
struct PredictResponse {
    volume: f64,
}

/// HTTP client for the prediction service.
#[derive(Clone)]
pub struct HttpVolumeService {
    client:   Client,
    endpoint: String,
}

impl HttpVolumeService {
    /// Build a client for `base_url`.  `timeout` bounds the whole request at
    /// the transport level as well.
    pub fn new(base_url: &str, timeout: Duration) -> TrafficResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()
            .map_err(|e| TrafficError::Network(e.to_string()))?;
        Ok(Self {
            client,
            endpoint: format!("{}/predict", base_url.trim_end_matches('/')),
        })
    }

    pub fn from_config(config: &PredictorConfig) -> TrafficResult<Self> {
        Self::new(&config.base_url, config.timeout())
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl VolumeService for HttpVolumeService {
    async fn predict_volume(&self, node: NodeId, slot: u8) -> TrafficResult<f64> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("node", node.get().to_string()), ("time", slot.to_string())])
            .send()
            .await
            .map_err(|e| TrafficError::Network(e.to_string()))?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(TrafficError::Status(status.as_u16()));
        }

        let body: PredictResponse = response
            .json()
            .await
            .map_err(|e| TrafficError::Malformed(e.to_string()))?;
        if !body.volume.is_finite() {
            return Err(TrafficError::Malformed(format!("non-finite volume {}", body.volume)));
        }

        debug!("predicted volume {} for {node} at slot {slot}", body.volume);
        Ok(body.volume)
    }
}
