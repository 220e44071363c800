//! Unit tests for tn-traffic.
//!
//! Service behaviour is simulated with small in-process `VolumeService`
//! implementations; the HTTP client is exercised against a one-shot local
//! TCP responder.

#[cfg(test)]
mod helpers {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use tn_core::{NodeId, PlannerConfig};
    use tn_store::MemoryStore;

    use crate::{TrafficError, TrafficResult, VolumeService};

    /// Answers every node with the same volume and counts calls.
    pub struct Fixed {
        pub volume: f64,
        pub calls:  AtomicUsize,
    }

    impl Fixed {
        pub fn new(volume: f64) -> Self {
            Self { volume, calls: AtomicUsize::new(0) }
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl VolumeService for Fixed {
        async fn predict_volume(&self, _node: NodeId, _slot: u8) -> TrafficResult<f64> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.volume)
        }
    }

    /// Always answers with a server error.
    pub struct Failing;

    impl VolumeService for Failing {
        async fn predict_volume(&self, _node: NodeId, _slot: u8) -> TrafficResult<f64> {
            Err(TrafficError::Status(503))
        }
    }

    /// Never answers within any reasonable timeout.
    pub struct Stalled;

    impl VolumeService for Stalled {
        async fn predict_volume(&self, _node: NodeId, _slot: u8) -> TrafficResult<f64> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok(10.0)
        }
    }

    pub fn config(timeout_ms: u64) -> PlannerConfig {
        let mut c = PlannerConfig::default();
        c.predictor.timeout_ms = timeout_ms;
        c
    }

    /// Node 2 has 150 at day 1 slot 8; node 3 has 0 at day 1 slot 8.
    pub fn history() -> MemoryStore {
        let mut b = MemoryStore::builder();
        b.add_flow(1, 8, NodeId(2), 150).add_flow(1, 8, NodeId(3), 0);
        b.build().unwrap()
    }
}

#[cfg(test)]
mod chain {
    use tn_core::{NodeId, TimePoint};

    use super::helpers::{config, history, Failing, Fixed, Stalled};
    use crate::{FlowEstimate, FlowSource, TrafficPredictor};

    const AT: TimePoint = TimePoint { day: 1, slot: 8 };

    #[tokio::test]
    async fn predicted_when_service_answers() {
        let p = TrafficPredictor::new(Fixed::new(87.5), &config(1_000));
        let e = p.estimate_flow(&history(), NodeId(2), AT, true).await;
        assert_eq!(e, FlowEstimate::new(87.5, FlowSource::Predicted));
    }

    #[tokio::test]
    async fn predicted_volume_floored_at_one() {
        let p = TrafficPredictor::new(Fixed::new(0.2), &config(1_000));
        let e = p.estimate_flow(&history(), NodeId(9), AT, true).await;
        assert_eq!(e.value, 1.0);
        assert_eq!(e.source, FlowSource::Predicted);
    }

    #[tokio::test]
    async fn predicted_volume_clamped_at_max() {
        let p = TrafficPredictor::new(Fixed::new(1e12), &config(1_000));
        let e = p.estimate_flow(&history(), NodeId(9), AT, true).await;
        assert_eq!(e.value, 10_000.0);
    }

    #[tokio::test]
    async fn non_finite_prediction_falls_back() {
        let p = TrafficPredictor::new(Fixed::new(f64::NAN), &config(1_000));
        let e = p.estimate_flow(&history(), NodeId(2), AT, true).await;
        assert_eq!(e, FlowEstimate::new(150.0, FlowSource::Historical));
    }

    #[tokio::test]
    async fn error_status_falls_back_to_history() {
        let p = TrafficPredictor::new(Failing, &config(1_000));
        let e = p.estimate_flow(&history(), NodeId(2), AT, true).await;
        assert_eq!(e, FlowEstimate::new(150.0, FlowSource::Historical));
    }

    #[tokio::test]
    async fn zero_history_is_kept_not_floored() {
        let p = TrafficPredictor::new(Failing, &config(1_000));
        let e = p.estimate_flow(&history(), NodeId(3), AT, true).await;
        assert_eq!(e, FlowEstimate::new(0.0, FlowSource::Historical));
    }

    #[tokio::test]
    async fn missing_history_uses_neutral_default() {
        let p = TrafficPredictor::new(Failing, &config(1_000));
        let e = p.estimate_flow(&history(), NodeId(42), AT, true).await;
        assert_eq!(e, FlowEstimate::new(50.0, FlowSource::Default));

        // Same node, different slot: no sample either.
        let later = TimePoint { day: 1, slot: 9 };
        let e = p.estimate_flow(&history(), NodeId(2), later, true).await;
        assert_eq!(e.source, FlowSource::Default);
    }

    #[tokio::test]
    async fn timeout_falls_back() {
        let p = TrafficPredictor::new(Stalled, &config(20));
        let started = std::time::Instant::now();
        let e = p.estimate_flow(&history(), NodeId(2), AT, true).await;
        assert_eq!(e.source, FlowSource::Historical);
        assert!(started.elapsed() < std::time::Duration::from_secs(5));
    }

    #[tokio::test]
    async fn service_not_called_when_probe_said_down() {
        let p = TrafficPredictor::new(Fixed::new(10.0), &config(1_000));
        let e = p.estimate_flow(&history(), NodeId(2), AT, false).await;
        assert_eq!(e.source, FlowSource::Historical);
        assert_eq!(p.service().calls(), 0);
    }

    #[tokio::test]
    async fn disabled_service_never_called() {
        let mut c = config(1_000);
        c.predictor.enabled = false;
        let p = TrafficPredictor::new(Fixed::new(10.0), &c);
        assert!(p.probe(NodeId(1), AT).await.is_none());
        let e = p.estimate_flow(&history(), NodeId(2), AT, true).await;
        assert_eq!(e.source, FlowSource::Historical);
        assert_eq!(p.service().calls(), 0);
    }

    #[tokio::test]
    async fn availability_check_reflects_service_health() {
        let up = TrafficPredictor::new(Fixed::new(5.0), &config(1_000)).probe(NodeId(1), AT).await;
        assert_eq!(up, Some(FlowEstimate::new(5.0, FlowSource::Predicted)));
        assert!(TrafficPredictor::new(Failing, &config(1_000)).probe(NodeId(1), AT).await.is_none());
        assert!(TrafficPredictor::new(Stalled, &config(20)).probe(NodeId(1), AT).await.is_none());
    }

    #[tokio::test]
    async fn estimate_many_dedups() {
        let p = TrafficPredictor::new(Fixed::new(12.0), &config(1_000));
        let nodes = [NodeId(3), NodeId(1), NodeId(3), NodeId(2)];
        let out = p.estimate_many(&history(), &nodes, AT, true).await;
        assert_eq!(out.len(), 3);
        assert_eq!(p.service().calls(), 3);
        assert!(out.values().all(|e| e.source == FlowSource::Predicted));
    }

    #[tokio::test]
    async fn estimate_many_mixed_tiers_when_down() {
        let p = TrafficPredictor::new(Failing, &config(1_000));
        let out = p.estimate_many(&history(), &[NodeId(2), NodeId(7)], AT, true).await;
        assert_eq!(out[&NodeId(2)].source, FlowSource::Historical);
        assert_eq!(out[&NodeId(7)].source, FlowSource::Default);
    }

    #[test]
    fn blend_is_mean() {
        let a = FlowEstimate::new(10.0, FlowSource::Predicted);
        let b = FlowEstimate::new(30.0, FlowSource::Default);
        assert_eq!(FlowEstimate::blend(a, b), 20.0);
    }
}

#[cfg(test)]
mod http {
    use std::time::Duration;

    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    use tn_core::NodeId;

    use crate::{HttpVolumeService, TrafficError, VolumeService};

    /// Serve exactly one HTTP response on a random local port and return the
    /// base URL plus a handle yielding the raw request head.
    async fn one_shot(status_line: &'static str, body: &'static str) -> (String, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            let (mut sock, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 4096];
            let mut head = Vec::new();
            loop {
                let n = sock.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                head.extend_from_slice(&buf[..n]);
                if head.windows(4).any(|w| w == b"\r\n\r\n") {
                    break;
                }
            }
            let response = format!(
                "HTTP/1.1 {status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            sock.write_all(response.as_bytes()).await.unwrap();
            sock.shutdown().await.ok();
            String::from_utf8_lossy(&head).into_owned()
        });
        (format!("http://{addr}"), handle)
    }

    #[tokio::test]
    async fn parses_volume_and_sends_query() {
        let (base, server) = one_shot("200 OK", r#"{"node":3,"time":8,"volume":87.25,"success":true}"#).await;
        let svc = HttpVolumeService::new(&base, Duration::from_secs(5)).unwrap();
        let v = svc.predict_volume(NodeId(3), 8).await.unwrap();
        assert_eq!(v, 87.25);

        let head = server.await.unwrap();
        assert!(head.starts_with("GET /predict?"), "{head}");
        assert!(head.contains("node=3"));
        assert!(head.contains("time=8"));
    }

    #[tokio::test]
    async fn non_200_is_status_error() {
        let (base, _server) = one_shot("503 Service Unavailable", r#"{"error":"model not loaded"}"#).await;
        let svc = HttpVolumeService::new(&base, Duration::from_secs(5)).unwrap();
        let err = svc.predict_volume(NodeId(1), 8).await.unwrap_err();
        assert!(matches!(err, TrafficError::Status(503)));
    }

    #[tokio::test]
    async fn missing_volume_is_malformed() {
        let (base, _server) = one_shot("200 OK", r#"{"success":true}"#).await;
        let svc = HttpVolumeService::new(&base, Duration::from_secs(5)).unwrap();
        let err = svc.predict_volume(NodeId(1), 8).await.unwrap_err();
        assert!(matches!(err, TrafficError::Malformed(_)));
    }

    #[tokio::test]
    async fn unreachable_is_network_error() {
        // Bind then drop to obtain a port nobody listens on.
        let addr = {
            let l = TcpListener::bind("127.0.0.1:0").await.unwrap();
            l.local_addr().unwrap()
        };
        let svc = HttpVolumeService::new(&format!("http://{addr}"), Duration::from_millis(500)).unwrap();
        let err = svc.predict_volume(NodeId(1), 8).await.unwrap_err();
        assert!(matches!(err, TrafficError::Network(_)));
    }

    #[test]
    fn endpoint_trims_trailing_slash() {
        let svc = HttpVolumeService::new("http://localhost:5000/", Duration::from_secs(1)).unwrap();
        assert_eq!(svc.endpoint(), "http://localhost:5000/predict");
    }
}
