//! Unit tests for tn-core primitives.

#[cfg(test)]
mod ids {
    use crate::{EdgeId, NodeId};

    #[test]
    fn ordering() {
        assert!(NodeId(0) < NodeId(1));
        assert!(EdgeId(100) > EdgeId(99));
    }

    #[test]
    fn display() {
        assert_eq!(NodeId(7).to_string(), "NodeId(7)");
        assert_eq!(EdgeId(3).to_string(), "EdgeId(3)");
    }

    #[test]
    fn serde_is_transparent() {
        let json = serde_json::to_string(&NodeId(42)).unwrap();
        assert_eq!(json, "42");
        let back: NodeId = serde_json::from_str("42").unwrap();
        assert_eq!(back, NodeId(42));
    }
}

#[cfg(test)]
mod geo {
    use crate::geo::{distance_km, distance_km_text};
    use crate::{CoreError, GeoPoint};

    #[test]
    fn zero_distance() {
        let p = GeoPoint::new(39.9042, 116.4074);
        assert!(p.distance_km(p) < 1e-9);
    }

    #[test]
    fn one_degree_latitude() {
        // ~1 degree of latitude ≈ 111.19 km on a 6371 km sphere
        let d = distance_km(30.0, 120.0, 31.0, 120.0);
        assert!((d - 111.195).abs() < 0.01, "got {d}");
    }

    #[test]
    fn symmetric_within_tolerance() {
        let pairs = [
            ((39.9042, 116.4074), (31.2304, 121.4737)),
            ((-33.8688, 151.2093), (51.5074, -0.1278)),
            ((0.0, 179.9), (0.0, -179.9)),
            ((89.9, 0.0), (-89.9, 180.0)),
            ((30.0001, 120.0002), (30.0002, 120.0001)),
        ];
        for ((a_lat, a_lng), (b_lat, b_lng)) in pairs {
            let ab = distance_km(a_lat, a_lng, b_lat, b_lng);
            let ba = distance_km(b_lat, b_lng, a_lat, a_lng);
            let tol = 1e-9 * ab.abs().max(1e-12);
            assert!((ab - ba).abs() <= tol, "{ab} vs {ba}");
        }
    }

    #[test]
    fn antimeridian_is_short() {
        // 0.2 degrees of longitude at the equator, not 359.8
        let d = distance_km(0.0, 179.9, 0.0, -179.9);
        assert!(d < 23.0, "got {d}");
    }

    #[test]
    fn parse_accepts_padded_text() {
        let p = GeoPoint::parse(" 39.9 ", "116.4").unwrap();
        assert_eq!(p, GeoPoint::new(39.9, 116.4));
    }

    #[test]
    fn parse_rejects_non_numeric() {
        let err = GeoPoint::parse("north", "116.4").unwrap_err();
        assert!(matches!(err, CoreError::MalformedCoordinate { ref lat, .. } if lat == "north"));
    }

    #[test]
    fn parse_rejects_out_of_range_and_nan() {
        assert!(GeoPoint::parse("91.0", "0").is_err());
        assert!(GeoPoint::parse("0", "-180.5").is_err());
        assert!(GeoPoint::parse("NaN", "0").is_err());
        assert!(GeoPoint::parse("inf", "0").is_err());
    }

    #[test]
    fn text_distance_matches_numeric() {
        let text = distance_km_text("30.0", "120.0", "31.0", "120.0").unwrap();
        let num = distance_km(30.0, 120.0, 31.0, 120.0);
        assert_eq!(text, num);
        assert!(matches!(
            distance_km_text("30.0", "abc", "31.0", "120.0"),
            Err(CoreError::MalformedCoordinate { .. })
        ));
    }

    #[test]
    fn bounds_check() {
        let p = GeoPoint::new(30.5, 120.5);
        assert!(p.within_bounds(30.0, 31.0, 120.0, 121.0));
        assert!(!p.within_bounds(30.6, 31.0, 120.0, 121.0));
    }
}

#[cfg(test)]
mod time {
    use crate::{CoreError, TimePoint};

    #[test]
    fn default_is_morning_peak() {
        let t = TimePoint::default();
        assert_eq!((t.day, t.slot), (1, 8));
        assert_eq!(t.to_string(), "day 1 08:00");
    }

    #[test]
    fn slot_bounds() {
        assert!(TimePoint::new(3, 23).is_ok());
        assert!(matches!(TimePoint::new(3, 24), Err(CoreError::InvalidTimeSlot(24))));
    }
}

#[cfg(test)]
mod route_type {
    use crate::RouteType;

    #[test]
    fn parse_known_values_case_insensitive() {
        assert_eq!(RouteType::parse_lenient("shortest"), RouteType::Shortest);
        assert_eq!(RouteType::parse_lenient("FASTEST"), RouteType::Fastest);
        assert_eq!(RouteType::parse_lenient("avoidingTraffic"), RouteType::AvoidingTraffic);
    }

    #[test]
    fn unknown_defaults_to_fastest() {
        assert_eq!(RouteType::parse_lenient("scenic"), RouteType::Fastest);
        assert_eq!(RouteType::parse_lenient(""), RouteType::Fastest);
        assert_eq!(RouteType::default(), RouteType::Fastest);
    }

    #[test]
    fn serializes_as_policy_name() {
        let json = serde_json::to_string(&RouteType::AvoidingTraffic).unwrap();
        assert_eq!(json, "\"avoidingtraffic\"");
    }
}

#[cfg(test)]
mod congestion {
    use crate::CongestionLevel;

    #[test]
    fn band_edges() {
        assert_eq!(CongestionLevel::classify(0.0), CongestionLevel::Smooth);
        assert_eq!(CongestionLevel::classify(39.9), CongestionLevel::Smooth);
        assert_eq!(CongestionLevel::classify(40.0), CongestionLevel::Slow);
        assert_eq!(CongestionLevel::classify(70.0), CongestionLevel::Congested);
        assert_eq!(CongestionLevel::classify(100.0), CongestionLevel::Severe);
    }

    #[test]
    fn ordered_by_severity() {
        assert!(CongestionLevel::Smooth < CongestionLevel::Severe);
        assert!(CongestionLevel::Slow < CongestionLevel::Congested);
    }
}

#[cfg(test)]
mod config {
    use crate::{CoreError, PlannerConfig};

    #[test]
    fn defaults_validate() {
        let c = PlannerConfig::default();
        assert!(c.validate().is_ok());
        assert_eq!(c.congestion_alpha, 0.05);
        assert_eq!(c.average_speed_kmh, 50.0);
        assert_eq!(c.high_flow_threshold, 100);
        assert_eq!(c.predictor.timeout_ms, 5_000);
    }

    #[test]
    fn partial_json_fills_defaults() {
        let c = PlannerConfig::from_json_str(
            r#"{ "congestion_alpha": 0.1, "predictor": { "timeout_ms": 250 } }"#,
        )
        .unwrap();
        assert_eq!(c.congestion_alpha, 0.1);
        assert_eq!(c.predictor.timeout_ms, 250);
        assert_eq!(c.predictor.base_url, "http://localhost:5000");
        assert_eq!(c.average_speed_kmh, 50.0);
    }

    #[test]
    fn rejects_negative_alpha() {
        let err = PlannerConfig::from_json_str(r#"{ "congestion_alpha": -0.5 }"#).unwrap_err();
        assert!(matches!(err, CoreError::Config(_)));
    }

    #[test]
    fn rejects_zero_speed() {
        let err = PlannerConfig::from_json_str(r#"{ "average_speed_kmh": 0.0 }"#).unwrap_err();
        assert!(matches!(err, CoreError::Config(_)));
    }

    #[test]
    fn rejects_bad_slot() {
        let err =
            PlannerConfig::from_json_str(r#"{ "time_point": { "day": 2, "slot": 30 } }"#).unwrap_err();
        assert!(matches!(err, CoreError::InvalidTimeSlot(30)));
    }

    #[test]
    fn rejects_inverted_flow_clamp() {
        let err = PlannerConfig::from_json_str(r#"{ "min_flow": 10.0, "max_flow": 5.0 }"#).unwrap_err();
        assert!(matches!(err, CoreError::Config(_)));
    }

    #[test]
    fn malformed_json_is_parse_error() {
        assert!(matches!(
            PlannerConfig::from_json_str("{ not json"),
            Err(CoreError::Json(_))
        ));
    }
}
