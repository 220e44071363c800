//! Geographic coordinate type and great-circle distance.
//!
//! Coordinates are `f64` decimal degrees.  The graph store keeps them as text,
//! so [`GeoPoint::parse`] is the usual way in; it rejects anything that is not
//! a finite number inside the WGS-84 ranges with
//! [`CoreError::MalformedCoordinate`] rather than computing a distance from
//! garbage.

use serde::{Deserialize, Serialize};

use crate::{CoreError, CoreResult};

/// Mean Earth radius used by the spherical model, kilometres.
pub const EARTH_RADIUS_KM: f64 = 6_371.0;

/// A WGS-84 geographic coordinate.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    /// Construct without validation.  Use [`GeoPoint::try_new`] for input
    /// that has not been checked yet.
    #[inline]
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Construct a point, rejecting non-finite or out-of-range values.
    pub fn try_new(lat: f64, lng: f64) -> CoreResult<Self> {
        let valid = lat.is_finite()
            && lng.is_finite()
            && (-90.0..=90.0).contains(&lat)
            && (-180.0..=180.0).contains(&lng);
        if valid {
            Ok(Self { lat, lng })
        } else {
            Err(CoreError::MalformedCoordinate {
                lat: lat.to_string(),
                lng: lng.to_string(),
            })
        }
    }

    /// Parse a point from its textual storage form.
    pub fn parse(lat: &str, lng: &str) -> CoreResult<Self> {
        let malformed = || CoreError::MalformedCoordinate {
            lat: lat.to_owned(),
            lng: lng.to_owned(),
        };
        let lat_v: f64 = lat.trim().parse().map_err(|_| malformed())?;
        let lng_v: f64 = lng.trim().parse().map_err(|_| malformed())?;
        Self::try_new(lat_v, lng_v).map_err(|_| malformed())
    }

    /// Haversine great-circle distance in kilometres.
    pub fn distance_km(self, other: GeoPoint) -> f64 {
        distance_km(self.lat, self.lng, other.lat, other.lng)
    }

    /// Axis-aligned bounding-box containment check in degrees.
    #[inline]
    pub fn within_bounds(self, min_lat: f64, max_lat: f64, min_lng: f64, max_lng: f64) -> bool {
        self.lat >= min_lat && self.lat <= max_lat && self.lng >= min_lng && self.lng <= max_lng
    }
}

impl std::fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.6}, {:.6})", self.lat, self.lng)
    }
}

/// Haversine distance between two lat/lng pairs, kilometres.
///
/// Symmetric: every term is either squared or a commutative product, so
/// swapping the endpoints yields the same bits.
pub fn distance_km(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lng = (lng2 - lng1).to_radians();

    let lat1 = lat1.to_radians();
    let lat2 = lat2.to_radians();

    let a = (d_lat * 0.5).sin().powi(2)
        + lat1.cos() * lat2.cos() * (d_lng * 0.5).sin().powi(2);

    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_KM * c
}

/// Text-accepting variant of [`distance_km`].
///
/// Fails with [`CoreError::MalformedCoordinate`] naming the offending pair.
pub fn distance_km_text(lat1: &str, lng1: &str, lat2: &str, lng2: &str) -> CoreResult<f64> {
    let a = GeoPoint::parse(lat1, lng1)?;
    let b = GeoPoint::parse(lat2, lng2)?;
    Ok(a.distance_km(b))
}
