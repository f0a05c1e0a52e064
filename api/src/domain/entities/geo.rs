//! Geographic coordinates

use serde::{Deserialize, Serialize};

const EARTH_RADIUS_KM: f64 = 6371.0;

/// A latitude/longitude pair in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Latitude in [-90, 90] and longitude in [-180, 180]
    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.lat) && (-180.0..=180.0).contains(&self.lng)
    }

    /// Great-circle distance (haversine)
    pub fn distance_km(&self, other: &GeoPoint) -> f64 {
        let d_lat = (other.lat - self.lat).to_radians();
        let d_lng = (other.lng - self.lng).to_radians();
        let a = (d_lat / 2.0).sin().powi(2)
            + self.lat.to_radians().cos()
                * other.lat.to_radians().cos()
                * (d_lng / 2.0).sin().powi(2);
        2.0 * EARTH_RADIUS_KM * a.sqrt().asin()
    }

    /// Snap to four decimal places (about 11 m) so nearby readings share a cache row
    pub fn rounded(&self) -> Self {
        let snap = |v: f64| (v * 10_000.0).round() / 10_000.0;
        Self::new(snap(self.lat), snap(self.lng))
    }

    /// Key used to collapse duplicate locations
    pub fn key(&self) -> String {
        format!("{},{}", self.lat, self.lng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_to_self_is_zero() {
        let p = GeoPoint::new(30.9, 75.85);
        assert!(p.distance_km(&p) < 1e-9);
    }

    #[test]
    fn distance_between_ludhiana_and_karnal() {
        let ludhiana = GeoPoint::new(30.90, 75.85);
        let karnal = GeoPoint::new(29.69, 76.99);
        let d = ludhiana.distance_km(&karnal);
        assert!(d > 160.0 && d < 180.0, "got {}", d);
    }

    #[test]
    fn rounding_snaps_to_four_places() {
        let p = GeoPoint::new(30.900_04, 75.849_96).rounded();
        assert_eq!(p, GeoPoint::new(30.9, 75.85));
        assert_eq!(p.key(), "30.9,75.85");
    }

    #[test]
    fn validity_bounds() {
        assert!(GeoPoint::new(90.0, -180.0).is_valid());
        assert!(!GeoPoint::new(91.0, 0.0).is_valid());
        assert!(!GeoPoint::new(0.0, 180.5).is_valid());
    }
}
