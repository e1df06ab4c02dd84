//! Great-circle distance and bounding-box helpers, all in statute miles.

use serde::{Deserialize, Serialize};

pub const EARTH_RADIUS_MILES: f64 = 3959.0;

/// Miles per degree of latitude, used for the bounding-box approximation.
pub const MILES_PER_DEGREE: f64 = 69.0;


#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }
}


/// Haversine distance between two points in miles.
pub fn haversine_miles(a: GeoPoint, b: GeoPoint) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let delta_lat = (b.lat - a.lat).to_radians();
    let delta_lng = (b.lng - a.lng).to_radians();

    let h = (delta_lat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (delta_lng / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_MILES * c
}


pub fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}


#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

impl BoundingBox {
    /// Box of half-width `radius_miles` around `center`, using 69 miles per degree
    /// of latitude and `69 * cos(lat)` per degree of longitude.
    pub fn around(center: GeoPoint, radius_miles: f64) -> Self {
        let lat_delta = radius_miles / MILES_PER_DEGREE;
        let lng_delta = radius_miles / (MILES_PER_DEGREE * center.lat.to_radians().cos());
        Self {
            min_lat: center.lat - lat_delta,
            max_lat: center.lat + lat_delta,
            min_lng: center.lng - lng_delta,
            max_lng: center.lng + lng_delta,
        }
    }

    pub fn contains(&self, point: GeoPoint) -> bool {
        point.lat >= self.min_lat
            && point.lat <= self.max_lat
            && point.lng >= self.min_lng
            && point.lng <= self.max_lng
    }
}
