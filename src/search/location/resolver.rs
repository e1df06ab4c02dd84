use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use super::gazetteer::{find_place, region_by_code};
use crate::core::config::{EmptyLocationPolicy, PawfinderConfig};
use crate::core::error::GeocodeError;
use crate::core::geo::{haversine_miles, GeoPoint};
use crate::geocoding::Geocoder;
use crate::search::query_processor::models::{ResolvedLocation, UserLocation};


pub const NEAR_ME_RADIUS: f64 = 10.0;
pub const ZIP_RADIUS: f64 = 10.0;
pub const ZIP_FALLBACK_RADIUS: f64 = 25.0;
pub const PLACE_FALLBACK_RADIUS: f64 = 20.0;
pub const REGION_RADIUS: f64 = 50.0;
pub const UNRESOLVED_RADIUS: f64 = 10.0;


/// Place radius grows with how far the place is from the user.
pub fn radius_for_distance(miles: f64) -> f64 {
    if miles <= 20.0 {
        10.0
    } else if miles <= 50.0 {
        15.0
    } else {
        25.0
    }
}


/// Turns location entities and the user's position into one search center/radius.
pub struct LocationResolver {
    geocoder: Arc<dyn Geocoder>,
    region: String,
    default_radius: f64,
    empty_policy: EmptyLocationPolicy,
    geocode_timeout: Duration,
}

impl LocationResolver {
    pub fn new(geocoder: Arc<dyn Geocoder>, config: &PawfinderConfig) -> Self {
        Self {
            geocoder,
            region: config.region.clone(),
            default_radius: config.default_radius_miles,
            empty_policy: config.empty_location_policy,
            geocode_timeout: config.geocode_timeout(),
        }
    }

    pub fn with_policy(mut self, policy: EmptyLocationPolicy) -> Self {
        self.empty_policy = policy;
        self
    }


    pub async fn resolve(
        &self,
        entities: &BTreeSet<String>,
        user: &UserLocation,
    ) -> Option<ResolvedLocation> {
        if entities.is_empty() {
            return match self.empty_policy {
                EmptyLocationPolicy::UseUserLocation => {
                    Some(ResolvedLocation::at_user(user, self.default_radius, 0.8))
                }
                EmptyLocationPolicy::NoFilter => None,
            };
        }

        if entities.contains(crate::NEAR_ME) {
            let mut near = ResolvedLocation::at_user(user, NEAR_ME_RADIUS, 0.9);
            near.is_near_me = true;
            return Some(near);
        }

        let mut best: Option<ResolvedLocation> = None;
        for entity in entities {
            let Some(candidate) = self.resolve_entity(entity, user).await else { continue };
            debug!(
                "Location candidate '{}' -> ({:.4}, {:.4}) r={} conf={}",
                entity, candidate.lat, candidate.lng, candidate.radius, candidate.confidence
            );
            // Strictly greater, so the first-seen candidate keeps ties.
            if best.as_ref().is_none_or(|b| candidate.confidence > b.confidence) {
                best = Some(candidate);
            }
        }

        Some(best.unwrap_or_else(|| ResolvedLocation::at_user(user, UNRESOLVED_RADIUS, 0.3)))
    }

    async fn resolve_entity(&self, entity: &str, user: &UserLocation) -> Option<ResolvedLocation> {
        let token = entity.trim();
        if token.is_empty() {
            return None;
        }

        if is_zip(token) {
            return Some(self.resolve_zip(token, user).await);
        }

        if let Some(place) = find_place(token) {
            return Some(self.resolve_place(place.name, user).await);
        }

        if let Some(region) = region_by_code(token) {
            let mut resolved = ResolvedLocation::at_point(region.center, REGION_RADIUS, 0.7);
            resolved.state = Some(region.code.to_string());
            return Some(resolved);
        }

        Some(ResolvedLocation::at_user(user, UNRESOLVED_RADIUS, 0.1))
    }

    async fn resolve_zip(&self, zip: &str, user: &UserLocation) -> ResolvedLocation {
        let address = format!("{}, {}", zip, self.region);
        let mut resolved = match self.geocode(&address).await {
            Ok(point) => ResolvedLocation::at_point(point, ZIP_RADIUS, 0.9),
            Err(e) => {
                warn!("Geocoding zip {} failed, using user location: {}", zip, e);
                ResolvedLocation::at_user(user, ZIP_FALLBACK_RADIUS, 0.6)
            }
        };
        resolved.zip = Some(zip.to_string());
        resolved.city = None;
        resolved.state = Some(self.region.clone());
        resolved
    }

    async fn resolve_place(&self, name: &str, user: &UserLocation) -> ResolvedLocation {
        let address = format!("{}, {}", name, self.region);
        let mut resolved = match self.geocode(&address).await {
            Ok(point) => {
                let miles = haversine_miles(user.point(), point);
                ResolvedLocation::at_point(point, radius_for_distance(miles), 0.85)
            }
            Err(e) => {
                warn!("Geocoding place '{}' failed, using user location: {}", name, e);
                ResolvedLocation::at_user(user, PLACE_FALLBACK_RADIUS, 0.5)
            }
        };
        resolved.city = Some(name.to_string());
        resolved.zip = None;
        resolved.state = Some(self.region.clone());
        resolved
    }

    /// One oracle call, no retry; a timeout counts as a failure.
    async fn geocode(&self, address: &str) -> Result<GeoPoint, GeocodeError> {
        match tokio::time::timeout(self.geocode_timeout, self.geocoder.geocode(address)).await {
            Ok(result) => result,
            Err(_) => Err(GeocodeError::Timeout(self.geocode_timeout.as_millis() as u64)),
        }
    }
}


fn is_zip(token: &str) -> bool {
    token.len() == 5 && token.chars().all(|c| c.is_ascii_digit())
}
