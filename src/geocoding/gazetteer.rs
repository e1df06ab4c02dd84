

use async_trait::async_trait;
use tracing::debug;

use super::base::Geocoder;
use crate::core::error::GeocodeError;
use crate::core::geo::GeoPoint;
use crate::search::location::gazetteer::{find_place, region_by_code, zip_centroid};


/// Offline geocoder backed by the static gazetteer and ZIP centroid tables.
///
/// Accepts `"<place or zip>, <region>"` addresses; the region part is only checked
/// for being a known region code.
#[derive(Debug, Default, Clone)]
pub struct GazetteerGeocoder;

impl GazetteerGeocoder {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Geocoder for GazetteerGeocoder {
    async fn geocode(&self, address: &str) -> Result<GeoPoint, GeocodeError> {
        let mut parts = address.split(',').map(str::trim);
        let head = parts.next().unwrap_or_default();
        if let Some(region) = parts.next() {
            if !region.is_empty() && region_by_code(region).is_none() {
                return Err(GeocodeError::NotFound(address.to_string()));
            }
        }

        let point = if head.len() == 5 && head.chars().all(|c| c.is_ascii_digit()) {
            zip_centroid(head)
        } else {
            find_place(head).map(|p| p.center)
        };

        debug!("Gazetteer geocode '{}' -> {:?}", address, point);
        point.ok_or_else(|| GeocodeError::NotFound(address.to_string()))
    }

    fn provider_name(&self) -> &str {
        "gazetteer"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_geocode_place() {
        let geocoder = GazetteerGeocoder::new();
        let point = geocoder.geocode("Carmel, IN").await.unwrap();
        assert!((point.lat - 39.9784).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_geocode_zip() {
        let geocoder = GazetteerGeocoder::new();
        assert!(geocoder.geocode("46220, IN").await.is_ok());
        assert!(matches!(
            geocoder.geocode("99999, IN").await,
            Err(GeocodeError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_geocode_unknown_region() {
        let geocoder = GazetteerGeocoder::new();
        assert!(geocoder.geocode("Carmel, ZZ").await.is_err());
    }

    #[test]
    fn test_geocode_through_trait_object() {
        let geocoder: std::sync::Arc<dyn Geocoder> = std::sync::Arc::new(GazetteerGeocoder::new());
        let point = tokio_test::block_on(geocoder.geocode("Indianapolis, IN")).unwrap();
        assert!((point.lng + 86.1581).abs() < 1e-6);
        assert_eq!(geocoder.provider_name(), "gazetteer");
    }
}
