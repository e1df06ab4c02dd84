

use async_trait::async_trait;
use std::sync::Arc;

use crate::core::error::GeocodeError;
use crate::core::geo::GeoPoint;


/// Address-to-coordinates oracle used by the location resolver.
#[async_trait]
pub trait Geocoder: Send + Sync {

    async fn geocode(&self, address: &str) -> Result<GeoPoint, GeocodeError>;


    fn provider_name(&self) -> &str;
}


#[async_trait]
impl Geocoder for Arc<dyn Geocoder> {
    async fn geocode(&self, address: &str) -> Result<GeoPoint, GeocodeError> {
        (**self).geocode(address).await
    }

    fn provider_name(&self) -> &str {
        (**self).provider_name()
    }
}
