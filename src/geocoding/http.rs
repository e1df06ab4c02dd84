

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info};
use url::Url;

use super::base::Geocoder;
use crate::core::error::GeocodeError;
use crate::core::geo::GeoPoint;


#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    lat: f64,
    #[serde(alias = "lon")]
    lng: f64,
}


/// JSON-over-HTTP geocoder. Issues `GET <base>/geocode?q=<address>` and expects
/// `{"lat": .., "lng": ..}` back.
pub struct HttpGeocoder {
    endpoint: Url,
    client: Client,
}

impl HttpGeocoder {

    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, GeocodeError> {
        let endpoint = Url::parse(base_url)?.join("geocode")?;
        info!("HTTP geocoder initialized (endpoint={})", endpoint);
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { endpoint, client })
    }


    pub fn request_url(&self, address: &str) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut().append_pair("q", address);
        url
    }
}

#[async_trait]
impl Geocoder for HttpGeocoder {
    async fn geocode(&self, address: &str) -> Result<GeoPoint, GeocodeError> {
        let url = self.request_url(address);
        debug!("Geocoding '{}' via {}", address, url);

        let response = self.client.get(url).send().await?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(GeocodeError::NotFound(address.to_string()));
        }

        let body = response
            .error_for_status()
            .map_err(GeocodeError::Http)?
            .json::<GeocodeResponse>()
            .await?;

        let point = GeoPoint::new(body.lat, body.lng);
        if !point.is_valid() {
            return Err(GeocodeError::Provider(format!(
                "invalid coordinates for '{}': ({}, {})",
                address, body.lat, body.lng
            )));
        }
        Ok(point)
    }

    fn provider_name(&self) -> &str {
        "http"
    }
}
