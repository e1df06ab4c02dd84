

use thiserror::Error;


#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Query has no searchable service or product")]
    NoSearchableEntity,

    #[error("Invalid coordinates: ({lat}, {lng})")]
    InvalidCoordinates { lat: f64, lng: f64 },

    #[error("Search radius {0} is outside [1, 100] miles")]
    InvalidRadius(f64),
}


#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Store call timed out after {0}ms")]
    Timeout(u64),
}


#[derive(Error, Debug)]
pub enum GeocodeError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid geocoder URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("Address not found: {0}")]
    NotFound(String),

    #[error("Geocoder call timed out after {0}ms")]
    Timeout(u64),

    #[error("Geocoder error: {0}")]
    Provider(String),
}


#[derive(Error, Debug)]
pub enum PawfinderError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Geocoding error: {0}")]
    Geocode(#[from] GeocodeError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<config::ConfigError> for PawfinderError {
    fn from(e: config::ConfigError) -> Self {
        Self::Config(e.to_string())
    }
}


pub type Result<T> = std::result::Result<T, PawfinderError>;
