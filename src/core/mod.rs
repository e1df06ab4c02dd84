pub mod cache;
pub mod config;
pub mod error;
pub mod geo;

pub use cache::{CacheKey, CacheStats, Invalidation, SearchCache, TtlCache};
pub use config::{EmptyLocationPolicy, PawfinderConfig};
pub use error::{GeocodeError, PawfinderError, Result, StoreError, ValidationError};
pub use geo::{haversine_miles, BoundingBox, GeoPoint};
