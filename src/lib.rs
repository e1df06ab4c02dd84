

pub mod core;
pub mod geocoding;
pub mod search;
pub mod store;
pub mod utils;

pub use utils::{safe_truncate_ellipsis, title_case};


pub use core::config::PawfinderConfig;
pub use core::error::{PawfinderError, Result};
pub use geocoding::{GazetteerGeocoder, Geocoder, HttpGeocoder};
pub use search::{FormattedResults, LocalSearch, ProcessedQuery, UserLocation};
pub use store::{InMemoryStore, Listing, ListingStore};


/// Location token recorded for "near me" style phrases.
pub const NEAR_ME: &str = "near_me";


pub const DEFAULT_RADIUS_MILES: f64 = 25.0;


pub const DEFAULT_REGION: &str = "IN";


pub const DEFAULT_CACHE_SIZE: usize = 1000;


pub const DEFAULT_CACHE_TTL: u64 = 300;
