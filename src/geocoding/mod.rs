

pub mod base;
pub mod gazetteer;
pub mod http;


pub use base::Geocoder;
pub use gazetteer::GazetteerGeocoder;
pub use http::HttpGeocoder;
