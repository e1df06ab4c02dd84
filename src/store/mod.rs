

pub mod base;
pub mod memory;
pub mod models;


pub use base::ListingStore;
pub use memory::InMemoryStore;
pub use models::{Listing, ListingKind, ListingLocation};
