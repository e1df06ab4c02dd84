

pub mod extractor;
pub mod intent;
pub mod models;
pub mod normalizer;
pub mod patterns;
pub mod processor;
pub mod synonyms;

pub use extractor::EntityExtractor;
pub use intent::IntentClassifier;
pub use models::{
    Availability, ExtractedEntities, Intent, ProcessedQuery, QueryFilters, Quality,
    ResolvedLocation, SearchType, SizeFilter, UserLocation,
};
pub use normalizer::normalize;
pub use processor::{is_valid, validate, QueryProcessor};
pub use synonyms::{SynonymRegistry, TermKind, SYNONYMS};
