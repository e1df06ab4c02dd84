

pub mod builder;
pub mod executor;
pub mod formatter;
pub mod location;
pub mod models;
pub mod query_processor;
pub mod service;


pub use builder::{MatchStrength, Predicate, QueryBuilder, StructuredQuery};
pub use executor::SearchExecutor;
pub use formatter::ResultsFormatter;
pub use location::LocationResolver;
pub use models::{AttemptReport, FormattedResults, PageInfo, ResultsMetadata, SearchPage, SearchResponse, SearchResult};
pub use query_processor::{ProcessedQuery, QueryProcessor, UserLocation};
pub use service::LocalSearch;
