

pub mod predicate;
pub mod query_builder;


pub use predicate::{Direction, Field, MatchStrength, Predicate, SortField, SortKey, StructuredQuery, Value};
pub use query_builder::QueryBuilder;
