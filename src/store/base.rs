

use async_trait::async_trait;
use std::sync::Arc;

use super::models::Listing;
use crate::core::error::StoreError;
use crate::search::builder::predicate::{Predicate, StructuredQuery};


/// Directory backend. Must support equality, case-insensitive contains, range and
/// OR-groups, multi-key ordering, limit/offset, and an exact count of a filter.
#[async_trait]
pub trait ListingStore: Send + Sync {

    async fn find(&self, query: &StructuredQuery) -> Result<Vec<Listing>, StoreError>;


    async fn count(&self, predicate: &Predicate) -> Result<u64, StoreError>;


    fn store_name(&self) -> &str;
}


#[async_trait]
impl ListingStore for Arc<dyn ListingStore> {
    async fn find(&self, query: &StructuredQuery) -> Result<Vec<Listing>, StoreError> {
        (**self).find(query).await
    }

    async fn count(&self, predicate: &Predicate) -> Result<u64, StoreError> {
        (**self).count(predicate).await
    }

    fn store_name(&self) -> &str {
        (**self).store_name()
    }
}
