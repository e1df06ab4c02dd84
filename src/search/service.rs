use std::sync::Arc;

use tracing::{debug, info, warn};

use super::executor::SearchExecutor;
use super::formatter::ResultsFormatter;
use super::models::{FormattedResults, PageInfo, SearchResponse};
use super::query_processor::models::{ProcessedQuery, UserLocation};
use super::query_processor::processor::{validate, QueryProcessor};
use crate::core::cache::{CacheKey, CacheStats, Invalidation, SearchCache, TtlCache};
use crate::core::config::PawfinderConfig;
use crate::core::error::Result;
use crate::geocoding::Geocoder;
use crate::store::ListingStore;


/// End-to-end search: interpret, validate, consult the cache, run the progressive
/// search and format the page.
pub struct LocalSearch {
    processor: QueryProcessor,
    executor: SearchExecutor,
    formatter: ResultsFormatter,
    cache: Option<Arc<dyn SearchCache<SearchResponse>>>,
    per_page: u32,
}

impl LocalSearch {
    pub fn new(
        store: Arc<dyn ListingStore>,
        geocoder: Arc<dyn Geocoder>,
        config: &PawfinderConfig,
    ) -> Self {
        let cache: Option<Arc<dyn SearchCache<SearchResponse>>> = if config.cache_enabled {
            Some(Arc::new(TtlCache::new(config.cache_capacity, config.cache_ttl_secs)))
        } else {
            None
        };

        info!(
            "LocalSearch ready: store={}, geocoder={}, cache={}",
            store.store_name(),
            geocoder.provider_name(),
            cache.is_some()
        );

        Self {
            processor: QueryProcessor::new(geocoder, config),
            executor: SearchExecutor::new(store, config),
            formatter: ResultsFormatter::new(),
            cache,
            per_page: config.per_page.max(1),
        }
    }

    pub fn with_cache(mut self, cache: Arc<dyn SearchCache<SearchResponse>>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn without_cache(mut self) -> Self {
        self.cache = None;
        self
    }


    pub async fn interpret(&self, query: &str, user: &UserLocation) -> ProcessedQuery {
        self.processor.process(query, user).await
    }

    pub async fn search(&self, query: &str, user: &UserLocation) -> Result<FormattedResults> {
        self.search_page(query, user, 1).await
    }


    /// One page of results. The store orders the whole match set by distance from
    /// the search center before paging, so pages are globally ordered for searches
    /// centered on the user; within a page results are re-sorted by distance from
    /// `user`. Cached responses are shared across callers and formatted per call.
    pub async fn search_page(
        &self,
        query: &str,
        user: &UserLocation,
        page: u32,
    ) -> Result<FormattedResults> {
        let page = page.max(1);
        let processed = self.processor.process(query, user).await;
        validate(&processed)?;

        let key = cache_key(&processed, page, self.per_page);
        let cached = match (&self.cache, &key) {
            (Some(cache), Some(key)) => cache.get(key),
            _ => None,
        };

        let response = match cached {
            Some(hit) => {
                debug!("Cache hit for {:?}", key);
                hit
            }
            None => {
                let response = self
                    .executor
                    .search_progressive_page(&processed, page, self.per_page)
                    .await;
                if response.strategy.is_none() {
                    warn!("No results for '{}'", processed.original_query);
                }
                if let (Some(cache), Some(key)) = (&self.cache, key) {
                    cache.set(key, response.clone());
                }
                response
            }
        };

        let mut formatted = self.formatter.format(response.results, user, &response.query);
        formatted.metadata.total_results = response.total_count;
        formatted.metadata.strategy = response.strategy;
        formatted.metadata.expanded = response.expanded;
        formatted.pagination = Some(PageInfo::new(page, self.per_page, response.total_count));

        Ok(formatted)
    }


    pub fn invalidate(&self, partial: &Invalidation) -> usize {
        match &self.cache {
            Some(cache) => {
                let removed = cache.invalidate(partial);
                info!("Invalidated {} cached searches", removed);
                removed
            }
            None => 0,
        }
    }

    pub fn cache_stats(&self) -> Option<CacheStats> {
        self.cache.as_ref().map(|c| c.stats())
    }
}


/// Searches centered on the user's own coordinates are never cached: two users
/// with the same address fields can stand miles apart. Everything else is keyed
/// by what decides the result set, so the normalized text, radius and every
/// non-address filter go into the variant.
fn cache_key(query: &ProcessedQuery, page: u32, per_page: u32) -> Option<CacheKey> {
    let radius = match &query.location {
        Some(location) if location.user_centered => return None,
        Some(location) => format!("{}", location.radius),
        None => "none".to_string(),
    };

    let filters = query
        .filters
        .applied()
        .into_iter()
        .filter(|(name, _)| !matches!(name.as_str(), "city" | "state" | "zip"))
        .map(|(name, value)| format!("{}={}", name, value))
        .collect::<Vec<_>>()
        .join(",");

    Some(
        CacheKey::new(
            query.primary_type().map(str::to_string),
            query.filters.state.clone(),
            query.filters.zip.clone(),
        )
        .in_city(query.filters.city.clone())
        .with_variant(format!("{}|r={}|{}", query.normalized_query, radius, filters))
        .paginated(page, per_page),
    )
}
