use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::builder::predicate::{MatchStrength, StructuredQuery};
use super::builder::QueryBuilder;
use super::models::{AttemptReport, SearchPage, SearchResponse, SearchResult};
use super::query_processor::models::ProcessedQuery;
use super::query_processor::processor::MAX_RADIUS;
use crate::core::config::PawfinderConfig;
use crate::core::error::StoreError;
use crate::store::ListingStore;


const RADIUS_GROWTH: f64 = 1.5;


/// Runs compiled queries against the store, either once or through the
/// exact → fuzzy → broad retry ladder.
pub struct SearchExecutor {
    store: Arc<dyn ListingStore>,
    builder: QueryBuilder,
    store_timeout: Duration,
}

impl SearchExecutor {
    pub fn new(store: Arc<dyn ListingStore>, config: &PawfinderConfig) -> Self {
        Self {
            store,
            builder: QueryBuilder::new(config),
            store_timeout: config.store_timeout(),
        }
    }

    pub fn builder(&self) -> &QueryBuilder {
        &self.builder
    }


    /// One find and one count over the same predicate. Errors propagate.
    pub async fn search_once(&self, query: &StructuredQuery) -> Result<SearchPage, StoreError> {
        let round_trip = futures::future::try_join(
            self.store.find(query),
            self.store.count(&query.predicate),
        );

        let (listings, total_count) = tokio::time::timeout(self.store_timeout, round_trip)
            .await
            .map_err(|_| StoreError::Timeout(self.store_timeout.as_millis() as u64))??;

        debug!(
            "{} returned {} rows ({} total) for {:?}",
            self.store.store_name(),
            listings.len(),
            total_count,
            query.strength
        );

        Ok(SearchPage {
            results: listings.into_iter().map(SearchResult::from).collect(),
            total_count,
        })
    }


    pub async fn search_progressive(&self, query: &ProcessedQuery) -> SearchResponse {
        self.search_progressive_page(query, 1, self.builder.per_page()).await
    }


    /// Tries each match strength in turn, stopping at the first non-empty page. Between
    /// attempts the radius grows by half (capped at 100 miles) and the rating and organic
    /// criteria are dropped. A failed attempt is logged and counted as empty.
    pub async fn search_progressive_page(
        &self,
        query: &ProcessedQuery,
        page: u32,
        per_page: u32,
    ) -> SearchResponse {
        let mut current = query.clone();
        let mut attempts = Vec::with_capacity(MatchStrength::LADDER.len());
        let mut loosened = false;

        for (i, strength) in MatchStrength::LADDER.into_iter().enumerate() {
            if i > 0 {
                loosened |= expand(&mut current);
            }

            let structured = self.builder.build_page(&current, strength, page, per_page);
            let radius = current.location.as_ref().map(|l| l.radius);

            match self.search_once(&structured).await {
                Ok(found) if !found.results.is_empty() => {
                    info!(
                        "Search '{}' matched {} results on {:?} attempt",
                        query.original_query,
                        found.results.len(),
                        strength
                    );
                    attempts.push(AttemptReport {
                        strength,
                        radius,
                        result_count: found.results.len(),
                        error: None,
                    });
                    return SearchResponse {
                        search_id: Uuid::new_v4(),
                        searched_at: Utc::now(),
                        results: found.results,
                        total_count: found.total_count,
                        strategy: Some(strength),
                        attempts,
                        query: current,
                        expanded: loosened,
                    };
                }
                Ok(_) => {
                    debug!("{:?} attempt returned nothing", strength);
                    attempts.push(AttemptReport {
                        strength,
                        radius,
                        result_count: 0,
                        error: None,
                    });
                }
                Err(e) => {
                    warn!("{:?} attempt failed, treating as empty: {}", strength, e);
                    attempts.push(AttemptReport {
                        strength,
                        radius,
                        result_count: 0,
                        error: Some(e.to_string()),
                    });
                }
            }
        }

        info!("Search '{}' found nothing after {} attempts", query.original_query, attempts.len());
        SearchResponse::empty(query.clone(), attempts)
    }
}


/// Loosens the query for the next attempt. Returns whether anything changed.
fn expand(query: &mut ProcessedQuery) -> bool {
    let mut changed = false;
    if let Some(location) = query.location.as_mut() {
        let grown = f64::min(location.radius * RADIUS_GROWTH, MAX_RADIUS);
        changed |= grown != location.radius;
        location.radius = grown;
    }
    changed |= query.filters.relax();
    query.entities.filters.relax();
    changed
}
