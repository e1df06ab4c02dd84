use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::builder::predicate::MatchStrength;
use super::query_processor::models::ProcessedQuery;
use crate::store::models::{Listing, ListingKind, ListingLocation};


#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub service_type: String,
    pub kind: ListingKind,
    pub rating: f64,
    pub review_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    pub location: ListingLocation,
    pub tags: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance: Option<f64>,
}

impl From<Listing> for SearchResult {
    fn from(listing: Listing) -> Self {
        Self {
            id: listing.id,
            name: listing.name,
            service_type: listing.service_type,
            kind: listing.kind,
            rating: listing.rating,
            review_count: listing.review_count,
            price: listing.price,
            location: listing.location,
            tags: listing.tags,
            distance: None,
        }
    }
}


/// One page from a single store round trip.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchPage {
    pub results: Vec<SearchResult>,
    pub total_count: u64,
}


#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttemptReport {
    pub strength: MatchStrength,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub radius: Option<f64>,
    pub result_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}


/// Outcome of the progressive search loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    pub search_id: Uuid,
    pub searched_at: DateTime<Utc>,
    pub results: Vec<SearchResult>,
    pub total_count: u64,
    /// Strength of the attempt that produced results; `None` when every attempt came back empty.
    pub strategy: Option<MatchStrength>,
    pub attempts: Vec<AttemptReport>,
    /// The query as it stood for the winning attempt, or the original when nothing matched.
    pub query: ProcessedQuery,
    /// Whether radius or filters were loosened before the winning attempt.
    pub expanded: bool,
}

impl SearchResponse {
    pub fn empty(query: ProcessedQuery, attempts: Vec<AttemptReport>) -> Self {
        Self {
            search_id: Uuid::new_v4(),
            searched_at: Utc::now(),
            results: Vec::new(),
            total_count: 0,
            strategy: None,
            attempts,
            query,
            expanded: false,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}


#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultsMetadata {
    pub total_results: u64,
    pub search_radius: Option<f64>,
    pub query_interpretation: String,
    pub filters_applied: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strategy: Option<MatchStrength>,
    #[serde(default)]
    pub expanded: bool,
}


#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub page: u32,
    pub per_page: u32,
    pub total_pages: u64,
    pub has_more: bool,
}

impl PageInfo {
    pub fn new(page: u32, per_page: u32, total: u64) -> Self {
        let per_page = per_page.max(1);
        let total_pages = total.div_ceil(u64::from(per_page));
        Self {
            page,
            per_page,
            total_pages,
            has_more: u64::from(page) < total_pages,
        }
    }
}


#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormattedResults {
    pub results: Vec<SearchResult>,
    pub metadata: ResultsMetadata,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pagination: Option<PageInfo>,
}
