use std::cmp::Ordering;

use super::models::{FormattedResults, ResultsMetadata, SearchResult};
use super::query_processor::models::{ProcessedQuery, UserLocation};
use crate::core::geo::{haversine_miles, round_to_tenth};


#[derive(Debug, Default, Clone)]
pub struct ResultsFormatter;

impl ResultsFormatter {
    pub fn new() -> Self {
        Self
    }

    /// With a resolved location every result gets its distance from the user (miles,
    /// one decimal) and the list is stably ordered nearest first. Without one the
    /// store's order is kept and distance stays unset.
    pub fn format(
        &self,
        mut results: Vec<SearchResult>,
        user: &UserLocation,
        query: &ProcessedQuery,
    ) -> FormattedResults {
        if query.location.is_some() {
            let origin = user.point();
            for result in results.iter_mut() {
                let miles = haversine_miles(origin, result.location.point());
                result.distance = Some(round_to_tenth(miles));
            }
            results.sort_by(|a, b| {
                a.distance
                    .partial_cmp(&b.distance)
                    .unwrap_or(Ordering::Equal)
            });
        } else {
            for result in results.iter_mut() {
                result.distance = None;
            }
        }

        FormattedResults {
            metadata: ResultsMetadata {
                total_results: results.len() as u64,
                search_radius: query.location.as_ref().map(|l| l.radius),
                query_interpretation: query.intent.clone(),
                filters_applied: query.filters.applied(),
                strategy: None,
                expanded: false,
            },
            results,
            pagination: None,
        }
    }
}
