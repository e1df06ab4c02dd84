use std::sync::Arc;

use tracing::{debug, info};

use super::extractor::EntityExtractor;
use super::intent::IntentClassifier;
use super::models::{ExtractedEntities, ProcessedQuery, QueryFilters, ResolvedLocation, UserLocation};
use super::normalizer::normalize;
use crate::core::config::PawfinderConfig;
use crate::core::error::ValidationError;
use crate::core::geo::GeoPoint;
use crate::geocoding::Geocoder;
use crate::search::location::LocationResolver;
use crate::utils::safe_truncate_ellipsis;


pub const MIN_RADIUS: f64 = 1.0;
pub const MAX_RADIUS: f64 = 100.0;


pub struct QueryProcessor {
    extractor: EntityExtractor,
    classifier: IntentClassifier,
    resolver: LocationResolver,
}

impl QueryProcessor {
    pub fn new(geocoder: Arc<dyn Geocoder>, config: &PawfinderConfig) -> Self {
        Self {
            extractor: EntityExtractor::new(),
            classifier: IntentClassifier::new(),
            resolver: LocationResolver::new(geocoder, config),
        }
    }


    pub async fn process(&self, query: &str, user: &UserLocation) -> ProcessedQuery {
        debug!("Processing query: {}", safe_truncate_ellipsis(query, 120));

        let normalized = normalize(query);
        let entities = self.extractor.extract(&normalized);
        let intent = self.classifier.classify(&entities, &normalized);
        let location = self.resolver.resolve(&entities.locations, user).await;

        let filters = merge_filters(&entities.filters, location.as_ref());
        let confidence = calculate_confidence(&entities, location.as_ref(), intent.confidence);

        info!(
            "Query processed: type={:?} services={} products={} confidence={:.2}",
            intent.category,
            entities.services.len(),
            entities.products.len(),
            confidence
        );

        ProcessedQuery {
            original_query: query.to_string(),
            normalized_query: normalized,
            search_type: intent.category,
            entities,
            location,
            filters,
            intent: intent.description,
            confidence,
        }
    }


    pub fn validate(&self, query: &ProcessedQuery) -> Result<(), ValidationError> {
        validate(query)
    }
}


/// A query is searchable only if it names a service or product. A present location
/// must also have sane coordinates and a radius within [1, 100] miles.
pub fn validate(query: &ProcessedQuery) -> Result<(), ValidationError> {
    if !query.entities.has_searchable() {
        return Err(ValidationError::NoSearchableEntity);
    }

    if let Some(location) = &query.location {
        if !GeoPoint::new(location.lat, location.lng).is_valid() {
            return Err(ValidationError::InvalidCoordinates {
                lat: location.lat,
                lng: location.lng,
            });
        }
        if !(MIN_RADIUS..=MAX_RADIUS).contains(&location.radius) {
            return Err(ValidationError::InvalidRadius(location.radius));
        }
    }

    Ok(())
}


pub fn is_valid(query: &ProcessedQuery) -> bool {
    validate(query).is_ok()
}


fn merge_filters(entity_filters: &QueryFilters, location: Option<&ResolvedLocation>) -> QueryFilters {
    let mut filters = entity_filters.clone();
    if let Some(loc) = location {
        if loc.is_near_me {
            return filters;
        }
        if filters.city.is_none() {
            filters.city = loc.city.clone();
        }
        if filters.state.is_none() {
            filters.state = loc.state.clone();
        }
        if filters.zip.is_none() {
            filters.zip = loc.zip.clone();
        }
    }
    filters
}


fn calculate_confidence(
    entities: &ExtractedEntities,
    location: Option<&ResolvedLocation>,
    intent_confidence: f64,
) -> f64 {
    let mut confidence = 0.5;

    for present in [
        !entities.services.is_empty(),
        !entities.products.is_empty(),
        !entities.locations.is_empty(),
    ] {
        if present {
            confidence += 0.2;
        }
    }

    if let Some(loc) = location {
        if loc.city.is_some() || loc.zip.is_some() {
            confidence += 0.1;
        }
        if loc.state.is_some() {
            confidence += 0.05;
        }
    }

    confidence += 0.1 * intent_confidence;

    f64::min(confidence, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::EmptyLocationPolicy;
    use crate::geocoding::GazetteerGeocoder;
    use crate::search::query_processor::models::{Availability, SearchType};

    fn processor() -> QueryProcessor {
        QueryProcessor::new(Arc::new(GazetteerGeocoder::new()), &PawfinderConfig::default())
    }

    fn user() -> UserLocation {
        UserLocation::new(39.77, -86.15)
    }

    #[tokio::test]
    async fn test_groomers_in_indianapolis() {
        let q = processor().process("Groomers in Indianapolis", &user()).await;
        assert_eq!(q.normalized_query, "groomers in indianapolis");
        assert_eq!(q.search_type, SearchType::Service);
        assert!(q.entities.services.contains("groomer"));
        assert!(q.entities.locations.contains("indianapolis"));

        let loc = q.location.as_ref().unwrap();
        assert!((loc.lat - 39.7684).abs() < 1e-6);
        assert!((loc.lng + 86.1581).abs() < 1e-6);
        assert_eq!(loc.radius, 10.0);
        assert_eq!(q.filters.city.as_deref(), Some("Indianapolis"));
        assert_eq!(q.filters.state.as_deref(), Some("IN"));
        assert!(q.confidence <= 1.0);
        assert!(validate(&q).is_ok());
    }

    #[tokio::test]
    async fn test_dog_parks_near_me() {
        let u = user();
        let q = processor().process("dog parks near me", &u).await;
        let loc = q.location.as_ref().unwrap();
        assert!(loc.is_near_me);
        assert_eq!(loc.radius, 10.0);
        assert_eq!((loc.lat, loc.lng), (u.lat, u.lng));
        assert!(q.filters.city.is_none());
    }

    #[tokio::test]
    async fn test_emergency_vet() {
        let q = processor().process("emergency vet 24/7", &user()).await;
        assert!(q.entities.services.contains("veterinarian"));
        assert_eq!(q.filters.availability, Some(Availability::Emergency));
    }

    #[tokio::test]
    async fn test_empty_query() {
        let q = processor().process("", &user()).await;
        assert!(q.entities.services.is_empty());
        assert!(q.entities.products.is_empty());
        assert!(q.entities.locations.is_empty());
        assert_eq!(q.search_type, SearchType::Service);
        assert_eq!(validate(&q), Err(ValidationError::NoSearchableEntity));
    }

    #[tokio::test]
    async fn test_location_only_query_is_invalid() {
        let q = processor().process("near me", &user()).await;
        assert_eq!(q.search_type, SearchType::Location);
        assert!(!is_valid(&q));
    }

    #[tokio::test]
    async fn test_no_filter_policy_leaves_location_empty() {
        let mut config = PawfinderConfig::default();
        config.empty_location_policy = EmptyLocationPolicy::NoFilter;
        let processor = QueryProcessor::new(Arc::new(GazetteerGeocoder::new()), &config);
        let q = processor.process("dog groomer", &user()).await;
        assert!(q.location.is_none());
        assert!(validate(&q).is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_location() {
        let mut q = ProcessedQuery::empty("vet");
        q.entities.services.insert("veterinarian".into());
        q.location = Some(ResolvedLocation::at_user(&user(), 150.0, 0.8));
        assert_eq!(validate(&q), Err(ValidationError::InvalidRadius(150.0)));

        q.location = Some(ResolvedLocation::at_point(GeoPoint::new(123.0, 0.0), 10.0, 0.8));
        assert!(matches!(validate(&q), Err(ValidationError::InvalidCoordinates { .. })));
    }

    #[test]
    fn test_confidence_capped() {
        let mut entities = ExtractedEntities::default();
        entities.services.insert("groomer".into());
        entities.products.insert("treats".into());
        entities.locations.insert("carmel".into());
        let mut loc = ResolvedLocation::at_user(&user(), 10.0, 0.85);
        loc.city = Some("Carmel".into());
        loc.state = Some("IN".into());
        assert_eq!(calculate_confidence(&entities, Some(&loc), 1.0), 1.0);
        assert!((calculate_confidence(&ExtractedEntities::default(), None, 0.5) - 0.55).abs() < 1e-9);
    }
}
