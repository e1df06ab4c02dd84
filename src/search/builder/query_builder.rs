use std::collections::HashSet;

use tracing::debug;

use super::predicate::{Field, MatchStrength, Predicate, SortField, SortKey, StructuredQuery};
use crate::core::config::PawfinderConfig;
use crate::core::geo::BoundingBox;
use crate::search::query_processor::models::{ProcessedQuery, Quality};
use crate::search::query_processor::patterns::{NEAR_ME_PHRASES, STOPWORDS};


const MIN_WORD_LEN: usize = 3;
const MAX_SIGNIFICANT_WORDS: usize = 2;


/// Compiles a processed query into store predicates, one variant per match strength.
#[derive(Debug, Clone)]
pub struct QueryBuilder {
    strict_location_fields: bool,
    per_page: u32,
}

impl Default for QueryBuilder {
    fn default() -> Self {
        Self::new(&PawfinderConfig::default())
    }
}

impl QueryBuilder {
    pub fn new(config: &PawfinderConfig) -> Self {
        Self {
            strict_location_fields: config.strict_location_fields,
            per_page: config.per_page.max(1),
        }
    }

    pub fn per_page(&self) -> u32 {
        self.per_page
    }

    /// First page with the configured page size.
    pub fn build(&self, query: &ProcessedQuery, strength: MatchStrength) -> StructuredQuery {
        self.build_page(query, strength, 1, self.per_page)
    }


    pub fn build_page(
        &self,
        query: &ProcessedQuery,
        strength: MatchStrength,
        page: u32,
        per_page: u32,
    ) -> StructuredQuery {
        let per_page = per_page.max(1) as usize;
        let offset = page.saturating_sub(1) as usize * per_page;

        let mut clauses = Vec::new();
        if let Some(text) = text_predicate(query, strength) {
            clauses.push(text);
        }
        if strength == MatchStrength::Broad {
            clauses.push(availability_predicate());
        }
        clauses.extend(self.location_predicates(query));
        clauses.extend(filter_predicates(query));

        let predicate = Predicate::all(clauses);
        debug!(
            "Built {:?} query over fields {:?}",
            strength,
            predicate.fields()
        );

        StructuredQuery {
            strength,
            predicate,
            sort: sort_keys(query),
            origin: query.location.as_ref().map(|l| l.center()),
            limit: per_page,
            offset,
        }
    }


    fn location_predicates(&self, query: &ProcessedQuery) -> Vec<Predicate> {
        let Some(location) = &query.location else {
            return Vec::new();
        };

        let bbox = BoundingBox::around(location.center(), location.radius);
        let mut out = vec![
            Predicate::between(Field::Latitude, bbox.min_lat, bbox.max_lat),
            Predicate::between(Field::Longitude, bbox.min_lng, bbox.max_lng),
        ];

        if self.strict_location_fields && !location.is_near_me {
            for (field, value) in [
                (Field::City, &query.filters.city),
                (Field::State, &query.filters.state),
                (Field::Zip, &query.filters.zip),
            ] {
                if let Some(v) = value {
                    out.push(Predicate::equals(field, v.as_str()));
                }
            }
        }
        out
    }
}


fn type_predicate(query: &ProcessedQuery) -> Option<Predicate> {
    let tags = query.search_tags();
    if tags.is_empty() {
        None
    } else {
        Some(Predicate::one_of(Field::ServiceType, tags))
    }
}


fn text_predicate(query: &ProcessedQuery, strength: MatchStrength) -> Option<Predicate> {
    let mut alternatives: Vec<Predicate> = type_predicate(query).into_iter().collect();
    let text = query.normalized_query.trim();

    match strength {
        MatchStrength::Exact => {
            if !text.is_empty() {
                alternatives.push(Predicate::contains(Field::Name, text));
            }
        }
        MatchStrength::Fuzzy => {
            for word in text.split_whitespace().filter(|w| w.chars().count() >= MIN_WORD_LEN) {
                alternatives.push(Predicate::contains(Field::Name, word));
                alternatives.push(Predicate::contains(Field::Description, word));
            }
        }
        MatchStrength::Broad => {
            for tag in query.search_tags() {
                alternatives.push(Predicate::contains(Field::Tags, tag));
            }
            for word in significant_words(query) {
                for field in [Field::Name, Field::Description, Field::Tags] {
                    alternatives.push(Predicate::contains(field, word.as_str()));
                }
            }
        }
    }

    if alternatives.is_empty() {
        None
    } else {
        Some(Predicate::any(alternatives))
    }
}


/// Up to two words of the query that are neither stopwords nor part of a location.
pub fn significant_words(query: &ProcessedQuery) -> Vec<String> {
    let location_words: HashSet<&str> = query
        .entities
        .locations
        .iter()
        .flat_map(|l| l.split(|c: char| c.is_whitespace() || c == '_'))
        .chain(NEAR_ME_PHRASES.iter().flat_map(|p| p.split_whitespace()))
        .collect();

    query
        .normalized_query
        .split_whitespace()
        .filter(|w| w.chars().count() >= MIN_WORD_LEN)
        .filter(|w| !STOPWORDS.contains(w))
        .filter(|w| !location_words.contains(w))
        .take(MAX_SIGNIFICANT_WORDS)
        .map(str::to_string)
        .collect()
}


/// Active services or in-stock products.
fn availability_predicate() -> Predicate {
    Predicate::any(vec![
        Predicate::all(vec![
            Predicate::equals(Field::Kind, "service"),
            Predicate::equals(Field::IsActive, true),
        ]),
        Predicate::all(vec![
            Predicate::equals(Field::Kind, "product"),
            Predicate::equals(Field::InStock, true),
        ]),
    ])
}


fn filter_predicates(query: &ProcessedQuery) -> Vec<Predicate> {
    let mut out = Vec::new();
    if let Some(rating) = query.filters.min_rating {
        out.push(Predicate::at_least(Field::Rating, f64::from(rating)));
    }
    if query.filters.organic == Some(true) {
        out.push(Predicate::contains(Field::Tags, "organic"));
    }
    out
}


fn sort_keys(query: &ProcessedQuery) -> Vec<SortKey> {
    let mut keys = Vec::with_capacity(4);
    if query.location.is_some() {
        keys.push(SortKey::asc(SortField::Distance));
    }
    match query.filters.quality {
        Some(Quality::Budget) => {
            keys.push(SortKey::asc(SortField::Price));
            keys.push(SortKey::desc(SortField::Rating));
        }
        Some(Quality::Premium) => {
            keys.push(SortKey::desc(SortField::Rating));
            keys.push(SortKey::desc(SortField::ReviewCount));
            keys.push(SortKey::desc(SortField::Price));
        }
        None => {
            keys.push(SortKey::desc(SortField::Rating));
            keys.push(SortKey::desc(SortField::ReviewCount));
        }
    }
    keys
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::query_processor::models::{ResolvedLocation, UserLocation};

    fn groomer_query() -> ProcessedQuery {
        let mut q = ProcessedQuery::empty("Groomers in Indianapolis");
        q.normalized_query = "groomers in indianapolis".into();
        q.entities.services.insert("groomer".into());
        q.entities.locations.insert("indianapolis".into());
        q
    }

    fn or_clauses(p: &Predicate) -> &[Predicate] {
        match p {
            Predicate::Or { clauses } => clauses,
            other => panic!("expected Or, got {:?}", other),
        }
    }

    #[test]
    fn test_exact_matches_type_or_full_text() {
        let sq = QueryBuilder::default().build(&groomer_query(), MatchStrength::Exact);
        let clauses = or_clauses(&sq.predicate);
        assert_eq!(clauses[0], Predicate::equals(Field::ServiceType, "groomer"));
        assert_eq!(clauses[1], Predicate::contains(Field::Name, "groomers in indianapolis"));
        assert_eq!(sq.limit, 20);
        assert_eq!(sq.offset, 0);
    }

    #[test]
    fn test_fuzzy_splits_words() {
        let sq = QueryBuilder::default().build(&groomer_query(), MatchStrength::Fuzzy);
        let clauses = or_clauses(&sq.predicate);
        // type + (groomers, indianapolis) × (name, description); "in" is too short
        assert_eq!(clauses.len(), 5);
        assert!(clauses.contains(&Predicate::contains(Field::Description, "indianapolis")));
        assert!(!clauses.contains(&Predicate::contains(Field::Name, "in")));
    }

    #[test]
    fn test_broad_adds_availability_and_skips_locations() {
        let sq = QueryBuilder::default().build(&groomer_query(), MatchStrength::Broad);
        let Predicate::And { clauses } = &sq.predicate else {
            panic!("expected And, got {:?}", sq.predicate);
        };
        let text = or_clauses(&clauses[0]);
        assert!(text.contains(&Predicate::contains(Field::Tags, "groomer")));
        assert!(text.contains(&Predicate::contains(Field::Tags, "groomers")));
        assert!(!text.iter().any(|c| c == &Predicate::contains(Field::Name, "indianapolis")));
        assert_eq!(clauses[1], availability_predicate());
    }

    #[test]
    fn test_significant_words() {
        let mut q = ProcessedQuery::empty("");
        q.normalized_query = "find the best organic dog treats near me".into();
        q.entities.locations.insert(crate::NEAR_ME.into());
        assert_eq!(significant_words(&q), vec!["organic", "dog"]);
    }

    #[test]
    fn test_location_bounding_box_and_strict_fields() {
        let mut q = groomer_query();
        let mut loc = ResolvedLocation::at_user(&UserLocation::new(39.7684, -86.1581), 10.0, 0.85);
        loc.city = Some("Indianapolis".into());
        q.filters.city = Some("Indianapolis".into());
        q.location = Some(loc);

        let sq = QueryBuilder::default().build(&q, MatchStrength::Exact);
        let Predicate::And { clauses } = &sq.predicate else {
            panic!("expected And");
        };
        match &clauses[1] {
            Predicate::Range { field, min: Some(min), max: Some(max) } => {
                assert_eq!(*field, Field::Latitude);
                assert!((max - min - 20.0 / 69.0).abs() < 1e-9);
            }
            other => panic!("expected latitude range, got {:?}", other),
        }
        assert!(!sq.predicate.fields().contains(&Field::City));
        assert_eq!(sq.sort[0], SortKey::asc(SortField::Distance));
        assert_eq!(sq.origin, Some(crate::core::geo::GeoPoint::new(39.7684, -86.1581)));

        let mut config = PawfinderConfig::default();
        config.strict_location_fields = true;
        let strict = QueryBuilder::new(&config).build(&q, MatchStrength::Exact);
        assert!(strict.predicate.fields().contains(&Field::City));
    }

    #[test]
    fn test_filters_and_ordering() {
        let mut q = groomer_query();
        q.filters.min_rating = Some(4);
        q.filters.organic = Some(true);
        q.filters.quality = Some(Quality::Budget);

        let sq = QueryBuilder::default().build(&q, MatchStrength::Exact);
        let Predicate::And { clauses } = &sq.predicate else {
            panic!("expected And");
        };
        assert!(clauses.contains(&Predicate::at_least(Field::Rating, 4.0)));
        assert!(clauses.contains(&Predicate::contains(Field::Tags, "organic")));
        assert_eq!(
            sq.sort,
            vec![SortKey::asc(SortField::Price), SortKey::desc(SortField::Rating)]
        );

        q.filters.quality = Some(Quality::Premium);
        let premium = QueryBuilder::default().build(&q, MatchStrength::Exact);
        assert_eq!(premium.sort.last(), Some(&SortKey::desc(SortField::Price)));

        q.filters = Default::default();
        let plain = QueryBuilder::default().build(&q, MatchStrength::Exact);
        assert_eq!(
            plain.sort,
            vec![SortKey::desc(SortField::Rating), SortKey::desc(SortField::ReviewCount)]
        );
    }

    #[test]
    fn test_pagination() {
        let sq = QueryBuilder::default().build_page(&groomer_query(), MatchStrength::Exact, 3, 10);
        assert_eq!((sq.limit, sq.offset), (10, 20));
        assert_eq!(sq.origin, None);
    }
}
