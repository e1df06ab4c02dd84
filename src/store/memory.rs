use std::cmp::Ordering;
use std::path::Path;

use async_trait::async_trait;
use parking_lot::RwLock;
use tracing::{debug, info};

use super::base::ListingStore;
use super::models::Listing;
use crate::core::error::{PawfinderError, StoreError};
use crate::core::geo::{haversine_miles, GeoPoint};
use crate::search::builder::predicate::{
    Direction, Field, Predicate, SortField, SortKey, StructuredQuery, Value,
};


enum FieldRef<'a> {
    Text(&'a str),
    Texts(Vec<&'a str>),
    Number(f64),
    Bool(bool),
    Missing,
}


fn field_ref<'a>(listing: &'a Listing, field: Field) -> FieldRef<'a> {
    match field {
        Field::Name => FieldRef::Text(&listing.name),
        Field::Description => FieldRef::Text(&listing.description),
        Field::Kind => FieldRef::Text(<&'static str>::from(listing.kind)),
        Field::ServiceType => FieldRef::Text(&listing.service_type),
        Field::Tags => FieldRef::Texts(listing.tags.iter().map(String::as_str).collect()),
        Field::Latitude => FieldRef::Number(listing.location.lat),
        Field::Longitude => FieldRef::Number(listing.location.lng),
        Field::City => listing.location.city.as_deref().map_or(FieldRef::Missing, FieldRef::Text),
        Field::State => listing.location.state.as_deref().map_or(FieldRef::Missing, FieldRef::Text),
        Field::Zip => listing.location.zip.as_deref().map_or(FieldRef::Missing, FieldRef::Text),
        Field::Rating => FieldRef::Number(listing.rating),
        Field::ReviewCount => FieldRef::Number(f64::from(listing.review_count)),
        Field::Price => listing.price.map_or(FieldRef::Missing, FieldRef::Number),
        Field::IsActive => FieldRef::Bool(listing.is_active),
        Field::InStock => FieldRef::Bool(listing.in_stock),
    }
}


fn value_equals(actual: &FieldRef<'_>, expected: &Value) -> bool {
    match (actual, expected) {
        (FieldRef::Text(a), Value::Text(e)) => a.eq_ignore_ascii_case(e),
        (FieldRef::Texts(items), Value::Text(e)) => items.iter().any(|a| a.eq_ignore_ascii_case(e)),
        (FieldRef::Number(a), Value::Number(e)) => (a - e).abs() < f64::EPSILON,
        (FieldRef::Bool(a), Value::Bool(e)) => a == e,
        _ => false,
    }
}


/// Evaluates a predicate tree against one listing.
pub fn matches(listing: &Listing, predicate: &Predicate) -> bool {
    match predicate {
        Predicate::Equals { field, value } => value_equals(&field_ref(listing, *field), value),
        Predicate::Contains { field, value } => {
            let needle = value.to_lowercase();
            match field_ref(listing, *field) {
                FieldRef::Text(text) => text.to_lowercase().contains(&needle),
                FieldRef::Texts(items) => items.iter().any(|t| t.to_lowercase().contains(&needle)),
                _ => false,
            }
        }
        Predicate::Range { field, min, max } => match field_ref(listing, *field) {
            FieldRef::Number(n) => min.is_none_or(|m| n >= m) && max.is_none_or(|m| n <= m),
            _ => false,
        },
        Predicate::In { field, values } => {
            let actual = field_ref(listing, *field);
            values.iter().any(|v| value_equals(&actual, v))
        }
        Predicate::And { clauses } => clauses.iter().all(|c| matches(listing, c)),
        Predicate::Or { clauses } => clauses.iter().any(|c| matches(listing, c)),
    }
}


fn compare_by(a: &Listing, b: &Listing, keys: &[SortKey], origin: Option<GeoPoint>) -> Ordering {
    for key in keys {
        let ordering = match key.field {
            SortField::Distance => {
                let Some(origin) = origin else { continue };
                haversine_miles(origin, a.location.point())
                    .partial_cmp(&haversine_miles(origin, b.location.point()))
            }
            SortField::Rating => a.rating.partial_cmp(&b.rating),
            SortField::ReviewCount => Some(a.review_count.cmp(&b.review_count)),
            SortField::Price => match (a.price, b.price) {
                (Some(x), Some(y)) => x.partial_cmp(&y),
                (Some(_), None) => return Ordering::Less,
                (None, Some(_)) => return Ordering::Greater,
                (None, None) => Some(Ordering::Equal),
            },
        }
        .unwrap_or(Ordering::Equal);

        let ordering = match key.direction {
            Direction::Asc => ordering,
            Direction::Desc => ordering.reverse(),
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}


/// Listing store held entirely in memory. Useful for tests, demos and small catalogs.
#[derive(Default)]
pub struct InMemoryStore {
    listings: RwLock<Vec<Listing>>,
}

impl InMemoryStore {
    pub fn new(listings: Vec<Listing>) -> Self {
        Self {
            listings: RwLock::new(listings),
        }
    }


    pub fn from_json_file(path: &Path) -> Result<Self, PawfinderError> {
        let raw = std::fs::read_to_string(path)?;
        let listings: Vec<Listing> = serde_json::from_str(&raw)?;
        info!("Loaded {} listings from {}", listings.len(), path.display());
        Ok(Self::new(listings))
    }
}

#[async_trait]
impl ListingStore for InMemoryStore {
    async fn find(&self, query: &StructuredQuery) -> Result<Vec<Listing>, StoreError> {
        let listings = self.listings.read();
        let mut hits: Vec<&Listing> = listings
            .iter()
            .filter(|l| matches(l, &query.predicate))
            .collect();
        hits.sort_by(|a, b| compare_by(a, b, &query.sort, query.origin));

        debug!(
            "In-memory {:?} query matched {} of {} listings",
            query.strength,
            hits.len(),
            listings.len()
        );

        Ok(hits
            .into_iter()
            .skip(query.offset)
            .take(query.limit)
            .cloned()
            .collect())
    }

    async fn count(&self, predicate: &Predicate) -> Result<u64, StoreError> {
        let listings = self.listings.read();
        Ok(listings.iter().filter(|l| matches(l, predicate)).count() as u64)
    }

    fn store_name(&self) -> &str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::builder::predicate::MatchStrength;
    use crate::store::models::{ListingKind, ListingLocation};

    fn listing(id: &str, name: &str, service_type: &str, rating: f64, price: Option<f64>) -> Listing {
        Listing {
            id: id.into(),
            name: name.into(),
            description: format!("{} in town", name),
            kind: ListingKind::Service,
            service_type: service_type.into(),
            tags: ["friendly".to_string(), "Organic".to_string()].into_iter().collect(),
            rating,
            review_count: 10,
            price,
            location: ListingLocation {
                lat: 39.77,
                lng: -86.15,
                state: Some("IN".into()),
                ..Default::default()
            },
            is_active: true,
            in_stock: true,
        }
    }

    fn query(predicate: Predicate, sort: Vec<SortKey>) -> StructuredQuery {
        StructuredQuery {
            strength: MatchStrength::Exact,
            predicate,
            sort,
            origin: None,
            limit: 10,
            offset: 0,
        }
    }

    #[test]
    fn test_predicate_evaluation() {
        let l = listing("1", "Happy Paws Grooming", "groomer", 4.5, None);
        assert!(matches(&l, &Predicate::contains(Field::Name, "PAWS")));
        assert!(matches(&l, &Predicate::contains(Field::Tags, "organic")));
        assert!(matches(&l, &Predicate::equals(Field::State, "in")));
        assert!(matches(&l, &Predicate::at_least(Field::Rating, 4.0)));
        assert!(!matches(&l, &Predicate::at_least(Field::Rating, 4.8)));
        assert!(!matches(&l, &Predicate::equals(Field::City, "Carmel")));
        assert!(!matches(&l, &Predicate::at_least(Field::Price, 1.0)));
        assert!(matches(&l, &Predicate::one_of(Field::ServiceType, ["vet", "groomer"])));
        assert!(matches(&l, &Predicate::equals(Field::Kind, "service")));
        assert!(matches(
            &l,
            &Predicate::any(vec![
                Predicate::equals(Field::ServiceType, "vet"),
                Predicate::equals(Field::IsActive, true),
            ])
        ));
    }

    #[tokio::test]
    async fn test_find_sorts_and_paginates() {
        let store = InMemoryStore::new(vec![
            listing("a", "A", "groomer", 4.0, Some(30.0)),
            listing("b", "B", "groomer", 4.8, Some(50.0)),
            listing("c", "C", "groomer", 3.5, None),
            listing("d", "D", "vet", 5.0, Some(10.0)),
        ]);
        let mut q = query(
            Predicate::equals(Field::ServiceType, "groomer"),
            vec![SortKey::asc(SortField::Distance), SortKey::desc(SortField::Rating)],
        );
        let ids: Vec<String> = store.find(&q).await.unwrap().into_iter().map(|l| l.id).collect();
        assert_eq!(ids, vec!["b", "a", "c"]);

        q.sort = vec![SortKey::asc(SortField::Price)];
        q.limit = 2;
        let ids: Vec<String> = store.find(&q).await.unwrap().into_iter().map(|l| l.id).collect();
        assert_eq!(ids, vec!["a", "b"]);

        q.offset = 2;
        let ids: Vec<String> = store.find(&q).await.unwrap().into_iter().map(|l| l.id).collect();
        assert_eq!(ids, vec!["c"]);

        assert_eq!(store.count(&q.predicate).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_distance_ordering_spans_pages() {
        let mut near = listing("near", "Near", "groomer", 3.0, None);
        near.location.lat = 39.78;
        let mut mid = listing("mid", "Mid", "groomer", 4.0, None);
        mid.location.lat = 39.90;
        let mut far = listing("far", "Far", "groomer", 5.0, None);
        far.location.lat = 40.10;
        let store = InMemoryStore::new(vec![far, mid, near]);

        let mut q = query(
            Predicate::equals(Field::ServiceType, "groomer"),
            vec![SortKey::asc(SortField::Distance), SortKey::desc(SortField::Rating)],
        );
        q.origin = Some(GeoPoint::new(39.77, -86.15));
        q.limit = 1;

        let mut pages = Vec::new();
        for offset in 0..3 {
            q.offset = offset;
            pages.extend(store.find(&q).await.unwrap().into_iter().map(|l| l.id));
        }
        assert_eq!(pages, vec!["near", "mid", "far"]);
    }
}
