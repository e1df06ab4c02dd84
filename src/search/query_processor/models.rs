use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use strum::{EnumString, IntoStaticStr};

use crate::core::geo::GeoPoint;


#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, EnumString, IntoStaticStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SearchType {
    #[default]
    Service,
    Product,
    Mixed,
    Location,
}


#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumString, IntoStaticStr)]
pub enum Availability {
    #[serde(rename = "24_7")]
    #[strum(serialize = "24_7")]
    AroundTheClock,
    #[serde(rename = "emergency")]
    #[strum(serialize = "emergency")]
    Emergency,
}


#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumString, IntoStaticStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Quality {
    Premium,
    Budget,
}


#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumString, IntoStaticStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SizeFilter {
    Large,
    Medium,
    Small,
    Any,
}


/// Filter predicates detected in the query, plus location fields layered on by the
/// processor. Serializes as a map with unset keys omitted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryFilters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub availability: Option<Availability>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mobile: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quality: Option<Quality>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organic: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub senior: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub puppy: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<SizeFilter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_rating: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zip: Option<String>,
}

impl QueryFilters {
    pub fn is_empty(&self) -> bool {
        self.applied().is_empty()
    }

    /// Name → display value for every filter that is set.
    pub fn applied(&self) -> BTreeMap<String, String> {
        let mut out = BTreeMap::new();
        let mut put = |name: &str, value: Option<String>| {
            if let Some(v) = value {
                out.insert(name.to_string(), v);
            }
        };
        put("availability", self.availability.map(|a| <&str>::from(a).to_string()));
        put("mobile", self.mobile.map(|b| b.to_string()));
        put("quality", self.quality.map(|q| <&str>::from(q).to_string()));
        put("organic", self.organic.map(|b| b.to_string()));
        put("senior", self.senior.map(|b| b.to_string()));
        put("puppy", self.puppy.map(|b| b.to_string()));
        put("size", self.size.map(|s| <&str>::from(s).to_string()));
        put("min_rating", self.min_rating.map(|r| r.to_string()));
        put("city", self.city.clone());
        put("state", self.state.clone());
        put("zip", self.zip.clone());
        out
    }

    /// Drops the rating and organic criteria. Returns whether anything changed.
    pub fn relax(&mut self) -> bool {
        let changed = self.min_rating.is_some() || self.organic.is_some();
        self.min_rating = None;
        self.organic = None;
        changed
    }
}


#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractedEntities {
    pub services: BTreeSet<String>,
    pub products: BTreeSet<String>,
    pub locations: BTreeSet<String>,
    pub filters: QueryFilters,
    pub modifiers: BTreeSet<String>,
}

impl ExtractedEntities {
    pub fn has_searchable(&self) -> bool {
        !self.services.is_empty() || !self.products.is_empty()
    }

    pub fn is_near_me(&self) -> bool {
        self.locations.contains(crate::NEAR_ME)
    }
}


#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Intent {
    pub description: String,
    pub confidence: f64,
    pub category: SearchType,
}


#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserLocation {
    pub lat: f64,
    pub lng: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zip: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
}

impl UserLocation {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self {
            lat,
            lng,
            ..Default::default()
        }
    }

    pub fn point(&self) -> GeoPoint {
        GeoPoint::new(self.lat, self.lng)
    }
}


#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedLocation {
    pub lat: f64,
    pub lng: f64,
    pub radius: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zip: Option<String>,
    pub is_near_me: bool,
    /// Center taken from the user's coordinates rather than a named place, zip or region.
    #[serde(default)]
    pub user_centered: bool,
    pub confidence: f64,
}

impl ResolvedLocation {
    /// Centered on the user, carrying over whatever address fields the user supplied.
    pub fn at_user(user: &UserLocation, radius: f64, confidence: f64) -> Self {
        Self {
            lat: user.lat,
            lng: user.lng,
            radius,
            city: user.city.clone(),
            state: user.state.clone(),
            zip: user.zip.clone(),
            is_near_me: false,
            user_centered: true,
            confidence,
        }
    }

    pub fn at_point(point: GeoPoint, radius: f64, confidence: f64) -> Self {
        Self {
            lat: point.lat,
            lng: point.lng,
            radius,
            city: None,
            state: None,
            zip: None,
            is_near_me: false,
            user_centered: false,
            confidence,
        }
    }

    pub fn center(&self) -> GeoPoint {
        GeoPoint::new(self.lat, self.lng)
    }
}


#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessedQuery {

    pub original_query: String,

    pub normalized_query: String,

    pub search_type: SearchType,

    pub entities: ExtractedEntities,

    pub location: Option<ResolvedLocation>,

    pub filters: QueryFilters,

    pub intent: String,

    pub confidence: f64,
}

impl ProcessedQuery {

    pub fn empty(query: &str) -> Self {
        Self {
            original_query: query.to_string(),
            normalized_query: String::new(),
            search_type: SearchType::default(),
            entities: ExtractedEntities::default(),
            location: None,
            filters: QueryFilters::default(),
            intent: String::new(),
            confidence: 0.0,
        }
    }

    /// First service tag, else first product tag. Used as the cache's service key.
    pub fn primary_type(&self) -> Option<&str> {
        self.entities
            .services
            .iter()
            .next()
            .or_else(|| self.entities.products.iter().next())
            .map(String::as_str)
    }

    pub fn search_tags(&self) -> Vec<String> {
        self.entities
            .services
            .iter()
            .chain(self.entities.products.iter())
            .cloned()
            .collect()
    }
}
