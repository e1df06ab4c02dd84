//! Typed, serializable predicate tree handed from the query builder to the store.

use serde::{Deserialize, Serialize};
use strum::{EnumString, IntoStaticStr};

use crate::core::geo::GeoPoint;


#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, IntoStaticStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Field {
    Name,
    Description,
    Kind,
    ServiceType,
    Tags,
    Latitude,
    Longitude,
    City,
    State,
    Zip,
    Rating,
    ReviewCount,
    Price,
    IsActive,
    InStock,
}


#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}


#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Predicate {
    Equals {
        field: Field,
        value: Value,
    },
    /// Case-insensitive substring match.
    Contains {
        field: Field,
        value: String,
    },
    Range {
        field: Field,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max: Option<f64>,
    },
    In {
        field: Field,
        values: Vec<Value>,
    },
    And {
        clauses: Vec<Predicate>,
    },
    Or {
        clauses: Vec<Predicate>,
    },
}

impl Predicate {
    pub fn equals(field: Field, value: impl Into<Value>) -> Self {
        Self::Equals { field, value: value.into() }
    }

    pub fn contains(field: Field, value: impl Into<String>) -> Self {
        Self::Contains { field, value: value.into() }
    }

    pub fn between(field: Field, min: f64, max: f64) -> Self {
        Self::Range { field, min: Some(min), max: Some(max) }
    }

    pub fn at_least(field: Field, min: f64) -> Self {
        Self::Range { field, min: Some(min), max: None }
    }

    /// `Equals` for a single value, `In` otherwise.
    pub fn one_of<V: Into<Value>>(field: Field, values: impl IntoIterator<Item = V>) -> Self {
        let mut values: Vec<Value> = values.into_iter().map(Into::into).collect();
        if values.len() == 1 {
            Self::Equals { field, value: values.remove(0) }
        } else {
            Self::In { field, values }
        }
    }

    /// Conjunction that unwraps a single clause and flattens nested `And`s.
    pub fn all(clauses: Vec<Predicate>) -> Self {
        Self::combine(clauses, true)
    }

    /// Disjunction that unwraps a single clause and flattens nested `Or`s.
    pub fn any(clauses: Vec<Predicate>) -> Self {
        Self::combine(clauses, false)
    }

    fn combine(clauses: Vec<Predicate>, conjunction: bool) -> Self {
        let mut flat = Vec::with_capacity(clauses.len());
        for clause in clauses {
            match clause {
                Self::And { clauses: inner } if conjunction => flat.extend(inner),
                Self::Or { clauses: inner } if !conjunction => flat.extend(inner),
                other => flat.push(other),
            }
        }
        if flat.len() == 1 {
            return flat.remove(0);
        }
        if conjunction {
            Self::And { clauses: flat }
        } else {
            Self::Or { clauses: flat }
        }
    }

    /// Every field referenced anywhere in the tree.
    pub fn fields(&self) -> Vec<Field> {
        let mut out = Vec::new();
        self.collect_fields(&mut out);
        out
    }

    fn collect_fields(&self, out: &mut Vec<Field>) {
        match self {
            Self::Equals { field, .. }
            | Self::Contains { field, .. }
            | Self::Range { field, .. }
            | Self::In { field, .. } => {
                if !out.contains(field) {
                    out.push(*field);
                }
            }
            Self::And { clauses } | Self::Or { clauses } => {
                for clause in clauses {
                    clause.collect_fields(out);
                }
            }
        }
    }
}


#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, IntoStaticStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SortField {
    /// Miles from `StructuredQuery::origin`; ignored when there is no origin.
    Distance,
    Rating,
    ReviewCount,
    Price,
}


#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Asc,
    Desc,
}


#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortKey {
    pub field: SortField,
    pub direction: Direction,
}

impl SortKey {
    pub fn asc(field: SortField) -> Self {
        Self { field, direction: Direction::Asc }
    }

    pub fn desc(field: SortField) -> Self {
        Self { field, direction: Direction::Desc }
    }
}


#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, IntoStaticStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum MatchStrength {
    Exact,
    Fuzzy,
    Broad,
}

impl MatchStrength {
    /// Attempt order for progressive search.
    pub const LADDER: [MatchStrength; 3] = [Self::Exact, Self::Fuzzy, Self::Broad];
}


/// One compiled store request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructuredQuery {
    pub strength: MatchStrength,
    pub predicate: Predicate,
    pub sort: Vec<SortKey>,
    /// Reference point for `SortField::Distance`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<GeoPoint>,
    pub limit: usize,
    pub offset: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_tagged() {
        let p = Predicate::all(vec![
            Predicate::equals(Field::ServiceType, "groomer"),
            Predicate::at_least(Field::Rating, 4.0),
        ]);
        let json = serde_json::to_value(&p).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "op": "and",
                "clauses": [
                    {"op": "equals", "field": "service_type", "value": "groomer"},
                    {"op": "range", "field": "rating", "min": 4.0}
                ]
            })
        );
        let back: Predicate = serde_json::from_value(json).unwrap();
        assert_eq!(back, p);
    }

    #[test]
    fn test_combinators_flatten_and_unwrap() {
        let single = Predicate::any(vec![Predicate::contains(Field::Name, "vet")]);
        assert!(matches!(single, Predicate::Contains { .. }));

        let nested = Predicate::all(vec![
            Predicate::all(vec![
                Predicate::equals(Field::IsActive, true),
                Predicate::equals(Field::State, "IN"),
            ]),
            Predicate::contains(Field::Name, "park"),
        ]);
        match nested {
            Predicate::And { clauses } => assert_eq!(clauses.len(), 3),
            other => panic!("expected And, got {:?}", other),
        }
    }

    #[test]
    fn test_one_of() {
        assert!(matches!(Predicate::one_of(Field::ServiceType, ["vet"]), Predicate::Equals { .. }));
        match Predicate::one_of(Field::ServiceType, ["vet", "groomer"]) {
            Predicate::In { values, .. } => assert_eq!(values.len(), 2),
            other => panic!("expected In, got {:?}", other),
        }
    }

    #[test]
    fn test_fields() {
        let p = Predicate::any(vec![
            Predicate::contains(Field::Name, "a"),
            Predicate::contains(Field::Description, "a"),
            Predicate::contains(Field::Name, "b"),
        ]);
        assert_eq!(p.fields(), vec![Field::Name, Field::Description]);
    }
}
