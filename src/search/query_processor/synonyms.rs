use std::collections::HashMap;

use lazy_static::lazy_static;
use serde::Serialize;
use strum::IntoStaticStr;


#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum TermKind {
    Service,
    Product,
    Location,
    Filter,
}


#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CanonicalTerm {
    pub kind: TermKind,
    pub term: &'static str,
}


/// Canonical term ↔ surface variant tables. Built once, never mutated.
pub struct SynonymRegistry {
    tables: Vec<(TermKind, Vec<(&'static str, Vec<&'static str>)>)>,
    index: HashMap<String, CanonicalTerm>,
}

lazy_static! {
    pub static ref SYNONYMS: SynonymRegistry = SynonymRegistry::builtin();
}

impl SynonymRegistry {

    pub fn new(tables: Vec<(TermKind, Vec<(&'static str, Vec<&'static str>)>)>) -> Self {
        let mut index = HashMap::new();
        // Tables are indexed in order and the first claim on a variant wins, so the
        // service table shadows the later ones.
        for (kind, entries) in &tables {
            for (canonical, variants) in entries {
                for surface in std::iter::once(canonical).chain(variants.iter()) {
                    index
                        .entry(surface.to_lowercase())
                        .or_insert(CanonicalTerm { kind: *kind, term: *canonical });
                }
            }
        }
        Self { tables, index }
    }

    fn builtin() -> Self {
        Self::new(vec![
            (TermKind::Service, vec![
                ("groomer", vec!["groomer", "groomers", "grooming", "pet groomer", "dog groomer", "pet salon", "dog salon", "doggie spa"]),
                ("veterinarian", vec!["vet", "vets", "veterinarian", "veterinarians", "animal doctor", "pet doctor", "animal hospital"]),
                ("dog_park", vec!["dog park", "dog parks", "bark park", "off leash park"]),
                ("boarding", vec!["boarding", "kennel", "kennels", "pet hotel", "dog hotel"]),
                ("daycare", vec!["daycare", "doggy daycare", "dog daycare"]),
                ("trainer", vec!["trainer", "trainers", "obedience", "behaviorist"]),
                ("dog_walker", vec!["dog walker", "dog walkers", "walker", "walkers"]),
                ("pet_sitter", vec!["pet sitter", "pet sitters", "sitter", "sitters"]),
            ]),
            (TermKind::Product, vec![
                ("dog_food", vec!["dog food", "kibble", "puppy chow"]),
                ("cat_food", vec!["cat food", "kitty food", "kitten food"]),
                ("treats", vec!["treat", "treats", "snacks", "biscuits", "chews"]),
                ("toys", vec!["toy", "toys", "squeaky"]),
                ("bed", vec!["bed", "beds", "dog bed", "pet bed"]),
                ("leash", vec!["leash", "leashes", "collar", "collars", "harness"]),
                ("supplements", vec!["supplement", "supplements", "vitamins"]),
                ("crate", vec!["crate", "crates", "carrier", "carriers"]),
            ]),
            (TermKind::Location, vec![
                ("indianapolis", vec!["indy", "naptown", "circle city"]),
                ("fort wayne", vec!["ft wayne"]),
                ("west lafayette", vec!["w lafayette"]),
                ("broad ripple", vec!["broad ripple village"]),
            ]),
            (TermKind::Filter, vec![
                ("organic", vec!["natural", "all natural"]),
                ("premium", vec!["luxury", "upscale", "high end"]),
                ("budget", vec!["cheap", "affordable", "inexpensive"]),
                ("mobile", vec!["house call", "house calls"]),
            ]),
        ])
    }


    pub fn lookup(&self, variant: &str) -> Option<CanonicalTerm> {
        self.index.get(variant.trim().to_lowercase().as_str()).copied()
    }


    pub fn find_canonical(&self, variant: &str) -> Option<&'static str> {
        self.lookup(variant).map(|c| c.term)
    }


    pub fn variants(&self, kind: TermKind, canonical: &str) -> Option<&[&'static str]> {
        self.tables
            .iter()
            .filter(|(k, _)| *k == kind)
            .flat_map(|(_, entries)| entries.iter())
            .find(|(c, _)| *c == canonical)
            .map(|(_, v)| v.as_slice())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_canonical_case_insensitive() {
        assert_eq!(SYNONYMS.find_canonical("Vets"), Some("veterinarian"));
        assert_eq!(SYNONYMS.find_canonical("KIBBLE"), Some("dog_food"));
        assert_eq!(SYNONYMS.find_canonical("indy"), Some("indianapolis"));
        assert_eq!(SYNONYMS.find_canonical("groomer"), Some("groomer"));
        assert_eq!(SYNONYMS.find_canonical("spaceship"), None);
    }

    #[test]
    fn test_lookup_reports_kind() {
        assert_eq!(SYNONYMS.lookup("cheap").unwrap().kind, TermKind::Filter);
        assert_eq!(SYNONYMS.lookup("naptown").unwrap().kind, TermKind::Location);
    }

    #[test]
    fn test_service_table_checked_first() {
        let registry = SynonymRegistry::new(vec![
            (TermKind::Service, vec![("grooming_salon", vec!["spa"])]),
            (TermKind::Product, vec![("spa_kit", vec!["spa"])]),
        ]);
        let hit = registry.lookup("spa").unwrap();
        assert_eq!(hit.kind, TermKind::Service);
        assert_eq!(hit.term, "grooming_salon");
    }

    #[test]
    fn test_variants() {
        let variants = SYNONYMS.variants(TermKind::Service, "dog_park").unwrap();
        assert!(variants.contains(&"bark park"));
        assert!(SYNONYMS.variants(TermKind::Product, "dog_park").is_none());
    }
}
