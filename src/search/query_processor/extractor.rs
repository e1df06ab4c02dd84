use std::collections::BTreeSet;

use tracing::debug;

use super::models::{ExtractedEntities, QueryFilters, Quality};
use super::patterns::{
    FilterEffect, TypePattern, FILTER_PATTERNS, MIN_RATING_PATTERN, MODIFIERS, NEAR_ME_PHRASES,
    PRODUCT_PATTERNS, SERVICE_PATTERNS, ZIP_PATTERN,
};
use super::synonyms::{SynonymRegistry, TermKind, SYNONYMS};
use crate::search::location::gazetteer::{places_in, regions_in};

/// Longest phrase looked up in the synonym registry, in words.
const MAX_PHRASE_WORDS: usize = 3;


/// Keyword, regex and gazetteer based entity extraction over a normalized query.
pub struct EntityExtractor {
    registry: &'static SynonymRegistry,
}

impl Default for EntityExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityExtractor {
    pub fn new() -> Self {
        Self { registry: &SYNONYMS }
    }


    pub fn extract(&self, normalized: &str) -> ExtractedEntities {
        let mut entities = ExtractedEntities::default();
        if normalized.trim().is_empty() {
            return entities;
        }

        entities.services = match_types(&SERVICE_PATTERNS, normalized);
        entities.products = match_types(&PRODUCT_PATTERNS, normalized);
        entities.locations = self.extract_locations(normalized);
        entities.filters = extract_filters(normalized);
        entities.modifiers = extract_modifiers(normalized);

        self.merge_synonyms(normalized, &mut entities);

        debug!(
            "Extracted services={:?} products={:?} locations={:?} modifiers={:?}",
            entities.services, entities.products, entities.locations, entities.modifiers
        );
        entities
    }

    fn extract_locations(&self, normalized: &str) -> BTreeSet<String> {
        let mut locations = BTreeSet::new();
        let padded = format!(" {} ", normalized);

        for place in places_in(normalized) {
            locations.insert(place.key.to_string());
        }

        if NEAR_ME_PHRASES
            .iter()
            .any(|phrase| padded.contains(&format!(" {} ", phrase)))
        {
            locations.insert(crate::NEAR_ME.to_string());
        }

        if let Some(re) = ZIP_PATTERN.as_ref() {
            for m in re.find_iter(normalized) {
                locations.insert(m.as_str().to_string());
            }
        }

        for region in regions_in(normalized) {
            locations.insert(region.code.to_string());
        }

        locations
    }

    /// Looks up phrases longest-first so that "off leash park" claims its words
    /// before "leash" alone can.
    fn merge_synonyms(&self, normalized: &str, entities: &mut ExtractedEntities) {
        let words: Vec<&str> = normalized.split_whitespace().collect();
        let mut consumed = vec![false; words.len()];

        for len in (1..=MAX_PHRASE_WORDS.min(words.len())).rev() {
            for start in 0..=(words.len() - len) {
                if consumed[start..start + len].iter().any(|&c| c) {
                    continue;
                }
                let phrase = words[start..start + len].join(" ");
                let Some(hit) = self.registry.lookup(&phrase) else { continue };

                consumed[start..start + len].iter_mut().for_each(|c| *c = true);
                let term = hit.term.to_string();
                match hit.kind {
                    TermKind::Service => {
                        if !is_excluded(&SERVICE_PATTERNS, hit.term, normalized) {
                            entities.services.insert(term);
                        }
                    }
                    TermKind::Product => {
                        if !is_excluded(&PRODUCT_PATTERNS, hit.term, normalized) {
                            entities.products.insert(term);
                        }
                    }
                    TermKind::Location => {
                        entities.locations.insert(term);
                    }
                    TermKind::Filter => apply_filter_synonym(hit.term, &mut entities.filters),
                }
            }
        }
    }
}


fn match_types(table: &[TypePattern], normalized: &str) -> BTreeSet<String> {
    table
        .iter()
        .filter(|tp| tp.matches(normalized))
        .map(|tp| tp.tag.to_string())
        .collect()
}


/// A tag's exclusions veto it regardless of which pass found it.
fn is_excluded(table: &[TypePattern], tag: &str, normalized: &str) -> bool {
    table
        .iter()
        .filter(|tp| tp.tag == tag)
        .any(|tp| tp.excludes.iter().any(|re| re.is_match(normalized)))
}


fn extract_filters(normalized: &str) -> QueryFilters {
    let mut filters = QueryFilters::default();

    for (effect, re) in FILTER_PATTERNS.iter() {
        if !re.is_match(normalized) {
            continue;
        }
        match *effect {
            FilterEffect::Availability(a) => filters.availability = Some(a),
            FilterEffect::Mobile => filters.mobile = Some(true),
            FilterEffect::Quality(q) => filters.quality = Some(q),
            FilterEffect::Organic => filters.organic = Some(true),
            FilterEffect::Senior => filters.senior = Some(true),
            FilterEffect::Puppy => filters.puppy = Some(true),
            FilterEffect::Size(s) => filters.size = Some(s),
        }
    }

    if let Some(re) = MIN_RATING_PATTERN.as_ref() {
        filters.min_rating = re
            .captures(normalized)
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().parse().ok());
    }

    filters
}

/// Registry filter hits only fill gaps the pattern pass left.
fn apply_filter_synonym(term: &str, filters: &mut QueryFilters) {
    match term {
        "organic" => {
            filters.organic.get_or_insert(true);
        }
        "mobile" => {
            filters.mobile.get_or_insert(true);
        }
        "premium" => {
            filters.quality.get_or_insert(Quality::Premium);
        }
        "budget" => {
            filters.quality.get_or_insert(Quality::Budget);
        }
        _ => {}
    }
}


fn extract_modifiers(normalized: &str) -> BTreeSet<String> {
    normalized
        .split_whitespace()
        .filter(|w| MODIFIERS.contains(w))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::query_processor::models::{Availability, SizeFilter};
    use crate::search::query_processor::normalizer::normalize;

    fn extract(raw: &str) -> ExtractedEntities {
        EntityExtractor::new().extract(&normalize(raw))
    }

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_groomers_in_indianapolis() {
        let e = extract("Groomers in Indianapolis");
        assert_eq!(e.services, set(&["groomer"]));
        assert!(e.products.is_empty());
        assert_eq!(e.locations, set(&["indianapolis"]));
    }

    #[test]
    fn test_dog_parks_near_me() {
        let e = extract("dog parks near me");
        assert_eq!(e.services, set(&["dog_park"]));
        assert_eq!(e.locations, set(&["near_me"]));
    }

    #[test]
    fn test_emergency_wins_over_24_7() {
        let e = extract("emergency vet 24/7");
        assert_eq!(e.services, set(&["veterinarian"]));
        assert_eq!(e.filters.availability, Some(Availability::Emergency));

        let e = extract("vet open 24 hours");
        assert_eq!(e.filters.availability, Some(Availability::AroundTheClock));
    }

    #[test]
    fn test_zip_and_region_tokens() {
        let e = extract("46220");
        assert_eq!(e.locations, set(&["46220"]));

        let e = extract("boarding anywhere in Indiana");
        assert_eq!(e.services, set(&["boarding"]));
        assert_eq!(e.locations, set(&["IN"]));
    }

    #[test]
    fn test_synonym_locations() {
        let e = extract("vets in indy");
        assert_eq!(e.locations, set(&["indianapolis"]));
    }

    #[test]
    fn test_off_leash_park_is_not_a_product() {
        let e = extract("off leash park in carmel");
        assert_eq!(e.services, set(&["dog_park"]));
        assert!(e.products.is_empty(), "{:?}", e.products);
    }

    #[test]
    fn test_exclusions_veto_synonym_hits() {
        let e = extract("grooming supplies");
        assert_eq!(e.products, set(&["grooming_supplies"]));
        assert!(e.services.is_empty(), "{:?}", e.services);

        let e = extract("off leash area");
        assert_eq!(e.services, set(&["dog_park"]));
        assert!(e.products.is_empty(), "{:?}", e.products);

        let e = extract("toy breeds groomer");
        assert_eq!(e.services, set(&["groomer"]));
        assert!(e.products.is_empty(), "{:?}", e.products);
        assert_eq!(e.filters.size, Some(SizeFilter::Small));
    }

    #[test]
    fn test_filters() {
        let e = extract("cheap organic dog food for senior large dogs 4+ stars");
        assert_eq!(e.products, set(&["dog_food"]));
        assert_eq!(e.filters.quality, Some(Quality::Budget));
        assert_eq!(e.filters.organic, Some(true));
        assert_eq!(e.filters.senior, Some(true));
        assert_eq!(e.filters.size, Some(SizeFilter::Large));
        assert_eq!(e.filters.min_rating, Some(4));
        assert!(e.filters.mobile.is_none());
    }

    #[test]
    fn test_mobile_groomer() {
        let e = extract("mobile groomer that comes to my home");
        assert_eq!(e.services, set(&["groomer"]));
        assert_eq!(e.filters.mobile, Some(true));
    }

    #[test]
    fn test_mixed_query() {
        let e = extract("puppy training and treats");
        assert_eq!(e.services, set(&["trainer"]));
        assert_eq!(e.products, set(&["treats"]));
        assert_eq!(e.filters.puppy, Some(true));
    }

    #[test]
    fn test_modifiers_deduplicated() {
        let e = extract("best best friendly groomer, friendly!");
        assert_eq!(e.modifiers, set(&["best", "friendly"]));
    }

    #[test]
    fn test_empty_and_junk_input() {
        assert_eq!(extract(""), ExtractedEntities::default());
        let e = extract("!!! ??? ...");
        assert!(e.services.is_empty() && e.products.is_empty() && e.locations.is_empty());
    }

    #[test]
    fn test_no_duplicates_across_patterns_and_synonyms() {
        let e = extract("vet vets veterinarian animal hospital");
        assert_eq!(e.services, set(&["veterinarian"]));
    }
}
