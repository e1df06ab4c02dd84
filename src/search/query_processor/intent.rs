use super::models::{ExtractedEntities, Intent, SearchType};
use crate::utils::title_case;


/// Picks a search category from the extracted entities and scores how sure we are.
#[derive(Debug, Default, Clone)]
pub struct IntentClassifier;

impl IntentClassifier {
    pub fn new() -> Self {
        Self
    }

    pub fn classify(&self, entities: &ExtractedEntities, query: &str) -> Intent {
        let has_services = !entities.services.is_empty();
        let has_products = !entities.products.is_empty();
        let has_locations = !entities.locations.is_empty();

        let (category, category_boost) = match (has_services, has_products) {
            (true, false) => (SearchType::Service, 0.3),
            (false, true) => (SearchType::Product, 0.3),
            (true, true) => (SearchType::Mixed, 0.2),
            (false, false) if has_locations => (SearchType::Location, 0.2),
            // Nothing recognised: fall back to a plain service search, unboosted.
            (false, false) => (SearchType::Service, 0.0),
        };

        let mut confidence: f64 = 0.5 + category_boost;
        for present in [has_services, has_products, has_locations] {
            if present {
                confidence += 0.1;
            }
        }

        Intent {
            description: describe(category, entities, query),
            confidence: confidence.clamp(0.0, 1.0),
            category,
        }
    }
}


fn describe(category: SearchType, entities: &ExtractedEntities, query: &str) -> String {
    let join = |set: &std::collections::BTreeSet<String>| {
        set.iter()
            .map(|s| s.replace('_', " "))
            .collect::<Vec<_>>()
            .join(", ")
    };

    let mut description = match category {
        SearchType::Service if !entities.services.is_empty() => {
            format!("Looking for {} services", join(&entities.services))
        }
        SearchType::Product => format!("Shopping for {}", join(&entities.products)),
        SearchType::Mixed => format!(
            "Looking for {} services and {} products",
            join(&entities.services),
            join(&entities.products)
        ),
        SearchType::Location => "Browsing everything".to_string(),
        SearchType::Service => {
            if query.trim().is_empty() {
                "General search".to_string()
            } else {
                format!("General search for \"{}\"", query.trim())
            }
        }
    };

    if entities.is_near_me() {
        description.push_str(" near you");
    } else {
        let places: Vec<String> = entities
            .locations
            .iter()
            .map(|l| title_case(l))
            .collect();
        if !places.is_empty() {
            description.push_str(" in ");
            description.push_str(&places.join(", "));
        }
    }

    description
}
