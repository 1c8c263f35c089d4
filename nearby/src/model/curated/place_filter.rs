use nearby_core::model::{Place, PlaceCategory};
use serde::{Deserialize, Serialize};

/// optional filters for a curated read
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaceFilter {
    pub category: Option<PlaceCategory>,
    pub verified: Option<bool>,
    pub min_rating: Option<f32>,
    pub limit: Option<usize>,
}

impl PlaceFilter {
    pub fn with_category(category: Option<PlaceCategory>) -> Self {
        Self {
            category,
            ..Default::default()
        }
    }
}

/// everything a backend needs to answer a curated read. backends may push any
/// part of it to the server, the store re-applies it client-side regardless.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlaceQuery {
    pub filter: PlaceFilter,
    /// case-insensitive substring of name or description
    pub search: Option<String>,
}

impl PlaceQuery {
    pub fn new(filter: PlaceFilter, search: Option<String>) -> Self {
        Self { filter, search }
    }

    /// the filters, search excluded. the limit is applied after sorting, not here.
    pub fn matches(&self, place: &Place) -> bool {
        let f = &self.filter;
        if f.category.is_some_and(|c| c != place.category) {
            return false;
        }
        if f.verified.is_some_and(|v| v != place.verified) {
            return false;
        }
        if let Some(min_rating) = f.min_rating {
            if !place.rating.is_some_and(|r| r >= min_rating) {
                return false;
            }
        }
        match self.search_term() {
            None => true,
            Some(term) => {
                place.name.to_lowercase().contains(&term)
                    || place
                        .description
                        .as_ref()
                        .is_some_and(|d| d.to_lowercase().contains(&term))
            }
        }
    }

    /// lowercase, trimmed search term. blank terms are ignored
    pub fn search_term(&self) -> Option<String> {
        self.search
            .as_deref()
            .map(|t| t.trim().to_lowercase())
            .filter(|t| !t.is_empty())
    }
}
