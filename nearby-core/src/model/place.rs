use serde::{Deserialize, Serialize};

use super::{Coordinates, PlaceCategory, PlaceSource};

/// a point of interest normalized from any source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    /// unique within `source`
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub category: PlaceCategory,
    pub coordinates: Coordinates,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    /// aggregate rating in [0, 5], if the source has one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f32>,
    #[serde(default)]
    pub verified: bool,
    pub source: PlaceSource,
    /// set by the distance ranker, absent until a user position exists
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance_from_user_km: Option<f64>,
}

impl Place {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        category: PlaceCategory,
        coordinates: Coordinates,
        source: PlaceSource,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: None,
            category,
            coordinates,
            address: None,
            rating: None,
            verified: false,
            source,
            distance_from_user_km: None,
        }
    }

    pub fn with_rating(mut self, rating: f32) -> Self {
        self.rating = Some(rating.clamp(0.0, 5.0));
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// the deduplication key of this place
    pub fn normalized_name(&self) -> String {
        normalize_name(&self.name)
    }

    pub fn is_hidden_gem(&self) -> bool {
        self.category.is_hidden_gem()
    }

    /// a place can only be merged when it has a name and a valid position
    pub fn is_mergeable(&self) -> bool {
        !self.name.trim().is_empty() && self.coordinates.is_valid()
    }
}

/// case-insensitive, whitespace-trimmed name used to detect duplicates across sources.
pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_normalized_name() {
        let p = Place::new(
            "1",
            "  Meenakshi Amman TEMPLE ",
            PlaceCategory::Temple,
            Coordinates::new(9.9195, 78.1193),
            PlaceSource::Curated,
        );
        assert_eq!(p.normalized_name(), "meenakshi amman temple");
    }

    #[test]
    fn test_rating_is_clamped() {
        let p = Place::new(
            "1",
            "a",
            PlaceCategory::Cafe,
            Coordinates::new(0.0, 0.0),
            PlaceSource::Community,
        )
        .with_rating(7.5);
        assert_eq!(p.rating, Some(5.0));
    }

    #[test]
    fn test_mergeable() {
        let valid = Place::new(
            "1",
            "Fort",
            PlaceCategory::Historic,
            Coordinates::new(12.0, 77.0),
            PlaceSource::Community,
        );
        assert!(valid.is_mergeable());
        assert!(valid.is_hidden_gem());

        let mut blank = valid.clone();
        blank.name = "   ".to_string();
        assert!(!blank.is_mergeable());

        let mut off_planet = valid;
        off_planet.coordinates = Coordinates::new(120.0, 77.0);
        assert!(!off_planet.is_mergeable());
    }
}
