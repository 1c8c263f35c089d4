use std::str::FromStr;

use nearby_core::model::{Coordinates, Place, PlaceCategory, PlaceSource};
use serde::{Deserialize, Serialize};

/// primary key of a curated row, integer or text depending on the table
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RowId {
    Number(i64),
    Text(String),
}

impl std::fmt::Display for RowId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RowId::Number(n) => write!(f, "{n}"),
            RowId::Text(s) => write!(f, "{s}"),
        }
    }
}

/// a row of the curated `places` table as the backend returns it. every
/// column except the id may be missing or null.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CuratedPlaceRow {
    pub id: RowId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, alias = "place_category")]
    pub category: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub rating: Option<f32>,
    #[serde(default)]
    pub verified: Option<bool>,
}

impl CuratedPlaceRow {
    pub fn new(
        id: RowId,
        name: &str,
        category: PlaceCategory,
        coordinates: Coordinates,
        rating: Option<f32>,
    ) -> Self {
        Self {
            id,
            name: Some(name.to_string()),
            description: None,
            category: Some(category.to_string()),
            latitude: Some(coordinates.latitude),
            longitude: Some(coordinates.longitude),
            address: None,
            rating,
            verified: Some(true),
        }
    }

    /// normalize into a curated place. rows without a name or valid position
    /// cannot be shown and yield None.
    pub fn to_place(&self) -> Option<Place> {
        let name = self.name.as_deref().map(str::trim).filter(|n| !n.is_empty());
        let Some(name) = name else {
            log::debug!("dropping curated row {} without a name", self.id);
            return None;
        };
        let coordinates = match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => Coordinates::try_new(lat, lon),
            _ => None,
        };
        let Some(coordinates) = coordinates else {
            log::debug!("dropping curated row {} ('{name}') without a valid position", self.id);
            return None;
        };
        let category = match self.category.as_deref() {
            None => PlaceCategory::Place,
            Some(raw) => PlaceCategory::from_str(raw).unwrap_or_else(|e| {
                log::warn!("curated row {}: {e}, using '{}'", self.id, PlaceCategory::Place);
                PlaceCategory::Place
            }),
        };

        let mut place = Place::new(
            self.id.to_string(),
            name,
            category,
            coordinates,
            PlaceSource::Curated,
        );
        place.description = self.description.clone().filter(|d| !d.trim().is_empty());
        place.address = self.address.clone().filter(|a| !a.trim().is_empty());
        place.rating = self.rating.filter(|r| r.is_finite()).map(|r| r.clamp(0.0, 5.0));
        place.verified = self.verified.unwrap_or(false);
        Some(place)
    }
}
