use std::{fmt::Display, str::FromStr};

use nearby_core::model::PlaceCategory;
use serde::{Deserialize, Serialize};

/// model for the subset of OSM amenity values that are surfaced as places.
/// see <https://wiki.openstreetmap.org/wiki/Key:amenity> for details.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Amenity {
    // food
    Restaurant,
    Cafe,
    FastFood,
    FoodCourt,

    // health
    Hospital,
    Clinic,
    Doctors,
    Pharmacy,

    PlaceOfWorship,
    BusStation,
    Marketplace,

    // emergency services
    Police,
    FireStation,

    Other(String),
}

impl Amenity {
    /// amenity values requested from the community service. anything else is
    /// excluded from the query.
    pub const ALLOW_LIST: [Amenity; 13] = [
        Amenity::Restaurant,
        Amenity::Cafe,
        Amenity::FastFood,
        Amenity::FoodCourt,
        Amenity::Hospital,
        Amenity::Clinic,
        Amenity::Doctors,
        Amenity::Pharmacy,
        Amenity::PlaceOfWorship,
        Amenity::BusStation,
        Amenity::Marketplace,
        Amenity::Police,
        Amenity::FireStation,
    ];

    pub fn category(&self) -> PlaceCategory {
        match self {
            Amenity::Restaurant | Amenity::FastFood | Amenity::FoodCourt => {
                PlaceCategory::Restaurant
            }
            Amenity::Cafe => PlaceCategory::Cafe,
            Amenity::Hospital => PlaceCategory::Hospital,
            Amenity::Clinic | Amenity::Doctors => PlaceCategory::Clinic,
            Amenity::Pharmacy => PlaceCategory::Pharmacy,
            Amenity::PlaceOfWorship => PlaceCategory::Temple,
            Amenity::BusStation => PlaceCategory::Transport,
            Amenity::Marketplace => PlaceCategory::Shop,
            Amenity::Police | Amenity::FireStation => PlaceCategory::Emergency,
            Amenity::Other(_) => PlaceCategory::Place,
        }
    }

    pub fn is_allowed(&self) -> bool {
        !matches!(self, Amenity::Other(_))
    }
}

impl Display for Amenity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Amenity::Restaurant => write!(f, "restaurant"),
            Amenity::Cafe => write!(f, "cafe"),
            Amenity::FastFood => write!(f, "fast_food"),
            Amenity::FoodCourt => write!(f, "food_court"),
            Amenity::Hospital => write!(f, "hospital"),
            Amenity::Clinic => write!(f, "clinic"),
            Amenity::Doctors => write!(f, "doctors"),
            Amenity::Pharmacy => write!(f, "pharmacy"),
            Amenity::PlaceOfWorship => write!(f, "place_of_worship"),
            Amenity::BusStation => write!(f, "bus_station"),
            Amenity::Marketplace => write!(f, "marketplace"),
            Amenity::Police => write!(f, "police"),
            Amenity::FireStation => write!(f, "fire_station"),
            Amenity::Other(tag) => write!(f, "{tag}"),
        }
    }
}

impl FromStr for Amenity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // underscores are dropped to tolerate entries mapped with spaces or without separators
        match s.trim().to_lowercase().replace(['_', ' '], "").as_str() {
            "restaurant" => Ok(Amenity::Restaurant),
            "cafe" => Ok(Amenity::Cafe),
            "fastfood" => Ok(Amenity::FastFood),
            "foodcourt" => Ok(Amenity::FoodCourt),
            "hospital" => Ok(Amenity::Hospital),
            "clinic" => Ok(Amenity::Clinic),
            "doctors" => Ok(Amenity::Doctors),
            "pharmacy" => Ok(Amenity::Pharmacy),
            "placeofworship" => Ok(Amenity::PlaceOfWorship),
            "busstation" => Ok(Amenity::BusStation),
            "marketplace" => Ok(Amenity::Marketplace),
            "police" => Ok(Amenity::Police),
            "firestation" => Ok(Amenity::FireStation),
            _ => Ok(Amenity::Other(s.trim().to_string())),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_allow_list_round_trips() {
        for amenity in Amenity::ALLOW_LIST {
            assert!(amenity.is_allowed());
            assert_eq!(Amenity::from_str(&amenity.to_string()), Ok(amenity.clone()));
            assert_ne!(amenity.category(), PlaceCategory::Place);
        }
    }

    #[test]
    fn test_unlisted_amenity() {
        let bench = Amenity::from_str("bench").unwrap();
        assert_eq!(bench, Amenity::Other(String::from("bench")));
        assert!(!bench.is_allowed());
        assert_eq!(bench.category(), PlaceCategory::Place);
    }
}
