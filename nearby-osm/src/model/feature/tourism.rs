use std::{fmt::Display, str::FromStr};

use nearby_core::model::PlaceCategory;
use serde::{Deserialize, Serialize};

/// model for OSM tourism values. see <https://wiki.openstreetmap.org/wiki/Key:tourism>.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Tourism {
    Viewpoint,
    Museum,
    Gallery,
    Attraction,
    Artwork,
    ThemePark,
    Zoo,
    Hotel,
    Motel,
    GuestHouse,
    Hostel,
    Information,
    Other(String),
}

impl Tourism {
    pub fn category(&self) -> PlaceCategory {
        match self {
            Tourism::Viewpoint => PlaceCategory::Viewpoint,
            Tourism::Museum | Tourism::Gallery => PlaceCategory::Museum,
            Tourism::Attraction | Tourism::Artwork | Tourism::ThemePark | Tourism::Zoo => {
                PlaceCategory::Tourist
            }
            Tourism::Hotel | Tourism::Motel | Tourism::GuestHouse => PlaceCategory::Hotel,
            Tourism::Hostel => PlaceCategory::Hostel,
            Tourism::Information | Tourism::Other(_) => PlaceCategory::Place,
        }
    }
}

impl Display for Tourism {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Tourism::Viewpoint => write!(f, "viewpoint"),
            Tourism::Museum => write!(f, "museum"),
            Tourism::Gallery => write!(f, "gallery"),
            Tourism::Attraction => write!(f, "attraction"),
            Tourism::Artwork => write!(f, "artwork"),
            Tourism::ThemePark => write!(f, "theme_park"),
            Tourism::Zoo => write!(f, "zoo"),
            Tourism::Hotel => write!(f, "hotel"),
            Tourism::Motel => write!(f, "motel"),
            Tourism::GuestHouse => write!(f, "guest_house"),
            Tourism::Hostel => write!(f, "hostel"),
            Tourism::Information => write!(f, "information"),
            Tourism::Other(tag) => write!(f, "{tag}"),
        }
    }
}

impl FromStr for Tourism {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace(['_', ' '], "").as_str() {
            "viewpoint" => Ok(Tourism::Viewpoint),
            "museum" => Ok(Tourism::Museum),
            "gallery" => Ok(Tourism::Gallery),
            "attraction" => Ok(Tourism::Attraction),
            "artwork" => Ok(Tourism::Artwork),
            "themepark" => Ok(Tourism::ThemePark),
            "zoo" => Ok(Tourism::Zoo),
            "hotel" => Ok(Tourism::Hotel),
            "motel" => Ok(Tourism::Motel),
            "guesthouse" => Ok(Tourism::GuestHouse),
            "hostel" => Ok(Tourism::Hostel),
            "information" => Ok(Tourism::Information),
            _ => Ok(Tourism::Other(s.trim().to_string())),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_from_str_is_lenient() {
        assert_eq!(Tourism::from_str("Theme Park"), Ok(Tourism::ThemePark));
        assert_eq!(Tourism::from_str("guest_house"), Ok(Tourism::GuestHouse));
        assert_eq!(Tourism::ThemePark.to_string(), "theme_park");
    }

    #[test]
    fn test_categories() {
        assert_eq!(Tourism::Viewpoint.category(), PlaceCategory::Viewpoint);
        assert_eq!(Tourism::Gallery.category(), PlaceCategory::Museum);
        assert_eq!(Tourism::Zoo.category(), PlaceCategory::Tourist);
        assert_eq!(Tourism::GuestHouse.category(), PlaceCategory::Hotel);
        assert_eq!(Tourism::Hostel.category(), PlaceCategory::Hostel);
    }

    #[test]
    fn test_unknown_value_is_kept() {
        let camp = Tourism::from_str(" camp_site ").unwrap();
        assert_eq!(camp, Tourism::Other(String::from("camp_site")));
        assert_eq!(camp.to_string(), "camp_site");
        assert_eq!(camp.category(), PlaceCategory::Place);
    }
}
