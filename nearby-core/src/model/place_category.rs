use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};

/// normalized place categories shared by every place source. free-text tags
/// from any source are mapped onto one of these at the source boundary, falling
/// back to [`PlaceCategory::Place`].
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum PlaceCategory {
    // worship and health
    Temple,
    Hospital,
    Clinic,
    Pharmacy,
    Emergency,

    // food and stay
    Restaurant,
    Cafe,
    Hotel,
    Hostel,

    // sightseeing
    Landmark,
    Destination,
    Tourist,
    Museum,
    Viewpoint,
    Historic,
    HiddenSpot,

    Shop,

    // getting around
    Transport,
    Metro,
    Railway,
    BusRoute,

    #[default]
    Place,
}

impl PlaceCategory {
    pub const ALL: [PlaceCategory; 22] = [
        PlaceCategory::Temple,
        PlaceCategory::Hospital,
        PlaceCategory::Clinic,
        PlaceCategory::Pharmacy,
        PlaceCategory::Emergency,
        PlaceCategory::Restaurant,
        PlaceCategory::Cafe,
        PlaceCategory::Hotel,
        PlaceCategory::Hostel,
        PlaceCategory::Landmark,
        PlaceCategory::Destination,
        PlaceCategory::Tourist,
        PlaceCategory::Museum,
        PlaceCategory::Viewpoint,
        PlaceCategory::Historic,
        PlaceCategory::HiddenSpot,
        PlaceCategory::Shop,
        PlaceCategory::Transport,
        PlaceCategory::Metro,
        PlaceCategory::Railway,
        PlaceCategory::BusRoute,
        PlaceCategory::Place,
    ];

    /// off-the-beaten-path categories, surfaced with a hidden gem badge.
    pub fn is_hidden_gem(&self) -> bool {
        matches!(
            self,
            PlaceCategory::HiddenSpot | PlaceCategory::Viewpoint | PlaceCategory::Historic
        )
    }

    /// the backend's string representation of this category.
    pub fn as_str(&self) -> &'static str {
        match self {
            PlaceCategory::Temple => "temple",
            PlaceCategory::Hospital => "hospital",
            PlaceCategory::Clinic => "clinic",
            PlaceCategory::Pharmacy => "pharmacy",
            PlaceCategory::Emergency => "emergency",
            PlaceCategory::Restaurant => "restaurant",
            PlaceCategory::Cafe => "cafe",
            PlaceCategory::Hotel => "hotel",
            PlaceCategory::Hostel => "hostel",
            PlaceCategory::Landmark => "landmark",
            PlaceCategory::Destination => "destination",
            PlaceCategory::Tourist => "tourist",
            PlaceCategory::Museum => "museum",
            PlaceCategory::Viewpoint => "viewpoint",
            PlaceCategory::Historic => "historic",
            PlaceCategory::HiddenSpot => "hidden_spot",
            PlaceCategory::Shop => "shop",
            PlaceCategory::Transport => "transport",
            PlaceCategory::Metro => "metro",
            PlaceCategory::Railway => "railway",
            PlaceCategory::BusRoute => "bus_route",
            PlaceCategory::Place => "place",
        }
    }
}

impl Display for PlaceCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PlaceCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // separators are dropped so "hidden spot", "hidden-spot" and "hidden_spot" agree
        let key = s
            .trim()
            .to_lowercase()
            .replace(['_', '-', ' '], "");
        match key.as_str() {
            "temple" | "placeofworship" | "worship" => Ok(PlaceCategory::Temple),
            "hospital" => Ok(PlaceCategory::Hospital),
            "clinic" | "healthcentre" | "healthcenter" => Ok(PlaceCategory::Clinic),
            "pharmacy" => Ok(PlaceCategory::Pharmacy),
            "emergency" => Ok(PlaceCategory::Emergency),
            "restaurant" | "streetfood" => Ok(PlaceCategory::Restaurant),
            "cafe" => Ok(PlaceCategory::Cafe),
            "hotel" => Ok(PlaceCategory::Hotel),
            "hostel" => Ok(PlaceCategory::Hostel),
            "landmark" => Ok(PlaceCategory::Landmark),
            "destination" => Ok(PlaceCategory::Destination),
            "tourist" | "attraction" => Ok(PlaceCategory::Tourist),
            "museum" => Ok(PlaceCategory::Museum),
            "viewpoint" => Ok(PlaceCategory::Viewpoint),
            "historic" => Ok(PlaceCategory::Historic),
            "hiddenspot" | "hiddengem" => Ok(PlaceCategory::HiddenSpot),
            "shop" => Ok(PlaceCategory::Shop),
            "transport" => Ok(PlaceCategory::Transport),
            "metro" => Ok(PlaceCategory::Metro),
            "railway" => Ok(PlaceCategory::Railway),
            "busroute" => Ok(PlaceCategory::BusRoute),
            "place" => Ok(PlaceCategory::Place),
            _ => Err(format!("unknown place category '{s}'")),
        }
    }
}
