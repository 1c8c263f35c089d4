use std::collections::HashMap;
use std::str::FromStr;

use nearby_core::model::PlaceCategory;

use super::{Amenity, Tourism};

/// the tag family that classifies an OSM feature. a feature may carry several
/// families; [`OsmTagFamily::from_tags`] picks the first one in precedence order
/// historic, tourism, amenity, shop, railway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OsmTagFamily {
    Historic(String),
    Tourism(Tourism),
    Amenity(Amenity),
    Shop(String),
    Railway {
        railway: String,
        station: Option<String>,
    },
}

/// railway values requested from the community service
pub const RAILWAY_VALUES: [&str; 3] = ["station", "halt", "subway_entrance"];

impl OsmTagFamily {
    pub fn from_tags(tags: &HashMap<String, String>) -> Option<OsmTagFamily> {
        if let Some(historic) = non_empty(tags, "historic") {
            return Some(OsmTagFamily::Historic(historic.to_string()));
        }
        if let Some(tourism) = non_empty(tags, "tourism") {
            let tourism = Tourism::from_str(tourism).ok()?;
            return Some(OsmTagFamily::Tourism(tourism));
        }
        if let Some(amenity) = non_empty(tags, "amenity") {
            let amenity = Amenity::from_str(amenity).ok()?;
            if amenity.is_allowed() {
                return Some(OsmTagFamily::Amenity(amenity));
            }
        }
        if let Some(shop) = non_empty(tags, "shop") {
            return Some(OsmTagFamily::Shop(shop.to_string()));
        }
        if let Some(railway) = non_empty(tags, "railway") {
            if RAILWAY_VALUES.contains(&railway) {
                return Some(OsmTagFamily::Railway {
                    railway: railway.to_string(),
                    station: non_empty(tags, "station").map(String::from),
                });
            }
        }
        None
    }

    pub fn category(&self) -> PlaceCategory {
        match self {
            OsmTagFamily::Historic(_) => PlaceCategory::Historic,
            OsmTagFamily::Tourism(tourism) => tourism.category(),
            OsmTagFamily::Amenity(amenity) => amenity.category(),
            OsmTagFamily::Shop(_) => PlaceCategory::Shop,
            OsmTagFamily::Railway { railway, station } => {
                let is_metro = railway == "subway_entrance"
                    || matches!(station.as_deref(), Some("subway") | Some("light_rail"));
                if is_metro {
                    PlaceCategory::Metro
                } else {
                    PlaceCategory::Railway
                }
            }
        }
    }
}

fn non_empty<'a>(tags: &'a HashMap<String, String>, key: &str) -> Option<&'a str> {
    tags.get(key)
        .map(|v| v.trim())
        .filter(|v| !v.is_empty() && *v != "no")
}

#[cfg(test)]
mod test {
    use super::*;

    fn tags(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_historic_takes_precedence() {
        let t = tags(&[("tourism", "attraction"), ("historic", "fort")]);
        let family = OsmTagFamily::from_tags(&t).unwrap();
        assert_eq!(family, OsmTagFamily::Historic(String::from("fort")));
        assert!(family.category().is_hidden_gem());
    }

    #[test]
    fn test_viewpoint_is_hidden_gem() {
        let t = tags(&[("tourism", "viewpoint")]);
        let category = OsmTagFamily::from_tags(&t).unwrap().category();
        assert_eq!(category, PlaceCategory::Viewpoint);
        assert!(category.is_hidden_gem());
    }

    #[test]
    fn test_unlisted_amenity_falls_through_to_shop() {
        let t = tags(&[("amenity", "atm"), ("shop", "bakery")]);
        let family = OsmTagFamily::from_tags(&t).unwrap();
        assert_eq!(family.category(), PlaceCategory::Shop);
    }

    #[test]
    fn test_place_of_worship_is_temple() {
        let t = tags(&[("amenity", "place_of_worship"), ("religion", "hindu")]);
        let family = OsmTagFamily::from_tags(&t).unwrap();
        assert_eq!(family.category(), PlaceCategory::Temple);
    }

    #[test]
    fn test_railway_stations() {
        let metro = tags(&[("railway", "station"), ("station", "subway")]);
        assert_eq!(
            OsmTagFamily::from_tags(&metro).unwrap().category(),
            PlaceCategory::Metro
        );
        let entrance = tags(&[("railway", "subway_entrance")]);
        assert_eq!(
            OsmTagFamily::from_tags(&entrance).unwrap().category(),
            PlaceCategory::Metro
        );
        let halt = tags(&[("railway", "halt")]);
        assert_eq!(
            OsmTagFamily::from_tags(&halt).unwrap().category(),
            PlaceCategory::Railway
        );
        let track = tags(&[("railway", "rail")]);
        assert!(OsmTagFamily::from_tags(&track).is_none());
    }

    #[test]
    fn test_unrecognized_feature() {
        let t = tags(&[("highway", "bus_stop"), ("name", "Majestic")]);
        assert!(OsmTagFamily::from_tags(&t).is_none());
    }
}
