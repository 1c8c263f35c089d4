use itertools::Itertools;
use nearby_core::model::{Coordinates, Place, PlaceSource};

use super::{CommunityRatingPolicy, OverpassElement};
use crate::model::feature::OsmTagFamily;

/// maps an OSM feature into a community place. features without a name, a valid
/// position or a recognized tag family are dropped.
pub fn element_to_place(
    element: &OverpassElement,
    rating_policy: &CommunityRatingPolicy,
) -> Option<Place> {
    let name = element.tag("name").or_else(|| element.tag("name:en"))?;
    let (lat, lon) = element.position()?;
    let coordinates = Coordinates::try_new(lat, lon)?;
    let family = OsmTagFamily::from_tags(&element.tags)?;

    let mut place = Place::new(
        element.place_id(),
        name,
        family.category(),
        coordinates,
        PlaceSource::Community,
    );
    place.description = element.tag("description").map(String::from);
    place.address = address(element);
    place.rating = rating_policy.rating_for(element.id);
    Some(place)
}

/// maps every element, keeping the order of the response
pub fn elements_to_places(
    elements: &[OverpassElement],
    rating_policy: &CommunityRatingPolicy,
) -> Vec<Place> {
    let places: Vec<Place> = elements
        .iter()
        .filter_map(|e| element_to_place(e, rating_policy))
        .collect();
    let dropped = elements.len() - places.len();
    if dropped > 0 {
        log::debug!(
            "dropped {dropped} of {} Overpass elements without a name, position or recognized tags",
            elements.len()
        );
    }
    places
}

fn address(element: &OverpassElement) -> Option<String> {
    let house = [element.tag("addr:housenumber"), element.tag("addr:street")]
        .into_iter()
        .flatten()
        .join(" ");
    let parts = [
        Some(house.as_str()).filter(|h| !h.is_empty()),
        element.tag("addr:suburb"),
        element.tag("addr:city"),
    ];
    let full = parts.into_iter().flatten().join(", ");
    (!full.is_empty()).then_some(full)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::collection::OverpassResponse;
    use nearby_core::model::PlaceCategory;

    fn response() -> OverpassResponse {
        serde_json::from_value(serde_json::json!({
            "elements": [
                {
                    "type": "node", "id": 101, "lat": 12.9507, "lon": 77.5848,
                    "tags": { "name": "Lalbagh West Gate Viewpoint", "tourism": "viewpoint" }
                },
                {
                    "type": "node", "id": 102, "lat": 12.9600, "lon": 77.5800,
                    "tags": { "amenity": "cafe" }
                },
                {
                    "type": "way", "id": 103, "center": { "lat": 12.9592, "lon": 77.5737 },
                    "tags": {
                        "name": "Tipu Sultan's Summer Palace", "historic": "palace",
                        "tourism": "attraction", "addr:street": "Albert Victor Road",
                        "addr:city": "Bengaluru"
                    }
                },
                {
                    "type": "way", "id": 104,
                    "tags": { "name": "Floating Way", "shop": "books" }
                },
                {
                    "type": "node", "id": 105, "lat": 12.9716, "lon": 77.5946,
                    "tags": { "name": "MTR", "amenity": "restaurant", "cuisine": "south_indian" }
                }
            ]
        }))
        .unwrap()
    }

    #[test]
    fn test_mapping() {
        let policy = CommunityRatingPolicy::default();
        let places = elements_to_places(&response().elements, &policy);
        let ids: Vec<&str> = places.iter().map(|p| p.id.as_str()).collect();
        // 102 has no name, 104 has no position
        assert_eq!(ids, vec!["osm/node/101", "osm/way/103", "osm/node/105"]);

        assert_eq!(places[0].category, PlaceCategory::Viewpoint);
        assert!(places[0].is_hidden_gem());

        assert_eq!(places[1].category, PlaceCategory::Historic);
        assert!(places[1].is_hidden_gem());
        assert_eq!(
            places[1].address.as_deref(),
            Some("Albert Victor Road, Bengaluru")
        );
        assert_eq!(places[1].coordinates, Coordinates::new(12.9592, 77.5737));

        assert_eq!(places[2].category, PlaceCategory::Restaurant);
        assert!(!places[2].is_hidden_gem());

        for p in places.iter() {
            assert_eq!(p.source, PlaceSource::Community);
            assert!(!p.verified);
            assert!(p.rating.is_some());
            assert!(p.distance_from_user_km.is_none());
        }
    }

    #[test]
    fn test_omitted_ratings() {
        let places = elements_to_places(&response().elements, &CommunityRatingPolicy::Omit);
        assert!(places.iter().all(|p| p.rating.is_none()));
    }

    #[test]
    fn test_unrecognized_feature_is_dropped() {
        let element: OverpassElement = serde_json::from_value(serde_json::json!({
            "type": "node", "id": 7, "lat": 1.0, "lon": 2.0,
            "tags": { "name": "Bench", "amenity": "bench" }
        }))
        .unwrap();
        assert!(element_to_place(&element, &CommunityRatingPolicy::Omit).is_none());
    }
}
