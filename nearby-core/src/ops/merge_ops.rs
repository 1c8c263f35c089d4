use std::collections::HashSet;

use crate::model::Place;

/// combines the curated and community snapshots into one deduplicated list.
///
/// curated places are visited first, so on a name collision the curated record
/// is kept and the community record is discarded. within each source the
/// original relative order is preserved. places without a name or valid
/// coordinates never make it into the result.
///
/// # Arguments
///
/// * `curated` - current curated snapshot
/// * `community` - current community snapshot
///
/// # Returns
///
/// * at most one place per normalized (trimmed, lowercase) name
pub fn merge(curated: &[Place], community: &[Place]) -> Vec<Place> {
    let mut seen: HashSet<String> = HashSet::with_capacity(curated.len() + community.len());
    let mut result: Vec<Place> = Vec::with_capacity(curated.len() + community.len());

    for place in curated.iter().chain(community.iter()) {
        if !place.is_mergeable() {
            log::debug!(
                "skipping {} place '{}' ({}) without a usable name or position",
                place.source,
                place.name,
                place.id
            );
            continue;
        }
        if seen.insert(place.normalized_name()) {
            result.push(place.clone());
        }
    }

    result
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::model::{Coordinates, PlaceCategory, PlaceSource};

    fn curated(id: &str, name: &str, rating: f32) -> Place {
        Place::new(
            id,
            name,
            PlaceCategory::Temple,
            Coordinates::new(12.97, 77.59),
            PlaceSource::Curated,
        )
        .with_rating(rating)
    }

    fn community(id: &str, name: &str) -> Place {
        Place::new(
            id,
            name,
            PlaceCategory::Place,
            Coordinates::new(12.98, 77.60),
            PlaceSource::Community,
        )
    }

    #[test]
    fn test_curated_wins_on_collision() {
        let curated_snapshot = vec![curated("a", "A", 4.0), curated("b", "B", 3.0)];
        let community_snapshot = vec![community("osm/node/1", " b "), community("osm/node/2", "C")];

        let merged = merge(&curated_snapshot, &community_snapshot);

        let ids: Vec<&str> = merged.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "osm/node/2"]);
        assert_eq!(merged[1].source, PlaceSource::Curated);
        assert_eq!(merged[1].rating, Some(3.0));
    }

    #[test]
    fn test_one_place_per_name_within_a_source() {
        let community_snapshot = vec![
            community("osm/node/1", "Chai Point"),
            community("osm/node/2", "CHAI POINT"),
            community("osm/node/3", "Filter Coffee"),
        ];
        let merged = merge(&[], &community_snapshot);
        let ids: Vec<&str> = merged.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["osm/node/1", "osm/node/3"]);
    }

    #[test]
    fn test_merge_is_idempotent() {
        let curated_snapshot = vec![curated("a", "A", 4.0), curated("b", "B", 3.0)];
        let community_snapshot = vec![community("osm/node/1", "b"), community("osm/node/2", "C")];
        let first = merge(&curated_snapshot, &community_snapshot);
        let second = merge(&curated_snapshot, &community_snapshot);
        assert_eq!(first, second);
        // merging the merged list again changes nothing either
        assert_eq!(merge(&first, &[]), first);
    }

    #[test]
    fn test_empty_community_yields_curated_only() {
        let curated_snapshot = vec![curated("a", "A", 4.0), curated("b", "B", 3.0)];
        assert_eq!(merge(&curated_snapshot, &[]), curated_snapshot);
    }

    #[test]
    fn test_unmergeable_places_are_dropped() {
        let mut no_position = curated("x", "Nowhere", 2.0);
        no_position.coordinates = Coordinates::new(f64::NAN, 0.0);
        let nameless = community("osm/node/9", "  ");
        let merged = merge(&[no_position], &[nameless, community("osm/node/2", "Nowhere")]);
        // the community place survives since the curated twin was never admitted
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].id, "osm/node/2");
    }
}
