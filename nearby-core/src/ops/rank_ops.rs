use crate::{
    model::{Coordinates, Place},
    util::geo_utils::{self, METERS_PER_KILOMETER},
};

/// labels each place with its distance from the user and sorts nearest first.
///
/// without a user position, distances are cleared and the incoming order (for
/// example a rating or search order) is kept as-is. the sort is stable, so
/// equidistant places keep their merge order.
pub fn rank(places: Vec<Place>, user_position: Option<&Coordinates>) -> Vec<Place> {
    let mut places = places;
    match user_position {
        None => {
            for place in places.iter_mut() {
                place.distance_from_user_km = None;
            }
        }
        Some(position) => {
            for place in places.iter_mut() {
                let km = geo_utils::haversine_km(position, &place.coordinates);
                place.distance_from_user_km = Some(km.max(0.0));
            }
            places.sort_by(|a, b| {
                let a = a.distance_from_user_km.unwrap_or(f64::INFINITY);
                let b = b.distance_from_user_km.unwrap_or(f64::INFINITY);
                a.total_cmp(&b)
            });
        }
    }
    places
}

/// human readable distance: meters under one kilometer, otherwise kilometers
/// with one decimal.
pub fn format_distance(km: f64) -> String {
    let meters = (km * METERS_PER_KILOMETER).round();
    if meters < METERS_PER_KILOMETER {
        format!("{} m", meters as i64)
    } else {
        format!("{km:.1} km")
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::model::{PlaceCategory, PlaceSource};

    fn place(id: &str, lat: f64, lon: f64) -> Place {
        Place::new(
            id,
            id,
            PlaceCategory::Place,
            Coordinates::new(lat, lon),
            PlaceSource::Curated,
        )
    }

    #[test]
    fn test_rank_sorts_by_haversine_distance() {
        let user = Coordinates::new(12.9716, 77.5946);
        let places = vec![
            place("far", 13.10, 77.60),
            place("near", 12.972, 77.595),
            place("mid", 13.00, 77.60),
        ];
        let ranked = rank(places, Some(&user));
        let ids: Vec<&str> = ranked.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["near", "mid", "far"]);
        for p in ranked.iter() {
            let expected = geo_utils::haversine_km(&user, &p.coordinates);
            let actual = p.distance_from_user_km.expect("distance should be set");
            assert!(actual >= 0.0);
            assert!((actual - expected).abs() < 1e-9);
        }
        assert!(ranked
            .windows(2)
            .all(|w| w[0].distance_from_user_km <= w[1].distance_from_user_km));
    }

    #[test]
    fn test_rank_without_position_preserves_order() {
        let mut first = place("b", 13.10, 77.60);
        first.distance_from_user_km = Some(3.2);
        let places = vec![first, place("a", 12.972, 77.595)];
        let ranked = rank(places, None);
        let ids: Vec<&str> = ranked.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);
        assert!(ranked.iter().all(|p| p.distance_from_user_km.is_none()));
    }

    #[test]
    fn test_format_distance() {
        assert_eq!(format_distance(0.0), "0 m");
        assert_eq!(format_distance(0.4567), "457 m");
        assert_eq!(format_distance(1.0), "1.0 km");
        // rounds up to a full kilometer
        assert_eq!(format_distance(0.9996), "1.0 km");
        assert_eq!(format_distance(0.9994), "999 m");
        assert_eq!(format_distance(12.345), "12.3 km");
    }
}
