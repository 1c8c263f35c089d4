use itertools::Itertools;
use nearby_core::model::Coordinates;

use crate::model::feature::{Amenity, RAILWAY_VALUES};

/// a single bounded-radius Overpass QL query over the recognized feature kinds:
/// historic sites, tourism spots, allow-listed amenities, shops and rail/metro stations.
#[derive(Debug, Clone)]
pub struct OverpassQuery {
    pub center: Coordinates,
    pub radius_meters: f64,
    pub timeout_secs: u64,
    pub result_limit: usize,
}

impl OverpassQuery {
    pub fn new(
        center: Coordinates,
        radius_meters: f64,
        timeout_secs: u64,
        result_limit: usize,
    ) -> Self {
        Self {
            center,
            radius_meters,
            timeout_secs,
            result_limit,
        }
    }

    fn selectors() -> Vec<String> {
        let amenities = Amenity::ALLOW_LIST.iter().join("|");
        let railways = RAILWAY_VALUES.iter().join("|");
        vec![
            String::from(r#"["historic"]"#),
            String::from(r#"["tourism"]"#),
            format!(r#"["amenity"~"^({amenities})$"]"#),
            String::from(r#"["shop"]"#),
            format!(r#"["railway"~"^({railways})$"]"#),
        ]
    }
}

impl std::fmt::Display for OverpassQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let around = format!(
            "(around:{:.0},{:.6},{:.6})",
            self.radius_meters, self.center.latitude, self.center.longitude
        );
        let statements = Self::selectors()
            .into_iter()
            .map(|selector| format!("  nwr{selector}[\"name\"]{around};"))
            .join("\n");
        write!(
            f,
            "[out:json][timeout:{}];\n(\n{statements}\n);\nout center tags {};",
            self.timeout_secs, self.result_limit
        )
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_query_text() {
        let query = OverpassQuery::new(Coordinates::new(12.9716, 77.5946), 1500.0, 25, 60);
        let ql = query.to_string();
        assert!(ql.starts_with("[out:json][timeout:25];"));
        assert!(ql.ends_with("out center tags 60;"));
        assert!(ql.contains("(around:1500,12.971600,77.594600)"));
        assert!(ql.contains(r#"nwr["amenity"~"^(restaurant|cafe|fast_food|food_court|hospital|clinic|doctors|pharmacy|place_of_worship|bus_station|marketplace|police|fire_station)$"]"#));
        assert!(ql.contains(r#"nwr["railway"~"^(station|halt|subway_entrance)$"]"#));
        assert!(ql.contains(r#"nwr["historic"]["name"]"#));
        assert_eq!(ql.matches("(around:").count(), 5);
    }
}
