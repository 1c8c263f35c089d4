use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// body of an Overpass `[out:json]` response. only the elements are read.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct OverpassResponse {
    #[serde(default)]
    pub elements: Vec<OverpassElement>,
    /// set by Overpass when the query hit a runtime error such as a timeout
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remark: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum OsmElementType {
    #[default]
    Node,
    Way,
    Relation,
}

impl std::fmt::Display for OsmElementType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            OsmElementType::Node => "node",
            OsmElementType::Way => "way",
            OsmElementType::Relation => "relation",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct OverpassCenter {
    pub lat: f64,
    pub lon: f64,
}

/// a tagged OSM feature. nodes carry `lat`/`lon`, ways and relations carry a
/// `center` when queried with `out center`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OverpassElement {
    #[serde(rename = "type", default)]
    pub element_type: OsmElementType,
    pub id: i64,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lon: Option<f64>,
    #[serde(default)]
    pub center: Option<OverpassCenter>,
    #[serde(default)]
    pub tags: HashMap<String, String>,
}

impl OverpassElement {
    /// (lat, lon) of the element, preferring its own position over its center
    pub fn position(&self) -> Option<(f64, f64)> {
        match (self.lat, self.lon, self.center) {
            (Some(lat), Some(lon), _) => Some((lat, lon)),
            (_, _, Some(OverpassCenter { lat, lon })) => Some((lat, lon)),
            _ => None,
        }
    }

    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags
            .get(key)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    /// the id a place built from this element carries
    pub fn place_id(&self) -> String {
        format!("osm/{}/{}", self.element_type, self.id)
    }
}
