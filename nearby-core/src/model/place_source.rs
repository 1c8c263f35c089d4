use serde::{Deserialize, Serialize};

/// where a place came from. curated places take priority during deduplication
/// and are the only places that receive realtime updates.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum PlaceSource {
    Curated,
    Community,
}

impl std::fmt::Display for PlaceSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlaceSource::Curated => write!(f, "curated"),
            PlaceSource::Community => write!(f, "community"),
        }
    }
}
