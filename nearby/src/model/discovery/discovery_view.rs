use nearby_core::model::{Coordinates, DiscoveryError, Place};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LiveMode {
    #[default]
    Off,
    /// position watch started, waiting for the first fix
    Acquiring,
    Live,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RealtimeStatus {
    #[default]
    Connecting,
    Connected,
    /// the channel failed or closed, curated data is only refreshed by re-fetching
    Degraded,
}

impl std::fmt::Display for LiveMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            LiveMode::Off => "off",
            LiveMode::Acquiring => "acquiring",
            LiveMode::Live => "live",
        };
        write!(f, "{s}")
    }
}

/// what consumers see: the merged, ranked list plus status.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DiscoveryView {
    pub mode: LiveMode,
    pub position: Option<Coordinates>,
    pub places: Vec<Place>,
    /// a curated or community fetch is in flight
    pub pending: bool,
    pub last_error: Option<DiscoveryError>,
    pub realtime: RealtimeStatus,
}
