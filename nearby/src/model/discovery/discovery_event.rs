use nearby_core::model::{Coordinates, DiscoveryError, Place, PlaceCategory};

use crate::model::curated::{CuratedChange, CuratedSnapshot, PlaceFilter};

/// everything that can change the discovery state. commands from the user,
/// fixes from the position watch, tagged fetch results and realtime changes
/// all arrive as events.
#[derive(Debug, Clone, PartialEq)]
pub enum DiscoveryEvent {
    /// the controller started, load the radius-less curated snapshot
    Started,
    EnableLive,
    DisableLive,
    /// user asked to reload everything
    Refresh,
    /// periodic curated reload while the realtime channel is down
    RefetchCurated,
    SetCategory(Option<PlaceCategory>),
    PositionFix(Coordinates),
    PositionFailed(DiscoveryError),
    BaseLoaded {
        seq: u64,
        snapshot: CuratedSnapshot,
    },
    NearbyLoaded {
        seq: u64,
        snapshot: CuratedSnapshot,
    },
    CommunityLoaded {
        seq: u64,
        places: Vec<Place>,
    },
    Realtime(CuratedChange),
    SubscriptionOpened,
    SubscriptionFailed(DiscoveryError),
    SubscriptionClosed,
}

/// work the controller performs on behalf of the reducer
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    StartWatch,
    StopWatch,
    /// abort in-flight fetches, their results are stale anyway
    CancelFetches,
    FetchBase {
        seq: u64,
        filter: PlaceFilter,
    },
    FetchNearby {
        seq: u64,
        center: Coordinates,
        radius_km: f64,
        category: Option<PlaceCategory>,
    },
    QueryCommunity {
        seq: u64,
        center: Coordinates,
        radius_meters: f64,
    },
    /// the view changed
    Publish,
}
