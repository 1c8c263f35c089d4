use indexmap::IndexMap;
use nearby_core::{
    model::{Coordinates, DiscoveryError, Place, PlaceCategory},
    ops,
    util::geo_utils::{self, METERS_PER_KILOMETER},
};

use super::{DiscoveryEvent, DiscoverySettings, DiscoveryView, Effect, LiveMode, RealtimeStatus};
use crate::model::curated::{sort_by_rating, CuratedChange, CuratedSnapshot, PlaceFilter, PlaceQuery};

/// the discovery state machine. owns both snapshots and the merged, ranked
/// list, and is only changed through [`DiscoveryState::apply`].
///
/// each fetch kind (curated, community) carries a monotonic sequence number.
/// a result is accepted only when it is tagged with the latest number issued
/// for its kind, so the last request always wins regardless of the order in
/// which responses land.
///
/// realtime changes that arrive while a curated fetch is in flight are kept
/// per id and replayed onto that fetch's snapshot when it is accepted, so a
/// response that left the backend before the change cannot undo it.
#[derive(Debug, Clone)]
pub struct DiscoveryState {
    settings: DiscoverySettings,
    mode: LiveMode,
    position: Option<Coordinates>,
    category: Option<PlaceCategory>,
    curated: Vec<Place>,
    community: Vec<Place>,
    curated_seq: u64,
    community_seq: u64,
    curated_pending: bool,
    community_pending: bool,
    pending_changes: IndexMap<String, CuratedChange>,
    last_error: Option<DiscoveryError>,
    realtime: RealtimeStatus,
    places: Vec<Place>,
}

impl DiscoveryState {
    pub fn new(settings: DiscoverySettings) -> Self {
        Self {
            category: settings.category,
            settings,
            mode: LiveMode::Off,
            position: None,
            curated: vec![],
            community: vec![],
            curated_seq: 0,
            community_seq: 0,
            curated_pending: false,
            community_pending: false,
            pending_changes: IndexMap::new(),
            last_error: None,
            realtime: RealtimeStatus::Connecting,
            places: vec![],
        }
    }

    pub fn mode(&self) -> LiveMode {
        self.mode
    }

    pub fn position(&self) -> Option<Coordinates> {
        self.position
    }

    pub fn category(&self) -> Option<PlaceCategory> {
        self.category
    }

    pub fn curated(&self) -> &[Place] {
        &self.curated
    }

    pub fn community(&self) -> &[Place] {
        &self.community
    }

    /// the merged, ranked list
    pub fn places(&self) -> &[Place] {
        &self.places
    }

    pub fn realtime(&self) -> RealtimeStatus {
        self.realtime
    }

    pub fn view(&self) -> DiscoveryView {
        DiscoveryView {
            mode: self.mode,
            position: self.position,
            places: self.places.clone(),
            pending: self.curated_pending || self.community_pending,
            last_error: self.last_error.clone(),
            realtime: self.realtime,
        }
    }

    /// apply one event and return the effects the controller must run.
    pub fn apply(&mut self, event: DiscoveryEvent) -> Vec<Effect> {
        match event {
            DiscoveryEvent::Started => match self.mode {
                LiveMode::Off => vec![self.fetch_base(), Effect::Publish],
                _ => vec![],
            },
            DiscoveryEvent::Refresh => match (self.mode, self.position) {
                (LiveMode::Off, _) => vec![self.fetch_base(), Effect::Publish],
                (LiveMode::Live, Some(center)) => vec![
                    self.fetch_nearby(center),
                    self.query_community(center),
                    Effect::Publish,
                ],
                _ => vec![],
            },
            DiscoveryEvent::RefetchCurated => match (self.mode, self.position) {
                (LiveMode::Off, _) => vec![self.fetch_base(), Effect::Publish],
                (LiveMode::Live, Some(center)) => vec![self.fetch_nearby(center), Effect::Publish],
                _ => vec![],
            },
            DiscoveryEvent::EnableLive => {
                if self.mode != LiveMode::Off {
                    return vec![];
                }
                log::info!("live mode: off -> acquiring");
                self.mode = LiveMode::Acquiring;
                self.last_error = None;
                self.invalidate_fetches();
                vec![Effect::CancelFetches, Effect::StartWatch, Effect::Publish]
            }
            DiscoveryEvent::DisableLive => match self.mode {
                LiveMode::Off => vec![],
                _ => self.go_off(None),
            },
            DiscoveryEvent::SetCategory(category) => self.set_category(category),
            DiscoveryEvent::PositionFix(center) => {
                if self.mode == LiveMode::Off {
                    log::debug!("ignoring position fix {center} while live mode is off");
                    return vec![];
                }
                if self.mode == LiveMode::Acquiring {
                    log::info!("live mode: acquiring -> live at {center}");
                }
                self.mode = LiveMode::Live;
                self.position = Some(center);
                self.recompute();
                vec![
                    self.fetch_nearby(center),
                    self.query_community(center),
                    Effect::Publish,
                ]
            }
            DiscoveryEvent::PositionFailed(error) => match self.mode {
                LiveMode::Off => vec![],
                _ => self.go_off(Some(error)),
            },
            DiscoveryEvent::BaseLoaded { seq, snapshot } => {
                if seq != self.curated_seq || self.mode != LiveMode::Off {
                    log::debug!("discarding stale curated base fetch {seq}");
                    return vec![];
                }
                self.accept_curated(snapshot)
            }
            DiscoveryEvent::NearbyLoaded { seq, snapshot } => {
                if seq != self.curated_seq || self.mode != LiveMode::Live {
                    log::debug!("discarding stale curated nearby fetch {seq}");
                    return vec![];
                }
                self.accept_curated(snapshot)
            }
            DiscoveryEvent::CommunityLoaded { seq, places } => {
                if seq != self.community_seq || self.mode != LiveMode::Live {
                    log::debug!("discarding stale community query {seq}");
                    return vec![];
                }
                self.community_pending = false;
                self.community = places;
                self.recompute();
                vec![Effect::Publish]
            }
            DiscoveryEvent::Realtime(change) => {
                self.patch_curated(&change);
                if self.curated_pending {
                    self.pending_changes.insert(change.id().to_string(), change);
                }
                self.recompute();
                vec![Effect::Publish]
            }
            DiscoveryEvent::SubscriptionOpened => {
                self.realtime = RealtimeStatus::Connected;
                vec![Effect::Publish]
            }
            DiscoveryEvent::SubscriptionFailed(error) => {
                self.realtime = RealtimeStatus::Degraded;
                self.last_error = Some(error);
                vec![Effect::Publish]
            }
            DiscoveryEvent::SubscriptionClosed => {
                self.realtime = RealtimeStatus::Degraded;
                vec![Effect::Publish]
            }
        }
    }

    fn go_off(&mut self, error: Option<DiscoveryError>) -> Vec<Effect> {
        match &error {
            Some(e) => log::warn!("live mode: {} -> off: {e}", self.mode),
            None => log::info!("live mode: {} -> off", self.mode),
        }
        self.mode = LiveMode::Off;
        self.position = None;
        self.community.clear();
        self.invalidate_fetches();
        if error.is_some() {
            self.last_error = error;
        }
        self.recompute();
        vec![Effect::StopWatch, Effect::CancelFetches, Effect::Publish]
    }

    fn set_category(&mut self, category: Option<PlaceCategory>) -> Vec<Effect> {
        if category == self.category {
            return vec![];
        }
        self.category = category;
        if let Some(c) = category {
            self.curated.retain(|p| p.category == c);
        }
        self.recompute();
        let fetch = match (self.mode, self.position) {
            (LiveMode::Off, _) => Some(self.fetch_base()),
            (LiveMode::Live, Some(center)) => Some(self.fetch_nearby(center)),
            _ => None,
        };
        fetch.into_iter().chain([Effect::Publish]).collect()
    }

    fn accept_curated(&mut self, snapshot: CuratedSnapshot) -> Vec<Effect> {
        self.curated_pending = false;
        let changes = std::mem::take(&mut self.pending_changes);
        match snapshot.error {
            // keep showing the stale list, it already carries the changes
            Some(error) => self.last_error = Some(error),
            None => {
                self.curated = snapshot.places;
                for change in changes.values() {
                    log::debug!("replaying realtime change to {} onto fetched snapshot", change.id());
                    self.patch_curated(change);
                }
                if matches!(self.last_error, Some(DiscoveryError::BackendFetchFailed(_))) {
                    self.last_error = None;
                }
            }
        }
        self.recompute();
        vec![Effect::Publish]
    }

    /// upsert or delete one place in the curated snapshot
    fn patch_curated(&mut self, change: &CuratedChange) {
        match change {
            CuratedChange::Insert(place) | CuratedChange::Update(place) => {
                if !self.admits(place) {
                    self.curated.retain(|p| p.id != place.id);
                    return;
                }
                match self.curated.iter_mut().find(|p| p.id == place.id) {
                    Some(existing) => *existing = place.clone(),
                    None => self.curated.push(place.clone()),
                }
                sort_by_rating(&mut self.curated);
            }
            CuratedChange::Delete { id } => {
                self.curated.retain(|p| &p.id != id);
            }
        }
    }

    /// whether a pushed curated place belongs in the current curated snapshot
    fn admits(&self, place: &Place) -> bool {
        match (self.mode, self.position) {
            (LiveMode::Off, _) | (_, None) => {
                PlaceQuery::new(self.base_filter(), None).matches(place)
            }
            (_, Some(center)) => {
                self.category.map_or(true, |c| c == place.category)
                    && geo_utils::within_radius_km(
                        &center,
                        &place.coordinates,
                        self.settings.radius_km,
                    )
            }
        }
    }

    fn base_filter(&self) -> PlaceFilter {
        let base = &self.settings.base_filter;
        PlaceFilter {
            category: self.category.or(base.category),
            ..base.clone()
        }
    }

    fn fetch_base(&mut self) -> Effect {
        self.curated_seq += 1;
        self.curated_pending = true;
        self.pending_changes.clear();
        Effect::FetchBase {
            seq: self.curated_seq,
            filter: self.base_filter(),
        }
    }

    fn fetch_nearby(&mut self, center: Coordinates) -> Effect {
        self.curated_seq += 1;
        self.curated_pending = true;
        self.pending_changes.clear();
        Effect::FetchNearby {
            seq: self.curated_seq,
            center,
            radius_km: self.settings.radius_km,
            category: self.category,
        }
    }

    fn query_community(&mut self, center: Coordinates) -> Effect {
        self.community_seq += 1;
        self.community_pending = true;
        Effect::QueryCommunity {
            seq: self.community_seq,
            center,
            radius_meters: self.settings.radius_km * METERS_PER_KILOMETER,
        }
    }

    /// every result already in flight becomes stale
    fn invalidate_fetches(&mut self) {
        self.curated_seq += 1;
        self.community_seq += 1;
        self.curated_pending = false;
        self.community_pending = false;
        self.pending_changes.clear();
    }

    /// the merged list is recomputed from the snapshots, never patched
    fn recompute(&mut self) {
        let community: Vec<Place> = self
            .community
            .iter()
            .filter(|p| self.category.map_or(true, |c| c == p.category))
            .cloned()
            .collect();
        let merged = ops::merge(&self.curated, &community);
        self.places = ops::rank(merged, self.position.as_ref());
    }
}
