use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc, Mutex,
};

use nearby_core::{
    model::{Coordinates, DiscoveryError, Place, PlaceCategory},
    util::geo_utils,
};
use tokio::sync::mpsc;

use super::{
    ChannelHandle, CuratedBackend, PlaceFilter, PlaceQuery, RealtimeSubscription,
};

/// result of a curated read. a failed read carries the error and no places,
/// it never fails past the caller.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CuratedSnapshot {
    pub places: Vec<Place>,
    pub error: Option<DiscoveryError>,
}

impl CuratedSnapshot {
    pub fn ok(places: Vec<Place>) -> Self {
        Self {
            places,
            error: None,
        }
    }

    pub fn failed(error: DiscoveryError) -> Self {
        Self {
            places: vec![],
            error: Some(error),
        }
    }
}

/// reads the curated dataset and owns its single realtime channel.
pub struct CuratedPlaceStore {
    backend: Arc<dyn CuratedBackend>,
    // generation of the open channel, subscriptions from older generations go quiet
    generation: Arc<AtomicU64>,
    channel: Mutex<Option<Box<dyn ChannelHandle>>>,
}

impl CuratedPlaceStore {
    pub fn new(backend: Arc<dyn CuratedBackend>) -> Self {
        Self {
            backend,
            generation: Arc::new(AtomicU64::new(0)),
            channel: Mutex::new(None),
        }
    }

    /// one-shot read with optional filters, sorted by rating descending.
    pub async fn fetch_all(&self, filter: &PlaceFilter) -> CuratedSnapshot {
        let query = PlaceQuery::new(filter.clone(), None);
        self.read(&query, "fetch_all").await
    }

    /// places within `radius_km` of `center`. the radius is applied client-side
    /// over the full category-filtered set.
    pub async fn fetch_nearby(
        &self,
        center: Coordinates,
        radius_km: f64,
        category: Option<PlaceCategory>,
    ) -> CuratedSnapshot {
        if !center.is_valid() || !(radius_km.is_finite() && radius_km > 0.0) {
            return CuratedSnapshot::failed(DiscoveryError::InvalidUserInput(format!(
                "cannot fetch places within {radius_km} km of {center}"
            )));
        }
        let query = PlaceQuery::new(PlaceFilter::with_category(category), None);
        let mut snapshot = self.read(&query, "fetch_nearby").await;
        snapshot
            .places
            .retain(|p| geo_utils::within_radius_km(&center, &p.coordinates, radius_km));
        log::debug!(
            "{} curated places within {radius_km} km of {center}",
            snapshot.places.len()
        );
        snapshot
    }

    /// case-insensitive substring search over name and description.
    pub async fn search(&self, term: &str) -> CuratedSnapshot {
        let query = PlaceQuery::new(PlaceFilter::default(), Some(term.to_string()));
        if query.search_term().is_none() {
            return CuratedSnapshot::ok(vec![]);
        }
        self.read(&query, "search").await
    }

    async fn read(&self, query: &PlaceQuery, operation: &str) -> CuratedSnapshot {
        let rows = match self.backend.select_places(query).await {
            Ok(rows) => rows,
            Err(e) => {
                log::error!("curated {operation} failed: {e}");
                return CuratedSnapshot::failed(e);
            }
        };
        let row_count = rows.len();
        let mut places: Vec<Place> = rows
            .iter()
            .filter_map(|row| row.to_place())
            .filter(|place| query.matches(place))
            .collect();
        sort_by_rating(&mut places);
        if let Some(limit) = query.filter.limit {
            places.truncate(limit);
        }
        log::debug!(
            "curated {operation} kept {} of {row_count} rows",
            places.len()
        );
        CuratedSnapshot::ok(places)
    }

    /// open the store's live channel. an already open channel is closed first,
    /// and subscriptions handed out before stop receiving events. a failure is
    /// reported once and not retried.
    pub fn subscribe(&self) -> Result<RealtimeSubscription, DiscoveryError> {
        let mut channel = self.channel.lock().map_err(|e| {
            DiscoveryError::BackendSubscriptionFailed(format!("channel lock poisoned: {e}"))
        })?;
        if let Some(mut previous) = channel.take() {
            log::debug!("closing previous curated realtime channel");
            previous.close();
        }
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        let (sink, receiver) = mpsc::unbounded_channel();
        match self.backend.open_channel(sink) {
            Ok(handle) => {
                *channel = Some(handle);
                log::info!("opened curated realtime channel (generation {generation})");
                Ok(RealtimeSubscription::new(
                    generation,
                    self.generation.clone(),
                    receiver,
                ))
            }
            Err(e) => {
                log::error!("{e}");
                Err(e)
            }
        }
    }

    /// close the live channel. no events are delivered afterwards.
    pub fn unsubscribe(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut channel) = self.channel.lock() {
            if let Some(mut handle) = channel.take() {
                handle.close();
                log::info!("closed curated realtime channel");
            }
        }
    }

    pub fn is_subscribed(&self) -> bool {
        self.channel
            .lock()
            .map(|c| c.is_some())
            .unwrap_or_default()
    }
}

impl Drop for CuratedPlaceStore {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

/// highest rated first, unrated places last. stable for equal ratings.
pub fn sort_by_rating(places: &mut [Place]) {
    places.sort_by(|a, b| {
        let a = a.rating.unwrap_or(f32::NEG_INFINITY);
        let b = b.rating.unwrap_or(f32::NEG_INFINITY);
        b.total_cmp(&a)
    });
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::model::curated::{
        CuratedChange, CuratedPlaceRow, MemoryCuratedBackend, RowId,
    };
    use nearby_core::model::PlaceSource;

    // central bengaluru
    const USER: Coordinates = Coordinates {
        latitude: 12.9716,
        longitude: 77.5946,
    };

    fn row(id: i64, name: &str, category: PlaceCategory, lat: f64, lon: f64, rating: Option<f32>) -> CuratedPlaceRow {
        CuratedPlaceRow::new(RowId::Number(id), name, category, Coordinates::new(lat, lon), rating)
    }

    fn backend() -> Arc<MemoryCuratedBackend> {
        let mut unverified = row(4, "Vidhana Soudha", PlaceCategory::Landmark, 12.9791, 77.5913, Some(4.4));
        unverified.verified = Some(false);
        unverified.description = Some(String::from("Seat of the state legislature"));
        Arc::new(MemoryCuratedBackend::new(vec![
            row(1, "Bull Temple", PlaceCategory::Temple, 12.9425, 77.5680, Some(4.1)),
            row(2, "Mysore Palace", PlaceCategory::Landmark, 12.3052, 76.6552, Some(4.8)),
            row(3, "Cubbon Park", PlaceCategory::Tourist, 12.9763, 77.5929, None),
            unverified,
            row(5, "Dodda Ganesha Temple", PlaceCategory::Temple, 12.9430, 77.5690, Some(4.5)),
        ]))
    }

    fn ids(snapshot: &CuratedSnapshot) -> Vec<&str> {
        snapshot.places.iter().map(|p| p.id.as_str()).collect()
    }

    #[tokio::test]
    async fn test_fetch_all_sorted_by_rating() {
        let store = CuratedPlaceStore::new(backend());
        let snapshot = store.fetch_all(&PlaceFilter::default()).await;
        assert!(snapshot.error.is_none());
        assert_eq!(ids(&snapshot), vec!["2", "5", "4", "1", "3"]);
        assert!(snapshot.places.iter().all(|p| p.source == PlaceSource::Curated));
    }

    #[tokio::test]
    async fn test_fetch_all_filters() {
        let store = CuratedPlaceStore::new(backend());
        let temples = store
            .fetch_all(&PlaceFilter::with_category(Some(PlaceCategory::Temple)))
            .await;
        assert_eq!(ids(&temples), vec!["5", "1"]);

        let filter = PlaceFilter {
            verified: Some(true),
            min_rating: Some(4.2),
            limit: Some(1),
            ..Default::default()
        };
        let best = store.fetch_all(&filter).await;
        assert_eq!(ids(&best), vec!["2"]);
    }

    #[tokio::test]
    async fn test_fetch_nearby_uses_haversine_radius() {
        let store = CuratedPlaceStore::new(backend());
        let nearby = store.fetch_nearby(USER, 5.0, None).await;
        // mysore palace is ~130 km away
        assert_eq!(ids(&nearby), vec!["5", "4", "1", "3"]);

        let temples = store
            .fetch_nearby(USER, 5.0, Some(PlaceCategory::Temple))
            .await;
        assert_eq!(ids(&temples), vec!["5", "1"]);

        let tight = store.fetch_nearby(USER, 1.0, None).await;
        assert_eq!(ids(&tight), vec!["4", "3"]);
    }

    #[tokio::test]
    async fn test_fetch_nearby_rejects_bad_radius() {
        let store = CuratedPlaceStore::new(backend());
        let snapshot = store.fetch_nearby(USER, -1.0, None).await;
        assert!(snapshot.places.is_empty());
        assert!(matches!(
            snapshot.error,
            Some(DiscoveryError::InvalidUserInput(_))
        ));
    }

    #[tokio::test]
    async fn test_search() {
        let store = CuratedPlaceStore::new(backend());
        assert_eq!(ids(&store.search("TEMPLE").await), vec!["5", "1"]);
        assert_eq!(ids(&store.search("legislature").await), vec!["4"]);
        assert!(store.search("   ").await.places.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_failure_is_an_error_state() {
        let backend = backend();
        backend.set_fail_fetches(true);
        let store = CuratedPlaceStore::new(backend);
        let snapshot = store.fetch_all(&PlaceFilter::default()).await;
        assert!(snapshot.places.is_empty());
        assert!(matches!(
            snapshot.error,
            Some(DiscoveryError::BackendFetchFailed(_))
        ));
    }

    #[tokio::test]
    async fn test_subscription_delivers_changes_in_order() {
        let backend = backend();
        let store = CuratedPlaceStore::new(backend.clone());
        let mut subscription = store.subscribe().unwrap();

        backend.insert(row(6, "Lalbagh", PlaceCategory::Tourist, 12.9507, 77.5848, Some(4.6)));
        backend.update(row(6, "Lalbagh Botanical Garden", PlaceCategory::Tourist, 12.9507, 77.5848, Some(4.6)));
        backend.delete(&RowId::Number(6));

        assert!(matches!(subscription.next().await, Some(CuratedChange::Insert(p)) if p.name == "Lalbagh"));
        assert!(matches!(subscription.next().await, Some(CuratedChange::Update(p)) if p.name == "Lalbagh Botanical Garden"));
        assert_eq!(
            subscription.next().await,
            Some(CuratedChange::Delete { id: String::from("6") })
        );
    }

    #[tokio::test]
    async fn test_resubscribe_closes_previous_channel() {
        let backend = backend();
        let store = CuratedPlaceStore::new(backend.clone());
        let mut first = store.subscribe().unwrap();
        backend.delete(&RowId::Number(1));
        let mut second = store.subscribe().unwrap();
        assert_eq!(backend.open_channels(), 1);
        assert!(!first.is_current());
        // the event buffered on the first channel is never delivered
        assert_eq!(first.next().await, None);

        backend.delete(&RowId::Number(2));
        assert_eq!(
            second.next().await,
            Some(CuratedChange::Delete { id: String::from("2") })
        );
    }

    #[tokio::test]
    async fn test_unsubscribe_stops_delivery() {
        let backend = backend();
        let store = CuratedPlaceStore::new(backend.clone());
        let mut subscription = store.subscribe().unwrap();
        backend.delete(&RowId::Number(1));
        store.unsubscribe();
        assert!(!store.is_subscribed());
        assert_eq!(backend.open_channels(), 0);
        assert_eq!(subscription.next().await, None);
        backend.delete(&RowId::Number(2));
        assert_eq!(subscription.next().await, None);
    }

    #[test]
    fn test_dropping_store_closes_channel() {
        let backend = backend();
        {
            let store = CuratedPlaceStore::new(backend.clone());
            let _subscription = store.subscribe().unwrap();
            assert_eq!(backend.open_channels(), 1);
        }
        assert_eq!(backend.open_channels(), 0);
    }

    #[test]
    fn test_subscription_failure_is_reported() {
        let backend = backend();
        backend.set_fail_subscribe(true);
        let store = CuratedPlaceStore::new(backend.clone());
        assert!(matches!(
            store.subscribe(),
            Err(DiscoveryError::BackendSubscriptionFailed(_))
        ));
        assert!(!store.is_subscribed());
        assert_eq!(backend.open_channels(), 0);
    }
}
