use std::{
    collections::HashMap,
    path::Path,
    sync::{
        atomic::{AtomicBool, AtomicU64, Ordering},
        Arc, Mutex,
    },
};

use async_trait::async_trait;
use indexmap::IndexMap;
use nearby_core::model::DiscoveryError;

use super::{
    ChannelHandle, CuratedBackend, CuratedPlaceRow, PlaceQuery, RealtimeEventType,
    RealtimePayload, RealtimeSink, RowId,
};

type Channels = Arc<Mutex<HashMap<u64, RealtimeSink>>>;

/// an in-process curated backend. rows keep insertion order and every write
/// is broadcast to the open realtime channels, the way the hosted backend
/// reports table changes. reads return every row, the store applies filters.
#[derive(Debug, Default)]
pub struct MemoryCuratedBackend {
    rows: Mutex<IndexMap<RowId, CuratedPlaceRow>>,
    channels: Channels,
    next_channel: AtomicU64,
    fail_fetches: AtomicBool,
    fail_subscribe: AtomicBool,
}

impl MemoryCuratedBackend {
    pub fn new(rows: Vec<CuratedPlaceRow>) -> Self {
        let rows = rows.into_iter().map(|r| (r.id.clone(), r)).collect();
        Self {
            rows: Mutex::new(rows),
            ..Default::default()
        }
    }

    /// seed the backend from a JSON array of place rows
    pub fn from_json_file(path: &Path) -> Result<Self, DiscoveryError> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            DiscoveryError::InvalidUserInput(format!(
                "failure reading seed file '{}': {e}",
                path.display()
            ))
        })?;
        let rows: Vec<CuratedPlaceRow> = serde_json::from_str(&contents).map_err(|e| {
            DiscoveryError::InvalidUserInput(format!(
                "failure parsing seed file '{}': {e}",
                path.display()
            ))
        })?;
        log::info!("seeded {} curated rows from {}", rows.len(), path.display());
        Ok(Self::new(rows))
    }

    /// add a row, or replace the row with the same id
    pub fn insert(&self, row: CuratedPlaceRow) {
        let new = serde_json::to_value(&row).ok();
        if let Ok(mut rows) = self.rows.lock() {
            rows.insert(row.id.clone(), row);
        }
        self.broadcast(RealtimePayload {
            event_type: RealtimeEventType::Insert,
            new,
            old: None,
        });
    }

    pub fn update(&self, row: CuratedPlaceRow) {
        let new = serde_json::to_value(&row).ok();
        let old = match self.rows.lock() {
            Ok(mut rows) => rows.insert(row.id.clone(), row),
            Err(_) => None,
        };
        self.broadcast(RealtimePayload {
            event_type: RealtimeEventType::Update,
            new,
            old: old.and_then(|o| serde_json::to_value(o).ok()),
        });
    }

    /// remove a row. the delete is broadcast even for unknown ids, as the
    /// hosted backend does.
    pub fn delete(&self, id: &RowId) {
        if let Ok(mut rows) = self.rows.lock() {
            rows.shift_remove(id);
        }
        self.broadcast(RealtimePayload {
            event_type: RealtimeEventType::Delete,
            new: None,
            old: Some(serde_json::json!({ "id": id })),
        });
    }

    pub fn set_fail_fetches(&self, fail: bool) {
        self.fail_fetches.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_subscribe(&self, fail: bool) {
        self.fail_subscribe.store(fail, Ordering::SeqCst);
    }

    pub fn open_channels(&self) -> usize {
        self.channels.lock().map(|c| c.len()).unwrap_or_default()
    }

    fn broadcast(&self, payload: RealtimePayload) {
        if let Ok(mut channels) = self.channels.lock() {
            // drop channels whose receiver is gone
            channels.retain(|_, sink| sink.send(payload.clone()).is_ok());
        }
    }
}

#[async_trait]
impl CuratedBackend for MemoryCuratedBackend {
    async fn select_places(
        &self,
        _query: &PlaceQuery,
    ) -> Result<Vec<CuratedPlaceRow>, DiscoveryError> {
        if self.fail_fetches.load(Ordering::SeqCst) {
            return Err(DiscoveryError::BackendFetchFailed(String::from(
                "in-memory backend is set to fail",
            )));
        }
        let rows = self.rows.lock().map_err(|e| {
            DiscoveryError::BackendFetchFailed(format!("row lock poisoned: {e}"))
        })?;
        Ok(rows.values().cloned().collect())
    }

    fn open_channel(&self, sink: RealtimeSink) -> Result<Box<dyn ChannelHandle>, DiscoveryError> {
        if self.fail_subscribe.load(Ordering::SeqCst) {
            return Err(DiscoveryError::BackendSubscriptionFailed(String::from(
                "in-memory backend is set to refuse channels",
            )));
        }
        let id = self.next_channel.fetch_add(1, Ordering::SeqCst);
        let mut channels = self.channels.lock().map_err(|e| {
            DiscoveryError::BackendSubscriptionFailed(format!("channel lock poisoned: {e}"))
        })?;
        channels.insert(id, sink);
        Ok(Box::new(MemoryChannelHandle {
            id,
            channels: self.channels.clone(),
        }))
    }
}

struct MemoryChannelHandle {
    id: u64,
    channels: Channels,
}

impl ChannelHandle for MemoryChannelHandle {
    fn close(&mut self) {
        if let Ok(mut channels) = self.channels.lock() {
            channels.remove(&self.id);
        }
    }
}

impl Drop for MemoryChannelHandle {
    fn drop(&mut self) {
        self.close();
    }
}
