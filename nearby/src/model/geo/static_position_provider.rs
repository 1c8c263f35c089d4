use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicU64, Ordering},
        Mutex,
    },
};

use nearby_core::model::Coordinates;

use super::{PositionFailure, PositionProvider, PositionSink, PositionUpdate, WatchId, WatchOptions};

/// a position provider without hardware: every new watch receives the initial
/// fixes, and further updates can be pushed to all open watches. used by the
/// command line app, which takes the user's position as an argument.
#[derive(Debug, Default)]
pub struct StaticPositionProvider {
    initial: Vec<Coordinates>,
    deny: bool,
    next_id: AtomicU64,
    watches: Mutex<HashMap<WatchId, PositionSink>>,
}

impl StaticPositionProvider {
    pub fn new(initial: Vec<Coordinates>) -> Self {
        Self {
            initial,
            ..Default::default()
        }
    }

    /// a provider that refuses every watch, like a platform without location permission
    pub fn denied() -> Self {
        Self {
            deny: true,
            ..Default::default()
        }
    }

    /// send an update to every open watch
    pub fn push(&self, update: PositionUpdate) {
        if let Ok(watches) = self.watches.lock() {
            for sink in watches.values() {
                let _ = sink.send(update.clone());
            }
        }
    }

    pub fn active_watches(&self) -> usize {
        self.watches.lock().map(|w| w.len()).unwrap_or_default()
    }

    pub fn total_watches(&self) -> u64 {
        self.next_id.load(Ordering::SeqCst)
    }
}

impl PositionProvider for StaticPositionProvider {
    fn watch_position(
        &self,
        _options: &WatchOptions,
        sink: PositionSink,
    ) -> Result<WatchId, PositionFailure> {
        if self.deny {
            return Err(PositionFailure::PermissionDenied);
        }
        for fix in self.initial.iter() {
            let _ = sink.send(PositionUpdate::Fix(*fix));
        }
        let id = WatchId(self.next_id.fetch_add(1, Ordering::SeqCst));
        let mut watches = self
            .watches
            .lock()
            .map_err(|e| PositionFailure::Unavailable(format!("position provider poisoned: {e}")))?;
        watches.insert(id, sink);
        Ok(id)
    }

    fn clear_watch(&self, id: WatchId) {
        if let Ok(mut watches) = self.watches.lock() {
            watches.remove(&id);
        }
    }
}
