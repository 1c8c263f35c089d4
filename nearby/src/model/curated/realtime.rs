use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

use nearby_core::model::Place;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use super::{CuratedPlaceRow, RowId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RealtimeEventType {
    Insert,
    Update,
    Delete,
}

/// a change on the places table as the backend's realtime channel emits it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RealtimePayload {
    #[serde(rename = "eventType")]
    pub event_type: RealtimeEventType,
    #[serde(default)]
    pub new: Option<serde_json::Value>,
    #[serde(default)]
    pub old: Option<serde_json::Value>,
}

pub type RealtimeSink = mpsc::UnboundedSender<RealtimePayload>;

/// a decoded change to the curated snapshot
#[derive(Debug, Clone, PartialEq)]
pub enum CuratedChange {
    Insert(Place),
    Update(Place),
    Delete { id: String },
}

impl CuratedChange {
    pub fn id(&self) -> &str {
        match self {
            CuratedChange::Insert(place) | CuratedChange::Update(place) => &place.id,
            CuratedChange::Delete { id } => id,
        }
    }
}

impl TryFrom<RealtimePayload> for CuratedChange {
    type Error = String;

    fn try_from(value: RealtimePayload) -> Result<Self, Self::Error> {
        match value.event_type {
            RealtimeEventType::Insert => {
                let row = decode_row(value.new, "new")?;
                let place = row
                    .to_place()
                    .ok_or_else(|| format!("inserted row {} cannot be shown as a place", row.id))?;
                Ok(CuratedChange::Insert(place))
            }
            RealtimeEventType::Update => {
                let row = decode_row(value.new, "new")?;
                // a row that lost its name or position can no longer be shown
                match row.to_place() {
                    Some(place) => Ok(CuratedChange::Update(place)),
                    None => Ok(CuratedChange::Delete {
                        id: row.id.to_string(),
                    }),
                }
            }
            RealtimeEventType::Delete => {
                let old = value
                    .old
                    .ok_or_else(|| String::from("DELETE event without 'old' record"))?;
                let id = old
                    .get("id")
                    .cloned()
                    .ok_or_else(|| String::from("DELETE event 'old' record has no id"))?;
                let id: RowId = serde_json::from_value(id)
                    .map_err(|e| format!("DELETE event has an invalid id: {e}"))?;
                Ok(CuratedChange::Delete { id: id.to_string() })
            }
        }
    }
}

fn decode_row(value: Option<serde_json::Value>, field: &str) -> Result<CuratedPlaceRow, String> {
    let value = value.ok_or_else(|| format!("event without '{field}' record"))?;
    serde_json::from_value(value).map_err(|e| format!("invalid '{field}' record: {e}"))
}

/// the receiving end of the store's live channel. once the store closes the
/// channel or opens a new one, this subscription yields no further events.
#[derive(Debug)]
pub struct RealtimeSubscription {
    generation: u64,
    current_generation: Arc<AtomicU64>,
    receiver: mpsc::UnboundedReceiver<RealtimePayload>,
}

impl RealtimeSubscription {
    pub(crate) fn new(
        generation: u64,
        current_generation: Arc<AtomicU64>,
        receiver: mpsc::UnboundedReceiver<RealtimePayload>,
    ) -> Self {
        Self {
            generation,
            current_generation,
            receiver,
        }
    }

    /// false once the channel behind this subscription was closed
    pub fn is_current(&self) -> bool {
        self.current_generation.load(Ordering::SeqCst) == self.generation
    }

    /// the next change, in arrival order. undecodable events are logged and
    /// skipped. None once the channel is closed.
    ///
    /// cancel safe.
    pub async fn next(&mut self) -> Option<CuratedChange> {
        loop {
            if !self.is_current() {
                return None;
            }
            let payload = self.receiver.recv().await?;
            if !self.is_current() {
                return None;
            }
            match CuratedChange::try_from(payload) {
                Ok(change) => return Some(change),
                Err(e) => log::warn!("ignoring realtime event: {e}"),
            }
        }
    }
}
