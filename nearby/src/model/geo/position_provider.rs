use nearby_core::model::Coordinates;
use tokio::sync::mpsc;

use super::WatchOptions;

/// handle for one platform position watch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WatchId(pub u64);

#[derive(Debug, Clone, PartialEq)]
pub enum PositionFailure {
    PermissionDenied,
    Timeout,
    Unavailable(String),
}

impl std::fmt::Display for PositionFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PositionFailure::PermissionDenied => write!(f, "location permission denied"),
            PositionFailure::Timeout => write!(f, "timed out waiting for a position fix"),
            PositionFailure::Unavailable(msg) => write!(f, "{msg}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PositionUpdate {
    Fix(Coordinates),
    Failed(PositionFailure),
}

pub type PositionSink = mpsc::UnboundedSender<PositionUpdate>;

/// the platform's continuous position reporting capability.
///
/// an implementation keeps reporting updates into `sink` until
/// [`PositionProvider::clear_watch`] is called with the returned id.
pub trait PositionProvider: Send + Sync {
    fn watch_position(
        &self,
        options: &WatchOptions,
        sink: PositionSink,
    ) -> Result<WatchId, PositionFailure>;

    fn clear_watch(&self, id: WatchId);
}
