use async_trait::async_trait;
use nearby_core::model::DiscoveryError;

use super::{CuratedPlaceRow, PlaceQuery, RealtimeSink};

/// an open realtime channel on the backend
pub trait ChannelHandle: Send {
    /// stop delivering events. closing twice is a no-op.
    fn close(&mut self);
}

/// the curated places backend: one-shot reads plus a realtime channel scoped
/// to the places table.
#[async_trait]
pub trait CuratedBackend: Send + Sync {
    async fn select_places(&self, query: &PlaceQuery) -> Result<Vec<CuratedPlaceRow>, DiscoveryError>;

    /// open a channel that pushes every insert, update and delete on the places
    /// table into `sink` until the returned handle is closed.
    fn open_channel(&self, sink: RealtimeSink) -> Result<Box<dyn ChannelHandle>, DiscoveryError>;
}
