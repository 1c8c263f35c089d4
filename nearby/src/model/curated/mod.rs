mod curated_backend;
mod curated_backend_config;
mod curated_place_row;
mod curated_place_store;
mod memory_backend;
mod place_filter;
mod realtime;
mod realtime_channel;
mod rest_backend;

pub use curated_backend::{ChannelHandle, CuratedBackend};
pub use curated_backend_config::CuratedBackendConfig;
pub use curated_place_row::{CuratedPlaceRow, RowId};
pub use curated_place_store::{sort_by_rating, CuratedPlaceStore, CuratedSnapshot};
pub use memory_backend::MemoryCuratedBackend;
pub use place_filter::{PlaceFilter, PlaceQuery};
pub use realtime::{
    CuratedChange, RealtimeEventType, RealtimePayload, RealtimeSink, RealtimeSubscription,
};
pub use realtime_channel::SocketChannelHandle;
pub use rest_backend::RestCuratedBackend;
