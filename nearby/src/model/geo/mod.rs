mod geo_watcher;
mod position_provider;
mod static_position_provider;
mod watch_options;

pub use geo_watcher::GeoWatcher;
pub use position_provider::{PositionFailure, PositionProvider, PositionSink, PositionUpdate, WatchId};
pub use static_position_provider::StaticPositionProvider;
pub use watch_options::WatchOptions;
