mod discovery_config;
mod discovery_controller;
mod discovery_event;
mod discovery_state;
mod discovery_view;

pub use discovery_config::{DiscoveryConfig, DiscoverySettings, DEFAULT_RADIUS_KM};
pub use discovery_controller::{DiscoveryCommand, DiscoveryController, DiscoveryHandle};
pub use discovery_event::{DiscoveryEvent, Effect};
pub use discovery_state::DiscoveryState;
pub use discovery_view::{DiscoveryView, LiveMode, RealtimeStatus};
