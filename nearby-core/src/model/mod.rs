mod community_place_source;
mod coordinates;
mod discovery_error;
mod place;
mod place_category;
mod place_source;

pub use community_place_source::CommunityPlaceSource;
pub use coordinates::Coordinates;
pub use discovery_error::DiscoveryError;
pub use place::{normalize_name, Place};
pub use place_category::PlaceCategory;
pub use place_source::PlaceSource;
