mod amenity;
mod osm_tag_family;
mod tourism;

pub use amenity::Amenity;
pub use osm_tag_family::{OsmTagFamily, RAILWAY_VALUES};
pub use tourism::Tourism;
