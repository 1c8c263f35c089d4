mod error;
mod overpass_collector;
mod overpass_collector_config;
mod overpass_element;
mod overpass_query;
mod place_mapping;
mod rating_policy;

pub use error::OverpassError;
pub use overpass_collector::OverpassCollector;
pub use overpass_collector_config::OverpassCollectorConfig;
pub use overpass_element::{OsmElementType, OverpassCenter, OverpassElement, OverpassResponse};
pub use overpass_query::OverpassQuery;
pub use place_mapping::{element_to_place, elements_to_places};
pub use rating_policy::CommunityRatingPolicy;
