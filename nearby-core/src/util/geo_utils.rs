use geo::{Distance, Haversine, Point};

use crate::model::Coordinates;

pub const METERS_PER_KILOMETER: f64 = 1000.0;

/// great-circle distance between two coordinates using the haversine formula.
///
/// # Arguments
///
/// * `from` - origin, usually the user's live position
/// * `to` - destination, usually a place
///
/// # Returns
///
/// * distance in kilometers
pub fn haversine_km(from: &Coordinates, to: &Coordinates) -> f64 {
    haversine_meters(from, to) / METERS_PER_KILOMETER
}

/// great-circle distance between two coordinates in meters.
pub fn haversine_meters(from: &Coordinates, to: &Coordinates) -> f64 {
    let a: Point<f64> = from.to_point();
    let b: Point<f64> = to.to_point();
    Haversine.distance(a, b)
}

/// true when `to` lies within `radius_km` of `from`. the boundary is inclusive.
pub fn within_radius_km(from: &Coordinates, to: &Coordinates, radius_km: f64) -> bool {
    haversine_km(from, to) <= radius_km
}
