use geo::Point;
use serde::{Deserialize, Serialize};

/// a WGS84 latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// builds coordinates only when both values form a valid position.
    pub fn try_new(latitude: f64, longitude: f64) -> Option<Self> {
        let c = Self::new(latitude, longitude);
        c.is_valid().then_some(c)
    }

    /// finite, with latitude in [-90, 90] and longitude in [-180, 180]
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }

    /// x is longitude, y is latitude
    pub fn to_point(&self) -> Point<f64> {
        Point::new(self.longitude, self.latitude)
    }
}

impl From<Point<f64>> for Coordinates {
    fn from(value: Point<f64>) -> Self {
        Self::new(value.y(), value.x())
    }
}

impl std::fmt::Display for Coordinates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.6}, {:.6})", self.latitude, self.longitude)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_validity() {
        assert!(Coordinates::new(0.0, 0.0).is_valid());
        assert!(Coordinates::new(-90.0, 180.0).is_valid());
        assert!(!Coordinates::new(90.1, 0.0).is_valid());
        assert!(!Coordinates::new(0.0, -180.5).is_valid());
        assert!(!Coordinates::new(f64::NAN, 0.0).is_valid());
        assert!(Coordinates::try_new(12.0, f64::INFINITY).is_none());
    }

    #[test]
    fn test_point_axis_order() {
        let c = Coordinates::new(12.5, 77.25);
        let p = c.to_point();
        assert_eq!(p.x(), 77.25);
        assert_eq!(p.y(), 12.5);
        assert_eq!(Coordinates::from(p), c);
    }
}
