//! Coordinate regions

use serde::{Deserialize, Serialize};

/// Miles per degree of latitude
const MILES_PER_DEGREE: f64 = 69.0;

/// A point on the globe, in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    /// Degrees north of the equator
    pub latitude: f64,
    /// Degrees east of the prime meridian
    pub longitude: f64,
}

/// Extent of a region, in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Span {
    /// North-south extent
    pub latitude_delta: f64,
    /// East-west extent
    pub longitude_delta: f64,
}

/// A rectangular region around a center point
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Region {
    /// Center of the region
    pub center: Coordinate,
    /// Size of the region
    pub span: Span,
}

impl Coordinate {
    /// Create a coordinate
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Region centered here spanning `miles` in each direction's delta.
    ///
    /// The longitude span widens with latitude and is unbounded at the poles,
    /// where the cosine factor reaches zero.
    pub fn region(&self, miles: f64) -> Region {
        let scaling_factor = (2.0 * std::f64::consts::PI * self.latitude / 360.0)
            .cos()
            .abs();

        Region {
            center: *self,
            span: Span {
                latitude_delta: miles / MILES_PER_DEGREE,
                longitude_delta: miles / (scaling_factor * MILES_PER_DEGREE),
            },
        }
    }
}
