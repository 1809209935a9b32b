//! Location type.

use serde::{Deserialize, Serialize};

/// A point served by the fleet. Index 0 in any location list is the depot.
///
/// The core solver only ever sees location indices; coordinates matter to
/// [`CostMatrixProvider`](crate::distance::CostMatrixProvider) implementations.
///
/// # Examples
///
/// ```
/// use u_fleet::models::Location;
///
/// let a = Location::new(0.0, 0.0);
/// let b = Location::new(3.0, 4.0);
/// assert!((a.distance_to(&b) - 5.0).abs() < 1e-10);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    x: f64,
    y: f64,
}

impl Location {
    /// Creates a location at the given coordinates.
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// X-coordinate (latitude for geographic inputs).
    pub fn x(&self) -> f64 {
        self.x
    }

    /// Y-coordinate (longitude for geographic inputs).
    pub fn y(&self) -> f64 {
        self.y
    }

    /// Euclidean distance to another location.
    pub fn distance_to(&self, other: &Location) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}
