//! Planar pixel geometry
//!
//! Points live in the video frame's pixel coordinate space: x grows to the
//! right, y grows downward. All math is kept in full `f64` precision.

use nalgebra::{Point2, Vector2};
use serde::{Deserialize, Serialize};

/// A tap location in frame pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Both coordinates are finite numbers
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    fn as_na(&self) -> Point2<f64> {
        Point2::new(self.x, self.y)
    }

    /// Displacement vector from `self` to `other`
    pub fn delta_to(&self, other: &Point) -> Vector2<f64> {
        other.as_na() - self.as_na()
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

impl std::fmt::Display for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Straight-line pixel distance between two points
pub fn euclidean_distance(a: &Point, b: &Point) -> f64 {
    a.delta_to(b).norm()
}

/// Direction of the segment `a -> b` in degrees, normalised into `[0, 360)`
///
/// Uses screen coordinates as-is, so with y pointing down a positive angle
/// turns clockwise on screen. Coincident points yield 0.
pub fn direction_degrees(a: &Point, b: &Point) -> f64 {
    let d = a.delta_to(b);
    normalize_degrees(d.y.atan2(d.x).to_degrees())
}

/// Map an angle in degrees into `[0, 360)`
pub fn normalize_degrees(angle: f64) -> f64 {
    let wrapped = if angle < 0.0 { angle + 360.0 } else { angle };
    // a tiny negative angle plus 360 rounds up to exactly 360
    if wrapped >= 360.0 {
        wrapped - 360.0
    } else if wrapped == 0.0 {
        // -0.0 from atan2(-0.0, x) would display as "-0"
        0.0
    } else {
        wrapped
    }
}
