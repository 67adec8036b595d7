//! Planar geometry helpers. All coordinates are in meters.

use serde::{Deserialize, Serialize};

/// Cartesian coordinate on the site floor plan.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Calculate the Euclidean distance to another point.
    pub fn distance_to(&self, other: &Self) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    pub fn midpoint(&self, other: &Self) -> Self {
        Self {
            x: 0.5 * (self.x + other.x),
            y: 0.5 * (self.y + other.y),
        }
    }

    /// Linear interpolation from `self` (t = 0) towards `other` (t = 1).
    pub fn lerp(&self, other: &Self, t: f64) -> Self {
        Self {
            x: self.x + t * (other.x - self.x),
            y: self.y + t * (other.y - self.y),
        }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    pub(crate) fn coords(&self) -> [f64; 2] {
        [self.x, self.y]
    }
}

impl From<[f64; 2]> for Point {
    fn from(value: [f64; 2]) -> Self {
        Self::new(value[0], value[1])
    }
}

impl From<Point> for [f64; 2] {
    fn from(value: Point) -> Self {
        [value.x, value.y]
    }
}

/// Sum of Euclidean distances between consecutive points.
pub fn polyline_length(points: &[Point]) -> f64 {
    points
        .windows(2)
        .map(|pair| pair[0].distance_to(&pair[1]))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_is_euclidean() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(3.0, 4.0);
        assert!((a.distance_to(&b) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn midpoint_and_lerp_agree() {
        let a = Point::new(2.0, -2.0);
        let b = Point::new(6.0, 4.0);
        assert_eq!(a.midpoint(&b), a.lerp(&b, 0.5));
    }

    #[test]
    fn polyline_length_handles_short_inputs() {
        assert_eq!(polyline_length(&[]), 0.0);
        assert_eq!(polyline_length(&[Point::new(1.0, 1.0)]), 0.0);
        let square = [
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 10.0),
        ];
        assert!((polyline_length(&square) - 20.0).abs() < 1e-12);
    }
}
