use nalgebra::{Point2, Point3, Vector3};
use serde::{Deserialize, Serialize};

/// A single pen stroke: an ordered pair of 3-D points.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Segment3 {
    pub start: Point3<f64>,
    pub end: Point3<f64>,
}

impl Segment3 {
    pub fn new(start: Point3<f64>, end: Point3<f64>) -> Self {
        Self { start, end }
    }

    pub fn from_arrays(start: [f64; 3], end: [f64; 3]) -> Self {
        Self::new(Point3::from(start), Point3::from(end))
    }

    /// Shift both endpoints by `offset`.
    #[inline]
    pub fn translated(&self, offset: Vector3<f64>) -> Self {
        Self {
            start: self.start + offset,
            end: self.end + offset,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.start.iter().chain(self.end.iter()).all(|v| v.is_finite())
    }
}

/// A stroke after projection into image pixel coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProjectedSegment {
    pub start: Point2<f64>,
    pub end: Point2<f64>,
}

impl ProjectedSegment {
    pub fn new(start: Point2<f64>, end: Point2<f64>) -> Self {
        Self { start, end }
    }

    pub fn length(&self) -> f64 {
        (self.end - self.start).norm()
    }
}
