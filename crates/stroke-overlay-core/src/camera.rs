//! Pinhole camera with Brown-Conrady distortion.
//!
//! Conventions follow the usual calibration toolkits: a pose maps pattern
//! coordinates into the camera frame (`X_c = R * X_p + t`), the rotation is a
//! Rodrigues vector, and distortion coefficients are ordered
//! `k1, k2, p1, p2, k3`.

use nalgebra::{Matrix3, Point2, Point3, Rotation3, Vector2, Vector3};
use serde::{Deserialize, Serialize};

/// Pinhole intrinsics with optional skew.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Intrinsics {
    /// Focal length in pixels along X.
    pub fx: f64,
    /// Focal length in pixels along Y.
    pub fy: f64,
    /// Principal point X coordinate in pixels.
    pub cx: f64,
    /// Principal point Y coordinate in pixels.
    pub cy: f64,
    /// Skew term (typically 0).
    #[serde(default)]
    pub skew: f64,
}

impl Intrinsics {
    pub fn identity() -> Self {
        Self {
            fx: 1.0,
            fy: 1.0,
            cx: 0.0,
            cy: 0.0,
            skew: 0.0,
        }
    }

    /// Return the 3x3 camera matrix K.
    pub fn k_matrix(&self) -> Matrix3<f64> {
        Matrix3::new(
            self.fx, self.skew, self.cx, //
            0.0, self.fy, self.cy, //
            0.0, 0.0, 1.0,
        )
    }

    pub fn from_k_matrix(k: &Matrix3<f64>) -> Self {
        Self {
            fx: k[(0, 0)],
            fy: k[(1, 1)],
            cx: k[(0, 2)],
            cy: k[(1, 2)],
            skew: k[(0, 1)],
        }
    }

    #[inline]
    pub fn normalized_to_pixel(&self, n: Vector2<f64>) -> Point2<f64> {
        Point2::new(
            self.fx * n.x + self.skew * n.y + self.cx,
            self.fy * n.y + self.cy,
        )
    }

    #[inline]
    pub fn pixel_to_normalized(&self, p: Point2<f64>) -> Vector2<f64> {
        let y = (p.y - self.cy) / self.fy;
        let x = (p.x - self.cx - self.skew * y) / self.fx;
        Vector2::new(x, y)
    }
}

/// Brown-Conrady radial/tangential distortion.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Distortion {
    pub k1: f64,
    pub k2: f64,
    pub p1: f64,
    pub p2: f64,
    pub k3: f64,
}

impl Distortion {
    pub fn none() -> Self {
        Self::default()
    }

    /// Coefficients in OpenCV order `[k1, k2, p1, p2, k3]`.
    pub fn to_array(&self) -> [f64; 5] {
        [self.k1, self.k2, self.p1, self.p2, self.k3]
    }

    pub fn from_array(c: [f64; 5]) -> Self {
        Self {
            k1: c[0],
            k2: c[1],
            p1: c[2],
            p2: c[3],
            k3: c[4],
        }
    }

    pub fn is_zero(&self) -> bool {
        self.to_array().iter().all(|&c| c == 0.0)
    }

    /// Apply distortion to an undistorted normalized image point.
    pub fn distort(&self, n: Vector2<f64>) -> Vector2<f64> {
        let (x, y) = (n.x, n.y);
        let r2 = x * x + y * y;
        let r4 = r2 * r2;
        let r6 = r4 * r2;
        let radial = 1.0 + self.k1 * r2 + self.k2 * r4 + self.k3 * r6;

        let x_tan = 2.0 * self.p1 * x * y + self.p2 * (r2 + 2.0 * x * x);
        let y_tan = self.p1 * (r2 + 2.0 * y * y) + 2.0 * self.p2 * x * y;

        Vector2::new(x * radial + x_tan, y * radial + y_tan)
    }
}

/// Pattern-to-camera transform for one view.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    /// Rodrigues rotation vector (axis * angle, radians).
    pub rvec: [f64; 3],
    /// Translation in pattern units.
    pub tvec: [f64; 3],
}

impl Pose {
    pub fn identity() -> Self {
        Self {
            rvec: [0.0; 3],
            tvec: [0.0; 3],
        }
    }

    pub fn from_rotation(rotation: &Rotation3<f64>, translation: Vector3<f64>) -> Self {
        let r = rotation.scaled_axis();
        Self {
            rvec: [r.x, r.y, r.z],
            tvec: [translation.x, translation.y, translation.z],
        }
    }

    pub fn rotation(&self) -> Rotation3<f64> {
        Rotation3::new(Vector3::from(self.rvec))
    }

    pub fn translation(&self) -> Vector3<f64> {
        Vector3::from(self.tvec)
    }

    /// Map a pattern-frame point into the camera frame.
    #[inline]
    pub fn transform_point(&self, p: &Point3<f64>) -> Point3<f64> {
        self.rotation() * p + self.translation()
    }
}

/// Intrinsics and distortion shared by every view of one camera.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CameraModel {
    pub intrinsics: Intrinsics,
    #[serde(default)]
    pub distortion: Distortion,
}

impl CameraModel {
    pub fn new(intrinsics: Intrinsics, distortion: Distortion) -> Self {
        Self {
            intrinsics,
            distortion,
        }
    }

    pub fn pinhole(intrinsics: Intrinsics) -> Self {
        Self::new(intrinsics, Distortion::none())
    }

    /// Project a pattern-frame point into pixel coordinates.
    ///
    /// A point with camera-frame depth exactly zero is projected with unit
    /// depth instead of dividing by zero, matching OpenCV's `projectPoints`.
    pub fn project(&self, pose: &Pose, p: &Point3<f64>) -> Point2<f64> {
        self.project_camera_point(&pose.transform_point(p))
    }

    /// Project a point that is already in the camera frame.
    pub fn project_camera_point(&self, pc: &Point3<f64>) -> Point2<f64> {
        let inv_z = if pc.z != 0.0 { 1.0 / pc.z } else { 1.0 };
        let n = Vector2::new(pc.x * inv_z, pc.y * inv_z);
        let nd = self.distortion.distort(n);
        self.intrinsics.normalized_to_pixel(nd)
    }

    /// Project many points through the same pose.
    pub fn project_many(&self, pose: &Pose, pts: &[Point3<f64>]) -> Vec<Point2<f64>> {
        let rot = pose.rotation();
        let t = pose.translation();
        pts.iter()
            .map(|p| self.project_camera_point(&(rot * p + t)))
            .collect()
    }
}
