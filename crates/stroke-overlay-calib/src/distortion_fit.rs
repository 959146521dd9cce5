//! Linear radial distortion estimate (Zhang, section 3.3).
//!
//! With intrinsics and poses fixed, each observed corner gives two equations
//! linear in `k1, k2`:
//!
//! ```text
//! (u - cx) * [r^2 r^4] [k1 k2]^T = u_obs - u
//! (v - cy) * [r^2 r^4] [k1 k2]^T = v_obs - v
//! ```
//!
//! where `(u, v)` is the ideal pinhole projection and `r` the radius of the
//! ideal normalized point. Tangential terms and `k3` stay zero.

use crate::CalibrationError;
use nalgebra::{DMatrix, DVector, Point2, Point3};
use stroke_overlay_core::{CameraModel, Distortion, Intrinsics, Pose};

pub fn fit_radial_distortion(
    k: &Intrinsics,
    poses: &[Pose],
    object: &[Point3<f64>],
    views: &[Vec<Point2<f64>>],
) -> Result<Distortion, CalibrationError> {
    let pinhole = CameraModel::pinhole(*k);
    let n: usize = views.iter().map(Vec::len).sum();
    if n < 2 {
        return Err(CalibrationError::Degenerate(
            "not enough corners for a distortion fit",
        ));
    }

    let mut a = DMatrix::<f64>::zeros(2 * n, 2);
    let mut b = DVector::<f64>::zeros(2 * n);
    let mut row = 0;
    for (pose, observed) in poses.iter().zip(views) {
        for (p, obs) in object.iter().zip(observed) {
            let pc = pose.transform_point(p);
            let z = if pc.z != 0.0 { pc.z } else { 1.0 };
            let (x, y) = (pc.x / z, pc.y / z);
            let r2 = x * x + y * y;
            let ideal = pinhole.project_camera_point(&pc);

            let du = ideal.x - k.cx;
            let dv = ideal.y - k.cy;
            a[(row, 0)] = du * r2;
            a[(row, 1)] = du * r2 * r2;
            b[row] = obs.x - ideal.x;
            a[(row + 1, 0)] = dv * r2;
            a[(row + 1, 1)] = dv * r2 * r2;
            b[row + 1] = obs.y - ideal.y;
            row += 2;
        }
    }

    let spread = a.column(0).norm();
    if spread < 1e-9 {
        return Err(CalibrationError::Degenerate(
            "corners lack radial spread for a distortion fit",
        ));
    }

    let svd = a.svd(true, true);
    let x = svd
        .solve(&b, 1e-12)
        .map_err(|_| CalibrationError::Degenerate("distortion least squares failed"))?;

    Ok(Distortion {
        k1: x[0],
        k2: x[1],
        ..Distortion::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{synthetic, PatternSize};

    #[test]
    fn recovers_radial_coefficients() {
        let k = synthetic::reference_intrinsics();
        let poses = synthetic::reference_poses();
        let pattern = PatternSize::default();
        let object = pattern.object_points(1.0);
        let truth = Distortion {
            k1: -0.12,
            k2: 0.05,
            ..Distortion::default()
        };
        let camera = CameraModel::new(k, truth);
        let views: Vec<Vec<Point2<f64>>> = poses
            .iter()
            .map(|pose| camera.project_many(pose, &object))
            .collect();

        let fitted = fit_radial_distortion(&k, &poses, &object, &views).expect("fit");
        assert!((fitted.k1 - truth.k1).abs() < 1e-6, "k1 = {}", fitted.k1);
        assert!((fitted.k2 - truth.k2).abs() < 1e-4, "k2 = {}", fitted.k2);
        assert_eq!(fitted.p1, 0.0);
        assert_eq!(fitted.k3, 0.0);
    }

    #[test]
    fn undistorted_views_fit_zero() {
        let k = synthetic::reference_intrinsics();
        let poses = synthetic::reference_poses();
        let object = PatternSize::default().object_points(1.0);
        let camera = CameraModel::pinhole(k);
        let views: Vec<Vec<Point2<f64>>> = poses
            .iter()
            .map(|pose| camera.project_many(pose, &object))
            .collect();

        let fitted = fit_radial_distortion(&k, &poses, &object, &views).expect("fit");
        assert!(fitted.k1.abs() < 1e-9);
        assert!(fitted.k2.abs() < 1e-9);
    }
}
