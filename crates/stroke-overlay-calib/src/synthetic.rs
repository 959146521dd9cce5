//! Synthetic board views for tests and demos.

use crate::{ObservationSet, PatternSize, ViewObservation};
use nalgebra::{Matrix3, Rotation3, Vector3};
use stroke_overlay_core::{CameraModel, Homography, Intrinsics, Pose};

/// A plausible 1280x720 camera.
pub fn reference_intrinsics() -> Intrinsics {
    Intrinsics {
        fx: 900.0,
        fy: 880.0,
        cx: 640.0,
        cy: 360.0,
        skew: 0.0,
    }
}

/// Five tilted views of an 11x8 board with unit squares.
///
/// The board is centred roughly on the optical axis and tilted differently
/// in each view so the views are not degenerate for Zhang's method.
pub fn reference_poses() -> Vec<Pose> {
    let centre = Vector3::new(-5.0, -3.5, 0.0);
    [
        (0.25, 0.05, 0.02, 22.0),
        (-0.2, 0.25, -0.05, 24.0),
        (0.1, -0.3, 0.1, 20.0),
        (-0.3, -0.15, 0.0, 26.0),
        (0.15, 0.2, -0.12, 23.0),
    ]
    .iter()
    .map(|&(rx, ry, rz, dist)| {
        let rot = Rotation3::from_euler_angles(rx, ry, rz);
        // Board centre lands on the optical axis at `dist`.
        let t = Vector3::new(0.0, 0.0, dist) + rot * centre;
        Pose::from_rotation(&rot, t)
    })
    .collect()
}

/// `H = K [r1 r2 t]` for a `z = 0` board.
pub fn plane_homography(k: &Intrinsics, pose: &Pose) -> Homography {
    let r = pose.rotation();
    let m = r.matrix();
    let t = pose.translation();
    let kmat = k.k_matrix();
    let h = Matrix3::from_columns(&[kmat * m.column(0), kmat * m.column(1), kmat * t]);
    Homography::new(h)
}

/// Project the board through every pose into a ready-to-calibrate set.
pub fn observations(camera: &CameraModel, pattern: PatternSize, poses: &[Pose]) -> ObservationSet {
    let object = pattern.object_points(1.0);
    let views = poses
        .iter()
        .map(|pose| ViewObservation::found(camera.project_many(pose, &object)))
        .collect();
    let mut set = ObservationSet::new(pattern, views);
    set.image_size = Some([1280, 720]);
    set
}
