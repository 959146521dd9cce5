use crate::CalibrationError;
use nalgebra::{Matrix3, Rotation3, Vector3};
use stroke_overlay_core::{Homography, Intrinsics, Pose};

/// Decompose a plane homography (`z = 0` board) into the board pose.
///
/// The homography scale is fixed so that the rotation columns have unit
/// norm and the board lies in front of the camera (`t_z > 0`). The rotation
/// is projected onto SO(3) with an SVD.
pub fn pose_from_homography(
    k: &Intrinsics,
    hom: &Homography,
) -> Result<Pose, CalibrationError> {
    let k_inv = k
        .k_matrix()
        .try_inverse()
        .ok_or(CalibrationError::Degenerate("intrinsics matrix is singular"))?;

    let kh1 = k_inv * hom.h.column(0);
    let kh2 = k_inv * hom.h.column(1);
    let kh3 = k_inv * hom.h.column(2);

    let scale = 0.5 * (kh1.norm() + kh2.norm());
    if scale < 1e-12 {
        return Err(CalibrationError::Degenerate("homography has zero scale"));
    }
    let mut lambda = 1.0 / scale;
    if kh3.z * lambda < 0.0 {
        lambda = -lambda;
    }

    let r1: Vector3<f64> = kh1 * lambda;
    let r2: Vector3<f64> = kh2 * lambda;
    let r3 = r1.cross(&r2);
    let t: Vector3<f64> = kh3 * lambda;

    let r = Matrix3::from_columns(&[r1, r2, r3]);
    let svd = r.svd(true, true);
    let (u, v_t) = match (svd.u, svd.v_t) {
        (Some(u), Some(v_t)) => (u, v_t),
        _ => return Err(CalibrationError::Degenerate("rotation svd failed")),
    };
    let mut r_orth = u * v_t;
    if r_orth.determinant() < 0.0 {
        let mut u_flipped = u;
        u_flipped.column_mut(2).neg_mut();
        r_orth = u_flipped * v_t;
    }

    let rotation = Rotation3::from_matrix_unchecked(r_orth);
    Ok(Pose::from_rotation(&rotation, t))
}
