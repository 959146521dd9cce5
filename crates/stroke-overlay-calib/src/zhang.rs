use crate::CalibrationError;
use nalgebra::{DMatrix, Matrix3, SVector};
use stroke_overlay_core::{Homography, Intrinsics};

/// The 6-vector `v_ij(H)` from Zhang's constraint `h_i^T B h_j`.
fn v_ij(h: &Matrix3<f64>, i: usize, j: usize) -> SVector<f64, 6> {
    let hi = h.column(i);
    let hj = h.column(j);

    SVector::<f64, 6>::from_row_slice(&[
        hi[0] * hj[0],
        hi[0] * hj[1] + hi[1] * hj[0],
        hi[1] * hj[1],
        hi[2] * hj[0] + hi[0] * hj[2],
        hi[2] * hj[1] + hi[1] * hj[2],
        hi[2] * hj[2],
    ])
}

/// Closed-form intrinsics from three or more plane homographies.
///
/// Distortion is ignored; the result seeds the distortion fit and pose
/// recovery.
pub fn intrinsics_from_homographies(
    homographies: &[Homography],
) -> Result<Intrinsics, CalibrationError> {
    if homographies.len() < 3 {
        return Err(CalibrationError::NotEnoughViews {
            required: 3,
            got: homographies.len(),
        });
    }

    let m = homographies.len();
    let mut v = DMatrix::<f64>::zeros(2 * m, 6);
    for (k, hom) in homographies.iter().enumerate() {
        let h = &hom.h;
        let v12 = v_ij(h, 0, 1);
        let v11 = v_ij(h, 0, 0);
        let v22 = v_ij(h, 1, 1);
        v.row_mut(2 * k).copy_from(&v12.transpose());
        v.row_mut(2 * k + 1).copy_from(&(v11 - v22).transpose());
    }

    // B is the null vector of V.
    let svd = v.svd(false, true);
    let v_t = svd
        .v_t
        .ok_or(CalibrationError::Degenerate("svd of constraint matrix failed"))?;
    let b = v_t.row(v_t.nrows() - 1);
    let (b11, b12, b22, b13, b23, b33) = (b[0], b[1], b[2], b[3], b[4], b[5]);

    let denom = b11 * b22 - b12 * b12;
    let denom_norm = b11 * b11 + b22 * b22;
    if denom_norm <= 0.0 || denom.abs() / denom_norm < 1e-9 {
        return Err(CalibrationError::Degenerate(
            "views do not constrain the focal lengths",
        ));
    }

    let v0 = (b12 * b13 - b11 * b23) / denom;
    let lambda = b33 - (b13 * b13 + v0 * (b12 * b13 - b11 * b23)) / b11;

    let alpha_sq = lambda / b11;
    let beta_sq = lambda * b11 / denom;
    if !(alpha_sq > 0.0 && beta_sq > 0.0) {
        return Err(CalibrationError::Degenerate(
            "image of the absolute conic is not positive definite",
        ));
    }

    let alpha = alpha_sq.sqrt();
    let beta = beta_sq.sqrt();
    let gamma = -b12 * alpha * alpha * beta / lambda;
    let u0 = gamma * v0 / beta - b13 * alpha * alpha / lambda;

    let k = Intrinsics {
        fx: alpha,
        fy: beta,
        cx: u0,
        cy: v0,
        skew: gamma,
    };
    log::debug!(
        "zhang intrinsics: fx={:.2} fy={:.2} cx={:.2} cy={:.2} skew={:.4}",
        k.fx,
        k.fy,
        k.cx,
        k.cy,
        k.skew
    );
    Ok(k)
}
