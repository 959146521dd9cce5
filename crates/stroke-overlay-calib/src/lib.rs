//! Planar camera calibration for the stroke overlay tools.
//!
//! Views enter as chessboard corners (`ObservationSet`), either loaded from
//! JSON or, with the `detect` feature, found in the reference images by
//! `calib-targets`. The shipped [`PlanarCalibrator`] runs the closed-form
//! pipeline
//!
//! 1. per-view DLT homography,
//! 2. Zhang intrinsics from all homographies,
//! 3. optional linear radial distortion fit,
//! 4. per-view pose from `K^-1 H`,
//!
//! and returns an immutable [`CalibrationResult`] that downstream code only
//! reads.

#[cfg(feature = "detect")]
mod detect;
mod distortion_fit;
mod error;
mod observation;
mod planar_pose;
mod provider;
mod result;
pub mod synthetic;
mod zhang;

#[cfg(feature = "detect")]
pub use detect::{chessboard_params, detect_view, order_grid_corners};
pub use distortion_fit::fit_radial_distortion;
pub use error::CalibrationError;
pub use observation::{ObservationSet, PatternSize, ViewObservation};
pub use planar_pose::pose_from_homography;
pub use provider::{CalibrationProvider, PlanarCalibrationParams, PlanarCalibrator};
pub use result::{reprojection_rms, CalibrationResult};
pub use zhang::intrinsics_from_homographies;
