use crate::{
    fit_radial_distortion, intrinsics_from_homographies, pose_from_homography, reprojection_rms,
    CalibrationError, CalibrationResult, ObservationSet,
};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use stroke_overlay_core::{estimate_homography, CameraModel, Homography, Pose};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Anything that turns board observations into a [`CalibrationResult`].
pub trait CalibrationProvider {
    fn calibrate(&self, observations: &ObservationSet) -> Result<CalibrationResult, CalibrationError>;
}

/// Settings for [`PlanarCalibrator`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanarCalibrationParams {
    /// Minimal number of views; Zhang's method needs three.
    pub min_views: usize,
    /// Fit `k1, k2` after the pinhole estimate.
    pub estimate_distortion: bool,
    /// Reject the result when the RMS reprojection error exceeds this.
    pub max_rms_px: Option<f64>,
}

impl Default for PlanarCalibrationParams {
    fn default() -> Self {
        Self {
            min_views: 3,
            estimate_distortion: true,
            max_rms_px: None,
        }
    }
}

/// Closed-form planar calibration (homographies, Zhang, radial fit).
#[derive(Clone, Debug, Default)]
pub struct PlanarCalibrator {
    pub params: PlanarCalibrationParams,
}

impl PlanarCalibrator {
    pub fn new(params: PlanarCalibrationParams) -> Self {
        Self { params }
    }
}

impl CalibrationProvider for PlanarCalibrator {
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "info", skip(self, observations), fields(views = observations.views.len()))
    )]
    fn calibrate(&self, observations: &ObservationSet) -> Result<CalibrationResult, CalibrationError> {
        observations.pattern.validate()?;
        let views = observations.checked_views()?;

        let required = self.params.min_views.max(3);
        if views.len() < required {
            return Err(CalibrationError::NotEnoughViews {
                required,
                got: views.len(),
            });
        }

        let plane = observations.pattern.plane_points(observations.square_size);
        let object = observations.pattern.object_points(observations.square_size);

        let homographies = views
            .iter()
            .enumerate()
            .map(|(view, corners)| {
                estimate_homography(&plane, corners)
                    .ok_or(CalibrationError::HomographyFailed { view })
            })
            .collect::<Result<Vec<Homography>, _>>()?;

        let k = intrinsics_from_homographies(&homographies)?;
        let poses = homographies
            .iter()
            .map(|h| pose_from_homography(&k, h))
            .collect::<Result<Vec<Pose>, _>>()?;

        let pinhole = CameraModel::pinhole(k);
        let mut camera = pinhole;
        let mut rms = reprojection_rms(&pinhole, &poses, &object, &views);
        debug!("pinhole reprojection rms = {rms:.4} px");

        if self.params.estimate_distortion {
            match fit_radial_distortion(&k, &poses, &object, &views) {
                Ok(distortion) => {
                    let candidate = CameraModel::new(k, distortion);
                    let rms_dist = reprojection_rms(&candidate, &poses, &object, &views);
                    debug!(
                        "radial fit k1={:.5} k2={:.5}, rms = {rms_dist:.4} px",
                        distortion.k1, distortion.k2
                    );
                    if rms_dist.is_finite() && rms_dist < rms {
                        camera = candidate;
                        rms = rms_dist;
                    }
                }
                Err(err) => warn!("skipping distortion fit: {err}"),
            }
        }

        if !rms.is_finite() || !camera_is_finite(&camera) {
            return Err(CalibrationError::NotConverged { rms });
        }
        if let Some(max_rms) = self.params.max_rms_px {
            if rms > max_rms {
                return Err(CalibrationError::NotConverged { rms });
            }
        }

        info!(
            "calibrated {} views: fx={:.2} fy={:.2} cx={:.2} cy={:.2}, rms = {rms:.4} px",
            poses.len(),
            camera.intrinsics.fx,
            camera.intrinsics.fy,
            camera.intrinsics.cx,
            camera.intrinsics.cy,
        );

        Ok(CalibrationResult {
            camera,
            poses,
            image_size: observations.image_size,
            rms_error: rms,
        })
    }
}

fn camera_is_finite(camera: &CameraModel) -> bool {
    let k = camera.intrinsics;
    [k.fx, k.fy, k.cx, k.cy, k.skew]
        .into_iter()
        .chain(camera.distortion.to_array())
        .all(f64::is_finite)
}
