use crate::CalibrationError;
use nalgebra::{Point2, Point3};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};
use stroke_overlay_core::{CameraModel, Pose};

/// Camera model plus one pose per reference image, in input order.
///
/// Produced once at startup and only read afterwards.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CalibrationResult {
    pub camera: CameraModel,
    pub poses: Vec<Pose>,
    #[serde(default)]
    pub image_size: Option<[u32; 2]>,
    /// RMS reprojection error over all corners, in pixels.
    #[serde(default)]
    pub rms_error: f64,
}

impl CalibrationResult {
    pub fn new(camera: CameraModel, poses: Vec<Pose>) -> Self {
        Self {
            camera,
            poses,
            image_size: None,
            rms_error: 0.0,
        }
    }

    pub fn pose(&self, index: usize) -> Option<&Pose> {
        self.poses.get(index)
    }

    pub fn num_views(&self) -> usize {
        self.poses.len()
    }

    /// Load a stored result from JSON on disk.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, CalibrationError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Write this result to disk as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), CalibrationError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}

/// RMS distance between observed corners and their reprojections.
pub fn reprojection_rms(
    camera: &CameraModel,
    poses: &[Pose],
    object: &[Point3<f64>],
    views: &[Vec<Point2<f64>>],
) -> f64 {
    let mut sum_sq = 0.0;
    let mut count = 0usize;
    for (pose, observed) in poses.iter().zip(views) {
        let projected = camera.project_many(pose, object);
        for (p, q) in projected.iter().zip(observed) {
            sum_sq += (p - q).norm_squared();
            count += 1;
        }
    }
    if count == 0 {
        return 0.0;
    }
    (sum_sq / count as f64).sqrt()
}
