//! Chessboard geometry and per-view corner observations.

use crate::CalibrationError;
use nalgebra::{Point2, Point3};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

/// Number of inner corners along each board axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternSize {
    pub cols: u32,
    pub rows: u32,
}

impl Default for PatternSize {
    fn default() -> Self {
        Self { cols: 11, rows: 8 }
    }
}

impl PatternSize {
    pub fn new(cols: u32, rows: u32) -> Self {
        Self { cols, rows }
    }

    pub fn corner_count(&self) -> usize {
        self.cols as usize * self.rows as usize
    }

    pub(crate) fn validate(&self) -> Result<(), CalibrationError> {
        if self.cols < 2 || self.rows < 2 {
            return Err(CalibrationError::InvalidPattern {
                cols: self.cols,
                rows: self.rows,
            });
        }
        Ok(())
    }

    /// Board points on the `z = 0` plane, `x` varying fastest.
    pub fn object_points(&self, square_size: f64) -> Vec<Point3<f64>> {
        (0..self.rows)
            .flat_map(|y| {
                (0..self.cols).map(move |x| {
                    Point3::new(x as f64 * square_size, y as f64 * square_size, 0.0)
                })
            })
            .collect()
    }

    /// Same as [`PatternSize::object_points`], dropping `z`.
    pub fn plane_points(&self, square_size: f64) -> Vec<Point2<f64>> {
        self.object_points(square_size)
            .into_iter()
            .map(|p| p.xy())
            .collect()
    }
}

fn default_square_size() -> f64 {
    1.0
}

/// Detected corners for one reference image.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ViewObservation {
    #[serde(default)]
    pub image_path: Option<String>,
    /// Corner pixels in object-point order, or `None` if the detector failed.
    #[serde(default)]
    pub corners: Option<Vec<[f64; 2]>>,
}

impl ViewObservation {
    pub fn found(corners: Vec<Point2<f64>>) -> Self {
        Self {
            image_path: None,
            corners: Some(corners.iter().map(|p| [p.x, p.y]).collect()),
        }
    }

    pub fn not_found() -> Self {
        Self::default()
    }

    pub fn corner_points(&self) -> Option<Vec<Point2<f64>>> {
        self.corners
            .as_ref()
            .map(|c| c.iter().map(|&[x, y]| Point2::new(x, y)).collect())
    }
}

/// All views of one board, as handed to a calibration provider.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ObservationSet {
    #[serde(default)]
    pub pattern: PatternSize,
    /// Board square side in object units.
    #[serde(default = "default_square_size")]
    pub square_size: f64,
    /// Image size `[width, height]`, if known.
    #[serde(default)]
    pub image_size: Option<[u32; 2]>,
    pub views: Vec<ViewObservation>,
}

impl ObservationSet {
    pub fn new(pattern: PatternSize, views: Vec<ViewObservation>) -> Self {
        Self {
            pattern,
            square_size: default_square_size(),
            image_size: None,
            views,
        }
    }

    /// Load an observation set from JSON on disk.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, CalibrationError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Write this observation set to disk as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), CalibrationError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Corner pixels of every view, failing on the first unusable one.
    pub(crate) fn checked_views(&self) -> Result<Vec<Vec<Point2<f64>>>, CalibrationError> {
        let expected = self.pattern.corner_count();
        self.views
            .iter()
            .enumerate()
            .map(|(view, obs)| {
                let corners = obs
                    .corner_points()
                    .ok_or(CalibrationError::PatternNotFound { view })?;
                if corners.len() != expected {
                    return Err(CalibrationError::CornerCountMismatch {
                        view,
                        expected,
                        got: corners.len(),
                    });
                }
                if corners.iter().any(|p| !p.x.is_finite() || !p.y.is_finite()) {
                    return Err(CalibrationError::PatternNotFound { view });
                }
                Ok(corners)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_points_vary_x_fastest() {
        let pts = PatternSize::new(3, 2).object_points(2.0);
        assert_eq!(pts.len(), 6);
        assert_eq!(pts[0], Point3::new(0.0, 0.0, 0.0));
        assert_eq!(pts[1], Point3::new(2.0, 0.0, 0.0));
        assert_eq!(pts[3], Point3::new(0.0, 2.0, 0.0));
        assert_eq!(pts[5], Point3::new(4.0, 2.0, 0.0));
    }

    #[test]
    fn missing_corners_report_the_view() {
        let set = ObservationSet::new(
            PatternSize::new(2, 2),
            vec![
                ViewObservation::found(vec![Point2::origin(); 4]),
                ViewObservation::not_found(),
            ],
        );
        let err = set.checked_views().unwrap_err();
        assert!(matches!(err, CalibrationError::PatternNotFound { view: 1 }));
    }

    #[test]
    fn wrong_corner_count_is_rejected() {
        let set = ObservationSet::new(
            PatternSize::new(2, 2),
            vec![ViewObservation::found(vec![Point2::origin(); 3])],
        );
        let err = set.checked_views().unwrap_err();
        assert!(matches!(
            err,
            CalibrationError::CornerCountMismatch {
                view: 0,
                expected: 4,
                got: 3
            }
        ));
    }

    #[test]
    fn json_defaults_match_reference_board() {
        let set: ObservationSet =
            serde_json::from_str(r#"{"views":[{"corners":null}]}"#).expect("parse");
        assert_eq!(set.pattern, PatternSize::new(11, 8));
        assert_eq!(set.square_size, 1.0);
        assert!(set.views[0].corner_points().is_none());
    }

    #[test]
    fn json_round_trips_through_disk() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("obs.json");
        let set = ObservationSet::new(
            PatternSize::new(2, 2),
            vec![ViewObservation::found(vec![
                Point2::new(1.0, 2.0),
                Point2::new(3.0, 4.0),
                Point2::new(5.0, 6.0),
                Point2::new(7.0, 8.0),
            ])],
        );
        set.write_json(&path).expect("write");
        assert_eq!(ObservationSet::load_json(&path).expect("load"), set);
    }
}
