//! Chessboard corners from reference images, found with `calib-targets`.
//!
//! Only complete boards are accepted: a view whose labelled grid does not
//! cover every inner corner of the pattern is kept as "not found".

use crate::{CalibrationError, ObservationSet, PatternSize, ViewObservation};
use calib_targets::chessboard::ChessboardParams;
use calib_targets::detect;
use image::GrayImage;
use nalgebra::Point2;
use std::path::Path;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Detector settings expecting `pattern` inner corners.
pub fn chessboard_params(pattern: PatternSize) -> ChessboardParams {
    ChessboardParams {
        expected_rows: Some(pattern.rows),
        expected_cols: Some(pattern.cols),
        ..ChessboardParams::default()
    }
}

/// Put grid-labelled corners in object-point order (`x` fastest).
///
/// The labels must span exactly `pattern`, possibly with rows and columns
/// swapped, and every grid cell must be present.
pub fn order_grid_corners<I>(labelled: I, pattern: PatternSize) -> Option<Vec<Point2<f64>>>
where
    I: IntoIterator<Item = ([i32; 2], Point2<f64>)>,
{
    let labelled: Vec<_> = labelled.into_iter().collect();
    let (min_i, max_i) = bounds(labelled.iter().map(|(g, _)| g[0]))?;
    let (min_j, max_j) = bounds(labelled.iter().map(|(g, _)| g[1]))?;

    let cols = i32::try_from(pattern.cols).ok()?;
    let rows = i32::try_from(pattern.rows).ok()?;
    let span = (max_i - min_i + 1, max_j - min_j + 1);
    let transposed = if span == (cols, rows) {
        false
    } else if span == (rows, cols) {
        true
    } else {
        return None;
    };

    let mut cells = vec![None; pattern.corner_count()];
    for ([i, j], position) in labelled {
        let (x, y) = if transposed {
            (j - min_j, i - min_i)
        } else {
            (i - min_i, j - min_j)
        };
        cells[(y * cols + x) as usize] = Some(position);
    }
    cells.into_iter().collect()
}

fn bounds(values: impl Iterator<Item = i32>) -> Option<(i32, i32)> {
    values.fold(None, |acc, v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    })
}

/// Find the board in one grayscale image.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "debug", skip(image), fields(width = image.width(), height = image.height()))
)]
pub fn detect_view(image: &GrayImage, pattern: PatternSize) -> ViewObservation {
    let chess_cfg = detect::default_chess_config();
    let corners = detect::detect_chessboard(image, &chess_cfg, chessboard_params(pattern))
        .and_then(|found| {
            let labelled = found.detection.corners.iter().filter_map(|c| {
                c.grid.map(|g| {
                    let position = Point2::new(f64::from(c.position.x), f64::from(c.position.y));
                    ([g.i, g.j], position)
                })
            });
            order_grid_corners(labelled, pattern)
        });
    match corners {
        Some(corners) => ViewObservation::found(corners),
        None => ViewObservation::not_found(),
    }
}

impl ObservationSet {
    /// Detect the board in every image, in view order.
    ///
    /// Views where the board is not found stay in the set with
    /// `corners: None`; calibration rejects them later.
    pub fn detect_images(images: &[GrayImage], pattern: PatternSize) -> Result<Self, CalibrationError> {
        pattern.validate()?;
        let views: Vec<ViewObservation> = images
            .iter()
            .enumerate()
            .map(|(index, image)| {
                let view = detect_view(image, pattern);
                if view.corners.is_none() {
                    log::warn!("chessboard {}x{} not found in view {index}", pattern.cols, pattern.rows);
                }
                view
            })
            .collect();
        log::info!(
            "chessboard found in {}/{} views",
            views.iter().filter(|v| v.corners.is_some()).count(),
            views.len()
        );
        Ok(Self {
            image_size: images.first().map(|image| [image.width(), image.height()]),
            ..Self::new(pattern, views)
        })
    }

    /// Load each image from disk and detect the board in it.
    pub fn detect<P: AsRef<Path>>(paths: &[P], pattern: PatternSize) -> Result<Self, CalibrationError> {
        let images = paths
            .iter()
            .map(|path| {
                let path = path.as_ref();
                image::open(path)
                    .map(|image| image.to_luma8())
                    .map_err(|source| CalibrationError::ImageLoad {
                        path: path.display().to_string(),
                        source,
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut set = Self::detect_images(&images, pattern)?;
        for (view, path) in set.views.iter_mut().zip(paths) {
            view.image_path = Some(path.as_ref().display().to_string());
        }
        Ok(set)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    fn labelled_grid(cols: i32, rows: i32, offset: [i32; 2]) -> Vec<([i32; 2], Point2<f64>)> {
        (0..rows)
            .flat_map(|j| {
                (0..cols).map(move |i| {
                    (
                        [i + offset[0], j + offset[1]],
                        Point2::new(10.0 * f64::from(i), 20.0 * f64::from(j)),
                    )
                })
            })
            .collect()
    }

    #[test]
    fn grid_labels_map_to_object_order() {
        let mut labelled = labelled_grid(3, 2, [5, -1]);
        labelled.reverse();
        let corners = order_grid_corners(labelled, PatternSize::new(3, 2)).expect("complete");
        assert_eq!(corners.len(), 6);
        assert_eq!(corners[1], Point2::new(10.0, 0.0));
        assert_eq!(corners[3], Point2::new(0.0, 20.0));
        assert_eq!(corners[5], Point2::new(20.0, 20.0));
    }

    #[test]
    fn swapped_grid_axes_are_transposed() {
        // labels run 2 wide and 3 tall for a 3x2 pattern
        let labelled = labelled_grid(2, 3, [0, 0]);
        let corners = order_grid_corners(labelled, PatternSize::new(3, 2)).expect("transposed");
        assert_eq!(corners[1], Point2::new(0.0, 20.0));
        assert_eq!(corners[3], Point2::new(10.0, 0.0));
    }

    #[test]
    fn incomplete_or_wrong_sized_grids_are_not_found() {
        let mut labelled = labelled_grid(3, 2, [0, 0]);
        labelled.remove(4);
        assert!(order_grid_corners(labelled, PatternSize::new(3, 2)).is_none());
        assert!(order_grid_corners(labelled_grid(4, 2, [0, 0]), PatternSize::new(3, 2)).is_none());
        assert!(order_grid_corners(Vec::new(), PatternSize::new(3, 2)).is_none());
    }

    #[test]
    fn blank_image_has_no_board() {
        let blank = GrayImage::from_pixel(160, 120, Luma([128]));
        let set = ObservationSet::detect_images(&[blank], PatternSize::default()).expect("detect");
        assert_eq!(set.views.len(), 1);
        assert!(set.views[0].corners.is_none());
        assert_eq!(set.image_size, Some([160, 120]));
    }

    #[test]
    fn images_are_read_from_disk_in_order() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("board.png");
        GrayImage::from_pixel(64, 48, Luma([255])).save(&path).expect("save");

        let set = ObservationSet::detect(&[&path], PatternSize::default()).expect("detect");
        assert_eq!(set.views[0].image_path.as_deref(), Some(path.display().to_string().as_str()));

        let missing = dir.path().join("missing.png");
        assert!(matches!(
            ObservationSet::detect(&[missing], PatternSize::default()),
            Err(CalibrationError::ImageLoad { .. })
        ));
    }
}
