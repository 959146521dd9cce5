use crate::config::ConfigIoError;
use stroke_overlay_calib::CalibrationError;

/// Errors from projecting a word onto one view.
///
/// Every variant rejects the whole word; no partial output is produced.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ProjectError {
    #[error("no glyph for {ch:?} in the loaded font")]
    UnknownGlyph { ch: char },
    #[error("word has {len} characters but the layout only has {slots} slots")]
    SlotOverflow { len: usize, slots: usize },
    #[error("image index {index} out of range ({available} poses available)")]
    InvalidImageIndex { index: usize, available: usize },
}

/// Errors from loading a stroke font.
#[derive(thiserror::Error, Debug)]
pub enum FontError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error("font key {key:?} must be exactly one character")]
    InvalidKey { key: String },
    #[error("glyph {key:?}: {reason}")]
    InvalidMatrix { key: String, reason: String },
    #[error("glyph {key:?} has a non-finite coordinate")]
    NonFinite { key: String },
}

/// Errors from the slideshow display.
#[derive(thiserror::Error, Debug)]
pub enum SlideshowError {
    #[error("a slideshow needs at least one frame")]
    EmptySlideshow,
    #[error("display surface is already closed")]
    Closed,
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Image(#[from] image::ImageError),
}

/// Application-level errors: startup failures and rejected actions.
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Calibration(#[from] CalibrationError),
    #[error(transparent)]
    Font(#[from] FontError),
    #[error(transparent)]
    Project(#[from] ProjectError),
    #[error(transparent)]
    Slideshow(#[from] SlideshowError),
    #[error(transparent)]
    Config(#[from] ConfigIoError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("failed to load image {path}: {source}")]
    ImageLoad {
        path: String,
        #[source]
        source: image::ImageError,
    },
    #[error("reference image {path} is {got:?}, expected {expected:?}")]
    ImageSizeMismatch {
        path: String,
        expected: [u32; 2],
        got: [u32; 2],
    },
    #[error("calibration has {poses} poses but {images} reference images were loaded")]
    PoseCountMismatch { poses: usize, images: usize },
    #[error("config must set either `calibration_path` or `observations_path`")]
    MissingCalibrationSource,
    #[error("no reference images configured")]
    NoImages,
}
