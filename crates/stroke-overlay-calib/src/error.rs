/// Errors returned while calibrating or loading calibration data.
#[derive(thiserror::Error, Debug)]
pub enum CalibrationError {
    #[error("invalid pattern size {cols}x{rows} (need at least 2x2 inner corners)")]
    InvalidPattern { cols: u32, rows: u32 },
    #[error("chessboard pattern not found in view {view}")]
    PatternNotFound { view: usize },
    #[error("view {view}: expected {expected} corners, got {got}")]
    CornerCountMismatch {
        view: usize,
        expected: usize,
        got: usize,
    },
    #[error("need at least {required} views for calibration, got {got}")]
    NotEnoughViews { required: usize, got: usize },
    #[error("homography estimation failed for view {view}")]
    HomographyFailed { view: usize },
    #[error("degenerate view configuration: {0}")]
    Degenerate(&'static str),
    #[error("calibration did not converge (rms = {rms:.4} px)")]
    NotConverged { rms: f64 },
    #[cfg(feature = "detect")]
    #[error("failed to load image {path}: {source}")]
    ImageLoad {
        path: String,
        #[source]
        source: image::ImageError,
    },
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
