//! Stroke lettering projected onto calibrated chessboard images.
//!
//! A word is spelled with a 3-D stroke font, each character placed on a slot
//! of the board plane, and every stroke is projected into each calibrated
//! view. The annotated copies of the reference images are then played as a
//! timed slideshow.
//!
//! ## Quickstart
//!
//! ```no_run
//! use stroke_overlay::{AppConfig, DirectorySurface, LayoutVariant, OverlayApp, SlideshowHost};
//!
//! let config = AppConfig::load_json("demo_config.json")?;
//! let app = OverlayApp::from_config(&config)?;
//!
//! let out_dir = config.output_dir();
//! let display = config.display;
//! let mut host = SlideshowHost::new(move || DirectorySurface::create(&out_dir, display));
//! app.show_word(LayoutVariant::OnBoard, "OPENCV", &mut host)?;
//! host.run_to_end()?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Crates
//!
//! - `stroke-overlay-core`: camera model, homography, segments, logging.
//! - `stroke-overlay-calib`: planar calibration from chessboard corners.
//! - `stroke-overlay` (this crate): fonts, layouts, projection, rendering,
//!   slideshow, the interactive session and the `stroke-overlay` binary.

mod app;
mod config;
mod error;
mod font;
mod layout;
mod projector;
mod render;
mod session;
mod slideshow;

pub use app::{OverlayApp, VariantAssets};
pub use config::{AppConfig, ConfigIoError, VariantConfig};
pub use error::{AppError, FontError, ProjectError, SlideshowError};
pub use font::{StrokeFont, StrokeGlyph};
pub use layout::{GlyphLayout, LayoutVariant, REFERENCE_SLOTS};
pub use projector::WordProjector;
pub use render::{draw_segments, RenderStyle};
pub use session::{run_session, SessionSummary, Submission};
pub use slideshow::{
    fit_to_display, DirectorySurface, DisplaySize, DisplaySurface, Frame, Slideshow,
    SlideshowHost,
};

pub use stroke_overlay_calib as calib;
pub use stroke_overlay_core as core;
