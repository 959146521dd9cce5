//! Core types and utilities for stroke overlays on calibrated images.
//!
//! This crate is intentionally small and purely geometric. It does *not*
//! depend on any image type, font format or calibration routine.

mod camera;
mod homography;
mod logger;
mod segment;

pub use camera::{CameraModel, Distortion, Intrinsics, Pose};
pub use homography::{estimate_homography, Homography};
pub use segment::{ProjectedSegment, Segment3};

#[cfg(feature = "tracing")]
pub use logger::init_tracing;

pub use logger::{init_with_level, level_for_verbosity};
