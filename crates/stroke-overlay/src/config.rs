//! JSON configuration for the overlay application.

use crate::{DisplaySize, GlyphLayout, LayoutVariant, RenderStyle};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};
use stroke_overlay_calib::{PatternSize, PlanarCalibrationParams};

#[derive(thiserror::Error, Debug)]
pub enum ConfigIoError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

fn default_images() -> Vec<String> {
    (1..=5).map(|i| format!("chessboards/{i}.bmp")).collect()
}

fn default_word() -> String {
    "OPENCV".to_owned()
}

fn default_interval_ms() -> u64 {
    1000
}

fn default_output_dir() -> String {
    "frames".to_owned()
}

/// Font file and slot set for one layout variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariantConfig {
    pub font_path: String,
    #[serde(default)]
    pub slots: GlyphLayout,
}

impl VariantConfig {
    pub fn for_variant(variant: LayoutVariant) -> Self {
        Self {
            font_path: variant.default_font_path().to_owned(),
            slots: GlyphLayout::reference(),
        }
    }
}

fn default_on_board() -> VariantConfig {
    VariantConfig::for_variant(LayoutVariant::OnBoard)
}

fn default_vertical() -> VariantConfig {
    VariantConfig::for_variant(LayoutVariant::Vertical)
}

/// Application configuration.
///
/// Relative paths are resolved against the directory of the config file
/// when loaded with [`AppConfig::load_json`], and against the working
/// directory otherwise.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Reference images, one per calibration view, in view order.
    #[serde(default = "default_images")]
    pub images: Vec<String>,
    /// Stored calibration result. Takes precedence over `observations_path`.
    #[serde(default)]
    pub calibration_path: Option<String>,
    /// Corner observations to calibrate from at startup. Without this or
    /// `calibration_path` the board is detected in `images`.
    #[serde(default)]
    pub observations_path: Option<String>,
    /// Inner corners of the board in the reference images.
    #[serde(default)]
    pub pattern: PatternSize,
    #[serde(default)]
    pub calibration: PlanarCalibrationParams,
    #[serde(default = "default_on_board")]
    pub on_board: VariantConfig,
    #[serde(default = "default_vertical")]
    pub vertical: VariantConfig,
    /// Word shown by `show` when none is given.
    #[serde(default = "default_word")]
    pub word: String,
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
    #[serde(default)]
    pub display: DisplaySize,
    #[serde(default)]
    pub style: RenderStyle,
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
    #[serde(skip)]
    base_dir: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            images: default_images(),
            calibration_path: None,
            observations_path: None,
            pattern: PatternSize::default(),
            calibration: PlanarCalibrationParams::default(),
            on_board: default_on_board(),
            vertical: default_vertical(),
            word: default_word(),
            interval_ms: default_interval_ms(),
            display: DisplaySize::default(),
            style: RenderStyle::default(),
            output_dir: default_output_dir(),
            base_dir: None,
        }
    }
}

impl AppConfig {
    /// Load a JSON config from disk.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, ConfigIoError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)?;
        let mut config: Self = serde_json::from_str(&raw)?;
        config.base_dir = path.parent().map(Path::to_path_buf);
        Ok(config)
    }

    /// Write this config to disk as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), ConfigIoError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Resolve a config-relative path.
    pub fn resolve(&self, path: impl AsRef<Path>) -> PathBuf {
        let path = path.as_ref();
        match &self.base_dir {
            Some(base) if path.is_relative() => base.join(path),
            _ => path.to_path_buf(),
        }
    }

    pub fn variant(&self, variant: LayoutVariant) -> &VariantConfig {
        match variant {
            LayoutVariant::OnBoard => &self.on_board,
            LayoutVariant::Vertical => &self.vertical,
        }
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    pub fn output_dir(&self) -> PathBuf {
        self.resolve(&self.output_dir)
    }
}
