//! Application state: calibration, reference images and both fonts, loaded
//! once at startup and read-only afterwards.

use crate::{
    draw_segments, AppConfig, AppError, DisplaySurface, GlyphLayout, LayoutVariant,
    RenderStyle, SlideshowHost, StrokeFont, WordProjector,
};
use image::RgbImage;
use std::time::Duration;
use stroke_overlay_calib::{
    CalibrationProvider, CalibrationResult, ObservationSet, PlanarCalibrator,
};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Font and slot set for one layout variant.
#[derive(Clone, Debug)]
pub struct VariantAssets {
    pub font: StrokeFont,
    pub layout: GlyphLayout,
}

/// Loaded overlay application.
#[derive(Debug)]
pub struct OverlayApp {
    calibration: CalibrationResult,
    images: Vec<RgbImage>,
    on_board: VariantAssets,
    vertical: VariantAssets,
    style: RenderStyle,
    interval: Duration,
}

impl OverlayApp {
    /// Assemble an app from already loaded parts.
    ///
    /// Image `i` must be the view whose pose is `calibration.poses[i]`.
    pub fn new(
        calibration: CalibrationResult,
        images: Vec<RgbImage>,
        on_board: VariantAssets,
        vertical: VariantAssets,
    ) -> Result<Self, AppError> {
        if images.is_empty() {
            return Err(AppError::NoImages);
        }
        if calibration.num_views() != images.len() {
            return Err(AppError::PoseCountMismatch {
                poses: calibration.num_views(),
                images: images.len(),
            });
        }
        Ok(Self {
            calibration,
            images,
            on_board,
            vertical,
            style: RenderStyle::default(),
            interval: Duration::from_millis(1000),
        })
    }

    pub fn with_style(mut self, style: RenderStyle) -> Self {
        self.style = style;
        self
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Startup: images, calibration and both fonts. Any failure is fatal.
    #[cfg_attr(feature = "tracing", instrument(level = "info", skip(config)))]
    pub fn from_config(config: &AppConfig) -> Result<Self, AppError> {
        let images = load_images(config)?;
        let calibration = load_calibration(config, &images)?;

        if let Some(expected) = calibration.image_size {
            let got = [images[0].width(), images[0].height()];
            if got != expected {
                return Err(AppError::ImageSizeMismatch {
                    path: config.images[0].clone(),
                    expected,
                    got,
                });
            }
        }

        let on_board = load_variant(config, LayoutVariant::OnBoard)?;
        let vertical = load_variant(config, LayoutVariant::Vertical)?;
        log::info!(
            "loaded {} images, {} + {} glyphs, rms {:.3}px",
            images.len(),
            on_board.font.len(),
            vertical.font.len(),
            calibration.rms_error
        );

        Ok(Self::new(calibration, images, on_board, vertical)?
            .with_style(config.style)
            .with_interval(config.interval()))
    }

    pub fn calibration(&self) -> &CalibrationResult {
        &self.calibration
    }

    pub fn images(&self) -> &[RgbImage] {
        &self.images
    }

    pub fn style(&self) -> &RenderStyle {
        &self.style
    }

    pub fn assets(&self, variant: LayoutVariant) -> &VariantAssets {
        match variant {
            LayoutVariant::OnBoard => &self.on_board,
            LayoutVariant::Vertical => &self.vertical,
        }
    }

    pub fn projector(&self, variant: LayoutVariant) -> WordProjector<'_> {
        let assets = self.assets(variant);
        WordProjector::new(&assets.font, &assets.layout, &self.calibration)
    }

    /// One annotated copy of every reference image, in view order.
    ///
    /// Fails without rendering anything if the word cannot be projected.
    pub fn render_word(&self, variant: LayoutVariant, word: &str) -> Result<Vec<RgbImage>, AppError> {
        let projected = self.projector(variant).project_all(word)?;
        Ok(self
            .images
            .iter()
            .zip(&projected)
            .map(|(image, segments)| draw_segments(image, segments, &self.style))
            .collect())
    }

    /// Render `word` and start a slideshow of the result on `host`.
    ///
    /// A rejected word leaves whatever `host` was showing untouched.
    pub fn show_word<S: DisplaySurface>(
        &self,
        variant: LayoutVariant,
        word: &str,
        host: &mut SlideshowHost<S>,
    ) -> Result<(), AppError> {
        let frames = self.render_word(variant, word)?;
        log::info!("showing {word:?} ({variant}) over {} frames", frames.len());
        host.start(frames, self.interval)?;
        Ok(())
    }
}

fn load_images(config: &AppConfig) -> Result<Vec<RgbImage>, AppError> {
    if config.images.is_empty() {
        return Err(AppError::NoImages);
    }
    let mut images: Vec<RgbImage> = Vec::with_capacity(config.images.len());
    for raw in &config.images {
        let path = config.resolve(raw);
        let image = image::open(&path)
            .map_err(|source| AppError::ImageLoad {
                path: path.display().to_string(),
                source,
            })?
            .to_rgb8();
        if let Some(first) = images.first() {
            if image.dimensions() != first.dimensions() {
                return Err(AppError::ImageSizeMismatch {
                    path: raw.clone(),
                    expected: [first.width(), first.height()],
                    got: [image.width(), image.height()],
                });
            }
        }
        images.push(image);
    }
    Ok(images)
}

/// Stored result first, then a corner file, then detection in the images.
fn load_calibration(config: &AppConfig, images: &[RgbImage]) -> Result<CalibrationResult, AppError> {
    if let Some(path) = &config.calibration_path {
        let path = config.resolve(path);
        log::debug!("loading calibration from {}", path.display());
        return Ok(CalibrationResult::load_json(path)?);
    }
    let observations = match &config.observations_path {
        Some(path) => ObservationSet::load_json(config.resolve(path))?,
        None => detect_observations(config, images)?,
    };
    let calibrator = PlanarCalibrator::new(config.calibration.clone());
    Ok(calibrator.calibrate(&observations)?)
}

#[cfg(feature = "detect")]
fn detect_observations(config: &AppConfig, images: &[RgbImage]) -> Result<ObservationSet, AppError> {
    log::info!(
        "detecting {}x{} chessboard in {} reference images",
        config.pattern.cols,
        config.pattern.rows,
        images.len()
    );
    let gray: Vec<_> = images.iter().map(image::imageops::grayscale).collect();
    let mut observations = ObservationSet::detect_images(&gray, config.pattern)?;
    for (view, path) in observations.views.iter_mut().zip(&config.images) {
        view.image_path = Some(path.clone());
    }
    Ok(observations)
}

#[cfg(not(feature = "detect"))]
fn detect_observations(_config: &AppConfig, _images: &[RgbImage]) -> Result<ObservationSet, AppError> {
    Err(AppError::MissingCalibrationSource)
}

fn load_variant(config: &AppConfig, variant: LayoutVariant) -> Result<VariantAssets, AppError> {
    let settings = config.variant(variant);
    let font = StrokeFont::load_json(config.resolve(&settings.font_path))?;
    Ok(VariantAssets {
        font,
        layout: settings.slots.clone(),
    })
}
