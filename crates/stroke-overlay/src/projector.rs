//! Word projection: glyph strokes placed on layout slots and pushed through
//! one view's pose.

use crate::{GlyphLayout, ProjectError, StrokeFont, StrokeGlyph};
use nalgebra::Vector3;
use stroke_overlay_calib::CalibrationResult;
use stroke_overlay_core::ProjectedSegment;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Borrowing projector over one font, one layout and one calibration.
///
/// Projection is a pure function of its inputs; the same word and view
/// always give the same segments.
#[derive(Clone, Copy, Debug)]
pub struct WordProjector<'a> {
    font: &'a StrokeFont,
    layout: &'a GlyphLayout,
    calibration: &'a CalibrationResult,
}

impl<'a> WordProjector<'a> {
    pub fn new(
        font: &'a StrokeFont,
        layout: &'a GlyphLayout,
        calibration: &'a CalibrationResult,
    ) -> Self {
        Self {
            font,
            layout,
            calibration,
        }
    }

    pub fn num_views(&self) -> usize {
        self.calibration.num_views()
    }

    /// Project `word` onto view `image_index`.
    ///
    /// Segments come out in glyph order, then stroke order. Any unknown
    /// character, missing slot or bad index fails the whole word.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "debug", skip(self), fields(word = %word))
    )]
    pub fn project(
        &self,
        word: &str,
        image_index: usize,
    ) -> Result<Vec<ProjectedSegment>, ProjectError> {
        let pose =
            self.calibration
                .pose(image_index)
                .ok_or(ProjectError::InvalidImageIndex {
                    index: image_index,
                    available: self.calibration.num_views(),
                })?;
        let camera = &self.calibration.camera;

        let mut segments = Vec::new();
        for (glyph, anchor) in self.placements(word)? {
            segments.extend(glyph.strokes.iter().map(|stroke| {
                let placed = stroke.translated(anchor);
                ProjectedSegment::new(
                    camera.project(pose, &placed.start),
                    camera.project(pose, &placed.end),
                )
            }));
        }
        Ok(segments)
    }

    /// Project `word` onto every view, in pose order.
    pub fn project_all(&self, word: &str) -> Result<Vec<Vec<ProjectedSegment>>, ProjectError> {
        (0..self.num_views())
            .map(|index| self.project(word, index))
            .collect()
    }

    /// Number of segments `project` would return for `word`.
    pub fn stroke_count(&self, word: &str) -> Result<usize, ProjectError> {
        Ok(self
            .placements(word)?
            .iter()
            .map(|(glyph, _)| glyph.stroke_count())
            .sum())
    }

    /// Glyph and slot anchor per character: glyph lookup first, then slot.
    fn placements(&self, word: &str) -> Result<Vec<(&'a StrokeGlyph, Vector3<f64>)>, ProjectError> {
        let len = word.chars().count();
        word.chars()
            .enumerate()
            .map(|(position, ch)| {
                let glyph = self.font.glyph_for(ch)?;
                let anchor = self
                    .layout
                    .anchor(position)
                    .ok_or(ProjectError::SlotOverflow {
                        len,
                        slots: self.layout.slot_count(),
                    })?;
                Ok((glyph, anchor))
            })
            .collect()
    }
}
