use crate::ProjectError;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Anchor positions of the reference demo, in board squares.
///
/// Two rows of three characters, filled right to left in board x.
pub const REFERENCE_SLOTS: [[f64; 2]; 6] = [
    [7.0, 5.0],
    [4.0, 5.0],
    [1.0, 5.0],
    [7.0, 2.0],
    [4.0, 2.0],
    [1.0, 2.0],
];

/// Per-position anchors in the pattern plane.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GlyphLayout {
    slots: Vec<[f64; 2]>,
}

impl Default for GlyphLayout {
    fn default() -> Self {
        Self::reference()
    }
}

impl GlyphLayout {
    pub fn new(slots: Vec<[f64; 2]>) -> Self {
        Self { slots }
    }

    pub fn reference() -> Self {
        Self::new(REFERENCE_SLOTS.to_vec())
    }

    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    pub fn slots(&self) -> &[[f64; 2]] {
        &self.slots
    }

    /// Offset for the character at `position`; `z` is left untouched.
    pub fn anchor(&self, position: usize) -> Option<Vector3<f64>> {
        self.slots
            .get(position)
            .map(|&[x, y]| Vector3::new(x, y, 0.0))
    }

    /// Reject words with more characters than slots.
    pub fn check_fits(&self, len: usize) -> Result<(), ProjectError> {
        if len > self.slots.len() {
            return Err(ProjectError::SlotOverflow {
                len,
                slots: self.slots.len(),
            });
        }
        Ok(())
    }
}

/// Which stroke font and slot set a word is rendered with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum LayoutVariant {
    /// Letters lie flat on the board.
    OnBoard,
    /// Letters stand perpendicular to the board.
    Vertical,
}

impl LayoutVariant {
    pub const ALL: [LayoutVariant; 2] = [LayoutVariant::OnBoard, LayoutVariant::Vertical];

    pub fn name(self) -> &'static str {
        match self {
            LayoutVariant::OnBoard => "on-board",
            LayoutVariant::Vertical => "vertical",
        }
    }

    pub fn default_font_path(self) -> &'static str {
        match self {
            LayoutVariant::OnBoard => "data/fonts/alphabet_lib_onboard.json",
            LayoutVariant::Vertical => "data/fonts/alphabet_lib_vertical.json",
        }
    }
}

impl fmt::Display for LayoutVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
