//! Stroke fonts: characters drawn as 3-D line segments.
//!
//! A font file is a JSON object keyed by single characters. A glyph is
//! either a plain list of segments
//!
//! ```json
//! { "L": [[[0, 0, 0], [0, 2, 0]], [[0, 2, 0], [1, 2, 0]]] }
//! ```
//!
//! or an OpenCV `FileStorage` matrix with one row per segment and two 3-channel
//! points per row:
//!
//! ```json
//! { "L": { "type_id": "opencv-matrix", "rows": 2, "cols": 2, "dt": "3f",
//!          "data": [0, 0, 0, 0, 2, 0, 0, 2, 0, 1, 2, 0] } }
//! ```
//!
//! Everything is validated when the file is loaded.

use crate::{FontError, ProjectError};
use serde::Deserialize;
use std::{collections::BTreeMap, fs, path::Path};
use stroke_overlay_core::Segment3;

/// Values per segment: two points with three coordinates each.
const SEGMENT_LEN: usize = 6;

/// A character's pen strokes in glyph-local coordinates.
#[derive(Clone, Debug, PartialEq)]
pub struct StrokeGlyph {
    pub ch: char,
    pub strokes: Vec<Segment3>,
}

impl StrokeGlyph {
    pub fn stroke_count(&self) -> usize {
        self.strokes.len()
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum GlyphSource {
    Segments(Vec<[[f64; 3]; 2]>),
    Matrix(OpenCvMatrix),
}

#[derive(Debug, Deserialize)]
struct OpenCvMatrix {
    type_id: String,
    rows: usize,
    cols: usize,
    dt: String,
    data: Vec<f64>,
}

impl OpenCvMatrix {
    /// Parse `dt` strings such as `"3f"`, `"d"` or `"3i"` into a channel count.
    fn channels(&self) -> Option<usize> {
        let (last, _) = self.dt.char_indices().last()?;
        let (digits, kind) = self.dt.split_at(last);
        if !matches!(kind, "f" | "d" | "i" | "s" | "w" | "u" | "c") {
            return None;
        }
        if digits.is_empty() {
            Some(1)
        } else {
            digits.parse().ok().filter(|&c: &usize| c > 0)
        }
    }

    fn into_segments(self, key: &str) -> Result<Vec<Segment3>, FontError> {
        let invalid = |reason: String| FontError::InvalidMatrix {
            key: key.to_owned(),
            reason,
        };

        if self.type_id != "opencv-matrix" {
            return Err(invalid(format!("unsupported type_id {:?}", self.type_id)));
        }
        let channels = self
            .channels()
            .ok_or_else(|| invalid(format!("unsupported dt {:?}", self.dt)))?;
        if self.cols * channels != SEGMENT_LEN {
            return Err(invalid(format!(
                "expected {SEGMENT_LEN} values per row, got {}x{}",
                self.cols, channels
            )));
        }
        if self.data.len() != self.rows * SEGMENT_LEN {
            return Err(invalid(format!(
                "expected {} values for {} rows, got {}",
                self.rows * SEGMENT_LEN,
                self.rows,
                self.data.len()
            )));
        }

        Ok(self
            .data
            .chunks_exact(SEGMENT_LEN)
            .map(|c| Segment3::from_arrays([c[0], c[1], c[2]], [c[3], c[4], c[5]]))
            .collect())
    }
}

/// Typed `char -> StrokeGlyph` map for one layout variant.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StrokeFont {
    glyphs: BTreeMap<char, StrokeGlyph>,
}

impl StrokeFont {
    /// Build a font from in-memory glyph definitions.
    pub fn from_glyphs<I>(glyphs: I) -> Result<Self, FontError>
    where
        I: IntoIterator<Item = (char, Vec<Segment3>)>,
    {
        let mut map = BTreeMap::new();
        for (ch, strokes) in glyphs {
            if strokes.iter().any(|s| !s.is_finite()) {
                return Err(FontError::NonFinite { key: ch.to_string() });
            }
            map.insert(ch, StrokeGlyph { ch, strokes });
        }
        Ok(Self { glyphs: map })
    }

    /// Parse and validate a JSON font.
    pub fn from_json_str(raw: &str) -> Result<Self, FontError> {
        let sources: BTreeMap<String, GlyphSource> = serde_json::from_str(raw)?;
        let mut glyphs = Vec::with_capacity(sources.len());
        for (key, source) in sources {
            let mut chars = key.chars();
            let ch = match (chars.next(), chars.next()) {
                (Some(ch), None) => ch,
                _ => return Err(FontError::InvalidKey { key }),
            };
            let strokes = match source {
                GlyphSource::Segments(segments) => segments
                    .into_iter()
                    .map(|[a, b]| Segment3::from_arrays(a, b))
                    .collect(),
                GlyphSource::Matrix(m) => m.into_segments(&key)?,
            };
            glyphs.push((ch, strokes));
        }
        Self::from_glyphs(glyphs)
    }

    /// Load a JSON font from disk.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, FontError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)?;
        let font = Self::from_json_str(&raw)?;
        log::debug!("loaded {} glyphs from {}", font.len(), path.display());
        Ok(font)
    }

    /// Case-sensitive glyph lookup.
    pub fn glyph_for(&self, ch: char) -> Result<&StrokeGlyph, ProjectError> {
        self.glyphs.get(&ch).ok_or(ProjectError::UnknownGlyph { ch })
    }

    pub fn contains(&self, ch: char) -> bool {
        self.glyphs.contains_key(&ch)
    }

    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }

    pub fn chars(&self) -> impl Iterator<Item = char> + '_ {
        self.glyphs.keys().copied()
    }
}
