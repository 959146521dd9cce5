//! Draw projected segments onto a copy of a reference image.

use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_line_segment_mut, draw_polygon_mut};
use imageproc::point::Point;
use serde::{Deserialize, Serialize};
use stroke_overlay_core::ProjectedSegment;

/// Endpoints further than this from the origin are not drawn.
const MAX_PIXEL_COORD: f64 = 1.0e6;

/// Stroke color and width used for every segment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderStyle {
    /// RGB stroke color.
    pub color: [u8; 3],
    /// Stroke width in pixels.
    pub thickness: u32,
}

impl Default for RenderStyle {
    fn default() -> Self {
        Self {
            color: [255, 0, 0],
            thickness: 15,
        }
    }
}

/// Return a copy of `base` with every segment drawn over it.
///
/// Segments partially or fully outside the image are clipped; `base` is
/// never modified.
pub fn draw_segments(
    base: &RgbImage,
    segments: &[ProjectedSegment],
    style: &RenderStyle,
) -> RgbImage {
    let mut out = base.clone();
    let mut skipped = 0usize;
    for seg in segments {
        if !drawable(seg) {
            skipped += 1;
            continue;
        }
        draw_thick_segment(&mut out, seg, style);
    }
    if skipped > 0 {
        log::debug!("skipped {skipped} segments with unusable endpoints");
    }
    out
}

fn drawable(seg: &ProjectedSegment) -> bool {
    [seg.start.x, seg.start.y, seg.end.x, seg.end.y]
        .iter()
        .all(|v| v.is_finite() && v.abs() < MAX_PIXEL_COORD)
}

fn draw_thick_segment(img: &mut RgbImage, seg: &ProjectedSegment, style: &RenderStyle) {
    let color = Rgb(style.color);
    let (x0, y0) = (seg.start.x as f32, seg.start.y as f32);
    let (x1, y1) = (seg.end.x as f32, seg.end.y as f32);

    if style.thickness <= 1 {
        draw_line_segment_mut(img, (x0, y0), (x1, y1), color);
        return;
    }

    let half = style.thickness as f32 / 2.0;
    let radius = half.round() as i32;
    draw_filled_circle_mut(img, (x0.round() as i32, y0.round() as i32), radius, color);
    draw_filled_circle_mut(img, (x1.round() as i32, y1.round() as i32), radius, color);

    let (dx, dy) = (x1 - x0, y1 - y0);
    let len = dx.hypot(dy);
    if len < 1.0 {
        return;
    }
    // offset to the stroke edge, perpendicular to the segment
    let (nx, ny) = (-dy / len * half, dx / len * half);
    let corner = |x: f32, y: f32| Point::new(x.round() as i32, y.round() as i32);
    let quad = [
        corner(x0 + nx, y0 + ny),
        corner(x1 + nx, y1 + ny),
        corner(x1 - nx, y1 - ny),
        corner(x0 - nx, y0 - ny),
    ];
    if quad[0] != quad[3] {
        draw_polygon_mut(img, &quad, color);
    }
}
