use std::path::PathBuf;

use stroke_overlay::{LayoutVariant, StrokeFont};

fn shipped(variant: LayoutVariant) -> StrokeFont {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../..")
        .join(variant.default_font_path());
    StrokeFont::load_json(&path).expect("shipped font")
}

#[test]
fn shipped_fonts_cover_the_upper_case_alphabet() {
    for variant in LayoutVariant::ALL {
        let font = shipped(variant);
        assert_eq!(font.len(), 26, "{variant}");
        assert!(('A'..='Z').all(|c| font.contains(c)), "{variant}");
        assert!(!font.contains('a'));
    }
}

#[test]
fn on_board_glyphs_lie_in_the_board_plane() {
    let font = shipped(LayoutVariant::OnBoard);
    for ch in font.chars() {
        let glyph = font.glyph_for(ch).expect("glyph");
        assert!(glyph
            .strokes
            .iter()
            .all(|s| s.start.z == 0.0 && s.end.z == 0.0));
    }
}

#[test]
fn vertical_glyphs_stand_towards_the_camera() {
    let font = shipped(LayoutVariant::Vertical);
    for ch in font.chars() {
        let glyph = font.glyph_for(ch).expect("glyph");
        assert!(glyph.strokes.iter().all(|s| s.start.y == 0.0 && s.end.y == 0.0));
        assert!(glyph.strokes.iter().all(|s| s.start.z <= 0.0 && s.end.z <= 0.0));
    }
}

#[test]
fn both_variants_have_matching_stroke_counts() {
    let on_board = shipped(LayoutVariant::OnBoard);
    let vertical = shipped(LayoutVariant::Vertical);
    for ch in on_board.chars() {
        assert_eq!(
            on_board.glyph_for(ch).map(|g| g.stroke_count()),
            vertical.glyph_for(ch).map(|g| g.stroke_count()),
            "{ch}"
        );
    }
}
