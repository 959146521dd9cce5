use approx::assert_relative_eq;
use nalgebra::{Point2, Point3};
use stroke_overlay::calib::{
    synthetic, CalibrationProvider, CalibrationResult, PatternSize, PlanarCalibrator,
};
use stroke_overlay::core::{CameraModel, Intrinsics, Pose, Segment3};
use stroke_overlay::{GlyphLayout, ProjectError, StrokeFont, WordProjector};

fn seg(a: [f64; 3], b: [f64; 3]) -> Segment3 {
    Segment3::from_arrays(a, b)
}

/// Small block alphabet: every glyph fits in a 2x2 cell.
fn block_font() -> StrokeFont {
    StrokeFont::from_glyphs([
        ('O', vec![seg([0.0, 0.0, 0.0], [1.0, 0.0, 0.0])]),
        (
            'P',
            vec![
                seg([0.0, 0.0, 0.0], [0.0, 2.0, 0.0]),
                seg([0.0, 0.0, 0.0], [1.0, 0.0, 0.0]),
                seg([1.0, 0.0, 0.0], [1.0, 1.0, 0.0]),
                seg([1.0, 1.0, 0.0], [0.0, 1.0, 0.0]),
            ],
        ),
        (
            'E',
            vec![
                seg([0.0, 0.0, 0.0], [0.0, 2.0, 0.0]),
                seg([0.0, 0.0, 0.0], [1.0, 0.0, 0.0]),
                seg([0.0, 1.0, 0.0], [1.0, 1.0, 0.0]),
                seg([0.0, 2.0, 0.0], [1.0, 2.0, 0.0]),
            ],
        ),
        (
            'N',
            vec![
                seg([0.0, 0.0, 0.0], [0.0, 2.0, 0.0]),
                seg([0.0, 0.0, 0.0], [1.0, 2.0, 0.0]),
                seg([1.0, 0.0, 0.0], [1.0, 2.0, 0.0]),
            ],
        ),
        (
            'I',
            vec![seg([0.5, 0.0, -1.0], [0.5, 0.0, 0.0])],
        ),
    ])
    .expect("font")
}

fn scale_offset_camera() -> CameraModel {
    CameraModel::pinhole(Intrinsics {
        fx: 10.0,
        fy: 10.0,
        cx: 3.0,
        cy: -2.0,
        skew: 0.0,
    })
}

fn synthetic_calibration() -> CalibrationResult {
    let camera = CameraModel::pinhole(synthetic::reference_intrinsics());
    CalibrationResult::new(camera, synthetic::reference_poses())
}

#[test]
fn single_glyph_on_identity_pose() {
    let font = block_font();
    let layout = GlyphLayout::reference();
    let camera = scale_offset_camera();
    let calib = CalibrationResult::new(camera, vec![Pose::identity()]);

    let segments = WordProjector::new(&font, &layout, &calib)
        .project("O", 0)
        .expect("project");

    assert_eq!(segments.len(), 1);
    let pose = Pose::identity();
    let expected_start = camera.project(&pose, &Point3::new(7.0, 5.0, 0.0));
    let expected_end = camera.project(&pose, &Point3::new(8.0, 5.0, 0.0));
    assert_relative_eq!(segments[0].start, expected_start);
    assert_relative_eq!(segments[0].end, expected_end);
    assert_relative_eq!(segments[0].start, Point2::new(73.0, 48.0));
    assert_relative_eq!(segments[0].end, Point2::new(83.0, 48.0));
}

#[test]
fn segment_count_is_the_sum_of_stroke_counts() {
    let font = block_font();
    let layout = GlyphLayout::reference();
    let calib = synthetic_calibration();
    let projector = WordProjector::new(&font, &layout, &calib);

    for word in ["", "O", "OP", "OPEN", "NONE", "PEOPIN", "IIIIII"] {
        let expected: usize = word
            .chars()
            .map(|c| font.glyph_for(c).expect("glyph").stroke_count())
            .sum();
        for view in 0..calib.num_views() {
            let segments = projector.project(word, view).expect("project");
            assert_eq!(segments.len(), expected, "word {word:?} view {view}");
        }
        assert_eq!(projector.stroke_count(word), Ok(expected));
    }
}

#[test]
fn empty_word_is_empty_for_every_view() {
    let font = block_font();
    let layout = GlyphLayout::reference();
    let calib = synthetic_calibration();
    let projector = WordProjector::new(&font, &layout, &calib);

    let all = projector.project_all("").expect("project");
    assert_eq!(all.len(), 5);
    assert!(all.iter().all(Vec::is_empty));
}

#[test]
fn projection_is_deterministic() {
    let font = block_font();
    let layout = GlyphLayout::reference();
    let calib = synthetic_calibration();
    let projector = WordProjector::new(&font, &layout, &calib);

    let first = projector.project("OPEN", 3).expect("first");
    let second = projector.project("OPEN", 3).expect("second");
    assert_eq!(first, second);
}

#[test]
fn repeated_characters_share_one_glyph() {
    let font = block_font();
    let layout = GlyphLayout::reference();
    let calib = CalibrationResult::new(scale_offset_camera(), vec![Pose::identity()]);
    let projector = WordProjector::new(&font, &layout, &calib);

    let segments = projector.project("OO", 0).expect("project");
    assert_eq!(segments.len(), 2);
    assert_relative_eq!(segments[0].length(), segments[1].length());
    // slot 1 sits three squares left of slot 0
    assert_relative_eq!(segments[0].start - segments[1].start, nalgebra::Vector2::new(30.0, 0.0));
}

#[test]
fn unknown_character_rejects_the_whole_word() {
    let font = block_font();
    let layout = GlyphLayout::reference();
    let calib = synthetic_calibration();
    let projector = WordProjector::new(&font, &layout, &calib);

    assert_eq!(
        projector.project("OPXN", 0),
        Err(ProjectError::UnknownGlyph { ch: 'X' })
    );
    assert_eq!(
        projector.project("open", 0),
        Err(ProjectError::UnknownGlyph { ch: 'o' })
    );
    assert!(projector.project_all("NOPE?").is_err());
}

#[test]
fn too_long_word_overflows_the_slots() {
    let font = block_font();
    let layout = GlyphLayout::reference();
    let calib = synthetic_calibration();
    let projector = WordProjector::new(&font, &layout, &calib);

    assert_eq!(
        projector.project("OPENNOP", 0),
        Err(ProjectError::SlotOverflow { len: 7, slots: 6 })
    );
    assert_eq!(
        projector.stroke_count("OPENNOP"),
        Err(ProjectError::SlotOverflow { len: 7, slots: 6 })
    );
}

#[test]
fn out_of_range_view_is_rejected() {
    let font = block_font();
    let layout = GlyphLayout::reference();
    let calib = synthetic_calibration();
    let projector = WordProjector::new(&font, &layout, &calib);

    assert_eq!(
        projector.project("O", 5),
        Err(ProjectError::InvalidImageIndex {
            index: 5,
            available: 5
        })
    );
}

#[test]
fn layout_variants_place_the_same_glyphs_differently() {
    let font = block_font();
    let on_board = GlyphLayout::reference();
    let vertical = GlyphLayout::new(vec![
        [8.0, 4.0],
        [5.0, 4.0],
        [2.0, 4.0],
        [8.0, 0.0],
        [5.0, 0.0],
        [2.0, 0.0],
    ]);
    let calib = synthetic_calibration();

    let a = WordProjector::new(&font, &on_board, &calib)
        .project("OPEN", 1)
        .expect("on-board");
    let b = WordProjector::new(&font, &vertical, &calib)
        .project("OPEN", 1)
        .expect("vertical");

    assert_eq!(a.len(), b.len());
    assert!(a.iter().zip(&b).all(|(x, y)| x != y));
}

#[test]
fn strokes_off_the_board_plane_keep_their_height() {
    let font = block_font();
    let layout = GlyphLayout::reference();
    let calib = synthetic_calibration();
    let projector = WordProjector::new(&font, &layout, &calib);

    let segments = projector.project("I", 0).expect("project");
    let pose = &calib.poses[0];
    let expected = calib
        .camera
        .project(pose, &Point3::new(7.5, 5.0, -1.0));
    assert_relative_eq!(segments[0].start, expected, epsilon = 1e-9);
}

#[test]
fn calibrated_projection_matches_ground_truth() {
    let truth = CameraModel::pinhole(synthetic::reference_intrinsics());
    let poses = synthetic::reference_poses();
    let observations = synthetic::observations(&truth, PatternSize::default(), &poses);
    let calib = PlanarCalibrator::default()
        .calibrate(&observations)
        .expect("calibrate");

    let font = block_font();
    let layout = GlyphLayout::reference();
    let projector = WordProjector::new(&font, &layout, &calib);
    let projected = projector.project_all("OPEN").expect("project");

    let truth_calib = CalibrationResult::new(truth, poses);
    let expected = WordProjector::new(&font, &layout, &truth_calib)
        .project_all("OPEN")
        .expect("truth");

    for (view, (got, want)) in projected.iter().zip(&expected).enumerate() {
        for (g, w) in got.iter().zip(want) {
            assert!(
                (g.start - w.start).norm() < 0.05 && (g.end - w.end).norm() < 0.05,
                "view {view}: {g:?} vs {w:?}"
            );
        }
    }
}
