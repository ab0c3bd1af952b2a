mod common;

use common::fixtures;
use image::{DynamicImage, GrayImage, Rgb};
use pickvision::{SegmentError, SegmentParams, Segmenter, Stage};

fn band(low: f64, high: f64) -> SegmentParams {
    SegmentParams { area_low: low, area_high: high, ..SegmentParams::default() }
}

fn assert_close(value: u32, expected: u32, tolerance: u32, what: &str) {
    let delta = value.abs_diff(expected);
    assert!(delta <= tolerance, "{}: {} is not within {} of {}", what, value, tolerance, expected);
}

#[test]
fn finds_dark_patch_on_light_background() -> anyhow::Result<()> {
    let frame = fixtures::dark_patch_frame();
    let segmenter = Segmenter::new(band(570.0, 920.0));

    let region = segmenter.segment(&frame)?;
    let (px, py, pw, ph) = fixtures::PATCH;

    assert_eq!(region.stage, Stage::Threshold);
    assert_close(region.bbox.x, px, 4, "bbox.x");
    assert_close(region.bbox.y, py, 4, "bbox.y");
    assert_close(region.bbox.width, pw, 8, "bbox.width");
    assert_close(region.bbox.height, ph, 8, "bbox.height");

    // The rotated rectangle describes the same region: axis-aligned within a
    // few degrees and centered on the patch.
    let angle = region.rotated.angle.rem_euclid(90.0);
    assert!(angle < 7.0 || angle > 83.0, "angle {} not axis-aligned", region.rotated.angle);
    let (cx, cy) = region.rotated.center;
    assert!((cx - (px + pw / 2) as f32).abs() <= 5.0, "center x {}", cx);
    assert!((cy - (py + ph / 2) as f32).abs() <= 5.0, "center y {}", cy);
    Ok(())
}

#[test]
fn fails_when_band_is_below_the_patch_area() {
    let frame = fixtures::dark_patch_frame();
    let segmenter = Segmenter::new(band(0.1, 0.4));
    let err = segmenter.segment(&frame).unwrap_err();
    assert!(matches!(err, SegmentError::NoRegionFound { .. }), "got {err:?}");
}

#[test]
fn fails_when_band_is_above_the_patch_area() {
    let frame = fixtures::dark_patch_frame();
    let segmenter = Segmenter::new(band(19000.0, 20000.0));
    let err = segmenter.segment(&frame).unwrap_err();
    assert!(matches!(err, SegmentError::NoRegionFound { .. }), "got {err:?}");
}

#[test]
fn opening_stage_recovers_a_speckled_frame() -> anyhow::Result<()> {
    let frame = fixtures::speckled_patch_frame();
    let params = SegmentParams {
        threshold: 250,
        edge_low: 20.0,
        edge_high: 100.0,
        ..band(570.0, 920.0)
    };
    let segmenter = Segmenter::new(params);

    let region = segmenter.segment(&frame)?;
    let (px, py, pw, ph) = fixtures::PATCH;

    // The thin bright frame merges with the patch contour at the threshold
    // stage; only the opened mask exposes a qualifying contour.
    assert_eq!(region.stage, Stage::Opening);
    assert_close(region.bbox.width, pw, 5, "bbox.width");
    assert_close(region.bbox.height, ph, 5, "bbox.height");
    let (cx, cy) = region.rotated.center;
    assert!((cx - (px + pw / 2) as f32).abs() <= 4.0, "center x {}", cx);
    assert!((cy - (py + ph / 2) as f32).abs() <= 4.0, "center y {}", cy);
    Ok(())
}

#[test]
fn segmentation_is_deterministic() -> anyhow::Result<()> {
    let frame = fixtures::dark_patch_frame();
    let segmenter = Segmenter::new(band(570.0, 920.0));
    let first = segmenter.segment(&frame)?;
    let second = segmenter.segment(&frame)?;
    assert_eq!(first, second);
    Ok(())
}

#[test]
fn red_channel_finds_red_but_not_blue() -> anyhow::Result<()> {
    let red_frame =
        fixtures::frame_with_patch(Rgb([90, 90, 90]), fixtures::PATCH, Rgb([220, 40, 40]));
    let params = SegmentParams { threshold: 150, ..band(570.0, 920.0) };
    let segmenter = Segmenter::new(params);

    let region = segmenter.segment_red(&red_frame)?;
    assert_close(region.bbox.x, fixtures::PATCH.0, 4, "bbox.x");
    assert_close(region.bbox.y, fixtures::PATCH.1, 4, "bbox.y");

    let err = segmenter.segment_blue(&red_frame).unwrap_err();
    assert!(matches!(err, SegmentError::NoRegionFound { .. }), "got {err:?}");
    Ok(())
}

#[test]
fn blue_channel_finds_blue_but_not_red() -> anyhow::Result<()> {
    let blue_frame =
        fixtures::frame_with_patch(Rgb([90, 90, 90]), fixtures::PATCH, Rgb([40, 40, 220]));
    let params = SegmentParams { threshold: 150, ..band(570.0, 920.0) };
    let segmenter = Segmenter::new(params);

    assert!(segmenter.segment_blue(&blue_frame).is_ok());
    let err = segmenter.segment_red(&blue_frame).unwrap_err();
    assert!(matches!(err, SegmentError::NoRegionFound { .. }), "got {err:?}");
    Ok(())
}

#[test]
fn invalid_area_band_fails_fast() {
    let frame = fixtures::dark_patch_frame();
    let segmenter = Segmenter::new(band(200.0, 200.0));
    let err = segmenter.segment(&frame).unwrap_err();
    assert!(matches!(err, SegmentError::InvalidAreaBand { low, high } if low == high), "got {err:?}");

    // Same check on the channel-restricted entry points.
    let segmenter = Segmenter::new(band(500.0, 100.0));
    let err = segmenter.segment_red(&frame).unwrap_err();
    assert!(matches!(err, SegmentError::InvalidAreaBand { .. }), "got {err:?}");
}

#[test]
fn invalid_edge_thresholds_fail_fast() {
    let frame = fixtures::dark_patch_frame();
    let params = SegmentParams { edge_low: 300.0, edge_high: 100.0, ..SegmentParams::default() };
    let err = Segmenter::new(params).segment(&frame).unwrap_err();
    assert!(matches!(err, SegmentError::InvalidEdgeThresholds { .. }), "got {err:?}");
}

#[test]
fn channel_split_rejects_grayscale_frames() {
    let frame = DynamicImage::ImageLuma8(GrayImage::new(32, 32));
    let err = Segmenter::default().segment_red(&frame).unwrap_err();
    assert!(matches!(err, SegmentError::UnsupportedChannels { channels: 1 }), "got {err:?}");
}

#[test]
fn debug_mode_writes_masks_and_comparison() -> anyhow::Result<()> {
    let dir = tempfile::TempDir::new()?;
    let debug_dir = dir.path().join("debug");

    let frame = fixtures::dark_patch_frame();
    let segmenter = Segmenter::new(band(570.0, 920.0)).with_debug(debug_dir.clone())?;
    segmenter.segment(&frame)?;

    assert!(debug_dir.join("01_threshold.png").exists());
    assert!(debug_dir.join("contours.png").exists());
    Ok(())
}

#[test]
fn debug_mode_rejects_non_empty_directories() -> anyhow::Result<()> {
    let dir = tempfile::TempDir::new()?;
    std::fs::write(dir.path().join("leftover.txt"), "x")?;
    let result = Segmenter::default().with_debug(dir.path().to_path_buf());
    assert!(matches!(result, Err(SegmentError::DebugDirNotEmpty(_))));
    Ok(())
}
