//! Segment a synthetic camera frame and write the annotated result.
//!
//! Run with: cargo run --example segment_sample

use image::{DynamicImage, Rgb, RgbImage};
use pickvision::{SegmentParams, Segmenter, visualize};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter("debug").init();

    // A dark block on a light table stands in for a camera frame.
    let mut frame = RgbImage::from_pixel(320, 240, Rgb([225, 225, 225]));
    for y in 100..140 {
        for x in 130..180 {
            frame.put_pixel(x, y, Rgb([25, 25, 25]));
        }
    }
    let frame = DynamicImage::ImageRgb8(frame);

    let params = SegmentParams { area_low: 1500.0, area_high: 3500.0, ..SegmentParams::default() };
    let segmenter = Segmenter::new(params);
    let region = segmenter.segment(&frame)?;

    println!("found a region at stage '{}'", region.stage.name());
    println!(
        "  rotated rect: center ({:.1}, {:.1}), {:.1}x{:.1}, {:.1} deg",
        region.rotated.center.0,
        region.rotated.center.1,
        region.rotated.width,
        region.rotated.height,
        region.rotated.angle,
    );
    println!(
        "  upright bbox: ({}, {}) {}x{}",
        region.bbox.x, region.bbox.y, region.bbox.width, region.bbox.height,
    );

    let annotated = visualize::annotate_region(&frame, &region);
    annotated.save("segment_sample.png")?;
    println!("wrote segment_sample.png");
    Ok(())
}
