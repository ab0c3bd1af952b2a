//! Drawing helpers for segmentation and detection results.
//!
//! All helpers draw into copies or caller-supplied buffers; nothing here
//! feeds back into the segmentation result.

use image::{DynamicImage, Rgb, RgbImage};
use imageproc::drawing::{
    draw_filled_circle_mut, draw_hollow_circle_mut, draw_hollow_rect_mut, draw_line_segment_mut,
};
use imageproc::rect::Rect;

use crate::models::{Detection, Region};

pub const RED: Rgb<u8> = Rgb([255, 0, 0]);
pub const GREEN: Rgb<u8> = Rgb([0, 255, 0]);
pub const BLUE: Rgb<u8> = Rgb([0, 0, 255]);
pub const YELLOW: Rgb<u8> = Rgb([255, 255, 0]);

/// Draw both representations of a segmented region onto an RGB copy of the
/// frame: the rotated rectangle and its center in green, the axis-aligned box
/// and its center in blue.
pub fn annotate_region(frame: &DynamicImage, region: &Region) -> RgbImage {
    let mut canvas = frame.to_rgb8();

    let corners = region.rotated.corners;
    for i in 0..4 {
        let p = corners[i];
        let q = corners[(i + 1) % 4];
        draw_line_segment_mut(&mut canvas, p, q, GREEN);
    }
    let (cx, cy) = region.rotated.center;
    draw_hollow_circle_mut(&mut canvas, (cx as i32, cy as i32), 4, GREEN);

    let bbox = &region.bbox;
    let rect = Rect::at(bbox.x as i32, bbox.y as i32).of_size(bbox.width.max(1), bbox.height.max(1));
    draw_hollow_rect_mut(&mut canvas, rect, BLUE);
    let (bx, by) = bbox.center();
    draw_filled_circle_mut(&mut canvas, (bx as i32, by as i32), 3, BLUE);

    canvas
}

/// Compose images horizontally into a single canvas, top-aligned.
pub fn side_by_side(images: &[&RgbImage]) -> RgbImage {
    let width: u32 = images.iter().map(|img| img.width()).sum();
    let height: u32 = images.iter().map(|img| img.height()).max().unwrap_or(0);
    let mut canvas = RgbImage::new(width, height);
    let mut offset: i64 = 0;
    for img in images {
        image::imageops::replace(&mut canvas, *img, offset, 0);
        offset += img.width() as i64;
    }
    canvas
}

/// Draw detections onto the given image: bounding boxes in red, attached
/// segmentation masks highlighted in yellow.
/// Note: modifies the passed image.
pub fn draw_detections(image: &mut RgbImage, detections: &[Detection]) {
    for detection in detections {
        let b = &detection.bbox;
        let rect = Rect::at(b.x as i32, b.y as i32).of_size(b.width.max(1), b.height.max(1));
        draw_hollow_rect_mut(image, rect, RED);

        if let Some(mask) = &detection.mask {
            for (x, y, pixel) in mask.enumerate_pixels() {
                if pixel[0] != 0 && x < image.width() && y < image.height() {
                    image.put_pixel(x, y, YELLOW);
                }
            }
        }
    }
}
