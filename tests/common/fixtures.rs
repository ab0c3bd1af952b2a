#![allow(dead_code)]

use image::{DynamicImage, Rgb, RgbImage};

pub const FRAME_WIDTH: u32 = 160;
pub const FRAME_HEIGHT: u32 = 120;

/// Patch geometry shared by the segmentation fixtures.
pub const PATCH: (u32, u32, u32, u32) = (50, 40, 30, 22);

/// A uniform frame with one solid rectangular patch.
pub fn frame_with_patch(
    background: Rgb<u8>,
    patch: (u32, u32, u32, u32),
    color: Rgb<u8>,
) -> DynamicImage {
    let mut img = RgbImage::from_pixel(FRAME_WIDTH, FRAME_HEIGHT, background);
    fill_rect(&mut img, patch, color);
    DynamicImage::ImageRgb8(img)
}

/// Dark patch on a light background; the threshold stage isolates it.
pub fn dark_patch_frame() -> DynamicImage {
    frame_with_patch(Rgb([230, 230, 230]), PATCH, Rgb([20, 20, 20]))
}

/// Bright patch on a dark background, surrounded by a one-pixel bright frame
/// two pixels outside the patch boundary. The frame corrupts the threshold
/// stage's contour but is thin enough for the opening stage to erase.
pub fn speckled_patch_frame() -> DynamicImage {
    let mut img = RgbImage::from_pixel(FRAME_WIDTH, FRAME_HEIGHT, Rgb([10, 10, 10]));
    let (x, y, w, h) = PATCH;
    fill_rect(&mut img, PATCH, Rgb([250, 250, 250]));
    hollow_rect(&mut img, (x - 3, y - 3, w + 6, h + 6), Rgb([250, 250, 250]));
    DynamicImage::ImageRgb8(img)
}

pub fn fill_rect(img: &mut RgbImage, rect: (u32, u32, u32, u32), color: Rgb<u8>) {
    let (x0, y0, w, h) = rect;
    for y in y0..(y0 + h).min(img.height()) {
        for x in x0..(x0 + w).min(img.width()) {
            img.put_pixel(x, y, color);
        }
    }
}

/// One-pixel-thick rectangle outline.
pub fn hollow_rect(img: &mut RgbImage, rect: (u32, u32, u32, u32), color: Rgb<u8>) {
    let (x0, y0, w, h) = rect;
    for x in x0..x0 + w {
        img.put_pixel(x, y0, color);
        img.put_pixel(x, y0 + h - 1, color);
    }
    for y in y0..y0 + h {
        img.put_pixel(x0, y, color);
        img.put_pixel(x0 + w - 1, y, color);
    }
}
