use std::collections::VecDeque;

use image::{GrayImage, Luma};
use imageproc::distance_transform::Norm;
use imageproc::morphology::{dilate, erode, open};
use imageproc::region_labelling::Connectivity;

/// Fixed-range flood fill tolerance below the seed intensity.
const FLOOD_LO_DIFF: i16 = 50;
/// Fixed-range flood fill tolerance above the seed intensity.
const FLOOD_UP_DIFF: i16 = 255;
/// Intensity painted into flooded pixels.
const FLOOD_VALUE: u8 = 255;

/// Morphological opening of the threshold mask, removing speckle noise
/// narrower than the structuring element.
pub fn opening_mask(thresh: &GrayImage) -> GrayImage {
    open(thresh, Norm::LInf, 1)
}

/// Second opening pass followed by a morphological gradient (dilation minus
/// erosion), leaving the outlines of the remaining regions.
pub fn outline_mask(opened: &GrayImage) -> GrayImage {
    let cleaned = open(opened, Norm::LInf, 1);
    let grown = dilate(&cleaned, Norm::LInf, 2);
    let shrunk = erode(&cleaned, Norm::LInf, 2);
    let mut outline = grown;
    for (p, s) in outline.pixels_mut().zip(shrunk.pixels()) {
        p.0[0] = p.0[0].saturating_sub(s.0[0]);
    }
    outline
}

/// Flood-fill a copy of the raw grayscale frame from a fixed seed adjacent to
/// the top border, with the outline mask acting as a barrier.
///
/// Fixed-range semantics: a pixel is filled when its intensity lies within
/// [seed - lo, seed + up] of the *seed* intensity, matching the behavior the
/// rest of the cascade was tuned against. Filled pixels are painted white.
pub fn flood_fill_mask(
    gray: &GrayImage,
    barrier: &GrayImage,
    connectivity: Connectivity,
) -> GrayImage {
    let (width, height) = gray.dimensions();
    let mut flooded = gray.clone();
    if width == 0 || height == 0 {
        return flooded;
    }

    // Seed on the top row, a couple of pixels past the frame-height mark,
    // clamped into the frame.
    let seed_x = (height + 2).min(width - 1);
    let seed_y = 0u32;
    if barrier.get_pixel(seed_x, seed_y).0[0] != 0 {
        return flooded;
    }

    let seed_val = gray.get_pixel(seed_x, seed_y).0[0] as i16;
    let lo = seed_val - FLOOD_LO_DIFF;
    let up = seed_val + FLOOD_UP_DIFF;

    let mut visited = vec![false; (width * height) as usize];
    let idx = |x: u32, y: u32| (y * width + x) as usize;

    let mut queue = VecDeque::new();
    visited[idx(seed_x, seed_y)] = true;
    queue.push_back((seed_x, seed_y));

    while let Some((x, y)) = queue.pop_front() {
        flooded.put_pixel(x, y, Luma([FLOOD_VALUE]));

        let mut neighbors: Vec<(i64, i64)> = vec![
            (x as i64 - 1, y as i64),
            (x as i64 + 1, y as i64),
            (x as i64, y as i64 - 1),
            (x as i64, y as i64 + 1),
        ];
        if connectivity == Connectivity::Eight {
            neighbors.extend([
                (x as i64 - 1, y as i64 - 1),
                (x as i64 + 1, y as i64 - 1),
                (x as i64 - 1, y as i64 + 1),
                (x as i64 + 1, y as i64 + 1),
            ]);
        }

        for (nx, ny) in neighbors {
            if nx < 0 || ny < 0 || nx >= width as i64 || ny >= height as i64 {
                continue;
            }
            let (nx, ny) = (nx as u32, ny as u32);
            if visited[idx(nx, ny)] || barrier.get_pixel(nx, ny).0[0] != 0 {
                continue;
            }
            let val = gray.get_pixel(nx, ny).0[0] as i16;
            if val < lo || val > up {
                continue;
            }
            visited[idx(nx, ny)] = true;
            queue.push_back((nx, ny));
        }
    }

    flooded
}
