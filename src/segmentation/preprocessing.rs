use image::{DynamicImage, GrayImage};
use imageproc::contrast::{ThresholdType, equalize_histogram, threshold};

use crate::error::SegmentError;

/// Color channel to restrict segmentation to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Red,
    Green,
    Blue,
}

impl Channel {
    fn index(&self) -> usize {
        match self {
            Channel::Red => 0,
            Channel::Green => 1,
            Channel::Blue => 2,
        }
    }
}

/// Convert frame to grayscale
pub fn to_grayscale(img: &DynamicImage) -> GrayImage {
    img.to_luma8()
}

/// Spread the intensity histogram over the full range
pub fn equalize(gray: &GrayImage) -> GrayImage {
    equalize_histogram(gray)
}

/// Binary threshold: pixels above `th` become 255, everything else 0
pub fn binarize(gray: &GrayImage, th: u8) -> GrayImage {
    threshold(gray, th, ThresholdType::Binary)
}

/// Extract a single color channel as a grayscale image.
///
/// Fails before touching pixel data if the frame does not carry at least
/// three channels.
pub fn split_channel(img: &DynamicImage, channel: Channel) -> Result<GrayImage, SegmentError> {
    let channels = img.color().channel_count();
    if channels < 3 {
        return Err(SegmentError::UnsupportedChannels { channels });
    }
    let rgb = img.to_rgb8();
    let idx = channel.index();
    let mut out = GrayImage::new(rgb.width(), rgb.height());
    for (x, y, pixel) in rgb.enumerate_pixels() {
        out.put_pixel(x, y, image::Luma([pixel[idx]]));
    }
    Ok(out)
}
