use std::path::PathBuf;

use thiserror::Error;

/// Errors produced by the segmentation and dataset code.
#[derive(Debug, Error)]
pub enum SegmentError {
    /// All cascade stages (or the single direct stage for channel-restricted
    /// segmentation) failed to produce a contour within the area band.
    #[error("no region found within area band ({low}, {high})")]
    NoRegionFound { low: f64, high: f64 },

    #[error("invalid area band: low ({low}) must be strictly less than high ({high})")]
    InvalidAreaBand { low: f64, high: f64 },

    #[error("invalid edge thresholds: low ({low}) must be strictly less than high ({high})")]
    InvalidEdgeThresholds { low: f32, high: f32 },

    #[error("channel split requested on a frame with {channels} channel(s), need at least 3")]
    UnsupportedChannels { channels: u8 },

    #[error("debug directory is not empty: {0}")]
    DebugDirNotEmpty(PathBuf),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
