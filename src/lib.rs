pub mod dataset;
pub mod demo;
pub mod error;
pub mod models;
pub mod segmentation;
pub mod visualize;

pub use error::SegmentError;
pub use models::{BoundingBox, Detection, Region, RotatedRect, Stage};
pub use segmentation::{Channel, SegmentParams, Segmenter};
