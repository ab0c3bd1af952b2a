pub mod contours;
pub mod preprocessing;
pub mod stages;

use std::path::PathBuf;

use image::{DynamicImage, GrayImage};
use imageproc::geometry::min_area_rect;
use imageproc::point::Point;
use imageproc::region_labelling::Connectivity;
use tracing::debug;

use crate::error::SegmentError;
use crate::models::{BoundingBox, Region, RotatedRect, Stage};
use crate::visualize;

pub use preprocessing::Channel;

/// Segmentation parameters.
///
/// One explicit value instead of scattered knobs; the defaults are the ones
/// the cascade was tuned with.
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentParams {
    /// Binary threshold applied to the equalized grayscale frame (or to the
    /// raw channel plane for channel-restricted segmentation).
    pub threshold: u8,
    /// Lower edge-detector threshold.
    pub edge_low: f32,
    /// Upper edge-detector threshold.
    pub edge_high: f32,
    /// Neighborhood relation used by the flood-fill stage.
    pub connectivity: Connectivity,
    /// Lower bound for contour area, exclusive.
    pub area_low: f64,
    /// Upper bound for contour area, exclusive.
    pub area_high: f64,
}

impl Default for SegmentParams {
    fn default() -> Self {
        Self {
            threshold: 200,
            edge_low: 50.0,
            edge_high: 270.0,
            connectivity: Connectivity::Four,
            area_low: 100.0,
            area_high: 200.0,
        }
    }
}

impl SegmentParams {
    /// Reject malformed parameters before any image transform runs.
    fn validate(&self) -> Result<(), SegmentError> {
        if self.area_low >= self.area_high {
            return Err(SegmentError::InvalidAreaBand {
                low: self.area_low,
                high: self.area_high,
            });
        }
        if self.edge_low >= self.edge_high {
            return Err(SegmentError::InvalidEdgeThresholds {
                low: self.edge_low,
                high: self.edge_high,
            });
        }
        Ok(())
    }
}

/// Diagnostic output configuration: intermediate masks and the final
/// annotated comparison image are written into `output_dir`.
#[derive(Debug, Clone)]
pub struct DebugConfig {
    pub output_dir: PathBuf,
}

/// Connected-component segmenter over a single camera frame.
///
/// Tries a cascade of increasingly aggressive mask heuristics (threshold,
/// opening, outline, flood fill) and returns the region of the first contour
/// that falls strictly inside the configured area band.
pub struct Segmenter {
    params: SegmentParams,
    debug: Option<DebugConfig>,
}

impl Segmenter {
    pub fn new(params: SegmentParams) -> Self {
        Self { params, debug: None }
    }

    pub fn params(&self) -> &SegmentParams {
        &self.params
    }

    /// Enable diagnostic output into `output_dir`.
    /// The directory must be empty or non-existent.
    pub fn with_debug(mut self, output_dir: PathBuf) -> Result<Self, SegmentError> {
        if output_dir.exists() {
            let entries = std::fs::read_dir(&output_dir)?;
            if entries.count() > 0 {
                return Err(SegmentError::DebugDirNotEmpty(output_dir));
            }
        } else {
            std::fs::create_dir_all(&output_dir)?;
        }
        self.debug = Some(DebugConfig { output_dir });
        Ok(self)
    }

    /// Segment a connected component, trying each cascade stage in order and
    /// stopping at the first one that yields a qualifying contour.
    pub fn segment(&self, frame: &DynamicImage) -> Result<Region, SegmentError> {
        self.params.validate()?;

        let gray = preprocessing::to_grayscale(frame);
        let equalized = preprocessing::equalize(&gray);

        let thresh = preprocessing::binarize(&equalized, self.params.threshold);
        self.dump_mask(1, Stage::Threshold, &thresh)?;
        if let Some(points) = contours::extract_contour(&thresh, &self.params) {
            return self.finish(frame, Stage::Threshold, &thresh, points);
        }

        let opened = stages::opening_mask(&thresh);
        self.dump_mask(2, Stage::Opening, &opened)?;
        if let Some(points) = contours::extract_contour(&opened, &self.params) {
            return self.finish(frame, Stage::Opening, &opened, points);
        }

        let outline = stages::outline_mask(&opened);
        self.dump_mask(3, Stage::Outline, &outline)?;
        if let Some(points) = contours::extract_contour(&outline, &self.params) {
            return self.finish(frame, Stage::Outline, &outline, points);
        }

        // Last resort: flood-fill the raw grayscale frame, walled off by the
        // outline mask. The stages are logically independent; this one does
        // not reuse the equalized image.
        let flooded = stages::flood_fill_mask(&gray, &outline, self.params.connectivity);
        self.dump_mask(4, Stage::FloodFill, &flooded)?;
        if let Some(points) = contours::extract_contour(&flooded, &self.params) {
            return self.finish(frame, Stage::FloodFill, &flooded, points);
        }

        Err(SegmentError::NoRegionFound {
            low: self.params.area_low,
            high: self.params.area_high,
        })
    }

    /// Segment looking only at a single color channel.
    ///
    /// No equalization and no fallback stages: the channel plane is
    /// thresholded directly and failure is immediate.
    pub fn segment_channel(
        &self,
        frame: &DynamicImage,
        channel: Channel,
    ) -> Result<Region, SegmentError> {
        self.params.validate()?;

        let plane = preprocessing::split_channel(frame, channel)?;
        let thresh = preprocessing::binarize(&plane, self.params.threshold);
        self.dump_mask(1, Stage::Threshold, &thresh)?;
        match contours::extract_contour(&thresh, &self.params) {
            Some(points) => self.finish(frame, Stage::Threshold, &thresh, points),
            None => Err(SegmentError::NoRegionFound {
                low: self.params.area_low,
                high: self.params.area_high,
            }),
        }
    }

    /// Segment based on the red channel only.
    pub fn segment_red(&self, frame: &DynamicImage) -> Result<Region, SegmentError> {
        self.segment_channel(frame, Channel::Red)
    }

    /// Segment based on the blue channel only.
    pub fn segment_blue(&self, frame: &DynamicImage) -> Result<Region, SegmentError> {
        self.segment_channel(frame, Channel::Blue)
    }

    fn finish(
        &self,
        frame: &DynamicImage,
        stage: Stage,
        mask: &GrayImage,
        points: Vec<Point<i32>>,
    ) -> Result<Region, SegmentError> {
        let corners = min_area_rect(&points);
        let region = Region {
            stage,
            rotated: RotatedRect::from_corners(corners),
            bbox: BoundingBox::enclosing(&points),
        };
        debug!(
            stage = stage.name(),
            x = region.bbox.x,
            y = region.bbox.y,
            width = region.bbox.width,
            height = region.bbox.height,
            "selected contour"
        );

        if let Some(config) = &self.debug {
            let annotated = visualize::annotate_region(frame, &region);
            let mask_rgb = DynamicImage::ImageLuma8(mask.clone()).to_rgb8();
            let comparison = visualize::side_by_side(&[&mask_rgb, &annotated]);
            comparison.save(config.output_dir.join("contours.png"))?;
        }

        Ok(region)
    }

    fn dump_mask(&self, index: usize, stage: Stage, mask: &GrayImage) -> Result<(), SegmentError> {
        if let Some(config) = &self.debug {
            let filename = format!("{:02}_{}.png", index, stage.name());
            mask.save(config.output_dir.join(filename))?;
        }
        Ok(())
    }
}

impl Default for Segmenter {
    fn default() -> Self {
        Self::new(SegmentParams::default())
    }
}
