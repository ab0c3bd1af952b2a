use image::GrayImage;
use imageproc::point::Point;

/// Axis-aligned bounding box in image coordinates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundingBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl BoundingBox {
    /// Smallest axis-aligned box enclosing all given contour points.
    /// An empty slice yields the zero box at the origin.
    pub fn enclosing(points: &[Point<i32>]) -> Self {
        if points.is_empty() {
            return Self { x: 0, y: 0, width: 0, height: 0 };
        }
        let mut min_x = i32::MAX;
        let mut min_y = i32::MAX;
        let mut max_x = i32::MIN;
        let mut max_y = i32::MIN;
        for p in points {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }
        Self {
            x: min_x.max(0) as u32,
            y: min_y.max(0) as u32,
            width: (max_x - min_x + 1).max(0) as u32,
            height: (max_y - min_y + 1).max(0) as u32,
        }
    }

    pub fn center(&self) -> (u32, u32) {
        (self.x + self.width / 2, self.y + self.height / 2)
    }
}

/// Minimum-area enclosing rectangle of a contour, not necessarily
/// axis-aligned.
#[derive(Debug, Clone, PartialEq)]
pub struct RotatedRect {
    /// Center of the rectangle.
    pub center: (f32, f32),
    /// Length of the edge between the first and second corner.
    pub width: f32,
    /// Length of the edge between the second and third corner.
    pub height: f32,
    /// Orientation of the width edge, in degrees, normalized to [0, 180).
    pub angle: f32,
    /// Corner points in traversal order.
    pub corners: [(f32, f32); 4],
}

impl RotatedRect {
    /// Build from the four corners returned by
    /// `imageproc::geometry::min_area_rect`.
    pub fn from_corners(corners: [Point<i32>; 4]) -> Self {
        let pts: Vec<(f32, f32)> = corners.iter().map(|p| (p.x as f32, p.y as f32)).collect();
        let cx = pts.iter().map(|p| p.0).sum::<f32>() / 4.0;
        let cy = pts.iter().map(|p| p.1).sum::<f32>() / 4.0;
        let dx = pts[1].0 - pts[0].0;
        let dy = pts[1].1 - pts[0].1;
        let width = (dx * dx + dy * dy).sqrt();
        let hx = pts[2].0 - pts[1].0;
        let hy = pts[2].1 - pts[1].1;
        let height = (hx * hx + hy * hy).sqrt();
        let angle = dy.atan2(dx).to_degrees().rem_euclid(180.0);
        Self {
            center: (cx, cy),
            width,
            height,
            angle,
            corners: [pts[0], pts[1], pts[2], pts[3]],
        }
    }
}

/// The cascade stage that produced a segmentation result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Threshold,
    Opening,
    Outline,
    FloodFill,
}

impl Stage {
    pub fn name(&self) -> &'static str {
        match self {
            Stage::Threshold => "threshold",
            Stage::Opening => "opening",
            Stage::Outline => "outline",
            Stage::FloodFill => "flooded",
        }
    }
}

/// Segmented object region, described by both a minimal rotated rectangle and
/// an axis-aligned bounding box of the same selected contour.
#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    /// Which cascade stage yielded the qualifying contour.
    pub stage: Stage,
    pub rotated: RotatedRect,
    pub bbox: BoundingBox,
}

/// An object detection to visualize: identifier, score, box and an optional
/// segmentation mask (nonzero pixels belong to the object).
#[derive(Debug, Clone)]
pub struct Detection {
    pub id: String,
    pub score: f32,
    pub bbox: BoundingBox,
    pub mask: Option<GrayImage>,
}
