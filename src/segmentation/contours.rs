use image::GrayImage;
use imageproc::contours::find_contours;
use imageproc::distance_transform::Norm;
use imageproc::edges::canny;
use imageproc::morphology::close;
use imageproc::point::Point;

use super::SegmentParams;

/// Run edge detection on a mask, close small gaps in the edges and return the
/// contour with maximal enclosed area strictly inside the configured band, or
/// `None` if no contour qualifies.
pub fn extract_contour(mask: &GrayImage, params: &SegmentParams) -> Option<Vec<Point<i32>>> {
    let edges = canny(mask, params.edge_low, params.edge_high);
    let closed = close(&edges, Norm::LInf, 1);

    let mut best: Option<(f64, Vec<Point<i32>>)> = None;
    for contour in find_contours::<i32>(&closed) {
        let area = contour_area(&contour.points);
        // Strict on both sides; boundary areas are rejected.
        if params.area_low < area && area < params.area_high {
            let better = best.as_ref().is_none_or(|(a, _)| area > *a);
            if better {
                best = Some((area, contour.points));
            }
        }
    }
    best.map(|(_, points)| points)
}

/// Enclosed polygon area of a closed contour (shoelace formula, absolute).
pub fn contour_area(points: &[Point<i32>]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    let mut twice_area = 0i64;
    for i in 0..points.len() {
        let p = points[i];
        let q = points[(i + 1) % points.len()];
        twice_area += p.x as i64 * q.y as i64 - q.x as i64 * p.y as i64;
    }
    (twice_area.abs() as f64) / 2.0
}
