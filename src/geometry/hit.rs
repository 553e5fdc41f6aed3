//! Containment tests: is a point on a shape?

#[cfg(test)]
#[path = "hit_test.rs"]
mod hit_test;

use super::{GeometryData, LINE_TOLERANCE, LineData, Point};

/// Test whether `point` hits the shape body.
///
/// Rects are tested against their normalized bounding box, circles by
/// Euclidean distance, lines by perpendicular distance to the *infinite*
/// line through both endpoints. The line test can false-positive beyond the
/// segment's extent; that approximation is intentional and kept. Pencil
/// paths are not hit-testable.
#[must_use]
pub fn contains(geometry: &GeometryData, point: Point) -> bool {
    match geometry {
        GeometryData::Rect(r) => {
            let left = r.x.min(r.x + r.width);
            let right = r.x.max(r.x + r.width);
            let top = r.y.min(r.y + r.height);
            let bottom = r.y.max(r.y + r.height);
            point.x >= left && point.x <= right && point.y >= top && point.y <= bottom
        }
        GeometryData::Circle(c) => {
            let dx = point.x - c.center_x;
            let dy = point.y - c.center_y;
            (dx * dx + dy * dy).sqrt() <= c.radius
        }
        GeometryData::Line(l) => distance_to_line(point, l) < LINE_TOLERANCE,
        GeometryData::Pencil(_) => false,
    }
}

/// Perpendicular distance from `point` to the infinite line through the
/// segment's endpoints. A degenerate zero-length line falls back to the
/// distance to its single point.
#[must_use]
pub fn distance_to_line(point: Point, line: &LineData) -> f64 {
    let dx = line.end_x - line.start_x;
    let dy = line.end_y - line.start_y;
    let denominator = (dx * dx + dy * dy).sqrt();
    if denominator == 0.0 {
        let px = point.x - line.start_x;
        let py = point.y - line.start_y;
        return (px * px + py * py).sqrt();
    }
    let numerator =
        (dy * point.x - dx * point.y + line.end_x * line.start_y - line.end_y * line.start_x).abs();
    numerator / denominator
}
