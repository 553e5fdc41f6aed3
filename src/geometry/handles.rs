//! Resize handles: positions and cursor resolution.
//!
//! Handle order is part of the contract — transforms take a handle index and
//! cursor resolution returns the first match in this order:
//! rect: top-left, top-right, bottom-left, bottom-right;
//! circle: top, right, bottom, left (at center ± radius);
//! line: start, end. Pencil paths expose no handles.

#[cfg(test)]
#[path = "handles_test.rs"]
mod handles_test;

use super::{GeometryData, HANDLE_TOLERANCE, Point};

/// Handle positions for a shape, in the documented order.
#[must_use]
pub fn resize_handles(geometry: &GeometryData) -> Vec<Point> {
    match geometry {
        GeometryData::Rect(r) => vec![
            Point::new(r.x, r.y),
            Point::new(r.x + r.width, r.y),
            Point::new(r.x, r.y + r.height),
            Point::new(r.x + r.width, r.y + r.height),
        ],
        GeometryData::Circle(c) => vec![
            Point::new(c.center_x, c.center_y - c.radius),
            Point::new(c.center_x + c.radius, c.center_y),
            Point::new(c.center_x, c.center_y + c.radius),
            Point::new(c.center_x - c.radius, c.center_y),
        ],
        GeometryData::Line(l) => vec![
            Point::new(l.start_x, l.start_y),
            Point::new(l.end_x, l.end_y),
        ],
        GeometryData::Pencil(_) => Vec::new(),
    }
}

/// Index of the handle under the cursor, or `None`.
///
/// Proximity is per-axis: both |Δx| and |Δy| must be within
/// [`HANDLE_TOLERANCE`]. Ties go to the first handle in array order.
#[must_use]
pub fn handle_under_cursor(geometry: &GeometryData, cursor: Point) -> Option<usize> {
    resize_handles(geometry)
        .iter()
        .position(|handle| close(cursor.x, handle.x) && close(cursor.y, handle.y))
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < HANDLE_TOLERANCE
}
