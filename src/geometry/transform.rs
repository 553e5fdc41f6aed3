//! Resize and drag transforms.
//!
//! DESIGN
//! ======
//! Both transforms mutate a [`GeometryData`] in place given cursor state the
//! caller tracks (active handle index, captured drag offset). Resize
//! enforces the minimum-size floors and keeps the shape inside the canvas
//! viewport; drag translates the shape's defining coordinates, moving every
//! point of a multi-point shape by the same delta.

#[cfg(test)]
#[path = "transform_test.rs"]
mod transform_test;

use super::{
    CircleData, GeometryData, LineData, MIN_CIRCLE_RADIUS, MIN_RECT_SIZE, Point, RectData, clamp,
};

/// Apply a resize for the given handle index (see [`super::handles`] for the
/// ordering) toward `cursor`, clamped to a `canvas_width` x `canvas_height`
/// viewport. Unknown handle indices and pencil paths are no-ops.
pub fn resize(
    geometry: &mut GeometryData,
    handle: usize,
    cursor: Point,
    canvas_width: f64,
    canvas_height: f64,
) {
    match geometry {
        GeometryData::Rect(r) => resize_rect(r, handle, cursor, canvas_width, canvas_height),
        GeometryData::Circle(c) => resize_circle(c, handle, cursor, canvas_width, canvas_height),
        GeometryData::Line(l) => resize_line(l, handle, cursor, canvas_width, canvas_height),
        GeometryData::Pencil(_) => {}
    }
}

fn resize_rect(r: &mut RectData, handle: usize, cursor: Point, canvas_width: f64, canvas_height: f64) {
    let old_right = r.x + r.width;
    let old_bottom = r.y + r.height;

    match handle {
        0 => {
            // Top-left: opposite corner stays put.
            r.width = old_right - cursor.x;
            r.height = old_bottom - cursor.y;
            r.x = cursor.x;
            r.y = cursor.y;
        }
        1 => {
            // Top-right.
            r.width = (cursor.x - r.x).abs();
            r.height += r.y - cursor.y;
            r.y = cursor.y;
        }
        2 => {
            // Bottom-left.
            r.width += r.x - cursor.x;
            r.height = (cursor.y - r.y).abs();
            r.x = cursor.x;
        }
        3 => {
            // Bottom-right.
            r.width = (cursor.x - r.x).abs();
            r.height = (cursor.y - r.y).abs();
        }
        _ => return,
    }

    r.width = r.width.max(MIN_RECT_SIZE);
    r.height = r.height.max(MIN_RECT_SIZE);
    r.x = clamp(r.x, 0.0, canvas_width - r.width);
    r.y = clamp(r.y, 0.0, canvas_height - r.height);
}

fn resize_circle(c: &mut CircleData, handle: usize, cursor: Point, canvas_width: f64, canvas_height: f64) {
    // Vertical handles (top/bottom) track the cursor's y distance, horizontal
    // handles (right/left) its x distance.
    let radius = match handle {
        0 | 2 => (cursor.y - c.center_y).abs(),
        1 | 3 => (cursor.x - c.center_x).abs(),
        _ => return,
    };

    let radius = radius.max(MIN_CIRCLE_RADIUS);
    // Keep the full circle inside the canvas; near an edge this cap wins
    // over the minimum floor. A center outside the canvas makes the edge
    // distance negative, so floor the cap at zero to keep the radius
    // non-negative.
    let max_radius = c
        .center_x
        .min(canvas_width - c.center_x)
        .min(c.center_y)
        .min(canvas_height - c.center_y)
        .max(0.0);
    c.radius = radius.min(max_radius);
}

fn resize_line(l: &mut LineData, handle: usize, cursor: Point, canvas_width: f64, canvas_height: f64) {
    let x = clamp(cursor.x, 0.0, canvas_width);
    let y = clamp(cursor.y, 0.0, canvas_height);
    match handle {
        0 => {
            l.start_x = x;
            l.start_y = y;
        }
        1 => {
            l.end_x = x;
            l.end_y = y;
        }
        _ => {}
    }
}

/// Translate a shape so it follows the cursor, keeping the grab point fixed.
///
/// `drag_offset` is `cursor - shape_origin`, captured when the drag started.
/// Multi-point shapes (line, pencil) translate every point together.
pub fn drag(geometry: &mut GeometryData, cursor: Point, drag_offset: Point) {
    match geometry {
        GeometryData::Rect(r) => {
            r.x = cursor.x - drag_offset.x;
            r.y = cursor.y - drag_offset.y;
        }
        GeometryData::Circle(c) => {
            c.center_x = cursor.x - drag_offset.x;
            c.center_y = cursor.y - drag_offset.y;
        }
        GeometryData::Line(l) => {
            let dx = cursor.x - drag_offset.x - l.start_x;
            let dy = cursor.y - drag_offset.y - l.start_y;
            l.start_x += dx;
            l.start_y += dy;
            l.end_x += dx;
            l.end_y += dy;
        }
        GeometryData::Pencil(points) => {
            let Some(first) = points.first().copied() else {
                return;
            };
            let dx = cursor.x - drag_offset.x - first.x;
            let dy = cursor.y - drag_offset.y - first.y;
            for p in points {
                p.x += dx;
                p.y += dy;
            }
        }
    }
}
