#![allow(clippy::float_cmp)]

use super::*;
use crate::geometry::{CircleData, LineData, RectData};

fn rect() -> GeometryData {
    GeometryData::Rect(RectData { x: 10.0, y: 20.0, width: 100.0, height: 50.0 })
}

fn circle() -> GeometryData {
    GeometryData::Circle(CircleData { center_x: 50.0, center_y: 60.0, radius: 25.0 })
}

fn line() -> GeometryData {
    GeometryData::Line(LineData { start_x: 5.0, start_y: 6.0, end_x: 95.0, end_y: 96.0 })
}

#[test]
fn rect_exposes_four_corners_in_order() {
    let handles = resize_handles(&rect());
    assert_eq!(
        handles,
        vec![
            Point::new(10.0, 20.0),   // top-left
            Point::new(110.0, 20.0),  // top-right
            Point::new(10.0, 70.0),   // bottom-left
            Point::new(110.0, 70.0),  // bottom-right
        ]
    );
}

#[test]
fn circle_exposes_cardinal_points_in_order() {
    let handles = resize_handles(&circle());
    assert_eq!(
        handles,
        vec![
            Point::new(50.0, 35.0), // top
            Point::new(75.0, 60.0), // right
            Point::new(50.0, 85.0), // bottom
            Point::new(25.0, 60.0), // left
        ]
    );
}

#[test]
fn line_exposes_both_endpoints() {
    let handles = resize_handles(&line());
    assert_eq!(handles, vec![Point::new(5.0, 6.0), Point::new(95.0, 96.0)]);
}

#[test]
fn pencil_exposes_no_handles() {
    let geo = GeometryData::Pencil(vec![Point::new(0.0, 0.0)]);
    assert!(resize_handles(&geo).is_empty());
    assert_eq!(handle_under_cursor(&geo, Point::new(0.0, 0.0)), None);
}

#[test]
fn cursor_within_tolerance_resolves_handle() {
    // 9px off on both axes is still inside the 10px box.
    assert_eq!(handle_under_cursor(&rect(), Point::new(19.0, 29.0)), Some(0));
}

#[test]
fn cursor_on_tolerance_boundary_misses() {
    assert_eq!(handle_under_cursor(&rect(), Point::new(20.0, 20.0)), None);
}

#[test]
fn cursor_far_from_all_handles_resolves_none() {
    assert_eq!(handle_under_cursor(&rect(), Point::new(60.0, 45.0)), None);
}

#[test]
fn overlapping_handles_tie_break_by_array_order() {
    // A zero-size rect stacks all four corners; the first one wins.
    let geo = GeometryData::Rect(RectData { x: 40.0, y: 40.0, width: 0.0, height: 0.0 });
    assert_eq!(handle_under_cursor(&geo, Point::new(40.0, 40.0)), Some(0));
}

#[test]
fn tiny_circle_tie_breaks_to_top_handle() {
    let geo = GeometryData::Circle(CircleData { center_x: 50.0, center_y: 50.0, radius: 1.0 });
    assert_eq!(handle_under_cursor(&geo, Point::new(50.0, 50.0)), Some(0));
}

#[test]
fn line_end_handle_resolves_by_index() {
    assert_eq!(handle_under_cursor(&line(), Point::new(95.0, 96.0)), Some(1));
}
