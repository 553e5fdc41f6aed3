#![allow(clippy::float_cmp)]

use super::*;
use crate::geometry::{CircleData, RectData};

fn rect(x: f64, y: f64, width: f64, height: f64) -> GeometryData {
    GeometryData::Rect(RectData { x, y, width, height })
}

fn circle(center_x: f64, center_y: f64, radius: f64) -> GeometryData {
    GeometryData::Circle(CircleData { center_x, center_y, radius })
}

fn line(start_x: f64, start_y: f64, end_x: f64, end_y: f64) -> GeometryData {
    GeometryData::Line(LineData { start_x, start_y, end_x, end_y })
}

// --- rect ---

#[test]
fn rect_contains_interior_point() {
    let geo = rect(10.0, 10.0, 100.0, 50.0);
    assert!(contains(&geo, Point::new(50.0, 30.0)));
}

#[test]
fn rect_excludes_outside_point() {
    let geo = rect(10.0, 10.0, 100.0, 50.0);
    assert!(!contains(&geo, Point::new(200.0, 30.0)));
}

#[test]
fn rect_edges_are_inclusive() {
    let geo = rect(10.0, 10.0, 100.0, 50.0);
    assert!(contains(&geo, Point::new(10.0, 10.0)));
    assert!(contains(&geo, Point::new(110.0, 60.0)));
}

#[test]
fn rect_with_negative_extent_still_hits() {
    // Drawn right-to-left and bottom-to-top; bbox is normalized on the fly.
    let geo = rect(110.0, 60.0, -100.0, -50.0);
    assert!(contains(&geo, Point::new(50.0, 30.0)));
    assert!(!contains(&geo, Point::new(200.0, 30.0)));
}

// --- circle ---

#[test]
fn circle_contains_point_within_radius() {
    let geo = circle(50.0, 50.0, 10.0);
    assert!(contains(&geo, Point::new(55.0, 55.0)));
}

#[test]
fn circle_boundary_is_inclusive() {
    let geo = circle(50.0, 50.0, 10.0);
    assert!(contains(&geo, Point::new(60.0, 50.0)));
}

#[test]
fn circle_excludes_point_beyond_radius() {
    let geo = circle(50.0, 50.0, 10.0);
    assert!(!contains(&geo, Point::new(61.0, 50.0)));
}

// --- line ---

#[test]
fn line_hits_point_within_tolerance() {
    let geo = line(0.0, 0.0, 100.0, 0.0);
    assert!(contains(&geo, Point::new(50.0, 4.0)));
}

#[test]
fn line_misses_point_beyond_tolerance() {
    let geo = line(0.0, 0.0, 100.0, 0.0);
    assert!(!contains(&geo, Point::new(50.0, 6.0)));
}

#[test]
fn line_test_false_positives_beyond_segment_extent() {
    // The infinite-line approximation: a point past the endpoint but on the
    // line's axis still registers. Kept deliberately.
    let geo = line(0.0, 0.0, 100.0, 0.0);
    assert!(contains(&geo, Point::new(500.0, 0.0)));
}

#[test]
fn degenerate_line_falls_back_to_point_distance() {
    let l = LineData { start_x: 10.0, start_y: 10.0, end_x: 10.0, end_y: 10.0 };
    assert_eq!(distance_to_line(Point::new(13.0, 14.0), &l), 5.0);
    assert!(contains(&GeometryData::Line(l), Point::new(12.0, 12.0)));
}

#[test]
fn diagonal_line_perpendicular_distance() {
    // 45-degree line y = x; perpendicular distance from (10, 0) is 10/sqrt(2).
    let l = LineData { start_x: 0.0, start_y: 0.0, end_x: 100.0, end_y: 100.0 };
    let d = distance_to_line(Point::new(10.0, 0.0), &l);
    assert!((d - 10.0 / 2.0_f64.sqrt()).abs() < 1e-9);
}

// --- pencil ---

#[test]
fn pencil_is_never_hit() {
    let geo = GeometryData::Pencil(vec![Point::new(0.0, 0.0), Point::new(10.0, 10.0)]);
    assert!(!contains(&geo, Point::new(0.0, 0.0)));
}
