//! Geometry engine — pure functions over shape geometry.
//!
//! DESIGN
//! ======
//! Everything here is deterministic and side-effect-free: parse a serialized
//! payload into typed data, then hit-test, compute resize handles, or apply
//! resize/drag transforms. No I/O, no rendering, so every function can be
//! tested without a canvas or a connection.

pub mod handles;
pub mod hit;
pub mod transform;

use serde::{Deserialize, Serialize};

use crate::protocol::ShapeKind;

/// Per-axis tolerance when matching the cursor to a resize handle, in pixels.
pub const HANDLE_TOLERANCE: f64 = 10.0;

/// Perpendicular-distance tolerance when hit-testing a line, in pixels.
pub const LINE_TOLERANCE: f64 = 5.0;

/// Minimum rect width/height enforced by resize, in pixels.
pub const MIN_RECT_SIZE: f64 = 10.0;

/// Minimum circle radius enforced by resize, in pixels.
pub const MIN_CIRCLE_RADIUS: f64 = 5.0;

/// A point in canvas coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RectData {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CircleData {
    pub center_x: f64,
    pub center_y: f64,
    pub radius: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineData {
    pub start_x: f64,
    pub start_y: f64,
    pub end_x: f64,
    pub end_y: f64,
}

/// Typed geometry payload for one shape.
///
/// Pencil paths serialize as a bare array of points, matching the wire
/// format the drawing client produces.
#[derive(Debug, Clone, PartialEq)]
pub enum GeometryData {
    Rect(RectData),
    Circle(CircleData),
    Line(LineData),
    Pencil(Vec<Point>),
}

#[derive(Debug, thiserror::Error)]
#[error("payload does not parse as {kind:?} geometry: {source}")]
pub struct ParseGeometryError {
    kind: ShapeKind,
    source: serde_json::Error,
}

/// Parse a serialized geometry payload as the declared shape kind.
///
/// # Errors
///
/// Returns [`ParseGeometryError`] when the payload is not valid JSON for
/// that kind.
pub fn parse(kind: ShapeKind, raw: &str) -> Result<GeometryData, ParseGeometryError> {
    let wrap = |source| ParseGeometryError { kind, source };
    match kind {
        ShapeKind::Rect => serde_json::from_str(raw).map(GeometryData::Rect).map_err(wrap),
        ShapeKind::Circle => serde_json::from_str(raw).map(GeometryData::Circle).map_err(wrap),
        ShapeKind::Line => serde_json::from_str(raw).map(GeometryData::Line).map_err(wrap),
        ShapeKind::Pencil => serde_json::from_str(raw).map(GeometryData::Pencil).map_err(wrap),
    }
}

impl GeometryData {
    #[must_use]
    pub fn kind(&self) -> ShapeKind {
        match self {
            Self::Rect(_) => ShapeKind::Rect,
            Self::Circle(_) => ShapeKind::Circle,
            Self::Line(_) => ShapeKind::Line,
            Self::Pencil(_) => ShapeKind::Pencil,
        }
    }

    /// Canonical form with non-negative extents.
    ///
    /// A rect drawn by a negative drag delta has its origin moved so width
    /// and height come out positive; a circle's radius loses its sign. The
    /// visual result is unchanged.
    #[must_use]
    pub fn normalized(self) -> Self {
        match self {
            Self::Rect(mut r) => {
                if r.width < 0.0 {
                    r.x += r.width;
                    r.width = -r.width;
                }
                if r.height < 0.0 {
                    r.y += r.height;
                    r.height = -r.height;
                }
                Self::Rect(r)
            }
            Self::Circle(mut c) => {
                c.radius = c.radius.abs();
                Self::Circle(c)
            }
            other => other,
        }
    }

    /// Serialize back to the wire representation.
    #[must_use]
    pub fn to_json(&self) -> String {
        let result = match self {
            Self::Rect(r) => serde_json::to_string(r),
            Self::Circle(c) => serde_json::to_string(c),
            Self::Line(l) => serde_json::to_string(l),
            Self::Pencil(points) => serde_json::to_string(points),
        };
        result.unwrap_or_default()
    }
}

fn clamp(value: f64, min: f64, max: f64) -> f64 {
    value.max(min).min(max)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_rect_round_trip() {
        let raw = r#"{"x":10.0,"y":20.0,"width":30.0,"height":40.0}"#;
        let geo = parse(ShapeKind::Rect, raw).unwrap();
        assert_eq!(
            geo,
            GeometryData::Rect(RectData { x: 10.0, y: 20.0, width: 30.0, height: 40.0 })
        );
        let reparsed = parse(ShapeKind::Rect, &geo.to_json()).unwrap();
        assert_eq!(reparsed, geo);
    }

    #[test]
    fn parse_circle_uses_camel_case_fields() {
        let raw = r#"{"centerX":5.0,"centerY":6.0,"radius":7.0}"#;
        let geo = parse(ShapeKind::Circle, raw).unwrap();
        assert_eq!(
            geo,
            GeometryData::Circle(CircleData { center_x: 5.0, center_y: 6.0, radius: 7.0 })
        );
    }

    #[test]
    fn parse_pencil_is_bare_point_array() {
        let raw = r#"[{"x":1.0,"y":2.0},{"x":3.0,"y":4.0}]"#;
        let geo = parse(ShapeKind::Pencil, raw).unwrap();
        let GeometryData::Pencil(points) = geo else {
            panic!("expected pencil");
        };
        assert_eq!(points.len(), 2);
        assert_eq!(points[1], Point::new(3.0, 4.0));
    }

    #[test]
    fn parse_rejects_wrong_kind() {
        let raw = r#"{"centerX":5.0,"centerY":6.0,"radius":7.0}"#;
        assert!(parse(ShapeKind::Rect, raw).is_err());
    }

    #[test]
    fn normalize_flips_negative_rect_extents() {
        let geo = GeometryData::Rect(RectData { x: 100.0, y: 50.0, width: -40.0, height: -20.0 });
        let GeometryData::Rect(r) = geo.normalized() else {
            panic!("expected rect");
        };
        assert_eq!(r, RectData { x: 60.0, y: 30.0, width: 40.0, height: 20.0 });
    }

    #[test]
    fn normalize_absolutes_circle_radius() {
        let geo = GeometryData::Circle(CircleData { center_x: 0.0, center_y: 0.0, radius: -12.0 });
        let GeometryData::Circle(c) = geo.normalized() else {
            panic!("expected circle");
        };
        assert!((c.radius - 12.0).abs() < f64::EPSILON);
    }

    #[test]
    fn normalize_leaves_lines_alone() {
        let geo = GeometryData::Line(LineData { start_x: 9.0, start_y: 8.0, end_x: 1.0, end_y: 2.0 });
        assert_eq!(geo.clone().normalized(), geo);
    }
}
