//! Shape store gateway — the durable-storage boundary.
//!
//! DESIGN
//! ======
//! The relay never talks to Postgres directly; every persistence side effect
//! goes through [`ShapeGateway`]: `create`, `update`, `delete`, `list`.
//! Canonical shape ids exist only on the other side of this boundary — the
//! store assigns them, the relay just hands them out. [`PgShapeGateway`] is
//! the production implementation; tests substitute in-memory ones.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::protocol::{Shape, ShapeKind};

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("shape not found: {0}")]
    NotFound(i64),
    #[error("stored shape {id} has unknown kind {kind:?}")]
    InvalidKind { id: i64, kind: String },
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Fields of a shape about to be persisted. Geometry is already validated
/// and canonicalized by the protocol layer.
#[derive(Debug, Clone)]
pub struct NewShape {
    pub room_id: i64,
    pub kind: ShapeKind,
    pub geometry: String,
    pub stroke_color: String,
    pub stroke_width: i32,
    pub background_color: String,
    pub owner_user_id: i64,
}

/// A persisted shape row.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeRecord {
    pub id: i64,
    pub room_id: i64,
    pub kind: ShapeKind,
    pub geometry: String,
    pub stroke_color: String,
    pub stroke_width: i32,
    pub background_color: String,
    pub owner_user_id: i64,
}

impl ShapeRecord {
    /// Convert to the wire representation. Loaded shapes carry no temp id.
    #[must_use]
    pub fn into_shape(self) -> Shape {
        Shape {
            id: Some(self.id),
            temp_id: None,
            kind: self.kind,
            geometry: self.geometry,
            stroke_color: self.stroke_color,
            stroke_width: self.stroke_width,
            background_color: self.background_color,
            room_id: self.room_id,
            owner_user_id: self.owner_user_id,
        }
    }
}

#[async_trait]
pub trait ShapeGateway: Send + Sync {
    /// Persist a new shape and return its freshly assigned canonical id.
    async fn create(&self, shape: NewShape) -> Result<i64, GatewayError>;

    /// Replace a shape's geometry, returning the updated record.
    async fn update(&self, id: i64, geometry: &str) -> Result<ShapeRecord, GatewayError>;

    /// Delete a shape by canonical id.
    async fn delete(&self, id: i64) -> Result<(), GatewayError>;

    /// List a room's shapes in creation order, up to `limit`.
    async fn list(&self, room_id: i64, limit: i64) -> Result<Vec<ShapeRecord>, GatewayError>;
}

// =============================================================================
// POSTGRES IMPLEMENTATION
// =============================================================================

type ShapeRow = (i64, i64, String, String, String, i32, String, i64);

fn record_from_row(row: ShapeRow) -> Result<ShapeRecord, GatewayError> {
    let (id, room_id, kind, geometry, stroke_color, stroke_width, background_color, owner_user_id) = row;
    let kind = kind
        .parse::<ShapeKind>()
        .map_err(|()| GatewayError::InvalidKind { id, kind })?;
    Ok(ShapeRecord {
        id,
        room_id,
        kind,
        geometry,
        stroke_color,
        stroke_width,
        background_color,
        owner_user_id,
    })
}

pub struct PgShapeGateway {
    pool: PgPool,
}

impl PgShapeGateway {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ShapeGateway for PgShapeGateway {
    async fn create(&self, shape: NewShape) -> Result<i64, GatewayError> {
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO shapes (room_id, kind, geometry, stroke_color, stroke_width, background_color, owner_user_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING id",
        )
        .bind(shape.room_id)
        .bind(shape.kind.as_str())
        .bind(&shape.geometry)
        .bind(&shape.stroke_color)
        .bind(shape.stroke_width)
        .bind(&shape.background_color)
        .bind(shape.owner_user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(id)
    }

    async fn update(&self, id: i64, geometry: &str) -> Result<ShapeRecord, GatewayError> {
        let row: Option<ShapeRow> = sqlx::query_as(
            "UPDATE shapes SET geometry = $2 WHERE id = $1 \
             RETURNING id, room_id, kind, geometry, stroke_color, stroke_width, background_color, owner_user_id",
        )
        .bind(id)
        .bind(geometry)
        .fetch_optional(&self.pool)
        .await?;

        let row = row.ok_or(GatewayError::NotFound(id))?;
        record_from_row(row)
    }

    async fn delete(&self, id: i64) -> Result<(), GatewayError> {
        let result = sqlx::query("DELETE FROM shapes WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(GatewayError::NotFound(id));
        }
        Ok(())
    }

    async fn list(&self, room_id: i64, limit: i64) -> Result<Vec<ShapeRecord>, GatewayError> {
        let rows: Vec<ShapeRow> = sqlx::query_as(
            "SELECT id, room_id, kind, geometry, stroke_color, stroke_width, background_color, owner_user_id \
             FROM shapes WHERE room_id = $1 ORDER BY id ASC LIMIT $2",
        )
        .bind(room_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(record_from_row).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: i64) -> ShapeRecord {
        ShapeRecord {
            id,
            room_id: 7,
            kind: ShapeKind::Rect,
            geometry: r#"{"x":0.0,"y":0.0,"width":20.0,"height":20.0}"#.into(),
            stroke_color: "#FFFFFF".into(),
            stroke_width: 2,
            background_color: "#000000".into(),
            owner_user_id: 3,
        }
    }

    #[test]
    fn into_shape_keeps_id_and_drops_temp_id() {
        let shape = record(31).into_shape();
        assert_eq!(shape.id, Some(31));
        assert_eq!(shape.temp_id, None);
        assert_eq!(shape.kind, ShapeKind::Rect);
        assert_eq!(shape.room_id, 7);
    }

    #[test]
    fn record_from_row_rejects_unknown_kind() {
        let row: ShapeRow = (5, 7, "hexagon".into(), "{}".into(), "#FFFFFF".into(), 2, "#000000".into(), 3);
        let err = record_from_row(row).unwrap_err();
        assert!(matches!(err, GatewayError::InvalidKind { id: 5, .. }));
    }

    #[test]
    fn record_from_row_parses_every_kind() {
        for kind in ["rect", "circle", "line", "pencil"] {
            let row: ShapeRow = (1, 1, kind.into(), "{}".into(), "#FFFFFF".into(), 1, "#000000".into(), 1);
            assert!(record_from_row(row).is_ok(), "{kind}");
        }
    }
}
