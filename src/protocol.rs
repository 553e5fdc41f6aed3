//! Message protocol — the closed set of envelopes exchanged over the socket.
//!
//! DESIGN
//! ======
//! Every frame is `{ "type": <tag>, "payload": <object> }` (text frames).
//! Client-to-relay messages are parsed through [`parse_client_message`],
//! which enforces the field-level limits (message size, geometry size,
//! stroke-width bounds, color format), rejects unknown payload fields, and
//! canonicalizes geometry *before* any handler runs. A message that fails here produces an `error` reply
//! and never mutates state.
//!
//! The one exception to the envelope shape is the error reply, which the
//! original wire format carries as `{ "type": "error", "message": ... }`
//! with no payload object.

use serde::{Deserialize, Serialize};

use crate::geometry;

// =============================================================================
// LIMITS
// =============================================================================

/// Maximum size of one inbound text frame, in bytes.
pub const MESSAGE_SIZE_LIMIT: usize = 100_000;

/// Maximum size of a serialized geometry payload, in bytes.
pub const MAX_GEOMETRY_BYTES: usize = 65_536;

/// Inclusive stroke-width bounds.
pub const MIN_STROKE_WIDTH: i32 = 1;
pub const MAX_STROKE_WIDTH: i32 = 20;

// =============================================================================
// SHAPE
// =============================================================================

/// Drawable primitive kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    Rect,
    Circle,
    Line,
    Pencil,
}

impl ShapeKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Rect => "rect",
            Self::Circle => "circle",
            Self::Line => "line",
            Self::Pencil => "pencil",
        }
    }
}

impl std::str::FromStr for ShapeKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, ()> {
        match s {
            "rect" => Ok(Self::Rect),
            "circle" => Ok(Self::Circle),
            "line" => Ok(Self::Line),
            "pencil" => Ok(Self::Pencil),
            _ => Err(()),
        }
    }
}

/// A drawable shape as both sides of the connection see it.
///
/// Confirmation state: a shape carries a canonical `id` once the store has
/// assigned one; until then it is unconfirmed and identified only by the
/// client-generated `temp_id`. Shapes loaded from the store have no temp id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Shape {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temp_id: Option<String>,
    #[serde(rename = "type")]
    pub kind: ShapeKind,
    /// Serialized kind-specific payload; see [`crate::geometry`].
    pub geometry: String,
    pub stroke_color: String,
    pub stroke_width: i32,
    pub background_color: String,
    pub room_id: i64,
    pub owner_user_id: i64,
}

// =============================================================================
// CLIENT -> RELAY
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum ClientMessage {
    JoinRoom(JoinRoom),
    LeaveRoom(LeaveRoom),
    Shape(ShapeSubmit),
    Undo(UndoRequest),
    Redo(RedoRequest),
    Update(UpdateRequest),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct JoinRoom {
    pub room_id: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct LeaveRoom {
    pub room_id: i64,
}

/// A new, optimistically rendered shape being submitted for persistence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ShapeSubmit {
    pub temp_id: String,
    #[serde(rename = "type")]
    pub kind: ShapeKind,
    pub geometry: String,
    pub stroke_color: String,
    pub stroke_width: i32,
    pub background_color: String,
    pub room_id: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UndoRequest {
    pub room_id: i64,
    /// Canonical id of the shape to remove.
    pub id: i64,
}

/// Resubmission of a previously undone shape as a *new* create. The store
/// assigns a fresh id; the original id (if any) is ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RedoRequest {
    pub shape: Shape,
    pub room_id: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateRequest {
    pub id: i64,
    pub geometry: String,
    pub room_id: i64,
}

// =============================================================================
// RELAY -> CLIENT
// =============================================================================

/// Events fanned out to room members.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum ServerEvent {
    /// A confirmed shape: carries the canonical id plus the originating
    /// client's temp id for reconciliation.
    Shape(Shape),
    Undo(UndoEvent),
    Update(UpdateEvent),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UndoEvent {
    pub room_id: i64,
    pub id: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEvent {
    pub id: i64,
    pub geometry: String,
    pub room_id: i64,
}

/// Error reply to the sending connection. Never closes the connection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorReply {
    #[serde(rename = "type")]
    pub kind: String,
    pub message: String,
}

impl ErrorReply {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self { kind: "error".into(), message: message.into() }
    }
}

// =============================================================================
// VALIDATION
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("message exceeds {MESSAGE_SIZE_LIMIT} bytes")]
    MessageTooLarge,
    #[error("invalid message format: {0}")]
    Malformed(String),
    #[error("geometry exceeds {MAX_GEOMETRY_BYTES} bytes")]
    GeometryTooLarge,
    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),
    #[error("stroke width must be between {MIN_STROKE_WIDTH} and {MAX_STROKE_WIDTH}, got {0}")]
    InvalidStrokeWidth(i32),
    #[error("color must be a #RRGGBB hex string, got {0:?}")]
    InvalidColor(String),
}

/// Parse and validate one inbound text frame.
///
/// Shape-carrying messages come back with their geometry canonicalized:
/// parsed as the declared kind, normalized (non-negative extents), and
/// re-serialized. Handlers downstream can trust the geometry string.
///
/// # Errors
///
/// Returns a [`ProtocolError`] describing the first violated limit; the
/// caller reports it as an `error` reply and drops the message.
pub fn parse_client_message(text: &str) -> Result<ClientMessage, ProtocolError> {
    if text.len() > MESSAGE_SIZE_LIMIT {
        return Err(ProtocolError::MessageTooLarge);
    }
    let mut msg: ClientMessage =
        serde_json::from_str(text).map_err(|e| ProtocolError::Malformed(e.to_string()))?;
    validate(&mut msg)?;
    Ok(msg)
}

fn validate(msg: &mut ClientMessage) -> Result<(), ProtocolError> {
    match msg {
        ClientMessage::Shape(submit) => {
            validate_style(&submit.stroke_color, submit.stroke_width, &submit.background_color)?;
            submit.geometry = canonical_geometry(submit.kind, &submit.geometry)?;
        }
        ClientMessage::Redo(redo) => {
            let shape = &mut redo.shape;
            validate_style(&shape.stroke_color, shape.stroke_width, &shape.background_color)?;
            shape.geometry = canonical_geometry(shape.kind, &shape.geometry)?;
        }
        ClientMessage::Update(update) => {
            // The kind isn't on the wire for updates, so only the size cap
            // applies here; the store rejects unknown ids.
            if update.geometry.len() > MAX_GEOMETRY_BYTES {
                return Err(ProtocolError::GeometryTooLarge);
            }
        }
        ClientMessage::JoinRoom(_) | ClientMessage::LeaveRoom(_) | ClientMessage::Undo(_) => {}
    }
    Ok(())
}

fn validate_style(stroke_color: &str, stroke_width: i32, background_color: &str) -> Result<(), ProtocolError> {
    if !(MIN_STROKE_WIDTH..=MAX_STROKE_WIDTH).contains(&stroke_width) {
        return Err(ProtocolError::InvalidStrokeWidth(stroke_width));
    }
    if !is_hex_color(stroke_color) {
        return Err(ProtocolError::InvalidColor(stroke_color.to_string()));
    }
    if !is_hex_color(background_color) {
        return Err(ProtocolError::InvalidColor(background_color.to_string()));
    }
    Ok(())
}

fn canonical_geometry(kind: ShapeKind, raw: &str) -> Result<String, ProtocolError> {
    if raw.len() > MAX_GEOMETRY_BYTES {
        return Err(ProtocolError::GeometryTooLarge);
    }
    let parsed = geometry::parse(kind, raw).map_err(|e| ProtocolError::InvalidGeometry(e.to_string()))?;
    Ok(parsed.normalized().to_json())
}

fn is_hex_color(s: &str) -> bool {
    let Some(rest) = s.strip_prefix('#') else {
        return false;
    };
    rest.len() == 6 && rest.bytes().all(|b| b.is_ascii_hexdigit())
}

#[cfg(test)]
#[path = "protocol_test.rs"]
mod tests;
