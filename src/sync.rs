//! Client-side canvas session — optimistic local state plus undo/redo.
//!
//! DESIGN
//! ======
//! [`CanvasSession`] mirrors what a connected client holds: the ordered list
//! of shapes it is rendering, a redo stack, and the baseline count of shapes
//! that existed when it joined. Methods come in two flavors:
//!
//! - Local intents (`create_shape`, `undo`, `redo`, `commit_geometry`) mutate
//!   the session optimistically and return the [`ClientMessage`] to send, if
//!   one is due.
//! - [`CanvasSession::apply`] folds an inbound [`ServerEvent`] into the
//!   session. Echoes of the session's own submissions are recognized by
//!   temp id and reconciled in place rather than appended, so a shape never
//!   appears twice. Applying the same event again is a no-op.
//!
//! Undo below the baseline is refused: a client may only retract shapes it
//! watched appear during its own session. Redo is non-restoring — it
//! resubmits the shape as a brand-new create and the store assigns a fresh
//! canonical id.

use uuid::Uuid;

use crate::protocol::{
    ClientMessage, RedoRequest, ServerEvent, Shape, ShapeKind, ShapeSubmit, UndoRequest,
    UpdateRequest,
};

/// Style and geometry for a shape the user just drew.
#[derive(Debug, Clone)]
pub struct ShapeDraft {
    pub kind: ShapeKind,
    pub geometry: String,
    pub stroke_color: String,
    pub stroke_width: i32,
    pub background_color: String,
}

pub struct CanvasSession {
    room_id: i64,
    user_id: i64,
    shapes: Vec<Shape>,
    redo_stack: Vec<Shape>,
    /// Number of shapes present at join time; undo never reaches below it.
    baseline: usize,
}

impl CanvasSession {
    /// Start a session over the shapes loaded from the store at join time.
    #[must_use]
    pub fn new(room_id: i64, user_id: i64, loaded: Vec<Shape>) -> Self {
        let baseline = loaded.len();
        Self {
            room_id,
            user_id,
            shapes: loaded,
            redo_stack: Vec::new(),
            baseline,
        }
    }

    #[must_use]
    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.shapes.len() > self.baseline
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Render a freshly drawn shape immediately and produce its submission.
    ///
    /// The shape enters the session unconfirmed, identified by a generated
    /// temp id until the echoed broadcast supplies the canonical id. Drawing
    /// anything new invalidates the redo stack.
    pub fn create_shape(&mut self, draft: ShapeDraft) -> ClientMessage {
        let temp_id = Uuid::new_v4().to_string();
        self.shapes.push(Shape {
            id: None,
            temp_id: Some(temp_id.clone()),
            kind: draft.kind,
            geometry: draft.geometry.clone(),
            stroke_color: draft.stroke_color.clone(),
            stroke_width: draft.stroke_width,
            background_color: draft.background_color.clone(),
            room_id: self.room_id,
            owner_user_id: self.user_id,
        });
        self.redo_stack.clear();
        ClientMessage::Shape(ShapeSubmit {
            temp_id,
            kind: draft.kind,
            geometry: draft.geometry,
            stroke_color: draft.stroke_color,
            stroke_width: draft.stroke_width,
            background_color: draft.background_color,
            room_id: self.room_id,
        })
    }

    /// Fold a relay broadcast into the session.
    ///
    /// Events carrying a different room id are ignored: a client holding
    /// sessions for several rooms over one socket routes each event to the
    /// session it belongs to, and the others must not flinch.
    pub fn apply(&mut self, event: &ServerEvent) {
        let room_id = match event {
            ServerEvent::Shape(shape) => shape.room_id,
            ServerEvent::Undo(undo) => undo.room_id,
            ServerEvent::Update(update) => update.room_id,
        };
        if room_id != self.room_id {
            return;
        }
        match event {
            ServerEvent::Shape(shape) => self.apply_shape(shape),
            ServerEvent::Undo(undo) => {
                if let Some(pos) = self.shapes.iter().position(|s| s.id == Some(undo.id)) {
                    let removed = self.shapes.remove(pos);
                    self.redo_stack.push(removed);
                }
            }
            ServerEvent::Update(update) => {
                if let Some(shape) = self.shapes.iter_mut().find(|s| s.id == Some(update.id)) {
                    shape.geometry.clone_from(&update.geometry);
                }
            }
        }
    }

    fn apply_shape(&mut self, incoming: &Shape) {
        // Echo of our own submission: confirm in place.
        if let Some(temp_id) = &incoming.temp_id
            && let Some(own) = self
                .shapes
                .iter_mut()
                .find(|s| s.temp_id.as_deref() == Some(temp_id.as_str()))
        {
            own.id = incoming.id;
            return;
        }
        // Replayed broadcast of a shape we already hold.
        if incoming.id.is_some() && self.shapes.iter().any(|s| s.id == incoming.id) {
            return;
        }
        self.shapes.push(incoming.clone());
    }

    /// Retract the most recent shape, if the baseline allows it.
    ///
    /// The shape leaves the canvas immediately either way; a wire message is
    /// produced only once the store has confirmed an id to delete by. Undoing
    /// a still-unconfirmed shape is purely local.
    pub fn undo(&mut self) -> Option<ClientMessage> {
        if !self.can_undo() {
            return None;
        }
        let shape = self.shapes.pop()?;
        let id = shape.id;
        self.redo_stack.push(shape);
        id.map(|id| ClientMessage::Undo(UndoRequest { room_id: self.room_id, id }))
    }

    /// Resubmit the most recently undone shape as a new create.
    pub fn redo(&mut self) -> Option<ClientMessage> {
        let mut shape = self.redo_stack.pop()?;
        shape.id = None;
        shape.temp_id = Some(Uuid::new_v4().to_string());
        self.shapes.push(shape.clone());
        Some(ClientMessage::Redo(RedoRequest { shape, room_id: self.room_id }))
    }

    /// Finish a move/resize gesture on a confirmed shape.
    ///
    /// Intermediate gesture frames stay local; only the final geometry goes
    /// to the wire. Returns `None` for ids the session doesn't hold or
    /// shapes not yet confirmed.
    pub fn commit_geometry(&mut self, id: i64, geometry: String) -> Option<ClientMessage> {
        let shape = self.shapes.iter_mut().find(|s| s.id == Some(id))?;
        shape.geometry.clone_from(&geometry);
        Some(ClientMessage::Update(UpdateRequest { id, geometry, room_id: self.room_id }))
    }
}

#[cfg(test)]
#[path = "sync_test.rs"]
mod tests;
