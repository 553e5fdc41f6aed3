//! sketchrelay — real-time shape synchronization over websockets.
//!
//! ARCHITECTURE
//! ============
//! - [`protocol`]: the wire format and its validation limits
//! - [`routes`]: Axum router, the websocket relay loop, shape listing
//! - [`services`]: room registry, shape store gateway, token verification
//! - [`geometry`]: pure shape math (hit-testing, handles, transforms)
//! - [`sync`]: the client-side session model (reconciliation, undo/redo)
//! - [`db`]: pool setup and migrations

pub mod db;
pub mod geometry;
pub mod protocol;
pub mod routes;
pub mod services;
pub mod state;
pub mod sync;
