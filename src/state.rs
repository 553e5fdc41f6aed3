//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor. The
//! gateway, room registry, and token verifier are trait objects so tests and
//! alternate deployments can substitute implementations without touching the
//! handlers. The live-connection counter backs the admission capacity check.

use std::sync::Arc;
use std::sync::atomic::AtomicUsize;
use std::time::Duration;

use crate::services::auth::TokenVerifier;
use crate::services::room::RoomRegistry;
use crate::services::shape::ShapeGateway;

const DEFAULT_MAX_CONNECTIONS: usize = 10_000;
const DEFAULT_HEARTBEAT_SECS: u64 = 30;

/// Per-process resource limits.
#[derive(Debug, Clone, Copy)]
pub struct Limits {
    /// Connection ceiling; admission is refused above this.
    pub max_connections: usize,
    /// Heartbeat ping interval. A connection that hasn't answered the
    /// previous ping by the next tick is terminated.
    pub heartbeat: Duration,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_connections: DEFAULT_MAX_CONNECTIONS,
            heartbeat: Duration::from_secs(DEFAULT_HEARTBEAT_SECS),
        }
    }
}

impl Limits {
    /// Read limits from `MAX_CONNECTIONS` / `HEARTBEAT_SECS`, falling back
    /// to defaults on missing or unparsable values.
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let max_connections = std::env::var("MAX_CONNECTIONS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.max_connections);
        let heartbeat = std::env::var("HEARTBEAT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .map_or(defaults.heartbeat, Duration::from_secs);
        Self { max_connections, heartbeat }
    }
}

/// Shared application state. Clone is required by Axum — all inner fields
/// are Arc-wrapped or Copy.
#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<dyn ShapeGateway>,
    pub rooms: Arc<dyn RoomRegistry>,
    pub verifier: Arc<dyn TokenVerifier>,
    pub limits: Limits,
    /// Number of admitted websocket connections.
    pub live_connections: Arc<AtomicUsize>,
}

impl AppState {
    #[must_use]
    pub fn new(
        gateway: Arc<dyn ShapeGateway>,
        rooms: Arc<dyn RoomRegistry>,
        verifier: Arc<dyn TokenVerifier>,
        limits: Limits,
    ) -> Self {
        Self {
            gateway,
            rooms,
            verifier,
            limits,
            live_connections: Arc::new(AtomicUsize::new(0)),
        }
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================

#[cfg(test)]
pub mod test_helpers {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicI64, Ordering};

    use crate::services::room::InProcessRegistry;
    use crate::services::shape::{GatewayError, NewShape, ShapeRecord};

    /// In-memory gateway assigning sequential ids, for handler tests.
    #[derive(Default)]
    pub struct MemoryGateway {
        next_id: AtomicI64,
        pub records: Mutex<Vec<ShapeRecord>>,
    }

    impl MemoryGateway {
        #[must_use]
        pub fn new() -> Self {
            Self { next_id: AtomicI64::new(1), records: Mutex::new(Vec::new()) }
        }
    }

    #[async_trait]
    impl crate::services::shape::ShapeGateway for MemoryGateway {
        async fn create(&self, shape: NewShape) -> Result<i64, GatewayError> {
            let id = self.next_id.fetch_add(1, Ordering::SeqCst);
            let mut records = self.records.lock().expect("gateway mutex");
            records.push(ShapeRecord {
                id,
                room_id: shape.room_id,
                kind: shape.kind,
                geometry: shape.geometry,
                stroke_color: shape.stroke_color,
                stroke_width: shape.stroke_width,
                background_color: shape.background_color,
                owner_user_id: shape.owner_user_id,
            });
            Ok(id)
        }

        async fn update(&self, id: i64, geometry: &str) -> Result<ShapeRecord, GatewayError> {
            let mut records = self.records.lock().expect("gateway mutex");
            let record = records
                .iter_mut()
                .find(|r| r.id == id)
                .ok_or(GatewayError::NotFound(id))?;
            record.geometry = geometry.to_string();
            Ok(record.clone())
        }

        async fn delete(&self, id: i64) -> Result<(), GatewayError> {
            let mut records = self.records.lock().expect("gateway mutex");
            let before = records.len();
            records.retain(|r| r.id != id);
            if records.len() == before {
                return Err(GatewayError::NotFound(id));
            }
            Ok(())
        }

        async fn list(&self, room_id: i64, limit: i64) -> Result<Vec<ShapeRecord>, GatewayError> {
            let records = self.records.lock().expect("gateway mutex");
            Ok(records
                .iter()
                .filter(|r| r.room_id == room_id)
                .take(usize::try_from(limit).unwrap_or(usize::MAX))
                .cloned()
                .collect())
        }
    }

    /// Gateway that fails every call, for persistence-error paths.
    pub struct FailingGateway;

    #[async_trait]
    impl crate::services::shape::ShapeGateway for FailingGateway {
        async fn create(&self, _shape: NewShape) -> Result<i64, GatewayError> {
            Err(GatewayError::Database(sqlx::Error::PoolClosed))
        }

        async fn update(&self, id: i64, _geometry: &str) -> Result<ShapeRecord, GatewayError> {
            let _ = id;
            Err(GatewayError::Database(sqlx::Error::PoolClosed))
        }

        async fn delete(&self, _id: i64) -> Result<(), GatewayError> {
            Err(GatewayError::Database(sqlx::Error::PoolClosed))
        }

        async fn list(&self, _room_id: i64, _limit: i64) -> Result<Vec<ShapeRecord>, GatewayError> {
            Err(GatewayError::Database(sqlx::Error::PoolClosed))
        }
    }

    /// Verifier accepting any token as a fixed user.
    pub struct AcceptAllVerifier(pub i64);

    impl crate::services::auth::TokenVerifier for AcceptAllVerifier {
        fn verify(&self, _token: &str) -> Option<i64> {
            Some(self.0)
        }
    }

    /// App state wired with the in-memory gateway and an accept-all verifier.
    #[must_use]
    pub fn test_app_state() -> AppState {
        AppState::new(
            Arc::new(MemoryGateway::new()),
            Arc::new(InProcessRegistry::new()),
            Arc::new(AcceptAllVerifier(1)),
            Limits::default(),
        )
    }

    /// App state whose gateway fails every call.
    #[must_use]
    pub fn failing_app_state() -> AppState {
        AppState::new(
            Arc::new(FailingGateway),
            Arc::new(InProcessRegistry::new()),
            Arc::new(AcceptAllVerifier(1)),
            Limits::default(),
        )
    }
}
