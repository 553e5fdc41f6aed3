use std::sync::Arc;

use sketchrelay::services::auth::HmacTokenVerifier;
use sketchrelay::services::room::InProcessRegistry;
use sketchrelay::services::shape::PgShapeGateway;
use sketchrelay::state::{AppState, Limits};
use sketchrelay::{db, routes};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
    let token_secret = std::env::var("TOKEN_SECRET").expect("TOKEN_SECRET required");
    let port: u16 = std::env::var("PORT")
        .unwrap_or_else(|_| "3000".into())
        .parse()
        .expect("invalid PORT");

    let pool = db::init_pool(&database_url)
        .await
        .expect("database init failed");

    let limits = Limits::from_env();
    let state = AppState::new(
        Arc::new(PgShapeGateway::new(pool)),
        Arc::new(InProcessRegistry::new()),
        Arc::new(HmacTokenVerifier::new(token_secret)),
        limits,
    );

    let app = routes::router(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}"))
        .await
        .expect("failed to bind");

    tracing::info!(%port, max_connections = limits.max_connections, "sketchrelay listening");
    axum::serve(listener, app).await.expect("server failed");
}
