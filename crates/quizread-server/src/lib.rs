//! HTTP boundary for the quizread backend: one dynamic concept route in
//! front of the passthrough table and the sync engine.

pub mod error;
pub mod passthrough;
pub mod registry;
pub mod routes;
pub mod state;
pub mod syncs;

use axum::routing::post;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Build the axum Router with the dispatch route and middleware.
/// Used by `serve()` and available for integration testing.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/{concept}/{operation}", post(routes::dispatch))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Start the API server.
pub async fn serve(state: AppState, port: u16) -> anyhow::Result<()> {
    let app = build_router(state);

    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("quizread API listening on http://localhost:{port}");

    axum::serve(listener, app).await?;
    Ok(())
}
