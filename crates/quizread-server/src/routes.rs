//! The single dynamic dispatch route.

use axum::extract::{Path, State};
use axum::Json;
use quizread_core::FieldMap;
use quizread_engine::{Concepts, Result as EngineResult, RouteKind};
use serde_json::Value;

use crate::error::AppError;
use crate::state::AppState;

/// POST /api/{concept}/{operation}
///
/// Resolves the route against the startup table: passthrough routes call
/// the operation directly, synced routes run the full engine pipeline.
/// Concept calls touch redb synchronously, so both paths run on the
/// blocking pool.
pub async fn dispatch(
    State(state): State<AppState>,
    Path((concept, operation)): Path<(String, String)>,
    body: Option<Json<FieldMap>>,
) -> Result<Json<Value>, AppError> {
    let input = body.map(|Json(map)| map).unwrap_or_default();
    let path = format!("/{concept}/{operation}");

    let Some(kind) = state.routes.kind(&path) else {
        tracing::debug!(%path, "unknown route");
        return Err(AppError::not_found(format!("no route /api{path}")));
    };

    let value = tokio::task::spawn_blocking(move || -> EngineResult<Value> {
        match kind {
            RouteKind::Passthrough => {
                if operation.starts_with('_') {
                    state.app.invoke_query(&concept, &operation, &input)
                } else {
                    let outcome = state.app.invoke_action(&concept, &operation, &input)?;
                    Ok(outcome.to_value())
                }
            }
            RouteKind::Synced => state.engine.handle_request(&path, input),
        }
    })
    .await??;

    Ok(Json(value))
}
