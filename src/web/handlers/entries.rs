use crate::models::WriteEntry;
use crate::services::entries;
use crate::web::error::{error_body, AppResult};
use crate::web::state::AppState;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use std::sync::Arc;

/// POST /api/:plural
pub async fn create(state: Arc<AppState>, uid: String, input: WriteEntry) -> AppResult<Response> {
    let entry = entries::create_entry(
        &state.db,
        &state.config.schema,
        &state.config.slugs,
        &state.lifecycles,
        &uid,
        input,
    )?;
    let body = serde_json::json!({ "data": entry.to_json() });
    Ok((StatusCode::CREATED, Json(body)).into_response())
}

/// PUT /api/:plural/:document_id
pub async fn update(
    state: Arc<AppState>,
    uid: String,
    document_id: String,
    input: WriteEntry,
) -> AppResult<Response> {
    let updated = entries::update_entry(
        &state.db,
        &state.config.schema,
        &state.config.slugs,
        &state.lifecycles,
        &uid,
        &document_id,
        input,
    )?;
    match updated {
        Some(entry) => Ok(Json(serde_json::json!({ "data": entry.to_json() })).into_response()),
        None => Ok(error_body(StatusCode::NOT_FOUND, "Entry not found")),
    }
}
