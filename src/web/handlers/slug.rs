use crate::services::entries::Documents;
use crate::services::lookup::{LookupQuery, SlugLookup};
use crate::web::state::AppState;
use axum::response::{IntoResponse, Json, Response};
use std::sync::Arc;

/// GET /api/:plural/slug/:slug
pub async fn find_by_slug(
    state: Arc<AppState>,
    uid: String,
    slug: String,
    query: LookupQuery,
) -> Response {
    let documents = Documents::new(&state.db, &state.config.schema);
    let lookup = SlugLookup::new(&state.config.slugs, &documents, &state.config.schema);

    match lookup.find_by_slug(Some(&uid), Some(&slug), &query) {
        Ok(entity) => Json(serde_json::json!({ "data": entity })).into_response(),
        Err(e) => e.into_response(),
    }
}
