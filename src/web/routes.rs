use super::handlers;
use super::state::AppState;
use crate::models::{ContentKind, WriteEntry};
use crate::services::lifecycle::content_types_with_slug;
use crate::services::lookup::LookupQuery;
use axum::extract::{Path, Query, State};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use std::collections::HashSet;
use std::sync::Arc;

/// `GET {prefix}/:plural/slug/:slug` for every content type with a slug field.
pub fn slug_routes(state: &AppState) -> Router<Arc<AppState>> {
    let prefix = state.config.server.api_prefix.trim_end_matches('/');
    let mut router = Router::new();
    let mut registered = HashSet::new();

    for ct in content_types_with_slug(&state.config.schema) {
        let Some(schema) = state.config.schema.content_type(&ct.uid) else {
            continue;
        };
        if schema.plural_name.is_empty() {
            tracing::warn!("Could not determine plural name for {}", ct.uid);
            continue;
        }

        let path = format!("{}/{}/slug/:slug", prefix, schema.plural_name);
        if !registered.insert(path.clone()) {
            tracing::info!("Route already exists, skipping: GET {}", path);
            continue;
        }
        tracing::info!("Registering route: GET {}", path);

        let uid = ct.uid;
        router = router.route(
            &path,
            get(
                move |State(state): State<Arc<AppState>>,
                      Path(slug): Path<String>,
                      Query(query): Query<LookupQuery>| async move {
                    handlers::slug::find_by_slug(state, uid, slug, query).await
                },
            ),
        );
    }

    router
}

/// Create and update endpoints for collection types.
pub fn entry_routes(state: &AppState) -> Router<Arc<AppState>> {
    let prefix = state.config.server.api_prefix.trim_end_matches('/');
    let mut router = Router::new();

    for (uid, schema) in &state.config.schema.content_types {
        if schema.kind != ContentKind::Collection {
            continue;
        }

        let create_uid = uid.clone();
        let update_uid = uid.clone();
        router = router
            .route(
                &format!("{}/{}", prefix, schema.plural_name),
                post(
                    move |State(state): State<Arc<AppState>>, Json(input): Json<WriteEntry>| async move {
                        handlers::entries::create(state, create_uid, input).await
                    },
                ),
            )
            .route(
                &format!("{}/{}/:document_id", prefix, schema.plural_name),
                put(
                    move |State(state): State<Arc<AppState>>,
                          Path(document_id): Path<String>,
                          Json(input): Json<WriteEntry>| async move {
                        handlers::entries::update(state, update_uid, document_id, input).await
                    },
                ),
            );
    }

    router
}
