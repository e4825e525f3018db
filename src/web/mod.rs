mod error;
mod handlers;
mod routes;
mod state;

pub use state::AppState;

use crate::{Config, Database};
use anyhow::Result;
use axum::body::Body;
use axum::extract::State;
use axum::http::{Request, Uri};
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::Router;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;

pub async fn serve(config: Config, db: Database, addr: &str) -> Result<()> {
    let state = Arc::new(AppState::new(config, db));
    let app = router(state);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(routes::slug_routes(&state))
        .merge(routes::entry_routes(&state))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            populate_patterns_middleware,
        ))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn populate_patterns_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    if state.patterns.is_empty() {
        return next.run(request).await;
    }

    let path = request.uri().path().to_string();
    if let Some(query) = state.patterns.apply(&path, request.uri().query()) {
        match format!("{}?{}", path, query).parse::<Uri>() {
            Ok(uri) => *request.uri_mut() = uri,
            Err(e) => tracing::warn!("Could not apply populate pattern to {}: {}", path, e),
        }
    }

    next.run(request).await
}
