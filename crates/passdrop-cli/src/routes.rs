//! HTTP route definitions

use crate::{AppState, handlers, middleware};
use axum::{
    Router,
    body::Body,
    extract::DefaultBodyLimit,
    http::Request,
    middleware as axum_middleware,
    routing::get,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

/// Room for multipart boundaries and part headers on top of the file itself
pub const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Create the main router
pub fn create_router(state: Arc<AppState>) -> Router {
    let body_limit = usize::try_from(state.config.drop.max_upload_size)
        .unwrap_or(usize::MAX)
        .saturating_add(MULTIPART_OVERHEAD);
    let base_path = state.config.normalized_base_path();

    let routes = Router::new()
        // Service endpoints
        .route(
            "/",
            get(handlers::index)
                .head(handlers::policy)
                .put(handlers::missing_name)
                .post(handlers::missing_name),
        )
        .route("/favicon.ico", get(handlers::favicon))
        // `{key}` is the upload name for PUT/POST and the passphrase otherwise
        .route(
            "/{key}",
            get(handlers::download)
                .put(handlers::put_upload)
                .post(handlers::post_upload)
                .delete(handlers::delete_upload),
        )
        .route("/{key}/{name}", get(handlers::download_named))
        // Apply middleware
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http().make_span_with(make_span))
                .layer(axum_middleware::from_fn(middleware::request_id_middleware))
                .layer(axum_middleware::from_fn(middleware::logging_middleware)),
        )
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state);

    if base_path.is_empty() {
        routes
    } else {
        Router::new().nest(&base_path, routes)
    }
}

fn make_span(request: &Request<Body>) -> tracing::Span {
    tracing::info_span!(
        "request",
        method = %request.method(),
        route = %middleware::route_label(request),
    )
}
