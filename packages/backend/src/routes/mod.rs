mod health;
mod words;

use axum::middleware;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::Router;

use crate::middleware::cors::cors_headers_middleware;
use crate::response::AppError;
use crate::state::AppState;

/// Path of the serverless function this endpoint replaces; kept so existing
/// front ends keep working unchanged.
const LEGACY_GENERATE_PATH: &str = "/.netlify/functions/getWords";

pub fn router(state: AppState) -> Router {
    let mut app = Router::new();

    for path in ["/generate-words", LEGACY_GENERATE_PATH] {
        app = app.route(
            path,
            post(words::generate)
                .options(words::preflight)
                .fallback(words::method_not_allowed),
        );
    }

    app.nest("/health", health::router())
        .fallback(fallback_handler)
        .layer(middleware::from_fn(cors_headers_middleware))
        .with_state(state)
}

async fn fallback_handler() -> Response {
    AppError::not_found("Not found").into_response()
}
