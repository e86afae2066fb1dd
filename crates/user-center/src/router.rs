//! HTTP routing.

use axum::{
    http::{header, HeaderValue, Method},
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers::{self, middleware};
use crate::state::AppState;

/// Build the application router with all routes.
pub fn build_router(state: AppState) -> Router {
    // Health check routes (no session)
    let health_routes = Router::new()
        .route("/health", get(handlers::health_check))
        .route("/api/health", get(handlers::api_health));

    let user_routes = Router::new()
        .route("/user/register", post(handlers::user::register))
        .route("/user/login", post(handlers::user::login))
        .route("/user/get/login", get(handlers::user::get_login_user))
        .route("/user/logout", post(handlers::user::logout));

    let admin_routes = Router::new()
        .route(
            "/user/list/page/vo",
            post(handlers::user::list_user_vo_by_page),
        )
        .route_layer(from_fn_with_state(state.clone(), middleware::admin_middleware));

    let session_routes = user_routes
        .merge(admin_routes)
        .layer(from_fn_with_state(state.clone(), middleware::session_middleware));

    Router::new()
        .merge(health_routes)
        .merge(session_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&state.config.cors_allowed_origins))
        .with_state(state)
}

/// Credentialed CORS for the configured front-end origins.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(origin = %origin, error = %e, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
        .allow_credentials(true)
}
