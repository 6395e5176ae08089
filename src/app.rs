use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    middleware,
    routing::{get, put},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::SecurityConfig;
use crate::handlers::{elevated, public};
use crate::middleware::admin_auth_middleware;
use crate::state::AppState;

/// Assemble the full router around an already-built state
pub fn app(state: AppState) -> Router {
    let cors = cors_layer(&state.config.security);
    let body_limit = state.config.api.max_request_size_bytes;

    Router::new()
        // Public
        .route("/", get(public::service::root))
        .route("/health", get(public::service::health))
        .merge(school_routes())
        .merge(user_routes())
        // Elevated
        .merge(admin_routes(state.clone()))
        // Global middleware
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn school_routes() -> Router<AppState> {
    use public::schools;

    Router::new()
        .route("/api/schools", get(schools::list).post(schools::create))
        .route(
            "/api/schools/:id",
            get(schools::show)
                .put(schools::update)
                .delete(schools::delete),
        )
}

fn user_routes() -> Router<AppState> {
    use public::users;

    Router::new()
        .route("/api/users", get(users::list))
        .route("/api/users/:id", get(users::show))
        .route("/api/users/:id/name", put(users::update_name))
}

fn admin_routes(state: AppState) -> Router<AppState> {
    use elevated::users;

    Router::new()
        .route("/api/admin/users", get(users::list))
        .route("/api/admin/users/:id", axum::routing::delete(users::delete))
        .route_layer(middleware::from_fn_with_state(state, admin_auth_middleware))
}

fn cors_layer(security: &SecurityConfig) -> CorsLayer {
    if security.cors_origins.is_empty() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin {:?}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}
