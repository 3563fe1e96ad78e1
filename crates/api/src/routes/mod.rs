//! API routes

pub mod administration;
pub mod health;

use axum::{
    middleware,
    routing::{delete, get, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{auth::require_auth, security::security_headers_middleware, state::AppState};

/// Create all API routes
pub fn create_router(state: AppState) -> Router {
    let auth_state = state.auth_state();

    // Health check routes (at root level for infrastructure monitoring)
    let health_routes = Router::new()
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness));

    // Server administration (super-admin check inside handlers)
    let administration_routes = Router::new()
        .route("/organizations", get(administration::list_organizations))
        .route("/users", get(administration::list_users))
        .route("/users/:user_id", delete(administration::delete_user))
        .route("/users/:user_id/disable", put(administration::disable_user))
        .route("/users/:user_id/enable", put(administration::enable_user))
        .route("/users/:user_id/set-role/:role", put(administration::set_role))
        .route("/users/:user_id/generate-token", get(administration::generate_user_token))
        .layer(middleware::from_fn_with_state(auth_state, require_auth));

    // Administration endpoints accept requests from any origin
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .merge(health_routes)
        .nest("/v2/administration", administration_routes)
        .layer(middleware::from_fn(security_headers_middleware))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
