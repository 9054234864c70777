use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::api::{HEALTH, v1};
use crate::handlers::{
    health_handler, is_admin_handler, login_handler, register_handler, validate_handler,
};
use crate::state::AppState;

pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .route(v1::REGISTER, post(register_handler))
        .route(v1::LOGIN, post(login_handler))
        .route(v1::VALIDATE, post(validate_handler))
        .route(v1::USER_ADMIN, get(is_admin_handler))
}

pub fn create_app(state: AppState) -> Router {
    create_api_router()
        .route(HEALTH, get(health_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
