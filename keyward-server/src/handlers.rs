use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde_json::{Value, json};
use tracing::debug;

use crate::api::{
    ApiResponse, IsAdminResponse, LoginRequest, LoginResponse, RegisterRequest,
    RegisterResponse, ValidateRequest, ValidateResponse,
};
use crate::errors::{AppError, AppResult};
use crate::state::AppState;

pub async fn register_handler(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<RegisterResponse>>)> {
    require("email", &request.email)?;
    require("password", &request.password)?;
    if request.app_id == 0 {
        return Err(AppError::bad_request("app_id is required"));
    }

    let user_id = state
        .guarded(
            state
                .service
                .register(&request.email, &request.password, request.app_id),
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(RegisterResponse { user_id })),
    ))
}

pub async fn login_handler(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> AppResult<Json<ApiResponse<LoginResponse>>> {
    require("email", &request.email)?;
    require("password", &request.password)?;

    let token = state
        .guarded(state.service.login(&request.email, &request.password))
        .await?;

    Ok(Json(ApiResponse::success(LoginResponse { token })))
}

pub async fn is_admin_handler(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> AppResult<Json<ApiResponse<IsAdminResponse>>> {
    if user_id <= 0 {
        return Err(AppError::bad_request("user_id must be positive"));
    }

    let is_admin = state
        .guarded(state.service.check_is_admin(user_id))
        .await?;

    Ok(Json(ApiResponse::success(IsAdminResponse { is_admin })))
}

pub async fn validate_handler(
    State(state): State<AppState>,
    Json(request): Json<ValidateRequest>,
) -> AppResult<Json<ApiResponse<ValidateResponse>>> {
    require("token", &request.token)?;
    if request.app_id == 0 {
        return Err(AppError::bad_request("app_id is required"));
    }

    let claims = state
        .guarded(state.service.validate_token(&request.token, request.app_id))
        .await?;

    Ok(Json(ApiResponse::success(claims.into())))
}

pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    debug!("health check");
    Json(json!({
        "status": "healthy",
        "env": state.config.env.as_str(),
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

fn require(field: &str, value: &str) -> AppResult<()> {
    if value.trim().is_empty() {
        Err(AppError::bad_request(format!("{field} is required")))
    } else {
        Ok(())
    }
}
