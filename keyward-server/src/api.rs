//! Wire types and route paths of the v1 HTTP API.

use chrono::{DateTime, Utc};
use keyward_core::{AppId, TokenClaims, UserId};
use serde::{Deserialize, Serialize};

pub mod v1 {
    pub const REGISTER: &str = "/v1/auth/register";
    pub const LOGIN: &str = "/v1/auth/login";
    pub const VALIDATE: &str = "/v1/auth/validate";
    pub const USER_ADMIN: &str = "/v1/users/{id}/admin";

    pub fn user_admin(id: i64) -> String {
        format!("/v1/users/{id}/admin")
    }
}

pub const HEALTH: &str = "/health";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub status: String,
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            status: "success".to_string(),
            data,
        }
    }
}

// Missing fields deserialize to empty values so they fail validation with a
// 400 rather than a body rejection.

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub app_id: AppId,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ValidateRequest {
    pub token: String,
    pub app_id: AppId,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub user_id: UserId,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct IsAdminResponse {
    pub is_admin: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ValidateResponse {
    pub user_id: UserId,
    pub email: String,
    pub app_id: AppId,
    pub expires_at: DateTime<Utc>,
}

impl From<TokenClaims> for ValidateResponse {
    fn from(claims: TokenClaims) -> Self {
        Self {
            user_id: claims.user_id,
            email: claims.email,
            app_id: claims.app_id,
            expires_at: claims.expires_at,
        }
    }
}
