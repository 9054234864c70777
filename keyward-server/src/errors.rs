use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use keyward_core::CredentialError;
use serde_json::json;
use std::fmt;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn internal() -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "internal server error")
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, message)
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(StatusCode::SERVICE_UNAVAILABLE, message)
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": {
                "message": self.message,
                "status": self.status.as_u16(),
            }
        }));

        (self.status, body).into_response()
    }
}

impl From<CredentialError> for AppError {
    fn from(err: CredentialError) -> Self {
        match err {
            CredentialError::UserExists => Self::conflict(err.to_string()),
            CredentialError::InvalidCredentials
            | CredentialError::TokenInvalid
            | CredentialError::TokenExpired => Self::unauthorized(err.to_string()),
            CredentialError::UserNotFound | CredentialError::ApplicationNotFound => {
                Self::not_found(err.to_string())
            }
            CredentialError::HashingFailed
            | CredentialError::SigningFailed
            | CredentialError::StorageUnavailable
            | CredentialError::ConfigurationError
            | CredentialError::RegistrationFailed => Self::internal(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_domain_errors_to_statuses() {
        let cases = [
            (CredentialError::UserExists, StatusCode::CONFLICT),
            (CredentialError::InvalidCredentials, StatusCode::UNAUTHORIZED),
            (CredentialError::TokenExpired, StatusCode::UNAUTHORIZED),
            (CredentialError::TokenInvalid, StatusCode::UNAUTHORIZED),
            (CredentialError::UserNotFound, StatusCode::NOT_FOUND),
            (CredentialError::ApplicationNotFound, StatusCode::NOT_FOUND),
            (CredentialError::ConfigurationError, StatusCode::INTERNAL_SERVER_ERROR),
            (CredentialError::RegistrationFailed, StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, status) in cases {
            assert_eq!(AppError::from(err).status, status);
        }
    }

    #[test]
    fn server_faults_hide_their_cause() {
        let err = AppError::from(CredentialError::StorageUnavailable);
        assert_eq!(err.message, "internal server error");
    }
}
