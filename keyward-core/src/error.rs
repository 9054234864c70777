use thiserror::Error;

use crate::crypto::HashError;
use crate::store::StoreError;
use crate::token::TokenError;

/// Errors surfaced by [`CredentialService`](crate::CredentialService).
///
/// Domain outcomes (`UserExists`, `InvalidCredentials`, `UserNotFound`, ...)
/// are meant for the transport to map onto status codes. Technical failures
/// carry no internal detail; they are logged where they originate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CredentialError {
    #[error("user already exists")]
    UserExists,

    #[error("user not found")]
    UserNotFound,

    #[error("application not found")]
    ApplicationNotFound,

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("token is invalid")]
    TokenInvalid,

    #[error("token has expired")]
    TokenExpired,

    #[error("password hashing failed")]
    HashingFailed,

    #[error("token signing failed")]
    SigningFailed,

    #[error("storage unavailable")]
    StorageUnavailable,

    #[error("server configuration error")]
    ConfigurationError,

    #[error("registration failed")]
    RegistrationFailed,
}

impl CredentialError {
    /// Whether the error describes a caller mistake rather than a server fault.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::UserExists
                | Self::UserNotFound
                | Self::ApplicationNotFound
                | Self::InvalidCredentials
                | Self::TokenInvalid
                | Self::TokenExpired
        )
    }
}

impl From<StoreError> for CredentialError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::UserExists => Self::UserExists,
            StoreError::UserNotFound => Self::UserNotFound,
            StoreError::ApplicationNotFound => Self::ApplicationNotFound,
            StoreError::ApplicationExists
            | StoreError::InvalidSecret
            | StoreError::Unavailable => Self::StorageUnavailable,
        }
    }
}

impl From<TokenError> for CredentialError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Expired => Self::TokenExpired,
            TokenError::Invalid => Self::TokenInvalid,
            TokenError::EmptySecret
            | TokenError::UnsupportedAlgorithm(_)
            | TokenError::Signing(_) => Self::SigningFailed,
        }
    }
}

impl From<HashError> for CredentialError {
    fn from(_: HashError) -> Self {
        Self::HashingFailed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_errors_keep_domain_meaning() {
        assert_eq!(
            CredentialError::from(StoreError::UserExists),
            CredentialError::UserExists
        );
        assert_eq!(
            CredentialError::from(StoreError::Unavailable),
            CredentialError::StorageUnavailable
        );
    }

    #[test]
    fn token_errors_split_expiry_from_invalidity() {
        assert_eq!(
            CredentialError::from(TokenError::Expired),
            CredentialError::TokenExpired
        );
        assert_eq!(
            CredentialError::from(TokenError::Invalid),
            CredentialError::TokenInvalid
        );
        assert_eq!(
            CredentialError::from(TokenError::EmptySecret),
            CredentialError::SigningFailed
        );
    }

    #[test]
    fn server_faults_are_not_client_errors() {
        assert!(CredentialError::InvalidCredentials.is_client_error());
        assert!(!CredentialError::ConfigurationError.is_client_error());
        assert!(!CredentialError::StorageUnavailable.is_client_error());
    }
}
