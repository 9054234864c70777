//! Persistence boundary for users and tenant applications.

mod sqlite;

use async_trait::async_trait;

use crate::model::{AppId, Application, User, UserId};

pub use sqlite::SqliteCredentialStore;

/// Storage contract the credential service is written against.
///
/// Implementations normalize emails with
/// [`normalize_email`](crate::normalize_email) on every write and lookup, and
/// must detect duplicate emails through a storage-level uniqueness constraint
/// rather than a check-then-insert, so concurrent registrations for the same
/// address produce exactly one winner.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Persist a new user and return its id.
    async fn save_user(
        &self,
        email: &str,
        password_hash: &[u8],
        tenant_app_id: AppId,
    ) -> Result<UserId, StoreError>;

    /// Look a user up by email.
    async fn find_user_by_email(&self, email: &str) -> Result<User, StoreError>;

    /// Whether the user holds the administrative role.
    async fn is_admin(&self, user_id: UserId) -> Result<bool, StoreError>;

    /// Look a tenant application up by id.
    async fn find_application(&self, app_id: AppId) -> Result<Application, StoreError>;
}

/// Errors that can occur during store operations.
///
/// `Unavailable` is deliberately opaque: implementations log the underlying
/// failure with its context before returning it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("user already exists")]
    UserExists,

    #[error("user not found")]
    UserNotFound,

    #[error("application not found")]
    ApplicationNotFound,

    #[error("application already exists")]
    ApplicationExists,

    #[error("application secret must not be empty")]
    InvalidSecret,

    #[error("storage unavailable")]
    Unavailable,
}

impl StoreError {
    /// Check if this is a not found error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::UserNotFound | Self::ApplicationNotFound)
    }
}
