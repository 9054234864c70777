//! Users, tenant applications and their identifiers.

use std::fmt;

use zeroize::Zeroizing;

/// Identifier of a stored user.
pub type UserId = i64;

/// Identifier of a tenant application.
pub type AppId = i32;

/// Canonical form of an email address used for storage and lookups.
///
/// Surrounding whitespace is trimmed and ASCII letters are lowercased, so
/// `" A@X.com "` and `"a@x.com"` name the same account.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_ascii_lowercase()
}

/// A registered account scoped to one tenant application.
#[derive(Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub email: String,
    /// PHC-encoded password hash, stored as opaque bytes.
    pub password_hash: Vec<u8>,
    pub tenant_app_id: AppId,
    pub is_admin: bool,
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("tenant_app_id", &self.tenant_app_id)
            .field("is_admin", &self.is_admin)
            .finish_non_exhaustive()
    }
}

/// Signing secret of a tenant application. Wiped from memory on drop.
#[derive(Clone, PartialEq, Eq)]
pub struct AppSecret(Zeroizing<Vec<u8>>);

impl AppSecret {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(Zeroizing::new(bytes.into()))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for AppSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AppSecret([redacted])")
    }
}

/// A tenant: an isolated namespace of users with its own signing secret.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Application {
    pub id: AppId,
    pub name: String,
    pub secret: AppSecret,
}

impl Application {
    pub fn new(id: AppId, name: impl Into<String>, secret: impl Into<Vec<u8>>) -> Self {
        Self {
            id,
            name: name.into(),
            secret: AppSecret::new(secret),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_case_and_whitespace() {
        assert_eq!(normalize_email("  Alice@Example.COM\t"), "alice@example.com");
        assert_eq!(normalize_email("a@x.com"), "a@x.com");
    }

    #[test]
    fn debug_output_hides_secrets() {
        let app = Application::new(1, "tenant", b"super-secret".to_vec());
        let rendered = format!("{app:?}");
        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("redacted"));

        let user = User {
            id: 7,
            email: "a@x.com".into(),
            password_hash: b"$argon2id$v=19$secret-material".to_vec(),
            tenant_app_id: 1,
            is_admin: false,
        };
        assert!(!format!("{user:?}").contains("secret-material"));
    }
}
