//! Tenant-signed session tokens.
//!
//! Tokens are compact JWS strings (`header.payload.signature`, base64url)
//! signed with an HMAC keyed by the issuing application's secret. The secret
//! is always passed in explicitly: there is no process-wide signing key, so a
//! token minted for one tenant can never verify under another.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode,
    errors::ErrorKind,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{AppId, Application, User, UserId};

/// Signature algorithms accepted when parsing. Anything outside the HMAC
/// family, `none` included, is rejected before the signature is checked.
const HMAC_FAMILY: [Algorithm; 3] = [Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("application secret must not be empty")]
    EmptySecret,
    #[error("algorithm {0:?} is not an HMAC algorithm")]
    UnsupportedAlgorithm(Algorithm),
    #[error("token signing failed: {0}")]
    Signing(String),
    #[error("token is invalid")]
    Invalid,
    #[error("token has expired")]
    Expired,
}

/// Wire claims. Field names are part of the token format.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct Claims {
    uid: UserId,
    email: String,
    app_id: AppId,
    exp: i64,
}

/// Verified contents of a session token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenClaims {
    pub user_id: UserId,
    pub email: String,
    pub app_id: AppId,
    pub expires_at: DateTime<Utc>,
}

/// Builds and parses session tokens. Stateless and freely cloneable.
#[derive(Debug, Clone)]
pub struct TokenCodec {
    algorithm: Algorithm,
    leeway: std::time::Duration,
}

impl Default for TokenCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenCodec {
    /// HS256 signing with zero clock-skew tolerance.
    pub fn new() -> Self {
        Self {
            algorithm: Algorithm::HS256,
            leeway: std::time::Duration::ZERO,
        }
    }

    /// Sign with another HMAC variant.
    pub fn with_algorithm(mut self, algorithm: Algorithm) -> Result<Self, TokenError> {
        if !HMAC_FAMILY.contains(&algorithm) {
            return Err(TokenError::UnsupportedAlgorithm(algorithm));
        }
        self.algorithm = algorithm;
        Ok(self)
    }

    /// Tolerate this much clock skew when checking `exp`. Sub-second parts
    /// are dropped.
    pub fn with_leeway(mut self, leeway: std::time::Duration) -> Self {
        self.leeway = leeway;
        self
    }

    pub fn leeway(&self) -> std::time::Duration {
        self.leeway
    }

    /// Issue a token for `user` that expires `ttl` from now.
    pub fn issue(
        &self,
        user: &User,
        application: &Application,
        ttl: Duration,
    ) -> Result<String, TokenError> {
        self.issue_at(user, application, Utc::now(), ttl)
    }

    /// Issue a token as if the current time were `issued_at`.
    pub fn issue_at(
        &self,
        user: &User,
        application: &Application,
        issued_at: DateTime<Utc>,
        ttl: Duration,
    ) -> Result<String, TokenError> {
        if application.secret.is_empty() {
            return Err(TokenError::EmptySecret);
        }

        let expires_at = issued_at
            .checked_add_signed(ttl)
            .ok_or_else(|| TokenError::Signing("token expiry out of range".into()))?;

        let claims = Claims {
            uid: user.id,
            email: user.email.clone(),
            app_id: application.id,
            exp: expires_at.timestamp(),
        };

        encode(
            &Header::new(self.algorithm),
            &claims,
            &EncodingKey::from_secret(application.secret.as_bytes()),
        )
        .map_err(|err| TokenError::Signing(err.to_string()))
    }

    /// Verify `token` against `application`'s secret and return its claims.
    pub fn parse(&self, token: &str, application: &Application) -> Result<TokenClaims, TokenError> {
        if application.secret.is_empty() {
            return Err(TokenError::Invalid);
        }

        let mut validation = Validation::new(self.algorithm);
        validation.algorithms = HMAC_FAMILY.to_vec();
        validation.leeway = self.leeway.as_secs();
        validation.validate_exp = true;
        validation.set_required_spec_claims(&["exp"]);

        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(application.secret.as_bytes()),
            &validation,
        )
        .map_err(|err| match err.kind() {
            ErrorKind::ExpiredSignature => TokenError::Expired,
            _ => TokenError::Invalid,
        })?;

        let claims = data.claims;
        if claims.app_id != application.id {
            return Err(TokenError::Invalid);
        }

        let expires_at = DateTime::from_timestamp(claims.exp, 0).ok_or(TokenError::Invalid)?;

        Ok(TokenClaims {
            user_id: claims.uid,
            email: claims.email,
            app_id: claims.app_id,
            expires_at,
        })
    }
}
