//! Register / login / admin-check orchestration.
//!
//! The service owns no state of its own. It holds its collaborators and a
//! parent span for its log records, and translates store, hasher and codec
//! outcomes into [`CredentialError`]s the transport can map to status codes.

use std::fmt;
use std::sync::Arc;

use chrono::Duration;
use tracing::{Instrument, Span, error, info, info_span, warn};

use crate::crypto::{HashError, PasswordHasher};
use crate::error::CredentialError;
use crate::model::{AppId, UserId};
use crate::store::{CredentialStore, StoreError};
use crate::token::{TokenClaims, TokenCodec};

#[derive(Clone)]
pub struct CredentialService {
    store: Arc<dyn CredentialStore>,
    hasher: PasswordHasher,
    codec: TokenCodec,
    token_ttl: Duration,
    span: Span,
}

impl fmt::Debug for CredentialService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialService")
            .field("store_refs", &Arc::strong_count(&self.store))
            .field("hasher", &self.hasher)
            .field("codec", &self.codec)
            .field("token_ttl", &self.token_ttl)
            .finish()
    }
}

impl CredentialService {
    pub fn new(
        store: Arc<dyn CredentialStore>,
        hasher: PasswordHasher,
        codec: TokenCodec,
        token_ttl: Duration,
    ) -> Self {
        Self {
            store,
            hasher,
            codec,
            token_ttl,
            span: info_span!("credential_service"),
        }
    }

    /// Parent every log record of this service under `span`.
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn token_ttl(&self) -> Duration {
        self.token_ttl
    }

    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }

    /// Create an account for `email` under `tenant_app_id`.
    ///
    /// `UserExists` is returned as-is; every other failure collapses into
    /// `RegistrationFailed`.
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        tenant_app_id: AppId,
    ) -> Result<UserId, CredentialError> {
        let span = info_span!(parent: &self.span, "register", email, app_id = tenant_app_id);

        async move {
            info!("registering new user");

            let password_hash = self.hasher.hash(password).await.map_err(|err| {
                error!(error = %err, "failed to hash password");
                CredentialError::RegistrationFailed
            })?;

            match self
                .store
                .save_user(email, &password_hash, tenant_app_id)
                .await
            {
                Ok(user_id) => {
                    info!(user_id, "user registered");
                    Ok(user_id)
                }
                Err(StoreError::UserExists) => {
                    warn!("user already exists");
                    Err(CredentialError::UserExists)
                }
                Err(err) => {
                    error!(error = %err, "failed to save user");
                    Err(CredentialError::RegistrationFailed)
                }
            }
        }
        .instrument(span)
        .await
    }

    /// Authenticate `email`/`password` and issue a token signed with the
    /// user's tenant secret.
    ///
    /// Unknown emails and wrong passwords both yield `InvalidCredentials`,
    /// and both cost one password verification.
    pub async fn login(&self, email: &str, password: &str) -> Result<String, CredentialError> {
        let span = info_span!(parent: &self.span, "login", email);

        async move {
            info!("logging in");

            let user = match self.store.find_user_by_email(email).await {
                Ok(user) => user,
                Err(StoreError::UserNotFound) => {
                    warn!("user not found");
                    self.equalize_timing(password).await;
                    return Err(CredentialError::InvalidCredentials);
                }
                Err(err) => {
                    error!(error = %err, "failed to get the user");
                    return Err(err.into());
                }
            };

            match self.hasher.verify(&user.password_hash, password).await {
                Ok(true) => {}
                Ok(false) => {
                    info!(user_id = user.id, "invalid credentials");
                    return Err(CredentialError::InvalidCredentials);
                }
                Err(HashError::MalformedHash(reason)) => {
                    error!(user_id = user.id, %reason, "stored password hash is malformed");
                    return Err(CredentialError::InvalidCredentials);
                }
                Err(err) => {
                    error!(user_id = user.id, error = %err, "password verification failed");
                    return Err(err.into());
                }
            }

            let application = match self.store.find_application(user.tenant_app_id).await {
                Ok(application) => application,
                Err(StoreError::ApplicationNotFound) => {
                    error!(
                        user_id = user.id,
                        app_id = user.tenant_app_id,
                        "user references an application that does not exist"
                    );
                    return Err(CredentialError::ConfigurationError);
                }
                Err(err) => {
                    error!(error = %err, "failed to get the app");
                    return Err(err.into());
                }
            };

            let token = self
                .codec
                .issue(&user, &application, self.token_ttl)
                .map_err(|err| {
                    error!(error = %err, app_id = application.id, "failed to create token");
                    CredentialError::SigningFailed
                })?;

            info!(user_id = user.id, app_id = application.id, "logged in successfully");
            Ok(token)
        }
        .instrument(span)
        .await
    }

    /// Whether `user_id` holds the administrative role.
    pub async fn check_is_admin(&self, user_id: UserId) -> Result<bool, CredentialError> {
        let span = info_span!(parent: &self.span, "check_is_admin", user_id);

        async move {
            info!("checking if user is admin");

            let is_admin = self.store.is_admin(user_id).await.map_err(|err| {
                match err {
                    StoreError::UserNotFound => warn!("user not found"),
                    ref other => error!(error = %other, "failed to check if user is admin"),
                }
                CredentialError::from(err)
            })?;

            info!(is_admin, "checked if user is admin");
            Ok(is_admin)
        }
        .instrument(span)
        .await
    }

    /// Verify a token against the secret of application `app_id`.
    pub async fn validate_token(
        &self,
        token: &str,
        app_id: AppId,
    ) -> Result<TokenClaims, CredentialError> {
        let span = info_span!(parent: &self.span, "validate_token", app_id);

        async move {
            let application = self.store.find_application(app_id).await.map_err(|err| {
                if !err.is_not_found() {
                    error!(error = %err, "failed to get the app");
                }
                CredentialError::from(err)
            })?;

            let claims = self.codec.parse(token, &application).map_err(|err| {
                info!(error = %err, "token rejected");
                CredentialError::from(err)
            })?;

            info!(user_id = claims.user_id, "token verified");
            Ok(claims)
        }
        .instrument(span)
        .await
    }

    async fn equalize_timing(&self, password: &str) {
        if let Err(err) = self.hasher.verify_dummy(password).await {
            warn!(error = %err, "dummy verification failed");
        }
    }
}
