//! Turns a loaded [`Config`] into running collaborators.

use std::sync::Arc;

use anyhow::Context;
use keyward_config::Config;
use keyward_core::{CredentialService, PasswordHasher, SqliteCredentialStore, TokenCodec};
use tokio_util::sync::CancellationToken;
use tracing::{info, info_span};

use crate::state::AppState;

/// Open the credential store and bring its schema up to date.
pub async fn open_store(config: &Config) -> anyhow::Result<SqliteCredentialStore> {
    let store = SqliteCredentialStore::connect(&config.storage.path)
        .await
        .with_context(|| format!("failed to open credential store at {}", config.storage.path))?;
    store
        .migrate()
        .await
        .context("credential store migration failed")?;
    Ok(store)
}

pub fn build_service(
    config: &Config,
    store: SqliteCredentialStore,
) -> anyhow::Result<CredentialService> {
    let mut hasher = PasswordHasher::new(config.auth.hash_workers)
        .context("failed to build password hasher")?;
    if let Some(pepper) = &config.auth.password_pepper {
        hasher = hasher.with_pepper(pepper);
    }

    let codec = TokenCodec::new().with_leeway(config.auth.clock_skew);
    let token_ttl = chrono::Duration::from_std(config.auth.token_ttl)
        .ok()
        .filter(|ttl| chrono::Utc::now().checked_add_signed(*ttl).is_some())
        .context("auth.token_ttl is out of range")?;

    info!(
        hash_workers = config.auth.hash_workers,
        token_ttl = ?config.auth.token_ttl,
        clock_skew = ?config.auth.clock_skew,
        peppered = config.auth.password_pepper.is_some(),
        "credential service configured"
    );

    Ok(
        CredentialService::new(Arc::new(store), hasher, codec, token_ttl)
            .with_span(info_span!("credential_service", env = %config.env)),
    )
}

pub async fn build_state(
    config: Arc<Config>,
    shutdown: CancellationToken,
) -> anyhow::Result<AppState> {
    let store = open_store(&config).await?;
    let service = build_service(&config, store)?;
    Ok(AppState::new(service, config, shutdown))
}
