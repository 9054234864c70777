#![allow(dead_code)]

use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Duration;
use keyward_core::{
    Application, CredentialService, PasswordHasher, SqliteCredentialStore, TokenCodec,
};
use sqlx::SqlitePool;

pub struct TestContext {
    pub store: SqliteCredentialStore,
    pub service: CredentialService,
    pub tenant: Application,
}

/// Store and service over a migrated pool, with tenant `1` provisioned.
pub async fn build_context(pool: SqlitePool) -> Result<TestContext> {
    let store = SqliteCredentialStore::from_pool(pool);
    let tenant = store
        .create_application("tenant-one", b"secret1")
        .await
        .context("provision tenant")?;

    let service = CredentialService::new(
        Arc::new(store.clone()),
        PasswordHasher::insecure_for_tests()?,
        TokenCodec::new(),
        Duration::hours(1),
    );

    Ok(TestContext {
        store,
        service,
        tenant,
    })
}
