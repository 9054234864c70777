#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use axum_test::TestServer;
use keyward_config::{
    AuthConfig, Config, ConfigMetadata, Environment, ServerConfig, StorageConfig,
};
use keyward_core::{
    Application, CredentialService, PasswordHasher, SqliteCredentialStore, TokenCodec,
};
use keyward_server::{AppState, create_app};
use sqlx::SqlitePool;
use tokio_util::sync::CancellationToken;

pub struct TestApp {
    pub server: TestServer,
    pub store: SqliteCredentialStore,
    pub tenant: Application,
    pub shutdown: CancellationToken,
}

pub fn test_config(storage_path: &str) -> Config {
    Config {
        env: Environment::Local,
        server: ServerConfig {
            host: "127.0.0.1".into(),
            port: 0,
            request_timeout: Duration::from_secs(5),
        },
        storage: StorageConfig {
            path: storage_path.into(),
        },
        auth: AuthConfig {
            token_ttl: Duration::from_secs(3600),
            clock_skew: Duration::ZERO,
            password_pepper: None,
            hash_workers: 2,
        },
        metadata: ConfigMetadata::default(),
    }
}

/// Router over a migrated pool with tenant `1` provisioned.
pub async fn build_test_app(pool: SqlitePool) -> Result<TestApp> {
    let store = SqliteCredentialStore::from_pool(pool);
    let tenant = store.create_application("tenant-one", b"secret1").await?;

    let service = CredentialService::new(
        Arc::new(store.clone()),
        PasswordHasher::insecure_for_tests()?,
        TokenCodec::new(),
        chrono::Duration::hours(1),
    );
    let shutdown = CancellationToken::new();
    let state = AppState::new(
        service,
        Arc::new(test_config("sqlite::memory:")),
        shutdown.clone(),
    );

    let server = TestServer::new(create_app(state))
        .map_err(|err| anyhow::anyhow!(err.to_string()))?;

    Ok(TestApp {
        server,
        store,
        tenant,
        shutdown,
    })
}
