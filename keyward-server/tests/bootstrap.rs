use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use axum::http::StatusCode;
use axum_test::TestServer;
use keyward_server::{
    api::v1,
    bootstrap::{build_service, build_state, open_store},
    create_app,
};
use serde_json::json;
use tokio_util::sync::CancellationToken;

#[path = "support/mod.rs"]
mod support;
use support::test_config;

#[tokio::test]
async fn builds_a_working_state_from_config() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("keyward.db");
    let config = Arc::new(test_config(&path.to_string_lossy()));

    let state = build_state(Arc::clone(&config), CancellationToken::new()).await?;
    let store = open_store(&config).await?;
    let tenant = store.create_application("tenant", b"secret").await?;

    let server = TestServer::new(create_app(state))
        .map_err(|err| anyhow::anyhow!(err.to_string()))?;
    server
        .post(v1::REGISTER)
        .json(&json!({ "email": "a@x.com", "password": "pw1", "app_id": tenant.id }))
        .await
        .assert_status(StatusCode::CREATED);
    server
        .post(v1::LOGIN)
        .json(&json!({ "email": "a@x.com", "password": "pw1" }))
        .await
        .assert_status_ok();
    Ok(())
}

#[tokio::test]
async fn service_carries_configured_token_settings() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("keyward.db");
    let mut config = test_config(&path.to_string_lossy());
    config.auth.token_ttl = Duration::from_secs(15 * 60);
    config.auth.clock_skew = Duration::from_secs(30);

    let store = open_store(&config).await?;
    let service = build_service(&config, store)?;

    assert_eq!(service.token_ttl(), chrono::Duration::minutes(15));
    assert_eq!(service.codec().leeway(), Duration::from_secs(30));
    Ok(())
}

#[tokio::test]
async fn token_ttl_beyond_the_calendar_is_rejected() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("keyward.db");
    let mut config = test_config(&path.to_string_lossy());
    config.auth.token_ttl = Duration::from_secs(1_000_000 * 365 * 86_400);

    let store = open_store(&config).await?;
    let err = build_service(&config, store).expect_err("ttl should be rejected");

    assert!(err.to_string().contains("auth.token_ttl is out of range"));
    Ok(())
}
