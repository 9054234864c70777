use anyhow::Result;
use keyward_core::{CredentialError, CredentialStore};
use sqlx::SqlitePool;

mod support;
use support::build_context;

#[sqlx::test(migrator = "keyward_core::MIGRATOR")]
async fn register_login_and_duplicate(pool: SqlitePool) -> Result<()> {
    let ctx = build_context(pool).await?;
    let service = &ctx.service;

    let user_id = service.register("a@x.com", "pw1", ctx.tenant.id).await?;
    assert_eq!(user_id, 1);

    let token = service.login("a@x.com", "pw1").await?;
    let claims = service.codec().parse(&token, &ctx.tenant)?;
    assert_eq!(claims.user_id, 1);
    assert_eq!(claims.email, "a@x.com");
    assert_eq!(claims.app_id, ctx.tenant.id);

    assert_eq!(
        service.login("a@x.com", "wrong").await,
        Err(CredentialError::InvalidCredentials)
    );
    assert_eq!(
        service.register("a@x.com", "pw2", ctx.tenant.id).await,
        Err(CredentialError::UserExists)
    );
    Ok(())
}

#[sqlx::test(migrator = "keyward_core::MIGRATOR")]
async fn unknown_email_and_wrong_password_look_the_same(pool: SqlitePool) -> Result<()> {
    let ctx = build_context(pool).await?;
    ctx.service.register("a@x.com", "pw1", ctx.tenant.id).await?;

    let wrong_password = ctx.service.login("a@x.com", "nope").await.unwrap_err();
    let unknown_email = ctx.service.login("b@x.com", "pw1").await.unwrap_err();

    assert_eq!(wrong_password, unknown_email);
    assert_eq!(wrong_password.to_string(), unknown_email.to_string());
    Ok(())
}

#[sqlx::test(migrator = "keyward_core::MIGRATOR")]
async fn login_accepts_differently_cased_email(pool: SqlitePool) -> Result<()> {
    let ctx = build_context(pool).await?;
    ctx.service.register("Alice@X.com", "pw1", ctx.tenant.id).await?;

    let token = ctx.service.login(" alice@x.COM ", "pw1").await?;
    let claims = ctx.service.validate_token(&token, ctx.tenant.id).await?;
    assert_eq!(claims.email, "alice@x.com");
    Ok(())
}

#[sqlx::test(migrator = "keyward_core::MIGRATOR")]
async fn login_for_user_of_missing_tenant_is_a_configuration_error(
    pool: SqlitePool,
) -> Result<()> {
    let ctx = build_context(pool).await?;
    ctx.service.register("orphan@x.com", "pw1", 77).await?;

    assert_eq!(
        ctx.service.login("orphan@x.com", "pw1").await,
        Err(CredentialError::ConfigurationError)
    );
    Ok(())
}

#[sqlx::test(migrator = "keyward_core::MIGRATOR")]
async fn admin_check(pool: SqlitePool) -> Result<()> {
    let ctx = build_context(pool).await?;
    let user_id = ctx.service.register("a@x.com", "pw1", ctx.tenant.id).await?;

    assert!(!ctx.service.check_is_admin(user_id).await?);
    assert!(!ctx.store.is_admin(user_id).await?);
    assert_eq!(
        ctx.service.check_is_admin(user_id + 100).await,
        Err(CredentialError::UserNotFound)
    );
    Ok(())
}

#[sqlx::test(migrator = "keyward_core::MIGRATOR")]
async fn tokens_are_bound_to_their_tenant(pool: SqlitePool) -> Result<()> {
    let ctx = build_context(pool).await?;
    let other = ctx.store.create_application("tenant-two", b"secret2").await?;
    ctx.service.register("a@x.com", "pw1", ctx.tenant.id).await?;

    let token = ctx.service.login("a@x.com", "pw1").await?;

    assert!(ctx.service.validate_token(&token, ctx.tenant.id).await.is_ok());
    assert_eq!(
        ctx.service.validate_token(&token, other.id).await,
        Err(CredentialError::TokenInvalid)
    );
    assert_eq!(
        ctx.service.validate_token(&token, 999).await,
        Err(CredentialError::ApplicationNotFound)
    );
    Ok(())
}

#[sqlx::test(migrator = "keyward_core::MIGRATOR")]
async fn concurrent_service_registrations_have_one_winner(pool: SqlitePool) -> Result<()> {
    let ctx = build_context(pool).await?;

    let attempts: Vec<_> = (0..4)
        .map(|i| {
            let service = ctx.service.clone();
            let app_id = ctx.tenant.id;
            tokio::spawn(async move {
                service
                    .register("race@x.com", &format!("pw{i}"), app_id)
                    .await
            })
        })
        .collect();

    let mut outcomes = Vec::new();
    for attempt in attempts {
        outcomes.push(attempt.await?);
    }

    assert_eq!(outcomes.iter().filter(|o| o.is_ok()).count(), 1);
    assert!(
        outcomes
            .iter()
            .filter(|o| o.is_err())
            .all(|o| *o == Err(CredentialError::UserExists))
    );
    Ok(())
}
