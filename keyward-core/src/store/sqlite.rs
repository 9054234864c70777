use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use sqlx::{
    FromRow, SqlitePool,
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions},
};
use tracing::{error, info};

use super::{CredentialStore, StoreError};
use crate::model::{AppId, Application, User, UserId, normalize_email};

const DEFAULT_MAX_CONNECTIONS: u32 = 8;
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// SQLite-backed implementation of [`CredentialStore`].
#[derive(Clone, Debug)]
pub struct SqliteCredentialStore {
    pool: SqlitePool,
}

#[derive(FromRow)]
struct UserRow {
    id: i64,
    email: String,
    password_hash: Vec<u8>,
    tenant_app_id: i64,
    is_admin: bool,
}

#[derive(FromRow)]
struct ApplicationRow {
    id: i64,
    name: String,
    secret: Vec<u8>,
}

impl SqliteCredentialStore {
    /// Open (creating if missing) the database at `location`, which may be a
    /// `sqlite:` URL or a plain file path.
    pub async fn connect(location: &str) -> Result<Self, StoreError> {
        Self::connect_with_max_connections(location, DEFAULT_MAX_CONNECTIONS).await
    }

    pub async fn connect_with_max_connections(
        location: &str,
        max_connections: u32,
    ) -> Result<Self, StoreError> {
        let base = if location.starts_with("sqlite:") {
            SqliteConnectOptions::from_str(location).map_err(|e| {
                error!(error = %e, location, "invalid sqlite connection url");
                StoreError::Unavailable
            })?
        } else {
            SqliteConnectOptions::new().filename(location)
        };
        let options = base
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(BUSY_TIMEOUT);

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections.max(1))
            .acquire_timeout(Duration::from_secs(30))
            .connect_with(options)
            .await
            .map_err(|e| {
                error!(error = %e, location, "failed to open credential store");
                StoreError::Unavailable
            })?;

        info!(location, "credential store opened");
        Ok(Self { pool })
    }

    /// Wrap an existing pool (the schema is expected to be migrated).
    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Apply the embedded migrations.
    pub async fn migrate(&self) -> Result<(), StoreError> {
        crate::MIGRATOR.run(&self.pool).await.map_err(|e| {
            error!(error = %e, "failed to apply credential store migrations");
            StoreError::Unavailable
        })?;
        info!("credential store migrations applied");
        Ok(())
    }

    /// Provision a tenant application. Tenants are created out of band; the
    /// credential service itself only ever reads them.
    pub async fn create_application(
        &self,
        name: &str,
        secret: &[u8],
    ) -> Result<Application, StoreError> {
        if secret.is_empty() {
            return Err(StoreError::InvalidSecret);
        }

        let result = sqlx::query("INSERT INTO applications (name, secret) VALUES (?, ?)")
            .bind(name)
            .bind(secret)
            .execute(&self.pool)
            .await;

        match result {
            Ok(done) => {
                let id = app_id_from_row(done.last_insert_rowid())?;
                info!(app_id = id, name, "application created");
                Ok(Application::new(id, name, secret.to_vec()))
            }
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                Err(StoreError::ApplicationExists)
            }
            Err(e) => {
                error!(error = %e, name, op = "create_application", "storage failure");
                Err(StoreError::Unavailable)
            }
        }
    }
}

#[async_trait]
impl CredentialStore for SqliteCredentialStore {
    async fn save_user(
        &self,
        email: &str,
        password_hash: &[u8],
        tenant_app_id: AppId,
    ) -> Result<UserId, StoreError> {
        let email = normalize_email(email);

        let result = sqlx::query(
            "INSERT INTO users (email, password_hash, tenant_app_id) VALUES (?, ?, ?)",
        )
        .bind(&email)
        .bind(password_hash)
        .bind(tenant_app_id)
        .execute(&self.pool)
        .await;

        match result {
            Ok(done) => Ok(done.last_insert_rowid()),
            // The UNIQUE constraint on users.email decides concurrent races.
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                Err(StoreError::UserExists)
            }
            Err(e) => {
                error!(error = %e, email = %email, tenant_app_id, op = "save_user", "storage failure");
                Err(StoreError::Unavailable)
            }
        }
    }

    async fn find_user_by_email(&self, email: &str) -> Result<User, StoreError> {
        let email = normalize_email(email);

        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, email, password_hash, tenant_app_id, is_admin
            FROM users
            WHERE email = ?
            "#,
        )
        .bind(&email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!(error = %e, email = %email, op = "find_user_by_email", "storage failure");
            StoreError::Unavailable
        })?
        .ok_or(StoreError::UserNotFound)?;

        Ok(User {
            id: row.id,
            email: row.email,
            password_hash: row.password_hash,
            tenant_app_id: app_id_from_row(row.tenant_app_id)?,
            is_admin: row.is_admin,
        })
    }

    async fn is_admin(&self, user_id: UserId) -> Result<bool, StoreError> {
        sqlx::query_scalar::<_, bool>("SELECT is_admin FROM users WHERE id = ?")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                error!(error = %e, user_id, op = "is_admin", "storage failure");
                StoreError::Unavailable
            })?
            .ok_or(StoreError::UserNotFound)
    }

    async fn find_application(&self, app_id: AppId) -> Result<Application, StoreError> {
        let row = sqlx::query_as::<_, ApplicationRow>(
            "SELECT id, name, secret FROM applications WHERE id = ?",
        )
        .bind(app_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!(error = %e, app_id, op = "find_application", "storage failure");
            StoreError::Unavailable
        })?
        .ok_or(StoreError::ApplicationNotFound)?;

        Ok(Application::new(app_id_from_row(row.id)?, row.name, row.secret))
    }
}

fn app_id_from_row(raw: i64) -> Result<AppId, StoreError> {
    AppId::try_from(raw).map_err(|_| {
        error!(raw, "application id out of range");
        StoreError::Unavailable
    })
}
