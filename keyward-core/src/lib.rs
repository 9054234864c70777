//! # Keyward Core
//!
//! Credential core for the Keyward multi-tenant authentication service.
//!
//! ## Overview
//!
//! `keyward-core` owns everything that decides whether a caller gets a token:
//!
//! - **Credential Store**: tenant-scoped users and applications, with email
//!   uniqueness enforced by the storage layer ([`store`])
//! - **Password Hasher**: Argon2id hashing on a bounded blocking pool
//!   ([`crypto`])
//! - **Token Codec**: HMAC-signed compact tokens keyed per tenant ([`token`])
//! - **Credential Service**: register / login / admin checks built on the
//!   above ([`service`])
//!
//! Transport, configuration loading and process wiring live in the
//! `keyward-config` and `keyward-server` crates.
//!
//! ## Examples
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use chrono::Duration;
//! use keyward_core::{
//!     CredentialService, PasswordHasher, SqliteCredentialStore, TokenCodec,
//! };
//!
//! async fn issue(
//! ) -> Result<String, Box<dyn std::error::Error>> {
//!     let store = SqliteCredentialStore::connect("sqlite://keyward.db").await?;
//!     store.migrate().await?;
//!
//!     let service = CredentialService::new(
//!         Arc::new(store),
//!         PasswordHasher::new(4)?,
//!         TokenCodec::new(),
//!         Duration::hours(1),
//!     );
//!
//!     service.register("a@x.com", "pw1", 1).await?;
//!     Ok(service.login("a@x.com", "pw1").await?)
//! }
//! ```

pub mod crypto;
pub mod error;
pub mod model;
pub mod service;
pub mod store;
pub mod token;

/// Embedded schema migrations for the SQLite credential store.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

pub use crypto::{HashError, PasswordHasher};
pub use error::CredentialError;
pub use model::{AppId, AppSecret, Application, User, UserId, normalize_email};
pub use service::CredentialService;
pub use store::{CredentialStore, SqliteCredentialStore, StoreError};
pub use token::{TokenClaims, TokenCodec, TokenError};
