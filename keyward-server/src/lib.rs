//! # Keyward Server
//!
//! HTTP front end for the Keyward credential service.
//!
//! The transport is deliberately thin: handlers check that required fields
//! are present, call into [`keyward_core::CredentialService`], and map the
//! resulting [`keyward_core::CredentialError`] onto a status code. Every call
//! is bounded by the configured request timeout and abandoned when the
//! process begins shutting down.

pub mod api;
pub mod bootstrap;
pub mod errors;
pub mod handlers;
pub mod routes;
pub mod state;

pub use errors::{AppError, AppResult};
pub use routes::create_app;
pub use state::AppState;
