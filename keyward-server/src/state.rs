use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use keyward_config::Config;
use keyward_core::{CredentialError, CredentialService};
use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::errors::{AppError, AppResult};

#[derive(Clone, Debug)]
pub struct AppState {
    pub service: CredentialService,
    pub config: Arc<Config>,
    pub shutdown: CancellationToken,
}

impl AppState {
    pub fn new(service: CredentialService, config: Arc<Config>, shutdown: CancellationToken) -> Self {
        Self {
            service,
            config,
            shutdown,
        }
    }

    pub fn request_timeout(&self) -> Duration {
        self.config.server.request_timeout
    }

    /// Drive a service call to completion unless the request deadline passes
    /// or shutdown begins first. Either way the call's future is dropped,
    /// which abandons any in-flight storage work.
    pub async fn guarded<T, F>(&self, call: F) -> AppResult<T>
    where
        F: Future<Output = Result<T, CredentialError>>,
    {
        tokio::select! {
            biased;

            _ = self.shutdown.cancelled() => {
                Err(AppError::unavailable("server is shutting down"))
            }
            outcome = tokio::time::timeout(self.request_timeout(), call) => match outcome {
                Ok(result) => result.map_err(AppError::from),
                Err(_) => {
                    warn!(timeout = ?self.request_timeout(), "request deadline exceeded");
                    Err(AppError::unavailable("request timed out"))
                }
            },
        }
    }
}
