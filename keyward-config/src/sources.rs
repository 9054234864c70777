use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::util::{non_empty_var, path_var};

/// Raw configuration as defined in a TOML file.
#[derive(Debug, Default, Clone, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct FileConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub env: Option<String>,
    #[serde(default)]
    pub server: FileServerConfig,
    #[serde(default)]
    pub storage: FileStorageConfig,
    #[serde(default)]
    pub auth: FileAuthConfig,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileServerConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    /// humantime duration, e.g. `"5s"`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_timeout: Option<String>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileStorageConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileAuthConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_ttl: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clock_skew: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password_pepper: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hash_workers: Option<usize>,
}

/// Environment-derived configuration values.
///
/// Values are kept as raw strings; the loader parses them so a malformed
/// variable is reported instead of silently ignored.
#[derive(Debug, Default, Clone)]
pub struct EnvConfig {
    pub config_path: Option<PathBuf>,
    pub env: Option<String>,
    pub server_host: Option<String>,
    pub server_port: Option<String>,
    pub request_timeout: Option<String>,
    pub database_url: Option<String>,
    pub storage_path: Option<String>,
    pub token_ttl: Option<String>,
    pub clock_skew: Option<String>,
    pub password_pepper: Option<String>,
    pub hash_workers: Option<String>,
}

impl EnvConfig {
    pub fn gather() -> Self {
        Self {
            config_path: path_var("KEYWARD_CONFIG"),
            env: non_empty_var("KEYWARD_ENV"),
            server_host: non_empty_var("SERVER_HOST"),
            server_port: non_empty_var("SERVER_PORT"),
            request_timeout: non_empty_var("REQUEST_TIMEOUT"),
            database_url: non_empty_var("DATABASE_URL"),
            storage_path: non_empty_var("STORAGE_PATH"),
            token_ttl: non_empty_var("AUTH_TOKEN_TTL"),
            clock_skew: non_empty_var("AUTH_CLOCK_SKEW"),
            password_pepper: non_empty_var("AUTH_PASSWORD_PEPPER"),
            hash_workers: non_empty_var("AUTH_HASH_WORKERS"),
        }
    }
}
