use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use thiserror::Error;

use crate::models::{
    AuthConfig, Config, ConfigMetadata, ConfigWarnings, Environment, ServerConfig,
    StorageConfig,
};
use crate::sources::{EnvConfig, FileConfig};
use crate::util::{default_hash_workers, parse_duration};

const DEFAULT_CONFIG_LOCATIONS: [&str; 2] = ["keyward.toml", "config/keyward.toml"];

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 44044;
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(5);
const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(60 * 60);

#[derive(Debug, Default, Clone)]
struct ConfigLoaderOptions {
    config_path: Option<PathBuf>,
    env_file: Option<PathBuf>,
}

#[derive(Debug, Default)]
pub struct ConfigLoader {
    options: ConfigLoaderOptions,
}

#[derive(Debug)]
pub struct ConfigLoad {
    pub config: Config,
    pub warnings: ConfigWarnings,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.options.config_path = Some(path.into());
        self
    }

    pub fn with_env_file<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.options.env_file = Some(path.into());
        self
    }

    /// Load `.env`, read the environment and the config file, and compose
    /// the effective configuration.
    pub fn load(&self) -> Result<ConfigLoad, ConfigLoadError> {
        let env_file_loaded = match &self.options.env_file {
            Some(path) => dotenvy::from_path(path).map(|_| true),
            None => dotenvy::dotenv().map(|_| true),
        }
        .or_else(|err| match err {
            dotenvy::Error::Io(_) => Ok(false),
            other => Err(other),
        })?;

        let env = EnvConfig::gather();
        let (file, config_path) = self.load_file_config(&env)?;

        let metadata = ConfigMetadata {
            config_path,
            env_file_loaded,
        };
        Self::compose(file, env, metadata)
    }

    fn load_file_config(
        &self,
        env: &EnvConfig,
    ) -> Result<(Option<FileConfig>, Option<PathBuf>), ConfigLoadError> {
        let explicit = self
            .options
            .config_path
            .clone()
            .or_else(|| env.config_path.clone());

        let path = match explicit {
            Some(path) if !path.exists() => {
                return Err(ConfigLoadError::MissingConfig { path });
            }
            Some(path) => path,
            None => match DEFAULT_CONFIG_LOCATIONS
                .iter()
                .map(PathBuf::from)
                .find(|candidate| candidate.exists())
            {
                Some(path) => path,
                None => return Ok((None, None)),
            },
        };

        let file = read_file_config(&path)?;
        Ok((Some(file), Some(path)))
    }

    /// Merge a file configuration with environment values. Environment
    /// values win; defaults fill whatever neither provides.
    pub fn compose(
        file: Option<FileConfig>,
        env: EnvConfig,
        metadata: ConfigMetadata,
    ) -> Result<ConfigLoad, ConfigLoadError> {
        let mut warnings = ConfigWarnings::default();

        if file.is_none() {
            warnings.push_with_hint(
                "No keyward.toml detected; falling back to environment variables",
                "Set KEYWARD_CONFIG or pass --config to point at a configuration file",
            );
        }

        let FileConfig {
            env: file_env,
            server: file_server,
            storage: file_storage,
            auth: file_auth,
        } = file.unwrap_or_default();

        let deploy_env = match env.env.or(file_env) {
            Some(raw) => raw
                .parse::<Environment>()
                .map_err(|value| ConfigLoadError::InvalidEnvironment { value })?,
            None => Environment::default(),
        };

        let port = match env.server_port {
            Some(raw) => parse_number("server.port", &raw)?,
            None => file_server.port.unwrap_or(DEFAULT_PORT),
        };

        let server = ServerConfig {
            host: env
                .server_host
                .or(file_server.host)
                .unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port,
            request_timeout: duration_or(
                "server.request_timeout",
                env.request_timeout.or(file_server.request_timeout),
                DEFAULT_REQUEST_TIMEOUT,
            )?,
        };
        if server.request_timeout.is_zero() {
            return Err(ConfigLoadError::ZeroDuration {
                field: "server.request_timeout",
            });
        }

        let storage = StorageConfig {
            path: env
                .database_url
                .or(env.storage_path)
                .or(file_storage.path)
                .filter(|path| !path.trim().is_empty())
                .ok_or(ConfigLoadError::MissingStorage)?,
        };

        let hash_workers = match env.hash_workers {
            Some(raw) => parse_number("auth.hash_workers", &raw)?,
            None => file_auth.hash_workers.unwrap_or_else(default_hash_workers),
        };
        if hash_workers == 0 {
            return Err(ConfigLoadError::ZeroHashWorkers);
        }

        let auth = AuthConfig {
            token_ttl: duration_or(
                "auth.token_ttl",
                env.token_ttl.or(file_auth.token_ttl),
                DEFAULT_TOKEN_TTL,
            )?,
            clock_skew: duration_or(
                "auth.clock_skew",
                env.clock_skew.or(file_auth.clock_skew),
                Duration::ZERO,
            )?,
            password_pepper: env
                .password_pepper
                .or(file_auth.password_pepper)
                .filter(|pepper| !pepper.is_empty()),
            hash_workers,
        };
        if auth.token_ttl.is_zero() {
            return Err(ConfigLoadError::ZeroDuration {
                field: "auth.token_ttl",
            });
        }

        if deploy_env == Environment::Prod && auth.password_pepper.is_none() {
            warnings.push_with_hint(
                "No password pepper configured for a production deployment",
                "Set AUTH_PASSWORD_PEPPER; changing it later invalidates existing password hashes",
            );
        }

        let config = Config {
            env: deploy_env,
            server,
            storage,
            auth,
            metadata,
        };

        Ok(ConfigLoad { config, warnings })
    }
}

fn read_file_config(path: &Path) -> Result<FileConfig, ConfigLoadError> {
    let contents = fs::read_to_string(path).map_err(|source| ConfigLoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&contents).map_err(|source| ConfigLoadError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn duration_or(
    field: &'static str,
    raw: Option<String>,
    default: Duration,
) -> Result<Duration, ConfigLoadError> {
    match raw {
        Some(value) => parse_duration(&value).map_err(|source| ConfigLoadError::InvalidDuration {
            field,
            value,
            source,
        }),
        None => Ok(default),
    }
}

fn parse_number<T: std::str::FromStr>(
    field: &'static str,
    raw: &str,
) -> Result<T, ConfigLoadError> {
    raw.trim()
        .parse()
        .map_err(|_| ConfigLoadError::InvalidNumber {
            field,
            value: raw.to_string(),
        })
}

#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("configuration file missing: {path}")]
    MissingConfig { path: PathBuf },
    #[error("failed to read configuration {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse configuration {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("no credential store configured; set DATABASE_URL, STORAGE_PATH or storage.path")]
    MissingStorage,
    #[error("unknown environment '{value}' (expected local, dev or prod)")]
    InvalidEnvironment { value: String },
    #[error("invalid duration '{value}' for {field}")]
    InvalidDuration {
        field: &'static str,
        value: String,
        #[source]
        source: humantime::DurationError,
    },
    #[error("invalid number '{value}' for {field}")]
    InvalidNumber { field: &'static str, value: String },
    #[error("{field} must be greater than zero")]
    ZeroDuration { field: &'static str },
    #[error("auth.hash_workers must be at least one")]
    ZeroHashWorkers,
    #[error(transparent)]
    EnvFile(#[from] dotenvy::Error),
}
