use std::str::FromStr;
use std::time::Duration;

use sage_core::executor::CommandExecutor;

/// Which [`JobStore`](sage_db::JobStore) implementation backs the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    Memory,
}

impl FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(Self::Postgres),
            "memory" => Ok(Self::Memory),
            other => Err(format!("expected 'postgres' or 'memory', got '{other}'")),
        }
    }
}

/// The external command each job runs.
#[derive(Debug, Clone)]
pub struct ExecutorConfig {
    pub program: String,
    pub args: Vec<String>,
    pub working_directory: Option<String>,
}

impl ExecutorConfig {
    pub fn build(&self) -> CommandExecutor {
        let executor = CommandExecutor::new(self.program.clone(), self.args.clone());
        match &self.working_directory {
            Some(dir) => executor.with_working_directory(dir.clone()),
            None => executor,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} is invalid: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Server configuration loaded from environment variables.
///
/// All fields except `DATABASE_URL` have defaults suitable for local
/// development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `8080`).
    pub port: u16,
    pub store_backend: StoreBackend,
    /// Required when `store_backend` is `Postgres`.
    pub database_url: Option<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// How long shutdown waits for in-flight jobs (default: `30`).
    pub shutdown_timeout_secs: u64,
    /// Delay between store reads on a status stream (default: 3s).
    pub status_poll_interval: Duration,
    pub executor: ExecutorConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                   | Default       |
    /// |---------------------------|---------------|
    /// | `HOST`                    | `0.0.0.0`     |
    /// | `PORT`                    | `8080`        |
    /// | `STORE_BACKEND`           | `postgres`    |
    /// | `DATABASE_URL`            | (required for postgres) |
    /// | `REQUEST_TIMEOUT_SECS`    | `30`          |
    /// | `SHUTDOWN_TIMEOUT_SECS`   | `30`          |
    /// | `STATUS_POLL_INTERVAL_MS` | `3000`        |
    /// | `EXECUTOR_PROGRAM`        | `python3`     |
    /// | `EXECUTOR_ARGS`           | `nlp.py`      |
    /// | `EXECUTOR_WORKDIR`        | (unset)       |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let host = var("HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port: u16 = parse_or(&var, "PORT", 8080)?;
        let store_backend = parse_or(&var, "STORE_BACKEND", StoreBackend::Postgres)?;
        let database_url = var("DATABASE_URL");
        if store_backend == StoreBackend::Postgres && database_url.is_none() {
            return Err(ConfigError::Missing("DATABASE_URL"));
        }

        let request_timeout_secs = parse_or(&var, "REQUEST_TIMEOUT_SECS", 30)?;
        let shutdown_timeout_secs = parse_or(&var, "SHUTDOWN_TIMEOUT_SECS", 30)?;

        let poll_ms: u64 = parse_or(&var, "STATUS_POLL_INTERVAL_MS", 3000)?;
        if poll_ms == 0 {
            return Err(ConfigError::Invalid {
                name: "STATUS_POLL_INTERVAL_MS",
                reason: "must be greater than zero".into(),
            });
        }

        let executor = ExecutorConfig {
            program: var("EXECUTOR_PROGRAM").unwrap_or_else(|| "python3".into()),
            args: var("EXECUTOR_ARGS")
                .unwrap_or_else(|| "nlp.py".into())
                .split_whitespace()
                .map(str::to_string)
                .collect(),
            working_directory: var("EXECUTOR_WORKDIR"),
        };

        Ok(Self {
            host,
            port,
            store_backend,
            database_url,
            request_timeout_secs,
            shutdown_timeout_secs,
            status_poll_interval: Duration::from_millis(poll_ms),
            executor,
        })
    }
}

fn parse_or<T, F>(var: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match var(name) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            name,
            reason: e.to_string(),
        }),
    }
}
