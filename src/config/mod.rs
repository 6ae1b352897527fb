//! Benchmark configuration.
//!
//! One [`BenchConfig`] is loaded at startup and passed by reference to every
//! command. The file layout mirrors the classic `config.json`:
//!
//! ```json
//! {
//!   "db_config": { "host": "localhost", "port": 5432, "user": "postgres",
//!                  "password": "postgres", "dbname": "bench" },
//!   "simulation_config": { "batch_size": 100, "total_batches": 13 },
//!   "analysis_config": { "query_limit": 10 }
//! }
//! ```
//!
//! The format is chosen by file extension: `.yaml`/`.yml` and `.toml` are
//! accepted as well as JSON.

mod duration;

use crate::loadtest::populate::mask_connection_password;
use anyhow::Context;
use duration::deserialize_optional_duration;
use loadtest_populate::{CommonPopulateArgs, SchedulerOptions, DEFAULT_BATCH_TIMEOUT};
use serde::Deserialize;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

/// Config file used when `--config` is not given and the file exists.
pub const DEFAULT_CONFIG_FILE: &str = "config.json";

/// Complete benchmark configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct BenchConfig {
    /// Database connection parameters.
    #[serde(default)]
    pub db_config: DbConfig,
    /// Populate run parameters.
    #[serde(default)]
    pub simulation_config: SimulationConfig,
    /// Inspection parameters.
    #[serde(default)]
    pub analysis_config: AnalysisConfig,
}

/// PostgreSQL connection parameters.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DbConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub dbname: String,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 5432,
            user: "postgres".to_string(),
            password: String::new(),
            dbname: "postgres".to_string(),
        }
    }
}

/// Populate run parameters; every field can be overridden on the command line.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Rows per batch.
    pub batch_size: Option<usize>,
    /// Number of batches.
    pub total_batches: Option<u64>,
    /// Batches in flight per group.
    pub concurrency: usize,
    /// Base seed for value generation.
    pub seed: u64,
    /// Deadline per batch; 0 disables it.
    #[serde(deserialize_with = "deserialize_optional_duration")]
    pub batch_timeout: Option<Duration>,
    /// Deadline for the whole run; absent or 0 disables it.
    #[serde(deserialize_with = "deserialize_optional_duration")]
    pub run_timeout: Option<Duration>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            batch_size: None,
            total_batches: None,
            concurrency: loadtest_populate::DEFAULT_CONCURRENCY,
            seed: 42,
            batch_timeout: Some(DEFAULT_BATCH_TIMEOUT),
            run_timeout: None,
        }
    }
}

/// Inspection parameters.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Rows printed by `show-rows` when `--limit` is not given.
    pub query_limit: u64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self { query_limit: 10 }
    }
}

/// Fully resolved parameters of one populate run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PopulatePlan {
    pub batch_size: usize,
    pub total_batches: u64,
    pub seed: u64,
    pub options: SchedulerOptions,
}

/// Resolved connection parameters plus a loggable description.
#[derive(Debug, Clone)]
pub struct ConnectionSettings {
    pub config: tokio_postgres::Config,
    /// Connection description with the password masked.
    pub display: String,
}

impl BenchConfig {
    /// Load from `path`, choosing the format by extension.
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);

        let config = match extension.as_deref() {
            Some("yaml") | Some("yml") => serde_yaml::from_str(&content)
                .with_context(|| format!("Invalid YAML in {}", path.display()))?,
            Some("toml") => toml::from_str(&content)
                .with_context(|| format!("Invalid TOML in {}", path.display()))?,
            _ => serde_json::from_str(&content)
                .with_context(|| format!("Invalid JSON in {}", path.display()))?,
        };
        Ok(config)
    }

    /// Load the configuration for this invocation.
    ///
    /// An explicit path must exist. Without one, `config.json` in the working
    /// directory is used when present, and built-in defaults otherwise.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    Self::from_file(default_path)
                } else {
                    tracing::debug!("No {} found, using defaults", DEFAULT_CONFIG_FILE);
                    Ok(Self::default())
                }
            }
        }
    }

    /// Connection parameters: `connection_string` when given, else `db_config`.
    pub fn connection(&self, connection_string: Option<&str>) -> anyhow::Result<ConnectionSettings> {
        match connection_string {
            Some(conn_str) => Ok(ConnectionSettings {
                config: tokio_postgres::Config::from_str(conn_str)
                    .context("Invalid PostgreSQL connection string")?,
                display: mask_connection_password(conn_str),
            }),
            None => Ok(ConnectionSettings {
                config: self.db_config.to_pg_config(),
                display: self.db_config.describe(),
            }),
        }
    }
}

impl DbConfig {
    /// Build `tokio-postgres` connection parameters.
    pub fn to_pg_config(&self) -> tokio_postgres::Config {
        let mut config = tokio_postgres::Config::new();
        config
            .host(&self.host)
            .port(self.port)
            .user(&self.user)
            .dbname(&self.dbname);
        if !self.password.is_empty() {
            config.password(&self.password);
        }
        config
    }

    /// Loggable description, without the password.
    pub fn describe(&self) -> String {
        format!(
            "host={} port={} user={} dbname={}",
            self.host, self.port, self.user, self.dbname
        )
    }
}

impl SimulationConfig {
    /// Merge command-line overrides into the file values.
    pub fn resolve(&self, args: &CommonPopulateArgs) -> anyhow::Result<PopulatePlan> {
        let batch_size = args
            .batch_size
            .or(self.batch_size)
            .context("batch size not set: pass --batch-size or set simulation_config.batch_size")?;
        let total_batches = args.total_batches.or(self.total_batches).context(
            "total batches not set: pass --total-batches or set simulation_config.total_batches",
        )?;
        if batch_size == 0 {
            anyhow::bail!("batch size must be at least 1");
        }

        let concurrency = args.concurrency.unwrap_or(self.concurrency);
        if concurrency == 0 {
            anyhow::bail!("concurrency must be at least 1");
        }

        let enabled = |d: Option<Duration>| d.filter(|d| !d.is_zero());
        Ok(PopulatePlan {
            batch_size,
            total_batches,
            seed: args.seed.unwrap_or(self.seed),
            options: SchedulerOptions {
                concurrency,
                batch_timeout: enabled(args.batch_timeout.or(self.batch_timeout)),
                run_timeout: enabled(args.run_timeout.or(self.run_timeout)),
            },
        })
    }
}
