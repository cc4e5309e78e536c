use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_DATABASE_URL: &str = "sqlite:local.db?mode=rwc";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("APP_ENV has to be set to \"production\" or \"development\", got {0:?}")]
    AppEnv(String),

    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("invalid {key} value: {value}")]
    Invalid { key: &'static str, value: String },

    #[error("failed to load {file}: {source}")]
    EnvFile {
        file: String,
        #[source]
        source: dotenvy::Error,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Production,
    Development,
}

impl AppEnv {
    pub fn env_file(self) -> &'static str {
        match self {
            AppEnv::Production => ".env.production",
            AppEnv::Development => ".env.development",
        }
    }
}

impl FromStr for AppEnv {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "production" => Ok(AppEnv::Production),
            "development" => Ok(AppEnv::Development),
            _ => Err(ConfigError::AppEnv(s.to_string())),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AgentConfig {
    pub app_env: AppEnv,
    pub instance_id: String,
    pub billing_url: String,
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub log_dir: PathBuf,
    pub docker_socket: Option<String>,
    pub cycle_interval: Duration,
    pub shutdown_grace: Duration,
    pub billing_timeout: Duration,
    pub allowed_origins: Vec<String>,
}

impl AgentConfig {
    /// Reads `APP_ENV`, loads the matching dotenv file when present, then
    /// builds the config from the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        let app_env: AppEnv = std::env::var("APP_ENV").unwrap_or_default().parse()?;

        match dotenvy::from_filename(app_env.env_file()) {
            Ok(_) => {}
            Err(e) if e.not_found() => {}
            Err(source) => {
                return Err(ConfigError::EnvFile {
                    file: app_env.env_file().to_string(),
                    source,
                })
            }
        }

        Self::from_lookup(app_env, |key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup.
    pub fn from_lookup<F>(app_env: AppEnv, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &'static str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or(ConfigError::Missing(key))
        };
        let or_default = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        Ok(Self {
            app_env,
            instance_id: required("INSTANCE_ID")?.trim().to_string(),
            billing_url: required("CYCLES_URL")?.trim_end_matches('/').to_string(),
            host: or_default("HOST", "0.0.0.0"),
            port: parse_number(&lookup, "PORT", 8080)?,
            database_url: or_default("DATABASE_URL", DEFAULT_DATABASE_URL),
            log_dir: PathBuf::from(or_default("LOG_DIR", "./logs")),
            docker_socket: lookup("DOCKER_SOCKET").filter(|v| !v.is_empty()),
            cycle_interval: Duration::from_millis(parse_nonzero(&lookup, "CYCLE_INTERVAL_MS", 1000)?),
            shutdown_grace: Duration::from_secs(parse_number(&lookup, "SHUTDOWN_GRACE_SECS", 5)?),
            billing_timeout: Duration::from_secs(parse_number(&lookup, "BILLING_TIMEOUT_SECS", 10)?),
            allowed_origins: or_default("ALLOWED_ORIGINS", "http://localhost:3000")
                .split(',')
                .map(|origin| origin.trim().to_string())
                .filter(|origin| !origin.is_empty())
                .collect(),
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_number<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value }),
    }
}

fn parse_nonzero<F>(lookup: &F, key: &'static str, default: u64) -> Result<u64, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match parse_number(lookup, key, default)? {
        0 => Err(ConfigError::Invalid {
            key,
            value: "0".to_string(),
        }),
        n => Ok(n),
    }
}
