use crate::api::constants::{DEFAULT_ORIGIN, DEFAULT_PAGE_SIZE};
use crate::api::resilience::{ResilienceConfig, RetryConfig};
use crate::dsl::DEFAULT_DSL_DIR;
use anyhow::{Context, Result};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub dify: DifyConfig,
    #[serde(default)]
    pub dsl: DslConfig,
    #[serde(default)]
    pub engine: EngineConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DifyConfig {
    #[serde(default = "default_origin")]
    pub origin: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DslConfig {
    #[serde(default = "default_dsl_dir")]
    pub dir: PathBuf,
    /// Only apps carrying one of these tags are exported; empty exports all
    #[serde(default)]
    pub export_tags: Vec<String>,
    #[serde(default = "default_true")]
    pub include_secret: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_backoff_ms")]
    pub backoff_ms: u64,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

fn default_origin() -> String {
    DEFAULT_ORIGIN.to_string()
}

fn default_dsl_dir() -> PathBuf {
    PathBuf::from(DEFAULT_DSL_DIR)
}

fn default_true() -> bool {
    true
}

fn default_max_concurrency() -> usize {
    3
}

fn default_max_attempts() -> u32 {
    3
}

fn default_backoff_ms() -> u64 {
    500
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

impl Default for DifyConfig {
    fn default() -> Self {
        Self {
            origin: default_origin(),
            email: None,
            password: None,
        }
    }
}

impl Default for DslConfig {
    fn default() -> Self {
        Self {
            dir: default_dsl_dir(),
            export_tags: Vec::new(),
            include_secret: default_true(),
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_concurrency: default_max_concurrency(),
            max_attempts: default_max_attempts(),
            backoff_ms: default_backoff_ms(),
            page_size: default_page_size(),
        }
    }
}

/// Split a comma separated list, dropping blanks
pub fn parse_tag_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_env<T>(key: &str, value: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value
        .trim()
        .parse()
        .with_context(|| format!("Invalid value for {}: {:?}", key, value))
}

impl Config {
    /// `None` when the platform has no config directory (e.g. `HOME` unset)
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("dify-bulk").join("config.toml"))
    }

    /// Load defaults, the TOML file and then the environment (`.env` included).
    ///
    /// An explicit `path` must exist; the default location may be absent.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Ok(env_path) = dotenvy::dotenv() {
            debug!("Loaded environment from {:?}", env_path);
        }

        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::from_optional_file(Self::default_config_path().as_deref())?,
        };

        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Defaults when there is no path or nothing at it
    pub fn from_optional_file(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) if path.exists() => Self::from_file(path),
            Some(path) => {
                debug!("No config file at {:?}, using defaults", path);
                Ok(Self::default())
            }
            None => {
                debug!("No config directory on this platform, using defaults");
                Ok(Self::default())
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading config from: {:?}", path);
        let content =
            fs::read_to_string(path).with_context(|| format!("Failed to read config file: {:?}", path))?;
        let config: Config =
            toml::from_str(&content).with_context(|| format!("Failed to parse config file: {:?}", path))?;
        info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Override fields from environment variables looked up through `lookup`
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(origin) = lookup("DIFY_ORIGIN") {
            self.dify.origin = origin;
        }
        if let Some(email) = lookup("EMAIL") {
            self.dify.email = Some(email);
        }
        if let Some(password) = lookup("PASSWORD") {
            self.dify.password = Some(password);
        }
        if let Some(dir) = lookup("DSL_FOLDER_PATH") {
            self.dsl.dir = PathBuf::from(dir);
        }
        if let Some(tags) = lookup("DSL_EXPORT_TAGS") {
            self.dsl.export_tags = parse_tag_list(&tags);
        }
        if let Some(value) = lookup("DIFY_MAX_CONCURRENCY") {
            self.engine.max_concurrency = parse_env("DIFY_MAX_CONCURRENCY", &value)?;
        }
        if let Some(value) = lookup("DIFY_MAX_ATTEMPTS") {
            self.engine.max_attempts = parse_env("DIFY_MAX_ATTEMPTS", &value)?;
        }
        if let Some(value) = lookup("DIFY_BACKOFF_MS") {
            self.engine.backoff_ms = parse_env("DIFY_BACKOFF_MS", &value)?;
        }
        if let Some(value) = lookup("DIFY_PAGE_SIZE") {
            self.engine.page_size = parse_env("DIFY_PAGE_SIZE", &value)?;
        }
        Ok(())
    }

    /// Engine settings for the executor
    pub fn resilience(&self) -> ResilienceConfig {
        ResilienceConfig::builder()
            .retry_config(RetryConfig {
                max_attempts: self.engine.max_attempts.max(1),
                backoff: Duration::from_millis(self.engine.backoff_ms),
            })
            .max_in_flight(self.engine.max_concurrency)
            .build()
    }

    pub fn page_size(&self) -> u32 {
        self.engine.page_size.max(1)
    }

    pub fn email(&self) -> Result<&str> {
        self.dify
            .email
            .as_deref()
            .filter(|email| !email.is_empty())
            .context("No login email configured (set EMAIL or [dify] email)")
    }
}
