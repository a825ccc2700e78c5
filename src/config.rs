use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_CONFIG_PATH: &str = "conf.yaml";
pub const ENV_CONFIG_PATH: &str = "CONFIG_PATH";
pub const ENV_PREFIX: &str = "TRANSLATOR";
pub const DEFAULT_API_KEY_ENV: &str = "OPENAI_API_KEY";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub system_config: SystemConfig,
    #[serde(default)]
    pub llm_config: LlmConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Settings for the OpenAI-compatible completion endpoint
#[derive(Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Inline credential; takes precedence over `api_key_env`
    #[serde(default)]
    pub llm_api_key: Option<String>,

    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_model() -> String {
    "gpt-3.5-turbo".to_string()
}

fn default_temperature() -> f32 {
    0.3
}

fn default_api_key_env() -> String {
    DEFAULT_API_KEY_ENV.to_string()
}

fn default_timeout_secs() -> u64 {
    60
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            model: default_model(),
            temperature: default_temperature(),
            llm_api_key: None,
            api_key_env: default_api_key_env(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LlmConfig")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("llm_api_key", &self.llm_api_key.as_ref().map(|_| "**redacted**"))
            .field("api_key_env", &self.api_key_env)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl LlmConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] ::config::ConfigError),
    #[error("no API key configured; set {0} or llm_config.llm_api_key")]
    MissingApiKey(String),
    #[error("temperature must be within [0, 2], got {0}")]
    InvalidTemperature(f32),
    #[error("timeout_secs must be > 0")]
    ZeroTimeout,
    #[error("model must not be empty")]
    EmptyModel,
}

impl Config {
    /// Layer defaults, the optional config file at `path` and
    /// `TRANSLATOR__*` environment overrides.
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        Self::load_with_prefix(Path::new(path), ENV_PREFIX)
    }

    fn load_with_prefix(path: &Path, env_prefix: &str) -> Result<Self, ConfigError> {
        let settings = ::config::Config::builder()
            .add_source(::config::File::from(path).required(false))
            .add_source(
                ::config::Environment::with_prefix(env_prefix)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: Config = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let llm = &self.llm_config;
        if !(0.0..=2.0).contains(&llm.temperature) {
            return Err(ConfigError::InvalidTemperature(llm.temperature));
        }
        if llm.timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        if llm.model.trim().is_empty() {
            return Err(ConfigError::EmptyModel);
        }
        Ok(())
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new<S: Into<String>>(value: S) -> Option<Self> {
        let v = value.into();
        if v.trim().is_empty() {
            return None;
        }
        Some(Self(v))
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(**redacted**)")
    }
}

pub trait Env {
    fn var(&self, key: &str) -> Option<String>;
}

#[derive(Clone, Debug, Default)]
pub struct StdEnv;

impl Env for StdEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

/// Inline `llm_api_key` wins over the environment variable named by `api_key_env`.
pub fn resolve_api_key(llm: &LlmConfig, env: &impl Env) -> Result<ApiKey, ConfigError> {
    llm.llm_api_key
        .clone()
        .and_then(ApiKey::new)
        .or_else(|| env.var(&llm.api_key_env).and_then(ApiKey::new))
        .ok_or_else(|| ConfigError::MissingApiKey(llm.api_key_env.clone()))
}
