//! Application configuration loaded from environment variables.

use anyhow::{bail, Context, Result};
use counter_store::{CounterFields, CounterStore, MemoryCounterStore, RestCounterStore};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Chat platform configuration
    #[serde(default)]
    pub discord: DiscordConfig,

    /// Usage counter configuration
    #[serde(default)]
    pub counter: CounterConfig,

    /// Reply formatting
    #[serde(default)]
    pub reply: ReplyConfig,

    /// Logging configuration
    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Server listen address
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DiscordConfig {
    /// Hex-encoded Ed25519 application public key
    #[serde(default)]
    pub public_key: Option<String>,

    /// Reject requests whose signature does not verify.
    /// When false, failures are only logged.
    #[serde(default)]
    pub enforce_signature: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CounterBackend {
    Memory,
    Rest,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CounterConfig {
    /// Storage backend
    #[serde(default = "default_backend")]
    pub backend: CounterBackend,

    /// Redis REST endpoint (rest backend only)
    #[serde(default)]
    pub url: Option<String>,

    /// Redis REST token (rest backend only)
    #[serde(default)]
    pub token: Option<SecretString>,

    /// Row key holding the counter
    #[serde(default = "default_counter_key")]
    pub key: String,

    /// Attribute holding the count
    #[serde(default = "default_count_field")]
    pub count_field: String,

    /// Attribute holding the last-used timestamp
    #[serde(default = "default_last_used_field")]
    pub last_used_field: String,

    /// Bound on every store call
    #[serde(default = "default_store_timeout", with = "humantime_serde")]
    pub timeout: Duration,

    /// Count every recognised command, not only `stats`
    #[serde(default)]
    pub count_all_commands: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReplyConfig {
    /// Prefix of the `time` reply
    #[serde(default = "default_time_emoji")]
    pub time_emoji: String,

    /// Prefix of the `stats` reply
    #[serde(default = "default_stats_emoji")]
    pub stats_emoji: String,

    /// Name used when the payload carries no username
    #[serde(default = "default_username")]
    pub default_username: String,

    /// Whether `ping` greets the invoking user by name
    #[serde(default = "default_true")]
    pub ping_mentions_user: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,
}

// Default implementations
impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            port: default_port(),
        }
    }
}

impl Default for DiscordConfig {
    fn default() -> Self {
        Self {
            public_key: None,
            enforce_signature: false,
        }
    }
}

impl Default for CounterConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            url: None,
            token: None,
            key: default_counter_key(),
            count_field: default_count_field(),
            last_used_field: default_last_used_field(),
            timeout: default_store_timeout(),
            count_all_commands: false,
        }
    }
}

impl Default for ReplyConfig {
    fn default() -> Self {
        Self {
            time_emoji: default_time_emoji(),
            stats_emoji: default_stats_emoji(),
            default_username: default_username(),
            ping_mentions_user: default_true(),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

// Default value functions
fn default_listen_addr() -> String {
    "0.0.0.0".into()
}

fn default_port() -> u16 {
    8080
}

fn default_backend() -> CounterBackend {
    CounterBackend::Memory
}

fn default_counter_key() -> String {
    "stats".into()
}

fn default_count_field() -> String {
    "count".into()
}

fn default_last_used_field() -> String {
    "last_used".into()
}

fn default_store_timeout() -> Duration {
    Duration::from_secs(5)
}

fn default_time_emoji() -> String {
    "⏰".into()
}

fn default_stats_emoji() -> String {
    "📊".into()
}

fn default_username() -> String {
    "there".into()
}

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".into()
}

impl Config {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self> {
        // Load .env file if present
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .separator("__")
                    .try_parsing(false),
            )
            .build()
            .context("Failed to build configuration")?;

        let config: Self = config
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        config.validate()?;
        Ok(config)
    }

    /// Reject combinations that cannot work at runtime.
    pub fn validate(&self) -> Result<()> {
        if self.counter.backend == CounterBackend::Rest {
            if self.counter.url.as_deref().map_or(true, str::is_empty) {
                bail!("COUNTER__URL is required when COUNTER__BACKEND=rest");
            }
            if self.counter.token.is_none() {
                bail!("COUNTER__TOKEN is required when COUNTER__BACKEND=rest");
            }
        }

        if self.discord.enforce_signature && self.discord.public_key.is_none() {
            bail!("DISCORD__ENFORCE_SIGNATURE requires DISCORD__PUBLIC_KEY");
        }

        if self.counter.timeout.is_zero() {
            bail!("COUNTER__TIMEOUT must be greater than zero");
        }

        Ok(())
    }
}

impl CounterConfig {
    /// Construct the configured counter backend.
    pub fn build_store(&self) -> Result<Arc<dyn CounterStore>> {
        match self.backend {
            CounterBackend::Memory => {
                warn!("Using in-memory counter store - counts reset on restart");
                Ok(Arc::new(MemoryCounterStore::new()))
            }
            CounterBackend::Rest => {
                let url = self.url.clone().context("COUNTER__URL is not set")?;
                let token = self.token.as_ref().context("COUNTER__TOKEN is not set")?;

                let store =
                    RestCounterStore::new(url, token.expose_secret().as_str(), self.timeout)
                        .context("Failed to create REST counter store")?
                        .with_fields(CounterFields {
                            count: self.count_field.clone(),
                            last_used: self.last_used_field.clone(),
                        });

                info!("Using REST counter store at {}", store.base_url());
                Ok(Arc::new(store))
            }
        }
    }
}
