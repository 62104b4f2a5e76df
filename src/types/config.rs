//! Configuration for score-proxy.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::engine::MAX_QUEUE_CAPACITY;
use crate::{ProxyError, ProxyResult};

/// Main configuration for score-proxy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Inbound HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Downstream scoring API settings.
    #[serde(default)]
    pub upstream: UpstreamConfig,

    /// Admission queue and worker settings.
    #[serde(default)]
    pub queue: QueueConfig,

    /// Cache settings.
    #[serde(default)]
    pub cache: CacheConfig,
}

/// General settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Log format (text, json).
    #[serde(default = "default_log_format")]
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: default_log_format(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

/// Inbound HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address the proxy listens on.
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:8000".to_string()
}

/// Downstream scoring API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    /// Base URL; requests go to `{base_url}/score`.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Value of the `client-id` header.
    #[serde(default)]
    pub client_id: String,

    /// Timeout of a single downstream call (in seconds).
    #[serde(default = "default_upstream_timeout")]
    pub timeout_secs: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            client_id: String::new(),
            timeout_secs: default_upstream_timeout(),
        }
    }
}

fn default_base_url() -> String {
    "https://score.hsborges.dev/api".to_string()
}

fn default_upstream_timeout() -> u64 {
    30
}

/// Admission queue and worker settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueConfig {
    /// Maximum number of jobs waiting for the worker.
    #[serde(default = "default_queue_capacity")]
    pub capacity: usize,

    /// Minimum wait before each downstream call (in milliseconds).
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,

    /// Overall time a caller waits for its score (in seconds).
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            capacity: default_queue_capacity(),
            interval_ms: default_interval_ms(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

fn default_queue_capacity() -> usize {
    100
}

fn default_interval_ms() -> u64 {
    1000
}

fn default_request_timeout() -> u64 {
    60
}

/// Score cache settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Maximum cache capacity (number of entries).
    #[serde(default = "default_cache_capacity")]
    pub capacity: usize,

    /// Entry time to live in seconds.
    #[serde(default = "default_cache_ttl")]
    pub ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: default_cache_capacity(),
            ttl_secs: default_cache_ttl(),
        }
    }
}

fn default_cache_capacity() -> usize {
    10_000
}

fn default_cache_ttl() -> u64 {
    300 // 5 minutes
}

impl Config {
    /// Loads configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> ProxyResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Saves configuration to a TOML file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> ProxyResult<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Creates default configuration.
    pub fn default_config() -> Self {
        Self {
            general: GeneralConfig::default(),
            server: ServerConfig::default(),
            upstream: UpstreamConfig::default(),
            queue: QueueConfig::default(),
            cache: CacheConfig::default(),
        }
    }

    /// Checks the values the engine cannot run without.
    ///
    /// The upstream section is only checked when `needs_upstream` is set,
    /// so commands that never reach the scoring API work with an empty
    /// client id.
    pub fn validate(&self, needs_upstream: bool) -> ProxyResult<()> {
        if self.queue.capacity == 0 {
            return Err(ProxyError::config("queue.capacity must be greater than 0"));
        }
        if self.queue.capacity > MAX_QUEUE_CAPACITY {
            return Err(ProxyError::config(format!(
                "queue.capacity must be at most {}",
                MAX_QUEUE_CAPACITY
            )));
        }
        if self.cache.capacity == 0 {
            return Err(ProxyError::config("cache.capacity must be greater than 0"));
        }
        if needs_upstream {
            if self.upstream.base_url.trim().is_empty() {
                return Err(ProxyError::config("upstream.base_url is empty"));
            }
            if self.upstream.client_id.trim().is_empty() {
                return Err(ProxyError::config("upstream.client_id is empty"));
            }
        }
        Ok(())
    }

    /// Minimum interval between downstream calls.
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.queue.interval_ms)
    }

    /// Overall wait budget of a single caller.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.queue.request_timeout_secs)
    }

    /// Cache time to live.
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache.ttl_secs)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::default_config()
    }
}
