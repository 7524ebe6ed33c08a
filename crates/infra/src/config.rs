//! Runtime configuration read from the environment.

use std::time::Duration;

use crate::matching::template::FALLBACK_PUBLIC_HOST_URL;
use crate::matching::{DispatcherConfig, OverflowPolicy};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("{key}={value:?} is invalid: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub bind_addr: String,
    pub public_host_url: String,
    pub cache_ttl: Duration,
    pub cache_sweep_interval: Duration,
    pub notify_workers: usize,
    pub notify_queue_capacity: usize,
    pub notify_overflow: OverflowPolicy,
    pub detail_timeout: Duration,
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8080".to_string(),
            public_host_url: FALLBACK_PUBLIC_HOST_URL.to_string(),
            cache_ttl: Duration::from_secs(300),
            cache_sweep_interval: Duration::from_secs(600),
            notify_workers: 5,
            notify_queue_capacity: 100,
            notify_overflow: OverflowPolicy::Block,
            detail_timeout: Duration::from_millis(5000),
            log_level: "info".to_string(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; unset or blank keys keep defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let mut config = Self::default();

        if let Some(addr) = get("BIND_ADDR") {
            config.bind_addr = addr;
        }
        if let Some(url) = get("PUBLIC_HOST_URL") {
            config.public_host_url = url;
        }
        if let Some(raw) = get("CACHE_TTL_SECS") {
            config.cache_ttl = Duration::from_secs(positive("CACHE_TTL_SECS", &raw)?);
        }
        if let Some(raw) = get("CACHE_SWEEP_SECS") {
            config.cache_sweep_interval = Duration::from_secs(positive("CACHE_SWEEP_SECS", &raw)?);
        }
        if let Some(raw) = get("NOTIFY_WORKERS") {
            config.notify_workers = positive("NOTIFY_WORKERS", &raw)? as usize;
        }
        if let Some(raw) = get("NOTIFY_QUEUE_CAPACITY") {
            config.notify_queue_capacity = positive("NOTIFY_QUEUE_CAPACITY", &raw)? as usize;
        }
        if let Some(raw) = get("NOTIFY_OVERFLOW") {
            config.notify_overflow = match raw.to_ascii_lowercase().as_str() {
                "block" => OverflowPolicy::Block,
                "drop" => OverflowPolicy::DropAndLog,
                _ => {
                    return Err(ConfigError::Invalid {
                        key: "NOTIFY_OVERFLOW",
                        value: raw,
                        reason: "expected `block` or `drop`".to_string(),
                    });
                }
            };
        }
        if let Some(raw) = get("DETAIL_TIMEOUT_MS") {
            config.detail_timeout = Duration::from_millis(positive("DETAIL_TIMEOUT_MS", &raw)?);
        }
        if let Some(level) = get("LOG_LEVEL") {
            config.log_level = level;
        }

        Ok(config)
    }

    pub fn dispatcher(&self) -> DispatcherConfig {
        DispatcherConfig::default()
            .with_workers(self.notify_workers)
            .with_queue_capacity(self.notify_queue_capacity)
            .with_overflow(self.notify_overflow)
            .with_public_host_url(self.public_host_url.clone())
    }
}

fn positive(key: &'static str, raw: &str) -> Result<u64, ConfigError> {
    match raw.parse::<u64>() {
        Ok(0) => Err(ConfigError::Invalid {
            key,
            value: raw.to_string(),
            reason: "must be greater than zero".to_string(),
        }),
        Ok(n) => Ok(n),
        Err(e) => Err(ConfigError::Invalid {
            key,
            value: raw.to_string(),
            reason: e.to_string(),
        }),
    }
}
