//! Tracing subscriber initialization.
//!
//! `RUST_LOG` wins over the configured default level. Output is JSON unless
//! `LOG_FORMAT=compact`.

use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Json,
    Compact,
}

impl LogFormat {
    /// Unknown values fall back to JSON.
    pub fn parse(raw: &str) -> Self {
        if raw.trim().eq_ignore_ascii_case("compact") {
            LogFormat::Compact
        } else {
            LogFormat::Json
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    pub default_level: String,
    pub format: LogFormat,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            default_level: "info".to_string(),
            format: LogFormat::Json,
        }
    }
}

impl LogSettings {
    pub fn new(default_level: impl Into<String>) -> Self {
        Self {
            default_level: default_level.into(),
            ..Self::default()
        }
    }

    /// Format taken from `LOG_FORMAT`.
    pub fn with_env_format(mut self) -> Self {
        if let Ok(raw) = std::env::var("LOG_FORMAT") {
            self.format = LogFormat::parse(&raw);
        }
        self
    }
}

pub fn init(settings: &LogSettings) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.default_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_timer(tracing_subscriber::fmt::time::SystemTime)
        .with_thread_names(true);

    let _ = match settings.format {
        LogFormat::Json => builder.json().with_target(false).try_init(),
        LogFormat::Compact => builder.compact().try_init(),
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_compact_switches_format() {
        assert_eq!(LogFormat::parse("Compact"), LogFormat::Compact);
        assert_eq!(LogFormat::parse("json"), LogFormat::Json);
        assert_eq!(LogFormat::parse("pretty"), LogFormat::Json);
    }

    #[test]
    fn init_twice_is_harmless() {
        let settings = LogSettings::new("debug");
        init(&settings);
        init(&settings);
    }
}
