use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "trace" => Some(LogLevel::Trace),
            "debug" => Some(LogLevel::Debug),
            "info" => Some(LogLevel::Info),
            "warn" | "warning" => Some(LogLevel::Warn),
            "error" => Some(LogLevel::Error),
            _ => None,
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Trace => write!(f, "trace"),
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Warn => write!(f, "warn"),
            LogLevel::Error => write!(f, "error"),
        }
    }
}

/// Where and how log lines are written.
#[derive(Debug, Clone)]
pub struct LogConfig {
    pub level: LogLevel,
    /// JSON lines instead of the human-readable format.
    pub json: bool,
    pub directory: PathBuf,
}

impl LogConfig {
    /// Production logs JSON at `info`; everything else pretty-prints at `debug`.
    /// `LOG_LEVEL` overrides the level either way.
    pub fn for_environment(is_production: bool) -> Self {
        let default_level = if is_production {
            LogLevel::Info
        } else {
            LogLevel::Debug
        };
        let level = std::env::var("LOG_LEVEL")
            .ok()
            .and_then(|raw| LogLevel::parse(&raw))
            .unwrap_or(default_level);

        Self {
            level,
            json: is_production,
            directory: PathBuf::from("logs"),
        }
    }

    /// Default directive set when `RUST_LOG` is not given.
    pub fn filter_directives(&self) -> String {
        format!(
            "ncc_backend={level},tower_http={level},axum=info,sqlx=warn",
            level = self.level
        )
    }
}
