//! Process configuration, read once from the environment at startup.

use std::net::SocketAddr;
use std::time::Duration;

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 3001;
const DEFAULT_PREVIEW_TIMEOUT_SECS: u64 = 10;
const DEFAULT_PREVIEW_USER_AGENT: &str = "googlebot";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid PORT value {0:?}")]
    InvalidPort(String),

    #[error("invalid bind address {0:?}: {1}")]
    InvalidAddress(String, std::net::AddrParseError),

    #[error("invalid PREVIEW_TIMEOUT_SECS value {0:?}")]
    InvalidPreviewTimeout(String),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: SocketAddr,
    pub environment: String,
    /// `None` means no database is configured; the in-memory store is used.
    pub database_url: Option<String>,
    /// The only username a session token is accepted for.
    pub admin_username: Option<String>,
    pub admin_password: Option<String>,
    pub preview_timeout: Duration,
    pub preview_user_agent: String,
    pub allowed_origins: Vec<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let host = non_empty_var("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = match non_empty_var("PORT") {
            Some(raw) => raw
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidPort(raw.clone()))?,
            None => DEFAULT_PORT,
        };
        let addr = format!("{}:{}", host, port);
        let bind_addr = addr
            .parse()
            .map_err(|e| ConfigError::InvalidAddress(addr.clone(), e))?;

        let preview_timeout = match non_empty_var("PREVIEW_TIMEOUT_SECS") {
            Some(raw) => match raw.parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => return Err(ConfigError::InvalidPreviewTimeout(raw)),
            },
            None => Duration::from_secs(DEFAULT_PREVIEW_TIMEOUT_SECS),
        };

        Ok(Self {
            bind_addr,
            environment: non_empty_var("ENVIRONMENT").unwrap_or_else(|| "development".to_string()),
            database_url: non_empty_var("DATABASE_URL")
                .map(|url| strip_quotes(&url).to_string())
                .filter(|url| !url.is_empty()),
            admin_username: non_empty_var("ADMIN_USERNAME"),
            admin_password: non_empty_var("ADMIN_PASSWORD"),
            preview_timeout,
            preview_user_agent: non_empty_var("PREVIEW_USER_AGENT")
                .unwrap_or_else(|| DEFAULT_PREVIEW_USER_AGENT.to_string()),
            allowed_origins: allowed_origins(),
        })
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

impl Default for Config {
    /// Development defaults; used by tests and as a base for overrides.
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], DEFAULT_PORT)),
            environment: "development".to_string(),
            database_url: None,
            admin_username: None,
            admin_password: None,
            preview_timeout: Duration::from_secs(DEFAULT_PREVIEW_TIMEOUT_SECS),
            preview_user_agent: DEFAULT_PREVIEW_USER_AGENT.to_string(),
            allowed_origins: Vec::new(),
        }
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Hosting dashboards often paste connection strings with their quotes.
fn strip_quotes(value: &str) -> &str {
    value.trim_matches(|c| c == '"' || c == '\'')
}

/// `ALLOWED_ORIGINS` (comma-separated) wins over `FRONTEND_ORIGIN`.
fn allowed_origins() -> Vec<String> {
    let from_list: Vec<String> = non_empty_var("ALLOWED_ORIGINS")
        .map(|s| {
            s.split(',')
                .map(|origin| origin.trim().to_string())
                .filter(|origin| !origin.is_empty())
                .collect()
        })
        .unwrap_or_default();

    if !from_list.is_empty() {
        return from_list;
    }
    non_empty_var("FRONTEND_ORIGIN").into_iter().collect()
}
