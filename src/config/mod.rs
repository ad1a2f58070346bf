//! Configuration module for the LearnHub backend.
//!
//! All configuration is loaded from environment variables with sensible defaults.

mod assets;

pub use assets::AssetUrlResolver;

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

/// A configuration value that could not be parsed.
#[derive(Debug, thiserror::Error)]
#[error("invalid value for {var}: {reason}")]
pub struct ConfigError {
    pub var: &'static str,
    pub reason: String,
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to SQLite database file
    pub db_path: PathBuf,
    /// Address to bind the server to
    pub bind_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Emit logs as JSON lines instead of human-readable text
    pub log_json: bool,
    /// Base URL that relative avatar and image paths resolve against
    pub asset_base_url: url::Url,
    /// Where forms navigate after a successful save and pages link back to
    pub course_list_path: String,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let db_path = env::var("LEARNHUB_DB_PATH")
            .unwrap_or_else(|_| "./data/learnhub.sqlite".to_string())
            .into();

        let bind_addr = env::var("LEARNHUB_BIND_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:8080".to_string())
            .parse()
            .map_err(|e: std::net::AddrParseError| ConfigError {
                var: "LEARNHUB_BIND_ADDR",
                reason: e.to_string(),
            })?;

        let log_level = env::var("LEARNHUB_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let log_json = match env::var("LEARNHUB_LOG_JSON") {
            Ok(raw) => parse_bool(&raw).ok_or_else(|| ConfigError {
                var: "LEARNHUB_LOG_JSON",
                reason: format!("expected a boolean, got {:?}", raw),
            })?,
            Err(_) => false,
        };

        let asset_base_url = env::var("LEARNHUB_ASSET_BASE_URL")
            .unwrap_or_else(|_| "http://127.0.0.1:8080/assets".to_string());
        let asset_base_url = url::Url::parse(&asset_base_url).map_err(|e| ConfigError {
            var: "LEARNHUB_ASSET_BASE_URL",
            reason: e.to_string(),
        })?;

        let course_list_path =
            env::var("LEARNHUB_COURSE_LIST_PATH").unwrap_or_else(|_| "/courses-list".to_string());

        Ok(Self {
            db_path,
            bind_addr,
            log_level,
            log_json,
            asset_base_url,
            course_list_path,
        })
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        // Clear any existing env vars
        env::remove_var("LEARNHUB_DB_PATH");
        env::remove_var("LEARNHUB_BIND_ADDR");
        env::remove_var("LEARNHUB_LOG_LEVEL");
        env::remove_var("LEARNHUB_LOG_JSON");
        env::remove_var("LEARNHUB_ASSET_BASE_URL");
        env::remove_var("LEARNHUB_COURSE_LIST_PATH");

        let config = Config::from_env().unwrap();

        assert_eq!(config.db_path, PathBuf::from("./data/learnhub.sqlite"));
        assert_eq!(config.bind_addr.to_string(), "127.0.0.1:8080");
        assert_eq!(config.log_level, "info");
        assert!(!config.log_json);
        assert_eq!(config.asset_base_url.as_str(), "http://127.0.0.1:8080/assets");
        assert_eq!(config.course_list_path, "/courses-list");
    }

    #[test]
    fn test_parse_bool() {
        assert_eq!(parse_bool("TRUE"), Some(true));
        assert_eq!(parse_bool(" off "), Some(false));
        assert_eq!(parse_bool("maybe"), None);
    }
}
