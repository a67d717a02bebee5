//! Process-start configuration, read once from the environment.
//!
//! Mirrors the teacher's convention of reading individual env vars at the
//! point of use (`VESTIGE_ENCRYPTION_KEY`, `FASTEMBED_CACHE_PATH`) but
//! collects them into one struct so the rest of the crate never touches
//! `std::env` directly.

use directories::ProjectDirs;
use std::path::PathBuf;

/// Minimum log level below which debug records are not even formatted (§4.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "debug" => Some(LogLevel::Debug),
            "info" => Some(LogLevel::Info),
            "warn" | "warning" => Some(LogLevel::Warn),
            "error" => Some(LogLevel::Error),
            _ => None,
        }
    }
}

/// Process-wide configuration resolved from the environment at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub log_level: LogLevel,
    pub slow_threshold_ms: u64,
    pub llm_api_key: Option<String>,
    pub db_path: PathBuf,
}

impl Config {
    /// Read configuration from the environment, falling back to defaults
    /// documented in spec §4.2 and §6.4.
    pub fn from_env() -> Self {
        let log_level = std::env::var("NOESIS_LOG_LEVEL")
            .ok()
            .and_then(|v| LogLevel::parse(&v))
            .unwrap_or(LogLevel::Info);

        let slow_threshold_ms = std::env::var("NOESIS_SLOW_THRESHOLD_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(5000);

        let llm_api_key = std::env::var("NOESIS_LLM_API_KEY").ok();

        let db_path = std::env::var("NOESIS_DB_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| Self::default_db_path());

        Self {
            log_level,
            slow_threshold_ms,
            llm_api_key,
            db_path,
        }
    }

    fn default_db_path() -> PathBuf {
        match ProjectDirs::from("dev", "noesis", "noesis") {
            Some(dirs) => dirs.data_dir().join("noesis.db"),
            None => PathBuf::from("noesis.db"),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: LogLevel::Info,
            slow_threshold_ms: 5000,
            llm_api_key: None,
            db_path: Self::default_db_path(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_level_parses_case_insensitively() {
        assert_eq!(LogLevel::parse("DEBUG"), Some(LogLevel::Debug));
        assert_eq!(LogLevel::parse("Warning"), Some(LogLevel::Warn));
        assert_eq!(LogLevel::parse("nonsense"), None);
    }

    #[test]
    fn default_slow_threshold_matches_spec() {
        assert_eq!(Config::default().slow_threshold_ms, 5000);
    }
}
