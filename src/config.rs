//! Environment configuration
//!
//! Missing non-critical keys degrade functionality (search skipped,
//! storage skipped) instead of preventing startup.

use std::env;
use tracing::warn;

const DEFAULT_GEMINI_BASE_URL: &str =
    "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.0-flash:generateContent";
const DEFAULT_LINKUP_BASE_URL: &str = "https://api.linkup.com/v1";
const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, Clone)]
pub struct Config {
    pub gemini_api_key: Option<String>,
    pub gemini_base_url: String,
    pub linkup_api_key: Option<String>,
    pub linkup_base_url: String,
    pub docstore_api_key: Option<String>,
    pub docstore_base_url: Option<String>,
    pub database_url: Option<String>,
    pub port: u16,
}

fn non_empty(var: &str) -> Option<String> {
    env::var(var).ok().filter(|v| !v.trim().is_empty())
}

impl Config {
    pub fn from_env() -> Self {
        let port = env::var("PORT")
            .or_else(|_| env::var("API_PORT"))
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_PORT);

        let config = Self {
            gemini_api_key: non_empty("GEMINI_API_KEY"),
            gemini_base_url: non_empty("GEMINI_BASE_URL")
                .unwrap_or_else(|| DEFAULT_GEMINI_BASE_URL.to_string()),
            linkup_api_key: non_empty("LINKUP_API_KEY"),
            linkup_base_url: non_empty("LINKUP_BASE_URL")
                .unwrap_or_else(|| DEFAULT_LINKUP_BASE_URL.to_string()),
            docstore_api_key: non_empty("DOCSTORE_API_KEY"),
            docstore_base_url: non_empty("DOCSTORE_BASE_URL"),
            database_url: non_empty("DATABASE_URL")
                .or_else(|| non_empty("POSTGRES_URL")),
            port,
        };

        if config.gemini_api_key.is_none() {
            warn!("GEMINI_API_KEY not set; agents will record error sentinels");
        }
        if config.linkup_api_key.is_none() {
            warn!("LINKUP_API_KEY not set; web search disabled");
        }
        if config.docstore_base_url.is_none() && config.database_url.is_none() {
            warn!("No storage backend configured; client records will not be persisted");
        }

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_values_are_treated_as_unset() {
        env::set_var("DOCSTORE_API_KEY", "   ");
        assert_eq!(non_empty("DOCSTORE_API_KEY"), None);

        env::set_var("DOCSTORE_API_KEY", "key-123");
        assert_eq!(non_empty("DOCSTORE_API_KEY"), Some("key-123".to_string()));
        env::remove_var("DOCSTORE_API_KEY");
    }
}
