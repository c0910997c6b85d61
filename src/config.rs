use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{ConfigError, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiSettings,
    #[serde(default)]
    pub defaults: RequestDefaults,
    #[serde(default)]
    pub cache: CacheSettings,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiSettings {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Ordered list of API keys; requests rotate through these when
    /// the upstream rejects or rate-limits a key.
    #[serde(default)]
    pub api_keys: Vec<String>,

    #[serde(default = "default_timeout")]
    pub timeout: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestDefaults {
    #[serde(default = "default_country")]
    pub country: String,

    #[serde(default = "default_lang")]
    pub lang: String,

    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheSettings {
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default)]
    pub json_format: bool,
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)
            .map_err(|_| ConfigError::NotFound(path.as_ref().display().to_string()))?;

        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load_with_env<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.api.api_keys.is_empty() {
            return Err(ConfigError::Config(
                "At least one API key must be configured".to_string(),
            ));
        }

        for key in &self.api.api_keys {
            if key.trim().is_empty() {
                return Err(ConfigError::Config("API key cannot be empty".to_string()));
            }
        }

        url::Url::parse(&self.api.base_url)
            .map_err(|_| ConfigError::InvalidUrl(self.api.base_url.clone()))?;

        if self.defaults.page_size == 0 {
            return Err(ConfigError::Config(
                "Page size must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(keys) = std::env::var("NEWSDESK_API_KEYS") {
            let keys: Vec<String> = keys
                .split(',')
                .map(|k| k.trim().to_string())
                .filter(|k| !k.is_empty())
                .collect();
            if !keys.is_empty() {
                self.api.api_keys = keys;
            }
        }

        if let Ok(level) = std::env::var("NEWSDESK_LOG_LEVEL") {
            self.logging.level = level;
        }

        if let Ok(country) = std::env::var("NEWSDESK_COUNTRY") {
            self.defaults.country = country;
        }

        if let Ok(ttl) = std::env::var("NEWSDESK_CACHE_TTL_SECS") {
            if let Ok(val) = ttl.parse() {
                self.cache.ttl_secs = val;
            }
        }
    }

    pub fn config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join("newsdesk"))
            .ok_or_else(|| ConfigError::Config("Could not determine config directory".to_string()))
    }

    pub fn data_dir() -> Result<PathBuf> {
        dirs::data_dir()
            .map(|dir| dir.join("newsdesk"))
            .ok_or_else(|| ConfigError::Config("Could not determine data directory".to_string()))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api: ApiSettings::default(),
            defaults: RequestDefaults::default(),
            cache: CacheSettings::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_keys: Vec::new(),
            timeout: default_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

impl Default for RequestDefaults {
    fn default() -> Self {
        Self {
            country: default_country(),
            lang: default_lang(),
            page_size: default_page_size(),
        }
    }
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            ttl_secs: default_ttl_secs(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json_format: false,
        }
    }
}

fn default_base_url() -> String { "https://gnews.io/api/v4".to_string() }
fn default_timeout() -> u64 { 30 }
fn default_user_agent() -> String {
    format!("newsdesk/{}", env!("CARGO_PKG_VERSION"))
}
fn default_country() -> String { "us".to_string() }
fn default_lang() -> String { "en".to_string() }
fn default_page_size() -> usize { 10 }
fn default_ttl_secs() -> u64 { 600 }
fn default_log_level() -> String { "info".to_string() }

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.api.base_url, "https://gnews.io/api/v4");
        assert_eq!(config.defaults.country, "us");
        assert_eq!(config.defaults.lang, "en");
        assert_eq!(config.cache.ttl_secs, 600);
    }

    #[test]
    fn test_validate_rejects_empty_keys() {
        let config = Config::default();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.api.api_keys = vec!["abc123".to_string()];
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_base_url() {
        let mut config = Config::default();
        config.api.api_keys = vec!["abc123".to_string()];
        config.api.base_url = "not-a-url".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_parse_toml() {
        let toml_str = r#"
            [api]
            api_keys = ["key-one", "key-two"]

            [defaults]
            country = "gb"
        "#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.api.api_keys.len(), 2);
        assert_eq!(config.defaults.country, "gb");
        assert_eq!(config.defaults.lang, "en");
        assert!(config.validate().is_ok());
    }
}
