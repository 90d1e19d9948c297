use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use url::Url;

use crate::error::{AppError, Result};

const APP_DIR: &str = "headline-notes";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_db_path")]
    pub db_path: String,

    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_source_url")]
    pub source_url: String,

    #[serde(default = "default_fetch_timeout")]
    pub fetch_timeout_secs: u64,

    #[serde(default = "default_scrape_concurrency")]
    pub scrape_concurrency: usize,

    /// Delete the note an article pointed at when a new one replaces it.
    #[serde(default)]
    pub discard_replaced_notes: bool,
}

fn default_db_path() -> String {
    let data_dir = dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR);
    std::fs::create_dir_all(&data_dir).ok();
    data_dir.join("headlines.db").to_string_lossy().to_string()
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_source_url() -> String {
    "https://www.npr.org/sections/music-videos/".to_string()
}

fn default_fetch_timeout() -> u64 {
    30
}

fn default_scrape_concurrency() -> usize {
    5
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            host: default_host(),
            port: default_port(),
            source_url: default_source_url(),
            fetch_timeout_secs: default_fetch_timeout(),
            scrape_concurrency: default_scrape_concurrency(),
            discard_replaced_notes: false,
        }
    }
}

impl Config {
    /// Loads the config file (writing defaults on first run), then applies
    /// environment overrides and validates the result.
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        let mut config = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            toml::from_str::<Config>(&content)?
        } else {
            let config = Config::default();
            config.save()?;
            config
        };

        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| AppError::Config(e.to_string()))?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR)
            .join("config.toml")
    }

    /// `PORT`, `DATABASE_URL` and `SOURCE_URL` take precedence over the file.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(port) = lookup("PORT") {
            self.port = port
                .trim()
                .parse()
                .map_err(|_| AppError::Config(format!("PORT is not a valid port: {port}")))?;
        }
        if let Some(db_path) = lookup("DATABASE_URL") {
            self.db_path = db_path;
        }
        if let Some(source_url) = lookup("SOURCE_URL") {
            self.source_url = source_url;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        let url = Url::parse(&self.source_url)
            .map_err(|e| AppError::Config(format!("source_url {}: {}", self.source_url, e)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(AppError::Config(format!(
                "source_url must be http or https, got {}",
                url.scheme()
            )));
        }
        if self.scrape_concurrency == 0 {
            return Err(AppError::Config(
                "scrape_concurrency must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let config: Config = toml::from_str("port = 8080\n").unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.source_url, "https://www.npr.org/sections/music-videos/");
        assert_eq!(config.scrape_concurrency, 5);
        assert!(!config.discard_replaced_notes);
    }

    #[test]
    fn environment_overrides_file_values() {
        let mut config = Config::default();
        let vars = env(&[
            ("PORT", "4100"),
            ("DATABASE_URL", "/tmp/other.db"),
            ("SOURCE_URL", "http://localhost:9000/news"),
        ]);
        config.apply_overrides(|k| vars.get(k).cloned()).unwrap();

        assert_eq!(config.port, 4100);
        assert_eq!(config.db_path, "/tmp/other.db");
        assert_eq!(config.source_url, "http://localhost:9000/news");
        assert_eq!(config.bind_addr(), "0.0.0.0:4100");
    }

    #[test]
    fn invalid_port_is_rejected() {
        let mut config = Config::default();
        let vars = env(&[("PORT", "not-a-port")]);
        let err = config.apply_overrides(|k| vars.get(k).cloned()).unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }

    #[test]
    fn validate_rejects_non_http_source() {
        let mut config = Config::default();
        config.source_url = "ftp://example.com/news".to_string();
        assert!(config.validate().is_err());

        config.source_url = "not a url".to_string();
        assert!(config.validate().is_err());

        config.source_url = "https://example.com/news".to_string();
        config.scrape_concurrency = 0;
        assert!(config.validate().is_err());
    }
}
