use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub report: ReportConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: Option<String>,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReportConfig {
    #[serde(default = "default_disclaimer")]
    pub disclaimer: bool,
}

fn default_max_connections() -> u32 {
    5
}

fn default_disclaimer() -> bool {
    true
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: default_max_connections(),
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            disclaimer: default_disclaimer(),
        }
    }
}

impl Config {
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).context("failed to parse config")
    }

    /// Reads the config file when present, then applies `DATABASE_URL`.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) if path.exists() => Self::from_file(path)?,
            Some(path) => {
                tracing::warn!(path = %path.display(), "config file not found, using defaults");
                Self::default()
            }
            None => Self::default(),
        };
        Ok(config.with_database_url(std::env::var("DATABASE_URL").ok()))
    }

    pub fn with_database_url(mut self, url: Option<String>) -> Self {
        if let Some(url) = url.filter(|value| !value.trim().is_empty()) {
            self.database.url = Some(url);
        }
        self
    }

    pub fn database_url(&self) -> Result<&str> {
        self.database
            .url
            .as_deref()
            .context("DATABASE_URL (or database.url in the config file) must be set to a Postgres instance")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_to_empty_file() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config.database.max_connections, 5);
        assert!(config.database.url.is_none());
        assert!(config.report.disclaimer);
    }

    #[test]
    fn file_values_are_read() {
        let config = Config::from_toml(
            r#"
            [database]
            url = "postgres://insight@localhost/tasks"
            max_connections = 2

            [report]
            disclaimer = false
            "#,
        )
        .unwrap();
        assert_eq!(config.database_url().unwrap(), "postgres://insight@localhost/tasks");
        assert_eq!(config.database.max_connections, 2);
        assert!(!config.report.disclaimer);
    }

    #[test]
    fn environment_url_overrides_file() {
        let config = Config::from_toml("[database]\nurl = \"postgres://file\"\n")
            .unwrap()
            .with_database_url(Some("postgres://env".to_string()));
        assert_eq!(config.database_url().unwrap(), "postgres://env");

        let unchanged = Config::default().with_database_url(Some("  ".to_string()));
        assert!(unchanged.database_url().is_err());
    }
}
