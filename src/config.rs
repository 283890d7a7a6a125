use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::utils::USER_AGENT;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Csv,
    Tsv,
    Json,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Tsv => "tsv",
            OutputFormat::Json => "json",
        }
    }
}

/// Everything that shapes a run. Loaded from TOML, then overridden by flags.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScraperConfig {
    pub max_pages: usize,
    pub max_attempts: u32,
    pub retry_delay_ms: u64,
    pub page_delay_ms: u64,
    pub timeout_secs: u64,
    pub user_agent: String,
    pub container_tags: Vec<String>,
    pub content_tags: Vec<String>,
    /// Non-interactive field choice: tag names or `all`.
    pub fields: Option<Vec<String>>,
    pub format: OutputFormat,
    pub output: Option<String>,
    pub log_file: String,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            max_pages: 3,
            max_attempts: 3,
            retry_delay_ms: 2000,
            page_delay_ms: 1000,
            timeout_secs: 10,
            user_agent: USER_AGENT.to_string(),
            container_tags: ["article", "div", "section", "li"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            content_tags: ["h1", "h2", "h3", "p", "time"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            fields: None,
            format: OutputFormat::Csv,
            output: None,
            log_file: "scraper.log".to_string(),
        }
    }
}

impl ScraperConfig {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).context("Failed to parse scraper config")
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_toml_str(&text)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_scraper_config_default() {
        let config = ScraperConfig::default();
        assert_eq!(config.max_pages, 3);
        assert_eq!(config.max_attempts, 3);
        assert_eq!(config.retry_delay_ms, 2000);
        assert_eq!(config.timeout(), Duration::from_secs(10));
        assert_eq!(config.container_tags, vec!["article", "div", "section", "li"]);
        assert_eq!(config.content_tags, vec!["h1", "h2", "h3", "p", "time"]);
        assert_eq!(config.format, OutputFormat::Csv);
        assert!(config.fields.is_none());
    }

    #[test]
    fn test_scraper_config_from_toml() {
        let text = r#"
            max_pages = 5
            page_delay_ms = 0
            fields = ["h2", "time"]
            format = "tsv"
        "#;

        let config = ScraperConfig::from_toml_str(text).unwrap();
        assert_eq!(config.max_pages, 5);
        assert_eq!(config.page_delay_ms, 0);
        assert_eq!(config.fields, Some(vec!["h2".to_string(), "time".to_string()]));
        assert_eq!(config.format, OutputFormat::Tsv);
        // untouched keys keep their defaults
        assert_eq!(config.max_attempts, 3);
        assert_eq!(config.log_file, "scraper.log");
    }

    #[test]
    fn test_scraper_config_load_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "container_tags = [\"li\"]").unwrap();

        let config = ScraperConfig::load(file.path()).unwrap();
        assert_eq!(config.container_tags, vec!["li"]);
    }

    #[test]
    fn test_scraper_config_rejects_bad_toml() {
        assert!(ScraperConfig::from_toml_str("max_pages = \"many\"").is_err());
    }

    #[test]
    fn test_output_format_extension() {
        assert_eq!(OutputFormat::Csv.extension(), "csv");
        assert_eq!(OutputFormat::Tsv.extension(), "tsv");
        assert_eq!(OutputFormat::Json.extension(), "json");
    }
}
