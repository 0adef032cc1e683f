//! Configuration file support for sitetree
//!
//! Reads from .sitetree/config.toml

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::date::DEFAULT_DATE_FORMAT;

/// Configuration structure
#[derive(Debug, Deserialize, Serialize, Default, Clone, PartialEq)]
pub struct Config {
    /// Where the tree document lives
    #[serde(default)]
    pub source: SourceConfig,

    /// Container lookup and retry settings
    #[serde(default)]
    pub mount: MountConfig,

    /// Labels and date format used by the renderer
    #[serde(default)]
    pub display: DisplayConfig,
}

/// Location of the tree document
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct SourceConfig {
    /// Site-relative path, absolute URL, or file path.
    /// Default: "/directory-tree.json"
    #[serde(default = "default_source_path")]
    pub path: String,

    /// Base URL that site-relative paths are resolved against.
    /// Without one, the path is read from disk.
    #[serde(default)]
    pub base_url: Option<String>,
}

/// Container lookup settings
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct MountConfig {
    /// `id` of the element the tree renders into
    #[serde(default = "default_container_id")]
    pub container_id: String,

    /// How many times to look for the container before giving up
    #[serde(default = "default_retry_attempts")]
    pub retry_attempts: u32,

    /// Delay between container lookups, in milliseconds
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
}

/// Text shown by the renderer and loader
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct DisplayConfig {
    /// strftime pattern for file dates
    #[serde(default = "default_date_format")]
    pub date_format: String,

    #[serde(default = "default_loading_text")]
    pub loading_text: String,

    /// Marker shown under a directory with nothing in it
    #[serde(default = "default_empty_text")]
    pub empty_text: String,

    #[serde(default = "default_error_heading")]
    pub error_heading: String,

    #[serde(default = "default_error_hint")]
    pub error_hint: String,
}

fn default_source_path() -> String {
    "/directory-tree.json".to_string()
}

fn default_container_id() -> String {
    "directory-tree-container".to_string()
}

fn default_retry_attempts() -> u32 {
    50
}

fn default_retry_delay_ms() -> u64 {
    100
}

fn default_date_format() -> String {
    DEFAULT_DATE_FORMAT.to_string()
}

fn default_loading_text() -> String {
    "Loading directory tree...".to_string()
}

fn default_empty_text() -> String {
    "(empty directory)".to_string()
}

fn default_error_heading() -> String {
    "❌ Failed to load directory tree data".to_string()
}

fn default_error_hint() -> String {
    "Run with -v or check the server log for details".to_string()
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            path: default_source_path(),
            base_url: None,
        }
    }
}

impl Default for MountConfig {
    fn default() -> Self {
        Self {
            container_id: default_container_id(),
            retry_attempts: default_retry_attempts(),
            retry_delay_ms: default_retry_delay_ms(),
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            date_format: default_date_format(),
            loading_text: default_loading_text(),
            empty_text: default_empty_text(),
            error_heading: default_error_heading(),
            error_hint: default_error_hint(),
        }
    }
}

impl MountConfig {
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

impl Config {
    /// Load config from .sitetree/config.toml
    /// Returns default config if file doesn't exist or doesn't parse
    pub fn load() -> Self {
        if let Some(path) = Self::find_config_path() {
            match Self::load_from(&path) {
                Ok(config) => return config,
                Err(e) => log::warn!("ignoring {}: {}", path.display(), e),
            }
        }
        Self::default()
    }

    /// Load config from an explicit file
    pub fn load_from(path: &Path) -> crate::error::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }

    /// Find config.toml by walking up directory tree
    fn find_config_path() -> Option<PathBuf> {
        let current_dir = std::env::current_dir().ok()?;
        let mut dir = current_dir.as_path();

        loop {
            let config_path = dir.join(".sitetree").join("config.toml");
            if config_path.exists() {
                return Some(config_path);
            }

            match dir.parent() {
                Some(parent) => dir = parent,
                None => break,
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.source.path, "/directory-tree.json");
        assert!(config.source.base_url.is_none());
        assert_eq!(config.mount.container_id, "directory-tree-container");
        assert_eq!(config.mount.retry_attempts, 50);
        assert_eq!(config.mount.retry_delay(), Duration::from_millis(100));
        assert_eq!(config.display.date_format, "%Y/%m/%d");
    }

    #[test]
    fn test_parse_partial_config() {
        let toml = r#"
[source]
base_url = "https://blog.example.com"

[display]
empty_text = "（空目录）"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(
            config.source.base_url.as_deref(),
            Some("https://blog.example.com")
        );
        assert_eq!(config.source.path, "/directory-tree.json");
        assert_eq!(config.display.empty_text, "（空目录）");
        assert_eq!(config.display.loading_text, "Loading directory tree...");
        assert_eq!(config.mount, MountConfig::default());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[mount]\nretry_attempts = 3\nretry_delay_ms = 5\n").unwrap();
        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.mount.retry_attempts, 3);
        assert_eq!(config.mount.retry_delay(), Duration::from_millis(5));
    }

    #[test]
    fn test_load_from_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[mount\n").unwrap();
        assert!(Config::load_from(&path).is_err());
    }
}
