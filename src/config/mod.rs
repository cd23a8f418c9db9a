// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Configuration management for bucketsort

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main application configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    /// Directories scanned for images at startup
    #[serde(default)]
    pub input_paths: Vec<String>,

    /// Root under which one directory per bucket is created
    #[serde(default)]
    pub output_path: String,

    /// Bucket names, grouped by side
    #[serde(default)]
    pub buckets: BucketConfig,

    /// Create every bucket directory before serving
    #[serde(default = "default_true")]
    pub prepare_bucket_dirs: bool,

    /// Web UI settings
    #[serde(default)]
    pub web: WebConfig,

    /// Log sink settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct BucketConfig {
    #[serde(default)]
    pub left: Vec<String>,
    #[serde(default)]
    pub right: Vec<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct WebConfig {
    #[serde(default = "default_web_host")]
    pub host: String,
    #[serde(default = "default_web_port")]
    pub port: u16,
    #[serde(default = "default_static_dir")]
    pub static_dir: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_file")]
    pub file: String,
}

// Default value functions
fn default_true() -> bool { true }
fn default_web_host() -> String { "0.0.0.0".to_string() }
fn default_web_port() -> u16 { 8080 }
fn default_static_dir() -> String { "public".to_string() }
fn default_log_file() -> String { "server.log".to_string() }

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            input_paths: Vec::new(),
            output_path: String::new(),
            buckets: BucketConfig::default(),
            prepare_bucket_dirs: true,
            web: WebConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            host: default_web_host(),
            port: default_web_port(),
            static_dir: default_static_dir(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            file: default_log_file(),
        }
    }
}

/// Values given on the command line that replace the file configuration
#[derive(Debug, Default, Clone)]
pub struct ConfigOverrides {
    pub input: Vec<PathBuf>,
    pub output: Option<PathBuf>,
    pub left: Vec<String>,
    pub right: Vec<String>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub log_file: Option<PathBuf>,
    pub static_dir: Option<PathBuf>,
}

impl AppConfig {
    /// Read configuration from a JSON file; `None` when the file is absent.
    ///
    /// Runs before the log subscriber exists, so it reports rather than logs.
    pub fn read(path: &Path) -> crate::Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)
            .map_err(|e| crate::SortError::Config(format!("Failed to parse config: {}", e)))?;
        Ok(Some(config))
    }

    /// Load configuration from a JSON file, falling back to defaults
    pub fn load(path: &Path) -> crate::Result<Self> {
        Ok(Self::read(path)?.unwrap_or_default())
    }

    /// Save configuration to a JSON file
    pub fn save(&self, path: &Path) -> crate::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Apply command line overrides. Repeatable flags replace the whole list.
    pub fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if !overrides.input.is_empty() {
            self.input_paths = overrides
                .input
                .iter()
                .map(|p| p.to_string_lossy().into_owned())
                .collect();
        }
        if let Some(output) = overrides.output {
            self.output_path = output.to_string_lossy().into_owned();
        }
        if !overrides.left.is_empty() {
            self.buckets.left = overrides.left;
        }
        if !overrides.right.is_empty() {
            self.buckets.right = overrides.right;
        }
        if let Some(host) = overrides.host {
            self.web.host = host;
        }
        if let Some(port) = overrides.port {
            self.web.port = port;
        }
        if let Some(file) = overrides.log_file {
            self.logging.file = file.to_string_lossy().into_owned();
        }
        if let Some(dir) = overrides.static_dir {
            self.web.static_dir = dir.to_string_lossy().into_owned();
        }
    }

    /// Check the settings the server cannot start without
    pub fn validate(&self) -> crate::Result<()> {
        if self.input_paths.is_empty() {
            return Err(crate::SortError::Config(
                "at least one input directory is required".to_string(),
            ));
        }
        if self.output_path.trim().is_empty() {
            return Err(crate::SortError::Config(
                "an output directory is required".to_string(),
            ));
        }
        let total = self.buckets.left.len() + self.buckets.right.len();
        if total < 2 {
            return Err(crate::SortError::Config(format!(
                "at least two buckets are required, got {}",
                total
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample() -> AppConfig {
        AppConfig {
            input_paths: vec!["./in".to_string()],
            output_path: "./out".to_string(),
            buckets: BucketConfig {
                left: vec!["keep".to_string()],
                right: vec!["toss".to_string()],
            },
            ..AppConfig::default()
        }
    }

    #[test]
    fn test_defaults_match_original_server() {
        let config = AppConfig::default();
        assert_eq!(config.web.host, "0.0.0.0");
        assert_eq!(config.web.port, 8080);
        assert_eq!(config.logging.file, "server.log");
        assert!(config.prepare_bucket_dirs);
    }

    #[test]
    fn test_validate_requires_two_buckets() {
        let mut config = sample();
        assert!(config.validate().is_ok());

        config.buckets.right.clear();
        assert!(matches!(config.validate(), Err(crate::SortError::Config(_))));

        config.buckets.left.push("maybe".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_requires_paths() {
        let mut config = sample();
        config.input_paths.clear();
        assert!(config.validate().is_err());

        let mut config = sample();
        config.output_path = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_overrides_replace_lists() {
        let mut config = sample();
        config.apply_overrides(ConfigOverrides {
            input: vec![PathBuf::from("/a"), PathBuf::from("/b")],
            left: vec!["x".to_string(), "y".to_string()],
            port: Some(9000),
            ..ConfigOverrides::default()
        });

        assert_eq!(config.input_paths, vec!["/a", "/b"]);
        assert_eq!(config.buckets.left, vec!["x", "y"]);
        assert_eq!(config.buckets.right, vec!["toss"]);
        assert_eq!(config.output_path, "./out");
        assert_eq!(config.web.port, 9000);
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");

        sample().save(&path).unwrap();
        let loaded = AppConfig::load(&path).unwrap();
        assert_eq!(loaded.buckets.left, vec!["keep"]);
        assert_eq!(loaded.web.static_dir, "public");
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let absent = dir.path().join("absent.json");
        assert!(AppConfig::read(&absent).unwrap().is_none());
        let loaded = AppConfig::load(&absent).unwrap();
        assert!(loaded.input_paths.is_empty());

        sample().save(&absent).unwrap();
        assert!(AppConfig::read(&absent).unwrap().is_some());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"output_path": "/srv/out", "web": {"port": 9999}}"#).unwrap();

        let loaded = AppConfig::load(&path).unwrap();
        assert_eq!(loaded.output_path, "/srv/out");
        assert_eq!(loaded.web.port, 9999);
        assert_eq!(loaded.web.host, "0.0.0.0");
    }
}
