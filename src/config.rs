// Copyright (c) 2025 Nikolay Denev <ndenev@gmail.com>
// SPDX-License-Identifier: BSD-3-Clause

//! Configuration persistence for k8s-inspect
//!
//! All k8s-inspect data is stored under ~/.k8s-inspect/:
//! - ~/.k8s-inspect/config.json - user configuration
//! - ~/.k8s-inspect/log/ - rotated log files

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::handlers::{DEFAULT_CALL_TIMEOUT, ToolSettings};
use crate::kubernetes::ClientOptions;
use crate::kubernetes::events::EventDefaults;

/// Get the base k8s-inspect directory (~/.k8s-inspect/)
pub fn base_dir() -> Result<PathBuf> {
    dirs::home_dir()
        .map(|p| p.join(".k8s-inspect"))
        .context("Could not determine home directory")
}

/// k8s-inspect configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Kubeconfig context; kubeconfig's current context when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,

    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    #[serde(default = "default_read_timeout_secs")]
    pub read_timeout_secs: u64,

    /// Deadline for one tool call, backend round trips included
    #[serde(default = "default_call_timeout_secs")]
    pub call_timeout_secs: u64,

    /// Items per list page
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    #[serde(default)]
    pub events: EventDefaults,
}

fn default_connect_timeout_secs() -> u64 {
    ClientOptions::default().connect_timeout.as_secs()
}

fn default_read_timeout_secs() -> u64 {
    ClientOptions::default().read_timeout.as_secs()
}

fn default_call_timeout_secs() -> u64 {
    DEFAULT_CALL_TIMEOUT.as_secs()
}

fn default_page_size() -> u32 {
    ClientOptions::default().page_size
}

impl Default for Config {
    fn default() -> Self {
        Self {
            context: None,
            connect_timeout_secs: default_connect_timeout_secs(),
            read_timeout_secs: default_read_timeout_secs(),
            call_timeout_secs: default_call_timeout_secs(),
            page_size: default_page_size(),
            events: EventDefaults::default(),
        }
    }
}

impl Config {
    /// Load config from disk, or return default if not found
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            let config: Config = serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    /// Save config to disk
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let content = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Get the config file path (~/.k8s-inspect/config.json)
    pub fn config_path() -> Result<PathBuf> {
        Ok(base_dir()?.join("config.json"))
    }

    /// Update the default context and save
    pub fn set_context(&mut self, context: Option<String>) -> Result<()> {
        self.context = context;
        self.save()
    }

    pub fn client_options(&self) -> ClientOptions {
        ClientOptions {
            context: self.context.clone(),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            read_timeout: Duration::from_secs(self.read_timeout_secs),
            page_size: self.page_size,
        }
    }

    pub fn tool_settings(&self) -> ToolSettings {
        ToolSettings {
            call_timeout: Duration::from_secs(self.call_timeout_secs.max(1)),
            events: self.events,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kubernetes::events::EventSortField;
    use tempfile::TempDir;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert!(config.context.is_none());
        assert_eq!(config.connect_timeout_secs, 10);
        assert_eq!(config.read_timeout_secs, 30);
        assert_eq!(config.call_timeout_secs, 60);
        assert_eq!(config.page_size, 500);
        assert_eq!(config.events.max_events, 20);
        assert_eq!(config.events.sort_by, EventSortField::LastTime);
    }

    #[test]
    fn test_config_deserialize_empty() {
        let config: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_config_deserialize_partial() {
        let json = r#"{"context": "prod", "events": {"max_events": 50}}"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.context.as_deref(), Some("prod"));
        assert_eq!(config.events.max_events, 50);
        assert_eq!(config.events.sort_by, EventSortField::LastTime);
        assert_eq!(config.read_timeout_secs, 30);
    }

    #[test]
    fn test_config_serialize() {
        let config = Config {
            context: Some("staging".to_string()),
            ..Default::default()
        };
        let json = serde_json::to_string_pretty(&config).unwrap();
        assert!(json.contains("staging"));
        assert!(json.contains("call_timeout_secs"));
        assert!(json.contains("lastTime"));
    }

    #[test]
    fn test_config_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("nested").join("config.json");

        let config = Config {
            context: Some("test-cluster".to_string()),
            page_size: 100,
            ..Default::default()
        };
        config.save_to(&config_path).unwrap();

        let loaded = Config::load_from(&config_path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_config_load_missing_is_default() {
        let temp_dir = TempDir::new().unwrap();
        let loaded = Config::load_from(&temp_dir.path().join("absent.json")).unwrap();
        assert_eq!(loaded, Config::default());
    }

    #[test]
    fn test_config_load_invalid_names_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.json");
        fs::write(&path, "not json").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn test_conversions() {
        let config = Config {
            context: Some("dev".to_string()),
            connect_timeout_secs: 3,
            call_timeout_secs: 0,
            ..Default::default()
        };

        let options = config.client_options();
        assert_eq!(options.context.as_deref(), Some("dev"));
        assert_eq!(options.connect_timeout, Duration::from_secs(3));

        let settings = config.tool_settings();
        assert_eq!(settings.call_timeout, Duration::from_secs(1));
        assert_eq!(settings.events, EventDefaults::default());
    }
}
