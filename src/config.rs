use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::api::DEFAULT_BASE_URL;

/// Environment variable that overrides `api_key` from the config file
pub const API_KEY_ENV: &str = "POWERDRILL_API_KEY";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub base_url: String,
    pub api_key: Option<String>,
    pub user_id: Option<String>,
    pub dataset_id: Option<String>,
    pub datasource_id: Option<String>,
    pub with_citation: bool,
    /// Absent means wait for upstream indefinitely
    pub timeout_ms: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            user_id: None,
            dataset_id: None,
            datasource_id: None,
            with_citation: false,
            timeout_ms: None,
        }
    }
}

impl Config {
    /// Load configuration with fallback chain
    ///
    /// Search order:
    /// 1. Explicit path if provided
    /// 2. .powerdrill.yml in current directory
    /// 3. ~/.config/powerdrill/powerdrill.yml
    /// 4. Defaults
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        let config = Self::load_file(config_path)?;
        Ok(config.with_env_overrides(std::env::var(API_KEY_ENV).ok()))
    }

    fn load_file(config_path: Option<&PathBuf>) -> Result<Self> {
        // Explicit path takes precedence
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        let project_name = env!("CARGO_PKG_NAME");

        // Try project config
        let project_config = PathBuf::from(format!(".{}.yml", project_name));
        if project_config.exists() {
            match Self::load_from_file(&project_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    log::warn!("Failed to load config from {}: {}", project_config.display(), e);
                }
            }
        }

        // Try user config
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join(project_name).join(format!("{}.yml", project_name));
            if user_config.exists() {
                match Self::load_from_file(&user_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        log::warn!("Failed to load config from {}: {}", user_config.display(), e);
                    }
                }
            }
        }

        log::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        log::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }

    /// Apply an API key taken from the environment, if non-empty
    pub fn with_env_overrides(mut self, api_key: Option<String>) -> Self {
        if let Some(key) = api_key.filter(|k| !k.is_empty()) {
            self.api_key = Some(key);
        }
        self
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert!(config.api_key.is_none());
        assert!(!config.with_citation);
        assert!(config.timeout().is_none());
    }

    #[test]
    fn test_load_explicit_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("powerdrill.yml");
        fs::write(
            &path,
            "base_url: http://localhost:9000/api/v2\nuser_id: alice\ndataset_id: ds-1\nwith_citation: true\ntimeout_ms: 1500\n",
        )
        .unwrap();

        let config = Config::load_file(Some(&path)).unwrap();

        assert_eq!(config.base_url, "http://localhost:9000/api/v2");
        assert_eq!(config.user_id.as_deref(), Some("alice"));
        assert_eq!(config.dataset_id.as_deref(), Some("ds-1"));
        assert!(config.with_citation);
        assert_eq!(config.timeout(), Some(Duration::from_millis(1500)));
        // Unset fields keep their defaults
        assert!(config.api_key.is_none());
        assert!(config.datasource_id.is_none());
    }

    #[test]
    fn test_load_missing_explicit_file_fails() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("absent.yml");
        assert!(Config::load_file(Some(&path)).is_err());
    }

    #[test]
    fn test_load_invalid_yaml_fails() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.yml");
        fs::write(&path, "with_citation: [not, a, bool]\n").unwrap();
        assert!(Config::load_file(Some(&path)).is_err());
    }

    #[test]
    fn test_env_api_key_overrides_file() {
        let config = Config {
            api_key: Some("from-file".to_string()),
            ..Config::default()
        };

        let overridden = config.clone().with_env_overrides(Some("from-env".to_string()));
        assert_eq!(overridden.api_key.as_deref(), Some("from-env"));

        let kept = config.clone().with_env_overrides(Some(String::new()));
        assert_eq!(kept.api_key.as_deref(), Some("from-file"));

        let kept = config.with_env_overrides(None);
        assert_eq!(kept.api_key.as_deref(), Some("from-file"));
    }
}
