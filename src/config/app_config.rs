use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::adapters::storage::file_kv_store::DEFAULT_MAX_VALUE_BYTES;
use crate::core::errors::{Result, VerseError};
use crate::core::models::log_entry::LogLevel;

/// Base URL used when neither the config file nor the environment set one.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/api";

/// Upper bound accepted for `[api] timeout_secs`.
pub const MAX_TIMEOUT_SECS: u64 = 300;

/// Top-level configuration read from `<data_dir>/config.toml`.
///
/// The file is optional and every section has defaults, so a fresh data
/// directory works without any setup.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub api: ApiSection,
    pub logging: LoggingSection,
    pub storage: StorageSection,
}

impl AppConfig {
    /// Load `config.toml` from `data_dir`, falling back to defaults when the
    /// file does not exist.
    pub fn load(data_dir: &Path) -> Result<Self> {
        let config_path = data_dir.join("config.toml");
        if !config_path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(&config_path)?;
        let config: Self = toml::from_str(&content).map_err(|e| VerseError::InvalidConfig {
            detail: format!("Failed to parse {}: {e}", config_path.display()),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Check values that parse fine but cannot be used.
    pub fn validate(&self) -> Result<()> {
        validate_base_url(&self.api.base_url)?;

        if !(1..=MAX_TIMEOUT_SECS).contains(&self.api.timeout_secs) {
            return Err(VerseError::InvalidConfig {
                detail: format!(
                    "[api] timeout_secs must be between 1 and {MAX_TIMEOUT_SECS}, got {}",
                    self.api.timeout_secs
                ),
            });
        }

        if self.storage.max_value_bytes == 0 {
            return Err(VerseError::InvalidConfig {
                detail: "[storage] max_value_bytes must be greater than 0".into(),
            });
        }

        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.api.timeout_secs)
    }
}

/// Reject base URLs the HTTP client cannot use.
pub fn validate_base_url(url: &str) -> Result<()> {
    if url.starts_with("http://") || url.starts_with("https://") {
        Ok(())
    } else {
        Err(VerseError::InvalidConfig {
            detail: format!("Base URL '{url}' must start with http:// or https://"),
        })
    }
}

/// The `[api]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ApiSection {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for ApiSection {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 20,
        }
    }
}

/// The `[logging]` section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingSection {
    #[serde(deserialize_with = "deserialize_level")]
    pub level: LogLevel,
}

fn deserialize_level<'de, D>(deserializer: D) -> std::result::Result<LogLevel, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    raw.parse().map_err(serde::de::Error::custom)
}

/// The `[storage]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StorageSection {
    pub max_value_bytes: usize,
}

impl Default for StorageSection {
    fn default() -> Self {
        Self {
            max_value_bytes: DEFAULT_MAX_VALUE_BYTES,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_config(content: &str) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("config.toml"), content).unwrap();
        dir
    }

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load(dir.path()).unwrap();
        assert_eq!(config.api.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.timeout(), Duration::from_secs(20));
        assert_eq!(config.logging.level, LogLevel::Info);
        assert_eq!(config.storage.max_value_bytes, 5 * 1024 * 1024);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = write_config("[logging]\nlevel = \"warning\"\n");
        let config = AppConfig::load(dir.path()).unwrap();
        assert_eq!(config.logging.level, LogLevel::Warn);
        assert_eq!(config.api.timeout_secs, 20);
    }

    #[test]
    fn full_file() {
        let dir = write_config(
            r#"
[api]
base_url = "https://verse.example.com/api"
timeout_secs = 5

[logging]
level = "debug"

[storage]
max_value_bytes = 1024
"#,
        );
        let config = AppConfig::load(dir.path()).unwrap();
        assert_eq!(config.api.base_url, "https://verse.example.com/api");
        assert_eq!(config.timeout(), Duration::from_secs(5));
        assert_eq!(config.logging.level, LogLevel::Debug);
        assert_eq!(config.storage.max_value_bytes, 1024);
    }

    #[test]
    fn rejects_out_of_range_timeout() {
        let dir = write_config("[api]\ntimeout_secs = 0\n");
        assert!(matches!(
            AppConfig::load(dir.path()),
            Err(VerseError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn rejects_non_http_base_url() {
        let dir = write_config("[api]\nbase_url = \"ftp://host/api\"\n");
        let err = AppConfig::load(dir.path()).unwrap_err();
        assert!(err.to_string().contains("http://"));
    }

    #[test]
    fn rejects_unknown_level() {
        let dir = write_config("[logging]\nlevel = \"loud\"\n");
        assert!(AppConfig::load(dir.path()).is_err());
    }

    #[test]
    fn rejects_unknown_keys() {
        let dir = write_config("[api]\nbase = \"http://x\"\n");
        assert!(AppConfig::load(dir.path()).is_err());
    }
}
