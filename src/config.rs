//! Engine configuration loaded from TOML.
//!
//! ```toml
//! [retention]
//! cutoff_days = 30
//! batch_limit = 200
//!
//! [database]
//! url = "postgres://taskward@localhost/taskward"
//! max_connections = 4
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

const DEFAULT_CUTOFF_DAYS: u32 = 30;
const DEFAULT_BATCH_LIMIT: usize = 200;
const DEFAULT_MAX_CONNECTIONS: u32 = 4;

/// Errors returned while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read config file {path}: {source}")]
    Read {
        /// Path that failed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid configuration TOML.
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Top-level engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EngineConfig {
    /// Purge job settings.
    #[serde(default)]
    pub retention: RetentionConfig,
    /// Store connection settings.
    #[serde(default)]
    pub database: DatabaseConfig,
}

/// Purge job settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RetentionConfig {
    /// Days a tombstoned record is kept before purge.
    #[serde(default = "default_cutoff_days")]
    pub cutoff_days: u32,
    /// Maximum rows per entity removed in one purge transaction.
    #[serde(default = "default_batch_limit")]
    pub batch_limit: usize,
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            cutoff_days: DEFAULT_CUTOFF_DAYS,
            batch_limit: DEFAULT_BATCH_LIMIT,
        }
    }
}

/// Store connection settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatabaseConfig {
    /// `PostgreSQL` connection URL; unset means no database is configured.
    #[serde(default)]
    pub url: Option<String>,
    /// Connection pool size.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: DEFAULT_MAX_CONNECTIONS,
        }
    }
}

const fn default_cutoff_days() -> u32 {
    DEFAULT_CUTOFF_DAYS
}

const fn default_batch_limit() -> usize {
    DEFAULT_BATCH_LIMIT
}

const fn default_max_connections() -> u32 {
    DEFAULT_MAX_CONNECTIONS
}

impl EngineConfig {
    /// Parses configuration from TOML text; missing keys take defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed TOML or unknown keys.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Read`] when the file cannot be read or
    /// [`ConfigError::Parse`] when it does not parse.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, EngineConfig};
    use rstest::rstest;
    use std::path::Path;

    #[rstest]
    fn empty_config_uses_defaults() {
        let config = EngineConfig::from_toml_str("").expect("empty config parses");

        assert_eq!(config.retention.cutoff_days, 30);
        assert_eq!(config.retention.batch_limit, 200);
        assert_eq!(config.database.max_connections, 4);
        assert_eq!(config.database.url, None);
    }

    #[rstest]
    fn explicit_values_override_defaults() {
        let config = EngineConfig::from_toml_str(
            r#"
            [retention]
            cutoff_days = 7

            [database]
            url = "postgres://localhost/taskward"
            "#,
        )
        .expect("config parses");

        assert_eq!(config.retention.cutoff_days, 7);
        assert_eq!(config.retention.batch_limit, 200);
        assert_eq!(
            config.database.url.as_deref(),
            Some("postgres://localhost/taskward")
        );
    }

    #[rstest]
    #[case("[retention]\ncutoff = 3\n")]
    #[case("[retention]\ncutoff_days = -1\n")]
    #[case("[unknown]\n")]
    fn malformed_config_is_rejected(#[case] text: &str) {
        let result = EngineConfig::from_toml_str(text);

        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[rstest]
    fn missing_file_reports_path() {
        let path = Path::new("/nonexistent/taskward.toml");
        let result = EngineConfig::load(path);

        assert!(matches!(result, Err(ConfigError::Read { path: failed, .. }) if failed == path));
    }
}
