//! Service configuration.
//!
//! Loaded from a JSON file; every field has a default so an empty object is a
//! valid configuration. The core crate reads no environment variables; callers
//! layer their own overrides on top and call [`ServiceConfig::validate`].

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::db::DEFAULT_STATEMENT_CACHE_CAPACITY;
use crate::logging::default_log_level;

pub const DEFAULT_INBOX_DEPTH: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Requests a handler inbox buffers before `dispatch` blocks.
    pub inbox_depth: usize,
    pub db_path: Option<PathBuf>,
    pub log_level: String,
    /// Absolute directory for rolling log files; logging stays off when unset.
    pub log_dir: Option<PathBuf>,
    pub statement_cache_capacity: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            inbox_depth: DEFAULT_INBOX_DEPTH,
            db_path: None,
            log_level: default_log_level().to_string(),
            log_dir: None,
            statement_cache_capacity: DEFAULT_STATEMENT_CACHE_CAPACITY,
        }
    }
}

impl ServiceConfig {
    /// Reads and validates a JSON configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let data = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&data)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.inbox_depth == 0 {
            return Err(ConfigError::Invalid {
                field: "inbox_depth",
                message: "must be at least 1".to_string(),
            });
        }
        if self.statement_cache_capacity == 0 {
            return Err(ConfigError::Invalid {
                field: "statement_cache_capacity",
                message: "must be at least 1".to_string(),
            });
        }
        let allowed = ["trace", "debug", "info", "warn", "warning", "error"];
        if !allowed.contains(&self.log_level.trim().to_ascii_lowercase().as_str()) {
            return Err(ConfigError::Invalid {
                field: "log_level",
                message: format!("unsupported level `{}`", self.log_level),
            });
        }
        if let Some(dir) = &self.log_dir {
            if !dir.is_absolute() {
                return Err(ConfigError::Invalid {
                    field: "log_dir",
                    message: format!("must be absolute, got `{}`", dir.display()),
                });
            }
        }
        Ok(())
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse(serde_json::Error),
    Invalid {
        field: &'static str,
        message: String,
    },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse(err) => write!(f, "invalid config json: {err}"),
            Self::Invalid { field, message } => write!(f, "invalid `{field}`: {message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse(err) => Some(err),
            Self::Invalid { .. } => None,
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(value: serde_json::Error) -> Self {
        Self::Parse(value)
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, ServiceConfig, DEFAULT_INBOX_DEPTH};
    use std::io::Write;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn empty_object_yields_defaults() {
        let file = write_config("{}");
        let config = ServiceConfig::load(file.path()).unwrap();
        assert_eq!(config, ServiceConfig::default());
        assert_eq!(config.inbox_depth, DEFAULT_INBOX_DEPTH);
    }

    #[test]
    fn explicit_fields_override_defaults() {
        let file = write_config(
            r#"{"inbox_depth": 4, "log_level": "warn", "db_path": "/var/lib/tree.db"}"#,
        );
        let config = ServiceConfig::load(file.path()).unwrap();
        assert_eq!(config.inbox_depth, 4);
        assert_eq!(config.log_level, "warn");
        assert_eq!(
            config.db_path.as_deref(),
            Some(std::path::Path::new("/var/lib/tree.db"))
        );
    }

    #[test]
    fn zero_inbox_depth_is_rejected() {
        let file = write_config(r#"{"inbox_depth": 0}"#);
        let err = ServiceConfig::load(file.path()).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "inbox_depth",
                ..
            }
        ));
    }

    #[test]
    fn relative_log_dir_is_rejected() {
        let config = ServiceConfig {
            log_dir: Some("logs".into()),
            ..ServiceConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let file = write_config("{ inbox_depth: ");
        let err = ServiceConfig::load(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn missing_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.json");
        let err = ServiceConfig::load(&path).unwrap_err();
        assert!(err.to_string().contains("absent.json"));
    }
}
