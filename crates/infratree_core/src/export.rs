//! Check-configuration export used to decorate shown objects.
//!
//! # Responsibility
//! - Define the exporter contract handlers call inside a read transaction.
//! - Provide the SQLite exporter reading `check_configurations`.
//!
//! # Invariants
//! - Exporters only read through the transaction they are handed.
//! - Deleted configurations are never exported.

use std::error::Error;
use std::fmt::{Display, Formatter};

use rusqlite::{Row, Transaction};

use crate::model::entity::CheckConfig;
use crate::stmt::check_config;

/// Errors raised while exporting check configurations.
#[derive(Debug)]
pub enum ExportError {
    Sqlite(rusqlite::Error),
    InvalidData(String),
}

impl Display for ExportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "check configuration export failed: {err}"),
            Self::InvalidData(message) => {
                write!(f, "invalid check configuration data: {message}")
            }
        }
    }
}

impl Error for ExportError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::InvalidData(_) => None,
        }
    }
}

impl From<rusqlite::Error> for ExportError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

/// Materializes the check configurations attached to one object.
pub trait CheckConfigExporter: Send + Sync {
    fn export(
        &self,
        tx: &Transaction<'_>,
        object_id: &str,
    ) -> Result<Vec<CheckConfig>, ExportError>;
}

/// Exporter backed by the `check_configurations` table.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteCheckConfigExporter;

impl CheckConfigExporter for SqliteCheckConfigExporter {
    fn export(
        &self,
        tx: &Transaction<'_>,
        object_id: &str,
    ) -> Result<Vec<CheckConfig>, ExportError> {
        let mut stmt = tx.prepare_cached(check_config::EXPORT.sql)?;
        let mut rows = stmt.query([object_id])?;
        let mut configs = Vec::new();

        while let Some(row) = rows.next()? {
            configs.push(parse_check_config_row(row)?);
        }

        Ok(configs)
    }
}

fn parse_check_config_row(row: &Row<'_>) -> Result<CheckConfig, ExportError> {
    let interval: i64 = row.get("check_interval")?;
    let interval = u64::try_from(interval).map_err(|_| {
        ExportError::InvalidData(format!(
            "invalid interval `{interval}` in check_configurations.check_interval"
        ))
    })?;

    Ok(CheckConfig {
        id: row.get("configuration_id")?,
        name: row.get("configuration_name")?,
        interval,
        repository_id: row.get("repository_id")?,
        bucket_id: row
            .get::<_, Option<String>>("bucket_id")?
            .unwrap_or_default(),
        capability_id: row.get("capability_id")?,
        object_id: row.get("configuration_object")?,
        object_type: row.get("configuration_object_type")?,
        is_active: row.get("configuration_active")?,
        is_enabled: row.get("enabled")?,
        inheritance: row.get("inheritance_enabled")?,
        child_only: row.get("children_only")?,
        external_id: row.get("external_id")?,
    })
}
