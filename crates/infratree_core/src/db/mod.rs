//! SQLite storage bootstrap and schema migration entry points.
//!
//! # Responsibility
//! - Open and configure SQLite connections for the read path.
//! - Apply the tree schema in deterministic order.
//! - Provide the shared connection handle that handlers serialize on.
//!
//! # Invariants
//! - Migration version is tracked via `PRAGMA user_version`.
//! - Handlers must not read application data before migrations succeed.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::{Arc, Mutex};

use rusqlite::Connection;

pub mod migrations;
mod open;

pub use open::{
    open_db, open_db_in_memory, open_db_with_cache_capacity, DEFAULT_STATEMENT_CACHE_CAPACITY,
};

/// Connection shared by every handler; the mutex serializes driver access.
pub type SharedConnection = Arc<Mutex<Connection>>;

pub type DbResult<T> = Result<T, DbError>;

/// Wraps an opened connection for sharing across handler threads.
pub fn share(conn: Connection) -> SharedConnection {
    Arc::new(Mutex::new(conn))
}

#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "database schema version {db_version} is newer than supported {latest_supported}"
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::UnsupportedSchemaVersion { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
