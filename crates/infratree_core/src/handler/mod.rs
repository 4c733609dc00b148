//! Read handlers for the infrastructure tree.
//!
//! # Responsibility
//! - Define the capability set every handler exposes to the service.
//! - Host the shared run loop and the per-entity readers plugged into it.
//!
//! # Invariants
//! - Every request taken from an inbox is answered exactly once.
//! - Statement preparation failure during `run` is fatal for the process.
//! - Request workers never mutate handler state.

use std::error::Error;
use std::fmt::{Display, Formatter};

use crossbeam_channel::Sender;

use crate::db::SharedConnection;
use crate::export::ExportError;
use crate::logging::Loggers;
use crate::model::request::{Request, Section};
use crate::registry::{HandlerMap, RegistryError};

mod bucket;
mod cluster;
mod group;
mod node;
mod properties;
mod repository;
mod runtime;
mod statements;

pub use bucket::{bucket_handler, BucketRead};
pub use cluster::{cluster_handler, cluster_handler_name, ClusterRead};
pub use group::{group_handler, GroupRead};
pub use node::{node_handler, NodeRead};
pub use properties::PropertyLoader;
pub use repository::{repository_handler, RepositoryRead};
pub use runtime::{EntityReader, ReadContext, ReadHandler};
pub use statements::StatementTable;

pub type HandlerResult<T> = Result<T, HandlerError>;

/// Failures inside a handler; all but `NotFound` surface as server errors.
#[derive(Debug)]
pub enum HandlerError {
    /// A named statement did not compile during `run`.
    PrepareStatement {
        statement: &'static str,
        source: rusqlite::Error,
    },
    /// A worker asked for a statement its handler never prepared.
    UnknownStatement(&'static str),
    /// `run` was called before `register` supplied a connection.
    NotRegistered(String),
    /// Another worker panicked while holding the connection.
    ConnectionPoisoned,
    /// The single-object statement returned no row.
    NotFound { section: Section, id: String },
    Sqlite(rusqlite::Error),
    Export(ExportError),
    InvalidData(String),
}

impl Display for HandlerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PrepareStatement { statement, source } => {
                write!(f, "failed to prepare statement `{statement}`: {source}")
            }
            Self::UnknownStatement(name) => write!(f, "statement not prepared: `{name}`"),
            Self::NotRegistered(name) => {
                write!(f, "handler `{name}` has no database connection registered")
            }
            Self::ConnectionPoisoned => write!(f, "database connection lock poisoned"),
            Self::NotFound { section, id } => write!(f, "{section} not found: {id}"),
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::Export(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for HandlerError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::PrepareStatement { source, .. } => Some(source),
            Self::Sqlite(err) => Some(err),
            Self::Export(err) => Some(err),
            Self::UnknownStatement(_)
            | Self::NotRegistered(_)
            | Self::ConnectionPoisoned
            | Self::NotFound { .. }
            | Self::InvalidData(_) => None,
        }
    }
}

impl From<rusqlite::Error> for HandlerError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

impl From<ExportError> for HandlerError {
    fn from(value: ExportError) -> Self {
        Self::Export(value)
    }
}

/// Capability set shared by every read handler.
pub trait Handler: Send + Sync {
    /// Stable handler name used as routing key.
    fn name(&self) -> &str;

    /// Sending side of the handler's bounded inbox.
    fn intake(&self) -> Sender<Request>;

    /// Inbox for priority traffic; read handlers have no separate lane.
    fn priority_intake(&self) -> Sender<Request> {
        self.intake()
    }

    /// Supplies the shared connection and the three loggers.
    fn register(&mut self, conn: SharedConnection, loggers: Loggers);

    /// Claims this handler's (section, action) pairs.
    fn register_requests(&self, map: &mut HandlerMap) -> Result<(), RegistryError>;

    /// Prepares statements and serves the inbox until shutdown.
    ///
    /// # Errors
    /// - `PrepareStatement` when any statement fails to compile.
    /// - `NotRegistered` when called before `register`.
    fn run(&self) -> HandlerResult<()>;

    /// Signals the run loop to exit. Safe to call repeatedly.
    fn shutdown_now(&self);
}
