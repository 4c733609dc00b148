//! Read path of the infrastructure tree service.
//!
//! Requests addressed by (section, action) are routed to one handler per
//! entity kind; each handler answers from SQLite with a single result.

pub mod config;
pub mod db;
pub mod dispatch;
pub mod export;
pub mod handler;
pub mod logging;
pub mod model;
pub mod registry;
pub mod service;
pub mod stmt;

pub use config::{ConfigError, ServiceConfig};
pub use db::{open_db, open_db_in_memory, share, DbError, SharedConnection};
pub use dispatch::{DispatchError, Dispatcher};
pub use export::{CheckConfigExporter, ExportError, SqliteCheckConfigExporter};
pub use handler::{Handler, HandlerError, HandlerResult, ReadHandler};
pub use logging::{default_log_level, init_logging, logging_status, Loggers};
pub use model::request::{Action, ReplyReceiver, Request, Section};
pub use model::result::{ReadResult, ResultStatus};
pub use registry::{HandlerMap, RegistryError};
pub use service::{ReadService, ServiceError};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
