//! Read service assembly and lifecycle.
//!
//! # Responsibility
//! - Build the five entity handlers and hand them the shared connection.
//! - Fill the routing table and start one loop thread per handler.
//! - Stop every loop on shutdown.
//!
//! # Invariants
//! - A routing conflict aborts startup before any loop runs.
//! - A loop that cannot prepare its statements ends the process.

use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use log::{error, info};

use crate::config::{ConfigError, ServiceConfig};
use crate::db::SharedConnection;
use crate::dispatch::Dispatcher;
use crate::handler::{
    bucket_handler, cluster_handler, group_handler, node_handler, repository_handler, Handler,
};
use crate::logging::Loggers;
use crate::registry::{HandlerMap, RegistryError};

/// Exit code used when a handler loop fails to start.
pub const FATAL_EXIT_CODE: i32 = 1;

#[derive(Debug)]
pub enum ServiceError {
    Config(ConfigError),
    Registry(RegistryError),
    Spawn {
        handler: String,
        source: std::io::Error,
    },
    /// A loop thread panicked; reported by `shutdown`.
    LoopPanicked(String),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(err) => write!(f, "{err}"),
            Self::Registry(err) => write!(f, "{err}"),
            Self::Spawn { handler, source } => {
                write!(f, "failed to start loop for handler `{handler}`: {source}")
            }
            Self::LoopPanicked(name) => write!(f, "loop of handler `{name}` panicked"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(err) => Some(err),
            Self::Registry(err) => Some(err),
            Self::Spawn { source, .. } => Some(source),
            Self::LoopPanicked(_) => None,
        }
    }
}

impl From<ConfigError> for ServiceError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<RegistryError> for ServiceError {
    fn from(value: RegistryError) -> Self {
        Self::Registry(value)
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;

struct RunningHandler {
    handler: Arc<dyn Handler>,
    thread: Option<JoinHandle<()>>,
}

/// Handle on the running read path.
pub struct ReadService {
    dispatcher: Dispatcher,
    running: Vec<RunningHandler>,
    loggers: Loggers,
}

impl ReadService {
    /// Starts the repository, bucket, group, cluster and node handlers.
    pub fn start(config: &ServiceConfig, conn: SharedConnection) -> ServiceResult<Self> {
        config.validate()?;
        let depth = config.inbox_depth;
        let handlers: Vec<Box<dyn Handler>> = vec![
            Box::new(repository_handler(depth)),
            Box::new(bucket_handler(depth)),
            Box::new(group_handler(depth)),
            Box::new(cluster_handler(depth)),
            Box::new(node_handler(depth)),
        ];
        Self::start_with(handlers, conn, Loggers::default())
    }

    /// Starts an explicit handler set.
    ///
    /// Every handler is registered and claims its routes before the first
    /// loop thread is spawned.
    pub fn start_with(
        handlers: Vec<Box<dyn Handler>>,
        conn: SharedConnection,
        loggers: Loggers,
    ) -> ServiceResult<Self> {
        let mut map = HandlerMap::new();
        let mut inboxes = BTreeMap::new();
        let mut registered: Vec<Arc<dyn Handler>> = Vec::with_capacity(handlers.len());

        for mut handler in handlers {
            handler.register(Arc::clone(&conn), loggers);
            if let Err(err) = handler.register_requests(&mut map) {
                error!(
                    target: loggers.error,
                    "event=service_start module=service status=error handler={} error={}",
                    handler.name(),
                    err
                );
                return Err(err.into());
            }
            inboxes.insert(handler.name().to_string(), handler.intake());
            registered.push(Arc::from(handler));
        }

        let mut service = Self {
            dispatcher: Dispatcher::new(map, inboxes),
            running: Vec::with_capacity(registered.len()),
            loggers,
        };

        for handler in registered {
            let name = handler.name().to_string();
            let thread = match spawn_loop(Arc::clone(&handler), loggers) {
                Ok(thread) => thread,
                Err(source) => {
                    // Dropping `service` stops the loops already running.
                    return Err(ServiceError::Spawn {
                        handler: name,
                        source,
                    });
                }
            };
            service.running.push(RunningHandler {
                handler,
                thread: Some(thread),
            });
        }

        info!(
            target: loggers.app,
            "event=service_start module=service status=ok handlers={} routes={}",
            service.running.len(),
            service.dispatcher.handler_map().len()
        );
        Ok(service)
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn handler_names(&self) -> Vec<&str> {
        self.running
            .iter()
            .map(|running| running.handler.name())
            .collect()
    }

    /// Signals every handler and waits for the loops to exit.
    ///
    /// Requests already handed to workers still complete.
    pub fn shutdown(mut self) -> ServiceResult<()> {
        let outcome = self.stop();
        info!(
            target: self.loggers.app,
            "event=service_stop module=service status={}",
            if outcome.is_ok() { "ok" } else { "error" }
        );
        outcome
    }

    fn stop(&mut self) -> ServiceResult<()> {
        for running in &self.running {
            running.handler.shutdown_now();
        }

        let mut outcome = Ok(());
        for running in &mut self.running {
            let Some(thread) = running.thread.take() else {
                continue;
            };
            if thread.join().is_err() {
                let name = running.handler.name().to_string();
                error!(
                    target: self.loggers.error,
                    "event=service_stop module=service status=error handler={} error=loop_panicked",
                    name
                );
                if outcome.is_ok() {
                    outcome = Err(ServiceError::LoopPanicked(name));
                }
            }
        }
        outcome
    }
}

impl Drop for ReadService {
    fn drop(&mut self) {
        let _ = self.stop();
    }
}

fn spawn_loop(handler: Arc<dyn Handler>, loggers: Loggers) -> std::io::Result<JoinHandle<()>> {
    let name = handler.name().to_string();
    thread::Builder::new()
        .name(format!("{name}-loop"))
        .spawn(move || {
            if let Err(err) = handler.run() {
                error!(
                    target: loggers.error,
                    "event=handler_run module=service status=fatal handler={} error={}",
                    handler.name(),
                    err
                );
                log::logger().flush();
                std::process::exit(FATAL_EXIT_CODE);
            }
        })
}
