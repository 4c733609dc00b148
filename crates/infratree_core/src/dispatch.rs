//! Routes requests to handler inboxes.
//!
//! # Invariants
//! - A request that cannot be routed is still answered exactly once.
//! - Routing never inspects entity slots; only (section, action) matters.

use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Duration;

use crossbeam_channel::{RecvTimeoutError, Sender};
use log::warn;

use crate::logging::ERROR_TARGET;
use crate::model::request::{Action, ReplyReceiver, Request, Section};
use crate::model::result::ReadResult;
use crate::registry::HandlerMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    /// No handler claims the pair; the requester got an unknown-request reply.
    Unrouted { section: Section, action: Action },
    /// The handler's inbox is closed; the requester got a server-error reply.
    HandlerStopped(String),
    /// The reply sink was dropped without a result.
    NoReply,
    /// No result arrived within the caller's deadline.
    Timeout,
}

impl Display for DispatchError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unrouted { section, action } => {
                write!(f, "no handler registered for {section}/{action}")
            }
            Self::HandlerStopped(name) => write!(f, "handler `{name}` is not accepting requests"),
            Self::NoReply => write!(f, "request was dropped without a reply"),
            Self::Timeout => write!(f, "timed out waiting for a reply"),
        }
    }
}

impl Error for DispatchError {}

/// Cloneable front door of a running service.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    map: HandlerMap,
    inboxes: BTreeMap<String, Sender<Request>>,
}

impl Dispatcher {
    pub fn new(map: HandlerMap, inboxes: BTreeMap<String, Sender<Request>>) -> Self {
        Self { map, inboxes }
    }

    pub fn handler_map(&self) -> &HandlerMap {
        &self.map
    }

    /// Sends `request` to the inbox of the handler claiming its pair.
    ///
    /// Blocks while that inbox is full.
    pub fn dispatch(&self, request: Request) -> Result<(), DispatchError> {
        let (section, action) = (request.section, request.action);
        let Some(name) = self.map.get(section, action) else {
            let mut result = ReadResult::from_request(&request);
            result.unknown_request();
            request.reply(result);
            return Err(DispatchError::Unrouted { section, action });
        };

        let Some(inbox) = self.inboxes.get(name) else {
            return Err(self.refuse(request, name));
        };
        inbox
            .send(request)
            .map_err(|rejected| self.refuse(rejected.into_inner(), name))
    }

    /// Dispatches and waits for the result.
    ///
    /// Unroutable and refused requests still return their error reply.
    pub fn call(
        &self,
        request: Request,
        receiver: &ReplyReceiver,
    ) -> Result<ReadResult, DispatchError> {
        self.dispatch_answered(request)?;
        receiver.recv().map_err(|_| DispatchError::NoReply)
    }

    /// Like [`Dispatcher::call`] with an upper bound on the wait.
    pub fn call_timeout(
        &self,
        request: Request,
        receiver: &ReplyReceiver,
        timeout: Duration,
    ) -> Result<ReadResult, DispatchError> {
        self.dispatch_answered(request)?;
        receiver.recv_timeout(timeout).map_err(|err| match err {
            RecvTimeoutError::Timeout => DispatchError::Timeout,
            RecvTimeoutError::Disconnected => DispatchError::NoReply,
        })
    }

    /// Dispatch errors that already produced a reply are not errors for callers.
    fn dispatch_answered(&self, request: Request) -> Result<(), DispatchError> {
        match self.dispatch(request) {
            Ok(()) | Err(DispatchError::Unrouted { .. }) | Err(DispatchError::HandlerStopped(_)) => {
                Ok(())
            }
            Err(err) => Err(err),
        }
    }

    fn refuse(&self, request: Request, name: &str) -> DispatchError {
        warn!(
            target: ERROR_TARGET,
            "event=dispatch module=dispatch status=refused handler={} section={} action={}",
            name, request.section, request.action
        );
        let mut result = ReadResult::from_request(&request);
        result.server_error(format!("handler `{name}` is not accepting requests"));
        request.reply(result);
        DispatchError::HandlerStopped(name.to_string())
    }
}
