//! Shared run loop for read handlers.
//!
//! # Responsibility
//! - Own the inbox, the shutdown signal and the prepared statements.
//! - Spawn one worker per request and route it by action to the reader.
//! - Translate reader outcomes into the result envelope and reply once.
//!
//! # Invariants
//! - Search runs the list path with the request action rewritten to list and
//!   restored afterwards; the reply still echoes search.
//! - A reply that cannot be delivered is logged, never panics.
//! - Statements are released when the loop exits.

use std::sync::{Arc, MutexGuard};
use std::thread;
use std::time::Instant;

use crossbeam_channel::{bounded, select, Receiver, Sender};
use log::{debug, error, info, warn};
use rusqlite::{CachedStatement, Connection, Params, Row};

use super::properties::PropertyLoader;
use super::statements::StatementTable;
use super::{Handler, HandlerError, HandlerResult};
use crate::db::SharedConnection;
use crate::export::{CheckConfigExporter, SqliteCheckConfigExporter};
use crate::logging::Loggers;
use crate::model::entity::{non_empty, Details};
use crate::model::property::{Property, PropertyScope};
use crate::model::request::{Action, Request, Section};
use crate::model::result::{ReadResult, ResultStatus};
use crate::registry::{HandlerMap, RegistryError};
use crate::stmt::{NamedStatement, PropertyStatements};

/// Entity-specific behavior plugged into [`ReadHandler`].
pub trait EntityReader: Send + Sync + 'static {
    /// Section this reader answers for.
    fn section(&self) -> Section;

    /// Stable name of the handler wrapping this reader.
    fn handler_name(&self) -> String;

    /// Actions claimed in the handler registry.
    fn actions(&self) -> &'static [Action];

    /// Statements prepared when the handler starts.
    fn statements(&self) -> &'static [NamedStatement];

    fn list(
        &self,
        ctx: &ReadContext<'_>,
        request: &Request,
        result: &mut ReadResult,
    ) -> HandlerResult<()>;

    fn show(
        &self,
        ctx: &ReadContext<'_>,
        request: &Request,
        result: &mut ReadResult,
    ) -> HandlerResult<()>;

    /// Direct members of a container; only group and cluster readers have any.
    fn member_list(
        &self,
        _ctx: &ReadContext<'_>,
        _request: &Request,
        result: &mut ReadResult,
    ) -> HandlerResult<()> {
        result.unknown_request();
        Ok(())
    }
}

/// Request-scoped view of the handler's resources.
pub struct ReadContext<'a> {
    section: Section,
    conn: &'a Connection,
    statements: &'a StatementTable,
    exporter: &'a dyn CheckConfigExporter,
}

impl<'a> ReadContext<'a> {
    pub fn new(
        section: Section,
        conn: &'a Connection,
        statements: &'a StatementTable,
        exporter: &'a dyn CheckConfigExporter,
    ) -> Self {
        Self {
            section,
            conn,
            statements,
            exporter,
        }
    }

    pub fn section(&self) -> Section {
        self.section
    }

    /// Prepared handle for one of the handler's statements.
    pub fn statement(&self, statement: NamedStatement) -> HandlerResult<CachedStatement<'a>> {
        self.statements.get(self.conn, statement)
    }

    /// Runs `statement` and maps every row; a failing row stops iteration.
    pub fn collect_rows<T, P, F>(
        &self,
        statement: NamedStatement,
        params: P,
        mut map: F,
    ) -> HandlerResult<Vec<T>>
    where
        P: Params,
        F: FnMut(&Row<'_>) -> HandlerResult<T>,
    {
        let mut stmt = self.statement(statement)?;
        let mut rows = stmt.query(params)?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(map(row)?);
        }
        Ok(items)
    }

    /// Loads the single object keyed by `id`.
    ///
    /// # Errors
    /// - `NotFound` when the statement yields no row.
    pub fn query_one<T, F>(&self, statement: NamedStatement, id: &str, map: F) -> HandlerResult<T>
    where
        F: FnOnce(&Row<'_>) -> HandlerResult<T>,
    {
        let mut stmt = self.statement(statement)?;
        let mut rows = stmt.query([id])?;
        match rows.next()? {
            Some(row) => map(row),
            None => Err(HandlerError::NotFound {
                section: self.section,
                id: id.to_string(),
            }),
        }
    }

    /// Runs the four property loaders for `owner_id`; `None` when empty.
    pub fn load_properties(
        &self,
        statements: &PropertyStatements,
        scope: PropertyScope,
        owner_id: &str,
    ) -> HandlerResult<Option<Vec<Property>>> {
        let loader = PropertyLoader::new(self, statements, scope);
        let mut properties = Vec::new();
        loader.load_all(owner_id, &mut properties)?;
        Ok(non_empty(properties))
    }

    /// Exports check configurations inside a read transaction.
    ///
    /// The transaction is rolled back when the exporter fails.
    pub fn load_details(&self, object_id: &str) -> HandlerResult<Option<Details>> {
        let tx = self.conn.unchecked_transaction()?;
        match self.exporter.export(&tx, object_id) {
            Ok(configs) => {
                tx.commit()?;
                Ok(Details::from_check_configs(configs))
            }
            Err(err) => {
                if let Err(rollback_err) = tx.rollback() {
                    warn!(
                        "event=details_rollback module=handler status=error object_id={} error={}",
                        object_id, rollback_err
                    );
                }
                Err(err.into())
            }
        }
    }
}

/// State shared by the run loop and every request worker.
struct Worker<R: EntityReader> {
    name: String,
    reader: Arc<R>,
    conn: SharedConnection,
    statements: StatementTable,
    exporter: Arc<dyn CheckConfigExporter>,
    loggers: Loggers,
}

impl<R: EntityReader> Worker<R> {
    fn handle(&self, mut request: Request) {
        let started_at = Instant::now();
        let result = self.process(&mut request);

        info!(
            target: self.loggers.request,
            "event=request module=handler handler={} section={} action={} user={} status={:?} code={} duration_ms={}",
            self.name,
            request.section,
            request.action,
            request.auth_user,
            result.status,
            result.code,
            started_at.elapsed().as_millis()
        );

        if !request.reply(result) {
            warn!(
                target: self.loggers.error,
                "event=reply_dropped module=handler handler={} section={} action={}",
                self.name, request.section, request.action
            );
        }
    }

    fn process(&self, request: &mut Request) -> ReadResult {
        let mut result = ReadResult::from_request(request);

        let serviced = self.reader.actions().contains(&request.action)
            && request.section == self.reader.section();
        if !serviced {
            result.unknown_request();
            return result;
        }

        let conn = match lock(&self.conn) {
            Ok(conn) => conn,
            Err(err) => {
                self.report(request, &err);
                result.server_error(err.to_string());
                return result;
            }
        };
        let ctx = ReadContext::new(
            self.reader.section(),
            &conn,
            &self.statements,
            self.exporter.as_ref(),
        );

        let outcome = match request.action {
            Action::List => self.reader.list(&ctx, request, &mut result),
            Action::Show => self.reader.show(&ctx, request, &mut result),
            Action::Search => {
                request.action = Action::List;
                let outcome = self.reader.list(&ctx, request, &mut result);
                request.action = Action::Search;
                outcome
            }
            Action::MemberList => self.reader.member_list(&ctx, request, &mut result),
            _ => {
                result.unknown_request();
                Ok(())
            }
        };

        match outcome {
            Ok(()) => {
                if result.status == ResultStatus::Pending {
                    result.ok();
                }
            }
            Err(HandlerError::NotFound { section, id }) => {
                result.not_found(format!("{section} not found: {id}"));
            }
            Err(err) => {
                self.report(request, &err);
                result.server_error(err.to_string());
            }
        }
        result
    }

    fn report(&self, request: &Request, err: &HandlerError) {
        error!(
            target: self.loggers.error,
            "event=request module=handler status=error handler={} section={} action={} error={}",
            self.name, request.section, request.action, err
        );
    }
}

fn lock(conn: &SharedConnection) -> HandlerResult<MutexGuard<'_, Connection>> {
    conn.lock().map_err(|_| HandlerError::ConnectionPoisoned)
}

/// Long-lived handler serving one entity kind.
pub struct ReadHandler<R: EntityReader> {
    name: String,
    reader: Arc<R>,
    input: Sender<Request>,
    inbox: Receiver<Request>,
    shutdown_tx: Sender<()>,
    shutdown_rx: Receiver<()>,
    conn: Option<SharedConnection>,
    loggers: Loggers,
    exporter: Arc<dyn CheckConfigExporter>,
}

impl<R: EntityReader> ReadHandler<R> {
    /// Creates a handler with a bounded inbox of `inbox_depth` requests.
    pub fn new(reader: R, inbox_depth: usize) -> Self {
        let (input, inbox) = bounded(inbox_depth.max(1));
        let (shutdown_tx, shutdown_rx) = bounded(1);
        Self {
            name: reader.handler_name(),
            reader: Arc::new(reader),
            input,
            inbox,
            shutdown_tx,
            shutdown_rx,
            conn: None,
            loggers: Loggers::default(),
            exporter: Arc::new(SqliteCheckConfigExporter),
        }
    }

    /// Replaces the check-configuration exporter used on show.
    pub fn with_exporter(mut self, exporter: Arc<dyn CheckConfigExporter>) -> Self {
        self.exporter = exporter;
        self
    }

    pub fn reader(&self) -> &R {
        &self.reader
    }

    fn prepare(&self, conn: &SharedConnection) -> HandlerResult<StatementTable> {
        let guard = lock(conn)?;
        StatementTable::prepare(&guard, self.reader.statements())
    }
}

impl<R: EntityReader> Handler for ReadHandler<R> {
    fn name(&self) -> &str {
        &self.name
    }

    fn intake(&self) -> Sender<Request> {
        self.input.clone()
    }

    fn register(&mut self, conn: SharedConnection, loggers: Loggers) {
        self.conn = Some(conn);
        self.loggers = loggers;
    }

    fn register_requests(&self, map: &mut HandlerMap) -> Result<(), RegistryError> {
        for action in self.reader.actions() {
            map.register(self.reader.section(), *action, &self.name)?;
        }
        Ok(())
    }

    fn run(&self) -> HandlerResult<()> {
        let conn = self
            .conn
            .clone()
            .ok_or_else(|| HandlerError::NotRegistered(self.name.clone()))?;

        let statements = match self.prepare(&conn) {
            Ok(statements) => statements,
            Err(err) => {
                error!(
                    target: self.loggers.error,
                    "event=handler_run module=handler status=fatal handler={} error={}",
                    self.name, err
                );
                return Err(err);
            }
        };
        info!(
            target: self.loggers.app,
            "event=handler_run module=handler status=start handler={} statements={}",
            self.name,
            statements.len()
        );

        let worker = Arc::new(Worker {
            name: self.name.clone(),
            reader: Arc::clone(&self.reader),
            conn,
            statements,
            exporter: Arc::clone(&self.exporter),
            loggers: self.loggers,
        });

        loop {
            select! {
                recv(self.shutdown_rx) -> _ => break,
                recv(self.inbox) -> message => match message {
                    Ok(request) => spawn_worker(&worker, request),
                    Err(_) => break,
                },
            }
        }

        // Requests still queued are refused rather than dropped unanswered.
        for request in self.inbox.try_iter() {
            let mut result = ReadResult::from_request(&request);
            result.server_error(format!("handler `{}` is shutting down", self.name));
            request.reply(result);
        }

        if let Ok(guard) = lock(&worker.conn) {
            worker.statements.release(&guard);
        }
        info!(
            target: self.loggers.app,
            "event=handler_run module=handler status=stopped handler={}",
            self.name
        );
        Ok(())
    }

    fn shutdown_now(&self) {
        // A full channel means shutdown is already pending.
        let _ = self.shutdown_tx.try_send(());
    }
}

fn spawn_worker<R: EntityReader>(worker: &Arc<Worker<R>>, request: Request) {
    let reply = request.reply.clone();
    let mut fallback = ReadResult::from_request(&request);
    let shared = Arc::clone(worker);

    debug!(
        target: worker.loggers.app,
        "event=request_accepted module=handler handler={} section={} action={}",
        worker.name, request.section, request.action
    );

    let spawned = thread::Builder::new()
        .name(format!("{}-worker", worker.name))
        .spawn(move || shared.handle(request));

    if let Err(err) = spawned {
        error!(
            target: worker.loggers.error,
            "event=worker_spawn module=handler status=error handler={} error={}",
            worker.name, err
        );
        fallback.server_error(format!("failed to start request worker: {err}"));
        let _ = reply.send(fallback);
    }
}
