//! Connection bootstrap utilities for SQLite.
//!
//! # Responsibility
//! - Open file or in-memory SQLite connections.
//! - Configure pragmas and the prepared-statement cache handlers rely on.
//! - Trigger schema migrations before returning a usable connection.
//!
//! # Invariants
//! - Returned connections have `foreign_keys=ON`.
//! - Returned connections have migrations fully applied.

use super::migrations::apply_migrations;
use super::DbResult;
use log::{error, info};
use rusqlite::Connection;
use std::path::Path;
use std::time::{Duration, Instant};

/// Statement cache slots reserved when no explicit capacity is configured.
pub const DEFAULT_STATEMENT_CACHE_CAPACITY: usize = 128;

/// Opens a SQLite database file and applies all pending migrations.
///
/// # Side effects
/// - Performs connection bootstrap and migration checks.
/// - Emits `db_open` logging events with duration and status.
pub fn open_db(path: impl AsRef<Path>) -> DbResult<Connection> {
    open_db_with_cache_capacity(path, DEFAULT_STATEMENT_CACHE_CAPACITY)
}

/// Opens a SQLite database file with an explicit prepared-statement cache
/// capacity.
///
/// The capacity must cover every statement of every handler sharing the
/// connection, otherwise prepared handles get evicted between requests.
pub fn open_db_with_cache_capacity(
    path: impl AsRef<Path>,
    cache_capacity: usize,
) -> DbResult<Connection> {
    bootstrap("file", cache_capacity, || Connection::open(path))
}

/// Opens an in-memory SQLite database and applies all pending migrations.
pub fn open_db_in_memory() -> DbResult<Connection> {
    bootstrap(
        "memory",
        DEFAULT_STATEMENT_CACHE_CAPACITY,
        Connection::open_in_memory,
    )
}

fn bootstrap(
    mode: &str,
    cache_capacity: usize,
    open: impl FnOnce() -> rusqlite::Result<Connection>,
) -> DbResult<Connection> {
    let started_at = Instant::now();
    info!("event=db_open module=db status=start mode={mode}");

    let mut conn = match open() {
        Ok(conn) => conn,
        Err(err) => {
            error!(
                "event=db_open module=db status=error mode={} duration_ms={} error_code=db_open_failed error={}",
                mode,
                started_at.elapsed().as_millis(),
                err
            );
            return Err(err.into());
        }
    };

    match configure_connection(&mut conn, cache_capacity) {
        Ok(()) => {
            info!(
                "event=db_open module=db status=ok mode={} duration_ms={} statement_cache={}",
                mode,
                started_at.elapsed().as_millis(),
                cache_capacity
            );
            Ok(conn)
        }
        Err(err) => {
            error!(
                "event=db_open module=db status=error mode={} duration_ms={} error_code=db_bootstrap_failed error={}",
                mode,
                started_at.elapsed().as_millis(),
                err
            );
            Err(err)
        }
    }
}

fn configure_connection(conn: &mut Connection, cache_capacity: usize) -> DbResult<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_secs(5))?;
    conn.set_prepared_statement_cache_capacity(cache_capacity);
    apply_migrations(conn)?;
    Ok(())
}
