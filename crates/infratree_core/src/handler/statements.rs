//! Per-handler prepared-statement table.
//!
//! # Responsibility
//! - Compile every named statement of a handler once, before serving.
//! - Hand out prepared handles to request workers by name.
//!
//! # Invariants
//! - The table is immutable once built; workers only read it.
//! - A statement missing from the table is never prepared ad hoc.

use std::collections::BTreeMap;

use rusqlite::{CachedStatement, Connection};

use super::{HandlerError, HandlerResult};
use crate::stmt::NamedStatement;

#[derive(Debug, Clone, Default)]
pub struct StatementTable {
    entries: BTreeMap<&'static str, &'static str>,
}

impl StatementTable {
    /// Prepares every statement into the connection's statement cache.
    ///
    /// # Errors
    /// - Returns `PrepareStatement` naming the first statement that fails.
    pub fn prepare(conn: &Connection, statements: &[NamedStatement]) -> HandlerResult<Self> {
        let mut entries = BTreeMap::new();
        for statement in statements {
            conn.prepare_cached(statement.sql)
                .map_err(|source| HandlerError::PrepareStatement {
                    statement: statement.name,
                    source,
                })?;
            entries.insert(statement.name, statement.sql);
        }
        Ok(Self { entries })
    }

    /// Returns the prepared handle for `statement`.
    ///
    /// # Errors
    /// - `UnknownStatement` when the statement is not part of this table.
    pub fn get<'conn>(
        &self,
        conn: &'conn Connection,
        statement: NamedStatement,
    ) -> HandlerResult<CachedStatement<'conn>> {
        let sql = self
            .entries
            .get(statement.name)
            .ok_or(HandlerError::UnknownStatement(statement.name))?;
        Ok(conn.prepare_cached(sql)?)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Evicts this table's statements from the connection cache.
    ///
    /// Statements of other handlers sharing the connection stay cached.
    pub fn release(&self, conn: &Connection) {
        for sql in self.entries.values() {
            if let Ok(statement) = conn.prepare_cached(sql) {
                statement.discard();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::StatementTable;
    use crate::db::open_db_in_memory;
    use crate::handler::HandlerError;
    use crate::stmt::{bucket, repository, NamedStatement};

    const BROKEN: NamedStatement = NamedStatement {
        name: "repository_broken",
        sql: "SELECT missing_column FROM repositories;",
    };

    #[test]
    fn prepare_builds_table_for_every_statement() {
        let conn = open_db_in_memory().unwrap();
        let table = StatementTable::prepare(&conn, repository::ALL).unwrap();

        assert_eq!(table.len(), repository::ALL.len());
        assert!(table.contains("repository_show"));
        table.get(&conn, repository::SHOW).unwrap();
    }

    #[test]
    fn prepare_failure_names_offending_statement() {
        let conn = open_db_in_memory().unwrap();
        let err = StatementTable::prepare(&conn, &[repository::LIST, BROKEN]).unwrap_err();

        match &err {
            HandlerError::PrepareStatement { statement, .. } => {
                assert_eq!(*statement, "repository_broken");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(err.to_string().contains("repository_broken"));
    }

    #[test]
    fn unknown_statement_is_rejected() {
        let conn = open_db_in_memory().unwrap();
        let table = StatementTable::prepare(&conn, &[repository::LIST]).unwrap();

        let Err(err) = table.get(&conn, repository::SHOW) else {
            panic!("repository_show should not be served by this table");
        };
        assert!(matches!(err, HandlerError::UnknownStatement("repository_show")));
    }

    #[test]
    fn release_leaves_other_tables_serving() {
        let conn = open_db_in_memory().unwrap();
        let repositories = StatementTable::prepare(&conn, repository::ALL).unwrap();
        let buckets = StatementTable::prepare(&conn, bucket::ALL).unwrap();

        repositories.release(&conn);
        repositories.release(&conn);

        let mut listing = buckets.get(&conn, bucket::LIST).unwrap();
        let rows = listing.query_map([""], |row| row.get::<_, String>(0)).unwrap();
        assert_eq!(rows.count(), 0);
    }
}
