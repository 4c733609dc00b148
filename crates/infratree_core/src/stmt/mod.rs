//! Named SQL statements used by the read handlers.
//!
//! # Responsibility
//! - Keep every read query in one registry, keyed by a stable name.
//! - Group statements per entity kind so each handler prepares only its own.
//!
//! # Invariants
//! - Statement names are unique across the whole registry.
//! - Single-object statements bind the object id as `?1`.

/// One SQL text with the name it is prepared and reported under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NamedStatement {
    pub name: &'static str,
    pub sql: &'static str,
}

/// The four property loaders of one owner kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PropertyStatements {
    pub oncall: NamedStatement,
    pub service: NamedStatement,
    pub system: NamedStatement,
    pub custom: NamedStatement,
    /// Column the service loader reads the service name from.
    pub service_column: &'static str,
}

/// Builds the property statements for one owner table prefix.
macro_rules! property_statements {
    ($owner:literal, $service_column:literal) => {
        $crate::stmt::PropertyStatements {
            oncall: $crate::stmt::NamedStatement {
                name: concat!($owner, "_property_oncall"),
                sql: concat!(
                    "SELECT p.instance_id AS instance_id, ",
                    "p.source_instance_id AS source_instance_id, ",
                    "p.view_name AS view_name, ",
                    "p.oncall_duty_id AS oncall_id, o.oncall_duty_name AS oncall_name ",
                    "FROM ", $owner, "_property_oncall p ",
                    "JOIN oncall_duty_teams o ON o.oncall_duty_id = p.oncall_duty_id ",
                    "WHERE p.", $owner, "_id = ?1 ",
                    "ORDER BY p.instance_id;"
                ),
            },
            service: $crate::stmt::NamedStatement {
                name: concat!($owner, "_property_service"),
                sql: concat!(
                    "SELECT instance_id, source_instance_id, view_name, ", $service_column, " ",
                    "FROM ", $owner, "_property_service ",
                    "WHERE ", $owner, "_id = ?1 ",
                    "ORDER BY instance_id;"
                ),
            },
            system: $crate::stmt::NamedStatement {
                name: concat!($owner, "_property_system"),
                sql: concat!(
                    "SELECT instance_id, source_instance_id, view_name, ",
                    "system_property AS name, value ",
                    "FROM ", $owner, "_property_system ",
                    "WHERE ", $owner, "_id = ?1 ",
                    "ORDER BY instance_id;"
                ),
            },
            custom: $crate::stmt::NamedStatement {
                name: concat!($owner, "_property_custom"),
                sql: concat!(
                    "SELECT p.instance_id AS instance_id, ",
                    "p.source_instance_id AS source_instance_id, ",
                    "p.view_name AS view_name, ",
                    "p.custom_property_id AS custom_id, p.value AS value, ",
                    "c.custom_property AS name ",
                    "FROM ", $owner, "_property_custom p ",
                    "JOIN custom_properties c ON c.custom_property_id = p.custom_property_id ",
                    "WHERE p.", $owner, "_id = ?1 ",
                    "ORDER BY p.instance_id;"
                ),
            },
            service_column: $service_column,
        }
    };
}

pub(crate) use property_statements;

pub mod bucket;
pub mod check_config;
pub mod cluster;
pub mod group;
pub mod node;
pub mod repository;

#[cfg(test)]
mod tests {
    use super::{bucket, check_config, cluster, group, node, repository, NamedStatement};
    use std::collections::HashSet;

    fn registry() -> Vec<NamedStatement> {
        let mut all = Vec::new();
        all.extend_from_slice(repository::ALL);
        all.extend_from_slice(bucket::ALL);
        all.extend_from_slice(group::ALL);
        all.extend_from_slice(cluster::ALL);
        all.extend_from_slice(node::ALL);
        all.push(check_config::EXPORT);
        all
    }

    #[test]
    fn statement_names_are_unique() {
        let statements = registry();
        let names: HashSet<&str> = statements.iter().map(|stmt| stmt.name).collect();
        assert_eq!(names.len(), statements.len());
    }

    #[test]
    fn node_service_loader_reads_service_id() {
        assert_eq!(node::PROPERTIES.service_column, "service_id");
        assert!(node::PROPERTIES.service.sql.contains("service_id"));
        assert_eq!(group::PROPERTIES.service_column, "service_name");
    }

    #[test]
    fn every_statement_compiles_against_schema() {
        let conn = crate::db::open_db_in_memory().unwrap();
        for stmt in registry() {
            conn.prepare(stmt.sql)
                .unwrap_or_else(|err| panic!("{} failed to prepare: {err}", stmt.name));
        }
    }
}
