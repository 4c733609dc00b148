//! Node read statements.

use super::{property_statements, NamedStatement, PropertyStatements};

pub const LIST: NamedStatement = NamedStatement {
    name: "node_list",
    sql: "SELECT n.node_id AS node_id,
                 n.node_name AS node_name,
                 b.repository_id AS repository_id,
                 a.bucket_id AS bucket_id
          FROM nodes n
          LEFT JOIN node_bucket_assignment a ON a.node_id = n.node_id
          LEFT JOIN buckets b ON b.bucket_id = a.bucket_id
          WHERE n.node_deleted = 0
          ORDER BY n.node_name ASC, n.node_id ASC;",
};

pub const SHOW: NamedStatement = NamedStatement {
    name: "node_show",
    sql: "SELECT n.node_id AS node_id,
                 n.node_asset_id AS node_asset_id,
                 n.node_name AS node_name,
                 n.team_id AS team_id,
                 n.server_id AS server_id,
                 n.object_state AS object_state,
                 n.node_online AS node_online,
                 n.node_deleted AS node_deleted,
                 b.repository_id AS repository_id,
                 a.bucket_id AS bucket_id
          FROM nodes n
          LEFT JOIN node_bucket_assignment a ON a.node_id = n.node_id
          LEFT JOIN buckets b ON b.bucket_id = a.bucket_id
          WHERE n.node_id = ?1;",
};

/// Node service rows are keyed by `service_id` rather than `service_name`.
pub const PROPERTIES: PropertyStatements = property_statements!("node", "service_id");

pub const ALL: &[NamedStatement] = &[
    LIST,
    SHOW,
    PROPERTIES.oncall,
    PROPERTIES.service,
    PROPERTIES.system,
    PROPERTIES.custom,
];
