//! Cluster read statements.

use super::{property_statements, NamedStatement, PropertyStatements};

/// Binds `?1` section, `?2` action, `?3` user and `?4` bucket id.
///
/// Only clusters the user holds a matching grant for are returned; a grant
/// without a bucket applies to every bucket.
pub const LIST: NamedStatement = NamedStatement {
    name: "cluster_list",
    sql: "SELECT c.cluster_id AS cluster_id,
                 c.cluster_name AS cluster_name,
                 c.bucket_id AS bucket_id
          FROM clusters c
          WHERE c.bucket_id = ?4
            AND EXISTS (
              SELECT 1
              FROM grants g
              WHERE g.user_name = ?3
                AND g.section = ?1
                AND g.action = ?2
                AND (g.bucket_id IS NULL OR g.bucket_id = c.bucket_id)
            )
          ORDER BY c.cluster_name ASC, c.cluster_id ASC;",
};

pub const SHOW: NamedStatement = NamedStatement {
    name: "cluster_show",
    sql: "SELECT cluster_id,
                 cluster_name,
                 bucket_id,
                 object_state,
                 team_id
          FROM clusters
          WHERE cluster_id = ?1;",
};

pub const MEMBER_LIST: NamedStatement = NamedStatement {
    name: "cluster_member_list",
    sql: "SELECT m.node_id AS member_node_id,
                 n.node_name AS member_node_name,
                 c.cluster_name AS cluster_name
          FROM cluster_membership m
          JOIN nodes n ON n.node_id = m.node_id
          JOIN clusters c ON c.cluster_id = m.cluster_id
          WHERE m.cluster_id = ?1
          ORDER BY n.node_name ASC, m.node_id ASC;",
};

pub const PROPERTIES: PropertyStatements = property_statements!("cluster", "service_name");

pub const ALL: &[NamedStatement] = &[
    LIST,
    SHOW,
    MEMBER_LIST,
    PROPERTIES.oncall,
    PROPERTIES.service,
    PROPERTIES.system,
    PROPERTIES.custom,
];
