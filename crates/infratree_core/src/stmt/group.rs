//! Group read statements.

use super::{property_statements, NamedStatement, PropertyStatements};

pub const LIST: NamedStatement = NamedStatement {
    name: "group_list",
    sql: "SELECT group_id, group_name, bucket_id
          FROM object_groups
          ORDER BY group_name ASC, group_id ASC;",
};

pub const SHOW: NamedStatement = NamedStatement {
    name: "group_show",
    sql: "SELECT group_id,
                 bucket_id,
                 group_name,
                 object_state,
                 team_id
          FROM object_groups
          WHERE group_id = ?1;",
};

pub const MEMBER_GROUPS: NamedStatement = NamedStatement {
    name: "group_member_groups",
    sql: "SELECT m.child_group_id AS member_group_id,
                 c.group_name AS member_group_name,
                 p.group_name AS group_name
          FROM group_membership_groups m
          JOIN object_groups c ON c.group_id = m.child_group_id
          JOIN object_groups p ON p.group_id = m.group_id
          WHERE m.group_id = ?1
          ORDER BY c.group_name ASC, m.child_group_id ASC;",
};

pub const MEMBER_CLUSTERS: NamedStatement = NamedStatement {
    name: "group_member_clusters",
    sql: "SELECT m.child_cluster_id AS member_cluster_id,
                 c.cluster_name AS member_cluster_name,
                 p.group_name AS group_name
          FROM group_membership_clusters m
          JOIN clusters c ON c.cluster_id = m.child_cluster_id
          JOIN object_groups p ON p.group_id = m.group_id
          WHERE m.group_id = ?1
          ORDER BY c.cluster_name ASC, m.child_cluster_id ASC;",
};

pub const MEMBER_NODES: NamedStatement = NamedStatement {
    name: "group_member_nodes",
    sql: "SELECT m.child_node_id AS member_node_id,
                 n.node_name AS member_node_name,
                 p.group_name AS group_name
          FROM group_membership_nodes m
          JOIN nodes n ON n.node_id = m.child_node_id
          JOIN object_groups p ON p.group_id = m.group_id
          WHERE m.group_id = ?1
          ORDER BY n.node_name ASC, m.child_node_id ASC;",
};

pub const PROPERTIES: PropertyStatements = property_statements!("group", "service_name");

pub const ALL: &[NamedStatement] = &[
    LIST,
    SHOW,
    MEMBER_GROUPS,
    MEMBER_CLUSTERS,
    MEMBER_NODES,
    PROPERTIES.oncall,
    PROPERTIES.service,
    PROPERTIES.system,
    PROPERTIES.custom,
];
