//! Repository read statements.

use super::{property_statements, NamedStatement, PropertyStatements};

pub const LIST: NamedStatement = NamedStatement {
    name: "repository_list",
    sql: "SELECT repository_id, repository_name, team_id
          FROM repositories
          WHERE repository_deleted = 0
          ORDER BY repository_name ASC, repository_id ASC;",
};

pub const SHOW: NamedStatement = NamedStatement {
    name: "repository_show",
    sql: "SELECT repository_id,
                 repository_name,
                 repository_active,
                 repository_deleted,
                 team_id
          FROM repositories
          WHERE repository_id = ?1;",
};

pub const PROPERTIES: PropertyStatements = property_statements!("repository", "service_name");

pub const ALL: &[NamedStatement] = &[
    LIST,
    SHOW,
    PROPERTIES.oncall,
    PROPERTIES.service,
    PROPERTIES.system,
    PROPERTIES.custom,
];
