//! Bucket read statements.

use super::{property_statements, NamedStatement, PropertyStatements};

/// Binds the parent repository id as `?1`; an empty id lists every bucket.
pub const LIST: NamedStatement = NamedStatement {
    name: "bucket_list",
    sql: "SELECT bucket_id, bucket_name, repository_id
          FROM buckets
          WHERE bucket_deleted = 0
            AND (?1 = '' OR repository_id = ?1)
          ORDER BY bucket_name ASC, bucket_id ASC;",
};

pub const SHOW: NamedStatement = NamedStatement {
    name: "bucket_show",
    sql: "SELECT bucket_id,
                 bucket_name,
                 bucket_frozen,
                 bucket_deleted,
                 repository_id,
                 environment,
                 team_id
          FROM buckets
          WHERE bucket_id = ?1;",
};

pub const PROPERTIES: PropertyStatements = property_statements!("bucket", "service_name");

pub const ALL: &[NamedStatement] = &[
    LIST,
    SHOW,
    PROPERTIES.oncall,
    PROPERTIES.service,
    PROPERTIES.system,
    PROPERTIES.custom,
];
