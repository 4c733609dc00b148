//! Check-configuration export statement.

use super::NamedStatement;

pub const EXPORT: NamedStatement = NamedStatement {
    name: "check_config_export",
    sql: "SELECT configuration_id,
                 configuration_name,
                 check_interval,
                 repository_id,
                 bucket_id,
                 capability_id,
                 configuration_object,
                 configuration_object_type,
                 configuration_active,
                 enabled,
                 inheritance_enabled,
                 children_only,
                 external_id
          FROM check_configurations
          WHERE configuration_object = ?1
            AND is_deleted = 0
          ORDER BY configuration_name ASC, configuration_id ASC;",
};
