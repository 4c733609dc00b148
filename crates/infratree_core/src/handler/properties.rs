//! Property loading shared by all read handlers.
//!
//! # Responsibility
//! - Enumerate oncall, service, system and custom property rows of one owner.
//! - Stamp every property with the owner's scope.
//!
//! # Invariants
//! - Loaders run in the fixed order oncall, service, system, custom.
//! - Each loader only builds the payload of its own kind.
//! - Errors are returned unchanged; nothing is appended after a failure.

use rusqlite::Row;

use super::runtime::ReadContext;
use super::HandlerResult;
use crate::model::property::{
    CustomProperty, OncallProperty, Property, PropertyHeader, PropertyKind, PropertyScope,
    ServiceProperty, SystemProperty,
};
use crate::stmt::PropertyStatements;

/// Four-variant property enumerator bound to one owner kind.
pub struct PropertyLoader<'ctx, 'conn> {
    ctx: &'ctx ReadContext<'conn>,
    statements: &'ctx PropertyStatements,
    scope: PropertyScope,
}

impl<'ctx, 'conn> PropertyLoader<'ctx, 'conn> {
    pub fn new(
        ctx: &'ctx ReadContext<'conn>,
        statements: &'ctx PropertyStatements,
        scope: PropertyScope,
    ) -> Self {
        Self {
            ctx,
            statements,
            scope,
        }
    }

    /// Appends all four property kinds of `owner_id` to `out`.
    pub fn load_all(&self, owner_id: &str, out: &mut Vec<Property>) -> HandlerResult<()> {
        for kind in PropertyKind::ALL {
            self.load(kind, owner_id, out)?;
        }
        Ok(())
    }

    /// Appends the properties of one kind.
    pub fn load(
        &self,
        kind: PropertyKind,
        owner_id: &str,
        out: &mut Vec<Property>,
    ) -> HandlerResult<()> {
        let loaded = match kind {
            PropertyKind::Oncall => self.oncall(owner_id)?,
            PropertyKind::Service => self.service(owner_id)?,
            PropertyKind::System => self.system(owner_id)?,
            PropertyKind::Custom => self.custom(owner_id)?,
        };
        out.extend(loaded);
        Ok(())
    }

    fn oncall(&self, owner_id: &str) -> HandlerResult<Vec<Property>> {
        self.ctx
            .collect_rows(self.statements.oncall, [owner_id], |row| {
                Ok(Property::Oncall {
                    header: self.header(row)?,
                    oncall: OncallProperty {
                        id: row.get("oncall_id")?,
                        name: row.get("oncall_name")?,
                    },
                })
            })
    }

    fn service(&self, owner_id: &str) -> HandlerResult<Vec<Property>> {
        let column = self.statements.service_column;
        self.ctx
            .collect_rows(self.statements.service, [owner_id], |row| {
                Ok(Property::Service {
                    header: self.header(row)?,
                    service: ServiceProperty {
                        name: row.get(column)?,
                    },
                })
            })
    }

    fn system(&self, owner_id: &str) -> HandlerResult<Vec<Property>> {
        self.ctx
            .collect_rows(self.statements.system, [owner_id], |row| {
                Ok(Property::System {
                    header: self.header(row)?,
                    system: SystemProperty {
                        name: row.get("name")?,
                        value: row.get("value")?,
                    },
                })
            })
    }

    fn custom(&self, owner_id: &str) -> HandlerResult<Vec<Property>> {
        self.ctx
            .collect_rows(self.statements.custom, [owner_id], |row| {
                Ok(Property::Custom {
                    header: self.header(row)?,
                    custom: CustomProperty {
                        id: row.get("custom_id")?,
                        name: row.get("name")?,
                        value: row.get("value")?,
                    },
                })
            })
    }

    fn header(&self, row: &Row<'_>) -> rusqlite::Result<PropertyHeader> {
        Ok(PropertyHeader {
            instance_id: row.get("instance_id")?,
            source_instance_id: row.get("source_instance_id")?,
            view: row.get("view_name")?,
            scope: self.scope.clone(),
        })
    }
}
