//! Group read handler.
//!
//! Member listing runs three independent queries (groups, clusters, nodes);
//! each collection is reported only when it has members.

use super::runtime::{EntityReader, ReadContext, ReadHandler};
use super::HandlerResult;
use crate::model::entity::{non_empty, Cluster, Group, Node};
use crate::model::property::PropertyScope;
use crate::model::request::{Action, Request, Section};
use crate::model::result::ReadResult;
use crate::stmt::{group, NamedStatement};

pub const GROUP_HANDLER_NAME: &str = "group_r";

#[derive(Debug, Clone, Copy, Default)]
pub struct GroupRead;

/// Builds the group handler with a bounded inbox.
pub fn group_handler(inbox_depth: usize) -> ReadHandler<GroupRead> {
    ReadHandler::new(GroupRead, inbox_depth)
}

impl EntityReader for GroupRead {
    fn section(&self) -> Section {
        Section::Group
    }

    fn handler_name(&self) -> String {
        GROUP_HANDLER_NAME.to_string()
    }

    fn actions(&self) -> &'static [Action] {
        &[
            Action::List,
            Action::Show,
            Action::Search,
            Action::MemberList,
        ]
    }

    fn statements(&self) -> &'static [NamedStatement] {
        group::ALL
    }

    fn list(
        &self,
        ctx: &ReadContext<'_>,
        _request: &Request,
        result: &mut ReadResult,
    ) -> HandlerResult<()> {
        let groups = ctx.collect_rows(group::LIST, [], |row| {
            Ok(Group {
                id: row.get("group_id")?,
                name: row.get("group_name")?,
                bucket_id: row.get("bucket_id")?,
                ..Group::default()
            })
        })?;
        for entry in groups {
            result.append_group(entry);
        }
        Ok(())
    }

    fn show(
        &self,
        ctx: &ReadContext<'_>,
        request: &Request,
        result: &mut ReadResult,
    ) -> HandlerResult<()> {
        let id = request.object_id().unwrap_or_default();
        let mut found = ctx.query_one(group::SHOW, id, |row| {
            Ok(Group {
                id: row.get("group_id")?,
                name: row.get("group_name")?,
                bucket_id: row.get("bucket_id")?,
                object_state: row.get("object_state")?,
                team_id: row.get("team_id")?,
                ..Group::default()
            })
        })?;

        let scope = PropertyScope::bucket(found.bucket_id.as_str());
        found.properties = ctx.load_properties(&group::PROPERTIES, scope, &found.id)?;
        found.details = ctx.load_details(&found.id)?;

        result.append_group(found);
        Ok(())
    }

    fn member_list(
        &self,
        ctx: &ReadContext<'_>,
        request: &Request,
        result: &mut ReadResult,
    ) -> HandlerResult<()> {
        let id = request.object_id().unwrap_or_default();
        let mut group_name: Option<String> = None;

        let member_groups = ctx.collect_rows(group::MEMBER_GROUPS, [id], |row| {
            group_name.get_or_insert(row.get("group_name")?);
            Ok(Group {
                id: row.get("member_group_id")?,
                name: row.get("member_group_name")?,
                ..Group::default()
            })
        })?;

        let member_clusters = ctx.collect_rows(group::MEMBER_CLUSTERS, [id], |row| {
            group_name.get_or_insert(row.get("group_name")?);
            Ok(Cluster {
                id: row.get("member_cluster_id")?,
                name: row.get("member_cluster_name")?,
                ..Cluster::default()
            })
        })?;

        let member_nodes = ctx.collect_rows(group::MEMBER_NODES, [id], |row| {
            group_name.get_or_insert(row.get("group_name")?);
            Ok(Node::member(
                row.get::<_, String>("member_node_id")?,
                row.get::<_, String>("member_node_name")?,
            ))
        })?;

        result.append_group(Group {
            id: id.to_string(),
            name: group_name.unwrap_or_default(),
            member_groups: non_empty(member_groups),
            member_clusters: non_empty(member_clusters),
            member_nodes: non_empty(member_nodes),
            ..Group::default()
        });
        Ok(())
    }
}
