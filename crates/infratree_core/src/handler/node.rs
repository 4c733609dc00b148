//! Node read handler.

use rusqlite::Row;

use super::runtime::{EntityReader, ReadContext, ReadHandler};
use super::{HandlerError, HandlerResult};
use crate::model::entity::{Node, NodeConfig};
use crate::model::property::PropertyScope;
use crate::model::request::{Action, Request, Section};
use crate::model::result::ReadResult;
use crate::stmt::{node, NamedStatement};

pub const NODE_HANDLER_NAME: &str = "node_r";

#[derive(Debug, Clone, Copy, Default)]
pub struct NodeRead;

/// Builds the node handler with a bounded inbox.
pub fn node_handler(inbox_depth: usize) -> ReadHandler<NodeRead> {
    ReadHandler::new(NodeRead, inbox_depth)
}

impl EntityReader for NodeRead {
    fn section(&self) -> Section {
        Section::Node
    }

    fn handler_name(&self) -> String {
        NODE_HANDLER_NAME.to_string()
    }

    fn actions(&self) -> &'static [Action] {
        &[Action::List, Action::Show, Action::Search]
    }

    fn statements(&self) -> &'static [NamedStatement] {
        node::ALL
    }

    fn list(
        &self,
        ctx: &ReadContext<'_>,
        _request: &Request,
        result: &mut ReadResult,
    ) -> HandlerResult<()> {
        let nodes = ctx.collect_rows(node::LIST, [], |row| {
            Ok(Node {
                id: row.get("node_id")?,
                name: row.get("node_name")?,
                config: parse_node_config(row)?,
                ..Node::default()
            })
        })?;
        for entry in nodes {
            result.append_node(entry);
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
        let mut found = ctx.query_one(node::SHOW, id, |row| {
            let asset_id: i64 = row.get("node_asset_id")?;
            let asset_id = u64::try_from(asset_id).map_err(|_| {
                HandlerError::InvalidData(format!(
                    "invalid asset id `{asset_id}` in nodes.node_asset_id"
                ))
            })?;
            Ok(Node {
                id: row.get("node_id")?,
                asset_id: Some(asset_id),
                name: row.get("node_name")?,
                team_id: row.get("team_id")?,
                server_id: row.get("server_id")?,
                state: row.get("object_state")?,
                is_online: Some(row.get("node_online")?),
                is_deleted: Some(row.get("node_deleted")?),
                config: parse_node_config(row)?,
                properties: None,
                details: None,
            })
        })?;

        // Unassigned nodes carry no scope; their properties echo none.
        let scope = match &found.config {
            Some(config) => PropertyScope::repository_and_bucket(
                config.repository_id.as_str(),
                config.bucket_id.as_str(),
            ),
            None => PropertyScope::default(),
        };
        found.properties = ctx.load_properties(&node::PROPERTIES, scope, &found.id)?;
        found.details = ctx.load_details(&found.id)?;

        result.append_node(found);
        Ok(())
    }
}

fn parse_node_config(row: &Row<'_>) -> rusqlite::Result<Option<NodeConfig>> {
    let repository_id: Option<String> = row.get("repository_id")?;
    let bucket_id: Option<String> = row.get("bucket_id")?;
    Ok(match (repository_id, bucket_id) {
        (Some(repository_id), Some(bucket_id)) => Some(NodeConfig {
            repository_id,
            bucket_id,
        }),
        _ => None,
    })
}
