//! Cluster read handler.
//!
//! The cluster handler registers under a generated `<token>_r` name; the token
//! is drawn once per process.

use once_cell::sync::Lazy;
use rusqlite::params;
use uuid::Uuid;

use super::runtime::{EntityReader, ReadContext, ReadHandler};
use super::HandlerResult;
use crate::model::entity::{non_empty, Cluster, Node};
use crate::model::property::PropertyScope;
use crate::model::request::{Action, Request, Section};
use crate::model::result::ReadResult;
use crate::stmt::{cluster, NamedStatement};

static CLUSTER_HANDLER_NAME: Lazy<String> =
    Lazy::new(|| format!("{}_r", Uuid::new_v4().simple()));

/// Per-process name of the cluster handler.
pub fn cluster_handler_name() -> &'static str {
    CLUSTER_HANDLER_NAME.as_str()
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ClusterRead;

/// Builds the cluster handler with a bounded inbox.
pub fn cluster_handler(inbox_depth: usize) -> ReadHandler<ClusterRead> {
    ReadHandler::new(ClusterRead, inbox_depth)
}

impl EntityReader for ClusterRead {
    fn section(&self) -> Section {
        Section::Cluster
    }

    fn handler_name(&self) -> String {
        cluster_handler_name().to_string()
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
        cluster::ALL
    }

    /// Lists clusters of one bucket that the requesting user may see.
    fn list(
        &self,
        ctx: &ReadContext<'_>,
        request: &Request,
        result: &mut ReadResult,
    ) -> HandlerResult<()> {
        let clusters = ctx.collect_rows(
            cluster::LIST,
            params![
                request.section.as_str(),
                request.action.as_str(),
                request.auth_user.as_str(),
                request.parent_bucket_id(),
            ],
            |row| {
                Ok(Cluster {
                    id: row.get("cluster_id")?,
                    name: row.get("cluster_name")?,
                    bucket_id: row.get("bucket_id")?,
                    ..Cluster::default()
                })
            },
        )?;
        for entry in clusters {
            result.append_cluster(entry);
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
        let mut found = ctx.query_one(cluster::SHOW, id, |row| {
            Ok(Cluster {
                id: row.get("cluster_id")?,
                name: row.get("cluster_name")?,
                bucket_id: row.get("bucket_id")?,
                object_state: row.get("object_state")?,
                team_id: row.get("team_id")?,
                ..Cluster::default()
            })
        })?;

        let scope = PropertyScope::bucket(found.bucket_id.as_str());
        found.properties = ctx.load_properties(&cluster::PROPERTIES, scope, &found.id)?;
        found.details = ctx.load_details(&found.id)?;

        result.append_cluster(found);
        Ok(())
    }

    fn member_list(
        &self,
        ctx: &ReadContext<'_>,
        request: &Request,
        result: &mut ReadResult,
    ) -> HandlerResult<()> {
        let id = request.object_id().unwrap_or_default();
        let mut cluster_name: Option<String> = None;

        let members = ctx.collect_rows(cluster::MEMBER_LIST, [id], |row| {
            // Every row repeats the owning cluster's name.
            cluster_name.get_or_insert(row.get("cluster_name")?);
            Ok(Node::member(
                row.get::<_, String>("member_node_id")?,
                row.get::<_, String>("member_node_name")?,
            ))
        })?;

        result.append_cluster(Cluster {
            id: id.to_string(),
            name: cluster_name.unwrap_or_default(),
            members: non_empty(members),
            ..Cluster::default()
        });
        Ok(())
    }
}
