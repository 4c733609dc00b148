//! Bucket read handler.

use super::runtime::{EntityReader, ReadContext, ReadHandler};
use super::HandlerResult;
use crate::model::entity::Bucket;
use crate::model::property::PropertyScope;
use crate::model::request::{Action, Request, Section};
use crate::model::result::ReadResult;
use crate::stmt::{bucket, NamedStatement};

pub const BUCKET_HANDLER_NAME: &str = "bucket_r";

#[derive(Debug, Clone, Copy, Default)]
pub struct BucketRead;

/// Builds the bucket handler with a bounded inbox.
pub fn bucket_handler(inbox_depth: usize) -> ReadHandler<BucketRead> {
    ReadHandler::new(BucketRead, inbox_depth)
}

impl EntityReader for BucketRead {
    fn section(&self) -> Section {
        Section::Bucket
    }

    fn handler_name(&self) -> String {
        BUCKET_HANDLER_NAME.to_string()
    }

    fn actions(&self) -> &'static [Action] {
        &[Action::List, Action::Show, Action::Search]
    }

    fn statements(&self) -> &'static [NamedStatement] {
        bucket::ALL
    }

    /// Lists buckets of the requested repository, or every bucket when the
    /// request names none.
    fn list(
        &self,
        ctx: &ReadContext<'_>,
        request: &Request,
        result: &mut ReadResult,
    ) -> HandlerResult<()> {
        let buckets = ctx.collect_rows(bucket::LIST, [request.parent_repository_id()], |row| {
            Ok(Bucket {
                id: row.get("bucket_id")?,
                name: row.get("bucket_name")?,
                repository_id: row.get("repository_id")?,
                ..Bucket::default()
            })
        })?;
        for entry in buckets {
            result.append_bucket(entry);
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
        let mut found = ctx.query_one(bucket::SHOW, id, |row| {
            Ok(Bucket {
                id: row.get("bucket_id")?,
                name: row.get("bucket_name")?,
                repository_id: row.get("repository_id")?,
                environment: row.get("environment")?,
                team_id: row.get("team_id")?,
                is_deleted: Some(row.get("bucket_deleted")?),
                is_frozen: Some(row.get("bucket_frozen")?),
                properties: None,
                details: None,
            })
        })?;

        let scope =
            PropertyScope::repository_and_bucket(found.repository_id.as_str(), found.id.as_str());
        found.properties = ctx.load_properties(&bucket::PROPERTIES, scope, &found.id)?;
        found.details = ctx.load_details(&found.id)?;

        result.append_bucket(found);
        Ok(())
    }
}
