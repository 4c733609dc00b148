//! Repository read handler.

use super::runtime::{EntityReader, ReadContext, ReadHandler};
use super::HandlerResult;
use crate::model::entity::Repository;
use crate::model::property::PropertyScope;
use crate::model::request::{Action, Request, Section};
use crate::model::result::ReadResult;
use crate::stmt::{repository, NamedStatement};

pub const REPOSITORY_HANDLER_NAME: &str = "repository_r";

#[derive(Debug, Clone, Copy, Default)]
pub struct RepositoryRead;

/// Builds the repository handler with a bounded inbox.
pub fn repository_handler(inbox_depth: usize) -> ReadHandler<RepositoryRead> {
    ReadHandler::new(RepositoryRead, inbox_depth)
}

impl EntityReader for RepositoryRead {
    fn section(&self) -> Section {
        Section::Repository
    }

    fn handler_name(&self) -> String {
        REPOSITORY_HANDLER_NAME.to_string()
    }

    fn actions(&self) -> &'static [Action] {
        &[Action::List, Action::Show, Action::Search]
    }

    fn statements(&self) -> &'static [NamedStatement] {
        repository::ALL
    }

    fn list(
        &self,
        ctx: &ReadContext<'_>,
        _request: &Request,
        result: &mut ReadResult,
    ) -> HandlerResult<()> {
        let repositories = ctx.collect_rows(repository::LIST, [], |row| {
            Ok(Repository {
                id: row.get("repository_id")?,
                name: row.get("repository_name")?,
                team_id: row.get("team_id")?,
                ..Repository::default()
            })
        })?;
        for entry in repositories {
            result.append_repository(entry);
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
        let mut repo = ctx.query_one(repository::SHOW, id, |row| {
            Ok(Repository {
                id: row.get("repository_id")?,
                name: row.get("repository_name")?,
                team_id: row.get("team_id")?,
                is_active: Some(row.get("repository_active")?),
                is_deleted: Some(row.get("repository_deleted")?),
                properties: None,
                details: None,
            })
        })?;

        repo.properties = ctx.load_properties(
            &repository::PROPERTIES,
            PropertyScope::repository(repo.id.as_str()),
            &repo.id,
        )?;
        repo.details = ctx.load_details(&repo.id)?;

        result.append_repository(repo);
        Ok(())
    }
}
