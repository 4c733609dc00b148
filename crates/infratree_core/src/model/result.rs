//! Result envelope sent back on a request's reply sink.
//!
//! # Responsibility
//! - Echo section/action of the originating request.
//! - Carry one outcome (ok, not-found, server-error, unknown-request) and the
//!   entity list for the request's section.
//!
//! # Invariants
//! - Only the slot matching `section` is ever populated.
//! - The slot is present on ok and not-found (possibly empty) and absent on
//!   server-error and unknown-request.

use serde::{Deserialize, Serialize};

use super::entity::{Bucket, Cluster, Group, Node, Repository};
use super::request::{Action, Request, Section};

/// Outcome class of one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultStatus {
    /// Seeded state before the handler decided an outcome.
    Pending,
    Ok,
    NotFound,
    ServerError,
    UnknownRequest,
}

impl ResultStatus {
    /// Numeric code reported alongside the status.
    pub fn code(&self) -> u16 {
        match self {
            Self::Pending => 0,
            Self::Ok => 200,
            Self::NotFound => 404,
            Self::ServerError => 500,
            Self::UnknownRequest => 400,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadResult {
    pub section: Section,
    pub action: Action,
    pub code: u16,
    pub status: ResultStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repositories: Option<Vec<Repository>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub buckets: Option<Vec<Bucket>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub groups: Option<Vec<Group>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clusters: Option<Vec<Cluster>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nodes: Option<Vec<Node>>,
}

impl ReadResult {
    /// Seeds a result echoing the request's section and action.
    pub fn from_request(request: &Request) -> Self {
        Self {
            section: request.section,
            action: request.action,
            code: ResultStatus::Pending.code(),
            status: ResultStatus::Pending,
            error: None,
            repositories: None,
            buckets: None,
            groups: None,
            clusters: None,
            nodes: None,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == ResultStatus::Ok
    }

    /// Marks the result successful; the section slot is kept even if empty.
    pub fn ok(&mut self) {
        self.set_status(ResultStatus::Ok);
        self.error = None;
        self.ensure_slot();
    }

    /// Marks the object as missing; the section slot is an empty list.
    pub fn not_found(&mut self, message: impl Into<String>) {
        self.set_status(ResultStatus::NotFound);
        self.error = Some(message.into());
        self.clear_slots();
        self.ensure_slot();
    }

    /// Marks a storage or assembly failure; no entities are reported.
    pub fn server_error(&mut self, message: impl Into<String>) {
        self.set_status(ResultStatus::ServerError);
        self.error = Some(message.into());
        self.clear_slots();
    }

    /// Marks an action the receiving handler does not service.
    pub fn unknown_request(&mut self) {
        self.set_status(ResultStatus::UnknownRequest);
        self.error = Some(format!(
            "unknown requested action: {}/{}",
            self.section, self.action
        ));
        self.clear_slots();
    }

    pub fn append_repository(&mut self, repository: Repository) {
        self.repositories.get_or_insert_with(Vec::new).push(repository);
    }

    pub fn append_bucket(&mut self, bucket: Bucket) {
        self.buckets.get_or_insert_with(Vec::new).push(bucket);
    }

    pub fn append_group(&mut self, group: Group) {
        self.groups.get_or_insert_with(Vec::new).push(group);
    }

    pub fn append_cluster(&mut self, cluster: Cluster) {
        self.clusters.get_or_insert_with(Vec::new).push(cluster);
    }

    pub fn append_node(&mut self, node: Node) {
        self.nodes.get_or_insert_with(Vec::new).push(node);
    }

    /// Number of entities reported in the section slot.
    pub fn len(&self) -> usize {
        match self.section {
            Section::Repository => self.repositories.as_ref().map_or(0, Vec::len),
            Section::Bucket => self.buckets.as_ref().map_or(0, Vec::len),
            Section::Group => self.groups.as_ref().map_or(0, Vec::len),
            Section::Cluster => self.clusters.as_ref().map_or(0, Vec::len),
            Section::Node => self.nodes.as_ref().map_or(0, Vec::len),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn set_status(&mut self, status: ResultStatus) {
        self.status = status;
        self.code = status.code();
    }

    fn ensure_slot(&mut self) {
        match self.section {
            Section::Repository => {
                self.repositories.get_or_insert_with(Vec::new);
            }
            Section::Bucket => {
                self.buckets.get_or_insert_with(Vec::new);
            }
            Section::Group => {
                self.groups.get_or_insert_with(Vec::new);
            }
            Section::Cluster => {
                self.clusters.get_or_insert_with(Vec::new);
            }
            Section::Node => {
                self.nodes.get_or_insert_with(Vec::new);
            }
        }
    }

    fn clear_slots(&mut self) {
        self.repositories = None;
        self.buckets = None;
        self.groups = None;
        self.clusters = None;
        self.nodes = None;
    }
}
