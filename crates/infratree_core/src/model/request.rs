//! Request envelope delivered to handler inboxes.
//!
//! # Responsibility
//! - Identify the target section/action and the requesting user.
//! - Carry the single-shot reply sink and the entity slots filled by routing.
//!
//! # Invariants
//! - Every request owns exactly one reply sink; the request is answered once.
//! - Handlers never close the reply sink themselves.

use std::fmt::{Display, Formatter};

use crossbeam_channel::{bounded, Receiver, Sender};
use serde::{Deserialize, Serialize};

use super::entity::{Bucket, Cluster, Group, Node, Repository};
use super::result::ReadResult;

/// Top-level namespace of a request; identifies the entity kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    Repository,
    Bucket,
    Group,
    Cluster,
    Node,
}

impl Section {
    pub const ALL: [Section; 5] = [
        Section::Repository,
        Section::Bucket,
        Section::Group,
        Section::Cluster,
        Section::Node,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Repository => "repository",
            Self::Bucket => "bucket",
            Self::Group => "group",
            Self::Cluster => "cluster",
            Self::Node => "node",
        }
    }

    /// Parses a section name (case-insensitive).
    pub fn parse(value: &str) -> Option<Self> {
        let normalized = value.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|section| section.as_str() == normalized)
    }
}

impl Display for Section {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Verb within a section.
///
/// The write verbs exist on the wire but are never serviced by read handlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Action {
    List,
    Show,
    Search,
    MemberList,
    Add,
    Remove,
    MemberAssign,
    MemberRemove,
}

impl Action {
    pub const ALL: [Action; 8] = [
        Action::List,
        Action::Show,
        Action::Search,
        Action::MemberList,
        Action::Add,
        Action::Remove,
        Action::MemberAssign,
        Action::MemberRemove,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::List => "list",
            Self::Show => "show",
            Self::Search => "search",
            Self::MemberList => "member-list",
            Self::Add => "add",
            Self::Remove => "remove",
            Self::MemberAssign => "member-assign",
            Self::MemberRemove => "member-remove",
        }
    }

    /// Parses an action name (case-insensitive, `_` accepted for `-`).
    pub fn parse(value: &str) -> Option<Self> {
        let normalized = value.trim().to_ascii_lowercase().replace('_', "-");
        Self::ALL
            .into_iter()
            .find(|action| action.as_str() == normalized)
    }
}

impl Display for Action {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sending half of the single-shot reply channel.
pub type ReplySender = Sender<ReadResult>;
/// Receiving half held by the requester.
pub type ReplyReceiver = Receiver<ReadResult>;

/// One read request routed to a handler inbox.
#[derive(Debug, Clone)]
pub struct Request {
    pub section: Section,
    pub action: Action,
    pub auth_user: String,
    pub reply: ReplySender,
    pub repository: Option<Repository>,
    pub bucket: Option<Bucket>,
    pub group: Option<Group>,
    pub cluster: Option<Cluster>,
    pub node: Option<Node>,
}

impl Request {
    /// Creates a request together with the receiver its result arrives on.
    pub fn new(
        section: Section,
        action: Action,
        auth_user: impl Into<String>,
    ) -> (Self, ReplyReceiver) {
        let (reply, receiver) = bounded(1);
        let request = Self {
            section,
            action,
            auth_user: auth_user.into(),
            reply,
            repository: None,
            bucket: None,
            group: None,
            cluster: None,
            node: None,
        };
        (request, receiver)
    }

    /// Fills the entity slot of this request's section with a bare id.
    pub fn with_object_id(mut self, id: impl Into<String>) -> Self {
        let id = id.into();
        match self.section {
            Section::Repository => self.repository = Some(Repository::with_id(id)),
            Section::Bucket => self.bucket = Some(Bucket::with_id(id)),
            Section::Group => self.group = Some(Group::with_id(id)),
            Section::Cluster => self.cluster = Some(Cluster::with_id(id)),
            Section::Node => self.node = Some(Node::with_id(id)),
        }
        self
    }

    pub fn with_bucket(mut self, bucket: Bucket) -> Self {
        self.bucket = Some(bucket);
        self
    }

    pub fn with_cluster(mut self, cluster: Cluster) -> Self {
        self.cluster = Some(cluster);
        self
    }

    /// Id from the entity slot matching the request's section.
    pub fn object_id(&self) -> Option<&str> {
        let id = match self.section {
            Section::Repository => self.repository.as_ref().map(|r| r.id.as_str()),
            Section::Bucket => self.bucket.as_ref().map(|b| b.id.as_str()),
            Section::Group => self.group.as_ref().map(|g| g.id.as_str()),
            Section::Cluster => self.cluster.as_ref().map(|c| c.id.as_str()),
            Section::Node => self.node.as_ref().map(|n| n.id.as_str()),
        };
        id.filter(|value| !value.is_empty())
    }

    /// Parent bucket id used to scope cluster listings.
    pub fn parent_bucket_id(&self) -> &str {
        self.cluster
            .as_ref()
            .map(|cluster| cluster.bucket_id.as_str())
            .filter(|value| !value.is_empty())
            .or_else(|| self.bucket.as_ref().map(|bucket| bucket.id.as_str()))
            .unwrap_or_default()
    }

    /// Parent repository id used to scope bucket listings.
    pub fn parent_repository_id(&self) -> &str {
        self.bucket
            .as_ref()
            .map(|bucket| bucket.repository_id.as_str())
            .filter(|value| !value.is_empty())
            .or_else(|| self.repository.as_ref().map(|repo| repo.id.as_str()))
            .unwrap_or_default()
    }

    /// Delivers the result on the reply sink.
    ///
    /// Returns `false` when the requester has gone away; that is not an error
    /// for the handler.
    pub fn reply(&self, result: ReadResult) -> bool {
        self.reply.send(result).is_ok()
    }
}
