//! Property decoration model.
//!
//! # Responsibility
//! - Represent the four property flavors attached to tree objects.
//! - Serialize the flavor as a `type` tag with its payload inline.
//!
//! # Invariants
//! - A property carries exactly one payload, and it matches its `type` tag.
//! - Scope ids are echoed from the owning object, never rewritten.

use serde::{Deserialize, Serialize};

/// Property flavor, in the order loaders run for one object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyKind {
    Oncall,
    Service,
    System,
    Custom,
}

impl PropertyKind {
    /// Loader order used when decorating an object.
    pub const ALL: [PropertyKind; 4] = [
        PropertyKind::Oncall,
        PropertyKind::Service,
        PropertyKind::System,
        PropertyKind::Custom,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Oncall => "oncall",
            Self::Service => "service",
            Self::System => "system",
            Self::Custom => "custom",
        }
    }
}

/// Owning scope echoed on every property.
///
/// Group and cluster properties carry `bucket_id`, repository properties
/// carry `repository_id`, bucket and node properties carry both.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyScope {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repository_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bucket_id: Option<String>,
}

impl PropertyScope {
    pub fn repository(repository_id: impl Into<String>) -> Self {
        Self {
            repository_id: Some(repository_id.into()),
            bucket_id: None,
        }
    }

    pub fn bucket(bucket_id: impl Into<String>) -> Self {
        Self {
            repository_id: None,
            bucket_id: Some(bucket_id.into()),
        }
    }

    pub fn repository_and_bucket(
        repository_id: impl Into<String>,
        bucket_id: impl Into<String>,
    ) -> Self {
        Self {
            repository_id: Some(repository_id.into()),
            bucket_id: Some(bucket_id.into()),
        }
    }
}

/// Fields shared by all property flavors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyHeader {
    /// Local instantiation of the property on this object.
    pub instance_id: String,
    /// Ancestor instance the property was inherited from.
    pub source_instance_id: String,
    /// Monitoring perspective the property applies under.
    pub view: String,
    #[serde(flatten)]
    pub scope: PropertyScope,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OncallProperty {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceProperty {
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemProperty {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomProperty {
    pub id: String,
    pub name: String,
    pub value: String,
}

/// One property attached to a tree object.
///
/// Serialized as `{"type": "<kind>", <header fields>, "<kind>": {payload}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Property {
    Oncall {
        #[serde(flatten)]
        header: PropertyHeader,
        oncall: OncallProperty,
    },
    Service {
        #[serde(flatten)]
        header: PropertyHeader,
        service: ServiceProperty,
    },
    System {
        #[serde(flatten)]
        header: PropertyHeader,
        system: SystemProperty,
    },
    Custom {
        #[serde(flatten)]
        header: PropertyHeader,
        custom: CustomProperty,
    },
}

impl Property {
    pub fn kind(&self) -> PropertyKind {
        match self {
            Self::Oncall { .. } => PropertyKind::Oncall,
            Self::Service { .. } => PropertyKind::Service,
            Self::System { .. } => PropertyKind::System,
            Self::Custom { .. } => PropertyKind::Custom,
        }
    }

    pub fn header(&self) -> &PropertyHeader {
        match self {
            Self::Oncall { header, .. }
            | Self::Service { header, .. }
            | Self::System { header, .. }
            | Self::Custom { header, .. } => header,
        }
    }
}
