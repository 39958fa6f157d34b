//! Resource kinds and the composite keys used to identify them.

use crate::error::{CatalogError, CatalogResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of catalog resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResourceType {
    /// Business domain (also used for subdomains)
    Domain,
    /// Service
    Service,
    /// Event message
    Event,
    /// Command message
    Command,
    /// Query message
    Query,
    /// Channel messages travel on
    Channel,
    /// Business flow
    Flow,
    /// Data store / container
    Container,
    /// Data product
    DataProduct,
    /// Diagram
    Diagram,
    /// Person
    User,
    /// Team of users
    Team,
}

impl ResourceType {
    /// Every resource type, in report order
    pub const ALL: [Self; 12] = [
        Self::Domain,
        Self::Service,
        Self::Event,
        Self::Command,
        Self::Query,
        Self::Channel,
        Self::Flow,
        Self::Container,
        Self::DataProduct,
        Self::Diagram,
        Self::User,
        Self::Team,
    ];

    /// Resource types accepted by `export --resource`
    pub const EXPORTABLE: [Self; 5] = [
        Self::Event,
        Self::Command,
        Self::Query,
        Self::Service,
        Self::Domain,
    ];

    /// DSL keyword
    #[must_use]
    pub const fn keyword(&self) -> &'static str {
        match self {
            Self::Domain => "domain",
            Self::Service => "service",
            Self::Event => "event",
            Self::Command => "command",
            Self::Query => "query",
            Self::Channel => "channel",
            Self::Flow => "flow",
            Self::Container => "container",
            Self::DataProduct => "data-product",
            Self::Diagram => "diagram",
            Self::User => "user",
            Self::Team => "team",
        }
    }

    /// Catalog folder holding this kind of resource
    #[must_use]
    pub const fn folder(&self) -> &'static str {
        match self {
            Self::Domain => "domains",
            Self::Service => "services",
            Self::Event => "events",
            Self::Command => "commands",
            Self::Query => "queries",
            Self::Channel => "channels",
            Self::Flow => "flows",
            Self::Container => "containers",
            Self::DataProduct => "data-products",
            Self::Diagram => "diagrams",
            Self::User => "users",
            Self::Team => "teams",
        }
    }

    /// Parse a keyword, accepting the plural folder name as well
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedType` for anything else
    pub fn parse(s: &str) -> CatalogResult<Self> {
        let lower = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|t| t.keyword() == lower || t.folder() == lower)
            .ok_or_else(|| CatalogError::UnsupportedType {
                found: s.to_string(),
                expected: Self::ALL
                    .iter()
                    .map(Self::keyword)
                    .collect::<Vec<_>>()
                    .join(", "),
            })
    }

    /// Whether resources of this kind carry a version
    #[must_use]
    pub const fn is_versioned(&self) -> bool {
        !matches!(self, Self::User | Self::Team)
    }

    /// Whether this kind is a message
    #[must_use]
    pub const fn is_message(&self) -> bool {
        matches!(self, Self::Event | Self::Command | Self::Query)
    }

    /// Whether the rendered page shows a relationship graph
    #[must_use]
    pub const fn renders_node_graph(&self) -> bool {
        matches!(
            self,
            Self::Event
                | Self::Command
                | Self::Query
                | Self::Service
                | Self::Domain
                | Self::Channel
                | Self::Flow
        )
    }

    /// Position in the import report
    #[must_use]
    pub fn report_rank(&self) -> usize {
        Self::ALL.iter().position(|t| t == self).unwrap_or(Self::ALL.len())
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// The three message collections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageType {
    /// Event
    Event,
    /// Command
    Command,
    /// Query
    Query,
}

impl MessageType {
    /// Probe order used when a bare id is resolved against the catalog
    pub const PRIORITY: [Self; 3] = [Self::Event, Self::Command, Self::Query];

    /// Parse a DSL message keyword
    #[must_use]
    pub fn from_keyword(s: &str) -> Option<Self> {
        match s {
            "event" => Some(Self::Event),
            "command" => Some(Self::Command),
            "query" => Some(Self::Query),
            _ => None,
        }
    }

    /// DSL keyword
    #[must_use]
    pub const fn keyword(&self) -> &'static str {
        self.resource_type().keyword()
    }

    /// Matching resource type
    #[must_use]
    pub const fn resource_type(&self) -> ResourceType {
        match self {
            Self::Event => ResourceType::Event,
            Self::Command => ResourceType::Command,
            Self::Query => ResourceType::Query,
        }
    }
}

impl From<MessageType> for ResourceType {
    fn from(value: MessageType) -> Self {
        value.resource_type()
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// Composite identity of a resource
///
/// Displays as `type:id` when no version is set (any version / latest)
/// and as `type:id@version` otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceKey {
    /// Resource kind
    pub resource_type: ResourceType,
    /// Resource id
    pub id: String,
    /// Exact version, `None` for "any version"
    pub version: Option<String>,
}

impl ResourceKey {
    /// Key for an exact version
    #[must_use]
    pub fn exact(resource_type: ResourceType, id: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            resource_type,
            id: id.into(),
            version: Some(version.into()),
        }
    }

    /// Key matching any version of the id
    #[must_use]
    pub fn any_version(resource_type: ResourceType, id: impl Into<String>) -> Self {
        Self {
            resource_type,
            id: id.into(),
            version: None,
        }
    }

    /// Key with an optional version
    #[must_use]
    pub fn new(resource_type: ResourceType, id: impl Into<String>, version: Option<&str>) -> Self {
        Self {
            resource_type,
            id: id.into(),
            version: version.map(str::to_string),
        }
    }

    /// Drop the version
    #[must_use]
    pub fn to_any_version(&self) -> Self {
        Self::any_version(self.resource_type, self.id.clone())
    }
}

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.version {
            Some(v) => write!(f, "{}:{}@{}", self.resource_type, self.id, v),
            None => write!(f, "{}:{}", self.resource_type, self.id),
        }
    }
}
