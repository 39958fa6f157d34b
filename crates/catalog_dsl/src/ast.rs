//! Syntax tree of a DSL document.
//!
//! Every node kind is its own enum variant so walkers over the tree are
//! checked for exhaustiveness. A definition whose body is `None` was written
//! bare (`service OrderService`) and acts as a reference.

use catalog_core::MessageType;
use serde::Serialize;

/// A parsed document
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Program {
    /// Top-level definitions in source order
    pub definitions: Vec<Definition>,
}

impl Program {
    /// Create an empty program
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append every definition of `other`
    pub fn extend(&mut self, other: Program) {
        self.definitions.extend(other.definitions);
    }
}

/// `id` or `id@version`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Reference {
    /// Target id
    pub id: String,
    /// Explicit version
    pub version: Option<String>,
}

impl Reference {
    /// Create a reference
    #[must_use]
    pub fn new(id: impl Into<String>, version: Option<&str>) -> Self {
        Self {
            id: id.into(),
            version: version.map(str::to_string),
        }
    }
}

/// Top-level definition
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Definition {
    /// `domain X { ... }`
    Domain(DomainDef),
    /// `service X { ... }`
    Service(ServiceDef),
    /// `visualizer X { ... }`, inert for compilation
    Visualizer(VisualizerDef),
    /// `channel X { ... }`
    Channel(FieldDef),
    /// `container X { ... }`
    Container(FieldDef),
    /// `event|command|query X { ... }`
    Message(MessageDef),
    /// `team X { ... }`
    Team(FieldDef),
    /// `user X { ... }`
    User(FieldDef),
    /// `data-product X { ... }`
    DataProduct(FieldDef),
    /// `diagram X { ... }`
    Diagram(FieldDef),
}

/// Domain or subdomain
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DomainDef {
    /// Name and optional version written in the header
    pub reference: Reference,
    /// Body items, `None` when written bare
    pub body: Option<Vec<DomainItem>>,
}

/// Item allowed inside a domain body
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum DomainItem {
    /// `key value`
    Field(Field),
    /// Nested service, defined or referenced
    Service(ServiceDef),
    /// `subdomain X { ... }`, defined or referenced
    Subdomain(DomainDef),
    /// Domain-level `sends`
    Sends(MessageStmt),
    /// Domain-level `receives`
    Receives(MessageStmt),
    /// Channel defined inside the domain
    Channel(FieldDef),
    /// Container defined inside the domain
    Container(FieldDef),
}

/// Service definition
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServiceDef {
    /// Name and optional version written in the header
    pub reference: Reference,
    /// Statements, `None` when written bare
    pub body: Option<Vec<Statement>>,
}

impl ServiceDef {
    /// Version declared by a `version` statement
    #[must_use]
    pub fn declared_version(&self) -> Option<&str> {
        self.body.iter().flatten().find_map(|s| match s {
            Statement::Version(v) => Some(v.as_str()),
            _ => None,
        })
    }
}

/// Statement inside a service body
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Statement {
    /// `version 1.0.0`
    Version(String),
    /// `key value`
    Field(Field),
    /// `sends ...`
    Sends(MessageStmt),
    /// `receives ...`
    Receives(MessageStmt),
    /// `writes-to container X`
    WritesTo(Reference),
    /// `reads-from container X`
    ReadsFrom(Reference),
}

/// `sends|receives <type> <id>[@v] [{ ... }] [to|from <channels>]`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MessageStmt {
    /// Message collection
    pub message_type: MessageType,
    /// Message id and optional version
    pub reference: Reference,
    /// Inline definition of the message
    pub body: Option<Vec<Field>>,
    /// Attached channels (`to` for sends, `from` for receives)
    pub channels: Vec<ChannelAttachment>,
}

/// Channel listed after `to`/`from`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChannelAttachment {
    /// Channel id and optional version
    pub reference: Reference,
    /// `delivery <mode>`
    pub delivery_mode: Option<String>,
}

/// Message definition
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MessageDef {
    /// Event, command or query
    pub message_type: MessageType,
    /// Name and fields
    pub def: FieldDef,
}

/// Definition consisting of a flat field bag
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldDef {
    /// Name and optional version written in the header
    pub reference: Reference,
    /// Fields, `None` when written bare
    pub body: Option<Vec<Field>>,
}

impl FieldDef {
    /// Fields of the body, empty when bare
    pub fn fields(&self) -> impl Iterator<Item = &Field> {
        self.body.iter().flatten()
    }
}

/// Visualizer definition
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VisualizerDef {
    /// Visualizer name
    pub name: String,
    /// Own fields (`name "..."`)
    pub fields: Vec<Field>,
    /// Wrapped definitions
    pub definitions: Vec<Definition>,
}

/// `key value`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Field {
    /// Field keyword
    pub key: String,
    /// Field value
    pub value: FieldValue,
}

impl Field {
    /// Create a field
    #[must_use]
    pub fn new(key: impl Into<String>, value: FieldValue) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }
}

/// Field value
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum FieldValue {
    /// Quoted string
    Str(String),
    /// Bare word, including versions and ids
    Ident(String),
    /// `true` / `false`
    Bool(bool),
}

impl FieldValue {
    /// Textual form of the value
    #[must_use]
    pub fn as_text(&self) -> String {
        match self {
            Self::Str(s) | Self::Ident(s) => s.clone(),
            Self::Bool(b) => b.to_string(),
        }
    }

    /// Boolean reading of the value
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            Self::Ident(s) | Self::Str(s) => s.parse().ok(),
        }
    }
}
