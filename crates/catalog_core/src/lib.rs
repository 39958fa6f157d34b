//! EventCatalog DSL Core Types
//!
//! Pure types with no I/O: resource kinds, composite keys, frontmatter
//! pointers, versions and the error taxonomy shared by every crate.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod reference;
pub mod resource;
pub mod version;

// Re-exports
pub use error::{CatalogError, CatalogResult, SyntaxError};
pub use reference::{ChannelRef, MessagePointer, ResourceRef, dedup_pointers, dedup_refs};
pub use resource::{MessageType, ResourceKey, ResourceType};
pub use version::{DEFAULT_VERSION, Version};
