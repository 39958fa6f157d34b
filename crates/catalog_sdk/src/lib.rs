//! EventCatalog SDK
//!
//! Reads and writes catalog resources stored as markdown files with YAML
//! frontmatter, including version history under `versioned/`.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod document;
pub mod resource;
pub mod store;

pub use document::{parse_document, render_document};
pub use resource::{CatalogResource, Frontmatter};
pub use store::{CatalogStore, FsCatalog, SdkConfig, WriteOptions};
