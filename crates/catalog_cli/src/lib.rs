//! EventCatalog CLI
//!
//! Command handlers behind the `eventcatalog` binary: DSL export from a
//! catalog, DSL import into a catalog, and catalog scaffolding.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod export;
pub mod import;
pub mod scaffold;

pub use export::{ExportOptions, export_all, export_catalog, export_resource, exportable_type};
pub use import::{ImportOptions, import_dsl, run_import};
pub use scaffold::{CONFIG_FILE, init_catalog, init_if_missing};
