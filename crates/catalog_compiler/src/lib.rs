//! EventCatalog DSL Compiler
//!
//! Both directions between DSL documents and a catalog tree:
//!
//! - import: [`compile_program`] turns definitions into resources,
//!   [`synthesize_stubs`] adds minimal resources for dangling references and
//!   [`Reconciler`] decides create / update / version-bump against the store.
//! - export: [`Hydrator`] serializes resources back into DSL, pulling in
//!   everything they reference exactly once.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cache;
pub mod compile;
pub mod format;
pub mod hydrate;
pub mod index;
pub mod placement;
pub mod reconcile;
pub mod serialize;
pub mod stubs;

pub use cache::ReadCache;
pub use compile::{Compilation, CompiledKeys, Origin, ParsedResource, WalkContext, compile_program};
pub use format::{build_visualizer_block, group_dsl_blocks, render_import_report};
pub use hydrate::{Hydrator, SeenSet};
pub use index::{ReferenceTypeIndex, ResolveMessageType};
pub use placement::placement_path;
pub use reconcile::{FailedEntry, ImportResult, ReconcileOptions, Reconciler, ResultEntry};
pub use serialize::{indent, serialize_domain, serialize_resource};
pub use stubs::synthesize_stubs;
