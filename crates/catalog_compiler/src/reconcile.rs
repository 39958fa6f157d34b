//! Import: reconcile compiled resources against the catalog.

use crate::cache::ReadCache;
use crate::compile::{ParsedResource, compile_program};
use crate::placement::placement_path;
use crate::stubs::synthesize_stubs;
use catalog_core::{CatalogResult, ResourceType};
use catalog_dsl::Program;
use catalog_sdk::{CatalogStore, WriteOptions};
use tracing::{debug, info, warn};

const NODE_GRAPH: &str = "<NodeGraph />";

/// Import options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconcileOptions {
    /// Place new resources under their parent domain/service
    pub nested: bool,
    /// Decide outcomes without writing
    pub dry_run: bool,
}

impl Default for ReconcileOptions {
    fn default() -> Self {
        Self {
            nested: true,
            dry_run: false,
        }
    }
}

/// One resource in an import report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultEntry {
    /// Kind of resource
    pub resource_type: ResourceType,
    /// `id@version`
    pub label: String,
}

/// A resource that could not be imported
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedEntry {
    /// Kind of resource
    pub resource_type: ResourceType,
    /// `id@version`
    pub label: String,
    /// Why it failed
    pub message: String,
}

/// Outcome of an import, one entry per resource outcome
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportResult {
    /// Newly written resources (including new versions)
    pub created: Vec<ResultEntry>,
    /// Overwritten at the same version
    pub updated: Vec<ResultEntry>,
    /// Previous latest versions moved into history, labelled with their old version
    pub versioned: Vec<ResultEntry>,
    /// Resources that failed
    pub errors: Vec<FailedEntry>,
    /// Whether nothing was written
    pub dry_run: bool,
}

impl ImportResult {
    /// Whether no resource produced an outcome
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.created.is_empty() && self.updated.is_empty() && self.versioned.is_empty() && self.errors.is_empty()
    }
}

enum Outcome {
    Created,
    Updated,
    Bumped { previous: String },
}

/// Applies a program to a catalog one resource at a time
pub struct Reconciler<'a> {
    store: &'a dyn CatalogStore,
    options: ReconcileOptions,
    cache: ReadCache,
}

impl<'a> Reconciler<'a> {
    /// Create a reconciler over `store`
    #[must_use]
    pub fn new(store: &'a dyn CatalogStore, options: ReconcileOptions) -> Self {
        Self {
            store,
            options,
            cache: ReadCache::new(),
        }
    }

    /// Compile, synthesize stubs and reconcile every resource
    ///
    /// Compiled definitions go first in program order, then stubs in
    /// discovery order. A failing resource is recorded in `errors` and the
    /// batch continues.
    pub async fn reconcile(&mut self, program: &Program) -> ImportResult {
        let compilation = compile_program(program, self.options.nested);
        let stubs = synthesize_stubs(program, &compilation.keys, self.options.nested);
        info!(
            definitions = compilation.resources.len(),
            stubs = stubs.len(),
            dry_run = self.options.dry_run,
            "reconciling"
        );

        let mut result = ImportResult {
            dry_run: self.options.dry_run,
            ..ImportResult::default()
        };
        for resource in compilation.resources.into_iter().chain(stubs) {
            if let Err(err) = self.reconcile_one(&resource, &mut result).await {
                warn!(key = %resource.key(), error = %err, "import failed for resource");
                result.errors.push(FailedEntry {
                    resource_type: resource.resource_type,
                    label: resource.label(),
                    message: err.to_string(),
                });
            }
        }
        info!(
            created = result.created.len(),
            updated = result.updated.len(),
            versioned = result.versioned.len(),
            failed = result.errors.len(),
            "import finished"
        );
        result
    }

    async fn reconcile_one(&mut self, resource: &ParsedResource, result: &mut ImportResult) -> CatalogResult<()> {
        let key = resource.key();
        let latest_key = key.to_any_version();
        let existing = self.cache.get_or_load(self.store, &key).await?;
        let previous = match (&existing, &key.version) {
            (None, Some(_)) => self
                .cache
                .get_or_load(self.store, &latest_key)
                .await?
                .filter(|latest| latest.version() != resource.version()),
            _ => None,
        };

        if existing.is_none() && previous.is_some() && resource.is_unversioned_stub() {
            debug!(%key, "reference satisfied by another stored version, stub skipped");
            return Ok(());
        }

        let outcome = match (&existing, &previous) {
            (Some(_), _) => Outcome::Updated,
            (None, Some(p)) => Outcome::Bumped { previous: p.label() },
            (None, None) => Outcome::Created,
        };

        if !self.options.dry_run {
            let carried = existing.as_ref().or(previous.as_ref()).map(|r| r.markdown.as_str());
            let mut markdown = if resource.markdown.is_empty() {
                carried.unwrap_or_default().to_string()
            } else {
                resource.markdown.clone()
            };
            let creating = !matches!(outcome, Outcome::Updated);
            if creating && resource.resource_type.renders_node_graph() && !markdown.contains(NODE_GRAPH) {
                markdown = if markdown.trim().is_empty() {
                    NODE_GRAPH.to_string()
                } else {
                    format!("{}\n\n{NODE_GRAPH}", markdown.trim_end())
                };
            }

            let options = WriteOptions {
                override_existing: true,
                version_existing_content: previous.is_some(),
                path: placement_path(resource, existing.is_some() || previous.is_some(), self.options.nested),
            };
            debug!(%key, path = ?options.path, bump = options.version_existing_content, "writing");
            self.store.write(&resource.to_resource(markdown), &options).await?;
            self.cache.invalidate(&key);
            self.cache.invalidate(&latest_key);
        }

        let entry = ResultEntry {
            resource_type: resource.resource_type,
            label: resource.label(),
        };
        match outcome {
            Outcome::Created => result.created.push(entry),
            Outcome::Updated => result.updated.push(entry),
            Outcome::Bumped { previous } => {
                result.created.push(entry);
                result.versioned.push(ResultEntry {
                    resource_type: resource.resource_type,
                    label: previous,
                });
            }
        }
        Ok(())
    }
}
