//! `eventcatalog export`: write catalog resources out as DSL.

use anyhow::{Context, Result, bail};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use catalog_compiler::{Hydrator, ReferenceTypeIndex, SeenSet, build_visualizer_block, group_dsl_blocks};
use catalog_core::{CatalogError, CatalogResult, ResourceType};
use catalog_sdk::{CatalogResource, CatalogStore, FsCatalog};
use std::path::{Path, PathBuf};
use tracing::info;

const PLAYGROUND_URL: &str = "https://playground.eventcatalog.dev/?code=";

/// Options of the export command
#[derive(Debug, Clone)]
pub struct ExportOptions {
    /// Resource type keyword or plural (`event`, `services`, ...)
    pub resource: Option<String>,
    /// Resource id; every resource of the type when absent
    pub id: Option<String>,
    /// Resource version; latest when absent
    pub version: Option<String>,
    /// Include referenced owners, channels, messages and containers
    pub hydrate: bool,
    /// Return the DSL instead of writing a file
    pub stdout: bool,
    /// Print a playground link for the exported DSL
    pub playground: bool,
    /// Output file, defaults to `<id>.ec`, `<plural>.ec` or `catalog.ec`
    pub output: Option<PathBuf>,
    /// Catalog directory
    pub dir: PathBuf,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            resource: None,
            id: None,
            version: None,
            hydrate: false,
            stdout: false,
            playground: false,
            output: None,
            dir: PathBuf::from("."),
        }
    }
}

/// Resolve a resource type accepted by export
///
/// # Errors
///
/// Returns `UnsupportedType` for anything but the five exportable kinds
pub fn exportable_type(resource: &str) -> CatalogResult<ResourceType> {
    ResourceType::parse(resource)
        .ok()
        .filter(|t| ResourceType::EXPORTABLE.contains(t))
        .ok_or_else(|| CatalogError::UnsupportedType {
            found: resource.to_string(),
            expected: ResourceType::EXPORTABLE
                .iter()
                .map(ResourceType::keyword)
                .collect::<Vec<_>>()
                .join(", "),
        })
}

/// Export one resource, or every resource of its type when no id is given
///
/// # Errors
///
/// Returns error on an invalid type, a missing resource or any read failure
pub async fn export_resource(options: &ExportOptions) -> Result<String> {
    let Some(id) = options.id.as_deref() else {
        return export_all(options).await;
    };
    let resource_type = requested_type(options)?;
    let store = FsCatalog::new(&options.dir);
    let version = options.version.as_deref();
    let resource = store
        .read(resource_type, id, version)
        .await?
        .ok_or_else(|| CatalogError::not_found(resource_type.keyword(), id, version))?;

    let raw = render(&store, &options.dir, &[resource], options.hydrate, &mut SeenSet::new()).await?;
    let body = if options.hydrate { group_dsl_blocks(&raw) } else { raw };
    let dsl = with_visualizer(body, &format!("View of {id}"), &[resource_type]);

    let summary = |path: &Path| format!("Exported {resource_type} '{id}' to {}", path.display());
    deliver(dsl, options, format!("{id}.ec"), summary).await
}

/// Export the latest version of every resource of one type
///
/// # Errors
///
/// Returns error on an invalid type, an empty collection or any read failure
pub async fn export_all(options: &ExportOptions) -> Result<String> {
    let resource_type = requested_type(options)?;
    let plural = resource_type.folder();
    let store = FsCatalog::new(&options.dir);
    let resources = store.list(resource_type).await?;
    if resources.is_empty() {
        bail!("No {plural} found in catalog at '{}'", options.dir.display());
    }

    let raw = render(&store, &options.dir, &resources, options.hydrate, &mut SeenSet::new()).await?;
    let dsl = with_visualizer(group_dsl_blocks(&raw), &format!("All {plural}"), &[resource_type]);

    let count = resources.len();
    let summary = |path: &Path| format!("Exported {count} {plural} to {}", path.display());
    deliver(dsl, options, format!("{plural}.ec"), summary).await
}

/// Export every exportable resource in the catalog
///
/// # Errors
///
/// Returns error if the catalog is empty or any read fails
pub async fn export_catalog(options: &ExportOptions) -> Result<String> {
    let store = FsCatalog::new(&options.dir);
    let mut seen = SeenSet::new();
    let mut parts = Vec::new();
    for resource_type in ResourceType::EXPORTABLE {
        let resources = store.list(resource_type).await?;
        if resources.is_empty() {
            continue;
        }
        parts.push(render(&store, &options.dir, &resources, options.hydrate, &mut seen).await?);
    }
    if parts.is_empty() {
        bail!("No resources found in catalog at '{}'", options.dir.display());
    }

    let grouped = group_dsl_blocks(&parts.join("\n\n"));
    let dsl = with_visualizer(grouped, "Full Catalog", &ResourceType::EXPORTABLE);

    let summary = |path: &Path| format!("Exported full catalog to {}", path.display());
    deliver(dsl, options, "catalog.ec".to_string(), summary).await
}

fn requested_type(options: &ExportOptions) -> Result<ResourceType> {
    let Some(resource) = options.resource.as_deref() else {
        bail!("Either --all or --resource is required");
    };
    Ok(exportable_type(resource)?)
}

async fn render(
    store: &FsCatalog,
    dir: &Path,
    resources: &[CatalogResource],
    hydrate: bool,
    seen: &mut SeenSet,
) -> CatalogResult<String> {
    let index = ReferenceTypeIndex::new(dir);
    let hydrator = Hydrator::new(store, &index, hydrate);
    let mut blocks = Vec::new();
    for resource in resources {
        blocks.extend(hydrator.export(resource, seen).await?);
    }
    info!(seeds = resources.len(), blocks = blocks.len(), hydrate, "rendered DSL");
    Ok(blocks.join("\n\n"))
}

fn with_visualizer(dsl: String, name: &str, types: &[ResourceType]) -> String {
    let visualizer = build_visualizer_block(&dsl, name, types);
    if visualizer.is_empty() {
        dsl
    } else {
        format!("{dsl}\n{visualizer}")
    }
}

async fn deliver(
    dsl: String,
    options: &ExportOptions,
    default_file: String,
    summary: impl FnOnce(&Path) -> String,
) -> Result<String> {
    if options.stdout {
        return Ok(dsl);
    }

    let file = options.output.clone().unwrap_or_else(|| PathBuf::from(default_file));
    let path = std::path::absolute(&file).unwrap_or(file);
    tokio::fs::write(&path, format!("{dsl}\n"))
        .await
        .with_context(|| format!("Failed to write {}", path.display()))?;

    let mut lines = vec![String::new(), format!("  {}", summary(&path)), String::new()];
    if options.playground {
        lines.push("  Open in the playground:".to_string());
        lines.push(format!("  {}", playground_url(&dsl)));
    } else {
        lines.push("  Tip: Use --playground to open in the playground".to_string());
    }
    lines.push(String::new());
    Ok(lines.join("\n"))
}

/// Playground link carrying the DSL as base64
#[must_use]
pub fn playground_url(dsl: &str) -> String {
    format!("{PLAYGROUND_URL}{}", STANDARD.encode(dsl))
}
