//! Catalog storage: the async store seam and its filesystem implementation.

use crate::document::{parse_document, render_document};
use crate::resource::CatalogResource;
use async_trait::async_trait;
use catalog_core::{CatalogError, CatalogResult, DEFAULT_VERSION, ResourceType, Version};
use serde::{Deserialize, Serialize};
use std::path::{Component, Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

const HISTORY_DIR: &str = "versioned";
const INDEX_NAMES: [&str; 2] = ["index.mdx", "index.md"];

/// SDK configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SdkConfig {
    /// File name used for new documents
    pub index_file: String,
    /// Version given to versioned resources written without one
    pub default_version: String,
}

impl Default for SdkConfig {
    fn default() -> Self {
        Self {
            index_file: "index.mdx".to_string(),
            default_version: DEFAULT_VERSION.to_string(),
        }
    }
}

/// How a write treats existing content
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteOptions {
    /// Replace a resource already stored at the same version
    pub override_existing: bool,
    /// Move the current latest into history before writing a newer version
    pub version_existing_content: bool,
    /// Resource directory relative to the type folder (may start with `../`)
    pub path: Option<String>,
}

/// Catalog storage primitives
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Read a resource, latest when `version` is `None`
    ///
    /// # Errors
    ///
    /// Returns error if the document exists but cannot be read or decoded
    async fn read(
        &self,
        resource_type: ResourceType,
        id: &str,
        version: Option<&str>,
    ) -> CatalogResult<Option<CatalogResource>>;

    /// Write a resource
    ///
    /// # Errors
    ///
    /// Returns `WriteConflict` when a version bump is not strictly newer and
    /// `AlreadyExists` when content is present and overriding is off
    async fn write(&self, resource: &CatalogResource, options: &WriteOptions) -> CatalogResult<()>;

    /// Latest version of every resource of a kind, sorted by id
    ///
    /// # Errors
    ///
    /// Returns error if any document cannot be read or decoded
    async fn list(&self, resource_type: ResourceType) -> CatalogResult<Vec<CatalogResource>>;
}

/// Catalog stored as a directory tree of markdown documents
///
/// Latest content lives in `<dir>/index.mdx` and history in
/// `<dir>/versioned/<version>/index.mdx`, where `<dir>` is `<folder>/<id>`
/// anywhere in the tree (so `domains/D/services/S` is found as well as
/// `services/S`). Teams and users are single files `<folder>/<id>.mdx`.
#[derive(Debug, Clone)]
pub struct FsCatalog {
    root: PathBuf,
    config: SdkConfig,
}

impl FsCatalog {
    /// Open a catalog rooted at `root`
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::with_config(root, SdkConfig::default())
    }

    /// Open with custom configuration
    #[must_use]
    pub fn with_config(root: impl Into<PathBuf>, config: SdkConfig) -> Self {
        Self {
            root: root.into(),
            config,
        }
    }

    /// Catalog root
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding the latest version of a resource, if stored
    #[must_use]
    pub fn locate(&self, resource_type: ResourceType, id: &str) -> Option<PathBuf> {
        self.resource_dirs(resource_type)
            .into_iter()
            .filter(|dir| dir.file_name().is_some_and(|n| n == id))
            .min_by_key(|dir| dir.components().count())
    }

    /// Every directory that holds a resource of this kind
    fn resource_dirs(&self, resource_type: ResourceType) -> Vec<PathBuf> {
        let parents = parent_folders(resource_type);
        let mut dirs: Vec<PathBuf> = WalkDir::new(&self.root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| {
                let name = e.file_name().to_string_lossy();
                e.depth() == 0
                    || (name != HISTORY_DIR && name != "node_modules" && !name.starts_with('.'))
            })
            .filter_map(Result::ok)
            .filter(|e| e.file_type().is_dir())
            .filter(|e| {
                e.path()
                    .parent()
                    .and_then(Path::file_name)
                    .is_some_and(|p| parents.iter().any(|f| p == *f))
            })
            .filter(|e| find_index(e.path()).is_some())
            .map(walkdir::DirEntry::into_path)
            .collect();
        dirs.sort();
        dirs
    }

    fn flat_file(&self, resource_type: ResourceType, id: &str) -> Option<PathBuf> {
        let folder = self.root.join(resource_type.folder());
        ["mdx", "md"]
            .into_iter()
            .map(|ext| folder.join(format!("{id}.{ext}")))
            .find(|p| p.is_file())
    }

    async fn read_file(&self, resource_type: ResourceType, path: &Path) -> CatalogResult<CatalogResource> {
        let text = tokio::fs::read_to_string(path).await?;
        let (frontmatter, markdown) = parse_document(&text, path)?;
        Ok(CatalogResource::new(resource_type, frontmatter, markdown))
    }

    async fn read_index(
        &self,
        resource_type: ResourceType,
        dir: &Path,
    ) -> CatalogResult<Option<(PathBuf, CatalogResource)>> {
        match find_index(dir) {
            Some(path) => {
                let resource = self.read_file(resource_type, &path).await?;
                Ok(Some((path, resource)))
            }
            None => Ok(None),
        }
    }

    async fn write_file(&self, path: &Path, resource: &CatalogResource) -> CatalogResult<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let text = render_document(&resource.frontmatter, &resource.markdown, path)?;
        tokio::fs::write(path, text).await?;
        debug!(path = %path.display(), "wrote {}", resource.label());
        Ok(())
    }

    /// Move everything but the history folder into `versioned/<version>/`
    async fn archive_latest(&self, dir: &Path, version: &str) -> CatalogResult<()> {
        let target = dir.join(HISTORY_DIR).join(version);
        tokio::fs::create_dir_all(&target).await?;
        let mut entries = tokio::fs::read_dir(dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            if entry.file_name() == HISTORY_DIR {
                continue;
            }
            tokio::fs::rename(entry.path(), target.join(entry.file_name())).await?;
        }
        debug!(dir = %dir.display(), version, "archived previous latest");
        Ok(())
    }

    async fn write_unversioned(&self, resource: &CatalogResource, options: &WriteOptions) -> CatalogResult<()> {
        let existing = self.flat_file(resource.resource_type, resource.id());
        if let Some(path) = existing {
            if !options.override_existing {
                return Err(already_exists(resource, resource.label()));
            }
            return self.write_file(&path, resource).await;
        }
        let path = self
            .root
            .join(resource.resource_type.folder())
            .join(format!("{}.{}", resource.id(), extension(&self.config.index_file)));
        self.write_file(&path, resource).await
    }
}

#[async_trait]
impl CatalogStore for FsCatalog {
    async fn read(
        &self,
        resource_type: ResourceType,
        id: &str,
        version: Option<&str>,
    ) -> CatalogResult<Option<CatalogResource>> {
        check_segment(resource_type, "id", id)?;
        if let Some(v) = version {
            check_segment(resource_type, "version", v)?;
        }
        if !resource_type.is_versioned() {
            return match self.flat_file(resource_type, id) {
                Some(path) => Ok(Some(self.read_file(resource_type, &path).await?)),
                None => Ok(None),
            };
        }

        let Some(dir) = self.locate(resource_type, id) else {
            return Ok(None);
        };
        let Some((_, latest)) = self.read_index(resource_type, &dir).await? else {
            return Ok(None);
        };
        match version {
            None => Ok(Some(latest)),
            Some(v) if latest.version() == Some(v) => Ok(Some(latest)),
            Some(v) => {
                let history = dir.join(HISTORY_DIR).join(v);
                Ok(self.read_index(resource_type, &history).await?.map(|(_, r)| r))
            }
        }
    }

    async fn write(&self, resource: &CatalogResource, options: &WriteOptions) -> CatalogResult<()> {
        let resource_type = resource.resource_type;
        check_segment(resource_type, "id", resource.id())?;
        if let Some(v) = resource.version() {
            check_segment(resource_type, "version", v)?;
        }
        if !resource_type.is_versioned() {
            return self.write_unversioned(resource, options).await;
        }

        let mut resource = resource.clone();
        let version = resource
            .frontmatter
            .version
            .get_or_insert_with(|| self.config.default_version.clone())
            .clone();

        let folder = self.root.join(resource_type.folder());
        let dir = match &options.path {
            Some(path) => {
                let dir = normalize(&folder.join(path));
                if !is_inside(&normalize(&self.root), &dir) {
                    return Err(CatalogError::InvalidPathSegment {
                        kind: resource_type.keyword().to_string(),
                        field: "path".to_string(),
                        value: path.clone(),
                    });
                }
                dir
            }
            None => self
                .locate(resource_type, resource.id())
                .unwrap_or_else(|| folder.join(resource.id())),
        };

        let Some((latest_path, latest)) = self.read_index(resource_type, &dir).await? else {
            return self.write_file(&dir.join(&self.config.index_file), &resource).await;
        };
        let latest_version = latest.version().unwrap_or(&self.config.default_version).to_string();

        if latest_version == version {
            if !options.override_existing {
                return Err(already_exists(&resource, version));
            }
            return self.write_file(&latest_path, &resource).await;
        }

        let history = dir.join(HISTORY_DIR).join(&version);
        if let Some(history_path) = find_index(&history) {
            if !options.override_existing {
                return Err(already_exists(&resource, version));
            }
            return self.write_file(&history_path, &resource).await;
        }

        if options.version_existing_content {
            if !Version::is_newer(&version, &latest_version)? {
                return Err(CatalogError::WriteConflict {
                    kind: resource_type.keyword().to_string(),
                    id: resource.id().to_string(),
                    existing: latest_version,
                    requested: version,
                });
            }
            self.archive_latest(&dir, &latest_version).await?;
            return self.write_file(&dir.join(&self.config.index_file), &resource).await;
        }

        if options.override_existing {
            return self.write_file(&latest_path, &resource).await;
        }
        Err(already_exists(&resource, latest_version))
    }

    async fn list(&self, resource_type: ResourceType) -> CatalogResult<Vec<CatalogResource>> {
        let mut resources = Vec::new();
        if resource_type.is_versioned() {
            for dir in self.resource_dirs(resource_type) {
                if let Some((_, r)) = self.read_index(resource_type, &dir).await? {
                    resources.push(r);
                }
            }
        } else {
            let folder = self.root.join(resource_type.folder());
            if folder.is_dir() {
                let mut entries = tokio::fs::read_dir(&folder).await?;
                while let Some(entry) = entries.next_entry().await? {
                    let path = entry.path();
                    if matches!(path.extension().and_then(|e| e.to_str()), Some("md" | "mdx")) {
                        resources.push(self.read_file(resource_type, &path).await?);
                    }
                }
            }
        }
        resources.sort_by(|a, b| a.id().cmp(b.id()));
        Ok(resources)
    }
}

/// Folder names a resource directory can sit in
fn parent_folders(resource_type: ResourceType) -> Vec<&'static str> {
    match resource_type {
        ResourceType::Domain => vec!["domains", "subdomains"],
        other => vec![other.folder()],
    }
}

fn find_index(dir: &Path) -> Option<PathBuf> {
    INDEX_NAMES
        .into_iter()
        .map(|name| dir.join(name))
        .find(|p| p.is_file())
}

fn extension(index_file: &str) -> &str {
    Path::new(index_file)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("mdx")
}

/// Ids and versions become directory or file names
fn check_segment(resource_type: ResourceType, field: &str, value: &str) -> CatalogResult<()> {
    let invalid = value.is_empty()
        || value == "."
        || value == ".."
        || value.contains(['/', '\\'])
        || Path::new(value).is_absolute();
    if invalid {
        return Err(CatalogError::InvalidPathSegment {
            kind: resource_type.keyword().to_string(),
            field: field.to_string(),
            value: value.to_string(),
        });
    }
    Ok(())
}

fn is_inside(root: &Path, dir: &Path) -> bool {
    dir.strip_prefix(root)
        .is_ok_and(|rest| !matches!(rest.components().next(), Some(Component::ParentDir)))
}

/// Resolve `.` and `..` without touching the filesystem
///
/// A leading `..` that has nothing to cancel is kept.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if matches!(out.components().next_back(), Some(Component::Normal(_))) {
                    out.pop();
                } else {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

fn already_exists(resource: &CatalogResource, version: String) -> CatalogError {
    CatalogError::AlreadyExists {
        kind: resource.resource_type.keyword().to_string(),
        id: resource.id().to_string(),
        version,
    }
}
