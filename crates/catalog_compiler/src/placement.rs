//! Where a newly created resource is written.

use crate::compile::ParsedResource;

/// Directory override handed to the store, relative to the type folder
///
/// `None` means the store's default location: a resource that already
/// exists stays where it is, flat mode uses the top-level type folder, and
/// so does a nested-mode path that resolves to `<folder>/<id>` anyway.
#[must_use]
pub fn placement_path(resource: &ParsedResource, exists: bool, nested: bool) -> Option<String> {
    if exists || !nested {
        return None;
    }

    let dir = resource_dir(&resource.path);
    let folder = resource.resource_type.folder();
    let relative = match dir.strip_prefix(folder).and_then(|r| r.strip_prefix('/')) {
        Some(inside) => inside.to_string(),
        None => format!("../{dir}"),
    };
    (relative != resource.id()).then_some(relative)
}

/// Strip the version segment and file name from a compiled path
fn resource_dir(path: &str) -> &str {
    if let Some(at) = path.find("/versioned/") {
        return &path[..at];
    }
    path.strip_suffix("/index.md")
        .or_else(|| path.strip_suffix(".md"))
        .unwrap_or(path)
}
