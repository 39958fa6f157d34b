//! Resolve which message collection a bare id belongs to.

use catalog_core::MessageType;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};
use tracing::debug;
use walkdir::WalkDir;

/// Lookup of a message's collection by id
pub trait ResolveMessageType: Send + Sync {
    /// `None` when the id is not stored as an event, command or query
    fn resolve(&self, id: &str) -> Option<MessageType>;
}

impl ResolveMessageType for HashMap<String, MessageType> {
    fn resolve(&self, id: &str) -> Option<MessageType> {
        self.get(id).copied()
    }
}

/// Probes the catalog tree for `events/<id>`, `commands/<id>` and
/// `queries/<id>`, in that priority order
///
/// Answers are cached for the lifetime of the index. Build one per
/// compile or export run.
#[derive(Debug)]
pub struct ReferenceTypeIndex {
    root: PathBuf,
    cache: Mutex<HashMap<String, Option<MessageType>>>,
}

impl ReferenceTypeIndex {
    /// Index over the catalog at `root`
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Number of ids resolved so far
    #[must_use]
    pub fn cached(&self) -> usize {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    fn probe(&self, id: &str) -> Option<MessageType> {
        let mut found: Vec<MessageType> = WalkDir::new(&self.root)
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || e.file_name() != "versioned")
            .filter_map(Result::ok)
            .filter(|e| e.file_type().is_dir() && e.file_name() == id)
            .filter(|e| {
                ["index.mdx", "index.md"]
                    .iter()
                    .any(|name| e.path().join(name).is_file())
            })
            .filter_map(|e| {
                let folder = e.path().parent()?.file_name()?.to_str()?;
                MessageType::PRIORITY
                    .into_iter()
                    .find(|t| t.resource_type().folder() == folder)
            })
            .collect();
        found.sort();
        found.first().copied()
    }
}

impl ResolveMessageType for ReferenceTypeIndex {
    fn resolve(&self, id: &str) -> Option<MessageType> {
        if let Some(hit) = self.cache.lock().unwrap_or_else(PoisonError::into_inner).get(id) {
            return *hit;
        }
        let resolved = self.probe(id);
        debug!(id, ?resolved, "resolved message type");
        self.cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id.to_string(), resolved);
        resolved
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(root: &std::path::Path, dir: &str) {
        let path = root.join(dir);
        fs::create_dir_all(&path).unwrap();
        fs::write(path.join("index.mdx"), "---\nid: x\n---\n").unwrap();
    }

    #[test]
    fn test_resolves_by_folder() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "events/OrderCreated");
        touch(tmp.path(), "domains/Sales/services/Orders/commands/PlaceOrder");
        touch(tmp.path(), "queries/GetOrder");

        let index = ReferenceTypeIndex::new(tmp.path());
        assert_eq!(index.resolve("OrderCreated"), Some(MessageType::Event));
        assert_eq!(index.resolve("PlaceOrder"), Some(MessageType::Command));
        assert_eq!(index.resolve("GetOrder"), Some(MessageType::Query));
        assert_eq!(index.resolve("Unknown"), None);
    }

    #[test]
    fn test_priority_event_first() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "queries/Ambiguous");
        touch(tmp.path(), "commands/Ambiguous");
        touch(tmp.path(), "events/Ambiguous");

        let index = ReferenceTypeIndex::new(tmp.path());
        assert_eq!(index.resolve("Ambiguous"), Some(MessageType::Event));
    }

    #[test]
    fn test_ignores_history_and_empty_dirs() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("events/Empty")).unwrap();
        touch(tmp.path(), "events/Real/versioned/events/Ghost");

        let index = ReferenceTypeIndex::new(tmp.path());
        assert_eq!(index.resolve("Empty"), None);
        assert_eq!(index.resolve("Ghost"), None);
    }

    #[test]
    fn test_results_are_cached() {
        let tmp = TempDir::new().unwrap();
        let index = ReferenceTypeIndex::new(tmp.path());
        assert_eq!(index.resolve("Later"), None);
        touch(tmp.path(), "events/Later");
        // cached miss within the same run
        assert_eq!(index.resolve("Later"), None);
        assert_eq!(index.cached(), 1);

        let fresh = ReferenceTypeIndex::new(tmp.path());
        assert_eq!(fresh.resolve("Later"), Some(MessageType::Event));
    }
}
