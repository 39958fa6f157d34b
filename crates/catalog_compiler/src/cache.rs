//! Per-run memoization of catalog reads.

use catalog_core::{CatalogResult, ResourceKey};
use catalog_sdk::{CatalogResource, CatalogStore};
use std::collections::HashMap;
use tracing::trace;

/// Read cache keyed by `type:id@version` (exact) and `type:id` (latest)
///
/// Misses are cached too, so each key is read at most once until it is
/// invalidated. Failed reads are not cached.
#[derive(Debug, Default)]
pub struct ReadCache {
    entries: HashMap<ResourceKey, Option<CatalogResource>>,
    loads: usize,
}

impl ReadCache {
    /// Create an empty cache
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached value for `key`, reading it from `store` on first use
    ///
    /// # Errors
    ///
    /// Returns the store's error; nothing is cached in that case
    pub async fn get_or_load(
        &mut self,
        store: &dyn CatalogStore,
        key: &ResourceKey,
    ) -> CatalogResult<Option<CatalogResource>> {
        if let Some(hit) = self.entries.get(key) {
            trace!(%key, "read cache hit");
            return Ok(hit.clone());
        }
        let loaded = store
            .read(key.resource_type, &key.id, key.version.as_deref())
            .await?;
        self.loads += 1;
        self.entries.insert(key.clone(), loaded.clone());
        Ok(loaded)
    }

    /// Forget `key`; returns whether an entry was dropped
    pub fn invalidate(&mut self, key: &ResourceKey) -> bool {
        self.entries.remove(key).is_some()
    }

    /// Number of reads that reached the store
    #[must_use]
    pub const fn loads(&self) -> usize {
        self.loads
    }
}
