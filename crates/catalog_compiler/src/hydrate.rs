//! Export: serialize resources together with everything they reference.

use crate::index::ResolveMessageType;
use crate::serialize::{serialize_domain, serialize_resource};
use catalog_core::{CatalogResult, MessagePointer, ResourceRef, ResourceType};
use catalog_sdk::{CatalogResource, CatalogStore};
use futures::FutureExt;
use futures::future::{BoxFuture, try_join_all};
use std::collections::HashSet;
use tracing::debug;

/// Composite keys already emitted during one export
///
/// Keys are `kind:id@version` (`@latest` for unversioned references),
/// `owner:id` and `channel:id@version`. One set is threaded through a whole
/// export so shared dependencies are written once and reference cycles end.
#[derive(Debug, Clone, Default)]
pub struct SeenSet {
    keys: HashSet<String>,
}

impl SeenSet {
    /// Empty set
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `key`; false when it was already present
    pub fn insert(&mut self, key: impl Into<String>) -> bool {
        self.keys.insert(key.into())
    }

    /// Whether `key` has been recorded
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.keys.contains(key)
    }

    /// Number of recorded keys
    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Whether nothing has been recorded
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

fn ref_key(kind: &str, id: &str, version: Option<&str>) -> String {
    format!("{kind}:{id}@{}", version.unwrap_or("latest"))
}

fn canonical_key(resource: &CatalogResource) -> String {
    ref_key(resource.resource_type.keyword(), resource.id(), resource.version())
}

/// Whether a resource fetched through `requested` is new to `seen`
fn admit(seen: &mut SeenSet, requested: &str, found: &CatalogResource) -> bool {
    let canonical = canonical_key(found);
    canonical == requested || seen.insert(canonical)
}

/// Serializes seed resources into DSL blocks, dependencies first
///
/// Without hydration only the seed's own block is produced. Missing
/// dependencies are skipped; any store error aborts the export.
pub struct Hydrator<'a> {
    store: &'a dyn CatalogStore,
    resolver: &'a dyn ResolveMessageType,
    hydrate: bool,
}

impl<'a> Hydrator<'a> {
    /// Create a hydrator
    #[must_use]
    pub fn new(store: &'a dyn CatalogStore, resolver: &'a dyn ResolveMessageType, hydrate: bool) -> Self {
        Self {
            store,
            resolver,
            hydrate,
        }
    }

    /// Blocks for `resource` and, when hydrating, its dependencies
    ///
    /// Returns nothing if the resource was already emitted into `seen`.
    ///
    /// # Errors
    ///
    /// Returns the first store error met while resolving dependencies
    pub async fn export(&self, resource: &CatalogResource, seen: &mut SeenSet) -> CatalogResult<Vec<String>> {
        let mut parts = Vec::new();
        if !seen.insert(canonical_key(resource)) {
            return Ok(parts);
        }

        match resource.resource_type {
            ResourceType::Domain => {
                let (top, block) = self.domain_parts(resource, "domain", seen).await?;
                parts.extend(top);
                parts.push(block);
            }
            ResourceType::Service => {
                if self.hydrate {
                    self.service_dependencies(resource, seen, &mut parts).await?;
                }
                parts.push(serialize_resource(resource, self.resolver));
            }
            _ => {
                if self.hydrate {
                    self.owners(&resource.frontmatter.owners, seen, &mut parts).await?;
                }
                parts.push(serialize_resource(resource, self.resolver));
            }
        }
        debug!(key = %resource.key(), blocks = parts.len(), "exported");
        Ok(parts)
    }

    /// Read a dependency unless it (or its resolved version) was already seen
    async fn fetch_once(
        &self,
        resource_type: ResourceType,
        id: &str,
        version: Option<&str>,
        seen: &mut SeenSet,
    ) -> CatalogResult<Option<CatalogResource>> {
        let key = ref_key(resource_type.keyword(), id, version);
        if !seen.insert(key.clone()) {
            return Ok(None);
        }
        let Some(found) = self.store.read(resource_type, id, version).await? else {
            debug!(%key, "dependency not found, skipped");
            return Ok(None);
        };
        Ok(admit(seen, &key, &found).then_some(found))
    }

    async fn owners(&self, owners: &[String], seen: &mut SeenSet, parts: &mut Vec<String>) -> CatalogResult<()> {
        for owner in owners {
            if !seen.insert(format!("owner:{owner}")) {
                continue;
            }
            let found = match self.store.read(ResourceType::Team, owner, None).await? {
                Some(team) => Some(team),
                None => self.store.read(ResourceType::User, owner, None).await?,
            };
            match found {
                Some(resource) => parts.push(serialize_resource(&resource, self.resolver)),
                None => debug!(owner, "owner is neither a team nor a user, skipped"),
            }
        }
        Ok(())
    }

    async fn channels(
        &self,
        pointers: &[&MessagePointer],
        seen: &mut SeenSet,
        parts: &mut Vec<String>,
    ) -> CatalogResult<()> {
        for channel in pointers.iter().flat_map(|p| p.channels()) {
            if let Some(found) = self
                .fetch_once(ResourceType::Channel, &channel.id, channel.version.as_deref(), seen)
                .await?
            {
                parts.push(serialize_resource(&found, self.resolver));
            }
        }
        Ok(())
    }

    async fn messages(
        &self,
        pointers: &[&MessagePointer],
        seen: &mut SeenSet,
        parts: &mut Vec<String>,
    ) -> CatalogResult<()> {
        for pointer in pointers {
            let Some(message_type) = self.resolver.resolve(&pointer.id) else {
                debug!(id = %pointer.id, "message type unresolved, skipped");
                continue;
            };
            if let Some(found) = self
                .fetch_once(message_type.resource_type(), &pointer.id, pointer.version.as_deref(), seen)
                .await?
            {
                parts.push(serialize_resource(&found, self.resolver));
            }
        }
        Ok(())
    }

    async fn containers(&self, refs: &[ResourceRef], seen: &mut SeenSet, parts: &mut Vec<String>) -> CatalogResult<()> {
        for reference in refs {
            if let Some(found) = self
                .fetch_once(ResourceType::Container, &reference.id, reference.version.as_deref(), seen)
                .await?
            {
                parts.push(serialize_resource(&found, self.resolver));
            }
        }
        Ok(())
    }

    /// Owners, channels, messages and containers of a service
    async fn service_dependencies(
        &self,
        service: &CatalogResource,
        seen: &mut SeenSet,
        parts: &mut Vec<String>,
    ) -> CatalogResult<()> {
        let fm = &service.frontmatter;
        let pointers: Vec<&MessagePointer> = fm.sends.iter().chain(&fm.receives).collect();
        self.owners(&fm.owners, seen, parts).await?;
        self.channels(&pointers, seen, parts).await?;
        self.messages(&pointers, seen, parts).await?;
        self.containers(&fm.writes_to, seen, parts).await?;
        self.containers(&fm.reads_from, seen, parts).await?;
        Ok(())
    }

    /// Top-level dependency blocks and the domain's own block
    ///
    /// Subdomains are hydrated recursively and embedded in the parent block;
    /// their dependencies join the top-level list.
    fn domain_parts<'s>(
        &'s self,
        domain: &'s CatalogResource,
        keyword: &'static str,
        seen: &'s mut SeenSet,
    ) -> BoxFuture<'s, CatalogResult<(Vec<String>, String)>> {
        async move {
            let mut top = Vec::new();
            if !self.hydrate {
                return Ok((top, serialize_domain(domain, self.resolver, keyword, None)));
            }

            let fm = &domain.frontmatter;
            self.owners(&fm.owners, seen, &mut top).await?;

            let pending: Vec<(&ResourceRef, String)> = fm
                .services
                .iter()
                .map(|r| (r, ref_key("service", &r.id, r.version.as_deref())))
                .filter(|(_, key)| seen.insert(key.clone()))
                .collect();
            let services = try_join_all(
                pending
                    .iter()
                    .map(|(r, _)| self.store.read(ResourceType::Service, &r.id, r.version.as_deref())),
            )
            .await?;
            for ((_, key), service) in pending.iter().zip(services) {
                let Some(service) = service.filter(|s| admit(seen, key, s)) else {
                    continue;
                };
                self.service_dependencies(&service, seen, &mut top).await?;
                top.push(serialize_resource(&service, self.resolver));
            }

            let pointers: Vec<&MessagePointer> = fm.sends.iter().chain(&fm.receives).collect();
            self.channels(&pointers, seen, &mut top).await?;
            self.messages(&pointers, seen, &mut top).await?;

            let mut embedded = Vec::new();
            for reference in &fm.domains {
                let Some(sub) = self
                    .fetch_once(ResourceType::Domain, &reference.id, reference.version.as_deref(), seen)
                    .await?
                else {
                    continue;
                };
                let (sub_top, block) = self.domain_parts(&sub, "subdomain", seen).await?;
                top.extend(sub_top);
                embedded.push(block);
            }

            Ok((top, serialize_domain(domain, self.resolver, keyword, Some(&embedded))))
        }
        .boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::ReferenceTypeIndex;
    use catalog_core::ChannelRef;
    use catalog_sdk::{FsCatalog, Frontmatter, WriteOptions};
    use tempfile::TempDir;

    fn fm(id: &str, version: Option<&str>) -> Frontmatter {
        let mut fm = Frontmatter::with_id(id);
        fm.version = version.map(str::to_string);
        fm
    }

    async fn put(store: &FsCatalog, resource_type: ResourceType, fm: Frontmatter) -> CatalogResource {
        let resource = CatalogResource::new(resource_type, fm, "");
        store.write(&resource, &WriteOptions::default()).await.unwrap();
        resource
    }

    fn sends(id: &str, channel: &str) -> MessagePointer {
        let mut pointer = MessagePointer::new(id, None);
        pointer.to = vec![ChannelRef::new(channel, None)];
        pointer
    }

    async fn orders_catalog(store: &FsCatalog) -> CatalogResource {
        let mut team = fm("orders-team", None);
        team.name = Some("Orders".into());
        put(store, ResourceType::Team, team).await;
        put(store, ResourceType::User, fm("jane", None)).await;
        let mut channel = fm("orders", Some("1.0.0"));
        channel.address = Some("orders.topic".into());
        put(store, ResourceType::Channel, channel).await;
        put(store, ResourceType::Event, fm("OrderCreated", Some("1.0.0"))).await;
        put(store, ResourceType::Event, fm("OrderShipped", Some("1.0.0"))).await;
        put(store, ResourceType::Container, fm("OrdersDb", Some("0.0.1"))).await;

        let mut service = fm("OrderService", Some("1.0.0"));
        service.owners = vec!["orders-team".into(), "jane".into(), "ghost".into()];
        service.sends = vec![sends("OrderCreated", "orders"), sends("OrderShipped", "orders")];
        service.writes_to = vec![ResourceRef::new("OrdersDb", None)];
        put(store, ResourceType::Service, service).await
    }

    #[tokio::test]
    async fn test_service_dependencies_first_and_once() {
        let tmp = TempDir::new().unwrap();
        let store = FsCatalog::new(tmp.path());
        let service = orders_catalog(&store).await;
        let index = ReferenceTypeIndex::new(tmp.path());

        let mut seen = SeenSet::new();
        let parts = Hydrator::new(&store, &index, true).export(&service, &mut seen).await.unwrap();
        assert_eq!(
            parts,
            vec![
                "team orders-team {\n  name \"Orders\"\n}".to_string(),
                "user jane".to_string(),
                "channel orders {\n  version 1.0.0\n  address \"orders.topic\"\n}".to_string(),
                "event OrderCreated {\n  version 1.0.0\n}".to_string(),
                "event OrderShipped {\n  version 1.0.0\n}".to_string(),
                "container OrdersDb {\n  version 0.0.1\n}".to_string(),
                "service OrderService {\n  version 1.0.0\n  owner orders-team\n  owner jane\n  owner ghost\n  sends event OrderCreated to orders\n  sends event OrderShipped to orders\n  writes-to container OrdersDb\n}".to_string(),
            ]
        );
        assert!(seen.contains("owner:ghost"));
        assert!(seen.contains("channel:orders@latest"));
        assert!(seen.contains("channel:orders@1.0.0"));

        // a second export in the same run emits nothing new
        let again = Hydrator::new(&store, &index, true).export(&service, &mut seen).await.unwrap();
        assert!(again.is_empty());
    }

    #[tokio::test]
    async fn test_without_hydration_only_the_block() {
        let tmp = TempDir::new().unwrap();
        let store = FsCatalog::new(tmp.path());
        let service = orders_catalog(&store).await;
        let index = ReferenceTypeIndex::new(tmp.path());

        let parts = Hydrator::new(&store, &index, false)
            .export(&service, &mut SeenSet::new())
            .await
            .unwrap();
        assert_eq!(parts.len(), 1);
        assert!(parts[0].starts_with("service OrderService {"));
    }

    #[tokio::test]
    async fn test_domain_shares_messages_and_embeds_subdomains() {
        let tmp = TempDir::new().unwrap();
        let store = FsCatalog::new(tmp.path());
        put(&store, ResourceType::Event, fm("OrderCreated", Some("1.0.0"))).await;

        let mut a = fm("A", Some("1.0.0"));
        a.sends = vec![MessagePointer::new("OrderCreated", None)];
        put(&store, ResourceType::Service, a).await;
        let mut b = fm("B", Some("1.0.0"));
        b.receives = vec![MessagePointer::new("OrderCreated", None)];
        put(&store, ResourceType::Service, b).await;

        let mut billing = fm("Billing", Some("0.0.1"));
        billing.domains = vec![ResourceRef::new("Sales", None)];
        put(&store, ResourceType::Domain, billing).await;

        let mut sales = fm("Sales", Some("1.0.0"));
        sales.services = vec![ResourceRef::new("A", None), ResourceRef::new("B", None)];
        sales.domains = vec![ResourceRef::new("Billing", None)];
        let sales = put(&store, ResourceType::Domain, sales).await;

        let index = ReferenceTypeIndex::new(tmp.path());
        let parts = Hydrator::new(&store, &index, true)
            .export(&sales, &mut SeenSet::new())
            .await
            .unwrap();
        assert_eq!(parts.iter().filter(|p| p.starts_with("event OrderCreated")).count(), 1);
        assert_eq!(
            parts,
            vec![
                "event OrderCreated {\n  version 1.0.0\n}".to_string(),
                "service A {\n  version 1.0.0\n  sends event OrderCreated\n}".to_string(),
                "service B {\n  version 1.0.0\n  receives event OrderCreated\n}".to_string(),
                "domain Sales {\n  version 1.0.0\n  service A\n  service B\n  subdomain Billing {\n    version 0.0.1\n  }\n}".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_store_errors_abort_export() {
        let tmp = TempDir::new().unwrap();
        let store = FsCatalog::new(tmp.path());
        let broken = tmp.path().join("channels/orders");
        std::fs::create_dir_all(&broken).unwrap();
        std::fs::write(broken.join("index.md"), "not a document").unwrap();

        let mut service = fm("S", Some("1.0.0"));
        service.sends = vec![sends("E", "orders")];
        let service = CatalogResource::new(ResourceType::Service, service, "");

        let index = ReferenceTypeIndex::new(tmp.path());
        let result = Hydrator::new(&store, &index, true)
            .export(&service, &mut SeenSet::new())
            .await;
        assert!(result.is_err());
    }
}
