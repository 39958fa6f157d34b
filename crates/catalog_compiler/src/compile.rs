//! Compile DSL definitions into catalog resources.

use catalog_core::{
    ChannelRef, DEFAULT_VERSION, MessagePointer, ResourceKey, ResourceRef, ResourceType, dedup_pointers,
    dedup_refs,
};
use catalog_dsl::{
    Definition, DomainDef, DomainItem, Field, FieldDef, MessageStmt, Program, Reference, ServiceDef,
    Statement,
};
use catalog_sdk::{CatalogResource, Frontmatter};
use std::collections::HashSet;
use tracing::{debug, warn};

/// How a parsed resource came to exist
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// Written out in the document
    Definition,
    /// Invented for a reference without a definition
    Stub {
        /// Whether the reference named a version
        explicit_version: bool,
    },
}

/// A resource produced by compilation, not yet written
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedResource {
    /// Kind of resource
    pub resource_type: ResourceType,
    /// Frontmatter to write (fully replaces what is stored)
    pub frontmatter: Frontmatter,
    /// Markdown body, empty when the document has none
    pub markdown: String,
    /// Intended catalog-relative file path
    pub path: String,
    /// Definition or stub
    pub origin: Origin,
}

impl ParsedResource {
    /// Resource id
    #[must_use]
    pub fn id(&self) -> &str {
        &self.frontmatter.id
    }

    /// Resource version
    #[must_use]
    pub fn version(&self) -> Option<&str> {
        self.frontmatter.version.as_deref()
    }

    /// Exact key
    #[must_use]
    pub fn key(&self) -> ResourceKey {
        ResourceKey::new(self.resource_type, self.id(), self.version())
    }

    /// `id@version`
    #[must_use]
    pub fn label(&self) -> String {
        match self.version() {
            Some(v) => format!("{}@{}", self.id(), v),
            None => self.id().to_string(),
        }
    }

    /// Stub created for a reference that named no version
    #[must_use]
    pub fn is_unversioned_stub(&self) -> bool {
        self.origin
            == Origin::Stub {
                explicit_version: false,
            }
    }

    /// Resource ready for the store, with the given body
    #[must_use]
    pub fn to_resource(&self, markdown: String) -> CatalogResource {
        CatalogResource::new(self.resource_type, self.frontmatter.clone(), markdown)
    }
}

/// Keys of everything compiled from a document
///
/// Each compiled resource registers its exact key and its any-version key.
#[derive(Debug, Clone, Default)]
pub struct CompiledKeys {
    keys: HashSet<ResourceKey>,
}

impl CompiledKeys {
    /// Register a compiled resource; returns false if its exact key was already present
    pub fn insert(&mut self, key: &ResourceKey) -> bool {
        self.keys.insert(key.to_any_version());
        self.keys.insert(key.clone())
    }

    /// Whether a reference with this key is already defined in the document
    ///
    /// An explicit version only matches that version; an unversioned
    /// reference matches any version of the id.
    #[must_use]
    pub fn satisfies(&self, key: &ResourceKey, explicit_version: bool) -> bool {
        self.keys.contains(key) || (!explicit_version && self.keys.contains(&key.to_any_version()))
    }
}

/// Output of [`compile_program`]
#[derive(Debug, Clone, Default)]
pub struct Compilation {
    /// Compiled resources in program order, parents before children
    pub resources: Vec<ParsedResource>,
    /// Keys of `resources`
    pub keys: CompiledKeys,
}

/// Path prefixes accumulated while descending into domains and services
///
/// In flat mode both prefixes stay empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WalkContext {
    nested: bool,
    /// Directory of the innermost domain or subdomain
    pub domain_path: Option<String>,
    /// Directory of the enclosing service
    pub service_path: Option<String>,
}

impl WalkContext {
    /// Context at the top of a document
    #[must_use]
    pub fn root(nested: bool) -> Self {
        Self {
            nested,
            ..Self::default()
        }
    }

    /// Directory of a domain (or subdomain when inside another domain)
    #[must_use]
    pub fn domain_dir(&self, id: &str) -> String {
        match &self.domain_path {
            Some(parent) if self.nested => format!("{parent}/subdomains/{id}"),
            _ => format!("domains/{id}"),
        }
    }

    /// Directory of a service
    #[must_use]
    pub fn service_dir(&self, id: &str) -> String {
        join_dir(self.domain_prefix(), ResourceType::Service, id)
    }

    /// Context for the children of a domain stored at `dir`
    #[must_use]
    pub fn enter_domain(&self, dir: String) -> Self {
        Self {
            nested: self.nested,
            domain_path: self.nested.then_some(dir),
            service_path: None,
        }
    }

    /// Context for the statements of a service stored at `dir`
    #[must_use]
    pub fn enter_service(&self, dir: String) -> Self {
        Self {
            nested: self.nested,
            domain_path: self.domain_path.clone(),
            service_path: self.nested.then_some(dir),
        }
    }

    fn domain_prefix(&self) -> Option<&str> {
        self.domain_path.as_deref()
    }

    /// Where messages land: next to the service, else the domain
    #[must_use]
    pub fn message_prefix(&self) -> Option<&str> {
        self.service_path.as_deref().or(self.domain_path.as_deref())
    }

    /// Where channels and containers land: next to the nearest domain
    #[must_use]
    pub fn infrastructure_prefix(&self) -> Option<&str> {
        self.domain_prefix()
    }

    /// Prefix for a resource type in this context
    #[must_use]
    pub fn prefix_for(&self, resource_type: ResourceType) -> Option<&str> {
        match resource_type {
            t if t.is_message() => self.message_prefix(),
            ResourceType::Channel | ResourceType::Container => self.infrastructure_prefix(),
            _ => None,
        }
    }
}

pub(crate) fn join_dir(prefix: Option<&str>, resource_type: ResourceType, id: &str) -> String {
    match prefix {
        Some(p) => format!("{p}/{}/{id}", resource_type.folder()),
        None => format!("{}/{id}", resource_type.folder()),
    }
}

/// Catalog-relative file a resource version is compiled to
pub(crate) fn resource_file(dir: &str, version: Option<&str>) -> String {
    match version {
        Some(v) => format!("{dir}/versioned/{v}/index.md"),
        None => format!("{dir}.md"),
    }
}

/// Minimal frontmatter shared by stubs
pub(crate) fn stub_frontmatter(id: &str, version: &str) -> Frontmatter {
    Frontmatter {
        name: Some(id.to_string()),
        version: Some(version.to_string()),
        ..Frontmatter::with_id(id)
    }
}

/// Compile every definition of a program
///
/// Bodiless definitions inside a `visualizer` are references and are not
/// compiled. When two definitions share an exact key the first one wins.
#[must_use]
pub fn compile_program(program: &Program, nested: bool) -> Compilation {
    let mut compiler = Compiler::default();
    let ctx = WalkContext::root(nested);
    for definition in &program.definitions {
        compiler.definition(definition, &ctx);
    }
    debug!(resources = compiler.out.resources.len(), nested, "compiled program");
    compiler.out
}

#[derive(Default)]
struct Compiler {
    out: Compilation,
}

impl Compiler {
    fn push(&mut self, resource: ParsedResource) {
        let slot = self.out.resources.len();
        self.insert_at(slot, resource);
    }

    fn insert_at(&mut self, slot: usize, resource: ParsedResource) {
        if self.out.keys.insert(&resource.key()) {
            self.out.resources.insert(slot, resource);
        } else {
            warn!(key = %resource.key(), "duplicate definition ignored, the first one wins");
        }
    }

    fn definition(&mut self, definition: &Definition, ctx: &WalkContext) {
        match definition {
            Definition::Domain(d) => {
                self.domain(d, ctx, false);
            }
            Definition::Service(s) => {
                self.service(s, ctx);
            }
            Definition::Visualizer(v) => {
                for inner in v.definitions.iter().filter(|d| has_body(d)) {
                    self.definition(inner, ctx);
                }
            }
            Definition::Channel(def) => self.field_def(ResourceType::Channel, def, ctx),
            Definition::Container(def) => self.field_def(ResourceType::Container, def, ctx),
            Definition::Message(m) => self.field_def(m.message_type.resource_type(), &m.def, ctx),
            Definition::Team(def) => self.field_def(ResourceType::Team, def, ctx),
            Definition::User(def) => self.field_def(ResourceType::User, def, ctx),
            Definition::DataProduct(def) => self.field_def(ResourceType::DataProduct, def, ctx),
            Definition::Diagram(def) => self.field_def(ResourceType::Diagram, def, ctx),
        }
    }

    /// Compile a domain and its children; returns the pointer for the parent
    fn domain(&mut self, def: &DomainDef, ctx: &WalkContext, subdomain: bool) -> ResourceRef {
        let id = def.reference.id.as_str();
        let items = def.body.as_deref().unwrap_or_default();
        let declared = items.iter().find_map(|item| match item {
            DomainItem::Field(f) if f.key == "version" => Some(f.value.as_text()),
            _ => None,
        });
        let version = declared
            .or_else(|| def.reference.version.clone())
            .unwrap_or_else(|| DEFAULT_VERSION.to_string());

        let dir = if subdomain {
            ctx.domain_dir(id)
        } else {
            WalkContext::root(false).domain_dir(id)
        };
        let inner = ctx.enter_domain(dir.clone());
        let slot = self.out.resources.len();

        let mut fm = Frontmatter::with_id(id);
        fm.version = Some(version.clone());
        for item in items {
            match item {
                DomainItem::Field(f) => apply_field(ResourceType::Domain, &mut fm, f),
                DomainItem::Service(s) => {
                    let service = if s.body.is_some() {
                        self.service(s, &inner)
                    } else {
                        to_ref(&s.reference)
                    };
                    fm.services.push(service);
                }
                DomainItem::Subdomain(sd) => {
                    let sub = if sd.body.is_some() {
                        self.domain(sd, &inner, true)
                    } else {
                        to_ref(&sd.reference)
                    };
                    fm.domains.push(sub);
                }
                DomainItem::Sends(m) => {
                    fm.sends.push(pointer(m, true));
                    self.inline_message(m, &inner);
                }
                DomainItem::Receives(m) => {
                    fm.receives.push(pointer(m, false));
                    self.inline_message(m, &inner);
                }
                DomainItem::Channel(c) => self.field_def(ResourceType::Channel, c, &inner),
                DomainItem::Container(c) => self.field_def(ResourceType::Container, c, &inner),
            }
        }
        finish(&mut fm);

        self.insert_at(
            slot,
            ParsedResource {
                resource_type: ResourceType::Domain,
                frontmatter: fm,
                markdown: String::new(),
                path: resource_file(&dir, Some(&version)),
                origin: Origin::Definition,
            },
        );
        ResourceRef::new(id, Some(&version))
    }

    /// Compile a service and its inline messages; returns the pointer for the parent
    fn service(&mut self, def: &ServiceDef, ctx: &WalkContext) -> ResourceRef {
        let id = def.reference.id.as_str();
        let version = def
            .declared_version()
            .or(def.reference.version.as_deref())
            .unwrap_or(DEFAULT_VERSION)
            .to_string();
        let dir = ctx.service_dir(id);
        let inner = ctx.enter_service(dir.clone());
        let slot = self.out.resources.len();

        let mut fm = Frontmatter::with_id(id);
        fm.version = Some(version.clone());
        for stmt in def.body.iter().flatten() {
            match stmt {
                Statement::Version(_) => {}
                Statement::Field(f) => apply_field(ResourceType::Service, &mut fm, f),
                Statement::Sends(m) => {
                    fm.sends.push(pointer(m, true));
                    self.inline_message(m, &inner);
                }
                Statement::Receives(m) => {
                    fm.receives.push(pointer(m, false));
                    self.inline_message(m, &inner);
                }
                Statement::WritesTo(r) => fm.writes_to.push(to_ref(r)),
                Statement::ReadsFrom(r) => fm.reads_from.push(to_ref(r)),
            }
        }
        finish(&mut fm);

        self.insert_at(
            slot,
            ParsedResource {
                resource_type: ResourceType::Service,
                frontmatter: fm,
                markdown: String::new(),
                path: resource_file(&dir, Some(&version)),
                origin: Origin::Definition,
            },
        );
        ResourceRef::new(id, Some(&version))
    }

    fn inline_message(&mut self, stmt: &MessageStmt, ctx: &WalkContext) {
        if let Some(fields) = &stmt.body {
            let def = FieldDef {
                reference: stmt.reference.clone(),
                body: Some(fields.clone()),
            };
            self.field_def(stmt.message_type.resource_type(), &def, ctx);
        }
    }

    /// Compile a definition made of a flat field bag
    fn field_def(&mut self, resource_type: ResourceType, def: &FieldDef, ctx: &WalkContext) {
        let id = def.reference.id.as_str();
        let mut fm = Frontmatter::with_id(id);
        let path = if resource_type.is_versioned() {
            let version = def
                .fields()
                .find(|f| f.key == "version")
                .map(|f| f.value.as_text())
                .or_else(|| def.reference.version.clone())
                .unwrap_or_else(|| DEFAULT_VERSION.to_string());
            let dir = join_dir(ctx.prefix_for(resource_type), resource_type, id);
            let path = resource_file(&dir, Some(&version));
            fm.version = Some(version);
            path
        } else {
            resource_file(&format!("{}/{id}", resource_type.folder()), None)
        };

        for field in def.fields() {
            apply_field(resource_type, &mut fm, field);
        }
        finish(&mut fm);

        self.push(ParsedResource {
            resource_type,
            frontmatter: fm,
            markdown: String::new(),
            path,
            origin: Origin::Definition,
        });
    }
}

fn has_body(definition: &Definition) -> bool {
    match definition {
        Definition::Domain(d) => d.body.is_some(),
        Definition::Service(s) => s.body.is_some(),
        Definition::Visualizer(_) => true,
        Definition::Channel(def)
        | Definition::Container(def)
        | Definition::Team(def)
        | Definition::User(def)
        | Definition::DataProduct(def)
        | Definition::Diagram(def) => def.body.is_some(),
        Definition::Message(m) => m.def.body.is_some(),
    }
}

fn to_ref(reference: &Reference) -> ResourceRef {
    ResourceRef::new(reference.id.clone(), reference.version.as_deref())
}

/// Frontmatter pointer for a sends (`to`) or receives (`from`) statement
fn pointer(stmt: &MessageStmt, sends: bool) -> MessagePointer {
    let channels: Vec<ChannelRef> = stmt
        .channels
        .iter()
        .map(|c| ChannelRef {
            id: c.reference.id.clone(),
            version: c.reference.version.clone(),
            delivery_mode: c.delivery_mode.clone(),
        })
        .collect();
    let mut pointer = MessagePointer::new(stmt.reference.id.clone(), stmt.reference.version.as_deref());
    if sends {
        pointer.to = channels;
    } else {
        pointer.from = channels;
    }
    pointer
}

/// Defaults and list deduplication applied to every compiled resource
fn finish(fm: &mut Frontmatter) {
    if fm.name.is_none() {
        fm.name = Some(fm.id.clone());
    }
    fm.sends = dedup_pointers(std::mem::take(&mut fm.sends));
    fm.receives = dedup_pointers(std::mem::take(&mut fm.receives));
    fm.writes_to = dedup_refs(std::mem::take(&mut fm.writes_to));
    fm.reads_from = dedup_refs(std::mem::take(&mut fm.reads_from));
    fm.services = dedup_refs(std::mem::take(&mut fm.services));
    fm.domains = dedup_refs(std::mem::take(&mut fm.domains));
    dedup_strings(&mut fm.owners);
    dedup_strings(&mut fm.members);
    dedup_strings(&mut fm.protocols);
}

fn dedup_strings(values: &mut Vec<String>) {
    let mut seen = HashSet::new();
    values.retain(|v| seen.insert(v.clone()));
}

fn apply_field(resource_type: ResourceType, fm: &mut Frontmatter, field: &Field) {
    let text = field.value.as_text();
    match (resource_type, field.key.as_str()) {
        (_, "version") => {}
        (_, "name") => fm.name = Some(text),
        (_, "summary") => fm.summary = Some(text),
        (_, "owner") => fm.owners.push(text),
        (_, "deprecated") => fm.deprecated = field.value.as_bool().unwrap_or(false),
        (_, "draft") => fm.draft = field.value.as_bool().unwrap_or(false),

        (ResourceType::Channel, "address") => fm.address = Some(text),
        (ResourceType::Channel, "protocol") => fm.protocols.push(text),

        (ResourceType::Container, "container-type") => fm.container_type = Some(text),
        (ResourceType::Container, "technology") => fm.technology = Some(text),
        (ResourceType::Container, "access-mode") => fm.access_mode = Some(text),
        (ResourceType::Container, "classification") => fm.classification = Some(text),
        (ResourceType::Container, "residency") => fm.residency = Some(text),
        (ResourceType::Container, "retention") => fm.retention = Some(text),
        (ResourceType::Container, "authoritative") => fm.authoritative = field.value.as_bool(),

        (ResourceType::Team | ResourceType::User, "email") => fm.email = Some(text),
        (ResourceType::Team, "slack") => fm.slack = Some(text),
        (ResourceType::Team, "ms-teams") => fm.ms_teams = Some(text),
        (ResourceType::Team, "member") => fm.members.push(text),
        (ResourceType::User, "avatar") => fm.avatar_url = Some(text),
        (ResourceType::User, "role") => fm.role = Some(text),
        (ResourceType::User, "slack") => fm.slack_direct_message_url = Some(text),
        (ResourceType::User, "ms-teams") => fm.ms_teams_direct_message_url = Some(text),

        (_, key) => debug!(%resource_type, id = %fm.id, key, "ignoring unknown field"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog_dsl::{DslParser, TextParser};

    fn compile(src: &str, nested: bool) -> Compilation {
        compile_program(&TextParser::new().parse(src).unwrap(), nested)
    }

    fn find<'a>(c: &'a Compilation, t: ResourceType, id: &str) -> &'a ParsedResource {
        c.resources
            .iter()
            .find(|r| r.resource_type == t && r.id() == id)
            .unwrap_or_else(|| panic!("{t}:{id} not compiled"))
    }

    #[test]
    fn test_compile_event_defaults() {
        let c = compile("event OrderCreated { summary \"Placed\" }", true);
        let e = find(&c, ResourceType::Event, "OrderCreated");
        assert_eq!(e.version(), Some("0.0.1"));
        assert_eq!(e.frontmatter.name.as_deref(), Some("OrderCreated"));
        assert_eq!(e.frontmatter.summary.as_deref(), Some("Placed"));
        assert_eq!(e.path, "events/OrderCreated/versioned/0.0.1/index.md");
        assert_eq!(e.origin, Origin::Definition);
    }

    #[test]
    fn test_compile_service_frontmatter() {
        let c = compile(
            r#"service OrderService {
                 version 1.2.0
                 owner orders-team
                 sends event OrderCreated@1.0.0 to orders delivery push
                 sends event OrderCreated@1.0.0 to orders
                 receives command PlaceOrder from inbox
                 writes-to container OrdersDb
                 reads-from container Inventory@2.0.0
               }"#,
            true,
        );
        let s = find(&c, ResourceType::Service, "OrderService");
        let fm = &s.frontmatter;
        assert_eq!(fm.version.as_deref(), Some("1.2.0"));
        assert_eq!(fm.owners, vec!["orders-team".to_string()]);
        assert_eq!(fm.sends.len(), 1);
        assert_eq!(fm.sends[0].to[0].delivery_mode.as_deref(), Some("push"));
        assert_eq!(fm.receives[0].from[0].id, "inbox");
        assert_eq!(fm.writes_to, vec![ResourceRef::new("OrdersDb", None)]);
        assert_eq!(fm.reads_from, vec![ResourceRef::new("Inventory", Some("2.0.0"))]);
        assert_eq!(s.path, "services/OrderService/versioned/1.2.0/index.md");
    }

    #[test]
    fn test_compile_nested_paths() {
        let c = compile(
            r#"domain Payment {
                 service OrderService {
                   sends event PaymentTaken { version 2.0.0 }
                 }
                 subdomain Billing {
                   service Invoicer { version 1.0.0 }
                   container LedgerDb { technology "postgres" }
                 }
               }"#,
            true,
        );
        assert_eq!(
            find(&c, ResourceType::Domain, "Payment").path,
            "domains/Payment/versioned/0.0.1/index.md"
        );
        assert_eq!(
            find(&c, ResourceType::Service, "OrderService").path,
            "domains/Payment/services/OrderService/versioned/0.0.1/index.md"
        );
        assert_eq!(
            find(&c, ResourceType::Event, "PaymentTaken").path,
            "domains/Payment/services/OrderService/events/PaymentTaken/versioned/2.0.0/index.md"
        );
        assert_eq!(
            find(&c, ResourceType::Domain, "Billing").path,
            "domains/Payment/subdomains/Billing/versioned/0.0.1/index.md"
        );
        assert_eq!(
            find(&c, ResourceType::Service, "Invoicer").path,
            "domains/Payment/subdomains/Billing/services/Invoicer/versioned/1.0.0/index.md"
        );
        assert_eq!(
            find(&c, ResourceType::Container, "LedgerDb").path,
            "domains/Payment/subdomains/Billing/containers/LedgerDb/versioned/0.0.1/index.md"
        );

        let payment = find(&c, ResourceType::Domain, "Payment");
        assert_eq!(payment.frontmatter.services, vec![ResourceRef::new("OrderService", Some("0.0.1"))]);
        assert_eq!(payment.frontmatter.domains, vec![ResourceRef::new("Billing", Some("0.0.1"))]);
        // parent first
        assert_eq!(c.resources[0].id(), "Payment");
    }

    #[test]
    fn test_compile_flat_paths() {
        let c = compile(
            "domain Payment { service OrderService { sends event Paid { summary \"x\" } } }",
            false,
        );
        assert_eq!(
            find(&c, ResourceType::Service, "OrderService").path,
            "services/OrderService/versioned/0.0.1/index.md"
        );
        assert_eq!(
            find(&c, ResourceType::Event, "Paid").path,
            "events/Paid/versioned/0.0.1/index.md"
        );
    }

    #[test]
    fn test_compile_domain_references() {
        let c = compile("domain Sales { service Orders@2.0.0 subdomain Returns }", true);
        assert_eq!(c.resources.len(), 1);
        let sales = &c.resources[0].frontmatter;
        assert_eq!(sales.services, vec![ResourceRef::new("Orders", Some("2.0.0"))]);
        assert_eq!(sales.domains, vec![ResourceRef::new("Returns", None)]);
    }

    #[test]
    fn test_compile_team_user_channel_container() {
        let c = compile(
            r#"team orders-team { name "Orders" member alice member bob slack "https://slack/orders" }
               user alice { name "Alice" avatar "https://a/img.png" role "Engineer" }
               channel orders { address "orders.v1" protocol "kafka" protocol "http" }
               container OrdersDb { container-type database access-mode readWrite authoritative true }"#,
            true,
        );
        let team = find(&c, ResourceType::Team, "orders-team");
        assert_eq!(team.version(), None);
        assert_eq!(team.path, "teams/orders-team.md");
        assert_eq!(team.frontmatter.members, vec!["alice".to_string(), "bob".to_string()]);
        assert_eq!(team.frontmatter.slack.as_deref(), Some("https://slack/orders"));

        let user = find(&c, ResourceType::User, "alice");
        assert_eq!(user.frontmatter.avatar_url.as_deref(), Some("https://a/img.png"));

        let channel = find(&c, ResourceType::Channel, "orders");
        assert_eq!(channel.frontmatter.protocols, vec!["kafka".to_string(), "http".to_string()]);

        let db = find(&c, ResourceType::Container, "OrdersDb");
        assert_eq!(db.frontmatter.container_type.as_deref(), Some("database"));
        assert_eq!(db.frontmatter.authoritative, Some(true));
    }

    #[test]
    fn test_visualizer_references_not_compiled() {
        let c = compile(
            "visualizer main { name \"V\" event OrderCreated service S { version 1.0.0 } }",
            true,
        );
        assert_eq!(c.resources.len(), 1);
        assert_eq!(c.resources[0].id(), "S");
    }

    #[test]
    fn test_duplicate_definition_first_wins() {
        let c = compile(
            "event A { version 1.0.0 summary \"first\" } event A { version 1.0.0 summary \"second\" } event A { version 2.0.0 }",
            true,
        );
        assert_eq!(c.resources.len(), 2);
        assert_eq!(c.resources[0].frontmatter.summary.as_deref(), Some("first"));
    }

    #[test]
    fn test_compiled_keys_any_version() {
        let c = compile("event A { version 1.0.0 }", true);
        let v1 = ResourceKey::exact(ResourceType::Event, "A", "1.0.0");
        let v2 = ResourceKey::exact(ResourceType::Event, "A", "2.0.0");
        let default = ResourceKey::exact(ResourceType::Event, "A", DEFAULT_VERSION);
        assert!(c.keys.satisfies(&v1, true));
        assert!(c.keys.satisfies(&default, false));
        assert!(!c.keys.satisfies(&v2, true));
        assert!(!c.keys.satisfies(&ResourceKey::exact(ResourceType::Command, "A", "1.0.0"), false));
    }
}
