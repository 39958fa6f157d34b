//! Minimal resources for references that have no definition.

use crate::compile::{CompiledKeys, Origin, ParsedResource, WalkContext, join_dir, resource_file, stub_frontmatter};
use catalog_core::{DEFAULT_VERSION, ResourceKey, ResourceType};
use catalog_dsl::{ChannelAttachment, Definition, DomainDef, DomainItem, MessageStmt, Program, Reference, ServiceDef, Statement};
use std::collections::HashSet;
use tracing::debug;

/// Stubs for every message, channel and container reference that the
/// document does not define
///
/// A reference with an explicit version needs exactly that version to be
/// compiled; an unversioned reference is satisfied by any compiled version.
/// Each stub key is emitted once, in discovery order.
#[must_use]
pub fn synthesize_stubs(program: &Program, compiled: &CompiledKeys, nested: bool) -> Vec<ParsedResource> {
    let mut walker = StubWalker {
        compiled,
        emitted: HashSet::new(),
        out: Vec::new(),
    };
    let ctx = WalkContext::root(nested);
    for definition in &program.definitions {
        walker.definition(definition, &ctx);
    }
    debug!(stubs = walker.out.len(), "synthesized stubs");
    walker.out
}

struct StubWalker<'a> {
    compiled: &'a CompiledKeys,
    emitted: HashSet<ResourceKey>,
    out: Vec<ParsedResource>,
}

impl StubWalker<'_> {
    fn definition(&mut self, definition: &Definition, ctx: &WalkContext) {
        match definition {
            Definition::Domain(d) => self.domain(d, ctx, false),
            Definition::Service(s) => self.service(s, ctx),
            Definition::Visualizer(v) => {
                for inner in &v.definitions {
                    self.definition(inner, ctx);
                }
            }
            Definition::Channel(_)
            | Definition::Container(_)
            | Definition::Message(_)
            | Definition::Team(_)
            | Definition::User(_)
            | Definition::DataProduct(_)
            | Definition::Diagram(_) => {}
        }
    }

    fn domain(&mut self, def: &DomainDef, ctx: &WalkContext, subdomain: bool) {
        let Some(items) = &def.body else {
            return;
        };
        let dir = if subdomain {
            ctx.domain_dir(&def.reference.id)
        } else {
            WalkContext::root(false).domain_dir(&def.reference.id)
        };
        let inner = ctx.enter_domain(dir);
        for item in items {
            match item {
                DomainItem::Service(s) => self.service(s, &inner),
                DomainItem::Subdomain(sd) => self.domain(sd, &inner, true),
                DomainItem::Sends(m) | DomainItem::Receives(m) => self.message(m, &inner),
                DomainItem::Field(_) | DomainItem::Channel(_) | DomainItem::Container(_) => {}
            }
        }
    }

    fn service(&mut self, def: &ServiceDef, ctx: &WalkContext) {
        let Some(statements) = &def.body else {
            return;
        };
        let inner = ctx.enter_service(ctx.service_dir(&def.reference.id));
        for stmt in statements {
            match stmt {
                Statement::Sends(m) | Statement::Receives(m) => self.message(m, &inner),
                Statement::WritesTo(r) | Statement::ReadsFrom(r) => {
                    self.stub(ResourceType::Container, r, &inner);
                }
                Statement::Version(_) | Statement::Field(_) => {}
            }
        }
    }

    fn message(&mut self, stmt: &MessageStmt, ctx: &WalkContext) {
        if stmt.body.is_none() {
            self.stub(stmt.message_type.resource_type(), &stmt.reference, ctx);
        }
        for ChannelAttachment { reference, .. } in &stmt.channels {
            self.stub(ResourceType::Channel, reference, ctx);
        }
    }

    fn stub(&mut self, resource_type: ResourceType, reference: &Reference, ctx: &WalkContext) {
        let explicit_version = reference.version.is_some();
        let version = reference.version.as_deref().unwrap_or(DEFAULT_VERSION);
        let key = ResourceKey::exact(resource_type, reference.id.clone(), version);
        if self.compiled.satisfies(&key, explicit_version) || !self.emitted.insert(key.clone()) {
            return;
        }

        let dir = join_dir(ctx.prefix_for(resource_type), resource_type, &reference.id);
        debug!(%key, "stubbing reference");
        self.out.push(ParsedResource {
            resource_type,
            frontmatter: stub_frontmatter(&reference.id, version),
            markdown: String::new(),
            path: resource_file(&dir, Some(version)),
            origin: Origin::Stub { explicit_version },
        });
    }
}
