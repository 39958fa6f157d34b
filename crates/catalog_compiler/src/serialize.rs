//! Field-to-line serialization of catalog resources into DSL blocks.

use crate::index::ResolveMessageType;
use catalog_core::{ChannelRef, MessagePointer, ResourceRef, ResourceType};
use catalog_sdk::{CatalogResource, Frontmatter};

const PAD: &str = "  ";

/// DSL block for a single resource
///
/// Messages whose collection the resolver cannot determine are left out of
/// `sends`/`receives` lines. Subdomains are written as references; use
/// [`serialize_domain`] to embed them.
#[must_use]
pub fn serialize_resource(resource: &CatalogResource, resolver: &dyn ResolveMessageType) -> String {
    if resource.resource_type == ResourceType::Domain {
        return serialize_domain(resource, resolver, "domain", None);
    }

    let fm = &resource.frontmatter;
    let mut lines = base_lines(resource);
    match resource.resource_type {
        ResourceType::Service => {
            lines.extend(pointer_lines(&fm.sends, Direction::Sends, resolver));
            lines.extend(pointer_lines(&fm.receives, Direction::Receives, resolver));
            lines.extend(fm.writes_to.iter().map(|r| format!("{PAD}writes-to container {r}")));
            lines.extend(fm.reads_from.iter().map(|r| format!("{PAD}reads-from container {r}")));
        }
        ResourceType::Channel => {
            push_quoted(&mut lines, "address", fm.address.as_deref());
            for protocol in &fm.protocols {
                push_quoted(&mut lines, "protocol", Some(protocol));
            }
        }
        ResourceType::Container => container_lines(fm, &mut lines),
        ResourceType::Team => {
            push_quoted(&mut lines, "email", fm.email.as_deref());
            push_quoted(&mut lines, "slack", fm.slack.as_deref());
            push_quoted(&mut lines, "ms-teams", fm.ms_teams.as_deref());
            lines.extend(fm.members.iter().map(|m| format!("{PAD}member {m}")));
        }
        ResourceType::User => {
            push_quoted(&mut lines, "avatar", fm.avatar_url.as_deref());
            push_quoted(&mut lines, "role", fm.role.as_deref());
            push_quoted(&mut lines, "email", fm.email.as_deref());
            push_quoted(&mut lines, "slack", fm.slack_direct_message_url.as_deref());
            push_quoted(&mut lines, "ms-teams", fm.ms_teams_direct_message_url.as_deref());
        }
        _ => {}
    }
    block(resource.resource_type.keyword(), resource.id(), &lines)
}

/// DSL block for a domain under `keyword` (`domain` or `subdomain`)
///
/// With `embedded` the given subdomain blocks are nested one level deep in
/// place of `subdomain <id>` reference lines.
#[must_use]
pub fn serialize_domain(
    domain: &CatalogResource,
    resolver: &dyn ResolveMessageType,
    keyword: &str,
    embedded: Option<&[String]>,
) -> String {
    let fm = &domain.frontmatter;
    let mut lines = base_lines(domain);
    lines.extend(fm.services.iter().map(|s| format!("{PAD}service {s}")));
    lines.extend(pointer_lines(&fm.sends, Direction::Sends, resolver));
    lines.extend(pointer_lines(&fm.receives, Direction::Receives, resolver));
    match embedded {
        Some(blocks) => lines.extend(blocks.iter().map(|b| indent(b, PAD.len()))),
        None => lines.extend(fm.domains.iter().map(|d: &ResourceRef| format!("{PAD}subdomain {d}"))),
    }
    block(keyword, domain.id(), &lines)
}

/// Prefix every line of `text` with `by` spaces
#[must_use]
pub fn indent(text: &str, by: usize) -> String {
    let pad = " ".repeat(by);
    text.lines().map(|line| format!("{pad}{line}")).collect::<Vec<_>>().join("\n")
}

fn block(keyword: &str, id: &str, lines: &[String]) -> String {
    if lines.is_empty() {
        format!("{keyword} {id}")
    } else {
        format!("{keyword} {id} {{\n{}\n}}", lines.join("\n"))
    }
}

fn base_lines(resource: &CatalogResource) -> Vec<String> {
    let fm = &resource.frontmatter;
    let mut lines = Vec::new();
    if let Some(version) = resource.version() {
        lines.push(format!("{PAD}version {version}"));
    }
    push_quoted(&mut lines, "name", fm.name.as_deref());
    push_quoted(&mut lines, "summary", fm.summary.as_deref().map(str::trim));
    lines.extend(fm.owners.iter().map(|o| format!("{PAD}owner {o}")));
    if fm.deprecated {
        lines.push(format!("{PAD}deprecated true"));
    }
    if fm.draft {
        lines.push(format!("{PAD}draft true"));
    }
    lines
}

fn container_lines(fm: &Frontmatter, lines: &mut Vec<String>) {
    push_quoted(lines, "container-type", fm.container_type.as_deref());
    push_quoted(lines, "technology", fm.technology.as_deref());
    push_quoted(lines, "access-mode", fm.access_mode.as_deref());
    push_quoted(lines, "classification", fm.classification.as_deref());
    push_quoted(lines, "residency", fm.residency.as_deref());
    push_quoted(lines, "retention", fm.retention.as_deref());
    if let Some(authoritative) = fm.authoritative {
        lines.push(format!("{PAD}authoritative {authoritative}"));
    }
}

fn push_quoted(lines: &mut Vec<String>, key: &str, value: Option<&str>) {
    if let Some(value) = value.filter(|v| !v.is_empty()) {
        lines.push(format!("{PAD}{key} {}", quote(value)));
    }
}

fn quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}

#[derive(Clone, Copy)]
enum Direction {
    Sends,
    Receives,
}

fn pointer_lines(pointers: &[MessagePointer], direction: Direction, resolver: &dyn ResolveMessageType) -> Vec<String> {
    let (verb, preposition) = match direction {
        Direction::Sends => ("sends", "to"),
        Direction::Receives => ("receives", "from"),
    };
    pointers
        .iter()
        .filter_map(|pointer| {
            let message_type = resolver.resolve(&pointer.id)?;
            let reference = pointer.to_ref();
            let channels = match direction {
                Direction::Sends => &pointer.to,
                Direction::Receives => &pointer.from,
            };
            let mut line = format!("{PAD}{verb} {} {reference}", message_type.keyword());
            if !channels.is_empty() {
                let list: Vec<String> = channels.iter().map(channel_attachment).collect();
                line.push_str(&format!(" {preposition} {}", list.join(", ")));
            }
            Some(line)
        })
        .collect()
}

fn channel_attachment(channel: &ChannelRef) -> String {
    match &channel.delivery_mode {
        Some(mode) => format!("{channel} delivery {mode}"),
        None => channel.to_string(),
    }
}
