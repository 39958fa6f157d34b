//! Output formatting: DSL sections, the visualizer block and the import report.

use crate::reconcile::{ImportResult, ResultEntry};
use catalog_core::ResourceType;
use console::style;
use indexmap::IndexMap;
use std::collections::BTreeMap;

const SECTION_ORDER: [(&str, &str); 8] = [
    ("team", "TEAMS"),
    ("user", "USERS"),
    ("channel", "CHANNELS"),
    ("event", "EVENTS"),
    ("command", "COMMANDS"),
    ("query", "QUERIES"),
    ("service", "SERVICES"),
    ("domain", "DOMAINS"),
];

/// Bucket blank-line separated blocks by leading keyword into labelled sections
///
/// `subdomain` blocks count as domains. Keywords outside the fixed order
/// follow in first-seen order under their uppercased keyword.
#[must_use]
pub fn group_dsl_blocks(dsl: &str) -> String {
    let mut buckets: IndexMap<&str, Vec<&str>> = IndexMap::new();
    for block in dsl.split("\n\n").filter(|b| !b.trim().is_empty()) {
        let keyword = block.split_whitespace().next().unwrap_or_default();
        let keyword = if keyword == "subdomain" { "domain" } else { keyword };
        buckets.entry(keyword).or_default().push(block);
    }

    let mut sections = Vec::new();
    for (keyword, label) in SECTION_ORDER {
        if let Some(blocks) = buckets.shift_remove(keyword) {
            sections.push(format!("// {label}\n{}", blocks.join("\n\n")));
        }
    }
    for (keyword, blocks) in buckets {
        sections.push(format!("// {}\n{}", keyword.to_uppercase(), blocks.join("\n\n")));
    }
    sections.join("\n\n")
}

/// Trailing `visualizer main` block listing the top-level entities of `types`
///
/// An entity is a line opening a block (`<keyword> <id> {`) or an unindented
/// bare `<keyword> <id>`. Returns an empty string when nothing matches.
#[must_use]
pub fn build_visualizer_block(dsl: &str, name: &str, types: &[ResourceType]) -> String {
    let entries: Vec<String> = dsl
        .lines()
        .filter_map(|line| {
            let trimmed = line.trim_start();
            let words: Vec<&str> = trimmed.split_whitespace().collect();
            let (&keyword, &id) = (words.first()?, words.get(1)?);
            if !types.iter().any(|t| t.keyword() == keyword) {
                return None;
            }
            let opens_block = trimmed.ends_with('{');
            let bare = line.len() == trimmed.len() && words.len() == 2;
            (opens_block || bare).then(|| format!("  {keyword} {id}"))
        })
        .collect();

    if entries.is_empty() {
        return String::new();
    }
    format!("\nvisualizer main {{\n  name \"{name}\"\n{}\n}}", entries.join("\n"))
}

/// Human readable import report
#[must_use]
pub fn render_import_report(result: &ImportResult) -> String {
    let mut out = vec![String::new()];
    if result.dry_run {
        out.push(format!(
            "  {} {}",
            style(" DRY RUN ").black().on_yellow().bold(),
            style("No files were written").dim()
        ));
        out.push(String::new());
    }
    if result.is_empty() {
        out.push(format!("  {}", style("No resources found").yellow()));
        out.push(String::new());
        return out.join("\n");
    }

    let (created, updated, versioned) = if result.dry_run {
        ("Would create", "Would update", "Would version")
    } else {
        ("Created", "Updated", "Versioned")
    };
    let sections = [
        (created, "resource(s)", &result.created),
        (updated, "resource(s)", &result.updated),
        (versioned, "existing resource(s)", &result.versioned),
    ];
    for (verb, noun, entries) in sections {
        if entries.is_empty() {
            continue;
        }
        let header = format!("{verb} {} {noun}", entries.len());
        out.push(format!("  {}", style(header).green().bold()));
        let pairs = entries.iter().map(|ResultEntry { resource_type, label }| (*resource_type, label.clone()));
        render_groups(&mut out, pairs);
        out.push(String::new());
    }

    if !result.errors.is_empty() {
        let header = format!("Failed {} resource(s)", result.errors.len());
        out.push(format!("  {}", style(header).red().bold()));
        let pairs = result
            .errors
            .iter()
            .map(|e| (e.resource_type, format!("{}: {}", e.label, e.message)));
        render_groups(&mut out, pairs);
        out.push(String::new());
    }
    out.join("\n")
}

fn render_groups(out: &mut Vec<String>, entries: impl Iterator<Item = (ResourceType, String)>) {
    let mut groups: BTreeMap<(usize, ResourceType), Vec<String>> = BTreeMap::new();
    for (resource_type, line) in entries {
        groups
            .entry((resource_type.report_rank(), resource_type))
            .or_default()
            .push(line);
    }
    for ((_, resource_type), mut lines) in groups {
        lines.sort();
        out.push(format!(
            "    {} {}",
            style(resource_type.folder()).cyan(),
            style(format!("({})", lines.len())).dim()
        ));
        out.extend(lines.into_iter().map(|l| format!("      {l}")));
    }
}
