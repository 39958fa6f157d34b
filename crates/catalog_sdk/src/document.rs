//! Markdown documents with a YAML frontmatter header.

use crate::resource::Frontmatter;
use catalog_core::{CatalogError, CatalogResult};
use once_cell::sync::Lazy;
use regex::Regex;
use std::borrow::Cow;
use std::path::Path;

const FENCE: &str = "---";

/// A `version:` key holding a bare number, at any depth or as a list item
static NUMERIC_VERSION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^([ \t]*(?:-[ \t]+)?version:[ \t]*)([0-9]+(?:\.[0-9]+)*)([ \t]*\r?)$")
        .expect("numeric version pattern compiles")
});

/// Split a document into frontmatter and markdown body
///
/// # Errors
///
/// Returns `Document` if the header is missing, unterminated or not valid YAML
pub fn parse_document(text: &str, path: &Path) -> CatalogResult<(Frontmatter, String)> {
    let invalid = |reason: String| CatalogError::Document {
        path: path.display().to_string(),
        reason,
    };

    let text = text.trim_start_matches('\u{feff}');
    let rest = text
        .strip_prefix(FENCE)
        .and_then(|r| r.strip_prefix("\r\n").or_else(|| r.strip_prefix('\n')))
        .ok_or_else(|| invalid("missing frontmatter".to_string()))?;

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == FENCE {
            let yaml = &rest[..offset];
            let body = &rest[offset + line.len()..];
            let yaml = quote_numeric_versions(yaml);
            let frontmatter: Frontmatter =
                serde_yaml::from_str(&yaml).map_err(|e| invalid(e.to_string()))?;
            return Ok((frontmatter, body.trim_start_matches(['\r', '\n']).to_string()));
        }
        offset += line.len();
    }

    Err(invalid("unterminated frontmatter".to_string()))
}

/// Render frontmatter and body back into a document
///
/// # Errors
///
/// Returns `Document` if the frontmatter cannot be serialized
pub fn render_document(frontmatter: &Frontmatter, markdown: &str, path: &Path) -> CatalogResult<String> {
    let yaml = serde_yaml::to_string(frontmatter).map_err(|e| CatalogError::Document {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    if markdown.is_empty() {
        Ok(format!("{FENCE}\n{yaml}{FENCE}\n"))
    } else {
        Ok(format!("{FENCE}\n{yaml}{FENCE}\n\n{markdown}"))
    }
}

/// Quote unquoted numeric versions so YAML keeps their text (`1.10` is not `1.1`)
fn quote_numeric_versions(yaml: &str) -> Cow<'_, str> {
    NUMERIC_VERSION_RE.replace_all(yaml, "${1}\"${2}\"${3}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_document() {
        let text = "---\nid: OrderCreated\nversion: 1.0.0\nname: Order Created\n---\n\n# Hello\n\n<NodeGraph />\n";
        let (fm, body) = parse_document(text, Path::new("index.mdx")).unwrap();
        assert_eq!(fm.id, "OrderCreated");
        assert_eq!(fm.version.as_deref(), Some("1.0.0"));
        assert_eq!(body, "# Hello\n\n<NodeGraph />\n");
    }

    #[test]
    fn test_render_then_parse_keeps_body() {
        let mut fm = Frontmatter::with_id("Orders");
        fm.summary = Some("Handles orders".into());
        let rendered = render_document(&fm, "Some prose", Path::new("x")).unwrap();
        assert!(rendered.starts_with("---\nid: Orders\n"));
        let (back, body) = parse_document(&rendered, Path::new("x")).unwrap();
        assert_eq!(back, fm);
        assert_eq!(body, "Some prose");
    }

    #[test]
    fn test_render_empty_body() {
        let rendered = render_document(&Frontmatter::with_id("A"), "", Path::new("x")).unwrap();
        assert_eq!(rendered, "---\nid: A\n---\n");
    }

    #[test]
    fn test_parse_document_errors() {
        let err = parse_document("# no header", Path::new("a.md")).unwrap_err();
        assert!(err.to_string().contains("missing frontmatter"));

        let err = parse_document("---\nid: A\n", Path::new("a.md")).unwrap_err();
        assert!(err.to_string().contains("unterminated"));

        let err = parse_document("---\nname: only\n---\n", Path::new("a.md")).unwrap_err();
        assert!(matches!(err, CatalogError::Document { .. }));
    }

    #[test]
    fn test_parse_crlf_document() {
        let text = "---\r\nid: A\r\n---\r\nbody";
        let (fm, body) = parse_document(text, Path::new("a.md")).unwrap();
        assert_eq!(fm.id, "A");
        assert_eq!(body, "body");
    }

    #[test]
    fn test_numeric_versions_keep_their_text() {
        let text = "---\nid: Orders\nversion: 1.10\nsends:\n  - id: OrderCreated\n    version: 2.0\n  - version: 3\n    id: OrderUpdated\n---\n";
        let (fm, _) = parse_document(text, Path::new("a.md")).unwrap();
        assert_eq!(fm.version.as_deref(), Some("1.10"));
        assert_eq!(fm.sends[0].version.as_deref(), Some("2.0"));
        assert_eq!(fm.sends[1].version.as_deref(), Some("3"));
    }

    #[test]
    fn test_quoting_leaves_other_scalars_alone() {
        let yaml = "id: A\nversion: \"1.0\"\nname: version: 1.0\nretention: 1.10\n";
        assert_eq!(quote_numeric_versions(yaml), yaml);
    }
}
