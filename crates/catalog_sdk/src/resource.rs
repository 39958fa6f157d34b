//! In-memory form of a catalog resource.

use catalog_core::{MessagePointer, ResourceKey, ResourceRef, ResourceType};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// Frontmatter of a resource document
///
/// Keys not managed here are kept in `extra` so a read-then-write cycle
/// through the SDK does not lose them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Frontmatter {
    /// Resource id
    pub id: String,
    /// Display name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Version, absent for teams and users
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient_string"
    )]
    pub version: Option<String>,
    /// One-line summary
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// Team or user ids
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub owners: Vec<String>,
    /// Deprecation flag (an object with details counts as deprecated)
    #[serde(default, skip_serializing_if = "is_false", deserialize_with = "flag")]
    pub deprecated: bool,
    /// Draft flag
    #[serde(default, skip_serializing_if = "is_false", deserialize_with = "flag")]
    pub draft: bool,

    /// Messages sent (services, domains)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sends: Vec<MessagePointer>,
    /// Messages received (services, domains)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub receives: Vec<MessagePointer>,
    /// Containers written (services)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub writes_to: Vec<ResourceRef>,
    /// Containers read (services)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reads_from: Vec<ResourceRef>,
    /// Services of a domain
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub services: Vec<ResourceRef>,
    /// Subdomains of a domain
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub domains: Vec<ResourceRef>,

    /// Channel address
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    /// Channel protocols
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub protocols: Vec<String>,

    /// Container kind (`database`, `cache`, ...)
    #[serde(rename = "container_type", default, skip_serializing_if = "Option::is_none")]
    pub container_type: Option<String>,
    /// Container technology
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub technology: Option<String>,
    /// Container access mode
    #[serde(rename = "access_mode", default, skip_serializing_if = "Option::is_none")]
    pub access_mode: Option<String>,
    /// Data classification
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classification: Option<String>,
    /// Data residency
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub residency: Option<String>,
    /// Retention period
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retention: Option<String>,
    /// Whether the container is the source of truth
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authoritative: Option<bool>,

    /// Contact email (teams, users)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Slack channel (teams)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slack: Option<String>,
    /// Microsoft Teams channel (teams)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ms_teams: Option<String>,
    /// Member user ids (teams)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub members: Vec<String>,
    /// Avatar URL (users)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    /// Role (users)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// Slack DM link (users)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slack_direct_message_url: Option<String>,
    /// Microsoft Teams DM link (users)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ms_teams_direct_message_url: Option<String>,

    /// Everything else found in the document
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

impl Frontmatter {
    /// Frontmatter with only an id
    #[must_use]
    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }
}

/// A resource read from or written to the catalog
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogResource {
    /// Kind of resource
    pub resource_type: ResourceType,
    /// Parsed frontmatter
    pub frontmatter: Frontmatter,
    /// Markdown body
    pub markdown: String,
}

impl CatalogResource {
    /// Create a resource
    #[must_use]
    pub fn new(resource_type: ResourceType, frontmatter: Frontmatter, markdown: impl Into<String>) -> Self {
        Self {
            resource_type,
            frontmatter,
            markdown: markdown.into(),
        }
    }

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

    /// Display name, falling back to the id
    #[must_use]
    pub fn name(&self) -> &str {
        self.frontmatter.name.as_deref().unwrap_or(&self.frontmatter.id)
    }

    /// Exact key of this resource
    #[must_use]
    pub fn key(&self) -> ResourceKey {
        ResourceKey::new(self.resource_type, self.id(), self.version())
    }

    /// `id@version`, or the bare id for unversioned resources
    #[must_use]
    pub fn label(&self) -> String {
        match self.version() {
            Some(v) => format!("{}@{}", self.id(), v),
            None => self.id().to_string(),
        }
    }
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn is_false(b: &bool) -> bool {
    !*b
}

fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_yaml::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_yaml::Value::Bool(b) => b,
        serde_yaml::Value::Null => false,
        serde_yaml::Value::String(s) => s == "true",
        _ => true,
    })
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_yaml::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_yaml::Value::String(s)) => Some(s),
        Some(serde_yaml::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frontmatter_field_names() {
        let fm = Frontmatter {
            writes_to: vec![ResourceRef::new("OrdersDb", None)],
            container_type: Some("database".into()),
            access_mode: Some("readWrite".into()),
            slack_direct_message_url: Some("https://slack".into()),
            ..Frontmatter::with_id("X")
        };
        let yaml = serde_yaml::to_string(&fm).unwrap();
        assert!(yaml.contains("writesTo:"));
        assert!(yaml.contains("container_type: database"));
        assert!(yaml.contains("access_mode: readWrite"));
        assert!(yaml.contains("slackDirectMessageUrl:"));
        assert!(!yaml.contains("deprecated"));
    }

    #[test]
    fn test_frontmatter_keeps_unknown_keys() {
        let yaml = "id: Orders\nversion: 1.0\nbadges:\n  - content: New\nrepository:\n  url: https://git\n";
        let fm: Frontmatter = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(fm.version.as_deref(), Some("1.0"));
        assert!(fm.extra.contains_key("badges"));
        assert!(fm.extra.contains_key("repository"));

        let back = serde_yaml::to_string(&fm).unwrap();
        assert!(back.contains("badges:"));
    }

    #[test]
    fn test_deprecated_object_counts() {
        let fm: Frontmatter =
            serde_yaml::from_str("id: Old\ndeprecated:\n  message: use New\n").unwrap();
        assert!(fm.deprecated);
        let fm: Frontmatter = serde_yaml::from_str("id: Fine\n").unwrap();
        assert!(!fm.deprecated);
    }

    #[test]
    fn test_resource_label() {
        let mut fm = Frontmatter::with_id("OrderCreated");
        fm.version = Some("1.0.0".into());
        let r = CatalogResource::new(ResourceType::Event, fm, "");
        assert_eq!(r.label(), "OrderCreated@1.0.0");
        assert_eq!(r.name(), "OrderCreated");
        assert_eq!(r.key().to_string(), "event:OrderCreated@1.0.0");

        let team = CatalogResource::new(ResourceType::Team, Frontmatter::with_id("core"), "");
        assert_eq!(team.label(), "core");
    }
}
