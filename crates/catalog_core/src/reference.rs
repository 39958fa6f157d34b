//! Pointers embedded in frontmatter (`sends`, `receives`, `services`, ...).

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Pointer to another resource
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceRef {
    /// Target id
    pub id: String,
    /// Target version, absent means latest
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient_version")]
    pub version: Option<String>,
}

impl ResourceRef {
    /// Create a new reference
    #[must_use]
    pub fn new(id: impl Into<String>, version: Option<&str>) -> Self {
        Self {
            id: id.into(),
            version: version.map(str::to_string),
        }
    }
}

impl fmt::Display for ResourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.version {
            Some(v) => write!(f, "{}@{}", self.id, v),
            None => f.write_str(&self.id),
        }
    }
}

/// Channel attachment on a message pointer
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChannelRef {
    /// Channel id
    pub id: String,
    /// Channel version, absent means latest
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient_version")]
    pub version: Option<String>,
    /// `push`, `pull`, ...
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery_mode: Option<String>,
}

impl ChannelRef {
    /// Create a channel reference without delivery mode
    #[must_use]
    pub fn new(id: impl Into<String>, version: Option<&str>) -> Self {
        Self {
            id: id.into(),
            version: version.map(str::to_string),
            delivery_mode: None,
        }
    }
}

impl fmt::Display for ChannelRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.version {
            Some(v) => write!(f, "{}@{}", self.id, v),
            None => f.write_str(&self.id),
        }
    }
}

/// Message pointer in a `sends`/`receives` list
///
/// Sends carry `to` channels, receives carry `from` channels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessagePointer {
    /// Message id
    pub id: String,
    /// Message version, absent means latest
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient_version")]
    pub version: Option<String>,
    /// Outgoing channels
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub to: Vec<ChannelRef>,
    /// Incoming channels
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub from: Vec<ChannelRef>,
}

impl MessagePointer {
    /// Pointer without channels
    #[must_use]
    pub fn new(id: impl Into<String>, version: Option<&str>) -> Self {
        Self {
            id: id.into(),
            version: version.map(str::to_string),
            to: Vec::new(),
            from: Vec::new(),
        }
    }

    /// Every attached channel, `to` first
    pub fn channels(&self) -> impl Iterator<Item = &ChannelRef> {
        self.to.iter().chain(self.from.iter())
    }

    /// Reference form without channels
    #[must_use]
    pub fn to_ref(&self) -> ResourceRef {
        ResourceRef {
            id: self.id.clone(),
            version: self.version.clone(),
        }
    }
}

/// Remove later entries with an id+version already seen, keeping order
#[must_use]
pub fn dedup_refs(refs: Vec<ResourceRef>) -> Vec<ResourceRef> {
    let mut seen = HashSet::new();
    refs.into_iter()
        .filter(|r| seen.insert((r.id.clone(), r.version.clone())))
        .collect()
}

/// Remove later pointers with an id+version already seen, keeping order
#[must_use]
pub fn dedup_pointers(pointers: Vec<MessagePointer>) -> Vec<MessagePointer> {
    let mut seen = HashSet::new();
    pointers
        .into_iter()
        .filter(|p| seen.insert((p.id.clone(), p.version.clone())))
        .collect()
}

/// Versions written by hand in YAML may be numbers (`version: 1.0`)
///
/// Catalog documents quote bare numbers before decoding, so the float arm
/// only sees YAML decoded from elsewhere, where trailing zeros are lost.
fn lenient_version<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Int(u64),
        Float(f64),
    }

    Ok(Option::<Raw>::deserialize(deserializer)?.map(|raw| match raw {
        Raw::Text(s) => s,
        Raw::Int(n) => n.to_string(),
        Raw::Float(n) => format!("{n:?}"),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ref_display() {
        assert_eq!(ResourceRef::new("OrderService", Some("1.0.0")).to_string(), "OrderService@1.0.0");
        assert_eq!(ResourceRef::new("OrderService", None).to_string(), "OrderService");
    }

    #[test]
    fn test_dedup_refs_keeps_first() {
        let refs = vec![
            ResourceRef::new("A", Some("1.0.0")),
            ResourceRef::new("B", None),
            ResourceRef::new("A", Some("1.0.0")),
            ResourceRef::new("A", Some("2.0.0")),
        ];
        let out = dedup_refs(refs);
        assert_eq!(out.len(), 3);
        assert_eq!(out[2].version.as_deref(), Some("2.0.0"));
    }

    #[test]
    fn test_pointer_from_yaml() {
        let yaml = "id: OrderCreated\nversion: 1.0\nto:\n  - id: orders-topic\n    delivery_mode: push\n";
        let p: MessagePointer = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(p.version.as_deref(), Some("1.0"));
        assert_eq!(p.to.len(), 1);
        assert_eq!(p.to[0].delivery_mode.as_deref(), Some("push"));
        assert!(p.from.is_empty());
    }

    #[test]
    fn test_pointer_serialization_skips_empty() {
        let p = MessagePointer::new("OrderCreated", None);
        let yaml = serde_yaml::to_string(&p).unwrap();
        assert_eq!(yaml.trim(), "id: OrderCreated");
    }
}
