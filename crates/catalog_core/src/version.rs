//! Resource version handling.
//!
//! Catalog versions are usually semver (`1.0.0`) but hand-written catalogs
//! also contain `1`, `1.2` and `v2.0.0`. Missing components are read as 0.

use crate::error::{CatalogError, CatalogResult};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Version given to resources that do not declare one
pub const DEFAULT_VERSION: &str = "0.0.1";

static VERSION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^v?(\d+)(?:\.(\d+))?(?:\.(\d+))?(?:[-+][0-9A-Za-z.-]+)?$")
        .expect("version pattern compiles")
});

/// Comparable version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Version {
    /// Major component
    pub major: u64,
    /// Minor component
    pub minor: u64,
    /// Patch component
    pub patch: u64,
}

impl Version {
    /// Create a new version
    #[must_use]
    pub const fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Parse from string
    ///
    /// Pre-release and build suffixes are accepted and ignored for ordering.
    ///
    /// # Errors
    ///
    /// Returns error if format is invalid
    pub fn parse(s: &str) -> CatalogResult<Self> {
        let caps = VERSION_RE
            .captures(s.trim())
            .ok_or_else(|| CatalogError::InvalidVersion {
                reason: format!("'{s}' is not a version"),
            })?;

        let component = |i: usize| -> CatalogResult<u64> {
            match caps.get(i) {
                Some(m) => m.as_str().parse().map_err(|_| CatalogError::InvalidVersion {
                    reason: format!("component '{}' of '{s}' is out of range", m.as_str()),
                }),
                None => Ok(0),
            }
        };

        Ok(Self {
            major: component(1)?,
            minor: component(2)?,
            patch: component(3)?,
        })
    }

    /// Whether `candidate` is strictly newer than `current`
    ///
    /// # Errors
    ///
    /// Returns error if either string is not a version
    pub fn is_newer(candidate: &str, current: &str) -> CatalogResult<bool> {
        Ok(Self::parse(candidate)? > Self::parse(current)?)
    }
}

impl Default for Version {
    fn default() -> Self {
        Self::new(0, 0, 1)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl FromStr for Version {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
