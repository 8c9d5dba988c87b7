//! Domain identifier types with validation
//!
//! Newtype wrappers that keep provider keys, tenant ids and local record ids
//! from being mixed up.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Provider key newtype wrapper
///
/// Identifies a configured EMR provider (e.g. `epic`, `cerner`).
/// Keys are normalized to lowercase.
///
/// # Examples
///
/// ```
/// use fhirsync::domain::ids::ProviderKey;
///
/// let key = ProviderKey::new("Epic").unwrap();
/// assert_eq!(key.as_str(), "epic");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProviderKey(String);

impl ProviderKey {
    /// Creates a new ProviderKey, trimming and lowercasing the input
    pub fn new(key: impl Into<String>) -> Result<Self, String> {
        let key = key.into().trim().to_lowercase();
        if key.is_empty() {
            return Err("Provider key cannot be empty".to_string());
        }
        if !key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(format!(
                "Invalid provider key '{key}': only letters, digits, '-' and '_' are allowed"
            ));
        }
        Ok(Self(key))
    }

    /// Returns the key as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProviderKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ProviderKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for ProviderKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Tenant (clinic) identifier
///
/// Every local record belongs to exactly one tenant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TenantId(String);

impl TenantId {
    /// Creates a new TenantId from a string
    pub fn new(id: impl Into<String>) -> Result<Self, String> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err("Tenant ID cannot be empty".to_string());
        }
        Ok(Self(id))
    }

    /// Returns the tenant ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TenantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TenantId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

/// Identifier of a record owned by the local persistence layer
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LocalId(String);

impl LocalId {
    /// Wraps an identifier handed back by a record store
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generates a fresh random identifier
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Returns the ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LocalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
