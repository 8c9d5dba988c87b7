//! Secure credential handling using the secrecy crate
//!
//! OAuth2 client secrets and database connection strings are held as
//! [`SecretString`]: zeroized on drop, redacted in `Debug`, and only readable
//! through `expose_secret()`.
//!
//! # Example
//!
//! ```rust
//! use fhirsync::config::secret_string;
//! use secrecy::ExposeSecret;
//!
//! let client_secret = secret_string("s3cr3t".to_string());
//! assert_eq!(client_secret.expose_secret().as_ref(), "s3cr3t");
//! assert!(!format!("{client_secret:?}").contains("s3cr3t"));
//! ```

use secrecy::{CloneableSecret, DebugSecret, Secret, SerializableSecret};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use zeroize::Zeroize;

/// Newtype wrapper for String that implements the required traits for Secret
#[derive(Clone, Zeroize)]
#[zeroize(drop)]
pub struct SecretValue(String);

impl CloneableSecret for SecretValue {}
impl DebugSecret for SecretValue {}
impl SerializableSecret for SecretValue {}

impl From<String> for SecretValue {
    fn from(s: String) -> Self {
        SecretValue(s)
    }
}

impl std::fmt::Debug for SecretValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl PartialEq<str> for SecretValue {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl AsRef<str> for SecretValue {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl SecretValue {
    /// Check if the secret value is empty
    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl Serialize for SecretValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for SecretValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        String::deserialize(deserializer).map(SecretValue)
    }
}

/// Type alias for a secret string
pub type SecretString = Secret<SecretValue>;

/// Wraps a String as a [`SecretString`]
#[inline]
pub fn secret_string(value: String) -> SecretString {
    Secret::new(SecretValue::from(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn test_secret_string_creation() {
        let secret = secret_string("client-secret".to_string());
        assert_eq!(secret.expose_secret(), "client-secret");
    }

    #[test]
    fn test_secret_debug_redacted() {
        let secret = secret_string("sensitive-data".to_string());
        let debug_output = format!("{secret:?}");
        assert!(!debug_output.contains("sensitive-data"));
    }

    #[test]
    fn test_secret_blank_is_empty() {
        assert!(secret_string("  ".to_string()).expose_secret().is_empty());
    }

    #[test]
    fn test_secret_deserialize_from_toml() {
        #[derive(Deserialize)]
        struct Creds {
            client_secret: SecretString,
        }

        let creds: Creds = toml::from_str("client_secret = \"abc\"").unwrap();
        assert_eq!(creds.client_secret.expose_secret(), "abc");
    }
}
