//! Store credential handling with memory-safe wrapping and masking
//!
//! The store password comes from the environment only, never from a config
//! file, and is held in a `secrecy::SecretString` to prevent accidental
//! exposure in logs or memory dumps.

use crate::core::error::DeployError;
use secrecy::SecretString;
use std::env;

/// Environment variable holding the store password
pub const STORE_PASSWORD_ENV: &str = "OSD_REDIS_PASSWORD";

/// Credential source for the shared store
///
/// # Examples
///
/// ```
/// use osd_publisher::security::StoreCredentials;
///
/// let credentials = StoreCredentials::new();
/// if credentials.has_store_password() {
///     println!("store credential is configured");
/// }
/// ```
#[derive(Default)]
pub struct StoreCredentials;

impl StoreCredentials {
    pub fn new() -> Self {
        Self
    }

    /// Read the store password from the environment
    ///
    /// Returns `None` when the variable is unset or empty.
    pub fn store_password(&self) -> Option<SecretString> {
        env::var(STORE_PASSWORD_ENV)
            .ok()
            .filter(|value| !value.is_empty())
            .map(|value| SecretString::new(value.into()))
    }

    /// Check whether the store password is configured
    pub fn has_store_password(&self) -> bool {
        self.store_password().is_some()
    }

    /// Read the store password, failing with an actionable diagnostic when
    /// it is absent
    pub fn require_store_password(&self) -> Result<SecretString, DeployError> {
        self.store_password().ok_or(DeployError::CredentialMissing)
    }

    /// Masks a credential for safe logging
    ///
    /// Shows only the first 3 and last 3 characters for identification.
    /// Values shorter than 10 characters are fully masked as "****".
    ///
    /// # Examples
    ///
    /// ```
    /// use osd_publisher::security::StoreCredentials;
    ///
    /// let credentials = StoreCredentials::new();
    /// assert_eq!(credentials.mask("abcdef123456"), "abc...456");
    /// assert_eq!(credentials.mask("short"), "****");
    /// ```
    pub fn mask(&self, value: &str) -> String {
        if value.is_empty() || value.len() < 10 {
            return "****".to_string();
        }

        let prefix = &value[..3];
        let suffix = &value[value.len() - 3..];
        format!("{}...{}", prefix, suffix)
    }
}
