//! Configuration structures and types for osd-publisher
//!
//! This module provides type-safe configuration management with serde
//! support. The store credential is intentionally not part of this tree:
//! it comes from the environment only (see `security::StoreCredentials`)
//! and is never written to or read from a config file.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default store host when none is configured
pub const DEFAULT_STORE_HOST: &str = "127.0.0.1";

/// Default store port when none is configured
pub const DEFAULT_STORE_PORT: u16 = 6379;

/// Default remote directory prepared for disk-backed package variants
pub const DEFAULT_PACKAGE_DIR: &str = "/var/lib/osd/packages";

/// Default build output directory holding archives and the VERSION file
pub const DEFAULT_BUILD_DIR: &str = "build/packages";

/// Root configuration object
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct DeployConfig {
    /// Deploy host settings (required fields, no defaults)
    #[serde(default)]
    pub deploy: DeployHostConfig,

    /// Shared store settings (optional, sensible defaults)
    #[serde(default)]
    pub store: StoreConfig,

    /// Local build output settings (optional)
    #[serde(default)]
    pub build: BuildConfig,
}

/// Deploy host settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct DeployHostConfig {
    /// Host the packages are deployed to (required)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,

    /// SSH user on the deploy host (required)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,

    /// Remote package directory (default: /var/lib/osd/packages)
    #[serde(skip_serializing_if = "Option::is_none", rename = "packageDir")]
    pub package_dir: Option<PathBuf>,
}

/// Shared store settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct StoreConfig {
    /// Store host (default: 127.0.0.1)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,

    /// Store port (default: 6379)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
}

/// Local build output settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct BuildConfig {
    /// Directory the build writes archives and VERSION to
    /// (default: build/packages)
    #[serde(skip_serializing_if = "Option::is_none", rename = "outputDir")]
    pub output_dir: Option<PathBuf>,
}

impl DeployConfig {
    /// Deploy host, if configured
    pub fn deploy_host(&self) -> Option<&str> {
        self.deploy.host.as_deref()
    }

    /// Deploy user, if configured
    pub fn deploy_user(&self) -> Option<&str> {
        self.deploy.user.as_deref()
    }

    /// Store host with default applied
    pub fn store_host(&self) -> &str {
        self.store.host.as_deref().unwrap_or(DEFAULT_STORE_HOST)
    }

    /// Store port with default applied
    pub fn store_port(&self) -> u16 {
        self.store.port.unwrap_or(DEFAULT_STORE_PORT)
    }

    /// Store endpoint as `host:port`, for diagnostics
    pub fn store_endpoint(&self) -> String {
        format!("{}:{}", self.store_host(), self.store_port())
    }

    /// Remote package directory with default applied
    pub fn package_dir(&self) -> PathBuf {
        self.deploy
            .package_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_PACKAGE_DIR))
    }

    /// Build output directory with default applied
    pub fn build_dir(&self) -> PathBuf {
        self.build
            .output_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_BUILD_DIR))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_applies_store_defaults() {
        let config = DeployConfig::default();
        assert_eq!(config.store_host(), "127.0.0.1");
        assert_eq!(config.store_port(), 6379);
        assert_eq!(config.store_endpoint(), "127.0.0.1:6379");
        assert_eq!(config.package_dir(), PathBuf::from("/var/lib/osd/packages"));
        assert_eq!(config.build_dir(), PathBuf::from("build/packages"));
    }

    #[test]
    fn test_default_config_has_no_deploy_host() {
        let config = DeployConfig::default();
        assert!(config.deploy_host().is_none());
        assert!(config.deploy_user().is_none());
    }

    #[test]
    fn test_deserialize_minimal_config() {
        let yaml = r#"
deploy:
  host: osd-box.local
  user: deploy
"#;
        let config: DeployConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.deploy_host(), Some("osd-box.local"));
        assert_eq!(config.deploy_user(), Some("deploy"));
        assert_eq!(config.store_port(), 6379);
    }

    #[test]
    fn test_deserialize_full_config() {
        let yaml = r#"
deploy:
  host: osd-box.local
  user: deploy
  packageDir: /srv/osd/packages
store:
  host: 10.0.0.5
  port: 6380
build:
  outputDir: target/packages
"#;
        let config: DeployConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.store_host(), "10.0.0.5");
        assert_eq!(config.store_port(), 6380);
        assert_eq!(config.package_dir(), PathBuf::from("/srv/osd/packages"));
        assert_eq!(config.build_dir(), PathBuf::from("target/packages"));
    }

    #[test]
    fn test_serialize_uses_camel_case_keys() {
        let config = DeployConfig {
            deploy: DeployHostConfig {
                host: Some("osd-box.local".to_string()),
                user: Some("deploy".to_string()),
                package_dir: Some(PathBuf::from("/srv/osd/packages")),
            },
            store: StoreConfig::default(),
            build: BuildConfig {
                output_dir: Some(PathBuf::from("target/packages")),
            },
        };
        let yaml = serde_yaml::to_string(&config).unwrap();
        assert!(yaml.contains("packageDir:"));
        assert!(yaml.contains("outputDir:"));
    }
}
