//! Configuration file loader for osd-publisher
//!
//! This module provides configuration loading, validation, and merging
//! capabilities. All environment access goes through the options map so
//! callers (and tests) control exactly what the loader sees.

use crate::core::config::{BuildConfig, DeployConfig, DeployHostConfig, StoreConfig};
use crate::core::error::DeployError;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Configuration file name
pub const CONFIG_FILENAME: &str = ".osd-deploy.yaml";

/// Environment variable for the deploy host
pub const ENV_DEPLOY_HOST: &str = "OSD_DEPLOY_HOST";

/// Environment variable for the deploy user
pub const ENV_DEPLOY_USER: &str = "OSD_DEPLOY_USER";

/// Environment variable for the remote package directory
pub const ENV_PACKAGE_DIR: &str = "OSD_DEPLOY_PACKAGE_DIR";

/// Environment variable for the store host
pub const ENV_STORE_HOST: &str = "OSD_REDIS_HOST";

/// Environment variable for the store port
pub const ENV_STORE_PORT: &str = "OSD_REDIS_PORT";

/// Environment variable for the build output directory
pub const ENV_BUILD_DIR: &str = "OSD_BUILD_DIR";

/// Configuration load options
#[derive(Debug, Clone, Default)]
pub struct ConfigLoadOptions {
    /// Project path to load config from
    pub project_path: PathBuf,

    /// Explicit config file (overrides the project file; must exist)
    pub config_file: Option<PathBuf>,

    /// Environment variables
    pub env: HashMap<String, String>,
}

/// Configuration validation error
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigValidationError {
    /// Field path (e.g., "deploy.host")
    pub field: String,

    /// Error message
    pub message: String,

    /// Environment variable that can supply the field
    pub env_var: Option<String>,
}

/// Configuration file loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from multiple sources with priority
    ///
    /// Priority (high to low):
    /// 1. Environment variables
    /// 2. Project config (./.osd-deploy.yaml or --config file)
    /// 3. Global config (~/.osd-deploy.yaml)
    /// 4. Default values
    pub async fn load(options: ConfigLoadOptions) -> Result<DeployConfig, DeployError> {
        let mut configs: Vec<DeployConfig> = Vec::new();

        // 4. Default values (lowest priority)
        configs.push(DeployConfig::default());

        // 3. Global config
        if let Some(global_config) = Self::load_global_config(&options.env).await? {
            configs.push(global_config);
        }

        // 2. Project config, or the explicitly requested file
        match &options.config_file {
            Some(path) => {
                let config = Self::load_config_file(path).await?.ok_or_else(|| {
                    DeployError::ConfigUnreadable {
                        path: path.clone(),
                        message: "file not found".to_string(),
                    }
                })?;
                configs.push(config);
            }
            None => {
                let project_path = options.project_path.join(CONFIG_FILENAME);
                if let Some(project_config) = Self::load_config_file(&project_path).await? {
                    configs.push(project_config);
                }
            }
        }

        // 1. Environment variables (highest priority)
        if let Some(env_config) = Self::load_env_config(&options.env)? {
            configs.push(env_config);
        }

        Ok(Self::merge_configs(configs))
    }

    /// Load global configuration from ~/.osd-deploy.yaml
    async fn load_global_config(
        env: &HashMap<String, String>,
    ) -> Result<Option<DeployConfig>, DeployError> {
        let Some(home_dir) = env.get("HOME") else {
            return Ok(None);
        };

        let global_config_path = PathBuf::from(home_dir).join(CONFIG_FILENAME);
        Self::load_config_file(&global_config_path).await
    }

    /// Load configuration from a YAML file, `None` if it does not exist
    async fn load_config_file(file_path: &Path) -> Result<Option<DeployConfig>, DeployError> {
        if !file_path.exists() {
            return Ok(None);
        }

        let content =
            fs::read_to_string(file_path)
                .await
                .map_err(|e| DeployError::ConfigUnreadable {
                    path: file_path.to_path_buf(),
                    message: e.to_string(),
                })?;

        let config: DeployConfig =
            serde_yaml::from_str(&content).map_err(|e| DeployError::ConfigUnreadable {
                path: file_path.to_path_buf(),
                message: e.to_string(),
            })?;

        Ok(Some(config))
    }

    /// Load configuration overrides from environment variables
    fn load_env_config(
        env: &HashMap<String, String>,
    ) -> Result<Option<DeployConfig>, DeployError> {
        let mut config = DeployConfig::default();
        let mut has_changes = false;

        if let Some(host) = env.get(ENV_DEPLOY_HOST) {
            config.deploy.host = Some(host.clone());
            has_changes = true;
        }

        if let Some(user) = env.get(ENV_DEPLOY_USER) {
            config.deploy.user = Some(user.clone());
            has_changes = true;
        }

        if let Some(dir) = env.get(ENV_PACKAGE_DIR) {
            config.deploy.package_dir = Some(PathBuf::from(dir));
            has_changes = true;
        }

        if let Some(host) = env.get(ENV_STORE_HOST) {
            config.store.host = Some(host.clone());
            has_changes = true;
        }

        if let Some(port) = env.get(ENV_STORE_PORT) {
            let port: u16 = port
                .parse()
                .map_err(|_| DeployError::InvalidConfigValue {
                    field: ENV_STORE_PORT.to_string(),
                    message: format!("'{}' is not a valid port number", port),
                })?;
            config.store.port = Some(port);
            has_changes = true;
        }

        if let Some(dir) = env.get(ENV_BUILD_DIR) {
            config.build.output_dir = Some(PathBuf::from(dir));
            has_changes = true;
        }

        Ok(has_changes.then_some(config))
    }

    /// Merge configurations, later entries taking priority per field
    fn merge_configs(configs: Vec<DeployConfig>) -> DeployConfig {
        let mut merged = DeployConfig {
            deploy: DeployHostConfig::default(),
            store: StoreConfig::default(),
            build: BuildConfig::default(),
        };

        for next in configs {
            merge_option(&mut merged.deploy.host, next.deploy.host);
            merge_option(&mut merged.deploy.user, next.deploy.user);
            merge_option(&mut merged.deploy.package_dir, next.deploy.package_dir);
            merge_option(&mut merged.store.host, next.store.host);
            merge_option(&mut merged.store.port, next.store.port);
            merge_option(&mut merged.build.output_dir, next.build.output_dir);
        }

        merged
    }

    /// Check that all required fields are present
    pub fn validate(config: &DeployConfig) -> Vec<ConfigValidationError> {
        let mut errors = Vec::new();

        if config.deploy.host.is_none() {
            errors.push(ConfigValidationError {
                field: "deploy.host".to_string(),
                message: "deploy host is not set".to_string(),
                env_var: Some(ENV_DEPLOY_HOST.to_string()),
            });
        }

        if config.deploy.user.is_none() {
            errors.push(ConfigValidationError {
                field: "deploy.user".to_string(),
                message: "deploy user is not set".to_string(),
                env_var: Some(ENV_DEPLOY_USER.to_string()),
            });
        }

        errors
    }

    /// Validate and turn any missing fields into a fatal error naming every
    /// missing field and the environment variable that supplies it
    pub fn ensure_valid(config: &DeployConfig) -> Result<(), DeployError> {
        let errors = Self::validate(config);
        if errors.is_empty() {
            return Ok(());
        }

        let fields = errors
            .iter()
            .map(|e| match &e.env_var {
                Some(var) => format!("{} ({})", e.field, var),
                None => e.field.clone(),
            })
            .collect::<Vec<_>>()
            .join(", ");

        Err(DeployError::MissingConfig { fields })
    }
}

fn merge_option<T>(slot: &mut Option<T>, next: Option<T>) {
    if next.is_some() {
        *slot = next;
    }
}
