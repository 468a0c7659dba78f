//! Package Publisher - orchestrates one deploy invocation
//!
//! Manages the complete hand-off workflow:
//! - Version read and batch assembly from the deploy target
//! - Remote destination preparation and store preflight
//! - Sequential artifact upload, one atomic SET per artifact
//! - Exactly one end-of-batch reload notification
//!
//! The ordering invariant lives here: the notification publish happens-after
//! every artifact write of the batch has been acknowledged. On any failure
//! the run aborts before notifying; artifacts already written stay written,
//! but the consumer is never told about an incomplete batch.
//!
//! Two publishers racing each other are not guarded against: the store has
//! no compare-and-swap, so the last writer wins. Acceptable for a deploy
//! tool with a single operator (see DESIGN.md).

use crate::core::artifact::{self, ArtifactSpec, BuildMode, DeployTarget};
use crate::core::config::DeployConfig;
use crate::core::error::DeployError;
use crate::security::ssh_executor::RemoteHost;
use crate::store::{self, PackageStore};
use chrono::{DateTime, Utc};
use std::path::Path;
use std::time::Instant;
use tokio::fs;

/// Deploy options passed from the CLI
#[derive(Debug, Clone, Copy)]
pub struct DeployOptions {
    /// Which archive flavor to read from the build output
    pub mode: BuildMode,

    /// Which artifacts form the batch
    pub target: DeployTarget,
}

/// Deploy report returned after a successful run
#[derive(Debug, Clone)]
pub struct DeployReport {
    pub mode: BuildMode,
    pub target: DeployTarget,
    pub version: String,
    /// Logical names written to the store, in upload order
    pub uploaded: Vec<String>,
    /// Payload of the single reload notification
    pub notification: String,
    /// Subscribers that received the notification
    pub receivers: usize,
    pub published_at: DateTime<Utc>,
    pub duration: u64,
}

/// Main deploy orchestrator
pub struct PackagePublisher<S, R> {
    config: DeployConfig,
    store: S,
    remote: R,
}

impl<S: PackageStore, R: RemoteHost> PackagePublisher<S, R> {
    /// Create a new PackagePublisher
    ///
    /// # Arguments
    ///
    /// * `config` - Validated deploy configuration
    /// * `store` - Connected package store
    /// * `remote` - Deploy host handle
    pub fn new(config: DeployConfig, store: S, remote: R) -> Self {
        Self {
            config,
            store,
            remote,
        }
    }

    /// The underlying store, for inspection
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Publish one batch of artifacts
    ///
    /// # Arguments
    ///
    /// * `options` - Deploy options
    ///
    /// # Returns
    ///
    /// Deploy report with the uploaded names and notification payload
    pub async fn publish(&mut self, options: DeployOptions) -> Result<DeployReport, DeployError> {
        let start_time = Instant::now();

        // 1. Version and batch assembly
        let build_dir = self.config.build_dir();
        let version = artifact::read_version(&build_dir).await?;
        let batch = artifact::resolve_batch(options.target);

        progress(&format!(
            "deploying {} ({} mode, {} packages, version {})",
            options.target,
            options.mode,
            batch.len(),
            version
        ));

        // 2. Remote destination preflight (also the SSH connectivity check)
        let package_dir = self.config.package_dir();
        self.remote
            .ensure_dir(&package_dir)
            .await
            .map_err(|e| DeployError::Connectivity {
                endpoint: self.deploy_endpoint(),
                message: e.to_string(),
            })?;

        // 3. Store preflight
        self.store
            .ping()
            .await
            .map_err(|e| DeployError::Connectivity {
                endpoint: self.config.store_endpoint(),
                message: e.to_string(),
            })?;

        // 4. Sequential uploads, accumulating the batch result
        let mut uploaded: Vec<String> = Vec::with_capacity(batch.len());
        for spec in &batch {
            self.upload_artifact(spec, options.mode, &version, &build_dir)
                .await?;
            uploaded.push(spec.logical_name.to_string());
        }

        // 5. Exactly one notification, after every write is acknowledged
        let notification = store::reload_message(&uploaded);
        let receivers = self
            .store
            .publish(store::RELOAD_CHANNEL, &notification)
            .await
            .map_err(|e| DeployError::NotifyFailed {
                message: e.to_string(),
            })?;

        progress(&format!(
            "notified {} -> \"{}\" ({} receivers)",
            store::RELOAD_CHANNEL,
            notification,
            receivers
        ));

        Ok(DeployReport {
            mode: options.mode,
            target: options.target,
            version,
            uploaded,
            notification,
            receivers,
            published_at: Utc::now(),
            duration: start_time.elapsed().as_millis() as u64,
        })
    }

    /// Upload a single artifact under its derived store key
    async fn upload_artifact(
        &mut self,
        spec: &ArtifactSpec,
        mode: BuildMode,
        version: &str,
        build_dir: &Path,
    ) -> Result<(), DeployError> {
        let path = spec.source_path(build_dir, mode, version);

        if !fs::try_exists(&path).await.unwrap_or(false) {
            return Err(DeployError::ArtifactMissing {
                logical_name: spec.logical_name.to_string(),
                path,
            });
        }

        let payload = fs::read(&path)
            .await
            .map_err(|e| DeployError::ArtifactUnreadable {
                logical_name: spec.logical_name.to_string(),
                message: e.to_string(),
            })?;

        let key = spec.store_key();
        self.store
            .put(&key, &payload)
            .await
            .map_err(|e| DeployError::TransferFailed {
                logical_name: spec.logical_name.to_string(),
                message: e.to_string(),
            })?;

        progress(&format!(
            "📤 {} -> {} ({} bytes)",
            spec.source_filename(mode, version),
            key,
            payload.len()
        ));

        Ok(())
    }

    fn deploy_endpoint(&self) -> String {
        match (self.config.deploy_user(), self.config.deploy_host()) {
            (Some(user), Some(host)) => format!("{user}@{host}"),
            (None, Some(host)) => host.to_string(),
            _ => "deploy host".to_string(),
        }
    }
}

/// Timestamped progress line
fn progress(message: &str) {
    println!("[{}] {}", Utc::now().format("%Y-%m-%d %H:%M:%S"), message);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::security::ssh_executor::RemoteError;
    use crate::store::{MemoryPackageStore, RELOAD_CHANNEL, StoreOp};
    use async_trait::async_trait;
    use std::path::PathBuf;
    use tempfile::TempDir;

    struct NoopRemote;

    #[async_trait]
    impl RemoteHost for NoopRemote {
        async fn ensure_dir(&self, _path: &Path) -> Result<(), RemoteError> {
            Ok(())
        }
    }

    struct UnreachableRemote;

    #[async_trait]
    impl RemoteHost for UnreachableRemote {
        async fn ensure_dir(&self, _path: &Path) -> Result<(), RemoteError> {
            Err(RemoteError::ConnectionFailed {
                host: "osd-box.test".to_string(),
                detail: "Connection refused".to_string(),
            })
        }
    }

    fn test_config(build_dir: &Path) -> DeployConfig {
        let mut config = DeployConfig::default();
        config.deploy.host = Some("osd-box.test".to_string());
        config.deploy.user = Some("deploy".to_string());
        config.build.output_dir = Some(build_dir.to_path_buf());
        config
    }

    fn write_build_tree(dir: &Path, version: &str, mode: BuildMode, specs: &[ArtifactSpec]) {
        std::fs::write(dir.join(artifact::VERSION_FILE), format!("{version}\n")).unwrap();
        for spec in specs {
            let path = spec.source_path(dir, mode, version);
            std::fs::write(path, spec.logical_name.as_bytes()).unwrap();
        }
    }

    fn publisher_for(
        build_dir: &Path,
    ) -> PackagePublisher<MemoryPackageStore, NoopRemote> {
        PackagePublisher::new(
            test_config(build_dir),
            MemoryPackageStore::new(),
            NoopRemote,
        )
    }

    #[tokio::test]
    async fn test_frontend_uploads_both_then_notifies() {
        let temp_dir = TempDir::new().unwrap();
        write_build_tree(
            temp_dir.path(),
            "1.4.2",
            BuildMode::Production,
            &artifact::FRONTEND_ARTIFACTS,
        );

        let mut publisher = publisher_for(temp_dir.path());
        let report = publisher
            .publish(DeployOptions {
                mode: BuildMode::Production,
                target: DeployTarget::Frontend,
            })
            .await
            .unwrap();

        assert_eq!(report.uploaded, vec!["live_day.tar", "live_thermal.tar"]);
        assert_eq!(report.notification, "live_day.tar,live_thermal.tar");
        assert_eq!(report.version, "1.4.2");

        let store = publisher.store();
        assert_eq!(
            store.value("osd:package:live_day.tar"),
            Some(&b"live_day.tar"[..])
        );
        assert_eq!(
            store.published(),
            vec![(RELOAD_CHANNEL, "live_day.tar,live_thermal.tar")]
        );
    }

    #[tokio::test]
    async fn test_gallery_notification_is_single_logical_name() {
        let temp_dir = TempDir::new().unwrap();
        write_build_tree(
            temp_dir.path(),
            "1.4.2",
            BuildMode::Dev,
            &artifact::GALLERY_ARTIFACTS,
        );

        let mut publisher = publisher_for(temp_dir.path());
        let report = publisher
            .publish(DeployOptions {
                mode: BuildMode::Dev,
                target: DeployTarget::Gallery,
            })
            .await
            .unwrap();

        // Non-empty batch: the payload is the logical name, never the
        // reload-all sentinel.
        assert_eq!(report.notification, "default.tar");
        assert_ne!(report.notification, crate::store::RELOAD_ALL);
        assert_eq!(publisher.store().published().len(), 1);
    }

    #[tokio::test]
    async fn test_all_uploads_frontend_before_gallery() {
        let temp_dir = TempDir::new().unwrap();
        let batch = artifact::resolve_batch(DeployTarget::All);
        write_build_tree(temp_dir.path(), "2.0.0", BuildMode::Production, &batch);

        let mut publisher = publisher_for(temp_dir.path());
        let report = publisher
            .publish(DeployOptions {
                mode: BuildMode::Production,
                target: DeployTarget::All,
            })
            .await
            .unwrap();

        assert_eq!(
            report.uploaded,
            vec!["live_day.tar", "live_thermal.tar", "default.tar"]
        );
        assert_eq!(
            report.notification,
            "live_day.tar,live_thermal.tar,default.tar"
        );
    }

    #[tokio::test]
    async fn test_notification_is_observed_after_every_write() {
        let temp_dir = TempDir::new().unwrap();
        let batch = artifact::resolve_batch(DeployTarget::All);
        write_build_tree(temp_dir.path(), "2.0.0", BuildMode::Production, &batch);

        let mut publisher = publisher_for(temp_dir.path());
        publisher
            .publish(DeployOptions {
                mode: BuildMode::Production,
                target: DeployTarget::All,
            })
            .await
            .unwrap();

        let ops = publisher.store().ops();
        assert_eq!(ops.len(), batch.len() + 1);
        for op in &ops[..batch.len()] {
            assert!(matches!(op, StoreOp::Put { .. }));
        }
        assert!(matches!(
            ops.last().unwrap(),
            StoreOp::Publish { channel, .. } if channel == RELOAD_CHANNEL
        ));
    }

    #[tokio::test]
    async fn test_missing_artifact_aborts_without_notification() {
        let temp_dir = TempDir::new().unwrap();
        // Only live_day is on disk; live_thermal is missing.
        write_build_tree(
            temp_dir.path(),
            "1.4.2",
            BuildMode::Dev,
            &artifact::FRONTEND_ARTIFACTS[..1],
        );

        let mut publisher = publisher_for(temp_dir.path());
        let error = publisher
            .publish(DeployOptions {
                mode: BuildMode::Dev,
                target: DeployTarget::Frontend,
            })
            .await
            .unwrap_err();

        assert_eq!(error.code(), "ARTIFACT_MISSING");

        // The artifact already written stays written, but no notification
        // goes out for the incomplete batch.
        let store = publisher.store();
        assert!(store.value("osd:package:live_day.tar").is_some());
        assert!(store.published().is_empty());
    }

    #[tokio::test]
    async fn test_write_failure_aborts_without_notification() {
        let temp_dir = TempDir::new().unwrap();
        write_build_tree(
            temp_dir.path(),
            "1.4.2",
            BuildMode::Production,
            &artifact::FRONTEND_ARTIFACTS,
        );

        let mut store = MemoryPackageStore::new();
        store.fail_writes_to("osd:package:live_thermal.tar");
        let mut publisher =
            PackagePublisher::new(test_config(temp_dir.path()), store, NoopRemote);

        let error = publisher
            .publish(DeployOptions {
                mode: BuildMode::Production,
                target: DeployTarget::Frontend,
            })
            .await
            .unwrap_err();

        assert_eq!(error.code(), "TRANSFER_FAILED");
        assert!(publisher.store().published().is_empty());
    }

    #[tokio::test]
    async fn test_publishing_twice_is_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        write_build_tree(
            temp_dir.path(),
            "1.4.2",
            BuildMode::Production,
            &artifact::FRONTEND_ARTIFACTS,
        );

        let options = DeployOptions {
            mode: BuildMode::Production,
            target: DeployTarget::Frontend,
        };

        let mut publisher = publisher_for(temp_dir.path());
        publisher.publish(options).await.unwrap();
        publisher.publish(options).await.unwrap();

        // Overwrite semantics: same keys, same bytes, no accumulation.
        let store = publisher.store();
        assert_eq!(store.len(), 2);
        assert_eq!(
            store.value("osd:package:live_day.tar"),
            Some(&b"live_day.tar"[..])
        );
        assert_eq!(store.published().len(), 2);
    }

    #[tokio::test]
    async fn test_missing_version_file_fails_before_any_store_action() {
        let temp_dir = TempDir::new().unwrap();

        let mut publisher = publisher_for(temp_dir.path());
        let error = publisher
            .publish(DeployOptions {
                mode: BuildMode::Production,
                target: DeployTarget::All,
            })
            .await
            .unwrap_err();

        assert_eq!(error.code(), "VERSION_FILE_MISSING");
        assert!(publisher.store().ops().is_empty());
    }

    #[tokio::test]
    async fn test_unreachable_remote_fails_before_any_store_action() {
        let temp_dir = TempDir::new().unwrap();
        let batch = artifact::resolve_batch(DeployTarget::All);
        write_build_tree(temp_dir.path(), "1.4.2", BuildMode::Production, &batch);

        let mut publisher = PackagePublisher::new(
            test_config(temp_dir.path()),
            MemoryPackageStore::new(),
            UnreachableRemote,
        );

        let error = publisher
            .publish(DeployOptions {
                mode: BuildMode::Production,
                target: DeployTarget::All,
            })
            .await
            .unwrap_err();

        assert_eq!(error.code(), "CONNECTIVITY");
        assert!(error.to_string().contains("deploy@osd-box.test"));
        assert!(publisher.store().ops().is_empty());
    }

    #[test]
    fn test_deploy_endpoint_falls_back_without_user() {
        let mut config = DeployConfig::default();
        config.deploy.host = Some("osd-box.test".to_string());
        config.build.output_dir = Some(PathBuf::from("build/packages"));

        let publisher = PackagePublisher::new(config, MemoryPackageStore::new(), NoopRemote);
        assert_eq!(publisher.deploy_endpoint(), "osd-box.test");
    }
}
