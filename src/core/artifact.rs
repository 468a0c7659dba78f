//! Artifact model and batch assembly
//!
//! An artifact is an opaque package archive identified by a stable logical
//! name. The deploy target selects which artifacts make up the batch; the
//! build mode and the version string from the build output decide the
//! on-disk source filename.

use crate::core::error::DeployError;
use semver::Version;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tokio::fs;

/// Version metadata file inside the build output directory
pub const VERSION_FILE: &str = "VERSION";

/// Build mode selecting which flavor of archive to deploy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildMode {
    Dev,
    Production,
}

impl BuildMode {
    /// Get string representation of the build mode
    pub fn as_str(&self) -> &'static str {
        match self {
            BuildMode::Dev => "dev",
            BuildMode::Production => "production",
        }
    }

    /// Filename suffix appended before the `.tar` extension
    pub fn filename_suffix(&self) -> &'static str {
        match self {
            BuildMode::Dev => "-dev",
            BuildMode::Production => "",
        }
    }

    /// Parse a build mode from its command line spelling
    pub fn parse(value: &str) -> Result<Self, DeployError> {
        match value {
            "dev" => Ok(BuildMode::Dev),
            "production" => Ok(BuildMode::Production),
            _ => Err(DeployError::InvalidMode {
                value: value.to_string(),
            }),
        }
    }
}

impl fmt::Display for BuildMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BuildMode {
    type Err = DeployError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Deploy target selecting which artifacts form the batch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeployTarget {
    Frontend,
    Gallery,
    All,
}

impl DeployTarget {
    /// Get string representation of the deploy target
    pub fn as_str(&self) -> &'static str {
        match self {
            DeployTarget::Frontend => "frontend",
            DeployTarget::Gallery => "gallery",
            DeployTarget::All => "all",
        }
    }

    /// Parse a deploy target from its command line spelling
    pub fn parse(value: &str) -> Result<Self, DeployError> {
        match value {
            "frontend" => Ok(DeployTarget::Frontend),
            "gallery" => Ok(DeployTarget::Gallery),
            "all" => Ok(DeployTarget::All),
            _ => Err(DeployError::InvalidTarget {
                value: value.to_string(),
            }),
        }
    }
}

impl fmt::Display for DeployTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeployTarget {
    type Err = DeployError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Product family an archive is built for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Product {
    Frontend,
    Gallery,
}

impl Product {
    pub fn as_str(&self) -> &'static str {
        match self {
            Product::Frontend => "frontend",
            Product::Gallery => "gallery",
        }
    }
}

/// Package flavor, part of the versioned source filename
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    LiveDay,
    LiveThermal,
    RecordingDay,
}

impl Variant {
    pub fn as_str(&self) -> &'static str {
        match self {
            Variant::LiveDay => "live_day",
            Variant::LiveThermal => "live_thermal",
            Variant::RecordingDay => "recording_day",
        }
    }
}

/// One deployable artifact: variant plus the logical name the consumer
/// knows it by
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArtifactSpec {
    pub product: Product,
    pub variant: Variant,
    pub logical_name: &'static str,
}

/// Frontend artifacts, in upload order
pub const FRONTEND_ARTIFACTS: [ArtifactSpec; 2] = [
    ArtifactSpec {
        product: Product::Frontend,
        variant: Variant::LiveDay,
        logical_name: "live_day.tar",
    },
    ArtifactSpec {
        product: Product::Frontend,
        variant: Variant::LiveThermal,
        logical_name: "live_thermal.tar",
    },
];

/// Gallery artifacts
pub const GALLERY_ARTIFACTS: [ArtifactSpec; 1] = [ArtifactSpec {
    product: Product::Gallery,
    variant: Variant::RecordingDay,
    logical_name: "default.tar",
}];

impl ArtifactSpec {
    /// Versioned source filename: `<product>-<variant>-<version>[-dev].tar`
    pub fn source_filename(&self, mode: BuildMode, version: &str) -> String {
        format!(
            "{}-{}-{}{}.tar",
            self.product.as_str(),
            self.variant.as_str(),
            version,
            mode.filename_suffix()
        )
    }

    /// Full path of the source archive under the build output directory
    pub fn source_path(&self, build_dir: &Path, mode: BuildMode, version: &str) -> PathBuf {
        build_dir.join(self.source_filename(mode, version))
    }

    /// Store key this artifact is published under
    pub fn store_key(&self) -> String {
        crate::store::package_key(self.logical_name)
    }
}

/// Assemble the batch for a deploy target
///
/// Pure function of the target. For `all`, frontend artifacts come first,
/// then gallery, and uploads later run in exactly this order.
pub fn resolve_batch(target: DeployTarget) -> Vec<ArtifactSpec> {
    match target {
        DeployTarget::Frontend => FRONTEND_ARTIFACTS.to_vec(),
        DeployTarget::Gallery => GALLERY_ARTIFACTS.to_vec(),
        DeployTarget::All => FRONTEND_ARTIFACTS
            .iter()
            .chain(GALLERY_ARTIFACTS.iter())
            .copied()
            .collect(),
    }
}

/// Read and validate the version string from the build output directory
///
/// The build writes a single `VERSION` file next to the archives; its
/// content must be valid semver (e.g. `1.4.2`).
pub async fn read_version(build_dir: &Path) -> Result<String, DeployError> {
    let path = build_dir.join(VERSION_FILE);

    let content = fs::read_to_string(&path)
        .await
        .map_err(|_| DeployError::VersionFileMissing { path: path.clone() })?;

    let version = content.trim();
    Version::parse(version).map_err(|e| DeployError::InvalidVersion {
        value: version.to_string(),
        message: e.to_string(),
    })?;

    Ok(version.to_string())
}
