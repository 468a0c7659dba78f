//! Error handling for package deployment
//!
//! This module provides the full error taxonomy for deploy runs with
//! recovery guidance, using the thiserror crate for ergonomic error handling.
//!
//! Every error is fatal: the publisher stops and reports, it never retries
//! or continues partially. A notification is never sent for an incomplete
//! batch.

use std::path::PathBuf;
use thiserror::Error;

/// Error classification used for exit codes and reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Invalid command line argument; no network action was taken
    Usage,
    /// Missing configuration, credential, or local build artifact
    Precondition,
    /// Remote host or store unreachable, or authentication failed
    Connectivity,
    /// A store write or the reload notification failed mid-run
    Transfer,
}

/// Main error type for deploy operations
#[derive(Error, Debug)]
pub enum DeployError {
    // Usage errors
    #[error("無効なビルドモードです: {value}")]
    InvalidMode { value: String },

    #[error("無効なデプロイターゲットです: {value}")]
    InvalidTarget { value: String },

    // Configuration errors
    #[error("必須の設定項目が不足しています: {fields}")]
    MissingConfig { fields: String },

    #[error("設定値が無効です: [{field}] {message}")]
    InvalidConfigValue { field: String, message: String },

    #[error("設定ファイルを読み込めませんでした: {}: {message}", .path.display())]
    ConfigUnreadable { path: PathBuf, message: String },

    #[error("ストアの認証情報が設定されていません")]
    CredentialMissing,

    // Build artifact errors
    #[error("バージョンファイルが見つかりません: {}", .path.display())]
    VersionFileMissing { path: PathBuf },

    #[error("無効なバージョン文字列です: {value}")]
    InvalidVersion { value: String, message: String },

    #[error("[{logical_name}] パッケージアーカイブが見つかりません: {}", .path.display())]
    ArtifactMissing {
        logical_name: String,
        path: PathBuf,
    },

    #[error("[{logical_name}] パッケージアーカイブを読み込めませんでした: {message}")]
    ArtifactUnreadable {
        logical_name: String,
        message: String,
    },

    // Network errors
    #[error("{endpoint} に接続できませんでした: {message}")]
    Connectivity { endpoint: String, message: String },

    #[error("[{logical_name}] ストアへの書き込みに失敗しました: {message}")]
    TransferFailed {
        logical_name: String,
        message: String,
    },

    #[error("リロード通知の送信に失敗しました: {message}")]
    NotifyFailed { message: String },
}

impl DeployError {
    /// Get the classification of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidMode { .. } | Self::InvalidTarget { .. } => ErrorKind::Usage,
            Self::MissingConfig { .. }
            | Self::InvalidConfigValue { .. }
            | Self::ConfigUnreadable { .. }
            | Self::CredentialMissing
            | Self::VersionFileMissing { .. }
            | Self::InvalidVersion { .. }
            | Self::ArtifactMissing { .. } => ErrorKind::Precondition,
            Self::Connectivity { .. } => ErrorKind::Connectivity,
            Self::ArtifactUnreadable { .. }
            | Self::TransferFailed { .. }
            | Self::NotifyFailed { .. } => ErrorKind::Transfer,
        }
    }

    /// Process exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self.kind() {
            ErrorKind::Usage => 2,
            _ => 1,
        }
    }

    /// Get suggested actions for this error
    pub fn suggested_actions(&self) -> Vec<&'static str> {
        match self {
            Self::InvalidMode { .. } => {
                vec!["dev または production を指定してください"]
            }
            Self::InvalidTarget { .. } => {
                vec!["frontend、gallery、all のいずれかを指定してください"]
            }
            Self::MissingConfig { .. } => vec![
                ".osd-deploy.yaml を確認してください",
                "環境変数でも設定できます（例: OSD_DEPLOY_HOST, OSD_DEPLOY_USER）",
            ],
            Self::InvalidConfigValue { .. } => {
                vec!["設定値の形式を確認してください"]
            }
            Self::ConfigUnreadable { .. } => {
                vec!["設定ファイルのパスと YAML 構文を確認してください"]
            }
            Self::CredentialMissing => {
                vec!["環境変数を設定してください（例: OSD_REDIS_PASSWORD）"]
            }
            Self::VersionFileMissing { .. } => vec![
                "ビルドが完了しているか確認してください",
                "ビルド出力ディレクトリの VERSION ファイルを確認してください",
            ],
            Self::InvalidVersion { .. } => {
                vec!["SemVer形式（例: 1.0.0）で指定してください"]
            }
            Self::ArtifactMissing { .. } => vec![
                "ビルドが完了しているか確認してください",
                "ビルドモードとバージョンがアーカイブ名と一致しているか確認してください",
            ],
            Self::ArtifactUnreadable { .. } => {
                vec!["アーカイブファイルの権限を確認してください"]
            }
            Self::Connectivity { .. } => vec![
                "デプロイホストへの SSH 接続を確認してください",
                "Redis サーバーが起動しているか確認してください",
                "OSD_REDIS_PASSWORD が正しいか確認してください",
                "ネットワーク接続を確認してください",
            ],
            Self::TransferFailed { .. } => vec![
                "Redis サーバーの状態を確認してください",
                "Redis のメモリ容量を確認してください",
            ],
            Self::NotifyFailed { .. } => vec![
                "Redis サーバーの状態を確認してください",
                "コンシューマー側で再読み込みを手動実行してください",
            ],
        }
    }

    /// Get error code for this error
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidMode { .. } => "INVALID_MODE",
            Self::InvalidTarget { .. } => "INVALID_TARGET",
            Self::MissingConfig { .. } => "MISSING_CONFIG",
            Self::InvalidConfigValue { .. } => "INVALID_CONFIG_VALUE",
            Self::ConfigUnreadable { .. } => "CONFIG_UNREADABLE",
            Self::CredentialMissing => "CREDENTIAL_MISSING",
            Self::VersionFileMissing { .. } => "VERSION_FILE_MISSING",
            Self::InvalidVersion { .. } => "INVALID_VERSION",
            Self::ArtifactMissing { .. } => "ARTIFACT_MISSING",
            Self::ArtifactUnreadable { .. } => "ARTIFACT_UNREADABLE",
            Self::Connectivity { .. } => "CONNECTIVITY",
            Self::TransferFailed { .. } => "TRANSFER_FAILED",
            Self::NotifyFailed { .. } => "NOTIFY_FAILED",
        }
    }
}
