//! Shared package store port
//!
//! The store is the transport between the publisher and the reloading
//! consumer: one key per artifact holding the full archive bytes, plus a
//! notification channel the consumer subscribes to. Writes must be atomic
//! from the consumer's perspective: a reader observes either the previous
//! complete value or the new complete value, never a partial write.

pub mod memory;
pub mod redis_store;

pub use memory::{MemoryPackageStore, StoreOp};
pub use redis_store::RedisPackageStore;

use async_trait::async_trait;
use thiserror::Error;

/// Key prefix every package blob is stored under
pub const PACKAGE_KEY_PREFIX: &str = "osd:package:";

/// Channel the end-of-batch reload notification is published to
pub const RELOAD_CHANNEL: &str = "osd:reload";

/// Sentinel payload meaning "reload everything"
pub const RELOAD_ALL: &str = "all";

/// Store key for a logical artifact name
pub fn package_key(logical_name: &str) -> String {
    format!("{PACKAGE_KEY_PREFIX}{logical_name}")
}

/// Notification payload for a finished batch
///
/// Comma-joined logical names, or the reload-all sentinel when the batch
/// is empty.
pub fn reload_message(uploaded: &[String]) -> String {
    if uploaded.is_empty() {
        RELOAD_ALL.to_string()
    } else {
        uploaded.join(",")
    }
}

/// Errors raised by a package store backend
#[derive(Error, Debug)]
pub enum StoreError {
    /// Could not establish a connection (unreachable host, bad credential)
    #[error("failed to connect to the store: {0}")]
    Connect(String),

    /// The connectivity preflight failed on an established connection
    #[error("store ping failed: {0}")]
    Ping(String),

    /// A value write was rejected or lost
    #[error("store write failed for key '{key}': {message}")]
    Write { key: String, message: String },

    /// The notification publish was rejected or lost
    #[error("store publish failed on channel '{channel}': {message}")]
    Publish { channel: String, message: String },
}

/// Port for the shared key-value store acting as package transport
#[async_trait]
pub trait PackageStore: Send + Sync {
    /// Round-trip connectivity check
    async fn ping(&mut self) -> Result<(), StoreError>;

    /// Atomically replace the full value under `key`
    ///
    /// Overwrites any previous value; last write wins.
    async fn put(&mut self, key: &str, payload: &[u8]) -> Result<(), StoreError>;

    /// Publish `message` to `channel`, returning the receiver count
    async fn publish(&mut self, channel: &str, message: &str) -> Result<usize, StoreError>;
}
