//! In-memory package store
//!
//! Development and test twin of the Redis-backed store. Keeps every value
//! in a map and records an ordered operation log, so tests can assert both
//! final state and the write-then-publish ordering invariant. Write
//! failures can be injected per key for failure-path tests.

use crate::store::{PackageStore, StoreError};
use async_trait::async_trait;
use std::collections::HashMap;

/// One recorded store operation, in call order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreOp {
    Put { key: String },
    Publish { channel: String, message: String },
}

/// Package store held entirely in process memory
#[derive(Debug, Default)]
pub struct MemoryPackageStore {
    values: HashMap<String, Vec<u8>>,
    ops: Vec<StoreOp>,
    fail_key: Option<String>,
}

impl MemoryPackageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every write to `key` fail, for failure-path tests
    pub fn fail_writes_to(&mut self, key: impl Into<String>) {
        self.fail_key = Some(key.into());
    }

    /// Stored bytes for `key`, if any
    pub fn value(&self, key: &str) -> Option<&[u8]> {
        self.values.get(key).map(|v| v.as_slice())
    }

    /// Number of stored keys
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True when nothing has been stored
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Every operation seen so far, in call order
    pub fn ops(&self) -> &[StoreOp] {
        &self.ops
    }

    /// Every publish seen so far, as `(channel, message)` pairs
    pub fn published(&self) -> Vec<(&str, &str)> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                StoreOp::Publish { channel, message } => {
                    Some((channel.as_str(), message.as_str()))
                }
                StoreOp::Put { .. } => None,
            })
            .collect()
    }
}

#[async_trait]
impl PackageStore for MemoryPackageStore {
    async fn ping(&mut self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn put(&mut self, key: &str, payload: &[u8]) -> Result<(), StoreError> {
        if self.fail_key.as_deref() == Some(key) {
            return Err(StoreError::Write {
                key: key.to_string(),
                message: "injected write failure".to_string(),
            });
        }

        self.values.insert(key.to_string(), payload.to_vec());
        self.ops.push(StoreOp::Put {
            key: key.to_string(),
        });
        Ok(())
    }

    async fn publish(&mut self, channel: &str, message: &str) -> Result<usize, StoreError> {
        self.ops.push(StoreOp::Publish {
            channel: channel.to_string(),
            message: message.to_string(),
        });
        Ok(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_overwrites_previous_value() {
        let mut store = MemoryPackageStore::new();

        store.put("osd:package:default.tar", b"v1").await.unwrap();
        store.put("osd:package:default.tar", b"v2").await.unwrap();

        assert_eq!(store.len(), 1);
        assert_eq!(store.value("osd:package:default.tar"), Some(&b"v2"[..]));
    }

    #[tokio::test]
    async fn test_ops_are_recorded_in_order() {
        let mut store = MemoryPackageStore::new();

        store.put("a", b"1").await.unwrap();
        store.publish("osd:reload", "a").await.unwrap();

        assert_eq!(
            store.ops(),
            &[
                StoreOp::Put {
                    key: "a".to_string()
                },
                StoreOp::Publish {
                    channel: "osd:reload".to_string(),
                    message: "a".to_string()
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_injected_write_failure() {
        let mut store = MemoryPackageStore::new();
        store.fail_writes_to("bad-key");

        let result = store.put("bad-key", b"payload").await;
        assert!(matches!(result, Err(StoreError::Write { .. })));
        assert!(store.is_empty());
        assert!(store.ops().is_empty());
    }

    #[tokio::test]
    async fn test_published_filters_publish_ops() {
        let mut store = MemoryPackageStore::new();

        store.put("a", b"1").await.unwrap();
        store.publish("osd:reload", "default.tar").await.unwrap();

        assert_eq!(store.published(), vec![("osd:reload", "default.tar")]);
    }
}
