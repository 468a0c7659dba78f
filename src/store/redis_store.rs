//! Redis-backed package store
//!
//! Production implementation of the `PackageStore` port. Each artifact is
//! written with a single `SET` of the full byte value and the reload
//! notification goes out as one `PUBLISH`; both are single atomic commands
//! on the server, so a subscriber never observes a half-written package.

use crate::store::{PackageStore, StoreError};
use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::{AsyncCommands, ConnectionAddr, ConnectionInfo, ProtocolVersion, RedisConnectionInfo};
use secrecy::{ExposeSecret, SecretString};

/// Package store backed by a Redis instance
pub struct RedisPackageStore {
    connection: MultiplexedConnection,
}

impl RedisPackageStore {
    /// Connect and authenticate against a Redis instance
    ///
    /// # Arguments
    ///
    /// * `host` - Store host name or address
    /// * `port` - Store port
    /// * `password` - Optional AUTH credential
    pub async fn connect(
        host: &str,
        port: u16,
        password: Option<&SecretString>,
    ) -> Result<Self, StoreError> {
        let info = ConnectionInfo {
            addr: ConnectionAddr::Tcp(host.to_string(), port),
            redis: RedisConnectionInfo {
                db: 0,
                username: None,
                password: password.map(|p| p.expose_secret().to_string()),
                protocol: ProtocolVersion::RESP2,
            },
        };

        let client = redis::Client::open(info).map_err(|e| StoreError::Connect(e.to_string()))?;
        let connection = client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| StoreError::Connect(e.to_string()))?;

        Ok(Self { connection })
    }
}

#[async_trait]
impl PackageStore for RedisPackageStore {
    async fn ping(&mut self) -> Result<(), StoreError> {
        let reply: String = redis::cmd("PING")
            .query_async(&mut self.connection)
            .await
            .map_err(|e| StoreError::Ping(e.to_string()))?;

        if reply == "PONG" {
            Ok(())
        } else {
            Err(StoreError::Ping(format!("unexpected reply: {reply}")))
        }
    }

    async fn put(&mut self, key: &str, payload: &[u8]) -> Result<(), StoreError> {
        let _: () = self
            .connection
            .set(key, payload)
            .await
            .map_err(|e| StoreError::Write {
                key: key.to_string(),
                message: e.to_string(),
            })?;

        Ok(())
    }

    async fn publish(&mut self, channel: &str, message: &str) -> Result<usize, StoreError> {
        let receivers: i64 = self
            .connection
            .publish(channel, message)
            .await
            .map_err(|e| StoreError::Publish {
                channel: channel.to_string(),
                message: e.to_string(),
            })?;

        Ok(receivers.max(0) as usize)
    }
}
