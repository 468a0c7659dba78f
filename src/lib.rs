pub mod core;
pub mod orchestration;
pub mod security;
pub mod store;

pub use self::core::*;
pub use orchestration::{DeployOptions, DeployReport, PackagePublisher};
pub use security::{RemoteError, RemoteHost, SshRemoteHost, StoreCredentials};
pub use store::{MemoryPackageStore, PackageStore, RedisPackageStore, StoreError};
