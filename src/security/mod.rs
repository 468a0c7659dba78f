pub mod credentials;
pub mod ssh_executor;

pub use credentials::{STORE_PASSWORD_ENV, StoreCredentials};
pub use ssh_executor::{RemoteError, RemoteHost, SshRemoteHost};
