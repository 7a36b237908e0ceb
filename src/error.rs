use crate::server::ServerDescriptor;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum WhoisError {
    /// The target looks like an email address.
    #[error("email addresses are not supported: {0:?}")]
    UnsupportedTarget(String),

    /// The target could not be converted to its ASCII form.
    #[error("{0:?} is not a valid domain name")]
    InvalidTarget(String),

    /// The registry has no entry for the target or any of its suffixes.
    #[error("no whois server is known for {0:?}")]
    NoServerKnown(String),

    /// Connect, send or receive failed.
    #[error("network error talking to {server}: {source}")]
    Network {
        server: ServerDescriptor,
        #[source]
        source: std::io::Error,
    },

    /// The exchange did not complete in time.
    #[error("timeout after {after:?} talking to {server}")]
    Timeout {
        server: ServerDescriptor,
        after: std::time::Duration,
    },

    /// Wrapper for [`serde_json::Error`](https://docs.rs/serde_json/latest/serde_json/struct.Error.html)
    #[error("server registry deserialization: {0}")]
    Registry(#[from] serde_json::Error),

    /// A registry entry resolved to an empty host.
    #[error("server registry entry {key:?} has no host")]
    InvalidRegistryEntry { key: String },

    /// Wrapper for [`std::io::Error`](https://doc.rust-lang.org/std/io/struct.Error.html)
    #[error("IO: {0:?}")]
    Io(#[from] std::io::Error),
}
