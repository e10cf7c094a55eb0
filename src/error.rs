//! Error types for pathserve.
//!
//! Only [`StartupError`] ever reaches the caller of the server at runtime.
//! Everything that goes wrong while serving a connection is confined to that
//! connection: protocol and routing failures become HTTP status codes, and
//! I/O failures are logged before the socket is dropped.

use std::path::PathBuf;

use thiserror::Error;

/// The listening socket could not be bound. Fatal.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("readiness signal already fired")]
    Signal(#[from] SignalError),
}

/// Rejected registry mutations. Raised while the server is being assembled.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("route {method} {path} is already registered")]
    DuplicateRoute { path: String, method: String },

    #[error("invalid route path {0:?}: paths must start with '/'")]
    InvalidPath(String),

    #[error("no route registered for path {0}")]
    UnknownPath(String),
}

/// Failures while loading a [`ServerConfig`](crate::config::ServerConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("route {path}: unsupported method {method}")]
    UnsupportedMethod { path: String, method: String },

    #[error("route {0}: `file` and `body` are mutually exclusive")]
    ConflictingResource(String),

    #[error("buffer_size must be greater than zero")]
    ZeroBufferSize,

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SignalError {
    #[error("signal already fired")]
    AlreadyFired,
}

/// Reasons a connection ends without a delivered reply.
#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("client closed the connection before sending a request")]
    Closed,

    /// Read failed or hit the deadline. No reply was attempted.
    #[error("failed to read request: {0}")]
    Read(#[source] std::io::Error),

    /// A reply was built but could not be delivered.
    #[error("failed to write reply: {0}")]
    Write(#[source] std::io::Error),
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("malformed reply: {0}")]
    MalformedReply(String),
}
