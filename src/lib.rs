//! pathserve: a small static-response server over a fixed path registry.
//!
//! Each accepted TCP connection carries exactly one request. The request
//! line and `Host` header are validated, the `(path, method)` pair is looked
//! up in an immutable [`Registry`], and the reply is either a bare status or
//! the registered resource served as `text/html`.
//!
//! ```no_run
//! use pathserve::{Server, ServerConfig, Signals};
//!
//! # async_std::task::block_on(async {
//! let config = ServerConfig::default();
//! let registry = config.registry().unwrap();
//! let signals = Signals::new();
//!
//! let running = Server::new(config, registry, signals).start().await.unwrap();
//! running.shutdown().await.unwrap();
//! # });
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod handler;
pub mod http;
pub mod net;
pub mod signal;

pub use config::ServerConfig;
pub use handler::registry::{Registry, Resource};
pub use net::server::{Phase, PhaseHandle, RunningServer, Server};
pub use signal::Signals;
