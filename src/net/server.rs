//! Server lifecycle.
//!
//! This module owns the listening socket. It binds, signals readiness, runs
//! the accept loop and stops it on request. Request handling is delegated:
//! every accepted connection is handed to a
//! [`ConnectionHandler`](crate::net::connection::ConnectionHandler) running
//! on its own task, so the loop only ever waits on `accept`.
//!
//! ## Lifecycle
//!
//! ```text
//! Unstarted -> Binding -> Ready -> Draining -> Stopped
//!                 |
//!                 +-----> Failed
//! ```
//!
//! Shutdown only stops the accept loop. Connections already accepted run to
//! completion, bounded by their own read deadline.

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};
use std::time::Duration;

use async_std::net::{TcpListener, TcpStream};
use async_std::task::{self, JoinHandle};
use futures::FutureExt;
use tracing::{error, info, warn};

use crate::config::ServerConfig;
use crate::error::{SignalError, StartupError};
use crate::handler::Handler;
use crate::handler::classifier::Classifier;
use crate::handler::permissions::Authorizer;
use crate::handler::registry::Registry;
use crate::net::connection::ConnectionHandler;
use crate::signal::Signals;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Unstarted,
    Binding,
    Ready,
    Draining,
    Stopped,
    Failed,
}

/// Pause after a failed `accept` so a persistent error (e.g. `EMFILE`) does
/// not spin the loop.
const ACCEPT_BACKOFF: Duration = Duration::from_millis(50);

#[derive(Debug)]
struct PhaseCell(AtomicU8);

impl PhaseCell {
    fn new(phase: Phase) -> Self {
        Self(AtomicU8::new(phase as u8))
    }

    fn set(&self, phase: Phase) {
        self.0.store(phase as u8, Ordering::Release);
    }

    fn get(&self) -> Phase {
        match self.0.load(Ordering::Acquire) {
            0 => Phase::Unstarted,
            1 => Phase::Binding,
            2 => Phase::Ready,
            3 => Phase::Draining,
            4 => Phase::Stopped,
            _ => Phase::Failed,
        }
    }
}

/// Read-only view of a server's [`Phase`].
///
/// Taken from [`Server::phase_handle`] before `start`, it stays valid when
/// `start` consumes the server, so a `Failed` startup can still be observed.
#[derive(Debug, Clone)]
pub struct PhaseHandle(Arc<PhaseCell>);

impl PhaseHandle {
    pub fn get(&self) -> Phase {
        self.0.get()
    }
}

pub struct Server {
    config: ServerConfig,
    registry: Registry,
    signals: Signals,
    authorizer: Option<Box<dyn Authorizer>>,
    phase: Arc<PhaseCell>,
}

impl Server {
    pub fn new(config: ServerConfig, registry: Registry, signals: Signals) -> Self {
        Self {
            config,
            registry,
            signals,
            authorizer: None,
            phase: Arc::new(PhaseCell::new(Phase::Unstarted)),
        }
    }

    pub fn with_authorizer(mut self, authorizer: Box<dyn Authorizer>) -> Self {
        self.authorizer = Some(authorizer);
        self
    }

    pub fn phase(&self) -> Phase {
        self.phase.get()
    }

    pub fn phase_handle(&self) -> PhaseHandle {
        PhaseHandle(Arc::clone(&self.phase))
    }

    /// Binds the listener, fires the readiness signal and spawns the accept
    /// loop. A bind failure is returned here and readiness never fires.
    pub async fn start(self) -> Result<RunningServer, StartupError> {
        let addr = self.config.bind_addr();
        self.phase.set(Phase::Binding);

        let listener = match TcpListener::bind((self.config.host.as_str(), self.config.port)).await {
            Ok(listener) => listener,
            Err(source) => {
                self.phase.set(Phase::Failed);
                error!(%addr, error = %source, "failed to bind listener");
                return Err(StartupError::Bind { addr, source });
            }
        };
        let local_addr = match listener.local_addr() {
            Ok(local_addr) => local_addr,
            Err(source) => {
                self.phase.set(Phase::Failed);
                return Err(StartupError::Bind { addr, source });
            }
        };

        // Requests must name the port actually bound, which differs from the
        // configured one when that is 0.
        let authority = format!("{}:{}", self.config.host, local_addr.port());

        let mut classifier = Classifier::new(self.registry, authority.clone())
            .with_default_index(self.config.default_index.clone())
            .with_method_not_allowed(self.config.method_not_allowed);
        if let Some(authorizer) = self.authorizer {
            classifier = classifier.with_authorizer(authorizer);
        }
        let handler = Handler::new(classifier, &self.config);
        let connections = Arc::new(ConnectionHandler::new(handler, &self.config));

        self.phase.set(Phase::Ready);
        if let Err(err) = self.signals.ready().fire(local_addr) {
            self.phase.set(Phase::Failed);
            return Err(err.into());
        }
        info!(%local_addr, "listening");

        let task = task::spawn(accept_loop(
            listener,
            connections,
            self.signals.clone(),
            Arc::clone(&self.phase),
        ));

        Ok(RunningServer {
            local_addr,
            authority,
            signals: self.signals,
            phase: self.phase,
            task,
        })
    }

    /// Starts the server and waits until the accept loop has stopped.
    pub async fn run(self) -> Result<(), StartupError> {
        self.start().await?.join().await;
        Ok(())
    }
}

/// Handle to a server whose accept loop is running.
pub struct RunningServer {
    local_addr: SocketAddr,
    authority: String,
    signals: Signals,
    phase: Arc<PhaseCell>,
    task: JoinHandle<()>,
}

impl RunningServer {
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// The `Host` header value requests must carry.
    pub fn authority(&self) -> &str {
        &self.authority
    }

    pub fn phase(&self) -> Phase {
        self.phase.get()
    }

    pub fn signals(&self) -> &Signals {
        &self.signals
    }

    /// Fires the shutdown signal. The accept loop closes the listener and
    /// returns; use [`join`](Self::join) to wait for that.
    pub fn stop(&self) -> Result<(), SignalError> {
        info!(local_addr = %self.local_addr, "shutdown requested");
        self.signals.request_shutdown()
    }

    pub async fn join(self) {
        self.task.await
    }

    pub async fn shutdown(self) -> Result<(), SignalError> {
        self.stop()?;
        self.join().await;
        Ok(())
    }
}

enum Event {
    Accepted(std::io::Result<(TcpStream, SocketAddr)>),
    Shutdown,
}

async fn accept_loop(
    listener: TcpListener,
    connections: Arc<ConnectionHandler>,
    signals: Signals,
    phase: Arc<PhaseCell>,
) {
    loop {
        let event = {
            let accept = listener.accept().fuse();
            let shutdown = signals.shutdown().wait().fuse();
            futures::pin_mut!(accept, shutdown);

            futures::select! {
                res = accept => Event::Accepted(res),
                _ = shutdown => Event::Shutdown,
            }
        };

        match event {
            Event::Accepted(Ok((stream, peer))) => {
                let connections = Arc::clone(&connections);
                task::spawn(async move { connections.handle_client(stream, peer).await });
            }
            // Transient (e.g. aborted handshakes, fd exhaustion): keep accepting.
            Event::Accepted(Err(err)) => {
                warn!(error = %err, "failed to accept connection");
                task::sleep(ACCEPT_BACKOFF).await;
            }
            Event::Shutdown => break,
        }
    }

    phase.set(Phase::Draining);
    drop(listener);
    phase.set(Phase::Stopped);
    info!("accept loop stopped");
}
