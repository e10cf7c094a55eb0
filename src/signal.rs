//! One-shot signals used to coordinate the server lifecycle.
//!
//! A [`Signal`] fires at most once and carries a value. Any number of tasks may
//! wait on it; all of them wake when it fires, and waiting after the fact
//! returns immediately. Firing is implemented by closing a channel that never
//! carries messages, so every pending `recv` resolves at the same time.

use std::net::SocketAddr;
use std::sync::Arc;

use async_std::channel::{self, Receiver, Sender};
use once_cell::sync::OnceCell;

use crate::error::SignalError;

pub struct Signal<T> {
    value: OnceCell<T>,
    tx: Sender<()>,
    rx: Receiver<()>,
}

impl<T> Signal<T> {
    pub fn new() -> Self {
        let (tx, rx) = channel::bounded(1);
        Self {
            value: OnceCell::new(),
            tx,
            rx,
        }
    }

    /// Fires the signal. A second call is a programming error and is reported
    /// as [`SignalError::AlreadyFired`]; the first value is kept.
    pub fn fire(&self, value: T) -> Result<(), SignalError> {
        self.value
            .set(value)
            .map_err(|_| SignalError::AlreadyFired)?;
        self.tx.close();
        Ok(())
    }

    pub fn is_fired(&self) -> bool {
        self.value.get().is_some()
    }

    pub fn get(&self) -> Option<&T> {
        self.value.get()
    }

    /// Waits until the signal fires and returns its value.
    pub async fn wait(&self) -> &T {
        loop {
            if let Some(value) = self.value.get() {
                return value;
            }
            // Nothing is ever sent: recv only returns once the channel closes.
            let _ = self.rx.recv().await;
        }
    }
}

impl<T> Default for Signal<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// The readiness and shutdown pair handed to a [`Server`](crate::net::server::Server).
///
/// Cloning shares the underlying signals.
#[derive(Clone, Default)]
pub struct Signals {
    ready: Arc<Signal<SocketAddr>>,
    shutdown: Arc<Signal<()>>,
}

impl Signals {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fires with the bound address once the listener accepts connections.
    pub fn ready(&self) -> &Signal<SocketAddr> {
        &self.ready
    }

    pub fn shutdown(&self) -> &Signal<()> {
        &self.shutdown
    }

    /// Requests termination of the accept loop.
    pub fn request_shutdown(&self) -> Result<(), SignalError> {
        self.shutdown.fire(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_std::task;
    use std::time::Duration;

    #[test]
    fn fires_exactly_once() {
        let signal = Signal::new();
        assert!(!signal.is_fired());
        assert_eq!(signal.fire(1), Ok(()));
        assert_eq!(signal.fire(2), Err(SignalError::AlreadyFired));
        assert_eq!(signal.get(), Some(&1));
    }

    #[async_std::test]
    async fn wait_after_fire_returns_immediately() {
        let signal = Signal::new();
        signal.fire("up").unwrap();
        assert_eq!(*signal.wait().await, "up");
    }

    #[async_std::test]
    async fn wakes_every_waiter() {
        let signals = Signals::new();
        let waiters: Vec<_> = (0..4)
            .map(|_| {
                let signals = signals.clone();
                task::spawn(async move {
                    signals.shutdown().wait().await;
                })
            })
            .collect();

        task::sleep(Duration::from_millis(20)).await;
        signals.request_shutdown().unwrap();

        for waiter in waiters {
            async_std::future::timeout(Duration::from_secs(1), waiter)
                .await
                .expect("waiter did not wake");
        }
        assert_eq!(signals.request_shutdown(), Err(SignalError::AlreadyFired));
    }
}
