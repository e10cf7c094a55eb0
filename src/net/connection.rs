//! Per-connection request/response cycle.
//!
//! Each accepted connection gets exactly one read, bounded by the configured
//! deadline. A client that sends nothing, disconnects, or is too slow is
//! dropped without a reply. Anything that was read is answered, and the
//! connection is closed after the single response.

use std::net::{Shutdown, SocketAddr};
use std::time::Duration;

use async_std::io;
use async_std::net::TcpStream;
use async_std::prelude::*;
use tracing::{debug, warn};

use crate::config::ServerConfig;
use crate::error::ConnectionError;
use crate::handler::Handler;
use crate::http::response::HttpResponse;

pub struct ConnectionHandler {
    handler: Handler,
    read_timeout: Duration,
    buffer_size: usize,
}

impl ConnectionHandler {
    pub fn new(handler: Handler, config: &ServerConfig) -> Self {
        Self {
            handler,
            read_timeout: config.read_timeout,
            buffer_size: config.buffer_size,
        }
    }

    /// Serves one connection and closes it. Never fails: every error is
    /// logged here and stays confined to this connection.
    pub async fn handle_client(&self, mut stream: TcpStream, peer: SocketAddr) {
        match self.serve(&mut stream).await {
            Ok(response) => debug!(%peer, status = response.status.code(), "response written"),
            Err(ConnectionError::Closed) => {
                debug!(%peer, "client disconnected before sending a request")
            }
            Err(ConnectionError::Read(err)) => {
                warn!(%peer, error = %err, "dropping connection without a reply")
            }
            Err(ConnectionError::Write(err)) => {
                warn!(%peer, error = %err, "failed to deliver reply")
            }
        }

        if let Err(err) = stream.shutdown(Shutdown::Both) {
            if err.kind() != std::io::ErrorKind::NotConnected {
                debug!(%peer, error = %err, "failed to shut down connection");
            }
        }
    }

    async fn serve(&self, stream: &mut TcpStream) -> Result<HttpResponse, ConnectionError> {
        let mut buffer = vec![0; self.buffer_size];
        let n = self.read_request(stream, &mut buffer).await?;

        let response = self.handler.handle_request(&buffer[..n]).await;
        Self::write_response(stream, &response)
            .await
            .map_err(ConnectionError::Write)?;
        Ok(response)
    }

    async fn read_request(
        &self,
        stream: &mut TcpStream,
        buffer: &mut [u8],
    ) -> Result<usize, ConnectionError> {
        match io::timeout(self.read_timeout, stream.read(buffer)).await {
            Ok(0) => Err(ConnectionError::Closed),
            Ok(n) => Ok(n),
            Err(err) => Err(ConnectionError::Read(err)),
        }
    }

    async fn write_response(stream: &mut TcpStream, response: &HttpResponse) -> std::io::Result<()> {
        stream.write_all(&response.to_bytes()).await?;
        stream.flush().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::classifier::Classifier;
    use crate::handler::registry::Registry;
    use async_std::net::TcpListener;

    async fn socket_pair() -> (TcpStream, TcpStream) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let client = TcpStream::connect(listener.local_addr().unwrap())
            .await
            .unwrap();
        let (server, _) = listener.accept().await.unwrap();
        (client, server)
    }

    fn connection_handler() -> ConnectionHandler {
        let config = ServerConfig {
            read_timeout: Duration::from_millis(50),
            ..ServerConfig::default()
        };
        let classifier = Classifier::new(Registry::new(), "127.0.0.1:1337");
        ConnectionHandler::new(Handler::new(classifier, &config), &config)
    }

    async fn serve_err(stream: &mut TcpStream) -> ConnectionError {
        match connection_handler().serve(stream).await {
            Ok(response) => panic!("unexpected reply: {}", response.status.code()),
            Err(err) => err,
        }
    }

    #[async_std::test]
    async fn silent_client_is_a_read_failure() {
        let (_client, mut server) = socket_pair().await;
        let err = serve_err(&mut server).await;
        assert!(
            matches!(err, ConnectionError::Read(ref io) if io.kind() == std::io::ErrorKind::TimedOut),
            "{err}"
        );
    }

    #[async_std::test]
    async fn early_close_is_reported_as_closed() {
        let (client, mut server) = socket_pair().await;
        client.shutdown(Shutdown::Write).unwrap();
        assert!(matches!(serve_err(&mut server).await, ConnectionError::Closed));
    }

    #[async_std::test]
    async fn undeliverable_reply_is_a_write_failure() {
        let (mut client, mut server) = socket_pair().await;
        client
            .write_all(b"GET / HTTP/1.0\r\nHost: 127.0.0.1:1337\r\n\r\n")
            .await
            .unwrap();
        server.shutdown(Shutdown::Write).unwrap();

        let err = serve_err(&mut server).await;
        assert!(matches!(err, ConnectionError::Write(_)), "{err}");
    }
}
