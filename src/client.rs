//! Minimal client for talking to a running server.
//!
//! Each call opens a fresh connection, writes one request, and reads until the
//! server closes the connection.

use std::net::SocketAddr;

use async_std::net::TcpStream;
use async_std::prelude::*;

use crate::error::ClientError;

/// Status code and body text of one reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub status: u16,
    pub body: String,
}

impl Reply {
    /// Parses the raw bytes of a reply. The body is decoded lossily.
    pub fn parse(raw: &[u8]) -> Result<Reply, ClientError> {
        let line_end = raw
            .windows(2)
            .position(|w| w == b"\r\n")
            .ok_or_else(|| ClientError::MalformedReply("missing status line".to_string()))?;
        let status_line = std::str::from_utf8(&raw[..line_end])
            .map_err(|_| ClientError::MalformedReply("status line is not UTF-8".to_string()))?;

        let status = status_line
            .split_ascii_whitespace()
            .nth(1)
            .and_then(|code| code.parse::<u16>().ok())
            .ok_or_else(|| ClientError::MalformedReply(status_line.to_string()))?;

        let body = raw
            .windows(4)
            .position(|w| w == b"\r\n\r\n")
            .map(|end| String::from_utf8_lossy(&raw[end + 4..]).into_owned())
            .unwrap_or_default();

        Ok(Reply { status, body })
    }
}

pub struct Client {
    addr: SocketAddr,
    host: String,
}

impl Client {
    /// `host` is sent verbatim as the `Host` header.
    pub fn new(addr: SocketAddr, host: impl Into<String>) -> Self {
        Self {
            addr,
            host: host.into(),
        }
    }

    pub async fn get(&self, path: &str) -> Result<Reply, ClientError> {
        let request = format!(
            "GET {path} HTTP/1.1\r\nHost: {}\r\nConnection: close\r\n\r\n",
            self.host
        );
        Reply::parse(&self.send_raw(request.as_bytes()).await?)
    }

    pub async fn post(&self, path: &str, payload: &str) -> Result<Reply, ClientError> {
        let request = format!(
            "POST {path} HTTP/1.1\r\nHost: {}\r\nConnection: close\r\nContent-Length: {}\r\n\r\n{payload}",
            self.host,
            payload.len()
        );
        Reply::parse(&self.send_raw(request.as_bytes()).await?)
    }

    /// Writes `request` as is and returns every byte the server sent back.
    pub async fn send_raw(&self, request: &[u8]) -> Result<Vec<u8>, ClientError> {
        let mut stream = TcpStream::connect(self.addr).await?;
        stream.write_all(request).await?;
        stream.flush().await?;

        let mut reply = Vec::new();
        stream.read_to_end(&mut reply).await?;
        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_status_and_body() {
        let reply = Reply::parse(
            b"HTTP/1.1 200 OK\r\nServer: Custom/Server\r\nContent-Length: 2\r\n\r\nhi",
        )
        .unwrap();
        assert_eq!(reply, Reply { status: 200, body: "hi".to_string() });

        let reply = Reply::parse(b"HTTP/1.1 400 BAD REQUEST\r\n\r\n").unwrap();
        assert_eq!(reply, Reply { status: 400, body: String::new() });
    }

    #[test]
    fn rejects_garbage() {
        assert!(Reply::parse(b"").is_err());
        assert!(Reply::parse(b"HTTP/1.1 abc\r\n\r\n").is_err());
    }
}
