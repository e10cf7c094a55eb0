use crate::http::HttpMethod;
use crate::http::headers::HttpHeaders;

/// A request as read off a connection in a single read.
///
/// `body` holds whatever followed the blank line in that read; nothing is
/// read past the initial buffer.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub path: String,
    pub version: String,

    pub headers: HttpHeaders,
    pub body: Vec<u8>,
}

impl HttpRequest {
    pub fn new(method: HttpMethod, path: &str, version: &str) -> Self {
        Self {
            method,
            path: path.to_string(),
            version: version.to_string(),
            headers: HttpHeaders::new(),
            body: Vec::new(),
        }
    }

    /// The `Host` header, spelled exactly `Host`.
    pub fn host(&self) -> Option<&str> {
        self.headers.get_exact("Host")
    }
}
