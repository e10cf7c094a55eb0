use crate::http::headers::HttpHeaders;
use crate::http::status::HttpStatus;

pub enum ResponseHeader {
    ContentLength,
    ContentType,
    Server,
}

pub struct HttpResponse {
    pub status: HttpStatus,
    pub headers: HttpHeaders,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status: HttpStatus) -> Self {
        Self {
            status,
            headers: HttpHeaders::new(),
            body: Vec::new(),
        }
    }

    pub fn set_header(&mut self, h: ResponseHeader, value: &str) {
        let name = match h {
            ResponseHeader::ContentType => "Content-Type",
            ResponseHeader::ContentLength => "Content-Length",
            ResponseHeader::Server => "Server",
        };

        self.headers.set_raw(name, value);
    }

    // HTTP/1.1 <status> <reason>\r\n
    // <header_name>: <header_value>\r\n
    // ...
    // \r\n
    pub fn build_headers(&self) -> String {
        format!(
            "HTTP/1.1 {} {}\r\n{}\r\n",
            self.status.code(),
            self.status.reason(),
            self.headers.stringify(),
        )
    }

    /// Head followed by the body, exactly as written to the socket.
    pub fn to_bytes(&self) -> Vec<u8> {
        let head = self.build_headers();
        let mut bytes = Vec::with_capacity(head.len() + self.body.len());
        bytes.extend_from_slice(head.as_bytes());
        bytes.extend_from_slice(&self.body);
        bytes
    }
}
