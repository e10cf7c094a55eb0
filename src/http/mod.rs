use std::fmt;

pub mod headers;
pub mod parser;
pub mod request;
pub mod response;
pub mod status;
pub mod validator;

/// Prefix every accepted version token must start with.
/// The minor version is any single digit; see [`is_supported_version`].
pub const HTTP_VERSION_PREFIX: &str = "HTTP/1.";

/// Methods the server routes. Any other token on the request line is a 400.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
}

impl HttpMethod {
    /// Exact, case-sensitive match on the method token.
    pub fn from_token(token: &str) -> Option<HttpMethod> {
        match token {
            "GET" => Some(HttpMethod::Get),
            "POST" => Some(HttpMethod::Post),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `HTTP/1.` followed by a digit. Anything after that digit is tolerated.
pub fn is_supported_version(token: &str) -> bool {
    token
        .strip_prefix(HTTP_VERSION_PREFIX)
        .and_then(|rest| rest.bytes().next())
        .is_some_and(|b| b.is_ascii_digit())
}
