use crate::http::HttpMethod;
use crate::http::request::HttpRequest;
use crate::http::status::HttpStatus;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidatorError {
    MissingHost,
    HostMismatch(String),
    MandatoryBody,
}

impl ValidatorError {
    pub fn into_http_status(self) -> HttpStatus {
        match self {
            ValidatorError::MissingHost => HttpStatus::BadRequest,
            ValidatorError::HostMismatch(_) => HttpStatus::BadRequest,
            ValidatorError::MandatoryBody => HttpStatus::BadRequest,
        }
    }
}

/// Checks a parsed request against the server it arrived at.
///
/// `authority` is the `<host>:<port>` the listener is bound to. The header
/// must be spelled `Host` and its value must equal `authority` byte for byte;
/// no default port is inferred.
pub struct Validator<'a> {
    authority: &'a str,
}

impl<'a> Validator<'a> {
    pub fn new(authority: &'a str) -> Self {
        Self { authority }
    }

    fn validate_host(&self, req: &HttpRequest) -> Result<(), ValidatorError> {
        match req.host() {
            None => Err(ValidatorError::MissingHost),
            Some(host) if host == self.authority => Ok(()),
            Some(host) => Err(ValidatorError::HostMismatch(host.to_string())),
        }
    }

    fn validate_body(req: &HttpRequest) -> Result<(), ValidatorError> {
        match req.method {
            HttpMethod::Post if req.body.is_empty() => Err(ValidatorError::MandatoryBody),
            _ => Ok(()),
        }
    }

    pub fn validate_request(&self, req: &HttpRequest) -> Result<(), ValidatorError> {
        self.validate_host(req)?;
        Self::validate_body(req)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::parser::parse_request;

    fn validate(raw: &[u8]) -> Result<(), ValidatorError> {
        let req = parse_request(raw).unwrap();
        Validator::new("127.0.0.1:1337").validate_request(&req)
    }

    #[test]
    fn host_must_match_exactly() {
        assert_eq!(validate(b"GET / HTTP/1.0\r\nHost: 127.0.0.1:1337\r\n\r\n"), Ok(()));
        assert_eq!(
            validate(b"GET / HTTP/1.0\r\n\r\n"),
            Err(ValidatorError::MissingHost)
        );
        assert_eq!(
            validate(b"GET / HTTP/1.0\r\nHost: 127.0.0.1\r\n\r\n"),
            Err(ValidatorError::HostMismatch("127.0.0.1".to_string()))
        );
        assert!(validate(b"GET / HTTP/1.0\r\nHost: localhost:1337\r\n\r\n").is_err());
        assert!(validate(b"GET / HTTP/1.0\r\nHost: 127.0.0.1:80\r\n\r\n").is_err());
    }

    #[test]
    fn host_name_is_case_sensitive() {
        for raw in [
            &b"GET / HTTP/1.0\r\nhost: 127.0.0.1:1337\r\n\r\n"[..],
            &b"GET / HTTP/1.0\r\nHOST: 127.0.0.1:1337\r\n\r\n"[..],
        ] {
            assert_eq!(validate(raw), Err(ValidatorError::MissingHost));
        }
    }

    #[test]
    fn post_requires_a_payload() {
        assert_eq!(
            validate(b"POST /login HTTP/1.0\r\nHost: 127.0.0.1:1337\r\n\r\n"),
            Err(ValidatorError::MandatoryBody)
        );
        assert_eq!(
            validate(b"POST /login HTTP/1.0\r\nHost: 127.0.0.1:1337\r\n\r\nuser=a"),
            Ok(())
        );
    }
}
