//! Request classification: raw bytes in, status plus resource out.
//!
//! Parsing and validation failures become `400 BAD REQUEST`. Routing misses
//! become `404 NOT FOUND`, or `405` for a known path with the wrong method
//! when that is enabled.

use tracing::debug;

use crate::handler::permissions::{AllowAll, Authorizer};
use crate::handler::registry::{LookupError, Registry, Resource, RouteEntry};
use crate::http::parser::parse_request;
use crate::http::request::HttpRequest;
use crate::http::status::HttpStatus;
use crate::http::validator::Validator;

/// Outcome of one request. `resource` is set only for `200 OK`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification<'a> {
    pub status: HttpStatus,
    pub resource: Option<&'a Resource>,
}

impl<'a> Classification<'a> {
    pub fn ok(resource: &'a Resource) -> Self {
        Self {
            status: HttpStatus::Ok,
            resource: Some(resource),
        }
    }

    pub fn error(status: HttpStatus) -> Self {
        Self {
            status,
            resource: None,
        }
    }

    pub fn reason(&self) -> &'static str {
        self.status.reason()
    }
}

pub struct Classifier {
    registry: Registry,
    authority: String,
    default_index: String,
    method_not_allowed: bool,
    authorizer: Box<dyn Authorizer>,
}

impl Classifier {
    /// `authority` is the exact `Host` header value requests must carry.
    pub fn new(registry: Registry, authority: impl Into<String>) -> Self {
        Self {
            registry,
            authority: authority.into(),
            default_index: "index.html".to_string(),
            method_not_allowed: false,
            authorizer: Box::new(AllowAll),
        }
    }

    pub fn with_default_index(mut self, default_index: impl Into<String>) -> Self {
        self.default_index = default_index.into();
        self
    }

    pub fn with_method_not_allowed(mut self, enabled: bool) -> Self {
        self.method_not_allowed = enabled;
        self
    }

    pub fn with_authorizer(mut self, authorizer: Box<dyn Authorizer>) -> Self {
        self.authorizer = authorizer;
        self
    }

    pub fn classify(&self, raw: &[u8]) -> Classification<'_> {
        let req = match parse_request(raw) {
            Ok(req) => req,
            Err(err) => {
                debug!(error = ?err, "rejecting malformed request");
                return Classification::error(err.into_http_status());
            }
        };

        if let Err(err) = Validator::new(&self.authority).validate_request(&req) {
            debug!(method = %req.method, path = %req.path, error = ?err, "rejecting invalid request");
            return Classification::error(err.into_http_status());
        }

        let classification = self.route(&req);
        debug!(
            method = %req.method,
            path = %req.path,
            status = classification.status.code(),
            "classified request"
        );
        classification
    }

    fn route(&self, req: &HttpRequest) -> Classification<'_> {
        let entry = match self.lookup(req) {
            Ok(entry) => entry,
            Err(LookupError::MethodNotAllowed) if self.method_not_allowed => {
                return Classification::error(HttpStatus::MethodNotAllowed);
            }
            Err(_) => return Classification::error(HttpStatus::NotFound),
        };

        match self.authorizer.authorize(req, entry) {
            Ok(()) => Classification::ok(&entry.resource),
            Err(status) => Classification::error(status),
        }
    }

    /// Exact path first; a path ending in `/` that is not registered falls
    /// back to `<path><default_index>`.
    fn lookup(&self, req: &HttpRequest) -> Result<&RouteEntry, LookupError> {
        match self.registry.lookup(&req.path, req.method) {
            Err(LookupError::PathNotFound) if req.path.ends_with('/') => {
                let index = format!("{}{}", req.path, self.default_index);
                self.registry.lookup(&index, req.method)
            }
            result => result,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::HttpMethod;
    use std::path::PathBuf;

    const AUTHORITY: &str = "127.0.0.1:1337";

    fn classifier() -> Classifier {
        let mut registry = Registry::new();
        registry
            .register("/", HttpMethod::Get, Resource::File(PathBuf::from("index.html")))
            .unwrap();
        registry
            .register("/docs/index.html", HttpMethod::Get, Resource::Inline("docs".into()))
            .unwrap();
        registry
            .register("/login", HttpMethod::Post, Resource::Inline("hi".into()))
            .unwrap();
        Classifier::new(registry, AUTHORITY)
    }

    fn get(path: &str) -> String {
        format!("GET {path} HTTP/1.0\r\nHost: {AUTHORITY}\r\nConnection: close\r\n\r\n")
    }

    #[test]
    fn registered_path_is_ok() {
        let classifier = classifier();
        let result = classifier.classify(get("/").as_bytes());
        assert_eq!(result.status, HttpStatus::Ok);
        assert_eq!(result.reason(), "OK");
        assert_eq!(
            result.resource,
            Some(&Resource::File(PathBuf::from("index.html")))
        );
    }

    #[test]
    fn unknown_path_is_not_found() {
        let classifier = classifier();
        let result = classifier.classify(get("/missing").as_bytes());
        assert_eq!(result, Classification::error(HttpStatus::NotFound));
    }

    #[test]
    fn trailing_slash_falls_back_to_default_index() {
        let classifier = classifier();
        let result = classifier.classify(get("/docs/").as_bytes());
        assert_eq!(result.resource, Some(&Resource::Inline("docs".into())));

        let classifier = classifier.with_default_index("home.html");
        let result = classifier.classify(get("/docs/").as_bytes());
        assert_eq!(result.status, HttpStatus::NotFound);
    }

    #[test]
    fn wrong_method_is_not_found_unless_enabled() {
        let request = get("/login");

        let classifier = classifier();
        assert_eq!(classifier.classify(request.as_bytes()).status, HttpStatus::NotFound);

        let classifier = classifier.with_method_not_allowed(true);
        assert_eq!(
            classifier.classify(request.as_bytes()).status,
            HttpStatus::MethodNotAllowed
        );
        // unknown paths stay 404 either way
        assert_eq!(
            classifier.classify(get("/missing").as_bytes()).status,
            HttpStatus::NotFound
        );
    }

    #[test]
    fn protocol_violations_are_bad_requests() {
        let classifier = classifier();
        for raw in [
            format!("DON'T / HTTP/1.0\r\nHost: {AUTHORITY}\r\n\r\n"),
            "GET / HTTP/1.0\r\n\r\n".to_string(),
            "GET / HTTP/1.0\r\nHost: 127.0.0.1:1338\r\n\r\n".to_string(),
            format!("GET / HTTP/2.0\r\nHost: {AUTHORITY}\r\n\r\n"),
            format!("GET / FTP/1.0\r\nHost: {AUTHORITY}\r\n\r\n"),
            format!("POST /login HTTP/1.0\r\nHost: {AUTHORITY}\r\n\r\n"),
            format!("GET / HTTP/1.0\r\nhost: {AUTHORITY}\r\n\r\n"),
            format!("GET / HTTP/1.0\r\nHost: evil.example:1\r\nHost: {AUTHORITY}\r\n\r\n"),
            String::new(),
        ] {
            assert_eq!(
                classifier.classify(raw.as_bytes()),
                Classification::error(HttpStatus::BadRequest),
                "{raw:?}"
            );
        }
    }

    #[test]
    fn post_with_payload_is_ok() {
        let classifier = classifier();
        let raw = format!("POST /login HTTP/1.1\r\nHost: {AUTHORITY}\r\n\r\nusername: user, password: pass");
        assert_eq!(
            classifier.classify(raw.as_bytes()).resource,
            Some(&Resource::Inline("hi".into()))
        );
    }

    struct DenyAll;

    impl Authorizer for DenyAll {
        fn authorize(&self, _req: &HttpRequest, entry: &RouteEntry) -> Result<(), HttpStatus> {
            match entry.permission {
                Some(_) => Err(HttpStatus::Unauthorized),
                None => Ok(()),
            }
        }
    }

    #[test]
    fn authorizer_runs_after_a_registry_hit() {
        let mut registry = Registry::new();
        registry
            .register("/admin", HttpMethod::Get, Resource::Inline("admin".into()))
            .unwrap();
        registry.change_permission("/admin", "Role: Admin").unwrap();

        // the shipped hook is a no-op
        let classifier = Classifier::new(registry.clone(), AUTHORITY);
        assert_eq!(classifier.classify(get("/admin").as_bytes()).status, HttpStatus::Ok);

        let classifier = Classifier::new(registry, AUTHORITY).with_authorizer(Box::new(DenyAll));
        assert_eq!(
            classifier.classify(get("/admin").as_bytes()).status,
            HttpStatus::Unauthorized
        );
    }
}
