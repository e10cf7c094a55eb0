use crate::handler::registry::RouteEntry;
use crate::http::request::HttpRequest;
use crate::http::status::HttpStatus;

/// Access check run after a registry hit.
///
/// Returning an error status (401 or 403) stops the request from being served.
pub trait Authorizer: Send + Sync {
    fn authorize(&self, req: &HttpRequest, entry: &RouteEntry) -> Result<(), HttpStatus>;
}

/// Accepts every request, including ones to routes that carry a permission.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAll;

impl Authorizer for AllowAll {
    fn authorize(&self, _req: &HttpRequest, _entry: &RouteEntry) -> Result<(), HttpStatus> {
        Ok(())
    }
}
