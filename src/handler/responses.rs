use std::path::Path;

use tracing::error;

use crate::handler::classifier::Classification;
use crate::handler::static_files;
use crate::http::response::{HttpResponse, ResponseHeader};
use crate::http::status::HttpStatus;

/// Serializes a classification into a response.
///
/// A resource that cannot be read turns a `200` into a `500`.
pub async fn build(
    classification: &Classification<'_>,
    resource_root: &Path,
    server_name: &str,
) -> HttpResponse {
    let Some(resource) = classification.resource else {
        return any_error(classification.status, server_name);
    };

    match static_files::load(resource_root, resource).await {
        Ok(body) => ok(server_name, body.into_owned()),
        Err(err) => {
            error!(resource = ?resource, error = %err, "failed to read resource");
            internal_server_error(server_name)
        }
    }
}

pub fn ok(server_name: &str, body: Vec<u8>) -> HttpResponse {
    let mut res = HttpResponse::new(HttpStatus::Ok);

    res.set_header(ResponseHeader::Server, server_name);
    res.set_header(ResponseHeader::ContentType, "text/html");
    res.set_header(ResponseHeader::ContentLength, &body.len().to_string());

    res.body = body;
    res
}

pub fn bad_request() -> HttpResponse {
    HttpResponse::new(HttpStatus::BadRequest)
}

pub fn not_found(server_name: &str) -> HttpResponse {
    with_server(HttpStatus::NotFound, server_name)
}

pub fn internal_server_error(server_name: &str) -> HttpResponse {
    with_server(HttpStatus::InternalServerError, server_name)
}

pub fn any_error(err: HttpStatus, server_name: &str) -> HttpResponse {
    match err {
        HttpStatus::BadRequest => bad_request(),
        HttpStatus::NotFound => not_found(server_name),
        HttpStatus::InternalServerError => internal_server_error(server_name),
        _ => with_server(err, server_name),
    }
}

fn with_server(status: HttpStatus, server_name: &str) -> HttpResponse {
    let mut res = HttpResponse::new(status);
    res.set_header(ResponseHeader::Server, server_name);
    res
}
