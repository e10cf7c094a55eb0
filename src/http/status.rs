/// Status codes known to the server.
///
/// Only `Ok`, `BadRequest`, `NotFound` and `InternalServerError` are produced
/// by default; `MethodNotAllowed` is opt-in through the configuration. The
/// rest are reserved for the permission hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpStatus {
    Ok = 200,
    Accepted = 202,

    BadRequest = 400,
    Unauthorized = 401,
    Forbidden = 403,
    NotFound = 404,
    MethodNotAllowed = 405,
    Gone = 410,

    InternalServerError = 500,
}

impl HttpStatus {
    pub fn code(self) -> u16 {
        self as u16
    }

    /// Reason phrase as written on the status line.
    pub fn reason(self) -> &'static str {
        match self {
            HttpStatus::Ok => "OK",
            HttpStatus::Accepted => "ACCEPTED",
            HttpStatus::BadRequest => "BAD REQUEST",
            HttpStatus::Unauthorized => "UNAUTHORIZED",
            HttpStatus::Forbidden => "FORBIDDEN",
            HttpStatus::NotFound => "NOT FOUND",
            HttpStatus::MethodNotAllowed => "METHOD NOT ALLOWED",
            HttpStatus::Gone => "GONE",
            HttpStatus::InternalServerError => "INTERNAL SERVER ERROR",
        }
    }
}
