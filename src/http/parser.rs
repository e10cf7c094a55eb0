//! Request parsing.
//!
//! A request arrives in one read, so parsing is a single pass over a byte
//! slice rather than an incremental feed. The head is split from the body at
//! the first blank line. The request line is tokenized into whitespace-
//! separated spans: the first span is the method, the last is the version,
//! and the path is everything in between. Header lines are scanned as
//! `name: value` pairs; lines without a colon are skipped, and a second
//! `Host` line in any spelling rejects the request.

use crate::http::headers::HttpHeaders;
use crate::http::request::HttpRequest;
use crate::http::status::HttpStatus;
use crate::http::{HttpMethod, is_supported_version};

const HEAD_TERMINATOR: &[u8] = b"\r\n\r\n";
const HOST: &str = "Host";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParserError {
    /// Nothing but whitespace on the request line.
    EmptyRequestLine,
    /// The head is not valid UTF-8.
    InvalidEncoding,
    /// Leading token is not `GET` or `POST`.
    UnknownMethod(String),
    /// No token after the method could be taken as a version.
    MissingVersion,
    /// Last token does not start with `HTTP/1.<digit>`.
    UnsupportedVersion(String),
    /// More than one `Host` line, compared ignoring case.
    DuplicateHost,
}

impl ParserError {
    // All parser failures are protocol errors. The mapping is kept separate so
    // the parser stays unaware of status codes.
    pub fn into_http_status(self) -> HttpStatus {
        HttpStatus::BadRequest
    }
}

/// Parses one request from the bytes of a single read.
pub fn parse_request(raw: &[u8]) -> Result<HttpRequest, ParserError> {
    let (head, body) = split_head(raw);
    let head = std::str::from_utf8(head).map_err(|_| ParserError::InvalidEncoding)?;

    let mut lines = head.split('\n').map(|line| line.strip_suffix('\r').unwrap_or(line));
    let request_line = lines.next().unwrap_or("");

    let mut req = parse_request_line(request_line)?;
    req.headers = parse_headers(lines)?;
    req.body = body.to_vec();

    Ok(req)
}

fn split_head(raw: &[u8]) -> (&[u8], &[u8]) {
    match raw
        .windows(HEAD_TERMINATOR.len())
        .position(|window| window == HEAD_TERMINATOR)
    {
        Some(end) => (&raw[..end], &raw[end + HEAD_TERMINATOR.len()..]),
        None => (raw, &[]),
    }
}

/// `METHOD <ws> path <ws> HTTP/1.<digit>`, tolerating runs of whitespace.
fn parse_request_line(line: &str) -> Result<HttpRequest, ParserError> {
    let tokens = tokenize(line);

    let Some(&(method_start, method_end)) = tokens.first() else {
        return Err(ParserError::EmptyRequestLine);
    };
    let method_token = &line[method_start..method_end];
    let method = HttpMethod::from_token(method_token)
        .ok_or_else(|| ParserError::UnknownMethod(method_token.to_string()))?;

    if tokens.len() < 2 {
        return Err(ParserError::MissingVersion);
    }
    let (version_start, version_end) = tokens[tokens.len() - 1];
    let version = &line[version_start..version_end];
    if !is_supported_version(version) {
        return Err(ParserError::UnsupportedVersion(version.to_string()));
    }

    let path = line[method_end..version_start].trim();
    let path = if path.is_empty() { "/" } else { path };

    Ok(HttpRequest::new(method, path, version))
}

#[derive(Clone, Copy, PartialEq)]
enum TokenizerState {
    Between,
    InToken(usize),
}

/// Byte spans of the whitespace-separated tokens of `line`.
fn tokenize(line: &str) -> Vec<(usize, usize)> {
    let mut spans = Vec::with_capacity(3);
    let mut state = TokenizerState::Between;

    for (idx, ch) in line.char_indices() {
        match (state, ch.is_ascii_whitespace()) {
            (TokenizerState::Between, false) => state = TokenizerState::InToken(idx),
            (TokenizerState::InToken(start), true) => {
                spans.push((start, idx));
                state = TokenizerState::Between;
            }
            _ => {}
        }
    }
    if let TokenizerState::InToken(start) = state {
        spans.push((start, line.len()));
    }

    spans
}

fn parse_headers<'a>(lines: impl Iterator<Item = &'a str>) -> Result<HttpHeaders, ParserError> {
    let mut headers = HttpHeaders::new();

    for line in lines {
        if line.is_empty() {
            break;
        }
        let Some((name, value)) = line.split_once(':') else {
            continue;
        };
        let name = name.trim();
        if name.eq_ignore_ascii_case(HOST) && headers.contains(HOST) {
            return Err(ParserError::DuplicateHost);
        }
        headers.set_raw(name, value.trim());
    }

    Ok(headers)
}
