use crate::dispatcher::HandlerResponse;
use may_minihttp::Response;
use once_cell::sync::Lazy;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use tracing::error;

/// `may_minihttp` only accepts `&'static str` header lines. Dynamic lines
/// (`Location: /todos/7`, configured CORS values) are leaked once and reused.
static HEADER_LINES: Lazy<Mutex<HashMap<String, &'static str>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));

fn static_header_line(name: &str, value: &str) -> &'static str {
    let line = format!("{name}: {value}");
    let mut cache = HEADER_LINES.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(existing) = cache.get(&line) {
        return existing;
    }
    let leaked: &'static str = Box::leak(line.clone().into_boxed_str());
    cache.insert(line, leaked);
    leaked
}

pub(crate) fn status_reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        201 => "Created",
        204 => "No Content",
        302 => "Found",
        400 => "Bad Request",
        404 => "Not Found",
        405 => "Method Not Allowed",
        500 => "Internal Server Error",
        _ => "OK",
    }
}

/// Write a handler response: status line, headers, then body.
///
/// Without an explicit `Content-Type`, JSON bodies are sent as
/// `application/json`, string bodies as `text/plain`, and `Null` as an empty
/// body with no content type.
pub fn write_handler_response(res: &mut Response, response: HandlerResponse) {
    let HandlerResponse {
        status,
        headers,
        body,
    } = response;
    res.status_code(status as usize, status_reason(status));

    let has_content_type = headers
        .iter()
        .any(|(k, _)| k.eq_ignore_ascii_case("content-type"));
    for (name, value) in &headers {
        res.header(static_header_line(name, value));
    }

    match body {
        Value::Null => {
            res.body_vec(Vec::new());
        }
        Value::String(s) => {
            if !has_content_type {
                res.header("Content-Type: text/plain; charset=utf-8");
            }
            res.body_vec(s.into_bytes());
        }
        other => {
            if !has_content_type {
                res.header("Content-Type: application/json");
            }
            match serde_json::to_vec(&other) {
                Ok(bytes) => res.body_vec(bytes),
                Err(e) => {
                    error!(error = %e, "Failed to serialize response body");
                    res.status_code(500, status_reason(500));
                    res.body_vec(Vec::new());
                }
            }
        }
    }
}

/// Write a JSON error body with the given status.
pub fn write_json_error(res: &mut Response, status: u16, body: Value) {
    res.status_code(status as usize, status_reason(status));
    res.header("Content-Type: application/json");
    res.body_vec(body.to_string().into_bytes());
}

/// Write raw bytes with an explicit content type (static files, metrics).
pub fn write_bytes(res: &mut Response, status: u16, content_type: &str, bytes: Vec<u8>) {
    res.status_code(status as usize, status_reason(status));
    res.header(static_header_line("Content-Type", content_type));
    res.body_vec(bytes);
}

/// Answer with extra headers and no body (CORS preflight).
pub fn write_empty(res: &mut Response, status: u16, headers: &[(&'static str, String)]) {
    res.status_code(status as usize, status_reason(status));
    for (name, value) in headers {
        res.header(static_header_line(name, value));
    }
    res.body_vec(Vec::new());
}
