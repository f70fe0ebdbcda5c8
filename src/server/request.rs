use may_minihttp::Request;
use std::collections::HashMap;
use std::io::Read;
use tracing::{debug, warn};

/// Parsed HTTP request data used by `AppService`.
#[derive(Debug, PartialEq)]
pub struct ParsedRequest {
    /// HTTP method (GET, POST, etc.)
    pub method: String,
    /// Request path without the query string
    pub path: String,
    /// HTTP headers (lowercase keys)
    pub headers: HashMap<String, String>,
    /// Parsed query string parameters, in order of appearance
    pub query_params: Vec<(String, String)>,
    /// Raw body text, `None` when empty
    pub body: Option<String>,
}

/// Parse query string parameters from a URL path
///
/// Extracts everything after the `?` character and URL-decodes parameter
/// names and values. Repeated names are kept in order.
pub fn parse_query_params(path: &str) -> Vec<(String, String)> {
    match path.split_once('?') {
        Some((_, query)) => url::form_urlencoded::parse(query.as_bytes())
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect(),
        None => Vec::new(),
    }
}

/// Parse an incoming HTTP request into a ParsedRequest
pub fn parse_request(req: Request) -> ParsedRequest {
    let method = req.method().to_string();
    let raw_path = req.path().to_string();
    let path = raw_path.split('?').next().unwrap_or("/").to_string();

    let headers: HashMap<String, String> = req
        .headers()
        .iter()
        .map(|h| {
            (
                h.name.to_ascii_lowercase(),
                String::from_utf8_lossy(h.value).to_string(),
            )
        })
        .collect();

    let query_params = parse_query_params(&raw_path);

    let body = {
        let mut body_str = String::new();
        match req.body().read_to_string(&mut body_str) {
            Ok(0) => None,
            Ok(size) => {
                debug!(
                    body_size_bytes = size,
                    content_type = %headers.get("content-type").map(String::as_str).unwrap_or(""),
                    "Request body read"
                );
                Some(body_str)
            }
            Err(e) => {
                warn!(error = %e, "Request body unreadable; treating as empty");
                None
            }
        }
    };

    debug!(
        method = %method,
        path = %path,
        headers_count = headers.len(),
        query_count = query_params.len(),
        "HTTP request parsed"
    );

    ParsedRequest {
        method,
        path,
        headers,
        query_params,
        body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_query_params() {
        let q = parse_query_params("/todos?completed=true&x=a%20b");
        assert_eq!(
            q,
            vec![
                ("completed".to_string(), "true".to_string()),
                ("x".to_string(), "a b".to_string())
            ]
        );
    }

    #[test]
    fn test_parse_query_params_without_query() {
        assert!(parse_query_params("/todos").is_empty());
        assert!(parse_query_params("/todos?").is_empty());
    }
}
