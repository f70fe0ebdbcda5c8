use std::time::Duration;

use http::Method;

use super::Middleware;
use crate::dispatcher::{HandlerRequest, HandlerResponse};

/// CORS (Cross-Origin Resource Sharing) middleware
///
/// Adds CORS headers to dispatched responses. Preflight `OPTIONS` requests
/// never reach a route, so the server answers them directly with
/// [`CorsMiddleware::preflight_headers`].
pub struct CorsMiddleware {
    allowed_origins: Vec<String>,
    allowed_headers: Vec<String>,
    allowed_methods: Vec<Method>,
}

impl CorsMiddleware {
    pub fn new(
        allowed_origins: Vec<String>,
        allowed_headers: Vec<String>,
        allowed_methods: Vec<Method>,
    ) -> Self {
        Self {
            allowed_origins,
            allowed_headers,
            allowed_methods,
        }
    }

    /// Permissive policy with the given origins.
    pub fn with_origins(allowed_origins: Vec<String>) -> Self {
        Self {
            allowed_origins,
            ..Self::default()
        }
    }

    /// Value for `Access-Control-Allow-Origin`, if the origin is allowed.
    ///
    /// A `*` entry allows everything; otherwise the request's `Origin` is
    /// echoed back when it is listed.
    fn allow_origin(&self, origin: Option<&str>) -> Option<String> {
        if self.allowed_origins.iter().any(|o| o == "*") {
            return Some("*".to_string());
        }
        let origin = origin?;
        self.allowed_origins
            .iter()
            .find(|o| o.eq_ignore_ascii_case(origin))
            .cloned()
    }

    /// Headers to attach for a request carrying `origin`.
    pub fn preflight_headers(&self, origin: Option<&str>) -> Vec<(&'static str, String)> {
        let Some(allow_origin) = self.allow_origin(origin) else {
            return Vec::new();
        };
        let methods = self
            .allowed_methods
            .iter()
            .map(Method::as_str)
            .collect::<Vec<_>>()
            .join(", ");
        vec![
            ("Access-Control-Allow-Origin", allow_origin),
            ("Access-Control-Allow-Headers", self.allowed_headers.join(", ")),
            ("Access-Control-Allow-Methods", methods),
        ]
    }
}

/// Any origin, the headers a browser UI sends, and every method the API uses.
impl Default for CorsMiddleware {
    fn default() -> Self {
        Self {
            allowed_origins: vec!["*".into()],
            allowed_headers: vec!["Content-Type".into(), "Authorization".into()],
            allowed_methods: vec![
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ],
        }
    }
}

impl Middleware for CorsMiddleware {
    fn after(&self, req: &HandlerRequest, res: &mut HandlerResponse, _latency: Duration) {
        for (name, value) in self.preflight_headers(req.get_header("origin")) {
            res.set_header(name, value);
        }
    }
}
