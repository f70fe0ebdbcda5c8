use http::Method;
use regex::Regex;
use smallvec::SmallVec;
use std::sync::Arc;
use tracing::{debug, info};

/// Maximum number of path/query parameters before heap allocation.
pub const MAX_INLINE_PARAMS: usize = 8;

/// Parameter storage for the request path: names are shared with the route
/// table, values come from the URL.
pub type ParamVec = SmallVec<[(Arc<str>, String); MAX_INLINE_PARAMS]>;

/// A single entry of the routing table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMeta {
    pub method: Method,
    /// Path with `{name}` placeholders, e.g. `/todos/{id}/complete`.
    pub path_pattern: String,
    pub handler_name: String,
}

impl RouteMeta {
    pub fn new(method: Method, path_pattern: &str, handler_name: &str) -> Self {
        Self {
            method,
            path_pattern: path_pattern.to_string(),
            handler_name: handler_name.to_string(),
        }
    }
}

/// Result of successfully matching a request path to a route
#[derive(Debug, Clone)]
pub struct RouteMatch {
    pub route: Arc<RouteMeta>,
    /// Path parameters extracted from the URL (e.g., `{id}` → `("id", "123")`)
    pub path_params: ParamVec,
    pub handler_name: String,
    /// Query string parameters (populated by the server)
    pub query_params: ParamVec,
}

impl RouteMatch {
    /// Get a path parameter by name (last occurrence wins).
    #[inline]
    #[must_use]
    pub fn get_path_param(&self, name: &str) -> Option<&str> {
        self.path_params
            .iter()
            .rfind(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }

    /// Get a query parameter by name (last occurrence wins, as in `?a=1&a=2`).
    #[inline]
    #[must_use]
    pub fn get_query_param(&self, name: &str) -> Option<&str> {
        self.query_params
            .iter()
            .rfind(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }
}

struct CompiledRoute {
    regex: Regex,
    meta: Arc<RouteMeta>,
    param_names: Vec<Arc<str>>,
}

/// Router to match HTTP requests to handlers
#[derive(Clone)]
pub struct Router {
    routes: Arc<Vec<CompiledRoute>>,
}

impl Router {
    /// Compile the routing table.
    ///
    /// # Errors
    ///
    /// Returns an error if a path pattern does not compile to a valid regex.
    pub fn new(routes: Vec<RouteMeta>) -> Result<Self, regex::Error> {
        // longest pattern first, so literal suffixes win over shorter captures
        let mut routes = routes;
        routes.sort_by_key(|r| std::cmp::Reverse(r.path_pattern.len()));

        let compiled = routes
            .into_iter()
            .map(|route| {
                let (regex, param_names) = Self::path_to_regex(&route.path_pattern)?;
                Ok(CompiledRoute {
                    regex,
                    meta: Arc::new(route),
                    param_names,
                })
            })
            .collect::<Result<Vec<_>, regex::Error>>()?;

        info!(routes_count = compiled.len(), "Routing table loaded");
        Ok(Self {
            routes: Arc::new(compiled),
        })
    }

    /// Find the route for `method` and `path` (path without query string).
    #[must_use]
    pub fn route(&self, method: Method, path: &str) -> Option<RouteMatch> {
        for compiled in self.routes.iter() {
            if compiled.meta.method != method {
                continue;
            }
            if let Some(captures) = compiled.regex.captures(path) {
                let mut params = ParamVec::new();
                for (i, name) in compiled.param_names.iter().enumerate() {
                    if let Some(val) = captures.get(i + 1) {
                        params.push((Arc::clone(name), val.as_str().to_string()));
                    }
                }
                debug!(
                    method = %method,
                    path = %path,
                    handler_name = %compiled.meta.handler_name,
                    "Route matched"
                );
                return Some(RouteMatch {
                    route: Arc::clone(&compiled.meta),
                    path_params: params,
                    handler_name: compiled.meta.handler_name.clone(),
                    query_params: ParamVec::new(),
                });
            }
        }
        debug!(method = %method, path = %path, "No route matched");
        None
    }

    /// Route table in match order.
    pub fn routes(&self) -> impl Iterator<Item = &RouteMeta> {
        self.routes.iter().map(|c| c.meta.as_ref())
    }

    pub(crate) fn path_to_regex(path: &str) -> Result<(Regex, Vec<Arc<str>>), regex::Error> {
        if path == "/" {
            return Ok((Regex::new(r"^/$")?, Vec::new()));
        }

        let mut pattern = String::with_capacity(path.len() + 5);
        pattern.push('^');
        let mut param_names = Vec::with_capacity(path.matches('{').count());

        for segment in path.split('/') {
            if segment.starts_with('{') && segment.ends_with('}') {
                let param_name = segment.trim_start_matches('{').trim_end_matches('}');
                pattern.push_str("/([^/]+)");
                param_names.push(Arc::from(param_name));
            } else if !segment.is_empty() {
                pattern.push('/');
                pattern.push_str(&regex::escape(segment));
            }
        }

        pattern.push('$');
        Ok((Regex::new(&pattern)?, param_names))
    }
}
