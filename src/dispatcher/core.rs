use crate::ids::RequestId;
use crate::middleware::Middleware;
use crate::router::{ParamVec, RouteMatch};
use http::Method;
use may::coroutine;
use may::sync::mpsc;
use serde::de::DeserializeOwned;
use serde_json::Value;
use smallvec::SmallVec;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

use crate::error::TodoError;

/// Stack-allocated header storage; names are lowercase for requests.
pub type HeaderVec = SmallVec<[(Arc<str>, String); 16]>;

/// Default coroutine stack size for handlers when `TODO_STACK_SIZE` is unset.
const DEFAULT_HANDLER_STACK: usize = crate::runtime_config::DEFAULT_STACK_SIZE;

/// Request data passed to a handler coroutine
#[derive(Debug, Clone)]
pub struct HandlerRequest {
    /// Unique request ID for tracing and correlation
    pub request_id: RequestId,
    pub method: Method,
    /// Concrete request path (without query string)
    pub path: String,
    pub handler_name: String,
    pub path_params: ParamVec,
    pub query_params: ParamVec,
    pub headers: HeaderVec,
    /// Raw request body, `None` when empty
    pub body: Option<String>,
    /// Channel for sending the response back to the dispatcher
    pub reply_tx: mpsc::Sender<HandlerResponse>,
}

impl HandlerRequest {
    #[inline]
    #[must_use]
    pub fn get_path_param(&self, name: &str) -> Option<&str> {
        self.path_params
            .iter()
            .rfind(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }

    #[inline]
    #[must_use]
    pub fn get_query_param(&self, name: &str) -> Option<&str> {
        self.query_params
            .iter()
            .rfind(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }

    /// Get a header by name (case-insensitive per RFC 7230)
    #[inline]
    #[must_use]
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Decode the JSON body into `T`.
    ///
    /// # Errors
    ///
    /// `TodoError::BadRequest` when the body is missing or does not match `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, TodoError> {
        let body = self
            .body
            .as_deref()
            .ok_or_else(|| TodoError::BadRequest("Request body required".to_string()))?;
        serde_json::from_str(body).map_err(|e| {
            debug!(request_id = %self.request_id, error = %e, "Body decode failed");
            TodoError::BadRequest(format!("Invalid request body: {e}"))
        })
    }
}

/// Response data sent back from a handler coroutine
///
/// The body decides the content type when none is set: JSON values are sent
/// as `application/json`, strings as `text/plain`, `Null` as an empty body.
#[derive(Debug, Clone, PartialEq)]
pub struct HandlerResponse {
    pub status: u16,
    pub headers: HeaderVec,
    pub body: Value,
}

impl HandlerResponse {
    #[must_use]
    pub fn new(status: u16, headers: HeaderVec, body: Value) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    #[must_use]
    pub fn json(status: u16, body: Value) -> Self {
        Self::new(status, HeaderVec::new(), body)
    }

    /// Response with no body (204, 302, bare 404).
    #[must_use]
    pub fn empty(status: u16) -> Self {
        Self::new(status, HeaderVec::new(), Value::Null)
    }

    /// Plain-text response.
    #[must_use]
    pub fn text(status: u16, message: impl Into<String>) -> Self {
        Self::new(status, HeaderVec::new(), Value::String(message.into()))
    }

    /// JSON error object `{"error": message}`.
    #[must_use]
    pub fn error(status: u16, message: &str) -> Self {
        Self::json(status, serde_json::json!({ "error": message }))
    }

    #[inline]
    #[must_use]
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Add or replace a header (case-insensitive match on the name).
    pub fn set_header(&mut self, name: &str, value: String) {
        self.headers.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
        self.headers.push((Arc::from(name), value));
    }

    #[must_use]
    pub fn with_header(mut self, name: &str, value: String) -> Self {
        self.set_header(name, value);
        self
    }
}

impl From<TodoError> for HandlerResponse {
    fn from(err: TodoError) -> Self {
        match err {
            TodoError::NotFound(_) => HandlerResponse::empty(404),
            TodoError::Validation(msg) | TodoError::BadRequest(msg) => {
                HandlerResponse::text(400, msg)
            }
        }
    }
}

/// Type alias for a channel sender that dispatches requests to a handler
pub type HandlerSender = mpsc::Sender<HandlerRequest>;

/// Dispatcher that routes requests to registered handler coroutines
#[derive(Clone, Default)]
pub struct Dispatcher {
    /// Map of handler names to their channel senders
    pub handlers: HashMap<String, HandlerSender>,
    /// Ordered list of middleware to apply to requests/responses
    pub middlewares: Vec<Arc<dyn Middleware>>,
}

impl Dispatcher {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add middleware to the processing pipeline (runs in insertion order).
    pub fn add_middleware(&mut self, mw: Arc<dyn Middleware>) {
        self.middlewares.push(mw);
    }

    /// Registers a handler function that will process requests routed to `name`.
    ///
    /// Spawns a coroutine that processes requests from a channel. Panics in
    /// `handler_fn` are caught and answered with a 500 response. Registering a
    /// name twice replaces the old handler; its coroutine exits once the old
    /// sender is dropped.
    ///
    /// # Safety
    ///
    /// Calls `may::coroutine::Builder::spawn()`, which is unsafe in the `may`
    /// runtime. The caller must ensure the runtime is configured before
    /// registering and that `handler_fn` replies exactly once per request.
    pub unsafe fn register_handler<F>(&mut self, name: &str, handler_fn: F)
    where
        F: Fn(HandlerRequest) + Send + 'static,
    {
        let (tx, rx) = mpsc::channel::<HandlerRequest>();
        let handler_name = name.to_string();
        let stack_size = handler_stack_size();

        // SAFETY: the closure owns everything it touches (`Send + 'static`) and
        // replies via channels instead of unwinding across the coroutine.
        let spawn_result = unsafe {
            coroutine::Builder::new()
                .name(handler_name.clone())
                .stack_size(stack_size)
                .spawn(move || {
                    for req in rx.iter() {
                        let reply_tx = req.reply_tx.clone();
                        let request_id = req.request_id;
                        let handler_name = req.handler_name.clone();
                        let started = Instant::now();

                        if let Err(panic) =
                            std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                                handler_fn(req);
                            }))
                        {
                            let panic_message = panic_message(panic.as_ref());
                            error!(
                                request_id = %request_id,
                                handler_name = %handler_name,
                                panic_message = %panic_message,
                                "Handler panicked"
                            );
                            if reply_tx
                                .send(HandlerResponse::error(
                                    500,
                                    &format!("Handler panicked: {panic_message}"),
                                ))
                                .is_err()
                            {
                                warn!(request_id = %request_id, "Dispatcher gone, 500 dropped");
                            }
                        } else {
                            debug!(
                                request_id = %request_id,
                                handler_name = %handler_name,
                                execution_time_us = started.elapsed().as_micros() as u64,
                                "Handler execution complete"
                            );
                        }
                    }
                })
        };

        if let Err(e) = spawn_result {
            error!(
                handler_name = %name,
                error = %e,
                stack_size,
                "Failed to spawn handler coroutine"
            );
            return;
        }

        if self.handlers.insert(name.to_string(), tx).is_some() {
            warn!(handler_name = %name, "Replaced existing handler");
        }
        info!(
            handler_name = %name,
            total_handlers = self.handlers.len(),
            "Handler registered"
        );
    }

    /// Dispatch a matched request to its handler and wait for the reply.
    ///
    /// Returns `None` when no handler is registered under the route's name or
    /// the handler coroutine is gone.
    pub fn dispatch(
        &self,
        route_match: RouteMatch,
        path: String,
        body: Option<String>,
        headers: HeaderVec,
        request_id: RequestId,
    ) -> Option<HandlerResponse> {
        let Some(tx) = self.handlers.get(&route_match.handler_name) else {
            error!(
                request_id = %request_id,
                handler_name = %route_match.handler_name,
                available_handlers = ?self.handlers.keys().collect::<Vec<_>>(),
                "Handler not found"
            );
            return None;
        };

        let (reply_tx, reply_rx) = mpsc::channel();
        let request = HandlerRequest {
            request_id,
            method: route_match.route.method.clone(),
            path,
            handler_name: route_match.handler_name,
            path_params: route_match.path_params,
            query_params: route_match.query_params,
            headers,
            body,
            reply_tx,
        };

        let mut early: Option<HandlerResponse> = None;
        for mw in &self.middlewares {
            if early.is_none() {
                early = mw.before(&request);
            } else {
                mw.before(&request);
            }
        }

        let start = Instant::now();
        let mut resp = match early {
            Some(r) => r,
            None => {
                if let Err(e) = tx.send(request.clone()) {
                    error!(
                        request_id = %request_id,
                        handler_name = %request.handler_name,
                        error = %e,
                        "Failed to send request to handler"
                    );
                    return None;
                }
                match reply_rx.recv() {
                    Ok(r) => r,
                    Err(e) => {
                        error!(
                            request_id = %request_id,
                            handler_name = %request.handler_name,
                            error = %e,
                            "Handler channel closed before replying"
                        );
                        return None;
                    }
                }
            }
        };
        let latency: Duration = start.elapsed();

        for mw in &self.middlewares {
            mw.after(&request, &mut resp, latency);
        }
        Some(resp)
    }
}

fn handler_stack_size() -> usize {
    std::env::var("TODO_STACK_SIZE")
        .ok()
        .and_then(|s| crate::runtime_config::parse_size(&s))
        .unwrap_or(DEFAULT_HANDLER_STACK)
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::TodoId;
    use serde_json::json;

    #[test]
    fn test_error_conversion() {
        let not_found: HandlerResponse = TodoError::NotFound(TodoId(1)).into();
        assert_eq!(not_found.status, 404);
        assert_eq!(not_found.body, Value::Null);

        let invalid: HandlerResponse = TodoError::Validation("Title is required.".into()).into();
        assert_eq!(invalid.status, 400);
        assert_eq!(invalid.body, json!("Title is required."));
    }

    #[test]
    fn test_set_header_replaces_case_insensitively() {
        let mut resp = HandlerResponse::empty(201);
        resp.set_header("Location", "/todos/1".into());
        resp.set_header("location", "/todos/2".into());
        assert_eq!(resp.headers.len(), 1);
        assert_eq!(resp.get_header("LOCATION"), Some("/todos/2"));
    }

    #[test]
    fn test_panic_message_extraction() {
        let boxed: Box<dyn std::any::Any + Send> = Box::new("boom");
        assert_eq!(panic_message(boxed.as_ref()), "boom");
        let owned: Box<dyn std::any::Any + Send> = Box::new(String::from("bang"));
        assert_eq!(panic_message(owned.as_ref()), "bang");
    }
}
