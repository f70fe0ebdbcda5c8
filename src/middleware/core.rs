use std::time::Duration;

use crate::dispatcher::{HandlerRequest, HandlerResponse};

/// Hook pair run around every dispatched request.
///
/// `before` may short-circuit the handler by returning a response; `after`
/// sees every response, including short-circuited ones.
pub trait Middleware: Send + Sync {
    fn before(&self, _req: &HandlerRequest) -> Option<HandlerResponse> {
        None
    }
    fn after(&self, _req: &HandlerRequest, _res: &mut HandlerResponse, _latency: Duration) {}
}
