use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

use super::Middleware;
use crate::dispatcher::{HandlerRequest, HandlerResponse};

/// Middleware for collecting Prometheus-compatible metrics
///
/// All counters use atomic operations so they can be updated from any
/// handler coroutine without locking.
#[derive(Default)]
pub struct MetricsMiddleware {
    request_count: AtomicUsize,
    error_count: AtomicUsize,
    total_latency_ns: AtomicU64,
    stack_size: AtomicUsize,
    top_level_requests: AtomicUsize,
}

impl MetricsMiddleware {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of dispatched requests.
    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::Relaxed)
    }

    /// Dispatched requests answered with a 4xx or 5xx status.
    pub fn error_count(&self) -> usize {
        self.error_count.load(Ordering::Relaxed)
    }

    /// Mean processing time across all dispatched requests (zero before any).
    pub fn average_latency(&self) -> Duration {
        let count = self.request_count.load(Ordering::Relaxed) as u64;
        if count == 0 {
            Duration::from_nanos(0)
        } else {
            Duration::from_nanos(self.total_latency_ns.load(Ordering::Relaxed) / count)
        }
    }

    /// Stack size of the coroutine that handled the last request.
    pub fn stack_size(&self) -> usize {
        self.stack_size.load(Ordering::Relaxed)
    }

    /// Count a request that bypassed the dispatcher (`/health`, `/metrics`,
    /// static files, preflight).
    pub fn inc_top_level_request(&self) {
        self.top_level_requests.fetch_add(1, Ordering::Relaxed);
    }

    pub fn top_level_request_count(&self) -> usize {
        self.top_level_requests.load(Ordering::Relaxed)
    }

    /// Render all counters in Prometheus text exposition format.
    pub fn render(&self) -> String {
        format!(
            "# HELP todo_api_requests_total Total number of dispatched requests\n\
             # TYPE todo_api_requests_total counter\n\
             todo_api_requests_total {}\n\
             # HELP todo_api_request_errors_total Dispatched requests answered with 4xx/5xx\n\
             # TYPE todo_api_request_errors_total counter\n\
             todo_api_request_errors_total {}\n\
             # HELP todo_api_top_level_requests_total Requests served outside the dispatcher\n\
             # TYPE todo_api_top_level_requests_total counter\n\
             todo_api_top_level_requests_total {}\n\
             # HELP todo_api_request_latency_seconds Average request latency in seconds\n\
             # TYPE todo_api_request_latency_seconds gauge\n\
             todo_api_request_latency_seconds {}\n\
             # HELP todo_api_coroutine_stack_bytes Handler coroutine stack size\n\
             # TYPE todo_api_coroutine_stack_bytes gauge\n\
             todo_api_coroutine_stack_bytes {}\n",
            self.request_count(),
            self.error_count(),
            self.top_level_request_count(),
            self.average_latency().as_secs_f64(),
            self.stack_size(),
        )
    }
}

impl Middleware for MetricsMiddleware {
    fn before(&self, _req: &HandlerRequest) -> Option<HandlerResponse> {
        self.request_count.fetch_add(1, Ordering::Relaxed);
        None
    }

    fn after(&self, _req: &HandlerRequest, res: &mut HandlerResponse, latency: Duration) {
        self.total_latency_ns
            .fetch_add(latency.as_nanos() as u64, Ordering::Relaxed);
        if res.status >= 400 {
            self.error_count.fetch_add(1, Ordering::Relaxed);
        }
        let size = if may::coroutine::is_coroutine() {
            may::coroutine::current().stack_size()
        } else {
            may::config().get_stack_size()
        };
        self.stack_size.store(size, Ordering::Relaxed);
    }
}
