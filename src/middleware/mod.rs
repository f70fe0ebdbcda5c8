mod core;
mod cors;
mod metrics;
mod tracing;

pub use self::core::Middleware;
pub use self::cors::CorsMiddleware;
pub use self::metrics::MetricsMiddleware;
pub use self::tracing::TracingMiddleware;
