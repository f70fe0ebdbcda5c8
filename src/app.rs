//! Assembly of the running service from an [`AppConfig`] and a store.

use crate::config::AppConfig;
use crate::dispatcher::Dispatcher;
use crate::handlers::register_todo_handlers;
use crate::middleware::{CorsMiddleware, MetricsMiddleware, TracingMiddleware};
use crate::router::{todo_routes, Router};
use crate::server::AppService;
use crate::store::{InMemoryTodoStore, TodoStore};
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;

/// The store a fresh process starts with: seeded unless configured otherwise.
pub fn default_store(config: &AppConfig) -> Arc<dyn TodoStore> {
    if config.store.seed_samples {
        Arc::new(InMemoryTodoStore::with_samples())
    } else {
        Arc::new(InMemoryTodoStore::new())
    }
}

/// Build the HTTP service: routing table, handler coroutines over `store`,
/// and the middleware chain selected by `config`.
///
/// # Errors
///
/// Fails if the routing table does not compile.
pub fn build_service(config: &AppConfig, store: Arc<dyn TodoStore>) -> Result<AppService> {
    let router = Router::new(todo_routes()).context("Failed to compile routing table")?;

    let mut dispatcher = Dispatcher::new();
    let metrics = config
        .metrics
        .enabled
        .then(|| Arc::new(MetricsMiddleware::new()));
    if let Some(metrics) = &metrics {
        dispatcher.add_middleware(Arc::clone(metrics) as _);
    }
    dispatcher.add_middleware(Arc::new(TracingMiddleware));
    let cors = config
        .cors
        .enabled
        .then(|| Arc::new(CorsMiddleware::with_origins(config.cors.allowed_origins.clone())));
    if let Some(cors) = &cors {
        dispatcher.add_middleware(Arc::clone(cors) as _);
    }

    // SAFETY: handlers only touch the shared store and reply on their channel.
    unsafe {
        register_todo_handlers(&mut dispatcher, store);
    }

    let mut service = AppService::new(
        router,
        Arc::new(dispatcher),
        config.server.static_dir.clone(),
    );
    if let Some(metrics) = metrics {
        service.set_metrics_middleware(metrics);
    }
    if let Some(cors) = cors {
        service.set_cors(cors);
    }
    info!(
        metrics = config.metrics.enabled,
        cors = config.cors.enabled,
        static_dir = ?config.server.static_dir,
        "Service assembled"
    );
    Ok(service)
}
