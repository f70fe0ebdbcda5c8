//! # todolist_api
//!
//! An in-memory to-do list served over HTTP/JSON, built on the `may`
//! coroutine runtime and `may_minihttp`.
//!
//! ## Architecture
//!
//! - **[`model`]** - `TodoItem`, create and update bodies
//! - **[`store`]** - the [`TodoStore`](store::TodoStore) trait and its in-memory implementation
//! - **[`router`]** - regex-based routing table
//! - **[`dispatcher`]** - one coroutine per handler, fed over channels
//! - **[`handlers`]** - HTTP semantics of each route
//! - **[`middleware`]** - tracing, metrics and CORS hooks
//! - **[`server`]** - `may_minihttp` service, request parsing, response writing
//! - **[`static_files`]** - browser UI files
//! - **[`config`]**, **[`runtime_config`]**, **[`logging`]** - startup configuration
//! - **[`cli`]** - `serve` and `routes` commands
//!
//! ## Request flow
//!
//! ```text
//! TCP -> AppService::call -> Router::route -> Dispatcher::dispatch
//!     -> middleware.before -> handler coroutine -> middleware.after -> Response
//! ```
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use todolist_api::app::{build_service, default_store};
//! use todolist_api::config::AppConfig;
//! use todolist_api::server::HttpServer;
//!
//! let config = AppConfig::default();
//! let service = build_service(&config, default_store(&config)).unwrap();
//! let handle = HttpServer(service).start("127.0.0.1:8080").unwrap();
//! handle.join().unwrap();
//! ```

pub mod app;
pub mod cli;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod handlers;
pub mod ids;
pub mod logging;
pub mod middleware;
pub mod model;
pub mod router;
pub mod runtime_config;
pub mod server;
pub mod static_files;
pub mod store;

pub use error::{TodoError, TodoResult};
pub use ids::{RequestId, TodoId};
