//! # Server Module
//!
//! HTTP front end on top of `may_minihttp`. [`AppService`] turns each raw
//! request into a [`ParsedRequest`], answers the operational endpoints
//! (`/health`, `/metrics`, CORS preflight) itself, and hands API routes to
//! the dispatcher. [`HttpServer`] binds the service and returns a
//! [`ServerHandle`].

pub mod http_server;
pub mod request;
pub mod response;
pub mod service;

pub use http_server::{HttpServer, ServerHandle};
pub use request::{parse_query_params, parse_request, ParsedRequest};
pub use service::{health_endpoint, metrics_endpoint, AppService};
