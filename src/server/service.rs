use super::request::{parse_request, ParsedRequest};
use super::response::{write_bytes, write_empty, write_handler_response, write_json_error};
use crate::dispatcher::{Dispatcher, HeaderVec};
use crate::ids::RequestId;
use crate::middleware::{CorsMiddleware, MetricsMiddleware};
use crate::router::{ParamVec, Router};
use crate::static_files::StaticFiles;
use http::Method;
use may_minihttp::{HttpService, Request, Response};
use serde_json::json;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

/// The `may_minihttp` service: operational endpoints, CORS preflight, routed
/// API requests and the static UI.
///
/// Cloned once per connection, so everything shared sits behind an `Arc`.
#[derive(Clone)]
pub struct AppService {
    pub router: Router,
    pub dispatcher: Arc<Dispatcher>,
    pub metrics: Option<Arc<MetricsMiddleware>>,
    pub cors: Option<Arc<CorsMiddleware>>,
    pub static_files: Option<StaticFiles>,
}

impl AppService {
    pub fn new(router: Router, dispatcher: Arc<Dispatcher>, static_dir: Option<PathBuf>) -> Self {
        Self {
            router,
            dispatcher,
            metrics: None,
            cors: None,
            static_files: static_dir.map(StaticFiles::new),
        }
    }

    /// Expose `/metrics` backed by these counters.
    pub fn set_metrics_middleware(&mut self, metrics: Arc<MetricsMiddleware>) {
        self.metrics = Some(metrics);
    }

    /// Answer `OPTIONS` preflight requests with this policy.
    pub fn set_cors(&mut self, cors: Arc<CorsMiddleware>) {
        self.cors = Some(cors);
    }

    fn count_top_level(&self) {
        if let Some(metrics) = &self.metrics {
            metrics.inc_top_level_request();
        }
    }

    fn not_found(res: &mut Response, method: &str, path: &str) {
        write_json_error(
            res,
            404,
            json!({"error": "Not Found", "method": method, "path": path}),
        );
    }
}

/// Basic health check endpoint returning `{ "status": "ok" }`.
pub fn health_endpoint(res: &mut Response) -> io::Result<()> {
    write_bytes(
        res,
        200,
        "application/json",
        json!({ "status": "ok" }).to_string().into_bytes(),
    );
    Ok(())
}

/// Metrics endpoint returning Prometheus text format statistics.
pub fn metrics_endpoint(res: &mut Response, metrics: &MetricsMiddleware) -> io::Result<()> {
    write_bytes(
        res,
        200,
        "text/plain; version=0.0.4",
        metrics.render().into_bytes(),
    );
    Ok(())
}

impl HttpService for AppService {
    fn call(&mut self, req: Request, res: &mut Response) -> io::Result<()> {
        let ParsedRequest {
            method,
            path,
            headers,
            query_params,
            body,
        } = parse_request(req);

        if method == "OPTIONS" {
            self.count_top_level();
            let origin = headers.get("origin").map(String::as_str);
            let cors_headers = self
                .cors
                .as_ref()
                .map(|cors| cors.preflight_headers(origin))
                .unwrap_or_default();
            write_empty(res, 204, &cors_headers);
            return Ok(());
        }
        if method == "GET" && path == "/health" {
            self.count_top_level();
            return health_endpoint(res);
        }
        if method == "GET" && path == "/metrics" {
            if let Some(metrics) = &self.metrics {
                metrics.inc_top_level_request();
                return metrics_endpoint(res, metrics);
            }
            Self::not_found(res, &method, &path);
            return Ok(());
        }

        let route_opt = method
            .parse::<Method>()
            .ok()
            .and_then(|m| self.router.route(m, &path));

        let Some(mut route_match) = route_opt else {
            if method == "GET" {
                if let Some(sf) = &self.static_files {
                    if let Ok((bytes, ct)) = sf.load(&path) {
                        self.count_top_level();
                        write_bytes(res, 200, ct, bytes);
                        return Ok(());
                    }
                }
            }
            Self::not_found(res, &method, &path);
            return Ok(());
        };

        route_match.query_params = query_params
            .into_iter()
            .map(|(k, v)| (Arc::<str>::from(k), v))
            .collect::<ParamVec>();

        let request_id =
            RequestId::from_header_or_new(headers.get("x-request-id").map(String::as_str));
        let header_vec: HeaderVec = headers
            .into_iter()
            .map(|(k, v)| (Arc::<str>::from(k), v))
            .collect();

        debug!(
            request_id = %request_id,
            handler_name = %route_match.handler_name,
            "Dispatching request"
        );

        match self
            .dispatcher
            .dispatch(route_match, path.clone(), body, header_vec, request_id)
        {
            Some(hr) => write_handler_response(res, hr),
            None => write_json_error(
                res,
                500,
                json!({
                    "error": "Handler failed or not registered",
                    "method": method,
                    "path": path
                }),
            ),
        }
        Ok(())
    }
}
