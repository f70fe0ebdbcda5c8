//! # Router Module
//!
//! Path matching and route resolution. Route patterns such as `/todos/{id}`
//! are compiled into anchored regexes at startup; each incoming request is
//! tested against the table until one matches, yielding the handler name and
//! the captured path parameters.
//!
//! ## Example
//!
//! ```rust
//! use http::Method;
//! use todolist_api::router::{todo_routes, Router};
//!
//! let router = Router::new(todo_routes()).unwrap();
//! let matched = router.route(Method::GET, "/todos/42").unwrap();
//! assert_eq!(matched.handler_name, "get_todo");
//! assert_eq!(matched.get_path_param("id"), Some("42"));
//! ```

mod core;
mod routes;
#[cfg(test)]
mod tests;

pub use self::core::{ParamVec, RouteMatch, RouteMeta, Router, MAX_INLINE_PARAMS};
pub use self::routes::todo_routes;
