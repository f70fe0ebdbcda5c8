use super::RouteMeta;
use http::Method;

/// The routing table of the to-do service.
///
/// Handler names here are the names the handlers are registered under in the
/// dispatcher (see `handlers::register_todo_handlers`).
pub fn todo_routes() -> Vec<RouteMeta> {
    vec![
        RouteMeta::new(Method::GET, "/", "home"),
        RouteMeta::new(Method::GET, "/todos", "list_todos"),
        RouteMeta::new(Method::POST, "/todos", "create_todo"),
        RouteMeta::new(Method::GET, "/todos/{id}", "get_todo"),
        RouteMeta::new(Method::PUT, "/todos/{id}", "update_todo"),
        RouteMeta::new(Method::DELETE, "/todos/{id}", "delete_todo"),
        RouteMeta::new(Method::POST, "/todos/{id}/complete", "complete_todo"),
        RouteMeta::new(Method::POST, "/todos/{id}/uncomplete", "uncomplete_todo"),
    ]
}
