use super::{todo_routes, RouteMeta, Router};
use http::Method;

fn router() -> Router {
    Router::new(todo_routes()).unwrap()
}

#[test]
fn test_todo_table_resolves_every_handler() {
    let router = router();
    let cases = [
        (Method::GET, "/", "home"),
        (Method::GET, "/todos", "list_todos"),
        (Method::POST, "/todos", "create_todo"),
        (Method::GET, "/todos/3", "get_todo"),
        (Method::PUT, "/todos/3", "update_todo"),
        (Method::DELETE, "/todos/3", "delete_todo"),
        (Method::POST, "/todos/3/complete", "complete_todo"),
        (Method::POST, "/todos/3/uncomplete", "uncomplete_todo"),
    ];
    for (method, path, expected) in cases {
        let matched = router
            .route(method.clone(), path)
            .unwrap_or_else(|| panic!("{method} {path} did not match"));
        assert_eq!(matched.handler_name, expected, "{method} {path}");
    }
}

#[test]
fn test_path_param_extracted() {
    let matched = router().route(Method::POST, "/todos/17/complete").unwrap();
    assert_eq!(matched.get_path_param("id"), Some("17"));
    assert_eq!(matched.get_path_param("missing"), None);
}

#[test]
fn test_method_and_path_mismatches() {
    let router = router();
    assert!(router.route(Method::PATCH, "/todos/1").is_none());
    assert!(router.route(Method::GET, "/todos/1/complete").is_none());
    assert!(router.route(Method::GET, "/todos/1/extra/segments").is_none());
    assert!(router.route(Method::GET, "/nope").is_none());
}

#[test]
fn test_literal_segments_are_escaped() {
    let router = Router::new(vec![RouteMeta::new(Method::GET, "/a.b", "dotted")]).unwrap();
    assert!(router.route(Method::GET, "/a.b").is_some());
    assert!(router.route(Method::GET, "/axb").is_none());
}

#[test]
fn test_root_only_matches_root() {
    let router = router();
    assert_eq!(router.route(Method::GET, "/").unwrap().handler_name, "home");
    assert!(router.route(Method::GET, "/index.html").is_none());
}

#[test]
fn test_routes_listed_longest_first() {
    let router = router();
    let first = router.routes().next().unwrap();
    assert_eq!(first.path_pattern, "/todos/{id}/uncomplete");
    assert_eq!(router.routes().count(), todo_routes().len());
}
