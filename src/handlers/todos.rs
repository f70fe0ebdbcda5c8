use crate::dispatcher::{HandlerRequest, HandlerResponse};
use crate::error::{TodoError, TodoResult};
use crate::ids::TodoId;
use crate::model::{NewTodo, TodoUpdate};
use crate::store::TodoStore;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

/// Signature shared by every route handler. Errors are turned into
/// responses by [`into_response`].
pub type TodoHandler = fn(&dyn TodoStore, &HandlerRequest) -> TodoResult<HandlerResponse>;

/// Handler name (as used in the routing table) to handler function.
pub const TODO_HANDLERS: [(&str, TodoHandler); 8] = [
    ("home", home),
    ("list_todos", list_todos),
    ("create_todo", create_todo),
    ("get_todo", get_todo),
    ("update_todo", update_todo),
    ("delete_todo", delete_todo),
    ("complete_todo", complete_todo),
    ("uncomplete_todo", uncomplete_todo),
];

/// Collapse a handler outcome into the response sent to the client.
pub fn into_response(result: TodoResult<HandlerResponse>) -> HandlerResponse {
    result.unwrap_or_else(HandlerResponse::from)
}

fn to_json<T: Serialize>(value: &T) -> Value {
    // only string keys and plain values, serialization cannot fail
    serde_json::to_value(value).unwrap_or(Value::Null)
}

/// `{id}` path segment. Anything that is not an unsigned integer names no
/// item, so it is reported the same way as an absent one.
fn path_id(req: &HandlerRequest) -> TodoResult<TodoId> {
    let raw = req.get_path_param("id").unwrap_or_default();
    raw.parse().map_err(|_| {
        debug!(request_id = %req.request_id, id = %raw, "Non-numeric todo id");
        TodoError::NotFound(TodoId(0))
    })
}

/// Parse the `completed` filter (`true` / `false`, any case).
pub fn parse_completed(value: &str) -> TodoResult<bool> {
    if value.eq_ignore_ascii_case("true") {
        Ok(true)
    } else if value.eq_ignore_ascii_case("false") {
        Ok(false)
    } else {
        Err(TodoError::BadRequest(format!(
            "Invalid value for 'completed': {value}"
        )))
    }
}

/// `GET /` redirects to the browser UI.
pub fn home(_store: &dyn TodoStore, _req: &HandlerRequest) -> TodoResult<HandlerResponse> {
    Ok(HandlerResponse::empty(302).with_header("Location", "/index.html".to_string()))
}

/// `GET /todos[?completed=true|false]`
pub fn list_todos(store: &dyn TodoStore, req: &HandlerRequest) -> TodoResult<HandlerResponse> {
    let items = match req.get_query_param("completed") {
        Some(value) => store.list_by_status(parse_completed(value)?),
        None => store.list_all(),
    };
    Ok(HandlerResponse::json(200, to_json(&items)))
}

/// `POST /todos` answers 201 with the stored item and its `Location`.
pub fn create_todo(store: &dyn TodoStore, req: &HandlerRequest) -> TodoResult<HandlerResponse> {
    let new: NewTodo = req.json()?;
    let item = store.create(new)?;
    info!(request_id = %req.request_id, id = %item.id, "Todo created");
    Ok(HandlerResponse::json(201, to_json(&item))
        .with_header("Location", format!("/todos/{}", item.id)))
}

/// `GET /todos/{id}`
pub fn get_todo(store: &dyn TodoStore, req: &HandlerRequest) -> TodoResult<HandlerResponse> {
    let id = path_id(req)?;
    let item = store.get(id).ok_or(TodoError::NotFound(id))?;
    Ok(HandlerResponse::json(200, to_json(&item)))
}

/// `PUT /todos/{id}` applies the fields present in the body.
pub fn update_todo(store: &dyn TodoStore, req: &HandlerRequest) -> TodoResult<HandlerResponse> {
    let id = path_id(req)?;
    let update: TodoUpdate = req.json()?;
    let item = store.update(id, update)?;
    Ok(HandlerResponse::json(200, to_json(&item)))
}

/// `DELETE /todos/{id}` answers 204, or 404 when nothing was removed.
pub fn delete_todo(store: &dyn TodoStore, req: &HandlerRequest) -> TodoResult<HandlerResponse> {
    let id = path_id(req)?;
    if !store.delete(id) {
        return Err(TodoError::NotFound(id));
    }
    info!(request_id = %req.request_id, id = %id, "Todo deleted");
    Ok(HandlerResponse::empty(204))
}

fn set_completed(
    store: &dyn TodoStore,
    req: &HandlerRequest,
    completed: bool,
) -> TodoResult<HandlerResponse> {
    let id = path_id(req)?;
    let item = store.set_completed(id, completed)?;
    Ok(HandlerResponse::json(200, to_json(&item)))
}

/// `POST /todos/{id}/complete`
pub fn complete_todo(store: &dyn TodoStore, req: &HandlerRequest) -> TodoResult<HandlerResponse> {
    set_completed(store, req, true)
}

/// `POST /todos/{id}/uncomplete`
pub fn uncomplete_todo(
    store: &dyn TodoStore,
    req: &HandlerRequest,
) -> TodoResult<HandlerResponse> {
    set_completed(store, req, false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatcher::HeaderVec;
    use crate::ids::RequestId;
    use crate::router::ParamVec;
    use crate::store::InMemoryTodoStore;
    use http::Method;
    use serde_json::json;
    use std::sync::Arc;

    fn request(path_id: Option<&str>, query: &[(&str, &str)], body: Option<&str>) -> HandlerRequest {
        let (reply_tx, _rx) = may::sync::mpsc::channel();
        let mut path_params = ParamVec::new();
        if let Some(id) = path_id {
            path_params.push((Arc::from("id"), id.to_string()));
        }
        HandlerRequest {
            request_id: RequestId::new(),
            method: Method::GET,
            path: "/todos".to_string(),
            handler_name: "test".to_string(),
            path_params,
            query_params: query
                .iter()
                .map(|(k, v)| (Arc::from(*k), (*v).to_string()))
                .collect(),
            headers: HeaderVec::new(),
            body: body.map(str::to_string),
            reply_tx,
        }
    }

    fn call(handler: TodoHandler, store: &InMemoryTodoStore, req: &HandlerRequest) -> HandlerResponse {
        into_response(handler(store, req))
    }

    #[test]
    fn test_home_redirects_to_index() {
        let store = InMemoryTodoStore::new();
        let res = call(home, &store, &request(None, &[], None));
        assert_eq!(res.status, 302);
        assert_eq!(res.get_header("Location"), Some("/index.html"));
        assert_eq!(res.body, Value::Null);
    }

    #[test]
    fn test_create_returns_201_with_location() {
        let store = InMemoryTodoStore::new();
        let body = r#"{"title":"Test Task","description":"Test Description","priority":2}"#;
        let res = call(create_todo, &store, &request(None, &[], Some(body)));
        assert_eq!(res.status, 201);
        assert_eq!(res.get_header("location"), Some("/todos/1"));
        assert_eq!(res.body["title"], json!("Test Task"));
        assert_eq!(res.body["description"], json!("Test Description"));
        assert_eq!(res.body["priority"], json!(2));
        assert_eq!(res.body["isCompleted"], json!(false));
        assert_eq!(res.body["completedAt"], Value::Null);
    }

    #[test]
    fn test_create_blank_title_is_400_text() {
        let store = InMemoryTodoStore::new();
        for body in [r#"{"title":"   "}"#, r#"{"priority":3}"#] {
            let res = call(create_todo, &store, &request(None, &[], Some(body)));
            assert_eq!(res.status, 400);
            assert_eq!(res.body, json!("Title is required."));
        }
        assert!(store.is_empty());
    }

    #[test]
    fn test_create_malformed_body_is_400() {
        let store = InMemoryTodoStore::new();
        assert_eq!(call(create_todo, &store, &request(None, &[], Some("{not json"))).status, 400);
        assert_eq!(call(create_todo, &store, &request(None, &[], None)).status, 400);
        assert!(store.is_empty());
    }

    #[test]
    fn test_list_filters_by_completed() {
        let store = InMemoryTodoStore::with_samples();
        let done = call(list_todos, &store, &request(None, &[("completed", "TRUE")], None));
        let ids: Vec<_> = done.body.as_array().unwrap().iter().map(|i| i["id"].clone()).collect();
        assert_eq!(ids, vec![json!(3), json!(5)]);

        let open = call(list_todos, &store, &request(None, &[("completed", "false")], None));
        assert_eq!(open.body.as_array().unwrap().len(), 4);

        let all = call(list_todos, &store, &request(None, &[], None));
        assert_eq!(all.body.as_array().unwrap().len(), 6);
    }

    #[test]
    fn test_list_rejects_bad_completed_value() {
        let store = InMemoryTodoStore::new();
        let res = call(list_todos, &store, &request(None, &[("completed", "maybe")], None));
        assert_eq!(res.status, 400);
        assert!(res.body.as_str().unwrap().contains("completed"));
    }

    #[test]
    fn test_missing_and_non_numeric_ids_are_404() {
        let store = InMemoryTodoStore::with_samples();
        for id in ["99", "abc", "-1"] {
            let req = request(Some(id), &[], Some(r#"{"priority":1}"#));
            assert_eq!(call(get_todo, &store, &req).status, 404);
            assert_eq!(call(update_todo, &store, &req).status, 404);
            assert_eq!(call(delete_todo, &store, &req).status, 404);
            assert_eq!(call(complete_todo, &store, &req).status, 404);
            assert_eq!(call(uncomplete_todo, &store, &req).status, 404);
            assert_eq!(call(get_todo, &store, &req).body, Value::Null);
        }
        assert_eq!(store.len(), 6);
    }

    #[test]
    fn test_update_priority_only() {
        let store = InMemoryTodoStore::with_samples();
        let before = call(get_todo, &store, &request(Some("1"), &[], None)).body;
        let res = call(update_todo, &store, &request(Some("1"), &[], Some(r#"{"priority":10}"#)));
        assert_eq!(res.status, 200);
        assert_eq!(res.body["priority"], json!(10));
        assert_eq!(res.body["title"], before["title"]);
        assert_eq!(res.body["description"], before["description"]);
        assert_eq!(res.body["isCompleted"], before["isCompleted"]);
    }

    #[test]
    fn test_complete_then_uncomplete() {
        let store = InMemoryTodoStore::with_samples();
        let done = call(complete_todo, &store, &request(Some("2"), &[], None));
        assert_eq!(done.body["isCompleted"], json!(true));
        assert!(done.body["completedAt"].is_string());

        let undone = call(uncomplete_todo, &store, &request(Some("2"), &[], None));
        assert_eq!(undone.body["isCompleted"], json!(false));
        assert_eq!(undone.body["completedAt"], Value::Null);
    }

    #[test]
    fn test_delete_then_get_is_404() {
        let store = InMemoryTodoStore::with_samples();
        let res = call(delete_todo, &store, &request(Some("4"), &[], None));
        assert_eq!(res.status, 204);
        assert_eq!(res.body, Value::Null);
        assert_eq!(call(get_todo, &store, &request(Some("4"), &[], None)).status, 404);
        assert_eq!(call(delete_todo, &store, &request(Some("4"), &[], None)).status, 404);
    }

    #[test]
    fn test_handler_table_covers_routes() {
        let names: Vec<_> = TODO_HANDLERS.iter().map(|(n, _)| *n).collect();
        for route in crate::router::todo_routes() {
            assert!(names.contains(&route.handler_name.as_str()), "{}", route.handler_name);
        }
    }
}
