//! # Handlers
//!
//! Route handlers for the to-do API. Each handler reads what it needs from
//! the [`HandlerRequest`](crate::dispatcher::HandlerRequest), calls the
//! store, and maps the outcome to a status code:
//!
//! - validation failures and malformed bodies: 400, plain-text message
//! - unknown ids: 404, empty body
//!
//! [`register_todo_handlers`] wires every handler into a
//! [`Dispatcher`] against one shared store.

mod todos;

pub use todos::{
    complete_todo, create_todo, delete_todo, get_todo, home, into_response, list_todos,
    parse_completed, uncomplete_todo, update_todo, TodoHandler, TODO_HANDLERS,
};

use crate::dispatcher::{Dispatcher, HandlerRequest};
use crate::store::TodoStore;
use std::sync::Arc;
use tracing::warn;

/// Register every to-do handler with `dispatcher`, all sharing `store`.
///
/// # Safety
///
/// Spawns one coroutine per handler through
/// [`Dispatcher::register_handler`]; the same requirements apply.
pub unsafe fn register_todo_handlers(dispatcher: &mut Dispatcher, store: Arc<dyn TodoStore>) {
    for (name, handler) in TODO_HANDLERS {
        let store = Arc::clone(&store);
        // SAFETY: forwarded from the caller's contract.
        unsafe {
            dispatcher.register_handler(name, move |req: HandlerRequest| {
                let response = into_response(handler(store.as_ref(), &req));
                if req.reply_tx.send(response).is_err() {
                    warn!(
                        request_id = %req.request_id,
                        handler_name = %req.handler_name,
                        "Client went away before the reply was sent"
                    );
                }
            });
        }
    }
}
