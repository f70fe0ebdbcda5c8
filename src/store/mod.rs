//! # Store Module
//!
//! The store is the authoritative holder of every to-do item. It assigns
//! identifiers, answers lookups and filters, and applies mutations.
//!
//! Handlers only see the [`TodoStore`] trait, so a persistent backend can be
//! substituted without touching the HTTP layer. The crate ships one
//! implementation, [`InMemoryTodoStore`].
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use todolist_api::model::NewTodo;
//! use todolist_api::store::{InMemoryTodoStore, TodoStore};
//!
//! let store: Arc<dyn TodoStore> = Arc::new(InMemoryTodoStore::new());
//! let todo = store.create(NewTodo::new("Water the plants")).unwrap();
//! assert_eq!(store.get(todo.id), Some(todo));
//! ```

mod memory;
mod seed;

pub use memory::InMemoryTodoStore;
pub use seed::sample_items;

use crate::error::TodoResult;
use crate::ids::TodoId;
use crate::model::{NewTodo, TodoItem, TodoUpdate};
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Source of the current time for `createdAt` / `completedAt` stamps.
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Wall clock used by default.
pub fn system_clock() -> Clock {
    Arc::new(Utc::now)
}

/// Operations over the to-do collection.
///
/// Implementations must be safe to share across handler coroutines; every
/// operation is atomic with respect to the others.
pub trait TodoStore: Send + Sync {
    /// All items in insertion order.
    fn list_all(&self) -> Vec<TodoItem>;

    /// Items whose completion flag equals `completed`, in insertion order.
    fn list_by_status(&self, completed: bool) -> Vec<TodoItem>;

    fn get(&self, id: TodoId) -> Option<TodoItem>;

    /// Store a new item under the next id.
    ///
    /// Returns `TodoError::Validation` for a blank title; nothing is stored
    /// and no id is consumed in that case.
    fn create(&self, new: NewTodo) -> TodoResult<TodoItem>;

    /// Apply the fields present in `update`. Returns `TodoError::NotFound`
    /// when no item has this id.
    fn update(&self, id: TodoId, update: TodoUpdate) -> TodoResult<TodoItem>;

    /// Remove the item, reporting whether anything was removed.
    fn delete(&self, id: TodoId) -> bool;

    /// Set or clear the completion flag (re-stamps `completedAt` when set).
    fn set_completed(&self, id: TodoId, completed: bool) -> TodoResult<TodoItem> {
        self.update(id, TodoUpdate::completion(completed))
    }
}
