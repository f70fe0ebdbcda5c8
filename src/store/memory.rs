use super::{seed, system_clock, Clock, TodoStore};
use crate::error::{TodoError, TodoResult};
use crate::ids::TodoId;
use crate::model::{NewTodo, TodoItem, TodoUpdate};
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{debug, info};

/// Collection and id counter, always locked together.
struct Inner {
    // ids are handed out in increasing order, so key order is insertion order
    items: BTreeMap<TodoId, TodoItem>,
    next_id: TodoId,
}

/// In-memory [`TodoStore`] guarded by a single mutex.
pub struct InMemoryTodoStore {
    inner: Mutex<Inner>,
    clock: Clock,
}

impl Default for InMemoryTodoStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryTodoStore {
    /// Create an empty store whose first id is 1.
    pub fn new() -> Self {
        Self::with_clock(system_clock())
    }

    /// Create an empty store reading time from `clock`.
    pub fn with_clock(clock: Clock) -> Self {
        Self {
            inner: Mutex::new(Inner {
                items: BTreeMap::new(),
                next_id: TodoId::FIRST,
            }),
            clock,
        }
    }

    /// Create a store pre-seeded with the six sample items (ids 1–6).
    pub fn with_samples() -> Self {
        let store = Self::new();
        store.seed_samples();
        store
    }

    /// Append the sample items, consuming the next six ids.
    pub fn seed_samples(&self) {
        let now = (self.clock)();
        let mut inner = self.lock();
        let mut seeded = 0usize;
        for mut item in seed::sample_items(now) {
            item.id = inner.next_id;
            inner.next_id = inner.next_id.next();
            inner.items.insert(item.id, item);
            seeded += 1;
        }
        info!(seeded, next_id = %inner.next_id, "Sample todos seeded");
    }

    /// Number of stored items.
    pub fn len(&self) -> usize {
        self.lock().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // A panic inside a handler cannot leave a half-applied mutation behind,
    // so a poisoned lock still guards consistent data.
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl TodoStore for InMemoryTodoStore {
    fn list_all(&self) -> Vec<TodoItem> {
        self.lock().items.values().cloned().collect()
    }

    fn list_by_status(&self, completed: bool) -> Vec<TodoItem> {
        self.lock()
            .items
            .values()
            .filter(|t| t.is_completed == completed)
            .cloned()
            .collect()
    }

    fn get(&self, id: TodoId) -> Option<TodoItem> {
        self.lock().items.get(&id).cloned()
    }

    fn create(&self, new: NewTodo) -> TodoResult<TodoItem> {
        new.validate()?;
        let now = (self.clock)();
        let mut inner = self.lock();
        let id = inner.next_id;
        inner.next_id = id.next();
        let item = TodoItem {
            id,
            title: new.title,
            description: new.description,
            is_completed: false,
            created_at: now,
            completed_at: None,
            priority: new.priority,
        };
        inner.items.insert(id, item.clone());
        debug!(id = %id, total = inner.items.len(), "Todo created");
        Ok(item)
    }

    fn update(&self, id: TodoId, update: TodoUpdate) -> TodoResult<TodoItem> {
        let now = (self.clock)();
        let mut inner = self.lock();
        let item = inner.items.get_mut(&id).ok_or(TodoError::NotFound(id))?;
        item.apply(update, now);
        debug!(id = %id, is_completed = item.is_completed, "Todo updated");
        Ok(item.clone())
    }

    fn delete(&self, id: TodoId) -> bool {
        let removed = self.lock().items.remove(&id).is_some();
        debug!(id = %id, removed, "Todo delete");
        removed
    }
}
