use std::{
    collections::BTreeMap,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use chrono::Utc;

use super::todo::{Todo, TodoId};

const FIRST_ID: u64 = 1;

struct StoreInner {
    todos: BTreeMap<TodoId, Todo>,
    next_id: u64,
}

impl StoreInner {
    fn new() -> Self {
        Self {
            todos: BTreeMap::new(),
            next_id: FIRST_ID,
        }
    }

    fn insert(&mut self, mut todo: Todo) -> Todo {
        let id = TodoId(self.next_id);
        self.next_id += 1;
        todo.id = id;
        self.todos.insert(id, todo.clone());
        tracing::debug!(todo_id = %id, "todo inserted");
        todo
    }
}

/// In-memory todo collection. Clones share the same records.
///
/// Every operation takes the single collection lock for its whole duration, so
/// bulk operations are atomic with respect to each other and readers never see a
/// half-applied mutation. Ids grow monotonically, which keeps the map in
/// insertion order.
#[derive(Clone)]
pub struct TodoStore {
    inner: Arc<Mutex<StoreInner>>,
}

impl Default for TodoStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TodoStore {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(StoreInner::new())),
        }
    }

    fn lock(&self) -> MutexGuard<'_, StoreInner> {
        // No operation leaves the map half-written, so a poisoned lock is still usable.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn find_all(&self) -> Vec<Todo> {
        self.lock().todos.values().cloned().collect()
    }

    pub fn find_by_id(&self, id: TodoId) -> Option<Todo> {
        self.lock().todos.get(&id).cloned()
    }

    /// Inserts a todo with an unassigned id, or replaces the stored record with the
    /// same id.
    ///
    /// Inserting always yields `Some`. Replacing keeps the stored `created_at` and
    /// only moves `updated_at` when the title or completion flag changed. Returns
    /// `None` when the id is assigned but no record carries it; deleted records are
    /// never brought back.
    pub fn save(&self, mut todo: Todo) -> Option<Todo> {
        let mut inner = self.lock();

        if !todo.id.is_assigned() {
            return Some(inner.insert(todo));
        }

        let stored = inner.todos.get_mut(&todo.id)?;
        todo.created_at = stored.created_at;
        todo.updated_at = if stored.same_content(&todo) {
            stored.updated_at
        } else {
            Utc::now()
        };
        *stored = todo.clone();
        tracing::debug!(todo_id = %todo.id, "todo replaced");
        Some(todo)
    }

    /// Stores `todo` under a freshly assigned id, whatever id it carried.
    pub fn insert(&self, todo: Todo) -> Todo {
        self.lock().insert(todo)
    }

    /// Applies `apply` to the stored record while holding the lock.
    ///
    /// The id and `created_at` cannot be changed through the closure. `updated_at`
    /// is refreshed only when the content changed.
    pub fn update<F>(&self, id: TodoId, apply: F) -> Option<Todo>
    where
        F: FnOnce(&mut Todo),
    {
        let mut inner = self.lock();
        let stored = inner.todos.get_mut(&id)?;
        let before = stored.clone();

        apply(&mut *stored);
        stored.id = before.id;
        stored.created_at = before.created_at;
        if stored.same_content(&before) {
            stored.updated_at = before.updated_at;
        } else {
            stored.updated_at = Utc::now();
        }

        Some(stored.clone())
    }

    pub fn delete_by_id(&self, id: TodoId) -> bool {
        let removed = self.lock().todos.remove(&id).is_some();
        if removed {
            tracing::debug!(todo_id = %id, "todo deleted");
        }
        removed
    }

    pub fn delete_completed(&self) -> usize {
        let mut inner = self.lock();
        let before = inner.todos.len();
        inner.todos.retain(|_, todo| !todo.completed);
        before - inner.todos.len()
    }

    /// Sets every record's completion flag. Returns how many records actually changed.
    pub fn toggle_all(&self, completed: bool) -> usize {
        let mut inner = self.lock();
        let now = Utc::now();
        let mut changed = 0;
        for todo in inner.todos.values_mut() {
            if todo.completed != completed {
                todo.completed = completed;
                todo.updated_at = now;
                changed += 1;
            }
        }
        changed
    }

    pub fn count(&self) -> usize {
        self.lock().todos.len()
    }

    pub fn count_where<P>(&self, predicate: P) -> usize
    where
        P: Fn(&Todo) -> bool,
    {
        self.lock().todos.values().filter(|todo| predicate(*todo)).count()
    }

    pub fn count_active(&self) -> usize {
        self.count_where(Todo::is_active)
    }

    #[cfg(test)]
    pub(crate) fn backdate(&self, id: TodoId, at: chrono::DateTime<Utc>) -> Option<Todo> {
        let mut inner = self.lock();
        let stored = inner.todos.get_mut(&id)?;
        stored.updated_at = at;
        Some(stored.clone())
    }

    /// Drops every record and restarts ids at 1. Test isolation only.
    pub fn clear(&self) {
        let mut inner = self.lock();
        inner.todos.clear();
        inner.next_id = FIRST_ID;
    }
}
