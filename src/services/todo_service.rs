use thiserror::Error;

use crate::store::{Todo, TodoId, TodoStore};

pub const MAX_TITLE_CHARS: usize = 500;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TodoError {
    #[error("{0}")]
    InvalidArgument(String),
    #[error("Todo not found (id={0})")]
    NotFound(TodoId),
}

pub type TodoResult<T> = Result<T, TodoError>;

/// Result of an update: either the new state or removal through an empty title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    Updated(Todo),
    Deleted,
}

#[derive(Clone)]
pub struct TodoService {
    store: TodoStore,
}

impl TodoService {
    pub fn new(store: TodoStore) -> Self {
        Self { store }
    }

    pub fn create_todo(&self, title: &str) -> TodoResult<Todo> {
        let title = normalize_title(title)
            .ok_or_else(|| TodoError::InvalidArgument("Title must not be empty".to_string()))?;
        check_length(title)?;
        let todo = self.store.insert(Todo::new(title));
        tracing::info!(todo_id = %todo.id, "todo created");
        Ok(todo)
    }

    pub fn get_todo_by_id(&self, id: TodoId) -> TodoResult<Todo> {
        self.store.find_by_id(id).ok_or(TodoError::NotFound(id))
    }

    pub fn get_all_todos(&self) -> Vec<Todo> {
        self.store.find_all()
    }

    /// Applies a partial update.
    ///
    /// A title that is empty after trimming removes the todo and wins over any
    /// `completed` change sent alongside it. With neither field present the stored
    /// record is returned untouched.
    pub fn update_todo(
        &self,
        id: TodoId,
        title: Option<&str>,
        completed: Option<bool>,
    ) -> TodoResult<UpdateOutcome> {
        let title = match title {
            Some(raw) => match normalize_title(raw) {
                Some(trimmed) => Some(trimmed.to_string()),
                None => {
                    if !self.store.delete_by_id(id) {
                        return Err(TodoError::NotFound(id));
                    }
                    tracing::info!(todo_id = %id, "todo deleted by empty title");
                    return Ok(UpdateOutcome::Deleted);
                }
            },
            None => None,
        };

        if let Some(title) = title.as_deref() {
            if let Err(err) = check_length(title) {
                self.get_todo_by_id(id)?;
                return Err(err);
            }
        }

        let todo = self
            .store
            .update(id, move |todo| {
                if let Some(title) = title {
                    todo.title = title;
                }
                if let Some(completed) = completed {
                    todo.completed = completed;
                }
            })
            .ok_or(TodoError::NotFound(id))?;
        Ok(UpdateOutcome::Updated(todo))
    }

    pub fn toggle_todo(&self, id: TodoId) -> TodoResult<Todo> {
        self.store
            .update(id, |todo| todo.completed = !todo.completed)
            .ok_or(TodoError::NotFound(id))
    }

    pub fn toggle_all_todos(&self, completed: bool) -> Vec<Todo> {
        let changed = self.store.toggle_all(completed);
        tracing::debug!(completed, changed, "toggled all todos");
        self.store.find_all()
    }

    pub fn delete_todo(&self, id: TodoId) -> TodoResult<()> {
        if !self.store.delete_by_id(id) {
            return Err(TodoError::NotFound(id));
        }
        Ok(())
    }

    pub fn delete_completed_todos(&self) -> usize {
        let removed = self.store.delete_completed();
        tracing::debug!(removed, "cleared completed todos");
        removed
    }

    pub fn get_active_count(&self) -> usize {
        self.store.count_active()
    }

    pub fn get_total_count(&self) -> usize {
        self.store.count()
    }
}

fn normalize_title(title: &str) -> Option<&str> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed)
}

fn check_length(title: &str) -> TodoResult<()> {
    if title.chars().count() > MAX_TITLE_CHARS {
        return Err(TodoError::InvalidArgument(format!(
            "Title must be at most {MAX_TITLE_CHARS} characters"
        )));
    }
    Ok(())
}
