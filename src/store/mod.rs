pub mod todo;
pub mod todo_store;

pub use todo::{Todo, TodoId};
pub use todo_store::TodoStore;
