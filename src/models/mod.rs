pub mod todo;
pub mod user;

pub use todo::{SortKey, SortOrder, Todo, TodoInput, TodoPatch, TodoPriority, TodoQuery};
pub use user::{PublicUser, User};
