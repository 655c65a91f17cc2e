pub mod todos;
pub mod users;

pub use todos::{TodoStats, TodoStore};
