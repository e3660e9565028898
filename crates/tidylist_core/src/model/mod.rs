//! Domain model for the task-management core.
//!
//! # Responsibility
//! - Define the Task/Project/TodoList aggregate and its validation rules.
//! - Keep derived due-date views pure and recomputed on demand.
//!
//! # Invariants
//! - Task names are unique within a project; project names within the list.
//! - The three default projects exist after TodoList initialization.
//! - Mutation happens only through entity methods, never raw field access.

pub mod project;
pub mod task;
pub mod todo_list;
