//! Core domain logic for TidyList.
//! This crate is the single source of truth for business invariants.

pub mod logging;
pub mod model;
pub mod repo;
pub mod store;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::project::{Project, ProjectKind};
pub use model::task::{DueDate, Task, ValidationError, NO_DATE};
pub use model::todo_list::{TodoList, INBOX_NAME, TODAY_NAME, WEEK_NAME};
pub use repo::todo_repo::{RepoError, RepoResult, TodoListRepository, STORAGE_KEY};
pub use store::sqlite::SqliteStore;
pub use store::{KeyValueStore, StoreError, StoreResult};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
