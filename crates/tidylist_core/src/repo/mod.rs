//! Persistence gateway layer.
//!
//! # Responsibility
//! - Define the whole-document load/modify/save cycle over the key-value
//!   store.
//! - Isolate wire-format and storage details from the domain model.
//!
//! # Invariants
//! - Every persisted mutation passes through the gateway operations.
//! - Gateway reads rebuild entities through their validating constructors.

pub mod todo_repo;
