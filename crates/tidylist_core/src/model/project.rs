//! Project domain model.
//!
//! # Responsibility
//! - Own an ordered, display-name-unique collection of tasks.
//! - Compute the due-today and due-this-week task views on demand.
//!
//! # Invariants
//! - `name` is never empty or whitespace-only and is stored trimmed.
//! - Task display names are unique; duplicate inserts are dropped silently.
//! - Due-date views are recomputed per call and never cached.

use crate::model::task::{Task, ValidationError};
use chrono::{Duration, Local, NaiveDate};

/// Project category separating user projects from the built-in defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectKind {
    /// Created and named by the user.
    User,
    /// The general "Inbox" bucket.
    Inbox,
    /// The materialized "Today" view.
    Today,
    /// The materialized "This week" view.
    Week,
}

impl ProjectKind {
    /// Returns whether this is one of the built-in default projects.
    pub fn is_default(&self) -> bool {
        !matches!(self, Self::User)
    }

    /// Returns whether this project holds a materialized view snapshot.
    pub fn is_view(&self) -> bool {
        matches!(self, Self::Today | Self::Week)
    }
}

/// A named, ordered collection of tasks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Project {
    name: String,
    kind: ProjectKind,
    tasks: Vec<Task>,
}

impl Project {
    /// Creates an empty user project.
    ///
    /// # Errors
    /// - Returns `ValidationError::EmptyProjectName` when `name` trims to
    ///   empty.
    pub fn new(name: impl Into<String>) -> Result<Self, ValidationError> {
        Self::with_kind(name, ProjectKind::User)
    }

    /// Creates an empty project with an explicit kind tag.
    ///
    /// Used for the built-in defaults and when rebuilding from storage.
    ///
    /// # Errors
    /// - Returns `ValidationError::EmptyProjectName` when `name` trims to
    ///   empty.
    pub fn with_kind(
        name: impl Into<String>,
        kind: ProjectKind,
    ) -> Result<Self, ValidationError> {
        let normalized = normalize_project_name(name.into())?;
        Ok(Self {
            name: normalized,
            kind,
            tasks: Vec::new(),
        })
    }

    /// Returns the project name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the kind tag.
    pub fn kind(&self) -> ProjectKind {
        self.kind
    }

    /// Re-tags the project kind. Used when healing defaults loaded from
    /// storage written before kind tags existed.
    pub fn set_kind(&mut self, kind: ProjectKind) {
        self.kind = kind;
    }

    /// Returns all tasks in insertion order.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Renames the project, trimming surrounding whitespace.
    ///
    /// # Errors
    /// - Returns `ValidationError::EmptyProjectName` when `new_name` trims
    ///   to empty; the current name is kept in that case.
    pub fn rename(&mut self, new_name: impl Into<String>) -> Result<(), ValidationError> {
        self.name = normalize_project_name(new_name.into())?;
        Ok(())
    }

    /// Appends a task, preserving insertion order.
    ///
    /// A task whose display name is already present is dropped silently;
    /// duplicates are not an error. Returns whether the task was added.
    pub fn add_task(&mut self, task: Task) -> bool {
        if self.contains_task(&task.display_name()) {
            return false;
        }
        self.tasks.push(task);
        true
    }

    /// Removes the task matching `name`, if present.
    ///
    /// Returns whether a task was removed.
    pub fn remove_task(&mut self, name: &str) -> bool {
        match self.position_of(name) {
            Some(index) => {
                self.tasks.remove(index);
                true
            }
            None => false,
        }
    }

    /// Finds a task by display name first, then by plain name.
    pub fn find_task(&self, name: &str) -> Option<&Task> {
        self.position_of(name).map(|index| &self.tasks[index])
    }

    /// Mutable variant of [`find_task`](Self::find_task).
    pub fn find_task_mut(&mut self, name: &str) -> Option<&mut Task> {
        match self.position_of(name) {
            Some(index) => Some(&mut self.tasks[index]),
            None => None,
        }
    }

    /// Returns whether a task matching `name` exists.
    pub fn contains_task(&self, name: &str) -> bool {
        self.position_of(name).is_some()
    }

    /// Replaces the task collection wholesale, re-applying the
    /// display-name-uniqueness rule. Used when view snapshots are rebuilt.
    pub fn replace_tasks(&mut self, tasks: Vec<Task>) {
        self.tasks.clear();
        for task in tasks {
            self.add_task(task);
        }
    }

    /// Returns tasks due on the current local day.
    pub fn tasks_due_today(&self) -> Vec<&Task> {
        self.tasks_due_on(Local::now().date_naive())
    }

    /// Returns tasks due exactly on `day`.
    pub fn tasks_due_on(&self, day: NaiveDate) -> Vec<&Task> {
        self.tasks
            .iter()
            .filter(|task| task.due_date().to_naive_date() == Some(day))
            .collect()
    }

    /// Returns tasks due within the rolling week anchored on the current
    /// local day.
    pub fn tasks_due_this_week(&self) -> Vec<&Task> {
        self.tasks_due_in_week_from(Local::now().date_naive())
    }

    /// Returns tasks due within the rolling week anchored on `today`.
    ///
    /// The window is `[today - 1, today + 5]` inclusive: one day of grace
    /// behind, five days of lookahead. Tasks without a resolvable calendar
    /// day never match.
    pub fn tasks_due_in_week_from(&self, today: NaiveDate) -> Vec<&Task> {
        let start = today - Duration::days(1);
        let end = today + Duration::days(5);
        self.tasks
            .iter()
            .filter(|task| match task.due_date().to_naive_date() {
                Some(day) => day >= start && day <= end,
                None => false,
            })
            .collect()
    }

    fn position_of(&self, name: &str) -> Option<usize> {
        self.tasks
            .iter()
            .position(|task| task.display_name() == name)
            .or_else(|| self.tasks.iter().position(|task| task.name() == name))
    }
}

fn normalize_project_name(value: String) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyProjectName);
    }
    Ok(trimmed.to_string())
}
