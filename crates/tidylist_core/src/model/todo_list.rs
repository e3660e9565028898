//! TodoList root aggregate.
//!
//! # Responsibility
//! - Own the ordered, name-unique project collection.
//! - Guarantee the three default projects and rebuild their view snapshots.
//!
//! # Invariants
//! - Project names are unique; duplicate adds are dropped silently.
//! - "Inbox", "Today" and "This week" exist after initialization.
//! - Default projects are never removed through `remove_project`.
//! - View snapshots change only when a refresh operation runs.

use crate::model::project::{Project, ProjectKind};
use crate::model::task::Task;
use chrono::{Local, NaiveDate};
use log::warn;

/// Name of the default general-purpose bucket.
pub const INBOX_NAME: &str = "Inbox";
/// Name of the materialized due-today view.
pub const TODAY_NAME: &str = "Today";
/// Name of the materialized due-this-week view.
pub const WEEK_NAME: &str = "This week";

/// The root aggregate: every project, including the built-in defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoList {
    projects: Vec<Project>,
}

impl TodoList {
    /// Creates a list holding exactly the three default projects, empty.
    pub fn new() -> Self {
        let mut list = Self {
            projects: Vec::new(),
        };
        list.ensure_default_projects();
        list
    }

    /// Returns all projects in insertion order, defaults first.
    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    /// Appends a project unless its name is already taken.
    ///
    /// Returns whether the project was added; a duplicate name is dropped
    /// silently.
    pub fn add_project(&mut self, project: Project) -> bool {
        if self.contains_project(project.name()) {
            return false;
        }
        self.projects.push(project);
        true
    }

    /// Removes the named project.
    ///
    /// Default projects are kept; the refusal is logged and reported by the
    /// `false` return, not raised as an error. Returns whether a project
    /// was removed.
    pub fn remove_project(&mut self, name: &str) -> bool {
        let Some(index) = self.projects.iter().position(|p| p.name() == name) else {
            return false;
        };
        if self.projects[index].kind().is_default() {
            warn!(
                "event=default_project_guard module=model status=refused project={}",
                name
            );
            return false;
        }
        self.projects.remove(index);
        true
    }

    /// Finds a project by exact name.
    pub fn find_project(&self, name: &str) -> Option<&Project> {
        self.projects.iter().find(|p| p.name() == name)
    }

    /// Mutable variant of [`find_project`](Self::find_project).
    pub fn find_project_mut(&mut self, name: &str) -> Option<&mut Project> {
        self.projects.iter_mut().find(|p| p.name() == name)
    }

    /// Returns whether a project with this exact name exists.
    pub fn contains_project(&self, name: &str) -> bool {
        self.find_project(name).is_some()
    }

    /// Creates any missing default project and heals the kind tag on
    /// name-matching projects loaded from storage. Idempotent.
    pub fn ensure_default_projects(&mut self) {
        for (name, kind) in [
            (INBOX_NAME, ProjectKind::Inbox),
            (TODAY_NAME, ProjectKind::Today),
            (WEEK_NAME, ProjectKind::Week),
        ] {
            match self.find_project_mut(name) {
                Some(existing) => existing.set_kind(kind),
                None => {
                    let project = Project::with_kind(name, kind)
                        .expect("default project names are valid");
                    self.projects.push(project);
                }
            }
        }
    }

    /// Rebuilds the "Today" snapshot from the current local day.
    pub fn refresh_today_project(&mut self) {
        self.refresh_today_on(Local::now().date_naive());
    }

    /// Rebuilds the "Today" snapshot as of an explicit day.
    ///
    /// Scans every non-view project, copies each task due on `today`
    /// annotated with its origin project, and replaces the "Today" task
    /// collection with that snapshot.
    pub fn refresh_today_on(&mut self, today: NaiveDate) {
        let snapshot = self.today_view_copies(today);
        if let Some(view) = self.find_project_mut(TODAY_NAME) {
            view.replace_tasks(snapshot);
        }
    }

    /// Rebuilds the "This week" snapshot from the current local day.
    pub fn refresh_week_project(&mut self) {
        self.refresh_week_on(Local::now().date_naive());
    }

    /// Rebuilds the "This week" snapshot as of an explicit day, using the
    /// rolling `[today - 1, today + 5]` window.
    pub fn refresh_week_on(&mut self, today: NaiveDate) {
        let snapshot = self.week_view_copies(today);
        if let Some(view) = self.find_project_mut(WEEK_NAME) {
            view.replace_tasks(snapshot);
        }
    }

    fn today_view_copies(&self, today: NaiveDate) -> Vec<Task> {
        let mut copies = Vec::new();
        for project in &self.projects {
            if project.kind().is_view() {
                continue;
            }
            for task in project.tasks_due_on(today) {
                copies.push(task.view_copy(project.name()));
            }
        }
        copies
    }

    fn week_view_copies(&self, today: NaiveDate) -> Vec<Task> {
        let mut copies = Vec::new();
        for project in &self.projects {
            if project.kind().is_view() {
                continue;
            }
            for task in project.tasks_due_in_week_from(today) {
                copies.push(task.view_copy(project.name()));
            }
        }
        copies
    }
}

impl Default for TodoList {
    fn default() -> Self {
        Self::new()
    }
}
