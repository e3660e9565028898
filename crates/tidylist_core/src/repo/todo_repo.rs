//! TodoList persistence gateway.
//!
//! # Responsibility
//! - Mediate every read and write of the persisted TodoList document.
//! - Keep wire-format and routing details inside the persistence boundary.
//!
//! # Invariants
//! - All state lives as one JSON document under the `todoList` key.
//! - Corrupt stored state is erased and replaced, never surfaced.
//! - Missing mutation targets are absorbed after a warn event, not errors.
//! - Store and serialization failures propagate to callers unchanged.

use crate::model::project::{Project, ProjectKind};
use crate::model::task::{DueDate, Task, ValidationError, NO_DATE};
use crate::model::todo_list::TodoList;
use crate::store::{KeyValueStore, StoreError};
use chrono::NaiveDate;
use log::warn;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// The single store key holding the whole persisted document.
pub const STORAGE_KEY: &str = "todoList";

pub type RepoResult<T> = Result<T, RepoError>;

/// Gateway error for persistence operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(ValidationError),
    Store(StoreError),
    Serialize(serde_json::Error),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Store(err) => write!(f, "{err}"),
            Self::Serialize(err) => write!(f, "todo list document encoding failed: {err}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Store(err) => Some(err),
            Self::Serialize(err) => Some(err),
        }
    }
}

impl From<ValidationError> for RepoError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<StoreError> for RepoError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

impl From<serde_json::Error> for RepoError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialize(value)
    }
}

/// Persistence gateway over a flat key-value store.
///
/// Holds exclusive access to [`STORAGE_KEY`]; collaborators mutate the
/// persisted list only through these operations. Every mutation is one
/// load, modify, save cycle over the whole document.
pub struct TodoListRepository<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> TodoListRepository<S> {
    /// Creates a gateway using the provided store implementation.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Returns a shared reference to the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Returns a mutable reference to the underlying store.
    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Loads the persisted list, or a freshly initialized one.
    ///
    /// An absent entry yields a default list. An entry that fails to decode
    /// or rebuild is erased from the store and replaced by a default list;
    /// this self-healing path is logged and never surfaced as an error.
    ///
    /// # Errors
    /// - Returns `RepoError::Store` when the store itself fails.
    pub fn load(&mut self) -> RepoResult<TodoList> {
        let Some(raw) = self.store.get(STORAGE_KEY)? else {
            return Ok(TodoList::new());
        };

        match decode_document(&raw) {
            Ok(list) => Ok(list),
            Err(err) => {
                warn!(
                    "event=state_reset module=repo status=healed key={STORAGE_KEY} error={err}"
                );
                self.store.remove(STORAGE_KEY)?;
                Ok(TodoList::new())
            }
        }
    }

    /// Serializes the full list under [`STORAGE_KEY`].
    ///
    /// # Errors
    /// - Returns `RepoError::Serialize` when encoding fails.
    /// - Returns `RepoError::Store` when the write fails.
    pub fn save(&mut self, list: &TodoList) -> RepoResult<()> {
        let payload = serde_json::to_string(&document_from_list(list))?;
        self.store.set(STORAGE_KEY, &payload)?;
        Ok(())
    }

    /// Adds a project and persists the result.
    ///
    /// A duplicate project name is dropped silently, matching the in-memory
    /// aggregate; nothing is written in that case.
    pub fn add_project(&mut self, project: Project) -> RepoResult<()> {
        let mut list = self.load()?;
        if list.add_project(project) {
            self.save(&list)?;
        }
        Ok(())
    }

    /// Removes a user project and persists the result.
    ///
    /// A missing project is absorbed with a warn event; default projects
    /// are refused by the aggregate and nothing is written.
    pub fn remove_project(&mut self, name: &str) -> RepoResult<()> {
        let mut list = self.load()?;
        if !list.contains_project(name) {
            warn!(
                "event=target_missing module=repo status=absorbed op=remove_project project={name}"
            );
            return Ok(());
        }
        if list.remove_project(name) {
            self.save(&list)?;
        }
        Ok(())
    }

    /// Adds a task to the named project and persists the result.
    ///
    /// A missing project is absorbed with a warn event; a duplicate task
    /// display name is dropped silently and nothing is written.
    pub fn add_task_to_project(&mut self, project_name: &str, task: Task) -> RepoResult<()> {
        let mut list = self.load()?;
        let Some(project) = list.find_project_mut(project_name) else {
            warn!(
                "event=target_missing module=repo status=absorbed op=add_task project={project_name}"
            );
            return Ok(());
        };
        if project.add_task(task) {
            self.save(&list)?;
        }
        Ok(())
    }

    /// Removes a task and persists the result.
    ///
    /// A task addressed through a view project is routed to its origin
    /// project; the view snapshot itself stays unchanged until the next
    /// refresh. Missing targets are absorbed with a warn event.
    pub fn remove_task_from_project(
        &mut self,
        project_name: &str,
        task_name: &str,
    ) -> RepoResult<()> {
        let mut list = self.load()?;
        let Some((owner, base_name)) = resolve_task_target(&list, project_name, task_name)
        else {
            warn_target_missing("remove_task", project_name, task_name);
            return Ok(());
        };
        let Some(project) = list.find_project_mut(&owner) else {
            warn_target_missing("remove_task", &owner, &base_name);
            return Ok(());
        };
        if project.remove_task(&base_name) {
            self.save(&list)?;
        } else {
            warn_target_missing("remove_task", &owner, &base_name);
        }
        Ok(())
    }

    /// Renames a task and persists the result.
    ///
    /// A task addressed through a view project is routed to its origin
    /// project via the structured origin reference. A rename that would
    /// collide with an existing task name in the owning project is absorbed
    /// with a warn event.
    ///
    /// # Errors
    /// - Returns `RepoError::Validation` when `new_name` trims to empty.
    pub fn rename_task_in_project(
        &mut self,
        project_name: &str,
        task_name: &str,
        new_name: &str,
    ) -> RepoResult<()> {
        let mut list = self.load()?;
        let Some((owner, base_name)) = resolve_task_target(&list, project_name, task_name)
        else {
            warn_target_missing("rename_task", project_name, task_name);
            return Ok(());
        };
        let Some(project) = list.find_project_mut(&owner) else {
            warn_target_missing("rename_task", &owner, &base_name);
            return Ok(());
        };

        let trimmed = new_name.trim();
        if trimmed != base_name && project.contains_task(trimmed) {
            warn!(
                "event=rename_conflict module=repo status=absorbed project={owner} task={base_name} new_name={trimmed}"
            );
            return Ok(());
        }
        let Some(task) = project.find_task_mut(&base_name) else {
            warn_target_missing("rename_task", &owner, &base_name);
            return Ok(());
        };
        task.rename(new_name)?;
        self.save(&list)
    }

    /// Replaces a task's due date and persists the result.
    ///
    /// `new_date` must be the sentinel or `DD/MM/YYYY` text; the task is
    /// routed to its origin project when addressed through a view.
    ///
    /// # Errors
    /// - Returns `RepoError::Validation` when `new_date` has an invalid
    ///   format. The store is not touched in that case.
    pub fn set_task_date_in_project(
        &mut self,
        project_name: &str,
        task_name: &str,
        new_date: &str,
    ) -> RepoResult<()> {
        let due_date = DueDate::parse(new_date)?;
        let mut list = self.load()?;
        let Some((owner, base_name)) = resolve_task_target(&list, project_name, task_name)
        else {
            warn_target_missing("set_task_date", project_name, task_name);
            return Ok(());
        };
        let Some(task) = find_task_in_mut(&mut list, &owner, &base_name) else {
            warn_target_missing("set_task_date", &owner, &base_name);
            return Ok(());
        };
        task.set_due_date(due_date);
        self.save(&list)
    }

    /// Sets a task's completion flag and persists the result.
    ///
    /// The task is routed to its origin project when addressed through a
    /// view. Missing targets are absorbed with a warn event.
    pub fn set_task_completed_in_project(
        &mut self,
        project_name: &str,
        task_name: &str,
        completed: bool,
    ) -> RepoResult<()> {
        let mut list = self.load()?;
        let Some((owner, base_name)) = resolve_task_target(&list, project_name, task_name)
        else {
            warn_target_missing("set_task_completed", project_name, task_name);
            return Ok(());
        };
        let Some(task) = find_task_in_mut(&mut list, &owner, &base_name) else {
            warn_target_missing("set_task_completed", &owner, &base_name);
            return Ok(());
        };
        task.set_completed(completed);
        self.save(&list)
    }

    /// Rebuilds the "Today" snapshot from the current local day and
    /// persists the result.
    pub fn refresh_today_project(&mut self) -> RepoResult<()> {
        let mut list = self.load()?;
        list.refresh_today_project();
        self.save(&list)
    }

    /// Rebuilds the "Today" snapshot as of an explicit day and persists
    /// the result.
    pub fn refresh_today_on(&mut self, today: NaiveDate) -> RepoResult<()> {
        let mut list = self.load()?;
        list.refresh_today_on(today);
        self.save(&list)
    }

    /// Rebuilds the "This week" snapshot from the current local day and
    /// persists the result.
    pub fn refresh_week_project(&mut self) -> RepoResult<()> {
        let mut list = self.load()?;
        list.refresh_week_project();
        self.save(&list)
    }

    /// Rebuilds the "This week" snapshot as of an explicit day and
    /// persists the result.
    pub fn refresh_week_on(&mut self, today: NaiveDate) -> RepoResult<()> {
        let mut list = self.load()?;
        list.refresh_week_on(today);
        self.save(&list)
    }
}

/// Resolves an incoming (project, task) address to the project and plain
/// task name that should actually be mutated.
///
/// Lookup matches the display name first, then the plain name, then falls
/// back to the argument with its `" (…)"` display suffix stripped. A task
/// carrying an origin reference resolves to that origin project.
fn resolve_task_target(
    list: &TodoList,
    project_name: &str,
    task_name: &str,
) -> Option<(String, String)> {
    let project = list.find_project(project_name)?;
    let task = match project.find_task(task_name) {
        Some(task) => Some(task),
        None => {
            let stripped = strip_display_suffix(task_name);
            if stripped != task_name {
                project.find_task(stripped)
            } else {
                None
            }
        }
    }?;

    match task.origin() {
        Some(origin) => Some((origin.to_string(), task.name().to_string())),
        None => Some((project.name().to_string(), task.name().to_string())),
    }
}

fn find_task_in_mut<'a>(
    list: &'a mut TodoList,
    project_name: &str,
    task_name: &str,
) -> Option<&'a mut Task> {
    list.find_project_mut(project_name)?.find_task_mut(task_name)
}

fn warn_target_missing(op: &str, project: &str, task: &str) {
    warn!(
        "event=target_missing module=repo status=absorbed op={op} project={project} task={task}"
    );
}

/// Cuts everything from the first `" ("` onward, the shape used by view
/// display names. Returns the input unchanged when no suffix is present.
fn strip_display_suffix(name: &str) -> &str {
    match name.find(" (") {
        Some(index) => &name[..index],
        None => name,
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct TodoListDoc {
    projects: Vec<ProjectDoc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ProjectDoc {
    name: String,
    #[serde(default)]
    kind: ProjectKindDoc,
    #[serde(default)]
    tasks: Vec<TaskDoc>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
enum ProjectKindDoc {
    #[default]
    User,
    Inbox,
    Today,
    Week,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TaskDoc {
    name: String,
    #[serde(default = "default_due_date")]
    due_date: String,
    #[serde(default)]
    completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    origin: Option<String>,
}

fn default_due_date() -> String {
    NO_DATE.to_string()
}

fn document_from_list(list: &TodoList) -> TodoListDoc {
    TodoListDoc {
        projects: list
            .projects()
            .iter()
            .map(|project| ProjectDoc {
                name: project.name().to_string(),
                kind: kind_to_doc(project.kind()),
                tasks: project.tasks().iter().map(task_to_doc).collect(),
            })
            .collect(),
    }
}

fn decode_document(raw: &str) -> RepoResult<TodoList> {
    let doc: TodoListDoc = serde_json::from_str(raw)?;
    list_from_document(doc)
}

fn list_from_document(doc: TodoListDoc) -> RepoResult<TodoList> {
    let mut list = TodoList::new();
    for project_doc in doc.projects {
        let mut tasks = Vec::with_capacity(project_doc.tasks.len());
        for task_doc in project_doc.tasks {
            tasks.push(task_from_doc(task_doc)?);
        }

        match list.find_project_mut(&project_doc.name) {
            Some(existing) => existing.replace_tasks(tasks),
            None => {
                let mut project =
                    Project::with_kind(project_doc.name, kind_from_doc(project_doc.kind))?;
                for task in tasks {
                    project.add_task(task);
                }
                list.add_project(project);
            }
        }
    }
    list.ensure_default_projects();
    Ok(list)
}

fn task_to_doc(task: &Task) -> TaskDoc {
    TaskDoc {
        name: task.name().to_string(),
        due_date: task.due_date().as_str().to_string(),
        completed: task.completed(),
        origin: task.origin().map(str::to_string),
    }
}

fn task_from_doc(doc: TaskDoc) -> Result<Task, ValidationError> {
    let due_date = DueDate::parse(&doc.due_date)?;
    Task::from_stored(doc.name, due_date, doc.completed, doc.origin)
}

fn kind_to_doc(kind: ProjectKind) -> ProjectKindDoc {
    match kind {
        ProjectKind::User => ProjectKindDoc::User,
        ProjectKind::Inbox => ProjectKindDoc::Inbox,
        ProjectKind::Today => ProjectKindDoc::Today,
        ProjectKind::Week => ProjectKindDoc::Week,
    }
}

fn kind_from_doc(kind: ProjectKindDoc) -> ProjectKind {
    match kind {
        ProjectKindDoc::User => ProjectKind::User,
        ProjectKindDoc::Inbox => ProjectKind::Inbox,
        ProjectKindDoc::Today => ProjectKind::Today,
        ProjectKindDoc::Week => ProjectKind::Week,
    }
}
