//! Task domain model.
//!
//! # Responsibility
//! - Define the task entity: name, due date, completion and view origin.
//! - Enforce name and due-date validity at every mutation point.
//!
//! # Invariants
//! - `name` is never empty or whitespace-only and is stored trimmed.
//! - `due_date` is the "No date" sentinel or matches `DD/MM/YYYY` exactly.
//! - `origin` is set only on copies materialized into view projects.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Sentinel text meaning "no due date assigned".
pub const NO_DATE: &str = "No date";

static DUE_DATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{2}/\d{2}/\d{4}$").expect("valid due date regex"));

/// Validation failures raised by the domain model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Task name is blank after trim.
    EmptyTaskName,
    /// Project name is blank after trim.
    EmptyProjectName,
    /// Due date text is neither the sentinel nor `DD/MM/YYYY`.
    InvalidDateFormat(String),
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTaskName => write!(f, "task name must not be blank"),
            Self::EmptyProjectName => write!(f, "project name must not be blank"),
            Self::InvalidDateFormat(raw) => {
                write!(f, "due date must be `{NO_DATE}` or DD/MM/YYYY, got `{raw}`")
            }
        }
    }
}

impl Error for ValidationError {}

/// Due date value: the sentinel or day-first calendar text.
///
/// Validation is textual only. A pattern-valid value that names no real
/// calendar day (for example `99/99/2024`) is storable and simply never
/// matches a derived view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DueDate {
    /// The "No date" sentinel.
    NoDate,
    /// Date text in `DD/MM/YYYY` order, already pattern-checked.
    Date(String),
}

impl DueDate {
    /// Parses user-facing due date text.
    ///
    /// # Errors
    /// - Returns `ValidationError::InvalidDateFormat` unless `raw` is the
    ///   sentinel or matches `DD/MM/YYYY` exactly.
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        if raw == NO_DATE {
            return Ok(Self::NoDate);
        }
        if DUE_DATE_RE.is_match(raw) {
            return Ok(Self::Date(raw.to_string()));
        }
        Err(ValidationError::InvalidDateFormat(raw.to_string()))
    }

    /// Returns the stored day-first text, or the sentinel.
    pub fn as_str(&self) -> &str {
        match self {
            Self::NoDate => NO_DATE,
            Self::Date(text) => text.as_str(),
        }
    }

    /// Returns the date re-ordered to `MM/DD/YYYY` for month-first
    /// consumers. The sentinel passes through unchanged.
    pub fn month_first(&self) -> String {
        match self {
            Self::NoDate => NO_DATE.to_string(),
            Self::Date(text) => {
                let mut parts = text.splitn(3, '/');
                match (parts.next(), parts.next(), parts.next()) {
                    (Some(day), Some(month), Some(year)) => format!("{month}/{day}/{year}"),
                    _ => text.clone(),
                }
            }
        }
    }

    /// Resolves this value to a calendar day.
    ///
    /// Returns `None` for the sentinel and for pattern-valid text that is
    /// not a real date.
    pub fn to_naive_date(&self) -> Option<NaiveDate> {
        match self {
            Self::NoDate => None,
            Self::Date(text) => NaiveDate::parse_from_str(text, "%d/%m/%Y").ok(),
        }
    }

    /// Returns whether this value is the sentinel.
    pub fn is_no_date(&self) -> bool {
        matches!(self, Self::NoDate)
    }
}

impl Display for DueDate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single actionable item owned by one project.
///
/// Fields stay private; collaborators read through accessors and mutate
/// through the validated methods below.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    name: String,
    due_date: DueDate,
    completed: bool,
    origin: Option<String>,
}

impl Task {
    /// Creates a task with no due date.
    ///
    /// # Errors
    /// - Returns `ValidationError::EmptyTaskName` when `name` trims to empty.
    pub fn new(name: impl Into<String>) -> Result<Self, ValidationError> {
        Self::with_due_date(name, DueDate::NoDate)
    }

    /// Creates a task with an already-validated due date.
    ///
    /// # Errors
    /// - Returns `ValidationError::EmptyTaskName` when `name` trims to empty.
    pub fn with_due_date(
        name: impl Into<String>,
        due_date: DueDate,
    ) -> Result<Self, ValidationError> {
        let normalized = normalize_task_name(name.into())?;
        Ok(Self {
            name: normalized,
            due_date,
            completed: false,
            origin: None,
        })
    }

    /// Returns the plain task name without origin decoration.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the due date value.
    pub fn due_date(&self) -> &DueDate {
        &self.due_date
    }

    /// Returns the completion flag.
    pub fn completed(&self) -> bool {
        self.completed
    }

    /// Returns the origin project name for view copies, `None` otherwise.
    pub fn origin(&self) -> Option<&str> {
        self.origin.as_deref()
    }

    /// Returns the user-facing name: `"<name> (<origin>)"` for view
    /// copies, the plain name otherwise.
    pub fn display_name(&self) -> String {
        match &self.origin {
            Some(origin) => format!("{} ({})", self.name, origin),
            None => self.name.clone(),
        }
    }

    /// Renames the task, trimming surrounding whitespace.
    ///
    /// # Errors
    /// - Returns `ValidationError::EmptyTaskName` when `new_name` trims to
    ///   empty; the current name is kept in that case.
    pub fn rename(&mut self, new_name: impl Into<String>) -> Result<(), ValidationError> {
        self.name = normalize_task_name(new_name.into())?;
        Ok(())
    }

    /// Replaces the due date.
    pub fn set_due_date(&mut self, due_date: DueDate) {
        self.due_date = due_date;
    }

    /// Sets the completion flag.
    pub fn set_completed(&mut self, completed: bool) {
        self.completed = completed;
    }

    /// Returns a copy of this task annotated with its origin project,
    /// used when materializing view-project snapshots.
    pub fn view_copy(&self, origin: impl Into<String>) -> Self {
        let mut copy = self.clone();
        copy.origin = Some(origin.into());
        copy
    }

    /// Rebuilds a task from persisted fields, including a stored origin.
    ///
    /// # Errors
    /// - Returns `ValidationError::EmptyTaskName` when the stored name
    ///   trims to empty.
    pub fn from_stored(
        name: impl Into<String>,
        due_date: DueDate,
        completed: bool,
        origin: Option<String>,
    ) -> Result<Self, ValidationError> {
        let mut task = Self::with_due_date(name, due_date)?;
        task.completed = completed;
        task.origin = origin;
        Ok(task)
    }
}

fn normalize_task_name(value: String) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyTaskName);
    }
    Ok(trimmed.to_string())
}
