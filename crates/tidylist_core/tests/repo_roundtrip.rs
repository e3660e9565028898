use chrono::NaiveDate;
use serde_json::Value;
use tidylist_core::{
    DueDate, KeyValueStore, Project, ProjectKind, RepoError, SqliteStore, StoreError,
    StoreResult, Task, TodoList, TodoListRepository, INBOX_NAME, STORAGE_KEY, TODAY_NAME,
    WEEK_NAME,
};

#[test]
fn load_on_empty_store_returns_initialized_defaults() {
    let mut repo = mem_repo();

    let list = repo.load().unwrap();

    let names: Vec<&str> = list.projects().iter().map(|p| p.name()).collect();
    assert_eq!(names, vec![INBOX_NAME, TODAY_NAME, WEEK_NAME]);
    assert!(list.projects().iter().all(|p| p.tasks().is_empty()));
    // Reading alone writes nothing.
    assert!(repo.store().get(STORAGE_KEY).unwrap().is_none());
}

#[test]
fn save_then_load_then_save_is_idempotent() {
    let mut repo = mem_repo();

    let mut list = TodoList::new();
    let mut work = Project::new("Work").unwrap();
    work.add_task(task("Write report", "15/03/2024"));
    list.add_project(work);
    repo.save(&list).unwrap();
    let first_raw = repo.store().get(STORAGE_KEY).unwrap().unwrap();

    let loaded = repo.load().unwrap();
    let project = loaded.find_project("Work").unwrap();
    assert_eq!(project.kind(), ProjectKind::User);
    let reloaded = project.find_task("Write report").unwrap();
    assert_eq!(reloaded.name(), "Write report");
    assert_eq!(reloaded.due_date().as_str(), "15/03/2024");
    assert!(!reloaded.completed());
    assert_eq!(reloaded.origin(), None);

    repo.save(&loaded).unwrap();
    let second_raw = repo.store().get(STORAGE_KEY).unwrap().unwrap();
    assert_eq!(first_raw, second_raw);
}

#[test]
fn persisted_document_keeps_the_wire_shape() {
    let mut repo = mem_repo();

    let mut list = TodoList::new();
    let mut work = Project::new("Work").unwrap();
    work.add_task(task("A", "15/03/2024"));
    list.add_project(work);
    list.refresh_today_on(date(2024, 3, 15));
    repo.save(&list).unwrap();

    let raw = repo.store().get(STORAGE_KEY).unwrap().unwrap();
    let doc: Value = serde_json::from_str(&raw).unwrap();

    let projects = doc["projects"].as_array().unwrap();
    assert_eq!(projects[0]["name"], "Inbox");
    assert_eq!(projects[0]["kind"], "inbox");
    assert_eq!(projects[1]["kind"], "today");
    assert_eq!(projects[2]["kind"], "week");
    assert_eq!(projects[3]["kind"], "user");

    let plain_task = &projects[3]["tasks"][0];
    assert_eq!(plain_task["name"], "A");
    assert_eq!(plain_task["dueDate"], "15/03/2024");
    assert_eq!(plain_task["completed"], false);
    assert!(plain_task.get("origin").is_none());

    let view_task = &projects[1]["tasks"][0];
    assert_eq!(view_task["name"], "A");
    assert_eq!(view_task["origin"], "Work");
}

#[test]
fn corrupt_entry_is_erased_and_replaced_by_defaults() {
    let mut repo = mem_repo();
    repo.store_mut().set(STORAGE_KEY, "{not json").unwrap();

    let list = repo.load().unwrap();

    let names: Vec<&str> = list.projects().iter().map(|p| p.name()).collect();
    assert_eq!(names, vec![INBOX_NAME, TODAY_NAME, WEEK_NAME]);
    assert!(list.projects().iter().all(|p| p.tasks().is_empty()));
    assert!(repo.store().get(STORAGE_KEY).unwrap().is_none());
}

#[test]
fn entry_failing_entity_validation_heals_like_corrupt_json() {
    let mut repo = mem_repo();
    repo.store_mut()
        .set(
            STORAGE_KEY,
            r#"{"projects":[{"name":"Work","tasks":[{"name":"   ","dueDate":"No date","completed":false}]}]}"#,
        )
        .unwrap();

    let list = repo.load().unwrap();

    assert!(!list.contains_project("Work"));
    assert_eq!(list.projects().len(), 3);
    assert!(repo.store().get(STORAGE_KEY).unwrap().is_none());
}

#[test]
fn legacy_document_without_kind_or_origin_loads() {
    let mut repo = mem_repo();
    repo.store_mut()
        .set(
            STORAGE_KEY,
            r#"{"projects":[{"name":"Work","tasks":[{"name":"A","dueDate":"15/03/2024","completed":true},{"name":"B"}]}]}"#,
        )
        .unwrap();

    let list = repo.load().unwrap();

    let work = list.find_project("Work").unwrap();
    assert_eq!(work.kind(), ProjectKind::User);
    assert!(work.find_task("A").unwrap().completed());
    assert!(work.find_task("B").unwrap().due_date().is_no_date());
    // Defaults are ensured around the stored projects.
    assert!(list.contains_project(INBOX_NAME));
    assert!(list.contains_project(TODAY_NAME));
    assert!(list.contains_project(WEEK_NAME));
}

#[test]
fn add_project_persists_and_drops_duplicates() {
    let mut repo = mem_repo();

    repo.add_project(Project::new("Work").unwrap()).unwrap();
    repo.add_project(Project::new("Work").unwrap()).unwrap();

    let list = repo.load().unwrap();
    let work_count = list.projects().iter().filter(|p| p.name() == "Work").count();
    assert_eq!(work_count, 1);
}

#[test]
fn remove_project_absorbs_missing_and_guards_defaults() {
    let mut repo = mem_repo();
    repo.add_project(Project::new("Work").unwrap()).unwrap();

    repo.remove_project("nowhere").unwrap();
    repo.remove_project(INBOX_NAME).unwrap();
    repo.remove_project("Work").unwrap();

    let list = repo.load().unwrap();
    assert!(list.contains_project(INBOX_NAME));
    assert!(!list.contains_project("Work"));
}

#[test]
fn add_task_persists_and_absorbs_missing_project() {
    let mut repo = mem_repo();
    repo.add_project(Project::new("Work").unwrap()).unwrap();

    repo.add_task_to_project("Work", task("A", "15/03/2024"))
        .unwrap();
    repo.add_task_to_project("nowhere", task("B", "No date"))
        .unwrap();

    let list = repo.load().unwrap();
    assert!(list.find_project("Work").unwrap().contains_task("A"));
    assert!(!list.contains_project("nowhere"));
}

#[test]
fn rename_task_addressed_through_view_routes_to_origin() {
    let mut repo = seeded_work_repo("A", "15/03/2024");
    repo.refresh_today_on(date(2024, 3, 15)).unwrap();

    repo.rename_task_in_project(TODAY_NAME, "A (Work)", "A2")
        .unwrap();

    let list = repo.load().unwrap();
    let work = list.find_project("Work").unwrap();
    assert!(work.contains_task("A2"));
    assert!(!work.contains_task("A"));

    // The snapshot stays stale until the next refresh.
    let today = list.find_project(TODAY_NAME).unwrap();
    assert_eq!(today.tasks()[0].display_name(), "A (Work)");

    repo.refresh_today_on(date(2024, 3, 15)).unwrap();
    let refreshed = repo.load().unwrap();
    assert_eq!(
        refreshed.find_project(TODAY_NAME).unwrap().tasks()[0].display_name(),
        "A2 (Work)"
    );
}

#[test]
fn rename_task_strips_display_suffix_from_lookup_argument() {
    let mut repo = seeded_work_repo("A", "No date");

    repo.rename_task_in_project("Work", "A (Work)", "B").unwrap();

    let list = repo.load().unwrap();
    let work = list.find_project("Work").unwrap();
    assert!(work.contains_task("B"));
    assert!(!work.contains_task("A"));
}

#[test]
fn rename_task_rejects_blank_names_without_writing() {
    let mut repo = seeded_work_repo("A", "No date");
    let before = repo.store().get(STORAGE_KEY).unwrap();

    let err = repo
        .rename_task_in_project("Work", "A", "   ")
        .unwrap_err();
    assert!(matches!(err, RepoError::Validation(_)));
    assert_eq!(repo.store().get(STORAGE_KEY).unwrap(), before);
}

#[test]
fn rename_task_absorbs_name_conflicts() {
    let mut repo = seeded_work_repo("A", "No date");
    repo.add_task_to_project("Work", task("B", "No date"))
        .unwrap();

    repo.rename_task_in_project("Work", "A", "B").unwrap();

    let list = repo.load().unwrap();
    let work = list.find_project("Work").unwrap();
    assert!(work.contains_task("A"));
    assert!(work.contains_task("B"));
    assert_eq!(work.tasks().len(), 2);
}

#[test]
fn set_task_date_validates_format_before_touching_the_store() {
    let mut repo = seeded_work_repo("A", "15/03/2024");
    let before = repo.store().get(STORAGE_KEY).unwrap();

    let err = repo
        .set_task_date_in_project("Work", "A", "2024-03-16")
        .unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(tidylist_core::ValidationError::InvalidDateFormat(_))
    ));
    assert_eq!(repo.store().get(STORAGE_KEY).unwrap(), before);

    repo.set_task_date_in_project("Work", "A", "16/03/2024")
        .unwrap();
    let list = repo.load().unwrap();
    assert_eq!(
        list.find_project("Work")
            .unwrap()
            .find_task("A")
            .unwrap()
            .due_date()
            .as_str(),
        "16/03/2024"
    );
}

#[test]
fn set_completed_addressed_through_view_routes_to_origin() {
    let mut repo = seeded_work_repo("A", "15/03/2024");
    repo.refresh_today_on(date(2024, 3, 15)).unwrap();

    repo.set_task_completed_in_project(TODAY_NAME, "A (Work)", true)
        .unwrap();

    let list = repo.load().unwrap();
    assert!(list
        .find_project("Work")
        .unwrap()
        .find_task("A")
        .unwrap()
        .completed());
}

#[test]
fn remove_task_addressed_through_view_routes_to_origin() {
    let mut repo = seeded_work_repo("A", "15/03/2024");
    repo.refresh_today_on(date(2024, 3, 15)).unwrap();

    repo.remove_task_from_project(TODAY_NAME, "A (Work)").unwrap();

    let list = repo.load().unwrap();
    assert!(list.find_project("Work").unwrap().tasks().is_empty());
    // Stale copy survives until refresh, then disappears.
    assert_eq!(list.find_project(TODAY_NAME).unwrap().tasks().len(), 1);
    repo.refresh_today_on(date(2024, 3, 15)).unwrap();
    let refreshed = repo.load().unwrap();
    assert!(refreshed.find_project(TODAY_NAME).unwrap().tasks().is_empty());
}

#[test]
fn remove_task_absorbs_missing_targets() {
    let mut repo = seeded_work_repo("A", "No date");

    repo.remove_task_from_project("Work", "missing").unwrap();
    repo.remove_task_from_project("nowhere", "A").unwrap();

    let list = repo.load().unwrap();
    assert!(list.find_project("Work").unwrap().contains_task("A"));
}

#[test]
fn refresh_operations_persist_their_snapshots() {
    let mut repo = seeded_work_repo("A", "15/03/2024");

    repo.refresh_today_on(date(2024, 3, 15)).unwrap();
    repo.refresh_week_on(date(2024, 3, 15)).unwrap();

    let list = repo.load().unwrap();
    assert_eq!(
        list.find_project(TODAY_NAME).unwrap().tasks()[0].display_name(),
        "A (Work)"
    );
    assert_eq!(
        list.find_project(WEEK_NAME).unwrap().tasks()[0].display_name(),
        "A (Work)"
    );
}

#[test]
fn store_write_failures_surface_as_repo_errors() {
    let mut repo = TodoListRepository::new(BrokenStore { fail_reads: false });

    let err = repo.save(&TodoList::new()).unwrap_err();
    assert!(matches!(err, RepoError::Store(_)));

    let err = repo.add_project(Project::new("Work").unwrap()).unwrap_err();
    assert!(matches!(err, RepoError::Store(_)));
}

#[test]
fn store_read_failures_surface_instead_of_healing() {
    let mut repo = TodoListRepository::new(BrokenStore { fail_reads: true });

    let err = repo.load().unwrap_err();
    assert!(matches!(err, RepoError::Store(_)));
}

fn mem_repo() -> TodoListRepository<SqliteStore> {
    TodoListRepository::new(SqliteStore::open_in_memory().unwrap())
}

fn seeded_work_repo(task_name: &str, due: &str) -> TodoListRepository<SqliteStore> {
    let mut repo = mem_repo();
    repo.add_project(Project::new("Work").unwrap()).unwrap();
    repo.add_task_to_project("Work", task(task_name, due)).unwrap();
    repo
}

fn task(name: &str, due: &str) -> Task {
    Task::with_due_date(name, DueDate::parse(due).unwrap()).unwrap()
}

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

struct BrokenStore {
    fail_reads: bool,
}

impl KeyValueStore for BrokenStore {
    fn get(&self, _key: &str) -> StoreResult<Option<String>> {
        if self.fail_reads {
            return Err(StoreError::Sqlite(rusqlite::Error::InvalidQuery));
        }
        Ok(None)
    }

    fn set(&mut self, _key: &str, _value: &str) -> StoreResult<()> {
        Err(StoreError::Sqlite(rusqlite::Error::InvalidQuery))
    }

    fn remove(&mut self, _key: &str) -> StoreResult<()> {
        Ok(())
    }
}
