use chrono::{Duration, NaiveDate, TimeZone, Utc};
use tasknest_core::{
    CreateOutcome, DraftField, FixedClock, KeyValueRepository, MemoryKvRepository, RepoError,
    RepoResult, SequentialIdGenerator, SqliteKvRepository, StoreError, TaskDraft, TaskPriority,
    TaskStatus, TaskStore, TASKS_SLOT_KEY,
};

type TestStore<R> = TaskStore<R, SequentialIdGenerator, FixedClock>;

fn clock() -> FixedClock {
    FixedClock::new(Utc.with_ymd_and_hms(2026, 5, 20, 9, 30, 0).unwrap())
}

fn memory_store(repo: &MemoryKvRepository) -> TestStore<MemoryKvRepository> {
    TaskStore::load_with(repo.clone(), SequentialIdGenerator::default(), clock()).unwrap()
}

/// Shares slots with a working repository but fails every read.
struct ReadFailingRepo {
    inner: MemoryKvRepository,
}

impl KeyValueRepository for ReadFailingRepo {
    fn read_slot(&self, _key: &str) -> RepoResult<Option<String>> {
        Err(RepoError::InvalidKey("read unavailable".to_string()))
    }

    fn write_slot(&mut self, key: &str, value: &str) -> RepoResult<()> {
        self.inner.write_slot(key, value)
    }
}

fn created(store: &mut TestStore<MemoryKvRepository>, draft: TaskDraft) -> tasknest_core::Task {
    match store.submit(draft).unwrap() {
        CreateOutcome::Created(task) => task,
        CreateOutcome::Rejected(report) => panic!("draft rejected: {report}"),
    }
}

#[test]
fn load_from_empty_slot_starts_empty() {
    let store = memory_store(&MemoryKvRepository::new());
    assert!(store.is_empty());
    assert_eq!(store.stats().total, 0);
}

#[test]
fn corrupt_slot_loads_as_empty_store() {
    let mut repo = MemoryKvRepository::new();
    repo.write_slot(TASKS_SLOT_KEY, "{not json").unwrap();

    let store = memory_store(&repo);
    assert!(store.is_empty());
}

#[test]
fn wrong_shape_slot_loads_as_empty_store() {
    let mut repo = MemoryKvRepository::new();
    repo.write_slot(TASKS_SLOT_KEY, r#"{"tasks": []}"#).unwrap();

    assert!(memory_store(&repo).is_empty());
}

#[test]
fn read_failure_fails_load_and_keeps_saved_tasks() {
    let repo = MemoryKvRepository::new();
    let mut store = memory_store(&repo);
    for title in ["Plan sprint", "Dentist", "Water plants"] {
        created(&mut store, TaskDraft::new(title, "work"));
    }
    let saved = repo.read_slot(TASKS_SLOT_KEY).unwrap();

    let failing = ReadFailingRepo {
        inner: repo.clone(),
    };
    let result = TaskStore::load_with(failing, SequentialIdGenerator::default(), clock());
    assert!(matches!(result, Err(StoreError::Load(_))));
    assert_eq!(repo.read_slot(TASKS_SLOT_KEY).unwrap(), saved);

    let mut reloaded = memory_store(&repo);
    assert_eq!(reloaded.len(), 3);
    created(&mut reloaded, TaskDraft::new("Renew passport", "personal"));
    assert_eq!(memory_store(&repo).len(), 4);
}

#[test]
fn create_assigns_defaults_and_appends_in_order() {
    let repo = MemoryKvRepository::new();
    let mut store = memory_store(&repo);

    let first = created(&mut store, TaskDraft::new("Plan sprint", "work"));
    let second = created(
        &mut store,
        TaskDraft::new("Dentist", "health")
            .with_priority(TaskPriority::High)
            .with_due_date("2026-05-20"),
    );

    assert_eq!(first.id, "task-1");
    assert_eq!(first.status, TaskStatus::Pending);
    assert_eq!(first.priority, TaskPriority::Medium);
    assert_eq!(first.created_at, first.updated_at);
    assert_eq!(second.due_date, NaiveDate::from_ymd_opt(2026, 5, 20));

    let ids = store.tasks().iter().map(|t| t.id.clone()).collect::<Vec<_>>();
    assert_eq!(ids, vec!["task-1", "task-2"]);
}

#[test]
fn create_then_reload_roundtrips_all_fields() {
    let repo = MemoryKvRepository::new();
    let mut store = memory_store(&repo);
    let task = created(
        &mut store,
        TaskDraft::new("  Fix the sink ", "home")
            .with_description("kitchen, not bathroom")
            .with_due_date("2026-06-01")
            .with_priority(TaskPriority::Low),
    );
    drop(store);

    let reloaded = memory_store(&repo);
    assert_eq!(reloaded.tasks(), &[task.clone()]);
    assert_eq!(reloaded.get(&task.id).unwrap().title, "Fix the sink");
}

#[test]
fn sqlite_backed_store_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tasks.sqlite3");

    let task = {
        let repo = SqliteKvRepository::open(&path).unwrap();
        let mut store =
            TaskStore::load_with(repo, SequentialIdGenerator::default(), clock()).unwrap();
        match store.submit(TaskDraft::new("Renew passport", "personal")).unwrap() {
            CreateOutcome::Created(task) => task,
            CreateOutcome::Rejected(report) => panic!("draft rejected: {report}"),
        }
    };

    let repo = SqliteKvRepository::open(&path).unwrap();
    let store = TaskStore::load(repo).unwrap();
    assert_eq!(store.tasks(), &[task]);
}

#[test]
fn rejected_draft_is_not_stored_or_persisted() {
    let repo = MemoryKvRepository::new();
    let mut store = memory_store(&repo);

    let outcome = store
        .submit(TaskDraft::new(" ", "work").with_due_date("2026-05-19"))
        .unwrap();
    let CreateOutcome::Rejected(report) = outcome else {
        panic!("draft should be rejected");
    };
    assert!(report.message_for(DraftField::Title).is_some());
    assert!(report.message_for(DraftField::DueDate).is_some());
    assert!(store.is_empty());
    assert!(repo.is_empty());
}

#[test]
fn set_status_is_idempotent_and_refreshes_updated_at_once() {
    let repo = MemoryKvRepository::new();
    let mut store = memory_store(&repo);
    let task = created(&mut store, TaskDraft::new("Water plants", "home"));

    let mut later = clock();
    later.set(task.created_at + Duration::minutes(5));
    let mut store =
        TaskStore::load_with(repo.clone(), SequentialIdGenerator::default(), later).unwrap();

    assert!(store.set_status(&task.id, TaskStatus::Completed).unwrap());
    assert!(!store.set_status(&task.id, TaskStatus::Completed).unwrap());

    let current = store.get(&task.id).unwrap();
    assert_eq!(current.status, TaskStatus::Completed);
    assert_eq!(current.updated_at, task.created_at + Duration::minutes(5));
    assert_eq!(current.created_at, task.created_at);

    let reloaded = memory_store(&repo);
    assert_eq!(reloaded.get(&task.id).unwrap().status, TaskStatus::Completed);
}

#[test]
fn toggle_flips_back_and_forth() {
    let repo = MemoryKvRepository::new();
    let mut store = memory_store(&repo);
    let task = created(&mut store, TaskDraft::new("Run 5k", "health"));

    assert_eq!(
        store.toggle_status(&task.id).unwrap(),
        Some(TaskStatus::Completed)
    );
    assert_eq!(store.toggle_status(&task.id).unwrap(), Some(TaskStatus::Pending));
    assert_eq!(store.get(&task.id).unwrap().status, TaskStatus::Pending);
}

#[test]
fn unknown_ids_are_silent_noops() {
    let repo = MemoryKvRepository::new();
    let mut store = memory_store(&repo);
    created(&mut store, TaskDraft::new("Call mom", "personal"));
    let before = repo.read_slot(TASKS_SLOT_KEY).unwrap();

    assert!(!store.set_status("missing", TaskStatus::Completed).unwrap());
    assert_eq!(store.toggle_status("missing").unwrap(), None);
    assert!(!store.remove("missing").unwrap());

    assert_eq!(store.len(), 1);
    assert_eq!(repo.read_slot(TASKS_SLOT_KEY).unwrap(), before);
}

#[test]
fn remove_deletes_exactly_one_task_and_repeat_is_noop() {
    let repo = MemoryKvRepository::new();
    let mut store = memory_store(&repo);
    let a = created(&mut store, TaskDraft::new("a", "work"));
    let b = created(&mut store, TaskDraft::new("b", "work"));
    let c = created(&mut store, TaskDraft::new("c", "work"));

    assert!(store.remove(&b.id).unwrap());
    assert!(!store.remove(&b.id).unwrap());

    let ids = store.tasks().iter().map(|t| t.id.clone()).collect::<Vec<_>>();
    assert_eq!(ids, vec![a.id.clone(), c.id.clone()]);
    assert_eq!(memory_store(&repo).len(), 2);
}

#[test]
fn stats_count_by_status() {
    let repo = MemoryKvRepository::new();
    let mut store = memory_store(&repo);
    let a = created(&mut store, TaskDraft::new("a", "work"));
    created(&mut store, TaskDraft::new("b", "home"));
    created(&mut store, TaskDraft::new("c", "home"));
    store.set_status(&a.id, TaskStatus::Completed).unwrap();

    let stats = store.stats();
    assert_eq!((stats.total, stats.completed, stats.pending), (3, 1, 2));
}
