//! Task store: the owned, persisted task list.
//!
//! # Responsibility
//! - Hold the ordered task list for one session.
//! - Admit validated drafts, set/toggle status, and remove tasks.
//! - Mirror the whole list into the `tasks` key-value slot after every
//!   mutation.
//!
//! # Invariants
//! - Insertion order is display order; nothing re-sorts the list.
//! - Task ids are unique within the list, including ids loaded from storage.
//! - Unknown ids on status/remove calls are silent no-ops.
//! - A failed write rolls the in-memory mutation back, so memory and storage
//!   never diverge.
//! - A missing or unparseable slot loads as an empty list; a failed slot
//!   read fails the load, so a later write cannot clobber unread data.

use crate::filter::task_filter::{filter_tasks, TaskFilter, TaskStats};
use crate::model::category::CategoryRegistry;
use crate::model::draft::{validate_draft, TaskDraft, ValidatedDraft, ValidationReport};
use crate::model::task::{Task, TaskStatus};
use crate::repo::kv_repo::{KeyValueRepository, RepoError};
use crate::service::clock::{Clock, SystemClock};
use crate::service::id_gen::{IdGenerator, UuidIdGenerator};
use chrono::NaiveDate;
use log::{debug, error, info, warn};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Slot key holding the serialized task list.
pub const TASKS_SLOT_KEY: &str = "tasks";

pub type StoreResult<T> = Result<T, StoreError>;

/// Store error for slot I/O failures.
#[derive(Debug)]
pub enum StoreError {
    /// Slot read failed while loading; no store was built.
    Load(RepoError),
    /// Task list could not be encoded.
    Encode(serde_json::Error),
    /// Slot write failed.
    Persistence(RepoError),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Load(err) => write!(f, "failed to load task list: {err}"),
            Self::Encode(err) => write!(f, "failed to encode task list: {err}"),
            Self::Persistence(err) => write!(f, "failed to persist task list: {err}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Load(err) => Some(err),
            Self::Encode(err) => Some(err),
            Self::Persistence(err) => Some(err),
        }
    }
}

impl From<RepoError> for StoreError {
    fn from(value: RepoError) -> Self {
        Self::Persistence(value)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(value: serde_json::Error) -> Self {
        Self::Encode(value)
    }
}

/// Result of submitting a raw draft.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateOutcome {
    Created(Task),
    /// Draft failed validation; nothing was stored.
    Rejected(ValidationReport),
}

/// Owned task list bound to one key-value repository.
pub struct TaskStore<R, I = UuidIdGenerator, C = SystemClock> {
    repo: R,
    ids: I,
    clock: C,
    registry: CategoryRegistry,
    tasks: Vec<Task>,
}

impl<R: KeyValueRepository> TaskStore<R> {
    /// Loads the store with UUID ids and the system clock.
    pub fn load(repo: R) -> StoreResult<Self> {
        Self::load_with(repo, UuidIdGenerator, SystemClock)
    }
}

impl<R, I, C> TaskStore<R, I, C>
where
    R: KeyValueRepository,
    I: IdGenerator,
    C: Clock,
{
    /// Loads the persisted list from the `tasks` slot.
    ///
    /// A missing slot or unparseable content starts the session with an
    /// empty list. Later entries that repeat an earlier id are dropped.
    ///
    /// # Errors
    /// - `StoreError::Load` when the slot cannot be read at all.
    pub fn load_with(repo: R, ids: I, clock: C) -> StoreResult<Self> {
        let tasks = read_tasks(&repo)?;
        info!(
            "event=store_load module=store status=ok task_count={}",
            tasks.len()
        );
        Ok(Self {
            repo,
            ids,
            clock,
            registry: CategoryRegistry::builtin(),
            tasks,
        })
    }

    /// Tasks in display order.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn registry(&self) -> &CategoryRegistry {
        &self.registry
    }

    /// Local calendar day according to the store clock.
    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    /// Validates a draft against the registry and today's date.
    pub fn validate(&self, draft: &TaskDraft) -> ValidationReport {
        validate_draft(draft, &self.registry, self.clock.today())
    }

    /// Appends a task built from an admitted draft and persists.
    ///
    /// # Errors
    /// - Returns `StoreError` when the write fails; the task is not kept.
    pub fn create(&mut self, draft: ValidatedDraft) -> StoreResult<Task> {
        let id = self.fresh_id();
        let now = self.clock.now();
        let task = Task {
            id,
            title: draft.title().to_string(),
            description: draft.description().to_string(),
            due_date: draft.due_date(),
            priority: draft.priority(),
            category_id: draft.category_id().to_string(),
            status: TaskStatus::Pending,
            created_at: now,
            updated_at: now,
        };

        self.tasks.push(task.clone());
        if let Err(err) = self.persist() {
            self.tasks.pop();
            error!(
                "event=task_create module=store status=error task_id={} error={}",
                task.id, err
            );
            return Err(err);
        }

        info!(
            "event=task_create module=store status=ok task_id={} category={} total={}",
            task.id,
            task.category_id,
            self.tasks.len()
        );
        Ok(task)
    }

    /// Validates a raw draft and creates the task when it is clean.
    pub fn submit(&mut self, draft: TaskDraft) -> StoreResult<CreateOutcome> {
        let today = self.clock.today();
        match draft.admit(&self.registry, today) {
            Ok(admitted) => self.create(admitted).map(CreateOutcome::Created),
            Err(report) => {
                debug!(
                    "event=task_create module=store status=rejected fields={}",
                    report.errors().len()
                );
                Ok(CreateOutcome::Rejected(report))
            }
        }
    }

    /// Sets the status of one task.
    ///
    /// Returns `Ok(false)` without writing when the id is unknown or the task
    /// already has `status`. `updated_at` is refreshed only on a real change.
    pub fn set_status(&mut self, id: &str, status: TaskStatus) -> StoreResult<bool> {
        let Some(index) = self.position(id) else {
            debug!("event=task_set_status module=store status=noop reason=not_found task_id={id}");
            return Ok(false);
        };
        if self.tasks[index].status == status {
            return Ok(false);
        }

        let now = self.clock.now();
        let task = &mut self.tasks[index];
        let previous = (task.status, task.updated_at);
        task.status = status;
        task.updated_at = now;

        if let Err(err) = self.persist() {
            let task = &mut self.tasks[index];
            task.status = previous.0;
            task.updated_at = previous.1;
            error!(
                "event=task_set_status module=store status=error task_id={id} error={err}"
            );
            return Err(err);
        }

        info!(
            "event=task_set_status module=store status=ok task_id={} task_status={}",
            id, status
        );
        Ok(true)
    }

    /// Flips pending/completed for one task.
    ///
    /// Returns the new status, or `None` when the id is unknown.
    pub fn toggle_status(&mut self, id: &str) -> StoreResult<Option<TaskStatus>> {
        let Some(current) = self.get(id).map(|task| task.status) else {
            debug!("event=task_toggle module=store status=noop reason=not_found task_id={id}");
            return Ok(None);
        };
        let next = current.toggled();
        self.set_status(id, next)?;
        Ok(Some(next))
    }

    /// Removes one task by id.
    ///
    /// Returns `Ok(false)` without writing when the id is unknown.
    pub fn remove(&mut self, id: &str) -> StoreResult<bool> {
        let Some(index) = self.position(id) else {
            debug!("event=task_remove module=store status=noop reason=not_found task_id={id}");
            return Ok(false);
        };

        let removed = self.tasks.remove(index);
        if let Err(err) = self.persist() {
            self.tasks.insert(index, removed);
            error!("event=task_remove module=store status=error task_id={id} error={err}");
            return Err(err);
        }

        info!(
            "event=task_remove module=store status=ok task_id={} total={}",
            id,
            self.tasks.len()
        );
        Ok(true)
    }

    /// Writes the whole list into the `tasks` slot.
    pub fn persist(&mut self) -> StoreResult<()> {
        let encoded = serde_json::to_string(&self.tasks)?;
        self.repo.write_slot(TASKS_SLOT_KEY, encoded.as_str())?;
        Ok(())
    }

    /// Tasks passing `filter`, in display order.
    pub fn visible(&self, filter: &TaskFilter) -> Vec<&Task> {
        filter_tasks(&self.tasks, filter)
    }

    pub fn stats(&self) -> TaskStats {
        TaskStats::from_tasks(&self.tasks)
    }

    /// Releases the underlying repository.
    pub fn into_repository(self) -> R {
        self.repo
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.tasks.iter().position(|task| task.id == id)
    }

    fn fresh_id(&mut self) -> String {
        loop {
            let candidate = self.ids.next_id();
            if self.position(candidate.as_str()).is_none() {
                return candidate;
            }
            warn!("event=task_id_collision module=store status=retry task_id={candidate}");
        }
    }
}

fn read_tasks(repo: &impl KeyValueRepository) -> StoreResult<Vec<Task>> {
    let raw = match repo.read_slot(TASKS_SLOT_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => return Ok(Vec::new()),
        Err(err) => {
            error!("event=store_load module=store status=error reason=read_failed error={err}");
            return Err(StoreError::Load(err));
        }
    };

    let decoded = match serde_json::from_str::<Vec<Task>>(raw.as_str()) {
        Ok(tasks) => tasks,
        Err(err) => {
            warn!(
                "event=store_load module=store status=degraded reason=parse_failed bytes={} error={}",
                raw.len(),
                err
            );
            return Ok(Vec::new());
        }
    };

    let mut seen = HashSet::new();
    let total = decoded.len();
    let tasks = decoded
        .into_iter()
        .filter(|task| seen.insert(task.id.clone()))
        .collect::<Vec<_>>();
    if tasks.len() != total {
        warn!(
            "event=store_load module=store status=degraded reason=duplicate_ids dropped={}",
            total - tasks.len()
        );
    }
    Ok(tasks)
}

#[cfg(test)]
mod tests {
    use super::{StoreError, TaskStore, TASKS_SLOT_KEY};
    use crate::model::category::CategoryRegistry;
    use crate::model::draft::{TaskDraft, ValidatedDraft};
    use crate::model::task::TaskStatus;
    use crate::repo::kv_repo::{
        KeyValueRepository, MemoryKvRepository, RepoError, RepoResult,
    };
    use crate::service::clock::{Clock, FixedClock};
    use crate::service::id_gen::SequentialIdGenerator;
    use chrono::{TimeZone, Utc};

    /// Reads from a shared map but can be told to fail writes.
    struct FlakyRepo {
        inner: MemoryKvRepository,
        fail_writes: bool,
    }

    impl KeyValueRepository for FlakyRepo {
        fn read_slot(&self, key: &str) -> RepoResult<Option<String>> {
            self.inner.read_slot(key)
        }

        fn write_slot(&mut self, key: &str, value: &str) -> RepoResult<()> {
            if self.fail_writes {
                return Err(RepoError::InvalidKey(format!("{key} (write disabled)")));
            }
            self.inner.write_slot(key, value)
        }
    }

    fn clock() -> FixedClock {
        FixedClock::new(Utc.with_ymd_and_hms(2026, 5, 20, 9, 0, 0).unwrap())
    }

    fn flaky_store(
        fail_writes: bool,
    ) -> TaskStore<FlakyRepo, SequentialIdGenerator, FixedClock> {
        let repo = FlakyRepo {
            inner: MemoryKvRepository::new(),
            fail_writes,
        };
        TaskStore::load_with(repo, SequentialIdGenerator::default(), clock())
            .expect("load flaky store")
    }

    fn admitted(title: &str) -> ValidatedDraft {
        TaskDraft::new(title, "work")
            .admit(&CategoryRegistry::builtin(), clock().today())
            .expect("draft should admit")
    }

    #[test]
    fn failed_create_leaves_list_untouched() {
        let mut store = flaky_store(true);
        let err = store.create(admitted("a")).expect_err("write should fail");
        assert!(matches!(err, StoreError::Persistence(_)));
        assert!(store.is_empty());
    }

    #[test]
    fn failed_status_write_restores_previous_state() {
        let mut store = flaky_store(false);
        let task = store.create(admitted("a")).expect("create task");
        store.repo.fail_writes = true;

        store
            .set_status(&task.id, TaskStatus::Completed)
            .expect_err("write should fail");
        let current = store.get(&task.id).expect("task still present");
        assert_eq!(current.status, TaskStatus::Pending);
        assert_eq!(current.updated_at, task.updated_at);
    }

    #[test]
    fn failed_remove_reinserts_at_same_position() {
        let mut store = flaky_store(false);
        let first = store.create(admitted("a")).expect("create a");
        let second = store.create(admitted("b")).expect("create b");
        store.repo.fail_writes = true;

        store.remove(&first.id).expect_err("write should fail");
        let ids = store.tasks().iter().map(|t| t.id.as_str()).collect::<Vec<_>>();
        assert_eq!(ids, vec![first.id.as_str(), second.id.as_str()]);
    }

    #[test]
    fn fresh_ids_skip_ids_loaded_from_storage() {
        let repo = MemoryKvRepository::new();
        {
            let mut first_session = TaskStore::load_with(
                repo.clone(),
                SequentialIdGenerator::default(),
                clock(),
            )
            .expect("load first session");
            first_session.create(admitted("a")).expect("create a");
        }

        let mut second_session =
            TaskStore::load_with(repo, SequentialIdGenerator::default(), clock())
                .expect("load second session");
        let task = second_session.create(admitted("b")).expect("create b");
        assert_eq!(task.id, "task-2");
    }

    #[test]
    fn duplicate_ids_in_storage_keep_first_entry() {
        let mut repo = MemoryKvRepository::new();
        let raw = r#"[
            {"id":"1","title":"first","categoryId":"work","createdAt":"2026-01-01T00:00:00Z","updatedAt":"2026-01-01T00:00:00Z"},
            {"id":"1","title":"again","categoryId":"home","createdAt":"2026-01-01T00:00:00Z","updatedAt":"2026-01-01T00:00:00Z"}
        ]"#;
        repo.write_slot(TASKS_SLOT_KEY, raw).expect("seed slot");

        let store = TaskStore::load_with(repo, SequentialIdGenerator::default(), clock())
            .expect("load store");
        assert_eq!(store.len(), 1);
        assert_eq!(store.tasks()[0].title, "first");
    }
}
