use crate::error::StorageError;
use crate::storage::KeyValueStorage;
use crate::task::{Task, TaskDraft, TaskId, TaskPatch, TaskStatus};
use chrono::Utc;

pub const DEFAULT_STORAGE_KEY: &str = "tasks";

/// Owns the task list and writes it through to storage after every change.
#[derive(Debug)]
pub struct TaskStore<S> {
    tasks: Vec<Task>,
    storage: S,
    key: String,
}

impl<S: KeyValueStorage> TaskStore<S> {
    /// An empty store; call [`TaskStore::load`] to pick up persisted tasks.
    pub fn new(storage: S) -> Self {
        Self::with_key(storage, DEFAULT_STORAGE_KEY)
    }

    pub fn with_key(storage: S, key: impl Into<String>) -> Self {
        Self {
            tasks: Vec::new(),
            storage,
            key: key.into(),
        }
    }

    pub fn open(storage: S, key: impl Into<String>) -> Self {
        let mut store = Self::with_key(storage, key);
        store.load();
        store
    }

    /// Replaces the in-memory list with the persisted one. Missing or
    /// unreadable data leaves the board empty.
    pub fn load(&mut self) {
        self.tasks = match self.read() {
            Ok(Some(tasks)) => {
                tracing::info!(count = tasks.len(), key = %self.key, "loaded tasks");
                tasks
            }
            Ok(None) => {
                tracing::debug!(key = %self.key, "no stored tasks, starting empty");
                Vec::new()
            }
            Err(err) => {
                tracing::warn!(key = %self.key, error = %err, "failed to load tasks, starting empty");
                Vec::new()
            }
        };
    }

    fn read(&self) -> Result<Option<Vec<Task>>, StorageError> {
        match self.storage.get(&self.key)? {
            Some(data) => Ok(Some(serde_json::from_str(&data)?)),
            None => Ok(None),
        }
    }

    fn save(&mut self) {
        let result = serde_json::to_string(&self.tasks)
            .map_err(StorageError::from)
            .and_then(|data| self.storage.set(&self.key, &data));
        match result {
            Ok(()) => tracing::trace!(count = self.tasks.len(), "saved tasks"),
            // Memory stays authoritative; the next successful write reconciles.
            Err(err) => tracing::error!(key = %self.key, error = %err, "failed to save tasks"),
        }
    }

    fn next_id(&self) -> TaskId {
        let mut candidate = Utc::now().timestamp_millis();
        while self.position(&candidate.to_string()).is_some() {
            candidate += 1;
        }
        candidate.to_string()
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.tasks.iter().position(|t| t.id == id)
    }

    /// Appends a new backlog task. Blank titles are ignored.
    pub fn create(&mut self, draft: TaskDraft) -> Option<TaskId> {
        if draft.title.trim().is_empty() {
            tracing::debug!("ignoring task with blank title");
            return None;
        }
        let task = Task {
            id: self.next_id(),
            title: draft.title,
            description: draft.description,
            duration: draft.duration,
            status: TaskStatus::Backlog,
        };
        tracing::info!(id = %task.id, title = %task.title, "created task");
        let id = task.id.clone();
        self.tasks.push(task);
        self.save();
        Some(id)
    }

    pub fn update(&mut self, id: &str, patch: TaskPatch) -> bool {
        if patch.title.as_deref().is_some_and(|t| t.trim().is_empty()) {
            tracing::debug!(id, "ignoring update with blank title");
            return false;
        }
        let Some(index) = self.position(id) else {
            return false;
        };
        self.tasks[index].apply(patch);
        tracing::info!(id, "updated task");
        self.save();
        true
    }

    pub fn delete(&mut self, id: &str) -> bool {
        let Some(index) = self.position(id) else {
            return false;
        };
        let task = self.tasks.remove(index);
        tracing::info!(id, title = %task.title, "deleted task");
        self.save();
        true
    }

    /// Moves a task to `status`. Returns `false` (and writes nothing) when
    /// the task is missing or already there.
    pub fn set_status(&mut self, id: &str, status: TaskStatus) -> bool {
        let Some(index) = self.position(id) else {
            return false;
        };
        let task = &mut self.tasks[index];
        if task.status == status {
            return false;
        }
        tracing::info!(id, from = %task.status, to = %status, "moved task");
        task.status = status;
        self.save();
        true
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn tasks_by_status(&self, status: TaskStatus) -> Vec<&Task> {
        self.tasks.iter().filter(|t| t.status == status).collect()
    }

    pub fn count(&self, status: TaskStatus) -> usize {
        self.tasks.iter().filter(|t| t.status == status).count()
    }

    /// One bucket per column in board order, each keeping list order.
    pub fn columns(&self) -> [Vec<&Task>; TaskStatus::COUNT] {
        std::array::from_fn(|i| self.tasks_by_status(TaskStatus::from_index(i)))
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }
}
