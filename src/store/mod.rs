use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result, anyhow};
use rusqlite::{Connection, params};
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::types::{TaskIdGenerator, TaskRecord, onboarding_tasks};

pub const TASKS_KEY: &str = "tasks";
pub const THEME_KEY: &str = "isDarkMode";

pub fn default_store_path() -> Result<PathBuf> {
    let data_dir =
        dirs::data_local_dir().ok_or_else(|| anyhow!("failed to determine local data directory"))?;
    Ok(data_dir.join("taskpulse").join("taskpulse.sqlite"))
}

/// Key-value persistence, one sqlite table. Values are JSON strings; the
/// store itself never interprets them beyond the initial load.
pub struct TaskStore {
    conn: Connection,
}

impl TaskStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path_ref = path.as_ref();

        if path_ref != Path::new(":memory:")
            && let Some(parent) = path_ref.parent()
        {
            fs::create_dir_all(parent).with_context(|| {
                format!(
                    "failed to create parent directories for {}",
                    path_ref.display()
                )
            })?;
        }

        let conn = Connection::open(path_ref)
            .with_context(|| format!("failed to open kv store at {}", path_ref.display()))?;

        let store = Self { conn };
        store.run_migrations()?;
        Ok(store)
    }

    fn run_migrations(&self) -> Result<()> {
        self.conn
            .execute_batch(
                "CREATE TABLE IF NOT EXISTS kv (
                    key TEXT PRIMARY KEY,
                    value TEXT NOT NULL
                );",
            )
            .context("failed to run kv store migrations")?;
        Ok(())
    }

    pub fn get(&self, key: &str) -> Result<Option<String>> {
        self.conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get(0)
            })
            .map(Some)
            .or_else(|err| {
                if matches!(err, rusqlite::Error::QueryReturnedNoRows) {
                    Ok(None)
                } else {
                    Err(err)
                }
            })
            .with_context(|| format!("failed to read kv key '{key}'"))
    }

    pub fn set(&self, key: &str, value: &str) -> Result<()> {
        self.conn
            .execute(
                "INSERT INTO kv (key, value) VALUES (?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value",
                params![key, value],
            )
            .with_context(|| format!("failed to write kv key '{key}'"))?;
        Ok(())
    }

    /// Startup read of both persisted values. A missing task list seeds the
    /// onboarding tasks; an unreadable or unparseable one falls back to an
    /// empty list instead. The theme flag stays `None` unless a valid saved
    /// value exists, so the caller can fall through to other sources.
    pub fn load_initial(&self, ids: &mut TaskIdGenerator) -> InitialState {
        let mut seeded = false;
        let tasks = match self.get(TASKS_KEY) {
            Ok(Some(raw)) => match serde_json::from_str::<Vec<TaskRecord>>(&raw) {
                Ok(tasks) => tasks,
                Err(error) => {
                    warn!("failed to parse stored tasks, starting empty: {error}");
                    Vec::new()
                }
            },
            Ok(None) => {
                seeded = true;
                onboarding_tasks(ids)
            }
            Err(error) => {
                warn!("failed to read stored tasks, starting empty: {error:#}");
                Vec::new()
            }
        };
        for task in &tasks {
            ids.observe(task.id);
        }

        let dark_mode = match self.get(THEME_KEY) {
            Ok(Some(raw)) => match serde_json::from_str::<bool>(&raw) {
                Ok(dark) => Some(dark),
                Err(error) => {
                    warn!("failed to parse stored theme flag: {error}");
                    None
                }
            },
            Ok(None) => None,
            Err(error) => {
                warn!("failed to read stored theme flag: {error:#}");
                None
            }
        };

        InitialState {
            tasks,
            dark_mode,
            seeded,
        }
    }
}

#[derive(Debug, Clone)]
pub struct InitialState {
    pub tasks: Vec<TaskRecord>,
    pub dark_mode: Option<bool>,
    /// True when this launch invented the onboarding tasks instead of reading
    /// a saved list; only such a seed needs an immediate write-through.
    pub seeded: bool,
}

#[derive(Debug, Default)]
struct PendingWrites {
    tasks: Option<String>,
    dark_mode: Option<String>,
    shutdown: bool,
}

/// Fire-and-forget write-through. Each slot holds at most the latest
/// serialized snapshot; a newer enqueue replaces an unwritten older one, so
/// the store always converges on the last dispatched state. Write failures
/// are logged and dropped.
pub struct StoreWriter {
    pending: Arc<Mutex<PendingWrites>>,
    notify: Arc<Notify>,
    handle: Option<JoinHandle<()>>,
}

impl StoreWriter {
    /// Moves the store into a background task. Must be called from within a
    /// tokio runtime.
    pub fn spawn(store: TaskStore) -> Self {
        let pending = Arc::new(Mutex::new(PendingWrites::default()));
        let notify = Arc::new(Notify::new());
        let handle = tokio::spawn(run_writer(
            store,
            Arc::clone(&pending),
            Arc::clone(&notify),
        ));
        Self {
            pending,
            notify,
            handle: Some(handle),
        }
    }

    pub fn enqueue_tasks(&self, tasks: &[TaskRecord]) {
        match serde_json::to_string(tasks) {
            Ok(json) => self.fill_slot(|slots| slots.tasks = Some(json)),
            Err(error) => warn!("failed to serialize tasks for persistence: {error}"),
        }
    }

    pub fn enqueue_theme(&self, dark_mode: bool) {
        match serde_json::to_string(&dark_mode) {
            Ok(json) => self.fill_slot(|slots| slots.dark_mode = Some(json)),
            Err(error) => warn!("failed to serialize theme flag for persistence: {error}"),
        }
    }

    fn fill_slot(&self, fill: impl FnOnce(&mut PendingWrites)) {
        match self.pending.lock() {
            Ok(mut slots) => fill(&mut slots),
            Err(error) => {
                warn!("pending write slot lock poisoned, dropping write: {error}");
                return;
            }
        }
        self.notify.notify_one();
    }

    /// Drains any queued snapshots, then stops the writer task.
    pub async fn shutdown(mut self) {
        if let Ok(mut slots) = self.pending.lock() {
            slots.shutdown = true;
        }
        self.notify.notify_one();
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }
}

async fn run_writer(store: TaskStore, pending: Arc<Mutex<PendingWrites>>, notify: Arc<Notify>) {
    loop {
        notify.notified().await;
        loop {
            let (tasks, dark_mode, shutdown) = {
                let Ok(mut slots) = pending.lock() else {
                    warn!("pending write slot lock poisoned, stopping writer");
                    return;
                };
                (slots.tasks.take(), slots.dark_mode.take(), slots.shutdown)
            };

            if tasks.is_none() && dark_mode.is_none() {
                if shutdown {
                    return;
                }
                break;
            }

            if let Some(json) = tasks {
                match store.set(TASKS_KEY, &json) {
                    Ok(()) => debug!("persisted task snapshot ({} bytes)", json.len()),
                    Err(error) => warn!("failed to persist tasks: {error:#}"),
                }
            }
            if let Some(json) = dark_mode {
                match store.set(THEME_KEY, &json) {
                    Ok(()) => debug!("persisted theme flag: {json}"),
                    Err(error) => warn!("failed to persist theme flag: {error:#}"),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_get_returns_none_for_missing_key() -> Result<()> {
        let store = TaskStore::open(":memory:")?;
        assert_eq!(store.get("absent")?, None);
        Ok(())
    }

    #[test]
    fn test_set_then_get_round_trips() -> Result<()> {
        let store = TaskStore::open(":memory:")?;
        store.set(TASKS_KEY, "[]")?;
        assert_eq!(store.get(TASKS_KEY)?.as_deref(), Some("[]"));

        store.set(TASKS_KEY, "[1]")?;
        assert_eq!(store.get(TASKS_KEY)?.as_deref(), Some("[1]"));
        Ok(())
    }

    #[test]
    fn test_open_creates_parent_directories() -> Result<()> {
        let temp = TempDir::new()?;
        let path = temp.path().join("nested").join("taskpulse.sqlite");
        let _store = TaskStore::open(&path)?;
        assert!(path.exists());
        Ok(())
    }

    #[test]
    fn test_load_initial_seeds_on_first_launch() -> Result<()> {
        let store = TaskStore::open(":memory:")?;
        let mut ids = TaskIdGenerator::default();
        let initial = store.load_initial(&mut ids);

        assert_eq!(initial.tasks.len(), 3);
        assert!(initial.tasks.iter().all(|task| !task.completed));
        assert_eq!(initial.dark_mode, None);
        assert!(initial.seeded);

        // ids issued after loading must not collide with the seeds
        let next = ids.next_id();
        assert!(initial.tasks.iter().all(|task| task.id < next));
        Ok(())
    }

    #[test]
    fn test_load_initial_prefers_saved_tasks() -> Result<()> {
        let store = TaskStore::open(":memory:")?;
        let saved = vec![TaskRecord {
            id: 42,
            text: "Saved".to_string(),
            completed: true,
        }];
        store.set(TASKS_KEY, &serde_json::to_string(&saved)?)?;
        store.set(THEME_KEY, "true")?;

        let mut ids = TaskIdGenerator::default();
        let initial = store.load_initial(&mut ids);
        assert_eq!(initial.tasks, saved);
        assert_eq!(initial.dark_mode, Some(true));
        assert!(!initial.seeded);
        Ok(())
    }

    #[test]
    fn test_load_initial_corrupt_tasks_fall_back_to_empty() -> Result<()> {
        let store = TaskStore::open(":memory:")?;
        store.set(TASKS_KEY, "{not json")?;
        store.set(THEME_KEY, "maybe")?;

        let mut ids = TaskIdGenerator::default();
        let initial = store.load_initial(&mut ids);
        assert!(initial.tasks.is_empty());
        assert_eq!(initial.dark_mode, None);
        assert!(!initial.seeded);
        Ok(())
    }

    #[tokio::test]
    async fn test_writer_persists_latest_snapshot() -> Result<()> {
        let temp = TempDir::new()?;
        let path = temp.path().join("taskpulse.sqlite");

        let writer = StoreWriter::spawn(TaskStore::open(&path)?);
        let first = vec![TaskRecord::new(1, "first")];
        let second = vec![TaskRecord::new(1, "first"), TaskRecord::new(2, "second")];
        writer.enqueue_tasks(&first);
        writer.enqueue_tasks(&second);
        writer.enqueue_theme(true);
        writer.shutdown().await;

        let store = TaskStore::open(&path)?;
        let raw = store.get(TASKS_KEY)?.expect("tasks should be persisted");
        let tasks: Vec<TaskRecord> = serde_json::from_str(&raw)?;
        assert_eq!(tasks, second);
        assert_eq!(store.get(THEME_KEY)?.as_deref(), Some("true"));
        Ok(())
    }

    #[tokio::test]
    async fn test_writer_shutdown_without_writes() -> Result<()> {
        let writer = StoreWriter::spawn(TaskStore::open(":memory:")?);
        writer.shutdown().await;
        Ok(())
    }
}
