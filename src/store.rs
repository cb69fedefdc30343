// Whole-collection persistence under one fixed storage key

use crate::storage::Storage;
use crate::task::Task;
use eyre::{Context, Result};
use tracing::{debug, info, warn};

/// The single slot every task list is written to
pub const STORAGE_KEY: &str = "todos";

/// Reads and writes the full task collection as one JSON array.
///
/// There is no versioning and no incremental write: every `save` replaces the
/// slot wholesale.
pub struct PersistenceStore<S: Storage> {
    storage: S,
}

impl<S: Storage> PersistenceStore<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    /// Load the stored collection.
    ///
    /// An absent, empty, unreadable or undecodable slot yields an empty list.
    /// No error is returned for any of these.
    pub fn load(&self) -> Vec<Task> {
        let blob = match self.storage.get_item(STORAGE_KEY) {
            Ok(Some(blob)) => blob,
            Ok(None) => {
                debug!(key = STORAGE_KEY, "No stored tasks, starting empty");
                return Vec::new();
            }
            Err(e) => {
                warn!(key = STORAGE_KEY, error = ?e, "Failed to read stored tasks, starting empty");
                return Vec::new();
            }
        };

        if blob.trim().is_empty() {
            return Vec::new();
        }

        // JSON `null` is what an explicitly cleared slot looks like
        match serde_json::from_str::<Option<Vec<Task>>>(&blob) {
            Ok(tasks) => {
                let tasks = tasks.unwrap_or_default();
                info!(key = STORAGE_KEY, count = tasks.len(), "Loaded tasks");
                tasks
            }
            Err(e) => {
                warn!(key = STORAGE_KEY, error = ?e, "Failed to parse stored tasks, starting empty");
                Vec::new()
            }
        }
    }

    /// Encode the given tasks and overwrite the slot
    pub fn save(&mut self, tasks: &[Task]) -> Result<()> {
        let blob = serde_json::to_string(tasks).context("Failed to serialize tasks")?;
        self.storage
            .set_item(STORAGE_KEY, &blob)
            .context("Failed to write tasks to storage")?;
        debug!(key = STORAGE_KEY, count = tasks.len(), "Saved tasks");
        Ok(())
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    pub fn into_inner(self) -> S {
        self.storage
    }
}
