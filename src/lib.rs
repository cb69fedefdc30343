// todolist - Todo list with deadlines, persisted to a single local key-value slot

pub mod config;
pub mod filter;
pub mod format;
pub mod model;
pub mod sqlite;
pub mod storage;
pub mod store;
pub mod task;

// Re-export main types for convenience
pub use config::{Backend, Config};
pub use filter::Filter;
pub use format::{format_duration, format_time, status_text};
pub use model::TaskList;
pub use sqlite::SqliteStorage;
pub use storage::{FileStorage, MemoryStorage, Storage};
pub use store::{PersistenceStore, STORAGE_KEY};
pub use task::{Task, now_ms, parse_deadline};
