// Configuration file and storage backend selection

use crate::filter::Filter;
use crate::sqlite::SqliteStorage;
use crate::storage::{FileStorage, Storage};
use eyre::{Context, Result, eyre};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

const APP_DIR_NAME: &str = "todolist";
const CONFIG_FILE_NAME: &str = "config.yaml";

/// Which storage facility holds the task slot
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// One JSON file per key
    #[default]
    File,
    /// A key-value table in a SQLite database
    Sqlite,
}

impl Backend {
    /// Open this backend rooted at `dir`
    pub fn open(self, dir: &Path) -> Result<Box<dyn Storage>> {
        debug!(backend = ?self, dir = ?dir, "Opening storage");
        let storage: Box<dyn Storage> = match self {
            Backend::File => Box::new(FileStorage::open(dir)?),
            Backend::Sqlite => Box::new(SqliteStorage::open(dir)?),
        };
        Ok(storage)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Directory holding the storage files; platform data dir when unset
    pub storage_dir: Option<PathBuf>,
    pub backend: Backend,
    pub default_filter: Filter,
}

impl Config {
    /// Load configuration.
    ///
    /// An explicit path must exist. Without one, the platform config file is
    /// read if present and defaults are used otherwise.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::from_file(path),
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::from_file(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).with_context(|| format!("Failed to read config file {:?}", path))?;
        let config = Self::from_yaml(&content).with_context(|| format!("Invalid config file {:?}", path))?;
        debug!(path = ?path, "Loaded config");
        Ok(config)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config = serde_yaml::from_str(content)?;
        Ok(config)
    }

    /// `{config_dir}/todolist/config.yaml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// Resolve the storage directory, falling back to `{data_dir}/todolist`
    pub fn storage_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = &self.storage_dir {
            return Ok(dir.clone());
        }
        dirs::data_dir()
            .map(|dir| dir.join(APP_DIR_NAME))
            .ok_or_else(|| eyre!("Could not determine a data directory; set storage_dir or pass --store-path"))
    }
}
