use std::fs::{self, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tracing::debug;
use crate::error::Result;
use crate::models::Dataset;

/// Where the application's records live between actions.
///
/// Implementations persist a whole [`Dataset`] snapshot; the facility layer
/// does the per-record create/list/update on top.
pub trait Repository {
    /// Loads every record. A store that has never been written loads empty.
    fn load(&self) -> Result<Dataset>;

    /// Replaces the stored records with `data`.
    fn save(&mut self, data: &Dataset) -> Result<()>;

    /// Removes every stored record without reading what is there.
    fn clear(&mut self) -> Result<()> {
        self.save(&Dataset::default())
    }
}

/// Records kept in a pretty-printed JSON file.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonFileStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Deletes the data file if it exists.
    pub fn delete(&self) -> Result<()> {
        if self.path.exists() {
            fs::remove_file(&self.path)?;
            debug!(path = %self.path.display(), "data file removed");
        }
        Ok(())
    }
}

impl Repository for JsonFileStore {
    fn load(&self) -> Result<Dataset> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "no data file yet");
            return Ok(Dataset::default());
        }
        let mut f = OpenOptions::new().read(true).open(&self.path)?;
        let mut s = String::new();
        f.read_to_string(&mut s)?;
        if s.trim().is_empty() {
            return Ok(Dataset::default());
        }
        let data = serde_json::from_str(&s)?;
        debug!(path = %self.path.display(), "data file loaded");
        Ok(data)
    }

    fn save(&mut self, data: &Dataset) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            if !dir.as_os_str().is_empty() && !dir.exists() {
                fs::create_dir_all(dir)?;
            }
        }
        let s = serde_json::to_string_pretty(data)?;
        let mut f = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&self.path)?;
        f.write_all(s.as_bytes())?;
        debug!(path = %self.path.display(), bytes = s.len(), "data file saved");
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        self.delete()
    }
}

/// Records held only for the life of the process.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    data: Dataset,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }

    pub fn with_data(data: Dataset) -> Self {
        MemoryStore { data }
    }
}

impl Repository for MemoryStore {
    fn load(&self) -> Result<Dataset> {
        Ok(self.data.clone())
    }

    fn save(&mut self, data: &Dataset) -> Result<()> {
        self.data = data.clone();
        Ok(())
    }
}
