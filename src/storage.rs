//! History persistence
//!
//! The whole history is stored as one JSON array under a fixed key and is overwritten on
//! every save. A missing key loads as an empty history.

use crate::{Result, Transaction};
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Key the history is stored under
pub const DEFAULT_STORAGE_KEY: &str = "paymentTransactions";

/// Persistence collaborator for the transaction history
pub trait HistoryStore {
    /// Load the stored history, newest first. Missing data loads as empty.
    fn load(&self) -> Result<Vec<Transaction>>;

    /// Overwrite the stored history
    fn save(&mut self, transactions: &[Transaction]) -> Result<()>;
}

/// In-process key-value store holding serialized JSON, like browser local storage
#[derive(Debug, Clone)]
pub struct MemoryStore {
    key: String,
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::with_key(DEFAULT_STORAGE_KEY)
    }

    pub fn with_key(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            entries: HashMap::new(),
        }
    }

    /// Raw stored value for a key
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Store a raw value under a key
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl HistoryStore for MemoryStore {
    fn load(&self) -> Result<Vec<Transaction>> {
        match self.get(&self.key) {
            Some(raw) => Ok(serde_json::from_str(raw)?),
            None => Ok(Vec::new()),
        }
    }

    fn save(&mut self, transactions: &[Transaction]) -> Result<()> {
        let raw = serde_json::to_string(transactions)?;
        debug!(key = %self.key, count = transactions.len(), "Saved history");
        let key = self.key.clone();
        self.set(key, raw);
        Ok(())
    }
}

/// JSON file store: one `<key>.json` file inside a directory
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self::with_key(dir, DEFAULT_STORAGE_KEY)
    }

    pub fn with_key(dir: impl AsRef<Path>, key: &str) -> Self {
        Self {
            path: dir.as_ref().join(format!("{key}.json")),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl HistoryStore for FileStore {
    fn load(&self) -> Result<Vec<Transaction>> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "No stored history");
                return Ok(Vec::new());
            }
            Err(e) => return Err(e.into()),
        };
        let transactions: Vec<Transaction> = serde_json::from_str(&raw)?;
        debug!(path = %self.path.display(), count = transactions.len(), "Loaded history");
        Ok(transactions)
    }

    fn save(&mut self, transactions: &[Transaction]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_string_pretty(transactions)?)?;
        debug!(path = %self.path.display(), count = transactions.len(), "Saved history");
        Ok(())
    }
}
