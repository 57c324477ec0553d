use anyhow::{anyhow, Result};
#[cfg(test)]
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use crate::quote::Quote;

/// Store entry holding the serialized quote collection.
pub const QUOTES_KEY: &str = "quotes";
/// Store entry holding the last selected category filter.
pub const FILTER_KEY: &str = "selected_category";

/// Narrow key-value persistence interface the app writes through.
///
/// Two entries exist: the quote snapshot and the selected category. Every
/// repository mutation is followed by a `set` before the next await point.
pub trait KeyValueStore: Send {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
}

/// File-backed store: one file per key under a directory.
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Open the store under `<config_dir>/quotebook/store`.
    pub fn open_default() -> Result<Self> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow!("Could not determine config directory"))?;
        Self::open(config_dir.join("quotebook").join("store"))
    }

    pub fn open(dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(key)
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(fs::read_to_string(&path)?))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        fs::write(self.path_for(key), value)?;
        Ok(())
    }
}

/// In-memory store used by tests.
#[cfg(test)]
#[derive(Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

#[cfg(test)]
impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(test)]
impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Read the persisted quote snapshot, if any.
pub fn load_quotes(store: &dyn KeyValueStore) -> Result<Option<Vec<Quote>>> {
    match store.get(QUOTES_KEY)? {
        Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
        None => Ok(None),
    }
}

/// Write the quote snapshot as pretty-printed JSON.
pub fn save_quotes(store: &mut dyn KeyValueStore, quotes: &[Quote]) -> Result<()> {
    let snapshot = serde_json::to_string_pretty(quotes)?;
    store.set(QUOTES_KEY, &snapshot)
}

/// Read the persisted category selection, if any.
pub fn load_filter(store: &dyn KeyValueStore) -> Result<Option<String>> {
    store.get(FILTER_KEY)
}

/// Persist the category selection as plain text.
pub fn save_filter(store: &mut dyn KeyValueStore, category: &str) -> Result<()> {
    store.set(FILTER_KEY, category)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quote::QuoteBook;
    use tempfile::TempDir;

    #[test]
    fn test_file_store_round_trip() {
        let dir = TempDir::new().unwrap();
        let mut store = FileStore::open(dir.path().join("store")).unwrap();

        store.set("greeting", "hello").unwrap();

        assert_eq!(store.get("greeting").unwrap(), Some("hello".to_string()));
    }

    #[test]
    fn test_file_store_absent_key_reads_none() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::open(dir.path().join("store")).unwrap();

        assert_eq!(store.get("missing").unwrap(), None);
    }

    #[test]
    fn test_quotes_snapshot_round_trip() {
        let mut store = MemoryStore::new();
        let book = QuoteBook::seeded();

        save_quotes(&mut store, book.all()).unwrap();
        let restored = load_quotes(&store).unwrap().unwrap();

        assert_eq!(restored, book.all());
    }

    #[test]
    fn test_quotes_snapshot_is_indented_json() {
        let mut store = MemoryStore::new();
        save_quotes(&mut store, QuoteBook::seeded().all()).unwrap();

        let raw = store.get(QUOTES_KEY).unwrap().unwrap();
        assert!(raw.starts_with("[\n"));
        assert!(raw.contains("\"category\": \"Motivation\""));
    }

    #[test]
    fn test_filter_round_trip() {
        let mut store = MemoryStore::new();

        assert_eq!(load_filter(&store).unwrap(), None);

        save_filter(&mut store, "Success").unwrap();
        assert_eq!(load_filter(&store).unwrap(), Some("Success".to_string()));
    }
}
