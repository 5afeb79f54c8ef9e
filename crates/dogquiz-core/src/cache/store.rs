use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use anyhow::{Context, Result};
use serde_json::{Map, Value};
use tracing::{debug, warn};

/// A small namespaced key-value store persisted as a single JSON object.
///
/// Values live in memory and every `Editor::apply` rewrites
/// `<dir>/<namespace>.json` in full. A missing or unreadable file opens as an
/// empty store.
pub struct PrefsStore {
    path: PathBuf,
    values: Mutex<Map<String, Value>>,
}

impl PrefsStore {
    pub fn open(dir: &Path, namespace: &str) -> Result<Self> {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create cache directory: {}", dir.display()))?;

        let path = dir.join(format!("{}.json", namespace));
        let values = Self::read_file(&path);
        Ok(Self {
            path,
            values: Mutex::new(values),
        })
    }

    fn read_file(path: &Path) -> Map<String, Value> {
        let contents = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(_) => return Map::new(),
        };

        match serde_json::from_str::<Map<String, Value>>(&contents) {
            Ok(map) => map,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Discarding unreadable preferences file");
                Map::new()
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, Map<String, Value>> {
        self.values.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get_string(&self, key: &str) -> Option<String> {
        self.lock().get(key).and_then(Value::as_str).map(str::to_string)
    }

    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.lock().get(key).and_then(Value::as_i64)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.lock().contains_key(key)
    }

    /// Start a batch of changes that is written out by `Editor::apply`
    pub fn edit(&self) -> Editor<'_> {
        Editor {
            store: self,
            changes: Vec::new(),
        }
    }
}

pub struct Editor<'a> {
    store: &'a PrefsStore,
    changes: Vec<(String, Option<Value>)>,
}

impl Editor<'_> {
    pub fn put_string(mut self, key: &str, value: impl Into<String>) -> Self {
        self.changes.push((key.to_string(), Some(Value::String(value.into()))));
        self
    }

    pub fn put_i64(mut self, key: &str, value: i64) -> Self {
        self.changes.push((key.to_string(), Some(Value::from(value))));
        self
    }

    pub fn remove(mut self, key: &str) -> Self {
        self.changes.push((key.to_string(), None));
        self
    }

    /// Apply the batch in memory and persist the whole store
    pub fn apply(self) -> Result<()> {
        let store = self.store;
        let mut values = store.lock();
        for (key, value) in self.changes {
            match value {
                Some(v) => {
                    values.insert(key, v);
                }
                None => {
                    values.remove(&key);
                }
            }
        }

        let contents = serde_json::to_string_pretty(&*values)?;
        std::fs::write(&store.path, contents)
            .with_context(|| format!("Failed to write {}", store.path.display()))?;
        debug!(path = %store.path.display(), keys = values.len(), "Preferences saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_get_and_reopen() {
        let dir = tempfile::tempdir().unwrap();
        {
            let store = PrefsStore::open(dir.path(), "prefs").unwrap();
            store
                .edit()
                .put_string("greeting", "woof")
                .put_i64("count", 42)
                .apply()
                .unwrap();
            assert_eq!(store.get_string("greeting").as_deref(), Some("woof"));
        }

        let reopened = PrefsStore::open(dir.path(), "prefs").unwrap();
        assert_eq!(reopened.get_string("greeting").as_deref(), Some("woof"));
        assert_eq!(reopened.get_i64("count"), Some(42));
        assert!(reopened.path().ends_with("prefs.json"));
    }

    #[test]
    fn test_remove_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = PrefsStore::open(dir.path(), "prefs").unwrap();
        store.edit().put_i64("a", 1).put_i64("b", 2).apply().unwrap();
        store.edit().remove("a").apply().unwrap();

        assert!(!store.contains("a"));
        assert_eq!(store.get_i64("b"), Some(2));
    }

    #[test]
    fn test_type_mismatch_reads_as_absent() {
        let dir = tempfile::tempdir().unwrap();
        let store = PrefsStore::open(dir.path(), "prefs").unwrap();
        store.edit().put_string("n", "not a number").apply().unwrap();

        assert_eq!(store.get_i64("n"), None);
        assert_eq!(store.get_string("missing"), None);
    }

    #[test]
    fn test_corrupt_file_opens_empty() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("prefs.json"), "{ not json").unwrap();

        let store = PrefsStore::open(dir.path(), "prefs").unwrap();
        assert!(!store.contains("anything"));
        store.edit().put_i64("fresh", 1).apply().unwrap();
        assert_eq!(store.get_i64("fresh"), Some(1));
    }
}
