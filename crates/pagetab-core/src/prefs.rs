use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::PersistenceError;

/// One namespace of the preference tree: string values plus named children.
/// Both keep insertion order so bookmark groups reload in the order they were
/// added.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreferenceNode {
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub values: IndexMap<String, String>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub children: IndexMap<String, PreferenceNode>,
}

impl PreferenceNode {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn put(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    /// Remove `key`, keeping the order of the remaining values.
    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.values.shift_remove(key)
    }

    pub fn child(&self, name: &str) -> Option<&PreferenceNode> {
        self.children.get(name)
    }

    /// Child namespace `name`, created empty if absent.
    pub fn child_mut(&mut self, name: &str) -> &mut PreferenceNode {
        self.children.entry(name.to_string()).or_default()
    }
}

/// Preference tree persisted as pretty JSON.
///
/// Mutations stay in memory until [`PreferencesStore::flush`], which the
/// session calls once at shutdown.
#[derive(Debug)]
pub struct PreferencesStore {
    path: Option<PathBuf>,
    root: PreferenceNode,
    dirty: bool,
}

impl PreferencesStore {
    /// Load the store at `path`. A missing file is an empty store; an
    /// unreadable or malformed one is an error.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, PersistenceError> {
        let path = path.as_ref().to_path_buf();
        let root = match fs::read_to_string(&path) {
            Ok(contents) => serde_json::from_str(&contents).map_err(|source| {
                PersistenceError::Parse {
                    path: path.clone(),
                    source,
                }
            })?,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "no preferences file yet");
                PreferenceNode::default()
            }
            Err(source) => {
                return Err(PersistenceError::Read {
                    path: path.clone(),
                    source,
                })
            }
        };
        Ok(Self {
            path: Some(path),
            root,
            dirty: false,
        })
    }

    /// A store that is never written anywhere.
    pub fn in_memory() -> Self {
        Self {
            path: None,
            root: PreferenceNode::default(),
            dirty: false,
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn root(&self) -> &PreferenceNode {
        &self.root
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.root.get(key)
    }

    pub fn put(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.root.put(key, value);
        self.dirty = true;
    }

    pub fn node(&self, name: &str) -> Option<&PreferenceNode> {
        self.root.child(name)
    }

    /// Mutable access to a child namespace. Marks the store dirty.
    pub fn node_mut(&mut self, name: &str) -> &mut PreferenceNode {
        self.dirty = true;
        self.root.child_mut(name)
    }

    /// Write the tree to disk if anything changed since the last flush.
    pub fn flush(&mut self) -> Result<(), PersistenceError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if !self.dirty {
            return Ok(());
        }
        let json = serde_json::to_string_pretty(&self.root)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| PersistenceError::Write {
                path: path.clone(),
                source,
            })?;
        }
        fs::write(path, json).map_err(|source| PersistenceError::Write {
            path: path.clone(),
            source,
        })?;
        self.dirty = false;
        info!(path = %path.display(), "preferences saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_empty_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = PreferencesStore::open(dir.path().join("preferences.json")).unwrap();
        assert_eq!(store.root(), &PreferenceNode::default());
        assert!(!store.is_dirty());
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("preferences.json");
        fs::write(&path, "{ not json").unwrap();
        let err = PreferencesStore::open(&path).unwrap_err();
        assert!(matches!(err, PersistenceError::Parse { .. }));
    }

    #[test]
    fn test_flush_and_reload_keeps_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("preferences.json");

        let mut store = PreferencesStore::open(&path).unwrap();
        store.put("quickSearch", "http://a.com/q=");
        let group = store.node_mut("bookmarksA");
        group.put("http://z.com", "Z");
        group.put("http://a.com", "A");
        group.put("http://m.com", "M");
        group.remove("http://a.com");
        store.flush().unwrap();
        assert!(!store.is_dirty());

        let reloaded = PreferencesStore::open(&path).unwrap();
        assert_eq!(reloaded.get("quickSearch"), Some("http://a.com/q="));
        let keys: Vec<&String> = reloaded.node("bookmarksA").unwrap().values.keys().collect();
        assert_eq!(keys, vec!["http://z.com", "http://m.com"]);
    }

    #[test]
    fn test_in_memory_flush_is_noop() {
        let mut store = PreferencesStore::in_memory();
        store.put("k", "v");
        store.flush().unwrap();
        assert_eq!(store.path(), None);
        assert_eq!(store.get("k"), Some("v"));
    }
}
