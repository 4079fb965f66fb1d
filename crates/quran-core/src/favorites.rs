//! Favorite chapters persisted as one JSON value in a key-value store.

use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::Context;
use tracing::{debug, warn};

use crate::error::PlayerError;
use crate::model::{Chapter, Favorite};

/// Storage key the favorites array lives under.
pub const FAVORITES_KEY: &str = "quran-favorites";

/// Minimal string key-value persistence.
pub trait KeyValueStore: Send {
    fn get(&self, key: &str) -> anyhow::Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> anyhow::Result<()>;
    fn delete(&mut self, key: &str) -> anyhow::Result<()>;
}

/// One `<key>.json` file per key under a directory.
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let safe: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.dir.join(format!("{}.json", safe))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        let path = self.path_for(key);
        match std::fs::read_to_string(&path) {
            Ok(s) => Ok(Some(s)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("failed to read {}", path.display())),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("failed to create {}", self.dir.display()))?;
        let path = self.path_for(key);
        // replace atomically
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, value)?;
        std::fs::rename(&tmp, &path)
            .with_context(|| format!("failed to write {}", path.display()))?;
        Ok(())
    }

    fn delete(&mut self, key: &str) -> anyhow::Result<()> {
        match std::fs::remove_file(self.path_for(key)) {
            Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }
}

#[derive(Default)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn delete(&mut self, key: &str) -> anyhow::Result<()> {
        self.values.remove(key);
        Ok(())
    }
}

/// Ordered favorites backed by a store. Insertion order is display order.
pub struct Favorites<S: KeyValueStore> {
    store: S,
    items: Vec<Favorite>,
}

impl<S: KeyValueStore> Favorites<S> {
    /// Read favorites from `store`. Missing or unreadable data yields an
    /// empty list.
    pub fn load(store: S) -> Self {
        let items = match read_favorites(&store) {
            Ok(items) => items,
            Err(e) => {
                warn!("favorites: {}, starting empty", e);
                Vec::new()
            }
        };
        debug!("favorites: loaded {}", items.len());
        Self { store, items }
    }

    pub fn items(&self) -> &[Favorite] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn contains(&self, number: u16) -> bool {
        self.items.iter().any(|f| f.number == number)
    }

    /// Add `chapter` if absent, remove it if present. Returns whether it is
    /// a favorite afterwards. On a failed write nothing changes.
    pub fn toggle(&mut self, chapter: &Chapter) -> anyhow::Result<bool> {
        let mut next = self.items.clone();
        let now_favorite = if let Some(pos) = next.iter().position(|f| f.number == chapter.number) {
            next.remove(pos);
            false
        } else {
            next.push(Favorite::from(chapter));
            true
        };
        self.commit(next)?;
        Ok(now_favorite)
    }

    pub fn remove(&mut self, number: u16) -> anyhow::Result<bool> {
        if !self.contains(number) {
            return Ok(false);
        }
        let next = self.items.iter().filter(|f| f.number != number).cloned().collect();
        self.commit(next)?;
        Ok(true)
    }

    pub fn clear(&mut self) -> anyhow::Result<()> {
        self.store.delete(FAVORITES_KEY)?;
        self.items.clear();
        Ok(())
    }

    /// Write `next` to the store, then adopt it.
    fn commit(&mut self, next: Vec<Favorite>) -> anyhow::Result<()> {
        let json = serde_json::to_string(&next)?;
        self.store
            .set(FAVORITES_KEY, &json)
            .context("failed to save favorites")?;
        self.items = next;
        Ok(())
    }
}

fn read_favorites<S: KeyValueStore>(store: &S) -> Result<Vec<Favorite>, PlayerError> {
    let raw = store
        .get(FAVORITES_KEY)
        .map_err(|e| PlayerError::PersistenceCorrupt(format!("{:#}", e)))?;
    match raw {
        None => Ok(Vec::new()),
        Some(raw) => serde_json::from_str(&raw)
            .map_err(|e| PlayerError::PersistenceCorrupt(e.to_string())),
    }
}
