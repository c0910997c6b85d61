use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, warn};

use crate::error::{Error, Result};

/// Storage slot key for the recent-search list.
pub const RECENT_SEARCHES_KEY: &str = "recent_news_searches";

/// Maximum number of recent searches retained.
pub const MAX_RECENT_SEARCHES: usize = 5;

/// Durable key-value slot contract backing the recent-search store.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

/// In-memory store for tests and ephemeral sessions.
#[derive(Clone, Default)]
pub struct MemoryStore {
    slots: Arc<RwLock<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.slots.read().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.slots.write().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.slots.write().remove(key);
        Ok(())
    }
}

/// File-backed store: one small file per slot under a base directory.
#[derive(Clone)]
pub struct FileStore {
    base_dir: PathBuf,
}

impl FileStore {
    pub fn new(base_dir: PathBuf) -> Result<Self> {
        std::fs::create_dir_all(&base_dir)?;
        Ok(Self { base_dir })
    }

    /// Store rooted at the user data directory.
    pub fn user_data() -> Result<Self> {
        let dir = dirs::data_dir()
            .map(|dir| dir.join("newsdesk"))
            .ok_or_else(|| Error::Storage("Could not determine data directory".to_string()))?;
        Self::new(dir)
    }

    fn slot_path(&self, key: &str) -> PathBuf {
        self.base_dir.join(format!("{}.json", key))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        std::fs::read_to_string(self.slot_path(key)).ok()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        std::fs::write(self.slot_path(key), value)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        match std::fs::remove_file(self.slot_path(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Bounded, deduplicated, most-recent-first list of past search terms.
///
/// Persisted to the backing store on every mutation. An absent or corrupt
/// slot reads back as the empty list.
pub struct RecentSearches<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> RecentSearches<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Insert a query at the front, dropping any case-insensitive
    /// duplicate and truncating to [`MAX_RECENT_SEARCHES`]. Blank queries
    /// are ignored.
    pub fn save(&self, query: &str) -> Result<()> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(());
        }

        let existing = self.list();
        let lowered = query.to_lowercase();

        let mut updated: Vec<String> = Vec::with_capacity(MAX_RECENT_SEARCHES);
        updated.push(query.to_string());
        updated.extend(
            existing
                .into_iter()
                .filter(|s| s.to_lowercase() != lowered),
        );
        updated.truncate(MAX_RECENT_SEARCHES);

        let encoded = serde_json::to_string(&updated)?;
        self.store.set(RECENT_SEARCHES_KEY, &encoded)?;
        debug!("Saved recent search: {}", query);
        Ok(())
    }

    /// All stored queries, most recent first. Degrades to empty on a
    /// missing or unparseable slot.
    pub fn list(&self) -> Vec<String> {
        match self.store.get(RECENT_SEARCHES_KEY) {
            Some(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                warn!("Recent searches slot is corrupt, treating as empty: {}", e);
                Vec::new()
            }),
            None => Vec::new(),
        }
    }

    pub fn clear_all(&self) -> Result<()> {
        self.store.remove(RECENT_SEARCHES_KEY)
    }
}
