//! Local cache of parsed dataset rows.
//!
//! Entries never expire: a cached dataset masks later changes to its source
//! file until the entry is cleared explicitly.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Fixed key under which parsed building rows are cached.
pub const BUILDINGS_CACHE_KEY: &str = "campus.buildings.rows";

pub type CachedRow = BTreeMap<String, String>;

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub rows: Vec<CachedRow>,
    pub stored_at_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    StorageUnavailable,
    Corrupt(String),
    Io(String),
}

impl std::fmt::Display for CacheError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheError::StorageUnavailable => write!(f, "cache storage unavailable"),
            CacheError::Corrupt(msg) => write!(f, "cache entry corrupt: {msg}"),
            CacheError::Io(msg) => write!(f, "cache storage error: {msg}"),
        }
    }
}

impl std::error::Error for CacheError {}

pub trait RowCache {
    fn load(&self, key: &str) -> Result<Option<CacheEntry>, CacheError>;
    fn store(&mut self, key: &str, entry: &CacheEntry) -> Result<(), CacheError>;
    /// Returns `true` if an entry existed.
    fn clear(&mut self, key: &str) -> Result<bool, CacheError>;
}

fn decode(raw: &str) -> Result<Option<CacheEntry>, CacheError> {
    if raw.trim().is_empty() {
        return Ok(None);
    }
    let entry =
        serde_json::from_str::<CacheEntry>(raw).map_err(|e| CacheError::Corrupt(e.to_string()))?;
    Ok(Some(entry))
}

fn encode(entry: &CacheEntry) -> Result<String, CacheError> {
    serde_json::to_string(entry).map_err(|e| CacheError::Io(e.to_string()))
}

#[derive(Debug, Default)]
pub struct InMemoryRowCache {
    entries: BTreeMap<String, String>,
}

impl InMemoryRowCache {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RowCache for InMemoryRowCache {
    fn load(&self, key: &str) -> Result<Option<CacheEntry>, CacheError> {
        match self.entries.get(key) {
            Some(raw) => decode(raw),
            None => Ok(None),
        }
    }

    fn store(&mut self, key: &str, entry: &CacheEntry) -> Result<(), CacheError> {
        self.entries.insert(key.to_string(), encode(entry)?);
        Ok(())
    }

    fn clear(&mut self, key: &str) -> Result<bool, CacheError> {
        Ok(self.entries.remove(key).is_some())
    }
}

/// One JSON file per key under a directory.
#[derive(Debug)]
pub struct FileRowCache {
    root: PathBuf,
}

impl FileRowCache {
    pub fn new(root: impl AsRef<Path>) -> Result<Self, CacheError> {
        let root = root.as_ref().to_path_buf();
        std::fs::create_dir_all(&root)
            .map_err(|e| CacheError::Io(format!("create {}: {e}", root.display())))?;
        Ok(Self { root })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let file: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '.' || c == '-' { c } else { '_' })
            .collect();
        self.root.join(format!("{file}.json"))
    }
}

impl RowCache for FileRowCache {
    fn load(&self, key: &str) -> Result<Option<CacheEntry>, CacheError> {
        let path = self.path_for(key);
        match std::fs::read_to_string(&path) {
            Ok(raw) => decode(&raw),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(CacheError::Io(format!("read {}: {e}", path.display()))),
        }
    }

    fn store(&mut self, key: &str, entry: &CacheEntry) -> Result<(), CacheError> {
        let path = self.path_for(key);
        let raw = encode(entry)?;
        // Readers never observe a partially written entry.
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, raw)
            .map_err(|e| CacheError::Io(format!("write {}: {e}", tmp.display())))?;
        std::fs::rename(&tmp, &path)
            .map_err(|e| CacheError::Io(format!("rename {}: {e}", path.display())))?;
        tracing::debug!(key, rows = entry.rows.len(), "cached rows");
        Ok(())
    }

    fn clear(&mut self, key: &str) -> Result<bool, CacheError> {
        let path = self.path_for(key);
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(CacheError::Io(format!("remove {}: {e}", path.display()))),
        }
    }
}

#[cfg(target_arch = "wasm32")]
mod wasm_storage {
    use super::{CacheEntry, CacheError, RowCache, decode, encode};

    /// Browser `localStorage`, one item per key.
    #[derive(Debug, Default)]
    pub struct LocalStorageRowCache;

    impl LocalStorageRowCache {
        pub fn new() -> Result<Self, CacheError> {
            window_local_storage()?;
            Ok(Self)
        }
    }

    impl RowCache for LocalStorageRowCache {
        fn load(&self, key: &str) -> Result<Option<CacheEntry>, CacheError> {
            let storage = window_local_storage()?;
            let raw = storage
                .get_item(key)
                .map_err(|e| CacheError::Io(format!("get_item failed: {:?}", e)))?;
            match raw {
                Some(raw) => decode(&raw),
                None => Ok(None),
            }
        }

        fn store(&mut self, key: &str, entry: &CacheEntry) -> Result<(), CacheError> {
            let storage = window_local_storage()?;
            storage
                .set_item(key, &encode(entry)?)
                .map_err(|e| CacheError::Io(format!("set_item failed: {:?}", e)))
        }

        fn clear(&mut self, key: &str) -> Result<bool, CacheError> {
            let storage = window_local_storage()?;
            let existed = storage
                .get_item(key)
                .map_err(|e| CacheError::Io(format!("get_item failed: {:?}", e)))?
                .is_some();
            storage
                .remove_item(key)
                .map_err(|e| CacheError::Io(format!("remove_item failed: {:?}", e)))?;
            Ok(existed)
        }
    }

    fn window_local_storage() -> Result<web_sys::Storage, CacheError> {
        let win = web_sys::window().ok_or(CacheError::StorageUnavailable)?;
        win.local_storage()
            .map_err(|e| CacheError::Io(format!("localStorage error: {:?}", e)))?
            .ok_or(CacheError::StorageUnavailable)
    }
}

#[cfg(target_arch = "wasm32")]
pub use wasm_storage::LocalStorageRowCache;

#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug)]
pub struct LocalStorageRowCache;

#[cfg(not(target_arch = "wasm32"))]
impl LocalStorageRowCache {
    pub fn new() -> Result<Self, CacheError> {
        Err(CacheError::StorageUnavailable)
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl RowCache for LocalStorageRowCache {
    fn load(&self, _key: &str) -> Result<Option<CacheEntry>, CacheError> {
        Err(CacheError::StorageUnavailable)
    }

    fn store(&mut self, _key: &str, _entry: &CacheEntry) -> Result<(), CacheError> {
        Err(CacheError::StorageUnavailable)
    }

    fn clear(&mut self, _key: &str) -> Result<bool, CacheError> {
        Err(CacheError::StorageUnavailable)
    }
}
