//! Persistent name -> item id memo.
//!
//! Entries are write-once: a name that is present keeps its id for the lifetime of the cache.
//! [`CacheSession`] is the scoped handle used during a run; it writes the cache back when it
//! is closed and, as a fallback, when it is dropped on an early return or panic.

use crate::error::{PricecheckError, Result};
use crate::xiv_model::ItemId;
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind as IoErrorKind;
use std::path::{Path, PathBuf};
use tracing::{event, Level};

pub const DEFAULT_CACHE_FILE: &str = ".cache/id.json";

pub trait IdentifierStore {
    fn lookup(&self, name: &str) -> Option<ItemId>;

    /// Stores `id` for `name` unless the name is already known. Returns the id now stored.
    fn remember(&mut self, name: &str, id: ItemId) -> Result<ItemId>;
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentifierCache {
    ids: BTreeMap<String, ItemId>,
}

impl IdentifierCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    fn insert_once(&mut self, name: &str, id: ItemId) -> (ItemId, bool) {
        match self.ids.get(name) {
            Some(existing) => {
                if *existing != id {
                    event!(
                        Level::WARN,
                        "Ignoring id {} for '{}', keeping cached id {}",
                        id,
                        name,
                        existing
                    );
                }
                (*existing, false)
            }
            None => {
                self.ids.insert(name.to_string(), id);
                (id, true)
            }
        }
    }

    /// Parses the flat `{"name": id}` document. Entries without a positive integer id are skipped.
    pub fn from_json(json: &str) -> std::result::Result<Self, serde_json::Error> {
        let raw: BTreeMap<String, serde_json::Value> = serde_json::from_str(json)?;

        let ids = raw
            .into_iter()
            .filter_map(|(name, value)| match value.as_u64() {
                Some(id) if id > 0 => Some((name, ItemId(id))),
                _ => {
                    event!(Level::DEBUG, "Skipping cache entry '{}' with value {}", name, value);
                    None
                }
            })
            .collect();

        Ok(Self { ids })
    }

    pub fn to_json(&self) -> String {
        let raw: BTreeMap<&str, u64> = self.ids.iter().map(|(name, id)| (name.as_str(), id.0)).collect();
        serde_json::to_string_pretty(&raw).unwrap_or_else(|_| "{}".to_string())
    }
}

impl IdentifierStore for IdentifierCache {
    fn lookup(&self, name: &str) -> Option<ItemId> {
        self.ids.get(name).copied()
    }

    fn remember(&mut self, name: &str, id: ItemId) -> Result<ItemId> {
        Ok(self.insert_once(name, id).0)
    }
}

#[derive(Debug, Clone)]
pub struct IdCacheFile {
    path: PathBuf,
}

impl IdCacheFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the persisted cache. A missing file is an empty cache.
    pub fn read(&self) -> Result<IdentifierCache> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == IoErrorKind::NotFound => return Ok(IdentifierCache::new()),
            Err(e) => {
                return Err(PricecheckError::CacheCorruption {
                    path: self.path.clone(),
                    reason: e.to_string(),
                })
            }
        };

        IdentifierCache::from_json(&content).map_err(|e| PricecheckError::CacheCorruption {
            path: self.path.clone(),
            reason: e.to_string(),
        })
    }

    /// Like [`IdCacheFile::read`], but an unreadable cache is logged and replaced by an empty one.
    pub fn load(&self) -> IdentifierCache {
        match self.read() {
            Ok(cache) => {
                event!(Level::DEBUG, "Loaded {} cached ids from {:?}", cache.len(), self.path);
                cache
            }
            Err(e) => {
                event!(Level::WARN, "{}. Starting with an empty cache.", e);
                IdentifierCache::new()
            }
        }
    }

    /// Replaces the persisted cache atomically (temp file + rename).
    pub fn save(&self, cache: &IdentifierCache) -> Result<()> {
        let io_err = |source| PricecheckError::CacheIo {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_err)?;
        }

        let mut tmp_path = self.path.clone().into_os_string();
        tmp_path.push(".tmp");
        let tmp_path = PathBuf::from(tmp_path);

        fs::write(&tmp_path, cache.to_json()).map_err(io_err)?;
        fs::rename(&tmp_path, &self.path).map_err(io_err)?;

        event!(Level::DEBUG, "Saved {} ids to {:?}", cache.len(), self.path);
        Ok(())
    }
}

#[derive(Debug)]
pub struct CacheSession {
    file: IdCacheFile,
    cache: IdentifierCache,
    write_through: bool,
    dirty: bool,
    closed: bool,
}

impl CacheSession {
    pub fn open(file: IdCacheFile, write_through: bool) -> Self {
        let cache = file.load();
        Self {
            file,
            cache,
            write_through,
            dirty: false,
            closed: false,
        }
    }

    pub fn flush(&mut self) -> Result<()> {
        if self.dirty {
            self.file.save(&self.cache)?;
            self.dirty = false;
        }
        Ok(())
    }

    /// Writes back pending entries and ends the session.
    pub fn close(mut self) -> Result<()> {
        self.closed = true;
        self.flush()
    }
}

impl IdentifierStore for CacheSession {
    fn lookup(&self, name: &str) -> Option<ItemId> {
        self.cache.lookup(name)
    }

    fn remember(&mut self, name: &str, id: ItemId) -> Result<ItemId> {
        let (stored, inserted) = self.cache.insert_once(name, id);
        if inserted {
            self.dirty = true;
            if self.write_through {
                self.flush()?;
            }
        }
        Ok(stored)
    }
}

impl Drop for CacheSession {
    fn drop(&mut self) {
        if self.closed || !self.dirty {
            return;
        }
        if let Err(e) = self.file.save(&self.cache) {
            event!(Level::ERROR, "Lost unsaved cache entries: {}", e);
        }
    }
}
