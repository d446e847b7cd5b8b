//! Lookup cache mapping target file names to resolved paths.
//!
//! Two interchangeable backends sit behind [`CacheStore`]:
//!
//! - [`LmdbStore`] persists entries in an LMDB environment (via heed) so that
//!   answers survive across process invocations.
//! - [`MemoryStore`] keeps entries for the lifetime of the process only.
//!
//! [`open_store`] picks the persistent backend when it can be opened and
//! silently degrades to memory otherwise.

use anyhow::{Context, Result};
use heed::types::Str;
use heed::{Database, Env, EnvOpenOptions};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Directory name of the persistent cache under the system temp directory.
pub const PATHS_CACHE_NAME: &str = "yaml_runner_cache";

/// Stored value marking a name as confirmed absent by the last walk.
pub const PATH_NOT_FOUND: &str = "//NOT_FOUND//";

pub const PATHS_DB: &str = "paths";

const DEFAULT_MAP_SIZE: usize = 64 * 1024 * 1024;
const DEFAULT_MAX_DBS: u32 = 4;

type StrDb = Database<Str, Str>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CachedPath {
    Found(PathBuf),
    NotFound,
}

impl CachedPath {
    pub fn from_raw(raw: &str) -> Self {
        if raw == PATH_NOT_FOUND {
            Self::NotFound
        } else {
            Self::Found(PathBuf::from(raw))
        }
    }

    pub fn to_raw(&self) -> String {
        match self {
            Self::Found(path) => path.to_string_lossy().to_string(),
            Self::NotFound => PATH_NOT_FOUND.to_string(),
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }
}

impl From<Option<PathBuf>> for CachedPath {
    fn from(value: Option<PathBuf>) -> Self {
        value.map_or(Self::NotFound, Self::Found)
    }
}

impl fmt::Display for CachedPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Found(path) => write!(f, "{}", path.display()),
            Self::NotFound => f.write_str(PATH_NOT_FOUND),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    Persistent,
    Memory,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Persistent => f.write_str("persistent"),
            Self::Memory => f.write_str("memory"),
        }
    }
}

/// Key/value contract shared by every cache backend.
///
/// Keys are target file names used verbatim. Every present key holds exactly
/// one [`CachedPath`]; nothing expires by time.
pub trait CacheStore {
    fn get(&self, key: &str) -> Result<Option<CachedPath>>;

    fn set(&mut self, key: &str, value: &CachedPath) -> Result<()>;

    /// Writes all entries, overwriting prior values.
    fn set_many(&mut self, entries: &[(String, CachedPath)]) -> Result<()> {
        for (key, value) in entries {
            self.set(key, value)?;
        }
        Ok(())
    }

    /// Returns whether the key was present.
    fn delete(&mut self, key: &str) -> Result<bool>;

    /// All entries, ordered by key.
    fn entries(&self) -> Result<Vec<(String, CachedPath)>>;

    fn clear(&mut self) -> Result<()>;

    fn kind(&self) -> BackendKind;

    fn location(&self) -> Option<&Path> {
        None
    }

    fn flush(&self) -> Result<()> {
        Ok(())
    }
}

/// Opens the requested backend. `Persistent` degrades to memory when LMDB
/// cannot be opened.
pub fn open_store(cache_dir: &Path, backend: BackendKind) -> Box<dyn CacheStore> {
    match backend {
        BackendKind::Memory => Box::new(MemoryStore::default()),
        BackendKind::Persistent => match LmdbStore::open(cache_dir) {
            Ok(store) => Box::new(store),
            Err(err) => {
                debug!(
                    cache_dir = %cache_dir.display(),
                    "persistent cache unavailable, using in-memory cache: {err:#}"
                );
                Box::new(MemoryStore::default())
            }
        },
    }
}

#[derive(Debug)]
pub struct LmdbStore {
    env: Env,
    dir: PathBuf,
    paths: StrDb,
}

impl LmdbStore {
    pub fn open(dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create cache directory: {}", dir.display()))?;

        let env = open_env(dir)?;
        let mut wtxn = env.write_txn()?;
        let paths = env.create_database::<Str, Str>(&mut wtxn, Some(PATHS_DB))?;
        wtxn.commit()?;

        debug!(dir = %dir.display(), "opened persistent path cache");
        Ok(Self {
            env,
            dir: dir.to_path_buf(),
            paths,
        })
    }
}

impl CacheStore for LmdbStore {
    fn get(&self, key: &str) -> Result<Option<CachedPath>> {
        let rtxn = self.env.read_txn()?;
        Ok(self.paths.get(&rtxn, key)?.map(CachedPath::from_raw))
    }

    fn set(&mut self, key: &str, value: &CachedPath) -> Result<()> {
        let raw = value.to_raw();
        let mut wtxn = self.env.write_txn()?;
        self.paths
            .put(&mut wtxn, key, raw.as_str())
            .with_context(|| format!("Failed to write cache entry: {key}"))?;
        wtxn.commit()?;
        Ok(())
    }

    fn set_many(&mut self, entries: &[(String, CachedPath)]) -> Result<()> {
        if entries.is_empty() {
            return Ok(());
        }

        let mut wtxn = self.env.write_txn()?;
        for (key, value) in entries {
            let raw = value.to_raw();
            self.paths
                .put(&mut wtxn, key.as_str(), raw.as_str())
                .with_context(|| format!("Failed to write cache entry: {key}"))?;
        }
        wtxn.commit()?;
        Ok(())
    }

    fn delete(&mut self, key: &str) -> Result<bool> {
        let mut wtxn = self.env.write_txn()?;
        let existed = self.paths.delete(&mut wtxn, key)?;
        wtxn.commit()?;
        Ok(existed)
    }

    fn entries(&self) -> Result<Vec<(String, CachedPath)>> {
        let rtxn = self.env.read_txn()?;
        let mut out = Vec::new();
        for item in self.paths.iter(&rtxn)? {
            let (k, v) = item?;
            out.push((k.to_string(), CachedPath::from_raw(v)));
        }
        Ok(out)
    }

    fn clear(&mut self) -> Result<()> {
        let mut wtxn = self.env.write_txn()?;
        self.paths.clear(&mut wtxn)?;
        wtxn.commit()?;
        Ok(())
    }

    fn kind(&self) -> BackendKind {
        BackendKind::Persistent
    }

    fn location(&self) -> Option<&Path> {
        Some(&self.dir)
    }

    fn flush(&self) -> Result<()> {
        self.env
            .force_sync()
            .with_context(|| format!("Failed to sync cache: {}", self.dir.display()))
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, CachedPath>,
}

impl CacheStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<CachedPath>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &CachedPath) -> Result<()> {
        self.entries.insert(key.to_string(), value.clone());
        Ok(())
    }

    fn delete(&mut self, key: &str) -> Result<bool> {
        Ok(self.entries.remove(key).is_some())
    }

    fn entries(&self) -> Result<Vec<(String, CachedPath)>> {
        Ok(self
            .entries
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }

    fn clear(&mut self) -> Result<()> {
        self.entries.clear();
        Ok(())
    }

    fn kind(&self) -> BackendKind {
        BackendKind::Memory
    }
}

fn open_env(dir: &Path) -> Result<Env> {
    let mut options = EnvOpenOptions::new();
    options.map_size(DEFAULT_MAP_SIZE);
    options.max_dbs(DEFAULT_MAX_DBS);
    // SAFETY: default LMDB locking is kept, and the environment directory is
    // owned by this cache alone.
    unsafe {
        options
            .open(dir)
            .with_context(|| format!("Failed to create/open cache env: {}", dir.display()))
    }
}

pub fn stats(store: &dyn CacheStore) -> Result<CacheStats> {
    let entries = store.entries()?;
    let found = entries.iter().filter(|(_, v)| v.is_found()).count() as u64;
    Ok(CacheStats {
        backend: store.kind(),
        location: store
            .location()
            .map(|p| p.to_string_lossy().to_string()),
        entries: entries.len() as u64,
        found,
        not_found: entries.len() as u64 - found,
    })
}

#[derive(Debug, Serialize)]
pub struct CacheStats {
    pub backend: BackendKind,
    pub location: Option<String>,
    pub entries: u64,
    pub found: u64,
    pub not_found: u64,
}
