//! Name-to-path resolution on top of the lookup cache.
//!
//! [`PathFinder`] owns the cache backend, the pending lookup queue and the
//! root directory. A lookup first consults the cache; on a miss, a stale hit,
//! or a forced retry it walks the root once, resolving the requested name
//! together with everything queued so far, and writes every answer back.

use anyhow::{Result, ensure};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::cache::{CacheStore, CachedPath, open_store};
use crate::config::FinderConfig;
use crate::queue::LookupQueue;
use crate::walk::{absolute_root, find_targets};

pub struct PathFinder {
    store: Box<dyn CacheStore>,
    queue: LookupQueue,
    root: PathBuf,
    walks: u64,
}

impl PathFinder {
    pub fn open(config: &FinderConfig) -> Result<Self> {
        let store = open_store(&config.cache_dir, config.backend);
        Self::with_store(store, &config.root)
    }

    pub fn with_store(store: Box<dyn CacheStore>, root: &Path) -> Result<Self> {
        Ok(Self {
            store,
            queue: LookupQueue::new(),
            root: absolute_root(root)?,
            walks: 0,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn store(&self) -> &dyn CacheStore {
        self.store.as_ref()
    }

    pub fn store_mut(&mut self) -> &mut dyn CacheStore {
        self.store.as_mut()
    }

    /// Number of filesystem walks performed by this finder.
    pub fn walk_count(&self) -> u64 {
        self.walks
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Registers `target` to be resolved by the next walk. Never walks by itself.
    pub fn queue_find_file_path(&mut self, target: impl Into<String>) -> Result<()> {
        let target = target.into();
        ensure!(!target.is_empty(), "target name must not be empty");
        self.queue.enqueue(target);
        Ok(())
    }

    /// Returns the path of `target` under the root, or `None` if it does not exist.
    ///
    /// A cached not-found answer is trusted unless `try_again` is set. The
    /// queue is only drained once the walk and the write-back have succeeded.
    pub fn find_file_path(&mut self, target: &str, try_again: bool) -> Result<Option<PathBuf>> {
        ensure!(!target.is_empty(), "target name must not be empty");

        match self.store.get(target)? {
            Some(CachedPath::NotFound) if !try_again => return Ok(None),
            Some(CachedPath::Found(path)) if path.is_file() => return Ok(Some(path)),
            Some(stale) => debug!(name = target, cached = %stale, "re-resolving cache entry"),
            None => {}
        }

        let mut wanted: HashSet<String> = HashSet::with_capacity(self.queue.len() + 1);
        wanted.insert(target.to_string());
        wanted.extend(self.queue.iter().cloned());

        debug!(
            name = target,
            batch = wanted.len(),
            root = %self.root.display(),
            "walking for targets"
        );
        let mut found = find_targets(&self.root, &wanted)?;
        self.walks += 1;

        // Overwrites the stale or retried entry for `target` as well.
        let mut seen = HashSet::with_capacity(wanted.len());
        let writes: Vec<(String, CachedPath)> = std::iter::once(target)
            .chain(self.queue.iter().map(String::as_str))
            .filter(|name| seen.insert(*name))
            .map(|name| (name.to_string(), CachedPath::from(found.get(name).cloned())))
            .collect();
        self.store.set_many(&writes)?;
        self.queue.clear();

        Ok(found.remove(target))
    }

    /// Flushes the backend. Queued names that were never looked up are dropped.
    pub fn close(self) -> Result<()> {
        if !self.queue.is_empty() {
            debug!(pending = self.queue.len(), "dropping unresolved queued names");
        }
        self.store.flush()
    }
}
