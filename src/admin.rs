//! Operator commands over the lookup cache.
//!
//! Every command writes human-readable output to the supplied writer and
//! treats "nothing to do" (empty cache, unknown key) as a normal outcome.

use anyhow::{Result, ensure};
use console::style;
use std::io::Write;

use crate::cache::{self, CacheStore, CachedPath};
use crate::finder::PathFinder;

pub fn view(store: &dyn CacheStore, out: &mut dyn Write) -> Result<()> {
    let mut entries = store.entries()?;
    if entries.is_empty() {
        writeln!(out, "Cache is empty.")?;
        return Ok(());
    }

    entries.sort_by(|a, b| a.0.cmp(&b.0));
    let width = entries
        .iter()
        .map(|(name, _)| name.chars().count())
        .max()
        .unwrap_or(0);
    for (name, value) in &entries {
        let pad = width - name.chars().count();
        writeln!(
            out,
            "{}{}{}",
            style(format!("{name}: ")).bold(),
            " ".repeat(pad),
            value
        )?;
    }
    Ok(())
}

/// Stores `value` verbatim, without checking the filesystem.
pub fn add(store: &mut dyn CacheStore, key: &str, value: &str) -> Result<()> {
    ensure!(!key.is_empty(), "cache key must not be empty");
    store.set(key, &CachedPath::from_raw(value))
}

pub fn delete(store: &mut dyn CacheStore, name: &str) -> Result<bool> {
    store.delete(name)
}

pub fn reset(store: &mut dyn CacheStore) -> Result<()> {
    store.clear()
}

/// Resolves every name with a single walk: the tail is queued before the
/// first lookup runs. `try_again` stops applying once a walk has happened,
/// since that walk already answered every name still queued.
pub fn search(
    finder: &mut PathFinder,
    names: &[String],
    try_again: bool,
    out: &mut dyn Write,
) -> Result<usize> {
    for name in names.iter().skip(1) {
        finder.queue_find_file_path(name.as_str())?;
    }

    let mut retry = try_again;
    let mut found = 0usize;
    for name in names {
        let walks = finder.walk_count();
        let result = finder.find_file_path(name, retry)?;
        if finder.walk_count() > walks {
            retry = false;
        }

        match result {
            Some(path) => {
                found += 1;
                writeln!(
                    out,
                    "The target \"{name}\" has been added with the value \"{}\".",
                    path.display()
                )?;
            }
            None => writeln!(out, "The target \"{name}\" was not found.")?,
        }
    }
    Ok(found)
}

pub fn stats(store: &dyn CacheStore, out: &mut dyn Write) -> Result<()> {
    let stats = cache::stats(store)?;
    writeln!(out, "{}", serde_json::to_string_pretty(&stats)?)?;
    Ok(())
}
