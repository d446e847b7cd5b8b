use anyhow::{Context, Result};
use ignore::WalkBuilder;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Walks `root` once and returns the first path found for each wanted name.
///
/// Matching is on the plain file name of entries that resolve to a regular
/// file, so symlinks to directories and dangling links never match. When a name
/// exists in several directories the winner depends on directory enumeration
/// order. The walk ends as soon as every name has a match.
pub fn find_targets(root: &Path, targets: &HashSet<String>) -> Result<HashMap<String, PathBuf>> {
    std::fs::read_dir(root)
        .with_context(|| format!("Failed to read root directory: {}", root.display()))?;

    let mut found: HashMap<String, PathBuf> = HashMap::with_capacity(targets.len());
    if targets.is_empty() {
        return Ok(found);
    }

    let walker = WalkBuilder::new(root)
        .standard_filters(false)
        .follow_links(false)
        .build();

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                debug!("skipping unreadable entry during walk: {err}");
                continue;
            }
        };

        if entry.file_type().is_none_or(|t| t.is_dir()) {
            continue;
        }

        let Some(name) = entry.file_name().to_str() else {
            continue;
        };
        if targets.contains(name) && !found.contains_key(name) && entry.path().is_file() {
            found.insert(name.to_string(), entry.path().to_path_buf());
            if found.len() == targets.len() {
                break;
            }
        }
    }

    Ok(found)
}

/// Absolute form of `root` so cached paths never depend on the working directory.
pub fn absolute_root(root: &Path) -> Result<PathBuf> {
    std::path::absolute(root)
        .with_context(|| format!("Failed to resolve root directory: {}", root.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn temp_dir(prefix: &str) -> PathBuf {
        let mut p = std::env::temp_dir();
        p.push(format!(
            "{prefix}-{}-{}",
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap()
                .as_nanos()
        ));
        p
    }

    fn names(items: &[&str]) -> HashSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn find_targets_resolves_every_batch_name_in_one_walk() -> Result<()> {
        let root = temp_dir("paths-finder-walk");
        fs::create_dir_all(root.join("build/out"))?;
        fs::create_dir_all(root.join("tools/.hidden"))?;
        fs::write(root.join("build/out/widget_app"), b"")?;
        fs::write(root.join("tools/.hidden/helper"), b"")?;

        let found = find_targets(&root, &names(&["widget_app", "helper", "missing"]))?;
        assert_eq!(found.len(), 2);
        assert_eq!(found["widget_app"], root.join("build/out/widget_app"));
        assert_eq!(found["helper"], root.join("tools/.hidden/helper"));
        assert!(!found.contains_key("missing"));

        let _ = fs::remove_dir_all(root);
        Ok(())
    }

    #[test]
    fn find_targets_ignores_directories_with_matching_names() -> Result<()> {
        let root = temp_dir("paths-finder-walk-dir");
        fs::create_dir_all(root.join("widget_app"))?;

        let found = find_targets(&root, &names(&["widget_app"]))?;
        assert!(found.is_empty());

        let _ = fs::remove_dir_all(root);
        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn find_targets_skips_symlinks_to_directories() -> Result<()> {
        let root = temp_dir("paths-finder-walk-link");
        fs::create_dir_all(root.join("real_dir"))?;
        fs::create_dir_all(root.join("z"))?;
        fs::write(root.join("z/tool"), b"")?;
        std::os::unix::fs::symlink(root.join("real_dir"), root.join("tool"))?;
        std::os::unix::fs::symlink(root.join("nowhere"), root.join("dangling"))?;

        let found = find_targets(&root, &names(&["tool", "dangling"]))?;
        assert_eq!(found.get("tool"), Some(&root.join("z/tool")));
        assert!(!found.contains_key("dangling"));

        let _ = fs::remove_dir_all(root);
        Ok(())
    }

    #[test]
    fn find_targets_fails_on_missing_root() {
        let root = temp_dir("paths-finder-walk-missing");
        let err = find_targets(&root, &names(&["x"])).unwrap_err();
        assert!(format!("{err:#}").contains("Failed to read root directory"));
    }
}
