use anyhow::{Context, Result};
use std::env;
use std::path::{Path, PathBuf};

use crate::cache::{BackendKind, PATHS_CACHE_NAME};
use crate::cli::Cli;

pub const ROOT_ENV: &str = "PATHS_FINDER_ROOT";
pub const CACHE_DIR_ENV: &str = "PATHS_FINDER_CACHE_DIR";

#[derive(Debug, Clone)]
pub struct FinderConfig {
    pub root: PathBuf,
    pub cache_dir: PathBuf,
    pub backend: BackendKind,
}

impl FinderConfig {
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        Ok(Self {
            root: resolve_root(cli)?,
            cache_dir: resolve_cache_dir(cli),
            backend: if cli.ephemeral {
                BackendKind::Memory
            } else {
                BackendKind::Persistent
            },
        })
    }
}

pub fn resolve_root(cli: &Cli) -> Result<PathBuf> {
    if let Some(p) = cli.root.clone() {
        return Ok(p);
    }

    if let Ok(p) = env::var(ROOT_ENV) {
        return Ok(PathBuf::from(p));
    }

    default_root()
}

pub fn resolve_cache_dir(cli: &Cli) -> PathBuf {
    if let Some(p) = cli.cache_dir.clone() {
        return p;
    }

    if let Ok(p) = env::var(CACHE_DIR_ENV) {
        return PathBuf::from(p);
    }

    default_cache_dir()
}

pub fn default_cache_dir() -> PathBuf {
    env::temp_dir().join(PATHS_CACHE_NAME)
}

pub fn default_root() -> Result<PathBuf> {
    let exe = env::current_exe().context("Failed to resolve current executable path")?;
    Ok(root_for_exe(&exe))
}

/// Checkout that holds the `target/` directory the executable was built into,
/// or the executable's own directory when it lives elsewhere.
fn root_for_exe(exe: &Path) -> PathBuf {
    let exe_dir = exe.parent().unwrap_or(exe);
    exe_dir
        .ancestors()
        .find(|dir| dir.file_name().is_some_and(|n| n == "target"))
        .and_then(Path::parent)
        .unwrap_or(exe_dir)
        .to_path_buf()
}
