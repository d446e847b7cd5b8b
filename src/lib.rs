//! # paths-finder
//!
//! Resolves short file names (typically built executables) to absolute paths
//! under a root directory and remembers the answers between runs.
//!
//! ## Architecture
//!
//! - **cache**: Lookup cache backends (LMDB via heed, or in-memory)
//! - **queue**: Names waiting for the next batch walk
//! - **walk**: Single-pass directory walk resolving a batch of names
//! - **finder**: Cache check, stale eviction and batch resolution
//! - **admin**: View/add/delete/reset/search/stats commands
//! - **config**: Root and cache location resolution
//! - **cli**: Command-line definitions for the `paths-finder` binary

pub mod admin;
pub mod cache;
pub mod cli;
pub mod config;
pub mod finder;
pub mod queue;
pub mod walk;
