use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "paths-finder")]
#[command(about = "Find files under a root directory and cache their paths")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Directory searched by lookups.
    #[arg(long, value_name = "DIR", global = true)]
    pub root: Option<PathBuf>,

    /// Location of the persistent cache.
    #[arg(long, value_name = "DIR", global = true)]
    pub cache_dir: Option<PathBuf>,

    /// Keep the cache in memory for this run only.
    #[arg(long, global = true)]
    pub ephemeral: bool,

    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// View the cache entries.
    View,
    /// Add a cache entry.
    Add { key: String, value: String },
    /// Delete a cache entry.
    Delete { name: String },
    /// Delete all cache entries.
    Reset,
    /// Search for targets and add them to the cache.
    Search {
        #[arg(required = true)]
        names: Vec<String>,

        /// Search again for targets cached as not found.
        #[arg(long)]
        try_again: bool,
    },
    /// Print cache statistics as JSON.
    Stats,
}
