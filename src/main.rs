use anyhow::Result;
use clap::Parser;
use paths_finder::admin;
use paths_finder::cli::{Cli, Commands};
use paths_finder::config::FinderConfig;
use paths_finder::finder::PathFinder;
use std::io::Write;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = FinderConfig::from_cli(&cli)?;
    debug!(
        root = %config.root.display(),
        cache_dir = %config.cache_dir.display(),
        "resolved configuration"
    );

    let mut finder = PathFinder::open(&config)?;
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        Commands::View => admin::view(finder.store(), &mut out)?,
        Commands::Add { key, value } => admin::add(finder.store_mut(), &key, &value)?,
        Commands::Delete { name } => {
            if !admin::delete(finder.store_mut(), &name)? {
                debug!(name, "no cache entry to delete");
            }
        }
        Commands::Reset => admin::reset(finder.store_mut())?,
        Commands::Search { names, try_again } => {
            admin::search(&mut finder, &names, try_again, &mut out)?;
        }
        Commands::Stats => admin::stats(finder.store(), &mut out)?,
    }

    out.flush()?;
    finder.close()
}

fn init_logging(verbose: u8) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| match verbose {
        0 => EnvFilter::new("paths_finder=warn"),
        1 => EnvFilter::new("paths_finder=info"),
        _ => EnvFilter::new("paths_finder=debug"),
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}
