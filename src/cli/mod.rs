//! Command-line interface for the charm hooks.
//!
//! Hook scripts call these commands to get at the library: resolve the role
//! configuration, read and write the environment store, build URLs, and react
//! to database relation events.
//!
//! # Commands
//!
//! - `resolve` - Print the resolved role configuration as JSON
//! - `env` - Inspect or change the environment store (`env.json`)
//! - `url` - Compose a URL from its parts
//! - `relation` - Apply a relation event to the environment store
//!
//! # Global Options
//!
//! - `--verbose` - Enable debug output
//! - `--quiet` - Only log errors
//! - `--charm-dir` - Charm directory (defaults to `$CHARM_DIR`, then the current directory)
//!
//! # Example
//!
//! ```bash
//! wsgi-charm resolve --runtime-config config.json
//! wsgi-charm env set WORKERS 4
//! wsgi-charm relation pgsql changed --database app --host 10.0.0.5
//! ```

mod env;
pub mod logging;
mod relation;
mod resolve;
mod url;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::filter::LevelFilter;

use crate::config::{self, CharmSettings};
use crate::store::EnvStore;

/// Helpers for the hooks of a WSGI application charm
#[derive(Parser)]
#[command(
    name = "wsgi-charm",
    about = "Helpers for the hooks of a WSGI application charm",
    version,
    long_about = "Resolves the configuration of the charm's WSGI application role, \
                  manages the environment variables handed to the application, and \
                  handles database relation events."
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug output
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Charm directory
    #[arg(long, global = true, value_name = "DIR")]
    charm_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve the role variables and print them as JSON
    Resolve(resolve::ResolveCommand),

    /// Inspect or change the environment store
    Env(env::EnvCommand),

    /// Build a URL from its parts
    Url(url::UrlCommand),

    /// Apply a relation event
    Relation(relation::RelationCommand),
}

/// What every command needs to know about the charm it runs in
#[derive(Debug, Clone)]
pub struct CommandContext {
    pub charm_dir: PathBuf,
    pub settings: CharmSettings,
}

impl CommandContext {
    pub fn load(charm_dir: Option<&Path>) -> Result<Self> {
        let charm_dir = config::charm_dir(charm_dir).context("Failed to determine charm directory")?;
        let settings = CharmSettings::load(&charm_dir)?;
        tracing::debug!("Charm directory: {}", charm_dir.display());
        Ok(Self {
            charm_dir,
            settings,
        })
    }

    pub fn env_store(&self) -> EnvStore {
        EnvStore::in_dir(self.settings.cache_dir_for(&self.charm_dir))
    }
}

impl Cli {
    /// Log level selected by the global flags
    #[must_use]
    pub fn log_level(&self) -> LevelFilter {
        logging::level_for(self.verbose, self.quiet)
    }

    pub fn execute(self) -> Result<()> {
        // `url` is pure and works outside a charm
        let ctx = || CommandContext::load(self.charm_dir.as_deref());

        match self.command {
            Commands::Resolve(cmd) => cmd.execute(&ctx()?),
            Commands::Env(cmd) => cmd.execute(&ctx()?),
            Commands::Relation(cmd) => cmd.execute(&ctx()?),
            Commands::Url(cmd) => cmd.execute(),
        }
    }
}
