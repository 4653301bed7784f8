//! Top-level subcommand orchestration.
//!
//! Each command resolves its inputs once through [`CommandSetup`], drives
//! the engine mapping by mapping, and reports every outcome through the
//! [`Logger`].
pub mod backups;
pub mod import;
pub mod recover;
pub mod version;

use anyhow::{Context as _, Result};

use crate::cli::GlobalOpts;
use crate::config::environment::resolve_home;
use crate::config::{Config, Environment};
use crate::logging::Logger;

/// Shared state produced by the common command setup sequence.
#[derive(Debug)]
pub struct CommandSetup {
    /// Loaded configuration.
    pub config: Config,
    /// Resolved home and repository locations.
    pub env: Environment,
}

impl CommandSetup {
    /// Resolve the home directory and load the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined or the
    /// configuration file cannot be read or parsed.
    pub fn init(global: &GlobalOpts, log: &Logger) -> Result<Self> {
        let home = resolve_home(global.home.as_deref())?;
        let home = std::path::absolute(&home)
            .with_context(|| format!("resolving home directory {}", home.display()))?;
        let path = global
            .config
            .clone()
            .unwrap_or_else(|| Config::default_path(&home));

        log.debug(&format!("config: {}", path.display()));
        let config =
            Config::load(&path).with_context(|| format!("loading {}", path.display()))?;

        let env = Environment::new(home, &config.dotfiles);
        log.debug(&format!("home: {}", env.home.display()));
        log.debug(&format!("repository: {}", env.repository.display()));

        Ok(Self { config, env })
    }
}

/// Print the summary, then propagate `batch` or bail if any mapping failed.
///
/// # Errors
///
/// Returns the batch error if the batch aborted, otherwise an error if one
/// or more mappings recorded a failure.
pub fn finish(log: &Logger, batch: Result<()>) -> Result<()> {
    log.print_summary();
    batch?;

    let failed = log.tally().failed;
    if failed > 0 {
        anyhow::bail!("{failed} mapping(s) failed");
    }
    Ok(())
}
