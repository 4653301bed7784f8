//! Command: deploy dotfiles from the repository into the home directory.
use anyhow::{Context as _, Result};

use crate::cli::{GlobalOpts, ImportOpts};
use crate::commands::{CommandSetup, finish};
use crate::config::DotfilesConfig;
use crate::engine::{self, DeployOptions, DeploymentMethod, DeploymentResult, Mapping};
use crate::logging::{Log, Logger, OutcomeStatus};

/// Run the import command.
///
/// # Errors
///
/// Returns an error if setup fails, the repository is missing, or any
/// mapping failed.
pub fn run(global: &GlobalOpts, opts: &ImportOpts, log: &Logger) -> Result<()> {
    let setup = CommandSetup::init(global, log)?;
    setup.env.check_repository()?;

    let deploy_opts = deploy_options(&setup.config.dotfiles, opts);
    let mappings = setup.env.mappings(&setup.config.dotfiles, &opts.files);

    log.stage("Importing dotfiles");
    log.info(&format!("source: {}", setup.env.source_root.display()));
    log.info(&format!(
        "method: {}, backup: {}",
        deploy_opts.method, deploy_opts.backup
    ));

    let batch = deploy_all(&mappings, &deploy_opts, opts.keep_going, log);

    if deploy_opts.dry_run {
        log.info("run with --apply to deploy");
    }
    finish(log, batch)
}

/// Combine the config defaults with the command-line overrides.
#[must_use]
pub fn deploy_options(config: &DotfilesConfig, opts: &ImportOpts) -> DeployOptions {
    DeployOptions {
        method: if opts.copy {
            DeploymentMethod::Copy
        } else {
            DeploymentMethod::from_symlink_flag(config.symlink)
        },
        backup: config.backup && !opts.no_backup,
        dry_run: !opts.apply,
    }
}

/// Deploy `mappings` in order, reporting each outcome.
///
/// Unless `keep_going` is set, the first failure stops the batch; mappings
/// already deployed stay deployed.
///
/// # Errors
///
/// Returns the first failure when `keep_going` is `false`.
pub fn deploy_all(
    mappings: &[Mapping],
    opts: &DeployOptions,
    keep_going: bool,
    log: &dyn Log,
) -> Result<()> {
    for mapping in mappings {
        let name = mapping.name.as_str();
        match engine::deploy(mapping, opts) {
            DeploymentResult::Skipped { reason } => {
                log.info(&format!("[skip] {name} ({reason})"));
                log.record(name, OutcomeStatus::Skipped, Some(&reason));
            }
            DeploymentResult::Planned(action) => {
                let label = action.to_string();
                log.dry_run(&format!("[{label}] {name}"));
                log.record(name, OutcomeStatus::DryRun, Some(&label));
            }
            DeploymentResult::Installed { action, backup } => {
                if let Some(backup) = backup {
                    log.debug(&format!("backup: {}", backup.display()));
                }
                let label = action.to_string();
                log.info(&format!("[ok] {name} ({label})"));
                log.record(name, OutcomeStatus::Ok, Some(&label));
            }
            DeploymentResult::Failed(err) => {
                let message = err.to_string();
                log.error(&format!("[error] {name}: {message}"));
                log.record(name, OutcomeStatus::Failed, Some(&message));
                if !keep_going {
                    return Err(err).with_context(|| format!("deploying {name}"));
                }
            }
        }
    }
    Ok(())
}
