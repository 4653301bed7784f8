//! Command: restore dotfiles from their backups.
use anyhow::{Context as _, Result};

use crate::cli::{GlobalOpts, RecoverOpts};
use crate::commands::{CommandSetup, finish};
use crate::engine::{self, BackupSelector, Mapping};
use crate::error::DeployError;
use crate::logging::{Log, Logger, OutcomeStatus};

/// Run the recover command.
///
/// # Errors
///
/// Returns an error if setup fails or any mapping failed to recover.
pub fn run(global: &GlobalOpts, opts: &RecoverOpts, log: &Logger) -> Result<()> {
    let setup = CommandSetup::init(global, log)?;
    let mappings = setup.env.mappings(&setup.config.dotfiles, &[]);

    log.stage("Recovering dotfiles");
    log.info(&format!("backup: {}", opts.timestamp));

    let batch = recover_all(&mappings, &opts.timestamp, !opts.apply, opts.keep_going, log);

    if !opts.apply {
        log.info("run with --apply to recover");
    }
    finish(log, batch)
}

/// Recover every mapping that has a matching backup.
///
/// Mappings without backups, or without one at the requested timestamp, are
/// skipped. Unless `keep_going` is set, the first failure stops the batch.
///
/// # Errors
///
/// Returns the first failure when `keep_going` is `false`.
pub fn recover_all(
    mappings: &[Mapping],
    selector: &BackupSelector,
    dry_run: bool,
    keep_going: bool,
    log: &dyn Log,
) -> Result<()> {
    for mapping in mappings {
        let name = mapping.name.as_str();
        let backups = engine::find_backups_for(&mapping.destination);
        let result = engine::select_backup(&backups, selector).and_then(|entry| {
            let label = format!("{name} ← {}", entry.file_name());
            if dry_run {
                log.dry_run(&format!("[recover] {label}"));
                return Ok((OutcomeStatus::DryRun, entry.timestamp.clone()));
            }
            engine::recover(&entry.path, &mapping.destination)?;
            log.info(&format!("[ok] {label}"));
            Ok((OutcomeStatus::Ok, entry.timestamp.clone()))
        });

        match result {
            Ok((status, timestamp)) => log.record(name, status, Some(&timestamp)),
            Err(err) if err.is_skip() => {
                let reason = err.to_string();
                log.info(&format!("[skip] {name} ({reason})"));
                log.record(name, OutcomeStatus::Skipped, Some(&reason));
            }
            Err(err) => {
                let message = err.to_string();
                log.error(&format!("[error] {name}: {message}"));
                if let DeployError::RecoveryRenameFailed {
                    backup,
                    destination_removed: true,
                    ..
                } = &err
                {
                    log.warn(&format!(
                        "{} no longer exists; its backup is still at {}",
                        mapping.destination.display(),
                        backup.display()
                    ));
                }
                log.record(name, OutcomeStatus::Failed, Some(&message));
                if !keep_going {
                    return Err(err).with_context(|| format!("recovering {name}"));
                }
            }
        }
    }
    Ok(())
}
