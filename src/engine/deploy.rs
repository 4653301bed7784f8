//! Deployment executor: materialise one mapping at its destination.
use std::path::{Path, PathBuf};

use super::backup;
use super::copy;
use super::fs;
use super::{
    DeployAction, DeployOptions, DeploymentMethod, DeploymentResult, DestinationState, EntryKind,
    Mapping,
};
use crate::error::DeployError;

/// Deploy `mapping` using the current time for any backup name.
///
/// Never panics and never returns early with an error: every outcome,
/// including failures, is reported through [`DeploymentResult`]. A missing
/// or wrong-kind source is a [`DeploymentResult::Skipped`].
#[must_use]
pub fn deploy(mapping: &Mapping, opts: &DeployOptions) -> DeploymentResult {
    deploy_at(mapping, opts, &backup::backup_timestamp())
}

/// Deploy `mapping`, naming any backup with `timestamp`.
///
/// A dry run checks the backup slot the same way apply mode does, so a
/// same-second collision is reported as a failure in both modes.
#[must_use]
pub fn deploy_at(mapping: &Mapping, opts: &DeployOptions, timestamp: &str) -> DeploymentResult {
    if let Err(err) = check_source(&mapping.source, mapping.kind) {
        return DeploymentResult::Skipped {
            reason: skip_reason(&err),
        };
    }

    let state = DestinationState::inspect(&mapping.destination);
    let action = DeployAction::decide(state, opts.method, opts.backup);

    if opts.dry_run {
        if matches!(action, DeployAction::BackupAnd(_))
            && let Err(err) = backup::backup_slot(&mapping.destination, timestamp)
        {
            return DeploymentResult::Failed(err);
        }
        return DeploymentResult::Planned(action);
    }

    match apply(mapping, action, timestamp) {
        Ok(backup) => DeploymentResult::Installed { action, backup },
        Err(err) => DeploymentResult::Failed(err),
    }
}

/// Verify the source exists and matches the kind the mapping declares.
fn check_source(source: &Path, kind: EntryKind) -> Result<(), DeployError> {
    let meta = std::fs::metadata(source)
        .map_err(|_| DeployError::NotFoundInRepository(source.to_path_buf()))?;
    let matches = match kind {
        EntryKind::File => !meta.is_dir(),
        EntryKind::Directory => meta.is_dir(),
    };
    if matches {
        Ok(())
    } else {
        Err(DeployError::KindMismatch {
            path: source.to_path_buf(),
            expected: kind.noun(),
        })
    }
}

fn skip_reason(err: &DeployError) -> String {
    match err {
        DeployError::NotFoundInRepository(_) => "not found in repository".to_string(),
        DeployError::KindMismatch { expected, .. } => format!("not a {expected}"),
        other => other.to_string(),
    }
}

/// Carry out `action`. Returns the backup path when one was taken.
fn apply(
    mapping: &Mapping,
    action: DeployAction,
    timestamp: &str,
) -> Result<Option<PathBuf>, DeployError> {
    let destination = &mapping.destination;

    let backup = match action {
        DeployAction::Create(_) => None,
        DeployAction::ReplaceSymlink(_) | DeployAction::Overwrite(_) => {
            fs::remove_entry(destination)?;
            None
        }
        DeployAction::BackupAnd(_) => Some(backup::move_aside(destination, timestamp)?),
    };

    fs::ensure_parent_dir(destination)?;

    match action.method() {
        DeploymentMethod::Symlink => {
            tracing::debug!(
                "creating symlink {} -> {}",
                destination.display(),
                mapping.source.display()
            );
            fs::create_symlink(&mapping.source, destination)?;
        }
        DeploymentMethod::Copy if mapping.source.is_dir() => {
            tracing::debug!(
                "copying directory {} -> {}",
                mapping.source.display(),
                destination.display()
            );
            copy::copy_directory(&mapping.source, destination)?;
        }
        DeploymentMethod::Copy => {
            tracing::debug!(
                "copying {} -> {}",
                mapping.source.display(),
                destination.display()
            );
            copy::copy_file(&mapping.source, destination)?;
        }
    }

    Ok(backup)
}

#[cfg(test)]
#[allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::indexing_slicing,
    clippy::panic
)]
mod tests {
    use super::*;
    use crate::engine::find_backups_for;

    const TS: &str = "20260215071045";

    struct Fixture {
        _repo: tempfile::TempDir,
        _home: tempfile::TempDir,
        file: Mapping,
        dir: Mapping,
    }

    fn fixture() -> Fixture {
        let repo = tempfile::tempdir().unwrap();
        let home = tempfile::tempdir().unwrap();
        std::fs::write(repo.path().join(".zshrc"), "export EDITOR=vim\n").unwrap();
        let claude = repo.path().join("claude");
        std::fs::create_dir_all(claude.join("subdir")).unwrap();
        std::fs::write(claude.join("settings.json"), r#"{"key": "value"}"#).unwrap();
        std::fs::write(claude.join("subdir").join("config.toml"), "[config]").unwrap();

        let file = Mapping {
            name: ".zshrc".to_string(),
            source: repo.path().join(".zshrc"),
            destination: home.path().join(".zshrc"),
            kind: EntryKind::File,
        };
        let dir = Mapping {
            name: "claude -> .claude".to_string(),
            source: claude,
            destination: home.path().join(".claude"),
            kind: EntryKind::Directory,
        };
        Fixture {
            _repo: repo,
            _home: home,
            file,
            dir,
        }
    }

    const fn opts(method: DeploymentMethod, backup: bool, dry_run: bool) -> DeployOptions {
        DeployOptions {
            method,
            backup,
            dry_run,
        }
    }

    // -----------------------------------------------------------------------
    // Skips
    // -----------------------------------------------------------------------

    #[test]
    fn missing_source_is_skipped() {
        let f = fixture();
        let mapping = Mapping {
            source: f.file.source.with_file_name(".nope"),
            ..f.file.clone()
        };
        let result = deploy_at(&mapping, &opts(DeploymentMethod::Symlink, true, false), TS);
        assert!(
            matches!(result, DeploymentResult::Skipped { ref reason } if reason == "not found in repository")
        );
        assert!(f.file.destination.symlink_metadata().is_err());
    }

    #[test]
    fn file_source_for_directory_mapping_is_skipped() {
        let f = fixture();
        let mapping = Mapping {
            source: f.file.source.clone(),
            ..f.dir.clone()
        };
        let result = deploy_at(&mapping, &opts(DeploymentMethod::Copy, true, false), TS);
        assert!(
            matches!(result, DeploymentResult::Skipped { ref reason } if reason == "not a directory")
        );
    }

    #[test]
    fn directory_source_for_file_mapping_is_skipped() {
        let f = fixture();
        let mapping = Mapping {
            source: f.dir.source.clone(),
            ..f.file.clone()
        };
        let result = deploy_at(&mapping, &opts(DeploymentMethod::Copy, true, true), TS);
        assert!(
            matches!(result, DeploymentResult::Skipped { ref reason } if reason == "not a file")
        );
    }

    // -----------------------------------------------------------------------
    // Symlink mode
    // -----------------------------------------------------------------------

    #[cfg(unix)]
    #[test]
    fn symlink_file_into_empty_home() {
        let f = fixture();
        let result = deploy_at(&f.file, &opts(DeploymentMethod::Symlink, true, false), TS);
        assert!(matches!(
            result,
            DeploymentResult::Installed {
                action: DeployAction::Create(DeploymentMethod::Symlink),
                backup: None
            }
        ));
        assert_eq!(std::fs::read_link(&f.file.destination).unwrap(), f.file.source);
    }

    #[cfg(unix)]
    #[test]
    fn symlink_directory_points_at_source() {
        let f = fixture();
        deploy_at(&f.dir, &opts(DeploymentMethod::Symlink, false, false), TS);
        let meta = f.dir.destination.symlink_metadata().unwrap();
        assert!(meta.file_type().is_symlink());
        assert_eq!(std::fs::read_link(&f.dir.destination).unwrap(), f.dir.source);
    }

    #[cfg(unix)]
    #[test]
    fn symlink_creates_missing_parent_directories() {
        let f = fixture();
        let mapping = Mapping {
            destination: f.file.destination.with_file_name(".config/zsh/.zshrc"),
            ..f.file.clone()
        };
        let result = deploy_at(&mapping, &opts(DeploymentMethod::Symlink, true, false), TS);
        assert!(matches!(result, DeploymentResult::Installed { .. }));
        assert!(mapping.destination.symlink_metadata().is_ok());
    }

    #[cfg(unix)]
    #[test]
    fn existing_symlink_is_replaced_without_backup() {
        let f = fixture();
        std::os::unix::fs::symlink("/some/old/target", &f.file.destination).unwrap();

        let result = deploy_at(&f.file, &opts(DeploymentMethod::Symlink, true, false), TS);
        assert!(matches!(
            result,
            DeploymentResult::Installed {
                action: DeployAction::ReplaceSymlink(DeploymentMethod::Symlink),
                backup: None
            }
        ));
        assert_eq!(std::fs::read_link(&f.file.destination).unwrap(), f.file.source);
        assert!(find_backups_for(&f.file.destination).is_empty());
    }

    // -----------------------------------------------------------------------
    // Backup and overwrite
    // -----------------------------------------------------------------------

    #[test]
    fn plain_file_is_backed_up() {
        let f = fixture();
        std::fs::write(&f.file.destination, "original").unwrap();

        let result = deploy_at(&f.file, &opts(DeploymentMethod::Copy, true, false), TS);
        let DeploymentResult::Installed { action, backup } = result else {
            panic!("expected Installed");
        };
        assert_eq!(action, DeployAction::BackupAnd(DeploymentMethod::Copy));
        let backup = backup.unwrap();
        assert_eq!(
            backup,
            f.file
                .destination
                .with_file_name(format!(".zshrc.backup.{TS}"))
        );
        assert_eq!(std::fs::read_to_string(&backup).unwrap(), "original");
        assert_eq!(
            std::fs::read_to_string(&f.file.destination).unwrap(),
            "export EDITOR=vim\n"
        );
    }

    #[test]
    fn plain_directory_is_backed_up() {
        let f = fixture();
        std::fs::create_dir(&f.dir.destination).unwrap();
        std::fs::write(f.dir.destination.join("old.txt"), "old").unwrap();

        let result = deploy_at(&f.dir, &opts(DeploymentMethod::Copy, true, false), TS);
        assert!(matches!(result, DeploymentResult::Installed { backup: Some(_), .. }));

        let backups = find_backups_for(&f.dir.destination);
        assert_eq!(backups.len(), 1);
        assert_eq!(
            std::fs::read_to_string(backups[0].path.join("old.txt")).unwrap(),
            "old"
        );
        assert!(!f.dir.destination.join("old.txt").exists());
        assert!(f.dir.destination.join("settings.json").exists());
    }

    #[test]
    fn plain_directory_is_overwritten_without_backup() {
        let f = fixture();
        std::fs::create_dir_all(f.dir.destination.join("deep")).unwrap();
        std::fs::write(f.dir.destination.join("deep").join("old.txt"), "old").unwrap();

        let result = deploy_at(&f.dir, &opts(DeploymentMethod::Copy, false, false), TS);
        assert!(matches!(
            result,
            DeploymentResult::Installed {
                action: DeployAction::Overwrite(DeploymentMethod::Copy),
                backup: None
            }
        ));
        assert!(!f.dir.destination.join("deep").exists());
        assert!(find_backups_for(&f.dir.destination).is_empty());
    }

    #[test]
    fn backup_collision_fails_and_keeps_destination() {
        let f = fixture();
        std::fs::write(&f.file.destination, "current").unwrap();
        std::fs::write(
            f.file
                .destination
                .with_file_name(format!(".zshrc.backup.{TS}")),
            "earlier",
        )
        .unwrap();

        let result = deploy_at(&f.file, &opts(DeploymentMethod::Copy, true, false), TS);
        assert!(matches!(
            result,
            DeploymentResult::Failed(DeployError::BackupRenameFailed { .. })
        ));
        assert_eq!(
            std::fs::read_to_string(&f.file.destination).unwrap(),
            "current"
        );
    }

    #[test]
    fn repeat_backup_in_same_second_fails_in_both_modes() {
        let f = fixture();
        std::fs::write(&f.file.destination, "original").unwrap();
        let apply = opts(DeploymentMethod::Copy, true, false);
        let preview = opts(DeploymentMethod::Copy, true, true);

        let first = deploy_at(&f.file, &apply, TS);
        assert!(matches!(first, DeploymentResult::Installed { backup: Some(_), .. }));

        let plan = deploy_at(&f.file, &preview, TS);
        let DeploymentResult::Failed(DeployError::BackupRenameFailed { source, .. }) = plan else {
            panic!("expected preview to report the collision");
        };
        assert_eq!(source.kind(), std::io::ErrorKind::AlreadyExists);

        let second = deploy_at(&f.file, &apply, TS);
        assert!(matches!(
            second,
            DeploymentResult::Failed(DeployError::BackupRenameFailed { .. })
        ));
        assert_eq!(
            std::fs::read_to_string(f.file.destination.with_file_name(format!(".zshrc.backup.{TS}")))
                .unwrap(),
            "original"
        );
    }

    // -----------------------------------------------------------------------
    // Copy mode
    // -----------------------------------------------------------------------

    #[test]
    fn copy_directory_is_independent_of_source() {
        let f = fixture();
        deploy_at(&f.dir, &opts(DeploymentMethod::Copy, false, false), TS);

        let dst = &f.dir.destination;
        assert!(!dst.symlink_metadata().unwrap().file_type().is_symlink());
        assert_eq!(
            std::fs::read_to_string(dst.join("subdir").join("config.toml")).unwrap(),
            "[config]"
        );

        std::fs::write(f.dir.source.join("settings.json"), "changed").unwrap();
        assert_eq!(
            std::fs::read_to_string(dst.join("settings.json")).unwrap(),
            r#"{"key": "value"}"#
        );
    }

    #[test]
    fn copy_twice_without_backup_is_idempotent() {
        let f = fixture();
        let o = opts(DeploymentMethod::Copy, false, false);
        deploy_at(&f.dir, &o, TS);
        let first = std::fs::read_to_string(f.dir.destination.join("settings.json")).unwrap();
        let result = deploy_at(&f.dir, &o, TS);
        assert!(matches!(
            result,
            DeploymentResult::Installed {
                action: DeployAction::Overwrite(DeploymentMethod::Copy),
                ..
            }
        ));
        let second = std::fs::read_to_string(f.dir.destination.join("settings.json")).unwrap();
        assert_eq!(first, second);
        assert_eq!(
            std::fs::read_to_string(f.dir.destination.join("subdir").join("config.toml"))
                .unwrap(),
            "[config]"
        );
    }

    // -----------------------------------------------------------------------
    // Dry run
    // -----------------------------------------------------------------------

    #[test]
    fn dry_run_does_not_touch_filesystem() {
        let f = fixture();
        std::fs::write(&f.file.destination, "original").unwrap();

        let result = deploy_at(&f.file, &opts(DeploymentMethod::Symlink, true, true), TS);
        assert!(matches!(
            result,
            DeploymentResult::Planned(DeployAction::BackupAnd(DeploymentMethod::Symlink))
        ));
        assert_eq!(
            std::fs::read_to_string(&f.file.destination).unwrap(),
            "original"
        );
        assert!(find_backups_for(&f.file.destination).is_empty());
    }

    /// Prepare the destination in one of the four observable states.
    #[cfg(unix)]
    fn prepare(state: &str, destination: &Path) {
        match state {
            "absent" => {}
            "symlink" => std::os::unix::fs::symlink("/dangling/target", destination).unwrap(),
            "file" => std::fs::write(destination, "plain").unwrap(),
            "dir" => std::fs::create_dir(destination).unwrap(),
            other => panic!("unknown state {other}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn dry_run_prediction_matches_apply() {
        for state in ["absent", "symlink", "file", "dir"] {
            for backup in [true, false] {
                for method in [DeploymentMethod::Symlink, DeploymentMethod::Copy] {
                    for mapping_of in [0, 1] {
                        let f = fixture();
                        let mapping = if mapping_of == 0 { &f.file } else { &f.dir };
                        prepare(state, &mapping.destination);

                        let planned =
                            deploy_at(mapping, &opts(method, backup, true), TS).action();
                        let applied = deploy_at(mapping, &opts(method, backup, false), TS);
                        assert!(
                            !applied.is_failed(),
                            "{state}/{backup}/{method}: {applied:?}"
                        );
                        assert_eq!(
                            planned,
                            applied.action(),
                            "state={state} backup={backup} method={method}"
                        );
                    }
                }
            }
        }
    }
}
