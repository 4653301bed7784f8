//! Recovery executor: put a backup generation back at its destination.
use std::path::Path;

use super::fs;
use crate::error::DeployError;

/// Replace whatever occupies `destination` with `backup`.
///
/// The current destination (file, symlink, or directory tree) is removed
/// first, then the backup is renamed onto it, consuming the backup. If the
/// rename fails after the removal, the returned error says so through
/// `destination_removed`.
///
/// # Errors
///
/// Returns [`DeployError::DestinationRemovalFailed`] if the current entry
/// cannot be removed, or [`DeployError::RecoveryRenameFailed`] if the backup
/// cannot be moved into place.
pub fn recover(backup: &Path, destination: &Path) -> Result<(), DeployError> {
    let removed = fs::remove_entry(destination)?;
    if removed {
        tracing::debug!("removed current {}", destination.display());
    }

    std::fs::rename(backup, destination).map_err(|source| DeployError::RecoveryRenameFailed {
        backup: backup.to_path_buf(),
        destination: destination.to_path_buf(),
        destination_removed: removed,
        source,
    })?;
    tracing::debug!(
        "restored {} from {}",
        destination.display(),
        backup.display()
    );
    Ok(())
}
