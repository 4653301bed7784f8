//! Deployment, backup, and recovery primitives.
//!
//! Everything in this layer works on explicit paths handed in by the caller;
//! nothing here reads the environment, the config file, or writes to the
//! console (diagnostics go through `tracing` at debug level only).
//!
//! - [`deploy`] materialises one source entry at one destination
//! - [`backup`] names, discovers, orders, and selects backup generations
//! - [`copy`] duplicates files and directory trees for copy mode
//! - [`recover`] swaps a backup generation back into place
pub mod backup;
pub mod copy;
pub mod deploy;
pub mod fs;
pub mod recover;

use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::DeployError;

pub use backup::{BackupEntry, BackupSelector, find_backups, find_backups_for, select_backup};
pub use deploy::deploy;
pub use recover::recover;

/// How a source entry is materialised at its destination.
///
/// # Examples
///
/// ```
/// use dotdeploy::engine::DeploymentMethod;
///
/// assert_eq!(DeploymentMethod::from_symlink_flag(true), DeploymentMethod::Symlink);
/// assert_eq!(DeploymentMethod::Copy.to_string(), "copy");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeploymentMethod {
    /// The destination becomes a link to the absolute source path.
    Symlink,
    /// The destination becomes an independent duplicate of the source.
    Copy,
}

impl DeploymentMethod {
    /// Map the config-level `symlink` flag onto a method.
    #[must_use]
    pub const fn from_symlink_flag(symlink: bool) -> Self {
        if symlink { Self::Symlink } else { Self::Copy }
    }
}

impl fmt::Display for DeploymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Symlink => "symlink",
            Self::Copy => "copy",
        })
    }
}

/// The kind of entry a mapping declares its source to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// A single file.
    File,
    /// A whole directory tree.
    Directory,
}

impl EntryKind {
    /// Lower-case noun used in skip reasons (`"file"` / `"directory"`).
    #[must_use]
    pub const fn noun(self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Directory => "directory",
        }
    }
}

/// One (source, destination) pair to deploy or recover.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mapping {
    /// Display name used in reports (the configured relative name).
    pub name: String,
    /// Entry inside the synced repository. Expected to be absolute: symlink
    /// mode links to this path exactly as given.
    pub source: PathBuf,
    /// Entry inside the home directory.
    pub destination: PathBuf,
    /// Kind the source is expected to be.
    pub kind: EntryKind,
}

/// What currently occupies a destination path.
///
/// Inspection never follows links, so a dangling symlink is reported as
/// [`DestinationState::Symlink`] rather than [`DestinationState::Absent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DestinationState {
    /// Nothing exists at the path.
    Absent,
    /// A symbolic link (possibly broken).
    Symlink,
    /// A plain file or a real directory.
    Entry {
        /// Whether the entry is a directory tree.
        is_dir: bool,
    },
}

impl DestinationState {
    /// Inspect `path` without following symlinks.
    #[must_use]
    pub fn inspect(path: &Path) -> Self {
        match std::fs::symlink_metadata(path) {
            Err(_) => Self::Absent,
            Ok(meta) if meta.file_type().is_symlink() => Self::Symlink,
            Ok(meta) => Self::Entry {
                is_dir: meta.is_dir(),
            },
        }
    }
}

/// The decision taken for one deployment.
///
/// Dry-run previews and apply mode both obtain their action from
/// [`DeployAction::decide`], so a preview always names exactly what apply
/// mode will do.
///
/// # Examples
///
/// ```
/// use dotdeploy::engine::{DeployAction, DeploymentMethod, DestinationState};
///
/// let action = DeployAction::decide(
///     DestinationState::Entry { is_dir: false },
///     DeploymentMethod::Symlink,
///     true,
/// );
/// assert_eq!(action, DeployAction::BackupAnd(DeploymentMethod::Symlink));
/// assert_eq!(action.to_string(), "backup & symlink");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeployAction {
    /// Destination is absent; create it.
    Create(DeploymentMethod),
    /// Destination is a symlink; remove it (never backed up) and create.
    ReplaceSymlink(DeploymentMethod),
    /// Destination is a plain entry; move it aside as a backup and create.
    BackupAnd(DeploymentMethod),
    /// Destination is a plain entry; delete it and create.
    Overwrite(DeploymentMethod),
}

impl DeployAction {
    /// The single policy function shared by dry-run and apply mode.
    #[must_use]
    pub const fn decide(state: DestinationState, method: DeploymentMethod, backup: bool) -> Self {
        match state {
            DestinationState::Absent => Self::Create(method),
            DestinationState::Symlink => Self::ReplaceSymlink(method),
            DestinationState::Entry { .. } if backup => Self::BackupAnd(method),
            DestinationState::Entry { .. } => Self::Overwrite(method),
        }
    }

    /// The deployment method this action finishes with.
    #[must_use]
    pub const fn method(self) -> DeploymentMethod {
        match self {
            Self::Create(m) | Self::ReplaceSymlink(m) | Self::BackupAnd(m) | Self::Overwrite(m) => m,
        }
    }
}

impl fmt::Display for DeployAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Create(m) => write!(f, "{m}"),
            Self::ReplaceSymlink(m) => write!(f, "replace symlink → {m}"),
            Self::BackupAnd(m) => write!(f, "backup & {m}"),
            Self::Overwrite(m) => write!(f, "overwrite → {m}"),
        }
    }
}

/// Options shared by every deployment in a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeployOptions {
    /// Symlink or copy.
    pub method: DeploymentMethod,
    /// Move pre-existing plain destinations aside instead of deleting them.
    pub backup: bool,
    /// Decide but do not touch the filesystem.
    pub dry_run: bool,
}

/// Outcome of deploying a single mapping.
#[derive(Debug)]
pub enum DeploymentResult {
    /// Nothing was done; the reason is an expected steady-state condition.
    Skipped {
        /// Why the mapping was skipped (e.g. `"not found in repository"`).
        reason: String,
    },
    /// Dry run: the action apply mode would take.
    Planned(DeployAction),
    /// The destination was created or replaced.
    Installed {
        /// The action that was carried out.
        action: DeployAction,
        /// Where the previous destination was moved, if it was backed up.
        backup: Option<PathBuf>,
    },
    /// The mapping aborted; the destination may be partially written.
    Failed(DeployError),
}

impl DeploymentResult {
    /// The action decided for this mapping, for both dry-run and apply mode.
    #[must_use]
    pub const fn action(&self) -> Option<DeployAction> {
        match self {
            Self::Planned(action) | Self::Installed { action, .. } => Some(*action),
            Self::Skipped { .. } | Self::Failed(_) => None,
        }
    }

    /// Whether the mapping failed.
    #[must_use]
    pub const fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn decide_covers_every_state() {
        use DeploymentMethod::{Copy, Symlink};
        let file = DestinationState::Entry { is_dir: false };
        let dir = DestinationState::Entry { is_dir: true };

        assert_eq!(
            DeployAction::decide(DestinationState::Absent, Symlink, true),
            DeployAction::Create(Symlink)
        );
        assert_eq!(
            DeployAction::decide(DestinationState::Symlink, Copy, true),
            DeployAction::ReplaceSymlink(Copy)
        );
        assert_eq!(
            DeployAction::decide(file, Copy, true),
            DeployAction::BackupAnd(Copy)
        );
        assert_eq!(
            DeployAction::decide(dir, Symlink, false),
            DeployAction::Overwrite(Symlink)
        );
    }

    #[test]
    fn action_labels() {
        use DeploymentMethod::{Copy, Symlink};
        assert_eq!(DeployAction::Create(Symlink).to_string(), "symlink");
        assert_eq!(DeployAction::Create(Copy).to_string(), "copy");
        assert_eq!(
            DeployAction::ReplaceSymlink(Copy).to_string(),
            "replace symlink → copy"
        );
        assert_eq!(DeployAction::BackupAnd(Copy).to_string(), "backup & copy");
        assert_eq!(
            DeployAction::Overwrite(Symlink).to_string(),
            "overwrite → symlink"
        );
    }

    #[test]
    fn inspect_absent() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(
            DestinationState::inspect(&dir.path().join("missing")),
            DestinationState::Absent
        );
    }

    #[test]
    fn inspect_plain_entries() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("file");
        std::fs::write(&file, "x").unwrap();
        assert_eq!(
            DestinationState::inspect(&file),
            DestinationState::Entry { is_dir: false }
        );
        assert_eq!(
            DestinationState::inspect(dir.path()),
            DestinationState::Entry { is_dir: true }
        );
    }

    #[cfg(unix)]
    #[test]
    fn inspect_broken_symlink_is_symlink() {
        let dir = tempfile::tempdir().unwrap();
        let link = dir.path().join("link");
        std::os::unix::fs::symlink(dir.path().join("nowhere"), &link).unwrap();
        assert_eq!(DestinationState::inspect(&link), DestinationState::Symlink);
    }

    #[test]
    fn result_action_accessor() {
        let planned = DeploymentResult::Planned(DeployAction::Create(DeploymentMethod::Copy));
        assert_eq!(
            planned.action(),
            Some(DeployAction::Create(DeploymentMethod::Copy))
        );
        let skipped = DeploymentResult::Skipped {
            reason: "not found in repository".to_string(),
        };
        assert_eq!(skipped.action(), None);
        assert!(!skipped.is_failed());
        assert!(DeploymentResult::Failed(DeployError::NoBackupsFound).is_failed());
    }
}
