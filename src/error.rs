//! Domain-specific error types for the deployment engine.
//!
//! This module provides a structured error hierarchy using [`thiserror`].
//! Engine operations return [`DeployError`] and configuration loading returns
//! [`ConfigError`]; command handlers at the CLI boundary convert them to
//! [`anyhow::Error`] via the standard `?` operator.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors that arise from configuration loading and path resolution.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// An I/O error occurred while reading a config file.
    #[error("IO error reading config file {path}: {source}")]
    Io {
        /// Path to the file that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// The config file is not valid TOML or does not match the schema.
    #[error("Invalid TOML in {path}: {message}")]
    InvalidSyntax {
        /// Path to the offending file.
        path: PathBuf,
        /// Parser message.
        message: String,
    },

    /// Neither `--home` nor the home environment variable is available.
    #[error("cannot determine home directory: set HOME or pass --home")]
    HomeNotFound,

    /// The local repository checkout does not exist.
    #[error("dotfiles repository not found at {0}; sync the repository first")]
    RepositoryMissing(PathBuf),
}

/// Errors that arise from deploying, discovering, or recovering entries.
///
/// `NotFoundInRepository` and `KindMismatch` are never fatal: the executor
/// turns them into a skipped outcome. Every `*Failed` variant aborts the
/// mapping it occurred in and is handed back to the caller.
#[derive(Error, Debug)]
pub enum DeployError {
    /// The source entry does not exist in the synced repository.
    #[error("not found in repository: {}", .0.display())]
    NotFoundInRepository(PathBuf),

    /// The source exists but is not the kind the mapping declares.
    #[error("not a {expected}: {}", .path.display())]
    KindMismatch {
        /// Path of the source entry.
        path: PathBuf,
        /// Kind the mapping expected (`"file"` or `"directory"`).
        expected: &'static str,
    },

    /// An existing destination could not be removed.
    #[error("failed to remove existing {}: {source}", .path.display())]
    DestinationRemovalFailed {
        /// Destination that could not be removed.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// An existing destination could not be moved aside as a backup.
    #[error("failed to back up {} to {}: {source}", .from.display(), .to.display())]
    BackupRenameFailed {
        /// Destination being backed up.
        from: PathBuf,
        /// Backup path that was attempted.
        to: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// The destination's parent directory could not be created.
    #[error("failed to create parent directory {}: {source}", .path.display())]
    ParentDirCreationFailed {
        /// Directory that could not be created.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// The symbolic link could not be created.
    #[error("failed to create symlink {} -> {}: {source}", .link.display(), .target.display())]
    SymlinkCreationFailed {
        /// Path of the link.
        link: PathBuf,
        /// Path the link should point to.
        target: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// Copying a file or directory tree failed.
    #[error("failed to copy {} to {}: {source}", .from.display(), .to.display())]
    CopyFailed {
        /// Source path being copied (the failing entry inside a tree).
        from: PathBuf,
        /// Destination path being written.
        to: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// No backup generation exists for the destination.
    #[error("no backups found")]
    NoBackupsFound,

    /// No backup generation carries the requested timestamp.
    #[error("no backup found with timestamp {0}")]
    BackupTimestampNotFound(String),

    /// Renaming the backup onto the destination failed.
    ///
    /// `destination_removed` is `true` when the previous destination had
    /// already been deleted, i.e. the destination path is now empty.
    #[error(
        "failed to recover {} from {}{}: {source}",
        .destination.display(),
        .backup.display(),
        .destination_removed.then_some(" (current entry already removed)").unwrap_or_default()
    )]
    RecoveryRenameFailed {
        /// Backup generation being restored.
        backup: PathBuf,
        /// Destination being restored.
        destination: PathBuf,
        /// Whether the previous destination was removed before the failure.
        destination_removed: bool,
        /// Underlying I/O error.
        source: io::Error,
    },
}

impl DeployError {
    /// Whether this error is an expected steady-state condition that should
    /// produce a skip rather than a failure.
    #[must_use]
    pub const fn is_skip(&self) -> bool {
        matches!(
            self,
            Self::NotFoundInRepository(_)
                | Self::KindMismatch { .. }
                | Self::NoBackupsFound
                | Self::BackupTimestampNotFound(_)
        )
    }
}
