//! Backup generations: naming, discovery, ordering, and selection.
//!
//! A backup of `<dir>/<name>` lives next to it as
//! `<dir>/<name>.backup.<YYYYMMDDHHMMSS>`. The timestamp is fixed-width and
//! zero-padded, so plain string comparison orders generations by age.
use std::convert::Infallible;
use std::ffi::OsString;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::DeployError;

/// Separator between the original name and the timestamp.
pub const BACKUP_INFIX: &str = ".backup.";

/// `chrono` format of the backup timestamp (14 digits, no separators).
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";

/// One backup generation found on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupEntry {
    /// Base name of the destination this backup belongs to.
    pub original_name: String,
    /// Full path of the backup entry.
    pub path: PathBuf,
    /// Timestamp suffix, taken verbatim from the file name.
    pub timestamp: String,
}

impl BackupEntry {
    /// File name of the backup (for reports).
    #[must_use]
    pub fn file_name(&self) -> String {
        self.path.file_name().map_or_else(
            || self.path.display().to_string(),
            |n| n.to_string_lossy().into_owned(),
        )
    }
}

/// Which backup generation to restore.
///
/// # Examples
///
/// ```
/// use dotdeploy::engine::BackupSelector;
///
/// assert_eq!("latest".parse::<BackupSelector>().unwrap(), BackupSelector::Latest);
/// assert_eq!(
///     "20260215071045".parse::<BackupSelector>().unwrap(),
///     BackupSelector::Timestamp("20260215071045".into()),
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum BackupSelector {
    /// The most recent generation.
    #[default]
    Latest,
    /// The generation whose timestamp equals this string exactly.
    Timestamp(String),
}

impl FromStr for BackupSelector {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(if s == "latest" {
            Self::Latest
        } else {
            Self::Timestamp(s.to_string())
        })
    }
}

impl fmt::Display for BackupSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Latest => f.write_str("latest"),
            Self::Timestamp(ts) => f.write_str(ts),
        }
    }
}

/// Current local time in the backup timestamp format.
#[must_use]
pub fn backup_timestamp() -> String {
    chrono::Local::now().format(TIMESTAMP_FORMAT).to_string()
}

/// The backup path for `destination` at `timestamp`.
///
/// ```
/// use std::path::Path;
/// use dotdeploy::engine::backup::backup_path_for;
///
/// assert_eq!(
///     backup_path_for(Path::new("/home/u/.zshrc"), "20260215071045"),
///     Path::new("/home/u/.zshrc.backup.20260215071045"),
/// );
/// ```
#[must_use]
pub fn backup_path_for(destination: &Path, timestamp: &str) -> PathBuf {
    let mut name = destination
        .file_name()
        .map_or_else(OsString::new, |n| n.to_os_string());
    name.push(BACKUP_INFIX);
    name.push(timestamp);
    destination.with_file_name(name)
}

/// Reserve the backup path for `destination` at `timestamp`.
///
/// An existing entry at the backup path is never overwritten, so a second
/// backup within the same second is refused. Dry-run mode calls this too,
/// which lets a preview report the same collision apply mode would hit.
///
/// # Errors
///
/// Returns [`DeployError::BackupRenameFailed`] with
/// [`io::ErrorKind::AlreadyExists`] if the backup path is already taken.
pub fn backup_slot(destination: &Path, timestamp: &str) -> Result<PathBuf, DeployError> {
    let backup = backup_path_for(destination, timestamp);
    if backup.symlink_metadata().is_ok() {
        return Err(DeployError::BackupRenameFailed {
            from: destination.to_path_buf(),
            to: backup,
            source: io::Error::new(io::ErrorKind::AlreadyExists, "backup already exists"),
        });
    }
    Ok(backup)
}

/// Move `destination` aside to its backup path for `timestamp`.
///
/// # Errors
///
/// Returns [`DeployError::BackupRenameFailed`] if the backup path is already
/// taken or the rename fails.
pub fn move_aside(destination: &Path, timestamp: &str) -> Result<PathBuf, DeployError> {
    let backup = backup_slot(destination, timestamp)?;
    std::fs::rename(destination, &backup).map_err(|source| DeployError::BackupRenameFailed {
        from: destination.to_path_buf(),
        to: backup.clone(),
        source,
    })?;
    tracing::debug!(
        "backed up {} to {}",
        destination.display(),
        backup.display()
    );
    Ok(backup)
}

/// Find backups of `original_name` among the immediate entries of `dir`,
/// newest first.
///
/// Any suffix after `<original_name>.backup.` is accepted as a timestamp.
/// An unreadable or missing directory yields no backups.
#[must_use]
pub fn find_backups(dir: &Path, original_name: &str) -> Vec<BackupEntry> {
    let prefix = format!("{original_name}{BACKUP_INFIX}");

    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::debug!("cannot scan {} for backups: {e}", dir.display());
            return Vec::new();
        }
    };

    let mut backups: Vec<BackupEntry> = entries
        .filter_map(Result::ok)
        .filter_map(|entry| {
            let name = entry.file_name();
            let timestamp = name.to_str()?.strip_prefix(&prefix)?.to_string();
            Some(BackupEntry {
                original_name: original_name.to_string(),
                path: entry.path(),
                timestamp,
            })
        })
        .collect();

    backups.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    backups
}

/// Find backups of `destination` in its parent directory, newest first.
#[must_use]
pub fn find_backups_for(destination: &Path) -> Vec<BackupEntry> {
    let Some(name) = destination.file_name().and_then(|n| n.to_str()) else {
        return Vec::new();
    };
    let parent = destination.parent().unwrap_or_else(|| Path::new("."));
    find_backups(parent, name)
}

/// Pick one generation out of a newest-first list.
///
/// # Errors
///
/// Returns [`DeployError::NoBackupsFound`] if `entries` is empty, or
/// [`DeployError::BackupTimestampNotFound`] if no entry carries the requested
/// timestamp.
pub fn select_backup<'a>(
    entries: &'a [BackupEntry],
    selector: &BackupSelector,
) -> Result<&'a BackupEntry, DeployError> {
    let first = entries.first().ok_or(DeployError::NoBackupsFound)?;
    match selector {
        BackupSelector::Latest => Ok(first),
        BackupSelector::Timestamp(ts) => entries
            .iter()
            .find(|e| &e.timestamp == ts)
            .ok_or_else(|| DeployError::BackupTimestampNotFound(ts.clone())),
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn entry(ts: &str) -> BackupEntry {
        BackupEntry {
            original_name: ".zshrc".to_string(),
            path: PathBuf::from(format!("/tmp/.zshrc.backup.{ts}")),
            timestamp: ts.to_string(),
        }
    }

    // -----------------------------------------------------------------------
    // find_backups
    // -----------------------------------------------------------------------

    #[test]
    fn find_backups_sorted_newest_first() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(".zshrc.backup.20260101120000"), "old1").unwrap();
        std::fs::write(dir.path().join(".zshrc.backup.20260215071045"), "old2").unwrap();
        std::fs::write(dir.path().join(".zshrc.backup.20260110100000"), "old3").unwrap();
        std::fs::write(dir.path().join(".bashrc.backup.20260101120000"), "bash").unwrap();

        let backups = find_backups(dir.path(), ".zshrc");
        let stamps: Vec<&str> = backups.iter().map(|b| b.timestamp.as_str()).collect();
        assert_eq!(
            stamps,
            ["20260215071045", "20260110100000", "20260101120000"]
        );
        assert!(backups.iter().all(|b| b.original_name == ".zshrc"));
    }

    #[test]
    fn find_backups_empty_directory() {
        let dir = tempfile::tempdir().unwrap();
        assert!(find_backups(dir.path(), ".zshrc").is_empty());
    }

    #[test]
    fn find_backups_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        assert!(find_backups(&dir.path().join("nope"), ".zshrc").is_empty());
    }

    #[test]
    fn find_backups_requires_exact_prefix() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(".zshrc.local.backup.20260101120000"), "").unwrap();
        std::fs::write(dir.path().join("x.zshrc.backup.20260101120000"), "").unwrap();
        std::fs::write(dir.path().join(".zshrc"), "").unwrap();
        assert!(find_backups(dir.path(), ".zshrc").is_empty());
    }

    #[test]
    fn find_backups_accepts_any_suffix() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(".vimrc.backup.manual"), "").unwrap();
        let backups = find_backups(dir.path(), ".vimrc");
        assert_eq!(backups.len(), 1);
        assert_eq!(backups[0].timestamp, "manual");
    }

    #[test]
    fn find_backups_includes_directories() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("nvim.backup.20260101120000")).unwrap();
        let backups = find_backups(dir.path(), "nvim");
        assert_eq!(backups.len(), 1);
        assert!(backups[0].path.is_dir());
    }

    #[test]
    fn find_backups_for_uses_parent_and_base_name() {
        let home = tempfile::tempdir().unwrap();
        let config = home.path().join(".config");
        std::fs::create_dir(&config).unwrap();
        std::fs::create_dir(config.join("nvim.backup.20260101120000")).unwrap();

        let backups = find_backups_for(&config.join("nvim"));
        assert_eq!(backups.len(), 1);
        assert_eq!(backups[0].original_name, "nvim");
    }

    // -----------------------------------------------------------------------
    // select_backup
    // -----------------------------------------------------------------------

    #[test]
    fn select_latest_returns_first() {
        let entries = [
            entry("20260215071045"),
            entry("20260110100000"),
            entry("20260101120000"),
        ];
        let selected = select_backup(&entries, &BackupSelector::Latest).unwrap();
        assert_eq!(selected.timestamp, "20260215071045");
    }

    #[test]
    fn select_specific_timestamp() {
        let entries = [entry("20260215071045"), entry("20260110100000")];
        let selector: BackupSelector = "20260110100000".parse().unwrap();
        let selected = select_backup(&entries, &selector).unwrap();
        assert_eq!(selected.timestamp, "20260110100000");
    }

    #[test]
    fn select_unknown_timestamp_fails() {
        let entries = [entry("20260215071045")];
        let selector = BackupSelector::Timestamp("99999999999999".to_string());
        let err = select_backup(&entries, &selector).unwrap_err();
        assert!(
            matches!(err, DeployError::BackupTimestampNotFound(ref ts) if ts == "99999999999999")
        );
    }

    #[test]
    fn select_from_empty_fails() {
        let err = select_backup(&[], &BackupSelector::Latest).unwrap_err();
        assert!(matches!(err, DeployError::NoBackupsFound));
    }

    // -----------------------------------------------------------------------
    // naming
    // -----------------------------------------------------------------------

    #[test]
    fn timestamp_is_fourteen_digits() {
        let ts = backup_timestamp();
        assert_eq!(ts.len(), 14);
        assert!(ts.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn backup_path_is_sibling() {
        let path = backup_path_for(Path::new("/home/u/.config/nvim"), "20260101120000");
        assert_eq!(
            path,
            PathBuf::from("/home/u/.config/nvim.backup.20260101120000")
        );
    }

    #[test]
    fn move_aside_renames_entry() {
        let dir = tempfile::tempdir().unwrap();
        let dst = dir.path().join(".zshrc");
        std::fs::write(&dst, "original").unwrap();

        let backup = move_aside(&dst, "20260101120000").unwrap();
        assert!(dst.symlink_metadata().is_err());
        assert_eq!(std::fs::read_to_string(&backup).unwrap(), "original");
    }

    #[test]
    fn move_aside_refuses_to_clobber_same_second_backup() {
        let dir = tempfile::tempdir().unwrap();
        let dst = dir.path().join(".zshrc");
        std::fs::write(&dst, "second").unwrap();
        std::fs::write(dir.path().join(".zshrc.backup.20260101120000"), "first").unwrap();

        let err = move_aside(&dst, "20260101120000").unwrap_err();
        assert!(matches!(err, DeployError::BackupRenameFailed { .. }));
        assert_eq!(std::fs::read_to_string(&dst).unwrap(), "second");
        assert_eq!(
            std::fs::read_to_string(dir.path().join(".zshrc.backup.20260101120000")).unwrap(),
            "first"
        );
    }
}
