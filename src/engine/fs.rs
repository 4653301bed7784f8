//! File-system helpers shared by the deployment and recovery executors.
use std::io;
use std::path::Path;

use crate::error::DeployError;

/// Ensure the parent directory of `path` exists, creating it (and any
/// ancestors) if necessary.
///
/// # Errors
///
/// Returns [`DeployError::ParentDirCreationFailed`] if the directory cannot be
/// created.
pub fn ensure_parent_dir(path: &Path) -> Result<(), DeployError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(|source| {
            DeployError::ParentDirCreationFailed {
                path: parent.to_path_buf(),
                source,
            }
        })?;
    }
    Ok(())
}

/// Remove whatever occupies `path`: a file, a symlink (including a broken
/// one), or a whole directory tree.
///
/// A symlink is always removed as a single link, even when it points at a
/// directory; only a real directory is deleted recursively.
///
/// Returns `true` if something was removed, `false` if `path` was absent.
///
/// # Errors
///
/// Returns [`DeployError::DestinationRemovalFailed`] if the entry exists but
/// cannot be removed.
pub fn remove_entry(path: &Path) -> Result<bool, DeployError> {
    let meta = match std::fs::symlink_metadata(path) {
        Ok(meta) => meta,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(false),
        Err(source) => {
            return Err(DeployError::DestinationRemovalFailed {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    let result = if meta.file_type().is_symlink() {
        remove_symlink(path, &meta)
    } else if meta.is_dir() {
        std::fs::remove_dir_all(path)
    } else {
        std::fs::remove_file(path)
    };

    result.map_err(|source| DeployError::DestinationRemovalFailed {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!("removed {}", path.display());
    Ok(true)
}

/// Remove a symlink, handling platform differences.
///
/// On Windows, directory symlinks must be removed with `remove_dir` (not
/// `remove_file`); the raw `FILE_ATTRIBUTE_DIRECTORY` bit tells them apart.
fn remove_symlink(path: &Path, meta: &std::fs::Metadata) -> io::Result<()> {
    if is_dir_like(meta) {
        std::fs::remove_dir(path)
    } else {
        std::fs::remove_file(path)
    }
}

#[cfg(windows)]
fn is_dir_like(meta: &std::fs::Metadata) -> bool {
    use std::os::windows::fs::MetadataExt;
    meta.file_attributes() & 0x10 != 0 // FILE_ATTRIBUTE_DIRECTORY
}

#[cfg(not(windows))]
const fn is_dir_like(_meta: &std::fs::Metadata) -> bool {
    false
}

/// Create a symlink at `link` pointing to `target`.
///
/// # Errors
///
/// Returns [`DeployError::SymlinkCreationFailed`] if the link cannot be
/// created.
pub fn create_symlink(target: &Path, link: &Path) -> Result<(), DeployError> {
    #[cfg(unix)]
    let result = std::os::unix::fs::symlink(target, link);

    #[cfg(windows)]
    let result = if target.is_dir() {
        std::os::windows::fs::symlink_dir(target, link)
    } else {
        std::os::windows::fs::symlink_file(target, link)
    };

    result.map_err(|source| DeployError::SymlinkCreationFailed {
        link: link.to_path_buf(),
        target: target.to_path_buf(),
        source,
    })
}
