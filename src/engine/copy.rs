//! Byte-for-byte duplication of files and directory trees for copy mode.
//!
//! Known limitation: symlinks inside a copied tree are followed (their
//! content is copied, not the link), and device files, sockets, and hard
//! links receive no special treatment. A failure partway through a tree
//! leaves a partially populated destination.
use std::path::Path;

use crate::error::DeployError;

/// Copy a single file, including its permission bits.
///
/// # Errors
///
/// Returns [`DeployError::CopyFailed`] if the file cannot be read or written.
pub fn copy_file(src: &Path, dst: &Path) -> Result<(), DeployError> {
    std::fs::copy(src, dst)
        .map(|_| ())
        .map_err(|source| copy_failed(src, dst, source))
}

/// Recursively recreate `src` at `dst`.
///
/// Every sub-directory is recursed into and every file duplicated with its
/// mode. Each directory receives its source's permission bits once its
/// children have been written, so read-only source directories copy cleanly.
///
/// # Errors
///
/// Returns [`DeployError::CopyFailed`] naming the entry that could not be
/// read, created, or written.
pub fn copy_directory(src: &Path, dst: &Path) -> Result<(), DeployError> {
    let meta = std::fs::metadata(src).map_err(|source| copy_failed(src, dst, source))?;
    std::fs::create_dir_all(dst).map_err(|source| copy_failed(src, dst, source))?;

    let entries = std::fs::read_dir(src).map_err(|source| copy_failed(src, dst, source))?;
    for entry in entries {
        let entry = entry.map_err(|source| copy_failed(src, dst, source))?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());
        if src_path.is_dir() {
            copy_directory(&src_path, &dst_path)?;
        } else {
            copy_file(&src_path, &dst_path)?;
        }
    }

    std::fs::set_permissions(dst, meta.permissions())
        .map_err(|source| copy_failed(src, dst, source))?;
    tracing::debug!("copied directory {} -> {}", src.display(), dst.display());
    Ok(())
}

fn copy_failed(src: &Path, dst: &Path, source: std::io::Error) -> DeployError {
    DeployError::CopyFailed {
        from: src.to_path_buf(),
        to: dst.to_path_buf(),
        source,
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn copies_nested_tree() {
        let src = tempfile::tempdir().unwrap();
        let dst = tempfile::tempdir().unwrap();

        std::fs::write(src.path().join("root.txt"), b"root").unwrap();
        std::fs::create_dir_all(src.path().join("a/b/c")).unwrap();
        std::fs::write(src.path().join("a/a.txt"), b"a").unwrap();
        std::fs::write(src.path().join("a/b/b.txt"), b"b").unwrap();
        std::fs::write(src.path().join("a/b/c/c.txt"), b"c").unwrap();

        let target = dst.path().join("out");
        copy_directory(src.path(), &target).unwrap();

        assert_eq!(std::fs::read(target.join("root.txt")).unwrap(), b"root");
        assert_eq!(std::fs::read(target.join("a/a.txt")).unwrap(), b"a");
        assert_eq!(std::fs::read(target.join("a/b/b.txt")).unwrap(), b"b");
        assert_eq!(std::fs::read(target.join("a/b/c/c.txt")).unwrap(), b"c");
    }

    #[test]
    fn copies_empty_directory() {
        let src = tempfile::tempdir().unwrap();
        let dst = tempfile::tempdir().unwrap();
        std::fs::create_dir(src.path().join("empty")).unwrap();

        let target = dst.path().join("out");
        copy_directory(src.path(), &target).unwrap();
        assert!(target.join("empty").is_dir());
    }

    #[test]
    fn copy_into_existing_directory_overwrites_files() {
        let src = tempfile::tempdir().unwrap();
        let dst = tempfile::tempdir().unwrap();
        std::fs::write(src.path().join("f.txt"), b"new").unwrap();
        std::fs::write(dst.path().join("f.txt"), b"old").unwrap();

        copy_directory(src.path(), dst.path()).unwrap();
        assert_eq!(std::fs::read(dst.path().join("f.txt")).unwrap(), b"new");
    }

    #[test]
    fn missing_source_reports_copy_failed() {
        let dir = tempfile::tempdir().unwrap();
        let err = copy_directory(&dir.path().join("nope"), &dir.path().join("out")).unwrap_err();
        assert!(matches!(err, DeployError::CopyFailed { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn preserves_file_mode() {
        use std::os::unix::fs::PermissionsExt;

        let src = tempfile::tempdir().unwrap();
        let dst = tempfile::tempdir().unwrap();
        let script = src.path().join("run.sh");
        std::fs::write(&script, b"#!/bin/sh\n").unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o751)).unwrap();

        let out = dst.path().join("run.sh");
        copy_file(&script, &out).unwrap();
        let mode = std::fs::metadata(&out).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o751);
    }

    #[cfg(unix)]
    #[test]
    fn preserves_directory_mode() {
        use std::os::unix::fs::PermissionsExt;

        let src = tempfile::tempdir().unwrap();
        let dst = tempfile::tempdir().unwrap();
        let private = src.path().join("private");
        std::fs::create_dir(&private).unwrap();
        std::fs::write(private.join("key"), b"secret").unwrap();
        std::fs::set_permissions(&private, std::fs::Permissions::from_mode(0o700)).unwrap();

        let out = dst.path().join("private");
        copy_directory(&private, &out).unwrap();
        let mode = std::fs::metadata(&out).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o700);
        assert_eq!(std::fs::read(out.join("key")).unwrap(), b"secret");
    }
}
