//! Path resolution: home directory, repository root, and mappings.
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use super::dotfiles::{DirectoryMap, DotfilesConfig};
use crate::engine::{EntryKind, Mapping};
use crate::error::ConfigError;

/// Resolved locations every engine call works against.
///
/// Built once at the command boundary; nothing below it consults the
/// process environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Environment {
    /// Home directory destinations are relative to.
    pub home: PathBuf,
    /// Local checkout of the dotfiles repository.
    pub repository: PathBuf,
    /// Directory holding file sources (`repository/source_dir`).
    pub source_root: PathBuf,
}

impl Environment {
    /// Resolve `config` against `home`.
    ///
    /// A relative `local_path` is taken relative to `home`, so every mapping
    /// source is absolute whenever `home` is.
    #[must_use]
    pub fn new(home: PathBuf, config: &DotfilesConfig) -> Self {
        let repository = home.join(expand_tilde(&config.local_path, &home));
        let source_root = if config.source_dir.is_empty() {
            repository.clone()
        } else {
            repository.join(&config.source_dir)
        };
        Self {
            home,
            repository,
            source_root,
        }
    }

    /// Ensure the repository checkout exists.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::RepositoryMissing`] if it is not a directory.
    pub fn check_repository(&self) -> Result<(), ConfigError> {
        if self.repository.is_dir() {
            Ok(())
        } else {
            Err(ConfigError::RepositoryMissing(self.repository.clone()))
        }
    }

    /// Mapping for a single file name.
    #[must_use]
    pub fn file_mapping(&self, file: &str) -> Mapping {
        Mapping {
            name: file.to_string(),
            source: self.source_root.join(file),
            destination: self.home.join(file),
            kind: EntryKind::File,
        }
    }

    /// Mapping for a whole directory. Directory sources are relative to the
    /// repository root, not to `source_dir`.
    #[must_use]
    pub fn directory_mapping(&self, dir: &DirectoryMap) -> Mapping {
        Mapping {
            name: format!("{} -> {}", dir.source, dir.target),
            source: self.repository.join(&dir.source),
            destination: self.home.join(&dir.target),
            kind: EntryKind::Directory,
        }
    }

    /// Every mapping: `files` (falling back to the configured list when
    /// empty) followed by the configured directories.
    #[must_use]
    pub fn mappings(&self, config: &DotfilesConfig, files: &[String]) -> Vec<Mapping> {
        let files = if files.is_empty() {
            config.files.as_slice()
        } else {
            files
        };
        files
            .iter()
            .map(|f| self.file_mapping(f))
            .chain(config.directories.iter().map(|d| self.directory_mapping(d)))
            .collect()
    }
}

/// Expand a leading `~` or `~/` against `home`.
///
/// ```
/// use std::path::Path;
/// use dotdeploy::config::environment::expand_tilde;
///
/// let home = Path::new("/home/u");
/// assert_eq!(expand_tilde("~/.dotfiles", home), Path::new("/home/u/.dotfiles"));
/// assert_eq!(expand_tilde("/srv/dots", home), Path::new("/srv/dots"));
/// ```
#[must_use]
pub fn expand_tilde(path: &str, home: &Path) -> PathBuf {
    if path == "~" {
        return home.to_path_buf();
    }
    match path.strip_prefix("~/") {
        Some(rest) => home.join(rest),
        None => PathBuf::from(path),
    }
}

/// Resolve the home directory: the explicit flag wins, then `HOME`, then
/// `USERPROFILE`.
///
/// # Errors
///
/// Returns [`ConfigError::HomeNotFound`] if none is set.
pub fn resolve_home(flag: Option<&Path>) -> Result<PathBuf, ConfigError> {
    resolve_home_with(flag, |key| std::env::var_os(key))
}

fn resolve_home_with(
    flag: Option<&Path>,
    lookup: impl Fn(&str) -> Option<OsString>,
) -> Result<PathBuf, ConfigError> {
    if let Some(home) = flag {
        return Ok(home.to_path_buf());
    }
    ["HOME", "USERPROFILE"]
        .into_iter()
        .filter_map(lookup)
        .find(|v| !v.is_empty())
        .map(PathBuf::from)
        .ok_or(ConfigError::HomeNotFound)
}
