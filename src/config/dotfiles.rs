//! The `[dotfiles]` section: what to deploy and how.
use serde::Deserialize;

/// A directory deployed as a whole: `source` (relative to the repository)
/// to `target` (relative to home).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DirectoryMap {
    /// Directory inside the repository, e.g. `"macOS/claude"`.
    pub source: String,
    /// Directory inside home, e.g. `".claude"`.
    pub target: String,
}

/// Effective dotfiles settings after merging the user file over defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DotfilesConfig {
    /// Remote repository URL (informational).
    pub repository: String,
    /// Local checkout of the repository; a leading `~` means home.
    pub local_path: String,
    /// Sub-directory of `local_path` that holds file sources.
    pub source_dir: String,
    /// File names deployed into home.
    pub files: Vec<String>,
    /// Directories deployed into home.
    pub directories: Vec<DirectoryMap>,
    /// Deploy as symlinks (`true`) or copies (`false`).
    pub symlink: bool,
    /// Move pre-existing plain entries aside before deploying.
    pub backup: bool,
}

impl Default for DotfilesConfig {
    fn default() -> Self {
        Self {
            repository: String::new(),
            local_path: "~/.dotfiles".to_string(),
            source_dir: String::new(),
            files: [
                ".zshrc",
                ".bashrc",
                ".bash_profile",
                ".vimrc",
                ".gitconfig",
                ".tmux.conf",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            directories: Vec::new(),
            symlink: true,
            backup: true,
        }
    }
}

/// `[dotfiles]` exactly as written by the user. Absent keys stay empty.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct DotfilesSection {
    repository: String,
    local_path: String,
    source_dir: String,
    files: Vec<String>,
    directories: Vec<DirectoryMap>,
    symlink: Option<bool>,
    backup: Option<bool>,
}

impl DotfilesConfig {
    /// Overlay `user` on the defaults.
    ///
    /// Empty strings and empty lists keep the default; booleans override
    /// only when the key is present.
    #[must_use]
    pub fn merged(user: DotfilesSection) -> Self {
        let defaults = Self::default();
        Self {
            repository: non_empty(user.repository, defaults.repository),
            local_path: non_empty(user.local_path, defaults.local_path),
            source_dir: non_empty(user.source_dir, defaults.source_dir),
            files: if user.files.is_empty() {
                defaults.files
            } else {
                user.files
            },
            directories: if user.directories.is_empty() {
                defaults.directories
            } else {
                user.directories
            },
            symlink: user.symlink.unwrap_or(defaults.symlink),
            backup: user.backup.unwrap_or(defaults.backup),
        }
    }
}

fn non_empty(value: String, default: String) -> String {
    if value.is_empty() { default } else { value }
}
