// Shared helpers for integration tests.
//
// Provides a temporary home directory with a dotfiles repository inside it
// and a fluent builder, so each integration test can set up an isolated
// environment without repeating filesystem boilerplate.
//
// Used by all integration test binaries that declare `mod common;`.
#![allow(dead_code)]

use std::path::{Path, PathBuf};

use dotdeploy::cli::GlobalOpts;
use dotdeploy::logging::{Logger, Outcome};

/// An isolated home directory backed by a [`tempfile::TempDir`].
///
/// The repository lives at the default `~/.dotfiles` location, so tests
/// only need a config file when they change other settings.
pub struct IntegrationTestContext {
    /// Temporary directory used as the home directory.
    pub home: tempfile::TempDir,
}

impl IntegrationTestContext {
    /// Create a home directory with an empty repository checkout.
    pub fn new() -> Self {
        let home = tempfile::tempdir().expect("create temp dir");
        std::fs::create_dir_all(home.path().join(".dotfiles")).expect("create repository");
        Self { home }
    }

    /// Path to the home directory.
    pub fn home_path(&self) -> &Path {
        self.home.path()
    }

    /// Path to the repository checkout.
    pub fn repo_path(&self) -> PathBuf {
        self.home.path().join(".dotfiles")
    }

    /// Global options pointing every command at this home directory.
    pub fn global(&self) -> GlobalOpts {
        GlobalOpts {
            config: None,
            home: Some(self.home.path().to_path_buf()),
        }
    }

    /// Read a file relative to the home directory.
    pub fn read_home(&self, rel: &str) -> String {
        std::fs::read_to_string(self.home.path().join(rel)).expect("read home file")
    }

    /// Whether `rel` in the home directory is a symlink.
    pub fn is_symlink(&self, rel: &str) -> bool {
        std::fs::symlink_metadata(self.home.path().join(rel))
            .is_ok_and(|m| m.file_type().is_symlink())
    }

    /// Names of backup entries of `rel` in its parent directory.
    pub fn backups_of(&self, rel: &str) -> Vec<String> {
        dotdeploy::engine::find_backups_for(&self.home.path().join(rel))
            .iter()
            .map(|b| b.file_name())
            .collect()
    }
}

/// Fluent builder for [`IntegrationTestContext`].
pub struct TestContextBuilder {
    ctx: IntegrationTestContext,
}

impl TestContextBuilder {
    /// Begin building a new context with an empty repository.
    pub fn new() -> Self {
        Self {
            ctx: IntegrationTestContext::new(),
        }
    }

    /// Write `~/.dotdeploy.toml`.
    pub fn with_config(self, content: &str) -> Self {
        std::fs::write(self.ctx.home.path().join(".dotdeploy.toml"), content)
            .expect("write config");
        self
    }

    /// Write a file into the repository, creating parents.
    pub fn with_repo_file(self, rel: &str, content: &str) -> Self {
        write_with_parents(&self.ctx.repo_path().join(rel), content);
        self
    }

    /// Write a file into the home directory, creating parents.
    pub fn with_home_file(self, rel: &str, content: &str) -> Self {
        write_with_parents(&self.ctx.home.path().join(rel), content);
        self
    }

    /// Create an empty directory in the home directory.
    pub fn with_home_dir(self, rel: &str) -> Self {
        std::fs::create_dir_all(self.ctx.home.path().join(rel)).expect("create home dir");
        self
    }

    /// Create a symlink in the home directory pointing at `target`.
    #[cfg(unix)]
    pub fn with_home_symlink(self, rel: &str, target: &str) -> Self {
        std::os::unix::fs::symlink(target, self.ctx.home.path().join(rel))
            .expect("create symlink");
        self
    }

    /// Finalise the builder and return the context.
    pub fn build(self) -> IntegrationTestContext {
        self.ctx
    }
}

fn write_with_parents(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("create parent dir");
    }
    std::fs::write(path, content).expect("write file");
}

/// A logger whose summary names no log file.
pub fn logger() -> Logger {
    Logger::with_log_file(None)
}

/// Render outcomes one per line as `<status> <name> [<message>]`.
pub fn render(outcomes: &[Outcome]) -> String {
    outcomes
        .iter()
        .map(|o| {
            format!(
                "{:?} {} [{}]",
                o.status,
                o.name,
                o.message.as_deref().unwrap_or_default()
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}
