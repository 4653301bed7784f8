//! Command-line argument definitions.
use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::engine::BackupSelector;

/// Top-level CLI entry point for the dotfiles deployer.
#[derive(Parser, Debug)]
#[command(
    name = "dotdeploy",
    about = "Deploy dotfiles from a local repository, with backups and recovery",
    version
)]
pub struct Cli {
    #[allow(missing_docs)]
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[allow(missing_docs)]
    #[command(flatten)]
    pub global: GlobalOpts,
}

impl Cli {
    /// Log file stem for the selected subcommand.
    #[must_use]
    pub const fn command_name(&self) -> &'static str {
        match self.command {
            Command::Import(_) => "import",
            Command::Recover(_) => "recover",
            Command::Backups => "backups",
            Command::Version => "version",
        }
    }
}

/// Options shared across all subcommands.
#[derive(Parser, Debug, Clone, Default)]
pub struct GlobalOpts {
    /// Configuration file (default: ~/.dotdeploy.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Override the home directory destinations are relative to
    #[arg(long, global = true)]
    pub home: Option<PathBuf>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Deploy dotfiles from the repository into the home directory
    Import(ImportOpts),
    /// Restore dotfiles from their backups
    Recover(RecoverOpts),
    /// List backups of every configured dotfile
    Backups,
    /// Print version information
    Version,
}

/// Options for the `import` subcommand.
#[derive(Parser, Debug, Clone, Default)]
#[allow(clippy::struct_excessive_bools)]
pub struct ImportOpts {
    /// Actually deploy (default is a dry-run preview)
    #[arg(long)]
    pub apply: bool,

    /// Copy instead of symlinking
    #[arg(long)]
    pub copy: bool,

    /// Replace existing files without backing them up
    #[arg(long)]
    pub no_backup: bool,

    /// Keep going after a failed mapping
    #[arg(long = "continue")]
    pub keep_going: bool,

    /// Deploy only these files (default: every configured file)
    pub files: Vec<String>,
}

/// Options for the `recover` subcommand.
#[derive(Parser, Debug, Clone, Default)]
pub struct RecoverOpts {
    /// Actually restore (default is a dry-run preview)
    #[arg(long)]
    pub apply: bool,

    /// Backup to restore: `latest` or a YYYYMMDDHHMMSS timestamp
    #[arg(long, default_value = "latest")]
    pub timestamp: BackupSelector,

    /// Keep going after a failed mapping
    #[arg(long = "continue")]
    pub keep_going: bool,
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
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_import_defaults_to_dry_run() {
        let cli = Cli::parse_from(["dotdeploy", "import"]);
        let Command::Import(opts) = cli.command else {
            panic!("expected Import command");
        };
        assert!(!opts.apply);
        assert!(!opts.copy);
        assert!(!opts.no_backup);
        assert!(!opts.keep_going);
        assert!(opts.files.is_empty());
    }

    #[test]
    fn parse_import_flags_and_files() {
        let cli = Cli::parse_from([
            "dotdeploy",
            "import",
            "--apply",
            "--copy",
            "--no-backup",
            "--continue",
            ".zshrc",
            ".vimrc",
        ]);
        let Command::Import(opts) = cli.command else {
            panic!("expected Import command");
        };
        assert!(opts.apply);
        assert!(opts.copy);
        assert!(opts.no_backup);
        assert!(opts.keep_going);
        assert_eq!(opts.files, vec![".zshrc", ".vimrc"]);
    }

    #[test]
    fn parse_recover_latest_by_default() {
        let cli = Cli::parse_from(["dotdeploy", "recover"]);
        let Command::Recover(opts) = cli.command else {
            panic!("expected Recover command");
        };
        assert_eq!(opts.timestamp, BackupSelector::Latest);
        assert!(!opts.apply);
    }

    #[test]
    fn parse_recover_timestamp() {
        let cli = Cli::parse_from([
            "dotdeploy",
            "recover",
            "--apply",
            "--timestamp",
            "20260215071045",
        ]);
        let Command::Recover(opts) = cli.command else {
            panic!("expected Recover command");
        };
        assert!(opts.apply);
        assert_eq!(
            opts.timestamp,
            BackupSelector::Timestamp("20260215071045".to_string())
        );
    }

    #[test]
    fn parse_global_overrides() {
        let cli = Cli::parse_from([
            "dotdeploy",
            "backups",
            "--home",
            "/tmp/home",
            "--config",
            "/tmp/c.toml",
        ]);
        assert!(matches!(cli.command, Command::Backups));
        assert_eq!(cli.global.home, Some(PathBuf::from("/tmp/home")));
        assert_eq!(cli.global.config, Some(PathBuf::from("/tmp/c.toml")));
    }

    #[test]
    fn parse_verbose() {
        let cli = Cli::parse_from(["dotdeploy", "-v", "import"]);
        assert!(cli.verbose);
        assert_eq!(cli.command_name(), "import");
    }

    #[test]
    fn parse_version() {
        let cli = Cli::parse_from(["dotdeploy", "version"]);
        assert!(matches!(cli.command, Command::Version));
    }
}
