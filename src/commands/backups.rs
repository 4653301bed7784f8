//! Command: list backup generations of every configured dotfile.
use anyhow::Result;

use crate::cli::GlobalOpts;
use crate::commands::CommandSetup;
use crate::engine::{self, BackupEntry, Mapping};
use crate::logging::Logger;

/// Run the backups command.
///
/// # Errors
///
/// Returns an error if setup fails.
pub fn run(global: &GlobalOpts, log: &Logger) -> Result<()> {
    let setup = CommandSetup::init(global, log)?;
    let mappings = setup.env.mappings(&setup.config.dotfiles, &[]);

    log.stage("Backups");
    let listing = collect(&mappings);
    if listing.is_empty() {
        log.info("no backups found");
        return Ok(());
    }
    for (name, backups) in &listing {
        log.info(&format!("{name} ({})", backups.len()));
        for backup in backups {
            log.info(&format!("  {}  {}", backup.timestamp, backup.path.display()));
        }
    }
    Ok(())
}

/// Backups per mapping, newest first; mappings without backups are omitted.
#[must_use]
pub fn collect(mappings: &[Mapping]) -> Vec<(String, Vec<BackupEntry>)> {
    mappings
        .iter()
        .map(|m| (m.name.clone(), engine::find_backups_for(&m.destination)))
        .filter(|(_, backups)| !backups.is_empty())
        .collect()
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::engine::EntryKind;

    #[test]
    fn collect_groups_backups_per_mapping() {
        let home = tempfile::tempdir().unwrap();
        let config_dir = home.path().join(".config");
        std::fs::create_dir(&config_dir).unwrap();
        std::fs::create_dir(config_dir.join("nvim.backup.20260101000000")).unwrap();
        std::fs::write(home.path().join(".zshrc.backup.20250101000000"), "a").unwrap();
        std::fs::write(home.path().join(".zshrc.backup.20260101000000"), "b").unwrap();

        let mappings = [
            Mapping {
                name: ".zshrc".to_string(),
                source: home.path().join("repo/.zshrc"),
                destination: home.path().join(".zshrc"),
                kind: EntryKind::File,
            },
            Mapping {
                name: ".vimrc".to_string(),
                source: home.path().join("repo/.vimrc"),
                destination: home.path().join(".vimrc"),
                kind: EntryKind::File,
            },
            Mapping {
                name: "nvim -> .config/nvim".to_string(),
                source: home.path().join("repo/nvim"),
                destination: config_dir.join("nvim"),
                kind: EntryKind::Directory,
            },
        ];

        let listing = collect(&mappings);
        assert_eq!(listing.len(), 2);
        assert_eq!(listing[0].0, ".zshrc");
        let stamps: Vec<&str> = listing[0].1.iter().map(|b| b.timestamp.as_str()).collect();
        assert_eq!(stamps, ["20260101000000", "20250101000000"]);
        assert_eq!(listing[1].0, "nvim -> .config/nvim");
    }
}
