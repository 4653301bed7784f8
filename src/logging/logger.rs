//! Structured logger with dry-run awareness and summary collection.
use std::path::PathBuf;
use std::sync::Mutex;

use super::types::{Log, Outcome, OutcomeStatus};
use super::utils::log_file_path;

/// Implement the display methods of [`Log`] by delegating to inherent methods
/// of the same name on the implementing type.
macro_rules! forward_log_methods {
    ($($method:ident),+ $(,)?) => {
        $(
            fn $method(&self, msg: &str) {
                self.$method(msg);
            }
        )+
    };
}

/// Counts per [`OutcomeStatus`] for one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
    /// Mappings deployed or recovered.
    pub ok: usize,
    /// Mappings with nothing to do.
    pub skipped: usize,
    /// Mappings only previewed.
    pub dry_run: usize,
    /// Mappings that failed.
    pub failed: usize,
}

impl Tally {
    /// Total number of mappings processed.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.ok + self.skipped + self.dry_run + self.failed
    }
}

/// Structured logger with dry-run awareness and summary collection.
///
/// Every message is also written to `$XDG_CACHE_HOME/dotdeploy/<command>.log`
/// by the subscriber's file layer, regardless of the verbose flag.
#[derive(Debug)]
pub struct Logger {
    outcomes: Mutex<Vec<Outcome>>,
    log_file: Option<PathBuf>,
}

impl Logger {
    /// Create a logger for `command`.
    ///
    /// Only remembers the log file path for the summary; the file itself is
    /// created by [`init_subscriber`](super::subscriber::init_subscriber).
    #[must_use]
    pub fn new(command: &str) -> Self {
        Self::with_log_file(log_file_path(command))
    }

    /// Create a logger that reports `log_file` in its summary.
    #[must_use]
    pub const fn with_log_file(log_file: Option<PathBuf>) -> Self {
        Self {
            outcomes: Mutex::new(Vec::new()),
            log_file,
        }
    }

    /// Return the log file path, if available.
    #[must_use]
    pub const fn log_path(&self) -> Option<&PathBuf> {
        self.log_file.as_ref()
    }

    /// Return a clone of all recorded outcomes.
    #[must_use]
    pub fn outcomes(&self) -> Vec<Outcome> {
        self.outcomes.lock().map_or_else(|_| vec![], |g| g.clone())
    }

    /// Log an error message.
    pub fn error(&self, msg: &str) {
        tracing::error!("{msg}");
    }

    /// Log a warning message.
    pub fn warn(&self, msg: &str) {
        tracing::warn!("{msg}");
    }

    /// Log a stage header (major section).
    pub fn stage(&self, msg: &str) {
        tracing::info!(target: "dotdeploy::stage", "{msg}");
    }

    /// Log an informational message.
    pub fn info(&self, msg: &str) {
        tracing::info!("{msg}");
    }

    /// Log a debug message (console only when verbose; always in the file).
    pub fn debug(&self, msg: &str) {
        tracing::debug!("{msg}");
    }

    /// Log a dry-run action message.
    pub fn dry_run(&self, msg: &str) {
        tracing::info!(target: "dotdeploy::dry_run", "{msg}");
    }

    /// Record a mapping outcome for the summary.
    pub fn record(&self, name: &str, status: OutcomeStatus, message: Option<&str>) {
        if let Ok(mut guard) = self.outcomes.lock() {
            guard.push(Outcome {
                name: name.to_string(),
                status,
                message: message.map(String::from),
            });
        }
    }

    /// Count recorded outcomes by status.
    #[must_use]
    pub fn tally(&self) -> Tally {
        self.outcomes.lock().map_or_else(
            |_| Tally::default(),
            |guard| {
                guard.iter().fold(Tally::default(), |mut t, o| {
                    match o.status {
                        OutcomeStatus::Ok => t.ok += 1,
                        OutcomeStatus::Skipped => t.skipped += 1,
                        OutcomeStatus::DryRun => t.dry_run += 1,
                        OutcomeStatus::Failed => t.failed += 1,
                    }
                    t
                })
            },
        )
    }

    /// Return `true` if any recorded mapping has failed.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.tally().failed > 0
    }

    /// Print the closing summary: failed mappings, counts, and log location.
    #[allow(clippy::print_stdout)]
    pub fn print_summary(&self) {
        let tally = self.tally();
        if tally.total() == 0 {
            return;
        }

        println!();
        self.stage("Summary");

        for outcome in self.outcomes() {
            if outcome.status == OutcomeStatus::Failed {
                let suffix = outcome
                    .message
                    .as_ref()
                    .map_or_else(String::new, |msg| format!(" ({msg})"));
                self.info(&format!("\x1b[31m✗ {}{suffix}\x1b[0m", outcome.name));
            }
        }

        self.info(&format!(
            "{} mappings: \x1b[32m{} ok\x1b[0m, \x1b[33m{} skipped\x1b[0m, \x1b[37m{} dry-run\x1b[0m, \x1b[31m{} failed\x1b[0m",
            tally.total(),
            tally.ok,
            tally.skipped,
            tally.dry_run,
            tally.failed,
        ));

        if let Some(path) = &self.log_file {
            self.info(&format!("\x1b[2mlog: {}\x1b[0m", path.display()));
        }
    }
}

impl Log for Logger {
    forward_log_methods!(stage, info, debug, warn, error, dry_run);

    fn record(&self, name: &str, status: OutcomeStatus, message: Option<&str>) {
        self.record(name, status, message);
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::logging::isolated_logger;
    use std::fs;

    #[test]
    fn logger_new_is_empty() {
        let (log, _tmp, _guard) = isolated_logger();
        assert!(log.outcomes().is_empty());
        assert_eq!(log.tally().total(), 0);
    }

    #[test]
    fn record_with_message() {
        let (log, _tmp, _guard) = isolated_logger();
        log.record(".zshrc", OutcomeStatus::Skipped, Some("not found in repository"));
        let outcomes = log.outcomes();
        assert_eq!(outcomes.len(), 1);
        assert_eq!(outcomes[0].name, ".zshrc");
        assert_eq!(
            outcomes[0].message.as_deref(),
            Some("not found in repository")
        );
    }

    #[test]
    fn tally_counts_each_status() {
        let (log, _tmp, _guard) = isolated_logger();
        log.record("a", OutcomeStatus::Ok, None);
        log.record("b", OutcomeStatus::Failed, Some("error 1"));
        log.record("c", OutcomeStatus::Failed, Some("error 2"));
        log.record("d", OutcomeStatus::Skipped, None);
        log.record("e", OutcomeStatus::DryRun, None);
        assert_eq!(
            log.tally(),
            Tally {
                ok: 1,
                skipped: 1,
                dry_run: 1,
                failed: 2,
            }
        );
        assert!(log.has_failures());
    }

    #[test]
    fn log_trait_delegates_to_logger() {
        let (log, _tmp, _guard) = isolated_logger();
        let log_ref: &dyn Log = &log;
        log_ref.warn("restore it by hand");
        log_ref.record("via-trait", OutcomeStatus::Ok, None);
        assert_eq!(log.outcomes().len(), 1);
        assert!(!log.has_failures());

        let contents = fs::read_to_string(log.log_path().expect("log path")).unwrap();
        assert!(contents.contains("[warn] restore it by hand"));
    }

    #[test]
    fn messages_reach_log_file() {
        let (log, _tmp, _guard) = isolated_logger();
        let marker = format!("marker-{}", std::process::id());
        log.stage(&format!("stage-{marker}"));
        log.dry_run(&format!("dry-{marker}"));
        log.debug(&format!("debug-{marker}"));
        log.error(&format!("error-{marker}"));

        let contents = fs::read_to_string(log.log_path().expect("log path")).unwrap();
        assert!(contents.contains(&format!("==> stage-{marker}")));
        assert!(contents.contains(&format!("[dry run] dry-{marker}")));
        assert!(contents.contains(&format!("debug-{marker}")));
        assert!(contents.contains(&format!("[error] error-{marker}")));
    }

    #[test]
    fn summary_lists_failures_and_counts() {
        let (log, _tmp, _guard) = isolated_logger();
        log.record(".vimrc", OutcomeStatus::Failed, Some("permission denied"));
        log.record(".zshrc", OutcomeStatus::Ok, None);
        log.print_summary();

        let contents = fs::read_to_string(log.log_path().expect("log path")).unwrap();
        assert!(contents.contains("✗ .vimrc (permission denied)"));
        assert!(contents.contains("2 mappings: 1 ok, 0 skipped, 0 dry-run, 1 failed"));
    }
}
