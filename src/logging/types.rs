//! Core logging types: mapping outcomes, status, and the [`Log`] trait.

/// Result of one mapping, kept for the run summary.
#[derive(Debug, Clone)]
pub struct Outcome {
    /// Mapping name as shown to the user.
    pub name: String,
    /// Final status of the mapping.
    pub status: OutcomeStatus,
    /// Optional detail (skip reason or error description).
    pub message: Option<String>,
}

/// Status of a processed mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeStatus {
    /// Deployed or recovered.
    Ok,
    /// Nothing to do (source missing, no backup, ...).
    Skipped,
    /// Dry run; the action was only previewed.
    DryRun,
    /// The mapping aborted with an error.
    Failed,
}

/// Abstraction over logging backends.
///
/// Command code logs through this trait so tests can substitute a logger
/// whose output goes to an isolated subscriber.
pub trait Log: Send + Sync {
    /// Log a stage header (major section).
    fn stage(&self, msg: &str);
    /// Log an informational message.
    fn info(&self, msg: &str);
    /// Log a debug message (may be suppressed on console).
    fn debug(&self, msg: &str);
    /// Log a warning message.
    fn warn(&self, msg: &str);
    /// Log an error message.
    fn error(&self, msg: &str);
    /// Log a dry-run action message.
    fn dry_run(&self, msg: &str);
    /// Record a mapping outcome for the summary.
    fn record(&self, name: &str, status: OutcomeStatus, message: Option<&str>);
}
