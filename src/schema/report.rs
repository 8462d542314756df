/// Per-document reports and the per-run tally.

use std::fmt;
use std::path::PathBuf;

/// What happened to one anchor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnchorOutcome {
    /// A field was queued; `new_declaration` is false when an existing
    /// declaration was reused.
    Wired {
        target: String,
        new_declaration: bool,
    },
    /// The anchor already owns the target field.
    AlreadyWired,
    /// No target could be determined from the label, or the target is not
    /// in the cache.
    Unresolved { reason: String },
    /// The anchor is not a candidate (category filter, or no name field).
    Ignored,
}

/// Result of linking one document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentReport {
    pub path: PathBuf,
    pub anchors: Vec<(String, AnchorOutcome)>,
    pub declarations_added: usize,
    pub written: bool,
}

impl DocumentReport {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    pub fn record(&mut self, label: String, outcome: AnchorOutcome) {
        self.anchors.push((label, outcome));
    }

    pub fn wired(&self) -> usize {
        self.count(|o| matches!(o, AnchorOutcome::Wired { .. }))
    }

    pub fn already_wired(&self) -> usize {
        self.count(|o| matches!(o, AnchorOutcome::AlreadyWired))
    }

    pub fn unresolved(&self) -> usize {
        self.count(|o| matches!(o, AnchorOutcome::Unresolved { .. }))
    }

    pub fn ignored(&self) -> usize {
        self.count(|o| matches!(o, AnchorOutcome::Ignored))
    }

    fn count(&self, pred: impl Fn(&AnchorOutcome) -> bool) -> usize {
        self.anchors.iter().filter(|(_, o)| pred(o)).count()
    }
}

/// Tally of a whole linker run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkSummary {
    pub documents_scanned: usize,
    pub documents_patched: usize,
    pub documents_unchanged: usize,
    pub documents_failed: usize,
    pub anchors_wired: usize,
    pub anchors_already_wired: usize,
    pub anchors_unresolved: usize,
    pub anchors_ignored: usize,
    pub declarations_added: usize,
    /// `(path, error message)` for every failed document.
    pub failures: Vec<(PathBuf, String)>,
}

impl LinkSummary {
    /// Fold one document's report into the tally.
    pub fn add_report(&mut self, report: &DocumentReport) {
        self.documents_scanned += 1;
        if report.wired() > 0 {
            self.documents_patched += 1;
        } else {
            self.documents_unchanged += 1;
        }
        self.anchors_wired += report.wired();
        self.anchors_already_wired += report.already_wired();
        self.anchors_unresolved += report.unresolved();
        self.anchors_ignored += report.ignored();
        self.declarations_added += report.declarations_added;
    }

    pub fn add_failure(&mut self, path: impl Into<PathBuf>, error: impl fmt::Display) {
        self.documents_scanned += 1;
        self.documents_failed += 1;
        self.failures.push((path.into(), error.to_string()));
    }

    pub fn has_failures(&self) -> bool {
        self.documents_failed > 0
    }
}

impl fmt::Display for LinkSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "documents: {} scanned, {} patched, {} unchanged, {} failed; \
             anchors: wired: {}, skipped: {}, unresolved: {}, ignored: {}; \
             declarations added: {}",
            self.documents_scanned,
            self.documents_patched,
            self.documents_unchanged,
            self.documents_failed,
            self.anchors_wired,
            self.anchors_already_wired,
            self.anchors_unresolved,
            self.anchors_ignored,
            self.declarations_added
        )
    }
}
