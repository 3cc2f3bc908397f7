//! Per-run export outcome.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::PathBuf;

/// Classification of a per-page failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Page no longer exists or is not accessible.
    PageNotFound,
    /// Network failure or timeout after retries.
    Transport,
    /// Page lies deeper than the configured maximum depth.
    DepthExceeded,
    /// Output file could not be written.
    Write,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::PageNotFound => "PageNotFound",
            Self::Transport => "TransportError",
            Self::DepthExceeded => "DepthExceeded",
            Self::Write => "WriteError",
        };
        f.write_str(name)
    }
}

/// Why a page failed to export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageFailure {
    /// Failure classification.
    pub kind: FailureKind,
    /// Human-readable detail.
    pub message: String,
}

impl PageFailure {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for PageFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

/// Aggregate result of one export run.
///
/// Every page that reaches the exporter ends up in exactly one of
/// `succeeded`, `failed` or `skipped`. Pages elided by the revisit guard are
/// not recorded at all.
#[derive(Debug, Default)]
pub struct ExportReport {
    succeeded: BTreeSet<String>,
    failed: BTreeMap<String, PageFailure>,
    skipped: BTreeSet<String>,
    files: Vec<PathBuf>,
}

/// Overall run status derived from an [`ExportReport`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportStatus {
    /// No page failed.
    Complete,
    /// At least one page failed and at least one was written or skipped.
    Partial,
    /// Every recorded page failed.
    Failed,
}

impl ExportReport {
    pub(crate) fn record_success(&mut self, page_id: &str, path: PathBuf) {
        debug_assert!(!self.contains(page_id), "page {page_id} recorded twice");
        self.succeeded.insert(page_id.to_owned());
        self.files.push(path);
    }

    pub(crate) fn record_failure(&mut self, page_id: &str, failure: PageFailure) {
        debug_assert!(!self.contains(page_id), "page {page_id} recorded twice");
        self.failed.insert(page_id.to_owned(), failure);
    }

    pub(crate) fn record_skip(&mut self, page_id: &str) {
        debug_assert!(!self.contains(page_id), "page {page_id} recorded twice");
        self.skipped.insert(page_id.to_owned());
    }

    /// Whether `page_id` has any recorded outcome.
    #[must_use]
    pub fn contains(&self, page_id: &str) -> bool {
        self.succeeded.contains(page_id)
            || self.failed.contains_key(page_id)
            || self.skipped.contains(page_id)
    }

    /// Pages written in this run.
    #[must_use]
    pub fn succeeded(&self) -> &BTreeSet<String> {
        &self.succeeded
    }

    /// Pages that failed, with the reason.
    #[must_use]
    pub fn failed(&self) -> &BTreeMap<String, PageFailure> {
        &self.failed
    }

    /// Pages bypassed because their output already existed.
    #[must_use]
    pub fn skipped(&self) -> &BTreeSet<String> {
        &self.skipped
    }

    /// Files written in this run, in write order.
    #[must_use]
    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    /// Number of pages with a recorded outcome.
    #[must_use]
    pub fn total(&self) -> usize {
        self.succeeded.len() + self.failed.len() + self.skipped.len()
    }

    /// Overall status of the run.
    #[must_use]
    pub fn status(&self) -> ExportStatus {
        if self.failed.is_empty() {
            ExportStatus::Complete
        } else if self.succeeded.is_empty() && self.skipped.is_empty() {
            ExportStatus::Failed
        } else {
            ExportStatus::Partial
        }
    }
}
