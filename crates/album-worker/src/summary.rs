//! Run results

use std::collections::BTreeMap;
use std::fmt;

use album_core::models::PhotoId;
use serde::Serialize;

use crate::error::{FailureKind, ThumbnailError};

/// Result of processing one photo successfully
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessOutcome {
    /// Already had a thumbnail; nothing was touched
    Skipped,
    /// Thumbnail stored and its public URL saved on the record
    Generated { url: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordFailure {
    pub photo_id: PhotoId,
    pub kind: FailureKind,
    pub detail: String,
}

/// Totals for one `process_all` pass.
///
/// `considered` counts photos handed to a worker; on cancellation
/// `not_started` counts listed photos that never were.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub considered: usize,
    pub skipped: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub not_started: usize,
    pub failures: Vec<RecordFailure>,
    pub cancelled: bool,
}

impl RunSummary {
    pub fn record(&mut self, photo_id: PhotoId, result: Result<ProcessOutcome, ThumbnailError>) {
        self.considered += 1;
        match result {
            Ok(ProcessOutcome::Skipped) => self.skipped += 1,
            Ok(ProcessOutcome::Generated { .. }) => self.succeeded += 1,
            Err(e) => {
                self.failed += 1;
                self.failures.push(RecordFailure {
                    photo_id,
                    kind: e.kind(),
                    detail: e.detail().to_string(),
                });
            }
        }
    }

    /// Failures grouped by pipeline step, in pipeline order.
    pub fn failures_by_kind(&self) -> BTreeMap<FailureKind, Vec<&RecordFailure>> {
        let mut grouped: BTreeMap<FailureKind, Vec<&RecordFailure>> = BTreeMap::new();
        for failure in &self.failures {
            grouped.entry(failure.kind).or_default().push(failure);
        }
        grouped
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Photos considered: {}", self.considered)?;
        writeln!(f, "  skipped (already processed): {}", self.skipped)?;
        writeln!(f, "  succeeded: {}", self.succeeded)?;
        writeln!(f, "  failed: {}", self.failed)?;
        for (kind, failures) in self.failures_by_kind() {
            writeln!(f, "    {}: {}", kind, failures.len())?;
            for failure in failures {
                writeln!(f, "      {}: {}", failure.photo_id, failure.detail)?;
            }
        }
        if self.cancelled {
            writeln!(f, "Run cancelled; {} photo(s) not started", self.not_started)?;
        }
        Ok(())
    }
}

/// Totals for a thumbnail purge
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PurgeSummary {
    pub removed: usize,
    pub failed: usize,
}

impl fmt::Display for PurgeSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Thumbnails removed: {}, failed: {}", self.removed, self.failed)
    }
}
