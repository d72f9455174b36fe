//! `ExecutionContext`: the per-invocation state the evaluator writes into.
//!
//! One context belongs to exactly one evaluation. The snapshot is only ever
//! read; changes and output are append-only, in discovery order.

use crate::change::apply_changes;
use crate::error::SamError;
use crate::host::ShellFilter;
use crate::region::{Change, Region};
use crate::snapshot::Snapshot;

pub(crate) struct ExecutionContext<'a> {
    pub(crate) snapshot: &'a Snapshot,
    /// Runs `|cmd` filters.
    pub(crate) shell: &'a dyn ShellFilter,
    pub(crate) changes: Vec<Change>,
    pub(crate) output: String,
    /// Pipe failures are collected here instead of aborting the walk.
    pub(crate) pipe_failures: Vec<SamError>,
}

impl<'a> ExecutionContext<'a> {
    pub(crate) fn new(snapshot: &'a Snapshot, shell: &'a dyn ShellFilter) -> Self {
        Self {
            snapshot,
            shell,
            changes: Vec::new(),
            output: String::new(),
            pipe_failures: Vec::new(),
        }
    }

    pub(crate) fn text(&self, region: Region) -> &'a str {
        self.snapshot.slice(region)
    }

    pub(crate) fn record(&mut self, change: Change) {
        self.changes.push(change);
    }

    /// Consume the context once the walk has finished.
    pub(crate) fn finish(self) -> Evaluation {
        Evaluation {
            changes: self.changes,
            output: self.output,
            pipe_failures: self.pipe_failures,
        }
    }
}

/// Everything a completed evaluation produced.
#[derive(Debug, Default)]
pub struct Evaluation {
    /// Pending edits against the snapshot, in discovery order.
    pub changes: Vec<Change>,
    /// Accumulated `p` output, one newline-terminated entry per print.
    pub output: String,
    /// Pipe failures that were reported and skipped.
    pub pipe_failures: Vec<SamError>,
}

impl Evaluation {
    /// Splice the recorded changes into `snapshot`, producing the new buffer text.
    pub fn apply(&self, snapshot: &Snapshot) -> Result<String, SamError> {
        apply_changes(snapshot.text(), &self.changes)
    }

    pub fn has_changes(&self) -> bool {
        !self.changes.is_empty()
    }

    /// Number of output lines, ignoring the final newline.
    pub fn output_lines(&self) -> usize {
        self.output.lines().count()
    }
}
