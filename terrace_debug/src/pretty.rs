// Copyright 2026 the Terrace Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] implements [`TraceSink`] and writes one line per event
//! to a [`Write`](std::io::Write) destination (default: stderr).

use std::io::Write;

use terrace_core::trace::{
    FlushBeginEvent, FlushSummary, PhaseBeginEvent, PhaseEndEvent, PhaseKind, TraceSink,
};

/// Writes human-readable trace lines to a [`Write`](std::io::Write) destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write>> {
    writer: W,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink").finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self {
            writer: Box::new(std::io::stderr()),
        }
    }

    /// Creates a sink that writes to a boxed writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write>) -> Self {
        Self { writer }
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W) -> Self {
        Self { writer }
    }
}

fn phase_name(phase: PhaseKind) -> &'static str {
    match phase {
        PhaseKind::Layout => "layout",
        PhaseKind::Place => "place",
    }
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_flush_begin(&mut self, e: &FlushBeginEvent) {
        let _ = writeln!(
            self.writer,
            "[flush] index={} layout_queued={} place_queued={}",
            e.flush_index, e.layout_queued, e.place_queued,
        );
    }

    fn on_phase_begin(&mut self, e: &PhaseBeginEvent) {
        let _ = writeln!(
            self.writer,
            "[phase:begin] index={} {} queued={}",
            e.flush_index,
            phase_name(e.phase),
            e.queued,
        );
    }

    fn on_phase_end(&mut self, e: &PhaseEndEvent) {
        let _ = writeln!(
            self.writer,
            "[phase:end] index={} {} processed={} skipped={}",
            e.flush_index,
            phase_name(e.phase),
            e.processed,
            e.skipped,
        );
    }

    fn on_flush_summary(&mut self, s: &FlushSummary) {
        let _ = writeln!(
            self.writer,
            "[summary] index={} laid_out={} placed={} committed={} skipped={} \
             created={} updated={} removed={}",
            s.flush_index,
            s.stats.laid_out,
            s.stats.placed,
            s.stats.committed,
            s.stats.skipped,
            s.created,
            s.updated,
            s.removed,
        );
    }

    fn on_layout_boundary(&mut self, flush_index: u64, node_index: u32) {
        let _ = writeln!(
            self.writer,
            "[boundary] index={flush_index} node={node_index}",
        );
    }

    fn on_commits(&mut self, flush_index: u64, changes: &terrace_core::place::CommitChanges) {
        let _ = writeln!(
            self.writer,
            "[commits] index={flush_index} created={:?} updated={:?} removed={:?}",
            changes.created, changes.updated, changes.removed,
        );
    }
}
