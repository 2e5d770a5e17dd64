// Copyright 2026 the Terrace Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracing and diagnostics for the flush loop.
//!
//! This module provides a [`TraceSink`] trait with per-event methods that
//! flush instrumentation calls at each stage. All method bodies default to
//! no-ops, so implementing only the events you care about is fine.
//!
//! [`Tracer`] wraps an optional `&mut dyn TraceSink`. When the `trace`
//! feature is **off**, every `Tracer` method compiles to nothing (zero
//! overhead). When **on**, each method performs a single `Option` branch
//! before dispatching.
//!
//! # Crate features
//!
//! - `trace` — enables the `Tracer` method bodies (one branch per call).
//! - `trace-rich` (implies `trace`) — gates per-node boundary and commit
//!   events plus the corresponding `TraceSink` methods.

#[cfg(feature = "trace-rich")]
use crate::place::CommitChanges;
use crate::place::FlushStats;

/// Which phase of a flush is being measured.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PhaseKind {
    /// Draining the layout queue (constraint solving, sizing).
    Layout,
    /// Draining the placement queue (positioning, commit batching).
    Place,
}

/// Emitted when a flush starts, before any queue is drained.
#[derive(Clone, Copy, Debug)]
pub struct FlushBeginEvent {
    /// Monotonic flush counter.
    pub flush_index: u64,
    /// Layout queue length at flush start.
    pub layout_queued: usize,
    /// Placement queue length at flush start.
    pub place_queued: usize,
}

/// Marks the beginning of a flush phase.
#[derive(Clone, Copy, Debug)]
pub struct PhaseBeginEvent {
    /// Flush counter.
    pub flush_index: u64,
    /// Which phase is starting.
    pub phase: PhaseKind,
    /// Queue length at phase start.
    pub queued: usize,
}

/// Marks the end of a flush phase.
#[derive(Clone, Copy, Debug)]
pub struct PhaseEndEvent {
    /// Flush counter.
    pub flush_index: u64,
    /// Which phase is ending.
    pub phase: PhaseKind,
    /// Queue entries that did work.
    pub processed: u32,
    /// Queue entries dropped as stale, detached, or clean.
    pub skipped: u32,
}

/// Per-flush summary emitted after both phases completed.
#[derive(Clone, Copy, Debug)]
pub struct FlushSummary {
    /// Flush counter.
    pub flush_index: u64,
    /// Work counters for the whole flush.
    pub stats: FlushStats,
    /// Nodes committed for the first time.
    pub created: usize,
    /// Nodes recommitted with new geometry.
    pub updated: usize,
    /// Nodes removed since the previous flush.
    pub removed: usize,
}

/// Receives trace events from the flush loop.
///
/// All methods have default no-op implementations, so you only need to
/// override the events you care about.
pub trait TraceSink {
    /// Called when a flush starts.
    fn on_flush_begin(&mut self, e: &FlushBeginEvent) {
        _ = e;
    }

    /// Called at the beginning of a flush phase.
    fn on_phase_begin(&mut self, e: &PhaseBeginEvent) {
        _ = e;
    }

    /// Called at the end of a flush phase.
    fn on_phase_end(&mut self, e: &PhaseEndEvent) {
        _ = e;
    }

    /// Called with a per-flush summary.
    fn on_flush_summary(&mut self, s: &FlushSummary) {
        _ = s;
    }

    /// Called for each relayout boundary the layout phase processes
    /// (requires `trace-rich` feature).
    #[cfg(feature = "trace-rich")]
    fn on_layout_boundary(&mut self, flush_index: u64, node_index: u32) {
        _ = (flush_index, node_index);
    }

    /// Called with the full commit batch before the flush returns
    /// (requires `trace-rich` feature).
    #[cfg(feature = "trace-rich")]
    fn on_commits(&mut self, flush_index: u64, changes: &CommitChanges) {
        _ = (flush_index, changes);
    }
}

/// A [`TraceSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

/// Thin wrapper around an optional [`TraceSink`].
///
/// When the `trace` feature is **off**, every method compiles to nothing.
/// When **on**, each method checks the inner `Option` (one branch) before
/// dispatching to the sink.
pub struct Tracer<'a> {
    #[cfg(feature = "trace")]
    sink: Option<&'a mut dyn TraceSink>,
    #[cfg(not(feature = "trace"))]
    _marker: core::marker::PhantomData<&'a mut dyn TraceSink>,
}

impl core::fmt::Debug for Tracer<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer").finish_non_exhaustive()
    }
}

impl<'a> Tracer<'a> {
    /// Creates a tracer that dispatches to the given sink.
    #[inline]
    #[must_use]
    pub fn new(sink: &'a mut dyn TraceSink) -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: Some(sink) }
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = sink;
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Creates a tracer that discards all events.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: None }
        }
        #[cfg(not(feature = "trace"))]
        {
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Emits a [`FlushBeginEvent`].
    #[inline]
    pub fn flush_begin(&mut self, e: &FlushBeginEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_flush_begin(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`PhaseBeginEvent`].
    #[inline]
    pub fn phase_begin(&mut self, e: &PhaseBeginEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_phase_begin(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`PhaseEndEvent`].
    #[inline]
    pub fn phase_end(&mut self, e: &PhaseEndEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_phase_end(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`FlushSummary`].
    #[inline]
    pub fn flush_summary(&mut self, s: &FlushSummary) {
        #[cfg(feature = "trace")]
        if let Some(sink) = &mut self.sink {
            sink.on_flush_summary(s);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = s;
        }
    }

    /// Emits a per-boundary layout event (requires `trace-rich` feature).
    #[cfg(feature = "trace-rich")]
    #[inline]
    pub fn layout_boundary(&mut self, flush_index: u64, node_index: u32) {
        if let Some(s) = &mut self.sink {
            s.on_layout_boundary(flush_index, node_index);
        }
    }

    /// Emits the commit batch (requires `trace-rich` feature).
    #[cfg(feature = "trace-rich")]
    #[inline]
    pub fn commits(&mut self, flush_index: u64, changes: &CommitChanges) {
        if let Some(s) = &mut self.sink {
            s.on_commits(flush_index, changes);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_begin() -> FlushBeginEvent {
        FlushBeginEvent {
            flush_index: 7,
            layout_queued: 3,
            place_queued: 1,
        }
    }

    #[test]
    fn noop_sink_compiles() {
        let mut sink = NoopSink;
        sink.on_flush_begin(&sample_begin());
        sink.on_phase_begin(&PhaseBeginEvent {
            flush_index: 7,
            phase: PhaseKind::Layout,
            queued: 3,
        });
        sink.on_flush_summary(&FlushSummary {
            flush_index: 7,
            stats: FlushStats::default(),
            created: 0,
            updated: 0,
            removed: 0,
        });
    }

    #[test]
    fn tracer_none_does_nothing() {
        let mut tracer = Tracer::none();
        tracer.flush_begin(&sample_begin());
        tracer.phase_end(&PhaseEndEvent {
            flush_index: 7,
            phase: PhaseKind::Place,
            processed: 1,
            skipped: 0,
        });
    }

    #[cfg(feature = "trace")]
    #[test]
    fn tracer_dispatches_to_sink() {
        use alloc::vec::Vec;

        struct RecordingSink {
            flushes: Vec<u64>,
        }
        impl TraceSink for RecordingSink {
            fn on_flush_begin(&mut self, e: &FlushBeginEvent) {
                self.flushes.push(e.flush_index);
            }
        }

        let mut sink = RecordingSink {
            flushes: Vec::new(),
        };
        let mut tracer = Tracer::new(&mut sink);
        tracer.flush_begin(&sample_begin());
        drop(tracer);
        assert_eq!(sink.flushes, &[7]);
    }
}
