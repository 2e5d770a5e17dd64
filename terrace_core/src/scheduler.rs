// Copyright 2026 the Terrace Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Flush scheduling across mounted view roots.
//!
//! The [`Scheduler`] owns the layout and placement work queues fed by the
//! [`NodeStore`] mark operations, the registered view roots, the node-type
//! factory registry, and one-shot after-flush callbacks. Any dirty mark
//! arms a pending batch idempotently; the embedder observes the arming via
//! [`Scheduler::take_wake`] and calls [`Scheduler::flush`] from its event
//! loop. Calling `flush` directly at any time is the forced synchronous
//! variant of the same batch.
//!
//! A flush runs three steps:
//!
//! 1. **Layout** — drain the layout queue in ascending depth order so
//!    ancestors run before descendants. Entries that are stale, detached,
//!    clean, or without an established relayout boundary are dropped; each
//!    survivor re-runs its strategy against its stored constraints.
//! 2. **Place** — drain the placement queue the same way, resolving
//!    positions and collecting the commit batch.
//! 3. **Callbacks** — run the one-shot after-flush callbacks; work they
//!    schedule lands in the next batch.
//!
//! Queues tolerate duplicate and stale entries: every entry is re-checked
//! at dequeue time.

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt;

use kurbo::Size;

use crate::backend::{RootError, WidgetBinding};
use crate::geometry::Constraints;
use crate::node::{INVALID, NodeId, NodeKind, NodeStore, RootToken};
use crate::place::CommitChanges;
use crate::trace::{
    FlushBeginEvent, FlushSummary, PhaseBeginEvent, PhaseEndEvent, PhaseKind, Tracer,
};

/// Maps an embedder-supplied type name to a node kind.
///
/// Registered via [`Scheduler::register_node_factory`] and consulted in
/// registration order by [`Scheduler::create_node_by_type`]. Returning
/// `None` passes the name on to the next factory.
pub type NodeFactory = Box<dyn Fn(&str) -> Option<NodeKind>>;

/// One-shot callback run after a flush completes.
pub type AfterFlush = Box<dyn FnOnce(&mut Scheduler, &mut NodeStore)>;

/// Work-queue owner and flush driver.
///
/// The scheduler is constructed explicitly and passed to every store
/// mutation that can invalidate layout or placement, keeping the
/// scheduling side effect visible at the call site. It never touches
/// platform facilities itself; the embedder supplies surface dimensions
/// through a [`WidgetBinding`] at mount time and drives flushes from its
/// own event loop.
#[derive(Default)]
pub struct Scheduler {
    pub(crate) layout_queue: Vec<NodeId>,
    pub(crate) place_queue: Vec<NodeId>,
    armed: bool,
    flush_index: u64,
    roots: Vec<(NodeId, RootToken)>,
    factories: Vec<NodeFactory>,
    after_flush: Vec<AfterFlush>,
}

impl fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scheduler")
            .field("layout_queue", &self.layout_queue)
            .field("place_queue", &self.place_queue)
            .field("armed", &self.armed)
            .field("flush_index", &self.flush_index)
            .field("roots", &self.roots)
            .field("factories", &self.factories.len())
            .field("after_flush", &self.after_flush.len())
            .finish()
    }
}

impl Scheduler {
    /// Creates an empty scheduler with no mounted roots.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // -- Queue feeding (called by the store's mark operations) --

    pub(crate) fn request_layout(&mut self, id: NodeId) {
        self.layout_queue.push(id);
        self.armed = true;
    }

    pub(crate) fn request_place(&mut self, id: NodeId) {
        self.place_queue.push(id);
        self.armed = true;
    }

    /// Consumes the pending-batch flag.
    ///
    /// Returns `true` when work has been scheduled since the last flush (or
    /// the last `take_wake` call); the embedder reacts by scheduling a
    /// [`flush`](Self::flush) on its event loop. Arming is idempotent, so
    /// any number of mutations produce a single wake.
    #[must_use]
    pub fn take_wake(&mut self) -> bool {
        core::mem::replace(&mut self.armed, false)
    }

    /// Whether a batch is currently armed.
    #[must_use]
    pub fn is_armed(&self) -> bool {
        self.armed
    }

    // -- View roots --

    /// Mounts `root` as a view root driven by the surface behind `token`.
    ///
    /// The surface dimensions are queried from the binding once and seeded
    /// as the root's tight constraints; later changes arrive through
    /// [`resize_root`](Self::resize_root). The subtree attaches at depth 0
    /// and its initial layout and placement are scheduled.
    ///
    /// # Errors
    ///
    /// Returns [`RootError::SurfaceUnavailable`] when the binding cannot
    /// report dimensions for `token`.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale, the node is not a [`NodeKind::Root`],
    /// the node has a parent, or the node or token is already mounted.
    pub fn mount_root<B>(
        &mut self,
        store: &mut NodeStore,
        root: NodeId,
        token: RootToken,
        binding: &B,
    ) -> Result<(), RootError>
    where
        B: WidgetBinding + ?Sized,
    {
        store.validate(root);
        let idx = root.index();
        assert!(
            matches!(store.kind[idx as usize], NodeKind::Root),
            "mount_root on a {} node: {root:?}",
            store.kind[idx as usize].name()
        );
        assert!(
            store.parent[idx as usize] == INVALID,
            "cannot mount {root:?}: it has a parent"
        );
        assert!(
            !self.roots.iter().any(|&(node, _)| node == root),
            "root {root:?} is already mounted"
        );
        assert!(
            !self.roots.iter().any(|&(_, t)| t == token),
            "{token:?} is already bound to another root"
        );

        let size = binding
            .surface_size(token)
            .ok_or(RootError::SurfaceUnavailable(token))?;
        store.constraints[idx as usize] = Constraints::tight(size);

        // A root is always its own relayout boundary. Establishing that
        // before the attach lets the replay queue the initial layout.
        store.relayout_boundary[idx as usize] = idx;
        store.attach_subtree(idx, 0, self);
        self.roots.push((root, token));
        Ok(())
    }

    /// Unmounts a view root, detaching its subtree.
    ///
    /// Pending queue entries for the subtree become no-ops. The nodes stay
    /// alive and keep their dirty flags; remounting replays them.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale or the node is not a mounted root.
    pub fn unmount_root(&mut self, store: &mut NodeStore, root: NodeId) {
        store.validate(root);
        let Some(pos) = self.roots.iter().position(|&(node, _)| node == root) else {
            panic!("unmount_root: {root:?} is not a mounted root");
        };
        self.roots.remove(pos);
        store.detach_subtree(root.index());
    }

    /// Re-seeds a mounted root's constraints after its surface changed
    /// dimensions and schedules a relayout of the whole tree.
    ///
    /// # Panics
    ///
    /// Panics if no mounted root is bound to `token`.
    pub fn resize_root(&mut self, store: &mut NodeStore, token: RootToken, size: Size) {
        let Some(&(root, _)) = self.roots.iter().find(|&&(_, t)| t == token) else {
            panic!("resize_root: no mounted root for {token:?}");
        };
        let tight = Constraints::tight(size);
        if store.constraints[root.index() as usize] == tight {
            return;
        }
        store.constraints[root.index() as usize] = tight;
        store.mark_needs_layout(root, self);
    }

    /// Currently mounted view roots, in mount order.
    #[must_use]
    pub fn mounted_roots(&self) -> &[(NodeId, RootToken)] {
        &self.roots
    }

    // -- Node factories --

    /// Registers a factory consulted by
    /// [`create_node_by_type`](Self::create_node_by_type).
    pub fn register_node_factory(&mut self, factory: NodeFactory) {
        self.factories.push(factory);
    }

    /// Creates a node whose kind is resolved from an embedder type name.
    ///
    /// Factories are consulted in registration order; the first to return a
    /// kind wins. Unrecognized names produce a [`NodeKind::Unknown`] node,
    /// which sizes to the smallest extent its constraints allow.
    #[must_use]
    pub fn create_node_by_type(&self, store: &mut NodeStore, type_name: &str) -> NodeId {
        for factory in &self.factories {
            if let Some(kind) = factory(type_name) {
                return store.create_node(kind);
            }
        }
        store.create_node(NodeKind::Unknown)
    }

    // -- Callbacks --

    /// Registers a one-shot callback to run after the next flush.
    ///
    /// Arms the batch so the callback runs even when no other work is
    /// pending.
    pub fn schedule_after_flush<F>(&mut self, callback: F)
    where
        F: FnOnce(&mut Scheduler, &mut NodeStore) + 'static,
    {
        self.after_flush.push(Box::new(callback));
        self.armed = true;
    }

    // -- Flushing --

    /// Runs the pending batch and returns the commit changes.
    pub fn flush(&mut self, store: &mut NodeStore) -> CommitChanges {
        let mut changes = CommitChanges::default();
        self.flush_into(store, &mut changes);
        changes
    }

    /// Like [`flush`](Self::flush), but reuses a caller-provided buffer to
    /// avoid allocation.
    pub fn flush_into(&mut self, store: &mut NodeStore, changes: &mut CommitChanges) {
        self.flush_with(store, changes, Tracer::none());
    }

    /// Like [`flush_into`](Self::flush_into), emitting trace events to the
    /// given tracer.
    pub fn flush_with(
        &mut self,
        store: &mut NodeStore,
        changes: &mut CommitChanges,
        mut tracer: Tracer<'_>,
    ) {
        changes.clear();
        self.flush_index += 1;
        let flush_index = self.flush_index;
        tracer.flush_begin(&FlushBeginEvent {
            flush_index,
            layout_queued: self.layout_queue.len(),
            place_queued: self.place_queue.len(),
        });

        // Layout phase. The queue cannot grow while draining today, but
        // the loop keeps late arrivals from leaking into the next flush.
        tracer.phase_begin(&PhaseBeginEvent {
            flush_index,
            phase: PhaseKind::Layout,
            queued: self.layout_queue.len(),
        });
        let before = changes.stats.skipped;
        while !self.layout_queue.is_empty() {
            let mut queue = core::mem::take(&mut self.layout_queue);
            queue.sort_unstable_by_key(|id| store.depth[id.index() as usize]);
            for id in queue {
                let i = id.index() as usize;
                if !store.is_alive(id)
                    || !store.attached[i]
                    || !store.needs_layout[i]
                    || store.relayout_boundary[i] == INVALID
                {
                    changes.stats.skipped += 1;
                    continue;
                }
                store.relayout_idx(id.index(), self);
                changes.stats.laid_out += 1;
                #[cfg(feature = "trace-rich")]
                tracer.layout_boundary(flush_index, id.index());
            }
        }
        tracer.phase_end(&PhaseEndEvent {
            flush_index,
            phase: PhaseKind::Layout,
            processed: changes.stats.laid_out,
            skipped: changes.stats.skipped - before,
        });

        // Place phase.
        tracer.phase_begin(&PhaseBeginEvent {
            flush_index,
            phase: PhaseKind::Place,
            queued: self.place_queue.len(),
        });
        let before = changes.stats.skipped;
        let mut processed = 0;
        while !self.place_queue.is_empty() {
            let mut queue = core::mem::take(&mut self.place_queue);
            queue.sort_unstable_by_key(|id| store.depth[id.index() as usize]);
            for id in queue {
                let i = id.index() as usize;
                if !store.is_alive(id) || !store.attached[i] || !store.needs_place[i] {
                    changes.stats.skipped += 1;
                    continue;
                }
                store.place_idx(id.index(), None, changes);
                processed += 1;
            }
        }
        tracer.phase_end(&PhaseEndEvent {
            flush_index,
            phase: PhaseKind::Place,
            processed,
            skipped: changes.stats.skipped - before,
        });

        // Destroyed slots surface exactly once, in this flush's batch.
        core::mem::swap(&mut store.pending_removed, &mut changes.removed);

        // Work queued during the passes was consumed by them; only marks
        // made by the callbacks below should re-arm.
        self.armed = false;

        tracer.flush_summary(&FlushSummary {
            flush_index,
            stats: changes.stats,
            created: changes.created.len(),
            updated: changes.updated.len(),
            removed: changes.removed.len(),
        });
        #[cfg(feature = "trace-rich")]
        tracer.commits(flush_index, changes);

        for callback in core::mem::take(&mut self.after_flush) {
            callback(self, store);
        }
    }

    /// Discards all pending work without running it.
    ///
    /// Queues are emptied, dirty flags across the store are lowered, and
    /// registered after-flush callbacks are dropped. The tree keeps its
    /// last computed geometry; records of destroyed nodes are retained and
    /// surface in the next flush. Later mutations schedule normally.
    pub fn cancel(&mut self, store: &mut NodeStore) {
        self.layout_queue.clear();
        self.place_queue.clear();
        for i in 0..store.len as usize {
            store.needs_layout[i] = false;
            store.needs_place[i] = false;
            store.must_commit[i] = false;
        }
        self.after_flush.clear();
        self.armed = false;
    }
}
