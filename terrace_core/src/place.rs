// Copyright 2026 the Terrace Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Placement pass and commit batching.
//!
//! Placement turns the parent-relative offsets produced by layout into
//! positions relative to the nearest coordinate origin, and decides which
//! nodes the embedder must hear about this flush:
//!
//! 1. A node's position is its parent's position plus its own offset.
//!    Children of an *origin* node restart at the origin instead, so a
//!    moving origin never touches its descendants (the embedder composes
//!    origin transforms natively).
//! 2. A node is committed when it moved, when its size differs from the
//!    last committed size, when a forced commit was requested, or when it
//!    has never been committed at all. Everything else is skipped.
//! 3. When a node moves, placement recurses into its children, since their
//!    positions derive from it. A clean node's children are reached only
//!    through their own queue entries.
//!
//! [`CommitChanges`] uses raw slot indices (`u32`) rather than [`NodeId`]
//! handles so that backends can index directly into the store's SoA arrays
//! via the `*_at()` accessors (e.g.
//! [`position_at`](crate::node::NodeStore::position_at)) without paying for
//! generation checks on every access.
//!
//! [`NodeId`]: crate::node::NodeId

use alloc::vec::Vec;

use kurbo::Point;

use crate::node::{INVALID, NodeId, NodeStore};
use crate::scheduler::Scheduler;

/// Counters describing the work one flush performed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FlushStats {
    /// Relayout boundaries processed from the layout queue.
    pub laid_out: u32,
    /// Nodes visited by the placement pass.
    pub placed: u32,
    /// Nodes whose geometry was handed to the backend.
    pub committed: u32,
    /// Queue entries dropped as stale, detached, or already clean.
    pub skipped: u32,
}

/// The batch of geometry changes produced by a single flush.
///
/// Each list contains the raw slot indices of the nodes involved. Backends
/// apply the lists in order: `removed` first, then `created`, then
/// `updated`, so that a slot recycled within one flush deletes the old
/// native widget before the new one appears.
#[derive(Clone, Debug, Default)]
pub struct CommitChanges {
    /// Nodes committed for the first time.
    pub created: Vec<u32>,
    /// Previously committed nodes whose position or size changed.
    pub updated: Vec<u32>,
    /// Nodes destroyed since the last flush.
    pub removed: Vec<u32>,
    /// Work counters for this flush.
    pub stats: FlushStats,
}

impl CommitChanges {
    /// Clears all change lists and counters.
    pub fn clear(&mut self) {
        self.created.clear();
        self.updated.clear();
        self.removed.clear();
        self.stats = FlushStats::default();
    }
}

impl NodeStore {
    /// Schedules the node for the next placement pass without invalidating
    /// its layout.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn mark_needs_place(&mut self, id: NodeId, scheduler: &mut Scheduler) {
        self.validate(id);
        self.mark_needs_place_idx(id.idx, scheduler);
    }

    pub(crate) fn mark_needs_place_idx(&mut self, idx: u32, scheduler: &mut Scheduler) {
        let i = idx as usize;
        if self.needs_place[i] {
            return;
        }
        self.needs_place[i] = true;
        if self.attached[i] {
            scheduler.request_place(self.id_at(idx));
        }
    }

    pub(crate) fn mark_must_commit_idx(&mut self, idx: u32, scheduler: &mut Scheduler) {
        self.must_commit[idx as usize] = true;
        self.mark_needs_place_idx(idx, scheduler);
    }

    /// Places one node and, if it moved, its descendants.
    ///
    /// `parent_position` carries the parent's freshly computed position when
    /// this call is a recursion step; queue-driven calls pass `None` and the
    /// stored parent position is used (the queue is drained in depth order,
    /// so it is already current).
    pub(crate) fn place_idx(
        &mut self,
        idx: u32,
        parent_position: Option<Point>,
        changes: &mut CommitChanges,
    ) {
        let i = idx as usize;
        let parent = self.parent[i];
        let base = if parent == INVALID || self.origin[parent as usize] {
            self.offset[i].to_point()
        } else {
            parent_position.unwrap_or(self.position[parent as usize]) + self.offset[i]
        };
        let moved = base != self.position[i];
        self.position[i] = base;
        changes.stats.placed += 1;

        let commit = moved
            || self.size[i] != self.committed_size[i]
            || self.must_commit[i]
            || !self.committed[i];
        if commit {
            if self.committed[i] {
                changes.updated.push(idx);
            } else {
                changes.created.push(idx);
            }
            self.committed[i] = true;
            self.committed_size[i] = self.size[i];
            changes.stats.committed += 1;
        }
        self.needs_place[i] = false;
        self.must_commit[i] = false;

        if moved && !self.origin[i] {
            let mut child = self.first_child[i];
            while child != INVALID {
                let next = self.next_sibling[child as usize];
                self.place_idx(child, Some(base), changes);
                child = next;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use kurbo::{Size, Vec2};

    use super::*;
    use crate::node::NodeKind;

    fn fixture() -> (NodeStore, Scheduler) {
        (NodeStore::new(), Scheduler::new())
    }

    /// Two plain nodes with hand-written offsets, no layout involved.
    fn chain(store: &mut NodeStore, sched: &mut Scheduler) -> (NodeId, NodeId) {
        let parent = store.create_node(NodeKind::Unknown);
        let child = store.create_node(NodeKind::Unknown);
        store.add_child(parent, child, sched);
        store.offset[parent.index() as usize] = Vec2::new(10.0, 5.0);
        store.offset[child.index() as usize] = Vec2::new(3.0, 4.0);
        store.size[parent.index() as usize] = Size::new(50.0, 50.0);
        store.size[child.index() as usize] = Size::new(20.0, 20.0);
        (parent, child)
    }

    fn place_all(store: &mut NodeStore, changes: &mut CommitChanges, ids: &[NodeId]) {
        for &id in ids {
            store.place_idx(id.index(), None, changes);
        }
    }

    #[test]
    fn position_accumulates_down_the_tree() {
        let (mut store, mut sched) = fixture();
        let (parent, child) = chain(&mut store, &mut sched);

        let mut changes = CommitChanges::default();
        place_all(&mut store, &mut changes, &[parent, child]);

        assert_eq!(store.position(parent), Point::new(10.0, 5.0));
        assert_eq!(store.position(child), Point::new(13.0, 9.0));
    }

    #[test]
    fn first_place_commits_every_node_as_created() {
        let (mut store, mut sched) = fixture();
        let (parent, child) = chain(&mut store, &mut sched);

        let mut changes = CommitChanges::default();
        place_all(&mut store, &mut changes, &[parent, child]);

        assert!(changes.created.contains(&parent.index()));
        assert!(changes.created.contains(&child.index()));
        assert!(changes.updated.is_empty());
        assert_eq!(changes.stats.committed, 2);
    }

    #[test]
    fn clean_replace_commits_nothing() {
        let (mut store, mut sched) = fixture();
        let (parent, child) = chain(&mut store, &mut sched);

        let mut changes = CommitChanges::default();
        place_all(&mut store, &mut changes, &[parent, child]);

        changes.clear();
        place_all(&mut store, &mut changes, &[parent, child]);

        assert!(changes.created.is_empty());
        assert!(changes.updated.is_empty());
        assert_eq!(changes.stats.placed, 2);
        assert_eq!(changes.stats.committed, 0);
    }

    #[test]
    fn moving_a_parent_carries_its_children() {
        let (mut store, mut sched) = fixture();
        let (parent, child) = chain(&mut store, &mut sched);

        let mut changes = CommitChanges::default();
        place_all(&mut store, &mut changes, &[parent, child]);

        store.offset[parent.index() as usize] = Vec2::new(40.0, 5.0);
        changes.clear();
        // Only the parent is driven; the child recomputes through recursion.
        store.place_idx(parent.index(), None, &mut changes);

        assert_eq!(store.position(child), Point::new(43.0, 9.0));
        assert!(changes.updated.contains(&parent.index()));
        assert!(changes.updated.contains(&child.index()));
    }

    #[test]
    fn origin_children_keep_local_positions() {
        let (mut store, mut sched) = fixture();
        let (parent, child) = chain(&mut store, &mut sched);
        store.set_origin(parent, true, &mut sched);

        let mut changes = CommitChanges::default();
        place_all(&mut store, &mut changes, &[parent, child]);
        assert_eq!(store.position(child), Point::new(3.0, 4.0));

        // Moving the origin does not disturb its subtree.
        store.offset[parent.index() as usize] = Vec2::new(99.0, 99.0);
        changes.clear();
        store.place_idx(parent.index(), None, &mut changes);

        assert_eq!(store.position(child), Point::new(3.0, 4.0));
        assert!(changes.updated.contains(&parent.index()));
        assert!(!changes.updated.contains(&child.index()));
    }

    #[test]
    fn size_change_alone_triggers_a_commit() {
        let (mut store, mut sched) = fixture();
        let (parent, child) = chain(&mut store, &mut sched);

        let mut changes = CommitChanges::default();
        place_all(&mut store, &mut changes, &[parent, child]);

        store.size[child.index() as usize] = Size::new(25.0, 20.0);
        changes.clear();
        place_all(&mut store, &mut changes, &[parent, child]);

        assert_eq!(changes.updated, [child.index()]);
    }

    #[test]
    fn forced_commit_fires_once() {
        let (mut store, mut sched) = fixture();
        let (parent, child) = chain(&mut store, &mut sched);

        let mut changes = CommitChanges::default();
        place_all(&mut store, &mut changes, &[parent, child]);

        store.mark_must_commit(child, &mut sched);
        changes.clear();
        place_all(&mut store, &mut changes, &[parent, child]);
        assert_eq!(changes.updated, [child.index()]);

        changes.clear();
        place_all(&mut store, &mut changes, &[parent, child]);
        assert!(changes.updated.is_empty());
    }

    #[test]
    fn marking_detached_nodes_stays_out_of_the_queue() {
        let (mut store, mut sched) = fixture();
        let id = store.create_node(NodeKind::Unknown);
        store.needs_place[id.index() as usize] = false;

        store.mark_needs_place(id, &mut sched);
        assert!(store.needs_place(id));
        assert!(sched.place_queue.is_empty());
    }

    #[test]
    fn attach_replays_pending_placement() {
        let (mut store, mut sched) = fixture();
        let id = store.create_node(NodeKind::Unknown);
        assert!(sched.place_queue.is_empty());

        store.attach_subtree(id.index(), 0, &mut sched);
        assert!(sched.place_queue.contains(&id));
    }
}
