// Copyright 2026 the Terrace Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tree traversal utilities.

use core::iter::FusedIterator;

use super::id::{INVALID, NodeId};
use super::store::NodeStore;

/// An iterator over the direct children of a node, in sibling order.
///
/// Created by [`NodeStore::children`]. This is the only way children are
/// exposed; the sibling links themselves stay private to the store. The
/// iterator is double-ended, so `.rev()` walks trailing-to-leading; the
/// back cursor is seated on first use, so plain forward walks stay O(1)
/// to construct.
#[derive(Debug)]
pub struct Children<'a> {
    store: &'a NodeStore,
    front: u32,
    /// `None` until the back end is first used.
    back: Option<u32>,
}

impl<'a> Children<'a> {
    pub(crate) fn new(store: &'a NodeStore, first: u32) -> Self {
        Self {
            store,
            front: first,
            back: None,
        }
    }

    /// Walks the sibling chain to the last remaining child, once.
    fn seat_back(&mut self) -> u32 {
        if let Some(back) = self.back {
            return back;
        }
        let mut last = self.front;
        if last != INVALID {
            while self.store.next_sibling[last as usize] != INVALID {
                last = self.store.next_sibling[last as usize];
            }
        }
        self.back = Some(last);
        last
    }

    fn id(&self, idx: u32) -> NodeId {
        NodeId {
            idx,
            generation: self.store.generation[idx as usize],
        }
    }
}

impl Iterator for Children<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        if self.front == INVALID {
            return None;
        }
        let idx = self.front;
        if self.back == Some(idx) {
            // The cursors met; both ends are exhausted.
            self.front = INVALID;
            self.back = Some(INVALID);
        } else {
            self.front = self.store.next_sibling[idx as usize];
        }
        Some(self.id(idx))
    }
}

impl DoubleEndedIterator for Children<'_> {
    fn next_back(&mut self) -> Option<NodeId> {
        let idx = self.seat_back();
        if idx == INVALID {
            return None;
        }
        if self.front == idx {
            self.front = INVALID;
            self.back = Some(INVALID);
        } else {
            self.back = Some(self.store.prev_sibling[idx as usize]);
        }
        Some(self.id(idx))
    }
}

impl FusedIterator for Children<'_> {}

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;

    use crate::node::{NodeId, NodeKind, NodeStore};
    use crate::scheduler::Scheduler;

    fn siblings(n: usize) -> (NodeStore, NodeId, Vec<NodeId>) {
        let mut store = NodeStore::new();
        let mut sched = Scheduler::new();
        let parent = store.create_node(NodeKind::Unknown);
        let kids: Vec<NodeId> = (0..n)
            .map(|_| {
                let child = store.create_node(NodeKind::Unknown);
                store.add_child(parent, child, &mut sched);
                child
            })
            .collect();
        (store, parent, kids)
    }

    #[test]
    fn walks_in_sibling_order() {
        let (store, parent, kids) = siblings(3);
        let seen: Vec<_> = store.children(parent).collect();
        assert_eq!(seen, kids);
    }

    #[test]
    fn rev_walks_trailing_to_leading() {
        let (store, parent, kids) = siblings(3);
        let seen: Vec<_> = store.children(parent).rev().collect();
        assert_eq!(seen, [kids[2], kids[1], kids[0]]);
    }

    #[test]
    fn cursors_meet_in_the_middle() {
        let (store, parent, kids) = siblings(3);
        let mut iter = store.children(parent);
        assert_eq!(iter.next(), Some(kids[0]));
        assert_eq!(iter.next_back(), Some(kids[2]));
        assert_eq!(iter.next(), Some(kids[1]));
        assert_eq!(iter.next(), None);
        assert_eq!(iter.next_back(), None);
    }

    #[test]
    fn forward_walks_never_seat_the_back_cursor() {
        let (store, parent, _) = siblings(3);
        let mut iter = store.children(parent);
        while iter.next().is_some() {}
        assert_eq!(iter.back, None);
        assert_eq!(iter.next_back(), None, "exhausted from the front");
    }

    #[test]
    fn empty_and_single_child_terminate() {
        let (store, parent, _) = siblings(0);
        assert_eq!(store.children(parent).count(), 0);

        let (store, parent, kids) = siblings(1);
        let mut iter = store.children(parent);
        assert_eq!(iter.next_back(), Some(kids[0]));
        assert_eq!(iter.next(), None);
    }
}
