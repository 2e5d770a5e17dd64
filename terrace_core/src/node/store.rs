// Copyright 2026 the Terrace Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Struct-of-arrays node storage with allocation, topology, and property
//! management.

use alloc::vec::Vec;

use kurbo::{Point, Size, Vec2};

use crate::geometry::Constraints;
use crate::scheduler::Scheduler;

use super::id::{INVALID, NodeId, SurfaceId};
use super::kind::{ChildParams, NodeKind};
use super::traverse::Children;

/// Struct-of-arrays storage for all layout nodes.
///
/// Nodes are addressed by [`NodeId`] handles. Internally, each node occupies
/// a slot in parallel arrays. Destroyed nodes are recycled via a free list,
/// and generation counters prevent stale handle access.
///
/// Mutations that invalidate layout or placement take the [`Scheduler`]
/// explicitly, so the scheduling side effect is visible at every call site.
/// A node constructed here is detached; it participates in flushes only
/// once mounted under a registered view root.
#[derive(Debug)]
pub struct NodeStore {
    // -- Topology --
    pub(crate) parent: Vec<u32>,
    pub(crate) first_child: Vec<u32>,
    pub(crate) next_sibling: Vec<u32>,
    pub(crate) prev_sibling: Vec<u32>,

    // -- Configuration (set by callers) --
    pub(crate) kind: Vec<NodeKind>,
    pub(crate) params: Vec<ChildParams>,
    pub(crate) origin: Vec<bool>,

    // -- Layout state (written by the layout and placement passes) --
    pub(crate) constraints: Vec<Constraints>,
    pub(crate) size: Vec<Size>,
    pub(crate) offset: Vec<Vec2>,
    pub(crate) position: Vec<Point>,
    pub(crate) relayout_boundary: Vec<u32>,
    pub(crate) depth: Vec<u32>,
    pub(crate) overflow: Vec<f64>,

    // -- Dirty and lifecycle flags --
    pub(crate) needs_layout: Vec<bool>,
    pub(crate) needs_place: Vec<bool>,
    pub(crate) must_commit: Vec<bool>,
    pub(crate) attached: Vec<bool>,

    // -- Commit tracking (written by the placement pass) --
    pub(crate) committed: Vec<bool>,
    pub(crate) committed_size: Vec<Size>,

    // -- Allocation --
    pub(crate) generation: Vec<u32>,
    pub(crate) free_list: Vec<u32>,
    pub(crate) len: u32,

    // -- Lifecycle tracking --
    pub(crate) pending_removed: Vec<u32>,
}

impl Default for NodeStore {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeStore {
    /// Creates an empty node store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            parent: Vec::new(),
            first_child: Vec::new(),
            next_sibling: Vec::new(),
            prev_sibling: Vec::new(),
            kind: Vec::new(),
            params: Vec::new(),
            origin: Vec::new(),
            constraints: Vec::new(),
            size: Vec::new(),
            offset: Vec::new(),
            position: Vec::new(),
            relayout_boundary: Vec::new(),
            depth: Vec::new(),
            overflow: Vec::new(),
            needs_layout: Vec::new(),
            needs_place: Vec::new(),
            must_commit: Vec::new(),
            attached: Vec::new(),
            committed: Vec::new(),
            committed_size: Vec::new(),
            generation: Vec::new(),
            free_list: Vec::new(),
            len: 0,
            pending_removed: Vec::new(),
        }
    }

    // -- Allocation API --

    /// Creates a new detached node and returns its handle.
    ///
    /// The node starts with no parent, default child params, undefined
    /// geometry, and its layout/placement flags raised, so the first attach
    /// schedules a full pass over it. Nodes of kind [`NodeKind::Root`]
    /// start as coordinate origins.
    pub fn create_node(&mut self, kind: NodeKind) -> NodeId {
        let origin = matches!(kind, NodeKind::Root);
        let idx = if let Some(idx) = self.free_list.pop() {
            // Reuse a freed slot.
            let i = idx as usize;
            self.generation[i] += 1;
            self.parent[i] = INVALID;
            self.first_child[i] = INVALID;
            self.next_sibling[i] = INVALID;
            self.prev_sibling[i] = INVALID;
            self.kind[i] = kind;
            self.params[i] = ChildParams::default();
            self.origin[i] = origin;
            self.constraints[i] = Constraints::UNBOUNDED;
            self.size[i] = Size::ZERO;
            self.offset[i] = Vec2::ZERO;
            self.position[i] = Point::ZERO;
            self.relayout_boundary[i] = INVALID;
            self.depth[i] = 0;
            self.overflow[i] = 0.0;
            self.needs_layout[i] = true;
            self.needs_place[i] = true;
            self.must_commit[i] = false;
            self.attached[i] = false;
            self.committed[i] = false;
            self.committed_size[i] = Size::ZERO;
            idx
        } else {
            // Allocate a new slot.
            let idx = self.len;
            self.len += 1;
            self.parent.push(INVALID);
            self.first_child.push(INVALID);
            self.next_sibling.push(INVALID);
            self.prev_sibling.push(INVALID);
            self.kind.push(kind);
            self.params.push(ChildParams::default());
            self.origin.push(origin);
            self.constraints.push(Constraints::UNBOUNDED);
            self.size.push(Size::ZERO);
            self.offset.push(Vec2::ZERO);
            self.position.push(Point::ZERO);
            self.relayout_boundary.push(INVALID);
            self.depth.push(0);
            self.overflow.push(0.0);
            self.needs_layout.push(true);
            self.needs_place.push(true);
            self.must_commit.push(false);
            self.attached.push(false);
            self.committed.push(false);
            self.committed_size.push(Size::ZERO);
            self.generation.push(0);
            idx
        };

        NodeId {
            idx,
            generation: self.generation[idx as usize],
        }
    }

    /// Destroys a node, freeing its slot for reuse.
    ///
    /// If the node is still mounted it is removed from its parent first
    /// (dirtying the parent). The slot lands in the flush's removal list so
    /// the backend can delete any native widget it created for it.
    ///
    /// # Panics
    ///
    /// Panics if the node has children (remove them first), is a mounted
    /// view root (unmount it first), or if the handle is stale.
    pub fn destroy_node(&mut self, id: NodeId, scheduler: &mut Scheduler) {
        self.validate(id);
        let idx = id.idx;
        assert!(
            self.first_child[idx as usize] == INVALID,
            "cannot destroy a node with children"
        );
        // Attached with no parent means a mounted view root; destroying it
        // would strand the scheduler's registration.
        assert!(
            self.parent[idx as usize] != INVALID || !self.attached[idx as usize],
            "cannot destroy a mounted view root: {id:?} (unmount it first)"
        );

        if self.parent[idx as usize] != INVALID {
            self.remove_from_parent(id, scheduler);
        }

        // Bump generation so old handles immediately fail validation.
        self.generation[idx as usize] += 1;

        self.free_list.push(idx);
        self.pending_removed.push(idx);
    }

    /// Returns whether the given handle refers to a live node.
    #[must_use]
    pub fn is_alive(&self, id: NodeId) -> bool {
        (id.idx < self.len)
            && self.generation[id.idx as usize] == id.generation
            && !self.free_list.contains(&id.idx)
    }

    // -- Topology API --

    /// Mounts `child` as the last child of `parent`.
    ///
    /// The parent is marked as needing layout. If the parent is attached,
    /// the child's subtree attaches too: depths are assigned and any
    /// layout/placement requests the subtree accumulated while detached are
    /// replayed into the scheduler.
    ///
    /// # Panics
    ///
    /// Panics if either handle is stale, or if `child` already has a parent.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId, scheduler: &mut Scheduler) {
        self.validate(parent);
        self.validate(child);
        let p = parent.idx;
        let c = child.idx;
        assert!(
            self.parent[c as usize] == INVALID,
            "child already has a parent"
        );

        self.link_last(p, c);

        if self.attached[p as usize] {
            self.attach_subtree(c, self.depth[p as usize] + 1, scheduler);
        }
        self.mark_needs_layout_idx(p, scheduler);
    }

    /// Mounts `child` immediately before `sibling` in its parent's child
    /// list.
    ///
    /// Same dirty and attach semantics as [`add_child`](Self::add_child).
    ///
    /// # Panics
    ///
    /// Panics if handles are stale, `child` already has a parent, or
    /// `sibling` has no parent.
    pub fn insert_before(&mut self, child: NodeId, sibling: NodeId, scheduler: &mut Scheduler) {
        self.validate(child);
        self.validate(sibling);
        let c = child.idx;
        let s = sibling.idx;
        assert!(
            self.parent[c as usize] == INVALID,
            "child already has a parent"
        );
        let p = self.parent[s as usize];
        assert!(p != INVALID, "sibling has no parent");

        self.parent[c as usize] = p;
        self.next_sibling[c as usize] = s;
        self.prev_sibling[c as usize] = self.prev_sibling[s as usize];

        if self.prev_sibling[s as usize] != INVALID {
            self.next_sibling[self.prev_sibling[s as usize] as usize] = c;
        } else {
            // `sibling` was the first child.
            self.first_child[p as usize] = c;
        }
        self.prev_sibling[s as usize] = c;

        if self.attached[p as usize] {
            self.attach_subtree(c, self.depth[p as usize] + 1, scheduler);
        }
        self.mark_needs_layout_idx(p, scheduler);
    }

    /// Unmounts `child` from its current parent.
    ///
    /// The child's params slot resets to defaults, its subtree detaches
    /// (children first, then each node), its stale relayout-boundary
    /// references are cleared, and the old parent is marked as needing
    /// layout.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale or the node has no parent.
    pub fn remove_from_parent(&mut self, child: NodeId, scheduler: &mut Scheduler) {
        self.validate(child);
        let c = child.idx;
        assert!(self.parent[c as usize] != INVALID, "node has no parent");

        let p = self.parent[c as usize];
        self.unlink_from_parent(c);
        self.params[c as usize] = ChildParams::default();

        // Boundaries under the old ancestry are stale now.
        self.clean_relayout_boundary(c);

        if self.attached[c as usize] {
            self.detach_subtree(c);
        }
        self.mark_needs_layout_idx(p, scheduler);
    }

    /// Moves `child` (and its subtree) under `new_parent`, appended as the
    /// last child.
    ///
    /// If `child` already has a parent it is unmounted first, with full
    /// [`remove_from_parent`](Self::remove_from_parent) semantics, so both
    /// old and new parent end up dirty.
    ///
    /// # Panics
    ///
    /// Panics if either handle is stale.
    pub fn reparent(&mut self, child: NodeId, new_parent: NodeId, scheduler: &mut Scheduler) {
        self.validate(child);
        self.validate(new_parent);

        if self.parent[child.idx as usize] != INVALID {
            self.remove_from_parent(child, scheduler);
        }
        self.add_child(new_parent, child, scheduler);
    }

    /// Returns the parent of a node, if any.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.validate(id);
        let p = self.parent[id.idx as usize];
        if p == INVALID {
            None
        } else {
            Some(NodeId {
                idx: p,
                generation: self.generation[p as usize],
            })
        }
    }

    /// Returns an iterator over the direct children of a node.
    #[must_use]
    pub fn children(&self, id: NodeId) -> Children<'_> {
        self.validate(id);
        Children::new(self, self.first_child[id.idx as usize])
    }

    /// Returns the handles of root nodes (those with no parent).
    ///
    /// Roots are nodes whose parent is [`INVALID`] and that are not in the
    /// free list.
    #[must_use]
    pub fn roots(&self) -> Vec<NodeId> {
        let mut roots = Vec::new();
        for idx in 0..self.len {
            if self.parent[idx as usize] == INVALID && !self.free_list.contains(&idx) {
                roots.push(NodeId {
                    idx,
                    generation: self.generation[idx as usize],
                });
            }
        }
        roots
    }

    // -- Property getters (read-only, no dirty marking) --

    /// Returns the layout strategy of a node.
    #[must_use]
    pub fn kind(&self, id: NodeId) -> NodeKind {
        self.validate(id);
        self.kind[id.idx as usize]
    }

    /// Returns the per-child layout params of a node.
    #[must_use]
    pub fn child_params(&self, id: NodeId) -> ChildParams {
        self.validate(id);
        self.params[id.idx as usize]
    }

    /// Returns whether the node is a coordinate origin (its descendants'
    /// positions restart at it rather than accumulating ancestor offsets).
    #[must_use]
    pub fn is_origin(&self, id: NodeId) -> bool {
        self.validate(id);
        self.origin[id.idx as usize]
    }

    /// Returns the constraints last applied to a node.
    ///
    /// Undefined (defaulted) until the node's first layout.
    #[must_use]
    pub fn constraints(&self, id: NodeId) -> Constraints {
        self.validate(id);
        self.constraints[id.idx as usize]
    }

    /// Returns the resolved size of a node.
    ///
    /// Undefined (zero) until the node's first layout.
    #[must_use]
    pub fn size(&self, id: NodeId) -> Size {
        self.validate(id);
        self.size[id.idx as usize]
    }

    /// Returns the parent-relative offset of a node.
    ///
    /// Undefined (zero) until the parent's first layout.
    #[must_use]
    pub fn offset(&self, id: NodeId) -> Vec2 {
        self.validate(id);
        self.offset[id.idx as usize]
    }

    /// Returns the absolute position of a node.
    ///
    /// Undefined (zero) until the node's first placement.
    #[must_use]
    pub fn position(&self, id: NodeId) -> Point {
        self.validate(id);
        self.position[id.idx as usize]
    }

    /// Returns the tree depth of a node (roots are 0).
    ///
    /// Meaningful only while attached.
    #[must_use]
    pub fn depth(&self, id: NodeId) -> u32 {
        self.validate(id);
        self.depth[id.idx as usize]
    }

    /// Returns how far the children of a flex node overran its resolved
    /// main extent in its last layout. Zero for anything else.
    ///
    /// Purely a diagnostic; layout clamps the node's own size regardless.
    #[must_use]
    pub fn overflow(&self, id: NodeId) -> f64 {
        self.validate(id);
        self.overflow[id.idx as usize]
    }

    /// Returns the node's relayout boundary, if one is established.
    ///
    /// After a successful layout this is either the node itself or its
    /// parent's boundary; before any layout (or after an unmount) it is
    /// `None`.
    #[must_use]
    pub fn relayout_boundary(&self, id: NodeId) -> Option<NodeId> {
        self.validate(id);
        let b = self.relayout_boundary[id.idx as usize];
        if b == INVALID {
            None
        } else {
            Some(NodeId {
                idx: b,
                generation: self.generation[b as usize],
            })
        }
    }

    /// Returns whether the node is reachable from a mounted view root.
    #[must_use]
    pub fn is_attached(&self, id: NodeId) -> bool {
        self.validate(id);
        self.attached[id.idx as usize]
    }

    /// Returns whether the node has a pending layout request.
    #[must_use]
    pub fn needs_layout(&self, id: NodeId) -> bool {
        self.validate(id);
        self.needs_layout[id.idx as usize]
    }

    /// Returns whether the node has a pending placement request.
    #[must_use]
    pub fn needs_place(&self, id: NodeId) -> bool {
        self.validate(id);
        self.needs_place[id.idx as usize]
    }

    // -- Mutation API (explicitly scheduled) --

    /// Replaces a node's layout strategy.
    ///
    /// Marks the node as needing layout. The parent is invalidated too when
    /// the change flips whether the node is sized by its parent alone (the
    /// resize step moves between passes), or when a sized-by-parent node's
    /// resolved size can change under its current non-tight constraints:
    /// such a node is always its own relayout boundary, so without the
    /// parent mark the parent would keep offsets computed from the old
    /// size. Other kinds reach their parent through the ordinary boundary
    /// walk in [`mark_needs_layout`](Self::mark_needs_layout).
    pub fn set_kind(&mut self, id: NodeId, kind: NodeKind, scheduler: &mut Scheduler) {
        self.validate(id);
        let idx = id.idx;
        let sized_flip =
            self.kind[idx as usize].sized_by_parent() != kind.sized_by_parent();
        self.kind[idx as usize] = kind;
        self.mark_needs_layout_idx(idx, scheduler);
        let resize_inputs_changed =
            kind.sized_by_parent() && !self.constraints[idx as usize].is_tight();
        if (sized_flip || resize_inputs_changed) && self.parent[idx as usize] != INVALID {
            self.mark_needs_layout_idx(self.parent[idx as usize], scheduler);
        }
    }

    /// Replaces a node's per-child layout params.
    ///
    /// Params are read by the node's *parent*, so this marks the parent as
    /// needing layout (a detached node just stores the new value).
    pub fn set_child_params(&mut self, id: NodeId, params: ChildParams, scheduler: &mut Scheduler) {
        self.validate(id);
        self.params[id.idx as usize] = params;
        let p = self.parent[id.idx as usize];
        if p != INVALID {
            self.mark_needs_layout_idx(p, scheduler);
        }
    }

    /// Makes a node a coordinate origin (or stops it being one).
    ///
    /// Every node in the subtree is re-placed, since the positions of all
    /// descendants change meaning.
    pub fn set_origin(&mut self, id: NodeId, origin: bool, scheduler: &mut Scheduler) {
        self.validate(id);
        if self.origin[id.idx as usize] == origin {
            return;
        }
        self.origin[id.idx as usize] = origin;
        self.mark_subtree_needs_place(id.idx, scheduler);
    }

    /// Associates (or clears) the backing surface of a [`NodeKind::Surface`]
    /// leaf.
    ///
    /// Geometry is unaffected; the node is forced through the next commit
    /// so the backend sees the new association.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale or the node is not a surface leaf.
    pub fn set_surface(
        &mut self,
        id: NodeId,
        surface: Option<SurfaceId>,
        scheduler: &mut Scheduler,
    ) {
        self.validate(id);
        match &mut self.kind[id.idx as usize] {
            NodeKind::Surface { surface: slot, .. } => *slot = surface,
            other => panic!("set_surface on a {} node: {id:?}", other.name()),
        }
        self.mark_must_commit_idx(id.idx, scheduler);
    }

    /// Forces the node through the next commit even if its geometry is
    /// unchanged.
    pub fn mark_must_commit(&mut self, id: NodeId, scheduler: &mut Scheduler) {
        self.validate(id);
        self.mark_must_commit_idx(id.idx, scheduler);
    }

    // -- Raw-index accessors for backends --
    //
    // These accept raw slot indices (as found in `CommitChanges`) rather
    // than `NodeId` handles, skipping generation validation. Only use with
    // indices that came from a flush's change lists.

    /// Returns the resolved size at raw slot `idx`.
    ///
    /// # Panics
    ///
    /// Panics if `idx >= self.len`.
    #[must_use]
    pub fn size_at(&self, idx: u32) -> Size {
        assert!(
            idx < self.len,
            "slot index {idx} out of range (len {})",
            self.len
        );
        self.size[idx as usize]
    }

    /// Returns the absolute position at raw slot `idx`.
    ///
    /// # Panics
    ///
    /// Panics if `idx >= self.len`.
    #[must_use]
    pub fn position_at(&self, idx: u32) -> Point {
        assert!(
            idx < self.len,
            "slot index {idx} out of range (len {})",
            self.len
        );
        self.position[idx as usize]
    }

    /// Returns the node kind at raw slot `idx`.
    ///
    /// # Panics
    ///
    /// Panics if `idx >= self.len`.
    #[must_use]
    pub fn kind_at(&self, idx: u32) -> NodeKind {
        assert!(
            idx < self.len,
            "slot index {idx} out of range (len {})",
            self.len
        );
        self.kind[idx as usize]
    }

    // -- Internal helpers --

    /// Panics if the handle is stale.
    pub(crate) fn validate(&self, id: NodeId) {
        assert!(
            id.idx < self.len && self.generation[id.idx as usize] == id.generation,
            "stale NodeId: {id:?} (current gen: {})",
            if id.idx < self.len {
                self.generation[id.idx as usize]
            } else {
                u32::MAX
            }
        );
    }

    /// Links `c` as the last child of `p` without dirty bookkeeping.
    fn link_last(&mut self, p: u32, c: u32) {
        self.parent[c as usize] = p;
        self.prev_sibling[c as usize] = INVALID;
        self.next_sibling[c as usize] = INVALID;

        if self.first_child[p as usize] == INVALID {
            self.first_child[p as usize] = c;
        } else {
            // Walk to last child.
            let mut last = self.first_child[p as usize];
            while self.next_sibling[last as usize] != INVALID {
                last = self.next_sibling[last as usize];
            }
            self.next_sibling[last as usize] = c;
            self.prev_sibling[c as usize] = last;
        }
    }

    /// Removes `idx` from its parent's child list without touching dirty
    /// state.
    fn unlink_from_parent(&mut self, idx: u32) {
        let p = self.parent[idx as usize];
        let prev = self.prev_sibling[idx as usize];
        let next = self.next_sibling[idx as usize];

        if prev != INVALID {
            self.next_sibling[prev as usize] = next;
        } else {
            // Was first child.
            self.first_child[p as usize] = next;
        }

        if next != INVALID {
            self.prev_sibling[next as usize] = prev;
        }

        self.parent[idx as usize] = INVALID;
        self.prev_sibling[idx as usize] = INVALID;
        self.next_sibling[idx as usize] = INVALID;
    }

    /// Attaches the subtree rooted at `idx`, assigning depths top-down and
    /// replaying dirty marks that accumulated while detached (a detached
    /// node cannot reach the scheduler, so its flags just sit until now).
    pub(crate) fn attach_subtree(&mut self, idx: u32, depth: u32, scheduler: &mut Scheduler) {
        let i = idx as usize;
        self.attached[i] = true;
        self.depth[i] = depth;

        if self.needs_layout[i] && self.relayout_boundary[i] != INVALID {
            // Re-run the mark with scheduler access; boundary-less nodes
            // instead rely on the mounting parent's own relayout.
            self.needs_layout[i] = false;
            self.mark_needs_layout_idx(idx, scheduler);
        }
        if self.needs_place[i] {
            self.needs_place[i] = false;
            self.mark_needs_place_idx(idx, scheduler);
        }

        let mut c = self.first_child[i];
        while c != INVALID {
            let next = self.next_sibling[c as usize];
            self.attach_subtree(c, depth + 1, scheduler);
            c = next;
        }
    }

    /// Detaches the subtree rooted at `idx`, children before parents, so a
    /// node still sees live children while it is being torn down. Depth and
    /// boundary values are left behind; the next attach/layout owns them.
    pub(crate) fn detach_subtree(&mut self, idx: u32) {
        let mut c = self.first_child[idx as usize];
        while c != INVALID {
            let next = self.next_sibling[c as usize];
            self.detach_subtree(c);
            c = next;
        }
        self.attached[idx as usize] = false;
    }

    /// Marks every node in the subtree rooted at `idx` as needing
    /// placement.
    fn mark_subtree_needs_place(&mut self, idx: u32, scheduler: &mut Scheduler) {
        self.mark_needs_place_idx(idx, scheduler);
        let mut c = self.first_child[idx as usize];
        while c != INVALID {
            let next = self.next_sibling[c as usize];
            self.mark_subtree_needs_place(c, scheduler);
            c = next;
        }
    }

    /// Handle for a slot known to be live.
    pub(crate) fn id_at(&self, idx: u32) -> NodeId {
        NodeId {
            idx,
            generation: self.generation[idx as usize],
        }
    }
}
