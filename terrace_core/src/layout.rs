// Copyright 2026 the Terrace Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The layout protocol: dirty marking, relayout boundaries, and the
//! constraint-solving pass.
//!
//! Layout is top-down constraint solving: a parent hands each child a
//! [`Constraints`] box, the child resolves a [`Size`](kurbo::Size) that
//! satisfies it and records a parent-relative offset for each of its own
//! children. Two properties keep the pass cheap on a retained tree:
//!
//! - **Pruning**: [`layout`](NodeStore::layout) short-circuits when the
//!   node is clean and the incoming constraints match the previous pass.
//! - **Relayout boundaries**: a node whose size cannot affect its parent
//!   (parent ignores the size, the node is sized by constraints alone, or
//!   the constraints are tight) becomes a *boundary*. Dirtiness inside the
//!   subtree stops there, and only the boundary enters the scheduler's
//!   queue, so one mutated leaf relays the smallest enclosing region.
//!
//! Strategy dispatch is a `match` on [`NodeKind`]; the flex and stack
//! algorithms live in their own modules, the thinner strategies (align,
//! padding, sized box, linear stacking, root, leaves) are implemented
//! here.

use kurbo::Size;

use crate::geometry::{Alignment, Axis, Constraints};
use crate::node::{INVALID, NodeId, NodeKind, NodeStore};
use crate::scheduler::Scheduler;

impl NodeStore {
    // -- Dirty marking --

    /// Requests a relayout of `id`.
    ///
    /// No-op when already dirty. Otherwise the request walks up to the
    /// node's relayout boundary, which alone is queued with the scheduler
    /// (when attached). A node with no established boundary marks its whole
    /// ancestor chain conservatively; the dirtiness reaches the true
    /// boundary once one exists.
    pub fn mark_needs_layout(&mut self, id: NodeId, scheduler: &mut Scheduler) {
        self.validate(id);
        self.mark_needs_layout_idx(id.idx, scheduler);
    }

    pub(crate) fn mark_needs_layout_idx(&mut self, idx: u32, scheduler: &mut Scheduler) {
        let i = idx as usize;
        if self.needs_layout[i] {
            return;
        }
        let boundary = self.relayout_boundary[i];
        if boundary == INVALID {
            self.needs_layout[i] = true;
            if self.parent[i] != INVALID {
                self.mark_parent_needs_layout(idx, scheduler);
            }
            return;
        }
        if boundary != idx {
            self.mark_parent_needs_layout(idx, scheduler);
        } else {
            self.needs_layout[i] = true;
            if self.attached[i] {
                scheduler.request_layout(self.id_at(idx));
            }
        }
    }

    /// Marks `idx` dirty and forwards the request to its parent, without
    /// queueing `idx` itself.
    fn mark_parent_needs_layout(&mut self, idx: u32, scheduler: &mut Scheduler) {
        self.needs_layout[idx as usize] = true;
        let p = self.parent[idx as usize];
        debug_assert!(p != INVALID, "marking parent of a parentless node");
        self.mark_needs_layout_idx(p, scheduler);
    }

    // -- Layout entry --

    /// Lays out `id` under `constraints`.
    ///
    /// `parent_uses_size` declares whether the caller will read the
    /// resolved size; passing `false` makes the node a relayout boundary,
    /// so future dirtiness inside it stops propagating here.
    ///
    /// Clean nodes receiving the same constraints as the previous pass
    /// return immediately (after re-propagating a changed boundary
    /// downward). This is the entry parents use for their children during
    /// [`perform_layout`]; embedders normally only mutate and let the
    /// scheduler flush.
    ///
    /// [`perform_layout`]: self
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale or the constraints are malformed.
    pub fn layout(
        &mut self,
        id: NodeId,
        constraints: Constraints,
        parent_uses_size: bool,
        scheduler: &mut Scheduler,
    ) {
        self.validate(id);
        self.layout_idx(id.idx, constraints, parent_uses_size, scheduler);
    }

    pub(crate) fn layout_idx(
        &mut self,
        idx: u32,
        constraints: Constraints,
        parent_uses_size: bool,
        scheduler: &mut Scheduler,
    ) {
        let i = idx as usize;
        assert!(
            constraints.is_valid(),
            "invalid constraints for {} node {:?}: {:?}",
            self.kind[i].name(),
            self.id_at(idx),
            constraints
        );

        // Relayout boundary for this pass.
        let is_boundary = !parent_uses_size
            || self.kind[i].sized_by_parent()
            || constraints.is_tight()
            || self.parent[i] == INVALID;
        let boundary = if is_boundary {
            idx
        } else {
            self.relayout_boundary[self.parent[i] as usize]
        };

        if !self.needs_layout[i] && constraints == self.constraints[i] {
            if boundary != self.relayout_boundary[i] {
                self.relayout_boundary[i] = boundary;
                self.propagate_boundary_to_children(idx);
            }
            return;
        }

        self.constraints[i] = constraints;

        // A previously established boundary that changes leaves stale
        // references below; descendants must recompute instead.
        if self.relayout_boundary[i] != INVALID && boundary != self.relayout_boundary[i] {
            let mut c = self.first_child[i];
            while c != INVALID {
                let next = self.next_sibling[c as usize];
                self.clean_relayout_boundary(c);
                c = next;
            }
        }
        self.relayout_boundary[i] = boundary;

        if self.kind[i].sized_by_parent() {
            self.perform_resize(idx);
        }
        self.perform_layout(idx, scheduler);
        self.needs_layout[i] = false;

        debug_assert!(
            self.size[i].is_finite() && self.constraints[i].is_satisfied_by(self.size[i]),
            "{} node {:?} resolved size {:?} outside {:?}",
            self.kind[i].name(),
            self.id_at(idx),
            self.size[i],
            self.constraints[i]
        );

        self.mark_needs_place_idx(idx, scheduler);
    }

    /// Relayout re-entry for queued boundary nodes: constraints are already
    /// stored and unchanged. The resize step still re-runs for
    /// sized-by-parent kinds, whose size also depends on the kind payload
    /// (a surface's preferred extent) that may have changed since the node
    /// was queued.
    pub(crate) fn relayout_idx(&mut self, idx: u32, scheduler: &mut Scheduler) {
        if self.kind[idx as usize].sized_by_parent() {
            self.perform_resize(idx);
        }
        self.perform_layout(idx, scheduler);
        self.needs_layout[idx as usize] = false;
        self.mark_needs_place_idx(idx, scheduler);
    }

    /// Clears stale boundary references downward. Subtrees that are their
    /// own boundary stay intact.
    pub(crate) fn clean_relayout_boundary(&mut self, idx: u32) {
        let i = idx as usize;
        if self.relayout_boundary[i] == idx {
            return;
        }
        self.relayout_boundary[i] = INVALID;
        let mut c = self.first_child[i];
        while c != INVALID {
            let next = self.next_sibling[c as usize];
            self.clean_relayout_boundary(c);
            c = next;
        }
    }

    /// Pushes this node's boundary to descendants that inherited a
    /// different one, stopping at self-boundary subtrees.
    fn propagate_boundary_to_children(&mut self, idx: u32) {
        let boundary = self.relayout_boundary[idx as usize];
        let mut c = self.first_child[idx as usize];
        while c != INVALID {
            let next = self.next_sibling[c as usize];
            let ci = c as usize;
            if self.relayout_boundary[ci] != c && self.relayout_boundary[ci] != boundary {
                self.relayout_boundary[ci] = boundary;
                self.propagate_boundary_to_children(c);
            }
            c = next;
        }
    }

    // -- Strategy dispatch --

    /// Resize step for nodes sized by constraints alone.
    fn perform_resize(&mut self, idx: u32) {
        let i = idx as usize;
        let c = self.constraints[i];
        let size = match self.kind[i] {
            NodeKind::Surface { preferred, .. } => match preferred {
                Some(natural) => c.constrain(natural),
                // No natural size: fill what is bounded, collapse what is not.
                None => Size::new(
                    if c.has_bounded_width() { c.max_width } else { c.min_width },
                    if c.has_bounded_height() { c.max_height } else { c.min_height },
                ),
            },
            NodeKind::Unknown => c.smallest(),
            other => unreachable!("{} nodes are not sized by parent", other.name()),
        };
        self.size[i] = size;
    }

    /// Layout step: sets own size (unless the resize step did) and lays out
    /// and offsets every child.
    fn perform_layout(&mut self, idx: u32, scheduler: &mut Scheduler) {
        self.overflow[idx as usize] = 0.0;
        match self.kind[idx as usize] {
            NodeKind::Flex(config) => self.layout_flex(idx, config, scheduler),
            NodeKind::Stack(config) => self.layout_stack(idx, config, scheduler),
            NodeKind::Align(alignment) => self.layout_align(idx, alignment, scheduler),
            NodeKind::Padding(insets) => self.layout_padding(idx, insets, scheduler),
            NodeKind::SizedBox { width, height } => {
                self.layout_sized_box(idx, width, height, scheduler);
            }
            NodeKind::Linear(axis) => self.layout_linear(idx, axis, scheduler),
            NodeKind::Root => self.layout_root(idx, scheduler),
            // Leaves: size was fully determined by perform_resize.
            NodeKind::Surface { .. } | NodeKind::Unknown => {}
        }
    }

    /// The one optional child of a single-child strategy.
    ///
    /// # Panics
    ///
    /// Panics if the node has more than one child mounted.
    fn only_child(&self, idx: u32) -> Option<u32> {
        let c = self.first_child[idx as usize];
        if c == INVALID {
            return None;
        }
        assert!(
            self.next_sibling[c as usize] == INVALID,
            "{} node {:?} supports at most one child",
            self.kind[idx as usize].name(),
            self.id_at(idx),
        );
        Some(c)
    }

    // -- Simple strategies --

    /// Align: size toward the incoming maximum, lay the child out loose,
    /// and offset it by the alignment formula. Unbounded axes fall back to
    /// the child's extent (or the minimum with no child).
    fn layout_align(&mut self, idx: u32, alignment: Alignment, scheduler: &mut Scheduler) {
        let i = idx as usize;
        let c = self.constraints[i];
        match self.only_child(idx) {
            Some(child) => {
                self.layout_idx(child, c.loosened(), true, scheduler);
                let child_size = self.size[child as usize];
                let size = Size::new(
                    if c.has_bounded_width() {
                        c.max_width
                    } else {
                        c.constrain_width(child_size.width)
                    },
                    if c.has_bounded_height() {
                        c.max_height
                    } else {
                        c.constrain_height(child_size.height)
                    },
                );
                self.size[i] = size;
                self.offset[child as usize] = alignment.child_offset(size, child_size);
            }
            None => {
                self.size[i] = Size::new(
                    if c.has_bounded_width() { c.max_width } else { c.min_width },
                    if c.has_bounded_height() { c.max_height } else { c.min_height },
                );
            }
        }
    }

    /// Padding: child gets the deflated constraints, the node sizes to the
    /// padded-out child (or the insets' own footprint).
    fn layout_padding(&mut self, idx: u32, insets: kurbo::Insets, scheduler: &mut Scheduler) {
        let i = idx as usize;
        let c = self.constraints[i];
        match self.only_child(idx) {
            Some(child) => {
                let inner = c.deflate(insets);
                self.layout_idx(child, inner, true, scheduler);
                let child_size = self.size[child as usize];
                self.offset[child as usize] = kurbo::Vec2::new(insets.x0, insets.y0);
                self.size[i] = c.constrain(Size::new(
                    child_size.width + insets.x_value(),
                    child_size.height + insets.y_value(),
                ));
            }
            None => {
                self.size[i] = c.constrain(insets.size());
            }
        }
    }

    /// Sized box: a tight constraint from the configured extents (falling
    /// back to the incoming bounds where unset), fitted into the incoming
    /// constraints; the child fills it exactly.
    fn layout_sized_box(
        &mut self,
        idx: u32,
        width: Option<f64>,
        height: Option<f64>,
        scheduler: &mut Scheduler,
    ) {
        let i = idx as usize;
        let incoming = self.constraints[i];
        let wanted = Constraints {
            min_width: width.unwrap_or(0.0),
            max_width: width.unwrap_or(f64::INFINITY),
            min_height: height.unwrap_or(0.0),
            max_height: height.unwrap_or(f64::INFINITY),
        };
        let inner = wanted.enforce(&incoming);
        match self.only_child(idx) {
            Some(child) => {
                self.layout_idx(child, inner, true, scheduler);
                self.offset[child as usize] = kurbo::Vec2::ZERO;
                self.size[i] = self.size[child as usize];
            }
            None => {
                self.size[i] = inner.constrain(Size::ZERO);
            }
        }
    }

    /// Linear stacking: children consume remaining main-axis space in
    /// mount order and sit centered on the cross axis.
    fn layout_linear(&mut self, idx: u32, axis: Axis, scheduler: &mut Scheduler) {
        let i = idx as usize;
        let c = self.constraints[i];
        let main_bounded = c.max_along(axis).is_finite();
        let cross_max = c.max_along(axis.cross());

        let mut used = 0.0_f64;
        let mut max_cross = 0.0_f64;
        let mut child = self.first_child[i];
        while child != INVALID {
            let next = self.next_sibling[child as usize];
            let avail = if main_bounded {
                (c.max_along(axis) - used).max(0.0)
            } else {
                f64::INFINITY
            };
            let child_constraints = match axis {
                Axis::Horizontal => Constraints::new(0.0, avail, 0.0, cross_max),
                Axis::Vertical => Constraints::new(0.0, cross_max, 0.0, avail),
            };
            self.layout_idx(child, child_constraints, true, scheduler);
            let child_size = self.size[child as usize];
            self.offset[child as usize] = axis.pack_offset(used, 0.0);
            used += axis.main_extent(child_size);
            max_cross = max_cross.max(axis.cross_extent(child_size));
            child = next;
        }

        let main = if main_bounded {
            c.max_along(axis)
        } else {
            used.clamp(c.min_along(axis), c.max_along(axis))
        };
        let cross = if cross_max.is_finite() {
            cross_max
        } else {
            max_cross.clamp(c.min_along(axis.cross()), cross_max)
        };
        self.size[i] = axis.pack(main, cross);

        // Cross extents were unknown during the first walk.
        let mut child = self.first_child[i];
        while child != INVALID {
            let child_size = self.size[child as usize];
            let main_offset = match axis {
                Axis::Horizontal => self.offset[child as usize].x,
                Axis::Vertical => self.offset[child as usize].y,
            };
            let cross_offset = (cross - axis.cross_extent(child_size)) / 2.0;
            self.offset[child as usize] = axis.pack_offset(main_offset, cross_offset);
            child = self.next_sibling[child as usize];
        }
    }

    /// View root: fills its tight constraints and hands them, still tight,
    /// to the one optional child at offset zero.
    fn layout_root(&mut self, idx: u32, scheduler: &mut Scheduler) {
        let i = idx as usize;
        let c = self.constraints[i];
        debug_assert!(
            c.is_tight(),
            "root node {:?} expects tight constraints, got {:?}",
            self.id_at(idx),
            c
        );
        let size = c.biggest();
        self.size[i] = size;
        if let Some(child) = self.only_child(idx) {
            self.layout_idx(child, Constraints::tight(size), false, scheduler);
            self.offset[child as usize] = kurbo::Vec2::ZERO;
        }
    }
}

#[cfg(test)]
mod tests {
    use kurbo::{Insets, Size, Vec2};

    use super::*;
    use crate::node::SurfaceId;

    fn fixture() -> (NodeStore, Scheduler) {
        (NodeStore::new(), Scheduler::new())
    }

    fn surface(store: &mut NodeStore, w: f64, h: f64) -> NodeId {
        store.create_node(NodeKind::Surface {
            surface: Some(SurfaceId(0)),
            preferred: Some(Size::new(w, h)),
        })
    }

    #[test]
    fn align_centers_child_in_bounded_space() {
        let (mut store, mut sched) = fixture();
        let align = store.create_node(NodeKind::Align(Alignment::CENTER));
        let child = surface(&mut store, 20.0, 40.0);
        store.add_child(align, child, &mut sched);

        store.layout(align, Constraints::tight(Size::new(100.0, 100.0)), false, &mut sched);

        assert_eq!(store.size(align), Size::new(100.0, 100.0));
        assert_eq!(store.size(child), Size::new(20.0, 40.0));
        assert_eq!(store.offset(child), Vec2::new(40.0, 30.0));
    }

    #[test]
    fn align_shrink_wraps_on_unbounded_axes() {
        let (mut store, mut sched) = fixture();
        let align = store.create_node(NodeKind::Align(Alignment::TOP_LEFT));
        let child = surface(&mut store, 30.0, 10.0);
        store.add_child(align, child, &mut sched);

        store.layout(align, Constraints::UNBOUNDED, true, &mut sched);

        assert_eq!(store.size(align), Size::new(30.0, 10.0));
        assert_eq!(store.offset(child), Vec2::ZERO);
    }

    #[test]
    fn padding_round_trip() {
        let (mut store, mut sched) = fixture();
        let insets = Insets::new(10.0, 2.0, 30.0, 4.0);
        let pad = store.create_node(NodeKind::Padding(insets));
        let child = surface(&mut store, 50.0, 50.0);
        store.add_child(pad, child, &mut sched);

        store.layout(pad, Constraints::UNBOUNDED, true, &mut sched);

        // Outer size is the child grown by the insets; the child sits at
        // the (left, top) inner offset.
        assert_eq!(store.size(pad), Size::new(50.0 + 40.0, 50.0 + 6.0));
        assert_eq!(store.offset(child), Vec2::new(10.0, 2.0));
    }

    #[test]
    fn padding_without_child_takes_insets_footprint() {
        let (mut store, mut sched) = fixture();
        let pad = store.create_node(NodeKind::Padding(Insets::uniform(8.0)));
        store.layout(pad, Constraints::UNBOUNDED, true, &mut sched);
        assert_eq!(store.size(pad), Size::new(16.0, 16.0));
    }

    #[test]
    fn sized_box_without_child_under_unbounded() {
        let (mut store, mut sched) = fixture();
        let boxed = store.create_node(NodeKind::SizedBox {
            width: Some(50.0),
            height: Some(50.0),
        });
        store.layout(boxed, Constraints::UNBOUNDED, true, &mut sched);
        assert_eq!(store.size(boxed), Size::new(50.0, 50.0));
    }

    #[test]
    fn sized_box_adapts_to_incoming_bounds() {
        let (mut store, mut sched) = fixture();
        let boxed = store.create_node(NodeKind::SizedBox {
            width: Some(500.0),
            height: None,
        });
        let child = surface(&mut store, 10.0, 10.0);
        store.add_child(boxed, child, &mut sched);

        store.layout(
            boxed,
            Constraints::new(0.0, 300.0, 0.0, 40.0),
            true,
            &mut sched,
        );

        // Wanted width 500 clamps to the incoming max; the child fills it.
        assert_eq!(store.size(child).width, 300.0);
        assert_eq!(store.size(boxed).width, 300.0);
    }

    #[test]
    fn linear_stacks_and_centers_cross_axis() {
        let (mut store, mut sched) = fixture();
        let linear = store.create_node(NodeKind::Linear(Axis::Horizontal));
        let a = surface(&mut store, 30.0, 20.0);
        let b = surface(&mut store, 50.0, 40.0);
        store.add_child(linear, a, &mut sched);
        store.add_child(linear, b, &mut sched);

        store.layout(linear, Constraints::tight(Size::new(200.0, 100.0)), false, &mut sched);

        assert_eq!(store.size(linear), Size::new(200.0, 100.0));
        assert_eq!(store.offset(a), Vec2::new(0.0, 40.0));
        assert_eq!(store.offset(b), Vec2::new(30.0, 30.0));
    }

    #[test]
    fn linear_consumes_remaining_space_in_order() {
        let (mut store, mut sched) = fixture();
        let linear = store.create_node(NodeKind::Linear(Axis::Horizontal));
        // Each surface wants 80 wide; only 100 is available in total.
        let a = surface(&mut store, 80.0, 10.0);
        let b = surface(&mut store, 80.0, 10.0);
        store.add_child(linear, a, &mut sched);
        store.add_child(linear, b, &mut sched);

        store.layout(linear, Constraints::tight(Size::new(100.0, 10.0)), false, &mut sched);

        assert_eq!(store.size(a).width, 80.0);
        // Second child is squeezed into what remains.
        assert_eq!(store.size(b).width, 20.0);
        assert_eq!(store.offset(b).x, 80.0);
    }

    #[test]
    fn root_fills_tight_constraints_and_pins_child() {
        let (mut store, mut sched) = fixture();
        let root = store.create_node(NodeKind::Root);
        let child = surface(&mut store, 10.0, 10.0);
        store.add_child(root, child, &mut sched);

        store.layout(root, Constraints::tight(Size::new(640.0, 480.0)), false, &mut sched);

        assert_eq!(store.size(root), Size::new(640.0, 480.0));
        assert_eq!(store.size(child), Size::new(640.0, 480.0));
        assert_eq!(store.offset(child), Vec2::ZERO);
    }

    #[test]
    fn surface_leaf_constrains_preferred_size() {
        let (mut store, mut sched) = fixture();
        let leaf = surface(&mut store, 500.0, 20.0);
        store.layout(leaf, Constraints::new(0.0, 100.0, 30.0, 100.0), true, &mut sched);
        assert_eq!(store.size(leaf), Size::new(100.0, 30.0));
    }

    #[test]
    fn unknown_node_takes_smallest_size() {
        let (mut store, mut sched) = fixture();
        let node = store.create_node(NodeKind::Unknown);
        store.layout(node, Constraints::new(5.0, 80.0, 7.0, 80.0), true, &mut sched);
        assert_eq!(store.size(node), Size::new(5.0, 7.0));
    }

    #[test]
    fn clean_node_with_same_constraints_short_circuits() {
        let (mut store, mut sched) = fixture();
        let align = store.create_node(NodeKind::Align(Alignment::CENTER));
        let child = surface(&mut store, 20.0, 20.0);
        store.add_child(align, child, &mut sched);

        let c = Constraints::tight(Size::new(100.0, 100.0));
        store.layout(align, c, false, &mut sched);
        assert!(!store.needs_layout(align));

        // Poke the child's resolved size; a pruned second pass must not
        // recompute it.
        store.size[child.index() as usize] = Size::new(999.0, 999.0);
        store.layout(align, c, false, &mut sched);
        assert_eq!(store.size(child), Size::new(999.0, 999.0));
    }

    #[test]
    fn dirty_child_relayout_does_not_touch_clean_siblings() {
        let (mut store, mut sched) = fixture();
        let linear = store.create_node(NodeKind::Linear(Axis::Horizontal));
        let a = surface(&mut store, 30.0, 20.0);
        let b = surface(&mut store, 50.0, 40.0);
        store.add_child(linear, a, &mut sched);
        store.add_child(linear, b, &mut sched);

        let c = Constraints::tight(Size::new(200.0, 100.0));
        store.layout(linear, c, false, &mut sched);

        // Re-running the parent's layout step re-offers each child its old
        // constraints; clean children prune.
        store.size[b.index() as usize] = Size::new(999.0, 999.0);
        store.needs_layout[linear.index() as usize] = true;
        store.layout(linear, c, false, &mut sched);
        assert_eq!(store.size(b), Size::new(999.0, 999.0));
    }

    #[test]
    fn boundary_invariant_holds_after_layout() {
        let (mut store, mut sched) = fixture();
        let root = store.create_node(NodeKind::Root);
        let align = store.create_node(NodeKind::Align(Alignment::CENTER));
        let pad = store.create_node(NodeKind::Padding(Insets::uniform(4.0)));
        let leaf = surface(&mut store, 10.0, 10.0);
        store.add_child(root, align, &mut sched);
        store.add_child(align, pad, &mut sched);
        store.add_child(pad, leaf, &mut sched);

        store.layout(root, Constraints::tight(Size::new(100.0, 100.0)), false, &mut sched);

        for id in [root, align, pad, leaf] {
            let b = store.relayout_boundary(id).unwrap();
            let parent_b = store.parent(id).map(|p| store.relayout_boundary(p));
            assert!(
                b == id || Some(Some(b)) == parent_b,
                "boundary of {id:?} is {b:?}, parent's is {parent_b:?}"
            );
        }
    }

    #[test]
    fn tight_constraints_establish_a_boundary() {
        let (mut store, mut sched) = fixture();
        let root = store.create_node(NodeKind::Root);
        let align = store.create_node(NodeKind::Align(Alignment::CENTER));
        store.add_child(root, align, &mut sched);

        store.layout(root, Constraints::tight(Size::new(100.0, 100.0)), false, &mut sched);

        // Root passes tight constraints down, so the child is its own
        // boundary even though it is not sized by parent.
        assert_eq!(store.relayout_boundary(align), Some(align));
    }

    #[test]
    fn loose_child_inherits_parent_boundary() {
        let (mut store, mut sched) = fixture();
        let align = store.create_node(NodeKind::Align(Alignment::CENTER));
        let inner = store.create_node(NodeKind::Align(Alignment::TOP_LEFT));
        let leaf = surface(&mut store, 10.0, 10.0);
        store.add_child(align, inner, &mut sched);
        store.add_child(inner, leaf, &mut sched);

        // Loose incoming constraints, parent uses size: align is the
        // boundary; inner gets loose constraints and inherits it.
        store.layout(
            align,
            Constraints::new(0.0, 100.0, 0.0, 100.0),
            false,
            &mut sched,
        );
        assert_eq!(store.relayout_boundary(align), Some(align));
        assert_eq!(store.relayout_boundary(inner), Some(align));
    }

    #[test]
    fn mark_needs_layout_stops_at_boundary_and_queues_it() {
        let (mut store, mut sched) = fixture();
        let root = store.create_node(NodeKind::Root);
        let align = store.create_node(NodeKind::Align(Alignment::CENTER));
        let pad = store.create_node(NodeKind::Padding(Insets::uniform(4.0)));
        store.add_child(root, align, &mut sched);
        store.add_child(align, pad, &mut sched);
        // Attach manually; mounting normally goes through the scheduler.
        store.attach_subtree(root.index(), 0, &mut sched);

        store.layout(root, Constraints::tight(Size::new(100.0, 100.0)), false, &mut sched);
        sched.layout_queue.clear();

        // Root hands the align node tight constraints, so align is a
        // boundary; the padding child under it is loose and inherits it.
        // Dirt on the padding node must stop at align and queue only it.
        store.mark_needs_layout(pad, &mut sched);
        assert!(store.needs_layout(pad));
        assert!(store.needs_layout(align));
        assert!(!store.needs_layout(root));
        assert!(sched.layout_queue.contains(&align));
        assert!(!sched.layout_queue.contains(&pad));
    }

    #[test]
    fn sized_by_parent_payload_change_invalidates_parent() {
        let (mut store, mut sched) = fixture();
        let align = store.create_node(NodeKind::Align(Alignment::CENTER));
        let child = surface(&mut store, 30.0, 30.0);
        store.add_child(align, child, &mut sched);
        store.layout(align, Constraints::tight(Size::new(100.0, 100.0)), false, &mut sched);
        assert!(!store.needs_layout(align));

        // The child sits under loose constraints, so a new preferred size
        // changes its resolved size; the parent's offsets go stale with it.
        store.set_kind(
            child,
            NodeKind::Surface {
                surface: Some(SurfaceId(0)),
                preferred: Some(Size::new(50.0, 50.0)),
            },
            &mut sched,
        );
        assert!(store.needs_layout(child));
        assert!(store.needs_layout(align));

        store.layout(align, Constraints::tight(Size::new(100.0, 100.0)), false, &mut sched);
        assert_eq!(store.size(child), Size::new(50.0, 50.0));
        assert_eq!(store.offset(child), Vec2::new(25.0, 25.0));
    }

    #[test]
    fn sized_by_parent_payload_change_under_tight_constraints_spares_parent() {
        let (mut store, mut sched) = fixture();
        let boxed = store.create_node(NodeKind::SizedBox {
            width: Some(40.0),
            height: Some(40.0),
        });
        let child = surface(&mut store, 30.0, 30.0);
        store.add_child(boxed, child, &mut sched);
        store.layout(boxed, Constraints::UNBOUNDED, true, &mut sched);
        assert!(store.constraints(child).is_tight());

        // Tight constraints pin the child's size, so the parent stays
        // clean.
        store.set_kind(
            child,
            NodeKind::Surface {
                surface: Some(SurfaceId(0)),
                preferred: Some(Size::new(50.0, 50.0)),
            },
            &mut sched,
        );
        assert!(store.needs_layout(child));
        assert!(!store.needs_layout(boxed));
    }

    #[test]
    fn queued_boundary_reentry_reruns_the_resize_step() {
        let (mut store, mut sched) = fixture();
        let leaf = surface(&mut store, 30.0, 30.0);
        store.layout(leaf, Constraints::new(0.0, 100.0, 0.0, 100.0), true, &mut sched);
        assert_eq!(store.size(leaf), Size::new(30.0, 30.0));

        store.kind[leaf.index() as usize] = NodeKind::Surface {
            surface: Some(SurfaceId(0)),
            preferred: Some(Size::new(50.0, 50.0)),
        };
        store.relayout_idx(leaf.index(), &mut sched);
        assert_eq!(store.size(leaf), Size::new(50.0, 50.0));
    }

    #[test]
    #[should_panic(expected = "invalid constraints")]
    fn malformed_constraints_fail_fast() {
        let (mut store, mut sched) = fixture();
        let node = store.create_node(NodeKind::Unknown);
        let c = Constraints {
            min_width: 10.0,
            max_width: 4.0,
            min_height: 0.0,
            max_height: 0.0,
        };
        store.layout(node, c, true, &mut sched);
    }

    #[test]
    #[should_panic(expected = "supports at most one child")]
    fn single_child_strategy_rejects_second_child() {
        let (mut store, mut sched) = fixture();
        let align = store.create_node(NodeKind::Align(Alignment::CENTER));
        let a = surface(&mut store, 1.0, 1.0);
        let b = surface(&mut store, 1.0, 1.0);
        store.add_child(align, a, &mut sched);
        store.add_child(align, b, &mut sched);
        store.layout(align, Constraints::UNBOUNDED, true, &mut sched);
    }
}
