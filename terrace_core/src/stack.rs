// Copyright 2026 the Terrace Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Z-stack layout: overlapping children, optionally pinned to edges.
//!
//! Non-positioned children lay out first, under the incoming constraints
//! transformed by the [`StackFit`], and the maxima of their extents become
//! the stack's own size. Positioned children ([`PositionedSpec`]) lay out
//! afterwards against that size: per axis, two pinned edges make a tight
//! extent, a bare extent makes a tight extent placed by edge or alignment,
//! and an unspecified axis stays unconstrained.

use kurbo::{Size, Vec2};

use crate::geometry::Constraints;
use crate::node::{INVALID, NodeStore, PositionedSpec, StackConfig, StackFit};
use crate::scheduler::Scheduler;

impl NodeStore {
    pub(crate) fn layout_stack(
        &mut self,
        idx: u32,
        config: StackConfig,
        scheduler: &mut Scheduler,
    ) {
        let i = idx as usize;
        let c = self.constraints[i];

        let non_positioned_constraints = match config.fit {
            StackFit::Loose => c.loosened(),
            StackFit::Expand => {
                assert!(
                    c.biggest().is_finite(),
                    "stack node {:?}: expand fit requires bounded constraints, got {:?}",
                    self.id_at(idx),
                    c
                );
                Constraints::tight(c.biggest())
            }
            StackFit::Passthrough => c,
        };

        // Pass 1: non-positioned children establish the stack's extent.
        let mut has_non_positioned = false;
        let mut width = 0.0_f64;
        let mut height = 0.0_f64;
        let mut child = self.first_child[i];
        while child != INVALID {
            let next = self.next_sibling[child as usize];
            if !self.params[child as usize].is_positioned() {
                has_non_positioned = true;
                self.layout_idx(child, non_positioned_constraints, true, scheduler);
                let cs = self.size[child as usize];
                width = width.max(cs.width);
                height = height.max(cs.height);
            }
            child = next;
        }

        let size = if has_non_positioned {
            c.constrain(Size::new(width, height))
        } else {
            // Nothing to wrap: fill what is bounded, collapse what is not.
            Size::new(
                if c.has_bounded_width() { c.max_width } else { c.min_width },
                if c.has_bounded_height() { c.max_height } else { c.min_height },
            )
        };
        self.size[i] = size;

        // Pass 2: positioned children lay out against the final size, and
        // every child gets its offset.
        let mut child = self.first_child[i];
        while child != INVALID {
            let next = self.next_sibling[child as usize];
            match self.params[child as usize].positioned {
                None => {
                    let cs = self.size[child as usize];
                    self.offset[child as usize] = config.alignment.child_offset(size, cs);
                }
                Some(spec) => {
                    self.layout_positioned(idx, child, spec, size, config, scheduler);
                }
            }
            child = next;
        }
    }

    fn layout_positioned(
        &mut self,
        idx: u32,
        child: u32,
        spec: PositionedSpec,
        size: Size,
        config: StackConfig,
        scheduler: &mut Scheduler,
    ) {
        assert!(
            !(spec.left.is_some() && spec.right.is_some() && spec.width.is_some()),
            "stack node {:?}: child {:?} specifies left, right, and width at once",
            self.id_at(idx),
            self.id_at(child),
        );
        assert!(
            !(spec.top.is_some() && spec.bottom.is_some() && spec.height.is_some()),
            "stack node {:?}: child {:?} specifies top, bottom, and height at once",
            self.id_at(idx),
            self.id_at(child),
        );

        let mut cc = Constraints::UNBOUNDED;
        if let (Some(l), Some(r)) = (spec.left, spec.right) {
            cc = cc.tighten(Some(size.width - l - r), None);
        } else if let Some(w) = spec.width {
            cc = cc.tighten(Some(w), None);
        }
        if let (Some(t), Some(b)) = (spec.top, spec.bottom) {
            cc = cc.tighten(None, Some(size.height - t - b));
        } else if let Some(h) = spec.height {
            cc = cc.tighten(None, Some(h));
        }
        self.layout_idx(child, cc, true, scheduler);

        let cs = self.size[child as usize];
        let x = if let Some(l) = spec.left {
            l
        } else if let Some(r) = spec.right {
            size.width - r - cs.width
        } else {
            config.alignment.child_offset(size, cs).x
        };
        let y = if let Some(t) = spec.top {
            t
        } else if let Some(b) = spec.bottom {
            size.height - b - cs.height
        } else {
            config.alignment.child_offset(size, cs).y
        };
        self.offset[child as usize] = Vec2::new(x, y);
    }
}

#[cfg(test)]
mod tests {
    use kurbo::Size;

    use super::*;
    use crate::geometry::Alignment;
    use crate::node::{ChildParams, NodeId, NodeKind, SurfaceId};

    fn fixture() -> (NodeStore, Scheduler) {
        (NodeStore::new(), Scheduler::new())
    }

    fn stack(store: &mut NodeStore, alignment: Alignment, fit: StackFit) -> NodeId {
        store.create_node(NodeKind::Stack(StackConfig { alignment, fit }))
    }

    fn leaf(
        store: &mut NodeStore,
        sched: &mut Scheduler,
        parent: NodeId,
        w: f64,
        h: f64,
    ) -> NodeId {
        let child = store.create_node(NodeKind::Surface {
            surface: Some(SurfaceId(0)),
            preferred: Some(Size::new(w, h)),
        });
        store.add_child(parent, child, sched);
        child
    }

    fn positioned(
        store: &mut NodeStore,
        sched: &mut Scheduler,
        parent: NodeId,
        spec: PositionedSpec,
    ) -> NodeId {
        let child = leaf(store, sched, parent, 10.0, 10.0);
        store.set_child_params(
            child,
            ChildParams {
                positioned: Some(spec),
                ..ChildParams::default()
            },
            sched,
        );
        child
    }

    #[test]
    fn centers_a_non_positioned_child() {
        let (mut store, mut sched) = fixture();
        let zstack = stack(&mut store, Alignment::CENTER, StackFit::Loose);
        let child = leaf(&mut store, &mut sched, zstack, 20.0, 20.0);

        store.layout(zstack, Constraints::tight(Size::new(100.0, 100.0)), false, &mut sched);

        assert_eq!(store.size(zstack), Size::new(100.0, 100.0));
        assert_eq!(store.offset(child).x, 40.0);
        assert_eq!(store.offset(child).y, 40.0);
    }

    #[test]
    fn sizes_to_largest_non_positioned_extents() {
        let (mut store, mut sched) = fixture();
        let zstack = stack(&mut store, Alignment::TOP_LEFT, StackFit::Loose);
        let _a = leaf(&mut store, &mut sched, zstack, 50.0, 30.0);
        let _b = leaf(&mut store, &mut sched, zstack, 20.0, 80.0);

        store.layout(zstack, Constraints::new(0.0, 200.0, 0.0, 200.0), true, &mut sched);

        assert_eq!(store.size(zstack), Size::new(50.0, 80.0));
    }

    #[test]
    fn expand_fit_inflates_children() {
        let (mut store, mut sched) = fixture();
        let zstack = stack(&mut store, Alignment::TOP_LEFT, StackFit::Expand);
        let a = leaf(&mut store, &mut sched, zstack, 5.0, 5.0);

        store.layout(zstack, Constraints::new(0.0, 120.0, 0.0, 90.0), true, &mut sched);

        assert_eq!(store.size(a), Size::new(120.0, 90.0));
        assert_eq!(store.size(zstack), Size::new(120.0, 90.0));
    }

    #[test]
    fn passthrough_fit_hands_constraints_through() {
        let (mut store, mut sched) = fixture();
        let zstack = stack(&mut store, Alignment::TOP_LEFT, StackFit::Passthrough);
        let a = leaf(&mut store, &mut sched, zstack, 5.0, 5.0);

        store.layout(zstack, Constraints::tight(Size::new(64.0, 48.0)), false, &mut sched);

        // Tight incoming constraints reach the child unmodified.
        assert_eq!(store.size(a), Size::new(64.0, 48.0));
        assert_eq!(store.constraints(a), Constraints::tight(Size::new(64.0, 48.0)));
    }

    #[test]
    fn without_non_positioned_children_falls_back_per_axis() {
        let (mut store, mut sched) = fixture();
        let zstack = stack(&mut store, Alignment::TOP_LEFT, StackFit::Loose);
        let _p = positioned(
            &mut store,
            &mut sched,
            zstack,
            PositionedSpec {
                left: Some(5.0),
                top: Some(5.0),
                ..PositionedSpec::default()
            },
        );

        // Width bounded, height unbounded with a minimum.
        store.layout(
            zstack,
            Constraints::new(0.0, 150.0, 40.0, f64::INFINITY),
            true,
            &mut sched,
        );

        assert_eq!(store.size(zstack), Size::new(150.0, 40.0));
    }

    #[test]
    fn pinned_edges_make_a_tight_extent() {
        let (mut store, mut sched) = fixture();
        let zstack = stack(&mut store, Alignment::TOP_LEFT, StackFit::Loose);
        let _base = leaf(&mut store, &mut sched, zstack, 100.0, 100.0);
        let pinned = positioned(
            &mut store,
            &mut sched,
            zstack,
            PositionedSpec {
                left: Some(10.0),
                right: Some(20.0),
                top: Some(5.0),
                ..PositionedSpec::default()
            },
        );

        store.layout(zstack, Constraints::tight(Size::new(100.0, 100.0)), false, &mut sched);

        assert_eq!(store.size(pinned).width, 70.0);
        assert_eq!(store.offset(pinned), Vec2::new(10.0, 5.0));
    }

    #[test]
    fn far_edge_with_extent_positions_from_the_right() {
        let (mut store, mut sched) = fixture();
        let zstack = stack(&mut store, Alignment::TOP_LEFT, StackFit::Loose);
        let _base = leaf(&mut store, &mut sched, zstack, 100.0, 100.0);
        let pinned = positioned(
            &mut store,
            &mut sched,
            zstack,
            PositionedSpec {
                right: Some(10.0),
                width: Some(30.0),
                bottom: Some(12.0),
                height: Some(40.0),
                ..PositionedSpec::default()
            },
        );

        store.layout(zstack, Constraints::tight(Size::new(100.0, 100.0)), false, &mut sched);

        assert_eq!(store.size(pinned), Size::new(30.0, 40.0));
        assert_eq!(store.offset(pinned), Vec2::new(60.0, 48.0));
    }

    #[test]
    fn unspecified_axis_falls_back_to_alignment() {
        let (mut store, mut sched) = fixture();
        let zstack = stack(&mut store, Alignment::CENTER, StackFit::Loose);
        let _base = leaf(&mut store, &mut sched, zstack, 100.0, 100.0);
        // Vertical pin only; horizontally the child floats per alignment.
        let pinned = positioned(
            &mut store,
            &mut sched,
            zstack,
            PositionedSpec {
                top: Some(4.0),
                ..PositionedSpec::default()
            },
        );

        store.layout(zstack, Constraints::tight(Size::new(100.0, 100.0)), false, &mut sched);

        assert_eq!(store.offset(pinned), Vec2::new(45.0, 4.0));
    }

    #[test]
    #[should_panic(expected = "left, right, and width at once")]
    fn over_specified_axis_fails_fast() {
        let (mut store, mut sched) = fixture();
        let zstack = stack(&mut store, Alignment::TOP_LEFT, StackFit::Loose);
        let _p = positioned(
            &mut store,
            &mut sched,
            zstack,
            PositionedSpec {
                left: Some(0.0),
                right: Some(0.0),
                width: Some(10.0),
                ..PositionedSpec::default()
            },
        );
        store.layout(zstack, Constraints::tight(Size::new(100.0, 100.0)), false, &mut sched);
    }

    #[test]
    #[should_panic(expected = "expand fit requires bounded constraints")]
    fn expand_fit_demands_bounded_constraints() {
        let (mut store, mut sched) = fixture();
        let zstack = stack(&mut store, Alignment::TOP_LEFT, StackFit::Expand);
        let _a = leaf(&mut store, &mut sched, zstack, 5.0, 5.0);
        store.layout(zstack, Constraints::UNBOUNDED, true, &mut sched);
    }
}
