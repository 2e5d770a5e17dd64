// Copyright 2026 the Terrace Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Flex layout: rows and columns with weighted children.
//!
//! Sizing runs in two passes over the children. Inflexible children
//! (weight 0) lay out first, unconstrained on the main axis, and their
//! extents accumulate into `allocated`. Whatever remains of a finite main
//! bound is then split between the flexible children proportionally to
//! their weights; the *last* flexible child receives the exact remainder
//! instead of its proportional share, so rounding error never leaks into
//! the total. A child with a tight [`FlexFit`] must consume exactly its
//! share and therefore demands a finite main bound up front.
//!
//! Positioning derives a `(leading, between)` spacing pair from the
//! main-axis alignment and walks the children once, in reverse when the
//! reading direction flips the main axis.

use crate::geometry::{Axis, Constraints};
use crate::node::{
    CrossAlign, FlexConfig, FlexFit, INVALID, MainAlign, MainSizePolicy, NodeStore, TextDirection,
    VerticalDirection,
};
use crate::scheduler::Scheduler;

/// Child constraints for one flex pass: `[min_main, max_main]` on the main
/// axis, loose-or-stretched on the cross axis.
fn child_constraints(
    axis: Axis,
    min_main: f64,
    max_main: f64,
    stretch: bool,
    cross_max: f64,
) -> Constraints {
    let (min_cross, max_cross) = if stretch {
        (cross_max, cross_max)
    } else {
        (0.0, cross_max)
    };
    match axis {
        Axis::Horizontal => Constraints::new(min_main, max_main, min_cross, max_cross),
        Axis::Vertical => Constraints::new(min_cross, max_cross, min_main, max_main),
    }
}

/// Leading and inter-child space for a main-axis alignment, given the
/// unclaimed main extent. Degenerate child counts collapse to zero space.
fn spacing(align: MainAlign, remaining: f64, count: usize) -> (f64, f64) {
    match align {
        MainAlign::Start => (0.0, 0.0),
        MainAlign::End => (remaining, 0.0),
        MainAlign::Center => (remaining / 2.0, 0.0),
        MainAlign::SpaceBetween => {
            if count > 1 {
                (0.0, remaining / (count - 1) as f64)
            } else {
                (0.0, 0.0)
            }
        }
        MainAlign::SpaceAround => {
            if count > 0 {
                let between = remaining / count as f64;
                (between / 2.0, between)
            } else {
                (0.0, 0.0)
            }
        }
        MainAlign::SpaceEvenly => {
            let between = remaining / (count + 1) as f64;
            (between, between)
        }
    }
}

impl NodeStore {
    pub(crate) fn layout_flex(&mut self, idx: u32, config: FlexConfig, scheduler: &mut Scheduler) {
        let i = idx as usize;
        let c = self.constraints[i];
        let axis = config.axis;
        let max_main = c.max_along(axis);
        let cross_max = c.max_along(axis.cross());
        let can_flex = max_main.is_finite();
        let stretch = config.cross_align == CrossAlign::Stretch;

        assert!(
            !stretch || cross_max.is_finite(),
            "flex node {:?}: cross-axis stretch requires a bounded cross axis, got {:?}",
            self.id_at(idx),
            c
        );

        // Pass 1: inflexible children, main axis unconstrained.
        let mut total_flex: u64 = 0;
        let mut allocated = 0.0_f64;
        let mut cross_size = 0.0_f64;
        let mut count = 0_usize;
        let mut last_flexible = INVALID;

        let mut child = self.first_child[i];
        while child != INVALID {
            let next = self.next_sibling[child as usize];
            count += 1;
            let flex = self.params[child as usize].flex;
            if flex > 0 {
                assert!(
                    can_flex || self.params[child as usize].fit == FlexFit::Loose,
                    "flex node {:?}: child {:?} has a tight fit on an unbounded main axis ({:?})",
                    self.id_at(idx),
                    self.id_at(child),
                    c
                );
                total_flex += u64::from(flex);
                last_flexible = child;
            } else {
                let cc = child_constraints(axis, 0.0, f64::INFINITY, stretch, cross_max);
                self.layout_idx(child, cc, true, scheduler);
                let size = self.size[child as usize];
                allocated += axis.main_extent(size);
                cross_size = cross_size.max(axis.cross_extent(size));
            }
            child = next;
        }

        // Pass 2: flexible children share the free space by weight.
        if total_flex > 0 {
            let free_space = if can_flex {
                (max_main - allocated).max(0.0)
            } else {
                0.0
            };
            let space_per_flex = free_space / total_flex as f64;
            let mut remaining_share = free_space;

            let mut child = self.first_child[i];
            while child != INVALID {
                let next = self.next_sibling[child as usize];
                let params = self.params[child as usize];
                if params.flex > 0 {
                    let (min_main, max_child) = if can_flex {
                        // The last flexible child absorbs the rounding
                        // remainder so the shares sum exactly.
                        let share = if child == last_flexible {
                            remaining_share.max(0.0)
                        } else {
                            space_per_flex * f64::from(params.flex)
                        };
                        remaining_share -= share;
                        match params.fit {
                            FlexFit::Tight => (share, share),
                            FlexFit::Loose => (0.0, share),
                        }
                    } else {
                        // Unbounded axis: loose children size to content.
                        (0.0, f64::INFINITY)
                    };
                    let cc = child_constraints(axis, min_main, max_child, stretch, cross_max);
                    self.layout_idx(child, cc, true, scheduler);
                    let size = self.size[child as usize];
                    allocated += axis.main_extent(size);
                    cross_size = cross_size.max(axis.cross_extent(size));
                }
                child = next;
            }
        }

        // Own size: main per the size policy, cross wraps the children;
        // both clamped independently into the incoming constraints.
        let ideal_main = if config.main_size == MainSizePolicy::Max && can_flex {
            max_main
        } else {
            allocated
        };
        let final_main = ideal_main.clamp(c.min_along(axis), c.max_along(axis));
        let final_cross = cross_size.clamp(c.min_along(axis.cross()), c.max_along(axis.cross()));
        self.size[i] = axis.pack(final_main, final_cross);
        self.overflow[i] = (allocated - final_main).max(0.0);

        // Positioning.
        let remaining = (final_main - allocated).max(0.0);
        let (leading, between) = spacing(config.main_align, remaining, count);
        let flip_main = match axis {
            Axis::Horizontal => config.text_direction == TextDirection::Rtl,
            Axis::Vertical => config.vertical_direction == VerticalDirection::Up,
        };
        let flip_cross = match axis.cross() {
            Axis::Horizontal => config.text_direction == TextDirection::Rtl,
            Axis::Vertical => config.vertical_direction == VerticalDirection::Up,
        };

        let mut main_cursor = leading;
        let mut child = if flip_main {
            self.last_child(i)
        } else {
            self.first_child[i]
        };
        while child != INVALID {
            let size = self.size[child as usize];
            let cross_extent = axis.cross_extent(size);
            let cross_offset = match config.cross_align {
                CrossAlign::Start => {
                    if flip_cross {
                        final_cross - cross_extent
                    } else {
                        0.0
                    }
                }
                CrossAlign::End => {
                    if flip_cross {
                        0.0
                    } else {
                        final_cross - cross_extent
                    }
                }
                CrossAlign::Center => (final_cross - cross_extent) / 2.0,
                CrossAlign::Stretch => 0.0,
            };
            self.offset[child as usize] = axis.pack_offset(main_cursor, cross_offset);
            main_cursor += axis.main_extent(size) + between;

            child = if flip_main {
                self.prev_sibling[child as usize]
            } else {
                self.next_sibling[child as usize]
            };
        }
    }

    fn last_child(&self, idx: usize) -> u32 {
        let mut c = self.first_child[idx];
        if c == INVALID {
            return INVALID;
        }
        while self.next_sibling[c as usize] != INVALID {
            c = self.next_sibling[c as usize];
        }
        c
    }
}
