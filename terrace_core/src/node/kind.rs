// Copyright 2026 the Terrace Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Node kinds and per-child layout parameters.
//!
//! The set of layout strategies is closed: every node carries a [`NodeKind`]
//! and the layout pass dispatches on it with a `match`, so adding a strategy
//! means extending the enum and the compiler points at every dispatch site.
//! Kind payloads are plain `Copy` config structs.

use kurbo::{Insets, Size};

use crate::geometry::{Alignment, Axis};

use super::id::SurfaceId;

/// Horizontal reading direction for flex rows.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum TextDirection {
    /// Left to right.
    #[default]
    Ltr,
    /// Right to left.
    Rtl,
}

/// Vertical growth direction for flex columns.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum VerticalDirection {
    /// Top to bottom.
    #[default]
    Down,
    /// Bottom to top.
    Up,
}

/// How children are distributed along a flex container's main axis.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum MainAlign {
    /// Pack children toward the leading edge.
    #[default]
    Start,
    /// Pack children toward the trailing edge.
    End,
    /// Center the packed children.
    Center,
    /// Equal gaps between children, none at the edges.
    SpaceBetween,
    /// Equal gaps around each child (half-gaps at the edges).
    SpaceAround,
    /// Equal gaps between children and at both edges.
    SpaceEvenly,
}

/// How children sit on a flex container's cross axis.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum CrossAlign {
    /// Leading cross edge (resolved against the cross-axis direction).
    Start,
    /// Trailing cross edge (resolved against the cross-axis direction).
    End,
    /// Centered on the cross axis.
    #[default]
    Center,
    /// Children are forced to fill the cross extent (tight constraint).
    Stretch,
}

/// Whether a flex container fills its main-axis bound or shrink-wraps.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum MainSizePolicy {
    /// Take the incoming maximum when it is finite.
    #[default]
    Max,
    /// Take the allocated sum of children.
    Min,
}

/// How a flexible child consumes its allotted main-axis share.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum FlexFit {
    /// Must consume exactly the allotted extent.
    Tight,
    /// May consume anything up to the allotted extent.
    #[default]
    Loose,
}

/// How a stack constrains its non-positioned children.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum StackFit {
    /// Loosen the incoming constraints.
    #[default]
    Loose,
    /// Tighten both axes to the incoming maxima.
    Expand,
    /// Pass the incoming constraints through unmodified.
    Passthrough,
}

/// Configuration for a flex container (row or column).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FlexConfig {
    /// The main axis: [`Axis::Horizontal`] is a row.
    pub axis: Axis,
    /// Main-axis distribution policy.
    pub main_align: MainAlign,
    /// Cross-axis placement policy.
    pub cross_align: CrossAlign,
    /// Whether the container fills the main-axis bound or shrink-wraps.
    pub main_size: MainSizePolicy,
    /// Reading direction; flips horizontal positioning only.
    pub text_direction: TextDirection,
    /// Growth direction; flips vertical positioning only.
    pub vertical_direction: VerticalDirection,
}

impl FlexConfig {
    /// A left-to-right row with default alignment.
    #[must_use]
    pub fn row() -> Self {
        Self {
            axis: Axis::Horizontal,
            ..Self::default()
        }
    }

    /// A top-to-bottom column with default alignment.
    #[must_use]
    pub fn column() -> Self {
        Self {
            axis: Axis::Vertical,
            ..Self::default()
        }
    }
}

impl Default for FlexConfig {
    fn default() -> Self {
        Self {
            axis: Axis::Horizontal,
            main_align: MainAlign::Start,
            cross_align: CrossAlign::Center,
            main_size: MainSizePolicy::Max,
            text_direction: TextDirection::Ltr,
            vertical_direction: VerticalDirection::Down,
        }
    }
}

/// Configuration for a z-stack.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct StackConfig {
    /// Where non-positioned children (and positioned children with an
    /// unspecified axis) land inside the stack.
    pub alignment: Alignment,
    /// Constraint transform applied to non-positioned children.
    pub fit: StackFit,
}

/// The layout strategy a node implements.
///
/// Single-child strategies (`Align`, `Padding`, `SizedBox`) lay out their
/// first child and ignore any siblings after it; callers are expected to
/// mount at most one.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum NodeKind {
    /// Flex container: row or column with weighted children.
    Flex(FlexConfig),
    /// Z-stack with optional per-child positioning.
    Stack(StackConfig),
    /// Sizes to the incoming maximum and aligns one optional child.
    Align(Alignment),
    /// Insets one optional child; sizes to the padded-out child.
    Padding(Insets),
    /// Forces a tight child constraint from configured extents.
    SizedBox {
        /// Desired width; `None` falls back to the incoming constraint.
        width: Option<f64>,
        /// Desired height; `None` falls back to the incoming constraint.
        height: Option<f64>,
    },
    /// Unidirectional stacking: children consume remaining space in order,
    /// centered on the cross axis.
    Linear(Axis),
    /// Leaf presenting an embedder surface. Sized by the parent alone.
    Surface {
        /// The backing surface, if one has been associated yet.
        surface: Option<SurfaceId>,
        /// Natural size, constrained into whatever the parent passes.
        preferred: Option<Size>,
    },
    /// View root: fills its (always tight) constraints, one child.
    Root,
    /// Placeholder for an unrecognized node type name. Sizes to the
    /// smallest admissible size and commits like any leaf.
    Unknown,
}

impl NodeKind {
    /// Whether this kind's size is a function of the incoming constraints
    /// alone, independent of its children.
    ///
    /// Such nodes resize in a dedicated step before child layout and act
    /// as relayout boundaries for their subtree. The view root is *not* in
    /// this set: it re-reads its stored constraints inside the ordinary
    /// layout step, so a queued relayout after a surface resize picks up
    /// the new dimensions.
    #[must_use]
    pub const fn sized_by_parent(&self) -> bool {
        matches!(self, Self::Surface { .. } | Self::Unknown)
    }

    /// Short strategy name for diagnostics.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Flex(_) => "flex",
            Self::Stack(_) => "stack",
            Self::Align(_) => "align",
            Self::Padding(_) => "padding",
            Self::SizedBox { .. } => "sized-box",
            Self::Linear(_) => "linear",
            Self::Surface { .. } => "surface",
            Self::Root => "root",
            Self::Unknown => "unknown",
        }
    }
}

/// Per-axis placement spec for a positioned stack child.
///
/// On each axis at most two of the three quantities (near edge, far edge,
/// extent) may be given: both edges pin the extent, one edge plus `width`/
/// `height` pins the other edge, a bare extent aligns per the stack's
/// alignment, and nothing at all leaves the child loose. All three on one
/// axis is a programmer error, rejected at layout time.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PositionedSpec {
    /// Distance from the stack's left edge.
    pub left: Option<f64>,
    /// Distance from the stack's top edge.
    pub top: Option<f64>,
    /// Distance from the stack's right edge.
    pub right: Option<f64>,
    /// Distance from the stack's bottom edge.
    pub bottom: Option<f64>,
    /// Fixed width.
    pub width: Option<f64>,
    /// Fixed height.
    pub height: Option<f64>,
}

/// Per-child layout parameters owned by the parent.
///
/// Meaningful only while the child is mounted; unmounting resets the slot
/// to defaults. Which fields apply depends on the parent's kind: `flex`
/// and `fit` for flex containers, `positioned` for stacks.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ChildParams {
    /// Flex weight; `0` means inflexible.
    pub flex: u32,
    /// How a flexible child consumes its share. Ignored when `flex == 0`.
    pub fit: FlexFit,
    /// Positioning inside a stack parent; `None` means non-positioned.
    pub positioned: Option<PositionedSpec>,
}

impl ChildParams {
    /// Whether these params describe a positioned stack child.
    #[inline]
    #[must_use]
    pub const fn is_positioned(&self) -> bool {
        self.positioned.is_some()
    }
}
