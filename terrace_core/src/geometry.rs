// Copyright 2026 the Terrace Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Geometry value types for constraint-based layout.
//!
//! The primitive vocabulary comes from [`kurbo`]: [`Size`] for extents,
//! [`Point`] for absolute positions, [`Vec2`] for parent-relative offsets,
//! and [`Insets`] for edge padding. This module adds the two types layout
//! itself revolves around:
//!
//! - [`Constraints`] — an axis-aligned min/max box that a node's resolved
//!   size must satisfy. Parents hand constraints down; children hand sizes
//!   up. A *tight* constraint admits exactly one size.
//! - [`Alignment`] — a normalized `[-1, 1]²` coordinate that maps a
//!   parent/child size pair to a child offset.
//!
//! All types here are plain `Copy` values. Operations return new values;
//! nothing aliases.

use core::fmt;

use kurbo::{Insets, Size, Vec2};

/// The two layout axes.
///
/// Flex and linear containers are written against a *main* axis and read
/// extents through this enum rather than touching `width`/`height`
/// directly, so one code path serves both rows and columns.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Axis {
    /// Main axis runs left-to-right; cross axis is vertical.
    Horizontal,
    /// Main axis runs top-to-bottom; cross axis is horizontal.
    Vertical,
}

impl Axis {
    /// Returns the perpendicular axis.
    #[inline]
    #[must_use]
    pub const fn cross(self) -> Self {
        match self {
            Self::Horizontal => Self::Vertical,
            Self::Vertical => Self::Horizontal,
        }
    }

    /// Extent of `size` along this axis.
    #[inline]
    #[must_use]
    pub const fn main_extent(self, size: Size) -> f64 {
        match self {
            Self::Horizontal => size.width,
            Self::Vertical => size.height,
        }
    }

    /// Extent of `size` along the perpendicular axis.
    #[inline]
    #[must_use]
    pub const fn cross_extent(self, size: Size) -> f64 {
        match self {
            Self::Horizontal => size.height,
            Self::Vertical => size.width,
        }
    }

    /// Builds a size from main- and cross-axis extents.
    #[inline]
    #[must_use]
    pub const fn pack(self, main: f64, cross: f64) -> Size {
        match self {
            Self::Horizontal => Size::new(main, cross),
            Self::Vertical => Size::new(cross, main),
        }
    }

    /// Builds an offset vector from main- and cross-axis components.
    #[inline]
    #[must_use]
    pub const fn pack_offset(self, main: f64, cross: f64) -> Vec2 {
        match self {
            Self::Horizontal => Vec2::new(main, cross),
            Self::Vertical => Vec2::new(cross, main),
        }
    }
}

/// Sanitizes one constraint bound: NaN clamps to zero, negatives clamp to
/// zero, `+∞` passes through (legal for maxima).
#[inline]
fn sanitize(v: f64) -> f64 {
    if v.is_nan() { 0.0 } else { v.max(0.0) }
}

/// An immutable min/max box constraint.
///
/// A size *satisfies* a constraint when `min ≤ size ≤ max` holds on both
/// axes. Minima are always finite and non-negative; maxima may be `+∞`
/// (unbounded). The constructors sanitize their inputs per these rules, so
/// a `Constraints` built through them is always valid; code that fabricates
/// one from raw fields is expected to keep the invariant and layout entry
/// asserts it.
#[derive(Clone, Copy, PartialEq)]
pub struct Constraints {
    /// Minimum admissible width (finite, ≥ 0).
    pub min_width: f64,
    /// Maximum admissible width (≥ `min_width`, may be `+∞`).
    pub max_width: f64,
    /// Minimum admissible height (finite, ≥ 0).
    pub min_height: f64,
    /// Maximum admissible height (≥ `min_height`, may be `+∞`).
    pub max_height: f64,
}

impl Constraints {
    /// A constraint admitting any finite non-negative size.
    pub const UNBOUNDED: Self = Self {
        min_width: 0.0,
        max_width: f64::INFINITY,
        min_height: 0.0,
        max_height: f64::INFINITY,
    };

    /// Creates a constraint from raw bounds, sanitizing them.
    ///
    /// NaN inputs clamp to zero, negative inputs clamp to zero, and a
    /// minimum above its maximum clamps down to the maximum.
    #[must_use]
    pub fn new(min_width: f64, max_width: f64, min_height: f64, max_height: f64) -> Self {
        let max_width = sanitize(max_width);
        let max_height = sanitize(max_height);
        Self {
            min_width: sanitize(min_width).min(max_width),
            max_width,
            min_height: sanitize(min_height).min(max_height),
            max_height,
        }
    }

    /// Creates a tight constraint admitting exactly `size`.
    #[must_use]
    pub fn tight(size: Size) -> Self {
        let w = sanitize(size.width);
        let h = sanitize(size.height);
        Self {
            min_width: w,
            max_width: w,
            min_height: h,
            max_height: h,
        }
    }

    /// Creates a loose constraint admitting anything up to `size`.
    #[must_use]
    pub fn loose(size: Size) -> Self {
        Self {
            min_width: 0.0,
            max_width: sanitize(size.width),
            min_height: 0.0,
            max_height: sanitize(size.height),
        }
    }

    /// Returns a copy with both minima set to zero.
    #[must_use]
    pub const fn loosened(self) -> Self {
        Self {
            min_width: 0.0,
            max_width: self.max_width,
            min_height: 0.0,
            max_height: self.max_height,
        }
    }

    /// Moves the bounds toward the given target extents without escaping
    /// the original bounds.
    ///
    /// A `Some(w)` target pins the width to `w` clamped into
    /// `[min_width, max_width]`; `None` leaves the axis untouched.
    #[must_use]
    pub fn tighten(self, width: Option<f64>, height: Option<f64>) -> Self {
        let mut out = self;
        if let Some(w) = width {
            let w = sanitize(w).clamp(self.min_width, self.max_width);
            out.min_width = w;
            out.max_width = w;
        }
        if let Some(h) = height {
            let h = sanitize(h).clamp(self.min_height, self.max_height);
            out.min_height = h;
            out.max_height = h;
        }
        out
    }

    /// Clamps `size` into the admissible range.
    #[inline]
    #[must_use]
    pub fn constrain(&self, size: Size) -> Size {
        Size::new(
            self.constrain_width(size.width),
            self.constrain_height(size.height),
        )
    }

    /// Clamps a width into `[min_width, max_width]`.
    #[inline]
    #[must_use]
    pub fn constrain_width(&self, width: f64) -> f64 {
        sanitize(width).clamp(self.min_width, self.max_width)
    }

    /// Clamps a height into `[min_height, max_height]`.
    #[inline]
    #[must_use]
    pub fn constrain_height(&self, height: f64) -> f64 {
        sanitize(height).clamp(self.min_height, self.max_height)
    }

    /// Shrinks this constraint until it fits inside `outer`.
    ///
    /// The result's bounds all lie within `outer`'s; where the two
    /// disagree, `outer` wins.
    #[must_use]
    pub fn enforce(&self, outer: &Self) -> Self {
        Self {
            min_width: self.min_width.clamp(outer.min_width, outer.max_width),
            max_width: self.max_width.clamp(outer.min_width, outer.max_width),
            min_height: self.min_height.clamp(outer.min_height, outer.max_height),
            max_height: self.max_height.clamp(outer.min_height, outer.max_height),
        }
    }

    /// Derives the constraint for content inside edge `insets`.
    ///
    /// Horizontal insets (left + right) shrink the width bounds and
    /// vertical insets (top + bottom) shrink the height bounds. Maxima stay
    /// unbounded if they were unbounded.
    #[must_use]
    pub fn deflate(&self, insets: Insets) -> Self {
        let horizontal = sanitize(insets.x_value());
        let vertical = sanitize(insets.y_value());
        let min_width = (self.min_width - horizontal).max(0.0);
        let min_height = (self.min_height - vertical).max(0.0);
        Self {
            min_width,
            max_width: (self.max_width - horizontal).max(min_width),
            min_height,
            max_height: (self.max_height - vertical).max(min_height),
        }
    }

    /// The largest size satisfying this constraint.
    ///
    /// Unbounded axes yield an infinite extent; callers must handle that
    /// before storing the result as a node size.
    #[inline]
    #[must_use]
    pub const fn biggest(&self) -> Size {
        Size::new(self.max_width, self.max_height)
    }

    /// The smallest size satisfying this constraint.
    #[inline]
    #[must_use]
    pub const fn smallest(&self) -> Size {
        Size::new(self.min_width, self.min_height)
    }

    /// Whether exactly one size satisfies this constraint.
    #[inline]
    #[must_use]
    pub fn is_tight(&self) -> bool {
        self.min_width == self.max_width && self.min_height == self.max_height
    }

    /// Whether the width axis has a finite maximum.
    #[inline]
    #[must_use]
    pub fn has_bounded_width(&self) -> bool {
        self.max_width.is_finite()
    }

    /// Whether the height axis has a finite maximum.
    #[inline]
    #[must_use]
    pub fn has_bounded_height(&self) -> bool {
        self.max_height.is_finite()
    }

    /// Maximum extent along `axis`.
    #[inline]
    #[must_use]
    pub const fn max_along(&self, axis: Axis) -> f64 {
        match axis {
            Axis::Horizontal => self.max_width,
            Axis::Vertical => self.max_height,
        }
    }

    /// Minimum extent along `axis`.
    #[inline]
    #[must_use]
    pub const fn min_along(&self, axis: Axis) -> f64 {
        match axis {
            Axis::Horizontal => self.min_width,
            Axis::Vertical => self.min_height,
        }
    }

    /// Whether `size` satisfies this constraint on both axes.
    #[inline]
    #[must_use]
    pub fn is_satisfied_by(&self, size: Size) -> bool {
        self.min_width <= size.width
            && size.width <= self.max_width
            && self.min_height <= size.height
            && size.height <= self.max_height
    }

    /// Whether the bounds form a well-formed constraint.
    ///
    /// Minima must be finite, non-negative, and no greater than their
    /// maxima; maxima must not be NaN. Constructor-built constraints always
    /// pass; this exists so layout entry can fail fast on hand-assembled
    /// ones.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.min_width.is_finite()
            && self.min_height.is_finite()
            && self.min_width >= 0.0
            && self.min_height >= 0.0
            && self.min_width <= self.max_width
            && self.min_height <= self.max_height
            && !self.max_width.is_nan()
            && !self.max_height.is_nan()
    }
}

impl Default for Constraints {
    #[inline]
    fn default() -> Self {
        Self::UNBOUNDED
    }
}

impl fmt::Debug for Constraints {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Constraints({}..{} x {}..{})",
            self.min_width, self.max_width, self.min_height, self.max_height
        )
    }
}

/// A normalized position inside a box.
///
/// `(-1, -1)` is the top-left corner, `(0, 0)` the center, `(1, 1)` the
/// bottom-right corner. Values outside `[-1, 1]` extrapolate past the
/// edges; layout code here never produces them.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Alignment {
    /// Horizontal component in `[-1, 1]`.
    pub x: f64,
    /// Vertical component in `[-1, 1]`.
    pub y: f64,
}

impl Alignment {
    /// Top-left corner.
    pub const TOP_LEFT: Self = Self { x: -1.0, y: -1.0 };
    /// Center of the top edge.
    pub const TOP_CENTER: Self = Self { x: 0.0, y: -1.0 };
    /// Top-right corner.
    pub const TOP_RIGHT: Self = Self { x: 1.0, y: -1.0 };
    /// Center of the left edge.
    pub const CENTER_LEFT: Self = Self { x: -1.0, y: 0.0 };
    /// Dead center.
    pub const CENTER: Self = Self { x: 0.0, y: 0.0 };
    /// Center of the right edge.
    pub const CENTER_RIGHT: Self = Self { x: 1.0, y: 0.0 };
    /// Bottom-left corner.
    pub const BOTTOM_LEFT: Self = Self { x: -1.0, y: 1.0 };
    /// Center of the bottom edge.
    pub const BOTTOM_CENTER: Self = Self { x: 0.0, y: 1.0 };
    /// Bottom-right corner.
    pub const BOTTOM_RIGHT: Self = Self { x: 1.0, y: 1.0 };

    /// Creates an alignment from normalized components.
    #[inline]
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Offset of a `child`-sized box aligned inside a `parent`-sized box.
    ///
    /// Per axis: `offset = ((parent - child) / 2) * (1 + component)`, so
    /// `-1` pins to the leading edge, `0` centers, `1` pins to the
    /// trailing edge.
    #[inline]
    #[must_use]
    pub fn child_offset(self, parent: Size, child: Size) -> Vec2 {
        Vec2::new(
            (parent.width - child.width) / 2.0 * (1.0 + self.x),
            (parent.height - child.height) / 2.0 * (1.0 + self.y),
        )
    }
}
