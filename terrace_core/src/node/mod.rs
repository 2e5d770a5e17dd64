// Copyright 2026 the Terrace Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Layout node tree data model.
//!
//! A *node* is one participant in the layout tree. Each node has:
//!
//! - An identity ([`NodeId`]) — a generational handle that becomes stale when
//!   the node is destroyed, preventing use-after-free bugs at the API level.
//! - Topology — parent, first-child, and sibling links forming an ordered
//!   tree. Children are exposed only through the [`Children`] iterator, so
//!   the link representation stays private.
//! - A strategy ([`NodeKind`]) — the closed set of layout behaviors (flex,
//!   stack, align, padding, sized box, linear stacking, surface leaf, view
//!   root), each carrying its own config payload.
//! - [`ChildParams`] — the per-child slot owned by the *parent* (flex weight
//!   and fit, positioned specs). Reset to defaults at unmount.
//! - **Layout state** produced by the passes: last-applied constraints,
//!   resolved size, parent-relative offset, absolute position, the relayout
//!   boundary, and the dirty flags that drive scheduling.
//!
//! Nodes are stored in struct-of-arrays layout with index-based handles for
//! cache-friendly traversal.
//!
//! # Dirty tracking
//!
//! Mutations take the [`Scheduler`](crate::scheduler::Scheduler) explicitly and mark
//! the smallest region that can be affected:
//!
//! - **Layout** dirt ([`mark_needs_layout`](NodeStore::mark_needs_layout))
//!   walks up to the node's relayout boundary, which alone enters the
//!   scheduler's layout queue.
//! - **Placement** dirt is local; positions are refreshed downward from the
//!   re-placed node during the flush.
//! - **Structural** changes (mount/unmount) dirty the parent and attach or
//!   detach the child subtree, replaying marks accumulated while detached.

mod id;
mod kind;
mod store;
mod traverse;

pub use id::{INVALID, NodeId, RootToken, SurfaceId};
pub use kind::{
    ChildParams, CrossAlign, FlexConfig, FlexFit, MainAlign, MainSizePolicy, NodeKind,
    PositionedSpec, StackConfig, StackFit, TextDirection, VerticalDirection,
};
pub use store::NodeStore;
pub use traverse::Children;
