// Copyright 2026 the Terrace Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Core node tree and layout pipeline for constraint-based placement.
//!
//! `terrace_core` provides the foundational data structures for managing
//! retained trees of layout nodes on embedded display surfaces. It is
//! `no_std` compatible (with `alloc`) and uses array-based struct-of-arrays
//! storage with index handles for cache-friendly traversal.
//!
//! # Architecture
//!
//! The crate is organized around a flush loop that turns tree mutations
//! into incremental geometry updates for a platform widget tree:
//!
//! ```text
//!   Embedder (tree mutations)
//!       │
//!       ▼
//!   NodeStore::mark_* ──► Scheduler queues ──► take_wake()
//!                                                  │
//!                  ┌───────────────────────────────┘
//!                  ▼
//!   Scheduler::flush() ──► layout pass ──► place pass
//!                                              │
//!                  ┌───────────────────────────┘
//!                  ▼
//!   CommitChanges ──► WidgetBinding::apply()
//! ```
//!
//! **[`node`]** — Struct-of-arrays node tree with generational handles.
//! Each node carries a [`NodeKind`](node::NodeKind) naming its layout
//! strategy plus per-child parameters; constraints, sizes, and positions
//! are computed by the passes.
//!
//! **[`geometry`]** — [`Constraints`](geometry::Constraints) boxes with
//! per-axis min/max bounds, plus [`Axis`](geometry::Axis) and
//! [`Alignment`](geometry::Alignment) helpers shared by the strategies.
//!
//! **[`place`]** — The placement pass and the
//! [`CommitChanges`](place::CommitChanges) batch that carries created,
//! updated, and removed slots to the backend.
//!
//! **[`scheduler`]** — Work queues, mounted view roots, node factories,
//! and the depth-ordered flush that drives both passes.
//!
//! **[`backend`]** — The [`WidgetBinding`](backend::WidgetBinding) trait
//! that platform embedders implement to supply surface dimensions and
//! apply commit batches to native widgets.
//!
//! **[`trace`]** — [`TraceSink`](trace::TraceSink) trait and event types
//! for flush instrumentation, with zero-overhead
//! [`Tracer`](trace::Tracer) wrapper.
//!
//! Layout follows the two-phase protocol: constraints flow down from the
//! root, sizes flow back up, and a node re-enters layout only when marked
//! dirty. Dirtiness stops propagating at *relayout boundaries* (nodes whose
//! size cannot affect their parent), so an edit deep in the tree relays
//! only its enclosing boundary subtree. Placement then resolves positions
//! and batches the survivors for the backend.
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies.
//! - `trace` (disabled by default): Enables `Tracer` method bodies (one
//!   branch per call site).
//! - `trace-rich` (disabled by default, implies `trace`): Gates per-node
//!   boundary and commit events.

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

pub mod backend;
pub mod geometry;
pub mod node;
pub mod place;
pub mod scheduler;
pub mod trace;

mod flex;
mod layout;
mod stack;
