// Copyright 2026 the Terrace Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Backend contract for platform integrations.
//!
//! Terrace splits platform-specific work into *embedder* crates. Each
//! embedder provides the following pieces:
//!
//! - **Surface dimensions** — [`WidgetBinding::surface_size`] reports the
//!   pixel extent behind a view root. The scheduler queries it once when a
//!   root is mounted; later changes reach the engine through
//!   [`Scheduler::resize_root`].
//!
//! - **Widget lifecycle** — [`WidgetBinding::apply`] consumes one
//!   [`CommitChanges`] batch per flush. The lists are applied in order:
//!   `removed` deletes the native widget for each slot, `created`
//!   instantiates one, `updated` moves or resizes an existing one. Applying
//!   removals first makes slot reuse within a single flush safe.
//!
//! - **Wake-up** — After mutating the store, the embedder checks
//!   [`Scheduler::take_wake`] and, if a batch was armed, schedules a call
//!   to [`Scheduler::flush`] on its event loop.
//!
//! Geometry is read back from the store through the raw `*_at()` accessors
//! (e.g. [`NodeStore::position_at`]), indexed by the slots in the change
//! lists.
//!
//! # Flush loop pseudocode
//!
//! A typical embedder wires the pieces together like this:
//!
//! ```rust,ignore
//! fn on_idle() {
//!     // Mutate: build or update the node tree.
//!     store.set_kind(node, kind, &mut scheduler);
//!
//!     // Flush: run pending layout and placement in depth order.
//!     if scheduler.take_wake() {
//!         let changes = scheduler.flush(&mut store);
//!
//!         // Apply: push committed geometry to the native widgets.
//!         binding.apply(&store, &changes);
//!     }
//! }
//! ```
//!
//! [`Scheduler::flush`]: crate::scheduler::Scheduler::flush
//! [`Scheduler::resize_root`]: crate::scheduler::Scheduler::resize_root
//! [`Scheduler::take_wake`]: crate::scheduler::Scheduler::take_wake

use core::fmt;

use kurbo::Size;

use crate::node::{NodeStore, RootToken};
use crate::place::CommitChanges;

/// Errors from view-root operations.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RootError {
    /// The platform reported no dimensions for the root's surface.
    SurfaceUnavailable(RootToken),
}

impl fmt::Display for RootError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SurfaceUnavailable(token) => {
                write!(f, "no surface dimensions available for {token:?}")
            }
        }
    }
}

impl core::error::Error for RootError {}

/// Applies committed geometry to a platform-native widget tree.
///
/// Both real embedders and test doubles implement this trait, enabling
/// generic flush loops.
pub trait WidgetBinding {
    /// Pixel dimensions of the surface behind `root`, or `None` when the
    /// surface is not currently realized.
    fn surface_size(&self, root: RootToken) -> Option<Size>;

    /// Applies the given [`CommitChanges`] to the backing widget tree,
    /// reading current geometry from `store` as needed.
    fn apply(&mut self, store: &NodeStore, changes: &CommitChanges);
}
