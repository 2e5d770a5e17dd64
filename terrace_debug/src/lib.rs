// Copyright 2026 the Terrace Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pretty-printing and tree dumps for terrace diagnostics.
//!
//! This crate provides development-time inspection tools for the layout
//! pipeline:
//!
//! - [`pretty::PrettyPrintSink`] — a
//!   [`TraceSink`](terrace_core::trace::TraceSink) with human-readable
//!   one-line-per-event output.
//! - [`dump::write_tree`] — indented node-tree dumps showing the geometry
//!   and dirty state of every node.

pub mod dump;
pub mod pretty;
