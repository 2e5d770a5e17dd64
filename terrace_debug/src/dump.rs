// Copyright 2026 the Terrace Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Indented node-tree dumps.
//!
//! [`write_tree`] walks a subtree in child order and writes one line per
//! node: kind, slot index, resolved size, absolute position, and any dirty
//! flags still pending. Useful for snapshotting tree state between flushes.

use std::io::{self, Write};

use terrace_core::node::{NodeId, NodeStore};

/// Writes an indented description of the subtree rooted at `node`.
///
/// # Panics
///
/// Panics if `node` is stale or destroyed.
pub fn write_tree<W: Write>(w: &mut W, store: &NodeStore, node: NodeId) -> io::Result<()> {
    write_node(w, store, node, 0)
}

/// Writes every tree in the store, one after another.
pub fn write_forest<W: Write>(w: &mut W, store: &NodeStore) -> io::Result<()> {
    for root in store.roots() {
        write_tree(w, store, root)?;
    }
    Ok(())
}

fn write_node<W: Write>(
    w: &mut W,
    store: &NodeStore,
    node: NodeId,
    depth: usize,
) -> io::Result<()> {
    let size = store.size(node);
    let pos = store.position(node);
    write!(
        w,
        "{:indent$}{} #{} size={}x{} pos=({}, {})",
        "",
        store.kind(node).name(),
        node.index(),
        size.width,
        size.height,
        pos.x,
        pos.y,
        indent = depth * 2,
    )?;
    if store.needs_layout(node) {
        write!(w, " needs-layout")?;
    }
    if store.needs_place(node) {
        write!(w, " needs-place")?;
    }
    writeln!(w)?;
    for child in store.children(node) {
        write_node(w, store, child, depth + 1)?;
    }
    Ok(())
}

/// Renders the subtree rooted at `node` to a `String`.
#[must_use]
pub fn tree_to_string(store: &NodeStore, node: NodeId) -> String {
    let mut buf = Vec::new();
    // Writing to a Vec cannot fail.
    let _ = write_tree(&mut buf, store, node);
    String::from_utf8_lossy(&buf).into_owned()
}
