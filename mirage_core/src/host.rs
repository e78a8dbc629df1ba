// Copyright 2026 the Mirage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Read-only view of the host's source hierarchy.
//!
//! The host owns and mutates the source hierarchy. The dispatcher only
//! reads identity, geometry, realized state and parent/sibling links, and
//! only while handling an event, so the view must already reflect that
//! event's outcome (for a restack, the new sibling order).
//!
//! # Sibling direction
//!
//! Siblings are ordered front to back. [`next_sibling`] names the sibling
//! directly *behind* a node and [`prev_sibling`] the one directly *in
//! front*. The backmost sibling has no next sibling; the frontmost has no
//! previous one.
//!
//! [`next_sibling`]: SourceHierarchy::next_sibling
//! [`prev_sibling`]: SourceHierarchy::prev_sibling

use alloc::vec::Vec;
use core::fmt;

use crate::node::SourceId;
use crate::region::{PixelRect, Region};

/// Which shape of a source node changed in a shape-change event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    /// The outer bounding shape.
    Bounding,
    /// The clip shape applied to the node's content.
    Clip,
    /// The input shape (affects hit testing only).
    Input,
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Bounding => "bounding",
            Self::Clip => "clip",
            Self::Input => "input",
        })
    }
}

/// Read access to the host hierarchy at event time.
pub trait SourceHierarchy {
    /// Returns the parent of `id`, or `None` for a root.
    fn parent(&self, id: SourceId) -> Option<SourceId>;

    /// Returns the sibling directly behind `id`.
    fn next_sibling(&self, id: SourceId) -> Option<SourceId>;

    /// Returns the sibling directly in front of `id`.
    fn prev_sibling(&self, id: SourceId) -> Option<SourceId>;

    /// Returns the position (relative to the parent) and size of `id`.
    fn geometry(&self, id: SourceId) -> PixelRect;

    /// Returns `true` if `id` is realized (mapped and viewable).
    fn is_realized(&self, id: SourceId) -> bool;

    /// Returns the node-relative clip list of `id`: the part of the node not
    /// obscured by its ancestors.
    fn clip_list(&self, id: SourceId) -> Region;

    /// Returns the node-relative custom bounding shape of `id`, if set.
    fn bounding_shape(&self, id: SourceId) -> Option<Region>;
}

/// Collects the sibling chain containing `id`, back to front.
///
/// Walks [`next_sibling`](SourceHierarchy::next_sibling) links to the
/// backmost sibling, then [`prev_sibling`](SourceHierarchy::prev_sibling)
/// links to the front.
pub fn sibling_chain<H: SourceHierarchy + ?Sized>(host: &H, id: SourceId) -> Vec<SourceId> {
    let mut bottom = id;
    while let Some(next) = host.next_sibling(bottom) {
        bottom = next;
    }

    let mut chain = Vec::new();
    let mut current = Some(bottom);
    while let Some(node) = current {
        chain.push(node);
        current = host.prev_sibling(node);
    }
    chain
}
