// Copyright 2026 the Mirage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Clip-region recomputation.
//!
//! When a node's size or bounding shape changes, pixels it no longer covers
//! may still hold stale content on the remote surface. The clip pass
//! computes the node's effective visible region,
//!
//! ```text
//!   effective = clip_list ∩ bounding_shape ∩ (0, 0, width, height)
//! ```
//!
//! (the shape term drops out when the host set no custom shape), stores its
//! complement within the node's extent as the node's
//! [`clip_region`](MirrorTree::clip_region), and clears the complement
//! within the requested bounds on the remote surface.
//!
//! All regions are node-relative: `(0, 0)` is the node's own top-left
//! corner.

use super::id::MirrorRef;
use super::store::MirrorTree;
use crate::dirty;
use crate::display::RemoteDisplay;
use crate::region::{PixelRect, Region};

/// The outcome of one clip pass.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClipUpdate {
    /// The area cleared on the remote surface (empty if no clear was
    /// issued).
    pub cleared: Region,
    /// The bounds the clear was limited to.
    pub bounds: PixelRect,
}

/// Returns the node-relative region a node actually shows.
#[must_use]
pub fn effective_region(extent: PixelRect, clip_list: &Region, shape: Option<&Region>) -> Region {
    let visible = clip_list.intersect(&Region::from_rect(extent));
    match shape {
        Some(shape) => visible.intersect(shape),
        None => visible,
    }
}

/// Returns the part of `bounds` outside the node's effective region.
///
/// The result may consist of several disjoint boxes.
#[must_use]
pub fn excluded_region(
    bounds: PixelRect,
    extent: PixelRect,
    clip_list: &Region,
    shape: Option<&Region>,
) -> Region {
    effective_region(extent, clip_list, shape).inverse(bounds)
}

/// Returns the clear bounds after a resize: the union of the old and new
/// extents, so that a shrink also erases the band the node left behind.
#[must_use]
pub fn resize_bounds(old: PixelRect, new: PixelRect) -> PixelRect {
    PixelRect::from_size(old.width().max(new.width()), old.height().max(new.height()))
}

impl MirrorTree {
    /// Recomputes a node's clip region and clears everything outside its
    /// effective region within `bounds`.
    ///
    /// `clip_list` and `shape` are node-relative. Pass the node's own extent
    /// as `bounds` after a shape change, and [`resize_bounds`] after a
    /// resize.
    pub fn update_clip<D: RemoteDisplay + ?Sized>(
        &mut self,
        display: &mut D,
        node: MirrorRef,
        clip_list: &Region,
        shape: Option<&Region>,
        bounds: PixelRect,
    ) -> ClipUpdate {
        let r = self.rect(node);
        let extent = PixelRect::from_size(r.width(), r.height());
        let effective = effective_region(extent, clip_list, shape);

        self.clip_region[node.idx as usize] = effective.inverse(extent);
        self.dirty.mark(node.idx, dirty::CLIP);

        let cleared = effective.inverse(bounds);
        if !cleared.is_empty() {
            display.clear_region(node, &cleared, bounds);
        }
        ClipUpdate { cleared, bounds }
    }
}
