// Copyright 2026 the Mirage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Contract for the remote-display collaborator.
//!
//! The remote display owns the actual remote layers (and whatever protocol
//! streams them to observers). The mirror tree forwards each node-level
//! mutation to it through [`RemoteDisplay`], after the mirror's own state has
//! been updated, and then signals completion with
//! [`touch`](RemoteDisplay::touch).
//!
//! # Ordering guarantees
//!
//! - `create_layer` for a node precedes every other call naming it, and
//!   `destroy_layer` is the last one.
//! - A parent's `create_layer` precedes its children's.
//! - `touch` is only called between mutations, never in the middle of one.
//!   A collaborator serving concurrent readers can snapshot its state at
//!   `touch` time and always observe a consistent tree.
//!
//! Touches are advisory "something changed, re-sample" signals, not a queue
//! of diffs. Use [`MirrorTree::take_changes`] to learn what changed.
//!
//! [`MirrorTree::take_changes`]: crate::node::MirrorTree::take_changes

use crate::node::{MirrorRef, Opacity};
use crate::region::{PixelRect, Region};

/// Initial state of a newly created remote layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LayerInit {
    /// Parent layer, or `None` for the root.
    pub parent: Option<MirrorRef>,
    /// Position (relative to the parent) and size.
    pub rect: PixelRect,
    /// Stacking index among siblings.
    pub z: i32,
    /// Initial visibility.
    pub opacity: Opacity,
}

/// The remote display has no room for another layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[error("remote layer pool exhausted")]
pub struct LayerPoolExhausted;

/// Receives mirror tree mutations and dirty notifications.
pub trait RemoteDisplay {
    /// Allocates the remote layer backing `node`.
    ///
    /// On failure the mirror node is rolled back and the host sees
    /// [`SyncError::AllocationFailure`](crate::error::SyncError::AllocationFailure).
    fn create_layer(&mut self, node: MirrorRef, init: &LayerInit) -> Result<(), LayerPoolExhausted>;

    /// Releases the remote layer backing `node`.
    fn destroy_layer(&mut self, node: MirrorRef);

    /// Moves a layer to `(x, y)` relative to its parent.
    fn move_layer(&mut self, node: MirrorRef, x: i32, y: i32);

    /// Resizes a layer.
    fn resize_layer(&mut self, node: MirrorRef, width: u32, height: u32);

    /// Sets a layer's stacking index among its siblings.
    fn restack_layer(&mut self, node: MirrorRef, z: i32);

    /// Attaches a layer to a new parent, or detaches it to the top level
    /// when `parent` is `None`.
    fn reparent_layer(&mut self, node: MirrorRef, parent: Option<MirrorRef>);

    /// Shows or hides a layer.
    fn shade_layer(&mut self, node: MirrorRef, opacity: Opacity);

    /// Clears `region` (node-relative) on a layer's surface, limited to
    /// `bounds`.
    fn clear_region(&mut self, node: MirrorRef, region: &Region, bounds: PixelRect);

    /// Signals that the mirror tree changed.
    ///
    /// Redundant calls must be harmless.
    fn touch(&mut self);
}

impl<D: RemoteDisplay + ?Sized> RemoteDisplay for &mut D {
    fn create_layer(&mut self, node: MirrorRef, init: &LayerInit) -> Result<(), LayerPoolExhausted> {
        (**self).create_layer(node, init)
    }

    fn destroy_layer(&mut self, node: MirrorRef) {
        (**self).destroy_layer(node);
    }

    fn move_layer(&mut self, node: MirrorRef, x: i32, y: i32) {
        (**self).move_layer(node, x, y);
    }

    fn resize_layer(&mut self, node: MirrorRef, width: u32, height: u32) {
        (**self).resize_layer(node, width, height);
    }

    fn restack_layer(&mut self, node: MirrorRef, z: i32) {
        (**self).restack_layer(node, z);
    }

    fn reparent_layer(&mut self, node: MirrorRef, parent: Option<MirrorRef>) {
        (**self).reparent_layer(node, parent);
    }

    fn shade_layer(&mut self, node: MirrorRef, opacity: Opacity) {
        (**self).shade_layer(node, opacity);
    }

    fn clear_region(&mut self, node: MirrorRef, region: &Region, bounds: PixelRect) {
        (**self).clear_region(node, region, bounds);
    }

    fn touch(&mut self) {
        (**self).touch();
    }
}

/// A [`RemoteDisplay`] that discards mutations and only counts touches.
///
/// Useful for hosts that read the mirror tree directly, and in tests.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullDisplay {
    touches: u64,
}

impl NullDisplay {
    /// Creates a display with a zero touch count.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns how many times [`touch`](RemoteDisplay::touch) was called.
    #[must_use]
    pub fn touches(&self) -> u64 {
        self.touches
    }
}

impl RemoteDisplay for NullDisplay {
    fn create_layer(&mut self, _node: MirrorRef, _init: &LayerInit) -> Result<(), LayerPoolExhausted> {
        Ok(())
    }

    fn destroy_layer(&mut self, _node: MirrorRef) {}

    fn move_layer(&mut self, _node: MirrorRef, _x: i32, _y: i32) {}

    fn resize_layer(&mut self, _node: MirrorRef, _width: u32, _height: u32) {}

    fn restack_layer(&mut self, _node: MirrorRef, _z: i32) {}

    fn reparent_layer(&mut self, _node: MirrorRef, _parent: Option<MirrorRef>) {}

    fn shade_layer(&mut self, _node: MirrorRef, _opacity: Opacity) {}

    fn clear_region(&mut self, _node: MirrorRef, _region: &Region, _bounds: PixelRect) {}

    fn touch(&mut self) {
        self.touches += 1;
    }
}
