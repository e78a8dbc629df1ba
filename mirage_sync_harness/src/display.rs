// Copyright 2026 the Mirage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A remote display that records what it is told.

use std::collections::HashMap;

use mirage_core::display::{LayerInit, LayerPoolExhausted, RemoteDisplay};
use mirage_core::node::{MirrorRef, Opacity};
use mirage_core::region::{PixelRect, Region};

/// One call received by a [`RecordingDisplay`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DisplayOp {
    /// [`RemoteDisplay::create_layer`].
    Create {
        /// The new layer.
        node: MirrorRef,
        /// Its initial state.
        init: LayerInit,
    },
    /// [`RemoteDisplay::destroy_layer`].
    Destroy {
        /// The released layer.
        node: MirrorRef,
    },
    /// [`RemoteDisplay::move_layer`].
    Move {
        /// The moved layer.
        node: MirrorRef,
        /// New x, relative to the parent.
        x: i32,
        /// New y, relative to the parent.
        y: i32,
    },
    /// [`RemoteDisplay::resize_layer`].
    Resize {
        /// The resized layer.
        node: MirrorRef,
        /// New width.
        width: u32,
        /// New height.
        height: u32,
    },
    /// [`RemoteDisplay::restack_layer`].
    Restack {
        /// The restacked layer.
        node: MirrorRef,
        /// New stacking index.
        z: i32,
    },
    /// [`RemoteDisplay::reparent_layer`].
    Reparent {
        /// The moved layer.
        node: MirrorRef,
        /// Its new parent, or `None` for the top level.
        parent: Option<MirrorRef>,
    },
    /// [`RemoteDisplay::shade_layer`].
    Shade {
        /// The shaded layer.
        node: MirrorRef,
        /// New visibility.
        opacity: Opacity,
    },
    /// [`RemoteDisplay::clear_region`].
    Clear {
        /// The cleared layer.
        node: MirrorRef,
        /// Node-relative area cleared.
        region: Region,
        /// Bounds the clear was limited to.
        bounds: PixelRect,
    },
    /// [`RemoteDisplay::touch`].
    Touch,
}

/// The remote side's view of one layer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RemoteLayer {
    /// Parent layer.
    pub parent: Option<MirrorRef>,
    /// Position and size.
    pub rect: PixelRect,
    /// Stacking index.
    pub z: i32,
    /// Visibility.
    pub opacity: Opacity,
    /// Everything cleared on this layer since it was created.
    pub cleared: Region,
}

/// A [`RemoteDisplay`] that logs every call and maintains its own view of
/// the remote layers.
#[derive(Clone, Debug, Default)]
pub struct RecordingDisplay {
    ops: Vec<DisplayOp>,
    layers: HashMap<MirrorRef, RemoteLayer>,
    capacity: Option<usize>,
    touches: u64,
}

impl RecordingDisplay {
    /// Creates a display with an unlimited layer pool.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a display that refuses layers beyond `capacity`.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity: Some(capacity),
            ..Self::default()
        }
    }

    /// Returns every call received so far.
    #[must_use]
    pub fn ops(&self) -> &[DisplayOp] {
        &self.ops
    }

    /// Removes and returns the call log.
    pub fn take_ops(&mut self) -> Vec<DisplayOp> {
        std::mem::take(&mut self.ops)
    }

    /// Returns the number of touches received.
    #[must_use]
    pub fn touches(&self) -> u64 {
        self.touches
    }

    /// Returns the remote view of `node`.
    #[must_use]
    pub fn layer(&self, node: MirrorRef) -> Option<&RemoteLayer> {
        self.layers.get(&node)
    }

    /// Returns the number of live remote layers.
    #[must_use]
    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    fn layer_mut(&mut self, node: MirrorRef) -> &mut RemoteLayer {
        self.layers
            .get_mut(&node)
            .unwrap_or_else(|| panic!("call for unknown layer {node:?}"))
    }
}

impl RemoteDisplay for RecordingDisplay {
    fn create_layer(&mut self, node: MirrorRef, init: &LayerInit) -> Result<(), LayerPoolExhausted> {
        if self.capacity.is_some_and(|cap| self.layers.len() >= cap) {
            return Err(LayerPoolExhausted);
        }
        if let Some(parent) = init.parent {
            assert!(
                self.layers.contains_key(&parent),
                "{node:?} created before its parent {parent:?}"
            );
        }
        let previous = self.layers.insert(
            node,
            RemoteLayer {
                parent: init.parent,
                rect: init.rect,
                z: init.z,
                opacity: init.opacity,
                cleared: Region::new(),
            },
        );
        assert!(previous.is_none(), "{node:?} created twice");
        self.ops.push(DisplayOp::Create { node, init: *init });
        Ok(())
    }

    fn destroy_layer(&mut self, node: MirrorRef) {
        assert!(
            self.layers.remove(&node).is_some(),
            "destroying unknown layer {node:?}"
        );
        self.ops.push(DisplayOp::Destroy { node });
    }

    fn move_layer(&mut self, node: MirrorRef, x: i32, y: i32) {
        let layer = self.layer_mut(node);
        layer.rect = PixelRect::new(x, y, layer.rect.width(), layer.rect.height());
        self.ops.push(DisplayOp::Move { node, x, y });
    }

    fn resize_layer(&mut self, node: MirrorRef, width: u32, height: u32) {
        let layer = self.layer_mut(node);
        layer.rect = PixelRect::new(layer.rect.x0, layer.rect.y0, width, height);
        self.ops.push(DisplayOp::Resize {
            node,
            width,
            height,
        });
    }

    fn restack_layer(&mut self, node: MirrorRef, z: i32) {
        self.layer_mut(node).z = z;
        self.ops.push(DisplayOp::Restack { node, z });
    }

    fn reparent_layer(&mut self, node: MirrorRef, parent: Option<MirrorRef>) {
        if let Some(p) = parent {
            assert!(
                self.layers.contains_key(&p),
                "{node:?} reparented under unknown layer {p:?}"
            );
        }
        self.layer_mut(node).parent = parent;
        self.ops.push(DisplayOp::Reparent { node, parent });
    }

    fn shade_layer(&mut self, node: MirrorRef, opacity: Opacity) {
        self.layer_mut(node).opacity = opacity;
        self.ops.push(DisplayOp::Shade { node, opacity });
    }

    fn clear_region(&mut self, node: MirrorRef, region: &Region, bounds: PixelRect) {
        let layer = self.layer_mut(node);
        layer.cleared = layer.cleared.union(region);
        self.ops.push(DisplayOp::Clear {
            node,
            region: region.clone(),
            bounds,
        });
    }

    fn touch(&mut self) {
        self.touches += 1;
        self.ops.push(DisplayOp::Touch);
    }
}
