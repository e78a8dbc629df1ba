// Copyright 2026 the Mirage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Host model, recording display, and invariant checks for exercising
//! `mirage_core`.
//!
//! [`SyncHarness`] plays the host: each method edits a [`SourceTree`] the way
//! a window system would and then reports the edit to a
//! [`Dispatcher`] driving a [`RecordingDisplay`]. After any operation,
//! [`SyncHarness::check`] verifies that the mirror tree still matches the
//! source tree and that the remote view matches the mirror tree.
//!
//! ```rust,ignore
//! let mut h = SyncHarness::new();
//! let root = h.create(None, PixelRect::new(0, 0, 640, 480))?;
//! let win = h.create(Some(root), PixelRect::new(10, 10, 100, 100))?;
//! h.map(win)?;
//! h.raise(win)?;
//! h.check()?;
//! ```

pub mod check;
pub mod display;
pub mod source;

use tracing::debug;

use mirage_core::config::SyncConfig;
use mirage_core::dispatch::Dispatcher;
use mirage_core::error::SyncError;
use mirage_core::host::{ShapeKind, SourceHierarchy};
use mirage_core::node::{MirrorRef, MirrorTree, SourceId};
use mirage_core::region::{PixelRect, Region};

pub use check::{Violation, check};
pub use display::{DisplayOp, RecordingDisplay, RemoteLayer};
pub use source::SourceTree;

/// A host model wired to a [`Dispatcher`].
#[derive(Debug)]
pub struct SyncHarness {
    source: SourceTree,
    dispatcher: Dispatcher<RecordingDisplay>,
}

impl Default for SyncHarness {
    fn default() -> Self {
        Self::new()
    }
}

impl SyncHarness {
    /// Creates a harness with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(SyncConfig::default())
    }

    /// Creates a harness with the given configuration.
    #[must_use]
    pub fn with_config(config: SyncConfig) -> Self {
        Self::with_display(RecordingDisplay::new(), config)
    }

    /// Creates a harness around an existing display.
    #[must_use]
    pub fn with_display(display: RecordingDisplay, config: SyncConfig) -> Self {
        Self {
            source: SourceTree::new(),
            dispatcher: Dispatcher::with_config(display, config),
        }
    }

    /// Returns the host's tree.
    #[must_use]
    pub fn source(&self) -> &SourceTree {
        &self.source
    }

    /// Returns the mirror tree.
    #[must_use]
    pub fn tree(&self) -> &MirrorTree {
        self.dispatcher.tree()
    }

    /// Returns the recording display.
    #[must_use]
    pub fn display(&self) -> &RecordingDisplay {
        self.dispatcher.display()
    }

    /// Returns the recording display mutably.
    pub fn display_mut(&mut self) -> &mut RecordingDisplay {
        self.dispatcher.display_mut()
    }

    /// Returns the dispatcher.
    #[must_use]
    pub fn dispatcher(&self) -> &Dispatcher<RecordingDisplay> {
        &self.dispatcher
    }

    /// Returns the dispatcher mutably.
    pub fn dispatcher_mut(&mut self) -> &mut Dispatcher<RecordingDisplay> {
        &mut self.dispatcher
    }

    /// Returns the live mirror of `id`.
    ///
    /// # Panics
    ///
    /// Panics if `id` is not mirrored.
    #[must_use]
    pub fn mirror(&self, id: SourceId) -> MirrorRef {
        self.tree()
            .get(id)
            .unwrap_or_else(|| panic!("{id} is not mirrored"))
    }

    /// Checks that the three views of the hierarchy agree.
    ///
    /// # Errors
    ///
    /// Returns the first [`Violation`] found.
    pub fn check(&self) -> Result<(), Violation> {
        check(&self.source, self.tree(), self.display())
    }

    // -- Host operations --

    /// Creates an unmapped node on top of its siblings.
    ///
    /// If the mirror cannot be created the node is removed from the host
    /// again.
    ///
    /// # Errors
    ///
    /// Whatever [`Dispatcher::on_create`] returns.
    pub fn create(
        &mut self,
        parent: Option<SourceId>,
        rect: PixelRect,
    ) -> Result<SourceId, SyncError> {
        let id = self.source.create(parent, rect);
        debug!(id = %id, "host create");
        match self.dispatcher.on_create(&self.source, id, None) {
            Ok(_) => Ok(id),
            Err(err) => {
                if !self.dispatcher.tree().contains(id) {
                    self.source.remove(id);
                }
                Err(err)
            }
        }
    }

    /// Destroys a node.
    ///
    /// The host only forgets the node if the mirror was released.
    ///
    /// # Errors
    ///
    /// Whatever [`Dispatcher::on_destroy`] returns.
    pub fn destroy(&mut self, id: SourceId) -> Result<(), SyncError> {
        debug!(id = %id, "host destroy");
        self.dispatcher.on_destroy(id, None)?;
        self.source.remove(id);
        Ok(())
    }

    /// Maps (realizes) a node.
    ///
    /// # Errors
    ///
    /// Whatever [`Dispatcher::on_realize`] returns.
    pub fn map(&mut self, id: SourceId) -> Result<(), SyncError> {
        self.source.set_mapped(id, true);
        self.dispatcher.on_realize(id, None)
    }

    /// Unmaps (unrealizes) a node.
    ///
    /// # Errors
    ///
    /// Whatever [`Dispatcher::on_unrealize`] returns.
    pub fn unmap(&mut self, id: SourceId) -> Result<(), SyncError> {
        self.source.set_mapped(id, false);
        self.dispatcher.on_unrealize(id, None)
    }

    /// Moves a node, keeping its size.
    ///
    /// # Errors
    ///
    /// Whatever [`Dispatcher::on_move`] returns.
    pub fn move_to(&mut self, id: SourceId, x: i32, y: i32) -> Result<(), SyncError> {
        let r = self.source.geometry(id);
        self.source
            .set_rect(id, PixelRect::new(x, y, r.width(), r.height()));
        self.dispatcher.on_move(id, x, y, None)
    }

    /// Moves and resizes a node.
    ///
    /// # Errors
    ///
    /// Whatever [`Dispatcher::on_resize`] returns.
    pub fn resize(&mut self, id: SourceId, rect: PixelRect) -> Result<(), SyncError> {
        self.source.set_rect(id, rect);
        self.dispatcher.on_resize(&self.source, id, rect, None)
    }

    /// Sets or clears a node's bounding shape.
    ///
    /// # Errors
    ///
    /// Whatever [`Dispatcher::on_shape_change`] returns.
    pub fn set_shape(&mut self, id: SourceId, shape: Option<Region>) -> Result<(), SyncError> {
        self.source.set_shape(id, shape);
        self.dispatcher
            .on_shape_change(&self.source, id, ShapeKind::Bounding, None)
    }

    /// Raises a node to the front of its siblings.
    ///
    /// # Errors
    ///
    /// Whatever [`Dispatcher::on_restack`] returns.
    pub fn raise(&mut self, id: SourceId) -> Result<(), SyncError> {
        self.source.raise(id);
        self.restack(id)
    }

    /// Lowers a node to the back of its siblings.
    ///
    /// # Errors
    ///
    /// Whatever [`Dispatcher::on_restack`] returns.
    pub fn lower(&mut self, id: SourceId) -> Result<(), SyncError> {
        self.source.lower(id);
        self.restack(id)
    }

    /// Places a node directly in front of `sibling`.
    ///
    /// # Errors
    ///
    /// Whatever [`Dispatcher::on_restack`] returns.
    pub fn place_above(&mut self, id: SourceId, sibling: SourceId) -> Result<(), SyncError> {
        self.source.place_above(id, sibling);
        self.restack(id)
    }

    /// Moves a node under a new parent, or to the top level for `None`.
    ///
    /// Only the reparent event is reported; the new sibling chain is not
    /// restacked until [`restack`](Self::restack) is called.
    ///
    /// # Errors
    ///
    /// Whatever [`Dispatcher::on_reparent`] returns.
    pub fn reparent(
        &mut self,
        id: SourceId,
        new_parent: Option<SourceId>,
    ) -> Result<(), SyncError> {
        self.source.reparent(id, new_parent);
        self.dispatcher.on_reparent(id, new_parent, None)
    }

    /// Reports a restack of the sibling chain containing `id`.
    ///
    /// # Errors
    ///
    /// Whatever [`Dispatcher::on_restack`] returns.
    pub fn restack(&mut self, id: SourceId) -> Result<(), SyncError> {
        self.dispatcher.on_restack(&self.source, id, None)
    }
}
