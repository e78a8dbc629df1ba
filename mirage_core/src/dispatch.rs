// Copyright 2026 the Mirage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Host event dispatch.
//!
//! The [`Dispatcher`] owns a [`MirrorTree`] and the [`RemoteDisplay`] it
//! forwards to, and exposes one entry point per host event:
//!
//! | Event         | Mirror work                                              |
//! |---------------|----------------------------------------------------------|
//! | create        | Z = (sibling behind).z + 1 or 0, opacity from realized   |
//! | destroy       | Release the node (refused while it has live children)    |
//! | realize       | Show                                                     |
//! | unrealize     | Hide                                                     |
//! | move          | Move                                                     |
//! | resize        | Move, resize, then a clip pass over old ∪ new extent     |
//! | reparent      | Relink, or detach to the top level; Z and geometry kept  |
//! | restack       | Reconcile Z along the node's sibling chain               |
//! | shape change  | Clip pass over the current extent                        |
//!
//! Every entry point takes an optional [`NextHandler`], invoked after the
//! mirror work and after any pending touch has been delivered. An event
//! naming a node with no live mirror is logged and counted, the mirror
//! work is skipped, and the event is still delegated. A create under an
//! unmirrored parent is the exception: it fails, since there is no node to
//! return.

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt;

use tracing::{debug, error, warn};

use crate::config::SyncConfig;
use crate::display::RemoteDisplay;
use crate::error::{DelegateError, SyncError};
use crate::host::{ShapeKind, SourceHierarchy, sibling_chain};
use crate::node::clip::resize_bounds;
use crate::node::zorder::initial_z;
use crate::node::{MirrorChanges, MirrorRef, MirrorTree, Opacity, SourceId};
use crate::notify::Notifier;
use crate::region::PixelRect;
use crate::trace::{
    Clear, EventBegin, EventEnd, EventKind, EventOutcome, NodeChanged, NodeCreated,
    NodeDestroyed, NodeField, Restack, Touch, TraceSink, Tracer,
};

/// The host's own handling of an event, chained beneath the dispatcher.
///
/// Every method defaults to `Ok(())`.
pub trait NextHandler {
    /// Handles a create event.
    fn create(&mut self, id: SourceId) -> Result<(), DelegateError> {
        _ = id;
        Ok(())
    }

    /// Handles a destroy event.
    fn destroy(&mut self, id: SourceId) -> Result<(), DelegateError> {
        _ = id;
        Ok(())
    }

    /// Handles a realize event.
    fn realize(&mut self, id: SourceId) -> Result<(), DelegateError> {
        _ = id;
        Ok(())
    }

    /// Handles an unrealize event.
    fn unrealize(&mut self, id: SourceId) -> Result<(), DelegateError> {
        _ = id;
        Ok(())
    }

    /// Handles a move event.
    fn move_to(&mut self, id: SourceId, x: i32, y: i32) -> Result<(), DelegateError> {
        _ = (id, x, y);
        Ok(())
    }

    /// Handles a resize event.
    fn resize(&mut self, id: SourceId, rect: PixelRect) -> Result<(), DelegateError> {
        _ = (id, rect);
        Ok(())
    }

    /// Handles a reparent event.
    fn reparent(&mut self, id: SourceId, new_parent: Option<SourceId>) -> Result<(), DelegateError> {
        _ = (id, new_parent);
        Ok(())
    }

    /// Handles a restack event.
    fn restack(&mut self, id: SourceId) -> Result<(), DelegateError> {
        _ = id;
        Ok(())
    }

    /// Handles a shape-change event.
    fn shape_change(&mut self, id: SourceId, kind: ShapeKind) -> Result<(), DelegateError> {
        _ = (id, kind);
        Ok(())
    }
}

/// Counters kept by a [`Dispatcher`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SyncStats {
    /// Host events received.
    pub events: u64,
    /// Touches delivered to the remote display.
    pub touches: u64,
    /// Events that named a node with no live mirror.
    pub unknown_nodes: u64,
    /// Z reassignments made by restack passes.
    pub restacked: u64,
    /// Clear operations issued by clip passes.
    pub clears: u64,
}

/// Applies host events to a mirror tree.
pub struct Dispatcher<D> {
    tree: MirrorTree,
    display: D,
    notifier: Notifier,
    config: SyncConfig,
    stats: SyncStats,
    sink: Option<Box<dyn TraceSink>>,
}

impl<D: fmt::Debug> fmt::Debug for Dispatcher<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("nodes", &self.tree.len())
            .field("display", &self.display)
            .field("config", &self.config)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

impl<D: RemoteDisplay> Dispatcher<D> {
    /// Creates a dispatcher with the default configuration.
    pub fn new(display: D) -> Self {
        Self::with_config(display, SyncConfig::default())
    }

    /// Creates a dispatcher with the given configuration.
    pub fn with_config(display: D, config: SyncConfig) -> Self {
        let tree = match config.max_nodes {
            Some(max) => MirrorTree::with_max_nodes(max),
            None => MirrorTree::new(),
        };
        Self {
            tree,
            display,
            notifier: Notifier::new(config.notify),
            config,
            stats: SyncStats::default(),
            sink: None,
        }
    }

    /// Installs a trace sink, replacing any previous one.
    ///
    /// Events only reach the sink when the `trace` feature is enabled.
    pub fn set_trace_sink(&mut self, sink: Box<dyn TraceSink>) {
        self.sink = Some(sink);
    }

    /// Removes and returns the installed trace sink.
    pub fn take_trace_sink(&mut self) -> Option<Box<dyn TraceSink>> {
        self.sink.take()
    }

    /// Returns the mirror tree.
    #[must_use]
    pub fn tree(&self) -> &MirrorTree {
        &self.tree
    }

    /// Returns the remote display.
    #[must_use]
    pub fn display(&self) -> &D {
        &self.display
    }

    /// Returns the remote display mutably.
    pub fn display_mut(&mut self) -> &mut D {
        &mut self.display
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Returns the counters.
    #[must_use]
    pub fn stats(&self) -> SyncStats {
        self.stats
    }

    /// Drains the mirror tree's dirty channels.
    pub fn take_changes(&mut self) -> MirrorChanges {
        self.tree.take_changes()
    }

    /// Delivers a touch outside of any event.
    pub fn touch(&mut self) {
        self.notifier.touch(&mut self.display);
        self.stats.touches = self.notifier.delivered();
    }

    /// Consumes the dispatcher, returning the tree and the display.
    pub fn into_parts(self) -> (MirrorTree, D) {
        (self.tree, self.display)
    }

    // -- Entry points --

    /// Mirrors a newly created source node.
    ///
    /// Parent, geometry and realized state are read from `host`. The new
    /// node's Z is one above the nearest mirrored sibling behind it, or 0
    /// if there is none. If the host placed the node below an existing
    /// sibling, the sibling chain is reconciled so Z stays strictly
    /// ordered.
    ///
    /// # Errors
    ///
    /// - [`SyncError::UnknownNode`] naming the parent if the parent has no
    ///   live mirror. Nothing is created and the event is not delegated.
    /// - [`SyncError::AlreadyMirrored`] or [`SyncError::AllocationFailure`]
    ///   from the registry.
    /// - [`SyncError::StackingOverflow`] if the sibling behind already has
    ///   Z `i32::MAX`. Nothing is created. Also returned if the
    ///   reconciliation pass cannot raise a sibling; the node stays
    ///   created then.
    /// - [`SyncError::Delegate`] if the next handler fails.
    pub fn on_create<H: SourceHierarchy + ?Sized>(
        &mut self,
        host: &H,
        id: SourceId,
        next: Option<&mut dyn NextHandler>,
    ) -> Result<MirrorRef, SyncError> {
        let kind = EventKind::Create;
        let started = self.begin(kind, id);

        let source_parent = host.parent(id);
        let parent = match source_parent {
            Some(p) => match self.tree.lookup(p) {
                Ok(node) => Some(node),
                Err(err) => {
                    self.unknown(kind, p);
                    return self.fail(kind, id, started, err);
                }
            },
            None => None,
        };

        let mut behind = host.next_sibling(id);
        let mut behind_z = None;
        while let Some(sib) = behind {
            if let Some(node) = self.tree.get(sib) {
                behind_z = Some(self.tree.z(node));
                break;
            }
            behind = host.next_sibling(sib);
        }
        let Some(z) = initial_z(behind_z) else {
            error!(id = %id, "sibling behind is already at the top stacking index");
            return self.fail(kind, id, started, SyncError::StackingOverflow { id });
        };
        let rect = host.geometry(id);
        let opacity = Opacity::from_realized(host.is_realized(id));

        let node = match self
            .tree
            .create(&mut self.display, id, parent, rect, z, opacity)
        {
            Ok(node) => node,
            Err(err) => {
                if matches!(err, SyncError::AllocationFailure { .. }) {
                    error!(id = %id, "cannot allocate mirror node");
                } else {
                    warn!(id = %id, error = %err, "create refused");
                }
                return self.fail(kind, id, started, err);
            }
        };

        debug!(id = %id, node = ?node, rect = ?rect, z, alpha = opacity.as_alpha(), "create");
        self.tracer().node_created(&NodeCreated {
            id,
            node_index: node.index(),
            parent: source_parent,
            rect,
            z,
            opacity,
        });
        self.node_changed(kind, id);

        if host.prev_sibling(id).is_some() {
            if let Err(err) = self.reconcile(host, kind, id) {
                return self.fail(kind, id, started, err);
            }
        }

        self.finish(kind, id, started, EventOutcome::Applied, next, |n| {
            n.create(id)
        })?;
        Ok(node)
    }

    /// Releases the mirror of a destroyed source node.
    ///
    /// # Errors
    ///
    /// - [`SyncError::LiveChildren`] if the node still has mirrored
    ///   children. Nothing is destroyed and the event is not delegated.
    /// - [`SyncError::Delegate`] if the next handler fails.
    pub fn on_destroy(
        &mut self,
        id: SourceId,
        next: Option<&mut dyn NextHandler>,
    ) -> Result<(), SyncError> {
        let kind = EventKind::Destroy;
        let started = self.begin(kind, id);

        let outcome = match self.tree.lookup(id) {
            Ok(node) => {
                if let Err(err) = self.tree.destroy(&mut self.display, id) {
                    warn!(id = %id, error = %err, "destroy refused");
                    return self.fail(kind, id, started, err);
                }
                debug!(id = %id, node = ?node, "destroy");
                self.tracer().node_destroyed(&NodeDestroyed {
                    id,
                    node_index: node.index(),
                });
                self.node_changed(kind, id);
                EventOutcome::Applied
            }
            Err(_) => self.unknown(kind, id),
        };

        self.finish(kind, id, started, outcome, next, |n| n.destroy(id))
    }

    /// Shows the mirror of a realized source node.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Delegate`] if the next handler fails.
    pub fn on_realize(
        &mut self,
        id: SourceId,
        next: Option<&mut dyn NextHandler>,
    ) -> Result<(), SyncError> {
        let kind = EventKind::Realize;
        let started = self.begin(kind, id);
        let outcome = self.apply_opacity(kind, id, Opacity::Shown);
        self.finish(kind, id, started, outcome, next, |n| n.realize(id))
    }

    /// Hides the mirror of an unrealized source node.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Delegate`] if the next handler fails.
    pub fn on_unrealize(
        &mut self,
        id: SourceId,
        next: Option<&mut dyn NextHandler>,
    ) -> Result<(), SyncError> {
        let kind = EventKind::Unrealize;
        let started = self.begin(kind, id);
        let outcome = self.apply_opacity(kind, id, Opacity::Hidden);
        self.finish(kind, id, started, outcome, next, |n| n.unrealize(id))
    }

    /// Moves the mirror of a source node to `(x, y)`.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Delegate`] if the next handler fails.
    pub fn on_move(
        &mut self,
        id: SourceId,
        x: i32,
        y: i32,
        next: Option<&mut dyn NextHandler>,
    ) -> Result<(), SyncError> {
        let kind = EventKind::Move;
        let started = self.begin(kind, id);

        let outcome = match self.tree.lookup(id) {
            Ok(node) => {
                self.tree.move_node(&mut self.display, node, x, y);
                debug!(id = %id, node = ?node, x, y, "move");
                self.changed(id, node, NodeField::Position);
                self.node_changed(kind, id);
                EventOutcome::Applied
            }
            Err(_) => self.unknown(kind, id),
        };

        self.finish(kind, id, started, outcome, next, |n| n.move_to(id, x, y))
    }

    /// Moves and resizes the mirror of a source node, then clears whatever
    /// the node no longer covers within the union of its old and new
    /// extents.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Delegate`] if the next handler fails.
    pub fn on_resize<H: SourceHierarchy + ?Sized>(
        &mut self,
        host: &H,
        id: SourceId,
        rect: PixelRect,
        next: Option<&mut dyn NextHandler>,
    ) -> Result<(), SyncError> {
        let kind = EventKind::Resize;
        let started = self.begin(kind, id);

        let outcome = match self.tree.lookup(id) {
            Ok(node) => {
                self.tree.move_node(&mut self.display, node, rect.x0, rect.y0);
                self.changed(id, node, NodeField::Position);
                let old = self
                    .tree
                    .resize(&mut self.display, node, rect.width(), rect.height());
                self.changed(id, node, NodeField::Size);
                let bounds = resize_bounds(old, rect);
                self.clip(host, id, node, bounds);
                debug!(id = %id, node = ?node, rect = ?rect, "resize");
                self.node_changed(kind, id);
                EventOutcome::Applied
            }
            Err(_) => self.unknown(kind, id),
        };

        self.finish(kind, id, started, outcome, next, |n| n.resize(id, rect))
    }

    /// Moves the mirror of a source node under a new parent, or to the top
    /// level when `new_parent` is `None`.
    ///
    /// Z, position and size are unchanged. If the new parent has no live
    /// mirror the event is counted as unknown and nothing moves.
    ///
    /// # Errors
    ///
    /// - [`SyncError::ReparentCycle`] if `new_parent` lies inside `id`'s
    ///   mirrored subtree. Nothing moves and the event is not delegated.
    /// - [`SyncError::Delegate`] if the next handler fails.
    pub fn on_reparent(
        &mut self,
        id: SourceId,
        new_parent: Option<SourceId>,
        next: Option<&mut dyn NextHandler>,
    ) -> Result<(), SyncError> {
        let kind = EventKind::Reparent;
        let started = self.begin(kind, id);

        let outcome = match self.tree.lookup(id) {
            Err(_) => self.unknown(kind, id),
            Ok(node) => match new_parent {
                None => self.apply_reparent(kind, id, node, None),
                Some(p) => match self.tree.lookup(p) {
                    Ok(parent) if self.tree.is_ancestor_or_self(node, parent) => {
                        warn!(id = %id, parent = %p, "reparent into own subtree refused");
                        let err = SyncError::ReparentCycle { id, parent: p };
                        return self.fail(kind, id, started, err);
                    }
                    Ok(parent) => self.apply_reparent(kind, id, node, Some(parent)),
                    Err(_) => self.unknown(kind, p),
                },
            },
        };

        self.finish(kind, id, started, outcome, next, |n| {
            n.reparent(id, new_parent)
        })
    }

    /// Restores strict Z ordering along the sibling chain containing `id`.
    ///
    /// `host` must already reflect the new sibling order. Only siblings
    /// whose Z is not above everything behind them are reassigned; each
    /// reassignment is one node-level change. Siblings without a live
    /// mirror are skipped.
    ///
    /// # Errors
    ///
    /// - [`SyncError::StackingOverflow`] if a sibling cannot be raised. No
    ///   Z is changed and the event is not delegated.
    /// - [`SyncError::Delegate`] if the next handler fails.
    pub fn on_restack<H: SourceHierarchy + ?Sized>(
        &mut self,
        host: &H,
        id: SourceId,
        next: Option<&mut dyn NextHandler>,
    ) -> Result<(), SyncError> {
        let kind = EventKind::Restack;
        let started = self.begin(kind, id);

        let outcome = if self.tree.contains(id) {
            if let Err(err) = self.reconcile(host, kind, id) {
                error!(id = %id, error = %err, "restack failed");
                return self.fail(kind, id, started, err);
            }
            EventOutcome::Applied
        } else {
            self.unknown(kind, id)
        };

        self.finish(kind, id, started, outcome, next, |n| n.restack(id))
    }

    /// Clears whatever a source node no longer covers after a shape change.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Delegate`] if the next handler fails.
    pub fn on_shape_change<H: SourceHierarchy + ?Sized>(
        &mut self,
        host: &H,
        id: SourceId,
        shape: ShapeKind,
        next: Option<&mut dyn NextHandler>,
    ) -> Result<(), SyncError> {
        let kind = EventKind::ShapeChange;
        let started = self.begin(kind, id);

        let outcome = match self.tree.lookup(id) {
            Ok(node) => {
                let r = self.tree.rect(node);
                self.clip(host, id, node, PixelRect::from_size(r.width(), r.height()));
                debug!(id = %id, node = ?node, kind = %shape, "set shape");
                self.node_changed(kind, id);
                EventOutcome::Applied
            }
            Err(_) => self.unknown(kind, id),
        };

        self.finish(kind, id, started, outcome, next, |n| {
            n.shape_change(id, shape)
        })
    }

    // -- Internal helpers --

    fn tracer(&mut self) -> Tracer<'_> {
        match self.sink.as_deref_mut() {
            Some(sink) => Tracer::new(sink),
            None => Tracer::none(),
        }
    }

    /// Starts an event. Returns the touch count at the start.
    fn begin(&mut self, kind: EventKind, id: SourceId) -> u64 {
        self.stats.events += 1;
        let screen = self.config.screen;
        self.tracer().event_begin(&EventBegin { screen, kind, id });
        self.notifier.delivered()
    }

    /// Flushes a pending touch, delegates, and ends the event.
    fn finish<F>(
        &mut self,
        kind: EventKind,
        id: SourceId,
        started: u64,
        outcome: EventOutcome,
        next: Option<&mut dyn NextHandler>,
        delegate: F,
    ) -> Result<(), SyncError>
    where
        F: FnOnce(&mut dyn NextHandler) -> Result<(), DelegateError>,
    {
        self.flush(kind, id);
        let delegated = match next {
            Some(n) => delegate(n),
            None => Ok(()),
        };
        let outcome = match &delegated {
            Ok(()) => outcome,
            Err(err) => {
                warn!(kind = %kind, id = %id, error = %err, "chained handler failed");
                EventOutcome::Failed
            }
        };
        self.end(kind, id, started, outcome);
        delegated.map_err(SyncError::from)
    }

    /// Ends an event with an error, without delegating.
    fn fail<T>(
        &mut self,
        kind: EventKind,
        id: SourceId,
        started: u64,
        err: SyncError,
    ) -> Result<T, SyncError> {
        self.flush(kind, id);
        self.end(kind, id, started, EventOutcome::Failed);
        Err(err)
    }

    fn flush(&mut self, kind: EventKind, id: SourceId) {
        if self.notifier.end_event(&mut self.display) {
            self.touched(kind, id);
        }
    }

    fn end(&mut self, kind: EventKind, id: SourceId, started: u64, outcome: EventOutcome) {
        self.stats.touches = self.notifier.delivered();
        let touches = self.notifier.delivered() - started;
        let screen = self.config.screen;
        self.tracer().event_end(&EventEnd {
            screen,
            kind,
            id,
            touches,
            outcome,
        });
    }

    fn unknown(&mut self, kind: EventKind, id: SourceId) -> EventOutcome {
        warn!(kind = %kind, id = %id, "event for unmirrored node ignored");
        self.stats.unknown_nodes += 1;
        self.tracer().unknown_node(kind, id);
        EventOutcome::UnknownNode
    }

    /// One node-level mutation has completed.
    fn node_changed(&mut self, kind: EventKind, id: SourceId) {
        if self.notifier.node_changed(&mut self.display) {
            self.touched(kind, id);
        }
    }

    fn touched(&mut self, kind: EventKind, id: SourceId) {
        let delivered = self.notifier.delivered();
        self.tracer().touch(&Touch {
            kind,
            id,
            delivered,
        });
    }

    fn changed(&mut self, id: SourceId, node: MirrorRef, field: NodeField) {
        self.tracer().node_changed(&NodeChanged {
            id,
            node_index: node.index(),
            field,
        });
    }

    fn apply_opacity(&mut self, kind: EventKind, id: SourceId, opacity: Opacity) -> EventOutcome {
        match self.tree.lookup(id) {
            Ok(node) => {
                self.tree.set_opacity(&mut self.display, node, opacity);
                debug!(kind = %kind, id = %id, node = ?node, alpha = opacity.as_alpha(), "shade");
                self.changed(id, node, NodeField::Opacity);
                self.node_changed(kind, id);
                EventOutcome::Applied
            }
            Err(_) => self.unknown(kind, id),
        }
    }

    fn apply_reparent(
        &mut self,
        kind: EventKind,
        id: SourceId,
        node: MirrorRef,
        parent: Option<MirrorRef>,
    ) -> EventOutcome {
        self.tree.reparent(&mut self.display, node, parent);
        match parent {
            Some(p) => {
                debug!(id = %id, node = ?node, parent = %self.tree.source_id(p), "reparent");
            }
            None => debug!(id = %id, node = ?node, "reparent to top level"),
        }
        self.changed(id, node, NodeField::Parent);
        self.node_changed(kind, id);
        EventOutcome::Applied
    }

    /// Runs a clip pass for `node` with regions read from `host`.
    fn clip<H: SourceHierarchy + ?Sized>(
        &mut self,
        host: &H,
        id: SourceId,
        node: MirrorRef,
        bounds: PixelRect,
    ) {
        let clip_list = host.clip_list(id);
        let shape = host.bounding_shape(id);
        let update =
            self.tree
                .update_clip(&mut self.display, node, &clip_list, shape.as_ref(), bounds);
        if update.cleared.is_empty() {
            return;
        }
        self.stats.clears += 1;
        debug!(id = %id, node = ?node, bounds = ?bounds, area = update.cleared.area(), "clear outside");
        self.tracer().clear(&Clear {
            id,
            node_index: node.index(),
            bounds,
            rects: update.cleared.rects().len(),
            area: update.cleared.area(),
        });
    }

    /// Reconciles Z along the sibling chain of `id`, one node at a time.
    fn reconcile<H: SourceHierarchy + ?Sized>(
        &mut self,
        host: &H,
        kind: EventKind,
        id: SourceId,
    ) -> Result<(), SyncError> {
        let mut chain = Vec::new();
        for sib in sibling_chain(host, id) {
            match self.tree.get(sib) {
                Some(node) => chain.push(node),
                None => warn!(id = %sib, "skipping unmirrored sibling"),
            }
        }

        let plan = self.tree.plan_chain(&chain)?;
        for r in plan {
            self.tree.restack(&mut self.display, r.node, r.new_z);
            let sib = self.tree.source_id(r.node);
            debug!(id = %sib, node = ?r.node, z = r.new_z, "restack");
            self.stats.restacked += 1;
            self.tracer().restack(&Restack {
                id: sib,
                node_index: r.node.index(),
                old_z: r.old_z,
                new_z: r.new_z,
            });
            self.node_changed(kind, id);
        }
        Ok(())
    }
}
