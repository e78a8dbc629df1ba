// Copyright 2026 the Mirage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Structured instrumentation for host event handling.
//!
//! This module provides a [`TraceSink`] trait with per-event methods that
//! the [`Dispatcher`](crate::dispatch::Dispatcher) calls while applying a
//! host event. All method bodies default to no-ops, so implementing only the
//! events you care about is fine.
//!
//! [`Tracer`] wraps an optional `&mut dyn TraceSink`. When the `trace` feature
//! is **off**, every `Tracer` method compiles to nothing (zero overhead). When
//! **on**, each method performs a single `Option` branch before dispatching.
//!
//! Level-and-message logging is separate and goes through `tracing`.

use core::fmt;

use crate::node::{Opacity, SourceId};
use crate::region::PixelRect;
use crate::screen::ScreenId;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Which host event is being applied.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EventKind {
    /// A source node was created.
    Create,
    /// A source node was destroyed.
    Destroy,
    /// A source node became visible.
    Realize,
    /// A source node became invisible.
    Unrealize,
    /// A source node moved.
    Move,
    /// A source node was moved and resized.
    Resize,
    /// A source node got a new parent.
    Reparent,
    /// A sibling chain was reordered.
    Restack,
    /// A source node's shape changed.
    ShapeChange,
}

impl EventKind {
    /// Returns a short lowercase label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Destroy => "destroy",
            Self::Realize => "realize",
            Self::Unrealize => "unrealize",
            Self::Move => "move",
            Self::Resize => "resize",
            Self::Reparent => "reparent",
            Self::Restack => "restack",
            Self::ShapeChange => "shape",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which property of a mirror node changed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NodeField {
    /// Position relative to the parent.
    Position,
    /// Width and height.
    Size,
    /// Visibility.
    Opacity,
    /// Parent link.
    Parent,
}

/// How a host event ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EventOutcome {
    /// The event was mirrored.
    Applied,
    /// The event referenced a node with no live mirror and was skipped.
    UnknownNode,
    /// The event failed and the error was returned to the host.
    Failed,
}

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Emitted when the dispatcher starts applying a host event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EventBegin {
    /// Screen whose mirror tree is affected.
    pub screen: ScreenId,
    /// Event type.
    pub kind: EventKind,
    /// Source node named by the event.
    pub id: SourceId,
}

/// Emitted after a mirror node is created.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NodeCreated {
    /// The mirrored source node.
    pub id: SourceId,
    /// Slot index of the new mirror node.
    pub node_index: u32,
    /// The source parent, if any.
    pub parent: Option<SourceId>,
    /// Initial geometry.
    pub rect: PixelRect,
    /// Initial stacking index.
    pub z: i32,
    /// Initial visibility.
    pub opacity: Opacity,
}

/// Emitted after a mirror node is destroyed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NodeDestroyed {
    /// The source node whose mirror was destroyed.
    pub id: SourceId,
    /// Slot index the mirror occupied.
    pub node_index: u32,
}

/// Emitted after a geometry, visibility or parent mutation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NodeChanged {
    /// The mirrored source node.
    pub id: SourceId,
    /// Slot index of the mirror node.
    pub node_index: u32,
    /// Which property changed.
    pub field: NodeField,
}

/// Emitted for each Z reassignment made by a restack pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Restack {
    /// The mirrored source node.
    pub id: SourceId,
    /// Slot index of the mirror node.
    pub node_index: u32,
    /// Z before the pass.
    pub old_z: i32,
    /// Z after the pass.
    pub new_z: i32,
}

/// Emitted after a clip pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Clear {
    /// The mirrored source node.
    pub id: SourceId,
    /// Slot index of the mirror node.
    pub node_index: u32,
    /// Bounds the clear was limited to.
    pub bounds: PixelRect,
    /// Number of disjoint boxes cleared.
    pub rects: usize,
    /// Number of pixels cleared.
    pub area: u64,
}

/// Emitted for each touch delivered to the remote display.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Touch {
    /// Event type being applied when the touch was delivered.
    pub kind: EventKind,
    /// Source node named by the event.
    pub id: SourceId,
    /// Total touches delivered so far, this one included.
    pub delivered: u64,
}

/// Emitted when the dispatcher finishes a host event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EventEnd {
    /// Screen whose mirror tree is affected.
    pub screen: ScreenId,
    /// Event type.
    pub kind: EventKind,
    /// Source node named by the event.
    pub id: SourceId,
    /// Touches delivered while applying the event.
    pub touches: u64,
    /// How the event ended.
    pub outcome: EventOutcome,
}

// ---------------------------------------------------------------------------
// TraceSink trait
// ---------------------------------------------------------------------------

/// Receives trace events from the dispatcher.
///
/// All methods have default no-op implementations, so you only need to
/// override the events you care about.
pub trait TraceSink {
    /// Called when a host event starts.
    fn on_event_begin(&mut self, e: &EventBegin) {
        _ = e;
    }

    /// Called after a mirror node is created.
    fn on_node_created(&mut self, e: &NodeCreated) {
        _ = e;
    }

    /// Called after a mirror node is destroyed.
    fn on_node_destroyed(&mut self, e: &NodeDestroyed) {
        _ = e;
    }

    /// Called after a geometry, visibility or parent mutation.
    fn on_node_changed(&mut self, e: &NodeChanged) {
        _ = e;
    }

    /// Called for each Z reassignment.
    fn on_restack(&mut self, e: &Restack) {
        _ = e;
    }

    /// Called after a clip pass.
    fn on_clear(&mut self, e: &Clear) {
        _ = e;
    }

    /// Called after each touch.
    fn on_touch(&mut self, e: &Touch) {
        _ = e;
    }

    /// Called when an event names a node with no live mirror.
    fn on_unknown_node(&mut self, kind: EventKind, id: SourceId) {
        _ = (kind, id);
    }

    /// Called when a host event ends.
    fn on_event_end(&mut self, e: &EventEnd) {
        _ = e;
    }
}

// ---------------------------------------------------------------------------
// NoopSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

// ---------------------------------------------------------------------------
// Tracer wrapper
// ---------------------------------------------------------------------------

/// Thin wrapper around an optional [`TraceSink`].
///
/// When the `trace` feature is **off**, every method compiles to nothing. When
/// **on**, each method checks the inner `Option` (one branch) before
/// dispatching to the sink.
pub struct Tracer<'a> {
    #[cfg(feature = "trace")]
    sink: Option<&'a mut dyn TraceSink>,
    #[cfg(not(feature = "trace"))]
    _marker: core::marker::PhantomData<&'a mut dyn TraceSink>,
}

impl fmt::Debug for Tracer<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tracer").finish_non_exhaustive()
    }
}

impl<'a> Tracer<'a> {
    /// Creates a tracer that dispatches to the given sink.
    #[inline]
    #[must_use]
    pub fn new(sink: &'a mut dyn TraceSink) -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: Some(sink) }
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = sink;
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Creates a tracer from an optional sink.
    #[inline]
    #[must_use]
    pub fn from_option(sink: Option<&'a mut dyn TraceSink>) -> Self {
        match sink {
            Some(sink) => Self::new(sink),
            None => Self::none(),
        }
    }

    /// Creates a tracer that discards all events.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: None }
        }
        #[cfg(not(feature = "trace"))]
        {
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Emits an [`EventBegin`].
    #[inline]
    pub fn event_begin(&mut self, e: &EventBegin) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_event_begin(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`NodeCreated`].
    #[inline]
    pub fn node_created(&mut self, e: &NodeCreated) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_node_created(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`NodeDestroyed`].
    #[inline]
    pub fn node_destroyed(&mut self, e: &NodeDestroyed) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_node_destroyed(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`NodeChanged`].
    #[inline]
    pub fn node_changed(&mut self, e: &NodeChanged) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_node_changed(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`Restack`].
    #[inline]
    pub fn restack(&mut self, e: &Restack) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_restack(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`Clear`].
    #[inline]
    pub fn clear(&mut self, e: &Clear) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_clear(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`Touch`].
    #[inline]
    pub fn touch(&mut self, e: &Touch) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_touch(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Reports an event naming a node with no live mirror.
    #[inline]
    pub fn unknown_node(&mut self, kind: EventKind, id: SourceId) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_unknown_node(kind, id);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = (kind, id);
        }
    }

    /// Emits an [`EventEnd`].
    #[inline]
    pub fn event_end(&mut self, e: &EventEnd) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_event_end(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_begin() -> EventBegin {
        EventBegin {
            screen: ScreenId(0),
            kind: EventKind::Restack,
            id: SourceId(0x20_0001),
        }
    }

    #[test]
    fn event_kind_labels() {
        assert_eq!(EventKind::ShapeChange.as_str(), "shape");
        assert_eq!(alloc::format!("{}", EventKind::Create), "create");
    }

    #[test]
    fn noop_sink_compiles() {
        let mut sink = NoopSink;
        sink.on_event_begin(&sample_begin());
        sink.on_unknown_node(EventKind::Move, SourceId(1));
    }

    #[test]
    fn tracer_none_does_nothing() {
        let mut tracer = Tracer::none();
        tracer.event_begin(&sample_begin());
        tracer.unknown_node(EventKind::Destroy, SourceId(2));
    }

    #[cfg(feature = "trace")]
    #[test]
    fn tracer_dispatches_to_sink() {
        use alloc::vec::Vec;

        struct RecordingSink {
            restacks: Vec<i32>,
        }
        impl TraceSink for RecordingSink {
            fn on_restack(&mut self, e: &Restack) {
                self.restacks.push(e.new_z);
            }
        }

        let mut sink = RecordingSink {
            restacks: Vec::new(),
        };
        let mut tracer = Tracer::new(&mut sink);
        tracer.restack(&Restack {
            id: SourceId(1),
            node_index: 0,
            old_z: 5,
            new_z: 6,
        });
        // Access sink after tracer is dropped.
        drop(tracer);
        assert_eq!(sink.restacks, &[6]);
    }
}
