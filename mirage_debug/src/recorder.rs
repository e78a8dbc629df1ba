// Copyright 2026 the Mirage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! In-memory event recording.
//!
//! [`RecorderSink`] implements [`TraceSink`] and appends every event to a
//! shared buffer as a [`RecordedEvent`]. Clones of a recorder share the
//! same buffer, so keep one clone to read events back after handing the
//! other to a [`Dispatcher`](mirage_core::dispatch::Dispatcher).
//!
//! Recorded events are `serde`-serializable; see [`crate::json`].

use std::cell::RefCell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use mirage_core::node::SourceId;
use mirage_core::trace::{
    Clear, EventBegin, EventEnd, EventKind, NodeChanged, NodeCreated, NodeDestroyed, Restack,
    Touch, TraceSink,
};

/// One recorded trace event.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum RecordedEvent {
    /// An [`EventBegin`].
    EventBegin(EventBegin),
    /// A [`NodeCreated`].
    NodeCreated(NodeCreated),
    /// A [`NodeDestroyed`].
    NodeDestroyed(NodeDestroyed),
    /// A [`NodeChanged`].
    NodeChanged(NodeChanged),
    /// A [`Restack`].
    Restack(Restack),
    /// A [`Clear`].
    Clear(Clear),
    /// A [`Touch`].
    Touch(Touch),
    /// An event that named a node with no live mirror.
    UnknownNode {
        /// Event type.
        kind: EventKind,
        /// The unmirrored node.
        id: SourceId,
    },
    /// An [`EventEnd`].
    EventEnd(EventEnd),
}

impl RecordedEvent {
    /// Returns the source node this event is about.
    #[must_use]
    pub fn source_id(&self) -> SourceId {
        match self {
            Self::EventBegin(e) => e.id,
            Self::NodeCreated(e) => e.id,
            Self::NodeDestroyed(e) => e.id,
            Self::NodeChanged(e) => e.id,
            Self::Restack(e) => e.id,
            Self::Clear(e) => e.id,
            Self::Touch(e) => e.id,
            Self::UnknownNode { id, .. } => *id,
            Self::EventEnd(e) => e.id,
        }
    }
}

/// A [`TraceSink`] that records events in memory.
#[derive(Clone, Debug, Default)]
pub struct RecorderSink {
    events: Rc<RefCell<Vec<RecordedEvent>>>,
}

impl RecorderSink {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the recorded events.
    #[must_use]
    pub fn events(&self) -> Vec<RecordedEvent> {
        self.events.borrow().clone()
    }

    /// Removes and returns the recorded events.
    pub fn take(&self) -> Vec<RecordedEvent> {
        core::mem::take(&mut *self.events.borrow_mut())
    }

    /// Returns the number of recorded events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.borrow().len()
    }

    /// Returns `true` if nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.borrow().is_empty()
    }

    /// Returns the number of recorded events matching `pred`.
    pub fn count(&self, pred: impl Fn(&RecordedEvent) -> bool) -> usize {
        self.events.borrow().iter().filter(|e| pred(e)).count()
    }

    fn push(&self, event: RecordedEvent) {
        self.events.borrow_mut().push(event);
    }
}

impl TraceSink for RecorderSink {
    fn on_event_begin(&mut self, e: &EventBegin) {
        self.push(RecordedEvent::EventBegin(*e));
    }

    fn on_node_created(&mut self, e: &NodeCreated) {
        self.push(RecordedEvent::NodeCreated(*e));
    }

    fn on_node_destroyed(&mut self, e: &NodeDestroyed) {
        self.push(RecordedEvent::NodeDestroyed(*e));
    }

    fn on_node_changed(&mut self, e: &NodeChanged) {
        self.push(RecordedEvent::NodeChanged(*e));
    }

    fn on_restack(&mut self, e: &Restack) {
        self.push(RecordedEvent::Restack(*e));
    }

    fn on_clear(&mut self, e: &Clear) {
        self.push(RecordedEvent::Clear(*e));
    }

    fn on_touch(&mut self, e: &Touch) {
        self.push(RecordedEvent::Touch(*e));
    }

    fn on_unknown_node(&mut self, kind: EventKind, id: SourceId) {
        self.push(RecordedEvent::UnknownNode { kind, id });
    }

    fn on_event_end(&mut self, e: &EventEnd) {
        self.push(RecordedEvent::EventEnd(*e));
    }
}

#[cfg(test)]
mod tests {
    use mirage_core::display::NullDisplay;
    use mirage_core::dispatch::Dispatcher;
    use mirage_core::screen::ScreenId;
    use mirage_core::trace::EventOutcome;

    use super::*;

    #[test]
    fn clones_share_one_buffer() {
        let rec = RecorderSink::new();
        let mut sink = rec.clone();
        sink.on_unknown_node(EventKind::Move, SourceId(7));
        assert_eq!(rec.len(), 1);
        assert_eq!(rec.events()[0].source_id(), SourceId(7));

        let taken = rec.take();
        assert_eq!(taken.len(), 1);
        assert!(rec.is_empty());
    }

    #[test]
    fn records_dispatcher_events() {
        let rec = RecorderSink::new();
        let mut d = Dispatcher::new(NullDisplay::new());
        d.set_trace_sink(Box::new(rec.clone()));

        d.on_move(SourceId(0x42), 1, 1, None).unwrap();

        let events = rec.events();
        assert_eq!(
            events,
            [
                RecordedEvent::EventBegin(EventBegin {
                    screen: ScreenId(0),
                    kind: EventKind::Move,
                    id: SourceId(0x42),
                }),
                RecordedEvent::UnknownNode {
                    kind: EventKind::Move,
                    id: SourceId(0x42),
                },
                RecordedEvent::EventEnd(EventEnd {
                    screen: ScreenId(0),
                    kind: EventKind::Move,
                    id: SourceId(0x42),
                    touches: 0,
                    outcome: EventOutcome::UnknownNode,
                }),
            ]
        );
    }

    #[test]
    fn count_filters_events() {
        let mut rec = RecorderSink::new();
        rec.on_unknown_node(EventKind::Destroy, SourceId(1));
        rec.on_touch(&Touch {
            kind: EventKind::Move,
            id: SourceId(2),
            delivered: 1,
        });
        rec.on_touch(&Touch {
            kind: EventKind::Move,
            id: SourceId(2),
            delivered: 2,
        });
        assert_eq!(rec.count(|e| matches!(e, RecordedEvent::Touch(_))), 2);
    }
}
