// Copyright 2026 the Mirage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] writes one line per event. Events emitted while a
//! host event is being applied are indented beneath its `begin` line:
//!
//! ```text
//! :0 begin restack 0x10
//! :0   restack 0x11 [slot 2] z 0 -> 3
//! :0   touch #7
//! :0 end restack 0x10 applied (1 touch)
//! ```

use std::io::{self, Write};

use mirage_core::node::SourceId;
use mirage_core::screen::ScreenId;
use mirage_core::trace::{
    Clear, EventBegin, EventEnd, EventKind, EventOutcome, NodeChanged, NodeCreated, NodeDestroyed,
    NodeField, Restack, Touch, TraceSink,
};

/// A [`TraceSink`] that pretty-prints events to a writer.
///
/// Write errors do not interrupt event handling. The first one is kept and
/// can be retrieved with [`take_error`](Self::take_error); later events are
/// dropped until then.
#[derive(Debug)]
pub struct PrettyPrintSink<W: Write> {
    writer: W,
    screen: ScreenId,
    depth: usize,
    error: Option<io::Error>,
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink writing to `writer`.
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            screen: ScreenId::default(),
            depth: 0,
            error: None,
        }
    }

    /// Returns the first write error, clearing it.
    pub fn take_error(&mut self) -> Option<io::Error> {
        self.error.take()
    }

    /// Consumes the sink and returns the writer.
    pub fn into_inner(self) -> W {
        self.writer
    }

    fn line(&mut self, args: std::fmt::Arguments<'_>) {
        if self.error.is_some() {
            return;
        }
        let indent = self.depth * 2;
        if let Err(err) = writeln!(self.writer, "{} {:indent$}{args}", self.screen, "") {
            self.error = Some(err);
        }
    }
}

fn field_name(field: NodeField) -> &'static str {
    match field {
        NodeField::Position => "moved",
        NodeField::Size => "resized",
        NodeField::Opacity => "shaded",
        NodeField::Parent => "reparented",
    }
}

fn outcome_name(outcome: EventOutcome) -> &'static str {
    match outcome {
        EventOutcome::Applied => "applied",
        EventOutcome::UnknownNode => "unknown node",
        EventOutcome::Failed => "failed",
    }
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_event_begin(&mut self, e: &EventBegin) {
        self.screen = e.screen;
        self.depth = 0;
        self.line(format_args!("begin {} {}", e.kind, e.id));
        self.depth = 1;
    }

    fn on_node_created(&mut self, e: &NodeCreated) {
        let parent = e.parent.map_or_else(|| "none".to_owned(), |p| p.to_string());
        let state = if e.opacity.is_shown() { "shown" } else { "hidden" };
        self.line(format_args!(
            "created {} [slot {}] parent {parent} {:?} z {} {state}",
            e.id, e.node_index, e.rect, e.z
        ));
    }

    fn on_node_destroyed(&mut self, e: &NodeDestroyed) {
        self.line(format_args!("destroyed {} [slot {}]", e.id, e.node_index));
    }

    fn on_node_changed(&mut self, e: &NodeChanged) {
        self.line(format_args!(
            "{} {} [slot {}]",
            field_name(e.field),
            e.id,
            e.node_index
        ));
    }

    fn on_restack(&mut self, e: &Restack) {
        self.line(format_args!(
            "restack {} [slot {}] z {} -> {}",
            e.id, e.node_index, e.old_z, e.new_z
        ));
    }

    fn on_clear(&mut self, e: &Clear) {
        self.line(format_args!(
            "clear {} [slot {}] {} px in {} rects within {:?}",
            e.id, e.node_index, e.area, e.rects, e.bounds
        ));
    }

    fn on_touch(&mut self, e: &Touch) {
        self.line(format_args!("touch #{}", e.delivered));
    }

    fn on_unknown_node(&mut self, kind: EventKind, id: SourceId) {
        self.line(format_args!("{kind}: no mirror for {id}"));
    }

    fn on_event_end(&mut self, e: &EventEnd) {
        self.depth = 0;
        let plural = if e.touches == 1 { "" } else { "es" };
        self.line(format_args!(
            "end {} {} {} ({} touch{plural})",
            e.kind,
            e.id,
            outcome_name(e.outcome),
            e.touches
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn output(sink: PrettyPrintSink<Vec<u8>>) -> String {
        String::from_utf8(sink.into_inner()).unwrap()
    }

    #[test]
    fn indents_within_event() {
        let mut sink = PrettyPrintSink::new(Vec::new());
        sink.on_event_begin(&EventBegin {
            screen: ScreenId(0),
            kind: EventKind::Restack,
            id: SourceId(0x10),
        });
        sink.on_restack(&Restack {
            id: SourceId(0x11),
            node_index: 2,
            old_z: 0,
            new_z: 3,
        });
        sink.on_touch(&Touch {
            kind: EventKind::Restack,
            id: SourceId(0x10),
            delivered: 7,
        });
        sink.on_event_end(&EventEnd {
            screen: ScreenId(0),
            kind: EventKind::Restack,
            id: SourceId(0x10),
            touches: 1,
            outcome: EventOutcome::Applied,
        });

        assert_eq!(
            output(sink),
            ":0 begin restack 0x10\n\
             :0   restack 0x11 [slot 2] z 0 -> 3\n\
             :0   touch #7\n\
             :0 end restack 0x10 applied (1 touch)\n"
        );
    }

    #[test]
    fn reports_unknown_nodes() {
        let mut sink = PrettyPrintSink::new(Vec::new());
        sink.on_unknown_node(EventKind::Destroy, SourceId(0x2a));
        assert_eq!(output(sink), ":0 destroy: no mirror for 0x2a\n");
    }

    #[test]
    fn keeps_first_write_error() {
        struct Broken;
        impl Write for Broken {
            fn write(&mut self, _: &[u8]) -> io::Result<usize> {
                Err(io::Error::other("closed"))
            }
            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }

        let mut sink = PrettyPrintSink::new(Broken);
        sink.on_unknown_node(EventKind::Move, SourceId(1));
        sink.on_unknown_node(EventKind::Move, SourceId(2));
        let err = sink.take_error().unwrap();
        assert_eq!(err.to_string(), "closed");
        assert!(sink.take_error().is_none());
    }
}
