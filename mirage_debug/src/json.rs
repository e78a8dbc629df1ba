// Copyright 2026 the Mirage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! JSON-lines export and import.
//!
//! [`export`] writes one JSON object per [`RecordedEvent`], each on its own
//! line, tagged by an `"event"` field. [`import`] reads such a stream back.

use std::io::{self, BufRead, Write};

use crate::recorder::RecordedEvent;

/// Writes `events` as JSON lines.
pub fn export(events: &[RecordedEvent], writer: &mut dyn Write) -> io::Result<()> {
    for event in events {
        serde_json::to_writer(&mut *writer, event)?;
        writer.write_all(b"\n")?;
    }
    writer.flush()
}

/// Reads JSON lines written by [`export`]. Blank lines are skipped.
pub fn import(reader: impl BufRead) -> io::Result<Vec<RecordedEvent>> {
    let mut events = Vec::new();
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        events.push(serde_json::from_str(&line)?);
    }
    Ok(events)
}

#[cfg(test)]
mod tests {
    use mirage_core::node::{Opacity, SourceId};
    use mirage_core::region::PixelRect;
    use mirage_core::trace::{EventKind, NodeCreated, TraceSink};
    use serde_json::Value;

    use super::*;
    use crate::recorder::RecorderSink;

    #[test]
    fn export_writes_tagged_lines() {
        let mut rec = RecorderSink::new();
        rec.on_node_created(&NodeCreated {
            id: SourceId(0x20_0001),
            node_index: 3,
            parent: None,
            rect: PixelRect::new(0, 0, 640, 480),
            z: 0,
            opacity: Opacity::Shown,
        });
        rec.on_unknown_node(EventKind::Destroy, SourceId(9));

        let mut out = Vec::new();
        export(&rec.events(), &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);

        let first: Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["event"], "node_created");
        assert_eq!(first["node_index"], 3);
        assert_eq!(first["z"], 0);

        let second: Value = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(second["event"], "unknown_node");
        assert_eq!(second["id"], 9);
    }

    #[test]
    fn import_reads_back_export() {
        let mut rec = RecorderSink::new();
        rec.on_unknown_node(EventKind::Restack, SourceId(4));
        let mut out = Vec::new();
        export(&rec.events(), &mut out).unwrap();
        out.extend_from_slice(b"\n");

        let events = import(out.as_slice()).unwrap();
        assert_eq!(events, rec.events());
    }

    #[test]
    fn import_rejects_garbage() {
        let err = import(&b"{\"event\":\"nope\"}\n"[..]).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }
}
