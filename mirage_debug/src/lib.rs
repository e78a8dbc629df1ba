// Copyright 2026 the Mirage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Recording, pretty-printing, and JSON export for mirage diagnostics.
//!
//! This crate provides [`TraceSink`](mirage_core::trace::TraceSink)
//! implementations for development and post-mortem analysis:
//!
//! - [`pretty::PrettyPrintSink`]: human-readable one-line-per-event output.
//! - [`recorder::RecorderSink`]: in-memory recording of every event as a
//!   [`recorder::RecordedEvent`].
//! - [`json`]: JSON-lines export and import of recorded events.

pub mod json;
pub mod pretty;
pub mod recorder;
