// Copyright 2026 the Mirage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Incremental mirroring of a host surface hierarchy into a remote-rendering
//! layer tree.
//!
//! A host owns a mutable tree of rectangular surfaces (the *source
//! hierarchy*) and reports structural edits to it one at a time. This crate
//! keeps an independent *mirror tree* consistent with those edits, touching
//! only the nodes each edit affects, and forwards every node-level mutation
//! to a remote-display collaborator.
//!
//! `mirage_core` is `no_std` compatible (with `alloc`) and stores mirror
//! nodes in a struct-of-arrays arena addressed by generational handles.
//!
//! # Architecture
//!
//! ```text
//!   Host event (create, move, restack, ...)
//!       │
//!       ▼
//!   Dispatcher ──► MirrorTree (registry + mutator)
//!       │              │   ├─ zorder: restack reconciliation
//!       │              │   └─ clip: excluded-region clears
//!       │              ▼
//!       │         RemoteDisplay::{create_layer, move_layer, ...}
//!       ▼
//!   Notifier ──► RemoteDisplay::touch()
//!       │
//!       ▼
//!   NextHandler (host's chained default handling)
//! ```
//!
//! **[`node`]**: Mirror node arena with generational handles, the
//! registry mapping source identities to mirror nodes, geometry and
//! visibility mutation, Z-order reconciliation, and clip-region updates.
//!
//! **[`dispatch`]**: The [`Dispatcher`](dispatch::Dispatcher): one entry
//! point per host event, composing the node operations.
//!
//! **[`display`]**: The [`RemoteDisplay`](display::RemoteDisplay) trait
//! that the remote-display collaborator implements.
//!
//! **[`notify`]**: Dirty notification with a configurable
//! [`NotifyPolicy`](config::NotifyPolicy).
//!
//! **[`host`]**: The [`SourceHierarchy`](host::SourceHierarchy) read-only
//! view of the host tree.
//!
//! **[`region`]**: Integer rectangles and disjoint-rectangle regions.
//!
//! **[`dirty`]**: Multi-channel change tracking via `understory_dirty`.
//!
//! **[`trace`]**: [`TraceSink`](trace::TraceSink) trait and event types for
//! structured instrumentation, with a zero-overhead
//! [`Tracer`](trace::Tracer) wrapper.
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies.
//! - `trace` (disabled by default): Enables `Tracer` method bodies (one branch
//!   per call site).
//! - `serde` (disabled by default): Derives `Serialize`/`Deserialize` for
//!   configuration and plain value types.

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

pub mod config;
pub mod dirty;
pub mod dispatch;
pub mod display;
pub mod error;
pub mod host;
pub mod node;
pub mod notify;
pub mod region;
pub mod screen;
pub mod trace;

pub use config::{NotifyPolicy, SyncConfig};
pub use dispatch::{Dispatcher, NextHandler, SyncStats};
pub use display::RemoteDisplay;
pub use error::{DelegateError, SyncError};
pub use host::{ShapeKind, SourceHierarchy};
pub use node::{MirrorRef, MirrorTree, Opacity, SourceId};
pub use region::{PixelRect, Region};
