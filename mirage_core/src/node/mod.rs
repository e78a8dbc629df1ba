// Copyright 2026 the Mirage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Mirror tree data model.
//!
//! A *mirror node* shadows one source node of the host hierarchy. Each node
//! has:
//!
//! - An identity: the host's [`SourceId`] and a generational [`MirrorRef`]
//!   handle that becomes stale when the node is destroyed.
//! - Topology: parent, first-child and sibling links. The parent link always
//!   mirrors the host's parent once an event has been applied.
//! - Mirrored properties: position and size ([`rect`](MirrorTree::rect)),
//!   stacking index ([`z`](MirrorTree::z)), two-state
//!   [`opacity`](MirrorTree::opacity), and the node-relative
//!   [`clip_region`](MirrorTree::clip_region) excluded from view.
//!
//! Nodes are stored in struct-of-arrays layout. The [`MirrorTree`] is both
//! the registry (source identity to mirror node) and the mutator (geometry,
//! visibility and parent changes). Two passes sit on top of it:
//!
//! - [`zorder`] restores strictly increasing Z along a sibling chain after a
//!   restack, reassigning only the nodes that violate the order.
//! - [`clip`] computes the area a node no longer covers after a resize or
//!   shape change and asks the display to clear it.
//!
//! # Stacking invariant
//!
//! Among siblings, a node stacked in front of another always has a
//! strictly greater Z once a create or restack event has been applied. Ties
//! are never left behind.

mod changes;
pub mod clip;
mod id;
mod store;
mod traverse;
pub mod zorder;

pub use changes::MirrorChanges;
pub use clip::ClipUpdate;
pub use id::{INVALID, MirrorRef, Opacity, SourceId};
pub use store::MirrorTree;
pub use traverse::{Ancestors, Children};
pub use zorder::{Restacked, ZAssignment};
