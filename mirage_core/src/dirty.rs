// Copyright 2026 the Mirage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dirty-tracking channel constants.
//!
//! Every mirror mutation marks one channel (via [`understory_dirty`]) so the
//! remote-display collaborator can re-sample exactly the nodes that changed
//! after it receives a [`touch`](crate::display::RemoteDisplay::touch).
//!
//! # Propagation semantics
//!
//! - **Propagating**: [`GEOMETRY`] and [`OPACITY`] use
//!   [`EagerPolicy`](understory_dirty::EagerPolicy) and have dependency
//!   edges from child to parent. A node's absolute position and effective
//!   visibility depend on its ancestors, so marking a parent marks the
//!   whole subtree.
//!
//! - **Local-only**: [`STACKING`] and [`CLIP`] are marked with the default
//!   policy. Z values are compared among siblings only, and clip regions are
//!   node-relative.
//!
//! - **Structural**: [`TOPOLOGY`] is marked on create, destroy and
//!   reparent. It tells the collaborator its cached traversal order is stale.
//!
//! # Consumption
//!
//! [`MirrorTree::take_changes`](crate::node::MirrorTree::take_changes)
//! drains all channels and returns them as
//! [`MirrorChanges`](crate::node::MirrorChanges).

use understory_dirty::Channel;

/// Position or size changed; absolute geometry of descendants is stale.
pub const GEOMETRY: Channel = Channel::new(0);

/// Opacity changed; effective visibility of descendants is stale.
pub const OPACITY: Channel = Channel::new(1);

/// Z value changed; no propagation needed.
pub const STACKING: Channel = Channel::new(2);

/// Clip region changed or an excluded area was cleared.
pub const CLIP: Channel = Channel::new(3);

/// Tree topology changed.
pub const TOPOLOGY: Channel = Channel::new(4);
