// Copyright 2026 the Mirage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error types.
//!
//! Only a few failures ever reach the host. [`SyncError::UnknownNode`] is
//! produced by lookups, but the [`Dispatcher`](crate::dispatch::Dispatcher)
//! logs it and treats the event as a no-op. The one exception is a create
//! under an unmirrored parent: no node can be returned, so the error is.
//! Everything else is returned to the host unchanged.

use alloc::string::String;

use crate::node::SourceId;

/// Failure reported by the host's own chained handler.
///
/// The dispatcher never inspects, retries or masks these; they are returned
/// to the event's caller as [`SyncError::Delegate`].
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("chained handler failed: {reason}")]
pub struct DelegateError {
    reason: String,
}

impl DelegateError {
    /// Creates a delegate error with a human-readable reason.
    #[must_use]
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    /// Returns the reason given by the host.
    #[must_use]
    pub fn reason(&self) -> &str {
        &self.reason
    }
}

/// Errors produced while mirroring host events.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SyncError {
    /// A mirror node could not be allocated. Fatal for the enclosing
    /// operation: the host cannot render a realized surface without it.
    #[error("cannot allocate mirror node for source {id}")]
    AllocationFailure {
        /// The source node that needed a mirror.
        id: SourceId,
    },

    /// The event referenced a source node with no live mirror.
    #[error("source {id} has no live mirror node")]
    UnknownNode {
        /// The unknown source node.
        id: SourceId,
    },

    /// A create event arrived for a source node that is already mirrored.
    #[error("source {id} is already mirrored")]
    AlreadyMirrored {
        /// The duplicated source node.
        id: SourceId,
    },

    /// A destroy event arrived for a node whose mirrored children are
    /// still live. Children must be destroyed first.
    #[error("cannot destroy source {id}: {children} mirrored children still live")]
    LiveChildren {
        /// The node that was to be destroyed.
        id: SourceId,
        /// Number of live mirrored children.
        children: usize,
    },

    /// A Z value would have to exceed `i32::MAX`, either while restacking
    /// or when placing a new node in front of its sibling.
    #[error("stacking index overflow at source {id}")]
    StackingOverflow {
        /// The first node whose Z could not be raised.
        id: SourceId,
    },

    /// A reparent event would place a node inside its own mirrored
    /// subtree. The host and the mirror tree disagree about ancestry.
    #[error("cannot reparent source {id} under its own descendant {parent}")]
    ReparentCycle {
        /// The node being moved.
        id: SourceId,
        /// The requested parent.
        parent: SourceId,
    },

    /// The host's chained handler failed.
    #[error(transparent)]
    Delegate(#[from] DelegateError),
}
