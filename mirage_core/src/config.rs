// Copyright 2026 the Mirage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Synchronization settings.

use crate::screen::ScreenId;

/// How often the remote display is touched while one host event is applied.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NotifyPolicy {
    /// One touch per affected node, issued as soon as that node's mutation
    /// completes. A restack that reassigns three siblings touches three
    /// times.
    #[default]
    PerNode,
    /// At most one touch per host event, issued after the whole event has
    /// been applied, and only if something changed.
    PerEvent,
}

/// Settings for a [`Dispatcher`](crate::dispatch::Dispatcher).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SyncConfig {
    /// Notification granularity.
    pub notify: NotifyPolicy,
    /// Maximum number of live mirror nodes, or `None` for no limit.
    ///
    /// Creating a node beyond the limit fails with
    /// [`SyncError::AllocationFailure`](crate::error::SyncError::AllocationFailure).
    pub max_nodes: Option<u32>,
    /// The screen this mirror tree belongs to.
    pub screen: ScreenId,
}

impl SyncConfig {
    /// Returns the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the notification policy.
    #[must_use]
    pub fn with_notify(mut self, notify: NotifyPolicy) -> Self {
        self.notify = notify;
        self
    }

    /// Sets the live node limit.
    #[must_use]
    pub fn with_max_nodes(mut self, max_nodes: u32) -> Self {
        self.max_nodes = Some(max_nodes);
        self
    }

    /// Sets the screen identifier.
    #[must_use]
    pub fn with_screen(mut self, screen: ScreenId) -> Self {
        self.screen = screen;
        self
    }
}
