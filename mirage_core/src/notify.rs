// Copyright 2026 the Mirage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dirty notification.
//!
//! The [`Notifier`] decides when the remote display is told that the mirror
//! tree changed. It never batches across host events: under
//! [`NotifyPolicy::PerEvent`] a pending notification is flushed when the
//! event that caused it ends.

use crate::config::NotifyPolicy;
use crate::display::RemoteDisplay;

/// Issues [`touch`](RemoteDisplay::touch) calls according to a
/// [`NotifyPolicy`].
#[derive(Clone, Copy, Debug, Default)]
pub struct Notifier {
    policy: NotifyPolicy,
    pending: bool,
    delivered: u64,
}

impl Notifier {
    /// Creates a notifier with the given policy.
    #[must_use]
    pub fn new(policy: NotifyPolicy) -> Self {
        Self {
            policy,
            pending: false,
            delivered: 0,
        }
    }

    /// Returns the active policy.
    #[must_use]
    pub fn policy(&self) -> NotifyPolicy {
        self.policy
    }

    /// Returns the number of touches delivered so far.
    #[must_use]
    pub fn delivered(&self) -> u64 {
        self.delivered
    }

    /// Records that one node's mutation has completed.
    ///
    /// Returns `true` if a touch was delivered immediately.
    pub fn node_changed<D: RemoteDisplay + ?Sized>(&mut self, display: &mut D) -> bool {
        match self.policy {
            NotifyPolicy::PerNode => {
                self.touch(display);
                true
            }
            NotifyPolicy::PerEvent => {
                self.pending = true;
                false
            }
        }
    }

    /// Flushes a pending notification at the end of a host event.
    ///
    /// Returns `true` if a touch was delivered.
    pub fn end_event<D: RemoteDisplay + ?Sized>(&mut self, display: &mut D) -> bool {
        if core::mem::take(&mut self.pending) {
            self.touch(display);
            true
        } else {
            false
        }
    }

    /// Delivers a touch unconditionally.
    ///
    /// Touching without an intervening mutation changes no mirror state.
    pub fn touch<D: RemoteDisplay + ?Sized>(&mut self, display: &mut D) {
        display.touch();
        self.delivered += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::NullDisplay;

    #[test]
    fn per_node_touches_immediately() {
        let mut display = NullDisplay::new();
        let mut n = Notifier::new(NotifyPolicy::PerNode);
        assert!(n.node_changed(&mut display));
        assert!(n.node_changed(&mut display));
        assert!(!n.end_event(&mut display));
        assert_eq!(display.touches(), 2);
        assert_eq!(n.delivered(), 2);
    }

    #[test]
    fn per_event_coalesces() {
        let mut display = NullDisplay::new();
        let mut n = Notifier::new(NotifyPolicy::PerEvent);
        assert!(!n.node_changed(&mut display));
        assert!(!n.node_changed(&mut display));
        assert_eq!(display.touches(), 0);
        assert!(n.end_event(&mut display));
        assert!(!n.end_event(&mut display), "nothing pending after flush");
        assert_eq!(display.touches(), 1);
    }

    #[test]
    fn redundant_touches_are_all_delivered() {
        let mut display = NullDisplay::new();
        let mut n = Notifier::new(NotifyPolicy::PerEvent);
        n.touch(&mut display);
        n.touch(&mut display);
        n.touch(&mut display);
        assert_eq!(display.touches(), 3);
    }
}
