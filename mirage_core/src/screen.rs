// Copyright 2026 the Mirage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Screen identification.
//!
//! Each host screen owns exactly one mirror tree. [`ScreenId`] tags trace
//! events and logs so that output from several screens can be told apart.

use core::fmt;

/// Identifies the host screen a mirror tree belongs to.
///
/// Hosts assign screen IDs; core code passes them through without
/// interpreting the value.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScreenId(pub u32);

impl fmt::Debug for ScreenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ScreenId({})", self.0)
    }
}

impl fmt::Display for ScreenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, ":{}", self.0)
    }
}
