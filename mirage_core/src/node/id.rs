// Copyright 2026 the Mirage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Source and mirror node identity types, plus the two-state opacity.

use core::fmt;

/// Sentinel value indicating "no node" in index fields.
pub const INVALID: u32 = u32::MAX;

/// The host's stable identity for a source node.
///
/// Source IDs are assigned by the host and treated as opaque. A given ID
/// names at most one live mirror node at a time.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SourceId(pub u32);

impl fmt::Debug for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SourceId({:#x})", self.0)
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// A handle to a live node in a [`MirrorTree`](super::MirrorTree).
///
/// Contains both a slot index and a generation counter so that stale handles
/// can be detected after a node is destroyed and the slot is reused.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct MirrorRef {
    /// Slot index into the tree's arrays.
    pub(crate) idx: u32,
    /// Generation counter; must match the tree's generation for this slot.
    pub(crate) generation: u32,
}

impl MirrorRef {
    /// Returns the raw slot index (for diagnostics and raw-index accessors).
    #[inline]
    #[must_use]
    pub const fn index(self) -> u32 {
        self.idx
    }

    /// Returns the generation counter.
    #[inline]
    #[must_use]
    pub const fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Debug for MirrorRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MirrorRef({}@gen{})", self.idx, self.generation)
    }
}

/// Visibility of a mirror node on the remote display.
///
/// Hosts only ever show or hide a surface outright, so opacity is binary.
/// [`as_alpha`](Self::as_alpha) gives the 8-bit value sent to the remote
/// display.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Opacity {
    /// Fully transparent (alpha 0).
    #[default]
    Hidden,
    /// Fully opaque (alpha 0xFF).
    Shown,
}

impl Opacity {
    /// Returns [`Shown`](Self::Shown) for realized surfaces, otherwise
    /// [`Hidden`](Self::Hidden).
    #[inline]
    #[must_use]
    pub const fn from_realized(realized: bool) -> Self {
        if realized { Self::Shown } else { Self::Hidden }
    }

    /// Returns the 8-bit alpha value for this opacity.
    #[inline]
    #[must_use]
    pub const fn as_alpha(self) -> u8 {
        match self {
            Self::Hidden => 0,
            Self::Shown => 0xFF,
        }
    }

    /// Returns `true` for [`Shown`](Self::Shown).
    #[inline]
    #[must_use]
    pub const fn is_shown(self) -> bool {
        matches!(self, Self::Shown)
    }
}
