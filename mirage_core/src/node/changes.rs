// Copyright 2026 the Mirage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Change draining for the remote-display collaborator.
//!
//! Mutations only mark dirty channels. [`MirrorTree::take_changes`] drains
//! them in one go, typically right after the collaborator receives a
//! `touch`:
//!
//! 1. **GEOMETRY** / **OPACITY**: Drain affected indices, including the
//!    descendants reached by eager propagation.
//! 2. **STACKING** / **CLIP**: Drain locally marked indices.
//! 3. **TOPOLOGY**: Drain and discard; lifecycle lists and the
//!    `topology_changed` flag carry the structural information.
//!
//! [`MirrorChanges`] uses raw slot indices (`u32`) rather than
//! [`MirrorRef`](super::MirrorRef) handles. A slot destroyed and reused
//! since the last drain appears in both [`removed`](MirrorChanges::removed)
//! and [`added`](MirrorChanges::added); consumers apply removals first.

use alloc::vec::Vec;

use super::store::MirrorTree;
use crate::dirty;

/// The set of changes accumulated since the previous
/// [`MirrorTree::take_changes`] call.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MirrorChanges {
    /// Nodes whose absolute geometry may have changed.
    pub geometry: Vec<u32>,
    /// Nodes whose effective visibility may have changed.
    pub opacities: Vec<u32>,
    /// Nodes whose Z changed.
    pub stacking: Vec<u32>,
    /// Nodes whose clip region was recomputed.
    pub clips: Vec<u32>,
    /// Nodes created since the last drain and still live, ascending.
    pub added: Vec<u32>,
    /// Slots destroyed since the last drain.
    pub removed: Vec<u32>,
    /// Whether any node was created, destroyed or reparented.
    pub topology_changed: bool,
}

impl MirrorChanges {
    /// Clears all change lists.
    pub fn clear(&mut self) {
        self.geometry.clear();
        self.opacities.clear();
        self.stacking.clear();
        self.clips.clear();
        self.added.clear();
        self.removed.clear();
        self.topology_changed = false;
    }

    /// Returns `true` if nothing changed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.geometry.is_empty()
            && self.opacities.is_empty()
            && self.stacking.is_empty()
            && self.clips.is_empty()
            && self.added.is_empty()
            && self.removed.is_empty()
            && !self.topology_changed
    }
}

impl MirrorTree {
    /// Drains all dirty channels and returns the accumulated changes.
    pub fn take_changes(&mut self) -> MirrorChanges {
        let mut changes = MirrorChanges::default();
        self.take_changes_into(&mut changes);
        changes
    }

    /// Like [`take_changes`](Self::take_changes), but reuses a
    /// caller-provided buffer.
    pub fn take_changes_into(&mut self, changes: &mut MirrorChanges) {
        changes.clear();

        let mut geometry: Vec<u32> = self
            .dirty
            .drain(dirty::GEOMETRY)
            .affected()
            .deterministic()
            .run()
            .collect();
        geometry.retain(|&idx| self.handle_at(idx).is_some());
        changes.geometry = geometry;

        let mut opacities: Vec<u32> = self
            .dirty
            .drain(dirty::OPACITY)
            .affected()
            .deterministic()
            .run()
            .collect();
        opacities.retain(|&idx| self.handle_at(idx).is_some());
        changes.opacities = opacities;

        let mut stacking: Vec<u32> = self
            .dirty
            .drain(dirty::STACKING)
            .deterministic()
            .run()
            .collect();
        stacking.retain(|&idx| self.handle_at(idx).is_some());
        changes.stacking = stacking;

        let mut clips: Vec<u32> = self
            .dirty
            .drain(dirty::CLIP)
            .deterministic()
            .run()
            .collect();
        clips.retain(|&idx| self.handle_at(idx).is_some());
        changes.clips = clips;

        let topology: Vec<u32> = self
            .dirty
            .drain(dirty::TOPOLOGY)
            .deterministic()
            .run()
            .collect();

        core::mem::swap(&mut self.pending_added, &mut changes.added);
        core::mem::swap(&mut self.pending_removed, &mut changes.removed);
        // A recycled slot appears in both lists; apply `removed` first.
        changes.added.retain(|&idx| self.handle_at(idx).is_some());
        changes.added.sort_unstable();
        changes.added.dedup();
        changes.topology_changed =
            !topology.is_empty() || !changes.added.is_empty() || !changes.removed.is_empty();
    }
}
