// Copyright 2026 the Mirage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Lazy Z-order reconciliation.
//!
//! Z values are not renumbered on every restack. Instead, a pass walks one
//! sibling chain from the backmost node toward the front, carrying the Z of
//! the node just behind as a baseline. A node whose Z is not strictly above
//! the baseline (ties included) is raised to `baseline + 1`; every other
//! node is left alone. The baseline then becomes the visited node's final Z.
//!
//! The backmost node anchors the walk and is never reassigned. A single
//! out-of-place node only cascades to the nodes in front of it that its new
//! value pushes out of order.
//!
//! ```text
//!   back ─────────────────────► front
//!   [5, 5, 5]        ──►  [5, 6, 7]
//!   [5, 9, 20]       ──►  unchanged
//!   [3, 1, 8, 2]     ──►  [3, 4, 8, 9]
//! ```

use alloc::vec::Vec;

use super::id::MirrorRef;
use super::store::MirrorTree;
use crate::display::RemoteDisplay;
use crate::error::SyncError;

/// One Z reassignment produced by [`plan_restack`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ZAssignment {
    /// Position in the back-to-front input slice.
    pub index: usize,
    /// The new Z value.
    pub z: i32,
}

/// One node whose Z was (or will be) reassigned by a restack pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Restacked {
    /// The reassigned node.
    pub node: MirrorRef,
    /// Z before the pass.
    pub old_z: i32,
    /// Z after the pass.
    pub new_z: i32,
}

/// Returns the Z for a node created directly in front of a sibling whose Z
/// is `behind`, or `0` if the node has no sibling behind it.
///
/// Returns `None` if the sibling already sits at `i32::MAX`: there is no
/// Z strictly above it.
#[must_use]
pub fn initial_z(behind: Option<i32>) -> Option<i32> {
    match behind {
        Some(z) => z.checked_add(1),
        None => Some(0),
    }
}

/// Computes the minimal set of reassignments that makes `back_to_front`
/// strictly increasing.
///
/// # Errors
///
/// Returns the index of the first node whose new Z would exceed `i32::MAX`.
/// No partial plan is returned in that case.
pub fn plan_restack(back_to_front: &[i32]) -> Result<Vec<ZAssignment>, usize> {
    let mut plan = Vec::new();
    let Some((&anchor, rest)) = back_to_front.split_first() else {
        return Ok(plan);
    };
    let mut baseline = anchor;
    for (offset, &z) in rest.iter().enumerate() {
        let index = offset + 1;
        if z <= baseline {
            let raised = baseline.checked_add(1).ok_or(index)?;
            plan.push(ZAssignment { index, z: raised });
            baseline = raised;
        } else {
            baseline = z;
        }
    }
    Ok(plan)
}

impl MirrorTree {
    /// Plans a restack pass over a sibling chain given back to front.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::StackingOverflow`] naming the first node that
    /// could not be raised.
    ///
    /// # Panics
    ///
    /// Panics if any handle is stale.
    pub fn plan_chain(&self, back_to_front: &[MirrorRef]) -> Result<Vec<Restacked>, SyncError> {
        let zs: Vec<i32> = back_to_front.iter().map(|&n| self.z(n)).collect();
        let plan = plan_restack(&zs).map_err(|index| SyncError::StackingOverflow {
            id: self.source_id(back_to_front[index]),
        })?;
        Ok(plan
            .into_iter()
            .map(|a| Restacked {
                node: back_to_front[a.index],
                old_z: zs[a.index],
                new_z: a.z,
            })
            .collect())
    }

    /// Runs a restack pass over a sibling chain given back to front and
    /// applies it. Returns the reassigned nodes, back to front.
    ///
    /// Nothing is applied if planning fails.
    ///
    /// # Errors
    ///
    /// See [`plan_chain`](Self::plan_chain).
    pub fn reconcile_chain<D: RemoteDisplay + ?Sized>(
        &mut self,
        display: &mut D,
        back_to_front: &[MirrorRef],
    ) -> Result<Vec<Restacked>, SyncError> {
        let plan = self.plan_chain(back_to_front)?;
        for r in &plan {
            self.restack(display, r.node, r.new_z);
        }
        Ok(plan)
    }

    /// Returns the children of `parent` (or the roots, for `None`) sorted
    /// back to front by Z. Ties keep attachment order.
    #[must_use]
    pub fn stacking_order(&self, parent: Option<MirrorRef>) -> Vec<MirrorRef> {
        let mut nodes: Vec<MirrorRef> = match parent {
            Some(p) => self.children(p).collect(),
            None => self.roots(),
        };
        nodes.sort_by_key(|&n| self.z(n));
        nodes
    }

    /// Returns `true` if Z strictly increases along `back_to_front`.
    #[must_use]
    pub fn is_strictly_stacked(&self, back_to_front: &[MirrorRef]) -> bool {
        back_to_front
            .windows(2)
            .all(|pair| self.z(pair[0]) < self.z(pair[1]))
    }
}
