// Copyright 2026 the Mirage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Struct-of-arrays mirror storage: registry, topology and mutation.

use alloc::collections::BTreeMap;
use alloc::collections::TryReserveError;
use alloc::vec::Vec;

use understory_dirty::{CycleHandling, DirtyTracker, EagerPolicy};

use super::id::{INVALID, MirrorRef, Opacity, SourceId};
use super::traverse::{Ancestors, Children};
use crate::dirty;
use crate::display::{LayerInit, RemoteDisplay};
use crate::error::SyncError;
use crate::region::{PixelRect, Region};

/// Struct-of-arrays storage for all mirror nodes of one screen.
///
/// The tree is the single source of truth for "does this source node have a
/// live mirror": [`lookup`](Self::lookup) maps a [`SourceId`] to the
/// [`MirrorRef`] created for it. Destroyed nodes are recycled via a free
/// list, and generation counters make stale handles detectable.
///
/// Every mutator updates the tree first, then forwards the same mutation to
/// the [`RemoteDisplay`], then marks the matching [`dirty`] channel. None of
/// them touch the display; that is the dispatcher's job.
#[derive(Debug)]
pub struct MirrorTree {
    // -- Topology --
    pub(crate) parent: Vec<u32>,
    pub(crate) first_child: Vec<u32>,
    pub(crate) next_sibling: Vec<u32>,
    pub(crate) prev_sibling: Vec<u32>,

    // -- Mirrored properties --
    pub(crate) source: Vec<SourceId>,
    pub(crate) z: Vec<i32>,
    pub(crate) rect: Vec<PixelRect>,
    pub(crate) opacity: Vec<Opacity>,
    pub(crate) clip_region: Vec<Region>,

    // -- Allocation --
    pub(crate) generation: Vec<u32>,
    pub(crate) live: Vec<bool>,
    pub(crate) free_list: Vec<u32>,
    pub(crate) len: u32,
    pub(crate) live_count: u32,
    pub(crate) max_nodes: Option<u32>,

    // -- Registry --
    pub(crate) index: BTreeMap<SourceId, u32>,

    // -- Dirty tracking --
    pub(crate) dirty: DirtyTracker<u32>,

    // -- Lifecycle tracking --
    pub(crate) pending_added: Vec<u32>,
    pub(crate) pending_removed: Vec<u32>,
}

impl Default for MirrorTree {
    fn default() -> Self {
        Self::new()
    }
}

impl MirrorTree {
    /// Creates an empty tree with no node limit.
    #[must_use]
    pub fn new() -> Self {
        Self {
            parent: Vec::new(),
            first_child: Vec::new(),
            next_sibling: Vec::new(),
            prev_sibling: Vec::new(),
            source: Vec::new(),
            z: Vec::new(),
            rect: Vec::new(),
            opacity: Vec::new(),
            clip_region: Vec::new(),
            generation: Vec::new(),
            live: Vec::new(),
            free_list: Vec::new(),
            len: 0,
            live_count: 0,
            max_nodes: None,
            index: BTreeMap::new(),
            dirty: DirtyTracker::with_cycle_handling(CycleHandling::Error),
            pending_added: Vec::new(),
            pending_removed: Vec::new(),
        }
    }

    /// Creates an empty tree that refuses to hold more than `max_nodes`
    /// live nodes.
    #[must_use]
    pub fn with_max_nodes(max_nodes: u32) -> Self {
        Self {
            max_nodes: Some(max_nodes),
            ..Self::new()
        }
    }

    // -- Registry API --

    /// Creates the mirror node for source node `id`.
    ///
    /// The node is attached as the last child of `parent` (or becomes a root)
    /// with the given geometry, stacking index and opacity, and a remote
    /// layer is requested from `display`.
    ///
    /// # Errors
    ///
    /// - [`SyncError::AlreadyMirrored`] if `id` already has a live mirror.
    /// - [`SyncError::AllocationFailure`] if the node limit is reached, the
    ///   arena cannot grow, or the display refuses the layer. Nothing is
    ///   left behind in that case.
    ///
    /// # Panics
    ///
    /// Panics if `parent` is a stale handle.
    pub fn create<D: RemoteDisplay + ?Sized>(
        &mut self,
        display: &mut D,
        id: SourceId,
        parent: Option<MirrorRef>,
        rect: PixelRect,
        z: i32,
        opacity: Opacity,
    ) -> Result<MirrorRef, SyncError> {
        if self.index.contains_key(&id) {
            return Err(SyncError::AlreadyMirrored { id });
        }
        if let Some(p) = parent {
            self.validate(p);
        }
        if self.max_nodes.is_some_and(|max| self.live_count >= max) {
            return Err(SyncError::AllocationFailure { id });
        }

        let idx = if let Some(idx) = self.free_list.pop() {
            // Reuse a freed slot.
            let i = idx as usize;
            self.generation[i] += 1;
            self.parent[i] = INVALID;
            self.first_child[i] = INVALID;
            self.next_sibling[i] = INVALID;
            self.prev_sibling[i] = INVALID;
            self.source[i] = id;
            self.z[i] = z;
            self.rect[i] = rect;
            self.opacity[i] = opacity;
            self.clip_region[i] = Region::new();
            self.live[i] = true;
            idx
        } else {
            // Allocate a new slot.
            self.reserve_slot()
                .map_err(|_| SyncError::AllocationFailure { id })?;
            let idx = self.len;
            self.len += 1;
            self.parent.push(INVALID);
            self.first_child.push(INVALID);
            self.next_sibling.push(INVALID);
            self.prev_sibling.push(INVALID);
            self.source.push(id);
            self.z.push(z);
            self.rect.push(rect);
            self.opacity.push(opacity);
            self.clip_region.push(Region::new());
            self.generation.push(0);
            self.live.push(true);
            idx
        };
        let node = MirrorRef {
            idx,
            generation: self.generation[idx as usize],
        };

        let init = LayerInit {
            parent,
            rect,
            z,
            opacity,
        };
        if display.create_layer(node, &init).is_err() {
            self.release_slot(idx);
            return Err(SyncError::AllocationFailure { id });
        }

        if let Some(p) = parent {
            self.link_last(p.idx, idx);
        }
        self.index.insert(id, idx);
        self.live_count += 1;
        self.pending_added.push(idx);
        self.dirty.mark(idx, dirty::TOPOLOGY);

        Ok(node)
    }

    /// Destroys the mirror node for source node `id`.
    ///
    /// # Errors
    ///
    /// - [`SyncError::UnknownNode`] if `id` has no live mirror.
    /// - [`SyncError::LiveChildren`] if the node still has mirrored
    ///   children. The node is left untouched.
    pub fn destroy<D: RemoteDisplay + ?Sized>(
        &mut self,
        display: &mut D,
        id: SourceId,
    ) -> Result<(), SyncError> {
        let node = self.lookup(id)?;
        let idx = node.idx;
        let children = self.children(node).count();
        if children > 0 {
            return Err(SyncError::LiveChildren { id, children });
        }

        let parent = self.parent[idx as usize];
        if parent != INVALID {
            self.unlink_from_parent(idx);
            self.dirty.mark(parent, dirty::TOPOLOGY);
        }

        // Remove dirty tracking dependencies.
        self.dirty.remove_key(idx);

        self.index.remove(&id);
        self.live_count -= 1;
        self.release_slot(idx);
        self.pending_removed.push(idx);

        display.destroy_layer(node);
        Ok(())
    }

    /// Returns the live mirror for source node `id`.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::UnknownNode`] if `id` has not been created or
    /// has already been destroyed.
    pub fn lookup(&self, id: SourceId) -> Result<MirrorRef, SyncError> {
        self.get(id).ok_or(SyncError::UnknownNode { id })
    }

    /// Returns the live mirror for source node `id`, if any.
    #[must_use]
    pub fn get(&self, id: SourceId) -> Option<MirrorRef> {
        self.index.get(&id).map(|&idx| MirrorRef {
            idx,
            generation: self.generation[idx as usize],
        })
    }

    /// Returns `true` if source node `id` has a live mirror.
    #[must_use]
    pub fn contains(&self, id: SourceId) -> bool {
        self.index.contains_key(&id)
    }

    /// Returns whether the given handle refers to a live node.
    #[must_use]
    pub fn is_alive(&self, node: MirrorRef) -> bool {
        node.idx < self.len
            && self.generation[node.idx as usize] == node.generation
            && self.live[node.idx as usize]
    }

    /// Returns the number of live nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.live_count as usize
    }

    /// Returns `true` if the tree holds no live nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.live_count == 0
    }

    /// Returns the source identities of all live nodes, in ascending order.
    pub fn source_ids(&self) -> impl Iterator<Item = SourceId> + '_ {
        self.index.keys().copied()
    }

    // -- Topology queries --

    /// Returns the parent of a node, if any.
    #[must_use]
    pub fn parent(&self, node: MirrorRef) -> Option<MirrorRef> {
        self.validate(node);
        self.handle_at(self.parent[node.idx as usize])
    }

    /// Returns an iterator over the direct children of a node, in attachment
    /// order (not stacking order; see
    /// [`stacking_order`](Self::stacking_order)).
    #[must_use]
    pub fn children(&self, node: MirrorRef) -> Children<'_> {
        self.validate(node);
        Children::new(self, self.first_child[node.idx as usize])
    }

    /// Returns all live nodes without a parent.
    #[must_use]
    pub fn roots(&self) -> Vec<MirrorRef> {
        (0..self.len)
            .filter(|&idx| self.live[idx as usize] && self.parent[idx as usize] == INVALID)
            .filter_map(|idx| self.handle_at(idx))
            .collect()
    }

    /// Returns an iterator over `node` and its ancestors, nearest first.
    #[must_use]
    pub fn ancestors(&self, node: MirrorRef) -> Ancestors<'_> {
        self.validate(node);
        Ancestors::new(self, node.idx)
    }

    /// Returns `true` if `ancestor` is `node` or one of its ancestors.
    #[must_use]
    pub fn is_ancestor_or_self(&self, ancestor: MirrorRef, node: MirrorRef) -> bool {
        self.validate(ancestor);
        self.ancestors(node).any(|n| n == ancestor)
    }

    // -- Property getters (read-only, no dirty marking) --

    /// Returns the source identity a node mirrors.
    #[must_use]
    pub fn source_id(&self, node: MirrorRef) -> SourceId {
        self.validate(node);
        self.source[node.idx as usize]
    }

    /// Returns the stacking index of a node among its siblings.
    #[must_use]
    pub fn z(&self, node: MirrorRef) -> i32 {
        self.validate(node);
        self.z[node.idx as usize]
    }

    /// Returns the position (relative to the parent) and size of a node.
    #[must_use]
    pub fn rect(&self, node: MirrorRef) -> PixelRect {
        self.validate(node);
        self.rect[node.idx as usize]
    }

    /// Returns the visibility of a node.
    #[must_use]
    pub fn opacity(&self, node: MirrorRef) -> Opacity {
        self.validate(node);
        self.opacity[node.idx as usize]
    }

    /// Returns the node-relative area excluded from the node's visible
    /// surface, as of the last clip update.
    #[must_use]
    pub fn clip_region(&self, node: MirrorRef) -> &Region {
        self.validate(node);
        &self.clip_region[node.idx as usize]
    }

    // -- Raw-index accessors for collaborators --
    //
    // These accept raw slot indices (as found in `MirrorChanges`) rather
    // than `MirrorRef` handles.

    /// Returns the handle for raw slot `idx` if it holds a live node.
    #[must_use]
    pub fn handle_at(&self, idx: u32) -> Option<MirrorRef> {
        (idx < self.len && self.live[idx as usize]).then(|| MirrorRef {
            idx,
            generation: self.generation[idx as usize],
        })
    }

    /// Returns the source identity at raw slot `idx`.
    ///
    /// # Panics
    ///
    /// Panics if `idx >= self.len`.
    #[must_use]
    pub fn source_at(&self, idx: u32) -> SourceId {
        assert!(
            idx < self.len,
            "slot index {idx} out of range (len {})",
            self.len
        );
        self.source[idx as usize]
    }

    /// Returns the rectangle at raw slot `idx`.
    ///
    /// # Panics
    ///
    /// Panics if `idx >= self.len`.
    #[must_use]
    pub fn rect_at(&self, idx: u32) -> PixelRect {
        assert!(
            idx < self.len,
            "slot index {idx} out of range (len {})",
            self.len
        );
        self.rect[idx as usize]
    }

    // -- Mutation API (forwards to the display, auto-marks dirty) --

    /// Moves a node to `(x, y)` relative to its parent.
    pub fn move_node<D: RemoteDisplay + ?Sized>(
        &mut self,
        display: &mut D,
        node: MirrorRef,
        x: i32,
        y: i32,
    ) {
        self.validate(node);
        let i = node.idx as usize;
        let old = self.rect[i];
        self.rect[i] = PixelRect::new(x, y, old.width(), old.height());
        display.move_layer(node, x, y);
        self.dirty.mark_with(node.idx, dirty::GEOMETRY, &EagerPolicy);
    }

    /// Resizes a node, keeping its position. Returns the previous rectangle.
    pub fn resize<D: RemoteDisplay + ?Sized>(
        &mut self,
        display: &mut D,
        node: MirrorRef,
        width: u32,
        height: u32,
    ) -> PixelRect {
        self.validate(node);
        let i = node.idx as usize;
        let old = self.rect[i];
        self.rect[i] = PixelRect::new(old.x0, old.y0, width, height);
        display.resize_layer(node, width, height);
        self.dirty.mark_with(node.idx, dirty::GEOMETRY, &EagerPolicy);
        old
    }

    /// Attaches `node` as the last child of `new_parent`, or detaches it
    /// to the top level when `new_parent` is `None`.
    ///
    /// Only the parent link changes: Z, position and size are preserved.
    /// Restratifying Z against the new siblings is a separate restack.
    ///
    /// # Panics
    ///
    /// Panics if either handle is stale or if `new_parent` lies inside
    /// `node`'s subtree.
    pub fn reparent<D: RemoteDisplay + ?Sized>(
        &mut self,
        display: &mut D,
        node: MirrorRef,
        new_parent: Option<MirrorRef>,
    ) {
        self.validate(node);
        if let Some(p) = new_parent {
            assert!(
                !self.is_ancestor_or_self(node, p),
                "reparent would create a cycle"
            );
        }
        let c = node.idx;
        let old_p = self.parent[c as usize];
        if old_p != INVALID {
            self.unlink_from_parent(c);
            self.dirty.mark(old_p, dirty::TOPOLOGY);
        }
        match new_parent {
            Some(p) => self.link_last(p.idx, c),
            None => {
                // A root inherits nothing; its absolute geometry and
                // effective visibility are its own from now on.
                self.dirty.mark_with(c, dirty::GEOMETRY, &EagerPolicy);
                self.dirty.mark_with(c, dirty::OPACITY, &EagerPolicy);
                self.dirty.mark(c, dirty::TOPOLOGY);
            }
        }
        display.reparent_layer(node, new_parent);
    }

    /// Shows or hides a node.
    pub fn set_opacity<D: RemoteDisplay + ?Sized>(
        &mut self,
        display: &mut D,
        node: MirrorRef,
        opacity: Opacity,
    ) {
        self.validate(node);
        self.opacity[node.idx as usize] = opacity;
        display.shade_layer(node, opacity);
        self.dirty.mark_with(node.idx, dirty::OPACITY, &EagerPolicy);
    }

    /// Sets the stacking index of a node.
    pub fn restack<D: RemoteDisplay + ?Sized>(&mut self, display: &mut D, node: MirrorRef, z: i32) {
        self.validate(node);
        self.z[node.idx as usize] = z;
        display.restack_layer(node, z);
        self.dirty.mark(node.idx, dirty::STACKING);
    }

    // -- Internal helpers --

    /// Panics if the handle is stale.
    pub(crate) fn validate(&self, node: MirrorRef) {
        assert!(
            self.is_alive(node),
            "stale MirrorRef: {node:?} (current gen: {})",
            if node.idx < self.len {
                self.generation[node.idx as usize]
            } else {
                u32::MAX
            }
        );
    }

    /// Grows every per-slot array by one element's capacity.
    fn reserve_slot(&mut self) -> Result<(), TryReserveError> {
        self.parent.try_reserve(1)?;
        self.first_child.try_reserve(1)?;
        self.next_sibling.try_reserve(1)?;
        self.prev_sibling.try_reserve(1)?;
        self.source.try_reserve(1)?;
        self.z.try_reserve(1)?;
        self.rect.try_reserve(1)?;
        self.opacity.try_reserve(1)?;
        self.clip_region.try_reserve(1)?;
        self.generation.try_reserve(1)?;
        self.live.try_reserve(1)?;
        self.free_list.try_reserve(1)?;
        Ok(())
    }

    /// Returns a detached slot to the free list and invalidates its handles.
    fn release_slot(&mut self, idx: u32) {
        let i = idx as usize;
        self.generation[i] += 1;
        self.live[i] = false;
        self.clip_region[i] = Region::new();
        self.free_list.push(idx);
    }

    /// Appends `c` to `p`'s child list and wires inherited dirty channels.
    fn link_last(&mut self, p: u32, c: u32) {
        self.parent[c as usize] = p;
        self.prev_sibling[c as usize] = INVALID;
        self.next_sibling[c as usize] = INVALID;

        if self.first_child[p as usize] == INVALID {
            self.first_child[p as usize] = c;
        } else {
            // Walk to last child.
            let mut last = self.first_child[p as usize];
            while self.next_sibling[last as usize] != INVALID {
                last = self.next_sibling[last as usize];
            }
            self.next_sibling[last as usize] = c;
            self.prev_sibling[c as usize] = last;
        }

        // Child depends on parent for GEOMETRY and OPACITY.
        let _ = self.dirty.add_dependency(c, p, dirty::GEOMETRY);
        let _ = self.dirty.add_dependency(c, p, dirty::OPACITY);

        self.dirty.mark_with(c, dirty::GEOMETRY, &EagerPolicy);
        self.dirty.mark_with(c, dirty::OPACITY, &EagerPolicy);
        self.dirty.mark(p, dirty::TOPOLOGY);
    }

    /// Removes `idx` from its parent's child list and drops the inherited
    /// dependency edges.
    fn unlink_from_parent(&mut self, idx: u32) {
        let p = self.parent[idx as usize];
        let prev = self.prev_sibling[idx as usize];
        let next = self.next_sibling[idx as usize];

        if prev != INVALID {
            self.next_sibling[prev as usize] = next;
        } else {
            // Was first child.
            self.first_child[p as usize] = next;
        }

        if next != INVALID {
            self.prev_sibling[next as usize] = prev;
        }

        self.dirty.remove_dependency(idx, p, dirty::GEOMETRY);
        self.dirty.remove_dependency(idx, p, dirty::OPACITY);

        self.parent[idx as usize] = INVALID;
        self.prev_sibling[idx as usize] = INVALID;
        self.next_sibling[idx as usize] = INVALID;
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::*;
    use crate::display::{LayerPoolExhausted, NullDisplay};

    fn rect() -> PixelRect {
        PixelRect::new(0, 0, 10, 10)
    }

    fn create(tree: &mut MirrorTree, id: u32, parent: Option<MirrorRef>, z: i32) -> MirrorRef {
        tree.create(&mut NullDisplay::new(), SourceId(id), parent, rect(), z, Opacity::Shown)
            .unwrap()
    }

    #[test]
    fn create_lookup_destroy() {
        let mut tree = MirrorTree::new();
        let node = create(&mut tree, 1, None, 0);
        assert_eq!(tree.lookup(SourceId(1)), Ok(node));
        assert!(tree.is_alive(node));

        tree.destroy(&mut NullDisplay::new(), SourceId(1)).unwrap();
        assert_eq!(
            tree.lookup(SourceId(1)),
            Err(SyncError::UnknownNode { id: SourceId(1) })
        );
        assert!(!tree.is_alive(node));
        assert!(tree.is_empty());
    }

    #[test]
    fn generation_prevents_stale_access() {
        let mut tree = MirrorTree::new();
        let a = create(&mut tree, 1, None, 0);
        tree.destroy(&mut NullDisplay::new(), SourceId(1)).unwrap();
        let b = create(&mut tree, 2, None, 0);
        // b reuses the same slot but has a different generation.
        assert_eq!(a.idx, b.idx);
        assert_ne!(a.generation, b.generation);
        assert!(!tree.is_alive(a));
        assert!(tree.is_alive(b));
    }

    #[test]
    fn duplicate_create_is_rejected() {
        let mut tree = MirrorTree::new();
        create(&mut tree, 1, None, 0);
        let err = tree
            .create(&mut NullDisplay::new(), SourceId(1), None, rect(), 0, Opacity::Shown)
            .unwrap_err();
        assert_eq!(err, SyncError::AlreadyMirrored { id: SourceId(1) });
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn node_limit_is_allocation_failure() {
        let mut tree = MirrorTree::with_max_nodes(1);
        create(&mut tree, 1, None, 0);
        let err = tree
            .create(&mut NullDisplay::new(), SourceId(2), None, rect(), 0, Opacity::Shown)
            .unwrap_err();
        assert_eq!(err, SyncError::AllocationFailure { id: SourceId(2) });
        assert!(!tree.contains(SourceId(2)));
    }

    #[test]
    fn refused_layer_rolls_back() {
        struct Refusing(NullDisplay);
        impl RemoteDisplay for Refusing {
            fn create_layer(
                &mut self,
                _node: MirrorRef,
                _init: &LayerInit,
            ) -> Result<(), LayerPoolExhausted> {
                Err(LayerPoolExhausted)
            }
            fn destroy_layer(&mut self, node: MirrorRef) {
                self.0.destroy_layer(node);
            }
            fn move_layer(&mut self, node: MirrorRef, x: i32, y: i32) {
                self.0.move_layer(node, x, y);
            }
            fn resize_layer(&mut self, node: MirrorRef, width: u32, height: u32) {
                self.0.resize_layer(node, width, height);
            }
            fn restack_layer(&mut self, node: MirrorRef, z: i32) {
                self.0.restack_layer(node, z);
            }
            fn reparent_layer(&mut self, node: MirrorRef, parent: Option<MirrorRef>) {
                self.0.reparent_layer(node, parent);
            }
            fn shade_layer(&mut self, node: MirrorRef, opacity: Opacity) {
                self.0.shade_layer(node, opacity);
            }
            fn clear_region(&mut self, node: MirrorRef, region: &Region, bounds: PixelRect) {
                self.0.clear_region(node, region, bounds);
            }
            fn touch(&mut self) {
                self.0.touch();
            }
        }

        let mut tree = MirrorTree::new();
        let root = create(&mut tree, 1, None, 0);
        let err = tree
            .create(
                &mut Refusing(NullDisplay::new()),
                SourceId(2),
                Some(root),
                rect(),
                0,
                Opacity::Shown,
            )
            .unwrap_err();
        assert_eq!(err, SyncError::AllocationFailure { id: SourceId(2) });
        assert!(tree.children(root).next().is_none(), "no dangling child");
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn children_in_attachment_order() {
        let mut tree = MirrorTree::new();
        let root = create(&mut tree, 1, None, 0);
        let a = create(&mut tree, 2, Some(root), 0);
        let b = create(&mut tree, 3, Some(root), 1);

        assert_eq!(tree.parent(a), Some(root));
        let kids: Vec<_> = tree.children(root).collect();
        assert_eq!(kids, vec![a, b]);
        assert_eq!(tree.roots(), vec![root]);
    }

    #[test]
    fn destroy_with_children_is_refused() {
        let mut tree = MirrorTree::new();
        let root = create(&mut tree, 1, None, 0);
        let child = create(&mut tree, 2, Some(root), 0);

        let err = tree.destroy(&mut NullDisplay::new(), SourceId(1)).unwrap_err();
        assert_eq!(
            err,
            SyncError::LiveChildren {
                id: SourceId(1),
                children: 1
            }
        );
        assert!(tree.is_alive(root));
        assert_eq!(tree.parent(child), Some(root));
    }

    #[test]
    fn destroy_unlinks_from_parent() {
        let mut tree = MirrorTree::new();
        let root = create(&mut tree, 1, None, 0);
        let a = create(&mut tree, 2, Some(root), 0);
        let b = create(&mut tree, 3, Some(root), 1);
        let c = create(&mut tree, 4, Some(root), 2);

        tree.destroy(&mut NullDisplay::new(), SourceId(3)).unwrap();
        let kids: Vec<_> = tree.children(root).collect();
        assert_eq!(kids, vec![a, c]);
        assert!(!tree.is_alive(b));
    }

    #[test]
    fn reparent_changes_only_parent() {
        let mut tree = MirrorTree::new();
        let p1 = create(&mut tree, 1, None, 0);
        let p2 = create(&mut tree, 2, None, 1);
        let child = create(&mut tree, 3, Some(p1), 7);
        tree.move_node(&mut NullDisplay::new(), child, 4, 5);

        let (z, r) = (tree.z(child), tree.rect(child));
        tree.reparent(&mut NullDisplay::new(), child, Some(p2));

        assert_eq!(tree.parent(child), Some(p2));
        assert!(tree.children(p1).next().is_none());
        assert_eq!(tree.z(child), z);
        assert_eq!(tree.rect(child), r);
    }

    #[test]
    fn reparent_to_top_level_detaches() {
        let mut tree = MirrorTree::new();
        let root = create(&mut tree, 1, None, 0);
        let p = create(&mut tree, 2, Some(root), 0);
        let a = create(&mut tree, 3, Some(p), 4);
        let _ = tree.take_changes();

        tree.reparent(&mut NullDisplay::new(), a, None);
        assert_eq!(tree.parent(a), None);
        assert!(tree.children(p).next().is_none());
        assert_eq!(tree.roots(), vec![root, a]);
        assert_eq!(tree.z(a), 4);
        let changes = tree.take_changes();
        assert!(changes.topology_changed);
        assert!(changes.geometry.contains(&a.index()));

        // The former descendant can now take its old ancestor as a child.
        tree.reparent(&mut NullDisplay::new(), p, Some(a));
        assert_eq!(tree.parent(p), Some(a));
        assert!(tree.children(root).next().is_none());
    }

    #[test]
    #[should_panic(expected = "reparent would create a cycle")]
    fn reparent_into_own_subtree_panics() {
        let mut tree = MirrorTree::new();
        let a = create(&mut tree, 1, None, 0);
        let b = create(&mut tree, 2, Some(a), 0);
        tree.reparent(&mut NullDisplay::new(), a, Some(b));
    }

    #[test]
    fn move_and_resize_update_geometry() {
        let mut tree = MirrorTree::new();
        let node = create(&mut tree, 1, None, 0);
        tree.move_node(&mut NullDisplay::new(), node, -3, 8);
        let old = tree.resize(&mut NullDisplay::new(), node, 40, 20);
        assert_eq!(old, PixelRect::new(-3, 8, 10, 10));
        assert_eq!(tree.rect(node), PixelRect::new(-3, 8, 40, 20));
    }

    #[test]
    #[should_panic(expected = "stale MirrorRef")]
    fn destroyed_handle_panics_on_z() {
        let mut tree = MirrorTree::new();
        let node = create(&mut tree, 1, None, 0);
        tree.destroy(&mut NullDisplay::new(), SourceId(1)).unwrap();
        let _ = tree.z(node);
    }

    #[test]
    #[should_panic(expected = "stale MirrorRef")]
    fn destroyed_handle_panics_on_move() {
        let mut tree = MirrorTree::new();
        let node = create(&mut tree, 1, None, 0);
        tree.destroy(&mut NullDisplay::new(), SourceId(1)).unwrap();
        tree.move_node(&mut NullDisplay::new(), node, 1, 1);
    }
}
