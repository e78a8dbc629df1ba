// Copyright 2026 the Mirage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! An in-memory host hierarchy.
//!
//! [`SourceTree`] follows X11 stacking rules: a created or reparented node
//! goes on top of its new siblings, and raise, lower and place-above move a
//! node within its sibling list. Sibling lists are stored back to front.

use std::collections::BTreeMap;

use mirage_core::host::SourceHierarchy;
use mirage_core::node::SourceId;
use mirage_core::region::{PixelRect, Region};

#[derive(Clone, Debug)]
struct SourceNode {
    parent: Option<SourceId>,
    children: Vec<SourceId>,
    rect: PixelRect,
    mapped: bool,
    shape: Option<Region>,
}

/// A host-owned tree of rectangular surfaces.
#[derive(Clone, Debug)]
pub struct SourceTree {
    nodes: BTreeMap<SourceId, SourceNode>,
    roots: Vec<SourceId>,
    next_id: u32,
}

impl Default for SourceTree {
    fn default() -> Self {
        Self::new()
    }
}

impl SourceTree {
    /// Creates an empty tree. Identifiers start at `0x200001`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: BTreeMap::new(),
            roots: Vec::new(),
            next_id: 0x20_0001,
        }
    }

    /// Adds an unmapped node on top of its siblings.
    ///
    /// # Panics
    ///
    /// Panics if `parent` is not in the tree.
    pub fn create(&mut self, parent: Option<SourceId>, rect: PixelRect) -> SourceId {
        let id = SourceId(self.next_id);
        self.next_id += 1;
        self.nodes.insert(
            id,
            SourceNode {
                parent,
                children: Vec::new(),
                rect,
                mapped: false,
                shape: None,
            },
        );
        self.siblings_mut(parent).push(id);
        id
    }

    /// Removes a childless node.
    ///
    /// # Panics
    ///
    /// Panics if `id` is unknown or still has children.
    pub fn remove(&mut self, id: SourceId) {
        let node = &self.nodes[&id];
        assert!(node.children.is_empty(), "{id} still has children");
        let parent = node.parent;
        self.siblings_mut(parent).retain(|&s| s != id);
        self.nodes.remove(&id);
    }

    /// Returns `true` if `id` is in the tree.
    #[must_use]
    pub fn contains(&self, id: SourceId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Returns the number of nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if the tree has no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterates over all node identifiers in ascending order.
    pub fn ids(&self) -> impl Iterator<Item = SourceId> + '_ {
        self.nodes.keys().copied()
    }

    /// Returns the children of `parent` (or the roots), back to front.
    #[must_use]
    pub fn siblings(&self, parent: Option<SourceId>) -> &[SourceId] {
        match parent {
            Some(p) => &self.nodes[&p].children,
            None => &self.roots,
        }
    }

    /// Returns the children of `id`, back to front.
    #[must_use]
    pub fn children(&self, id: SourceId) -> &[SourceId] {
        &self.nodes[&id].children
    }

    /// Returns `true` if `ancestor` is `id` or one of its ancestors.
    #[must_use]
    pub fn is_ancestor_or_self(&self, ancestor: SourceId, id: SourceId) -> bool {
        let mut current = Some(id);
        while let Some(n) = current {
            if n == ancestor {
                return true;
            }
            current = self.nodes[&n].parent;
        }
        false
    }

    /// Maps or unmaps a node.
    pub fn set_mapped(&mut self, id: SourceId, mapped: bool) {
        self.node_mut(id).mapped = mapped;
    }

    /// Sets a node's position and size.
    pub fn set_rect(&mut self, id: SourceId, rect: PixelRect) {
        self.node_mut(id).rect = rect;
    }

    /// Sets or clears a node's custom bounding shape (node-relative).
    pub fn set_shape(&mut self, id: SourceId, shape: Option<Region>) {
        self.node_mut(id).shape = shape;
    }

    /// Moves a node to the front of its siblings.
    pub fn raise(&mut self, id: SourceId) {
        let list = self.siblings_of_mut(id);
        list.retain(|&s| s != id);
        list.push(id);
    }

    /// Moves a node to the back of its siblings.
    pub fn lower(&mut self, id: SourceId) {
        let list = self.siblings_of_mut(id);
        list.retain(|&s| s != id);
        list.insert(0, id);
    }

    /// Places a node directly in front of `sibling`.
    ///
    /// # Panics
    ///
    /// Panics if the two nodes are not siblings.
    pub fn place_above(&mut self, id: SourceId, sibling: SourceId) {
        assert_eq!(
            self.nodes[&id].parent, self.nodes[&sibling].parent,
            "{id} and {sibling} are not siblings"
        );
        let list = self.siblings_of_mut(id);
        list.retain(|&s| s != id);
        let at = list
            .iter()
            .position(|&s| s == sibling)
            .map_or(list.len(), |i| i + 1);
        list.insert(at, id);
    }

    /// Moves a node under `new_parent` (or to the top level for `None`),
    /// on top of its new siblings.
    ///
    /// # Panics
    ///
    /// Panics if `new_parent` lies inside `id`'s subtree.
    pub fn reparent(&mut self, id: SourceId, new_parent: Option<SourceId>) {
        if let Some(p) = new_parent {
            assert!(
                !self.is_ancestor_or_self(id, p),
                "reparenting {id} under {p} would create a cycle"
            );
        }
        self.siblings_of_mut(id).retain(|&s| s != id);
        self.node_mut(id).parent = new_parent;
        self.siblings_mut(new_parent).push(id);
    }

    fn node_mut(&mut self, id: SourceId) -> &mut SourceNode {
        self.nodes
            .get_mut(&id)
            .unwrap_or_else(|| panic!("unknown source node {id}"))
    }

    fn siblings_mut(&mut self, parent: Option<SourceId>) -> &mut Vec<SourceId> {
        match parent {
            Some(p) => &mut self.node_mut(p).children,
            None => &mut self.roots,
        }
    }

    fn siblings_of_mut(&mut self, id: SourceId) -> &mut Vec<SourceId> {
        let parent = self.nodes[&id].parent;
        self.siblings_mut(parent)
    }

    fn position(&self, id: SourceId) -> usize {
        let list = self.siblings(self.nodes[&id].parent);
        list.iter()
            .position(|&s| s == id)
            .unwrap_or_else(|| panic!("{id} missing from its sibling list"))
    }
}

impl SourceHierarchy for SourceTree {
    fn parent(&self, id: SourceId) -> Option<SourceId> {
        self.nodes[&id].parent
    }

    fn next_sibling(&self, id: SourceId) -> Option<SourceId> {
        let list = self.siblings(self.nodes[&id].parent);
        self.position(id).checked_sub(1).map(|i| list[i])
    }

    fn prev_sibling(&self, id: SourceId) -> Option<SourceId> {
        let list = self.siblings(self.nodes[&id].parent);
        list.get(self.position(id) + 1).copied()
    }

    fn geometry(&self, id: SourceId) -> PixelRect {
        self.nodes[&id].rect
    }

    fn is_realized(&self, id: SourceId) -> bool {
        self.nodes[&id].mapped
    }

    /// The node's extent clipped by every ancestor's extent.
    fn clip_list(&self, id: SourceId) -> Region {
        let node = &self.nodes[&id];
        let extent = Region::from_rect(PixelRect::from_size(
            node.rect.width(),
            node.rect.height(),
        ));
        match node.parent {
            Some(p) => {
                let parent = self.clip_list(p);
                extent.intersect(&parent.translate(-node.rect.x0, -node.rect.y0))
            }
            None => extent,
        }
    }

    fn bounding_shape(&self, id: SourceId) -> Option<Region> {
        self.nodes[&id].shape.clone()
    }
}
