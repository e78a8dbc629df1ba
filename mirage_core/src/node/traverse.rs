// Copyright 2026 the Mirage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Walking the mirror tree's intrusive links.
//!
//! Both iterators borrow the tree and read the slot arrays directly, so they
//! never allocate. Neither follows Z: [`Children`] yields nodes in the order
//! create and reparent attached them, and [`Ancestors`] climbs parent links
//! until it reaches a root.

use super::id::{INVALID, MirrorRef};
use super::store::MirrorTree;

/// The direct children of a mirror node, in attachment order.
///
/// Created by [`MirrorTree::children`]. Use
/// [`MirrorTree::stacking_order`] for back-to-front order.
#[derive(Debug)]
pub struct Children<'a> {
    tree: &'a MirrorTree,
    current: u32,
}

impl<'a> Children<'a> {
    pub(crate) fn new(tree: &'a MirrorTree, first: u32) -> Self {
        Self {
            tree,
            current: first,
        }
    }
}

impl Iterator for Children<'_> {
    type Item = MirrorRef;

    fn next(&mut self) -> Option<MirrorRef> {
        let idx = self.current;
        if idx == INVALID {
            return None;
        }
        self.current = self.tree.next_sibling[idx as usize];
        self.tree.handle_at(idx)
    }
}

/// A mirror node followed by each of its ancestors, ending at a root.
///
/// Created by [`MirrorTree::ancestors`].
#[derive(Debug)]
pub struct Ancestors<'a> {
    tree: &'a MirrorTree,
    current: u32,
}

impl<'a> Ancestors<'a> {
    pub(crate) fn new(tree: &'a MirrorTree, start: u32) -> Self {
        Self {
            tree,
            current: start,
        }
    }
}

impl Iterator for Ancestors<'_> {
    type Item = MirrorRef;

    fn next(&mut self) -> Option<MirrorRef> {
        let idx = self.current;
        if idx == INVALID {
            return None;
        }
        self.current = self.tree.parent[idx as usize];
        self.tree.handle_at(idx)
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;
    use alloc::vec::Vec;

    use crate::display::NullDisplay;
    use crate::node::{MirrorTree, Opacity, SourceId};
    use crate::region::PixelRect;

    #[test]
    fn ancestors_climb_to_the_root() {
        let mut display = NullDisplay::new();
        let mut tree = MirrorTree::new();
        let rect = PixelRect::from_size(4, 4);
        let root = tree
            .create(&mut display, SourceId(1), None, rect, 0, Opacity::Shown)
            .unwrap();
        let mid = tree
            .create(&mut display, SourceId(2), Some(root), rect, 0, Opacity::Shown)
            .unwrap();
        let leaf = tree
            .create(&mut display, SourceId(3), Some(mid), rect, 0, Opacity::Shown)
            .unwrap();

        let path: Vec<_> = tree.ancestors(leaf).collect();
        assert_eq!(path, vec![leaf, mid, root]);
        assert_eq!(tree.ancestors(root).count(), 1, "a root is its own path");
    }
}
