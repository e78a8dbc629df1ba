// Copyright 2026 the Mirage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Consistency checks between the source tree, the mirror tree and the
//! remote view.

use mirage_core::host::SourceHierarchy;
use mirage_core::node::{MirrorRef, MirrorTree, Opacity, SourceId};
use mirage_core::region::{PixelRect, Region};

use crate::display::RecordingDisplay;
use crate::source::SourceTree;

/// A disagreement found by [`check`].
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum Violation {
    /// A source node has no mirror.
    #[error("{id} exists in the source tree but has no mirror")]
    Missing {
        /// The unmirrored node.
        id: SourceId,
    },
    /// A mirror outlived its source node.
    #[error("{id} is mirrored but not in the source tree")]
    Orphan {
        /// The mirrored identifier.
        id: SourceId,
    },
    /// A mirror's parent differs from its source node's parent.
    #[error("mirror of {id} has parent {mirror:?}, host parent is {host:?}")]
    Parent {
        /// The node.
        id: SourceId,
        /// Parent according to the mirror tree.
        mirror: Option<SourceId>,
        /// Parent according to the source tree.
        host: Option<SourceId>,
    },
    /// Two adjacent siblings are not strictly stacked.
    #[error("{front} (z {front_z}) is in front of {behind} (z {behind_z})")]
    Stacking {
        /// The sibling behind.
        behind: SourceId,
        /// Its Z.
        behind_z: i32,
        /// The sibling in front.
        front: SourceId,
        /// Its Z.
        front_z: i32,
    },
    /// A mirror's geometry differs from its source node's.
    #[error("mirror of {id} is {mirror:?}, host has {host:?}")]
    Geometry {
        /// The node.
        id: SourceId,
        /// Geometry according to the mirror tree.
        mirror: PixelRect,
        /// Geometry according to the source tree.
        host: PixelRect,
    },
    /// A mirror's visibility differs from its source node's realized state.
    #[error("mirror of {id} is {mirror:?}, source realized is {realized}")]
    Visibility {
        /// The node.
        id: SourceId,
        /// Visibility according to the mirror tree.
        mirror: Opacity,
        /// Realized state of the source node.
        realized: bool,
    },
    /// A clip region reaches outside its node's extent.
    #[error("clip region of {id} extends outside its extent {extent:?}")]
    Clip {
        /// The node.
        id: SourceId,
        /// The node's extent.
        extent: PixelRect,
    },
    /// The remote view of a layer differs from the mirror.
    #[error("remote layer of {id} disagrees with the mirror on {field}")]
    Remote {
        /// The node.
        id: SourceId,
        /// Which property disagrees.
        field: &'static str,
    },
    /// The remote display holds layers the mirror tree does not.
    #[error("remote display holds {remote} layers for {mirrored} mirrors")]
    LayerCount {
        /// Live remote layers.
        remote: usize,
        /// Live mirror nodes.
        mirrored: usize,
    },
}

/// Verifies that `tree` mirrors `source` and that `remote` agrees with
/// `tree`.
///
/// Checks existence, parent links, strict sibling stacking, geometry,
/// visibility, and that clip regions lie within their node's extent.
///
/// # Errors
///
/// Returns the first [`Violation`] found.
pub fn check(
    source: &SourceTree,
    tree: &MirrorTree,
    remote: &RecordingDisplay,
) -> Result<(), Violation> {
    for id in tree.source_ids() {
        if !source.contains(id) {
            return Err(Violation::Orphan { id });
        }
    }

    for id in source.ids() {
        let node = tree.get(id).ok_or(Violation::Missing { id })?;

        let mirror_parent = tree.parent(node).map(|p| tree.source_id(p));
        let source_parent = source.parent(id);
        if mirror_parent != source_parent {
            return Err(Violation::Parent {
                id,
                mirror: mirror_parent,
                host: source_parent,
            });
        }

        let rect = tree.rect(node);
        if rect != source.geometry(id) {
            return Err(Violation::Geometry {
                id,
                mirror: rect,
                host: source.geometry(id),
            });
        }

        let realized = source.is_realized(id);
        if tree.opacity(node) != Opacity::from_realized(realized) {
            return Err(Violation::Visibility {
                id,
                mirror: tree.opacity(node),
                realized,
            });
        }

        let extent = PixelRect::from_size(rect.width(), rect.height());
        if !tree
            .clip_region(node)
            .subtract(&Region::from_rect(extent))
            .is_empty()
        {
            return Err(Violation::Clip { id, extent });
        }

        check_remote(tree, remote, id, node)?;
    }

    check_stacking(source, tree, None)?;
    for id in source.ids() {
        check_stacking(source, tree, Some(id))?;
    }

    if remote.layer_count() != tree.len() {
        return Err(Violation::LayerCount {
            remote: remote.layer_count(),
            mirrored: tree.len(),
        });
    }
    Ok(())
}

fn check_remote(
    tree: &MirrorTree,
    remote: &RecordingDisplay,
    id: SourceId,
    node: MirrorRef,
) -> Result<(), Violation> {
    let mismatch = |field| Err(Violation::Remote { id, field });
    let Some(layer) = remote.layer(node) else {
        return mismatch("existence");
    };
    if layer.parent != tree.parent(node) {
        return mismatch("parent");
    }
    if layer.rect != tree.rect(node) {
        return mismatch("geometry");
    }
    if layer.z != tree.z(node) {
        return mismatch("z");
    }
    if layer.opacity != tree.opacity(node) {
        return mismatch("opacity");
    }
    Ok(())
}

fn check_stacking(
    source: &SourceTree,
    tree: &MirrorTree,
    parent: Option<SourceId>,
) -> Result<(), Violation> {
    for pair in source.siblings(parent).windows(2) {
        let (behind, front) = (pair[0], pair[1]);
        let (Some(b), Some(f)) = (tree.get(behind), tree.get(front)) else {
            continue;
        };
        let (behind_z, front_z) = (tree.z(b), tree.z(f));
        if behind_z >= front_z {
            return Err(Violation::Stacking {
                behind,
                behind_z,
                front,
                front_z,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_trees_agree() {
        assert_eq!(
            check(&SourceTree::new(), &MirrorTree::new(), &RecordingDisplay::new()),
            Ok(())
        );
    }

    #[test]
    fn unmirrored_source_node_is_missing() {
        let mut source = SourceTree::new();
        let id = source.create(None, PixelRect::new(0, 0, 5, 5));
        assert_eq!(
            check(&source, &MirrorTree::new(), &RecordingDisplay::new()),
            Err(Violation::Missing { id })
        );
    }

    #[test]
    fn tied_siblings_are_reported() {
        let mut source = SourceTree::new();
        let mut tree = MirrorTree::new();
        let mut remote = RecordingDisplay::new();
        let rect = PixelRect::new(0, 0, 5, 5);
        let a = source.create(None, rect);
        let b = source.create(None, rect);
        tree.create(&mut remote, a, None, rect, 0, Opacity::Hidden)
            .unwrap();
        tree.create(&mut remote, b, None, rect, 0, Opacity::Hidden)
            .unwrap();

        assert_eq!(
            check(&source, &tree, &remote),
            Err(Violation::Stacking {
                behind: a,
                behind_z: 0,
                front: b,
                front_z: 0,
            })
        );
    }
}
