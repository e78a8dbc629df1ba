// Copyright 2026 the Mirage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! End-to-end behavior of the dispatcher against the host model.

mod common;

use mirage_core::config::{NotifyPolicy, SyncConfig};
use mirage_core::display::NullDisplay;
use mirage_core::error::SyncError;
use mirage_core::node::{MirrorTree, Opacity};
use mirage_core::region::{PixelRect, Region};
use mirage_core::trace::EventOutcome;
use mirage_debug::recorder::{RecordedEvent, RecorderSink};
use mirage_sync_harness::{DisplayOp, SyncHarness};

fn screen() -> PixelRect {
    PixelRect::new(0, 0, 1024, 768)
}

fn window() -> PixelRect {
    PixelRect::new(10, 10, 100, 100)
}

#[test]
fn stacking_stays_strict_through_restacks() {
    common::init_logging();
    let mut h = SyncHarness::new();
    let root = h.create(None, screen()).unwrap();
    let wins: Vec<_> = (0..5)
        .map(|_| h.create(Some(root), window()).unwrap())
        .collect();
    h.check().unwrap();

    h.raise(wins[0]).unwrap();
    h.check().unwrap();
    h.lower(wins[4]).unwrap();
    h.check().unwrap();
    h.place_above(wins[1], wins[3]).unwrap();
    h.check().unwrap();
    h.raise(wins[2]).unwrap();
    h.check().unwrap();
}

#[test]
fn restack_pass_is_minimal() {
    let mut display = NullDisplay::new();
    let mut tree = MirrorTree::new();
    let nodes: Vec<_> = (1..=3)
        .map(|i| {
            tree.create(
                &mut display,
                mirage_core::SourceId(i),
                None,
                window(),
                0,
                Opacity::Shown,
            )
            .unwrap()
        })
        .collect();

    for &n in &nodes {
        tree.restack(&mut display, n, 5);
    }
    let applied = tree.reconcile_chain(&mut display, &nodes).unwrap();
    assert_eq!(applied.len(), 2);
    let zs: Vec<i32> = nodes.iter().map(|&n| tree.z(n)).collect();
    assert_eq!(zs, [5, 6, 7]);

    for (&n, z) in nodes.iter().zip([5, 9, 20]) {
        tree.restack(&mut display, n, z);
    }
    let applied = tree.reconcile_chain(&mut display, &nodes).unwrap();
    assert!(applied.is_empty(), "ordered chain is left alone");
    let zs: Vec<i32> = nodes.iter().map(|&n| tree.z(n)).collect();
    assert_eq!(zs, [5, 9, 20]);
}

#[test]
fn create_anchors_above_topmost_sibling() {
    let mut h = SyncHarness::new();
    let root = h.create(None, screen()).unwrap();
    assert_eq!(h.tree().z(h.mirror(root)), 0);

    let wins: Vec<_> = (0..4)
        .map(|_| h.create(Some(root), window()).unwrap())
        .collect();
    assert_eq!(h.tree().z(h.mirror(wins[0])), 0, "no sibling behind");
    assert_eq!(h.tree().z(h.mirror(wins[3])), 3);

    let top = h.create(Some(root), window()).unwrap();
    assert_eq!(h.tree().z(h.mirror(top)), 4);
}

#[test]
fn reparent_changes_only_the_parent() {
    let mut h = SyncHarness::new();
    let root = h.create(None, screen()).unwrap();
    let a = h.create(Some(root), window()).unwrap();
    let b = h.create(Some(root), PixelRect::new(40, 50, 30, 20)).unwrap();
    let node = h.mirror(b);
    let (z, rect) = (h.tree().z(node), h.tree().rect(node));
    h.display_mut().take_ops();

    h.reparent(b, Some(a)).unwrap();
    assert_eq!(h.tree().parent(node), Some(h.mirror(a)));
    assert_eq!(h.tree().z(node), z);
    assert_eq!(h.tree().rect(node), rect);
    assert_eq!(
        h.display().ops(),
        [
            DisplayOp::Reparent {
                node,
                parent: Some(h.mirror(a)),
            },
            DisplayOp::Touch,
        ]
    );
    h.check().unwrap();
}

#[test]
fn detached_node_can_adopt_its_former_ancestor() {
    let mut h = SyncHarness::new();
    let root = h.create(None, screen()).unwrap();
    let p = h.create(Some(root), window()).unwrap();
    let a = h.create(Some(p), PixelRect::new(5, 5, 20, 20)).unwrap();

    h.reparent(a, None).unwrap();
    assert_eq!(h.tree().parent(h.mirror(a)), None);
    assert_eq!(
        h.display().layer(h.mirror(a)).unwrap().parent,
        None,
        "remote layer is detached too"
    );
    h.restack(a).unwrap();
    h.check().unwrap();

    h.reparent(p, Some(a)).unwrap();
    h.restack(p).unwrap();
    assert_eq!(h.tree().parent(h.mirror(p)), Some(h.mirror(a)));
    h.check().unwrap();

    h.destroy(p).unwrap();
    h.destroy(a).unwrap();
    h.destroy(root).unwrap();
    assert!(h.tree().is_empty());
    h.check().unwrap();
}

#[test]
fn create_then_destroy_leaves_nothing_behind() {
    let mut h = SyncHarness::new();
    let root = h.create(None, screen()).unwrap();
    let win = h.create(Some(root), window()).unwrap();
    h.destroy(win).unwrap();

    assert_eq!(
        h.tree().lookup(win),
        Err(SyncError::UnknownNode { id: win })
    );
    assert_eq!(h.tree().children(h.mirror(root)).count(), 0);
    assert_eq!(h.display().layer_count(), 1);
    h.check().unwrap();
}

#[test]
fn shrinking_clears_the_vacated_band() {
    let mut h = SyncHarness::new();
    let root = h.create(None, screen()).unwrap();
    let win = h.create(Some(root), PixelRect::new(0, 0, 100, 100)).unwrap();
    h.display_mut().take_ops();

    h.resize(win, PixelRect::new(0, 0, 50, 50)).unwrap();
    let clear = h
        .display()
        .ops()
        .iter()
        .find_map(|op| match op {
            DisplayOp::Clear { region, bounds, .. } => Some((region.clone(), *bounds)),
            _ => None,
        })
        .expect("resize issues a clear");

    let expected = Region::from_rect(PixelRect::new(0, 0, 100, 100))
        .subtract(&Region::from_rect(PixelRect::new(0, 0, 50, 50)));
    assert!(!clear.0.is_empty());
    assert_eq!(clear.0, expected);
    assert_eq!(clear.1, PixelRect::new(0, 0, 100, 100));
    h.check().unwrap();
}

#[test]
fn resize_orders_move_resize_clear_touch() {
    let mut h = SyncHarness::new();
    let root = h.create(None, screen()).unwrap();
    let win = h.create(Some(root), window()).unwrap();
    h.display_mut().take_ops();

    h.resize(win, PixelRect::new(5, 5, 60, 60)).unwrap();
    let kinds: Vec<&str> = h
        .display()
        .ops()
        .iter()
        .map(|op| match op {
            DisplayOp::Move { .. } => "move",
            DisplayOp::Resize { .. } => "resize",
            DisplayOp::Clear { .. } => "clear",
            DisplayOp::Touch => "touch",
            _ => "other",
        })
        .collect();
    assert_eq!(kinds, ["move", "resize", "clear", "touch"]);
}

#[test]
fn repeated_touches_change_nothing() {
    let mut h = SyncHarness::new();
    let root = h.create(None, screen()).unwrap();
    h.create(Some(root), window()).unwrap();
    let _ = h.dispatcher_mut().take_changes();
    let before = h.display().touches();

    for _ in 0..3 {
        h.dispatcher_mut().touch();
    }
    assert_eq!(h.display().touches(), before + 3);
    assert!(h.dispatcher_mut().take_changes().is_empty());
    h.check().unwrap();
}

#[test]
fn destroying_a_parent_first_is_refused() {
    let mut h = SyncHarness::new();
    let root = h.create(None, screen()).unwrap();
    let win = h.create(Some(root), window()).unwrap();

    let err = h.destroy(root).unwrap_err();
    assert_eq!(
        err,
        SyncError::LiveChildren {
            id: root,
            children: 1
        }
    );
    h.check().unwrap();

    h.destroy(win).unwrap();
    h.destroy(root).unwrap();
    assert!(h.tree().is_empty());
    h.check().unwrap();
}

#[test]
fn visibility_follows_mapping() {
    let mut h = SyncHarness::new();
    let root = h.create(None, screen()).unwrap();
    let win = h.create(Some(root), window()).unwrap();
    assert_eq!(h.tree().opacity(h.mirror(win)), Opacity::Hidden);

    h.map(win).unwrap();
    assert_eq!(h.display().layer(h.mirror(win)).unwrap().opacity, Opacity::Shown);
    h.unmap(win).unwrap();
    assert_eq!(h.tree().opacity(h.mirror(win)), Opacity::Hidden);
    h.check().unwrap();
}

#[test]
fn per_node_policy_touches_once_per_reassignment() {
    let mut h = SyncHarness::new();
    let root = h.create(None, screen()).unwrap();
    let wins: Vec<_> = (0..3)
        .map(|_| h.create(Some(root), window()).unwrap())
        .collect();

    // Back to front: 1 (1), 2 (2), 0 (0 -> 3).
    let before = h.display().touches();
    h.raise(wins[0]).unwrap();
    assert_eq!(h.display().touches() - before, 1);

    // Back to front: 0 (3), 1 (1 -> 4), 2 (2 -> 5).
    let before = h.display().touches();
    h.lower(wins[0]).unwrap();
    assert_eq!(h.display().touches() - before, 2);
    h.check().unwrap();
}

#[test]
fn per_event_policy_touches_once() {
    let mut h = SyncHarness::with_config(SyncConfig::new().with_notify(NotifyPolicy::PerEvent));
    let root = h.create(None, screen()).unwrap();
    let wins: Vec<_> = (0..3)
        .map(|_| h.create(Some(root), window()).unwrap())
        .collect();

    let before = h.display().touches();
    h.lower(wins[2]).unwrap();
    assert_eq!(h.dispatcher().stats().restacked, 2);
    assert_eq!(h.display().touches() - before, 1);

    let before = h.display().touches();
    h.restack(wins[1]).unwrap();
    assert_eq!(h.display().touches(), before, "nothing changed, no touch");
    h.check().unwrap();
}

#[test]
fn trace_records_event_structure() {
    let mut h = SyncHarness::new();
    let rec = RecorderSink::new();
    h.dispatcher_mut().set_trace_sink(Box::new(rec.clone()));

    let root = h.create(None, screen()).unwrap();
    let wins: Vec<_> = (0..2)
        .map(|_| h.create(Some(root), window()).unwrap())
        .collect();
    rec.take();

    h.raise(wins[0]).unwrap();
    let events = rec.take();
    assert!(matches!(events.first(), Some(RecordedEvent::EventBegin(_))));
    assert_eq!(
        events
            .iter()
            .filter(|e| matches!(e, RecordedEvent::Restack(_)))
            .count(),
        1
    );
    match events.last() {
        Some(RecordedEvent::EventEnd(end)) => {
            assert_eq!(end.touches, 1);
            assert_eq!(end.outcome, EventOutcome::Applied);
        }
        other => panic!("expected EventEnd, got {other:?}"),
    }
}

#[test]
fn unknown_nodes_are_counted_not_fatal() {
    let mut h = SyncHarness::new();
    let root = h.create(None, screen()).unwrap();
    let win = h.create(Some(root), window()).unwrap();
    h.destroy(win).unwrap();

    let d = h.dispatcher_mut();
    d.on_destroy(win, None).unwrap();
    d.on_move(win, 1, 2, None).unwrap();
    d.on_realize(win, None).unwrap();
    assert_eq!(d.stats().unknown_nodes, 3);
    h.check().unwrap();
}
