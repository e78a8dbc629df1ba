// Copyright 2026 the Mirage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pseudo-random host activity, checked for consistency after every step.

mod common;

use common::XorShift;
use mirage_core::config::{NotifyPolicy, SyncConfig};
use mirage_core::region::{PixelRect, Region};
use mirage_core::{SourceHierarchy, SourceId};
use mirage_sync_harness::SyncHarness;

fn random_rect(rng: &mut XorShift) -> PixelRect {
    let x = rng.range(-50, 500);
    let y = rng.range(-50, 400);
    let w = u32::try_from(rng.range(1, 300)).unwrap();
    let h = u32::try_from(rng.range(1, 300)).unwrap();
    PixelRect::new(x, y, w, h)
}

fn pick(rng: &mut XorShift, ids: &[SourceId]) -> SourceId {
    ids[rng.below(ids.len())]
}

fn step(h: &mut SyncHarness, rng: &mut XorShift) {
    let ids: Vec<SourceId> = h.source().ids().collect();
    if ids.is_empty() {
        h.create(None, PixelRect::new(0, 0, 1024, 768)).unwrap();
        return;
    }
    let id = pick(rng, &ids);

    match rng.below(11) {
        0 | 1 => {
            let parent = if rng.chance(5) { None } else { Some(id) };
            h.create(parent, random_rect(rng)).unwrap();
        }
        2 => h.map(id).unwrap(),
        3 => h.unmap(id).unwrap(),
        4 => {
            let r = random_rect(rng);
            h.move_to(id, r.x0, r.y0).unwrap();
        }
        5 => h.resize(id, random_rect(rng)).unwrap(),
        6 => h.raise(id).unwrap(),
        7 => h.lower(id).unwrap(),
        8 => {
            let parent = h.source().parent(id);
            let siblings = h.source().siblings(parent).to_vec();
            let sibling = pick(rng, &siblings);
            if sibling != id {
                h.place_above(id, sibling).unwrap();
            }
        }
        9 => {
            let target = if rng.chance(20) {
                None
            } else {
                Some(pick(rng, &ids))
            };
            if target.is_none_or(|t| !h.source().is_ancestor_or_self(id, t)) {
                h.reparent(id, target).unwrap();
                h.restack(id).unwrap();
            }
        }
        _ => {
            if h.source().children(id).is_empty() {
                h.destroy(id).unwrap();
            } else if rng.chance(50) {
                let r = random_rect(rng);
                let shape = Region::from_rect(PixelRect::new(0, 0, r.width(), r.height()));
                h.set_shape(id, Some(shape)).unwrap();
            } else {
                h.set_shape(id, None).unwrap();
            }
        }
    }
}

fn run(seed: u64, steps: usize, config: SyncConfig) {
    common::init_logging();
    let mut rng = XorShift::new(seed);
    let mut h = SyncHarness::with_config(config);

    for i in 0..steps {
        step(&mut h, &mut rng);
        if let Err(v) = h.check() {
            panic!("seed {seed}, step {i}: {v}");
        }
    }

    // Tear down leaves first until nothing is left.
    while !h.source().is_empty() {
        let leaves: Vec<SourceId> = h
            .source()
            .ids()
            .filter(|&id| h.source().children(id).is_empty())
            .collect();
        for id in leaves {
            h.destroy(id).unwrap();
        }
        h.check().unwrap();
    }
    assert!(h.tree().is_empty());
    assert_eq!(h.display().layer_count(), 0);
}

#[test]
fn random_sequences_stay_consistent() {
    for seed in [1, 7, 42, 1234, 0xdead_beef] {
        run(seed, 400, SyncConfig::default());
    }
}

#[test]
fn random_sequences_stay_consistent_per_event() {
    for seed in [3, 99, 2026] {
        run(
            seed,
            400,
            SyncConfig::new().with_notify(NotifyPolicy::PerEvent),
        );
    }
}
