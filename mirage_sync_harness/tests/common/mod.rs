// Copyright 2026 the Mirage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Shared helpers for the integration tests.

#![allow(dead_code, reason = "not every test binary uses every helper")]

use tracing_subscriber::EnvFilter;

/// Routes `tracing` output to the test writer, filtered by `RUST_LOG`.
pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// A xorshift64 generator; deterministic per seed.
pub struct XorShift(u64);

impl XorShift {
    pub fn new(seed: u64) -> Self {
        Self(seed.max(1))
    }

    pub fn next_u64(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }

    /// Returns a value in `0..n`.
    pub fn below(&mut self, n: usize) -> usize {
        usize::try_from(self.next_u64() % n as u64).expect("fits in usize")
    }

    pub fn range(&mut self, lo: i32, hi: i32) -> i32 {
        let span = usize::try_from(hi - lo).expect("non-empty range");
        lo + i32::try_from(self.below(span)).expect("fits in i32")
    }

    pub fn chance(&mut self, percent: usize) -> bool {
        self.below(100) < percent
    }
}
