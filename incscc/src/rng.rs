/*
 * SPDX-FileCopyrightText: 2025 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! The process-wide random number generator.
//!
//! Treap priorities, the soft-threshold search and the sample selection
//! all draw from a single seedable generator, so seeding it once makes a
//! whole run reproducible. When [`seed`] is never called the generator
//! falls back to a fixed default seed.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::ops::Range;
use std::sync::Mutex;

const DEFAULT_SEED: u64 = 123;

static RNG: Mutex<Option<SmallRng>> = Mutex::new(None);

fn with_rng<T>(f: impl FnOnce(&mut SmallRng) -> T) -> T {
    let mut guard = RNG.lock().unwrap();
    let rng = guard.get_or_insert_with(|| SmallRng::seed_from_u64(DEFAULT_SEED));
    f(rng)
}

/// (Re)seeds the process-wide generator.
pub fn seed(seed: u64) {
    *RNG.lock().unwrap() = Some(SmallRng::seed_from_u64(seed));
}

/// Returns a uniformly random value in `range`.
pub fn random_range(range: Range<usize>) -> usize {
    with_rng(|rng| rng.random_range(range))
}

/// Returns a uniformly random 64-bit value.
pub fn random_u64() -> u64 {
    with_rng(|rng| rng.random())
}
