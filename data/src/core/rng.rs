// Copyright © tableforge 2026-present
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//   https://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use serde::{Deserialize, Serialize};

/// Deterministic uniform `[0, 1)` stream seeded from a finite string.
///
/// This is part of the engine's external contract: replay determinism (the
/// action history fully determines the current state when replayed against
/// the same class registry and seed) depends on this producing the exact
/// same sequence of doubles for the exact same seed on every platform,
/// forever. Do not swap the algorithm, reorder the
/// operations, or "simplify" the wrapping arithmetic — any of those changes
/// silently breaks every previously-recorded replay.
///
/// The seed folding is the `xmur3` string hash; the stream itself is the
/// `mulberry32` generator. Both are closed-form 32-bit algorithms with no
/// external dependency, which is why they're hand-rolled here rather than
/// delegated to `rand`: `rand`'s generators do not commit to a stable
/// bit-for-bit output across versions, which is fatal for this contract.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SeededRng {
    state: u32,
}

impl SeededRng {
    /// Builds a generator from a finite seed string.
    pub fn new(seed: &str) -> Self {
        Self { state: fold_seed(seed) }
    }

    /// Builds a generator directly from a raw 32-bit state, e.g. when
    /// restoring mid-stream state from a snapshot.
    pub fn from_raw_state(state: u32) -> Self {
        Self { state }
    }

    /// The current raw state, for snapshotting.
    pub fn raw_state(&self) -> u32 {
        self.state
    }

    /// Returns the next value in `[0, 1)`.
    pub fn next_f64(&mut self) -> f64 {
        f64::from(self.next_u32()) / 4_294_967_296.0
    }

    /// Returns a uniform integer in `[0, bound)`. `bound` must be positive.
    pub fn next_below(&mut self, bound: usize) -> usize {
        debug_assert!(bound > 0, "next_below requires a positive bound");
        (self.next_f64() * bound as f64) as usize
    }

    fn next_u32(&mut self) -> u32 {
        self.state = self.state.wrapping_add(0x6D2B79F5);
        let mut t = self.state;
        t = (t ^ (t >> 15)).wrapping_mul(t | 1);
        t ^= t.wrapping_add((t ^ (t >> 7)).wrapping_mul(t | 61));
        t ^ (t >> 14)
    }
}

/// Folds a string's character codes into a 32-bit seed via `xmur3`.
fn fold_seed(seed: &str) -> u32 {
    let mut h: u32 = 1_779_033_703 ^ seed.len() as u32;
    for c in seed.chars() {
        h = h.wrapping_add(c as u32);
        h = h.wrapping_mul(3_432_918_353);
        h = h.rotate_left(13);
    }
    h = (h ^ (h >> 16)).wrapping_mul(2_246_822_507);
    h = (h ^ (h >> 13)).wrapping_mul(3_266_489_909);
    h ^ (h >> 16)
}
