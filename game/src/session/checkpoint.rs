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

//! Periodic dev snapshots kept around so hot reload can fall back to a
//! partial replay (from the nearest checkpoint) rather than a full one
//! when the live game's own state fails validation against a freshly
//! rebuilt class registry.
//!
//! Keyed by the action-history length at the moment of capture (its
//! "nonce"), mirroring a write-ahead log's sequence number rather than
//! wall-clock time, so capture stays deterministic under replay.

use std::collections::BTreeMap;

use data::flow::position::FlowPosition;
use data::game_states::class_registry::ClassRegistry;
use data::game_states::game_root::GameRoot;
use rules::flow::engine;

use crate::snapshot::{self, GameSnapshot};
use crate::validator;

/// A checkpoint captures both halves of a game's restorable state: the
/// element tree (via [GameSnapshot]) and the flow engine's position (via
/// [FlowPosition]), so a partial-replay restore doesn't need to re-derive
/// flow bookkeeping for every action before the checkpoint's nonce --
/// only the tree mutations of the actions after it.
#[derive(Debug, Clone)]
pub struct CheckpointRecord {
    pub snapshot: GameSnapshot,
    pub flow_position: FlowPosition,
}

#[derive(Debug)]
pub struct CheckpointManager {
    interval: usize,
    window: usize,
    checkpoints: BTreeMap<usize, CheckpointRecord>,
}

impl Default for CheckpointManager {
    fn default() -> Self {
        Self::new()
    }
}

impl CheckpointManager {
    /// Capture every 10 actions, keeping the 5 most recent checkpoints.
    pub fn new() -> Self {
        Self::with_config(10, 5)
    }

    pub fn with_config(interval: usize, window: usize) -> Self {
        Self { interval: interval.max(1), window: window.max(1), checkpoints: BTreeMap::new() }
    }

    /// Captures a checkpoint if `game`'s current history length is a
    /// positive multiple of the configured interval, evicting the oldest
    /// checkpoint if the rolling window is now over capacity.
    pub fn maybe_capture(&mut self, game: &GameRoot) {
        let nonce = game.history.len();
        if nonce == 0 || nonce % self.interval != 0 {
            return;
        }
        let record = CheckpointRecord { snapshot: snapshot::capture(game), flow_position: engine::export_position(game) };
        self.checkpoints.insert(nonce, record);
        while self.checkpoints.len() > self.window {
            let Some(&oldest) = self.checkpoints.keys().next() else { break };
            self.checkpoints.remove(&oldest);
        }
    }

    /// The highest-nonce checkpoint at or before `nonce`, if any is held.
    pub fn nearest_at_or_before(&self, nonce: usize) -> Option<(usize, &CheckpointRecord)> {
        self.checkpoints.range(..=nonce).next_back().map(|(&key, record)| (key, record))
    }

    /// The highest-nonce checkpoint at or before `nonce` whose snapshot
    /// validates cleanly against `registry`, walking further back through
    /// older checkpoints as needed. `None` if no held checkpoint
    /// validates, meaning the caller must fall back to a full replay.
    pub fn valid_at_or_before(&self, nonce: usize, registry: &ClassRegistry) -> Option<(usize, &CheckpointRecord)> {
        let mut upto = nonce;
        loop {
            let (found_nonce, record) = self.nearest_at_or_before(upto)?;
            if validator::validate(&record.snapshot, registry).is_ok() {
                return Some((found_nonce, record));
            }
            if found_nonce == 0 {
                return None;
            }
            upto = found_nonce - 1;
        }
    }

    pub fn clear(&mut self) {
        self.checkpoints.clear();
    }

    pub fn len(&self) -> usize {
        self.checkpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.checkpoints.is_empty()
    }
}
