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

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::core::primitives::PlayerPosition;

/// Wire form of a submitted action: a name, the 1-indexed position of the
/// acting player, and a map of pick name to resolved JSON value (elements
/// represented by numeric id).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerializedAction {
    pub name: String,
    pub player: PlayerPosition,
    pub args: BTreeMap<String, JsonValue>,
}

/// Append-only history of every action successfully performed against a
/// game. Fully determines the current state when replayed against the
/// same class registry and seed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GameHistory {
    pub actions: Vec<SerializedAction>,

    /// Milliseconds since the Unix epoch when the game was constructed.
    /// Supplied by the caller rather than read from the system clock, so
    /// that construction stays deterministic under replay.
    pub created_at_millis: u64,
}

impl GameHistory {
    pub fn new(created_at_millis: u64) -> Self {
        Self { actions: vec![], created_at_millis }
    }

    pub fn push(&mut self, action: SerializedAction) {
        self.actions.push(action);
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// The prefix of history up to (but not including) `index`, used by
    /// rewind.
    pub fn prefix(&self, index: usize) -> &[SerializedAction] {
        &self.actions[..index.min(self.actions.len())]
    }
}
