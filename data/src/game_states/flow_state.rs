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

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::core::primitives::PlayerPosition;

/// Live bookkeeping for one frame on the flow engine's stack. `child_index`
/// is this frame's position within its parent's child slots (see
/// [crate::flow::node::FlowNode::nth_child]); concatenating `child_index`
/// top-to-bottom down the stack produces the `path` exported in
/// [crate::flow::position::FlowPosition].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Frame {
    pub child_index: usize,
    pub state: FrameState,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum FrameState {
    Sequence { next_child: usize },
    Loop { iteration: u32 },
    EachPlayer { order: Vec<PlayerPosition>, index: usize },
    ForEach { items: Vec<JsonValue>, index: usize },
    If,
    Switch { branch: Option<usize> },
    Phase,
    Execute,
    ActionStep { moves: u32 },
    SimultaneousActionStep { done: BTreeSet<PlayerPosition> },
}

/// What the flow engine is currently blocked on, exposed to the caller so
/// they know what they may resume with: the acting player (or players, for
/// a simultaneous step) and the action names currently available to each.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum AwaitingInput {
    ActionStep { player: PlayerPosition, available_actions: Vec<String> },
    SimultaneousActionStep { available_actions: BTreeMap<PlayerPosition, Vec<String>> },
}

/// The flow engine's full live state, carried as a field of
/// [crate::game_states::game_root::GameRoot] so it snapshots, serializes,
/// and restores along with the rest of the game.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FlowState {
    pub stack: Vec<Frame>,
    pub variables: BTreeMap<String, JsonValue>,
    pub current_phase_stack: Vec<String>,
    pub awaiting: Option<AwaitingInput>,
    pub complete: bool,
}
