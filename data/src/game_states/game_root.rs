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

use crate::actions::definition::ActionDefinition;
use crate::actions::pending::PendingActionState;
use crate::animation::AnimationBuffer;
use crate::core::primitives::{GameId, GamePhase};
use crate::core::rng::SeededRng;
use crate::flow::node::FlowNode;
use crate::game_states::class_registry::ClassRegistry;
use crate::game_states::element_tree::ElementTree;
use crate::game_states::flow_state::FlowState;
use crate::game_states::history_data::GameHistory;
use crate::message::LogMessage;

/// Options controlling overall gameplay, supplied once at construction.
///
/// Mirrors the ambient configuration layer every game engine in this space
/// carries: a `deterministic` flag that callers flip during tests to
/// enforce the strictest replay checks, a `simulation` flag for search/AI
/// callers that should not append to history or emit animations, and an
/// override for the flow engine's safety cap.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GameConfiguration {
    pub deterministic: bool,
    pub simulation: bool,
    pub max_flow_iterations: u32,
}

impl Default for GameConfiguration {
    fn default() -> Self {
        Self { deterministic: false, simulation: false, max_flow_iterations: 10_000 }
    }
}

/// The top-level state of a single ongoing game.
///
/// This is plain data: the behavior that creates, mutates, and projects a
/// `GameRoot` lives in the `rules` and `game` crates, which take `&mut
/// GameRoot` the same way the element tree and flow engine do. The class
/// registry and the action/flow definitions themselves are not
/// serializable (they carry function pointers and closures supplied by the
/// host game), so they're rebuilt by the host at restore time rather than
/// round-tripped through `serde`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameRoot {
    pub id: GameId,
    pub configuration: GameConfiguration,
    pub phase: GamePhase,
    pub tree: ElementTree,
    pub rng: SeededRng,
    pub messages: Vec<LogMessage>,
    pub settings: BTreeMap<String, JsonValue>,
    pub history: GameHistory,
    pub flow_state: FlowState,
    pub animations: AnimationBuffer,
    pub pending_action: Option<PendingActionState>,

    #[serde(skip)]
    pub registry: ClassRegistry,

    #[serde(skip)]
    pub actions: BTreeMap<String, ActionDefinition>,

    #[serde(skip)]
    pub flow_graph: Option<FlowNode>,
}

impl GameRoot {
    /// Registers an action definition, keyed by its own name. Overwrites
    /// any earlier registration under the same name (used by hot reload to
    /// swap in a new action set without touching the rest of the game).
    pub fn register_action(&mut self, action: ActionDefinition) {
        self.actions.insert(action.name.clone(), action);
    }

    pub fn action(&self, name: &str) -> Option<&ActionDefinition> {
        self.actions.get(name)
    }

    pub fn registered_action_names(&self) -> Vec<String> {
        self.actions.keys().cloned().collect()
    }

    pub fn log_message(&mut self, message: LogMessage) {
        self.messages.push(message);
    }

    pub fn rendered_messages(&self) -> Vec<String> {
        self.messages.iter().map(LogMessage::render).collect()
    }

    pub fn setting(&self, key: &str) -> Option<&JsonValue> {
        self.settings.get(key)
    }

    pub fn set_setting(&mut self, key: impl Into<String>, value: JsonValue) {
        self.settings.insert(key.into(), value);
    }
}
