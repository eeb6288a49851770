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

use serde_json::Value as JsonValue;

use crate::core::primitives::PlayerPosition;
use crate::game_states::game_root::GameRoot;

/// A condition evaluated against the live game state, e.g. a `loop`'s
/// `while`, an `if`'s test, or an `action-step`'s `repeatUntil`.
pub type CondFn = fn(&GameRoot) -> bool;

/// Runs a side effect against the game, for the `execute` node.
pub type ExecuteFn = fn(&mut GameRoot);

/// Produces the items a `for-each` node should iterate, evaluated once per
/// entry into the node.
pub type CollectionFn = fn(&GameRoot) -> Vec<JsonValue>;

/// Filters the player list for `each-player`.
pub type PlayerFilterFn = fn(&GameRoot, PlayerPosition) -> bool;

/// Picks the starting player for `each-player`.
pub type StartingPlayerFn = fn(&GameRoot) -> PlayerPosition;

/// Picks the acting player for an `action-step`; defaults to the game's
/// current player when absent.
pub type PlayerSelectorFn = fn(&GameRoot) -> PlayerPosition;

/// Picks the awaiting player set for a `simultaneous-action-step`.
pub type PlayersSelectorFn = fn(&GameRoot) -> Vec<PlayerPosition>;

/// Tests whether a player has satisfied a `simultaneous-action-step`.
pub type PlayerDoneFn = fn(&GameRoot, PlayerPosition) -> bool;

/// A phase enter/exit hook.
pub type PhaseHookFn = fn(&mut GameRoot, &str);

/// Direction of iteration for `each-player`.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Direction {
    Forward,
    Backward,
}

#[derive(Clone)]
pub struct LoopConfig {
    pub condition: Option<CondFn>,
    pub max_iterations: Option<u32>,
    pub body: Box<FlowNode>,
}

#[derive(Clone)]
pub struct EachPlayerConfig {
    pub filter: Option<PlayerFilterFn>,
    pub direction: Direction,
    pub starting_player: Option<StartingPlayerFn>,
    pub body: Box<FlowNode>,
}

#[derive(Clone)]
pub struct ForEachConfig {
    pub collection: CollectionFn,
    pub variable: String,
    pub body: Box<FlowNode>,
}

#[derive(Clone)]
pub struct IfConfig {
    pub condition: CondFn,
    pub then_branch: Box<FlowNode>,
    pub else_branch: Option<Box<FlowNode>>,
}

#[derive(Clone)]
pub struct SwitchConfig {
    pub branches: Vec<(CondFn, FlowNode)>,
    pub default: Option<Box<FlowNode>>,
}

#[derive(Clone)]
pub struct PhaseConfig {
    pub name: String,
    pub on_enter: Option<PhaseHookFn>,
    pub on_exit: Option<PhaseHookFn>,
    pub body: Box<FlowNode>,
}

/// Config shared by `action-step`.
#[derive(Clone)]
pub struct ActionStepConfig {
    pub player: Option<PlayerSelectorFn>,
    pub actions: Vec<String>,
    pub repeat_until: Option<CondFn>,
    pub skip_if: Option<CondFn>,
    pub min_moves: Option<u32>,
    pub max_moves: Option<u32>,
}

#[derive(Clone)]
pub struct SimultaneousActionStepConfig {
    pub players: Option<PlayersSelectorFn>,
    pub actions: Vec<String>,
    pub player_done: Option<PlayerDoneFn>,
    pub all_done: Option<CondFn>,
    pub skip_player: Option<PlayerDoneFn>,
}

/// A node of the flow graph.
///
/// This is the static, authored-once shape of a game's turn structure.
/// Live execution state (which frame is where, how many iterations have
/// run) is tracked separately in
/// [crate::game_states::flow_state::FlowState] so the same [FlowNode] tree
/// can be walked by many concurrently-replayed games.
#[derive(Clone)]
pub enum FlowNode {
    Sequence(Vec<FlowNode>),
    Loop(LoopConfig),
    EachPlayer(EachPlayerConfig),
    ForEach(ForEachConfig),
    If(IfConfig),
    Switch(SwitchConfig),
    Execute(ExecuteFn),
    Phase(PhaseConfig),
    ActionStep(ActionStepConfig),
    SimultaneousActionStep(SimultaneousActionStepConfig),
}

impl FlowNode {
    /// Looks up a descendant node by the path of child indices used to
    /// reach it, the same addressing scheme as [crate::flow::position::FlowPosition::path].
    pub fn child_at_path(&self, path: &[usize]) -> Option<&FlowNode> {
        let mut current = self;
        for &index in path {
            current = current.nth_child(index)?;
        }
        Some(current)
    }

    /// The node entered when stepping into slot `index` of this node, if
    /// any. Composite nodes have exactly one meaningful child slot per the
    /// engine's tick semantics: a `sequence`'s `index`-th step,
    /// a `loop`/`each-player`/`for-each`/`phase`'s single `body`, an `if`'s
    /// branch (0 = then, 1 = else), or a `switch`'s chosen branch.
    pub fn nth_child(&self, index: usize) -> Option<&FlowNode> {
        match self {
            FlowNode::Sequence(steps) => steps.get(index),
            FlowNode::Loop(config) => (index == 0).then(|| config.body.as_ref()),
            FlowNode::EachPlayer(config) => (index == 0).then(|| config.body.as_ref()),
            FlowNode::ForEach(config) => (index == 0).then(|| config.body.as_ref()),
            FlowNode::Phase(config) => (index == 0).then(|| config.body.as_ref()),
            FlowNode::If(config) => match index {
                0 => Some(config.then_branch.as_ref()),
                1 => config.else_branch.as_deref(),
                _ => None,
            },
            FlowNode::Switch(config) => {
                if index < config.branches.len() {
                    Some(&config.branches[index].1)
                } else if index == config.branches.len() {
                    config.default.as_deref()
                } else {
                    None
                }
            }
            FlowNode::Execute(_)
            | FlowNode::ActionStep(_)
            | FlowNode::SimultaneousActionStep(_) => None,
        }
    }
}
