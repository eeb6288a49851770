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

use crate::actions::result::ActionResult;
use crate::core::primitives::PlayerPosition;
use crate::game_states::game_root::GameRoot;
use crate::picks::pick::{CollectedArgs, Pick};

/// Evaluated against `{game, player}` to decide whether an action is
/// available to that player at all, independent of pick legality.
pub type ConditionFn = fn(&GameRoot, PlayerPosition) -> bool;

/// Runs an action's effect once every pick has been resolved. Receives the
/// acting player and the result of whatever action immediately preceded
/// this one in the current chain (set when this action is itself a
/// follow-up), plus the collected pick args.
pub type ExecuteFn =
    fn(&mut GameRoot, PlayerPosition, Option<&ActionResult>, &CollectedArgs) -> ActionResult;

/// A named, declaratively defined player operation: an ordered list of
/// picks, an optional availability condition, and an effect.
///
/// Built via [ActionBuilder] rather than constructed directly, so picks are
/// always appended in declaration order and the two function-pointer
/// fields can't be forgotten.
#[derive(Clone)]
pub struct ActionDefinition {
    pub name: String,
    pub picks: Vec<Pick>,
    pub condition: Option<ConditionFn>,
    pub execute: ExecuteFn,
}

impl ActionDefinition {
    pub fn builder(name: impl Into<String>, execute: ExecuteFn) -> ActionBuilder {
        ActionBuilder {
            name: name.into(),
            picks: vec![],
            condition: None,
            execute,
        }
    }

    pub fn pick(&self, name: &str) -> Option<&Pick> {
        self.picks.iter().find(|pick| pick.name == name)
    }

    pub fn pick_index(&self, name: &str) -> Option<usize> {
        self.picks.iter().position(|pick| pick.name == name)
    }

    /// True if any pick requires server-mediated step-by-step resolution
    /// (an `onSelect` hook or a repeating pick).
    pub fn requires_pending_resolution(&self) -> bool {
        self.picks.iter().any(Pick::requires_pending_resolution)
    }
}

/// Fluent builder for [ActionDefinition]. Picks accumulate in call order,
/// which is the order they're resolved in at runtime.
pub struct ActionBuilder {
    name: String,
    picks: Vec<Pick>,
    condition: Option<ConditionFn>,
    execute: ExecuteFn,
}

impl ActionBuilder {
    pub fn pick(mut self, pick: Pick) -> Self {
        self.picks.push(pick);
        self
    }

    pub fn condition(mut self, condition: ConditionFn) -> Self {
        self.condition = Some(condition);
        self
    }

    pub fn build(self) -> ActionDefinition {
        ActionDefinition {
            name: self.name,
            picks: self.picks,
            condition: self.condition,
            execute: self.execute,
        }
    }
}
