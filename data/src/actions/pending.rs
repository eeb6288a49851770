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

use crate::actions::result::ActionResult;
use crate::core::primitives::PlayerPosition;
use crate::picks::pick::{CollectedArgs, PickValue};

/// Step-by-step resolution state for an action whose picks require
/// server-mediated work: an `onSelect` side effect, a repeating pick, or a
/// caller using the stepwise API.
///
/// Created when the first such pick is reached and discarded once the
/// action's `execute` has run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingActionState {
    pub action_name: String,
    pub player: PlayerPosition,
    pub collected_args: CollectedArgs,
    pub current_pick_index: usize,

    /// Values collected so far for the pick at `current_pick_index`, when
    /// that pick is a repeating one. Cleared (and folded into
    /// `collected_args` as a `PickValue::Elements`-shaped aggregate by the
    /// caller) once the repeat terminates.
    pub repeat_progress: Vec<PickValue>,

    /// The result of the action that produced this one as a follow-up, if
    /// any. Passed to `execute` as its "last result" context once every
    /// pick here has resolved.
    pub previous_result: Option<ActionResult>,
}

impl PendingActionState {
    pub fn new(
        action_name: impl Into<String>,
        player: PlayerPosition,
        previous_result: Option<ActionResult>,
    ) -> Self {
        Self {
            action_name: action_name.into(),
            player,
            collected_args: CollectedArgs::new(),
            current_pick_index: 0,
            repeat_progress: vec![],
            previous_result,
        }
    }
}
