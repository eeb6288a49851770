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

use data::actions::definition::ActionDefinition;
use data::core::primitives::PlayerPosition;
use data::game_states::game_root::GameRoot;
use data::picks::pick::{CollectedArgs, PickKind};

/// Per-pick availability detail, driving the debug API's "why unavailable"
/// trace.
#[derive(Debug, Clone)]
pub struct PickTrace {
    pub pick_name: String,
    pub satisfied: bool,
    pub legal_count: usize,
}

#[derive(Debug, Clone)]
pub struct AvailabilityTrace {
    pub action_available: bool,
    pub condition_passed: bool,
    pub picks: Vec<PickTrace>,
}

/// True iff `action` is currently available to `player`: its condition (if
/// any) holds, and every non-optional pick has at least one legal choice
/// given an empty args prefix.
pub fn is_available(game: &GameRoot, player: PlayerPosition, action: &ActionDefinition) -> bool {
    trace(game, player, action).action_available
}

/// The full per-pick availability trace for `action`, computed defensively
/// even once an earlier pick already fails, so every pick's legal count is
/// always reported.
pub fn trace(game: &GameRoot, player: PlayerPosition, action: &ActionDefinition) -> AvailabilityTrace {
    let condition_passed = action.condition.map_or(true, |condition| condition(game, player));

    let args = CollectedArgs::new();
    let picks: Vec<PickTrace> = action
        .picks
        .iter()
        .map(|pick| {
            let legal_count = legal_count_for(game, player, &args, pick);
            let satisfied = pick.optional || legal_count >= 1;
            PickTrace { pick_name: pick.name.clone(), satisfied, legal_count }
        })
        .collect();

    let action_available = condition_passed && picks.iter().all(|pick| pick.satisfied);
    AvailabilityTrace { action_available, condition_passed, picks }
}

/// Number of legal options a pick currently has, given the args collected
/// so far. Bounded numeric/text picks are always considered to have
/// exactly one legal "choice" (the bound itself), since their legality is
/// enforced at resolution time rather than enumerated up front.
pub fn legal_count_for(
    game: &GameRoot,
    player: PlayerPosition,
    args: &CollectedArgs,
    pick: &data::picks::pick::Pick,
) -> usize {
    match &pick.kind {
        PickKind::Choice { legal } => legal(game, player, args).len(),
        PickKind::Element { legal } => legal(game, player, args).len(),
        PickKind::Elements { legal, .. } => legal(game, player, args).len(),
        PickKind::Player { legal } => legal(game, player, args).len(),
        PickKind::Number { min, max } => usize::from(min <= max),
        PickKind::Text { .. } => 1,
    }
}

#[cfg(test)]
mod tests {
    use data::actions::definition::ActionDefinition;
    use data::actions::result::ActionResult;
    use data::picks::pick::{ChoiceOption, Pick, PickKind};

    use super::*;

    fn no_choices(_: &GameRoot, _: PlayerPosition, _: &CollectedArgs) -> Vec<ChoiceOption> {
        vec![]
    }

    fn one_choice(_: &GameRoot, _: PlayerPosition, _: &CollectedArgs) -> Vec<ChoiceOption> {
        vec![ChoiceOption { value: "x".into(), label: "X".into(), disabled_reason: None }]
    }

    fn execute(
        _: &mut GameRoot,
        _: PlayerPosition,
        _: Option<&ActionResult>,
        _: &CollectedArgs,
    ) -> ActionResult {
        ActionResult::ok()
    }

    #[test]
    fn unavailable_when_pick_has_no_legal_choices() {
        let action = ActionDefinition::builder("discard", execute)
            .pick(Pick::new("card", PickKind::Choice { legal: no_choices }))
            .build();
        let game = crate::actions::executor::tests::fresh_game(1);
        assert!(!is_available(&game, PlayerPosition(1), &action));
    }

    #[test]
    fn available_when_every_non_optional_pick_has_a_choice() {
        let action = ActionDefinition::builder("discard", execute)
            .pick(Pick::new("card", PickKind::Choice { legal: one_choice }))
            .build();
        let game = crate::actions::executor::tests::fresh_game(1);
        assert!(is_available(&game, PlayerPosition(1), &action));
    }

    #[test]
    fn optional_pick_with_no_choices_does_not_block_availability() {
        let action = ActionDefinition::builder("discard", execute)
            .pick(Pick::new("card", PickKind::Choice { legal: no_choices }).optional())
            .build();
        let game = crate::actions::executor::tests::fresh_game(1);
        assert!(is_available(&game, PlayerPosition(1), &action));
    }
}
