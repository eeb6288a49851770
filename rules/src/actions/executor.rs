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

use data::actions::pending::PendingActionState;
use data::actions::result::ActionResult;
use data::core::primitives::PlayerPosition;
use data::error::EngineError;
use data::game_states::game_root::GameRoot;
use data::game_states::history_data::SerializedAction;
use data::picks::pick::{ChoiceOption, CollectedArgs, ElementOption, Pick, PickKind, PickValue};
use tracing::instrument;

use crate::actions::availability;

/// What a single pick-submission step produces: either the action isn't
/// done yet (more picks remain) or it just ran to completion.
pub enum StepOutcome {
    Pending,
    Completed(ActionResult),
}

/// Validates availability, then either executes `action_name` immediately
/// (no pick requires server-mediated resolution) or creates a
/// [PendingActionState] and returns as soon as the first pick is reached.
///
/// This is the entry point for the "serialized" direct API: a full args
/// map supplied up front, resolved pick by pick in declaration order.
#[instrument(level = "debug", skip(game, args, previous_result))]
pub fn perform_action(
    game: &mut GameRoot,
    player: PlayerPosition,
    action_name: &str,
    args: CollectedArgs,
    previous_result: Option<&ActionResult>,
) -> Result<ActionResult, EngineError> {
    let (resolved, result) = execute_direct(game, player, action_name, &args, previous_result)?;
    if result.success {
        record_history(game, player, action_name, &resolved);
    }
    Ok(result)
}

/// Same validation and execution path as [perform_action], but never
/// appends to [GameRoot::history].
///
/// Used by the session layer when replaying a history it already holds --
/// a fresh-construction replay, or the suffix of history that a hot-reload
/// partial replay re-applies on top of a restored checkpoint -- where the
/// action's effect on the tree needs to run again but the history entry
/// that recorded it must not be duplicated.
#[instrument(level = "debug", skip(game, args, previous_result))]
pub fn replay_action(
    game: &mut GameRoot,
    player: PlayerPosition,
    action_name: &str,
    args: CollectedArgs,
    previous_result: Option<&ActionResult>,
) -> Result<ActionResult, EngineError> {
    execute_direct(game, player, action_name, &args, previous_result).map(|(_, result)| result)
}

fn execute_direct(
    game: &mut GameRoot,
    player: PlayerPosition,
    action_name: &str,
    args: &CollectedArgs,
    previous_result: Option<&ActionResult>,
) -> Result<(CollectedArgs, ActionResult), EngineError> {
    let action = game.action(action_name).cloned().ok_or_else(|| EngineError::action_not_found(action_name))?;

    if !availability::is_available(game, player, &action) {
        return Err(EngineError::action_not_available(action_name));
    }

    let resolved = resolve_args(game, player, &action, args)?;
    let result = (action.execute)(game, player, previous_result, &resolved);
    Ok((resolved, result))
}

/// Fills in any un-supplied picks of `action` by auto-selecting
/// `skipIfOnlyOne` picks with exactly one legal option, validating bounds
/// on the ones the caller did supply. Does not run `onSelect`/repeat
/// mediation -- callers needing that must drive the stepwise API instead.
fn resolve_args(
    game: &GameRoot,
    player: PlayerPosition,
    action: &data::actions::definition::ActionDefinition,
    args: &CollectedArgs,
) -> Result<CollectedArgs, EngineError> {
    let mut resolved = args.clone();
    for pick in &action.picks {
        if resolved.contains_key(&pick.name) {
            continue;
        }
        if pick.skip_if_only_one {
            if let Some(value) = auto_select(game, player, &resolved, pick) {
                resolved.insert(pick.name.clone(), value);
                continue;
            }
        }
        if !pick.optional {
            return Err(EngineError::invalid_pick(format!("Pick '{}' was not supplied", pick.name)));
        }
    }
    Ok(resolved)
}

fn auto_select(
    game: &GameRoot,
    player: PlayerPosition,
    args: &CollectedArgs,
    pick: &Pick,
) -> Option<PickValue> {
    match &pick.kind {
        PickKind::Choice { legal } => {
            let options = legal(game, player, args);
            (options.len() == 1).then(|| PickValue::Choice(options[0].value.clone()))
        }
        PickKind::Element { legal } => {
            let options = legal(game, player, args);
            (options.len() == 1).then(|| PickValue::Element(options[0].id))
        }
        PickKind::Player { legal } => {
            let options = legal(game, player, args);
            (options.len() == 1).then(|| PickValue::Player(options[0]))
        }
        _ => None,
    }
}

fn record_history(game: &mut GameRoot, player: PlayerPosition, action_name: &str, args: &CollectedArgs) {
    let wire_args: BTreeMap<String, serde_json::Value> = args
        .iter()
        .map(|(name, value)| (name.clone(), serde_json::to_value(value).unwrap_or(serde_json::Value::Null)))
        .collect();
    game.history.push(SerializedAction { name: action_name.to_string(), player, args: wire_args });
}

/// Begins step-by-step resolution of `action_name`, the entry point for
/// actions with at least one pick that requires server-mediated work (an
/// `onSelect` hook, a repeating pick, or the caller explicitly wants
/// stepwise control).
#[instrument(level = "debug", skip(game, previous_result))]
pub fn begin_pending(
    game: &mut GameRoot,
    player: PlayerPosition,
    action_name: &str,
    previous_result: Option<ActionResult>,
) -> Result<(), EngineError> {
    let action = game.action(action_name).cloned().ok_or_else(|| EngineError::action_not_found(action_name))?;
    if !availability::is_available(game, player, &action) {
        return Err(EngineError::action_not_available(action_name));
    }
    game.pending_action = Some(PendingActionState::new(action_name, player, previous_result));
    Ok(())
}

/// Applies one pick's value to the in-flight [PendingActionState].
///
/// Validates that `pick_name` matches the pick at `current_pick_index`.
/// For a repeating pick, accumulates `value` into `repeat_progress` and
/// invokes `onEach`; the pick only advances once its `repeatUntil`
/// predicate holds or `value` equals the configured terminator. For every
/// other pick, applies the value directly and invokes `onSelect`. When the
/// advanced index runs past the last pick, `execute` is invoked and the
/// pending state is discarded.
#[instrument(level = "debug", skip(game, value))]
pub fn submit_pick(
    game: &mut GameRoot,
    player: PlayerPosition,
    pick_name: &str,
    value: PickValue,
) -> Result<StepOutcome, EngineError> {
    let pending = game.pending_action.clone().ok_or_else(|| {
        EngineError::invalid_pick("No action is currently pending step-by-step resolution")
    })?;
    if pending.player != player {
        return Err(EngineError::not_your_turn("Another player's action is pending"));
    }

    let action = game
        .action(&pending.action_name)
        .cloned()
        .ok_or_else(|| EngineError::action_not_found(&pending.action_name))?;
    let pick = action
        .picks
        .get(pending.current_pick_index)
        .ok_or_else(|| EngineError::internal("Pending action has no pick at its current index"))?;

    if pick.name != pick_name {
        return Err(EngineError::pick_not_found(pick_name));
    }

    let mut pending = pending;
    let advance = if let Some(repeat) = &pick.repeat {
        let terminated = repeat.terminator.as_ref().is_some_and(|t| t.matches(&value));
        if !terminated {
            pending.repeat_progress.push(value.clone());
            if let Some(on_each) = repeat.on_each {
                on_each(game, player, &value);
            }
        }
        let done = terminated || (repeat.until)(game, player, &pending.collected_args, &pending.repeat_progress);
        if done {
            let folded = fold_repeat(&pending.repeat_progress);
            pending.collected_args.insert(pick.name.clone(), folded);
            pending.repeat_progress.clear();
            true
        } else {
            false
        }
    } else {
        pending.collected_args.insert(pick.name.clone(), value.clone());
        if let Some(on_select) = pick.on_select {
            on_select(game, player, &value);
        }
        true
    };

    if advance {
        pending.current_pick_index += 1;
    }

    if pending.current_pick_index >= action.picks.len() {
        let result = (action.execute)(game, player, pending.previous_result.as_ref(), &pending.collected_args);
        if result.success {
            record_history(game, player, &action.name, &pending.collected_args);
        }
        game.pending_action = None;
        Ok(StepOutcome::Completed(result))
    } else {
        game.pending_action = Some(pending);
        Ok(StepOutcome::Pending)
    }
}

/// Folds the values collected by a repeating pick into a single
/// [PickValue]. Element repeats fold into [PickValue::Elements]; any other
/// kind keeps only the last collected value, since repeat is primarily
/// meant for "pick N elements one at a time with a per-pick side effect".
fn fold_repeat(values: &[PickValue]) -> PickValue {
    if values.iter().all(|value| matches!(value, PickValue::Element(_))) {
        let ids = values
            .iter()
            .filter_map(|value| match value {
                PickValue::Element(id) => Some(*id),
                _ => None,
            })
            .collect();
        PickValue::Elements(ids)
    } else {
        values.last().cloned().unwrap_or(PickValue::Text(String::new()))
    }
}

/// Legal sets for a pick, keyed by the resolved value of the pick it
/// `dependsOn`, letting a client fetch contingent choices without a server
/// round-trip.
pub enum DependentLegalSet {
    Choices(BTreeMap<String, Vec<ChoiceOption>>),
    Elements(BTreeMap<String, Vec<ElementOption>>),
}

/// Computes `pick`'s legal set, indexed by every legal value of the pick it
/// depends on (resolved against an otherwise-empty args map).
pub fn dependent_legal_set(
    game: &GameRoot,
    player: PlayerPosition,
    action: &data::actions::definition::ActionDefinition,
    pick: &Pick,
) -> Option<DependentLegalSet> {
    let dep_name = pick.depends_on.as_ref()?;
    let dep_pick = action.pick(dep_name)?;
    // Paired (display key, actual resolved value) so the map is keyed by
    // something JSON-friendly while the simulated args passed to `legal`
    // still carry the dependency's real `PickValue` variant.
    let dep_values: Vec<(String, PickValue)> = match &dep_pick.kind {
        PickKind::Choice { legal } => legal(game, player, &CollectedArgs::new())
            .into_iter()
            .map(|option| (option.value.clone(), PickValue::Choice(option.value)))
            .collect(),
        PickKind::Element { legal } => legal(game, player, &CollectedArgs::new())
            .into_iter()
            .map(|option| (option.id.to_string(), PickValue::Element(option.id)))
            .collect(),
        _ => return None,
    };

    match &pick.kind {
        PickKind::Choice { legal } => {
            let mut index = BTreeMap::new();
            for (key, dep_value) in dep_values {
                let mut args = CollectedArgs::new();
                args.insert(dep_name.clone(), dep_value);
                index.insert(key, legal(game, player, &args));
            }
            Some(DependentLegalSet::Choices(index))
        }
        PickKind::Element { legal } => {
            let mut index = BTreeMap::new();
            for (key, dep_value) in dep_values {
                let mut args = CollectedArgs::new();
                args.insert(dep_name.clone(), dep_value);
                index.insert(key, legal(game, player, &args));
            }
            Some(DependentLegalSet::Elements(index))
        }
        _ => None,
    }
}

#[cfg(test)]
pub(crate) fn fresh_game(player_count: u32) -> GameRoot {
    use data::core::primitives::{GameId, GamePhase};
    use data::game_states::class_registry::ClassRegistry;
    use data::game_states::element_tree::ElementTree;
    use data::game_states::game_root::GameConfiguration;

    let mut tree = ElementTree::new();
    let root_id = tree.next_id();
    tree.set_root_id(root_id);
    tree.insert(data::elements::element::Element::Space(data::elements::element::SpaceData {
        header: data::elements::element::ElementHeader::new(root_id, "Space"),
        zone_visibility: None,
    }));
    let pile_id = tree.next_id();
    tree.insert(data::elements::element::Element::Space(data::elements::element::SpaceData {
        header: data::elements::element::ElementHeader::new(pile_id, "Space"),
        zone_visibility: None,
    }));
    tree.set_pile_id(pile_id);

    for position in 1..=player_count {
        let player_id = tree.next_id();
        let mut header = data::elements::element::ElementHeader::new(player_id, "Player");
        header.parent = Some(root_id);
        tree.get_mut(root_id).header_mut().insert_child(player_id);
        tree.insert(data::elements::element::Element::Player(data::elements::element::PlayerData {
            header,
            position: PlayerPosition(position),
            is_current: position == 1,
        }));
    }

    GameRoot {
        id: GameId::new(),
        configuration: GameConfiguration::default(),
        phase: GamePhase::Started,
        tree,
        rng: data::core::rng::SeededRng::new("test"),
        messages: vec![],
        settings: Default::default(),
        history: Default::default(),
        flow_state: Default::default(),
        animations: Default::default(),
        pending_action: None,
        registry: ClassRegistry::new(),
        actions: Default::default(),
        flow_graph: None,
    }
}
