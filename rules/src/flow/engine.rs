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
use std::sync::Mutex;

use data::core::primitives::PlayerPosition;
use data::flow::node::{Direction, EachPlayerConfig, FlowNode, SimultaneousActionStepConfig};
use data::flow::position::FlowPosition;
use data::game_states::flow_state::{AwaitingInput, Frame, FrameState};
use data::game_states::game_root::GameRoot;
use data::player_states::player_state::{set_current_player, PlayersTrait};
use once_cell::sync::Lazy;
use tracing::instrument;
use utils::outcome::{Outcome, StopCondition, Value, AWAITING_INPUT, GAME_OVER};
use utils::verify;

use crate::actions::availability;

static WARNED_UNKNOWN_ACTIONS: Lazy<Mutex<BTreeSet<String>>> = Lazy::new(|| Mutex::new(BTreeSet::new()));

/// Warns, at most once per action name for the process's lifetime, that an
/// `action-step`/`simultaneous-action-step` node names an action nobody
/// ever registered. A typo in a flow graph's action list is otherwise
/// silent -- the action is just never offered -- which makes it easy to
/// miss during authoring.
fn warn_once_unknown_action(name: &str) {
    let mut warned = WARNED_UNKNOWN_ACTIONS.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    if warned.insert(name.to_string()) {
        tracing::warn!(action = name, "Flow graph references an action name that was never registered");
    }
}

enum NodeOutcome {
    Done,
    Blocked,
}

/// (Re)starts `root` from the beginning, discarding any prior flow state.
#[instrument(level = "debug", skip(game, root))]
pub fn start(game: &mut GameRoot, root: &FlowNode) -> Outcome {
    game.flow_state = Default::default();
    run(game, root)
}

/// Continues a blocked flow from wherever it was left off. Callers must
/// have already applied whatever mutation unblocked it (an action's
/// effect, [record_move], [mark_player_done]) before calling this.
#[instrument(level = "debug", skip(game, root))]
pub fn resume(game: &mut GameRoot, root: &FlowNode) -> Outcome {
    verify!(!game.flow_state.complete, "Cannot resume a flow that has already completed");
    game.flow_state.awaiting = None;
    run(game, root)
}

/// Increments the move counter of the currently awaited `action-step`, if
/// one is on top of the stack. Called by the action executor immediately
/// after a non-follow-up action completes successfully.
pub fn record_move(game: &mut GameRoot) {
    if let Some(frame) = game.flow_state.stack.last_mut() {
        if let FrameState::ActionStep { moves } = &mut frame.state {
            *moves += 1;
        }
    }
}

/// Marks `player` done within the currently awaited
/// `simultaneous-action-step`, if one is on top of the stack.
pub fn mark_player_done(game: &mut GameRoot, player: PlayerPosition) {
    if let Some(frame) = game.flow_state.stack.last_mut() {
        if let FrameState::SimultaneousActionStep { done } = &mut frame.state {
            done.insert(player);
        }
    }
}

fn run(game: &mut GameRoot, root: &FlowNode) -> Outcome {
    let max = game.configuration.max_flow_iterations;
    let guide = std::mem::take(&mut game.flow_state.stack);
    let mut stack_out = Vec::new();
    let mut iterations = 0u32;
    match exec(game, root, &guide, &mut stack_out, &mut iterations, max) {
        Ok(NodeOutcome::Done) => {
            game.flow_state.stack = vec![];
            game.flow_state.awaiting = None;
            game.flow_state.complete = true;
            GAME_OVER
        }
        Ok(NodeOutcome::Blocked) => {
            game.flow_state.stack = stack_out;
            AWAITING_INPUT
        }
        Err(stop) => Err(stop),
    }
}

fn split(guide: &[Frame]) -> (Option<&Frame>, &[Frame]) {
    match guide.split_first() {
        Some((head, rest)) => (Some(head), rest),
        None => (None, &[]),
    }
}

/// Walks one node of the flow graph, resuming from `guide` (the tail of a
/// previously-saved stack, consumed one level per recursive call) if
/// non-empty, or starting fresh at this node otherwise.
///
/// On [NodeOutcome::Blocked], every level that unwinds past this call
/// prepends its own [Frame] to `stack_out`, so by the time [run] regains
/// control `stack_out` holds the complete root-to-leaf path needed to
/// resume exactly here.
fn exec(
    game: &mut GameRoot,
    node: &FlowNode,
    guide: &[Frame],
    stack_out: &mut Vec<Frame>,
    iterations: &mut u32,
    max: u32,
) -> Value<NodeOutcome> {
    *iterations += 1;
    verify!(*iterations <= max, "Flow engine exceeded {max} iterations without reaching an input barrier");

    match node {
        FlowNode::Sequence(steps) => {
            let (head, rest) = split(guide);
            let start_index = head.map(|frame| frame.child_index).unwrap_or(0);
            let mut index = start_index;
            while index < steps.len() {
                let child_guide: &[Frame] = if index == start_index { rest } else { &[] };
                match exec(game, &steps[index], child_guide, stack_out, iterations, max)? {
                    NodeOutcome::Done => index += 1,
                    NodeOutcome::Blocked => {
                        stack_out.insert(
                            0,
                            Frame { child_index: index, state: FrameState::Sequence { next_child: index } },
                        );
                        return Ok(NodeOutcome::Blocked);
                    }
                }
            }
            Ok(NodeOutcome::Done)
        }

        FlowNode::Loop(config) => {
            let (head, rest) = split(guide);
            let mut iteration = match head.map(|frame| &frame.state) {
                Some(FrameState::Loop { iteration }) => *iteration,
                _ => 0,
            };
            let mut child_guide = rest;
            loop {
                if let Some(condition) = config.condition {
                    if !condition(game) {
                        return Ok(NodeOutcome::Done);
                    }
                }
                if let Some(cap) = config.max_iterations {
                    if iteration >= cap {
                        return Ok(NodeOutcome::Done);
                    }
                }
                match exec(game, &config.body, child_guide, stack_out, iterations, max)? {
                    NodeOutcome::Done => {
                        iteration += 1;
                        child_guide = &[];
                    }
                    NodeOutcome::Blocked => {
                        stack_out.insert(0, Frame { child_index: 0, state: FrameState::Loop { iteration } });
                        return Ok(NodeOutcome::Blocked);
                    }
                }
            }
        }

        FlowNode::EachPlayer(config) => {
            let (head, rest) = split(guide);
            let (mut order, mut index) = match head.map(|frame| &frame.state) {
                Some(FrameState::EachPlayer { order, index }) => (order.clone(), *index),
                _ => (resolve_each_player_order(game, config), 0),
            };
            let mut child_guide = rest;
            while index < order.len() {
                set_current_player(&mut game.tree, order[index]);
                match exec(game, &config.body, child_guide, stack_out, iterations, max)? {
                    NodeOutcome::Done => {
                        index += 1;
                        child_guide = &[];
                    }
                    NodeOutcome::Blocked => {
                        stack_out.insert(
                            0,
                            Frame { child_index: 0, state: FrameState::EachPlayer { order: std::mem::take(&mut order), index } },
                        );
                        return Ok(NodeOutcome::Blocked);
                    }
                }
            }
            Ok(NodeOutcome::Done)
        }

        FlowNode::ForEach(config) => {
            let (head, rest) = split(guide);
            let (items, mut index) = match head.map(|frame| &frame.state) {
                Some(FrameState::ForEach { items, index }) => (items.clone(), *index),
                _ => ((config.collection)(game), 0),
            };
            let mut child_guide = rest;
            while index < items.len() {
                game.flow_state.variables.insert(config.variable.clone(), items[index].clone());
                match exec(game, &config.body, child_guide, stack_out, iterations, max)? {
                    NodeOutcome::Done => {
                        index += 1;
                        child_guide = &[];
                    }
                    NodeOutcome::Blocked => {
                        stack_out.insert(
                            0,
                            Frame { child_index: 0, state: FrameState::ForEach { items: items.clone(), index } },
                        );
                        return Ok(NodeOutcome::Blocked);
                    }
                }
            }
            Ok(NodeOutcome::Done)
        }

        FlowNode::If(config) => {
            let (head, rest) = split(guide);
            let branch_index = match head {
                Some(frame) => frame.child_index,
                None => {
                    if (config.condition)(game) {
                        0
                    } else {
                        1
                    }
                }
            };
            let branch = match branch_index {
                0 => Some(config.then_branch.as_ref()),
                1 => config.else_branch.as_deref(),
                _ => None,
            };
            match branch {
                Some(body) => match exec(game, body, rest, stack_out, iterations, max)? {
                    NodeOutcome::Done => Ok(NodeOutcome::Done),
                    NodeOutcome::Blocked => {
                        stack_out.insert(0, Frame { child_index: branch_index, state: FrameState::If });
                        Ok(NodeOutcome::Blocked)
                    }
                },
                None => Ok(NodeOutcome::Done),
            }
        }

        FlowNode::Switch(config) => {
            let (head, rest) = split(guide);
            let branch_index = match head.map(|frame| &frame.state) {
                Some(FrameState::Switch { branch: Some(branch) }) => *branch,
                _ => config
                    .branches
                    .iter()
                    .position(|(condition, _)| condition(game))
                    .unwrap_or(config.branches.len()),
            };
            let branch = if branch_index < config.branches.len() {
                Some(&config.branches[branch_index].1)
            } else {
                config.default.as_deref()
            };
            match branch {
                Some(body) => match exec(game, body, rest, stack_out, iterations, max)? {
                    NodeOutcome::Done => Ok(NodeOutcome::Done),
                    NodeOutcome::Blocked => {
                        stack_out.insert(
                            0,
                            Frame { child_index: branch_index, state: FrameState::Switch { branch: Some(branch_index) } },
                        );
                        Ok(NodeOutcome::Blocked)
                    }
                },
                None => Ok(NodeOutcome::Done),
            }
        }

        FlowNode::Execute(execute) => {
            execute(game);
            Ok(NodeOutcome::Done)
        }

        FlowNode::Phase(config) => {
            let (head, rest) = split(guide);
            if head.is_none() {
                game.flow_state.current_phase_stack.push(config.name.clone());
                if let Some(on_enter) = config.on_enter {
                    on_enter(game, &config.name);
                }
            }
            match exec(game, &config.body, rest, stack_out, iterations, max)? {
                NodeOutcome::Done => {
                    if let Some(on_exit) = config.on_exit {
                        on_exit(game, &config.name);
                    }
                    game.flow_state.current_phase_stack.pop();
                    Ok(NodeOutcome::Done)
                }
                NodeOutcome::Blocked => {
                    stack_out.insert(0, Frame { child_index: 0, state: FrameState::Phase });
                    Ok(NodeOutcome::Blocked)
                }
            }
        }

        FlowNode::ActionStep(config) => {
            let (head, _rest) = split(guide);
            let moves = match head.map(|frame| &frame.state) {
                Some(FrameState::ActionStep { moves }) => *moves,
                _ => {
                    if let Some(skip_if) = config.skip_if {
                        if skip_if(game) {
                            return Ok(NodeOutcome::Done);
                        }
                    }
                    0
                }
            };

            let satisfied_min = config.min_moves.map_or(true, |min| moves >= min);
            let hit_max = config.max_moves.is_some_and(|max_moves| moves >= max_moves);
            let repeat_done = config.repeat_until.map_or(moves > 0, |condition| condition(game));
            if moves > 0 && satisfied_min && (hit_max || repeat_done) {
                return Ok(NodeOutcome::Done);
            }

            let player = config.player.map(|selector| selector(game)).unwrap_or_else(|| game.tree.current_player());
            let available = available_actions_for(game, player, &config.actions);
            if available.is_empty() && satisfied_min {
                return Ok(NodeOutcome::Done);
            }
            game.flow_state.awaiting = Some(AwaitingInput::ActionStep { player, available_actions: available });
            stack_out.insert(0, Frame { child_index: 0, state: FrameState::ActionStep { moves } });
            Ok(NodeOutcome::Blocked)
        }

        FlowNode::SimultaneousActionStep(config) => {
            let (head, _rest) = split(guide);
            let mut done: BTreeSet<PlayerPosition> = match head.map(|frame| &frame.state) {
                Some(FrameState::SimultaneousActionStep { done }) => done.clone(),
                _ => BTreeSet::new(),
            };
            let players = resolve_simultaneous_players(game, config);
            if let Some(skip_player) = config.skip_player {
                for &player in &players {
                    if skip_player(game, player) {
                        done.insert(player);
                    }
                }
            }

            let finished = if let Some(all_done) = config.all_done {
                all_done(game)
            } else if let Some(player_done) = config.player_done {
                players.iter().all(|&player| done.contains(&player) || player_done(game, player))
            } else {
                players.iter().all(|player| done.contains(player))
            };
            if finished {
                return Ok(NodeOutcome::Done);
            }

            let mut available = BTreeMap::new();
            for &player in &players {
                if !done.contains(&player) {
                    available.insert(player, available_actions_for(game, player, &config.actions));
                }
            }
            game.flow_state.awaiting = Some(AwaitingInput::SimultaneousActionStep { available_actions: available });
            stack_out.insert(0, Frame { child_index: 0, state: FrameState::SimultaneousActionStep { done } });
            Ok(NodeOutcome::Blocked)
        }
    }
}

fn resolve_each_player_order(game: &GameRoot, config: &EachPlayerConfig) -> Vec<PlayerPosition> {
    let mut positions: Vec<PlayerPosition> = game.tree.players_in_order().into_iter().map(|p| p.position).collect();
    if let Some(filter) = config.filter {
        positions.retain(|&position| filter(game, position));
    }
    if config.direction == Direction::Backward {
        positions.reverse();
    }
    if let Some(starting_player) = config.starting_player {
        let start = starting_player(game);
        if let Some(offset) = positions.iter().position(|&position| position == start) {
            positions.rotate_left(offset);
        }
    }
    positions
}

fn resolve_simultaneous_players(game: &GameRoot, config: &SimultaneousActionStepConfig) -> Vec<PlayerPosition> {
    match config.players {
        Some(selector) => selector(game),
        None => game.tree.players_in_order().into_iter().map(|p| p.position).collect(),
    }
}

fn available_actions_for(game: &GameRoot, player: PlayerPosition, candidates: &[String]) -> Vec<String> {
    candidates
        .iter()
        .filter(|name| match game.action(name) {
            Some(action) => availability::is_available(game, player, action),
            None => {
                warn_once_unknown_action(name);
                false
            }
        })
        .cloned()
        .collect()
}

/// Exports the live [FlowState] as an opaque, serializable [FlowPosition].
///
/// Lossy by design: ephemeral per-frame bookkeeping that's cheap to
/// recompute ([FrameState::EachPlayer]'s resolved order,
/// [FrameState::ForEach]'s collected items, a simultaneous step's
/// in-progress `done` set) is not carried in the wire form. [restore]
/// recomputes it from the flow graph and the recorded path/iteration
/// counts instead of round-tripping it.
pub fn export_position(game: &GameRoot) -> FlowPosition {
    let path = game.flow_state.stack.iter().map(|frame| frame.child_index).collect();

    let mut iterations = BTreeMap::new();
    for (depth, frame) in game.flow_state.stack.iter().enumerate() {
        let count = match &frame.state {
            FrameState::Loop { iteration } => Some(*iteration),
            FrameState::EachPlayer { index, .. } => Some(*index as u32),
            FrameState::ForEach { index, .. } => Some(*index as u32),
            FrameState::ActionStep { moves } => Some(*moves),
            _ => None,
        };
        if let Some(count) = count {
            iterations.insert(depth.to_string(), count);
        }
    }

    let player_index = match &game.flow_state.awaiting {
        Some(AwaitingInput::ActionStep { player, .. }) => Some(player.0 - 1),
        _ => game.flow_state.stack.iter().find_map(|frame| match &frame.state {
            FrameState::EachPlayer { order, index } => order.get(*index).map(|player| player.0 - 1),
            _ => None,
        }),
    };

    FlowPosition { path, iterations, player_index, variables: game.flow_state.variables.clone() }
}

/// Rebuilds [FlowState::stack] from a previously-exported [FlowPosition],
/// walking `root` along the recorded path and recomputing each frame's
/// ephemeral state. A `simultaneous-action-step`'s `done` set cannot be
/// recovered this way (it isn't derivable from the flow graph) and
/// restores empty -- callers restoring mid-step should expect every
/// player to be re-prompted.
pub fn restore(game: &mut GameRoot, root: &FlowNode, position: &FlowPosition) -> color_eyre::Result<()> {
    let mut stack = Vec::with_capacity(position.path.len());
    let mut node = root;
    for (depth, &child_index) in position.path.iter().enumerate() {
        let iteration = position.iterations.get(&depth.to_string()).copied().unwrap_or(0);
        let state = match node {
            FlowNode::Sequence(_) => FrameState::Sequence { next_child: child_index },
            FlowNode::Loop(_) => FrameState::Loop { iteration },
            FlowNode::EachPlayer(config) => {
                FrameState::EachPlayer { order: resolve_each_player_order(game, config), index: iteration as usize }
            }
            FlowNode::ForEach(config) => {
                FrameState::ForEach { items: (config.collection)(game), index: iteration as usize }
            }
            FlowNode::If(_) => FrameState::If,
            FlowNode::Switch(_) => FrameState::Switch { branch: Some(child_index) },
            FlowNode::Phase(_) => FrameState::Phase,
            FlowNode::Execute(_) => FrameState::Execute,
            FlowNode::ActionStep(_) => FrameState::ActionStep { moves: iteration },
            FlowNode::SimultaneousActionStep(_) => FrameState::SimultaneousActionStep { done: BTreeSet::new() },
        };
        stack.push(Frame { child_index, state });
        node = node
            .nth_child(child_index)
            .ok_or_else(|| color_eyre::eyre::eyre!("Flow position path does not match flow graph at depth {depth}"))?;
    }

    game.flow_state.stack = stack;
    game.flow_state.variables = position.variables.clone();
    game.flow_state.complete = false;
    game.flow_state.awaiting = None;
    Ok(())
}

#[cfg(test)]
mod tests {
    use data::actions::definition::ActionDefinition;
    use data::actions::result::ActionResult;
    use data::flow::node::{ActionStepConfig, EachPlayerConfig, ForEachConfig, LoopConfig};
    use serde_json::Value as JsonValue;

    use super::*;

    fn increment_counter(game: &mut GameRoot) {
        let current = game.setting("counter").and_then(JsonValue::as_i64).unwrap_or(0);
        game.set_setting("counter", serde_json::json!(current + 1));
    }

    fn counter_below_three(game: &GameRoot) -> bool {
        game.setting("counter").and_then(JsonValue::as_i64).unwrap_or(0) < 3
    }

    fn record_current_player(game: &mut GameRoot) {
        let mut order: Vec<JsonValue> =
            game.setting("order").and_then(|value| value.as_array().cloned()).unwrap_or_default();
        order.push(serde_json::json!(game.tree.current_player().0));
        game.set_setting("order", JsonValue::Array(order));
    }

    fn three_items(_: &GameRoot) -> Vec<JsonValue> {
        vec![serde_json::json!(1), serde_json::json!(2), serde_json::json!(3)]
    }

    fn sum_item(game: &mut GameRoot) {
        let item = game.flow_state.variables.get("item").and_then(JsonValue::as_i64).unwrap_or(0);
        let current = game.setting("sum").and_then(JsonValue::as_i64).unwrap_or(0);
        game.set_setting("sum", serde_json::json!(current + item));
    }

    fn pass_execute(
        _: &mut GameRoot,
        _: PlayerPosition,
        _: Option<&ActionResult>,
        _: &data::picks::pick::CollectedArgs,
    ) -> ActionResult {
        ActionResult::ok()
    }

    fn legal_while_flag_set(game: &GameRoot, _: PlayerPosition) -> bool {
        game.setting("legal").and_then(JsonValue::as_bool).unwrap_or(true)
    }

    fn never_repeat_done(_: &GameRoot) -> bool {
        false
    }

    fn hand_size(game: &GameRoot, player: PlayerPosition) -> i64 {
        game.setting(&format!("hand_{}", player.0)).and_then(JsonValue::as_i64).unwrap_or(6)
    }

    fn set_hand_size(game: &mut GameRoot, player: PlayerPosition, size: i64) {
        game.set_setting(format!("hand_{}", player.0), serde_json::json!(size));
    }

    fn hand_at_or_below_four(game: &GameRoot, player: PlayerPosition) -> bool {
        hand_size(game, player) <= 4
    }

    fn all_seated_players(game: &GameRoot) -> Vec<PlayerPosition> {
        game.tree.players_in_order().into_iter().map(|player| player.position).collect()
    }

    #[test]
    fn sequence_runs_every_step_in_order() {
        let mut game = crate::actions::executor::tests::fresh_game(1);
        let root = FlowNode::Sequence(vec![
            FlowNode::Execute(increment_counter),
            FlowNode::Execute(increment_counter),
            FlowNode::Execute(increment_counter),
        ]);
        let result = start(&mut game, &root);
        assert!(matches!(result, Err(StopCondition::GameOver)));
        assert_eq!(game.setting("counter").and_then(JsonValue::as_i64), Some(3));
    }

    #[test]
    fn loop_runs_while_condition_holds() {
        let mut game = crate::actions::executor::tests::fresh_game(1);
        let root = FlowNode::Loop(LoopConfig {
            condition: Some(counter_below_three),
            max_iterations: None,
            body: Box::new(FlowNode::Execute(increment_counter)),
        });
        let result = start(&mut game, &root);
        assert!(matches!(result, Err(StopCondition::GameOver)));
        assert_eq!(game.setting("counter").and_then(JsonValue::as_i64), Some(3));
    }

    #[test]
    fn each_player_visits_every_seat_in_order() {
        let mut game = crate::actions::executor::tests::fresh_game(2);
        let root = FlowNode::EachPlayer(EachPlayerConfig {
            filter: None,
            direction: Direction::Forward,
            starting_player: None,
            body: Box::new(FlowNode::Execute(record_current_player)),
        });
        start(&mut game, &root).unwrap_err();
        let order = game.setting("order").cloned().unwrap();
        assert_eq!(order, serde_json::json!([1, 2]));
    }

    #[test]
    fn for_each_binds_the_loop_variable() {
        let mut game = crate::actions::executor::tests::fresh_game(1);
        let root = FlowNode::ForEach(ForEachConfig {
            collection: three_items,
            variable: "item".to_string(),
            body: Box::new(FlowNode::Execute(sum_item)),
        });
        start(&mut game, &root).unwrap_err();
        assert_eq!(game.setting("sum").and_then(JsonValue::as_i64), Some(6));
    }

    #[test]
    fn action_step_blocks_then_completes_once_a_move_is_recorded() {
        let mut game = crate::actions::executor::tests::fresh_game(1);
        game.register_action(ActionDefinition::builder("pass", pass_execute).build());
        let root = FlowNode::ActionStep(ActionStepConfig {
            player: None,
            actions: vec!["pass".to_string()],
            repeat_until: None,
            skip_if: None,
            min_moves: Some(1),
            max_moves: None,
        });

        let blocked = start(&mut game, &root);
        assert!(matches!(blocked, Err(StopCondition::AwaitingInput)));
        assert!(game.flow_state.awaiting.is_some());

        record_move(&mut game);
        let finished = resume(&mut game, &root);
        assert!(matches!(finished, Err(StopCondition::GameOver)));
    }

    #[test]
    fn action_step_completes_when_available_actions_empty_out_before_repeat_until_fires() {
        let mut game = crate::actions::executor::tests::fresh_game(1);
        game.register_action(ActionDefinition::builder("pass", pass_execute).condition(legal_while_flag_set).build());
        let root = FlowNode::ActionStep(ActionStepConfig {
            player: None,
            actions: vec!["pass".to_string()],
            repeat_until: Some(never_repeat_done),
            skip_if: None,
            min_moves: Some(1),
            max_moves: None,
        });

        start(&mut game, &root).unwrap_err();
        record_move(&mut game);

        // `minMoves` is met but `repeatUntil` never fires on its own, so the
        // step would ordinarily keep waiting for more moves -- until the
        // only action it offers stops being legal, which must complete the
        // step rather than block on an empty available-actions barrier.
        game.set_setting("legal", serde_json::json!(false));
        let finished = resume(&mut game, &root);
        assert!(matches!(finished, Err(StopCondition::GameOver)));
    }

    #[test]
    fn simultaneous_action_step_completes_only_after_every_player_is_done() {
        let mut game = crate::actions::executor::tests::fresh_game(3);
        game.register_action(ActionDefinition::builder("discard", pass_execute).build());
        let p1 = PlayerPosition(1);
        let p2 = PlayerPosition(2);
        let p3 = PlayerPosition(3);
        for player in [p1, p2, p3] {
            set_hand_size(&mut game, player, 6);
        }

        let root = FlowNode::SimultaneousActionStep(SimultaneousActionStepConfig {
            players: Some(all_seated_players),
            actions: vec!["discard".to_string()],
            player_done: Some(hand_at_or_below_four),
            all_done: None,
            skip_player: None,
        });

        start(&mut game, &root).unwrap_err();
        assert!(game.flow_state.awaiting.is_some());

        // Interleave discards across seats in a non-sequential order: each
        // player needs to discard down from 6 to 4, two discards apiece,
        // but nobody discards on consecutive turns.
        set_hand_size(&mut game, p2, 5);
        resume(&mut game, &root).unwrap_err();

        set_hand_size(&mut game, p1, 5);
        resume(&mut game, &root).unwrap_err();

        set_hand_size(&mut game, p2, 4);
        resume(&mut game, &root).unwrap_err();
        assert!(game.flow_state.awaiting.is_some(), "p1 and p3 still have more than four cards");

        set_hand_size(&mut game, p3, 5);
        resume(&mut game, &root).unwrap_err();

        set_hand_size(&mut game, p1, 4);
        let fifth = resume(&mut game, &root);
        assert!(matches!(fifth, Err(StopCondition::AwaitingInput)), "the fifth discard must not complete the step");

        set_hand_size(&mut game, p3, 4);
        let sixth = resume(&mut game, &root);
        assert!(matches!(sixth, Err(StopCondition::GameOver)), "the sixth discard must complete the step");
    }

    #[test]
    fn export_and_restore_round_trip_a_blocked_loop() {
        let mut game = crate::actions::executor::tests::fresh_game(1);
        game.register_action(ActionDefinition::builder("pass", pass_execute).build());
        let root = FlowNode::Loop(LoopConfig {
            condition: Some(counter_below_three),
            max_iterations: None,
            body: Box::new(FlowNode::Sequence(vec![
                FlowNode::Execute(increment_counter),
                FlowNode::ActionStep(ActionStepConfig {
                    player: None,
                    actions: vec!["pass".to_string()],
                    repeat_until: None,
                    skip_if: None,
                    min_moves: Some(1),
                    max_moves: Some(1),
                }),
            ])),
        });

        start(&mut game, &root).unwrap_err();
        let position = export_position(&game);

        let mut restored = crate::actions::executor::tests::fresh_game(1);
        restored.register_action(ActionDefinition::builder("pass", pass_execute).build());
        restored.set_setting("counter", serde_json::json!(1));
        restore(&mut restored, &root, &position).unwrap();

        record_move(&mut restored);
        resume(&mut restored, &root).unwrap_err();
        assert_eq!(restored.setting("counter").and_then(JsonValue::as_i64), Some(2));
    }
}
