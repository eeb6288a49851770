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

//! Ties the element tree, action executor, and flow engine together into
//! the thing a host transport actually drives: an event-sourced
//! `actionHistory`, replay from scratch, rewind, broadcast to subscribed
//! viewers, cooperative AI scheduling, and hot reload.
//!
//! A [Session] owns exactly one live [GameRoot] plus everything needed to
//! rebuild it from nothing: the [GameDefinition] that supplies classes,
//! actions and the flow graph, and the [GameConstructionOptions] the lobby
//! originally supplied. Every path that recreates the game -- replay,
//! rewind, hot reload's full-replay fallback -- forwards those same
//! options, so constructor-time logic (roles, colors, seating) always sees
//! the same inputs it saw originally.

pub mod ai;
pub mod broadcast;
pub mod checkpoint;

use std::collections::BTreeMap;

use color_eyre::eyre::{bail, eyre};
use data::actions::result::{ActionResult, FollowUp};
use data::core::primitives::{GamePhase, PlayerPosition};
use data::error::EngineError;
use data::game_states::class_registry::ClassRegistry;
use data::game_states::game_root::GameRoot;
use data::game_states::history_data::{GameHistory, SerializedAction};
use data::picks::pick::{CollectedArgs, PickValue};
use data::player_states::player_state::PlayersTrait;
use rules::actions::executor::{self, DependentLegalSet, StepOutcome};
use rules::flow::engine;
use serde_json::Value as JsonValue;
use tracing::instrument;
use utils::outcome::{Outcome, StopCondition};

use crate::construction::{self, GameConstructionOptions, GameDefinition};
use crate::session::ai::{AiCircuitBreaker, AiSelectFn};
use crate::session::broadcast::Broadcaster;
use crate::session::checkpoint::CheckpointManager;
use crate::snapshot::{self, GameSnapshot};
use crate::validator;
use crate::view::{self, GameView};

/// What [Session::hot_reload] actually had to do to bring the live game
/// onto the new class set, surfaced so a host can log or alert on the
/// degraded paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HotReloadOutcome {
    /// The live snapshot validated directly against the new registry; the
    /// flow was re-attached at its existing position.
    FastPath,

    /// The live snapshot didn't validate; a held checkpoint at or before
    /// `from_nonce` did, and the suffix of history from `from_nonce` was
    /// replayed on top of it.
    PartialReplay { from_nonce: usize },

    /// Neither the live snapshot nor any held checkpoint validated; the
    /// game was rebuilt from scratch and the full history replayed.
    FullReplay,
}

/// Decodes a serialized action's wire-form args (pick name to JSON value)
/// back into [CollectedArgs], the shape the executor consumes.
fn decode_args(args: &BTreeMap<String, JsonValue>) -> color_eyre::Result<CollectedArgs> {
    args.iter()
        .map(|(name, value)| {
            let decoded: PickValue = serde_json::from_value(value.clone())
                .map_err(|err| eyre!("Could not decode pick '{name}': {err}"))?;
            Ok((name.clone(), decoded))
        })
        .collect()
}

/// An in-flight follow-up chain: the action that will be offered next, and
/// the result of the action that produced it, forwarded to the follow-up's
/// `execute` as its "previous result" context.
struct PendingChain {
    follow_up: FollowUp,
    previous_result: ActionResult,
}

/// Applies the consequences of a just-completed action to the flow engine:
/// a follow-up postpones move-counting and leaves the flow frame where it
/// is; anything else increments the move count and resumes the flow graph
/// to its next input barrier (or completion).
fn advance_flow(
    game: &mut GameRoot,
    pending_chain: &mut Option<PendingChain>,
    result: &ActionResult,
) -> color_eyre::Result<()> {
    if let Some(follow_up) = &result.follow_up {
        *pending_chain = Some(PendingChain { follow_up: follow_up.clone(), previous_result: result.clone() });
        return Ok(());
    }
    *pending_chain = None;

    engine::record_move(game);
    if game.flow_state.complete {
        return Ok(());
    }
    let Some(flow_graph) = game.flow_graph.clone() else { return Ok(()) };
    let outcome = engine::resume(game, &flow_graph);
    apply_outcome(game, outcome)
}

fn apply_outcome(game: &mut GameRoot, outcome: Outcome) -> color_eyre::Result<()> {
    match outcome {
        Ok(()) => Ok(()),
        Err(StopCondition::AwaitingInput) => Ok(()),
        Err(StopCondition::GameOver) => {
            game.phase = GamePhase::Finished;
            Ok(())
        }
        Err(StopCondition::Error(report)) => Err(report),
    }
}

/// Constructs a fresh game from `options` and reapplies every action in
/// `history` in order, exactly as §4.9 describes replay: a mismatch
/// against `definition`'s class registry or an action that fails where it
/// once succeeded is a hard divergence, not a partial result.
#[instrument(level = "debug", skip(definition, history))]
pub fn replay(
    definition: &dyn GameDefinition,
    options: GameConstructionOptions,
    history: &GameHistory,
) -> color_eyre::Result<GameRoot> {
    let mut game = construction::new_game(definition, options)?;
    let flow_graph = definition.build_flow_graph();
    game.flow_graph = Some(flow_graph.clone());
    apply_outcome(&mut game, engine::start(&mut game, &flow_graph))?;

    let mut pending_chain: Option<PendingChain> = None;
    for action in &history.actions {
        let args = decode_args(&action.args)?;
        let previous_result = pending_chain.as_ref().map(|chain| &chain.previous_result);
        let result =
            executor::perform_action(&mut game, action.player, &action.name, args, previous_result).map_err(
                |err| {
                    eyre!(
                        "Replay diverged: action '{}' by player {} failed during replay ({err}). Registered \
                         classes: {:?}",
                        action.name,
                        action.player,
                        game.registry.registered_names(),
                    )
                },
            )?;
        if !result.success {
            bail!(
                "Replay diverged: action '{}' by player {} reported failure during replay that it did not report \
                 originally: {:?}",
                action.name,
                action.player,
                result.error,
            );
        }
        advance_flow(&mut game, &mut pending_chain, &result)?;
    }
    Ok(game)
}

/// Event-sourced wrapper around a single live [GameRoot]: owns the
/// action history, drives the action executor and flow engine together,
/// and exposes the session-level operations (replay, rewind, hot reload,
/// broadcast, cooperative AI) that sit above the bare engine.
pub struct Session {
    pub game: GameRoot,
    definition: Box<dyn GameDefinition>,
    options: GameConstructionOptions,
    broadcaster: Broadcaster,
    checkpoints: CheckpointManager,
    ai_breakers: BTreeMap<PlayerPosition, AiCircuitBreaker>,
    ai_agents: BTreeMap<PlayerPosition, AiSelectFn>,

    /// Set while a follow-up chain is in progress: the only action
    /// [Session::perform_action]/[Session::submit_pick] will currently
    /// accept is `pending_chain.follow_up`, and [Session::view] narrows
    /// `available_actions` for the acting player to match. Also carries the
    /// result of the action that produced the follow-up, so it can be
    /// handed to the follow-up's own `execute` as its "previous result"
    /// context.
    pending_chain: Option<PendingChain>,
}

impl Session {
    /// Builds a fresh game from `definition`/`options` and starts its flow
    /// graph, running it to the first input barrier (or to completion, for
    /// a vacuous flow graph).
    #[instrument(level = "debug", skip(definition))]
    pub fn new(definition: Box<dyn GameDefinition>, options: GameConstructionOptions) -> color_eyre::Result<Self> {
        let mut game = construction::new_game(definition.as_ref(), options.clone())?;
        let outcome = construction::start_game(&mut game, definition.as_ref());
        apply_outcome(&mut game, outcome)?;
        Ok(Self {
            game,
            definition,
            options,
            broadcaster: Broadcaster::new(),
            checkpoints: CheckpointManager::new(),
            ai_breakers: BTreeMap::new(),
            ai_agents: BTreeMap::new(),
            pending_chain: None,
        })
    }

    pub fn subscribe(&mut self, player: PlayerPosition, sink: Box<dyn broadcast::ViewerSink>) {
        self.broadcaster.subscribe(player, sink);
    }

    pub fn unsubscribe_all(&mut self, player: PlayerPosition) {
        self.broadcaster.unsubscribe_all(player);
    }

    /// Registers `select` as `player`'s cooperative AI strategy. Every
    /// successful action checks [Self::next_to_act] and, if it names a
    /// seat with a registered strategy, the caller's event loop is
    /// expected to drive [Self::schedule_ai_turn] for it -- see that
    /// method's doc comment for why this isn't triggered automatically
    /// from inside `perform_action` itself.
    pub fn register_ai(&mut self, player: PlayerPosition, select: AiSelectFn) {
        self.ai_agents.insert(player, select);
    }

    /// The seat the flow engine is currently awaiting input from, if any
    /// single seat is named (a simultaneous step awaiting several players
    /// has no single answer and returns `None`).
    pub fn next_to_act(&self) -> Option<PlayerPosition> {
        match &self.game.flow_state.awaiting {
            Some(data::game_states::flow_state::AwaitingInput::ActionStep { player, .. }) => Some(*player),
            _ => None,
        }
    }

    pub fn has_ai(&self, player: PlayerPosition) -> bool {
        self.ai_agents.contains_key(&player)
    }

    /// `viewer`'s projected state, narrowed to the single follow-up action
    /// if one is currently outstanding -- see [Self::pending_chain].
    pub fn view(&self, viewer: PlayerPosition) -> GameView {
        let mut projected = view::project(&self.game, viewer);
        if let Some(chain) = &self.pending_chain {
            projected.available_actions.retain(|metadata| metadata.name == chain.follow_up.action);
        }
        projected
    }

    /// Legal-set data for `pick_name` of `action_name`, indexed by every
    /// legal value of the pick it `dependsOn`, for a client that wants
    /// contingent choices without driving execute yet.
    pub fn pick_choices(
        &self,
        player: PlayerPosition,
        action_name: &str,
        pick_name: &str,
    ) -> Result<Option<DependentLegalSet>, EngineError> {
        let action = self.game.action(action_name).ok_or_else(|| EngineError::action_not_found(action_name))?;
        let pick = action.pick(pick_name).ok_or_else(|| EngineError::pick_not_found(pick_name))?;
        Ok(executor::dependent_legal_set(&self.game, player, action, pick))
    }

    fn validate_player(&self, player: PlayerPosition) -> Result<(), EngineError> {
        if player.0 == 0 || player.0 as usize > self.game.tree.player_count() {
            return Err(EngineError::invalid_player(format!(
                "No player seat at position {player}; this game has {} seats",
                self.game.tree.player_count()
            )));
        }
        Ok(())
    }

    fn validate_follow_up(&self, action_name: &str) -> Result<(), EngineError> {
        if let Some(chain) = &self.pending_chain {
            if chain.follow_up.action != action_name {
                return Err(EngineError::action_not_available(action_name));
            }
        }
        Ok(())
    }

    /// Performs `action_name` with a full args map supplied up front --
    /// the "direct"/serialized entry point. Advances the flow engine and
    /// broadcasts to subscribers on success.
    #[instrument(level = "debug", skip(self, args))]
    pub fn perform_action(
        &mut self,
        player: PlayerPosition,
        action_name: &str,
        args: CollectedArgs,
    ) -> Result<ActionResult, EngineError> {
        self.validate_player(player)?;
        self.validate_follow_up(action_name)?;
        let previous_result = self.pending_chain.as_ref().map(|chain| &chain.previous_result);
        let result = executor::perform_action(&mut self.game, player, action_name, args, previous_result)?;
        if result.success {
            self.after_successful_action(&result);
        }
        Ok(result)
    }

    /// Begins step-by-step resolution of `action_name` for an action that
    /// needs server-mediated work (an `onSelect` hook, a repeating pick,
    /// or a caller that just wants stepwise control regardless).
    pub fn begin_pending(&mut self, player: PlayerPosition, action_name: &str) -> Result<(), EngineError> {
        self.validate_player(player)?;
        self.validate_follow_up(action_name)?;
        let previous_result = self.pending_chain.as_ref().map(|chain| chain.previous_result.clone());
        executor::begin_pending(&mut self.game, player, action_name, previous_result)
    }

    /// Submits one pick's value for the in-flight pending action. Advances
    /// the flow engine and broadcasts once the action completes.
    pub fn submit_pick(
        &mut self,
        player: PlayerPosition,
        pick_name: &str,
        value: PickValue,
    ) -> Result<StepOutcome, EngineError> {
        self.validate_player(player)?;
        let outcome = executor::submit_pick(&mut self.game, player, pick_name, value)?;
        if let StepOutcome::Completed(result) = &outcome {
            if result.success {
                self.after_successful_action(result);
            }
        }
        Ok(outcome)
    }

    fn after_successful_action(&mut self, result: &ActionResult) {
        if let Err(report) = advance_flow(&mut self.game, &mut self.pending_chain, result) {
            tracing::error!(error = %report, "Flow engine failed to advance after a successful action");
        }
        self.checkpoints.maybe_capture(&self.game);
        self.broadcaster.broadcast(&self.game);
    }

    /// Marks `player` done within the currently awaited
    /// `simultaneous-action-step`, re-checking `playerDone`/`allDone` on
    /// the next resume. The engine itself re-derives completion from
    /// those predicates; this only records an explicit "I'm finished"
    /// signal for a player with no predicate driving it automatically.
    pub fn mark_player_done(&mut self, player: PlayerPosition) {
        engine::mark_player_done(&mut self.game, player);
    }

    /// Rebuilds the game from scratch and replays `self.game.history`'s
    /// prefix up to (not including) `index`, for undo/rewind. A later
    /// caller is expected to reapply whatever actions should replace the
    /// discarded suffix via the ordinary [Self::perform_action] path.
    #[instrument(level = "debug", skip(self))]
    pub fn rewind(&mut self, index: usize) -> Result<(), EngineError> {
        let len = self.game.history.len();
        if len == 0 {
            return Err(EngineError::no_actions_to_undo());
        }
        if index > len {
            return Err(EngineError::cannot_rewind_forward(len, index));
        }
        let truncated =
            GameHistory { actions: self.game.history.prefix(index).to_vec(), created_at_millis: self.game.history.created_at_millis };
        let rebuilt = replay(self.definition.as_ref(), self.options.clone(), &truncated)
            .map_err(|err| EngineError::replay_failed(err.to_string()))?;
        self.game = rebuilt;
        self.checkpoints.clear();
        self.pending_chain = None;
        Ok(())
    }

    /// Rewinds by exactly one action.
    pub fn undo(&mut self) -> Result<(), EngineError> {
        let len = self.game.history.len();
        if len == 0 {
            return Err(EngineError::no_actions_to_undo());
        }
        self.rewind(len - 1)
    }

    /// Swaps in `new_definition`'s class set without restarting the
    /// session. Tries, in order: (1) a fast path that validates the live
    /// tree directly against the new registry and re-attaches the flow at
    /// its existing position; (2) a partial replay from the most recent
    /// checkpoint that itself validates, replaying only the suffix of
    /// history after it; (3) a full replay from scratch. Every path
    /// forwards `self.options` so constructor-time logic sees the same
    /// lobby inputs it originally did.
    #[instrument(level = "debug", skip(self, new_definition))]
    pub fn hot_reload(&mut self, new_definition: Box<dyn GameDefinition>) -> color_eyre::Result<HotReloadOutcome> {
        let mut registry = ClassRegistry::new();
        new_definition.register_classes(&mut registry);

        let live_snapshot = snapshot::capture(&self.game);
        if validator::validate(&live_snapshot, &registry).is_ok() {
            let position = engine::export_position(&self.game);
            self.apply_restored_snapshot(new_definition.as_ref(), registry, &live_snapshot, position)?;
            self.definition = new_definition;
            return Ok(HotReloadOutcome::FastPath);
        }

        if let Some((nonce, record)) = self.checkpoints.valid_at_or_before(self.game.history.len(), &registry) {
            let checkpoint_snapshot = record.snapshot.clone();
            let checkpoint_position = record.flow_position.clone();
            let suffix: Vec<SerializedAction> = self.game.history.actions[nonce..].to_vec();

            self.apply_restored_snapshot(new_definition.as_ref(), registry, &checkpoint_snapshot, checkpoint_position)?;
            self.pending_chain = None;
            for action in &suffix {
                let args = decode_args(&action.args)?;
                let previous_result = self.pending_chain.as_ref().map(|chain| &chain.previous_result);
                let result = executor::replay_action(&mut self.game, action.player, &action.name, args, previous_result)
                    .map_err(|err| eyre!("Partial replay diverged on action '{}': {err}", action.name))?;
                if !result.success {
                    bail!("Partial replay diverged: action '{}' failed: {:?}", action.name, result.error);
                }
                advance_flow(&mut self.game, &mut self.pending_chain, &result)?;
            }

            self.definition = new_definition;
            return Ok(HotReloadOutcome::PartialReplay { from_nonce: nonce });
        }

        let rebuilt = replay(new_definition.as_ref(), self.options.clone(), &self.game.history)?;
        self.game = rebuilt;
        self.definition = new_definition;
        self.checkpoints.clear();
        self.pending_chain = None;
        Ok(HotReloadOutcome::FullReplay)
    }

    /// Restores `snapshot` into `self.game`'s tree under `registry`,
    /// re-registers `definition`'s actions, and re-attaches a freshly
    /// built flow graph at `position`.
    fn apply_restored_snapshot(
        &mut self,
        definition: &dyn GameDefinition,
        registry: ClassRegistry,
        snapshot: &GameSnapshot,
        position: data::flow::position::FlowPosition,
    ) -> color_eyre::Result<()> {
        let tree = snapshot::restore(snapshot, &registry)?;
        self.game.tree = tree;
        self.game.phase = snapshot.phase;
        self.game.messages = snapshot.messages.clone();
        self.game.settings = snapshot.settings.clone();
        self.game.registry = registry;
        self.game.actions = Default::default();
        self.game.pending_action = None;
        definition.register_actions(&mut self.game);

        let flow_graph = definition.build_flow_graph();
        engine::restore(&mut self.game, &flow_graph, &position)?;
        self.game.flow_graph = Some(flow_graph);
        Ok(())
    }

    /// Offers `player`'s registered AI strategy (see [Self::register_ai]) a
    /// move after a short thinking delay, performing it through the
    /// ordinary [Self::perform_action] path if one comes back. Opens the
    /// seat's circuit breaker after three consecutive failures (the
    /// strategy returning `None`, or the chosen action failing to
    /// perform) and refuses to schedule further checks until it's reset.
    ///
    /// Deliberately not invoked automatically from inside
    /// [Self::perform_action]/[Self::submit_pick]: those run synchronously
    /// and this is `async` (it awaits the thinking delay), so the event
    /// loop -- not the session -- decides when to poll [Self::next_to_act]
    /// and drive this for whichever seat it names.
    #[instrument(level = "debug", skip(self))]
    pub async fn schedule_ai_turn(&mut self, player: PlayerPosition) -> Option<Result<ActionResult, EngineError>> {
        let select = *self.ai_agents.get(&player)?;
        if self.ai_breakers.entry(player).or_default().is_open() {
            return None;
        }
        let chosen = ai::select_after_delay(&self.game, player, select).await;
        let Some(action) = chosen else {
            self.ai_breakers.entry(player).or_default().record_failure();
            return None;
        };
        let args = match decode_args(&action.args) {
            Ok(args) => args,
            Err(err) => {
                self.ai_breakers.entry(player).or_default().record_failure();
                return Some(Err(EngineError::internal(err.to_string())));
            }
        };
        let result = self.perform_action(action.player, &action.name, args);
        let breaker = self.ai_breakers.entry(player).or_default();
        match &result {
            Ok(result) if result.success => breaker.record_success(),
            _ => breaker.record_failure(),
        }
        Some(result)
    }
}

#[cfg(test)]
mod tests {
    use data::actions::definition::ActionDefinition;
    use data::actions::result::ActionResult as Result_;
    use data::elements::element::{Element, ElementHeader, ElementKind, PlayerData};
    use data::flow::node::{ActionStepConfig, FlowNode};
    use data::picks::pick::{ChoiceOption, Pick, PickKind};

    use super::*;

    #[derive(Clone)]
    struct CountingGame;

    fn construct_player(id: data::core::primitives::ElementId, class_name: &str) -> Element {
        Element::Player(PlayerData { header: ElementHeader::new(id, class_name), position: PlayerPosition::FIRST, is_current: false })
    }

    fn pass_choices(_: &GameRoot, _: PlayerPosition, _: &CollectedArgs) -> Vec<ChoiceOption> {
        vec![ChoiceOption { value: "pass".into(), label: "Pass".into(), disabled_reason: None }]
    }

    fn pass_execute(game: &mut GameRoot, _: PlayerPosition, _: Option<&Result_>, _: &CollectedArgs) -> Result_ {
        let count = game.setting("count").and_then(JsonValue::as_i64).unwrap_or(0);
        game.set_setting("count", serde_json::json!(count + 1));
        Result_::ok()
    }

    fn chain_a_execute(_: &mut GameRoot, _: PlayerPosition, _: Option<&Result_>, _: &CollectedArgs) -> Result_ {
        Result_::ok_with_data(serde_json::json!("from-chain-a"))
            .with_follow_up(FollowUp { action: "chain-b".to_string(), args: CollectedArgs::new() })
    }

    fn chain_b_execute(_: &mut GameRoot, _: PlayerPosition, previous: Option<&Result_>, _: &CollectedArgs) -> Result_ {
        Result_::ok_with_data(previous.and_then(|result| result.data.clone()).unwrap_or(JsonValue::Null))
    }

    impl GameDefinition for CountingGame {
        fn register_classes(&self, registry: &mut ClassRegistry) {
            registry.register("Player", ElementKind::Player, construct_player);
        }

        fn player_class_name(&self) -> &str {
            "Player"
        }

        fn register_actions(&self, game: &mut GameRoot) {
            game.register_action(
                ActionDefinition::builder("pass", pass_execute)
                    .pick(Pick::new("choice", PickKind::Choice { legal: pass_choices }).skip_if_only_one())
                    .build(),
            );
            game.register_action(ActionDefinition::builder("chain-a", chain_a_execute).build());
            game.register_action(ActionDefinition::builder("chain-b", chain_b_execute).build());
        }

        fn build_flow_graph(&self) -> FlowNode {
            FlowNode::ActionStep(ActionStepConfig {
                player: None,
                actions: vec!["pass".to_string(), "chain-a".to_string(), "chain-b".to_string()],
                repeat_until: None,
                skip_if: None,
                min_moves: Some(1),
                max_moves: Some(3),
            })
        }
    }

    fn new_session(player_count: u32) -> Session {
        Session::new(Box::new(CountingGame), GameConstructionOptions::new(player_count).with_seed("seed")).unwrap()
    }

    #[test]
    fn perform_action_counts_a_move_and_rearms_the_barrier() {
        let mut session = new_session(1);
        let result = session.perform_action(PlayerPosition::FIRST, "pass", CollectedArgs::new()).unwrap();
        assert!(result.success);
        assert_eq!(session.game.setting("count").and_then(JsonValue::as_i64), Some(1));
        assert_eq!(session.game.history.len(), 1);
    }

    #[test]
    fn follow_up_does_not_count_a_move_until_the_chain_completes() {
        let mut session = new_session(1);
        let result = session.perform_action(PlayerPosition::FIRST, "chain-a", CollectedArgs::new()).unwrap();
        assert!(result.success);
        assert!(result.follow_up.is_some());

        // Only the follow-up is offered; the flow hasn't advanced.
        let view = session.view(PlayerPosition::FIRST);
        assert_eq!(view.available_actions.len(), 1);
        assert_eq!(view.available_actions[0].name, "chain-b");

        // A different action is rejected while the follow-up is pending.
        assert!(session.perform_action(PlayerPosition::FIRST, "pass", CollectedArgs::new()).is_err());

        let second = session.perform_action(PlayerPosition::FIRST, "chain-b", CollectedArgs::new()).unwrap();
        assert!(second.success);
        assert!(second.follow_up.is_none());
        assert_eq!(session.game.history.len(), 2);

        // The follow-up saw chain-a's result as its "previous result" context.
        assert_eq!(second.data, Some(serde_json::json!("from-chain-a")));
    }

    #[test]
    fn rewind_reproduces_the_state_before_the_discarded_actions() {
        let mut session = new_session(2);
        session.perform_action(PlayerPosition::FIRST, "pass", CollectedArgs::new()).unwrap();
        let after_one = session.game.setting("count").cloned();

        session.perform_action(PlayerPosition(2), "pass", CollectedArgs::new()).unwrap();
        assert_eq!(session.game.history.len(), 2);

        session.rewind(1).unwrap();
        assert_eq!(session.game.history.len(), 1);
        assert_eq!(session.game.setting("count").cloned(), after_one);
    }

    #[test]
    fn rewind_rejects_an_index_past_the_current_history_length() {
        let mut session = new_session(1);
        session.perform_action(PlayerPosition::FIRST, "pass", CollectedArgs::new()).unwrap();
        assert!(session.rewind(5).is_err());
    }

    #[test]
    fn undo_with_no_history_is_rejected() {
        let mut session = new_session(1);
        assert!(session.undo().is_err());
    }

    #[test]
    fn replay_reproduces_the_same_history_deterministically() {
        let mut session = new_session(2);
        session.perform_action(PlayerPosition::FIRST, "pass", CollectedArgs::new()).unwrap();
        session.perform_action(PlayerPosition(2), "pass", CollectedArgs::new()).unwrap();

        let replayed =
            replay(&CountingGame, GameConstructionOptions::new(2).with_seed("seed"), &session.game.history).unwrap();
        assert_eq!(replayed.setting("count"), session.game.setting("count"));
        assert_eq!(replayed.history.len(), session.game.history.len());
    }

    #[test]
    fn hot_reload_fast_path_preserves_history_and_flow_position() {
        let mut session = new_session(1);
        session.perform_action(PlayerPosition::FIRST, "pass", CollectedArgs::new()).unwrap();

        let outcome = session.hot_reload(Box::new(CountingGame)).unwrap();
        assert_eq!(outcome, HotReloadOutcome::FastPath);
        assert_eq!(session.game.history.len(), 1);
        assert_eq!(session.game.setting("count").and_then(JsonValue::as_i64), Some(1));
    }

    struct MissingPlayerClassGame;

    impl GameDefinition for MissingPlayerClassGame {
        fn register_classes(&self, _registry: &mut ClassRegistry) {
            // Deliberately omits "Player" to force hot reload's fast path
            // to fail validation.
        }

        fn player_class_name(&self) -> &str {
            "Player"
        }

        fn register_actions(&self, game: &mut GameRoot) {
            CountingGame.register_actions(game);
        }

        fn build_flow_graph(&self) -> FlowNode {
            CountingGame.build_flow_graph()
        }
    }

    #[test]
    fn hot_reload_falls_back_to_full_replay_when_no_checkpoint_validates() {
        let mut session = new_session(1);
        session.perform_action(PlayerPosition::FIRST, "pass", CollectedArgs::new()).unwrap();

        let outcome = session.hot_reload(Box::new(MissingPlayerClassGame)).unwrap();
        assert_eq!(outcome, HotReloadOutcome::FullReplay);
    }
}
