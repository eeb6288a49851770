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

//! Per-player projected state: the broadcast payload a session pushes to
//! each subscribed viewer after every successful mutation.
//!
//! Builds on [rules::tree::projection] for the tree itself and
//! [rules::actions::availability] for per-action, per-pick legality, adding
//! the bookkeeping a client needs that isn't part of the tree: whose turn
//! it is, what's available to the viewer specifically, undo eligibility,
//! and pending animation events.

use data::animation::AnimationEventId;
use data::core::primitives::{GamePhase, PlayerPosition};
use data::elements::element::Element;
use data::game_states::flow_state::{AwaitingInput, FrameState};
use data::game_states::game_root::GameRoot;
use data::picks::pick::{ChoiceOption, CollectedArgs, ElementOption, PickKind};
use data::player_states::player_state::PlayersTrait;
use rules::actions::availability;
use rules::tree::projection::{self, ProjectedElement};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerView {
    pub position: PlayerPosition,
    pub name: Option<String>,
    pub is_current: bool,
}

/// Per-kind legal-set detail for one pick, computed against whatever args
/// the caller has collected so far (empty, if this is the first pick of a
/// fresh action).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PickOptions {
    Choice { choices: Vec<ChoiceOption> },
    Element { elements: Vec<ElementOption> },
    Elements { elements: Vec<ElementOption>, min_select: Option<usize>, max_select: Option<usize> },
    Number { min: i64, max: i64 },
    Text { max_len: usize },
    Player { players: Vec<PlayerPosition> },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PickView {
    pub name: String,
    pub prompt: Option<String>,
    pub optional: bool,
    pub skip_if_only_one: bool,

    /// Name of an earlier pick in the same action this one's legal set is
    /// indexed by, present so a client can fetch contingent data without a
    /// round trip once the dependency is chosen.
    pub depends_on: Option<String>,
    pub options: PickOptions,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionViewMetadata {
    pub name: String,
    pub available: bool,
    pub picks: Vec<PickView>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameView {
    pub viewer: PlayerPosition,
    pub phase: GamePhase,
    pub players: Vec<PlayerView>,
    pub current_player: Option<PlayerPosition>,
    pub tree: ProjectedElement,

    /// Names of actions currently available to `viewer` specifically --
    /// empty unless the flow engine is blocked on an input barrier this
    /// viewer may resume.
    pub available_actions: Vec<ActionViewMetadata>,

    pub can_undo: bool,
    pub moves_this_turn: u32,

    pub pending_animation_count: usize,
    pub last_animation_event_id: Option<AnimationEventId>,

    pub messages: Vec<String>,
}

fn player_views(game: &GameRoot) -> Vec<PlayerView> {
    game.tree
        .players_in_order()
        .into_iter()
        .map(|player| PlayerView {
            position: player.position,
            name: player.header.name.clone(),
            is_current: player.is_current,
        })
        .collect()
}

fn current_player(game: &GameRoot) -> Option<PlayerPosition> {
    game.tree.players_in_order().into_iter().find(|player| player.is_current).map(|player| player.position)
}

/// Names of actions the flow engine is currently willing to accept from
/// `viewer`, drawn from whichever [AwaitingInput] variant the flow state
/// holds. Empty if the engine isn't blocked, or is blocked waiting on a
/// different player.
fn names_available_to(game: &GameRoot, viewer: PlayerPosition) -> Vec<String> {
    match &game.flow_state.awaiting {
        Some(AwaitingInput::ActionStep { player, available_actions }) if *player == viewer => {
            available_actions.clone()
        }
        Some(AwaitingInput::SimultaneousActionStep { available_actions }) => {
            available_actions.get(&viewer).cloned().unwrap_or_default()
        }
        _ => vec![],
    }
}

fn pick_view(game: &GameRoot, viewer: PlayerPosition, args: &CollectedArgs, pick: &data::picks::pick::Pick) -> PickView {
    let options = match &pick.kind {
        PickKind::Choice { legal } => PickOptions::Choice { choices: legal(game, viewer, args) },
        PickKind::Element { legal } => PickOptions::Element { elements: legal(game, viewer, args) },
        PickKind::Elements { legal, multi_select } => PickOptions::Elements {
            elements: legal(game, viewer, args),
            min_select: multi_select.map(|bounds| bounds.min),
            max_select: multi_select.map(|bounds| bounds.max),
        },
        PickKind::Number { min, max } => PickOptions::Number { min: *min, max: *max },
        PickKind::Text { max_len } => PickOptions::Text { max_len: *max_len },
        PickKind::Player { legal } => PickOptions::Player { players: legal(game, viewer, args) },
    };
    PickView {
        name: pick.name.clone(),
        prompt: pick.prompt.clone(),
        optional: pick.optional,
        skip_if_only_one: pick.skip_if_only_one,
        depends_on: pick.depends_on.clone(),
        options,
    }
}

fn action_metadata(game: &GameRoot, viewer: PlayerPosition, action_name: &str) -> Option<ActionViewMetadata> {
    let action = game.action(action_name)?;
    let available = availability::is_available(game, viewer, action);
    let args = CollectedArgs::new();
    let picks = action.picks.iter().map(|pick| pick_view(game, viewer, &args, pick)).collect();
    Some(ActionViewMetadata { name: action_name.to_string(), available, picks })
}

/// Number of actions the currently-blocked action step has accepted so far,
/// for whichever player is at the top of the flow stack's active
/// `action-step`/`simultaneous-action-step` frame. Zero if no such frame is
/// on the stack (e.g. the flow engine isn't currently blocked).
fn moves_this_turn(game: &GameRoot) -> u32 {
    game.flow_state
        .stack
        .iter()
        .rev()
        .find_map(|frame| match &frame.state {
            FrameState::ActionStep { moves } => Some(*moves),
            _ => None,
        })
        .unwrap_or(0)
}

/// Builds `viewer`'s projected view of `game`: the visibility-filtered
/// tree, who's current, what `viewer` may do right now, and outstanding
/// animation/undo bookkeeping.
pub fn project(game: &GameRoot, viewer: PlayerPosition) -> GameView {
    let tree = projection::project_for_player(&game.tree, game.tree.root_id(), viewer);
    let available_actions =
        names_available_to(game, viewer).into_iter().filter_map(|name| action_metadata(game, viewer, &name)).collect();

    GameView {
        viewer,
        phase: game.phase,
        players: player_views(game),
        current_player: current_player(game),
        tree,
        available_actions,
        can_undo: !game.history.is_empty(),
        moves_this_turn: moves_this_turn(game),
        pending_animation_count: game.animations.events().len(),
        last_animation_event_id: game.animations.last_event_id(),
        messages: game.rendered_messages(),
    }
}

#[cfg(test)]
mod tests {
    use data::actions::definition::ActionDefinition;
    use data::actions::result::ActionResult;
    use data::elements::element::{ElementHeader, PlayerData, SpaceData};
    use data::game_states::class_registry::ClassRegistry;
    use data::game_states::element_tree::ElementTree;
    use data::picks::pick::{Pick, PickKind};

    use super::*;

    fn no_choices(_: &GameRoot, _: PlayerPosition, _: &CollectedArgs) -> Vec<ChoiceOption> {
        vec![]
    }

    fn execute(
        _: &mut GameRoot,
        _: PlayerPosition,
        _: Option<&ActionResult>,
        _: &CollectedArgs,
    ) -> ActionResult {
        ActionResult::ok()
    }

    fn build_game() -> GameRoot {
        let mut tree = ElementTree::new();
        let root_id = tree.next_id();
        tree.set_root_id(root_id);
        tree.insert(Element::Space(SpaceData { header: ElementHeader::new(root_id, "Space"), zone_visibility: None }));
        let pile_id = tree.next_id();
        tree.insert(Element::Space(SpaceData { header: ElementHeader::new(pile_id, "Space"), zone_visibility: None }));
        tree.set_pile_id(pile_id);

        let player_id = tree.next_id();
        let mut header = ElementHeader::new(player_id, "Player");
        header.parent = Some(root_id);
        header.name = Some("Alice".to_string());
        tree.get_mut(root_id).header_mut().insert_child(player_id);
        tree.insert(Element::Player(PlayerData { header, position: PlayerPosition::FIRST, is_current: true }));

        let mut game = GameRoot {
            id: data::core::primitives::GameId::new(),
            configuration: Default::default(),
            phase: GamePhase::Started,
            tree,
            rng: data::core::rng::SeededRng::new("seed"),
            messages: vec![],
            settings: Default::default(),
            history: Default::default(),
            flow_state: Default::default(),
            animations: Default::default(),
            pending_action: None,
            registry: ClassRegistry::new(),
            actions: Default::default(),
            flow_graph: None,
        };
        game.register_action(
            ActionDefinition::builder("discard", execute)
                .pick(Pick::new("card", PickKind::Choice { legal: no_choices }))
                .build(),
        );
        game
    }

    #[test]
    fn view_lists_players_and_current_player() {
        let game = build_game();
        let view = project(&game, PlayerPosition::FIRST);
        assert_eq!(view.players.len(), 1);
        assert_eq!(view.current_player, Some(PlayerPosition::FIRST));
    }

    #[test]
    fn no_actions_are_available_when_the_flow_is_not_blocked() {
        let game = build_game();
        let view = project(&game, PlayerPosition::FIRST);
        assert!(view.available_actions.is_empty());
    }

    #[test]
    fn available_actions_surface_when_the_flow_is_blocked_on_this_viewer() {
        let mut game = build_game();
        game.flow_state.awaiting = Some(AwaitingInput::ActionStep {
            player: PlayerPosition::FIRST,
            available_actions: vec!["discard".to_string()],
        });
        let view = project(&game, PlayerPosition::FIRST);
        assert_eq!(view.available_actions.len(), 1);
        assert!(!view.available_actions[0].available);
    }

    #[test]
    fn available_actions_do_not_leak_to_a_different_blocked_player() {
        let mut game = build_game();
        game.flow_state.awaiting = Some(AwaitingInput::ActionStep {
            player: PlayerPosition(2),
            available_actions: vec!["discard".to_string()],
        });
        let view = project(&game, PlayerPosition::FIRST);
        assert!(view.available_actions.is_empty());
    }
}
