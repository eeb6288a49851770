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

use std::time::{SystemTime, UNIX_EPOCH};

use color_eyre::eyre::{bail, Context, Result};
use data::core::primitives::{GameId, GamePhase, PlayerPosition};
use data::elements::element::{AttributeMap, Element, ElementHeader, SpaceData};
use data::flow::node::FlowNode;
use data::game_states::class_registry::ClassRegistry;
use data::game_states::element_tree::ElementTree;
use data::game_states::game_root::{GameConfiguration, GameRoot};
use data::game_states::history_data::GameHistory;
use data::player_states::player_state::set_current_player;
use rules::flow::engine;
use rules::tree::mutation;
use tracing::instrument;

/// Everything a particular game supplies to the engine: its element
/// classes, its action set, and the static shape of its turn structure.
/// One implementation of this trait exists per game; the engine itself
/// knows nothing about any concrete game's content.
pub trait GameDefinition {
    /// Registers every element class this game uses beyond the base
    /// `Space`/`Piece` pair the registry auto-registers. Must include a
    /// class usable for player seats (see [Self::player_class_name]).
    fn register_classes(&self, registry: &mut ClassRegistry);

    /// Name of the registered class constructed for each player seat.
    /// [new_game] overwrites the constructed element's `position` and
    /// `is_current` fields itself, so the constructor only needs to
    /// produce *some* valid [data::elements::element::PlayerData].
    fn player_class_name(&self) -> &str;

    /// Registers every [data::actions::definition::ActionDefinition] this
    /// game exposes.
    fn register_actions(&self, game: &mut GameRoot);

    /// Builds this game's flow graph. Called once per [start_game]; the
    /// resulting tree is cloned into [GameRoot::flow_graph] so later
    /// `resume`/`restore` calls don't need the [GameDefinition] at hand.
    fn build_flow_graph(&self) -> FlowNode;

    /// One-time setup run after players, pile, and registry are in place
    /// but before the flow graph starts -- the hook a game uses to build
    /// its decks and zones. Default no-op.
    fn initialize(&self, game: &mut GameRoot) {
        let _ = game;
    }
}

/// Inputs to [new_game]. Mirrors the lobby-derived construction inputs
/// every game needs regardless of its own rules: how many seats, what to
/// call them, and what RNG stream to draw from. `created_at_millis` is
/// threaded through explicitly (rather than read from the system clock at
/// construction time) so that reconstructing a game during hot reload or
/// replay can reproduce the exact same history timestamp.
#[derive(Debug, Clone)]
pub struct GameConstructionOptions {
    pub player_count: u32,
    pub player_names: Option<Vec<String>>,
    pub seed: Option<String>,
    pub created_at_millis: Option<u64>,
    pub configuration: GameConfiguration,
}

impl GameConstructionOptions {
    pub fn new(player_count: u32) -> Self {
        Self {
            player_count,
            player_names: None,
            seed: None,
            created_at_millis: None,
            configuration: GameConfiguration::default(),
        }
    }

    pub fn with_seed(mut self, seed: impl Into<String>) -> Self {
        self.seed = Some(seed.into());
        self
    }

    pub fn with_player_names(mut self, names: Vec<String>) -> Self {
        self.player_names = Some(names);
        self
    }
}

/// Builds a fresh [GameRoot]: the class registry, the root and pile
/// Spaces, one player seat per position (1-indexed, seat 1 current), the
/// seeded RNG, and the action set -- then hands off to
/// [GameDefinition::initialize] for the game's own setup (decks, zones,
/// starting attributes) before the flow graph has run a single tick.
///
/// This does not itself start the flow graph; callers typically follow
/// this with [start_game].
#[instrument(level = "debug", skip(definition))]
pub fn new_game(definition: &dyn GameDefinition, options: GameConstructionOptions) -> Result<GameRoot> {
    if let Some(names) = &options.player_names {
        if names.len() != options.player_count as usize {
            bail!(
                "player_names has {} entries but player_count is {}",
                names.len(),
                options.player_count
            );
        }
    }

    let mut registry = ClassRegistry::new();
    definition.register_classes(&mut registry);

    let mut tree = ElementTree::new();
    let root_id = tree.next_id();
    tree.set_root_id(root_id);
    tree.insert(Element::Space(SpaceData {
        header: ElementHeader::new(root_id, "Space"),
        zone_visibility: None,
    }));
    let pile_id = tree.next_id();
    tree.insert(Element::Space(SpaceData {
        header: ElementHeader::new(pile_id, "Space"),
        zone_visibility: None,
    }));
    tree.set_pile_id(pile_id);

    let seed = options.seed.clone().unwrap_or_else(|| GameId::new().0.to_string());
    let created_at_millis = options.created_at_millis.unwrap_or_else(now_millis);

    let mut game = GameRoot {
        id: GameId::new(),
        configuration: options.configuration,
        phase: GamePhase::Setup,
        tree,
        rng: data::core::rng::SeededRng::new(&seed),
        messages: vec![],
        settings: Default::default(),
        history: GameHistory::new(created_at_millis),
        flow_state: Default::default(),
        animations: Default::default(),
        pending_action: None,
        registry,
        actions: Default::default(),
        flow_graph: None,
    };

    for index in 0..options.player_count {
        let position = PlayerPosition(index + 1);
        let name = options.player_names.as_ref().map(|names| names[index as usize].clone());
        let player_id = mutation::create(&mut game, root_id, definition.player_class_name(), name, AttributeMap::new())
            .with_context(|| format!("Failed to construct player seat {position}"))?;
        match game.tree.get_mut(player_id) {
            Element::Player(data) => {
                data.position = position;
                data.is_current = false;
            }
            other => bail!(
                "Class '{}' is registered as {:?}, not Player -- it cannot be used as player_class_name",
                definition.player_class_name(),
                other.kind()
            ),
        }
    }
    set_current_player(&mut game.tree, PlayerPosition::FIRST);

    definition.register_actions(&mut game);
    definition.initialize(&mut game);
    game.phase = GamePhase::Started;

    Ok(game)
}

fn now_millis() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).map(|duration| duration.as_millis() as u64).unwrap_or(0)
}

/// Builds and stores the flow graph, then runs it until the first input
/// barrier or game-over. Separate from [new_game] so a caller restoring a
/// game (rather than starting one fresh) can skip straight to
/// [rules::flow::engine::restore] instead.
#[instrument(level = "debug", skip(game, definition))]
pub fn start_game(game: &mut GameRoot, definition: &dyn GameDefinition) -> utils::outcome::Outcome {
    let flow_graph = definition.build_flow_graph();
    game.flow_graph = Some(flow_graph.clone());
    engine::start(game, &flow_graph)
}

#[cfg(test)]
mod tests {
    use data::actions::definition::ActionDefinition;
    use data::actions::result::ActionResult;
    use data::elements::element::{Element, ElementHeader, ElementKind, PlayerData};
    use data::flow::node::ActionStepConfig;
    use data::picks::pick::CollectedArgs;
    use data::player_states::player_state::PlayersTrait;
    use utils::outcome::StopCondition;

    use super::*;

    struct TestGame;

    fn construct_player(id: data::core::primitives::ElementId, class_name: &str) -> Element {
        Element::Player(PlayerData {
            header: ElementHeader::new(id, class_name),
            position: PlayerPosition::FIRST,
            is_current: false,
        })
    }

    fn pass_execute(
        _: &mut GameRoot,
        _: PlayerPosition,
        _: Option<&ActionResult>,
        _: &CollectedArgs,
    ) -> ActionResult {
        ActionResult::ok()
    }

    impl GameDefinition for TestGame {
        fn register_classes(&self, registry: &mut ClassRegistry) {
            registry.register("Player", ElementKind::Player, construct_player);
        }

        fn player_class_name(&self) -> &str {
            "Player"
        }

        fn register_actions(&self, game: &mut GameRoot) {
            game.register_action(ActionDefinition::builder("pass", pass_execute).build());
        }

        fn build_flow_graph(&self) -> FlowNode {
            FlowNode::ActionStep(ActionStepConfig {
                player: None,
                actions: vec!["pass".to_string()],
                repeat_until: None,
                skip_if: None,
                min_moves: Some(1),
                max_moves: None,
            })
        }
    }

    #[test]
    fn new_game_creates_one_player_per_position() {
        let game = new_game(&TestGame, GameConstructionOptions::new(3)).unwrap();
        assert_eq!(game.tree.player_count(), 3);
        assert_eq!(game.tree.current_player(), PlayerPosition::FIRST);
    }

    #[test]
    fn new_game_rejects_mismatched_player_names() {
        let options = GameConstructionOptions::new(2).with_player_names(vec!["Only one".to_string()]);
        assert!(new_game(&TestGame, options).is_err());
    }

    #[test]
    fn start_game_runs_the_flow_graph_to_its_first_input_barrier() {
        let mut game = new_game(&TestGame, GameConstructionOptions::new(1)).unwrap();
        let result = start_game(&mut game, &TestGame);
        assert!(matches!(result, Err(StopCondition::AwaitingInput)));
        assert!(game.flow_graph.is_some());
    }
}
