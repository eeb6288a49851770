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

use color_eyre::eyre::ensure;
use data::core::primitives::ElementId;
use data::elements::element::{AttributeMap, ChildOrdering, Element, ElementKind};
use data::game_states::game_root::GameRoot;
use tracing::instrument;
use utils::outcome::Outcome;
use utils::{outcome, verify};

/// Creates a new child of `parent`, appending (or prepending, per the
/// parent's [ChildOrdering]) it to `parent`'s children.
///
/// Constructing a Space inside a Piece is a programmer error -- a Piece can
/// never contain a Space -- and surfaces as an `Err(Report)` rather than a
/// structured action failure, since it reflects a bug in the calling game's
/// class wiring rather than an in-game decision.
#[instrument(level = "debug", skip(game))]
pub fn create(
    game: &mut GameRoot,
    parent: ElementId,
    class_name: &str,
    name: Option<String>,
    attrs: AttributeMap,
) -> color_eyre::Result<ElementId> {
    let entry = *game
        .registry
        .get(class_name)
        .ok_or_else(|| color_eyre::eyre::eyre!("No class registered named '{class_name}'"))?;

    ensure!(
        !(game.tree.get(parent).is_piece() && entry.kind == ElementKind::Space),
        "Cannot create a Space ('{class_name}') inside a Piece"
    );

    let id = game.tree.next_id();
    let mut element = (entry.construct)(id, class_name);
    element.header_mut().name = name;
    element.header_mut().attributes = attrs;
    element.header_mut().parent = Some(parent);

    game.tree.get_mut(parent).header_mut().insert_child(id);
    game.tree.insert(element);
    Ok(id)
}

/// Relocates a piece into `destination`, removing it from its current
/// parent (invoking that parent's `on_exit` hook, if any) and inserting it
/// at the front if `destination` is a stacking container, else at the back
/// (invoking `destination`'s `on_enter` hook, if any).
///
/// `position` overrides the ordering-derived insertion index when present.
#[instrument(level = "debug", skip(game))]
pub fn put_into(
    game: &mut GameRoot,
    piece: ElementId,
    destination: ElementId,
    position: Option<usize>,
) -> Outcome {
    verify!(game.tree.get(piece).is_piece(), "put_into requires a Piece, got {:?}", piece);
    verify!(game.tree.get(destination).is_space(), "put_into destination must be a Space");

    if let Some(old_parent) = game.tree.get(piece).header().parent {
        game.tree.get_mut(old_parent).header_mut().remove_child(piece);
        run_exit_hook(game, old_parent, piece);
    }

    let ordering = match game.tree.get(destination) {
        Element::Space(space) => space.header.ordering,
        _ => ChildOrdering::Normal,
    };

    let dest_header = game.tree.get_mut(destination).header_mut();
    match position {
        Some(index) => {
            let index = index.min(dest_header.children.len());
            dest_header.children.insert(index, piece);
        }
        None => dest_header.insert_child(piece),
    }

    game.tree.get_mut(piece).header_mut().parent = Some(destination);
    run_enter_hook(game, destination, piece);
    let _ = ordering;
    outcome::OK
}

fn run_enter_hook(game: &mut GameRoot, space: ElementId, child: ElementId) {
    let class_name = game.tree.get(space).header().class_name.clone();
    if let Some(hook) = game.registry.get(&class_name).and_then(|entry| entry.on_enter) {
        hook(game, space, child);
    }
}

fn run_exit_hook(game: &mut GameRoot, space: ElementId, child: ElementId) {
    let class_name = game.tree.get(space).header().class_name.clone();
    if let Some(hook) = game.registry.get(&class_name).and_then(|entry| entry.on_exit) {
        hook(game, space, child);
    }
}

/// Moves a piece to the detached pile, discoverable thereafter only via
/// `getElementById`-style lookup, never as a descendant of the main tree.
#[instrument(level = "debug", skip(game))]
pub fn remove(game: &mut GameRoot, piece: ElementId) -> Outcome {
    verify!(game.tree.get(piece).is_piece(), "remove requires a Piece, got {:?}", piece);
    let pile_id = game.tree.pile_id();
    put_into(game, piece, pile_id, None)
}

/// Fisher-Yates shuffle of `container`'s direct children, using the game's
/// seeded RNG so the result is replay-deterministic.
#[instrument(level = "debug", skip(game))]
pub fn shuffle(game: &mut GameRoot, container: ElementId) -> Outcome {
    verify!(game.tree.get(container).is_space(), "shuffle requires a Space container");
    let mut children = game.tree.get(container).header().children.clone();
    for i in (1..children.len()).rev() {
        let j = game.rng.next_below(i + 1);
        children.swap(i, j);
    }
    game.tree.get_mut(container).header_mut().children = children;
    outcome::OK
}

pub fn set_order(game: &mut GameRoot, container: ElementId, ordering: ChildOrdering) -> Outcome {
    match game.tree.get_mut(container) {
        Element::Space(space) => {
            space.header.ordering = ordering;
            outcome::OK
        }
        _ => {
            utils::fail!("set_order requires a Space container")
        }
    }
}

#[cfg(test)]
mod tests {
    use data::core::primitives::GameId;
    use data::elements::element::{ElementHeader, PieceData, SpaceData};
    use data::game_states::class_registry::ClassRegistry;
    use data::game_states::element_tree::ElementTree;
    use data::game_states::game_root::GameConfiguration;

    use super::*;

    fn fresh_game() -> GameRoot {
        let mut registry = ClassRegistry::new();
        registry.register("Deck", ElementKind::Space, |id, class_name| {
            Element::Space(SpaceData { header: ElementHeader::new(id, class_name), zone_visibility: None })
        });
        registry.register("Card", ElementKind::Piece, |id, class_name| {
            Element::Piece(PieceData { header: ElementHeader::new(id, class_name) })
        });

        let mut tree = ElementTree::new();
        let root_id = tree.next_id();
        tree.set_root_id(root_id);
        tree.insert(Element::Space(SpaceData {
            header: ElementHeader::new(root_id, "Space"),
            zone_visibility: None,
        }));
        let pile_id = tree.next_id();
        let mut pile_header = ElementHeader::new(pile_id, "Space");
        pile_header.parent = None;
        tree.insert(Element::Space(SpaceData { header: pile_header, zone_visibility: None }));
        tree.set_pile_id(pile_id);

        GameRoot {
            id: GameId::new(),
            configuration: GameConfiguration::default(),
            phase: data::core::primitives::GamePhase::Setup,
            tree,
            rng: data::core::rng::SeededRng::new("test"),
            messages: vec![],
            settings: Default::default(),
            history: Default::default(),
            flow_state: Default::default(),
            animations: Default::default(),
            pending_action: None,
            registry,
            actions: Default::default(),
            flow_graph: None,
        }
    }

    #[test]
    fn create_appends_to_normal_container() {
        let mut game = fresh_game();
        let root_id = game.tree.root_id();
        let deck_id = create(&mut game, root_id, "Deck", Some("Main".into()), Default::default()).unwrap();
        let card_a = create(&mut game, deck_id, "Card", Some("A".into()), Default::default()).unwrap();
        let card_b = create(&mut game, deck_id, "Card", Some("B".into()), Default::default()).unwrap();
        assert_eq!(game.tree.get(deck_id).header().children, vec![card_a, card_b]);
    }

    #[test]
    fn put_into_stacking_container_prepends() {
        let mut game = fresh_game();
        let root_id = game.tree.root_id();
        let deck_id = create(&mut game, root_id, "Deck", None, Default::default()).unwrap();
        set_order(&mut game, deck_id, ChildOrdering::Stacking).unwrap();
        let card_a = create(&mut game, root_id, "Card", Some("A".into()), Default::default()).unwrap();
        let card_b = create(&mut game, root_id, "Card", Some("B".into()), Default::default()).unwrap();

        put_into(&mut game, card_a, deck_id, None).unwrap();
        put_into(&mut game, card_b, deck_id, None).unwrap();

        assert_eq!(game.tree.get(deck_id).header().children, vec![card_b, card_a]);
    }

    #[test]
    fn remove_moves_piece_to_pile() {
        let mut game = fresh_game();
        let root_id = game.tree.root_id();
        let card = create(&mut game, root_id, "Card", None, Default::default()).unwrap();
        remove(&mut game, card).unwrap();

        assert!(!game.tree.is_in_main_tree(card));
        assert!(game.tree.contains(card));
    }

    #[test]
    fn shuffle_is_deterministic_for_same_seed() {
        let mut a = fresh_game();
        let mut b = fresh_game();
        let root_a = a.tree.root_id();
        let root_b = b.tree.root_id();
        let deck_a = create(&mut a, root_a, "Deck", None, Default::default()).unwrap();
        let deck_b = create(&mut b, root_b, "Deck", None, Default::default()).unwrap();
        for i in 0..10 {
            create(&mut a, deck_a, "Card", Some(i.to_string()), Default::default()).unwrap();
            create(&mut b, deck_b, "Card", Some(i.to_string()), Default::default()).unwrap();
        }
        shuffle(&mut a, deck_a).unwrap();
        shuffle(&mut b, deck_b).unwrap();

        let names_a: Vec<_> =
            a.tree.get(deck_a).header().children.iter().map(|&id| a.tree.get(id).header().name.clone()).collect();
        let names_b: Vec<_> =
            b.tree.get(deck_b).header().children.iter().map(|&id| b.tree.get(id).header().name.clone()).collect();
        assert_eq!(names_a, names_b);
    }
}
