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

//! An in-memory, point-in-time capture of a [GameRoot]'s element tree,
//! distinct from the game's ordinary persisted form (its action history).
//!
//! A snapshot exists for one purpose: hot reload. Capturing one, validating
//! it against a freshly-built class registry (see [crate::validator]), and
//! restoring it lets a running game pick up new element classes and actions
//! without replaying its whole history. Ordinary persistence doesn't need
//! this type at all -- a [GameRoot] is reconstructed from its construction
//! options plus [data::game_states::history_data::GameHistory] by replaying
//! each action, which is both simpler and immune to class-registry drift.

use std::collections::BTreeMap;

use color_eyre::eyre::Context;
use data::core::primitives::{ElementId, GamePhase, PlayerPosition};
use data::elements::element::{AttributeMap, ChildOrdering, Element, ElementKind};
use data::elements::visibility::Visibility;
use data::game_states::class_registry::ClassRegistry;
use data::game_states::element_tree::ElementTree;
use data::game_states::game_root::GameRoot;
use data::message::LogMessage;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::element_refs;

/// Attribute keys excluded from a snapshot's public attribute map because
/// they duplicate structural fields already carried on [ElementSnapshot]
/// itself. A game should never need to name one of these for its own
/// purposes; if it does, the collision is silently dropped in favor of the
/// structural field.
const RESERVED_ATTRIBUTE_KEYS: &[&str] =
    &["id", "class_name", "className", "parent", "children", "owner", "name"];

/// Per-element record captured into a [GameSnapshot].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ElementSnapshot {
    pub id: ElementId,
    pub class_name: String,
    pub kind: ElementKind,
    pub name: Option<String>,
    pub owner: Option<PlayerPosition>,
    pub parent: Option<ElementId>,
    pub children: Vec<ElementId>,
    pub ordering: ChildOrdering,
    pub visibility_override: Option<Visibility>,

    /// Public attributes only: underscore-prefixed and
    /// [RESERVED_ATTRIBUTE_KEYS] names are excluded at capture time. Private
    /// (`_`-prefixed) scratch data a game keeps out of serialized state
    /// never appears here.
    pub attributes: AttributeMap,

    /// Present only for a [ElementKind::Space].
    pub zone_visibility: Option<Visibility>,

    /// Present only for a [ElementKind::Player].
    pub player_position: Option<PlayerPosition>,
    pub player_is_current: Option<bool>,
}

/// A full point-in-time capture of a [GameRoot], sufficient to rebuild its
/// [ElementTree] and top-level bookkeeping against a (possibly different)
/// [ClassRegistry]. Does not capture `flow_state`, `pending_action`,
/// `actions`, or `flow_graph` -- those are the hot reload caller's concern
/// (see [crate::session::hot_reload]), since re-attaching the flow engine
/// requires the *new* flow graph, not the snapshot's own.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub elements: BTreeMap<ElementId, ElementSnapshot>,
    pub root_id: ElementId,
    pub pile_id: ElementId,
    pub next_id: u64,
    pub phase: GamePhase,
    pub messages: Vec<LogMessage>,
    pub settings: BTreeMap<String, JsonValue>,
}

fn filter_attributes(attributes: &AttributeMap) -> AttributeMap {
    attributes
        .iter()
        .filter(|(key, _)| !key.starts_with('_') && !RESERVED_ATTRIBUTE_KEYS.contains(&key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

fn capture_element(element: &Element) -> ElementSnapshot {
    let header = element.header();
    let (zone_visibility, player_position, player_is_current) = match element {
        Element::Space(data) => (data.zone_visibility.clone(), None, None),
        Element::Piece(_) => (None, None, None),
        Element::Player(data) => (None, Some(data.position), Some(data.is_current)),
    };
    ElementSnapshot {
        id: header.id,
        class_name: header.class_name.clone(),
        kind: element.kind(),
        name: header.name.clone(),
        owner: header.owner,
        parent: header.parent,
        children: header.children.clone(),
        ordering: header.ordering,
        visibility_override: header.visibility_override.clone(),
        attributes: filter_attributes(&header.attributes),
        zone_visibility,
        player_position,
        player_is_current,
    }
}

/// Captures the current state of `game`'s element tree and top-level
/// bookkeeping.
pub fn capture(game: &GameRoot) -> GameSnapshot {
    let elements =
        game.tree.all_ids().map(|id| (id, capture_element(game.tree.get(id)))).collect();
    GameSnapshot {
        elements,
        root_id: game.tree.root_id(),
        pile_id: game.tree.pile_id(),
        next_id: next_id_watermark(game),
        phase: game.phase,
        messages: game.messages.clone(),
        settings: game.settings.clone(),
    }
}

fn next_id_watermark(game: &GameRoot) -> u64 {
    game.tree.all_ids().map(|id| id.0).max().map_or(0, |max| max + 1)
}

fn construct_element(registry: &ClassRegistry, record: &ElementSnapshot) -> color_eyre::Result<Element> {
    let entry = registry
        .get(&record.class_name)
        .with_context(|| format!("No registered class named '{}'", record.class_name))?;
    let mut element = (entry.construct)(record.id, &record.class_name);
    {
        let header = element.header_mut();
        header.name = record.name.clone();
        header.owner = record.owner;
        header.parent = record.parent;
        header.children = record.children.clone();
        header.ordering = record.ordering;
        header.visibility_override = record.visibility_override.clone();
        header.attributes = record.attributes.clone();
    }
    match &mut element {
        Element::Space(data) => data.zone_visibility = record.zone_visibility.clone(),
        Element::Player(data) => {
            data.position = record
                .player_position
                .with_context(|| format!("Player element {} snapshot is missing its position", record.id))?;
            data.is_current = record.player_is_current.unwrap_or(false);
        }
        Element::Piece(_) => {}
    }
    Ok(element)
}

/// Rebuilds an [ElementTree] from `snapshot`, using `registry` to construct
/// each element by class name.
///
/// Two passes: the first materializes every element by id with its
/// attributes as captured (so a reference pointing at any other element in
/// the snapshot always finds a live target, regardless of id order); the
/// second rewrites every attribute map's element references to the
/// canonical id form via [element_refs::rewrite_references], now that every
/// id the tree will ever contain exists.
///
/// Callers should run [crate::validator::validate] first -- this function
/// assumes every class name in `snapshot` is present in `registry` and will
/// fail loudly (rather than partially restore) if that assumption doesn't
/// hold.
pub fn restore(snapshot: &GameSnapshot, registry: &ClassRegistry) -> color_eyre::Result<ElementTree> {
    let mut tree = ElementTree::new();
    for record in snapshot.elements.values() {
        let element = construct_element(registry, record)?;
        tree.insert(element);
    }
    tree.set_root_id(snapshot.root_id);
    tree.set_pile_id(snapshot.pile_id);
    tree.fast_forward_sequence(snapshot.next_id);

    let mut rewritten = Vec::with_capacity(snapshot.elements.len());
    for id in tree.all_ids() {
        let attributes = tree.get(id).header().attributes.clone();
        let mut value = serde_json::to_value(attributes)?;
        element_refs::rewrite_references(&tree, &mut value, 0)?;
        let attributes: AttributeMap = serde_json::from_value(value)?;
        rewritten.push((id, attributes));
    }
    for (id, attributes) in rewritten {
        tree.get_mut(id).header_mut().attributes = attributes;
    }

    Ok(tree)
}

#[cfg(test)]
mod tests {
    use data::elements::element::{ElementHeader, PlayerData, SpaceData};

    use super::*;

    fn build_registry() -> ClassRegistry {
        let mut registry = ClassRegistry::new();
        registry.register("Player", ElementKind::Player, |id, class_name| {
            Element::Player(PlayerData {
                header: ElementHeader::new(id, class_name),
                position: PlayerPosition::FIRST,
                is_current: true,
            })
        });
        registry
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
        header.attributes.insert("_scratch".to_string(), serde_json::json!(true));
        header.attributes.insert("score".to_string(), serde_json::json!(0));
        header.attributes.insert("bestFriend".to_string(), element_refs::encode_branch_ref(&tree, root_id).unwrap());
        tree.get_mut(root_id).header_mut().insert_child(player_id);
        tree.insert(Element::Player(PlayerData { header, position: PlayerPosition::FIRST, is_current: true }));

        data::game_states::game_root::GameRoot {
            id: data::core::primitives::GameId::new(),
            configuration: Default::default(),
            phase: GamePhase::Started,
            tree,
            rng: data::core::rng::SeededRng::new("seed"),
            messages: vec![],
            settings: Default::default(),
            history: data::game_states::history_data::GameHistory::new(0),
            flow_state: Default::default(),
            animations: Default::default(),
            pending_action: None,
            registry: build_registry(),
            actions: Default::default(),
            flow_graph: None,
        }
    }

    #[test]
    fn capture_excludes_private_and_reserved_attributes() {
        let game = build_game();
        let snapshot = capture(&game);
        let player_id = game.tree.root_children()[0];
        let record = &snapshot.elements[&player_id];
        assert!(!record.attributes.contains_key("_scratch"));
        assert!(record.attributes.contains_key("score"));
    }

    #[test]
    fn restore_reproduces_the_tree_shape() {
        let game = build_game();
        let snapshot = capture(&game);
        let restored = restore(&snapshot, &build_registry()).unwrap();
        assert_eq!(restored.root_id(), game.tree.root_id());
        assert_eq!(restored.root_children(), game.tree.root_children());
    }

    #[test]
    fn restore_canonicalizes_branch_refs_to_element_id_form() {
        let game = build_game();
        let snapshot = capture(&game);
        let restored = restore(&snapshot, &build_registry()).unwrap();
        let player_id = restored.root_children()[0];
        let best_friend = restored.get(player_id).header().attributes.get("bestFriend").unwrap();
        assert_eq!(best_friend, &element_refs::encode_element_id_ref(restored.root_id()));
    }

    #[test]
    fn restore_rejects_an_unknown_class_name() {
        let game = build_game();
        let mut snapshot = capture(&game);
        let player_id = *snapshot.elements.keys().find(|id| **id != game.tree.root_id() && **id != game.tree.pile_id()).unwrap();
        snapshot.elements.get_mut(&player_id).unwrap().class_name = "Nonexistent".to_string();
        assert!(restore(&snapshot, &build_registry()).is_err());
    }
}
