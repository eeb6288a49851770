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

use data::core::primitives::{ElementId, PlayerPosition};
use data::elements::element::AttributeMap;
use data::elements::visibility::VisibilityMode;
use data::game_states::element_tree::ElementTree;
use serde::{Deserialize, Serialize};

use crate::tree::visibility_resolution::{effective_visibility, is_visible_to};

/// One node of a viewer-filtered serialization of the tree.
///
/// `id` is negative for the anonymized placeholders minted inside a
/// `count-only` zone; it is always the real element id otherwise
/// (including for `hidden` placeholders, per the external contract that a
/// hidden subtree still names its own class and id, just not its content).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectedElement {
    pub id: i64,
    pub class_name: String,
    pub name: Option<String>,
    pub owner: Option<PlayerPosition>,
    pub hidden: bool,
    pub attributes: AttributeMap,
    pub child_count: Option<usize>,
    pub children: Vec<ProjectedElement>,
}

/// Produces `root`'s projection as seen by `viewer`. Synthetic ids minted
/// for anonymized `count-only` children come from a monotonic per-call
/// counter starting at `-1`, guaranteeing no collision with a real id or
/// with another synthetic id minted during the same projection.
pub fn project_for_player(
    tree: &ElementTree,
    root: ElementId,
    viewer: PlayerPosition,
) -> ProjectedElement {
    let mut next_synthetic: i64 = -1;
    project(tree, root, viewer, &mut next_synthetic)
}

fn project(
    tree: &ElementTree,
    id: ElementId,
    viewer: PlayerPosition,
    next_synthetic: &mut i64,
) -> ProjectedElement {
    let element = tree.get(id);
    let header = element.header();

    if !is_visible_to(tree, id, viewer) {
        return ProjectedElement {
            id: id.0 as i64,
            class_name: header.class_name.clone(),
            name: None,
            owner: None,
            hidden: true,
            attributes: dollar_prefixed_only(&header.attributes),
            child_count: None,
            children: vec![],
        };
    }

    let mode = effective_visibility(tree, id).mode;
    if mode == VisibilityMode::CountOnly {
        let children = header
            .children
            .iter()
            .map(|&child| anonymize(tree, child, next_synthetic))
            .collect::<Vec<_>>();
        return ProjectedElement {
            id: id.0 as i64,
            class_name: header.class_name.clone(),
            name: None,
            owner: header.owner,
            hidden: false,
            attributes: AttributeMap::new(),
            child_count: Some(header.children.len()),
            children,
        };
    }

    let children =
        header.children.iter().map(|&child| project(tree, child, viewer, next_synthetic)).collect();

    ProjectedElement {
        id: id.0 as i64,
        class_name: header.class_name.clone(),
        name: header.name.clone(),
        owner: header.owner,
        hidden: false,
        attributes: header.attributes.clone(),
        child_count: None,
        children,
    }
}

/// An anonymized placeholder for a `count-only` zone's child: a synthetic
/// id and the real class name, with no attributes, name, or descendants,
/// so the client can render presence/type without correlating it to a
/// specific real element across projections.
fn anonymize(tree: &ElementTree, id: ElementId, next_synthetic: &mut i64) -> ProjectedElement {
    let synthetic_id = *next_synthetic;
    *next_synthetic -= 1;
    ProjectedElement {
        id: synthetic_id,
        class_name: tree.get(id).header().class_name.clone(),
        name: None,
        owner: None,
        hidden: false,
        attributes: AttributeMap::new(),
        child_count: None,
        children: vec![],
    }
}

fn dollar_prefixed_only(attributes: &AttributeMap) -> AttributeMap {
    attributes.iter().filter(|(key, _)| key.starts_with('$')).map(|(k, v)| (k.clone(), v.clone())).collect()
}

#[cfg(test)]
mod tests {
    use data::elements::element::{Element, ElementHeader, PieceData, SpaceData};
    use data::elements::visibility::Visibility;

    use super::*;

    fn build_two_hands() -> (ElementTree, ElementId, ElementId) {
        let mut tree = ElementTree::new();
        let root_id = tree.next_id();
        tree.set_root_id(root_id);
        tree.insert(Element::Space(SpaceData {
            header: ElementHeader::new(root_id, "Space"),
            zone_visibility: None,
        }));

        let mut hand_ids = vec![];
        for owner in [1u32, 2] {
            let hand_id = tree.next_id();
            let mut header = ElementHeader::new(hand_id, "Hand");
            header.parent = Some(root_id);
            header.owner = Some(PlayerPosition(owner));
            tree.get_mut(root_id).header_mut().insert_child(hand_id);
            tree.insert(Element::Space(SpaceData {
                header,
                zone_visibility: Some(Visibility::owner_only()),
            }));
            for i in 0..3 {
                let card_id = tree.next_id();
                let mut card_header = ElementHeader::new(card_id, "Card");
                card_header.parent = Some(hand_id);
                card_header.name = Some(format!("{owner}-{i}"));
                tree.get_mut(hand_id).header_mut().insert_child(card_id);
                tree.insert(Element::Piece(PieceData { header: card_header }));
            }
            hand_ids.push(hand_id);
        }
        (tree, hand_ids[0], hand_ids[1])
    }

    #[test]
    fn hidden_hand_projects_as_placeholders_with_no_name() {
        let (tree, _p1_hand, p2_hand) = build_two_hands();
        let projected = project_for_player(&tree, p2_hand, PlayerPosition(1));
        assert!(!projected.hidden);
        assert_eq!(projected.children.len(), 3);
        for child in &projected.children {
            assert!(child.hidden);
            assert_eq!(child.name, None);
        }
    }

    #[test]
    fn owner_projection_reveals_own_hand() {
        let (tree, _p1_hand, p2_hand) = build_two_hands();
        let projected = project_for_player(&tree, p2_hand, PlayerPosition(2));
        for child in &projected.children {
            assert!(!child.hidden);
            assert!(child.name.is_some());
        }
    }

    #[test]
    fn count_only_children_get_collision_free_synthetic_ids() {
        let mut tree = ElementTree::new();
        let root_id = tree.next_id();
        tree.set_root_id(root_id);
        let mut header = ElementHeader::new(root_id, "Deck");
        header.parent = None;
        tree.insert(Element::Space(SpaceData { header, zone_visibility: None }));

        let zone_id = tree.next_id();
        let mut zone_header = ElementHeader::new(zone_id, "Deck");
        zone_header.parent = Some(root_id);
        tree.get_mut(root_id).header_mut().insert_child(zone_id);
        tree.insert(Element::Space(SpaceData {
            header: zone_header,
            zone_visibility: None,
        }));
        tree.get_mut(zone_id).header_mut().visibility_override = Some(Visibility::count_only());
        for i in 0..4 {
            let card_id = tree.next_id();
            let mut card_header = ElementHeader::new(card_id, "Card");
            card_header.parent = Some(zone_id);
            card_header.name = Some(i.to_string());
            tree.get_mut(zone_id).header_mut().insert_child(card_id);
            tree.insert(Element::Piece(PieceData { header: card_header }));
        }

        let projected = project_for_player(&tree, zone_id, PlayerPosition(1));
        assert_eq!(projected.child_count, Some(4));
        assert_eq!(projected.children.len(), 4);
        let ids: Vec<i64> = projected.children.iter().map(|c| c.id).collect();
        assert!(ids.iter().all(|&id| id < 0));
        let mut unique = ids.clone();
        unique.sort();
        unique.dedup();
        assert_eq!(unique.len(), ids.len());
    }
}
