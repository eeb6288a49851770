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
use data::elements::visibility::Visibility;
use data::game_states::element_tree::ElementTree;

/// Resolves the effective visibility of `id`: its own explicit override,
/// otherwise the nearest ancestor Space's zone visibility, otherwise the
/// implicit default of visible-to-all.
pub fn effective_visibility(tree: &ElementTree, id: ElementId) -> Visibility {
    let element = tree.get(id);
    if let Some(explicit) = &element.header().visibility_override {
        return explicit.clone();
    }

    let mut current = element.header().parent;
    while let Some(parent_id) = current {
        let parent = tree.get(parent_id);
        if let Some(zone) = parent.zone_visibility() {
            return zone.clone();
        }
        current = parent.header().parent;
    }

    Visibility::all()
}

/// True if `viewer` can see `id` under its effective visibility, given
/// `id`'s owner.
pub fn is_visible_to(tree: &ElementTree, id: ElementId, viewer: PlayerPosition) -> bool {
    let owner = tree.get(id).header().owner;
    effective_visibility(tree, id).is_visible_to(viewer, owner)
}

#[cfg(test)]
mod tests {
    use data::core::primitives::PlayerPosition;
    use data::elements::element::{Element, ElementHeader, PieceData, SpaceData};
    use data::elements::visibility::Visibility;

    use super::*;

    fn build_tree() -> (ElementTree, ElementId, ElementId) {
        let mut tree = ElementTree::new();
        let root_id = tree.next_id();
        tree.set_root_id(root_id);
        tree.insert(Element::Space(SpaceData {
            header: ElementHeader::new(root_id, "Space"),
            zone_visibility: None,
        }));

        let hand_id = tree.next_id();
        let mut hand_header = ElementHeader::new(hand_id, "Hand");
        hand_header.parent = Some(root_id);
        tree.get_mut(root_id).header_mut().insert_child(hand_id);
        tree.insert(Element::Space(SpaceData {
            header: hand_header,
            zone_visibility: Some(Visibility::owner_only()),
        }));

        let card_id = tree.next_id();
        let mut card_header = ElementHeader::new(card_id, "Card");
        card_header.parent = Some(hand_id);
        tree.get_mut(hand_id).header_mut().insert_child(card_id);
        tree.insert(Element::Piece(PieceData { header: card_header }));

        (tree, hand_id, card_id)
    }

    #[test]
    fn inherits_zone_visibility_from_ancestor_space() {
        let (tree, _hand_id, card_id) = build_tree();
        let resolved = effective_visibility(&tree, card_id);
        assert_eq!(resolved.mode, data::elements::visibility::VisibilityMode::Owner);
    }

    #[test]
    fn explicit_override_wins_over_zone_default() {
        let (mut tree, _hand_id, card_id) = build_tree();
        tree.get_mut(card_id).header_mut().visibility_override = Some(Visibility::hidden());
        let resolved = effective_visibility(&tree, card_id);
        assert_eq!(resolved.mode, data::elements::visibility::VisibilityMode::Hidden);
    }

    #[test]
    fn owner_mode_visible_only_to_owner() {
        let (mut tree, hand_id, card_id) = build_tree();
        tree.get_mut(hand_id).header_mut().owner = Some(PlayerPosition(1));
        assert!(is_visible_to(&tree, card_id, PlayerPosition(1)));
        assert!(!is_visible_to(&tree, card_id, PlayerPosition(2)));
    }
}
