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

use crate::core::primitives::{ElementId, PlayerPosition};
use crate::elements::element::{Element, PlayerData};
use crate::game_states::element_tree::ElementTree;

/// Convenience accessors for the player seats within a game's element tree.
///
/// Players are ordinary [Element::Player] children of the tree root, keyed
/// by [PlayerPosition] — see `DESIGN.md`. This trait just saves call sites
/// from re-deriving the "find the Player child with this position" scan.
pub trait PlayersTrait {
    fn player(&self, position: PlayerPosition) -> &PlayerData;
    fn player_mut(&mut self, position: PlayerPosition) -> &mut PlayerData;
    fn player_count(&self) -> usize;
    fn current_player(&self) -> PlayerPosition;
    fn players_in_order(&self) -> Vec<&PlayerData>;
}

impl PlayersTrait for ElementTree {
    fn player(&self, position: PlayerPosition) -> &PlayerData {
        self.players_in_order()
            .into_iter()
            .find(|p| p.position == position)
            .unwrap_or_else(|| panic!("No player at position {position}"))
    }

    fn player_mut(&mut self, position: PlayerPosition) -> &mut PlayerData {
        let id = self.player(position).header.id;
        match self.get_mut(id) {
            Element::Player(data) => data,
            _ => unreachable!("player id did not resolve to a Player element"),
        }
    }

    fn player_count(&self) -> usize {
        self.players_in_order().len()
    }

    fn current_player(&self) -> PlayerPosition {
        self.players_in_order()
            .into_iter()
            .find(|p| p.is_current)
            .map(|p| p.position)
            .expect("Exactly one player must be current while the game is running")
    }

    fn players_in_order(&self) -> Vec<&PlayerData> {
        let mut players: Vec<&PlayerData> = self
            .root_children()
            .iter()
            .filter_map(|&id| match self.get(id) {
                Element::Player(data) => Some(data),
                _ => None,
            })
            .collect();
        players.sort_by_key(|p| p.position);
        players
    }
}

/// Sets the current player, clearing the flag on every other seat so that
/// exactly one player is current at a time.
pub fn set_current_player(tree: &mut ElementTree, position: PlayerPosition) {
    let ids: Vec<ElementId> = tree.root_children().to_vec();
    for id in ids {
        if let Element::Player(data) = tree.get_mut(id) {
            data.is_current = data.position == position;
        }
    }
}
