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

use serde::{Deserialize, Serialize};

use crate::core::primitives::PlayerPosition;

/// How visible an element or zone is to the players of a game.
///
/// Resolution walks the parent chain: an element's effective visibility is
/// its own explicit override, otherwise the nearest ancestor Space's zone
/// visibility, otherwise [VisibilityMode::All].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Visibility {
    pub mode: VisibilityMode,

    /// Additive allow list. For [VisibilityMode::Owner] and
    /// [VisibilityMode::Hidden], players in this list can see the element
    /// regardless of ownership.
    pub add_players: Vec<PlayerPosition>,

    /// Subtractive deny list, only meaningful under [VisibilityMode::All]:
    /// players in this list cannot see the element even though it's
    /// otherwise visible to everyone.
    pub except_players: Vec<PlayerPosition>,

    /// True if this [Visibility] is an explicit per-element override rather
    /// than an inherited zone default. Only explicit visibility takes
    /// precedence over an ancestor Space's zone visibility during
    /// resolution.
    pub explicit: bool,
}

impl Visibility {
    /// The implicit, non-explicit default: visible to all players.
    pub fn all() -> Self {
        Self {
            mode: VisibilityMode::All,
            add_players: vec![],
            except_players: vec![],
            explicit: false,
        }
    }

    pub fn owner_only() -> Self {
        Self {
            mode: VisibilityMode::Owner,
            add_players: vec![],
            except_players: vec![],
            explicit: true,
        }
    }

    pub fn hidden() -> Self {
        Self {
            mode: VisibilityMode::Hidden,
            add_players: vec![],
            except_players: vec![],
            explicit: true,
        }
    }

    pub fn count_only() -> Self {
        Self {
            mode: VisibilityMode::CountOnly,
            add_players: vec![],
            except_players: vec![],
            explicit: true,
        }
    }

    pub fn with_add_players(mut self, players: impl IntoIterator<Item = PlayerPosition>) -> Self {
        self.add_players = players.into_iter().collect();
        self
    }

    pub fn with_except_players(
        mut self,
        players: impl IntoIterator<Item = PlayerPosition>,
    ) -> Self {
        self.except_players = players.into_iter().collect();
        self
    }

    /// Resolves whether `viewer` can see an element with this effective
    /// visibility, given the element's owner (if any). Does not by itself
    /// decide what to reveal for [VisibilityMode::CountOnly] — that's a
    /// projection-time concern since it still reveals id, class, and child
    /// count.
    pub fn is_visible_to(&self, viewer: PlayerPosition, owner: Option<PlayerPosition>) -> bool {
        match self.mode {
            VisibilityMode::All => !self.except_players.contains(&viewer),
            VisibilityMode::Owner => owner == Some(viewer) || self.add_players.contains(&viewer),
            VisibilityMode::Hidden => self.add_players.contains(&viewer),
            VisibilityMode::CountOnly => false,
        }
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
pub enum VisibilityMode {
    /// Visible to everyone except an explicit deny list.
    All,
    /// Visible only to the owner, plus an explicit allow list.
    Owner,
    /// Visible to nobody except an explicit allow list.
    Hidden,
    /// Id, class, and child count are visible; attributes and descendants
    /// are not.
    CountOnly,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(n: u32) -> PlayerPosition {
        PlayerPosition(n)
    }

    #[test]
    fn all_is_visible_unless_excepted() {
        let vis = Visibility::all().with_except_players([p(2)]);
        assert!(vis.is_visible_to(p(1), None));
        assert!(!vis.is_visible_to(p(2), None));
    }

    #[test]
    fn owner_sees_and_add_list_sees() {
        let vis = Visibility::owner_only().with_add_players([p(3)]);
        assert!(vis.is_visible_to(p(1), Some(p(1))));
        assert!(!vis.is_visible_to(p(2), Some(p(1))));
        assert!(vis.is_visible_to(p(3), Some(p(1))));
    }

    #[test]
    fn hidden_sees_only_add_list() {
        let vis = Visibility::hidden().with_add_players([p(2)]);
        assert!(!vis.is_visible_to(p(1), Some(p(1))));
        assert!(vis.is_visible_to(p(2), Some(p(1))));
    }

    #[test]
    fn count_only_never_visible_as_full_element() {
        let vis = Visibility::count_only();
        assert!(!vis.is_visible_to(p(1), Some(p(1))));
    }
}
