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

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifies an [crate::elements::element::Element] within a single game's
/// tree, or within its detached pile.
///
/// Ids are drawn from a monotonically increasing per-tree sequence and are
/// never reused, so identity can always be compared by id rather than by
/// reference: no two live elements share an id, across both the tree and
/// the detached pile.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct ElementId(pub u64);

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifies a struct that is 1:1 associated with a given [ElementId].
pub trait HasElementId {
    fn element_id(&self) -> ElementId;
}

impl HasElementId for ElementId {
    fn element_id(&self) -> ElementId {
        *self
    }
}

/// The 1-indexed position of a player within a game, in `[1, N]` for an
/// `N`-player game.
///
/// Player positions are a permutation of `[1, N]` for the lifetime of a
/// game; a position is never reassigned to a different seat.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct PlayerPosition(pub u32);

impl PlayerPosition {
    pub const FIRST: PlayerPosition = PlayerPosition(1);

    pub fn as_index(self) -> usize {
        (self.0 - 1) as usize
    }

    pub fn from_index(index: usize) -> Self {
        Self(index as u32 + 1)
    }
}

impl fmt::Display for PlayerPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}", self.0)
    }
}

/// Unique identifier for a game.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct GameId(pub Uuid);

impl GameId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for GameId {
    fn default() -> Self {
        Self::new()
    }
}

/// Identifies one emitted [crate::animation::AnimationEvent].
///
/// Animation events are totally ordered by this monotonically increasing
/// id.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct AnimationEventId(pub u64);

/// Phase of an ongoing game.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Game has been constructed but flow has not yet been started.
    Setup,
    /// Flow is running.
    Started,
    /// Flow has run to completion.
    Finished,
}
