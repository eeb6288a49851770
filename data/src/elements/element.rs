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

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::core::primitives::{ElementId, PlayerPosition};
use crate::elements::visibility::Visibility;

/// Arbitrary, game-defined fields attached to an element.
///
/// A `BTreeMap` rather than a `HashMap` so that serialized attribute order
/// is deterministic, which matters for the "two independent replays produce
/// byte-identical serialized trees" invariant.
pub type AttributeMap = BTreeMap<String, JsonValue>;

/// Whether new children are appended to the end or prepended to the front
/// of an element's child sequence.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
pub enum ChildOrdering {
    /// New children are appended to the end (e.g. a queue, a discard pile).
    Normal,
    /// New children are prepended to the front (e.g. a draw deck: the most
    /// recently shuffled-in or placed card is "on top").
    Stacking,
}

impl Default for ChildOrdering {
    fn default() -> Self {
        ChildOrdering::Normal
    }
}

/// Fields shared by every element kind.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ElementHeader {
    pub id: ElementId,

    /// Class name used for serialization and class-registry lookups. Not
    /// host-language RTTI — purely a string tag the class registry maps
    /// back to a constructor at restore time.
    pub class_name: String,

    pub name: Option<String>,
    pub owner: Option<PlayerPosition>,
    pub visibility_override: Option<Visibility>,
    pub parent: Option<ElementId>,
    pub children: Vec<ElementId>,
    pub ordering: ChildOrdering,
    pub attributes: AttributeMap,
}

impl ElementHeader {
    pub fn new(id: ElementId, class_name: impl Into<String>) -> Self {
        Self {
            id,
            class_name: class_name.into(),
            name: None,
            owner: None,
            visibility_override: None,
            parent: None,
            children: vec![],
            ordering: ChildOrdering::Normal,
            attributes: AttributeMap::new(),
        }
    }

    /// Inserts a new child id at the position dictated by this header's
    /// [ChildOrdering].
    pub fn insert_child(&mut self, child: ElementId) {
        match self.ordering {
            ChildOrdering::Normal => self.children.push(child),
            ChildOrdering::Stacking => self.children.insert(0, child),
        }
    }

    pub fn remove_child(&mut self, child: ElementId) {
        self.children.retain(|c| *c != child);
    }
}

/// A static container element. May carry a zone visibility default for its
/// children, and (via [crate::elements::element::SpaceClass], wired up
/// through the class registry) child-enter/exit hooks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpaceData {
    pub header: ElementHeader,

    /// Default visibility imposed on children that don't specify their own
    /// explicit override.
    pub zone_visibility: Option<Visibility>,
}

/// A movable element. May be relocated between containers via
/// [crate::tree::mutation] in the `rules` crate; cannot itself contain a
/// [SpaceData].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PieceData {
    pub header: ElementHeader,
}

/// A player seat. Modeled as a third element refinement (rather than a
/// bolt-on `PlayerCollection`) so that players are ordinary children of the
/// game root, keyed by position — see `DESIGN.md` for the reasoning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerData {
    pub header: ElementHeader,
    pub position: PlayerPosition,
    pub is_current: bool,
}

/// A node of the element tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Element {
    Space(SpaceData),
    Piece(PieceData),
    Player(PlayerData),
}

impl Element {
    pub fn header(&self) -> &ElementHeader {
        match self {
            Element::Space(data) => &data.header,
            Element::Piece(data) => &data.header,
            Element::Player(data) => &data.header,
        }
    }

    pub fn header_mut(&mut self) -> &mut ElementHeader {
        match self {
            Element::Space(data) => &mut data.header,
            Element::Piece(data) => &mut data.header,
            Element::Player(data) => &mut data.header,
        }
    }

    pub fn id(&self) -> ElementId {
        self.header().id
    }

    pub fn is_space(&self) -> bool {
        matches!(self, Element::Space(_))
    }

    pub fn is_piece(&self) -> bool {
        matches!(self, Element::Piece(_))
    }

    pub fn is_player(&self) -> bool {
        matches!(self, Element::Player(_))
    }

    /// The zone visibility this element imposes on its children, if it's a
    /// Space with one configured.
    pub fn zone_visibility(&self) -> Option<&Visibility> {
        match self {
            Element::Space(data) => data.zone_visibility.as_ref(),
            _ => None,
        }
    }

    pub fn kind(&self) -> ElementKind {
        match self {
            Element::Space(_) => ElementKind::Space,
            Element::Piece(_) => ElementKind::Piece,
            Element::Player(_) => ElementKind::Player,
        }
    }
}

/// The structural kind of an [Element], independent of its `class_name`.
///
/// `class_name` identifies *which* Space/Piece/Player a game registered
/// (e.g. `"Hand"`, `"Card"`); `ElementKind` identifies which of the three
/// structural refinements it is, which the class registry needs in order to
/// validate a snapshot before restoring it (a `schema-error` when a class
/// name resolves to the wrong structural kind).
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
pub enum ElementKind {
    Space,
    Piece,
    Player,
}
