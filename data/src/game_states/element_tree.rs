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

use crate::core::primitives::ElementId;
use crate::elements::element::Element;

/// Stores every element of an ongoing game — both the live tree reachable
/// from [Self::root_id] and the detached pile reachable from
/// [Self::pile_id] — in a single flat arena, addressed by [ElementId].
///
/// You should generally use the query/mutation helpers in the `rules`
/// crate rather than reaching into this directly; this type only owns the
/// storage and the handful of lookups cheap enough to not need their own
/// module (see [crate::elements::element::Element] for the design note on
/// why this is a flat arena rather than owned parent/child references).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ElementTree {
    all_elements: BTreeMap<ElementId, Element>,
    next_id: u64,
    root_id: Option<ElementId>,
    pile_id: Option<ElementId>,
}

impl ElementTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates the next id in the monotonically increasing per-tree
    /// sequence. The sequence never decreases, including across restores —
    /// callers restoring from a snapshot must seed this via
    /// [Self::fast_forward_sequence] before minting any new ids.
    pub fn next_id(&mut self) -> ElementId {
        let id = ElementId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Ensures the id sequence is at least `watermark`, without rewinding
    /// it. Used when restoring a tree from a snapshot whose ids may be
    /// higher than this (fresh) tree's counter.
    pub fn fast_forward_sequence(&mut self, watermark: u64) {
        if watermark > self.next_id {
            self.next_id = watermark;
        }
    }

    pub fn insert(&mut self, element: Element) {
        self.all_elements.insert(element.id(), element);
    }

    pub fn remove_from_arena(&mut self, id: ElementId) -> Option<Element> {
        self.all_elements.remove(&id)
    }

    pub fn get(&self, id: ElementId) -> &Element {
        self.all_elements.get(&id).unwrap_or_else(|| panic!("No element with id {id}"))
    }

    pub fn get_mut(&mut self, id: ElementId) -> &mut Element {
        self.all_elements.get_mut(&id).unwrap_or_else(|| panic!("No element with id {id}"))
    }

    pub fn try_get(&self, id: ElementId) -> Option<&Element> {
        self.all_elements.get(&id)
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.all_elements.contains_key(&id)
    }

    /// All live element ids, in arena (id) order. Includes pile contents.
    pub fn all_ids(&self) -> impl Iterator<Item = ElementId> + '_ {
        self.all_elements.keys().copied()
    }

    pub fn root_id(&self) -> ElementId {
        self.root_id.expect("Element tree root not yet initialized")
    }

    pub fn set_root_id(&mut self, id: ElementId) {
        self.root_id = Some(id);
    }

    pub fn pile_id(&self) -> ElementId {
        self.pile_id.expect("Element tree pile not yet initialized")
    }

    pub fn set_pile_id(&mut self, id: ElementId) {
        self.pile_id = Some(id);
    }

    pub fn root_children(&self) -> &[ElementId] {
        &self.get(self.root_id()).header().children
    }

    /// True if `id` is reachable from the tree root by walking down through
    /// children (i.e. it is *not* sitting detached in the pile).
    pub fn is_in_main_tree(&self, id: ElementId) -> bool {
        let mut current = id;
        loop {
            if current == self.root_id() {
                return true;
            }
            match self.get(current).header().parent {
                Some(parent) => current = parent,
                None => return false,
            }
        }
    }
}
