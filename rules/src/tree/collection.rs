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

use data::core::primitives::ElementId;
use data::elements::element::Element;
use data::game_states::element_tree::ElementTree;

/// The result of a [crate::tree::finder::Finder] query: an ordered set of
/// element ids with filter/sort/aggregate helpers layered on top.
///
/// Membership is always checked by id, never by comparing [Element] values,
/// since serialization and replay mint fresh `Element` objects for the same
/// logical entity on every restore.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ElementCollection {
    ids: Vec<ElementId>,
}

impl ElementCollection {
    pub fn from_ids(ids: Vec<ElementId>) -> Self {
        Self { ids }
    }

    pub fn ids(&self) -> &[ElementId] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.ids.contains(&id)
    }

    pub fn find_by_id(&self, id: ElementId) -> Option<ElementId> {
        self.ids.iter().copied().find(|&candidate| candidate == id)
    }

    pub fn index_of_element(&self, id: ElementId) -> Option<usize> {
        self.ids.iter().position(|&candidate| candidate == id)
    }

    /// Re-filters against the live tree, e.g. after picks invalidate some
    /// previously-gathered ids.
    pub fn filter(&self, tree: &ElementTree, predicate: impl Fn(&Element) -> bool) -> Self {
        Self::from_ids(
            self.ids.iter().copied().filter(|&id| tree.try_get(id).is_some_and(&predicate)).collect(),
        )
    }

    pub fn sort_by_key<K: Ord>(&self, tree: &ElementTree, key: impl Fn(&Element) -> K) -> Self {
        let mut ids = self.ids.clone();
        ids.sort_by_key(|&id| key(tree.get(id)));
        Self::from_ids(ids)
    }

    /// Sums a numeric attribute across every element in the collection,
    /// treating a missing or non-numeric attribute as zero.
    pub fn aggregate_sum(&self, tree: &ElementTree, attribute: &str) -> i64 {
        self.ids
            .iter()
            .filter_map(|&id| tree.try_get(id))
            .filter_map(|element| element.header().attributes.get(attribute))
            .filter_map(|value| value.as_i64())
            .sum()
    }
}

impl IntoIterator for ElementCollection {
    type Item = ElementId;
    type IntoIter = std::vec::IntoIter<ElementId>;

    fn into_iter(self) -> Self::IntoIter {
        self.ids.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use data::elements::element::{Element, ElementHeader, PieceData};

    use super::*;

    #[test]
    fn identity_comparisons_use_id_not_value() {
        let collection = ElementCollection::from_ids(vec![ElementId(1), ElementId(2)]);
        assert!(collection.contains(ElementId(2)));
        assert_eq!(collection.index_of_element(ElementId(2)), Some(1));
        assert_eq!(collection.index_of_element(ElementId(5)), None);
    }

    #[test]
    fn aggregate_sum_treats_missing_attribute_as_zero() {
        let mut tree = ElementTree::new();
        let root_id = tree.next_id();
        tree.set_root_id(root_id);
        let mut header = ElementHeader::new(root_id, "Card");
        header.attributes.insert("power".to_string(), serde_json::json!(3));
        tree.insert(Element::Piece(PieceData { header }));

        let other_id = tree.next_id();
        tree.insert(Element::Piece(PieceData { header: ElementHeader::new(other_id, "Card") }));

        let collection = ElementCollection::from_ids(vec![root_id, other_id]);
        assert_eq!(collection.aggregate_sum(&tree, "power"), 3);
    }
}
