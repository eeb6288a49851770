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

use data::core::primitives::{ElementId, PlayerPosition};
use data::elements::element::Element;
use data::game_states::element_tree::ElementTree;
use serde_json::Value as JsonValue;

use crate::tree::collection::ElementCollection;

/// Document order (declaration order within a parent's children, depth
/// first) or its reverse.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Order {
    Ascending,
    Descending,
}

/// One refinement applied on top of the class filter. String matches
/// `name`, a function is arbitrary, and an object matches attributes with
/// two special keys: `mine` (owner equals the finder's configured viewer)
/// and `empty` (the element has no children).
pub enum RefinePredicate {
    Name(String),
    Func(fn(&Element) -> bool),
    Attrs(AttrMatch),
}

#[derive(Default)]
pub struct AttrMatch {
    pub fields: BTreeMap<String, JsonValue>,
    pub mine: Option<bool>,
    pub empty: Option<bool>,
}

/// Single finder behind `first`/`last`/`firstN`/`lastN`/`all`/`has`/`count`:
/// a class filter, an optional limit, a document-order direction, and any
/// number of refine predicates, with an explicit switch between recursive
/// descendant traversal and direct-children-only traversal.
pub struct Finder<'a> {
    tree: &'a ElementTree,
    root: ElementId,
    class_filter: Option<String>,
    predicates: Vec<RefinePredicate>,
    order: Order,
    limit: Option<usize>,
    recurse: bool,
    viewer: Option<PlayerPosition>,
}

impl<'a> Finder<'a> {
    /// A finder that recurses through all descendants of `root` (the
    /// normative behavior per the engine's query semantics).
    pub fn new(tree: &'a ElementTree, root: ElementId) -> Self {
        Self {
            tree,
            root,
            class_filter: None,
            predicates: vec![],
            order: Order::Ascending,
            limit: None,
            recurse: true,
            viewer: None,
        }
    }

    /// A finder restricted to `root`'s direct children, for "top card"
    /// style queries that must not recurse into nested containers.
    pub fn direct_children(tree: &'a ElementTree, root: ElementId) -> Self {
        let mut finder = Self::new(tree, root);
        finder.recurse = false;
        finder
    }

    pub fn class(mut self, class_name: impl Into<String>) -> Self {
        self.class_filter = Some(class_name.into());
        self
    }

    pub fn refine(mut self, predicate: RefinePredicate) -> Self {
        self.predicates.push(predicate);
        self
    }

    pub fn order(mut self, order: Order) -> Self {
        self.order = order;
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn viewer(mut self, viewer: PlayerPosition) -> Self {
        self.viewer = Some(viewer);
        self
    }

    fn candidates(&self) -> Vec<ElementId> {
        let mut out = vec![];
        self.collect(self.root, &mut out, true);
        out
    }

    fn collect(&self, id: ElementId, out: &mut Vec<ElementId>, is_root: bool) {
        let children = self.tree.get(id).header().children.clone();
        for child in children {
            out.push(child);
            if self.recurse {
                self.collect(child, out, false);
            }
        }
        let _ = is_root;
    }

    fn matches(&self, id: ElementId) -> bool {
        let element = self.tree.get(id);
        if let Some(class_name) = &self.class_filter {
            if &element.header().class_name != class_name {
                return false;
            }
        }
        self.predicates.iter().all(|predicate| self.matches_predicate(element, predicate))
    }

    fn matches_predicate(&self, element: &Element, predicate: &RefinePredicate) -> bool {
        match predicate {
            RefinePredicate::Name(name) => element.header().name.as_deref() == Some(name.as_str()),
            RefinePredicate::Func(func) => func(element),
            RefinePredicate::Attrs(attrs) => {
                if let Some(mine) = attrs.mine {
                    let is_mine = self.viewer.is_some() && element.header().owner == self.viewer;
                    if is_mine != mine {
                        return false;
                    }
                }
                if let Some(empty) = attrs.empty {
                    if element.header().children.is_empty() != empty {
                        return false;
                    }
                }
                attrs.fields.iter().all(|(key, value)| element.header().attributes.get(key) == Some(value))
            }
        }
    }

    fn filtered(&self) -> Vec<ElementId> {
        let mut ids: Vec<ElementId> = self.candidates().into_iter().filter(|&id| self.matches(id)).collect();
        if self.order == Order::Descending {
            ids.reverse();
        }
        if let Some(limit) = self.limit {
            ids.truncate(limit);
        }
        ids
    }

    pub fn all(&self) -> ElementCollection {
        ElementCollection::from_ids(self.filtered())
    }

    pub fn first(&self) -> Option<ElementId> {
        self.filtered().into_iter().next()
    }

    pub fn last(&self) -> Option<ElementId> {
        self.filtered().into_iter().last()
    }

    pub fn first_n(&self, n: usize) -> Vec<ElementId> {
        self.filtered().into_iter().take(n).collect()
    }

    pub fn last_n(&self, n: usize) -> Vec<ElementId> {
        let ids = self.filtered();
        let start = ids.len().saturating_sub(n);
        ids[start..].to_vec()
    }

    pub fn has(&self) -> bool {
        self.first().is_some()
    }

    pub fn count(&self) -> usize {
        self.filtered().len()
    }
}

#[cfg(test)]
mod tests {
    use data::elements::element::{Element, ElementHeader, PieceData, SpaceData};

    use super::*;

    fn build_deck() -> (ElementTree, ElementId) {
        let mut tree = ElementTree::new();
        let root_id = tree.next_id();
        tree.set_root_id(root_id);
        tree.insert(Element::Space(SpaceData {
            header: ElementHeader::new(root_id, "Space"),
            zone_visibility: None,
        }));

        let deck_id = tree.next_id();
        let mut deck_header = ElementHeader::new(deck_id, "Deck");
        deck_header.parent = Some(root_id);
        tree.get_mut(root_id).header_mut().insert_child(deck_id);
        tree.insert(Element::Space(SpaceData { header: deck_header, zone_visibility: None }));

        for i in 0..5 {
            let card_id = tree.next_id();
            let mut card_header = ElementHeader::new(card_id, "Card");
            card_header.parent = Some(deck_id);
            card_header.name = Some(i.to_string());
            tree.get_mut(deck_id).header_mut().insert_child(card_id);
            tree.insert(Element::Piece(PieceData { header: card_header }));
        }

        (tree, deck_id)
    }

    #[test]
    fn finds_direct_children_by_class() {
        let (tree, deck_id) = build_deck();
        let found = Finder::new(&tree, deck_id).class("Card").all();
        assert_eq!(found.len(), 5);
    }

    #[test]
    fn first_and_last_respect_document_order() {
        let (tree, deck_id) = build_deck();
        let finder = Finder::new(&tree, deck_id).class("Card");
        let first = finder.first().unwrap();
        assert_eq!(tree.get(first).header().name.as_deref(), Some("0"));
        let last = Finder::new(&tree, deck_id).class("Card").last().unwrap();
        assert_eq!(tree.get(last).header().name.as_deref(), Some("4"));
    }

    #[test]
    fn refine_by_name() {
        let (tree, deck_id) = build_deck();
        let found = Finder::new(&tree, deck_id)
            .class("Card")
            .refine(RefinePredicate::Name("2".to_string()))
            .first();
        assert_eq!(tree.get(found.unwrap()).header().name.as_deref(), Some("2"));
    }

    #[test]
    fn recurses_by_default_but_direct_children_does_not() {
        let (tree, root_id) = build_deck();
        let recursive = Finder::new(&tree, root_id).class("Card").count();
        assert_eq!(recursive, 5);
        let direct = Finder::direct_children(&tree, root_id).class("Card").count();
        assert_eq!(direct, 0);
    }

    #[test]
    fn limit_truncates_results() {
        let (tree, deck_id) = build_deck();
        let found = Finder::new(&tree, deck_id).class("Card").limit(2).all();
        assert_eq!(found.len(), 2);
    }
}
