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

use crate::core::primitives::ElementId;
use crate::elements::element::{Element, ElementHeader, ElementKind, PieceData, SpaceData};
use crate::game_states::game_root::GameRoot;

/// Constructs a fresh, default-valued element of a registered class, given
/// the id it should take. Used both for ordinary creation and for
/// two-pass snapshot restore (references may point at elements that don't
/// exist yet, so the tree is built before any cross-references resolve).
pub type ElementConstructor = fn(ElementId, &str) -> Element;

/// Invoked when a piece enters or exits a Space of a given class.
pub type ChildHookFn = fn(&mut GameRoot, space: ElementId, child: ElementId);

#[derive(Clone, Copy)]
pub struct ClassEntry {
    pub kind: ElementKind,
    pub construct: ElementConstructor,
    pub on_enter: Option<ChildHookFn>,
    pub on_exit: Option<ChildHookFn>,
}

/// Maps class names to constructors, as required for deserialization.
///
/// Every class name appearing in a snapshot or an element reference chain
/// must be present here at restore time; a missing entry is a
/// `missing-class` validation error, not a panic, because hot-reload and
/// replay both need to detect it gracefully.
#[derive(Clone, Default)]
pub struct ClassRegistry {
    classes: BTreeMap<String, ClassEntry>,
}

impl ClassRegistry {
    pub fn new() -> Self {
        let mut registry = Self::default();
        registry.register_base_classes();
        registry
    }

    /// Registers the base element classes every game needs regardless of
    /// its own content: a generic untyped `Space` and `Piece`, used as the
    /// root, the pile, and as fallbacks in tests.
    fn register_base_classes(&mut self) {
        self.register("Space", ElementKind::Space, |id, class_name| {
            Element::Space(SpaceData {
                header: ElementHeader::new(id, class_name),
                zone_visibility: None,
            })
        });
        self.register("Piece", ElementKind::Piece, |id, class_name| {
            Element::Piece(PieceData { header: ElementHeader::new(id, class_name) })
        });
    }

    pub fn register(&mut self, class_name: &str, kind: ElementKind, construct: ElementConstructor) {
        self.classes.insert(
            class_name.to_string(),
            ClassEntry { kind, construct, on_enter: None, on_exit: None },
        );
    }

    /// Registers a Space class along with its child-enter/exit hooks,
    /// invoked by `rules::tree::mutation::put_into` whenever a piece is
    /// relocated into or out of a Space of this class.
    pub fn register_space_with_hooks(
        &mut self,
        class_name: &str,
        construct: ElementConstructor,
        on_enter: Option<ChildHookFn>,
        on_exit: Option<ChildHookFn>,
    ) {
        self.classes.insert(
            class_name.to_string(),
            ClassEntry { kind: ElementKind::Space, construct, on_enter, on_exit },
        );
    }

    pub fn get(&self, class_name: &str) -> Option<&ClassEntry> {
        self.classes.get(class_name)
    }

    pub fn contains(&self, class_name: &str) -> bool {
        self.classes.contains_key(class_name)
    }

    pub fn registered_names(&self) -> Vec<String> {
        self.classes.keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_classes_are_registered() {
        let registry = ClassRegistry::new();
        assert!(registry.contains("Space"));
        assert!(registry.contains("Piece"));
        assert!(!registry.contains("Hand"));
    }

    #[test]
    fn custom_class_can_be_registered() {
        let mut registry = ClassRegistry::new();
        registry.register("Hand", ElementKind::Space, |id, class_name| {
            Element::Space(SpaceData {
                header: ElementHeader::new(id, class_name),
                zone_visibility: None,
            })
        });
        assert!(registry.contains("Hand"));
        assert_eq!(registry.registered_names().len(), 3);
    }
}
