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

//! Pre-flight compatibility check run against a [GameSnapshot] before
//! restoring it into a live [ElementTree], typically with a class registry
//! that was just rebuilt by a hot-reloaded [crate::construction::GameDefinition].
//!
//! Validating first (rather than letting [crate::snapshot::restore] fail
//! partway through) means a caller can decide what to do about
//! incompatibility -- fall back to a checkpoint, fall back to a full
//! replay, or surface the problem to a developer -- before any tree
//! mutation has happened.

use std::collections::BTreeSet;

use data::core::primitives::ElementId;
use data::game_states::class_registry::ClassRegistry;

use crate::snapshot::GameSnapshot;

#[derive(Debug, Clone, PartialEq)]
pub enum ValidationProblem {
    /// An element's `class_name` has no entry in the registry being
    /// validated against.
    MissingClass { element_id: ElementId, class_name: String },

    /// An element's `class_name` is registered, but as a different
    /// structural [data::elements::element::ElementKind] than the snapshot
    /// recorded (e.g. a class that used to construct a `Piece` now
    /// constructs a `Space`).
    SchemaError { element_id: ElementId, class_name: String, message: String },

    /// A structural reference within the snapshot doesn't resolve: a
    /// `parent`/`children` link or `root_id`/`pile_id` pointing at an id
    /// absent from the snapshot's own element map.
    PropertyMismatch { element_id: Option<ElementId>, message: String },
}

#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    pub problems: Vec<ValidationProblem>,
}

impl ValidationReport {
    pub fn is_ok(&self) -> bool {
        self.problems.is_empty()
    }
}

/// Checks `snapshot` against `registry`, reporting every incompatibility
/// rather than stopping at the first one found, so a caller deciding
/// whether to attempt restore sees the full picture.
pub fn validate(snapshot: &GameSnapshot, registry: &ClassRegistry) -> ValidationReport {
    let mut problems = vec![];
    let known_ids: BTreeSet<ElementId> = snapshot.elements.keys().copied().collect();

    if !known_ids.contains(&snapshot.root_id) {
        problems.push(ValidationProblem::PropertyMismatch {
            element_id: None,
            message: format!("root_id {} is not present among the snapshot's elements", snapshot.root_id),
        });
    }
    if !known_ids.contains(&snapshot.pile_id) {
        problems.push(ValidationProblem::PropertyMismatch {
            element_id: None,
            message: format!("pile_id {} is not present among the snapshot's elements", snapshot.pile_id),
        });
    }

    for record in snapshot.elements.values() {
        match registry.get(&record.class_name) {
            None => problems.push(ValidationProblem::MissingClass {
                element_id: record.id,
                class_name: record.class_name.clone(),
            }),
            Some(entry) if entry.kind != record.kind => {
                problems.push(ValidationProblem::SchemaError {
                    element_id: record.id,
                    class_name: record.class_name.clone(),
                    message: format!(
                        "registered as {:?} but the snapshot recorded it as {:?}",
                        entry.kind, record.kind
                    ),
                });
            }
            _ => {}
        }

        if let Some(parent) = record.parent {
            if !known_ids.contains(&parent) {
                problems.push(ValidationProblem::PropertyMismatch {
                    element_id: Some(record.id),
                    message: format!("parent {parent} is not present among the snapshot's elements"),
                });
            }
        }
        for child in &record.children {
            if !known_ids.contains(child) {
                problems.push(ValidationProblem::PropertyMismatch {
                    element_id: Some(record.id),
                    message: format!("child {child} is not present among the snapshot's elements"),
                });
            }
        }
    }

    ValidationReport { problems }
}

#[cfg(test)]
mod tests {
    use data::core::primitives::GamePhase;
    use data::elements::element::{Element, ElementHeader, ElementKind, SpaceData};

    use super::*;
    use crate::snapshot::ElementSnapshot;

    fn space_record(id: u64, class_name: &str) -> ElementSnapshot {
        ElementSnapshot {
            id: ElementId(id),
            class_name: class_name.to_string(),
            kind: ElementKind::Space,
            name: None,
            owner: None,
            parent: None,
            children: vec![],
            ordering: Default::default(),
            visibility_override: None,
            attributes: Default::default(),
            zone_visibility: None,
            player_position: None,
            player_is_current: None,
        }
    }

    fn base_snapshot() -> GameSnapshot {
        let root = space_record(0, "Space");
        let pile = space_record(1, "Space");
        let mut elements = std::collections::BTreeMap::new();
        elements.insert(root.id, root);
        elements.insert(pile.id, pile);
        GameSnapshot {
            elements,
            root_id: ElementId(0),
            pile_id: ElementId(1),
            next_id: 2,
            phase: GamePhase::Started,
            messages: vec![],
            settings: Default::default(),
        }
    }

    #[test]
    fn a_compatible_snapshot_reports_no_problems() {
        let snapshot = base_snapshot();
        let report = validate(&snapshot, &ClassRegistry::new());
        assert!(report.is_ok());
    }

    #[test]
    fn an_unregistered_class_is_a_missing_class_problem() {
        let mut snapshot = base_snapshot();
        let mut record = space_record(2, "Hand");
        record.parent = Some(ElementId(0));
        snapshot.elements.insert(record.id, record);
        let report = validate(&snapshot, &ClassRegistry::new());
        assert!(matches!(
            report.problems.as_slice(),
            [ValidationProblem::MissingClass { class_name, .. }] if class_name == "Hand"
        ));
    }

    #[test]
    fn a_class_whose_kind_changed_is_a_schema_error() {
        let mut registry = ClassRegistry::new();
        registry.register("Hand", ElementKind::Piece, |id, name| {
            Element::Space(SpaceData { header: ElementHeader::new(id, name), zone_visibility: None })
        });
        let mut snapshot = base_snapshot();
        let mut record = space_record(2, "Hand");
        record.parent = Some(ElementId(0));
        snapshot.elements.insert(record.id, record);
        let report = validate(&snapshot, &registry);
        assert!(matches!(report.problems.as_slice(), [ValidationProblem::SchemaError { .. }]));
    }

    #[test]
    fn a_dangling_parent_reference_is_a_property_mismatch() {
        let mut snapshot = base_snapshot();
        let mut record = space_record(2, "Space");
        record.parent = Some(ElementId(99));
        snapshot.elements.insert(record.id, record);
        let report = validate(&snapshot, &ClassRegistry::new());
        assert!(matches!(report.problems.as_slice(), [ValidationProblem::PropertyMismatch { .. }]));
    }
}
