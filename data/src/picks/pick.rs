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

use crate::core::primitives::{ElementId, PlayerPosition};
use crate::game_states::game_root::GameRoot;

/// The resolved value of one pick, in either direction: what a player
/// submitted, or what's accumulated so far in a [crate::actions::pending::PendingActionState].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value")]
pub enum PickValue {
    Choice(String),
    Element(ElementId),
    Elements(Vec<ElementId>),
    Number(i64),
    Text(String),
    Player(PlayerPosition),
}

/// Args accumulated for an action so far, keyed by pick name.
pub type CollectedArgs = BTreeMap<String, PickValue>;

/// One legal option for a [PickKind::Choice] pick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChoiceOption {
    pub value: String,
    pub label: String,
    pub disabled_reason: Option<String>,
}

/// One legal option for an [PickKind::Element]/[PickKind::Elements] pick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementOption {
    pub id: ElementId,
    pub disabled_reason: Option<String>,
}

pub type LegalChoicesFn = fn(&GameRoot, PlayerPosition, &CollectedArgs) -> Vec<ChoiceOption>;
pub type LegalElementsFn = fn(&GameRoot, PlayerPosition, &CollectedArgs) -> Vec<ElementOption>;
pub type LegalPlayersFn = fn(&GameRoot, PlayerPosition, &CollectedArgs) -> Vec<PlayerPosition>;

/// Invoked once a pick's value has been chosen but before the action
/// advances to its next pick. May mutate game state — this is why every
/// repeating pick step triggers a broadcast even while the action hasn't
/// completed.
pub type OnSelectFn = fn(&mut GameRoot, PlayerPosition, &PickValue);

/// Invoked once per value collected by a repeating pick.
pub type OnEachFn = fn(&mut GameRoot, PlayerPosition, &PickValue);

/// Tests whether a repeating pick should stop collecting values.
pub type RepeatUntilFn = fn(&GameRoot, PlayerPosition, &CollectedArgs, &[PickValue]) -> bool;

#[derive(Clone, Copy)]
pub struct RepeatConfig {
    pub until: RepeatUntilFn,
    pub on_each: Option<OnEachFn>,
    /// If present, a value equal to this terminates collection even if
    /// `until` has not yet returned true (a caller-supplied terminator
    /// value).
    pub terminator: Option<PickValueKey>,
}

/// A lightweight, hashable stand-in for [PickValue] used only to compare
/// against a repeating pick's terminator value (choice picks terminate by
/// value string; other kinds don't use a terminator in practice).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickValueKey {
    Choice(String),
    Text(String),
}

impl PickValueKey {
    pub fn matches(&self, value: &PickValue) -> bool {
        match (self, value) {
            (PickValueKey::Choice(a), PickValue::Choice(b)) => a == b,
            (PickValueKey::Text(a), PickValue::Text(b)) => a == b,
            _ => false,
        }
    }
}

#[derive(Clone, Copy)]
pub struct MultiSelectBounds {
    pub min: usize,
    pub max: usize,
}

#[derive(Clone, Copy)]
pub enum PickKind {
    Choice { legal: LegalChoicesFn },
    Element { legal: LegalElementsFn },
    Elements { legal: LegalElementsFn, multi_select: Option<MultiSelectBounds> },
    Number { min: i64, max: i64 },
    Text { max_len: usize },
    Player { legal: LegalPlayersFn },
}

/// A typed choice the acting player must make while resolving an action.
#[derive(Clone)]
pub struct Pick {
    pub name: String,
    pub prompt: Option<String>,
    pub kind: PickKind,
    pub optional: bool,
    pub skip_if_only_one: bool,
    /// Name of an earlier pick this one's legal set is indexed by, so a
    /// client can fetch contingent choices without a server round-trip.
    pub depends_on: Option<String>,
    pub on_select: Option<OnSelectFn>,
    pub repeat: Option<RepeatConfig>,
}

impl Pick {
    pub fn new(name: impl Into<String>, kind: PickKind) -> Self {
        Self {
            name: name.into(),
            prompt: None,
            kind,
            optional: false,
            skip_if_only_one: false,
            depends_on: None,
            on_select: None,
            repeat: None,
        }
    }

    pub fn prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = Some(prompt.into());
        self
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn skip_if_only_one(mut self) -> Self {
        self.skip_if_only_one = true;
        self
    }

    pub fn depends_on(mut self, pick_name: impl Into<String>) -> Self {
        self.depends_on = Some(pick_name.into());
        self
    }

    pub fn on_select(mut self, hook: OnSelectFn) -> Self {
        self.on_select = Some(hook);
        self
    }

    pub fn repeating(mut self, config: RepeatConfig) -> Self {
        self.repeat = Some(config);
        self
    }

    pub fn is_repeating(&self) -> bool {
        self.repeat.is_some()
    }

    pub fn requires_pending_resolution(&self) -> bool {
        self.on_select.is_some() || self.is_repeating()
    }
}
