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

/// Opaque, serializable snapshot of the flow engine's execution state.
/// Produced by `rules::flow::engine::export_position` and consumed by
/// `rules::flow::engine::restore`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlowPosition {
    /// Ordered stack of child indices identifying the currently active
    /// frame, relative to the root flow node.
    pub path: Vec<usize>,

    /// Iteration counters for frames on the stack that track one (keyed by
    /// stringified stack depth, since depth is the only stable identifier
    /// across re-entrant loops at different paths).
    pub iterations: BTreeMap<String, u32>,

    /// 0-indexed position of the current player, if any player is
    /// currently active in the flow (`each-player`/`action-step`).
    pub player_index: Option<u32>,

    /// Flow-scoped variables bound by `for-each` and `execute`.
    pub variables: BTreeMap<String, JsonValue>,
}
