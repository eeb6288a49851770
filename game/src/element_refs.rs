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

//! Encoding and resolution of element references that appear inside a
//! game's own attribute values (e.g. a card's `attachedTo` field), as
//! distinct from the structural tree itself.
//!
//! Three wire shapes are recognized, matching the external contract:
//! `{__elementRef: "<branch path>"}` (slash-separated child-index path from
//! root), `{__elementId: <id>}` (direct id lookup), and `{__playerRef:
//! <position>, position, name, color?}` (a player reference with a display
//! hint payload). A resolved reference is always rewritten back to the
//! `__elementId` canonical form -- branch paths are a convenience encoding
//! for authoring, not a second source of truth once restore has run.

use color_eyre::eyre::ensure;
use data::core::primitives::{ElementId, PlayerPosition};
use data::game_states::element_tree::ElementTree;
use data::player_states::player_state::PlayersTrait;
use serde_json::{Map, Value as JsonValue};
use utils::path::{parse_branch_path, render_branch_path};

/// Recursion cap for [rewrite_references], matching the two-pass restore
/// design note's "depth-limit recursion (~100) to catch pathological
/// graphs."
const MAX_DEPTH: usize = 100;

pub fn encode_element_id_ref(id: ElementId) -> JsonValue {
    serde_json::json!({ "__elementId": id.0 })
}

/// Encodes `id` as a branch path from the tree root, or `None` if `id` is
/// not reachable from the root (e.g. it's sitting detached in the pile, or
/// doesn't exist).
pub fn encode_branch_ref(tree: &ElementTree, id: ElementId) -> Option<JsonValue> {
    let path = path_to(tree, id)?;
    Some(serde_json::json!({ "__elementRef": render_branch_path(&path) }))
}

/// Encodes a player reference with the display hint fields a client uses
/// to render it without a second lookup.
pub fn encode_player_ref(tree: &ElementTree, position: PlayerPosition) -> JsonValue {
    let player = tree.player(position);
    serde_json::json!({
        "__playerRef": position.0,
        "position": position.0,
        "name": player.header.name,
    })
}

pub fn is_element_ref(value: &JsonValue) -> bool {
    value
        .as_object()
        .is_some_and(|obj| obj.contains_key("__elementRef") || obj.contains_key("__elementId") || obj.contains_key("__playerRef"))
}

/// Resolves any of the three recognized reference shapes to a live
/// [ElementId], or `None` if the shape isn't recognized or the target no
/// longer exists.
pub fn resolve_ref(tree: &ElementTree, value: &JsonValue) -> Option<ElementId> {
    let obj = value.as_object()?;
    resolve_ref_object(tree, obj)
}

fn resolve_ref_object(tree: &ElementTree, obj: &Map<String, JsonValue>) -> Option<ElementId> {
    if let Some(JsonValue::String(path)) = obj.get("__elementRef") {
        let indices = parse_branch_path(path)?;
        return resolve_path(tree, &indices);
    }
    if let Some(raw_id) = obj.get("__elementId") {
        let id = ElementId(raw_id.as_u64()?);
        return tree.contains(id).then_some(id);
    }
    if let Some(raw_position) = obj.get("__playerRef") {
        let position = PlayerPosition(raw_position.as_u64()? as u32);
        return tree.players_in_order().into_iter().find(|p| p.position == position).map(|p| p.header.id);
    }
    None
}

/// Walks `value` recursively, rewriting every recognized reference shape
/// in place to the canonical `{__elementId: <id>}` form, resolved against
/// `tree`. Unresolvable references (dangling branch path, missing id,
/// unknown player) are left untouched rather than erased -- they surface
/// as `resolve_ref` returning `None` to whichever game code reads the
/// attribute next, rather than silently vanishing.
pub fn rewrite_references(tree: &ElementTree, value: &mut JsonValue, depth: usize) -> color_eyre::Result<()> {
    ensure!(depth <= MAX_DEPTH, "Element reference graph exceeded depth {MAX_DEPTH}, likely a cycle");

    match value {
        JsonValue::Object(map) => {
            if let Some(id) = resolve_ref_object(tree, map) {
                *value = encode_element_id_ref(id);
                return Ok(());
            }
            for nested in map.values_mut() {
                rewrite_references(tree, nested, depth + 1)?;
            }
        }
        JsonValue::Array(items) => {
            for nested in items.iter_mut() {
                rewrite_references(tree, nested, depth + 1)?;
            }
        }
        _ => {}
    }
    Ok(())
}

fn path_to(tree: &ElementTree, id: ElementId) -> Option<Vec<usize>> {
    let mut indices = vec![];
    let mut current = id;
    loop {
        let header = tree.try_get(current)?.header();
        match header.parent {
            Some(parent_id) => {
                let parent_header = tree.try_get(parent_id)?.header();
                let index = parent_header.children.iter().position(|&child| child == current)?;
                indices.push(index);
                current = parent_id;
            }
            None => break,
        }
    }
    if current != tree.root_id() {
        return None;
    }
    indices.reverse();
    Some(indices)
}

fn resolve_path(tree: &ElementTree, path: &[usize]) -> Option<ElementId> {
    let mut current = tree.root_id();
    for &index in path {
        current = *tree.try_get(current)?.header().children.get(index)?;
    }
    Some(current)
}
