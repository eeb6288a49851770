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

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::core::primitives::AnimationEventId;

/// An ordered, id-stamped record of an intended visual transition, emitted
/// by effect code and acknowledged by clients.
///
/// The engine itself never interprets `kind`/`data`; they're an opaque
/// payload the host's renderer understands. Ordering is what the engine
/// guarantees: events are totally ordered by `id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnimationEvent {
    pub id: AnimationEventId,
    pub kind: String,
    pub data: JsonValue,
}

/// Append-only buffer of emitted, not-yet-acknowledged animation events.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnimationBuffer {
    events: Vec<AnimationEvent>,
    next_id: u64,
}

impl AnimationBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, kind: impl Into<String>, data: JsonValue) -> AnimationEventId {
        let id = AnimationEventId(self.next_id);
        self.next_id += 1;
        self.events.push(AnimationEvent { id, kind: kind.into(), data });
        id
    }

    pub fn events(&self) -> &[AnimationEvent] {
        &self.events
    }

    pub fn last_event_id(&self) -> Option<AnimationEventId> {
        self.events.last().map(|event| event.id)
    }

    /// Drops every event up to and including `acknowledged`, as reported by
    /// a client that has finished playing them back.
    pub fn acknowledge(&mut self, acknowledged: AnimationEventId) {
        self.events.retain(|event| event.id.0 > acknowledged.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_are_totally_ordered_by_id() {
        let mut buffer = AnimationBuffer::new();
        let first = buffer.push("move", JsonValue::Null);
        let second = buffer.push("move", JsonValue::Null);
        assert!(second.0 > first.0);
        assert_eq!(buffer.last_event_id(), Some(second));
    }

    #[test]
    fn acknowledge_drops_prefix() {
        let mut buffer = AnimationBuffer::new();
        let first = buffer.push("a", JsonValue::Null);
        buffer.push("b", JsonValue::Null);
        buffer.acknowledge(first);
        assert_eq!(buffer.events().len(), 1);
    }
}
