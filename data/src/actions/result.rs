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

use crate::picks::pick::CollectedArgs;

/// What an action's execute function hands back to the caller:
/// success/failure, optional structured data and a display message, and an
/// optional follow-up that becomes the next input barrier without counting
/// as a move.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionResult {
    pub success: bool,
    pub error: Option<crate::error::EngineError>,
    pub data: Option<JsonValue>,
    pub message: Option<String>,
    pub follow_up: Option<FollowUp>,
}

impl ActionResult {
    pub fn ok() -> Self {
        Self { success: true, error: None, data: None, message: None, follow_up: None }
    }

    pub fn ok_with_data(data: JsonValue) -> Self {
        Self { success: true, error: None, data: Some(data), message: None, follow_up: None }
    }

    pub fn failure(error: crate::error::EngineError) -> Self {
        Self { success: false, error: Some(error), data: None, message: None, follow_up: None }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_follow_up(mut self, follow_up: FollowUp) -> Self {
        self.follow_up = Some(follow_up);
        self
    }
}

/// The next action to offer as an input barrier, without incrementing the
/// enclosing `action-step`'s move count.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FollowUp {
    pub action: String,
    pub args: CollectedArgs,
}
