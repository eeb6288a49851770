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

use std::fmt;

use serde::{Deserialize, Serialize};

/// Discriminant for [EngineError], letting callers match on error kind
/// without parsing the human message.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
pub enum ErrorCode {
    InvalidPlayer,
    NotYourTurn,
    ActionNotFound,
    ActionNotAvailable,
    InvalidPick,
    PickNotFound,
    InvalidActionIndex,
    NoActionsToUndo,
    CannotRewindForward,
    LobbyInvalidState,
    ReplayFailed,
    InternalError,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorCode::InvalidPlayer => "INVALID_PLAYER",
            ErrorCode::NotYourTurn => "NOT_YOUR_TURN",
            ErrorCode::ActionNotFound => "ACTION_NOT_FOUND",
            ErrorCode::ActionNotAvailable => "ACTION_NOT_AVAILABLE",
            ErrorCode::InvalidPick => "INVALID_PICK",
            ErrorCode::PickNotFound => "PICK_NOT_FOUND",
            ErrorCode::InvalidActionIndex => "INVALID_ACTION_INDEX",
            ErrorCode::NoActionsToUndo => "NO_ACTIONS_TO_UNDO",
            ErrorCode::CannotRewindForward => "CANNOT_REWIND_FORWARD",
            ErrorCode::LobbyInvalidState => "LOBBY_INVALID_STATE",
            ErrorCode::ReplayFailed => "REPLAY_FAILED",
            ErrorCode::InternalError => "INTERNAL_ERROR",
        };
        write!(f, "{name}")
    }
}

/// Structured failure returned by the action executor and session layer.
///
/// User-visible action failures always flow through this type rather than
/// a panic: `{success:false, error, errorCode?}` in wire form. Programmer
/// errors (illegal structural construction, infinite flow) still bypass
/// this and panic or bail via `color_eyre`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineError {
    pub code: ErrorCode,
    pub message: String,
}

impl EngineError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self { code, message: message.into() }
    }

    pub fn invalid_player(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidPlayer, message)
    }

    pub fn not_your_turn(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotYourTurn, message)
    }

    pub fn action_not_found(name: &str) -> Self {
        Self::new(ErrorCode::ActionNotFound, format!("No action registered named '{name}'"))
    }

    pub fn action_not_available(name: &str) -> Self {
        Self::new(ErrorCode::ActionNotAvailable, format!("Action '{name}' is not available"))
    }

    pub fn invalid_pick(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidPick, message)
    }

    pub fn pick_not_found(name: &str) -> Self {
        Self::new(ErrorCode::PickNotFound, format!("No pick named '{name}' on this action"))
    }

    pub fn invalid_action_index(index: usize, len: usize) -> Self {
        Self::new(ErrorCode::InvalidActionIndex, format!("Action index {index} is out of range for a history of length {len}"))
    }

    pub fn no_actions_to_undo() -> Self {
        Self::new(ErrorCode::NoActionsToUndo, "There are no actions to undo")
    }

    pub fn cannot_rewind_forward(current: usize, target: usize) -> Self {
        Self::new(
            ErrorCode::CannotRewindForward,
            format!("Cannot rewind to index {target}, which is ahead of the current history length {current}"),
        )
    }

    pub fn replay_failed(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ReplayFailed, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for EngineError {}
