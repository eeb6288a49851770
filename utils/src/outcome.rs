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

use color_eyre::Report;

/// Possible reasons why the flow engine or action executor should halt
/// without that halt being a plain error.
#[derive(Debug)]
#[must_use]
pub enum StopCondition {
    /// Execution reached an input barrier; the caller must resume with a
    /// chosen action (or, for a pending action, the next pick).
    AwaitingInput,

    /// The game has ended.
    GameOver,

    /// A programmer error or unrecoverable condition occurred.
    Error(Report),
}

/// Represents the result of some engine mutation that may legitimately halt
/// execution for a reason other than failure.
///
/// Mirrors a plain [Result] but keeps "the flow needs more input" and "the
/// game is over" distinct from "something went wrong", so callers can match
/// on [StopCondition] instead of threading a separate enum through every
/// signature.
pub type Outcome = Result<(), StopCondition>;

/// Equivalent alias to [Outcome] which wraps a returned value.
pub type Value<T> = Result<T, StopCondition>;

/// Mutation completed successfully, execution can continue.
pub const OK: Outcome = Ok(());

/// Execution reached an input barrier and should pause.
pub const AWAITING_INPUT: Outcome = Err(StopCondition::AwaitingInput);

/// The game has ended; execution should halt.
pub const GAME_OVER: Outcome = Err(StopCondition::GameOver);
