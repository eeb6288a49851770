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

//! Cooperative AI scheduling: after every successfully performed action, a
//! session offers each non-human seat a chance to act. Selection is a pure
//! read of the current state (mirroring [data::game_states::game_root]'s
//! separation of decision from mutation); actually performing the chosen
//! action is the caller's job, via the ordinary [crate::session::Session::perform_action]
//! path, so an AI move is indistinguishable from a human one once chosen.

use std::time::Duration;

use data::core::primitives::PlayerPosition;
use data::game_states::game_root::GameRoot;
use data::game_states::history_data::SerializedAction;

/// Selects the next action for `player`, or `None` if it has nothing legal
/// to do.
pub type AiSelectFn = fn(&GameRoot, PlayerPosition) -> Option<SerializedAction>;

/// Consecutive-failure counter that stops scheduling further AI checks for
/// a seat once it has failed to produce a usable move three times in a
/// row, rather than retrying forever against a broken strategy function.
#[derive(Debug, Clone, Copy, Default)]
pub struct AiCircuitBreaker {
    consecutive_failures: u32,
}

impl AiCircuitBreaker {
    const MAX_CONSECUTIVE_FAILURES: u32 = 3;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_open(&self) -> bool {
        self.consecutive_failures >= Self::MAX_CONSECUTIVE_FAILURES
    }

    pub fn record_success(&mut self) {
        self.consecutive_failures = 0;
    }

    pub fn record_failure(&mut self) {
        self.consecutive_failures += 1;
    }
}

/// Waits out a short thinking pause, then asks `select` for `player`'s next
/// move. The pause exists so a fast AI doesn't make human opponents feel
/// like they're playing against a wall.
pub async fn select_after_delay(
    game: &GameRoot,
    player: PlayerPosition,
    select: AiSelectFn,
) -> Option<SerializedAction> {
    tokio::time::sleep(Duration::from_millis(300)).await;
    select(game, player)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn breaker_opens_after_three_consecutive_failures() {
        let mut breaker = AiCircuitBreaker::new();
        assert!(!breaker.is_open());
        breaker.record_failure();
        breaker.record_failure();
        assert!(!breaker.is_open());
        breaker.record_failure();
        assert!(breaker.is_open());
    }

    #[test]
    fn a_success_resets_the_failure_count() {
        let mut breaker = AiCircuitBreaker::new();
        breaker.record_failure();
        breaker.record_failure();
        breaker.record_success();
        breaker.record_failure();
        breaker.record_failure();
        assert!(!breaker.is_open());
    }
}
