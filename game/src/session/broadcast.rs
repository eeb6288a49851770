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

//! Pushes a freshly projected [crate::view::GameView] to every viewer
//! subscribed to a session, once per successful mutation.

use std::collections::BTreeMap;

use data::core::primitives::PlayerPosition;
use data::game_states::game_root::GameRoot;
use data::player_states::player_state::PlayersTrait;

use crate::view::{self, GameView};

/// Receives a viewer's own projected state. Implemented by whatever
/// transport a host wires up (a websocket connection, an in-process
/// channel, a test spy); the session itself only knows this trait.
///
/// Not `Send`/`Sync` — sessions are entered from one logical thread at a
/// time (see the engine's single-threaded cooperative scheduling), so a
/// sink never needs to cross a thread boundary.
pub trait ViewerSink {
    fn send(&self, view: &GameView);
}

#[derive(Default)]
pub struct Broadcaster {
    subscribers: BTreeMap<PlayerPosition, Vec<Box<dyn ViewerSink>>>,
}

impl Broadcaster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, player: PlayerPosition, sink: Box<dyn ViewerSink>) {
        self.subscribers.entry(player).or_default().push(sink);
    }

    pub fn unsubscribe_all(&mut self, player: PlayerPosition) {
        self.subscribers.remove(&player);
    }

    /// Projects and pushes `game`'s state to every subscribed viewer. A
    /// seat with no subscribers is simply skipped rather than projected for
    /// nothing.
    pub fn broadcast(&self, game: &GameRoot) {
        for player in game.tree.players_in_order() {
            let Some(sinks) = self.subscribers.get(&player.position) else { continue };
            if sinks.is_empty() {
                continue;
            }
            let view = view::project(game, player.position);
            for sink in sinks {
                sink.send(&view);
            }
        }
    }
}
