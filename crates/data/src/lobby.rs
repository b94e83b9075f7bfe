// Copyright © BoardSmith 2024-present
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

//! Lobby/session value types (spec.md §4.6). The state machine and its
//! mutating operations (`updatePlayerOptions`, color-conflict validation,
//! `startGame`, reconnection) live in the `game` crate's `LobbyManager`;
//! this module declares the shapes it operates on.

use std::collections::BTreeMap;

use primitives::{PlayerId, Seat};
use serde::{Deserialize, Serialize};

use crate::value::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LobbyState {
    Waiting,
    Starting,
    InProgress,
    Finished,
}

/// Free-form per-player preferences; `color` is the one field the engine
/// interprets directly, everything else is passed through untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlayerOptions {
    pub color: Option<String>,
    pub extra: BTreeMap<String, Value>,
}

/// One seat's occupancy record, owned by the lobby for the life of the
/// lobby (spec.md §3, "Session slot"). `player_id` is absent for an AI
/// slot or an unfilled seat.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSlot {
    pub seat: Seat,
    pub player_id: Option<PlayerId>,
    pub name: String,
    pub connected: bool,
    pub player_options: PlayerOptions,
    pub is_ai: bool,
    /// Set the instant `connected` flips to `false`; the lobby manager
    /// compares this against its configured grace window before evicting.
    pub disconnected_at: Option<u64>,
}

impl SessionSlot {
    pub fn new(seat: Seat, name: impl Into<String>) -> Self {
        Self {
            seat,
            player_id: None,
            name: name.into(),
            connected: false,
            player_options: PlayerOptions::default(),
            is_ai: false,
            disconnected_at: None,
        }
    }
}

/// Broadcast-friendly summary of the lobby, letting a UI conditionally
/// render a color picker without consulting the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LobbyInfo {
    pub state: LobbyState,
    pub slots: Vec<SessionSlot>,
    pub color_selection_enabled: bool,
    pub colors: Vec<String>,
}

/// A fully-configured seat as snapshotted into `playerConfigs` when
/// `startGame` runs; this is what reconstructs a [crate::game::Game]
/// deterministically from a persisted snapshot (spec.md §6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerConfig {
    pub seat: Seat,
    pub name: String,
    pub color: Option<String>,
    pub is_ai: bool,
}
