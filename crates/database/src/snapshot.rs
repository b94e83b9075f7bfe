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

//! The persisted snapshot format (spec.md §6): everything an adapter needs
//! to write to durable storage and, later, feed back through
//! `rules::replay::reconstruct` to get back an identical [data::game::Game]
//! (spec.md I6).

use data::lobby::{LobbyState, PlayerConfig, SessionSlot};
use data::log::CommandLogEntry;
use serde::{Deserialize, Serialize};

/// Adapter-facing persisted form of one game/lobby. Round-trips through
/// `serde_json` (or any other `serde` format an adapter picks); this crate
/// takes no position on the wire encoding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistedSnapshot {
    pub game_type: String,
    pub seed: u64,
    pub player_configs: Vec<PlayerConfig>,
    /// Present once the lobby has assembled slots; absent for a snapshot
    /// taken before `startGame` (there is no game to replay yet).
    pub lobby_slots: Option<Vec<SessionSlot>>,
    pub lobby_state: LobbyState,
    pub color_selection_enabled: bool,
    pub colors: Vec<String>,
    pub action_history: Vec<CommandLogEntry>,
}

#[cfg(test)]
mod tests {
    use primitives::Seat;

    use super::*;

    #[test]
    fn round_trips_through_json() {
        let snapshot = PersistedSnapshot {
            game_type: "trestle".to_string(),
            seed: 42,
            player_configs: vec![PlayerConfig {
                seat: Seat(1),
                name: "Alice".to_string(),
                color: Some("#e53e3e".to_string()),
                is_ai: false,
            }],
            lobby_slots: None,
            lobby_state: LobbyState::InProgress,
            color_selection_enabled: true,
            colors: vec!["#e53e3e".to_string()],
            action_history: Vec::new(),
        };

        let json = serde_json::to_string(&snapshot).unwrap();
        let restored: PersistedSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.seed, snapshot.seed);
        assert_eq!(restored.player_configs.len(), 1);
    }
}
