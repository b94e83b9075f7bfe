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

//! The lobby state machine (spec.md §4.6): seats, color-conflict
//! validation, connection/grace-window bookkeeping, and the hand-off to a
//! [Game][data::game::Game] once the host starts it.

use std::time::Duration;

use data::game::GameSettings;
use data::lobby::{LobbyInfo, LobbyState, PlayerConfig, PlayerOptions, SessionSlot};
use primitives::{PlayerId, Seat};
use tracing::{debug, info};
use utils::outcome::{EngineError, Value as EngineResult};

/// Owns every seat for one lobby from creation until the game it starts is
/// evicted. `grace` is how long a disconnected slot retains its color and
/// options before [LobbyManager::evict_expired] frees the seat (spec.md
/// §4.6, §5, §9 - "a configurable grace window is exposed; the default is
/// not prescribed"). The core has no clock of its own, so callers drive
/// eviction by calling `evict_expired(now)` on whatever cadence their host
/// process prefers.
#[derive(Debug, Clone)]
pub struct LobbyManager {
    state: LobbyState,
    slots: Vec<SessionSlot>,
    settings: GameSettings,
    grace: Duration,
}

impl LobbyManager {
    pub fn new(seat_count: u32, settings: GameSettings, grace: Duration) -> Self {
        let slots = (1..=seat_count)
            .map(|i| SessionSlot::new(Seat(i), format!("Seat {i}")))
            .collect();
        Self { state: LobbyState::Waiting, slots, settings, grace }
    }

    pub fn state(&self) -> LobbyState {
        self.state
    }

    pub fn slots(&self) -> &[SessionSlot] {
        &self.slots
    }

    /// Direct write access to every slot, used by [crate::session::Session::restore]
    /// to seed slots from a persisted snapshot in one pass.
    pub fn slots_mut(&mut self) -> &mut [SessionSlot] {
        &mut self.slots
    }

    pub fn info(&self) -> LobbyInfo {
        LobbyInfo {
            state: self.state,
            slots: self.slots.clone(),
            color_selection_enabled: self.settings.color_selection_enabled,
            colors: self.settings.colors.clone(),
        }
    }

    fn slot_mut(&mut self, seat: Seat) -> Option<&mut SessionSlot> {
        self.slots.iter_mut().find(|slot| slot.seat == seat)
    }

    fn slot_by_player_mut(&mut self, player_id: PlayerId) -> Option<&mut SessionSlot> {
        self.slots.iter_mut().find(|slot| slot.player_id == Some(player_id))
    }

    /// Claims an empty seat for `player_id`. Fails if the seat is already
    /// claimed by a different, still-connected player.
    pub fn join(&mut self, seat: Seat, player_id: PlayerId, name: impl Into<String>) -> EngineResult<()> {
        let name = name.into();
        let slot = self.slots.iter_mut().find(|s| s.seat == seat).ok_or(EngineError::PlayerNotInLobby)?;
        if slot.connected && slot.player_id.is_some() && slot.player_id != Some(player_id) {
            return Err(EngineError::PlayerNotInLobby);
        }
        slot.player_id = Some(player_id);
        slot.name = name;
        slot.connected = true;
        slot.disconnected_at = None;
        info!(?seat, "Player joined lobby");
        Ok(())
    }

    /// Conflict check for spec.md §4.6's color validation: `color` is
    /// taken iff a *different* slot (including AI slots) currently holds
    /// it. Comparison uses `seat`, not `player_id`, since AI slots have
    /// none (spec.md §4.6, "Conflict detection uses seat comparison").
    fn color_conflict(&self, seat: Seat, color: &str) -> Option<String> {
        self.slots
            .iter()
            .find(|slot| slot.seat != seat && slot.player_options.color.as_deref() == Some(color))
            .map(|slot| slot.name.clone())
    }

    fn apply_options(slot: &mut SessionSlot, options: PlayerOptions) {
        if let Some(color) = options.color {
            slot.player_options.color = Some(color);
        }
        slot.player_options.extra.extend(options.extra);
    }

    /// A player updates their own options (spec.md §4.6,
    /// `updatePlayerOptions`).
    pub fn update_player_options(&mut self, player_id: PlayerId, options: PlayerOptions) -> EngineResult<()> {
        let seat = self
            .slots
            .iter()
            .find(|s| s.player_id == Some(player_id))
            .map(|s| s.seat)
            .ok_or(EngineError::PlayerNotInLobby)?;
        if let Some(color) = &options.color {
            if let Some(conflicting) = self.color_conflict(seat, color) {
                return Err(EngineError::ColorAlreadyTaken(conflicting));
            }
        }
        let slot = self.slot_by_player_mut(player_id).expect("seat looked up above must exist");
        Self::apply_options(slot, options);
        Ok(())
    }

    /// The host overrides a slot's options directly by seat, including AI
    /// slots that have no `player_id` (spec.md §4.6,
    /// `updateSlotPlayerOptions`).
    pub fn update_slot_player_options(&mut self, seat: Seat, options: PlayerOptions) -> EngineResult<()> {
        if !self.slots.iter().any(|s| s.seat == seat) {
            return Err(EngineError::PlayerNotInLobby);
        }
        if let Some(color) = &options.color {
            if let Some(conflicting) = self.color_conflict(seat, color) {
                return Err(EngineError::ColorAlreadyTaken(conflicting));
            }
        }
        let slot = self.slot_mut(seat).expect("presence checked above");
        Self::apply_options(slot, options);
        Ok(())
    }

    /// Marks an AI-controlled slot, bypassing `player_id` assignment
    /// entirely (spec.md §4.6, "AI slots have no playerId").
    pub fn set_ai(&mut self, seat: Seat, name: impl Into<String>) -> EngineResult<()> {
        let slot = self.slots.iter_mut().find(|s| s.seat == seat).ok_or(EngineError::PlayerNotInLobby)?;
        slot.is_ai = true;
        slot.name = name.into();
        slot.connected = true;
        Ok(())
    }

    /// Updates a seat's connection flag, preserving `player_options`
    /// (spec.md §4.6, `setPlayerConnected`). `now` stamps the
    /// disconnection instant so [LobbyManager::evict_expired] can later
    /// compare it against the grace window.
    pub fn set_player_connected(&mut self, player_id: PlayerId, connected: bool, now: u64) -> EngineResult<()> {
        let slot = self.slot_by_player_mut(player_id).ok_or(EngineError::PlayerNotInLobby)?;
        slot.connected = connected;
        slot.disconnected_at = if connected { None } else { Some(now) };
        Ok(())
    }

    /// Frees any slot that has been disconnected for longer than `grace`,
    /// clearing its player association. Color and options are lost for an
    /// evicted slot; a slot still inside its grace window is untouched
    /// (spec.md §5, "during that window the slot retains its color and
    /// options").
    pub fn evict_expired(&mut self, now: u64) {
        let grace_secs = self.grace.as_secs();
        for slot in &mut self.slots {
            if let Some(disconnected_at) = slot.disconnected_at {
                if now.saturating_sub(disconnected_at) > grace_secs {
                    debug!(?slot.seat, "Evicting expired lobby slot");
                    let seat = slot.seat;
                    *slot = SessionSlot::new(seat, format!("Seat {}", seat.0));
                }
            }
        }
    }

    /// Snapshots every occupied slot into a [PlayerConfig] ready for
    /// [data::game::GameConfig], transitioning the lobby to
    /// [LobbyState::InProgress] (spec.md §4.6, `startGame`).
    pub fn start_game(&mut self) -> EngineResult<Vec<PlayerConfig>> {
        if self.state != LobbyState::Waiting {
            return Err(EngineError::LobbyNotWaiting);
        }
        self.state = LobbyState::Starting;
        let configs = self
            .slots
            .iter()
            .map(|slot| PlayerConfig {
                seat: slot.seat,
                name: slot.name.clone(),
                color: slot.player_options.color.clone(),
                is_ai: slot.is_ai,
            })
            .collect();
        self.state = LobbyState::InProgress;
        Ok(configs)
    }

    pub fn finish(&mut self) {
        self.state = LobbyState::Finished;
    }

    pub fn settings(&self) -> &GameSettings {
        &self.settings
    }
}
