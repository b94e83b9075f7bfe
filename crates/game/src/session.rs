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

//! The session: the object a host process actually holds one of per
//! lobby/game. Mediates between the [LobbyManager], the live
//! [data::game::Game], and the action executor/flow engine in `rules`
//! (spec.md §4.6, §4.9).
//!
//! A [Session] is not `Send`/`Sync`-free-for-all concurrent access: spec.md
//! §5 assumes a host serializes calls into one session (a per-game queue
//! upstream of this type), so every method here takes `&mut self` and
//! none of them spawns anything.

use std::collections::VecDeque;
use std::time::Duration;

use data::action::{ActionResult, FollowUp};
use data::animation::AnimationEvent;
use data::flow::FlowNode;
use data::game::{ActionCatalogue, Game, GameConfig, GameSettings};
use data::lobby::{PlayerConfig, PlayerOptions};
use data::log::CommandLogEntry;
use data::value::Args;
use data::view::SessionView;
use database::snapshot::PersistedSnapshot;
use primitives::{AnimationEventId, LogIndex, PlayerId, Seat};
use rules::{executor, flow_engine, replay};
use tracing::instrument;
use utils::outcome::{EngineError, Value as EngineResult};

use crate::lobby::LobbyManager;

/// The game type's author-declared rules, supplied fresh every time a
/// [Session] needs to construct or reconstruct a [Game] (these are not
/// themselves part of the persisted snapshot; spec.md §6 only commits to
/// persisting the *data* a replay needs, not the closures that interpret
/// it).
pub trait GameDefinition: Send + Sync {
    fn game_type(&self) -> &str;
    fn catalogue(&self) -> ActionCatalogue;
    fn flow_root(&self) -> FlowNode;
}

/// Mediates one lobby and, once started, its [Game] (spec.md §4.6,
/// "During `in-progress`, the session exposes `performAction`,
/// `getState`, ...").
pub struct Session<D: GameDefinition> {
    definition: D,
    lobby: LobbyManager,
    game: Option<Game>,
    follow_ups: VecDeque<FollowUp>,
}

impl<D: GameDefinition> Session<D> {
    pub fn new(definition: D, seat_count: u32, settings: GameSettings, grace: Duration) -> Self {
        Self { lobby: LobbyManager::new(seat_count, settings, grace), definition, game: None, follow_ups: VecDeque::new() }
    }

    pub fn lobby(&self) -> &LobbyManager {
        &self.lobby
    }

    pub fn lobby_mut(&mut self) -> &mut LobbyManager {
        &mut self.lobby
    }

    pub fn is_in_progress(&self) -> bool {
        self.game.is_some()
    }

    pub fn join(&mut self, seat: Seat, player_id: PlayerId, name: impl Into<String>) -> EngineResult<()> {
        self.lobby.join(seat, player_id, name)
    }

    pub fn update_player_options(&mut self, player_id: PlayerId, options: PlayerOptions) -> EngineResult<()> {
        self.lobby.update_player_options(player_id, options)
    }

    pub fn update_slot_player_options(&mut self, seat: Seat, options: PlayerOptions) -> EngineResult<()> {
        self.lobby.update_slot_player_options(seat, options)
    }

    pub fn set_player_connected(&mut self, player_id: PlayerId, connected: bool, now: u64) -> EngineResult<()> {
        self.lobby.set_player_connected(player_id, connected, now)
    }

    pub fn evict_expired(&mut self, now: u64) {
        self.lobby.evict_expired(now);
    }

    /// Starts the game from the lobby's current slots (spec.md §4.6,
    /// `startGame`).
    #[instrument(skip(self))]
    pub fn start_game(&mut self, seed: u64) -> EngineResult<()> {
        let player_configs = self.lobby.start_game()?;
        self.game = Some(self.build_game(seed, player_configs)?);
        Ok(())
    }

    fn build_game(&self, seed: u64, player_configs: Vec<PlayerConfig>) -> EngineResult<Game> {
        let config = GameConfig {
            player_count: player_configs.len() as u32,
            player_names: player_configs.iter().map(|p| p.name.clone()).collect(),
            seed,
            player_configs,
            settings: self.lobby.settings().clone(),
        };
        let mut game = Game::new(
            self.definition.game_type(),
            config,
            self.definition.catalogue(),
            self.definition.flow_root(),
        )?;
        flow_engine::start(&mut game);
        Ok(game)
    }

    /// Restarts with a new seed and the same player configs (spec.md
    /// §4.6, `restart`).
    #[instrument(skip(self))]
    pub fn restart(&mut self, seed: u64) -> EngineResult<()> {
        let current = self.game.as_ref().ok_or(EngineError::GameNotFound)?;
        let player_configs: Vec<PlayerConfig> = current
            .players
            .all()
            .iter()
            .map(|p| PlayerConfig { seat: p.seat, name: p.name.clone(), color: p.color.clone(), is_ai: false })
            .collect();
        self.follow_ups.clear();
        self.game = Some(self.build_game(seed, player_configs)?);
        Ok(())
    }

    /// Actions available to `player` right now, accounting for a pending
    /// follow-up: when one is queued, only its target player may act, and
    /// only with its named action (spec.md §9, "the flow engine treats
    /// the queue as higher-priority than its natural cursor position").
    pub fn available_actions(&self, player: Seat) -> Vec<String> {
        let Some(game) = &self.game else { return Vec::new() };
        match self.follow_ups.front() {
            Some(follow_up) if follow_up.player == player => vec![follow_up.action_name.clone()],
            Some(_) => Vec::new(),
            None => executor::get_available_actions(game, player),
        }
    }

    /// Validates and performs one action (spec.md §4.2, §4.6). A queued
    /// follow-up gates everything: if one is pending, only its player and
    /// action name are accepted, bypassing the flow's normal `actionStep`
    /// pause; the normal executor path runs otherwise.
    #[instrument(skip(self, args))]
    pub fn perform_action(&mut self, player: Seat, action_name: &str, args: Args, now: u64) -> ActionResult {
        let Some(game) = self.game.as_mut() else {
            return ActionResult::Failure(EngineError::GameNotFound);
        };

        let result = if let Some(follow_up) = self.follow_ups.front().cloned() {
            if follow_up.player != player {
                return ActionResult::Failure(EngineError::NotYourTurn);
            }
            if follow_up.action_name != action_name {
                return ActionResult::Failure(EngineError::ActionUnavailable);
            }
            let mut merged = follow_up.args.clone();
            merged.extend(args);
            executor::perform_follow_up(game, action_name, player, merged, now)
        } else {
            executor::perform_action(game, action_name, player, args, now)
        };

        if result.is_success() {
            if self.follow_ups.front().is_some() {
                self.follow_ups.pop_front();
            }
            if let Some(next) = executor::take_follow_up(&result) {
                self.follow_ups.push_back(next);
            }
        }

        result
    }

    pub fn pending_follow_up(&self) -> Option<&FollowUp> {
        self.follow_ups.front()
    }

    pub fn acknowledge_animations(&mut self, seat: Seat, up_to: AnimationEventId) -> EngineResult<()> {
        let game = self.game.as_mut().ok_or(EngineError::GameNotFound)?;
        game.animations.acknowledge(seat, up_to);
        let connected: Vec<Seat> =
            self.lobby.slots().iter().filter(|s| s.connected).map(|s| s.seat).collect();
        game.animations.trim(&connected);
        Ok(())
    }

    /// Builds the full per-player [SessionView] (spec.md §4.8): the
    /// engine-level half from `rules::view`, plus the session-level
    /// `lobby_info`/`pending_follow_up` fields the engine has no notion
    /// of.
    pub fn get_state(&self, player: Option<Seat>) -> EngineResult<SessionView> {
        let game = self.game.as_ref().ok_or(EngineError::GameNotFound)?;
        let mut view = rules::view::build(game, player);
        if let Some(seat) = player {
            view.available_actions = self.available_actions(seat);
        }
        view.lobby_info = Some(self.lobby.info());
        view.pending_follow_up = self.follow_ups.front().cloned();
        Ok(view)
    }

    /// Read-only time travel to the state immediately after log index
    /// `index` (spec.md §4.4).
    pub fn get_state_at_action(&self, index: LogIndex, player: Option<Seat>) -> EngineResult<SessionView> {
        let game = self.game.as_ref().ok_or(EngineError::GameNotFound)?;
        let entries = game.log.entries().to_vec();
        let replayed = replay::at_index(
            self.definition.game_type(),
            game_config_for_replay(game),
            self.definition.catalogue(),
            self.definition.flow_root(),
            &entries,
            index,
        )?;
        Ok(rules::view::build(&replayed, player))
    }

    pub fn get_history(&self) -> EngineResult<Vec<CommandLogEntry>> {
        let game = self.game.as_ref().ok_or(EngineError::GameNotFound)?;
        Ok(game.log.entries().to_vec())
    }

    pub fn pending_animation_events(&self, seat: Seat) -> Vec<AnimationEvent> {
        self.game.as_ref().map(|g| g.animations.pending_for(seat)).unwrap_or_default()
    }

    /// Produces an adapter-facing snapshot (spec.md §6). The core never
    /// writes this anywhere itself; a host's [database::database::Database]
    /// implementation is responsible for durability.
    pub fn snapshot(&self) -> EngineResult<PersistedSnapshot> {
        let game = self.game.as_ref().ok_or(EngineError::GameNotFound)?;
        Ok(PersistedSnapshot {
            game_type: self.definition.game_type().to_string(),
            seed: game.rng_seed,
            player_configs: game
                .players
                .all()
                .iter()
                .map(|p| PlayerConfig { seat: p.seat, name: p.name.clone(), color: p.color.clone(), is_ai: false })
                .collect(),
            lobby_slots: Some(self.lobby.slots().to_vec()),
            lobby_state: self.lobby.state(),
            color_selection_enabled: self.lobby.settings().color_selection_enabled,
            colors: self.lobby.settings().colors.clone(),
            action_history: game.log.entries().to_vec(),
        })
    }

    /// Reconstructs a [Session] from a previously produced
    /// [PersistedSnapshot] (spec.md §6, "Replay reconstructs the Game from
    /// this alone").
    pub fn restore(definition: D, grace: Duration, snapshot: PersistedSnapshot) -> EngineResult<Self> {
        let seat_count = snapshot.player_configs.len() as u32;
        let settings = GameSettings {
            colors: snapshot.colors,
            color_selection_enabled: snapshot.color_selection_enabled,
            options: Default::default(),
        };
        let mut lobby = LobbyManager::new(seat_count, settings, grace);
        if let Some(slots) = snapshot.lobby_slots {
            for (slot, restored) in lobby.slots_mut().iter_mut().zip(slots) {
                *slot = restored;
            }
        }

        let config = GameConfig {
            player_count: seat_count,
            player_names: snapshot.player_configs.iter().map(|p| p.name.clone()).collect(),
            seed: snapshot.seed,
            player_configs: snapshot.player_configs,
            settings: lobby.settings().clone(),
        };
        let game = replay::reconstruct(
            definition.game_type().to_string(),
            config,
            definition.catalogue(),
            definition.flow_root(),
            &snapshot.action_history,
        )?;

        Ok(Self { definition, lobby, game: Some(game), follow_ups: VecDeque::new() })
    }
}

fn game_config_for_replay(game: &Game) -> GameConfig {
    GameConfig {
        player_count: game.players.len() as u32,
        player_names: game.players.all().iter().map(|p| p.name.clone()).collect(),
        seed: game.rng_seed,
        player_configs: game
            .players
            .all()
            .iter()
            .map(|p| PlayerConfig { seat: p.seat, name: p.name.clone(), color: p.color.clone(), is_ai: false })
            .collect(),
        settings: game.settings.clone(),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use data::selection::{ChoiceSelection, ChoiceSource, Selection, SelectionCommon};
    use data::value::Value;

    use super::*;

    struct TestGame;

    impl GameDefinition for TestGame {
        fn game_type(&self) -> &str {
            "test"
        }

        fn catalogue(&self) -> ActionCatalogue {
            let selection = Selection::Choice(ChoiceSelection {
                common: SelectionCommon {
                    name: "amount".to_string(),
                    prompt: "Pick".to_string(),
                    optional: false,
                    skip_text: None,
                },
                choices: ChoiceSource::Static(vec![Value::from(1), Value::from(2)]),
                disabled: None,
            });
            ActionCatalogue::new(vec![data::action::ActionDefinition {
                name: "pick".to_string(),
                selections: vec![selection],
                conditions: Vec::new(),
                execute: Arc::new(|ctx| {
                    if ctx.player == Seat(1) {
                        Ok(Some(FollowUp {
                            player: Seat(2),
                            action_name: "pick".to_string(),
                            args: Args::new(),
                        }))
                    } else {
                        Ok(None)
                    }
                }),
            }])
        }

        fn flow_root(&self) -> FlowNode {
            FlowNode::Loop {
                label: "rounds".to_string(),
                while_condition: Arc::new(|_| true),
                max_iterations: 5,
                body: Box::new(FlowNode::ActionStep {
                    label: "step".to_string(),
                    actions: vec!["pick".to_string()],
                    skip_if: None,
                }),
            }
        }
    }

    fn started_session() -> Session<TestGame> {
        let mut session = Session::new(TestGame, 2, GameSettings::default(), Duration::from_secs(30));
        session.join(Seat(1), PlayerId(1), "Alice").unwrap();
        session.join(Seat(2), PlayerId(2), "Bob").unwrap();
        session.start_game(7).unwrap();
        session
    }

    #[test]
    fn follow_up_gates_the_next_action_to_its_target_player() {
        let mut session = started_session();
        let mut args = Args::new();
        args.insert("amount".to_string(), Value::from(1));
        let result = session.perform_action(Seat(1), "pick", args, 0);
        assert!(result.is_success());

        assert!(session.available_actions(Seat(1)).is_empty());
        assert_eq!(session.available_actions(Seat(2)), vec!["pick".to_string()]);

        let mut bob_args = Args::new();
        bob_args.insert("amount".to_string(), Value::from(2));
        let result = session.perform_action(Seat(2), "pick", bob_args, 0);
        assert!(result.is_success());
        assert!(session.pending_follow_up().is_none());
    }

    #[test]
    fn get_state_available_actions_matches_follow_up_gating() {
        let mut session = started_session();
        let mut args = Args::new();
        args.insert("amount".to_string(), Value::from(1));
        let result = session.perform_action(Seat(1), "pick", args, 0);
        assert!(result.is_success());

        // A follow-up targeting Bob is now pending: Alice's view must not
        // advertise actions she would be rejected for with `NotYourTurn`.
        let alice_view = session.get_state(Some(Seat(1))).unwrap();
        assert!(alice_view.available_actions.is_empty());
        assert!(alice_view.pending_follow_up.is_some());

        let bob_view = session.get_state(Some(Seat(2))).unwrap();
        assert_eq!(bob_view.available_actions, vec!["pick".to_string()]);
    }

    #[test]
    fn snapshot_then_restore_reproduces_history() {
        let mut session = started_session();
        let mut args = Args::new();
        args.insert("amount".to_string(), Value::from(1));
        session.perform_action(Seat(1), "pick", args.clone(), 0);
        session.perform_action(Seat(2), "pick", Args::new(), 0);

        let snapshot = session.snapshot().unwrap();
        let restored = Session::restore(TestGame, Duration::from_secs(30), snapshot).unwrap();
        assert_eq!(restored.get_history().unwrap().len(), session.get_history().unwrap().len());
    }
}
