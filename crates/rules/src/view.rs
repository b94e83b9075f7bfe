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

//! Builds the engine-level half of a per-player [SessionView] (spec.md
//! §4.8): the redacted tree, current player, available actions, flow
//! state, and pending animation events. The session layer (`game` crate)
//! adds the lobby-specific fields (`lobby_info`, `pending_follow_up`) on
//! top of what this module produces, since those are session concepts the
//! engine itself has no notion of.

use data::game::Game;
use data::view::{project, SessionView};
use primitives::Seat;

use crate::executor;

/// Projects `game` for `viewer` (`None` for a spectator). `available_actions`
/// is recomputed from scratch every call, never cached across mutations
/// (spec.md §4.8).
pub fn build(game: &Game, viewer: Option<Seat>) -> SessionView {
    let available_actions = match viewer {
        Some(seat) => executor::get_available_actions(game, seat),
        None => Vec::new(),
    };
    let pending_animation_events = match viewer {
        Some(seat) => game.animations.pending_for(seat),
        None => Vec::new(),
    };

    SessionView {
        element_tree: project(&game.tree, game.tree.root(), viewer),
        current_player: game.players.current(),
        available_actions,
        flow_state: game.flow_position.clone(),
        pending_animation_events,
        lobby_info: None,
        pending_follow_up: None,
    }
}

#[cfg(test)]
mod tests {
    use data::flow::FlowNode;
    use data::game::{ActionCatalogue, GameConfig, GameSettings};
    use data::lobby::PlayerConfig;

    use super::*;
    use crate::flow_engine;

    #[test]
    fn available_actions_empty_for_non_current_player() {
        let config = GameConfig {
            player_count: 2,
            player_names: vec!["Alice".to_string(), "Bob".to_string()],
            seed: 1,
            player_configs: vec![
                PlayerConfig { seat: Seat(1), name: "Alice".to_string(), color: None, is_ai: false },
                PlayerConfig { seat: Seat(2), name: "Bob".to_string(), color: None, is_ai: false },
            ],
            settings: GameSettings::default(),
        };
        let root = FlowNode::ActionStep {
            label: "main".to_string(),
            actions: vec!["pass".to_string()],
            skip_if: None,
        };
        let mut game = Game::new("test", config, ActionCatalogue::default(), root).unwrap();
        flow_engine::start(&mut game);

        let view = build(&game, Some(Seat(2)));
        assert!(view.available_actions.is_empty());
        assert_eq!(view.current_player, Some(Seat(1)));
    }
}
