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

//! [Game]: the root of the element tree and owner of every other piece of
//! per-game state (spec.md §3, "Game").

use std::collections::BTreeMap;
use std::sync::Arc;

use primitives::Seat;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256StarStar;
use serde::{Deserialize, Serialize};
use utils::outcome::{EngineError, Value as EngineResult};

use crate::action::ActionDefinition;
use crate::animation::AnimationBuffer;
use crate::element::ElementTree;
use crate::flow::{FlowNode, FlowPosition};
use crate::log::CommandLog;
use crate::lobby::PlayerConfig;
use crate::player::{Player, Players};
use crate::value::Value;

/// Used when a game's settings leave `colors` unset.
pub const DEFAULT_COLOR_PALETTE: &[&str] =
    &["#e53e3e", "#3182ce", "#38a169", "#d69e2e", "#805ad5", "#dd6b20", "#319795", "#d53f8c"];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameSettings {
    pub colors: Vec<String>,
    pub color_selection_enabled: bool,
    pub options: BTreeMap<String, Value>,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            colors: DEFAULT_COLOR_PALETTE.iter().map(|s| s.to_string()).collect(),
            color_selection_enabled: true,
            options: BTreeMap::new(),
        }
    }
}

/// Construction parameters for a new [Game] (spec.md §3, "constructed
/// from `{ playerCount, playerNames, seed, playerConfigs, options }`").
#[derive(Debug, Clone)]
pub struct GameConfig {
    pub player_count: u32,
    pub player_names: Vec<String>,
    pub seed: u64,
    pub player_configs: Vec<PlayerConfig>,
    pub settings: GameSettings,
}

/// The catalogue of actions a game type registers. Keyed by action name;
/// order is insertion order where it matters (e.g. `getAvailableActions`
/// iterating to build a stable list).
#[derive(Clone, Default)]
pub struct ActionCatalogue {
    actions: Vec<ActionDefinition>,
}

impl ActionCatalogue {
    pub fn new(actions: Vec<ActionDefinition>) -> Self {
        Self { actions }
    }

    pub fn get(&self, name: &str) -> Option<&ActionDefinition> {
        self.actions.iter().find(|a| a.name == name)
    }

    pub fn all(&self) -> &[ActionDefinition] {
        &self.actions
    }
}

/// For each seat (1-indexed), the color that wins: the explicit
/// `playerConfigs[seat-1].color` if set, otherwise the next unused entry
/// from `settings.colors` (spec.md §4.1, `applyPlayerColors`). Fails fast
/// on an explicit collision.
pub fn apply_player_colors(
    player_configs: &[PlayerConfig],
    settings: &GameSettings,
) -> EngineResult<Vec<Option<String>>> {
    let mut assigned = Vec::with_capacity(player_configs.len());
    let mut taken: Vec<String> = Vec::new();

    for config in player_configs {
        if let Some(color) = &config.color {
            if taken.contains(color) {
                return Err(EngineError::ColorAlreadyTaken(color.clone()));
            }
            taken.push(color.clone());
        }
    }

    let mut palette = settings.colors.iter();
    for config in player_configs {
        let color = if let Some(color) = &config.color {
            Some(color.clone())
        } else {
            let next = palette.by_ref().find(|candidate| !taken.contains(candidate));
            if let Some(color) = &next {
                taken.push(color.clone());
            }
            next.cloned()
        };
        assigned.push(color);
    }

    Ok(assigned)
}

/// Root of the element tree and owner of every other piece of per-game
/// state: the player collection, the action catalogue, the flow root, the
/// command log, the animation-event buffer, a deterministic random source,
/// and game-wide settings (spec.md §3, "Game").
#[derive(Clone)]
pub struct Game {
    pub game_type: String,
    pub tree: ElementTree,
    pub players: Players,
    pub flow_root: Arc<FlowNode>,
    pub flow_position: FlowPosition,
    pub log: CommandLog,
    pub animations: AnimationBuffer,
    pub rng_seed: u64,
    pub rng: Xoshiro256StarStar,
    pub settings: GameSettings,
    pub catalogue: Arc<ActionCatalogue>,
}

impl Game {
    pub fn new(
        game_type: impl Into<String>,
        config: GameConfig,
        catalogue: ActionCatalogue,
        flow_root: FlowNode,
    ) -> EngineResult<Self> {
        let game_type = game_type.into();
        let mut tree = ElementTree::new(game_type.clone());
        let root = tree.root();

        let colors = apply_player_colors(&config.player_configs, &config.settings)?;

        let mut seats = Vec::with_capacity(config.player_count as usize);
        for index in 0..config.player_count {
            let seat = Seat(index + 1);
            let name = config
                .player_names
                .get(index as usize)
                .cloned()
                .unwrap_or_else(|| format!("Player {}", index + 1));
            let element = tree.create(root, name.clone(), "Player");
            tree.expect_mut(element).player = Some(seat);
            let mut player = Player::new(seat, name, element);
            player.color = colors.get(index as usize).cloned().flatten();
            seats.push(player);
        }

        Ok(Self {
            game_type,
            tree,
            players: Players::new(seats),
            flow_root: Arc::new(flow_root),
            flow_position: FlowPosition::root(),
            log: CommandLog::new(),
            animations: AnimationBuffer::new(),
            rng_seed: config.seed,
            rng: Xoshiro256StarStar::seed_from_u64(config.seed),
            settings: config.settings,
            catalogue: Arc::new(catalogue),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(player_count: u32) -> GameConfig {
        GameConfig {
            player_count,
            player_names: (1..=player_count).map(|i| format!("P{i}")).collect(),
            seed: 42,
            player_configs: (1..=player_count)
                .map(|i| PlayerConfig { seat: Seat(i), name: format!("P{i}"), color: None, is_ai: false })
                .collect(),
            settings: GameSettings::default(),
        }
    }

    #[test]
    fn new_game_assigns_distinct_default_colors() {
        let game = Game::new(
            "trestle",
            config(3),
            ActionCatalogue::default(),
            FlowNode::Sequence(Vec::new()),
        )
        .unwrap();
        let colors: Vec<_> = game.players.all().iter().map(|p| p.color.clone()).collect();
        assert_eq!(colors.len(), 3);
        assert!(colors.iter().all(Option::is_some));
        let unique: std::collections::HashSet<_> = colors.iter().collect();
        assert_eq!(unique.len(), 3);
    }

    #[test]
    fn explicit_color_collision_fails_fast() {
        let mut cfg = config(2);
        cfg.player_configs[0].color = Some("#e53e3e".to_string());
        cfg.player_configs[1].color = Some("#e53e3e".to_string());
        let result = Game::new("trestle", cfg, ActionCatalogue::default(), FlowNode::Sequence(Vec::new()));
        assert!(result.is_err());
    }

    #[test]
    fn same_seed_produces_identical_rng_stream() {
        let a = Game::new("trestle", config(2), ActionCatalogue::default(), FlowNode::Sequence(Vec::new())).unwrap();
        let b = Game::new("trestle", config(2), ActionCatalogue::default(), FlowNode::Sequence(Vec::new())).unwrap();
        assert_eq!(a.rng, b.rng);
    }
}
