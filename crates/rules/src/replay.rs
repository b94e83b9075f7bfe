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

//! Deterministic replay and time travel (spec.md §4.4): reconstructing a
//! [Game] from its initial configuration plus a command log, either to
//! restore a persisted session or to produce a read-only view "at" an
//! earlier point in history.
//!
//! Replayed entries skip selection/condition re-validation — the entries
//! in the log already passed that gate once, when they were first
//! performed — and instead trust `player`/`action_name`/`args` directly.
//! Only `execute` runs again, so the same RNG draws happen in the same
//! order and the tree ends up in the same shape (spec.md I6).

use data::action::ActionContext;
use data::flow::FlowNode;
use data::game::{ActionCatalogue, Game, GameConfig};
use data::log::CommandLogEntry;
use primitives::AnimationEventId;
use utils::outcome::{EngineError, Value as EngineResult};

use crate::flow_engine;

/// Reconstructs a [Game] from its original configuration and replays every
/// entry in `entries` in order. `catalogue` and `flow_root` are supplied
/// fresh by the caller (a game type's author-declared rules, not
/// themselves persisted — spec.md §6, "Replay reconstructs the Game from
/// this alone" refers to the *data*, with the game type's code providing
/// the rest).
pub fn reconstruct(
    game_type: impl Into<String>,
    config: GameConfig,
    catalogue: ActionCatalogue,
    flow_root: FlowNode,
    entries: &[CommandLogEntry],
) -> EngineResult<Game> {
    let mut game = Game::new(game_type, config, catalogue, flow_root)?;
    flow_engine::start(&mut game);
    for entry in entries {
        replay_entry(&mut game, entry)?;
    }
    Ok(game)
}

/// Re-applies one already-validated log entry to `game`, trusting its
/// `player`/`action_name`/`args` rather than re-running `getChoices`/
/// `condition`. Any author-code failure (`execute` returning `Err`) is
/// still reported: a log entry that replays into a thrown error is an
/// engine bug, not a recoverable input error.
fn replay_entry(game: &mut Game, entry: &CommandLogEntry) -> EngineResult<()> {
    let action = game
        .catalogue
        .get(&entry.action_name)
        .cloned()
        .ok_or_else(|| EngineError::InternalError(format!("replay: unknown action `{}`", entry.action_name)))?;

    let animations_before = game.animations.peek_next_id();
    let outcome = {
        let mut context = ActionContext { game, player: entry.player, args: &entry.args };
        (action.execute)(&mut context)
    };
    outcome.map_err(EngineError::ExecuteThrew)?;
    let animations_after = game.animations.peek_next_id();

    flow_engine::advance(game);

    let index = game.log.next_index();
    game.log.append(CommandLogEntry {
        index,
        player: entry.player,
        action_name: entry.action_name.clone(),
        args: entry.args.clone(),
        timestamp: entry.timestamp,
        resulting_flow_position: game.flow_position.clone(),
        emitted_animation_events: (animations_before..animations_after).map(AnimationEventId).collect(),
    });

    debug_assert_eq!(
        game.flow_position, entry.resulting_flow_position,
        "replay diverged from the original run at log index {}",
        entry.index.0
    );

    Ok(())
}

/// Reconstructs the game from the seed and replays only entries with index
/// `< index`, for a read-only "time travel" view (spec.md §4.4). This does
/// not touch the live game; callers build a [crate::view] from the result.
pub fn at_index(
    game_type: impl Into<String>,
    config: GameConfig,
    catalogue: ActionCatalogue,
    flow_root: FlowNode,
    entries: &[CommandLogEntry],
    index: primitives::LogIndex,
) -> EngineResult<Game> {
    let end = entries.iter().position(|e| e.index.0 >= index.0).unwrap_or(entries.len());
    reconstruct(game_type, config, catalogue, flow_root, &entries[..end])
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use data::game::GameSettings;
    use data::lobby::PlayerConfig;
    use data::selection::{ChoiceSelection, ChoiceSource, Selection, SelectionCommon};
    use data::value::{Args, Value};
    use primitives::Seat;

    use super::*;
    use crate::executor;

    fn counting_game() -> (Game, ActionCatalogue, FlowNode, GameConfig) {
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
        let action = data::action::ActionDefinition {
            name: "add".to_string(),
            selections: vec![selection],
            conditions: Vec::new(),
            execute: Arc::new(|ctx| {
                let amount = ctx.args.get("amount").and_then(Value::as_i64).unwrap_or(0);
                let total = ctx.game.tree.expect(ctx.game.tree.root()).attr("total").and_then(Value::as_i64).unwrap_or(0);
                ctx.game.tree.expect_mut(ctx.game.tree.root()).set_attr("total", Value::from(total + amount));
                Ok(None)
            }),
        };
        let root = FlowNode::Loop {
            label: "rounds".to_string(),
            while_condition: Arc::new(|game| {
                game.tree.expect(game.tree.root()).attr("total").and_then(Value::as_i64).unwrap_or(0) < 3
            }),
            max_iterations: 10,
            body: Box::new(FlowNode::ActionStep {
                label: "step".to_string(),
                actions: vec!["add".to_string()],
                skip_if: None,
            }),
        };
        let catalogue = ActionCatalogue::new(vec![action]);
        let config = GameConfig {
            player_count: 1,
            player_names: vec!["Alice".to_string()],
            seed: 99,
            player_configs: vec![PlayerConfig { seat: Seat(1), name: "Alice".to_string(), color: None, is_ai: false }],
            settings: GameSettings::default(),
        };
        let mut game = Game::new("counter", config.clone(), catalogue.clone(), root.clone()).unwrap();
        crate::flow_engine::start(&mut game);
        (game, catalogue, root, config)
    }

    #[test]
    fn replay_reproduces_identical_state() {
        let (mut game, catalogue, root, config) = counting_game();

        let mut args = Args::new();
        args.insert("amount".to_string(), Value::from(2));
        executor::perform_action(&mut game, "add", Seat(1), args.clone(), 0);
        executor::perform_action(&mut game, "add", Seat(1), args, 0);

        let entries = game.log.entries().to_vec();
        let replayed = reconstruct("counter", config, catalogue, root, &entries).unwrap();

        assert_eq!(replayed.log.len(), game.log.len());
        assert_eq!(
            replayed.tree.expect(replayed.tree.root()).attr("total"),
            game.tree.expect(game.tree.root()).attr("total")
        );
        assert_eq!(replayed.flow_position, game.flow_position);
    }

    #[test]
    fn at_index_returns_partial_state() {
        let (mut game, catalogue, root, config) = counting_game();
        let mut args = Args::new();
        args.insert("amount".to_string(), Value::from(2));
        executor::perform_action(&mut game, "add", Seat(1), args.clone(), 0);
        executor::perform_action(&mut game, "add", Seat(1), args, 0);

        let entries = game.log.entries().to_vec();
        let at_one = at_index("counter", config, catalogue, root, &entries, primitives::LogIndex(1)).unwrap();

        assert_eq!(at_one.log.len(), 1);
        assert_eq!(at_one.tree.expect(at_one.tree.root()).attr("total"), Some(&Value::from(2)));
    }
}
