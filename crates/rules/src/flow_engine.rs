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

//! Interprets the flow-control tree (spec.md §4.3): advances the cursor
//! after each successful action, entering loops, each-player iterations,
//! and action steps, until the flow pauses at the next `actionStep` or the
//! root subtree is exhausted.
//!
//! `parallel` branches run one at a time, in declaration order, rather than
//! truly concurrently: a single cursor path cannot represent more than one
//! simultaneously-paused branch, and spec.md only requires branch ordering
//! to be deterministic, not interleaved. See DESIGN.md.

use data::flow::{FlowFrame, FlowNode};
use data::game::Game;

/// Enters the flow for the first time, pausing at the first reachable
/// `actionStep`. Call once after constructing a [Game].
pub fn start(game: &mut Game) {
    advance(game);
}

/// Advances the cursor after the action step at the current position has
/// just been resolved (or, on the very first call, enters the flow fresh).
#[tracing::instrument(skip(game))]
pub fn advance(game: &mut Game) {
    let root = game.flow_root.clone();
    let mut frames = std::mem::take(&mut game.flow_position.path);
    let entering = !game.flow_position.started;

    let paused_actions = advance_node(&root, &mut frames, 0, game, entering);

    game.flow_position.started = true;
    game.flow_position.path = frames;
    match paused_actions {
        Some(actions) => {
            game.flow_position.current_actions = actions;
            game.flow_position.finished = false;
        }
        None => {
            game.flow_position.current_actions = Vec::new();
            game.flow_position.finished = true;
            game.players.set_current(None);
        }
    }
}

/// Returns `Some(actions)` if the subtree paused at a reachable
/// `actionStep`, `None` if the subtree completed entirely.
///
/// `entering`: `true` means descend into `node` fresh, ignoring any stale
/// frame at `depth`. `false` means the child previously recorded at
/// `frames[depth]` just had one of its own descendants complete and should
/// be resumed in place before this level considers moving on.
fn advance_node(
    node: &FlowNode,
    frames: &mut Vec<FlowFrame>,
    depth: usize,
    game: &mut Game,
    entering: bool,
) -> Option<Vec<String>> {
    match node {
        FlowNode::Sequence(children) => {
            let mut index = if entering {
                frames.truncate(depth);
                0
            } else {
                let current = match frames.get(depth) {
                    Some(FlowFrame::Sequence { index }) => *index,
                    _ => unreachable!("sequence frame mismatch at depth {depth}"),
                };
                if let Some(actions) = advance_node(&children[current], frames, depth + 1, game, false) {
                    return Some(actions);
                }
                frames.truncate(depth);
                current + 1
            };

            while index < children.len() {
                frames.push(FlowFrame::Sequence { index });
                if let Some(actions) = advance_node(&children[index], frames, depth + 1, game, true) {
                    return Some(actions);
                }
                frames.truncate(depth);
                index += 1;
            }
            None
        }

        FlowNode::Parallel { branches, .. } => {
            // See module docs: branches run sequentially, not concurrently.
            let mut branch = if entering {
                frames.truncate(depth);
                0
            } else {
                let current = match frames.get(depth) {
                    Some(FlowFrame::Parallel { branch }) => *branch,
                    _ => unreachable!("parallel frame mismatch at depth {depth}"),
                };
                if let Some(actions) = advance_node(&branches[current], frames, depth + 1, game, false) {
                    return Some(actions);
                }
                frames.truncate(depth);
                current + 1
            };

            while branch < branches.len() {
                frames.push(FlowFrame::Parallel { branch });
                if let Some(actions) = advance_node(&branches[branch], frames, depth + 1, game, true) {
                    return Some(actions);
                }
                frames.truncate(depth);
                branch += 1;
            }
            None
        }

        FlowNode::Loop { label, while_condition, max_iterations, body } => {
            let mut iteration = if entering {
                frames.truncate(depth);
                0
            } else {
                let current = match frames.get(depth) {
                    Some(FlowFrame::Loop { iteration }) => *iteration,
                    _ => unreachable!("loop frame mismatch at depth {depth}"),
                };
                if let Some(actions) = advance_node(body, frames, depth + 1, game, false) {
                    return Some(actions);
                }
                frames.truncate(depth);
                current + 1
            };

            loop {
                if iteration >= *max_iterations {
                    // A safety valve, not a feature: exceeding it means the
                    // author's `while` never went false.
                    tracing::warn!(loop_label = %label, max_iterations = *max_iterations, "loop exceeded maxIterations, forcing exit");
                    return None;
                }
                if !while_condition(game) {
                    return None;
                }
                frames.push(FlowFrame::Loop { iteration });
                if let Some(actions) = advance_node(body, frames, depth + 1, game, true) {
                    return Some(actions);
                }
                frames.truncate(depth);
                iteration += 1;
            }
        }

        FlowNode::EachPlayer { filter, body, .. } => {
            let (members, mut index) = if entering {
                frames.truncate(depth);
                let members = game
                    .players
                    .all()
                    .iter()
                    .map(|p| p.seat)
                    .filter(|&seat| filter.as_ref().map(|f| f(game, seat)).unwrap_or(true))
                    .collect::<Vec<_>>();
                (members, 0)
            } else {
                let (members, current) = match frames.get(depth) {
                    Some(FlowFrame::EachPlayer { members, index }) => (members.clone(), *index),
                    _ => unreachable!("each-player frame mismatch at depth {depth}"),
                };
                if let Some(actions) = advance_node(body, frames, depth + 1, game, false) {
                    return Some(actions);
                }
                frames.truncate(depth);
                (members, current + 1)
            };

            while index < members.len() {
                game.players.set_current(Some(members[index]));
                frames.push(FlowFrame::EachPlayer { members: members.clone(), index });
                if let Some(actions) = advance_node(body, frames, depth + 1, game, true) {
                    return Some(actions);
                }
                frames.truncate(depth);
                index += 1;
            }
            None
        }

        FlowNode::ActionStep { actions, skip_if, .. } => {
            if !entering {
                // The action that was paused here has just completed.
                return None;
            }
            if let Some(skip) = skip_if {
                if skip(game) {
                    return None;
                }
            }
            Some(actions.clone())
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use data::flow::FlowNode;
    use data::game::{ActionCatalogue, Game, GameConfig, GameSettings};
    use data::lobby::PlayerConfig;
    use primitives::Seat;

    use super::*;

    fn two_player_game(root: FlowNode) -> Game {
        let config = GameConfig {
            player_count: 2,
            player_names: vec!["Alice".to_string(), "Bob".to_string()],
            seed: 7,
            player_configs: vec![
                PlayerConfig { seat: Seat(1), name: "Alice".to_string(), color: None, is_ai: false },
                PlayerConfig { seat: Seat(2), name: "Bob".to_string(), color: None, is_ai: false },
            ],
            settings: GameSettings::default(),
        };
        Game::new("test", config, ActionCatalogue::default(), root).unwrap()
    }

    fn action_step(actions: &[&str]) -> FlowNode {
        FlowNode::ActionStep {
            label: "step".to_string(),
            actions: actions.iter().map(|s| s.to_string()).collect(),
            skip_if: None,
        }
    }

    #[test]
    fn sequence_pauses_at_each_action_step_in_order() {
        let root = FlowNode::Sequence(vec![action_step(&["draw"]), action_step(&["play"])]);
        let mut game = two_player_game(root);
        start(&mut game);
        assert_eq!(game.flow_position.current_actions, vec!["draw".to_string()]);

        advance(&mut game);
        assert_eq!(game.flow_position.current_actions, vec!["play".to_string()]);

        advance(&mut game);
        assert!(game.flow_position.finished);
    }

    #[test]
    fn each_player_iterates_captured_membership() {
        let root = FlowNode::EachPlayer {
            label: "round".to_string(),
            filter: None,
            body: Box::new(action_step(&["pass"])),
        };
        let mut game = two_player_game(root);
        start(&mut game);
        assert_eq!(game.players.current(), Some(Seat(1)));

        advance(&mut game);
        assert_eq!(game.players.current(), Some(Seat(2)));

        advance(&mut game);
        assert!(game.flow_position.finished);
    }

    #[test]
    fn loop_respects_max_iterations_as_safety_valve() {
        let root = FlowNode::Loop {
            label: "forever".to_string(),
            while_condition: Arc::new(|_| true),
            max_iterations: 2,
            body: Box::new(action_step(&["tick"])),
        };
        let mut game = two_player_game(root);
        start(&mut game);
        advance(&mut game);
        assert!(!game.flow_position.finished);
        advance(&mut game);
        assert!(game.flow_position.finished);
    }

    #[test]
    fn skip_if_bypasses_action_step() {
        let root = FlowNode::Sequence(vec![
            FlowNode::ActionStep {
                label: "maybe".to_string(),
                actions: vec!["draw".to_string()],
                skip_if: Some(Arc::new(|_| true)),
            },
            action_step(&["play"]),
        ]);
        let mut game = two_player_game(root);
        start(&mut game);
        assert_eq!(game.flow_position.current_actions, vec!["play".to_string()]);
    }
}
