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

//! Property tests backing spec.md §8's universal invariants (P1-P7),
//! run against randomized `trestle` playthroughs and small synthetic
//! fixtures rather than one fixed scenario.

use std::collections::BTreeSet;

use data::animation::AnimationBuffer;
use data::element::ElementTree;
use data::game::{apply_player_colors, GameConfig, GameSettings};
use data::lobby::PlayerConfig;
use data::value::{element_ref, Args};
use data::view::project;
use data::visibility::Visibility;
use primitives::{AnimationEventId, Seat};
use proptest::collection::vec as prop_vec;
use proptest::prelude::*;
use rules::executor;
use testing::trestle::{self, cards_per_hand};

fn config(player_count: u32, seed: u64) -> GameConfig {
    GameConfig {
        player_count,
        player_names: (1..=player_count).map(|i| format!("Player {i}")).collect(),
        seed,
        player_configs: (1..=player_count)
            .map(|i| PlayerConfig { seat: Seat(i), name: format!("Player {i}"), color: None, is_ai: false })
            .collect(),
        settings: GameSettings::default(),
    }
}

/// Plays one legal card for `player`, panicking if none is offered (the
/// player's own led suit is always legal, so this should never happen
/// mid-game). Returns the card chosen, for callers that replay the same
/// choice against a second game instance.
fn play_one_legal_card(game: &mut data::game::Game, player: Seat) -> data::value::Value {
    let action = game.catalogue.get("play_card").expect("play_card is registered");
    let selection = &action.selections[0];
    let choices = executor::get_choices(selection, game, player, &Args::new());
    let card = choices.into_iter().find(|c| c.disabled.is_none()).expect("at least one legal card").value;
    let mut args = Args::new();
    args.insert("card".to_string(), card.clone());
    let result = executor::perform_action(game, "play_card", player, args, 0);
    assert!(result.is_success());
    card
}

proptest! {
    /// P1 (Determinism): two games built from the same config (same seed)
    /// and driven through identical choices reach identical flow positions
    /// and command logs.
    #[test]
    fn same_seed_and_choices_produce_identical_games(player_count in 2u32..=4, seed in any::<u64>(), steps in 0usize..30) {
        let mut a = trestle::new_game(config(player_count, seed)).unwrap();
        let mut b = trestle::new_game(config(player_count, seed)).unwrap();
        rules::flow_engine::start(&mut a);
        rules::flow_engine::start(&mut b);
        executor::perform_action(&mut a, "deal", Seat(1), Args::new(), 0);
        executor::perform_action(&mut b, "deal", Seat(1), Args::new(), 0);

        for _ in 0..steps {
            if a.flow_position.finished {
                break;
            }
            let Some(player) = a.players.current() else { break };
            if !a.flow_position.current_actions.iter().any(|name| name == "play_card") {
                break;
            }
            let card = play_one_legal_card(&mut a, player);
            let mut args = Args::new();
            args.insert("card".to_string(), card);
            let result = executor::perform_action(&mut b, "play_card", player, args, 0);
            prop_assert!(result.is_success());
        }

        prop_assert_eq!(a.flow_position, b.flow_position);
        prop_assert_eq!(a.log.entries().len(), b.log.entries().len());
        for (entry_a, entry_b) in a.log.entries().iter().zip(b.log.entries().iter()) {
            prop_assert_eq!(&entry_a.args, &entry_b.args);
            prop_assert_eq!(entry_a.player, entry_b.player);
        }
    }

    /// P2 (No silent disabling): every disabled annotated choice carries a
    /// non-empty reason string, across randomized deals and acting seats.
    #[test]
    fn disabled_choices_always_carry_a_reason(player_count in 2u32..=4, seed in any::<u64>()) {
        let mut game = trestle::new_game(config(player_count, seed)).unwrap();
        rules::flow_engine::start(&mut game);
        executor::perform_action(&mut game, "deal", Seat(1), Args::new(), 0);

        let action = game.catalogue.get("play_card").unwrap().clone();
        let selection = &action.selections[0];
        for seat_index in 1..=player_count {
            let seat = Seat(seat_index);
            let choices = executor::get_choices(selection, &game, seat, &Args::new());
            for choice in choices {
                if let Some(reason) = choice.disabled {
                    prop_assert!(!reason.is_empty());
                }
            }
        }
    }

    /// P3 (Offered implies performable): every action name returned by
    /// `get_available_actions` can actually be performed by the current
    /// player right now.
    #[test]
    fn every_available_action_is_actually_performable(player_count in 2u32..=4, seed in any::<u64>()) {
        let mut game = trestle::new_game(config(player_count, seed)).unwrap();
        rules::flow_engine::start(&mut game);

        for _ in 0..10 {
            if game.flow_position.finished {
                break;
            }
            let Some(player) = game.players.current() else { break };
            let available = executor::get_available_actions(&game, player);
            prop_assert!(!available.is_empty(), "a non-finished flow position always offers something");

            let name = &available[0];
            let result = if name == "deal" {
                executor::perform_action(&mut game, name, player, Args::new(), 0)
            } else {
                let card = play_one_legal_card(&mut game, player);
                let mut args = Args::new();
                args.insert("card".to_string(), card);
                executor::perform_action(&mut game, name, player, args, 0)
            };
            prop_assert!(result.is_success());
        }
    }

    /// P4 (Color uniqueness): assigning default colors to any player count
    /// within the default palette's size never collides.
    #[test]
    fn default_color_assignment_is_always_distinct(player_count in 1u32..=8) {
        let configs: Vec<PlayerConfig> = (1..=player_count)
            .map(|i| PlayerConfig { seat: Seat(i), name: format!("P{i}"), color: None, is_ai: false })
            .collect();
        let colors = apply_player_colors(&configs, &GameSettings::default()).unwrap();
        prop_assert_eq!(colors.len(), player_count as usize);
        prop_assert!(colors.iter().all(Option::is_some));
        let unique: BTreeSet<_> = colors.iter().flatten().collect();
        prop_assert_eq!(unique.len(), player_count as usize);
    }

    /// P5 (Acknowledgement monotonicity): a seat's watermark never regresses
    /// across an arbitrary, possibly out-of-order, sequence of acknowledged
    /// ids; no event at or below the highest id ever acknowledged is ever
    /// pending again.
    #[test]
    fn acknowledgement_watermark_never_regresses(ids in prop_vec(0u64..50, 1..20)) {
        let mut buffer = AnimationBuffer::new();
        for _ in 0..50 {
            buffer.emit("event", data::value::Value::Null, None, 0);
        }

        let mut highest_acked = 0u64;
        for id in ids {
            buffer.acknowledge(Seat(1), AnimationEventId(id));
            highest_acked = highest_acked.max(id);
            let pending = buffer.pending_for(Seat(1));
            prop_assert!(pending.iter().all(|event| event.id.0 > highest_acked));
        }
    }

    /// P6 (Visibility redaction): a projected view never exposes the
    /// children of an element whose visibility policy excludes the viewer,
    /// across randomly constructed single-level trees.
    #[test]
    fn hidden_elements_never_leak_children_to_excluded_viewers(
        owner_seat in 1u32..=4,
        viewer_seat in 1u32..=4,
        policy_kind in 0u8..4,
        child_count in 0usize..5,
    ) {
        let mut tree = ElementTree::new("Game");
        let root = tree.root();
        let container = tree.create(root, "container", "Space");
        let owner = Seat(owner_seat);
        let viewer = Seat(viewer_seat);

        let policy = match policy_kind {
            0 => Visibility::Public,
            1 => Visibility::ContentsHidden,
            2 => Visibility::ContentsVisibleToOwner,
            _ => Visibility::ContentsVisibleTo(BTreeSet::from([owner])),
        };
        let expect_visible = policy.visible_to(Some(owner), Some(viewer));

        let element = tree.expect_mut(container);
        element.visibility = policy;
        element.player = Some(owner);
        for i in 0..child_count {
            tree.create(container, format!("child-{i}"), "Piece");
        }

        let view = project(&tree, container, Some(viewer));
        prop_assert_eq!(view.children.is_some(), expect_visible);
        if !expect_visible {
            prop_assert_eq!(view.child_count, Some(child_count));
        }
    }

    /// P7 (Flow completion): driving a game to completion by always
    /// playing a legal card terminates within a bounded number of actions,
    /// for any player count, rather than stalling mid-flow.
    #[test]
    fn a_full_game_always_reaches_a_finished_flow_position(player_count in 2u32..=4, seed in any::<u64>()) {
        let mut game = trestle::new_game(config(player_count, seed)).unwrap();
        rules::flow_engine::start(&mut game);
        executor::perform_action(&mut game, "deal", Seat(1), Args::new(), 0);

        let expected_tricks = cards_per_hand(player_count as usize) * player_count as usize;
        let max_actions = expected_tricks + 1;
        let mut actions_taken = 0;
        while !game.flow_position.finished {
            let Some(player) = game.players.current() else { break };
            if !game.flow_position.current_actions.iter().any(|name| name == "play_card") {
                break;
            }
            play_one_legal_card(&mut game, player);
            actions_taken += 1;
            prop_assert!(actions_taken <= max_actions, "flow should finish within the expected trick count");
        }

        prop_assert!(game.flow_position.finished);
    }
}

/// Sanity check that `element_ref`/card values round-trip the way the
/// property tests above assume when comparing log entries across games.
#[test]
fn element_ref_values_compare_equal_for_the_same_id() {
    let mut tree = ElementTree::new("Game");
    let root = tree.root();
    let card = tree.create(root, "card", "Card");
    assert_eq!(element_ref(card), element_ref(card));
}
