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

//! "Trestle", the reference game this workspace's tests are built against
//! (spec.md §8): a small trick-taking card game with a standard 52-card
//! deck, no trump suit, mandatory follow-suit, and one trick per round.
//!
//! This is deliberately minimal: there is no leading-player rotation (each
//! trick is played in fixed seat order, not led by the previous trick's
//! winner) and no scoring beyond a per-player trick count. It exists to
//! give `rules`/`game`/`database` something concrete to exercise, not to
//! be a faithful trick-taking ruleset.

use std::sync::Arc;

use data::action::{ActionContext, ActionDefinition};
use data::element::owned_by;
use data::flow::FlowNode;
use data::game::{ActionCatalogue, Game, GameConfig};
use data::selection::{ElementSelection, Selection, SelectionCommon};
use data::value::{as_element_id, element_ref, Value};
use data::visibility::Visibility;
use game::session::GameDefinition;
use primitives::{ElementId, Seat};
use rand::Rng;
use utils::outcome::Value as EngineResult;

const SUITS: [&str; 4] = ["Clubs", "Diamonds", "Hearts", "Spades"];
const MAX_TRICKS: u32 = 26;

/// The [GameDefinition] used to drive a full `trestle` game through
/// [game::session::Session] in integration tests, rather than constructing
/// a bare [Game] with [new_game].
#[derive(Debug, Clone, Copy, Default)]
pub struct TrestleDefinition;

impl GameDefinition for TrestleDefinition {
    fn game_type(&self) -> &str {
        "trestle"
    }

    fn catalogue(&self) -> ActionCatalogue {
        catalogue()
    }

    fn flow_root(&self) -> FlowNode {
        flow_root()
    }
}

/// Builds a fresh, undealt [Game] wired up with Trestle's catalogue and
/// flow. Call [rules::flow_engine::start] on the result, then perform the
/// `deal` action, before using it.
pub fn new_game(config: GameConfig) -> EngineResult<Game> {
    Game::new("trestle", config, catalogue(), flow_root())
}

/// A game definition only supplies a catalogue and a flow root (there is no
/// tree-construction hook, since `database::snapshot` replay rebuilds a
/// [Game] the same way `Session::build_game` does on a fresh start), so the
/// board itself - deck, hands, trick, discard - is built lazily by the
/// `deal` action the first time it runs, rather than by a separate setup
/// step a caller could forget to invoke.
fn ensure_board(game: &mut Game) {
    let root = game.tree.root();
    if game.tree.first(root, "Deck", &[]).is_some() {
        return;
    }

    let deck = game.tree.create(root, "deck", "Deck");
    game.tree.expect_mut(deck).visibility = Visibility::ContentsHidden;

    let trick = game.tree.create(root, "trick", "Trick");
    game.tree.expect_mut(trick).visibility = Visibility::Public;

    let discard = game.tree.create(root, "discard", "Discard");
    game.tree.expect_mut(discard).visibility = Visibility::Public;

    let seats: Vec<Seat> = game.players.all().iter().map(|p| p.seat).collect();
    for seat in seats {
        let hand = game.tree.create(root, format!("hand-{}", seat.0), "Hand");
        let element = game.tree.expect_mut(hand);
        element.visibility = Visibility::ContentsVisibleToOwner;
        element.player = Some(seat);
    }
}

fn find_one(game: &Game, class_name: &str) -> ElementId {
    game.tree.first(game.tree.root(), class_name, &[]).unwrap_or_else(|| panic!("trestle: missing `{class_name}` element"))
}

fn hand_of(game: &Game, seat: Seat) -> ElementId {
    game.tree
        .first(game.tree.root(), "Hand", &[owned_by(seat)])
        .unwrap_or_else(|| panic!("trestle: seat {} has no hand", seat.0))
}

fn catalogue() -> ActionCatalogue {
    ActionCatalogue::new(vec![deal_action(), play_card_action()])
}

fn deal_action() -> ActionDefinition {
    ActionDefinition {
        name: "deal".to_string(),
        selections: Vec::new(),
        conditions: Vec::new(),
        execute: Arc::new(deal_execute),
    }
}

/// Builds a standard 52-card deck into the `Deck` element, shuffles it with
/// the game's own deterministic rng (so a replay draws the same hands every
/// time, spec.md I6), and deals as many even hands as the player count
/// allows. Leftover cards stay in the deck, face down, for the rest of the
/// game.
fn deal_execute(ctx: &mut ActionContext) -> Result<Option<data::action::FollowUp>, String> {
    ensure_board(ctx.game);
    let deck = find_one(ctx.game, "Deck");
    let mut card_ids = Vec::with_capacity(52);
    for suit in SUITS {
        for rank in 2..=14i64 {
            let card = ctx.game.tree.create(deck, format!("{rank} of {suit}"), "Card");
            let element = ctx.game.tree.expect_mut(card);
            element.set_attr("suit", Value::from(suit));
            element.set_attr("rank", Value::from(rank));
            card_ids.push(card);
        }
    }

    for i in (1..card_ids.len()).rev() {
        let j = ctx.game.rng.gen_range(0..=i);
        card_ids.swap(i, j);
    }

    let num_players = ctx.game.players.len();
    let per_hand = card_ids.len() / num_players;
    for (index, &card) in card_ids.iter().take(per_hand * num_players).enumerate() {
        let seat = Seat((index % num_players) as u32 + 1);
        let hand = hand_of(ctx.game, seat);
        ctx.game.tree.put_into(card, hand);
        ctx.game.tree.expect_mut(card).player = Some(seat);
    }

    Ok(None)
}

fn play_card_action() -> ActionDefinition {
    let filter_player = ctx_owns_and_holds();
    let disabled = follow_suit_rule();

    let selection = Selection::Element(ElementSelection {
        common: SelectionCommon {
            name: "card".to_string(),
            prompt: "Play a card".to_string(),
            optional: false,
            skip_text: None,
        },
        element_class: "Card".to_string(),
        from: None,
        filter: Some(filter_player),
        disabled: Some(disabled),
    });

    ActionDefinition {
        name: "play_card".to_string(),
        selections: vec![selection],
        conditions: Vec::new(),
        execute: Arc::new(play_card_execute),
    }
}

fn ctx_owns_and_holds() -> data::selection::FilterFn {
    Arc::new(|id, ctx| {
        let hand = hand_of(ctx.game, ctx.player);
        ctx.game.tree.get(*id).map(|element| element.parent == Some(hand)).unwrap_or(false)
    })
}

/// A card of any suit other than the led suit is disabled whenever the
/// acting player still holds at least one card of the led suit.
fn follow_suit_rule() -> data::selection::DisabledFn<ElementId> {
    Arc::new(|id, ctx| {
        let trick = find_one(ctx.game, "Trick");
        let led = ctx.game.tree.expect(trick).children.first().copied()?;
        let led_suit = ctx.game.tree.expect(led).attr("suit").and_then(Value::as_str)?.to_string();

        let card_suit = ctx.game.tree.expect(*id).attr("suit").and_then(Value::as_str);
        if card_suit == Some(led_suit.as_str()) {
            return None;
        }

        let hand = hand_of(ctx.game, ctx.player);
        let holds_led_suit = ctx
            .game
            .tree
            .expect(hand)
            .children
            .iter()
            .any(|&card| ctx.game.tree.expect(card).attr("suit").and_then(Value::as_str) == Some(led_suit.as_str()));

        holds_led_suit.then(|| format!("must follow {led_suit}"))
    })
}

fn play_card_execute(ctx: &mut ActionContext) -> Result<Option<data::action::FollowUp>, String> {
    let card = ctx.args.get("card").and_then(as_element_id).ok_or("play_card: missing `card` argument")?;
    let trick = find_one(ctx.game, "Trick");
    ctx.game.tree.put_into(card, trick);
    ctx.game.animations.emit("card_played", element_ref(card), None, 0);

    if ctx.game.tree.expect(trick).children.len() == ctx.game.players.len() {
        resolve_trick(ctx.game, trick);
    }

    Ok(None)
}

/// Highest card of the led suit wins; its original owner's `tricks_won`
/// attribute is incremented and every card in the trick moves to the
/// shared discard pile.
fn resolve_trick(game: &mut Game, trick: ElementId) {
    let cards = game.tree.expect(trick).children.clone();
    let led_suit = game.tree.expect(cards[0]).attr("suit").and_then(Value::as_str).expect("led card has a suit").to_string();

    let winner = cards
        .iter()
        .copied()
        .filter(|&card| game.tree.expect(card).attr("suit").and_then(Value::as_str) == Some(led_suit.as_str()))
        .max_by_key(|&card| game.tree.expect(card).attr("rank").and_then(Value::as_i64).unwrap_or(0))
        .expect("the led card always matches the led suit");

    let winner_seat = game.tree.expect(winner).player.expect("a dealt card always records its original owner");
    if let Some(player) = game.players.get(winner_seat) {
        let element = player.element;
        let tricks_won = game.tree.expect(element).attr("tricks_won").and_then(Value::as_i64).unwrap_or(0);
        game.tree.expect_mut(element).set_attr("tricks_won", Value::from(tricks_won + 1));
    }

    let discard = find_one(game, "Discard");
    for card in cards {
        game.tree.put_into(card, discard);
    }

    game.animations.emit("trick_won", Value::from(winner_seat.0), None, 0);
}

fn flow_root() -> FlowNode {
    FlowNode::Sequence(vec![
        FlowNode::ActionStep { label: "deal".to_string(), actions: vec!["deal".to_string()], skip_if: None },
        FlowNode::Loop {
            label: "tricks".to_string(),
            while_condition: Arc::new(any_hand_nonempty),
            max_iterations: MAX_TRICKS,
            body: Box::new(FlowNode::EachPlayer {
                label: "turn".to_string(),
                filter: None,
                body: Box::new(FlowNode::ActionStep {
                    label: "play".to_string(),
                    actions: vec!["play_card".to_string()],
                    skip_if: None,
                }),
            }),
        },
    ])
}

fn any_hand_nonempty(game: &Game) -> bool {
    game.players
        .all()
        .first()
        .map(|p| !game.tree.expect(hand_of(game, p.seat)).children.is_empty())
        .unwrap_or(false)
}

/// How many cards a full deal gives each seat, the same arithmetic
/// [deal_execute] uses; exposed so tests and property checks can predict
/// trick counts without re-deriving it.
pub fn cards_per_hand(player_count: usize) -> usize {
    52 / player_count
}

#[cfg(test)]
mod tests {
    use data::lobby::PlayerConfig;
    use data::value::Args;

    use super::*;

    fn config(player_count: u32, seed: u64) -> GameConfig {
        GameConfig {
            player_count,
            player_names: (1..=player_count).map(|i| format!("P{i}")).collect(),
            seed,
            player_configs: (1..=player_count)
                .map(|i| PlayerConfig { seat: Seat(i), name: format!("P{i}"), color: None, is_ai: false })
                .collect(),
            settings: data::game::GameSettings::default(),
        }
    }

    #[test]
    fn deal_distributes_even_hands() {
        let mut game = new_game(config(4, 1)).unwrap();
        rules::flow_engine::start(&mut game);
        rules::executor::perform_action(&mut game, "deal", Seat(1), Args::new(), 0);

        for seat in [Seat(1), Seat(2), Seat(3), Seat(4)] {
            let hand = hand_of(&game, seat);
            assert_eq!(game.tree.expect(hand).children.len(), cards_per_hand(4));
        }
    }

    #[test]
    fn off_suit_card_is_disabled_once_a_suit_is_led() {
        let mut game = new_game(config(2, 42)).unwrap();
        rules::flow_engine::start(&mut game);
        rules::executor::perform_action(&mut game, "deal", Seat(1), Args::new(), 0);

        let leader_hand = hand_of(&game, Seat(1));
        let led_card = game.tree.expect(leader_hand).children[0];
        let mut args = Args::new();
        args.insert("card".to_string(), element_ref(led_card));
        let result = rules::executor::perform_action(&mut game, "play_card", Seat(1), args, 0);
        assert!(result.is_success());

        let selection = Selection::Element(match play_card_action().selections.into_iter().next().unwrap() {
            Selection::Element(sel) => sel,
            _ => unreachable!(),
        });
        let choices = rules::executor::get_choices(&selection, &game, Seat(2), &Args::new());
        let follower_hand = hand_of(&game, Seat(2));
        let led_suit = game.tree.expect(led_card).attr("suit").and_then(Value::as_str).unwrap();
        let holds_led_suit =
            game.tree.expect(follower_hand).children.iter().any(|&c| game.tree.expect(c).attr("suit").and_then(Value::as_str) == Some(led_suit));

        if holds_led_suit {
            assert!(choices.iter().any(|c| c.disabled.is_some()), "an off-suit card should be disabled");
        }
    }

    #[test]
    fn a_completed_trick_moves_every_card_to_discard_and_credits_the_winner() {
        let mut game = new_game(config(2, 7)).unwrap();
        rules::flow_engine::start(&mut game);
        rules::executor::perform_action(&mut game, "deal", Seat(1), Args::new(), 0);

        for seat in [Seat(1), Seat(2)] {
            let hand = hand_of(&game, seat);
            let card = game.tree.expect(hand).children[0];
            let mut args = Args::new();
            args.insert("card".to_string(), element_ref(card));
            let result = rules::executor::perform_action(&mut game, "play_card", seat, args, 0);
            assert!(result.is_success());
        }

        let discard = find_one(&game, "Discard");
        assert_eq!(game.tree.expect(discard).children.len(), 2);
        let trick = find_one(&game, "Trick");
        assert!(game.tree.expect(trick).children.is_empty());

        let total_tricks_won: i64 = game
            .players
            .all()
            .iter()
            .map(|p| game.tree.expect(p.element).attr("tricks_won").and_then(Value::as_i64).unwrap_or(0))
            .sum();
        assert_eq!(total_tricks_won, 1);
    }
}
