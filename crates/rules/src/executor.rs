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

//! The action executor (spec.md §4.2): resolves picks against live game
//! state and carries a validated action all the way to a logged mutation.

use data::action::{ActionContext, ActionResult, FollowUp};
use data::game::Game;
use data::log::CommandLogEntry;
use data::selection::{AnnotatedChoice, ChoiceSource, DisabledFn, FilterFn, Selection, SelectionContext};
use data::value::{as_element_id, element_ref, Args, Value};
use primitives::{AnimationEventId, ElementId, Seat};
use utils::outcome::{EngineError, Value as EngineResult};

use crate::flow_engine;

/// Evaluates a selection's candidate list against live state, annotating
/// each candidate with a disablement reason where one applies. Disabled
/// items remain in the result (spec.md §4.2).
pub fn get_choices(selection: &Selection, game: &Game, player: Seat, args: &Args) -> Vec<AnnotatedChoice<Value>> {
    let context = SelectionContext { game, player, args };
    match selection {
        Selection::Choice(sel) => {
            let raw = match &sel.choices {
                data::selection::ChoiceSource::Static(values) => values.clone(),
                data::selection::ChoiceSource::Dynamic(f) => f(&context),
            };
            raw.into_iter()
                .map(|value| {
                    let disabled = sel.disabled.as_ref().and_then(|f| f(&value, &context));
                    AnnotatedChoice { value, disabled }
                })
                .collect()
        }
        Selection::Element(sel) => element_candidates(
            &sel.element_class,
            sel.from,
            sel.filter.as_ref(),
            sel.disabled.as_ref(),
            context,
        ),
        Selection::Elements(sel) => element_candidates(
            &sel.element_class,
            sel.from,
            sel.filter.as_ref(),
            sel.disabled.as_ref(),
            context,
        ),
        Selection::Number(_) | Selection::Text(_) => Vec::new(),
    }
}

fn element_candidates(
    class_name: &str,
    from: Option<ElementId>,
    filter: Option<&FilterFn>,
    disabled: Option<&DisabledFn<ElementId>>,
    context: SelectionContext,
) -> Vec<AnnotatedChoice<Value>> {
    let start = from.unwrap_or_else(|| context.game.tree.root());
    let mut candidates = context.game.tree.all(start, class_name, &[]);
    if let Some(filter) = filter {
        candidates.retain(|id| filter(id, &context));
    }
    candidates
        .into_iter()
        .map(|id| {
            let reason = disabled.and_then(|f| f(&id, &context));
            AnnotatedChoice { value: element_ref(id), disabled: reason }
        })
        .collect()
}

/// Validates a submitted value against a selection's current candidate
/// list (or, for `number`/`text`, its range/length/pattern rules).
pub fn validate_selection(
    selection: &Selection,
    value: &Value,
    game: &Game,
    player: Seat,
    args: &Args,
) -> EngineResult<()> {
    let name = selection.name().to_string();
    match selection {
        Selection::Number(sel) => {
            let n = value.as_i64().ok_or_else(|| EngineError::InvalidSelection(name.clone()))?;
            if sel.min.is_some_and(|min| n < min) || sel.max.is_some_and(|max| n > max) {
                return Err(EngineError::InvalidSelection(name));
            }
            if let Some(disabled) = &sel.disabled {
                let context = SelectionContext { game, player, args };
                if let Some(reason) = disabled(&n, &context) {
                    return Err(EngineError::SelectionDisabled { selection: name, reason });
                }
            }
            Ok(())
        }
        Selection::Text(sel) => {
            let text = value.as_str().ok_or_else(|| EngineError::InvalidSelection(name.clone()))?;
            let length = text.chars().count();
            if sel.min_length.is_some_and(|min| length < min) || sel.max_length.is_some_and(|max| length > max) {
                return Err(EngineError::InvalidSelection(name));
            }
            if let Some(pattern) = &sel.pattern {
                if !text.contains(pattern.as_str()) {
                    return Err(EngineError::InvalidSelection(name));
                }
            }
            if let Some(disabled) = &sel.disabled {
                let context = SelectionContext { game, player, args };
                if let Some(reason) = disabled(&text.to_string(), &context) {
                    return Err(EngineError::SelectionDisabled { selection: name, reason });
                }
            }
            Ok(())
        }
        Selection::Elements(sel) => {
            let items = value.as_array().ok_or_else(|| EngineError::InvalidSelection(name.clone()))?;
            if items.len() < sel.min || items.len() > sel.max {
                return Err(EngineError::InvalidSelection(name));
            }
            let choices = get_choices(selection, game, player, args);
            for item in items {
                match choices.iter().find(|c| &c.value == item) {
                    Some(choice) if choice.disabled.is_some() => {
                        return Err(EngineError::SelectionDisabled {
                            selection: name,
                            reason: choice.disabled.clone().unwrap(),
                        });
                    }
                    Some(_) => {}
                    None => return Err(EngineError::InvalidSelection(name)),
                }
            }
            Ok(())
        }
        Selection::Choice(_) | Selection::Element(_) => {
            let choices = get_choices(selection, game, player, args);
            match choices.iter().find(|c| &c.value == value) {
                Some(choice) => match &choice.disabled {
                    Some(reason) => Err(EngineError::SelectionDisabled { selection: name, reason: reason.clone() }),
                    None => Ok(()),
                },
                None => Err(EngineError::InvalidSelection(name)),
            }
        }
    }
}

/// Whether at least one chain of enabled choices exists from `index`
/// onward. A required selection only contributes a path through one of its
/// *enabled* annotated choices; an optional selection remains viable by
/// being skipped even when every choice is disabled (spec.md §4.2).
pub fn has_valid_selection_path(
    selections: &[Selection],
    game: &Game,
    player: Seat,
    args: &Args,
    index: usize,
) -> bool {
    if index >= selections.len() {
        return true;
    }
    let selection = &selections[index];

    if selection.is_optional() && has_valid_selection_path(selections, game, player, args, index + 1) {
        return true;
    }

    match selection {
        Selection::Number(sel) => {
            let domain_nonempty = !sel.min.zip(sel.max).is_some_and(|(min, max)| min > max);
            domain_nonempty && has_valid_selection_path(selections, game, player, args, index + 1)
        }
        Selection::Text(sel) => {
            let domain_nonempty = !sel.min_length.zip(sel.max_length).is_some_and(|(min, max)| min > max);
            domain_nonempty && has_valid_selection_path(selections, game, player, args, index + 1)
        }
        _ => {
            let choices = get_choices(selection, game, player, args);
            choices.iter().filter(|c| c.disabled.is_none()).any(|choice| {
                let mut next_args = args.clone();
                next_args.insert(selection.name().to_string(), choice.value.clone());
                has_valid_selection_path(selections, game, player, &next_args, index + 1)
            })
        }
    }
}

/// Actions offered to `player` right now: listed in the current flow
/// position, whose conditions hold, and for which a valid selection path
/// exists (spec.md §4.2).
pub fn get_available_actions(game: &Game, player: Seat) -> Vec<String> {
    if game.flow_position.finished || game.players.current() != Some(player) {
        return Vec::new();
    }
    let empty_args = Args::new();
    game.flow_position
        .current_actions
        .iter()
        .filter(|name| {
            let Some(action) = game.catalogue.get(name) else { return false };
            let conditions_hold =
                action.conditions.iter().all(|(_, condition)| condition(game, player, &empty_args));
            conditions_hold && has_valid_selection_path(&action.selections, game, player, &empty_args, 0)
        })
        .cloned()
        .collect()
}

fn smart_resolve(selection: &Selection, value: Value) -> Value {
    match selection {
        Selection::Element(_) => as_element_id(&value).map(element_ref).unwrap_or(value),
        Selection::Elements(_) => match value.as_array() {
            Some(items) => Value::Array(
                items.iter().map(|item| as_element_id(item).map(element_ref).unwrap_or_else(|| item.clone())).collect(),
            ),
            None => value,
        },
        _ => value,
    }
}

/// Checks every selection and condition for `action` against `args`,
/// resolving raw ids to `element_ref` form along the way. Shared by
/// [perform_action] and [perform_follow_up], which differ only in the
/// turn/flow gate applied before this runs and in whether the flow cursor
/// advances after it succeeds.
fn validate_args(
    action: &data::action::ActionDefinition,
    game: &Game,
    player: Seat,
    mut args: Args,
) -> Result<Args, EngineError> {
    for selection in &action.selections {
        match args.get(selection.name()).cloned() {
            Some(raw) => {
                let resolved = smart_resolve(selection, raw);
                validate_selection(selection, &resolved, game, player, &args)?;
                args.insert(selection.name().to_string(), resolved);
            }
            None if selection.is_optional() => {}
            None => return Err(EngineError::MissingSelection(selection.name().to_string())),
        }
    }

    for (key, condition) in &action.conditions {
        if !condition(game, player, &args) {
            return Err(EngineError::ConditionFailed(key.clone()));
        }
    }

    Ok(args)
}

/// Runs `action.execute` against `game`, rolling back to a pre-execute
/// snapshot if it throws. Returns the follow-up it queued and the range of
/// animation events it emitted, for the caller to log.
fn run_execute(
    action: &data::action::ActionDefinition,
    game: &mut Game,
    player: Seat,
    args: &Args,
) -> Result<(Option<FollowUp>, std::ops::Range<u64>), EngineError> {
    let snapshot = game.clone();
    let animations_before = game.animations.peek_next_id();
    let outcome = {
        let mut context = ActionContext { game, player, args };
        (action.execute)(&mut context)
    };
    match outcome {
        Ok(follow_up) => Ok((follow_up, animations_before..game.animations.peek_next_id())),
        Err(message) => {
            *game = snapshot;
            Err(EngineError::ExecuteThrew(message))
        }
    }
}

/// Validates and performs one action (spec.md §4.2, steps 1-6). `now` is
/// an adapter-supplied timestamp, stamped onto the resulting log entry.
#[tracing::instrument(skip(game, args), fields(action = name, player = player.0))]
pub fn perform_action(game: &mut Game, name: &str, player: Seat, args: Args, now: u64) -> ActionResult {
    if game.flow_position.finished || game.players.current() != Some(player) {
        return ActionResult::Failure(EngineError::NotYourTurn);
    }
    if !game.flow_position.current_actions.iter().any(|a| a == name) {
        return ActionResult::Failure(EngineError::ActionUnavailable);
    }
    let Some(action) = game.catalogue.get(name).cloned() else {
        return ActionResult::Failure(EngineError::ActionUnavailable);
    };

    let args = match validate_args(&action, game, player, args) {
        Ok(args) => args,
        Err(error) => return ActionResult::Failure(error),
    };
    let (follow_up, animations) = match run_execute(&action, game, player, &args) {
        Ok(result) => result,
        Err(error) => return ActionResult::Failure(error),
    };

    let index = game.log.next_index();
    flow_engine::advance(game);

    game.log.append(CommandLogEntry {
        index,
        player,
        action_name: name.to_string(),
        args,
        timestamp: now,
        resulting_flow_position: game.flow_position.clone(),
        emitted_animation_events: animations.map(AnimationEventId).collect(),
    });

    ActionResult::Success { log_index: index, follow_up }
}

/// A queued [FollowUp] is surfaced here rather than re-invoked automatically;
/// the session layer (see the `game` crate) decides whether to run it for
/// the same or another player.
pub fn take_follow_up(result: &ActionResult) -> Option<FollowUp> {
    match result {
        ActionResult::Success { follow_up, .. } => follow_up.clone(),
        ActionResult::Failure(_) => None,
    }
}

/// Runs a queued [FollowUp] (spec.md §4.2 step 5, §9). The session layer
/// has already checked that `player`/`name` match the head of its follow-up
/// queue, so this skips the `current_actions`/turn gate `perform_action`
/// applies; selections and conditions are still validated normally. A
/// follow-up is a side channel outside the flow's natural cursor, so unlike
/// `perform_action` it never calls `flow_engine::advance`.
#[tracing::instrument(skip(game, args), fields(action = name, player = player.0))]
pub fn perform_follow_up(game: &mut Game, name: &str, player: Seat, args: Args, now: u64) -> ActionResult {
    let Some(action) = game.catalogue.get(name).cloned() else {
        return ActionResult::Failure(EngineError::ActionUnavailable);
    };

    let args = match validate_args(&action, game, player, args) {
        Ok(args) => args,
        Err(error) => return ActionResult::Failure(error),
    };
    let (follow_up, animations) = match run_execute(&action, game, player, &args) {
        Ok(result) => result,
        Err(error) => return ActionResult::Failure(error),
    };

    let index = game.log.next_index();
    game.log.append(CommandLogEntry {
        index,
        player,
        action_name: name.to_string(),
        args,
        timestamp: now,
        resulting_flow_position: game.flow_position.clone(),
        emitted_animation_events: animations.map(AnimationEventId).collect(),
    });

    ActionResult::Success { log_index: index, follow_up }
}
