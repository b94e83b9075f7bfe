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

//! The wire-shaped pick handler (spec.md §4.7). Deliberately independent
//! of `rules::executor::get_choices`'s [data::selection::AnnotatedChoice]
//! shape: a UI wants `{ value, display, disabled? }` over the wire, not
//! the engine's internal annotation type, so this module re-renders
//! rather than re-exports.

use data::game::Game;
use data::selection::Selection;
use data::value::{as_element_id, Value};
use primitives::{ElementId, Seat};
use serde::{Deserialize, Serialize};
use utils::outcome::{EngineError, Value as EngineResult};

/// A `choice` selection's candidate, rendered for the wire. `disabled` is
/// sparse: omitted entirely for an enabled item (spec.md §4.7, "present
/// only when the selection's disabled callback returns a string").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChoiceWithRefs {
    pub value: Value,
    pub display: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_ref: Option<ElementId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_ref: Option<ElementId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disabled: Option<String>,
}

/// An `element`/`elements` selection's candidate, rendered for the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidElement {
    pub id: ElementId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,
    #[serde(rename = "ref", skip_serializing_if = "Option::is_none")]
    pub element_ref: Option<ElementId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disabled: Option<String>,
}

/// The resolved shape of one selection, in whichever wire form its
/// variant renders to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResolvedPick {
    Choices(Vec<ChoiceWithRefs>),
    Elements(Vec<ValidElement>),
    None,
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Shared by the `element` and `elements` branches (spec.md §4.7, "both
/// variants route through one `buildValidElements` helper").
fn build_valid_elements(
    game: &Game,
    candidates: &[data::selection::AnnotatedChoice<Value>],
) -> Vec<ValidElement> {
    candidates
        .iter()
        .filter_map(|candidate| {
            let id = as_element_id(&candidate.value)?;
            let display = game.tree.get(id).map(|element| element.name.clone());
            Some(ValidElement { id, display, element_ref: Some(id), disabled: candidate.disabled.clone() })
        })
        .collect()
}

/// Resolves `(action_name, selection_name)` for `player` into the wire
/// shape a UI renders (spec.md §4.7). `args` carries whatever earlier
/// selections in the same invocation have already been resolved, the same
/// context `rules::executor::get_choices` would use.
pub fn resolve(
    game: &Game,
    action_name: &str,
    selection_name: &str,
    player: Seat,
    args: &data::value::Args,
) -> EngineResult<ResolvedPick> {
    let action = game
        .catalogue
        .get(action_name)
        .ok_or_else(|| EngineError::InternalError(format!("unknown action `{action_name}`")))?;
    let selection = action
        .selections
        .iter()
        .find(|s| s.name() == selection_name)
        .ok_or_else(|| EngineError::InternalError(format!("unknown selection `{selection_name}`")))?;

    let annotated = rules::executor::get_choices(selection, game, player, args);

    Ok(match selection {
        Selection::Choice(_) => ResolvedPick::Choices(
            annotated
                .into_iter()
                .map(|choice| ChoiceWithRefs {
                    display: display_value(&choice.value),
                    value: choice.value,
                    source_ref: None,
                    target_ref: None,
                    disabled: choice.disabled,
                })
                .collect(),
        ),
        Selection::Element(_) | Selection::Elements(_) => {
            ResolvedPick::Elements(build_valid_elements(game, &annotated))
        }
        Selection::Number(_) | Selection::Text(_) => ResolvedPick::None,
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use data::action::ActionDefinition;
    use data::flow::FlowNode;
    use data::game::{ActionCatalogue, GameConfig, GameSettings};
    use data::lobby::PlayerConfig;
    use data::selection::{ChoiceSelection, ChoiceSource, SelectionCommon};

    use super::*;

    fn game_with_gem_action() -> Game {
        let selection = Selection::Choice(ChoiceSelection {
            common: SelectionCommon {
                name: "gem".to_string(),
                prompt: "Pick a gem".to_string(),
                optional: false,
                skip_text: None,
            },
            choices: ChoiceSource::Static(vec![
                Value::from("red"),
                Value::from("blue"),
                Value::from("green"),
            ]),
            disabled: Some(Arc::new(|value, _ctx| {
                (value.as_str() == Some("blue")).then(|| "Out of blue".to_string())
            })),
        });
        let action = ActionDefinition {
            name: "pick-gem".to_string(),
            selections: vec![selection],
            conditions: Vec::new(),
            execute: Arc::new(|_ctx| Ok(None)),
        };
        let root = FlowNode::ActionStep {
            label: "main".to_string(),
            actions: vec!["pick-gem".to_string()],
            skip_if: None,
        };
        let config = GameConfig {
            player_count: 1,
            player_names: vec!["Alice".to_string()],
            seed: 1,
            player_configs: vec![PlayerConfig { seat: Seat(1), name: "Alice".to_string(), color: None, is_ai: false }],
            settings: GameSettings::default(),
        };
        let mut game = Game::new("test", config, ActionCatalogue::new(vec![action]), root).unwrap();
        rules::flow_engine::start(&mut game);
        game
    }

    #[test]
    fn disabled_item_carries_sparse_reason() {
        let game = game_with_gem_action();
        let resolved = resolve(&game, "pick-gem", "gem", Seat(1), &data::value::Args::new()).unwrap();
        let ResolvedPick::Choices(choices) = resolved else { panic!("expected Choices") };

        let blue = choices.iter().find(|c| c.value == Value::from("blue")).unwrap();
        assert_eq!(blue.disabled.as_deref(), Some("Out of blue"));

        let red = choices.iter().find(|c| c.value == Value::from("red")).unwrap();
        assert_eq!(red.disabled, None);
    }

    #[test]
    fn serializes_without_disabled_key_when_enabled() {
        let game = game_with_gem_action();
        let resolved = resolve(&game, "pick-gem", "gem", Seat(1), &data::value::Args::new()).unwrap();
        let ResolvedPick::Choices(choices) = resolved else { panic!("expected Choices") };
        let red = choices.iter().find(|c| c.value == Value::from("red")).unwrap();

        let json = serde_json::to_string(red).unwrap();
        assert!(!json.contains("disabled"));
    }
}
