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

//! Pick (selection) definitions attached to actions (spec.md §3, "Selection
//! (pick) definition"). Evaluating a selection against live game state —
//! `getChoices`/`validateSelection`/`hasValidSelectionPath` — is the
//! executor's job (see the `rules` crate); this module only declares the
//! author-facing shape.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use primitives::{ElementId, Seat};

use crate::game::Game;
use crate::value::{Args, Value};

/// Everything a selection callback needs to know about the in-flight
/// action: the game being mutated, the acting player, and the arguments
/// accumulated from earlier selections in this same invocation.
#[derive(Clone, Copy)]
pub struct SelectionContext<'a> {
    pub game: &'a Game,
    pub player: Seat,
    pub args: &'a Args,
}

/// A callback returning a disablement reason, or `None` if the item is
/// selectable. Never a bare boolean (spec.md §3, "Disabled"), so the UI
/// always has copy to show.
pub type DisabledFn<T> = Arc<dyn Fn(&T, &SelectionContext) -> Option<String> + Send + Sync>;

/// A callback narrowing which elements are in scope for an `element`/
/// `elements` selection, distinct from `disabled` (scoping vs.
/// selectability).
pub type FilterFn = Arc<dyn Fn(&ElementId, &SelectionContext) -> bool + Send + Sync>;

/// The source of a `choice` selection's values: either a fixed list or one
/// computed from the context each time `getChoices` runs.
#[derive(Clone)]
pub enum ChoiceSource {
    Static(Vec<Value>),
    Dynamic(Arc<dyn Fn(&SelectionContext) -> Vec<Value> + Send + Sync>),
}

impl fmt::Debug for ChoiceSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChoiceSource::Static(values) => f.debug_tuple("Static").field(values).finish(),
            ChoiceSource::Dynamic(_) => f.write_str("Dynamic(..)"),
        }
    }
}

/// Fields shared by every selection variant.
#[derive(Debug, Clone)]
pub struct SelectionCommon {
    pub name: String,
    pub prompt: String,
    pub optional: bool,
    pub skip_text: Option<String>,
}

#[derive(Clone)]
pub struct ChoiceSelection {
    pub common: SelectionCommon,
    pub choices: ChoiceSource,
    pub disabled: Option<DisabledFn<Value>>,
}

#[derive(Clone)]
pub struct ElementSelection {
    pub common: SelectionCommon,
    pub element_class: String,
    /// Element to start the search from; defaults to the game root.
    pub from: Option<ElementId>,
    pub filter: Option<FilterFn>,
    pub disabled: Option<DisabledFn<ElementId>>,
}

#[derive(Clone)]
pub struct ElementsSelection {
    pub common: SelectionCommon,
    pub element_class: String,
    pub from: Option<ElementId>,
    pub filter: Option<FilterFn>,
    pub disabled: Option<DisabledFn<ElementId>>,
    pub min: usize,
    pub max: usize,
}

#[derive(Clone)]
pub struct NumberSelection {
    pub common: SelectionCommon,
    pub min: Option<i64>,
    pub max: Option<i64>,
    pub disabled: Option<DisabledFn<i64>>,
}

#[derive(Clone)]
pub struct TextSelection {
    pub common: SelectionCommon,
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub pattern: Option<String>,
    pub disabled: Option<DisabledFn<String>>,
}

/// A single pick attached to an action, in the order it must be resolved.
#[derive(Clone)]
pub enum Selection {
    Choice(ChoiceSelection),
    Element(ElementSelection),
    Elements(ElementsSelection),
    Number(NumberSelection),
    Text(TextSelection),
}

impl Selection {
    pub fn common(&self) -> &SelectionCommon {
        match self {
            Selection::Choice(s) => &s.common,
            Selection::Element(s) => &s.common,
            Selection::Elements(s) => &s.common,
            Selection::Number(s) => &s.common,
            Selection::Text(s) => &s.common,
        }
    }

    pub fn name(&self) -> &str {
        &self.common().name
    }

    pub fn is_optional(&self) -> bool {
        self.common().optional
    }
}

impl fmt::Debug for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Selection").field("name", &self.name()).finish_non_exhaustive()
    }
}

/// One entry of `getChoices`' result: a candidate value paired with whether
/// (and why) it is currently selectable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotatedChoice<T> {
    pub value: T,
    pub disabled: Option<String>,
}

impl<T> AnnotatedChoice<T> {
    pub fn enabled(value: T) -> Self {
        Self { value, disabled: None }
    }

    pub fn disabled(value: T, reason: impl Into<String>) -> Self {
        Self { value, disabled: Some(reason.into()) }
    }

    pub fn is_enabled(&self) -> bool {
        self.disabled.is_none()
    }
}

/// Scratch state for a selection engaged in "repeat until the player opts
/// out" mode. Scoped per action invocation: a fresh `fetched_selections` set
/// is created every time `performAction` begins (spec.md §9, resolved as
/// "fresh scratch per repetition" rather than a module-global flag).
#[derive(Debug, Clone, Default)]
pub struct ActionStateSnapshot {
    pub repeating: Option<RepeatingState>,
    pub fetched_selections: HashSet<String>,
}

#[derive(Debug, Clone, Default)]
pub struct RepeatingState {
    pub selection_name: String,
    pub collected: Vec<Value>,
}
