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

//! Action definitions: the author-declared catalogue entries the executor
//! (`rules` crate) validates selections against and ultimately invokes
//! (spec.md §4.2).

use std::fmt;
use std::sync::Arc;

use primitives::Seat;
use utils::outcome::EngineError;

use crate::game::Game;
use crate::selection::Selection;
use crate::value::{Args, Value};

/// Everything `condition` and `execute` callbacks see: the live game (for
/// `execute`, mutably), the acting player, and the fully-resolved args.
pub struct ActionContext<'a> {
    pub game: &'a mut Game,
    pub player: Seat,
    pub args: &'a Args,
}

pub type ConditionFn = Arc<dyn Fn(&Game, Seat, &Args) -> bool + Send + Sync>;
pub type ExecuteFn = Arc<dyn Fn(&mut ActionContext) -> Result<Option<FollowUp>, String> + Send + Sync>;

/// An action queued by `execute` to run immediately after the current one,
/// for the same or a different player, bypassing the flow's normal
/// actionStep pause (spec.md §4.2 step 5).
#[derive(Debug, Clone)]
pub struct FollowUp {
    pub player: Seat,
    pub action_name: String,
    pub args: Args,
}

/// One entry of the game's action catalogue.
#[derive(Clone)]
pub struct ActionDefinition {
    pub name: String,
    pub selections: Vec<Selection>,
    /// All must hold for the action to be offered; keyed by a short label
    /// used in `CONDITION_FAILED: <key>` errors.
    pub conditions: Vec<(String, ConditionFn)>,
    pub execute: ExecuteFn,
}

impl fmt::Debug for ActionDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionDefinition")
            .field("name", &self.name)
            .field("selections", &self.selections.len())
            .field("conditions", &self.conditions.iter().map(|(k, _)| k).collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

/// The outcome of `performAction`, mirroring the wire shape from spec.md §6
/// (`{ success, error?, errorCode? }`) but carrying a structured
/// [EngineError] rather than pre-rendered strings; adapters format the wire
/// response from this.
#[derive(Debug, Clone)]
pub enum ActionResult {
    Success { log_index: primitives::LogIndex, follow_up: Option<FollowUp> },
    Failure(EngineError),
}

impl ActionResult {
    pub fn is_success(&self) -> bool {
        matches!(self, ActionResult::Success { .. })
    }
}

/// A value submitted for one selection, already smart-resolved against the
/// annotated choice list where the selection names an element.
pub type SelectionValue = Value;
