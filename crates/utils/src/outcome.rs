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

use std::fmt;

use primitives::ErrorCode;
use thiserror::Error;

/// Marker struct indicating that an operation applied its effects
/// successfully.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Success;

/// The result of a low-level tree mutation which may be a no-op, e.g.
/// because the element in question no longer exists.
///
/// This should only be used for single, atomic mutations like "move an
/// element" or "append a child". Larger multi-step operations should use
/// [Value] instead, since they are expected to surface a real error instead
/// of silently skipping.
pub type Outcome = Option<Success>;

/// A constant representing a successful outcome.
pub const OK: Outcome = Some(Success);

/// A constant representing a skipped outcome.
pub const SKIPPED: Outcome = None;

/// Executes a function and returns its outcome. Used to scope a block of
/// logic that should stop early when a mutation is skipped, without
/// aborting the surrounding loop.
pub fn execute(mut function: impl FnMut() -> Outcome) -> Outcome {
    function()
}

/// The closed error taxonomy surfaced at every public boundary of the core
/// (spec.md §7). Input errors, rule errors, and author errors all flow
/// through this type; infrastructure errors (`InvalidJson`, `InternalError`)
/// are reserved for adapters but are part of the same enum so a `Session`
/// can report them uniformly.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EngineError {
    #[error("it is not your turn")]
    NotYourTurn,

    #[error("action is not currently available")]
    ActionUnavailable,

    #[error("missing required selection `{0}`")]
    MissingSelection(String),

    #[error("invalid selection for `{0}`")]
    InvalidSelection(String),

    #[error("selection disabled: {reason}")]
    SelectionDisabled { selection: String, reason: String },

    #[error("condition failed: {0}")]
    ConditionFailed(String),

    #[error("action execution failed: {0}")]
    ExecuteThrew(String),

    #[error("color already taken by {0}")]
    ColorAlreadyTaken(String),

    #[error("lobby is not in the waiting state")]
    LobbyNotWaiting,

    #[error("game not found")]
    GameNotFound,

    #[error("player is not in this lobby")]
    PlayerNotInLobby,

    #[error("invalid request payload")]
    InvalidJson,

    #[error("internal error: {0}")]
    InternalError(String),
}

impl EngineError {
    /// The stable wire error code for this error, used to populate the
    /// `errorCode` field described in spec.md §6.
    pub fn error_code(&self) -> ErrorCode {
        match self {
            EngineError::NotYourTurn => ErrorCode::NotYourTurn,
            EngineError::ActionUnavailable => ErrorCode::ActionUnavailable,
            EngineError::MissingSelection(_) => ErrorCode::MissingSelection,
            EngineError::InvalidSelection(_) => ErrorCode::InvalidSelection,
            EngineError::SelectionDisabled { .. } => ErrorCode::SelectionDisabled,
            EngineError::ConditionFailed(_) => ErrorCode::ConditionFailed,
            EngineError::ExecuteThrew(_) => ErrorCode::ExecuteThrew,
            EngineError::ColorAlreadyTaken(_) => ErrorCode::ColorAlreadyTaken,
            EngineError::LobbyNotWaiting => ErrorCode::LobbyNotWaiting,
            EngineError::GameNotFound => ErrorCode::GameNotFound,
            EngineError::PlayerNotInLobby => ErrorCode::PlayerNotInLobby,
            EngineError::InvalidJson => ErrorCode::InvalidJson,
            EngineError::InternalError(_) => ErrorCode::InternalError,
        }
    }
}

impl fmt::Display for Success {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "success")
    }
}

/// The result type for fallible operations which must surface a real error
/// to the caller rather than silently no-op, e.g. `perform_action`.
pub type Value<T> = Result<T, EngineError>;
