//! Identifiers and small value types shared by every BoardSmith crate.
//!
//! Nothing in this crate owns game state or logic: it is the vocabulary the
//! rest of the engine is written in.

use std::fmt;
use std::fmt::Display;

use derive_more::Display;
use enum_iterator::Sequence;
use serde::{Deserialize, Serialize};
use strum::EnumString;

/// Unique identifier for a single element within a game's element tree.
///
/// Monotonically increasing within a game and never reused, even once an
/// element is detached from the tree (spec.md §3, I-element-id).
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize, Display)]
#[display(fmt = "#{_0}")]
pub struct ElementId(pub u64);

/// A 1-indexed seat at the table. Immutable for the lifetime of a player
/// instance; seats are contiguous `1..=player_count`.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize, Display)]
#[display(fmt = "seat {_0}")]
pub struct Seat(pub u32);

impl Seat {
    pub fn index(&self) -> usize {
        (self.0 - 1) as usize
    }

    pub fn from_index(index: usize) -> Self {
        Self(index as u32 + 1)
    }
}

/// Marker trait for types that can be resolved to a seat.
pub trait HasSeat {
    fn seat(&self) -> Seat;
}

impl HasSeat for Seat {
    fn seat(&self) -> Seat {
        *self
    }
}

/// Unique, monotonic identifier for an animation event within one game.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize, Display)]
#[display(fmt = "anim#{_0}")]
pub struct AnimationEventId(pub u64);

/// Index of an entry in the command log. Entry 0 is the first successfully
/// performed action.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize, Display)]
#[display(fmt = "log#{_0}")]
pub struct LogIndex(pub u64);

impl LogIndex {
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

/// Opaque session identifier assigned by a host process to one connected
/// transport (a WebSocket, an in-process channel, ...).
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize, Display)]
#[display(fmt = "session#{_0}")]
pub struct SessionId(pub u64);

/// Opaque identifier for a player across reconnections, assigned by the
/// lobby when a human claims a slot. AI slots never receive one.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize, Display)]
#[display(fmt = "player#{_0}")]
pub struct PlayerId(pub u64);

/// Identifies an animation event grouping, used to let a UI play several
/// events as one coordinated sequence instead of independently.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize, Display)]
#[display(fmt = "group#{_0}")]
pub struct AnimationGroupId(pub u64);

/// The closed set of error codes surfaced on the wire (spec.md §6, §7).
#[derive(
    Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize, EnumString, Sequence,
)]
pub enum ErrorCode {
    NotYourTurn,
    ActionUnavailable,
    MissingSelection,
    InvalidSelection,
    SelectionDisabled,
    ConditionFailed,
    ExecuteThrew,
    ColorAlreadyTaken,
    LobbyNotWaiting,
    GameNotFound,
    PlayerNotInLobby,
    InvalidJson,
    InternalError,
}

impl Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Matches the wire's SCREAMING_SNAKE_CASE error code spelling.
        let s = match self {
            ErrorCode::NotYourTurn => "NOT_YOUR_TURN",
            ErrorCode::ActionUnavailable => "ACTION_UNAVAILABLE",
            ErrorCode::MissingSelection => "MISSING_SELECTION",
            ErrorCode::InvalidSelection => "INVALID_SELECTION",
            ErrorCode::SelectionDisabled => "SELECTION_DISABLED",
            ErrorCode::ConditionFailed => "CONDITION_FAILED",
            ErrorCode::ExecuteThrew => "EXECUTE_THREW",
            ErrorCode::ColorAlreadyTaken => "COLOR_ALREADY_TAKEN",
            ErrorCode::LobbyNotWaiting => "LOBBY_NOT_WAITING",
            ErrorCode::GameNotFound => "GAME_NOT_FOUND",
            ErrorCode::PlayerNotInLobby => "PLAYER_NOT_IN_LOBBY",
            ErrorCode::InvalidJson => "INVALID_JSON",
            ErrorCode::InternalError => "INTERNAL_ERROR",
        };
        write!(f, "{s}")
    }
}
