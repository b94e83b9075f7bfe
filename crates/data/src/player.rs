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

//! Players: the 1-indexed seat collection described in spec.md §3.

use primitives::{ElementId, Seat};
use serde::{Deserialize, Serialize};

/// One seat at the table. A player is also a node in the element tree (its
/// `element` field), so that pieces/cards can be owned by a player the same
/// way they would be owned by any other element.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub seat: Seat,
    pub name: String,
    pub color: Option<String>,
    pub element: ElementId,
}

impl Player {
    pub fn new(seat: Seat, name: impl Into<String>, element: ElementId) -> Self {
        Self { seat, name: name.into(), color: None, element }
    }
}

/// The ordered 1..N seat collection owned by a [crate::game::Game]. Seats
/// are contiguous starting at 1 (spec.md §3, Player invariants).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Players {
    seats: Vec<Player>,
    current: Option<Seat>,
}

impl Players {
    pub fn new(seats: Vec<Player>) -> Self {
        let current = seats.first().map(|p| p.seat);
        Self { seats, current }
    }

    pub fn len(&self) -> usize {
        self.seats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seats.is_empty()
    }

    pub fn all(&self) -> &[Player] {
        &self.seats
    }

    pub fn get(&self, seat: Seat) -> Option<&Player> {
        self.seats.iter().find(|p| p.seat == seat)
    }

    pub fn get_mut(&mut self, seat: Seat) -> Option<&mut Player> {
        self.seats.iter_mut().find(|p| p.seat == seat)
    }

    pub fn current(&self) -> Option<Seat> {
        self.current
    }

    /// Sets the current player. A `None` current player is valid between
    /// `eachPlayer` iterations or while the flow is paused at a step with no
    /// acting seat.
    pub fn set_current(&mut self, seat: Option<Seat>) {
        self.current = seat;
    }

    pub fn next_seat(&self, seat: Seat) -> Option<Seat> {
        let index = self.seats.iter().position(|p| p.seat == seat)?;
        self.seats.get((index + 1) % self.seats.len()).map(|p| p.seat)
    }
}
