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

//! Visibility policy for element contents (spec.md §3, "Visibility policy").

use std::collections::BTreeSet;

use primitives::Seat;
use serde::{Deserialize, Serialize};

/// Governs whether an element's `children` are visible to a given seat, or
/// only its `childCount`. Attached per-element; inherited by nothing, since
/// each element in the tree states its own policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Visibility {
    /// All players see the full contents.
    Public,
    /// The child count is visible to everyone; identities are hidden from
    /// everyone, including the owner.
    ContentsHidden,
    /// Only the element's `player` sees the full contents; everyone else
    /// sees only the count.
    ContentsVisibleToOwner,
    /// Only the listed seats see the full contents; everyone else sees
    /// only the count.
    ContentsVisibleTo(BTreeSet<Seat>),
}

impl Visibility {
    /// Whether a viewer in `seat` (`None` for a spectator/no seat) sees this
    /// element's full children list rather than just a count.
    pub fn visible_to(&self, owner: Option<Seat>, seat: Option<Seat>) -> bool {
        match self {
            Visibility::Public => true,
            Visibility::ContentsHidden => false,
            Visibility::ContentsVisibleToOwner => seat.is_some() && seat == owner,
            Visibility::ContentsVisibleTo(seats) => seat.map(|s| seats.contains(&s)).unwrap_or(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_is_visible_to_everyone() {
        assert!(Visibility::Public.visible_to(Some(Seat(1)), Some(Seat(2))));
        assert!(Visibility::Public.visible_to(Some(Seat(1)), None));
    }

    #[test]
    fn contents_hidden_is_visible_to_no_one() {
        assert!(!Visibility::ContentsHidden.visible_to(Some(Seat(1)), Some(Seat(1))));
    }

    #[test]
    fn visible_to_owner_checks_seat_equality() {
        let policy = Visibility::ContentsVisibleToOwner;
        assert!(policy.visible_to(Some(Seat(1)), Some(Seat(1))));
        assert!(!policy.visible_to(Some(Seat(1)), Some(Seat(2))));
        assert!(!policy.visible_to(Some(Seat(1)), None));
    }

    #[test]
    fn visible_to_explicit_set() {
        let policy = Visibility::ContentsVisibleTo(BTreeSet::from([Seat(1), Seat(3)]));
        assert!(policy.visible_to(None, Some(Seat(1))));
        assert!(!policy.visible_to(None, Some(Seat(2))));
        assert!(policy.visible_to(None, Some(Seat(3))));
    }
}
