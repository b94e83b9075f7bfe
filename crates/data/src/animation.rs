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

//! The animation-event buffer (spec.md §4.5). Actions execute to
//! completion synchronously; these events are a side channel for the UI
//! layer and never gate state mutation.

use std::collections::BTreeMap;

use primitives::{AnimationEventId, AnimationGroupId, Seat};
use serde::{Deserialize, Serialize};

use crate::value::Value;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnimationEvent {
    pub id: AnimationEventId,
    pub event_type: String,
    pub data: Value,
    pub group: Option<AnimationGroupId>,
    pub emitted_at: u64,
}

/// Owns the monotonic id counter and every event not yet trimmed. Trimming
/// drops events at or below `min(lastSeenId across connected seats)`
/// (spec.md §4.5); disconnected seats are excluded from that minimum once
/// they exceed the configured grace window (spec.md §9), which the caller
/// communicates by omitting their watermark from `trim`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnimationBuffer {
    events: Vec<AnimationEvent>,
    next_id: u64,
    last_seen: BTreeMap<Seat, AnimationEventId>,
}

impl AnimationBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(&mut self, event_type: impl Into<String>, data: Value, group: Option<AnimationGroupId>, now: u64) -> AnimationEventId {
        let id = AnimationEventId(self.next_id);
        self.next_id += 1;
        self.events.push(AnimationEvent { id, event_type: event_type.into(), data, group, emitted_at: now });
        id
    }

    /// The id the next [AnimationBuffer::emit] call will assign. Used by
    /// the executor to compute which ids were emitted by one action without
    /// depending on buffer positions, which shift under [AnimationBuffer::trim].
    pub fn peek_next_id(&self) -> u64 {
        self.next_id
    }

    /// Events with `id > lastSeenId` for `seat`.
    pub fn pending_for(&self, seat: Seat) -> Vec<AnimationEvent> {
        let watermark = self.last_seen.get(&seat).copied().unwrap_or(AnimationEventId(0));
        self.events.iter().filter(|e| e.id.0 > watermark.0).cloned().collect()
    }

    /// Advances `seat`'s watermark; never moves it backwards (spec.md I5,
    /// "events with id ≤ lastSeenId for a player are never re-sent").
    pub fn acknowledge(&mut self, seat: Seat, up_to: AnimationEventId) {
        let current = self.last_seen.entry(seat).or_insert(AnimationEventId(0));
        if up_to.0 > current.0 {
            *current = up_to;
        }
    }

    /// Drops buffered events at or below the minimum watermark among
    /// `connected_seats`. Seats outside that set (disconnected past their
    /// grace window) do not block trimming.
    pub fn trim(&mut self, connected_seats: &[Seat]) {
        let floor = connected_seats
            .iter()
            .map(|seat| self.last_seen.get(seat).copied().unwrap_or(AnimationEventId(0)).0)
            .min();
        let Some(floor) = floor else { return };
        self.events.retain(|e| e.id.0 > floor);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
