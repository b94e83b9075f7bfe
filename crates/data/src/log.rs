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

//! The append-only command log backing replay and time travel (spec.md
//! §4.4).

use primitives::{AnimationEventId, LogIndex, Seat};
use serde::{Deserialize, Serialize};

use crate::flow::FlowPosition;
use crate::value::Args;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandLogEntry {
    pub index: LogIndex,
    pub player: Seat,
    pub action_name: String,
    pub args: Args,
    pub timestamp: u64,
    pub resulting_flow_position: FlowPosition,
    pub emitted_animation_events: Vec<AnimationEventId>,
}

/// Append-only; entries are never rewritten once logged (spec.md §3,
/// "Append-only, never rewritten").
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CommandLog {
    entries: Vec<CommandLogEntry>,
}

impl CommandLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_index(&self) -> LogIndex {
        self.entries.last().map(|e| e.index.next()).unwrap_or(LogIndex(0))
    }

    pub fn append(&mut self, entry: CommandLogEntry) {
        debug_assert_eq!(entry.index, self.next_index(), "command log indices must be contiguous");
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[CommandLogEntry] {
        &self.entries
    }

    /// Entries with index strictly less than `index`, the prefix needed to
    /// reconstruct state "at" that index for time travel.
    pub fn prefix(&self, index: LogIndex) -> &[CommandLogEntry] {
        let end = self.entries.iter().position(|e| e.index.0 >= index.0).unwrap_or(self.entries.len());
        &self.entries[..end]
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
