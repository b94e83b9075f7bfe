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

//! The session/lobby layer (spec.md §4.6, §4.9): everything a host process
//! talks to directly. Wraps the pure `rules`/`data` core with the stateful
//! bookkeeping a running server needs: seat occupancy, color conflicts,
//! connection tracking, broadcast fan-out, and the wire-shaped pick handler.

pub mod broadcast;
pub mod lobby;
pub mod pick_handler;
pub mod session;
