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

//! The persistence *contract* the core exposes to an adapter (spec.md §6,
//! "Persisted snapshot format"). No concrete storage engine lives in this
//! crate — the core does not persist state itself (spec.md §1, Non-goals)
//! — only the [snapshot::PersistedSnapshot] shape and the [database::Database]
//! trait an adapter implements against it.

pub mod database;
pub mod snapshot;
