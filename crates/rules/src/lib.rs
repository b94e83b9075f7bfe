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

//! The action executor and flow engine (spec.md §4.2-§4.3): the crate that
//! actually decides what happens when a player acts, as opposed to `data`,
//! which only declares the shapes those decisions operate on.

pub mod executor;
pub mod flow_engine;
pub mod replay;
pub mod view;
