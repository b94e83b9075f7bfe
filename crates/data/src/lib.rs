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

//! Core, engine-agnostic data model: the element tree, players, pick and
//! action definitions, the flow-control tree, the command log, the
//! animation-event buffer, lobby value types, and per-player views.
//!
//! This crate has no notion of *how* state transitions happen (see the
//! `rules` crate) or how sessions are served over a network (see the
//! `game` crate); it only defines the shapes those crates operate on.

pub mod action;
pub mod animation;
pub mod element;
pub mod flow;
pub mod game;
pub mod lobby;
pub mod log;
pub mod player;
pub mod selection;
pub mod value;
pub mod view;
pub mod visibility;
