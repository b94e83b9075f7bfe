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

//! Flow control-flow nodes and the cursor that tracks position within them
//! (spec.md §4.3). The flow engine that interprets this tree lives in the
//! `rules` crate; this module only declares the node and position shapes.

use std::fmt;
use std::sync::Arc;

use primitives::Seat;
use serde::{Deserialize, Serialize};

use crate::game::Game;

pub type FlowPredicate = Arc<dyn Fn(&Game) -> bool + Send + Sync>;

/// A single flow control-flow node. The flow is a tree; `Sequence` is the
/// one variant not named directly in spec.md's flow-node list, needed so
/// that a `loop`/`eachPlayer` body or the game's top-level flow can hold
/// more than one child node.
#[derive(Clone)]
pub enum FlowNode {
    Sequence(Vec<FlowNode>),
    Loop {
        label: String,
        while_condition: FlowPredicate,
        max_iterations: u32,
        body: Box<FlowNode>,
    },
    EachPlayer {
        label: String,
        filter: Option<Arc<dyn Fn(&Game, Seat) -> bool + Send + Sync>>,
        body: Box<FlowNode>,
    },
    ActionStep {
        label: String,
        actions: Vec<String>,
        skip_if: Option<FlowPredicate>,
    },
    Parallel {
        label: String,
        branches: Vec<FlowNode>,
    },
}

impl fmt::Debug for FlowNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlowNode::Sequence(children) => f.debug_tuple("Sequence").field(&children.len()).finish(),
            FlowNode::Loop { label, max_iterations, .. } => {
                f.debug_struct("Loop").field("label", label).field("max_iterations", max_iterations).finish()
            }
            FlowNode::EachPlayer { label, .. } => f.debug_struct("EachPlayer").field("label", label).finish(),
            FlowNode::ActionStep { label, actions, .. } => {
                f.debug_struct("ActionStep").field("label", label).field("actions", actions).finish()
            }
            FlowNode::Parallel { label, branches } => {
                f.debug_struct("Parallel").field("label", label).field("branches", &branches.len()).finish()
            }
        }
    }
}

/// One step on the path from the flow root to the currently active node.
/// `EachPlayer`'s membership is captured once, at entry (spec.md §4.3,
/// "the list is captured at entry").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlowFrame {
    Sequence { index: usize },
    Loop { iteration: u32 },
    EachPlayer { members: Vec<Seat>, index: usize },
    Parallel { branch: usize },
}

/// The flow engine's cursor: a path of frames from the root down to the
/// active leaf, serializable so it can ride along in a command-log entry
/// (`resultingFlowCursor`, spec.md §4.4) and be restored during replay.
///
/// `started` disambiguates "never entered the flow" from "the root node
/// itself needs no frame" (e.g. a bare `actionStep` root); `current_actions`
/// caches the actions offered at the current pause point so a view can be
/// built without re-walking the tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct FlowPosition {
    pub path: Vec<FlowFrame>,
    pub started: bool,
    pub finished: bool,
    pub current_actions: Vec<String>,
}

impl FlowPosition {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn is_root(&self) -> bool {
        self.path.is_empty()
    }
}
