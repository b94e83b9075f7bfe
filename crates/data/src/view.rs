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

//! Per-player redacted tree views (spec.md §4.1, §4.8). The projection is
//! pure: it reads an [crate::element::ElementTree] and never mutates it.

use primitives::{ElementId, Seat};
use serde::{Deserialize, Serialize};

use crate::animation::AnimationEvent;
use crate::element::ElementTree;
use crate::lobby::LobbyInfo;
use crate::value::Value;

/// A redacted element: either the full node (name/class/attributes/
/// children), or a stand-in exposing only `child_count` when the element's
/// visibility policy hides contents from the viewing seat (spec.md P6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ElementView {
    pub id: ElementId,
    pub name: String,
    pub class_name: String,
    pub attributes: std::collections::BTreeMap<String, Value>,
    pub player: Option<Seat>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<ElementView>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub child_count: Option<usize>,
}

/// Projects `start` and everything beneath it into a redacted tree for
/// `viewer` (`None` for a spectator). Hidden contents render as
/// `child_count` with no `children` field (spec.md §3, "Hidden contents
/// render... as `{ childCount }` without `children`").
pub fn project(tree: &ElementTree, start: ElementId, viewer: Option<Seat>) -> ElementView {
    let element = tree.expect(start);
    let visible = element.visibility.visible_to(element.player, viewer);

    let children = if visible {
        Some(element.children.iter().map(|&child| project(tree, child, viewer)).collect())
    } else {
        None
    };

    ElementView {
        id: element.id,
        name: element.name.clone(),
        class_name: element.class_name.clone(),
        attributes: element.attributes.clone(),
        player: element.player,
        child_count: if visible { None } else { Some(element.children.len()) },
        children,
    }
}

/// Per-player snapshot sent on any state change (spec.md §3, "Session
/// view").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionView {
    pub element_tree: ElementView,
    pub current_player: Option<Seat>,
    pub available_actions: Vec<String>,
    pub flow_state: crate::flow::FlowPosition,
    pub pending_animation_events: Vec<AnimationEvent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lobby_info: Option<LobbyInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pending_follow_up: Option<crate::action::FollowUp>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::visibility::Visibility;

    #[test]
    fn hidden_contents_expose_only_child_count() {
        let mut tree = ElementTree::new("Game");
        let root = tree.root();
        let deck = tree.create(root, "deck", "Space");
        tree.expect_mut(deck).visibility = Visibility::ContentsHidden;
        tree.create(deck, "card-1", "Card");
        tree.create(deck, "card-2", "Card");

        let view = project(&tree, deck, Some(Seat(1)));
        assert!(view.children.is_none());
        assert_eq!(view.child_count, Some(2));
    }

    #[test]
    fn public_contents_expose_children() {
        let mut tree = ElementTree::new("Game");
        let root = tree.root();
        let board = tree.create(root, "board", "Space");
        tree.create(board, "piece", "Piece");

        let view = project(&tree, board, Some(Seat(1)));
        assert!(view.children.is_some());
        assert_eq!(view.child_count, None);
    }
}
