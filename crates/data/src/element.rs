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

//! The element tree: the generic typed tree of games, spaces, pieces, and
//! players described in spec.md §3-4.1.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use primitives::{ElementId, Seat};

use crate::value::{Args, Value};
use crate::visibility::Visibility;

/// A predicate evaluated against one element, used by [ElementTree::all],
/// [ElementTree::first], and [ElementTree::count] to narrow a query beyond
/// its class name: small composable closures over elements, the same
/// shape as a card-predicate closure but not tied to cards specifically.
pub type Finder = Arc<dyn Fn(&GameElement) -> bool + Send + Sync>;

/// Matches elements with the given `name`.
pub fn by_name(name: impl Into<String>) -> Finder {
    let name = name.into();
    Arc::new(move |element| element.name == name)
}

/// Matches elements owned by the given seat.
pub fn owned_by(seat: Seat) -> Finder {
    Arc::new(move |element| element.player == Some(seat))
}

/// Matches elements with no owner.
pub fn unowned() -> Finder {
    Arc::new(|element| element.player.is_none())
}

/// Matches elements whose attribute `key` equals `value`.
pub fn by_attr(key: impl Into<String>, value: Value) -> Finder {
    let key = key.into();
    Arc::new(move |element| element.attributes.get(&key) == Some(&value))
}

/// A generic node in the element tree: a game, a space, a piece, a player
/// slot, or any author-defined subtype of those. Subtypes are distinguished
/// by `class_name` rather than by the Rust type system, so that a game's
/// tree shape need not be known to the engine at compile time (spec.md
/// §9, "serialize `className` as a string").
#[derive(Debug, Clone)]
pub struct GameElement {
    pub id: ElementId,
    pub name: String,
    pub class_name: String,
    pub attributes: Args,
    pub children: Vec<ElementId>,
    pub parent: Option<ElementId>,
    pub player: Option<Seat>,
    pub visibility: Visibility,
}

impl GameElement {
    pub fn attr(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }

    pub fn set_attr(&mut self, key: impl Into<String>, value: Value) {
        self.attributes.insert(key.into(), value);
    }
}

impl fmt::Display for GameElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}({})", self.class_name, self.id.0, self.name)
    }
}

/// Owns every [GameElement] in one game and the parent/child edges between
/// them. The tree is acyclic; the only element with no parent is the root
/// (spec.md §3, I2/element invariants).
#[derive(Debug, Clone)]
pub struct ElementTree {
    elements: HashMap<ElementId, GameElement>,
    next_id: u64,
    root: ElementId,
}

impl ElementTree {
    pub fn new(root_class_name: impl Into<String>) -> Self {
        let root = ElementId(0);
        let mut elements = HashMap::new();
        elements.insert(
            root,
            GameElement {
                id: root,
                name: "game".to_string(),
                class_name: root_class_name.into(),
                attributes: Args::new(),
                children: Vec::new(),
                parent: None,
                player: None,
                visibility: Visibility::Public,
            },
        );
        Self { elements, next_id: 1, root }
    }

    pub fn root(&self) -> ElementId {
        self.root
    }

    pub fn get(&self, id: ElementId) -> Option<&GameElement> {
        self.elements.get(&id)
    }

    pub fn get_mut(&mut self, id: ElementId) -> Option<&mut GameElement> {
        self.elements.get_mut(&id)
    }

    /// Panics if the element does not exist; for call sites where a missing
    /// element would indicate an engine bug rather than a caller mistake.
    pub fn expect(&self, id: ElementId) -> &GameElement {
        self.elements.get(&id).unwrap_or_else(|| panic!("element {id} does not exist"))
    }

    pub fn expect_mut(&mut self, id: ElementId) -> &mut GameElement {
        self.elements.get_mut(&id).unwrap_or_else(|| panic!("element {id} does not exist"))
    }

    /// Creates a new element as the last child of `parent`, returning its
    /// id. Class name and visibility default to the caller's choosing;
    /// `visibility` defaults to [Visibility::Public].
    pub fn create(
        &mut self,
        parent: ElementId,
        name: impl Into<String>,
        class_name: impl Into<String>,
    ) -> ElementId {
        let id = ElementId(self.next_id);
        self.next_id += 1;
        self.elements.insert(
            id,
            GameElement {
                id,
                name: name.into(),
                class_name: class_name.into(),
                attributes: Args::new(),
                children: Vec::new(),
                parent: Some(parent),
                player: None,
                visibility: Visibility::Public,
            },
        );
        self.expect_mut(parent).children.push(id);
        id
    }

    /// Detaches `child` from its current parent and appends it to the end
    /// of `new_parent`'s children. No-ops (returns `false`) if either
    /// element does not exist or `child` is the tree root.
    pub fn put_into(&mut self, child: ElementId, new_parent: ElementId) -> bool {
        if child == self.root || !self.elements.contains_key(&child) {
            return false;
        }
        if !self.elements.contains_key(&new_parent) {
            return false;
        }

        if let Some(old_parent) = self.expect(child).parent {
            self.expect_mut(old_parent).children.retain(|&id| id != child);
        }
        self.expect_mut(child).parent = Some(new_parent);
        self.expect_mut(new_parent).children.push(child);
        true
    }

    /// Pre-order iteration of every descendant of `start` (exclusive of
    /// `start` itself): each element precedes its own children.
    fn descendants(&self, start: ElementId) -> Vec<ElementId> {
        let mut ordered = Vec::new();
        let mut stack: Vec<ElementId> =
            self.get(start).map(|e| e.children.clone()).unwrap_or_default();
        stack.reverse();
        while let Some(id) = stack.pop() {
            ordered.push(id);
            if let Some(element) = self.get(id) {
                for &child in element.children.iter().rev() {
                    stack.push(child);
                }
            }
        }
        ordered
    }

    /// Every descendant of `start` whose class name is `class_name` and
    /// which matches every finder, in document order.
    pub fn all(&self, start: ElementId, class_name: &str, finders: &[Finder]) -> Vec<ElementId> {
        self.descendants(start)
            .into_iter()
            .filter(|id| {
                let element = self.expect(*id);
                element.class_name == class_name && finders.iter().all(|f| f(element))
            })
            .collect()
    }

    pub fn first(&self, start: ElementId, class_name: &str, finders: &[Finder]) -> Option<ElementId> {
        self.descendants(start).into_iter().find(|id| {
            let element = self.expect(*id);
            element.class_name == class_name && finders.iter().all(|f| f(element))
        })
    }

    pub fn count(&self, start: ElementId, class_name: &str, finders: &[Finder]) -> usize {
        self.all(start, class_name, finders).len()
    }
}
