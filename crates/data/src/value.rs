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

//! The free-form value type used for element attributes, action arguments,
//! and pick choices.
//!
//! Game authors work with element trees whose shape is not known to the
//! engine ahead of time (spec.md §3, `GameElement.attributes`), so the
//! engine represents those values the same way an adapter will eventually
//! serialize them on the wire: as [serde_json::Value].

use std::collections::BTreeMap;

use primitives::ElementId;
use serde_json::Value as Json;

/// Alias used throughout the engine for attribute/argument/choice values.
pub type Value = Json;

/// A named bag of arguments submitted for one action invocation, or
/// accumulated while resolving a sequence of selections.
pub type Args = BTreeMap<String, Value>;

/// Convenience constructor for an element-reference value, used by
/// selections of variant `element`/`elements` when a raw value needs to be
/// round-tripped through `Args`.
pub fn element_ref(id: ElementId) -> Value {
    Json::from(id.0)
}

/// Reads an [ElementId] back out of a value produced by [element_ref], or a
/// bare integer/string submitted by a client.
pub fn as_element_id(value: &Value) -> Option<ElementId> {
    match value {
        Json::Number(n) => n.as_u64().map(ElementId),
        Json::String(s) => s.parse::<u64>().ok().map(ElementId),
        _ => None,
    }
}
