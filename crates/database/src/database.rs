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

use async_trait::async_trait;
use primitives::SessionId;
use utils::outcome::{EngineError, Value};

use crate::snapshot::PersistedSnapshot;

/// Trait abstracting over ways of persisting a game/lobby's snapshot.
///
/// The core never calls this itself — it exposes [PersistedSnapshot]
/// values and leaves writing/reading them to whichever adapter embeds the
/// core (spec.md §1, Non-goals: "the core does not persist state itself").
/// A host process holds an `Arc<dyn Database>` and calls this at its own
/// cadence (after every mutation, on a timer, on shutdown, ...).
#[async_trait]
pub trait Database: Send + Sync {
    /// Reads a persisted snapshot by its host-assigned session id.
    async fn fetch_snapshot(&self, id: SessionId) -> Value<Option<PersistedSnapshot>>;

    /// Writes (or overwrites) a persisted snapshot.
    async fn write_snapshot(&self, id: SessionId, snapshot: &PersistedSnapshot) -> Value<()>;

    /// Deletes a persisted snapshot, e.g. once its lobby is evicted.
    async fn delete_snapshot(&self, id: SessionId) -> Value<()>;
}

/// An in-memory [Database] backed by nothing durable, useful for tests and
/// for a host that only wants replay-from-log within one process lifetime.
#[derive(Default)]
pub struct InMemoryDatabase {
    snapshots: std::sync::Mutex<std::collections::HashMap<SessionId, PersistedSnapshot>>,
}

#[async_trait]
impl Database for InMemoryDatabase {
    async fn fetch_snapshot(&self, id: SessionId) -> Value<Option<PersistedSnapshot>> {
        let snapshots = self.snapshots.lock().map_err(|_| EngineError::InternalError("poisoned lock".to_string()))?;
        Ok(snapshots.get(&id).cloned())
    }

    async fn write_snapshot(&self, id: SessionId, snapshot: &PersistedSnapshot) -> Value<()> {
        let mut snapshots =
            self.snapshots.lock().map_err(|_| EngineError::InternalError("poisoned lock".to_string()))?;
        snapshots.insert(id, snapshot.clone());
        Ok(())
    }

    async fn delete_snapshot(&self, id: SessionId) -> Value<()> {
        let mut snapshots =
            self.snapshots.lock().map_err(|_| EngineError::InternalError("poisoned lock".to_string()))?;
        snapshots.remove(&id);
        Ok(())
    }
}
