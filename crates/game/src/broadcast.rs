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

//! The broadcast adapter contract (spec.md §4.9). A concrete transport
//! (WebSocket, in-process channel, ...) lives outside this workspace; the
//! core only depends on this trait to fan a per-player view to every
//! connected session after a mutation.

use std::collections::BTreeMap;

use async_trait::async_trait;
use data::view::SessionView;
use primitives::{Seat, SessionId};
use utils::outcome::Value as EngineResult;

/// Per-connection metadata the adapter supplies when registering a
/// session, e.g. the seat it is watching or whether it is a spectator.
#[derive(Debug, Clone)]
pub struct SessionInfo {
    pub seat: Option<Seat>,
    pub is_spectator: bool,
}

/// Polymorphic over the capability set {one-to-one send, one-to-many
/// broadcast} described in spec.md §4.9. Implementations are expected to
/// await every send before returning, since the session calls `broadcast`
/// synchronously with respect to the action that triggered it (spec.md
/// §5, "the only asynchrony inside the core is the broadcast fan-out").
#[async_trait]
pub trait BroadcastAdapter: Send + Sync {
    fn add_session(&mut self, id: SessionId, info: SessionInfo);

    fn remove_session(&mut self, id: SessionId);

    fn get_sessions(&self) -> Vec<SessionId>;

    async fn send(&self, session: SessionId, view: &SessionView) -> EngineResult<()>;

    /// Sends `view_for(seat)` to every registered session watching that
    /// seat (and a spectator view to every spectator session). The
    /// default implementation resolves each session's seat and delegates
    /// to `send`; a transport with a genuine multicast primitive may
    /// override this for efficiency.
    async fn broadcast(&self, view_for: &dyn Fn(Option<Seat>) -> SessionView) -> EngineResult<()> {
        for session in self.get_sessions() {
            let view = view_for(self.seat_for(session));
            self.send(session, &view).await?;
        }
        Ok(())
    }

    fn seat_for(&self, session: SessionId) -> Option<Seat>;
}

/// An in-process [BroadcastAdapter] used by tests and by a host that keeps
/// every session in the same process as the game.
#[derive(Default)]
pub struct InProcessBroadcastAdapter {
    sessions: BTreeMap<SessionId, SessionInfo>,
    sent: std::sync::Mutex<Vec<(SessionId, SessionView)>>,
}

#[async_trait]
impl BroadcastAdapter for InProcessBroadcastAdapter {
    fn add_session(&mut self, id: SessionId, info: SessionInfo) {
        self.sessions.insert(id, info);
    }

    fn remove_session(&mut self, id: SessionId) {
        self.sessions.remove(&id);
    }

    fn get_sessions(&self) -> Vec<SessionId> {
        self.sessions.keys().copied().collect()
    }

    fn seat_for(&self, session: SessionId) -> Option<Seat> {
        self.sessions.get(&session).and_then(|info| info.seat)
    }

    async fn send(&self, session: SessionId, view: &SessionView) -> EngineResult<()> {
        self.sent.lock().expect("poisoned lock").push((session, view.clone()));
        Ok(())
    }
}

impl InProcessBroadcastAdapter {
    pub fn sent_to(&self, session: SessionId) -> Vec<SessionView> {
        self.sent
            .lock()
            .expect("poisoned lock")
            .iter()
            .filter(|(id, _)| *id == session)
            .map(|(_, view)| view.clone())
            .collect()
    }
}
