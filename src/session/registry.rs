use super::*;
use crate::SessionId;
use crate::rules::*;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::sync::RwLock;

/// Shared handle to one session's lock.
pub type Shared<R> = Arc<Mutex<Session<R>>>;

/// Owns every live session in the process.
///
/// The top-level map lock is held only to look up, insert, or remove
/// entries and is never held while waiting on a session lock. All
/// mutation of a session happens under that session's own mutex, so
/// unrelated sessions never contend.
pub struct Registry<R: Rules> {
    rules: R,
    sessions: RwLock<HashMap<SessionId, Shared<R>>>,
}

impl<R: Rules + Default> Default for Registry<R> {
    fn default() -> Self {
        Self::new(R::default())
    }
}

impl<R: Rules> Registry<R> {
    pub fn new(rules: R) -> Self {
        Self {
            rules,
            sessions: RwLock::new(HashMap::new()),
        }
    }
    pub fn rules(&self) -> &R {
        &self.rules
    }
    /// Number of live sessions.
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
    pub async fn contains(&self, id: SessionId) -> bool {
        self.sessions.read().await.contains_key(&id)
    }
}

impl<R: Rules> Registry<R> {
    /// Seats the connection in session `id`, creating the session with a
    /// fresh initial state if it does not exist. Returns the assigned slot
    /// and a snapshot of the current state.
    pub async fn join(
        &self,
        id: SessionId,
        connection: Connection,
    ) -> Result<(Slot, R::State), SessionError> {
        loop {
            let found = self.sessions.read().await.get(&id).cloned();
            let existing = match found {
                Some(session) => session,
                None => {
                    // re-checked under the write lock; another join may have created it
                    let mut sessions = self.sessions.write().await;
                    match sessions.get(&id) {
                        Some(session) => session.clone(),
                        None => {
                            let state = self.rules.initial_state();
                            let session = Session::new(id, state.clone(), connection);
                            sessions.insert(id, Arc::new(Mutex::new(session)));
                            log::info!("opened session {}", id);
                            return Ok((Slot::First, state));
                        }
                    }
                }
            };
            let mut session = existing.lock().await;
            // retired sessions are already gone from the map; retry creates a new one
            if session.is_retired() {
                continue;
            }
            return session
                .admit(connection.clone())
                .map(|slot| (slot, session.state().clone()))
                .inspect(|(slot, _)| log::info!("seated {} in session {}", slot, id))
                .inspect_err(|e| log::warn!("refused join to session {}: {}", id, e));
        }
    }

    /// Unseats the connection. Retires and drops the session when it empties.
    /// Leaving a session the connection is not seated in is a no-op.
    pub async fn leave(&self, id: SessionId, connection: &Connection) {
        let Ok(existing) = self.get_state(id).await else {
            return;
        };
        let mut session = existing.lock().await;
        if !session.remove(connection) {
            return;
        }
        log::info!(
            "participant {} left session {}",
            connection.participant(),
            id
        );
        if session.is_empty() {
            session.retire();
            let mut sessions = self.sessions.write().await;
            if sessions
                .get(&id)
                .is_some_and(|current| Arc::ptr_eq(current, &existing))
            {
                sessions.remove(&id);
            }
            log::info!("closed session {}", id);
        }
    }

    /// Current session record. Callers lock it to read or mutate.
    pub async fn get_state(&self, id: SessionId) -> Result<Shared<R>, SessionError> {
        self.sessions
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(SessionError::NotFound(id))
    }

    /// Connections of session `id` in slot order, snapshotted under its lock.
    pub async fn broadcast_targets(&self, id: SessionId) -> Vec<Connection> {
        match self.get_state(id).await {
            Ok(session) => session.lock().await.targets(),
            Err(_) => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> Arc<Registry<ChessRules>> {
        Arc::new(Registry::default())
    }

    #[tokio::test]
    async fn first_join_creates_session() {
        let registry = registry();
        let (a, _) = Connection::pair(1);
        let (slot, state) = registry.join(7, a).await.unwrap();
        assert_eq!(slot, Slot::First);
        assert_eq!(
            registry.rules().serialize(&state),
            registry.rules().serialize(&ChessRules.initial_state())
        );
        assert!(registry.contains(7).await);
    }
    #[tokio::test]
    async fn third_join_is_full() {
        let registry = registry();
        let (a, _) = Connection::pair(1);
        let (b, _) = Connection::pair(2);
        let (c, _) = Connection::pair(3);
        registry.join(7, a).await.unwrap();
        registry.join(7, b).await.unwrap();
        assert_eq!(
            registry.join(7, c).await.unwrap_err(),
            SessionError::SessionFull(7)
        );
        let session = registry.get_state(7).await.unwrap();
        let session = session.lock().await;
        assert_eq!(session.slot_of(1), Some(Slot::First));
        assert_eq!(session.slot_of(2), Some(Slot::Second));
        assert_eq!(session.slot_of(3), None);
    }
    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_joins_split_slots() {
        for id in 0..64 {
            let registry = registry();
            let (a, _ra) = Connection::pair(1);
            let (b, _rb) = Connection::pair(2);
            let ra = registry.clone();
            let rb = registry.clone();
            let ja = tokio::spawn(async move { ra.join(id, a).await });
            let jb = tokio::spawn(async move { rb.join(id, b).await });
            let mut slots = vec![
                ja.await.unwrap().unwrap().0, //
                jb.await.unwrap().unwrap().0,
            ];
            slots.sort();
            assert_eq!(slots, vec![Slot::First, Slot::Second]);
        }
    }
    #[tokio::test]
    async fn joining_existing_session_only_reads_the_map() {
        let registry = registry();
        let (a, _) = Connection::pair(1);
        let (b, _) = Connection::pair(2);
        registry.join(7, a).await.unwrap();
        let held = registry.sessions.read().await;
        let joined =
            tokio::time::timeout(std::time::Duration::from_secs(1), registry.join(7, b)).await;
        drop(held);
        assert_eq!(joined.expect("joined under a shared map lock").unwrap().0, Slot::Second);
    }
    #[tokio::test]
    async fn last_leave_discards_session() {
        let registry = registry();
        let (a, _) = Connection::pair(1);
        let (b, _) = Connection::pair(2);
        registry.join(7, a.clone()).await.unwrap();
        registry.join(7, b.clone()).await.unwrap();
        registry.leave(7, &a).await;
        assert!(registry.contains(7).await);
        registry.leave(7, &b).await;
        assert!(!registry.contains(7).await);
        assert!(registry.get_state(7).await.is_err());
    }
    #[tokio::test]
    async fn leave_is_idempotent() {
        let registry = registry();
        let (a, _) = Connection::pair(1);
        let (b, _) = Connection::pair(2);
        registry.join(7, a.clone()).await.unwrap();
        registry.join(7, b.clone()).await.unwrap();
        registry.leave(7, &a).await;
        registry.leave(7, &a).await;
        registry.leave(8, &a).await;
        assert_eq!(registry.broadcast_targets(7).await.len(), 1);
    }
    #[tokio::test]
    async fn refused_joiner_cannot_evict_holder() {
        let registry = registry();
        let (a, _) = Connection::pair(1);
        let (again, _) = Connection::pair(1);
        registry.join(7, a).await.unwrap();
        assert_eq!(
            registry.join(7, again.clone()).await.unwrap_err(),
            SessionError::Occupied(1)
        );
        registry.leave(7, &again).await;
        assert_eq!(registry.broadcast_targets(7).await.len(), 1);
    }
    #[tokio::test]
    async fn retired_session_is_not_rejoined() {
        let registry = registry();
        let (a, _) = Connection::pair(1);
        registry.join(7, a.clone()).await.unwrap();
        let stale = registry.get_state(7).await.unwrap();
        registry.leave(7, &a).await;
        assert!(stale.lock().await.is_retired());
        let (b, _) = Connection::pair(2);
        assert_eq!(registry.join(7, b).await.unwrap().0, Slot::First);
        let fresh = registry.get_state(7).await.unwrap();
        assert!(!Arc::ptr_eq(&stale, &fresh));
    }
    #[tokio::test]
    async fn targets_follow_slot_order() {
        let registry = registry();
        let (a, _) = Connection::pair(1);
        let (b, _) = Connection::pair(2);
        registry.join(7, a).await.unwrap();
        registry.join(7, b).await.unwrap();
        let order = registry
            .broadcast_targets(7)
            .await
            .iter()
            .map(Connection::participant)
            .collect::<Vec<_>>();
        assert_eq!(order, vec![1, 2]);
        assert!(registry.broadcast_targets(8).await.is_empty());
    }
}
