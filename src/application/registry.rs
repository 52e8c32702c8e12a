//! Process-wide directory of live game sessions.
//!
//! Maps session keys to sessions behind one lock that only guards the map.
//! Sessions appear on the first connection to an unknown key and disappear
//! when their last player leaves.
//!
//! # Lock order
//!
//! ```text
//! registry lock ──▶ session lock      (release: check emptiness, then remove)
//! session lock  ─╳─▶ registry lock    (never)
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::domain::foundation::SessionKey;
use crate::domain::game::Mark;
use crate::domain::session::SessionError;
use crate::ports::PlayerHandle;

use super::seat::Seat;
use super::session::GameSession;

/// A seat just taken by [`SessionRegistry::join`].
///
/// `delivery` is the session's delivery lock, still held so the caller can
/// greet the new player before any update reaches it. Dropping it lets
/// broadcasts resume.
pub struct JoinedSeat {
    pub session: Arc<GameSession>,
    pub mark: Mark,
    pub delivery: OwnedMutexGuard<()>,
}

/// Directory of live sessions, constructed once at startup and shared.
#[derive(Default)]
pub struct SessionRegistry {
    sessions: Mutex<HashMap<SessionKey, Arc<GameSession>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the live session for `key`, creating it if there is none.
    pub async fn get_or_create(&self, key: &SessionKey) -> Arc<GameSession> {
        let mut sessions = self.sessions.lock().await;
        let session = sessions.entry(key.clone()).or_insert_with(|| {
            tracing::debug!(game_id = %key, "Creating game session");
            Arc::new(GameSession::new(key.clone()))
        });
        Arc::clone(session)
    }

    /// Removes `key` if it still maps to `session` and nobody is seated.
    ///
    /// A session someone re-joined in the meantime stays. Returns true if the
    /// session was removed.
    pub async fn release(&self, key: &SessionKey, session: &Arc<GameSession>) -> bool {
        let mut sessions = self.sessions.lock().await;
        let is_current = sessions
            .get(key)
            .is_some_and(|current| Arc::ptr_eq(current, session));
        if !is_current || !session.retire_if_empty().await {
            return false;
        }
        sessions.remove(key);
        tracing::debug!(game_id = %key, "Game session removed");
        true
    }

    /// Finds or creates the session for `key` and seats `handle` in it.
    ///
    /// The session's delivery lock is taken before seating and handed back
    /// in the [`JoinedSeat`]. If a concurrent [`release`](Self::release)
    /// retired the session between lookup and seating, the lookup is
    /// repeated and a fresh session is used.
    pub async fn join(
        &self,
        key: &SessionKey,
        handle: PlayerHandle,
    ) -> Result<JoinedSeat, SessionError> {
        loop {
            let session = self.get_or_create(key).await;
            let delivery = session.lock_delivery().await;
            match session.attach(Arc::clone(&handle)).await {
                Ok(mark) => {
                    return Ok(JoinedSeat {
                        session,
                        mark,
                        delivery,
                    })
                }
                Err(SessionError::Retired) => continue,
                Err(err) => return Err(err),
            }
        }
    }

    /// Frees the seat and drops the session if it is now empty.
    pub async fn leave(&self, seat: &Seat) {
        seat.session.detach(seat.mark).await;
        let removed = self.release(&seat.key, &seat.session).await;
        tracing::debug!(
            game_id = %seat.key,
            mark = %seat.mark,
            session_removed = removed,
            "Player left"
        );
    }

    /// Returns the live session for `key`, if any.
    pub async fn get(&self, key: &SessionKey) -> Option<Arc<GameSession>> {
        self.sessions.lock().await.get(key).cloned()
    }

    /// Returns true if `key` maps to a live session.
    pub async fn contains(&self, key: &SessionKey) -> bool {
        self.sessions.lock().await.contains_key(key)
    }

    /// Number of live sessions.
    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::RecordingChannel;

    fn key(name: &str) -> SessionKey {
        SessionKey::new(name).unwrap()
    }

    async fn seat(registry: &SessionRegistry, name: &str) -> (Arc<GameSession>, Mark) {
        let joined = registry.join(&key(name), RecordingChannel::new()).await.unwrap();
        (joined.session, joined.mark)
    }

    #[tokio::test]
    async fn get_or_create_returns_same_session_for_same_key() {
        let registry = SessionRegistry::new();
        let first = registry.get_or_create(&key("g1")).await;
        let second = registry.get_or_create(&key("g1")).await;

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test]
    async fn different_keys_get_different_sessions() {
        let registry = SessionRegistry::new();
        let a = registry.get_or_create(&key("a")).await;
        let b = registry.get_or_create(&key("b")).await;

        assert!(!Arc::ptr_eq(&a, &b));
        assert_eq!(registry.len().await, 2);
    }

    #[tokio::test]
    async fn join_seats_o_then_x_then_refuses() {
        let registry = SessionRegistry::new();
        let first = registry.join(&key("g1"), RecordingChannel::new()).await.unwrap().mark;
        let second = registry.join(&key("g1"), RecordingChannel::new()).await.unwrap().mark;
        let third = registry.join(&key("g1"), RecordingChannel::new()).await;

        assert_eq!(first, Mark::O);
        assert_eq!(second, Mark::X);
        assert!(matches!(third, Err(SessionError::Full)));
    }

    #[tokio::test]
    async fn release_keeps_occupied_session() {
        let registry = SessionRegistry::new();
        let session = seat(&registry, "g1").await.0;

        assert!(!registry.release(&key("g1"), &session).await);
        assert!(registry.contains(&key("g1")).await);
    }

    #[tokio::test]
    async fn release_removes_empty_session() {
        let registry = SessionRegistry::new();
        let (session, mark) = seat(&registry, "g1").await;
        session.detach(mark).await;

        assert!(registry.release(&key("g1"), &session).await);
        assert!(registry.is_empty().await);
        assert!(session.is_retired().await);
    }

    #[tokio::test]
    async fn release_ignores_stale_session_for_reused_key() {
        let registry = SessionRegistry::new();
        let stale = Arc::new(GameSession::new(key("g1")));
        let live = seat(&registry, "g1").await.0;

        assert!(!registry.release(&key("g1"), &stale).await);
        let current = registry.get(&key("g1")).await.unwrap();
        assert!(Arc::ptr_eq(&current, &live));
    }

    #[tokio::test]
    async fn join_after_release_starts_fresh_session() {
        let registry = SessionRegistry::new();
        let (old, mark) = seat(&registry, "g1").await;
        assert!(old.apply_move(mark, 4).await.accepted());
        old.detach(mark).await;
        registry.release(&key("g1"), &old).await;

        let (fresh, mark) = seat(&registry, "g1").await;
        assert!(!Arc::ptr_eq(&old, &fresh));
        assert_eq!(mark, Mark::O);
        assert!(fresh.snapshot().await.board.cells().iter().all(Option::is_none));
    }
}
