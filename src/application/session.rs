//! Shared, lock-guarded game session.
//!
//! Wraps the domain [`SessionState`] in an exclusive lock so that both
//! players' moves land in a single order. Every method takes the lock only
//! for the duration of the state change and never across network I/O.

use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::domain::foundation::SessionKey;
use crate::domain::game::{GameSnapshot, Mark};
use crate::domain::session::{MoveOutcome, SessionError, SessionState};
use crate::ports::PlayerHandle;

/// Everything a delivery needs, read in one critical section.
pub struct LatestState {
    pub snapshot: GameSnapshot,
    pub players_ready: usize,
    pub recipients: Vec<(Mark, PlayerHandle)>,
}

/// One game shared by its two connection handlers.
///
/// Two locks, always taken in this order when both are needed:
/// `delivery` (one mutation-and-broadcast at a time, held across sends)
/// then `state` (never held across an `.await` on I/O).
pub struct GameSession {
    key: SessionKey,
    state: Mutex<SessionState<PlayerHandle>>,
    delivery: Arc<Mutex<()>>,
}

impl GameSession {
    /// A fresh game for `key`.
    pub fn new(key: SessionKey) -> Self {
        Self {
            key,
            state: Mutex::new(SessionState::new()),
            delivery: Arc::new(Mutex::new(())),
        }
    }

    pub fn key(&self) -> &SessionKey {
        &self.key
    }

    /// Seats a player on the first free mark.
    pub async fn attach(&self, handle: PlayerHandle) -> Result<Mark, SessionError> {
        self.state.lock().await.attach(handle)
    }

    /// Frees `mark`'s seat. The caller releases the session afterwards.
    pub async fn detach(&self, mark: Mark) -> Option<PlayerHandle> {
        self.state.lock().await.detach(mark)
    }

    /// Applies a move under the lock.
    pub async fn apply_move(&self, mark: Mark, position: i64) -> MoveOutcome {
        self.state.lock().await.apply_move(mark, position)
    }

    /// Restarts a finished game under the lock; `None` while in progress.
    pub async fn apply_restart(&self) -> Option<GameSnapshot> {
        self.state.lock().await.apply_restart()
    }

    /// Copy of (board, turn, result) safe to use after the lock is gone.
    pub async fn snapshot(&self) -> GameSnapshot {
        self.state.lock().await.snapshot()
    }

    /// Number of attached connections.
    pub async fn ready_count(&self) -> usize {
        self.state.lock().await.ready_count()
    }

    /// Snapshot, ready count and recipients taken together.
    pub async fn latest(&self) -> LatestState {
        let state = self.state.lock().await;
        LatestState {
            snapshot: state.snapshot(),
            players_ready: state.ready_count(),
            recipients: state.recipients(),
        }
    }

    /// Handles of everyone currently seated, in seating order.
    pub async fn recipients(&self) -> Vec<(Mark, PlayerHandle)> {
        self.state.lock().await.recipients()
    }

    /// Serializes outbound delivery: whoever holds it mutates and sends
    /// before the next holder does.
    pub(crate) async fn lock_delivery(&self) -> OwnedMutexGuard<()> {
        Arc::clone(&self.delivery).lock_owned().await
    }

    /// Retires the session if nobody is seated. Returns true if retired.
    pub(crate) async fn retire_if_empty(&self) -> bool {
        let mut state = self.state.lock().await;
        if state.ready_count() == 0 {
            state.retire();
            true
        } else {
            false
        }
    }

    /// Returns true once the registry has dropped this session.
    pub async fn is_retired(&self) -> bool {
        self.state.lock().await.is_retired()
    }
}
