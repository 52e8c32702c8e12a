//! A connection's claim on one mark in one session.

use std::sync::Arc;

use crate::domain::foundation::SessionKey;
use crate::domain::game::Mark;

use super::registry::SessionRegistry;
use super::session::GameSession;

/// Which session and mark a connection is bound to.
#[derive(Clone)]
pub struct Seat {
    pub key: SessionKey,
    pub session: Arc<GameSession>,
    pub mark: Mark,
}

/// Owner of a seat that frees it exactly once.
///
/// Call [`release`](Self::release) when the connection ends. If the lease is
/// dropped without that (for example because the connection future was
/// cancelled), `Drop` spawns the release on the current runtime.
pub struct SeatLease {
    seat: Seat,
    registry: Arc<SessionRegistry>,
    released: bool,
}

impl SeatLease {
    pub(crate) fn new(seat: Seat, registry: Arc<SessionRegistry>) -> Self {
        Self {
            seat,
            registry,
            released: false,
        }
    }

    pub fn seat(&self) -> &Seat {
        &self.seat
    }

    pub fn mark(&self) -> Mark {
        self.seat.mark
    }

    /// Detaches from the session and lets the registry drop it if empty.
    pub async fn release(mut self) {
        self.released = true;
        self.registry.leave(&self.seat).await;
    }
}

impl Drop for SeatLease {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        let seat = self.seat.clone();
        let registry = Arc::clone(&self.registry);
        match tokio::runtime::Handle::try_current() {
            Ok(runtime) => {
                runtime.spawn(async move {
                    registry.leave(&seat).await;
                });
            }
            Err(_) => {
                tracing::warn!(
                    game_id = %seat.key,
                    mark = %seat.mark,
                    "Seat dropped outside a runtime, not released"
                );
            }
        }
    }
}
