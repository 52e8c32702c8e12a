//! GameCoordinator - joins players, applies their commands, broadcasts.
//!
//! The coordinator is the only place that combines the registry, the
//! session locks and the player channels:
//!
//! 1. `join` seats a connection, sends it `init`, and hands back a [`SeatLease`]
//! 2. `handle` applies a move or restart and, if accepted, broadcasts
//! 3. the lease's `release` frees the seat when the connection ends
//!
//! Both `join` and `handle` run under the session's delivery lock, so every
//! player sees `init` first and then one update per accepted change, in the
//! order the changes were made.

use std::sync::Arc;

use futures::future::join_all;
use thiserror::Error;

use crate::domain::foundation::SessionKey;
use crate::domain::game::GameSnapshot;
use crate::domain::session::SessionError;
use crate::ports::{ChannelError, PlayerHandle, SessionEvent};

use super::registry::{JoinedSeat, SessionRegistry};
use super::seat::{Seat, SeatLease};
use super::session::GameSession;

/// A request from a seated player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerCommand {
    Move { position: i64 },
    Restart,
}

/// Why a connection could not join a game.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JoinError {
    /// No seat was taken.
    #[error(transparent)]
    Seat(#[from] SessionError),

    /// The seat was taken but `init` could not be delivered; it has been
    /// released again.
    #[error("failed to send init: {0}")]
    Welcome(ChannelError),
}

/// Application service shared by every connection handler.
#[derive(Clone)]
pub struct GameCoordinator {
    registry: Arc<SessionRegistry>,
}

impl GameCoordinator {
    pub fn new(registry: Arc<SessionRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Arc<SessionRegistry> {
        &self.registry
    }

    /// Seats `handle` in the session named `key` and sends it `init`.
    ///
    /// Fails with [`JoinError::Seat`] when both marks are taken; in that
    /// case nothing is registered. If `init` cannot be sent the seat is
    /// freed before returning.
    pub async fn join(
        &self,
        key: SessionKey,
        handle: PlayerHandle,
    ) -> Result<SeatLease, JoinError> {
        let JoinedSeat {
            session,
            mark,
            delivery,
        } = self.registry.join(&key, Arc::clone(&handle)).await?;
        let lease = SeatLease::new(
            Seat {
                key: key.clone(),
                session: Arc::clone(&session),
                mark,
            },
            Arc::clone(&self.registry),
        );

        let latest = session.latest().await;
        let sent = handle
            .send(&SessionEvent::Joined {
                mark,
                players_ready: latest.players_ready,
                snapshot: latest.snapshot,
            })
            .await;
        drop(delivery);

        match sent {
            Ok(()) => {
                tracing::info!(game_id = %key, mark = %mark, "Player joined");
                Ok(lease)
            }
            Err(e) => {
                lease.release().await;
                Err(JoinError::Welcome(e))
            }
        }
    }

    /// Applies a command from the player in `seat`.
    ///
    /// Invalid commands are dropped without a reply. An accepted command's
    /// post-change snapshot is broadcast before the next command in this
    /// session is applied. Returns true if the command changed the game.
    pub async fn handle(&self, seat: &Seat, command: PlayerCommand) -> bool {
        let _delivery = seat.session.lock_delivery().await;
        let snapshot = match command {
            PlayerCommand::Move { position } => {
                let outcome = seat.session.apply_move(seat.mark, position).await;
                match outcome.rejection {
                    None => {
                        tracing::debug!(
                            game_id = %seat.key,
                            mark = %seat.mark,
                            position,
                            winner = outcome.snapshot.result.winner_label(),
                            "Move accepted"
                        );
                        Some(outcome.snapshot)
                    }
                    Some(reason) => {
                        tracing::debug!(
                            game_id = %seat.key,
                            mark = %seat.mark,
                            position,
                            %reason,
                            "Move ignored"
                        );
                        None
                    }
                }
            }
            PlayerCommand::Restart => {
                let restarted = seat.session.apply_restart().await;
                tracing::debug!(
                    game_id = %seat.key,
                    mark = %seat.mark,
                    restarted = restarted.is_some(),
                    "Restart requested"
                );
                restarted
            }
        };

        match snapshot {
            Some(snapshot) => {
                self.broadcast(&seat.session, snapshot).await;
                true
            }
            None => false,
        }
    }

    /// Sends `snapshot` to every seated player.
    ///
    /// Sends run concurrently, each bounded by its channel's write deadline.
    /// A failed send is logged and skipped; it is never retried and does
    /// not hold up the other player. Callers hold the delivery lock.
    async fn broadcast(&self, session: &GameSession, snapshot: GameSnapshot) {
        let recipients = session.recipients().await;
        let event = SessionEvent::Updated(snapshot);
        let event = &event;
        let key = session.key();
        join_all(recipients.iter().map(|(mark, handle)| async move {
            if let Err(e) = handle.send(event).await {
                tracing::warn!(
                    game_id = %key,
                    mark = %mark,
                    connection_id = %handle.connection_id(),
                    error = %e,
                    "Failed to deliver update, skipping peer"
                );
            }
        }))
        .await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::RecordingChannel;
    use crate::domain::game::{GameResult, Mark};
    use crate::ports::PlayerChannel;
    use async_trait::async_trait;
    use std::time::Duration;
    use tokio::sync::Notify;

    fn coordinator() -> GameCoordinator {
        GameCoordinator::new(Arc::new(SessionRegistry::new()))
    }

    fn key() -> SessionKey {
        SessionKey::new("g1").unwrap()
    }

    /// Channel whose sends park until released, to hold a broadcast open.
    struct GatedChannel {
        inner: Arc<RecordingChannel>,
        gate: Notify,
    }

    #[async_trait]
    impl PlayerChannel for GatedChannel {
        fn connection_id(&self) -> crate::domain::foundation::ConnectionId {
            self.inner.connection_id()
        }

        async fn send(&self, event: &SessionEvent) -> Result<(), ChannelError> {
            if matches!(event, SessionEvent::Updated(_)) {
                self.gate.notified().await;
            }
            self.inner.send(event).await
        }

        async fn probe(&self) -> Result<(), ChannelError> {
            self.inner.probe().await
        }
    }

    #[tokio::test]
    async fn join_sends_init_with_mark_and_ready_count() {
        let coordinator = coordinator();
        let channel = RecordingChannel::new();

        let _lease = coordinator.join(key(), channel.clone()).await.unwrap();

        assert_eq!(
            channel.events(),
            vec![SessionEvent::Joined {
                mark: Mark::O,
                players_ready: 1,
                snapshot: GameSnapshot::initial(),
            }]
        );
    }

    #[tokio::test]
    async fn join_frees_seat_when_init_fails() {
        let coordinator = coordinator();

        let result = coordinator.join(key(), RecordingChannel::failing()).await;

        assert!(matches!(
            result,
            Err(JoinError::Welcome(ChannelError::Closed))
        ));
        assert!(coordinator.registry().is_empty().await);
    }

    #[tokio::test]
    async fn third_join_is_refused_without_init() {
        let coordinator = coordinator();
        let _o = coordinator.join(key(), RecordingChannel::new()).await.unwrap();
        let _x = coordinator.join(key(), RecordingChannel::new()).await.unwrap();
        let third = RecordingChannel::new();

        let result = coordinator.join(key(), third.clone()).await;

        assert!(matches!(result, Err(JoinError::Seat(SessionError::Full))));
        assert!(third.events().is_empty());
    }

    #[tokio::test]
    async fn accepted_move_reaches_both_players() {
        let coordinator = coordinator();
        let o = RecordingChannel::new();
        let x = RecordingChannel::new();
        let o_lease = coordinator.join(key(), o.clone()).await.unwrap();
        let _x_lease = coordinator.join(key(), x.clone()).await.unwrap();

        assert!(
            coordinator
                .handle(o_lease.seat(), PlayerCommand::Move { position: 4 })
                .await
        );

        assert_eq!(o.updates().len(), 1);
        assert_eq!(x.updates(), o.updates());
        assert_eq!(o.updates()[0].turn, Mark::X);
    }

    #[tokio::test]
    async fn rejected_move_broadcasts_nothing() {
        let coordinator = coordinator();
        let o = RecordingChannel::new();
        let x = RecordingChannel::new();
        let _o_lease = coordinator.join(key(), o.clone()).await.unwrap();
        let x_lease = coordinator.join(key(), x.clone()).await.unwrap();

        assert!(
            !coordinator
                .handle(x_lease.seat(), PlayerCommand::Move { position: 4 })
                .await
        );

        assert!(o.updates().is_empty());
        assert!(x.updates().is_empty());
    }

    #[tokio::test]
    async fn failing_peer_does_not_block_the_other() {
        let coordinator = coordinator();
        let o = RecordingChannel::new();
        let x = RecordingChannel::new();
        let o_lease = coordinator.join(key(), o.clone()).await.unwrap();
        let _x_lease = coordinator.join(key(), x.clone()).await.unwrap();
        x.set_failing(true);

        coordinator
            .handle(o_lease.seat(), PlayerCommand::Move { position: 0 })
            .await;

        assert_eq!(o.updates().len(), 1);
        assert!(x.updates().is_empty());
    }

    #[tokio::test]
    async fn restart_only_broadcasts_after_game_over() {
        let coordinator = coordinator();
        let o = RecordingChannel::new();
        let o_lease = coordinator.join(key(), o.clone()).await.unwrap();
        let seat = o_lease.seat().clone();

        assert!(!coordinator.handle(&seat, PlayerCommand::Restart).await);
        assert!(o.updates().is_empty());

        // Only O is seated, so drive the draw through the session directly.
        for (mark, position) in [
            (Mark::O, 0),
            (Mark::X, 1),
            (Mark::O, 2),
            (Mark::X, 4),
            (Mark::O, 3),
            (Mark::X, 5),
            (Mark::O, 7),
            (Mark::X, 6),
            (Mark::O, 8),
        ] {
            assert!(seat.session.apply_move(mark, position).await.accepted());
        }
        assert_eq!(seat.session.snapshot().await.result, GameResult::Draw);

        assert!(coordinator.handle(&seat, PlayerCommand::Restart).await);
        assert_eq!(o.updates().last(), Some(&GameSnapshot::initial()));
    }

    #[tokio::test]
    async fn back_to_back_moves_each_broadcast_their_own_snapshot() {
        let coordinator = coordinator();
        let o = RecordingChannel::new();
        let x = RecordingChannel::new();
        let o_lease = coordinator.join(key(), o.clone()).await.unwrap();
        let x_lease = coordinator.join(key(), x.clone()).await.unwrap();

        let first = {
            let coordinator = coordinator.clone();
            let seat = o_lease.seat().clone();
            tokio::spawn(async move {
                coordinator
                    .handle(&seat, PlayerCommand::Move { position: 0 })
                    .await
            })
        };
        let second = {
            let coordinator = coordinator.clone();
            let seat = x_lease.seat().clone();
            tokio::spawn(async move {
                // Retry until O's move has landed and it is X's turn.
                loop {
                    if coordinator
                        .handle(&seat, PlayerCommand::Move { position: 3 })
                        .await
                    {
                        break;
                    }
                    tokio::task::yield_now().await;
                }
            })
        };
        assert!(first.await.unwrap());
        second.await.unwrap();

        let updates = x.updates();
        assert_eq!(updates.len(), 2);
        assert_eq!(updates[0].board.cells()[0], Some(Mark::O));
        assert_eq!(updates[0].board.cells()[3], None);
        assert_eq!(updates[1].board.cells()[3], Some(Mark::X));
        assert_eq!(o.updates(), updates);
    }

    #[tokio::test]
    async fn newcomer_gets_init_before_an_in_flight_update() {
        let coordinator = coordinator();
        let o_inner = RecordingChannel::new();
        let o = Arc::new(GatedChannel {
            inner: o_inner.clone(),
            gate: Notify::new(),
        });
        let o_lease = coordinator.join(key(), o.clone()).await.unwrap();

        // O's broadcast parks on O's own channel while holding delivery.
        let moving = {
            let coordinator = coordinator.clone();
            let seat = o_lease.seat().clone();
            tokio::spawn(async move {
                coordinator
                    .handle(&seat, PlayerCommand::Move { position: 4 })
                    .await
            })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;

        let x = RecordingChannel::new();
        let joining = {
            let coordinator = coordinator.clone();
            let x = x.clone();
            tokio::spawn(async move { coordinator.join(key(), x).await })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(x.events().is_empty());

        o.gate.notify_one();
        assert!(moving.await.unwrap());
        let _x_lease = joining.await.unwrap().unwrap();

        match x.events().as_slice() {
            [SessionEvent::Joined { mark, snapshot, .. }] => {
                assert_eq!(*mark, Mark::X);
                assert_eq!(snapshot.turn, Mark::X);
            }
            other => panic!("expected only init, got {:?}", other),
        }
        assert_eq!(o_inner.updates().len(), 1);
    }
}
