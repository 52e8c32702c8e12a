//! Periodic liveness probes for an open connection.
//!
//! The keep-alive task only writes pings. It never decides that a peer is
//! dead: the receive loop's read deadline does that, and a peer that answers
//! pings with pongs keeps resetting it.

use std::time::Duration;

use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::{CancellationToken, DropGuard};

use crate::ports::PlayerHandle;

/// Why the keep-alive loop stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeepaliveExit {
    /// The owning connection ended.
    Cancelled,
    /// A probe could not be written.
    ProbeFailed,
}

/// Sends a probe every `period` until cancelled or a probe fails.
///
/// The first probe goes out one full period after the call. Cancellation
/// also abandons a probe that is still waiting on the socket.
pub async fn run_keepalive(
    channel: PlayerHandle,
    period: Duration,
    cancel: CancellationToken,
) -> KeepaliveExit {
    let mut ticker = time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            () = cancel.cancelled() => return KeepaliveExit::Cancelled,
            _ = ticker.tick() => {
                let probed = tokio::select! {
                    () = cancel.cancelled() => return KeepaliveExit::Cancelled,
                    probed = channel.probe() => probed,
                };
                if let Err(e) = probed {
                    tracing::debug!(
                        connection_id = %channel.connection_id(),
                        error = %e,
                        "Keep-alive probe failed, stopping keep-alive"
                    );
                    return KeepaliveExit::ProbeFailed;
                }
            }
        }
    }
}

/// Spawns [`run_keepalive`] and returns a guard that stops it when dropped.
pub fn spawn_keepalive(channel: PlayerHandle, period: Duration) -> DropGuard {
    let cancel = CancellationToken::new();
    tokio::spawn(run_keepalive(channel, period, cancel.clone()));
    cancel.drop_guard()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::RecordingChannel;
    use crate::adapters::websocket::channel::WebSocketChannel;
    use crate::domain::foundation::ConnectionId;
    use axum::extract::ws::Message;
    use futures::channel::mpsc;
    use std::sync::Arc;

    #[tokio::test]
    async fn stops_when_cancelled() {
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(run_keepalive(
            RecordingChannel::new(),
            Duration::from_secs(100),
            cancel.clone(),
        ));

        cancel.cancel();
        assert_eq!(handle.await.unwrap(), KeepaliveExit::Cancelled);
    }

    #[tokio::test]
    async fn stops_after_first_failed_probe() {
        let channel = RecordingChannel::failing();
        let exit = run_keepalive(
            channel.clone(),
            Duration::from_millis(5),
            CancellationToken::new(),
        )
        .await;

        assert_eq!(exit, KeepaliveExit::ProbeFailed);
        assert_eq!(channel.probe_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_abandons_a_stalled_probe() {
        // Nobody reads and the buffer holds one frame, so the second ping
        // blocks until the hour-long write deadline.
        let (tx, _rx) = mpsc::channel::<Message>(0);
        let channel = Arc::new(WebSocketChannel::new(
            ConnectionId::new(),
            tx,
            Duration::from_secs(3600),
        ));
        let cancel = CancellationToken::new();
        let task = tokio::spawn(run_keepalive(
            channel,
            Duration::from_secs(30),
            cancel.clone(),
        ));

        time::sleep(Duration::from_secs(61)).await;
        cancel.cancel();

        assert_eq!(task.await.unwrap(), KeepaliveExit::Cancelled);
    }

    #[tokio::test(start_paused = true)]
    async fn probes_once_per_period() {
        let channel = RecordingChannel::new();
        let guard = spawn_keepalive(channel.clone(), Duration::from_secs(30));

        time::sleep(Duration::from_secs(95)).await;
        assert_eq!(channel.probe_count(), 3);

        drop(guard);
        time::sleep(Duration::from_secs(60)).await;
        assert_eq!(channel.probe_count(), 3);
    }
}
