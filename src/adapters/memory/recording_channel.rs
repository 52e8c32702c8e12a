//! Recording player channel for tests.
//!
//! Implements the `PlayerChannel` port by appending every event to a list,
//! so tests can drive the coordinator without a socket and then inspect
//! exactly what each player would have received.
//!
//! # Example
//!
//! ```ignore
//! use tictactoe_server::adapters::memory::RecordingChannel;
//!
//! let channel = RecordingChannel::new();
//! let seat = coordinator.join(key, channel.clone()).await?;
//! assert_eq!(channel.events().len(), 1); // the join event
//! ```

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::domain::foundation::ConnectionId;
use crate::domain::game::GameSnapshot;
use crate::ports::{ChannelError, PlayerChannel, SessionEvent};

/// Player channel that records instead of sending.
#[derive(Debug, Default)]
pub struct RecordingChannel {
    id: ConnectionId,
    events: Mutex<Vec<SessionEvent>>,
    probes: AtomicUsize,
    failing: AtomicBool,
}

impl RecordingChannel {
    /// Creates a new channel that accepts every send.
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Creates a channel whose sends and probes all fail with `Closed`.
    pub fn failing() -> Arc<Self> {
        let channel = Self::new();
        channel.set_failing(true);
        channel
    }

    /// Makes later sends and probes fail (or succeed again).
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Every event successfully delivered so far.
    pub fn events(&self) -> Vec<SessionEvent> {
        self.events.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Snapshots from `Updated` events only, in order.
    pub fn updates(&self) -> Vec<GameSnapshot> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                SessionEvent::Updated(snapshot) => Some(snapshot),
                SessionEvent::Joined { .. } => None,
            })
            .collect()
    }

    /// Number of successful probes.
    pub fn probe_count(&self) -> usize {
        self.probes.load(Ordering::SeqCst)
    }

    fn check_open(&self) -> Result<(), ChannelError> {
        if self.failing.load(Ordering::SeqCst) {
            Err(ChannelError::Closed)
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl PlayerChannel for RecordingChannel {
    fn connection_id(&self) -> ConnectionId {
        self.id
    }

    async fn send(&self, event: &SessionEvent) -> Result<(), ChannelError> {
        self.check_open()?;
        self.events
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(*event);
        Ok(())
    }

    async fn probe(&self) -> Result<(), ChannelError> {
        self.check_open()?;
        self.probes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
