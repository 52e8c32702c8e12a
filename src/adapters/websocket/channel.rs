//! WebSocket-backed player channel.
//!
//! Owns the outbound half of a split socket. Init messages, broadcasts and
//! keep-alive pings from different tasks all go through the same lock, so
//! frames never interleave, and every write (lock wait included) is bounded
//! by the write deadline.

use std::borrow::Cow;
use std::fmt::Display;
use std::time::Duration;

use async_trait::async_trait;
use axum::extract::ws::{CloseFrame, Message, WebSocket};
use futures::stream::SplitSink;
use futures::{Sink, SinkExt};
use tokio::sync::Mutex;

use crate::domain::foundation::ConnectionId;
use crate::ports::{ChannelError, PlayerChannel, SessionEvent};

use super::messages::ServerMessage;

/// Player channel writing JSON text frames to a WebSocket.
pub struct WebSocketChannel<S = SplitSink<WebSocket, Message>> {
    id: ConnectionId,
    sink: Mutex<S>,
    write_timeout: Duration,
}

impl<S> WebSocketChannel<S>
where
    S: Sink<Message> + Unpin + Send,
    S::Error: Display + Send,
{
    pub fn new(id: ConnectionId, sink: S, write_timeout: Duration) -> Self {
        Self {
            id,
            sink: Mutex::new(sink),
            write_timeout,
        }
    }

    /// Sends a close frame with the given code and reason.
    pub async fn close(
        &self,
        code: u16,
        reason: impl Into<Cow<'static, str>>,
    ) -> Result<(), ChannelError> {
        self.write(Message::Close(Some(CloseFrame {
            code,
            reason: reason.into(),
        })))
        .await
    }

    async fn write(&self, message: Message) -> Result<(), ChannelError> {
        let send = async {
            let mut sink = self.sink.lock().await;
            sink.send(message).await
        };
        match tokio::time::timeout(self.write_timeout, send).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(ChannelError::Transport(e.to_string())),
            Err(_) => Err(ChannelError::Timeout(self.write_timeout)),
        }
    }
}

#[async_trait]
impl<S> PlayerChannel for WebSocketChannel<S>
where
    S: Sink<Message> + Unpin + Send,
    S::Error: Display + Send,
{
    fn connection_id(&self) -> ConnectionId {
        self.id
    }

    async fn send(&self, event: &SessionEvent) -> Result<(), ChannelError> {
        let json = serde_json::to_string(&ServerMessage::from(event))
            .map_err(|e| ChannelError::Serialization(e.to_string()))?;
        self.write(Message::Text(json)).await
    }

    async fn probe(&self) -> Result<(), ChannelError> {
        self.write(Message::Ping(Vec::new())).await
    }
}
