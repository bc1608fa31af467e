//! Subscriber session state machine.
//!
//! Each accepted WebSocket connection becomes one session:
//!
//! ```text
//!   Connecting ──join──► Active ──either loop ends──► Closing ──leave + join tasks──► Closed
//! ```
//!
//! While `Active`, two tasks run independently:
//!
//! - **inbound**: reads frames from the client and applies them to the
//!   store with `set`, which fans the change back out to every session,
//!   this one included;
//! - **outbound**: drains the session's [`Mailbox`] into the socket.
//!
//! The first task to finish decides the [`CloseReason`]. The other one is
//! aborted, the session leaves the broadcaster, and both task handles are
//! awaited before the session counts as closed.

use std::fmt;
use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use futures_util::{Sink, SinkExt, Stream, StreamExt};
use tokio::task::JoinError;

use super::frame::parse_edit_frame;
use crate::app_state::AppState;
use crate::domain::{Frame, Mailbox, SessionId, WorldStore, mailbox};

/// Lifecycle states of a session. Transitions only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SessionState {
    /// Upgrade accepted, not yet in the live set.
    Connecting,
    /// In the live set with both loops running.
    Active,
    /// One loop has ended; tearing down.
    Closing,
    /// Out of the live set with both loops stopped.
    Closed,
}

/// Why a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    /// Client sent a close frame or the stream ended.
    PeerClosed,
    /// Reading from the socket failed.
    ReadError,
    /// Writing to the socket failed.
    WriteError,
    /// Every producer of the mailbox went away.
    MailboxClosed,
    /// A loop task panicked or was cancelled.
    TaskFailed,
}

impl fmt::Display for CloseReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::PeerClosed => "peer_closed",
            Self::ReadError => "read_error",
            Self::WriteError => "write_error",
            Self::MailboxClosed => "mailbox_closed",
            Self::TaskFailed => "task_failed",
        };
        f.write_str(s)
    }
}

impl CloseReason {
    fn from_join(result: Result<Self, JoinError>) -> Self {
        result.unwrap_or_else(|e| {
            tracing::error!(error = %e, "session loop task failed");
            Self::TaskFailed
        })
    }
}

/// Tracks and logs the state of one session.
#[derive(Debug)]
pub struct Lifecycle {
    id: SessionId,
    state: SessionState,
}

impl Lifecycle {
    /// Starts a new session in [`SessionState::Connecting`].
    #[must_use]
    pub fn new(id: SessionId) -> Self {
        Self {
            id,
            state: SessionState::Connecting,
        }
    }

    /// Session handle.
    #[must_use]
    pub const fn id(&self) -> SessionId {
        self.id
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> SessionState {
        self.state
    }

    /// Moves to `next` if it lies ahead of the current state.
    ///
    /// Returns `false` and leaves the state untouched otherwise.
    pub fn advance(&mut self, next: SessionState) -> bool {
        if next <= self.state {
            return false;
        }
        tracing::debug!(session_id = %self.id, from = ?self.state, to = ?next, "session state");
        self.state = next;
        true
    }
}

enum Finished {
    Inbound(Result<CloseReason, JoinError>),
    Outbound(Result<CloseReason, JoinError>),
}

/// Runs one subscriber session over an upgraded WebSocket until it closes.
pub async fn run_session(socket: WebSocket, state: AppState) {
    let (ws_tx, ws_rx) = socket.split();
    drive_session(ws_rx, ws_tx, state).await;
}

/// Runs the session state machine over any message stream and sink.
///
/// Returns the reason the session ended.
pub async fn drive_session<R, W, E>(reader: R, writer: W, state: AppState) -> CloseReason
where
    R: Stream<Item = Result<Message, E>> + Send + Unpin + 'static,
    E: fmt::Display + Send + 'static,
    W: Sink<Message> + Send + Unpin + 'static,
    W::Error: fmt::Display,
{
    let mut lifecycle = Lifecycle::new(SessionId::new());
    let session_id = lifecycle.id();
    let (sender, inbox) = mailbox(state.config.mailbox_warn_depth);

    state.broadcaster.join(session_id, sender.clone());
    if state.config.snapshot_on_connect && !state.store.catch_up(&sender).await {
        tracing::warn!(%session_id, "could not queue world snapshot");
    }
    // The broadcaster now holds the only producer handle.
    drop(sender);
    lifecycle.advance(SessionState::Active);
    tracing::info!(%session_id, live = state.broadcaster.live_count(), "subscriber connected");

    let mut inbound = tokio::spawn(inbound_loop(session_id, reader, Arc::clone(&state.store)));
    let mut outbound = tokio::spawn(outbound_loop(session_id, writer, inbox));

    let finished = tokio::select! {
        res = &mut inbound => Finished::Inbound(res),
        res = &mut outbound => Finished::Outbound(res),
    };
    let (reason, remaining) = match finished {
        Finished::Inbound(res) => (CloseReason::from_join(res), outbound),
        Finished::Outbound(res) => (CloseReason::from_join(res), inbound),
    };
    lifecycle.advance(SessionState::Closing);

    state.broadcaster.leave(session_id);
    remaining.abort();
    // Cancellation is the expected outcome here.
    let _ = remaining.await;

    lifecycle.advance(SessionState::Closed);
    tracing::info!(
        %session_id,
        %reason,
        live = state.broadcaster.live_count(),
        "subscriber disconnected"
    );
    reason
}

/// Reads client frames and applies each valid one to the store.
///
/// Malformed frames are logged and skipped; the session stays open.
pub async fn inbound_loop<R, E>(
    session_id: SessionId,
    mut reader: R,
    store: Arc<WorldStore>,
) -> CloseReason
where
    R: Stream<Item = Result<Message, E>> + Unpin,
    E: fmt::Display,
{
    while let Some(msg) = reader.next().await {
        match msg {
            Ok(Message::Text(text)) => apply_frame(session_id, &store, text.as_str()).await,
            Ok(Message::Close(_)) => return CloseReason::PeerClosed,
            Ok(Message::Binary(_)) => {
                tracing::debug!(%session_id, "ignoring binary frame");
            }
            Ok(_) => {}
            Err(e) => {
                tracing::debug!(%session_id, error = %e, "ws read failed");
                return CloseReason::ReadError;
            }
        }
    }
    CloseReason::PeerClosed
}

async fn apply_frame(session_id: SessionId, store: &WorldStore, text: &str) {
    match parse_edit_frame(text) {
        Ok(batch) if batch.is_empty() => {
            tracing::debug!(%session_id, "empty edit frame");
        }
        Ok(batch) => {
            tracing::debug!(%session_id, entities = batch.len(), "ws edit");
            store.set_many(batch).await;
        }
        Err(e) => {
            tracing::warn!(%session_id, error = %e, "dropping malformed frame");
        }
    }
}

/// Writes every mailbox frame to the socket, in order.
///
/// Frames already queued behind the first one are fed as a batch and
/// flushed together. On a write failure the mailbox is closed, so late
/// publishes are rejected, and the undelivered backlog is dropped.
pub async fn outbound_loop<W>(
    session_id: SessionId,
    mut writer: W,
    mut inbox: Mailbox,
) -> CloseReason
where
    W: Sink<Message> + Unpin,
    W::Error: fmt::Display,
{
    while let Some(frame) = inbox.get().await {
        match write_batch(&mut writer, &mut inbox, &frame).await {
            Ok(written) => tracing::trace!(%session_id, written, "ws frames flushed"),
            Err(e) => {
                inbox.close();
                tracing::debug!(
                    %session_id,
                    error = %e,
                    dropped = inbox.len(),
                    "ws write failed"
                );
                return CloseReason::WriteError;
            }
        }
    }
    if let Err(e) = writer.send(Message::Close(None)).await {
        tracing::debug!(%session_id, error = %e, "ws close failed");
    }
    CloseReason::MailboxClosed
}

async fn write_batch<W>(
    writer: &mut W,
    inbox: &mut Mailbox,
    first: &Frame,
) -> Result<usize, W::Error>
where
    W: Sink<Message> + Unpin,
{
    writer.feed(Message::text(String::from(&**first))).await?;
    let mut written = 1;
    while let Some(frame) = inbox.try_get() {
        writer.feed(Message::text(String::from(&*frame))).await?;
        written += 1;
    }
    writer.flush().await?;
    Ok(written)
}
