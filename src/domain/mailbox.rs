//! Per-subscriber outbound queue.
//!
//! A mailbox decouples whoever mutates the store from the pace at which a
//! subscriber's socket drains. It is a strict FIFO over an unbounded
//! [`tokio::sync::mpsc`] channel:
//!
//! - [`MailboxSender::put`] never blocks and never drops a frame while the
//!   consumer is alive.
//! - [`Mailbox::get`] suspends until a frame is available.
//!
//! ```text
//!   publish ──► MailboxSender ──► [ frame | frame | frame ] ──► Mailbox::get ──► socket
//!   (many producers, clonable)                                  (one owner: the session)
//! ```
//!
//! There is no capacity bound. The backlog is counted so a stalled consumer
//! can be spotted in the logs once it crosses the configured warning depth.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::mpsc;

/// One serialized outbound message.
pub type Frame = Arc<str>;

/// Creates a connected sender/receiver pair.
///
/// `warn_depth` is the backlog size at which a warning is logged; `0`
/// disables the warning.
#[must_use]
pub fn mailbox(warn_depth: usize) -> (MailboxSender, Mailbox) {
    let (tx, rx) = mpsc::unbounded_channel();
    let depth = Arc::new(AtomicUsize::new(0));
    (
        MailboxSender {
            tx,
            depth: Arc::clone(&depth),
            warn_depth,
        },
        Mailbox { rx, depth },
    )
}

/// Producer half. Cheap to clone; held by the broadcaster's live set.
#[derive(Debug, Clone)]
pub struct MailboxSender {
    tx: mpsc::UnboundedSender<Frame>,
    depth: Arc<AtomicUsize>,
    warn_depth: usize,
}

impl MailboxSender {
    /// Enqueues a frame without blocking.
    ///
    /// Returns `false` when the owning [`Mailbox`] has been closed or
    /// dropped; the frame is discarded in that case.
    pub fn put(&self, frame: Frame) -> bool {
        // Count first so a racing `get` never decrements below zero.
        let pending = self.depth.fetch_add(1, Ordering::AcqRel).saturating_add(1);
        if self.tx.send(frame).is_err() {
            self.depth.fetch_sub(1, Ordering::AcqRel);
            return false;
        }
        if self.warn_depth > 0 && pending == self.warn_depth {
            tracing::warn!(pending, "subscriber mailbox backlog reached warning depth");
        }
        true
    }
}

/// Consumer half. Exclusively owned by one subscriber session.
#[derive(Debug)]
pub struct Mailbox {
    rx: mpsc::UnboundedReceiver<Frame>,
    depth: Arc<AtomicUsize>,
}

impl Mailbox {
    /// Waits for the next frame.
    ///
    /// Returns `None` once the mailbox is closed and drained, or once every
    /// sender has been dropped.
    pub async fn get(&mut self) -> Option<Frame> {
        let frame = self.rx.recv().await?;
        self.depth.fetch_sub(1, Ordering::AcqRel);
        Some(frame)
    }

    /// Takes a frame if one is ready, without waiting.
    pub fn try_get(&mut self) -> Option<Frame> {
        let frame = self.rx.try_recv().ok()?;
        self.depth.fetch_sub(1, Ordering::AcqRel);
        Some(frame)
    }

    /// Stops accepting new frames. Already queued frames can still be read.
    pub fn close(&mut self) {
        self.rx.close();
    }

    /// Number of frames queued but not yet taken.
    #[must_use]
    pub(crate) fn len(&self) -> usize {
        self.depth.load(Ordering::Acquire)
    }
}
