//! Fan-out of change events to every live subscriber.
//!
//! [`Broadcaster`] keeps the set of live sessions, keyed by [`SessionId`],
//! each mapped to the producer half of that session's mailbox. It holds no
//! ownership over the mailboxes themselves: only the owning session closes
//! its mailbox, so a frame that races with a departing session is simply
//! rejected by [`MailboxSender::put`].
//!
//! Join and leave are each a single write-lock step. `publish` iterates under
//! the read lock, so it sees every session either fully present or fully
//! absent.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use super::mailbox::{Frame, MailboxSender};
use super::store::ChangeHook;
use super::{ChangeEvent, SessionId};

/// Live-subscriber set. Clones share the same set.
#[derive(Debug, Clone, Default)]
pub struct Broadcaster {
    sessions: Arc<RwLock<HashMap<SessionId, MailboxSender>>>,
}

impl Broadcaster {
    /// Creates a broadcaster with no live sessions.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a session to the live set.
    ///
    /// Events published from now on are queued into `mailbox`.
    pub fn join(&self, session_id: SessionId, mailbox: MailboxSender) {
        self.sessions.write().insert(session_id, mailbox);
        tracing::debug!(%session_id, "session joined broadcaster");
    }

    /// Removes a session from the live set.
    ///
    /// Idempotent: returns `false` if the session was already gone.
    pub fn leave(&self, session_id: SessionId) -> bool {
        let removed = self.sessions.write().remove(&session_id).is_some();
        if removed {
            tracing::debug!(%session_id, "session left broadcaster");
        }
        removed
    }

    /// Serializes `event` once and queues it into every live mailbox.
    ///
    /// Returns the number of mailboxes that accepted the frame.
    pub fn publish(&self, event: &ChangeEvent) -> usize {
        match event.to_frame() {
            Ok(frame) => self.publish_frame(Arc::from(frame)),
            Err(e) => {
                tracing::error!(entity = %event.entity, error = %e, "failed to encode change event");
                0
            }
        }
    }

    /// Queues an already encoded frame into every live mailbox.
    ///
    /// Returns the number of mailboxes that accepted the frame.
    pub fn publish_frame(&self, frame: Frame) -> usize {
        let sessions = self.sessions.read();
        let mut delivered = 0;
        for (session_id, mailbox) in sessions.iter() {
            if mailbox.put(Arc::clone(&frame)) {
                delivered += 1;
            } else {
                tracing::debug!(%session_id, "mailbox closed; skipping late delivery");
            }
        }
        delivered
    }

    /// Returns the number of live sessions.
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.sessions.read().len()
    }
}

impl ChangeHook for Broadcaster {
    fn on_change(&self, event: &ChangeEvent) {
        let delivered = self.publish(event);
        tracing::trace!(entity = %event.entity, delivered, "change broadcast");
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::mailbox::{Mailbox, mailbox};
    use crate::domain::{EntityId, EntityRecord};
    use serde_json::json;

    fn event(entity: &str, value: serde_json::Value) -> ChangeEvent {
        let serde_json::Value::Object(record) = value else {
            panic!("expected object");
        };
        ChangeEvent::new(EntityId::from(entity), record)
    }

    fn drain(rx: &mut Mailbox) -> Vec<serde_json::Value> {
        let mut out = Vec::new();
        while let Some(frame) = rx.try_get() {
            let Ok(value) = serde_json::from_str(&frame) else {
                panic!("frame is not JSON");
            };
            out.push(value);
        }
        out
    }

    #[test]
    fn publish_without_sessions_delivers_nothing() {
        let bus = Broadcaster::new();
        assert_eq!(bus.publish(&event("e", json!({}))), 0);
    }

    #[test]
    fn every_live_session_receives_each_event() {
        let bus = Broadcaster::new();
        let mut receivers = Vec::new();
        for _ in 0..3 {
            let (tx, rx) = mailbox(0);
            bus.join(SessionId::new(), tx);
            receivers.push(rx);
        }

        let delivered = bus.publish(&event("sprite1", json!({"x": 1, "y": 2})));
        assert_eq!(delivered, 3);
        for rx in &mut receivers {
            assert_eq!(drain(rx), vec![json!({"sprite1": {"x": 1, "y": 2}})]);
        }
    }

    #[test]
    fn order_across_entities_is_preserved() {
        let bus = Broadcaster::new();
        let (tx, mut rx) = mailbox(0);
        bus.join(SessionId::new(), tx);

        bus.publish(&event("a", json!({"n": 1})));
        bus.publish(&event("b", json!({"n": 2})));
        bus.publish(&event("a", json!({"n": 3})));

        assert_eq!(
            drain(&mut rx),
            vec![
                json!({"a": {"n": 1}}),
                json!({"b": {"n": 2}}),
                json!({"a": {"n": 3}}),
            ]
        );
    }

    #[test]
    fn leave_is_idempotent() {
        let bus = Broadcaster::new();
        let id = SessionId::new();
        let (tx, _rx) = mailbox(0);
        bus.join(id, tx);
        assert_eq!(bus.live_count(), 1);

        assert!(bus.leave(id));
        assert!(!bus.leave(id));
        assert_eq!(bus.live_count(), 0);
    }

    #[test]
    fn departed_session_stops_receiving_while_others_continue() {
        let bus = Broadcaster::new();
        let a = SessionId::new();
        let (tx_a, mut rx_a) = mailbox(0);
        let (tx_b, mut rx_b) = mailbox(0);
        bus.join(a, tx_a);
        bus.join(SessionId::new(), tx_b);

        bus.leave(a);
        assert_eq!(bus.publish(&event("e", json!({"v": 1}))), 1);
        assert!(drain(&mut rx_a).is_empty());
        assert_eq!(drain(&mut rx_b).len(), 1);
    }

    #[test]
    fn closed_mailbox_still_in_set_is_skipped() {
        let bus = Broadcaster::new();
        let (tx_a, mut rx_a) = mailbox(0);
        let (tx_b, mut rx_b) = mailbox(0);
        bus.join(SessionId::new(), tx_a);
        bus.join(SessionId::new(), tx_b);

        rx_a.close();
        assert_eq!(bus.publish(&event("e", json!({}))), 1);
        assert_eq!(drain(&mut rx_b), vec![json!({"e": {}})]);
    }

    #[test]
    fn acts_as_store_hook() {
        let bus = Broadcaster::new();
        let (tx, mut rx) = mailbox(0);
        bus.join(SessionId::new(), tx);

        let hook: &dyn ChangeHook = &bus;
        hook.on_change(&ChangeEvent::new(EntityId::from("h"), EntityRecord::new()));
        assert_eq!(drain(&mut rx), vec![json!({"h": {}})]);
    }
}
