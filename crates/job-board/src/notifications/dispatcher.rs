use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use super::event::NotificationEvent;
use super::inbox::NotificationInbox;

/// Moves events returned by board transitions into the inbox.
///
/// Each event is tried up to `attempts` times. Events the inbox keeps refusing are parked in a
/// pending queue and retried ahead of the next batch, so a transition never fails on delivery and
/// a notification is never silently lost.
pub struct NotificationDispatcher<I> {
    inbox: Arc<I>,
    attempts: u32,
    pending: Mutex<VecDeque<NotificationEvent>>,
}

impl<I> NotificationDispatcher<I>
where
    I: NotificationInbox + 'static,
{
    pub fn new(inbox: Arc<I>, attempts: u32) -> Self {
        Self {
            inbox,
            attempts: attempts.max(1),
            pending: Mutex::new(VecDeque::new()),
        }
    }

    pub fn inbox(&self) -> &Arc<I> {
        &self.inbox
    }

    /// Number of events still waiting for the inbox to accept them.
    pub fn pending(&self) -> usize {
        self.queue().len()
    }

    /// Retries the parked backlog, then delivers `events`. Returns how many reached the inbox.
    pub fn dispatch(&self, events: &[NotificationEvent], now: DateTime<Utc>) -> usize {
        let mut queue = self.queue();
        let mut batch: Vec<NotificationEvent> = queue.drain(..).collect();
        batch.extend(events.iter().cloned());

        let mut delivered = 0;
        for event in batch {
            if self.deliver_one(&event, now) {
                delivered += 1;
            } else {
                queue.push_back(event);
            }
        }
        if !queue.is_empty() {
            warn!(pending = queue.len(), "notifications parked for redelivery");
        }
        delivered
    }

    /// Retries only the parked backlog.
    pub fn redeliver_pending(&self, now: DateTime<Utc>) -> usize {
        self.dispatch(&[], now)
    }

    // A poisoned lock still guards a consistent queue.
    fn queue(&self) -> MutexGuard<'_, VecDeque<NotificationEvent>> {
        self.pending
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn deliver_one(&self, event: &NotificationEvent, now: DateTime<Utc>) -> bool {
        for attempt in 1..=self.attempts {
            match self.inbox.deliver(event, now) {
                Ok(notification) => {
                    debug!(
                        recipient = %event.recipient,
                        kind = ?event.kind,
                        notification = %notification.id,
                        "notification delivered"
                    );
                    return true;
                }
                Err(err) => warn!(
                    recipient = %event.recipient,
                    kind = ?event.kind,
                    attempt,
                    error = %err,
                    "notification delivery failed"
                ),
            }
        }
        false
    }
}
