use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::event::{NotificationEvent, NotificationKind, NotificationPayload};
use crate::accounts::PrincipalId;
use crate::board::{BoardError, RepositoryError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NotificationId(pub u64);

impl fmt::Display for NotificationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "notification-{}", self.0)
    }
}

/// A delivered event as the recipient sees it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: NotificationId,
    pub recipient: PrincipalId,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub payload: NotificationPayload,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

/// Delivery-side collaborator. Listings are newest first and always scoped to one recipient.
pub trait NotificationInbox: Send + Sync {
    fn deliver(
        &self,
        event: &NotificationEvent,
        now: DateTime<Utc>,
    ) -> Result<Notification, InboxError>;
    fn list(&self, recipient: PrincipalId) -> Result<Vec<Notification>, InboxError>;
    fn list_unread(&self, recipient: PrincipalId) -> Result<Vec<Notification>, InboxError>;
    /// Marking another principal's notification reports `NotFound`.
    fn mark_read(
        &self,
        recipient: PrincipalId,
        id: NotificationId,
    ) -> Result<Notification, InboxError>;
    /// Returns how many notifications flipped from unread to read.
    fn mark_all_read(&self, recipient: PrincipalId) -> Result<usize, InboxError>;
}

#[derive(Debug, thiserror::Error)]
pub enum InboxError {
    #[error("{0} not found")]
    NotFound(NotificationId),
    #[error("inbox unavailable: {0}")]
    Unavailable(String),
}

impl From<InboxError> for BoardError {
    fn from(err: InboxError) -> Self {
        match err {
            InboxError::NotFound(id) => BoardError::NotFound(id.to_string()),
            InboxError::Unavailable(reason) => {
                BoardError::Repository(RepositoryError::Unavailable(reason))
            }
        }
    }
}

#[derive(Debug, Default)]
struct Mailboxes {
    rows: BTreeMap<NotificationId, Notification>,
    last_id: u64,
}

#[derive(Debug, Default)]
pub struct InMemoryInbox {
    mailboxes: Mutex<Mailboxes>,
}

impl InMemoryInbox {
    fn lock(&self) -> Result<MutexGuard<'_, Mailboxes>, InboxError> {
        self.mailboxes
            .lock()
            .map_err(|_| InboxError::Unavailable("inbox mutex poisoned".to_string()))
    }

    fn collect(
        &self,
        recipient: PrincipalId,
        unread_only: bool,
    ) -> Result<Vec<Notification>, InboxError> {
        let mailboxes = self.lock()?;
        Ok(mailboxes
            .rows
            .values()
            .rev()
            .filter(|row| row.recipient == recipient && (!unread_only || !row.is_read))
            .cloned()
            .collect())
    }
}

impl NotificationInbox for InMemoryInbox {
    fn deliver(
        &self,
        event: &NotificationEvent,
        now: DateTime<Utc>,
    ) -> Result<Notification, InboxError> {
        let mut mailboxes = self.lock()?;
        mailboxes.last_id += 1;
        let notification = Notification {
            id: NotificationId(mailboxes.last_id),
            recipient: event.recipient,
            kind: event.kind,
            title: event.title().to_string(),
            message: event.message(),
            payload: event.payload.clone(),
            is_read: false,
            created_at: now,
        };
        mailboxes.rows.insert(notification.id, notification.clone());
        Ok(notification)
    }

    fn list(&self, recipient: PrincipalId) -> Result<Vec<Notification>, InboxError> {
        self.collect(recipient, false)
    }

    fn list_unread(&self, recipient: PrincipalId) -> Result<Vec<Notification>, InboxError> {
        self.collect(recipient, true)
    }

    fn mark_read(
        &self,
        recipient: PrincipalId,
        id: NotificationId,
    ) -> Result<Notification, InboxError> {
        let mut mailboxes = self.lock()?;
        match mailboxes.rows.get_mut(&id) {
            Some(row) if row.recipient == recipient => {
                row.is_read = true;
                Ok(row.clone())
            }
            _ => Err(InboxError::NotFound(id)),
        }
    }

    fn mark_all_read(&self, recipient: PrincipalId) -> Result<usize, InboxError> {
        let mut mailboxes = self.lock()?;
        let mut updated = 0;
        for row in mailboxes
            .rows
            .values_mut()
            .filter(|row| row.recipient == recipient && !row.is_read)
        {
            row.is_read = true;
            updated += 1;
        }
        Ok(updated)
    }
}
